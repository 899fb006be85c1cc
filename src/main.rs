use std::rc::Rc;

use anyhow::Result;
use motion_config::MotionConfig;
use motion_scene::{
    AnimationEngine, AnimationEvent, ElementId, HeadlessViewport, MotionContext, Property, Rect,
    VirtualClock, VisibilityTrigger, library,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const VIEWPORT_WIDTH: f64 = 1280.0;
const VIEWPORT_HEIGHT: f64 = 800.0;
const FRAME_MS: f64 = 16.0;
const SCROLL_PER_FRAME: f64 = 40.0;

/// Elements of the headless product page.
struct ProductPage {
    hero: ElementId,
    badge: ElementId,
    headings: Vec<ElementId>,
    cards: Vec<ElementId>,
    height: f64,
}

impl ProductPage {
    fn layout(viewport: &HeadlessViewport) -> Self {
        let hero = ElementId::new();
        viewport.set_rect(hero, Rect::new(0.0, 80.0, VIEWPORT_WIDTH, 420.0));

        let badge = ElementId::new();
        viewport.set_rect(badge, Rect::new(1100.0, 120.0, 96.0, 96.0));

        // a heading every 800 px below the fold
        let headings: Vec<ElementId> = (0..3)
            .map(|i| {
                let heading = ElementId::new();
                let y = 900.0 + i as f64 * 800.0;
                viewport.set_rect(heading, Rect::new(80.0, y, 800.0, 64.0));
                heading
            })
            .collect();

        // 4 × 2 card grid under the first heading
        let cards: Vec<ElementId> = (0..8)
            .map(|i| {
                let card = ElementId::new();
                let col = (i % 4) as f64;
                let row = (i / 4) as f64;
                viewport.set_rect(
                    card,
                    Rect::new(80.0 + col * 290.0, 1000.0 + row * 360.0, 270.0, 340.0),
                );
                card
            })
            .collect();

        Self {
            hero,
            badge,
            headings,
            cards,
            height: 3200.0,
        }
    }
}

fn init_logging(config: &MotionConfig) {
    let filter = EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn log_events(engine: &AnimationEngine, now_ms: f64) {
    for event in engine.drain_events() {
        match event {
            AnimationEvent::Started {
                handle,
                name,
                targets,
            } => info!(at_ms = now_ms, %handle, %name, targets = targets.len(), "started"),
            AnimationEvent::Iteration {
                handle,
                element,
                iteration,
            } => debug!(at_ms = now_ms, %handle, %element, iteration, "iteration"),
            AnimationEvent::Ended { handle, name } => {
                info!(at_ms = now_ms, %handle, %name, "ended")
            }
            AnimationEvent::Cancelled { handle, name } => {
                info!(at_ms = now_ms, %handle, %name, "cancelled")
            }
        }
    }
}

/// Advance timers and animations by one frame each, `frames` times.
fn run_frames(clock: &VirtualClock, engine: &AnimationEngine, frames: usize) {
    for _ in 0..frames {
        clock.advance(FRAME_MS);
        engine.tick(FRAME_MS);
        log_events(engine, clock.now_ms());
    }
}

fn frames_for(ms: f64) -> usize {
    (ms / FRAME_MS).ceil() as usize
}

fn main() -> Result<()> {
    let config = MotionConfig::load();
    init_logging(&config);
    info!(?config, "motion config loaded");

    let clock = VirtualClock::new();
    let viewport = HeadlessViewport::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
    let engine = Rc::new(AnimationEngine::new());
    let ctx = MotionContext::new(engine.clone(), viewport.clone(), Rc::new(clock.clone()))
        .with_config(&config);

    let page = ProductPage::layout(&viewport);

    // hero: entrance sequence, then a looping badge
    let hero_player = ctx.bind_sequence_player();
    hero_player.element_ref().attach(page.hero);
    hero_player.play(&[library::fade_in_up(), library::glow()]);
    let badge_loop = library::start_floating(engine.as_ref(), &[page.badge])?;

    // headings reveal as they scroll into view
    let mut triggers: Vec<VisibilityTrigger> = page
        .headings
        .iter()
        .map(|heading| {
            let mut trigger = ctx.bind_reveal(library::fade_in_up());
            trigger.attach(*heading);
            trigger
        })
        .collect();

    let grid = ctx.grid();
    grid.reveal(&page.cards)?;
    viewport.flush();
    run_frames(&clock, &engine, frames_for(1_000.0));

    info!(page_height = page.height, "scrolling through the page");
    while viewport.scroll_y() + VIEWPORT_HEIGHT < page.height {
        viewport.scroll_by(SCROLL_PER_FRAME);
        run_frames(&clock, &engine, 1);
    }
    run_frames(&clock, &engine, frames_for(1_000.0));

    for (i, trigger) in triggers.iter().enumerate() {
        info!(heading = i, fired = trigger.fire_count(), "heading trigger");
    }

    info!("filter changed: swapping the product grid");
    let timings = ctx.grid_timings().clone();
    grid.leave(&page.cards)?;
    run_frames(&clock, &engine, frames_for(timings.leave_ms));
    let (kept, removed) = page.cards.split_at(4);
    for card in removed {
        viewport.remove(*card);
    }
    grid.enter(kept)?;
    let last_start = timings.stagger_ms * (kept.len() - 1) as f64;
    run_frames(&clock, &engine, frames_for(last_start + timings.enter_ms));

    for card in kept {
        info!(
            %card,
            opacity = engine.value(*card, Property::Opacity).unwrap_or(1.0),
            scale = engine.value(*card, Property::Scale).unwrap_or(1.0),
            "card settled"
        );
    }

    engine.cancel(badge_loop)?;
    log_events(&engine, clock.now_ms());

    hero_player.unbind();
    triggers.iter_mut().for_each(VisibilityTrigger::dispose);
    info!(
        elapsed_ms = clock.now_ms(),
        active = engine.active_count(),
        sessions = viewport.session_count(),
        "demo finished"
    );
    Ok(())
}
