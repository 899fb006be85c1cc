//! Headless reference [`Animator`].
//!
//! The `AnimationEngine` turns descriptors into running animations, advances
//! them with [`tick`](AnimationEngine::tick) and answers "what is the value of
//! property P on element E right now". It is what the demo binary renders from
//! and what integration tests use when they care about sampled values rather
//! than call logs.
//!
//! ```
//! use motion_scene::{AnimationEngine, Animator, ElementId, Property, library};
//!
//! let engine = AnimationEngine::new();
//! let card = ElementId(1);
//! engine.animate(&[card], &library::fade_in()).unwrap();
//!
//! engine.tick(10_000.0);
//! assert_eq!(engine.value(card, Property::Opacity), Some(1.0));
//! ```
//!
//! Finished animations leave their final values committed on the element, so
//! a faded-in card stays visible after its animation is cleaned up.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::{debug, trace};

use crate::animator::{AnimationHandle, Animator};
use crate::descriptor::{AnimationDescriptor, Property};
use crate::element::ElementId;
use crate::error::{AnimationError, Result};
use crate::events::{AnimationEvent, EventQueue};

/// Where one target is within its animation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TrackProgress {
    /// Still inside its start delay.
    Pending,
    /// `offset` is the direction-adjusted position within `iteration`.
    Running { iteration: u32, offset: f32 },
    /// All iterations played; `offset` is where the last one stopped.
    Done { offset: f32 },
}

fn track_progress(descriptor: &AnimationDescriptor, local_ms: f64) -> TrackProgress {
    if local_ms < 0.0 {
        return TrackProgress::Pending;
    }

    let total = descriptor.looping.iterations();
    let last_iteration = total.unwrap_or(1).saturating_sub(1);
    let done_offset = if descriptor.direction.is_reversed(last_iteration) {
        0.0
    } else {
        1.0
    };

    if descriptor.duration_ms <= 0.0 {
        return TrackProgress::Done {
            offset: done_offset,
        };
    }

    let position = local_ms / descriptor.duration_ms;
    if let Some(total) = total {
        if position >= total as f64 {
            return TrackProgress::Done {
                offset: done_offset,
            };
        }
    }

    let iteration = position.floor() as u32;
    let raw = position.fract() as f32;
    let offset = if descriptor.direction.is_reversed(iteration) {
        1.0 - raw
    } else {
        raw
    };
    TrackProgress::Running { iteration, offset }
}

#[derive(Debug, Clone)]
struct Track {
    element: ElementId,
    delay_ms: f64,
    completed_iterations: u32,
    finished: bool,
}

#[derive(Debug, Clone)]
struct ActiveAnimation {
    handle: AnimationHandle,
    descriptor: AnimationDescriptor,
    tracks: Vec<Track>,
    elapsed_ms: f64,
    /// Element values captured at start, read by scalar targets.
    start_values: HashMap<(ElementId, Property), f64>,
}

impl ActiveAnimation {
    fn progress(&self, track: &Track) -> TrackProgress {
        track_progress(&self.descriptor, self.elapsed_ms - track.delay_ms)
    }

    fn sample(&self, track: &Track, property: Property) -> Option<f64> {
        let value = self.descriptor.get(property)?;
        let offset = match self.progress(track) {
            TrackProgress::Pending => return None,
            TrackProgress::Running { offset, .. } | TrackProgress::Done { offset } => offset,
        };
        let eased = self.descriptor.easing.evaluate(offset);
        let start = self.start_values.get(&(track.element, property)).copied();
        value.sample(eased, start)
    }

    /// Current value of every animated property of every started target.
    fn snapshot(&self) -> Vec<((ElementId, Property), f64)> {
        let mut values = Vec::new();
        for track in &self.tracks {
            for (property, _) in &self.descriptor.properties {
                if let Some(value) = self.sample(track, *property) {
                    values.push(((track.element, *property), value));
                }
            }
        }
        values
    }
}

#[derive(Debug, Default)]
struct EngineState {
    /// Running animations, oldest first; later animations win on overlap.
    animations: Vec<ActiveAnimation>,
    /// Values left behind by finished or cancelled animations.
    committed: HashMap<(ElementId, Property), f64>,
    events: EventQueue,
}

impl EngineState {
    fn value(&self, element: ElementId, property: Property) -> Option<f64> {
        for animation in self.animations.iter().rev() {
            for track in animation.tracks.iter().filter(|t| t.element == element) {
                if let Some(value) = animation.sample(track, property) {
                    return Some(value);
                }
            }
        }
        self.committed.get(&(element, property)).copied()
    }
}

/// Reference animator that tracks and samples animations in memory.
#[derive(Debug, Default)]
pub struct AnimationEngine {
    state: RefCell<EngineState>,
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every running animation by `delta_ms`.
    ///
    /// Emits `Iteration` events for completed iterations of multi-iteration
    /// animations and `Ended` once every target of an animation finished.
    pub fn tick(&self, delta_ms: f64) {
        let mut state = self.state.borrow_mut();
        let EngineState {
            animations,
            committed,
            events,
        } = &mut *state;

        for animation in animations.iter_mut() {
            animation.elapsed_ms += delta_ms;
            let total = animation.descriptor.looping.iterations();
            let multi_iteration = total != Some(1);

            for i in 0..animation.tracks.len() {
                let track = &animation.tracks[i];
                if track.finished {
                    continue;
                }
                let reached = match animation.progress(track) {
                    TrackProgress::Pending => continue,
                    TrackProgress::Running { iteration, .. } => iteration,
                    TrackProgress::Done { .. } => total.unwrap_or(1),
                };

                let element = track.element;
                if multi_iteration {
                    for iteration in track.completed_iterations..reached {
                        events.push(AnimationEvent::Iteration {
                            handle: animation.handle,
                            element,
                            iteration,
                        });
                    }
                }

                let done = matches!(animation.progress(track), TrackProgress::Done { .. });
                if done {
                    for (property, _) in &animation.descriptor.properties {
                        if let Some(value) = animation.sample(track, *property) {
                            committed.insert((element, *property), value);
                        }
                    }
                }

                let track = &mut animation.tracks[i];
                track.completed_iterations = track.completed_iterations.max(reached);
                track.finished = done;
            }
        }

        animations.retain(|animation| {
            let finished = animation.tracks.iter().all(|t| t.finished);
            if finished {
                trace!(handle = %animation.handle, "animation ended");
                events.push(AnimationEvent::Ended {
                    handle: animation.handle,
                    name: animation.descriptor.name.clone(),
                });
            }
            !finished
        });
    }

    /// Current value of `property` on `element`.
    ///
    /// The most recently started animation touching the property wins; with
    /// none running, the last committed value is returned.
    pub fn value(&self, element: ElementId, property: Property) -> Option<f64> {
        self.state.borrow().value(element, property)
    }

    /// Stop an animation, freezing its targets at their current values.
    pub fn cancel(&self, handle: AnimationHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let index = state
            .animations
            .iter()
            .position(|a| a.handle == handle)
            .ok_or(AnimationError::UnknownHandle(handle))?;

        let animation = state.animations.remove(index);
        for (key, value) in animation.snapshot() {
            state.committed.insert(key, value);
        }
        debug!(%handle, name = animation.descriptor.display_name(), "animation cancelled");
        state.events.push(AnimationEvent::Cancelled {
            handle,
            name: animation.descriptor.name,
        });
        Ok(())
    }

    pub fn is_active(&self, handle: AnimationHandle) -> bool {
        self.state
            .borrow()
            .animations
            .iter()
            .any(|a| a.handle == handle)
    }

    pub fn active_count(&self) -> usize {
        self.state.borrow().animations.len()
    }

    /// Remove and return the events emitted since the last drain.
    pub fn drain_events(&self) -> Vec<AnimationEvent> {
        self.state.borrow_mut().events.drain()
    }
}

impl Animator for AnimationEngine {
    fn animate(
        &self,
        targets: &[ElementId],
        descriptor: &AnimationDescriptor,
    ) -> Result<AnimationHandle> {
        descriptor.validate()?;

        let mut state = self.state.borrow_mut();
        let mut start_values = HashMap::new();
        for element in targets {
            for (property, _) in &descriptor.properties {
                if let Some(value) = state.value(*element, *property) {
                    start_values.insert((*element, *property), value);
                }
            }
        }

        let handle = AnimationHandle::new();
        let tracks = targets
            .iter()
            .enumerate()
            .map(|(index, element)| Track {
                element: *element,
                delay_ms: descriptor.delay_for(index),
                completed_iterations: 0,
                finished: false,
            })
            .collect();

        debug!(
            %handle,
            name = descriptor.display_name(),
            targets = targets.len(),
            "animation started"
        );
        state.events.push(AnimationEvent::Started {
            handle,
            name: descriptor.name.clone(),
            targets: targets.to_vec(),
        });
        state.animations.push(ActiveAnimation {
            handle,
            descriptor: descriptor.clone(),
            tracks,
            elapsed_ms: 0.0,
            start_values,
        });

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Direction, Looping};
    use crate::easing::Easing;
    use crate::stagger::stagger;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    fn fade(duration: f64) -> AnimationDescriptor {
        AnimationDescriptor::new("fade")
            .from_to(Property::Opacity, 0.0, 1.0)
            .duration_ms(duration)
            .easing(Easing::Linear)
    }

    #[test]
    fn test_linear_progress() {
        let engine = AnimationEngine::new();
        let el = ElementId(1);
        engine.animate(&[el], &fade(100.0)).unwrap();

        assert!(approx_eq(engine.value(el, Property::Opacity).unwrap(), 0.0));
        engine.tick(25.0);
        assert!(approx_eq(engine.value(el, Property::Opacity).unwrap(), 0.25));
        engine.tick(50.0);
        assert!(approx_eq(engine.value(el, Property::Opacity).unwrap(), 0.75));
    }

    #[test]
    fn test_finished_animation_commits_final_value() {
        let engine = AnimationEngine::new();
        let el = ElementId(1);
        let handle = engine.animate(&[el], &fade(100.0)).unwrap();

        engine.tick(150.0);
        assert!(!engine.is_active(handle));
        assert_eq!(engine.active_count(), 0);
        assert_eq!(engine.value(el, Property::Opacity), Some(1.0));

        let events = engine.drain_events();
        assert!(matches!(events[0], AnimationEvent::Started { .. }));
        assert!(matches!(events[1], AnimationEvent::Ended { .. }));
    }

    #[test]
    fn test_stagger_delays_each_target() {
        let engine = AnimationEngine::new();
        let els = [ElementId(1), ElementId(2), ElementId(3)];
        engine
            .animate(&els, &fade(100.0).stagger(stagger(60.0)))
            .unwrap();

        engine.tick(50.0);
        assert!(approx_eq(engine.value(els[0], Property::Opacity).unwrap(), 0.5));
        // still in its delay: no value yet
        assert_eq!(engine.value(els[1], Property::Opacity), None);
        assert_eq!(engine.value(els[2], Property::Opacity), None);

        engine.tick(20.0);
        assert!(approx_eq(engine.value(els[1], Property::Opacity).unwrap(), 0.1));

        engine.tick(200.0);
        assert_eq!(engine.active_count(), 0);
        for el in els {
            assert_eq!(engine.value(el, Property::Opacity), Some(1.0));
        }
    }

    #[test]
    fn test_alternate_infinite_loop() {
        let engine = AnimationEngine::new();
        let el = ElementId(9);
        let breathe = AnimationDescriptor::new("breathe")
            .from_to(Property::Scale, 1.0, 1.1)
            .duration_ms(100.0)
            .easing(Easing::Linear)
            .looping(Looping::Infinite)
            .direction(Direction::Alternate);
        let handle = engine.animate(&[el], &breathe).unwrap();

        engine.tick(50.0);
        assert!(approx_eq(engine.value(el, Property::Scale).unwrap(), 1.05));
        engine.tick(75.0); // 125: second iteration runs backwards
        assert!(approx_eq(engine.value(el, Property::Scale).unwrap(), 1.075));

        engine.tick(10_000.0);
        assert!(engine.is_active(handle));
        let iterations = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, AnimationEvent::Iteration { .. }))
            .count();
        assert_eq!(iterations, 101);
    }

    #[test]
    fn test_counted_loops_emit_iterations_then_end() {
        let engine = AnimationEngine::new();
        let el = ElementId(4);
        engine
            .animate(&[el], &fade(100.0).looping(Looping::Times { count: 3 }))
            .unwrap();

        engine.tick(1_000.0);
        let events = engine.drain_events();
        let iterations: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                AnimationEvent::Iteration { iteration, .. } => Some(*iteration),
                _ => None,
            })
            .collect();
        assert_eq!(iterations, vec![0, 1, 2]);
        assert!(matches!(events.last(), Some(AnimationEvent::Ended { .. })));
    }

    #[test]
    fn test_scalar_starts_from_committed_value() {
        let engine = AnimationEngine::new();
        let el = ElementId(5);
        engine.animate(&[el], &fade(10.0)).unwrap();
        engine.tick(10.0);

        let dim = AnimationDescriptor::new("dim")
            .scalar(Property::Opacity, 0.0)
            .duration_ms(100.0)
            .easing(Easing::Linear);
        engine.animate(&[el], &dim).unwrap();
        engine.tick(50.0);
        assert!(approx_eq(engine.value(el, Property::Opacity).unwrap(), 0.5));
    }

    #[test]
    fn test_cancel_freezes_and_reports_unknown() {
        let engine = AnimationEngine::new();
        let el = ElementId(6);
        let handle = engine.animate(&[el], &fade(100.0)).unwrap();
        engine.tick(40.0);

        engine.cancel(handle).unwrap();
        assert!(approx_eq(engine.value(el, Property::Opacity).unwrap(), 0.4));
        assert_eq!(
            engine.cancel(handle),
            Err(AnimationError::UnknownHandle(handle))
        );
        let events = engine.drain_events();
        assert!(matches!(events.last(), Some(AnimationEvent::Cancelled { .. })));
    }

    #[test]
    fn test_malformed_descriptor_is_rejected() {
        let engine = AnimationEngine::new();
        let err = engine
            .animate(&[ElementId(1)], &fade(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, AnimationError::MalformedDescriptor(_)));
        assert_eq!(engine.active_count(), 0);
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_empty_target_list_ends_on_next_tick() {
        let engine = AnimationEngine::new();
        let handle = engine.animate(&[], &fade(100.0)).unwrap();
        assert!(engine.is_active(handle));
        engine.tick(1.0);
        assert!(!engine.is_active(handle));
    }
}
