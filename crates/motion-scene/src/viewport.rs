//! Headless scrolling viewport implementing [`VisibilityObserver`].
//!
//! Elements are axis-aligned rectangles in page coordinates; the viewport is
//! a rectangle that scrolls over them. Like a browser intersection observer,
//! each session gets an initial entry for a newly observed element and then
//! one entry every time the element crosses the session's threshold.
//!
//! Entries are queued and only delivered by [`flush`](HeadlessViewport::flush)
//! (or by the scroll helpers, which flush), so callbacks never run inside
//! `observe`.
//!
//! Every `observe`/`unobserve`/`disconnect` call is recorded and can be read
//! back with [`calls`](HeadlessViewport::calls).

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::trace;

use crate::element::ElementId;
use crate::visibility::{
    ObserveOptions, SessionId, VisibilityCallback, VisibilityEntry, VisibilityObserver,
};

/// Axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    fn intersection_area(&self, other: &Rect) -> f64 {
        let w = (self.x + self.width).min(other.x + other.width) - self.x.max(other.x);
        let h = (self.y + self.height).min(other.y + other.height) - self.y.max(other.y);
        w.max(0.0) * h.max(0.0)
    }

    /// Fraction of this rectangle inside `viewport`.
    ///
    /// Zero-area rectangles count as fully visible when their origin lies in
    /// the viewport.
    pub fn visible_ratio(&self, viewport: &Rect) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return if viewport.contains_point(self.x, self.y) {
                1.0
            } else {
                0.0
            };
        }
        (self.intersection_area(viewport) / area).clamp(0.0, 1.0)
    }
}

/// A call made against the viewport's observer interface.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverCall {
    Observe {
        session: SessionId,
        element: ElementId,
        threshold: f64,
    },
    Unobserve {
        session: SessionId,
        element: ElementId,
    },
    Disconnect {
        session: SessionId,
    },
}

struct Session {
    threshold: f64,
    callback: VisibilityCallback,
    /// Observed elements with their last reported visibility.
    elements: Vec<(ElementId, bool)>,
    pending: Vec<VisibilityEntry>,
}

struct ViewportState {
    viewport: Rect,
    rects: HashMap<ElementId, Rect>,
    sessions: BTreeMap<SessionId, Session>,
    calls: Vec<ObserverCall>,
    next_session: u64,
}

impl ViewportState {
    fn ratio(&self, element: ElementId) -> f64 {
        self.rects
            .get(&element)
            .map_or(0.0, |rect| rect.visible_ratio(&self.viewport))
    }

    fn entry(&self, element: ElementId, threshold: f64) -> VisibilityEntry {
        let ratio = self.ratio(element);
        VisibilityEntry {
            element,
            is_visible: ratio > 0.0 && ratio >= threshold,
            ratio,
        }
    }

    /// Queue entries for every observed element whose visibility changed.
    fn recompute(&mut self) {
        let ViewportState {
            viewport,
            rects,
            sessions,
            ..
        } = self;
        for session in sessions.values_mut() {
            for (element, last_visible) in session.elements.iter_mut() {
                let ratio = rects
                    .get(element)
                    .map_or(0.0, |rect| rect.visible_ratio(viewport));
                let is_visible = ratio > 0.0 && ratio >= session.threshold;
                if is_visible != *last_visible {
                    *last_visible = is_visible;
                    session.pending.push(VisibilityEntry {
                        element: *element,
                        is_visible,
                        ratio,
                    });
                }
            }
        }
    }
}

/// Deterministic, scrollable [`VisibilityObserver`].
pub struct HeadlessViewport {
    state: RefCell<ViewportState>,
}

impl std::fmt::Debug for HeadlessViewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HeadlessViewport")
            .field("viewport", &state.viewport)
            .field("elements", &state.rects.len())
            .field("sessions", &state.sessions.len())
            .finish()
    }
}

impl HeadlessViewport {
    /// Viewport of `width` × `height` scrolled to the top of the page.
    pub fn new(width: f64, height: f64) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(ViewportState {
                viewport: Rect::new(0.0, 0.0, width, height),
                rects: HashMap::new(),
                sessions: BTreeMap::new(),
                calls: Vec::new(),
                next_session: 1,
            }),
        })
    }

    /// Place (or move) an element. Changes are queued until the next flush.
    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        let mut state = self.state.borrow_mut();
        state.rects.insert(element, rect);
        state.recompute();
    }

    /// Remove an element from the page; observers see it become invisible.
    pub fn remove(&self, element: ElementId) {
        let mut state = self.state.borrow_mut();
        state.rects.remove(&element);
        state.recompute();
    }

    /// Scroll so the viewport's top edge is at `y`, then deliver entries.
    pub fn scroll_to(&self, y: f64) -> usize {
        {
            let mut state = self.state.borrow_mut();
            state.viewport.y = y;
            state.recompute();
        }
        self.flush()
    }

    /// Scroll by `dy`, then deliver entries.
    pub fn scroll_by(&self, dy: f64) -> usize {
        let y = self.state.borrow().viewport.y + dy;
        self.scroll_to(y)
    }

    pub fn scroll_y(&self) -> f64 {
        self.state.borrow().viewport.y
    }

    /// Deliver queued entries, one batch per session in session order.
    ///
    /// Returns the number of entries delivered.
    pub fn flush(&self) -> usize {
        let ids: Vec<SessionId> = self.state.borrow().sessions.keys().copied().collect();
        let mut delivered = 0;

        for id in ids {
            let batch = {
                let mut state = self.state.borrow_mut();
                let Some(session) = state.sessions.get_mut(&id) else {
                    // released by an earlier callback in this flush
                    continue;
                };
                if session.pending.is_empty() {
                    continue;
                }
                (
                    std::mem::take(&mut session.pending),
                    Rc::clone(&session.callback),
                )
            };
            let (entries, callback) = batch;
            trace!(session = %id, entries = entries.len(), "delivering visibility batch");
            delivered += entries.len();
            callback(&entries);
        }

        delivered
    }

    /// Visible fraction of `element` at the current scroll position.
    pub fn ratio(&self, element: ElementId) -> f64 {
        self.state.borrow().ratio(element)
    }

    /// Whether any live session still watches `element`.
    pub fn is_observing(&self, element: ElementId) -> bool {
        self.state
            .borrow()
            .sessions
            .values()
            .any(|s| s.elements.iter().any(|(e, _)| *e == element))
    }

    /// Number of sessions not yet disconnected.
    pub fn session_count(&self) -> usize {
        self.state.borrow().sessions.len()
    }

    /// Every observer call made so far, in order.
    pub fn calls(&self) -> Vec<ObserverCall> {
        self.state.borrow().calls.clone()
    }
}

impl VisibilityObserver for HeadlessViewport {
    fn observe(
        &self,
        element: ElementId,
        options: ObserveOptions,
        on_change: VisibilityCallback,
    ) -> SessionId {
        let mut state = self.state.borrow_mut();
        let session = SessionId(state.next_session);
        state.next_session += 1;

        let initial = state.entry(element, options.threshold);
        state.calls.push(ObserverCall::Observe {
            session,
            element,
            threshold: options.threshold,
        });
        state.sessions.insert(
            session,
            Session {
                threshold: options.threshold,
                callback: on_change,
                elements: vec![(element, initial.is_visible)],
                pending: vec![initial],
            },
        );
        session
    }

    fn unobserve(&self, session: SessionId, element: ElementId) {
        let mut state = self.state.borrow_mut();
        state
            .calls
            .push(ObserverCall::Unobserve { session, element });
        if let Some(s) = state.sessions.get_mut(&session) {
            s.elements.retain(|(e, _)| *e != element);
            s.pending.retain(|entry| entry.element != element);
        }
    }

    fn disconnect(&self, session: SessionId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ObserverCall::Disconnect { session });
        state.sessions.remove(&session);
    }
}
