//! Interactive region selection
//!
//! Selection is split into three parts:
//!
//! - [`SelectionSession`]: a pure state machine fed with [`SelectionEvent`]s
//! - [`render`]: a pure function drawing the overlay for a session
//! - [`RegionSelector`]: drives a session over a [`SelectionSurface`]
//!
//! ```text
//!            pointer-down              pointer-up (> 10 x 10)
//!   Idle ───────────────────► Dragging ──────────────────────► Finalized
//!    ▲                          │  ▲ │
//!    └──── pointer-up (small) ──┘  └─┘ pointer-move
//!
//!   Idle / Dragging ── Escape ──► Cancelled
//! ```

use serde::Serialize;

use crate::model::{CaptureMode, Point, SelectionRect};

pub mod render;
pub mod scripted;
pub mod session;

pub use render::{OverlayView, SizeLabel, render};
pub use scripted::{PresentedView, ScriptedSurface, ScriptedSurfaceFactory, SurfaceLog, drag};
pub use session::{RegionSelector, SelectionOutcome, SelectionSurface, SurfaceFactory};

/// Phase of a selection session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    /// Waiting for a pointer-down
    Idle,
    /// Pointer held; the rectangle follows the pointer
    Dragging,
    /// A large enough rectangle was released
    Finalized,
    /// Escape was pressed
    Cancelled,
}

/// Input delivered to a selection session, in frame-local pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SelectionEvent {
    /// Primary button pressed
    PointerDown(Point),
    /// Pointer moved
    PointerMove(Point),
    /// Primary button released at this position
    PointerUp(Point),
    /// Escape key pressed
    Escape,
}

/// State of one selection session
///
/// Sessions are values: [`apply`](Self::apply) returns the next session and
/// never touches any surface.
///
/// # Examples
///
/// ```
/// use shotpipe::{
///     model::{CaptureMode, Point},
///     selection::{SelectionEvent, SelectionSession, SelectionState},
/// };
///
/// let session = SelectionSession::new(CaptureMode::Screenshot)
///     .apply(SelectionEvent::PointerDown(Point::new(100.0, 100.0)))
///     .apply(SelectionEvent::PointerMove(Point::new(160.0, 140.0)))
///     .apply(SelectionEvent::PointerUp(Point::new(200.0, 150.0)));
///
/// assert_eq!(session.state(), SelectionState::Finalized);
/// assert_eq!(session.finalized_rect().unwrap().width, 100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionSession {
    mode:    CaptureMode,
    state:   SelectionState,
    anchor:  Option<Point>,
    pointer: Option<Point>,
    rect:    Option<SelectionRect>,
}

impl SelectionSession {
    /// Starts an idle session
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            state: SelectionState::Idle,
            anchor: None,
            pointer: None,
            rect: None,
        }
    }

    /// Applies one event and returns the resulting session
    pub fn apply(self, event: SelectionEvent) -> Self {
        use SelectionEvent::*;
        use SelectionState::*;

        match (self.state, event) {
            (Finalized | Cancelled, _) => self,
            (Idle | Dragging, Escape) => Self {
                state: Cancelled,
                ..self
            },
            (Idle, PointerDown(point)) => Self {
                state: Dragging,
                anchor: Some(point),
                pointer: Some(point),
                rect: Some(SelectionRect::zero_at(point)),
                ..self
            },
            (Idle, PointerMove(point) | PointerUp(point)) => Self {
                pointer: Some(point),
                ..self
            },
            (Dragging, PointerDown(_)) => self,
            (Dragging, PointerMove(point)) => self.track(point),
            (Dragging, PointerUp(point)) => {
                let tracked = self.track(point);
                let big_enough = tracked.rect.is_some_and(|rect| rect.is_selection());
                Self {
                    state: if big_enough { Finalized } else { Idle },
                    ..tracked
                }
            }
        }
    }

    fn track(self, point: Point) -> Self {
        let anchor = self.anchor.unwrap_or(point);
        Self {
            anchor: Some(anchor),
            pointer: Some(point),
            rect: Some(SelectionRect::from_points(anchor, point)),
            ..self
        }
    }

    /// Capture mode of this session
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Current phase
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Where the drag started
    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Last known pointer position
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// The rectangle currently shown, if any
    ///
    /// After an undersized release the rectangle stays until the next
    /// pointer-down.
    pub fn rect(&self) -> Option<SelectionRect> {
        self.rect
    }

    /// The selected rectangle, once finalized
    pub fn finalized_rect(&self) -> Option<SelectionRect> {
        match self.state {
            SelectionState::Finalized => self.rect,
            _ => None,
        }
    }

    /// Returns true once the session accepts no more events
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SelectionState::Finalized | SelectionState::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn run(events: &[SelectionEvent]) -> SelectionSession {
        events
            .iter()
            .fold(SelectionSession::new(CaptureMode::Screenshot), |session, event| {
                session.apply(*event)
            })
    }

    #[test]
    fn test_pointer_down_starts_zero_sized_drag() {
        let session = run(&[SelectionEvent::PointerDown(p(30.0, 40.0))]);

        assert_eq!(session.state(), SelectionState::Dragging);
        assert_eq!(session.anchor(), Some(p(30.0, 40.0)));
        assert_eq!(session.rect(), Some(SelectionRect::zero_at(p(30.0, 40.0))));
    }

    #[test]
    fn test_drag_in_every_direction_is_positive() {
        let anchor = p(200.0, 200.0);
        for end in [p(260.0, 270.0), p(140.0, 270.0), p(260.0, 130.0), p(140.0, 130.0)] {
            let session = run(&[
                SelectionEvent::PointerDown(anchor),
                SelectionEvent::PointerMove(end),
                SelectionEvent::PointerUp(end),
            ]);

            let rect = session.finalized_rect().unwrap();
            assert_eq!(rect.x, anchor.x.min(end.x));
            assert_eq!(rect.y, anchor.y.min(end.y));
            assert_eq!(rect.width, 60.0);
            assert_eq!(rect.height, 70.0);
        }
    }

    #[test]
    fn test_pointer_up_position_is_final() {
        let session = run(&[
            SelectionEvent::PointerDown(p(0.0, 0.0)),
            SelectionEvent::PointerMove(p(5.0, 5.0)),
            SelectionEvent::PointerUp(p(50.0, 60.0)),
        ]);

        assert_eq!(session.finalized_rect().unwrap().width, 50.0);
        assert_eq!(session.finalized_rect().unwrap().height, 60.0);
    }

    #[test]
    fn test_undersized_release_returns_to_idle() {
        let session = run(&[
            SelectionEvent::PointerDown(p(10.0, 10.0)),
            SelectionEvent::PointerUp(p(20.0, 200.0)),
        ]);

        assert_eq!(session.state(), SelectionState::Idle);
        assert_eq!(session.finalized_rect(), None);
        // Still visible until the next pointer-down
        assert_eq!(session.rect().unwrap().width, 10.0);

        let retried = session
            .apply(SelectionEvent::PointerDown(p(100.0, 100.0)))
            .apply(SelectionEvent::PointerUp(p(150.0, 150.0)));
        assert_eq!(retried.state(), SelectionState::Finalized);
    }

    #[test]
    fn test_escape_cancels_from_any_live_state() {
        let idle = run(&[SelectionEvent::Escape]);
        assert_eq!(idle.state(), SelectionState::Cancelled);

        let dragging = run(&[
            SelectionEvent::PointerDown(p(10.0, 10.0)),
            SelectionEvent::PointerMove(p(300.0, 300.0)),
            SelectionEvent::Escape,
        ]);
        assert_eq!(dragging.state(), SelectionState::Cancelled);
        assert_eq!(dragging.finalized_rect(), None);
    }

    #[test]
    fn test_terminal_states_ignore_events() {
        let finalized = run(&[
            SelectionEvent::PointerDown(p(0.0, 0.0)),
            SelectionEvent::PointerUp(p(100.0, 100.0)),
        ]);
        assert_eq!(finalized.apply(SelectionEvent::Escape), finalized);

        let cancelled = run(&[SelectionEvent::Escape]);
        assert_eq!(cancelled.apply(SelectionEvent::PointerDown(p(1.0, 1.0))), cancelled);
        assert!(cancelled.is_terminal());
    }

    #[test]
    fn test_idle_move_only_tracks_pointer() {
        let session = run(&[SelectionEvent::PointerMove(p(42.0, 24.0))]);

        assert_eq!(session.state(), SelectionState::Idle);
        assert_eq!(session.pointer(), Some(p(42.0, 24.0)));
        assert_eq!(session.rect(), None);
    }

    #[test]
    fn test_second_pointer_down_while_dragging_is_ignored() {
        let session = run(&[
            SelectionEvent::PointerDown(p(10.0, 10.0)),
            SelectionEvent::PointerDown(p(500.0, 500.0)),
            SelectionEvent::PointerUp(p(60.0, 60.0)),
        ]);

        assert_eq!(session.anchor(), Some(p(10.0, 10.0)));
        assert_eq!(session.finalized_rect().unwrap().width, 50.0);
    }
}
