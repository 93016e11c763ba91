//! Driving a selection session over a surface

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{OverlayView, SelectionSession, SelectionState, render};
use crate::{
    capture::Frame,
    error::{CaptureError, CaptureResult},
    model::{CaptureMode, Display, SelectionRect},
};

/// A full-screen overlay window showing selection views and producing input
#[async_trait]
pub trait SelectionSurface: Send {
    /// Shows a rendered view
    async fn present(&mut self, view: &OverlayView) -> CaptureResult<()>;

    /// Waits for the next input event; `None` when the surface went away
    async fn next_event(&mut self) -> Option<super::SelectionEvent>;

    /// Tears the surface down
    async fn close(&mut self);
}

/// Opens selection surfaces on a display
#[async_trait]
pub trait SurfaceFactory: Send + Sync {
    /// Opens a surface covering the display
    ///
    /// # Errors
    ///
    /// - [`CaptureError::SurfaceUnavailable`] - No overlay can be shown
    async fn open(&self, display: &Display) -> CaptureResult<Box<dyn SelectionSurface>>;
}

/// How a selection session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// A rectangle was selected on the frame
    Selected {
        /// Selected rectangle in frame pixels
        rect:  SelectionRect,
        /// The uncropped frame the selection was made on
        frame: Frame,
        /// Mode the session ran in
        mode:  CaptureMode,
    },
    /// The user pressed Escape or closed the surface
    Cancelled,
}

/// Runs selection sessions, one at a time
pub struct RegionSelector {
    factory: Arc<dyn SurfaceFactory>,
    active:  Mutex<()>,
}

impl RegionSelector {
    /// Creates a selector over a surface factory
    pub fn new(factory: Arc<dyn SurfaceFactory>) -> Self {
        Self {
            factory,
            active: Mutex::new(()),
        }
    }

    /// Returns true while a session is open
    pub fn is_busy(&self) -> bool {
        self.active.try_lock().is_err()
    }

    /// Shows the overlay for a frame and waits for a selection
    ///
    /// The surface is closed on every exit path.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::SelectorBusy`] - Another session is open
    /// - [`CaptureError::SurfaceUnavailable`] - The surface failed to open or
    ///   draw
    pub async fn run(&self, frame: Frame, mode: CaptureMode) -> CaptureResult<SelectionOutcome> {
        let _session_guard = self.active.try_lock().map_err(|_| {
            tracing::warn!("Selection requested while another session is open");
            CaptureError::SelectorBusy
        })?;

        let mut surface = self.factory.open(frame.display()).await?;
        tracing::debug!(display_id = frame.display().id, mode = %mode, "Opened selection surface");

        let result = Self::drive(surface.as_mut(), &frame, mode).await;
        surface.close().await;

        let session = result?;
        match session.finalized_rect() {
            Some(rect) => {
                tracing::info!(
                    "Selected {}x{} at ({}, {})",
                    rect.width.round(),
                    rect.height.round(),
                    rect.x.round(),
                    rect.y.round()
                );
                Ok(SelectionOutcome::Selected { rect, frame, mode })
            }
            None => {
                tracing::info!("Selection cancelled");
                Ok(SelectionOutcome::Cancelled)
            }
        }
    }

    async fn drive(
        surface: &mut dyn SelectionSurface,
        frame: &Frame,
        mode: CaptureMode,
    ) -> CaptureResult<SelectionSession> {
        let mut session = SelectionSession::new(mode);
        surface.present(&render(frame, &session)).await?;

        while !session.is_terminal() {
            let Some(event) = surface.next_event().await else {
                tracing::debug!("Selection surface closed its event stream");
                return Ok(session.apply(super::SelectionEvent::Escape));
            };

            session = session.apply(event);
            if session.state() != SelectionState::Cancelled {
                surface.present(&render(frame, &session)).await?;
            }
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        capture::ImageBuffer,
        model::{Bounds, Point},
        selection::{ScriptedSurfaceFactory, SelectionEvent, drag},
    };

    fn frame() -> Frame {
        let display = Display::new(3, Bounds::new(0, 0, 320, 240), true);
        Frame::new(ImageBuffer::from_test_pattern(320, 240), display)
    }

    #[tokio::test]
    async fn test_run_finalizes_and_closes() {
        let factory = Arc::new(ScriptedSurfaceFactory::new());
        factory.push_script(drag(Point::new(20.0, 20.0), Point::new(120.0, 90.0)));
        let selector = RegionSelector::new(factory.clone());

        let outcome = selector.run(frame(), CaptureMode::Screenshot).await.unwrap();

        match outcome {
            SelectionOutcome::Selected { rect, frame: original, mode } => {
                assert_eq!(rect, SelectionRect { x: 20.0, y: 20.0, width: 100.0, height: 70.0 });
                assert_eq!(original, frame());
                assert_eq!(mode, CaptureMode::Screenshot);
            }
            other => panic!("Expected Selected, got {:?}", other),
        }

        let log = factory.log();
        assert_eq!(log.opened, vec![3]);
        assert_eq!(log.closed, 1);
        // Initial view plus one per event
        assert_eq!(log.presented.len(), 5);
        assert!(!selector.is_busy());
    }

    #[tokio::test]
    async fn test_run_escape_cancels_and_closes() {
        let factory = Arc::new(ScriptedSurfaceFactory::new());
        factory.push_script(vec![
            SelectionEvent::PointerDown(Point::new(5.0, 5.0)),
            SelectionEvent::PointerMove(Point::new(100.0, 100.0)),
            SelectionEvent::Escape,
        ]);
        let selector = RegionSelector::new(factory.clone());

        let outcome = selector.run(frame(), CaptureMode::Screenshot).await.unwrap();

        assert_eq!(outcome, SelectionOutcome::Cancelled);
        assert_eq!(factory.log().closed, 1);
    }

    #[tokio::test]
    async fn test_exhausted_events_count_as_cancel() {
        let factory = Arc::new(ScriptedSurfaceFactory::new());
        factory.push_script(vec![SelectionEvent::PointerDown(Point::new(5.0, 5.0))]);
        let selector = RegionSelector::new(factory.clone());

        let outcome = selector.run(frame(), CaptureMode::Video).await.unwrap();

        assert_eq!(outcome, SelectionOutcome::Cancelled);
        assert_eq!(factory.log().closed, 1);
    }

    #[tokio::test]
    async fn test_present_failure_still_closes() {
        let factory = Arc::new(ScriptedSurfaceFactory::new().failing_present("gpu lost"));
        factory.push_script(vec![SelectionEvent::Escape]);
        let selector = RegionSelector::new(factory.clone());

        let result = selector.run(frame(), CaptureMode::Screenshot).await;

        assert!(matches!(result, Err(CaptureError::SurfaceUnavailable { .. })));
        assert_eq!(factory.log().closed, 1);
        assert!(!selector.is_busy());
    }

    #[tokio::test]
    async fn test_second_session_is_rejected() {
        let factory = Arc::new(ScriptedSurfaceFactory::new().with_event_delay(Duration::from_millis(150)));
        factory.push_script(drag(Point::new(0.0, 0.0), Point::new(50.0, 50.0)));
        factory.push_script(drag(Point::new(0.0, 0.0), Point::new(50.0, 50.0)));
        let selector = Arc::new(RegionSelector::new(factory.clone()));

        let first = {
            let selector = selector.clone();
            tokio::spawn(async move { selector.run(frame(), CaptureMode::Screenshot).await })
        };
        tokio::time::sleep(Duration::from_millis(60)).await;

        let second = selector.run(frame(), CaptureMode::Screenshot).await;
        assert!(matches!(second, Err(CaptureError::SelectorBusy)));

        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, SelectionOutcome::Selected { .. }));
        assert_eq!(factory.log().opened.len(), 1);
    }
}
