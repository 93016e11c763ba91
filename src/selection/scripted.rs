//! Scripted selection surfaces
//!
//! Replays fixed event lists instead of reading a pointer. Used by the CLI
//! for headless runs and by tests to observe what a session drew.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;

use super::{OverlayView, SelectionEvent, SelectionSurface, SizeLabel, SurfaceFactory};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{Display, DisplayId, Point},
};

/// Events of a left-button drag from `from` to `to`
///
/// Press, a move halfway, a move to the end, then release at the end.
pub fn drag(from: Point, to: Point) -> Vec<SelectionEvent> {
    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    vec![
        SelectionEvent::PointerDown(from),
        SelectionEvent::PointerMove(mid),
        SelectionEvent::PointerMove(to),
        SelectionEvent::PointerUp(to),
    ]
}

/// What a presented view looked like, without its pixels
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedView {
    /// Bitmap size
    pub dimensions: (u32, u32),
    /// Caption text
    pub caption:    &'static str,
    /// Hint text
    pub hint:       &'static str,
    /// Size label, if shown
    pub size_label: Option<SizeLabel>,
}

/// Record of everything scripted surfaces did
#[derive(Debug, Clone, Default)]
pub struct SurfaceLog {
    /// Displays a surface was opened on, in order
    pub opened:    Vec<DisplayId>,
    /// Every view presented, across all surfaces
    pub presented: Vec<PresentedView>,
    /// The most recent view, with pixels
    pub last_view: Option<OverlayView>,
    /// Number of surfaces closed
    pub closed:    usize,
}

fn lock(log: &Mutex<SurfaceLog>) -> MutexGuard<'_, SurfaceLog> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Surface replaying a fixed list of events
pub struct ScriptedSurface {
    events:       VecDeque<SelectionEvent>,
    event_delay:  Option<Duration>,
    present_fail: Option<String>,
    log:          Arc<Mutex<SurfaceLog>>,
}

#[async_trait]
impl SelectionSurface for ScriptedSurface {
    async fn present(&mut self, view: &OverlayView) -> CaptureResult<()> {
        if let Some(reason) = &self.present_fail {
            return Err(CaptureError::SurfaceUnavailable {
                reason: reason.clone(),
            });
        }

        let mut log = lock(&self.log);
        log.presented.push(PresentedView {
            dimensions: view.image.dimensions(),
            caption:    view.caption,
            hint:       view.hint,
            size_label: view.size_label.clone(),
        });
        log.last_view = Some(view.clone());
        Ok(())
    }

    async fn next_event(&mut self) -> Option<SelectionEvent> {
        if let Some(delay) = self.event_delay {
            tokio::time::sleep(delay).await;
        }
        self.events.pop_front()
    }

    async fn close(&mut self) {
        lock(&self.log).closed += 1;
    }
}

/// Hands out [`ScriptedSurface`]s, one queued script per surface
///
/// When the queue is empty, surfaces get no events, which ends the session
/// as cancelled.
#[derive(Default)]
pub struct ScriptedSurfaceFactory {
    scripts:      Mutex<VecDeque<Vec<SelectionEvent>>>,
    event_delay:  Option<Duration>,
    present_fail: Option<String>,
    open_fail:    Option<String>,
    log:          Arc<Mutex<SurfaceLog>>,
}

impl ScriptedSurfaceFactory {
    /// Creates a factory with no scripts queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory with a single script queued
    pub fn with_script(events: Vec<SelectionEvent>) -> Self {
        let factory = Self::new();
        factory.push_script(events);
        factory
    }

    /// Queues the events for the next surface opened
    pub fn push_script(&self, events: Vec<SelectionEvent>) {
        self.scripts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(events);
    }

    /// Waits this long before delivering each event
    pub fn with_event_delay(mut self, delay: Duration) -> Self {
        self.event_delay = Some(delay);
        self
    }

    /// Makes every `present` fail with [`CaptureError::SurfaceUnavailable`]
    pub fn failing_present(mut self, reason: &str) -> Self {
        self.present_fail = Some(reason.to_string());
        self
    }

    /// Makes every `open` fail with [`CaptureError::SurfaceUnavailable`]
    pub fn failing_open(mut self, reason: &str) -> Self {
        self.open_fail = Some(reason.to_string());
        self
    }

    /// Snapshot of the surface log
    pub fn log(&self) -> SurfaceLog {
        lock(&self.log).clone()
    }
}

#[async_trait]
impl SurfaceFactory for ScriptedSurfaceFactory {
    async fn open(&self, display: &Display) -> CaptureResult<Box<dyn SelectionSurface>> {
        if let Some(reason) = &self.open_fail {
            return Err(CaptureError::SurfaceUnavailable {
                reason: reason.clone(),
            });
        }

        let events = self
            .scripts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_default();

        lock(&self.log).opened.push(display.id);

        Ok(Box::new(ScriptedSurface {
            events:       events.into(),
            event_delay:  self.event_delay,
            present_fail: self.present_fail.clone(),
            log:          self.log.clone(),
        }))
    }
}
