//! Mock capture backend for testing
//!
//! This module provides a `MockBackend` implementation of the [`FrameSource`]
//! trait for testing and headless runs. The mock backend generates synthetic
//! test images and simulates a display layout without touching a real
//! windowing system.
//!
//! # Features
//!
//! - **Synthetic Image Generation:** Test pattern frames sized to each display
//! - **Mock Display Layout:** A primary 2560x1440 display with a 1920x1080
//!   display to its right
//! - **Cursor Simulation:** Fixed cursor position, or none at all
//! - **HiDPI Simulation:** Scale factor applied to captured bitmaps
//! - **Configurable Delay:** Simulate async operation delays for testing
//! - **Error Injection:** Inject errors to test error handling paths
//!
//! # Examples
//!
//! ```
//! use shotpipe::capture::{FrameSource, MockBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MockBackend::new();
//!
//!     let displays = backend.displays().await.unwrap();
//!     assert_eq!(displays.len(), 2);
//!
//!     let image = backend.capture_display(&displays[0]).await.unwrap();
//!     assert_eq!(image.dimensions(), (2560, 1440));
//! }
//! ```
//!
//! ## With Error Injection
//!
//! ```
//! use shotpipe::{
//!     capture::{FrameSource, MockBackend},
//!     error::CaptureError,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MockBackend::new().with_error(CaptureError::CaptureTimeout { duration_ms: 2000 });
//!
//!     let displays = backend.displays().await.unwrap();
//!     let result = backend.capture_display(&displays[0]).await;
//!     assert!(matches!(result, Err(CaptureError::CaptureTimeout { .. })));
//! }
//! ```

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::sleep;

use super::{FrameSource, ImageBuffer};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{Bounds, Display, Point},
};

/// Mock capture backend for testing and development
///
/// Display enumeration always succeeds; an injected error is returned by
/// [`FrameSource::capture_display`] only, so display resolution can still be
/// exercised against a failing capture.
///
/// # Thread Safety
///
/// `MockBackend` is thread-safe and can be shared across tasks using `Arc`.
#[derive(Debug)]
pub struct MockBackend {
    /// Optional delay to simulate async operation timing
    delay:           Option<Duration>,
    /// Optional error to inject into captures
    error_injection: Option<CaptureError>,
    /// Simulated display layout
    displays:        Vec<Display>,
    /// Simulated cursor position
    cursor:          Option<Point>,
    /// Bitmap scale relative to display bounds
    scale_factor:    f32,
    /// Number of capture calls served
    captures:        AtomicUsize,
}

impl MockBackend {
    /// Creates a new MockBackend with the default display layout
    ///
    /// The cursor starts in the middle of the primary display.
    pub fn new() -> Self {
        Self {
            delay:           None,
            error_injection: None,
            displays:        Self::create_mock_displays(),
            cursor:          Some(Point::new(1280.0, 720.0)),
            scale_factor:    1.0,
            captures:        AtomicUsize::new(0),
        }
    }

    /// Replaces the simulated display layout
    pub fn with_displays(mut self, displays: Vec<Display>) -> Self {
        self.displays = displays;
        self
    }

    /// Places the simulated cursor at a global position
    pub fn with_cursor(mut self, cursor: Point) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Makes the backend unable to report the cursor position
    pub fn without_cursor(mut self) -> Self {
        self.cursor = None;
        self
    }

    /// Sets a configurable delay for all async operations
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use shotpipe::capture::MockBackend;
    ///
    /// let backend = MockBackend::new().with_delay(Duration::from_millis(100));
    /// ```
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Injects an error returned by every capture call
    pub fn with_error(mut self, error: CaptureError) -> Self {
        self.error_injection = Some(error);
        self
    }

    /// Captures bitmaps at `scale` times the display size, like a HiDPI
    /// screen would
    pub fn with_scale_factor(mut self, scale: f32) -> Self {
        self.scale_factor = scale;
        self
    }

    /// Number of capture calls served so far, including failed ones
    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    /// Creates the default display layout
    fn create_mock_displays() -> Vec<Display> {
        vec![
            Display::new(0, Bounds::new(0, 0, 2560, 1440), true),
            Display::new(1, Bounds::new(2560, 0, 1920, 1080), false),
        ]
    }

    /// Applies configured delay if set
    async fn apply_delay(&self) {
        if let Some(duration) = self.delay {
            sleep(duration).await;
        }
    }

    /// Checks if an error should be injected
    fn check_error_injection(&self) -> CaptureResult<()> {
        if let Some(ref error) = self.error_injection {
            // Clone the error for return
            return Err(match error {
                CaptureError::DisplayNotFound { display_id } => CaptureError::DisplayNotFound {
                    display_id: *display_id,
                },
                CaptureError::NoDisplays => CaptureError::NoDisplays,
                CaptureError::DisplayEnumeration { reason } => CaptureError::DisplayEnumeration {
                    reason: reason.clone(),
                },
                CaptureError::CaptureFailed { display_id, reason } => CaptureError::CaptureFailed {
                    display_id: *display_id,
                    reason:     reason.clone(),
                },
                CaptureError::CaptureTimeout { duration_ms } => CaptureError::CaptureTimeout {
                    duration_ms: *duration_ms,
                },
                CaptureError::InvalidParameter { parameter, reason } => {
                    CaptureError::InvalidParameter {
                        parameter: parameter.clone(),
                        reason:    reason.clone(),
                    }
                }
                CaptureError::EncodingFailed { format, reason } => CaptureError::EncodingFailed {
                    format: format.clone(),
                    reason: reason.clone(),
                },
                CaptureError::ImageError(msg) => CaptureError::ImageError(msg.clone()),
                CaptureError::SelectorBusy => CaptureError::SelectorBusy,
                CaptureError::SurfaceUnavailable { reason } => CaptureError::SurfaceUnavailable {
                    reason: reason.clone(),
                },
                CaptureError::IoError(e) => {
                    CaptureError::IoError(std::io::Error::new(e.kind(), e.to_string()))
                }
            });
        }
        Ok(())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameSource for MockBackend {
    async fn displays(&self) -> CaptureResult<Vec<Display>> {
        self.apply_delay().await;
        Ok(self.displays.clone())
    }

    async fn cursor_position(&self) -> CaptureResult<Option<Point>> {
        Ok(self.cursor)
    }

    async fn capture_display(&self, display: &Display) -> CaptureResult<ImageBuffer> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        self.apply_delay().await;
        self.check_error_injection()?;

        if !self.displays.iter().any(|d| d.id == display.id) {
            return Err(CaptureError::DisplayNotFound {
                display_id: display.id,
            });
        }

        let width = ((display.bounds.width as f32) * self.scale_factor).round().max(1.0) as u32;
        let height = ((display.bounds.height as f32) * self.scale_factor).round().max(1.0) as u32;

        Ok(ImageBuffer::from_test_pattern(width, height))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn test_new_creates_default_layout() {
        let backend = MockBackend::new();
        let displays = backend.displays().await.unwrap();

        assert_eq!(displays.len(), 2);
        assert!(displays[0].is_primary);
        assert_eq!(displays[1].bounds.x, 2560);
    }

    #[tokio::test]
    async fn test_capture_matches_display_size() {
        let backend = MockBackend::new();
        let displays = backend.displays().await.unwrap();

        let image = backend.capture_display(&displays[1]).await.unwrap();
        assert_eq!(image.dimensions(), (1920, 1080));
        assert_eq!(backend.capture_count(), 1);
    }

    #[tokio::test]
    async fn test_scale_factor_enlarges_capture() {
        let display = Display::new(5, Bounds::new(0, 0, 300, 200), true);
        let backend = MockBackend::new()
            .with_displays(vec![display.clone()])
            .with_scale_factor(1.5);

        let image = backend.capture_display(&display).await.unwrap();
        assert_eq!(image.dimensions(), (450, 300));
    }

    #[tokio::test]
    async fn test_capture_unknown_display() {
        let backend = MockBackend::new();
        let ghost = Display::new(9, Bounds::new(0, 0, 10, 10), false);

        let result = backend.capture_display(&ghost).await;
        assert!(matches!(result, Err(CaptureError::DisplayNotFound { display_id: 9 })));
    }

    #[tokio::test]
    async fn test_with_delay() {
        let backend = MockBackend::new().with_delay(Duration::from_millis(50));

        let start = Instant::now();
        backend.displays().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_error_injection_only_affects_capture() {
        let backend = MockBackend::new().with_error(CaptureError::CaptureFailed {
            display_id: 0,
            reason:     "compositor went away".to_string(),
        });

        let displays = backend.displays().await.unwrap();
        let result = backend.capture_display(&displays[0]).await;

        match result {
            Err(CaptureError::CaptureFailed { reason, .. }) => {
                assert_eq!(reason, "compositor went away");
            }
            other => panic!("Expected CaptureFailed, got {:?}", other),
        }
        assert_eq!(backend.capture_count(), 1);
    }

    #[tokio::test]
    async fn test_cursor_configuration() {
        let backend = MockBackend::new().with_cursor(Point::new(3000.0, 10.0));
        assert_eq!(backend.cursor_position().await.unwrap(), Some(Point::new(3000.0, 10.0)));

        let backend = MockBackend::new().without_cursor();
        assert_eq!(backend.cursor_position().await.unwrap(), None);
    }
}
