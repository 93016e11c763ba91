//! Display resolution and frame acquisition
//!
//! This module provides the capture side of the pipeline:
//!
//! - [`FrameSource`]: trait implemented by platform backends
//! - [`display_nearest_point`]: picks the display a cursor is on
//! - [`FrameAcquirer`]: validates the display and produces a [`Frame`]
//! - [`crop_frame`]: cuts a selection out of a frame, never failing outward
//!
//! Backends: [`MockBackend`] for tests and headless runs, and `XcapBackend`
//! (feature `xcap-backend`) for real screens.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::{CaptureError, CaptureResult},
    model::{Display, Point},
};

pub mod crop;
pub mod image_buffer;
pub mod mock;

#[cfg(feature = "xcap-backend")]
pub mod xcap_backend;

pub use crop::crop_frame;
pub use image_buffer::ImageBuffer;
pub use mock::MockBackend;
#[cfg(feature = "xcap-backend")]
pub use xcap_backend::XcapBackend;

/// Core trait for screen capture backends
///
/// All implementations must be thread-safe (`Send + Sync`) so a backend can
/// be shared between trigger actions.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Lists the active displays in platform order
    ///
    /// # Errors
    ///
    /// - [`CaptureError::DisplayEnumeration`] - The platform query failed
    async fn displays(&self) -> CaptureResult<Vec<Display>>;

    /// Returns the global cursor position, or `None` if the backend cannot
    /// query it
    async fn cursor_position(&self) -> CaptureResult<Option<Point>>;

    /// Captures the full contents of a display
    ///
    /// The returned bitmap may be larger than the display bounds on scaled
    /// (HiDPI) displays; [`FrameAcquirer`] normalizes it.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::DisplayNotFound`] - The display disappeared
    /// - [`CaptureError::CaptureFailed`] - The platform capture call failed
    /// - [`CaptureError::CaptureTimeout`] - The capture took too long
    async fn capture_display(&self, display: &Display) -> CaptureResult<ImageBuffer>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// A captured bitmap tied to the display it came from
///
/// Frames are never mutated; cropping produces a new frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image:   ImageBuffer,
    display: Display,
}

impl Frame {
    /// Creates a new Frame
    pub fn new(image: ImageBuffer, display: Display) -> Self {
        Self { image, display }
    }

    /// The frame's pixels
    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    /// The display this frame was taken from
    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Finds the display a point is on, or the closest one
///
/// Displays containing the point win; otherwise the display with the
/// smallest distance to the point is chosen. Ties keep enumeration order.
///
/// # Examples
///
/// ```
/// use shotpipe::{
///     capture::display_nearest_point,
///     model::{Bounds, Display, Point},
/// };
///
/// let displays = vec![
///     Display::new(0, Bounds::new(0, 0, 1920, 1080), true),
///     Display::new(1, Bounds::new(1920, 0, 1280, 1024), false),
/// ];
///
/// let active = display_nearest_point(&displays, Point::new(2000.0, 500.0)).unwrap();
/// assert_eq!(active.id, 1);
/// ```
pub fn display_nearest_point(displays: &[Display], point: Point) -> Option<&Display> {
    if let Some(containing) = displays.iter().find(|d| d.bounds.contains(point)) {
        return Some(containing);
    }

    displays.iter().fold(None, |best: Option<&Display>, display| match best {
        Some(current) if current.bounds.distance_sq(point) <= display.bounds.distance_sq(point) => {
            Some(current)
        }
        _ => Some(display),
    })
}

/// Returns the primary display, or the first one if none is flagged
pub fn primary_display(displays: &[Display]) -> Option<&Display> {
    displays.iter().find(|d| d.is_primary).or_else(|| displays.first())
}

/// Resolves the active display and acquires frames from a [`FrameSource`]
#[derive(Clone)]
pub struct FrameAcquirer {
    source: Arc<dyn FrameSource>,
}

impl FrameAcquirer {
    /// Creates an acquirer over a backend
    pub fn new(source: Arc<dyn FrameSource>) -> Self {
        Self { source }
    }

    /// The underlying backend
    pub fn source(&self) -> &Arc<dyn FrameSource> {
        &self.source
    }

    /// Resolves the display nearest to the cursor
    ///
    /// Falls back to the primary display when the backend cannot report the
    /// cursor position.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::NoDisplays`] - The backend lists no displays
    pub async fn active_display(&self) -> CaptureResult<Display> {
        let displays = self.source.displays().await?;
        let cursor = self.source.cursor_position().await?;

        let nearest = match cursor {
            Some(point) => display_nearest_point(&displays, point),
            None => {
                tracing::debug!("Cursor position unavailable, using primary display");
                primary_display(&displays)
            }
        };

        let active = nearest.cloned().ok_or(CaptureError::NoDisplays)?;
        tracing::debug!(display_id = active.id, cursor = ?cursor, "Resolved active display");
        Ok(active)
    }

    /// Captures a frame of the given display
    ///
    /// The display must match one of the active displays by identifier. The
    /// returned frame always has the display's dimensions.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::DisplayNotFound`] - No active display has this id
    /// - Any capture error from the backend, unchanged (no retry)
    pub async fn acquire(&self, display: &Display) -> CaptureResult<Frame> {
        let displays = self.source.displays().await?;
        let current = displays
            .into_iter()
            .find(|d| d.id == display.id)
            .ok_or(CaptureError::DisplayNotFound {
                display_id: display.id,
            })?;

        let start = std::time::Instant::now();
        let image = self.source.capture_display(&current).await?;

        let (width, height) = (current.bounds.width, current.bounds.height);
        let image = if image.dimensions() != (width, height) {
            tracing::debug!(
                "Resizing {}x{} capture to display bounds {}x{}",
                image.width(),
                image.height(),
                width,
                height
            );
            image.resize_exact(width, height)
        } else {
            image
        };

        tracing::info!(
            backend = self.source.name(),
            display_id = current.id,
            "Captured {}x{} frame in {}ms",
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(Frame::new(image, current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bounds;

    fn two_displays() -> Vec<Display> {
        vec![
            Display::new(0, Bounds::new(0, 0, 1920, 1080), true),
            Display::new(1, Bounds::new(1920, 0, 1280, 1024), false),
        ]
    }

    #[test]
    fn test_nearest_point_inside() {
        let displays = two_displays();
        let hit = display_nearest_point(&displays, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(hit.id, 0);
    }

    #[test]
    fn test_nearest_point_outside_all() {
        let displays = two_displays();
        // Below the second display
        let hit = display_nearest_point(&displays, Point::new(2500.0, 1500.0)).unwrap();
        assert_eq!(hit.id, 1);
    }

    #[test]
    fn test_nearest_point_empty() {
        assert!(display_nearest_point(&[], Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_primary_display_fallback() {
        let mut displays = two_displays();
        assert_eq!(primary_display(&displays).unwrap().id, 0);

        displays.iter_mut().for_each(|d| d.is_primary = false);
        displays.reverse();
        assert_eq!(primary_display(&displays).unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_active_display_follows_cursor() {
        let backend = MockBackend::new().with_cursor(Point::new(3000.0, 100.0));
        let acquirer = FrameAcquirer::new(Arc::new(backend));

        let display = acquirer.active_display().await.unwrap();
        assert_eq!(display.id, 1);
    }

    #[tokio::test]
    async fn test_active_display_without_cursor_uses_primary() {
        let backend = MockBackend::new().without_cursor();
        let acquirer = FrameAcquirer::new(Arc::new(backend));

        let display = acquirer.active_display().await.unwrap();
        assert!(display.is_primary);
    }

    #[tokio::test]
    async fn test_active_display_no_displays() {
        let backend = MockBackend::new().with_displays(Vec::new());
        let acquirer = FrameAcquirer::new(Arc::new(backend));

        let result = acquirer.active_display().await;
        assert!(matches!(result, Err(CaptureError::NoDisplays)));
    }

    #[tokio::test]
    async fn test_acquire_matches_display_bounds() {
        let backend = MockBackend::new().with_displays(two_displays());
        let acquirer = FrameAcquirer::new(Arc::new(backend));
        let display = acquirer.active_display().await.unwrap();

        let frame = acquirer.acquire(&display).await.unwrap();
        assert_eq!((frame.width(), frame.height()), (display.bounds.width, display.bounds.height));
        assert_eq!(frame.display(), &display);
    }

    #[tokio::test]
    async fn test_acquire_resizes_scaled_capture() {
        let small = vec![Display::new(0, Bounds::new(0, 0, 320, 200), true)];
        let backend = MockBackend::new().with_displays(small).with_scale_factor(2.0);
        let acquirer = FrameAcquirer::new(Arc::new(backend));
        let display = acquirer.active_display().await.unwrap();

        let frame = acquirer.acquire(&display).await.unwrap();
        assert_eq!((frame.width(), frame.height()), (display.bounds.width, display.bounds.height));
    }

    #[tokio::test]
    async fn test_acquire_unknown_display() {
        let backend = Arc::new(MockBackend::new());
        let acquirer = FrameAcquirer::new(backend.clone());
        let ghost = Display::new(42, Bounds::new(0, 0, 800, 600), false);

        let result = acquirer.acquire(&ghost).await;
        assert!(matches!(result, Err(CaptureError::DisplayNotFound { display_id: 42 })));
        assert_eq!(backend.capture_count(), 0);
    }
}
