//! Cross-platform capture backend using xcap
//!
//! xcap talks to the platform capture APIs synchronously, so every call runs
//! on the blocking pool and captures are bounded by [`CAPTURE_TIMEOUT_MS`].
//!
//! xcap cannot report the cursor position, so the pointer is queried from
//! the platform directly: `QueryPointer` on the X11 root window (x11rb) or
//! `GetCursorPos` on Windows. When the query fails (no X server, Wayland
//! without XWayland, macOS) the position is reported as unknown and
//! [`super::FrameAcquirer`] falls back to the primary display.

use async_trait::async_trait;

use super::{FrameSource, ImageBuffer};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{Bounds, Display, DisplayId, Point},
};

/// Timeout for a single display capture (2s)
///
/// Large (4K, 8K) displays and compositors with effects can take several
/// hundred milliseconds.
const CAPTURE_TIMEOUT_MS: u64 = 2000;

/// Screen capture backend over `xcap::Monitor`
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapBackend;

impl XcapBackend {
    /// Creates a new XcapBackend
    pub fn new() -> Self {
        Self
    }

    fn enumerate() -> CaptureResult<Vec<Display>> {
        let monitors = xcap::Monitor::all().map_err(|e| {
            tracing::error!("xcap failed to enumerate monitors: {}", e);
            CaptureError::DisplayEnumeration {
                reason: e.to_string(),
            }
        })?;

        monitors.iter().map(Self::describe).collect()
    }

    fn describe(monitor: &xcap::Monitor) -> CaptureResult<Display> {
        let read = |e: xcap::XCapError| CaptureError::DisplayEnumeration {
            reason: e.to_string(),
        };

        let bounds = Bounds::new(
            monitor.x().map_err(read)?,
            monitor.y().map_err(read)?,
            monitor.width().map_err(read)?,
            monitor.height().map_err(read)?,
        );
        Ok(Display::new(monitor.id().map_err(read)?, bounds, monitor.is_primary().map_err(read)?))
    }

    fn capture_blocking(display_id: DisplayId) -> CaptureResult<ImageBuffer> {
        let monitors = xcap::Monitor::all().map_err(|e| CaptureError::DisplayEnumeration {
            reason: e.to_string(),
        })?;

        let monitor = monitors
            .into_iter()
            .find(|m| m.id().is_ok_and(|id| id == display_id))
            .ok_or(CaptureError::DisplayNotFound { display_id })?;

        let image = monitor.capture_image().map_err(|e| {
            tracing::error!("xcap capture failed for display {}: {}", display_id, e);
            Self::map_xcap_error(display_id, e)
        })?;

        Ok(ImageBuffer::from_rgba(image))
    }

    fn cursor_blocking() -> Option<Point> {
        match query_pointer() {
            Ok(point) => {
                tracing::trace!("Pointer at ({}, {})", point.x, point.y);
                Some(point)
            }
            Err(reason) => {
                tracing::debug!("Pointer query failed: {}", reason);
                None
            }
        }
    }

    /// Maps xcap errors to CaptureError, logging a hint for common failures
    fn map_xcap_error(display_id: DisplayId, e: xcap::XCapError) -> CaptureError {
        let reason = e.to_string();
        let lowered = reason.to_lowercase();

        if lowered.contains("permission") || lowered.contains("access denied") {
            tracing::warn!("xcap permission denied - grant screen recording access");
        } else if lowered.contains("display") || lowered.contains("connection") {
            tracing::warn!("xcap failed to reach the display server - verify DISPLAY/WAYLAND_DISPLAY");
        }

        CaptureError::CaptureFailed { display_id, reason }
    }
}

/// Queries the pointer position in global (root window) coordinates
#[cfg(target_os = "linux")]
fn query_pointer() -> Result<Point, String> {
    use x11rb::{connection::Connection as _, protocol::xproto::ConnectionExt as _};

    let (conn, screen_num) = x11rb::connect(None).map_err(|e| e.to_string())?;
    let root = conn
        .setup()
        .roots
        .get(screen_num)
        .ok_or_else(|| format!("X11 screen {} not found", screen_num))?
        .root;

    let reply = conn
        .query_pointer(root)
        .map_err(|e| e.to_string())?
        .reply()
        .map_err(|e| e.to_string())?;

    Ok(Point::new(f64::from(reply.root_x), f64::from(reply.root_y)))
}

/// Queries the pointer position in virtual-screen coordinates
#[cfg(target_os = "windows")]
fn query_pointer() -> Result<Point, String> {
    use windows_sys::Win32::{Foundation::POINT, UI::WindowsAndMessaging::GetCursorPos};

    let mut point = POINT { x: 0, y: 0 };
    // SAFETY: GetCursorPos only writes to the POINT it is given.
    if unsafe { GetCursorPos(&mut point) } == 0 {
        return Err("GetCursorPos failed".to_string());
    }
    Ok(Point::new(f64::from(point.x), f64::from(point.y)))
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn query_pointer() -> Result<Point, String> {
    Err("pointer query is not available on this platform".to_string())
}

#[async_trait]
impl FrameSource for XcapBackend {
    async fn displays(&self) -> CaptureResult<Vec<Display>> {
        tokio::task::spawn_blocking(Self::enumerate)
            .await
            .map_err(|e| CaptureError::DisplayEnumeration {
                reason: format!("enumeration task failed: {}", e),
            })?
    }

    async fn cursor_position(&self) -> CaptureResult<Option<Point>> {
        match tokio::task::spawn_blocking(Self::cursor_blocking).await {
            Ok(point) => Ok(point),
            Err(e) => {
                tracing::debug!("Pointer query task failed: {}", e);
                Ok(None)
            }
        }
    }

    async fn capture_display(&self, display: &Display) -> CaptureResult<ImageBuffer> {
        let display_id = display.id;
        let task = tokio::task::spawn_blocking(move || Self::capture_blocking(display_id));

        match tokio::time::timeout(std::time::Duration::from_millis(CAPTURE_TIMEOUT_MS), task).await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(CaptureError::CaptureFailed {
                display_id,
                reason: format!("capture task failed: {}", e),
            }),
            Err(_) => {
                tracing::warn!("Capture of display {} exceeded {}ms", display_id, CAPTURE_TIMEOUT_MS);
                Err(CaptureError::CaptureTimeout {
                    duration_ms: CAPTURE_TIMEOUT_MS,
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "xcap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cursor_position_never_errors() {
        // Headless hosts report an unknown position rather than an error
        let cursor = XcapBackend::new().cursor_position().await;
        assert!(cursor.is_ok());
    }
}
