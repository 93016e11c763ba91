//! Cropping a frame down to a finished selection

use super::Frame;
use crate::model::SelectionRect;

/// Crops a frame to a selection rectangle
///
/// The rectangle is rounded to whole pixels. When it cannot be applied
/// (negative origin, empty, or outside the frame) a warning is logged and the
/// original frame is returned unchanged; this never fails outward.
///
/// # Examples
///
/// ```
/// use shotpipe::{
///     capture::{crop_frame, Frame, ImageBuffer},
///     model::{Bounds, Display, SelectionRect},
/// };
///
/// let display = Display::new(0, Bounds::new(0, 0, 200, 100), true);
/// let frame = Frame::new(ImageBuffer::from_test_pattern(200, 100), display);
///
/// let rect = SelectionRect { x: 10.4, y: 20.0, width: 50.0, height: 30.6 };
/// let cropped = crop_frame(&frame, &rect);
/// assert_eq!((cropped.width(), cropped.height()), (50, 31));
/// ```
pub fn crop_frame(frame: &Frame, rect: &SelectionRect) -> Frame {
    let Some(region) = rect.to_region() else {
        tracing::warn!(?rect, "Selection cannot be rounded to a pixel region, keeping full frame");
        return frame.clone();
    };

    match frame.image().crop(region) {
        Ok(image) => {
            tracing::debug!(?region, "Cropped frame to selection");
            Frame::new(image, frame.display().clone())
        }
        Err(e) => {
            tracing::warn!("Crop failed, keeping full frame: {}", e);
            frame.clone()
        }
    }
}
