//! Overlay rendering for selection sessions
//!
//! [`render`] is a pure function of a frame and a session. The surface shows
//! the resulting bitmap and draws the text fields on top of it.

use image::{Rgba, RgbaImage};

use super::{SelectionSession, SelectionState};
use crate::{
    capture::Frame,
    model::{Point, SelectionRect},
};

/// Selection border and handle colour (`#3b82f6`)
pub const ACCENT: Rgba<u8> = Rgba([0x3b, 0x82, 0xf6, 0xff]);

/// Border stroke width, centred on the rectangle edges
pub const BORDER_WIDTH: f64 = 2.0;

/// Side length of the square corner handles
pub const HANDLE_SIZE: f64 = 8.0;

/// Hint line shown under the caption
pub const HINT: &str = "Drag to select • ESC to cancel";

/// Everything a surface needs to draw one overlay frame
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    /// Dimmed frame with the undimmed selection, border and handles
    pub image:      RgbaImage,
    /// Mode-dependent caption for the top of the view
    pub caption:    &'static str,
    /// Instruction line for the top of the view
    pub hint:       &'static str,
    /// Size label near the pointer
    pub size_label: Option<SizeLabel>,
}

/// Live `W × H` label
#[derive(Debug, Clone, PartialEq)]
pub struct SizeLabel {
    /// Label text, e.g. `320 × 200`
    pub text:     String,
    /// Top-left corner of the label in view coordinates
    pub position: Point,
}

/// Renders the overlay for a session over its frame
///
/// The whole frame is dimmed by a 50% black layer. While a rectangle is
/// shown, its pixels are copied back undimmed and outlined with a 2px
/// [`ACCENT`] border and four 8x8 handles centred on the corners.
///
/// # Examples
///
/// ```
/// use shotpipe::{
///     capture::{Frame, ImageBuffer},
///     model::{Bounds, CaptureMode, Display, Point},
///     selection::{SelectionEvent, SelectionSession, render},
/// };
///
/// let display = Display::new(0, Bounds::new(0, 0, 400, 300), true);
/// let frame = Frame::new(ImageBuffer::from_test_pattern(400, 300), display);
/// let session = SelectionSession::new(CaptureMode::Video)
///     .apply(SelectionEvent::PointerDown(Point::new(50.0, 50.0)))
///     .apply(SelectionEvent::PointerMove(Point::new(170.0, 130.0)));
///
/// let view = render(&frame, &session);
/// assert_eq!(view.caption, "Select area to record");
/// assert_eq!(view.size_label.unwrap().text, "120 × 80");
/// ```
pub fn render(frame: &Frame, session: &SelectionSession) -> OverlayView {
    let source = frame.image().to_rgba8();
    let mut image = dim(&source);

    let shown = session.rect().filter(|rect| {
        session.state() == SelectionState::Dragging || (rect.width > 0.0 && rect.height > 0.0)
    });

    if let Some(rect) = shown {
        reveal(&mut image, &source, &rect);
        draw_border(&mut image, &rect);
        draw_handles(&mut image, &rect);
    }

    let size_label = match (session.rect(), session.pointer()) {
        (Some(rect), Some(pointer)) if rect.width != 0.0 || rect.height != 0.0 => {
            Some(size_label(&rect, pointer, image.width()))
        }
        _ => None,
    };

    OverlayView {
        image,
        caption: session.mode().caption(),
        hint: HINT,
        size_label,
    }
}

/// Places the size label beside the pointer, kept inside the view
pub fn size_label(rect: &SelectionRect, pointer: Point, view_width: u32) -> SizeLabel {
    let x = (pointer.x + 10.0).min(view_width as f64 - 200.0).max(10.0);
    let y = (pointer.y - 40.0).max(10.0);

    SizeLabel {
        text:     format!("{} × {}", rect.width.round(), rect.height.round()),
        position: Point::new(x, y),
    }
}

fn dim(source: &RgbaImage) -> RgbaImage {
    let mut dimmed = source.clone();
    for pixel in dimmed.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([r / 2, g / 2, b / 2, a]);
    }
    dimmed
}

/// Converts a float span to clamped pixel indices `[start, end)`
fn span(start: f64, len: f64, limit: u32) -> (u32, u32) {
    let from = start.round().clamp(0.0, limit as f64) as u32;
    let to = (start + len).round().clamp(0.0, limit as f64) as u32;
    (from, to.max(from))
}

fn fill(image: &mut RgbaImage, x: f64, y: f64, width: f64, height: f64, colour: Rgba<u8>) {
    let (x0, x1) = span(x, width, image.width());
    let (y0, y1) = span(y, height, image.height());
    for py in y0..y1 {
        for px in x0..x1 {
            image.put_pixel(px, py, colour);
        }
    }
}

fn reveal(image: &mut RgbaImage, source: &RgbaImage, rect: &SelectionRect) {
    let (x0, x1) = span(rect.x, rect.width, image.width());
    let (y0, y1) = span(rect.y, rect.height, image.height());
    for py in y0..y1 {
        for px in x0..x1 {
            image.put_pixel(px, py, *source.get_pixel(px, py));
        }
    }
}

fn draw_border(image: &mut RgbaImage, rect: &SelectionRect) {
    let half = BORDER_WIDTH / 2.0;
    let (left, top) = (rect.x - half, rect.y - half);
    let (outer_w, outer_h) = (rect.width + BORDER_WIDTH, rect.height + BORDER_WIDTH);

    fill(image, left, top, outer_w, BORDER_WIDTH, ACCENT);
    fill(image, left, rect.y + rect.height - half, outer_w, BORDER_WIDTH, ACCENT);
    fill(image, left, top, BORDER_WIDTH, outer_h, ACCENT);
    fill(image, rect.x + rect.width - half, top, BORDER_WIDTH, outer_h, ACCENT);
}

fn draw_handles(image: &mut RgbaImage, rect: &SelectionRect) {
    let half = HANDLE_SIZE / 2.0;
    let corners = [
        (rect.x, rect.y),
        (rect.x + rect.width, rect.y),
        (rect.x, rect.y + rect.height),
        (rect.x + rect.width, rect.y + rect.height),
    ];

    for (cx, cy) in corners {
        fill(image, cx - half, cy - half, HANDLE_SIZE, HANDLE_SIZE, ACCENT);
    }
}
