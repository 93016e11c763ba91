//! Data models and type definitions for shotpipe
//!
//! This module defines the core types used throughout the pipeline:
//! - Display geometry and pointer positions
//! - Selection rectangles and their integer pixel regions
//! - Capture modes and trigger actions
//! - Capture artifacts and delivery outcomes

use std::{fmt, path::PathBuf, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Platform identifier of a display
pub type DisplayId = u32;

/// Rectangle in global screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Bounds {
    /// Left edge
    pub x:      i32,
    /// Top edge
    pub y:      i32,
    /// Width in pixels
    pub width:  u32,
    /// Height in pixels
    pub height: u32,
}

impl Bounds {
    /// Creates a new Bounds
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the point lies inside these bounds (right and bottom
    /// edges excluded)
    pub fn contains(&self, point: Point) -> bool {
        let right = self.x as f64 + self.width as f64;
        let bottom = self.y as f64 + self.height as f64;
        point.x >= self.x as f64 && point.x < right && point.y >= self.y as f64 && point.y < bottom
    }

    /// Squared distance from the point to the closest point of these bounds
    ///
    /// Zero when the point is inside.
    pub fn distance_sq(&self, point: Point) -> f64 {
        let left = self.x as f64;
        let top = self.y as f64;
        let right = left + self.width as f64;
        let bottom = top + self.height as f64;

        let dx = if point.x < left {
            left - point.x
        } else if point.x > right {
            point.x - right
        } else {
            0.0
        };
        let dy = if point.y < top {
            top - point.y
        } else if point.y > bottom {
            point.y - bottom
        } else {
            0.0
        };

        dx * dx + dy * dy
    }
}

/// A physical display as seen at trigger time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Display {
    /// Platform display identifier
    pub id:         DisplayId,
    /// Bounding rectangle in global screen coordinates
    pub bounds:     Bounds,
    /// Whether the platform reports this as the primary display
    pub is_primary: bool,
}

impl Display {
    /// Creates a new Display snapshot
    pub fn new(id: DisplayId, bounds: Bounds, is_primary: bool) -> Self {
        Self {
            id,
            bounds,
            is_primary,
        }
    }
}

/// A pointer position
///
/// Global screen coordinates when used for display resolution, frame-local
/// pixel coordinates inside a selection session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Creates a new Point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Selection rectangle in frame-local pixel coordinates
///
/// Width and height are never negative: they are built as the absolute
/// difference between the anchor and the current pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionRect {
    /// Left edge
    pub x:      f64,
    /// Top edge
    pub y:      f64,
    /// Width (>= 0)
    pub width:  f64,
    /// Height (>= 0)
    pub height: f64,
}

impl SelectionRect {
    /// Selections must be strictly larger than this in both dimensions
    pub const MIN_SIZE: f64 = 10.0;

    /// Builds the axis-aligned bounding box of two points
    ///
    /// # Examples
    ///
    /// ```
    /// use shotpipe::model::{Point, SelectionRect};
    ///
    /// // Dragging up-left still yields a positive size
    /// let rect = SelectionRect::from_points(Point::new(100.0, 80.0), Point::new(40.0, 20.0));
    /// assert_eq!(rect, SelectionRect { x: 40.0, y: 20.0, width: 60.0, height: 60.0 });
    /// ```
    pub fn from_points(anchor: Point, current: Point) -> Self {
        Self {
            x:      anchor.x.min(current.x),
            y:      anchor.y.min(current.y),
            width:  (current.x - anchor.x).abs(),
            height: (current.y - anchor.y).abs(),
        }
    }

    /// Zero-sized rectangle at a point
    pub fn zero_at(point: Point) -> Self {
        Self::from_points(point, point)
    }

    /// Returns true if this rectangle is large enough to count as a selection
    pub fn is_selection(&self) -> bool {
        self.width > Self::MIN_SIZE && self.height > Self::MIN_SIZE
    }

    /// Rounds every component to the nearest integer pixel
    ///
    /// Returns `None` when the rounded rectangle starts at a negative
    /// coordinate or is empty.
    pub fn to_region(&self) -> Option<Region> {
        let x = self.x.round();
        let y = self.y.round();
        let width = self.width.round();
        let height = self.height.round();

        if x < 0.0 || y < 0.0 || width < 1.0 || height < 1.0 {
            return None;
        }
        if [x, y, width, height].iter().any(|v| *v > u32::MAX as f64) {
            return None;
        }

        Some(Region::new(x as u32, y as u32, width as u32, height as u32))
    }
}

/// Integer pixel rectangle inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Region {
    /// Left edge
    pub x:      u32,
    /// Top edge
    pub y:      u32,
    /// Width in pixels
    pub width:  u32,
    /// Height in pixels
    pub height: u32,
}

impl Region {
    /// Creates a new Region
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// What a capture is for; drives overlay captions and post-processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMode {
    /// Plain screenshot
    Screenshot,
    /// Screenshot handed to an image editor before delivery
    ScreenshotWithEditor,
    /// Screen recording
    Video,
}

impl CaptureMode {
    /// Returns the mode tag used in settings and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Screenshot => "screenshot",
            CaptureMode::ScreenshotWithEditor => "screenshotWithEditor",
            CaptureMode::Video => "video",
        }
    }

    /// Instructional caption shown at the top of the selection overlay
    pub fn caption(&self) -> &'static str {
        match self {
            CaptureMode::Video => "Select area to record",
            CaptureMode::Screenshot | CaptureMode::ScreenshotWithEditor => "Select area to capture",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The six trigger actions exposed to hotkeys, the tray and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CaptureAction {
    /// Select a region, then deliver a screenshot
    #[serde(rename = "screenshotWithSelection")]
    RegionScreenshot,
    /// Select a region, edit, then deliver
    #[serde(rename = "screenshotWithEditor")]
    RegionScreenshotWithEditor,
    /// Select a region to record
    #[serde(rename = "videoWithSelection")]
    RegionVideo,
    /// Deliver the whole active display
    #[serde(rename = "fullscreenScreenshot")]
    FullscreenScreenshot,
    /// Edit the whole active display, then deliver
    #[serde(rename = "fullscreenWithEditor")]
    FullscreenScreenshotWithEditor,
    /// Record the whole active display
    #[serde(rename = "fullscreenVideo")]
    FullscreenVideo,
}

impl CaptureAction {
    /// Every action, in settings order
    pub const ALL: [CaptureAction; 6] = [
        CaptureAction::RegionScreenshot,
        CaptureAction::RegionScreenshotWithEditor,
        CaptureAction::RegionVideo,
        CaptureAction::FullscreenScreenshot,
        CaptureAction::FullscreenScreenshotWithEditor,
        CaptureAction::FullscreenVideo,
    ];

    /// Returns the action name used in shortcut settings
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureAction::RegionScreenshot => "screenshotWithSelection",
            CaptureAction::RegionScreenshotWithEditor => "screenshotWithEditor",
            CaptureAction::RegionVideo => "videoWithSelection",
            CaptureAction::FullscreenScreenshot => "fullscreenScreenshot",
            CaptureAction::FullscreenScreenshotWithEditor => "fullscreenWithEditor",
            CaptureAction::FullscreenVideo => "fullscreenVideo",
        }
    }

    /// Capture mode this action runs in
    pub fn mode(&self) -> CaptureMode {
        match self {
            CaptureAction::RegionScreenshot | CaptureAction::FullscreenScreenshot => {
                CaptureMode::Screenshot
            }
            CaptureAction::RegionScreenshotWithEditor
            | CaptureAction::FullscreenScreenshotWithEditor => CaptureMode::ScreenshotWithEditor,
            CaptureAction::RegionVideo | CaptureAction::FullscreenVideo => CaptureMode::Video,
        }
    }

    /// Whether this action opens the region selector
    pub fn uses_selection(&self) -> bool {
        matches!(
            self,
            CaptureAction::RegionScreenshot
                | CaptureAction::RegionScreenshotWithEditor
                | CaptureAction::RegionVideo
        )
    }
}

impl fmt::Display for CaptureAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptureAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaptureAction::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = CaptureAction::ALL.iter().map(|a| a.as_str()).collect();
                format!("unknown capture action '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// A finished capture ready for delivery
///
/// Created once per successful capture and consumed by one delivery cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    /// Encoded image bytes
    pub bytes:    Vec<u8>,
    /// Generated filename, e.g. `screenshot_2025-08-07_14-30-52.png`
    pub filename: String,
    /// Image width in pixels
    pub width:    u32,
    /// Image height in pixels
    pub height:   u32,
}

/// Which artifact a delivery cycle ended up producing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryStatus {
    /// The FTP upload succeeded; the final location is its URL
    Uploaded,
    /// Only the local save succeeded
    SavedLocally,
    /// Neither step produced a location
    Completed,
}

/// A notification shown to the user at the end of a delivery cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification title
    pub title: String,
    /// Notification body
    pub body:  String,
}

/// Result of one delivery cycle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    /// Where the local copy was written, if it was
    pub local_path:     Option<PathBuf>,
    /// Shareable URL of the uploaded copy, if the upload succeeded
    pub remote_url:     Option<String>,
    /// The single location representing this capture
    pub final_location: Option<String>,
}

impl DeliveryOutcome {
    /// Title used for every delivery notification
    pub const NOTIFICATION_TITLE: &'static str = "Screenshot";

    /// Records a successful local save as the final location
    pub fn record_local(&mut self, path: PathBuf) {
        self.final_location = Some(path.display().to_string());
        self.local_path = Some(path);
    }

    /// Records a successful upload, overriding any local final location
    pub fn record_remote(&mut self, url: String) {
        self.final_location = Some(url.clone());
        self.remote_url = Some(url);
    }

    /// Returns true if any step produced a location
    pub fn succeeded(&self) -> bool {
        self.final_location.is_some()
    }

    /// Classifies this outcome for notification purposes
    pub fn status(&self) -> DeliveryStatus {
        if self.remote_url.is_some() {
            DeliveryStatus::Uploaded
        } else if self.local_path.is_some() {
            DeliveryStatus::SavedLocally
        } else {
            DeliveryStatus::Completed
        }
    }

    /// Builds the notification describing this outcome
    pub fn notification(&self) -> Notification {
        let body = match self.status() {
            DeliveryStatus::Uploaded => "Screenshot uploaded and URL copied to clipboard",
            DeliveryStatus::SavedLocally => "Screenshot saved to local folder",
            DeliveryStatus::Completed => "Screenshot capture completed",
        };
        Notification {
            title: Self::NOTIFICATION_TITLE.to_string(),
            body:  body.to_string(),
        }
    }
}
