//! Image buffer wrapper for captured frames
//!
//! This module provides an `ImageBuffer` wrapper around `image::DynamicImage`
//! with the few transformations the pipeline needs: resizing a backend bitmap
//! to display bounds and cropping to a selection.
//!
//! # Examples
//!
//! ```
//! use shotpipe::{capture::ImageBuffer, model::Region};
//!
//! let img = ImageBuffer::from_test_pattern(1920, 1080);
//!
//! // HiDPI bitmaps are brought back to logical display size
//! let resized = img.resize_exact(960, 540);
//! assert_eq!(resized.dimensions(), (960, 540));
//!
//! let cropped = resized.crop(Region::new(100, 100, 800, 400)).unwrap();
//! assert_eq!(cropped.dimensions(), (800, 400));
//! ```

use image::GenericImageView;

use crate::{
    error::{CaptureError, CaptureResult},
    model::Region,
};

/// Wrapper around `image::DynamicImage` with transformation methods
///
/// All transformation methods return new `ImageBuffer` instances, leaving
/// the original unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    inner: image::DynamicImage,
}

impl ImageBuffer {
    /// Creates a new ImageBuffer from a DynamicImage
    pub fn new(image: image::DynamicImage) -> Self {
        Self { inner: image }
    }

    /// Creates a new ImageBuffer from an RGBA8 bitmap
    pub fn from_rgba(image: image::RgbaImage) -> Self {
        Self::new(image::DynamicImage::ImageRgba8(image))
    }

    /// Resizes the image to exactly the given dimensions
    ///
    /// Uses Triangle filtering, which is fast enough for full-display
    /// bitmaps. Returns a clone when the dimensions already match.
    pub fn resize_exact(&self, width: u32, height: u32) -> Self {
        if self.dimensions() == (width, height) {
            return self.clone();
        }

        let resized = self.inner.resize_exact(
            width.max(1),
            height.max(1),
            image::imageops::FilterType::Triangle,
        );
        Self::new(resized)
    }

    /// Crops the image to the specified region
    ///
    /// The region must be non-empty and within the image bounds, otherwise an
    /// error is returned.
    pub fn crop(&self, region: Region) -> CaptureResult<Self> {
        let (img_width, img_height) = self.dimensions();

        if region.width == 0 || region.height == 0 {
            return Err(CaptureError::InvalidParameter {
                parameter: "region".to_string(),
                reason:    format!("Region {}x{} is empty", region.width, region.height),
            });
        }

        if region.x >= img_width || region.y >= img_height {
            return Err(CaptureError::InvalidParameter {
                parameter: "region".to_string(),
                reason:    format!(
                    "Region origin ({}, {}) is outside image bounds ({}x{})",
                    region.x, region.y, img_width, img_height
                ),
            });
        }

        let right = region.x as u64 + region.width as u64;
        let bottom = region.y as u64 + region.height as u64;
        if right > img_width as u64 || bottom > img_height as u64 {
            return Err(CaptureError::InvalidParameter {
                parameter: "region".to_string(),
                reason:    format!(
                    "Region ({}x{} at {},{}) extends beyond image bounds ({}x{})",
                    region.width, region.height, region.x, region.y, img_width, img_height
                ),
            });
        }

        let cropped = self.inner.crop_imm(region.x, region.y, region.width, region.height);

        Ok(Self::new(cropped))
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Returns the image width in pixels
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Returns the image height in pixels
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Converts the image to RGBA8 format
    pub fn to_rgba8(&self) -> image::RgbaImage {
        self.inner.to_rgba8()
    }

    /// Returns a reference to the raw pixel data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Creates a test pattern image with the specified dimensions
    ///
    /// A vertical gradient from blue (top) to cyan (bottom), useful without a
    /// real capture backend.
    ///
    /// # Examples
    ///
    /// ```
    /// use shotpipe::capture::ImageBuffer;
    ///
    /// let img = ImageBuffer::from_test_pattern(1920, 1080);
    /// assert_eq!(img.dimensions(), (1920, 1080));
    /// ```
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        use image::{ImageBuffer as ImgBuf, Rgba};

        let start_color = Rgba([0u8, 0u8, 255u8, 255u8]); // Blue
        let end_color = Rgba([0u8, 255u8, 255u8, 255u8]); // Cyan

        let img = ImgBuf::from_fn(width, height, |_x, y| {
            let ratio = y as f32 / height.max(1) as f32;
            Rgba([
                (start_color[0] as f32 * (1.0 - ratio) + end_color[0] as f32 * ratio) as u8,
                (start_color[1] as f32 * (1.0 - ratio) + end_color[1] as f32 * ratio) as u8,
                (start_color[2] as f32 * (1.0 - ratio) + end_color[2] as f32 * ratio) as u8,
                255,
            ])
        });

        Self::from_rgba(img)
    }

    /// Returns a reference to the inner DynamicImage
    pub fn inner(&self) -> &image::DynamicImage {
        &self.inner
    }

    /// Consumes self and returns the inner DynamicImage
    pub fn into_inner(self) -> image::DynamicImage {
        self.inner
    }
}
