// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bitmaps — the pixel grids renderers produce. Cropping, luminance
// statistics, and encoding to JPEG/PNG via the `image` crate.

use image::{DynamicImage, ImageFormat as CodecFormat, Rgba, RgbaImage};
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, instrument};

/// A rectangle in page space, measured in points from the page's top-left
/// corner (x to the right, y downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A rendered page or page region.
///
/// Rasters are transient: the operation that renders one owns it and drops it
/// as soon as it has been measured or encoded.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: DynamicImage,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Decode a raster from encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| {
            PagewerkError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Raster decoded from bytes"
        );
        Ok(Self { image })
    }

    /// A raster filled with a single colour.
    pub fn uniform(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba))),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Cropping -------------------------------------------------------------

    /// Crop a rectangular pixel region. `x` and `y` are the top-left corner;
    /// values are clamped to the image bounds.
    pub fn crop(self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let img_w = self.image.width();
        let img_h = self.image.height();

        let safe_x = x.min(img_w.saturating_sub(1));
        let safe_y = y.min(img_h.saturating_sub(1));
        let safe_w = width.min(img_w - safe_x).max(1);
        let safe_h = height.min(img_h - safe_y).max(1);

        debug!(safe_x, safe_y, safe_w, safe_h, "Cropping raster");

        Self {
            image: self.image.crop_imm(safe_x, safe_y, safe_w, safe_h),
        }
    }

    /// Crop the region `rect` (in points) out of a raster rendered at `scale`
    /// pixels per point.
    pub fn crop_points(self, rect: CropRect, scale: f64) -> Self {
        let x = (rect.x * scale).round().max(0.0) as u32;
        let y = (rect.y * scale).round().max(0.0) as u32;
        let width = (rect.width * scale).round().max(1.0) as u32;
        let height = (rect.height * scale).round().max(1.0) as u32;
        self.crop(x, y, width, height)
    }

    // -- Statistics -----------------------------------------------------------

    /// Population variance of per-pixel luminance `(R + G + B) / 3`, in
    /// squared 0–255 units. Alpha is ignored.
    ///
    /// Channel sums are accumulated as integers, so a uniform raster yields
    /// exactly 0.0.
    pub fn luminance_variance(&self) -> f64 {
        let pixel_count = u128::from(self.width()) * u128::from(self.height());
        if pixel_count == 0 {
            return 0.0;
        }

        let mut sum: u128 = 0;
        let mut sum_sq: u128 = 0;
        let mut accumulate = |channel_sum: u32| {
            let s = u128::from(channel_sum);
            sum += s;
            sum_sq += s * s;
        };

        match &self.image {
            DynamicImage::ImageLuma8(gray) => {
                for pixel in gray.pixels() {
                    accumulate(u32::from(pixel.0[0]) * 3);
                }
            }
            DynamicImage::ImageRgba8(rgba) => {
                for pixel in rgba.pixels() {
                    let [r, g, b, _] = pixel.0;
                    accumulate(u32::from(r) + u32::from(g) + u32::from(b));
                }
            }
            other => {
                for pixel in other.to_rgb8().pixels() {
                    let [r, g, b] = pixel.0;
                    accumulate(u32::from(r) + u32::from(g) + u32::from(b));
                }
            }
        }

        // Var(S) = (n·ΣS² − (ΣS)²) / n², and L = S / 3.
        let numerator = pixel_count * sum_sq - sum * sum;
        numerator as f64 / (pixel_count * pixel_count) as f64 / 9.0
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, CodecFormat::Png)
            .map_err(|err| PagewerkError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode as JPEG bytes with the given quality (1-100). Alpha is dropped.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| PagewerkError::ImageError(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}
