// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Encoded images and the `image`-crate encoder.

use pagewerk_core::error::Result;
use tracing::{debug, instrument};

use super::bitmap::RasterImage;
use crate::backend::Encoder;

/// Output format for an encoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Lossy; embedded as a `/DCTDecode` stream without re-encoding.
    Jpeg,
    /// Lossless; decoded and re-embedded as Flate-compressed RGB samples.
    Png,
}

/// Encoded image bytes plus the pixel dimensions a writer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
}

/// [`Encoder`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    pub fn new() -> Self {
        Self
    }
}

/// Map a 0.0–1.0 quality factor to the 1–100 scale JPEG encoders use.
pub(crate) fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

impl Encoder for ImageCodec {
    #[instrument(skip(self, raster), fields(width = raster.width(), height = raster.height()))]
    fn encode(
        &self,
        raster: &RasterImage,
        format: ImageFormat,
        quality: f32,
    ) -> Result<EncodedImage> {
        let bytes = match format {
            ImageFormat::Jpeg => raster.to_jpeg_bytes(jpeg_quality(quality))?,
            ImageFormat::Png => raster.to_png_bytes()?,
        };
        debug!(?format, encoded_bytes = bytes.len(), "Raster encoded");
        Ok(EncodedImage {
            bytes,
            format,
            width_px: raster.width(),
            height_px: raster.height(),
        })
    }
}
