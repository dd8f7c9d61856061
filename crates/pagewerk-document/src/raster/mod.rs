// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — rendered bitmaps, luminance statistics, and image encoding.

pub mod bitmap;
pub mod codec;

pub use bitmap::{CropRect, RasterImage};
pub use codec::{EncodedImage, ImageCodec, ImageFormat};
