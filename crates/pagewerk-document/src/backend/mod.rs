// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend-agnostic collaborator traits.
//
// The transformation algorithms only ever talk to a document library through
// these seams. `crate::pdf::LopdfBackend` implements loading, writing, and
// outline reading; `crate::raster::ImageCodec` implements encoding; a renderer
// is supplied by the caller (see `crate::render` for the pdfium one).

use pagewerk_core::Outline;
use pagewerk_core::error::Result;

use crate::model::{Document, ImageHandle};
use crate::raster::{CropRect, EncodedImage, ImageFormat, RasterImage};

/// Parses document bytes into a [`Document`].
pub trait Loader {
    /// Fails with `PagewerkError::MalformedDocument` on unparseable input.
    fn load(&self, bytes: &[u8]) -> Result<Document>;
}

/// Rasterises pages.
///
/// Pages are rendered in unrotated page space: the raster's top-left corner is
/// the top-left of the page's media box, ignoring `/Rotate`.
pub trait Renderer {
    /// Render page `page_index` at `scale` pixels per point. The raster is
    /// `ceil(width_pt × scale)` × `ceil(height_pt × scale)` pixels.
    ///
    /// Fails with `PagewerkError::RenderFailure`.
    fn render(&self, document: &Document, page_index: usize, scale: f64) -> Result<RasterImage>;

    /// Render only `region` of the page. Backends that can clip while drawing
    /// should override this; the default renders the whole page and crops.
    fn render_region(
        &self,
        document: &Document,
        page_index: usize,
        scale: f64,
        region: CropRect,
    ) -> Result<RasterImage> {
        let full = self.render(document, page_index, scale)?;
        Ok(full.crop_points(region, scale))
    }
}

/// Options for [`Writer::serialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Deduplicate shared objects, drop unreachable ones, and compress streams.
    pub optimize_objects: bool,
}

impl WriteOptions {
    pub fn optimized() -> Self {
        Self {
            optimize_objects: true,
        }
    }
}

/// Serialises a [`Document`] to bytes.
pub trait Writer {
    fn serialize(&self, document: &Document, options: WriteOptions) -> Result<Vec<u8>>;
}

/// Encodes rasters and embeds the result in a document.
pub trait Encoder {
    /// `quality` is a 0.0–1.0 factor; lossless formats ignore it.
    fn encode(&self, raster: &RasterImage, format: ImageFormat, quality: f32)
    -> Result<EncodedImage>;

    /// Add encoded bytes to `document`'s image arena.
    fn embed(&self, document: &mut Document, image: EncodedImage) -> ImageHandle {
        document.add_image(image)
    }
}

/// Reads a document's bookmark tree.
pub trait OutlineReader {
    /// Bookmarks in document order. Empty when the document has none.
    fn outline(&self, document: &Document) -> Result<Outline>;
}

impl<T: Renderer + ?Sized> Renderer for &T {
    fn render(&self, document: &Document, page_index: usize, scale: f64) -> Result<RasterImage> {
        (**self).render(document, page_index, scale)
    }

    fn render_region(
        &self,
        document: &Document,
        page_index: usize,
        scale: f64,
        region: CropRect,
    ) -> Result<RasterImage> {
        (**self).render_region(document, page_index, scale, region)
    }
}
