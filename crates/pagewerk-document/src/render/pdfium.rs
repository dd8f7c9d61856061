// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfium renderer — rasterises model pages by serialising them to a one-page
// PDF and handing that to pdfium.

use pagewerk_core::Rotation;
use pagewerk_core::error::{PagewerkError, Result};
use pdfium_render::prelude::*;
use tracing::{debug, instrument};

use crate::backend::{Renderer, WriteOptions, Writer};
use crate::model::Document;
use crate::pdf::LopdfBackend;
use crate::raster::RasterImage;

/// [`Renderer`] backed by the pdfium library.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl std::fmt::Debug for PdfiumRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumRenderer").finish_non_exhaustive()
    }
}

impl PdfiumRenderer {
    pub fn new(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    /// Bind to the pdfium shared library installed on the system.
    pub fn from_system_library() -> Result<Self> {
        let bindings = Pdfium::bind_to_system_library().map_err(|err| {
            PagewerkError::RenderFailure {
                page: 0,
                detail: format!("cannot bind pdfium: {:?}", err),
            }
        })?;
        Ok(Self::new(Pdfium::new(bindings)))
    }
}

impl Renderer for PdfiumRenderer {
    #[instrument(skip(self, document), fields(pages = document.page_count()))]
    fn render(&self, document: &Document, page_index: usize, scale: f64) -> Result<RasterImage> {
        let failure = |detail: String| PagewerkError::RenderFailure {
            page: page_index,
            detail,
        };

        // Rendering happens in unrotated page space.
        let single = document
            .materialize(&[page_index])?
            .map_pages(|page| page.rotation = Rotation::Deg0);
        let bytes = LopdfBackend::new().serialize(&single, WriteOptions::default())?;

        let pdf = self
            .pdfium
            .load_pdf_from_byte_slice(&bytes, None)
            .map_err(|err| failure(format!("pdfium rejected page: {:?}", err)))?;
        let page = pdf
            .pages()
            .get(0)
            .map_err(|err| failure(format!("{:?}", err)))?;

        let config = PdfRenderConfig::new()
            .scale_page_by_factor(scale as f32)
            .render_form_data(true);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|err| failure(format!("{:?}", err)))?;

        let image = bitmap.as_image();
        debug!(
            page = page_index + 1,
            width = image.width(),
            height = image.height(),
            "Page rendered"
        );
        Ok(RasterImage::from_dynamic(image))
    }
}
