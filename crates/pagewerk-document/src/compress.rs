// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recompression — vector-preserving re-serialisation, or rebuilding every
// page from a lossy raster of itself.

use pagewerk_core::CompressionMode;
use pagewerk_core::error::Result;
use tracing::{debug, info, instrument};

use crate::backend::{Encoder, Renderer, WriteOptions, Writer};
use crate::model::{Document, Layer};
use crate::progress::{Progress, ProgressSink};
use crate::raster::ImageFormat;

/// Progress stays at or below this until the output has been serialised.
const RENDER_PROGRESS_CAP: u8 = 90;

/// A recompressed document and its serialised bytes.
#[derive(Debug, Clone)]
pub struct Compressed {
    pub document: Document,
    pub bytes: Vec<u8>,
}

/// Runs either compression mode against a set of collaborators.
pub struct Compressor<'a, R: ?Sized, E: ?Sized, W: ?Sized> {
    renderer: &'a R,
    encoder: &'a E,
    writer: &'a W,
}

impl<'a, R, E, W> Compressor<'a, R, E, W>
where
    R: Renderer + ?Sized,
    E: Encoder + ?Sized,
    W: Writer + ?Sized,
{
    pub fn new(renderer: &'a R, encoder: &'a E, writer: &'a W) -> Self {
        Self {
            renderer,
            encoder,
            writer,
        }
    }

    #[instrument(skip(self, document, progress), fields(pages = document.page_count()))]
    pub fn compress(
        &self,
        document: &Document,
        mode: CompressionMode,
        progress: &mut dyn ProgressSink,
    ) -> Result<Compressed> {
        let compressed = match mode {
            CompressionMode::VectorPreserving => {
                let bytes = self.writer.serialize(document, WriteOptions::optimized())?;
                Compressed {
                    document: document.clone(),
                    bytes,
                }
            }
            CompressionMode::Bitmap(preset) => {
                let total = document.page_count();
                let scale = preset.render_scale();
                let quality = preset.quality();
                let mut output = Document::new();

                for (index, page) in document.pages().iter().enumerate() {
                    let raster = self.renderer.render(document, index, scale)?;
                    let encoded = self.encoder.encode(&raster, ImageFormat::Jpeg, quality)?;
                    drop(raster);
                    debug!(
                        page = index + 1,
                        encoded_bytes = encoded.bytes.len(),
                        "Page rasterised"
                    );

                    // The output page keeps the original geometry whatever the
                    // render resolution.
                    let handle = self.encoder.embed(&mut output, encoded);
                    output.push_page(
                        page.width_pt,
                        page.height_pt,
                        page.rotation,
                        vec![Layer::full_page_image(handle, page.width_pt, page.height_pt)],
                    );
                    progress.report(Progress::capped(index + 1, total, RENDER_PROGRESS_CAP));
                }

                let bytes = self.writer.serialize(&output, WriteOptions::optimized())?;
                Compressed {
                    document: output,
                    bytes,
                }
            }
        };

        progress.report(Progress::done(document.page_count()));
        info!(?mode, output_bytes = compressed.bytes.len(), "Compression complete");
        Ok(compressed)
    }
}
