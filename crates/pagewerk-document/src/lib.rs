// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewerk-document — Document transformation and recompression.
//
// Provides a page-arena document model, page geometry (resize, crop, DPI,
// N-up), blank-page detection, raster recompression, and size- or
// outline-bounded splitting. Algorithms talk to PDF libraries only through the
// traits in `backend`; `pdf` implements them with lopdf, and `render` adds an
// optional pdfium renderer.

pub mod backend;
pub mod blank;
pub mod compress;
pub mod engine;
pub mod geometry;
pub mod model;
pub mod pages;
pub mod pdf;
pub mod progress;
pub mod raster;
pub mod render;
pub mod split;

#[cfg(test)]
mod test_support;

// Re-export the primary types so callers can use `pagewerk_document::Engine` etc.
pub use backend::{Encoder, Loader, OutlineReader, Renderer, WriteOptions, Writer};
pub use blank::{BlankPageDetector, BlankRemoval};
pub use compress::{Compressed, Compressor};
pub use engine::Engine;
pub use model::{Document, Page};
pub use pdf::LopdfBackend;
pub use progress::{NoProgress, Progress, ProgressSink};
pub use raster::{ImageCodec, RasterImage};
pub use split::{OutlineSplitter, SizeSplitter, SizedPart};

#[cfg(feature = "pdfium")]
pub use render::PdfiumRenderer;
