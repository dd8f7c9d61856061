// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine — one entry point wiring the lopdf backend, the image codec, a
// renderer, and an `EngineConfig` to every transformation.

use pagewerk_core::error::Result;
use pagewerk_core::{
    CompressionMode, CropMargins, CropMode, EngineConfig, NUpLayout, Outline, PageSelection,
    PageSize,
};
use tracing::instrument;

use crate::backend::{Loader, OutlineReader, Renderer, WriteOptions, Writer};
use crate::blank::{BlankPageDetector, BlankRemoval};
use crate::compress::{Compressed, Compressor};
use crate::model::Document;
use crate::pdf::LopdfBackend;
use crate::progress::ProgressSink;
use crate::raster::ImageCodec;
use crate::split::{OutlineSplitter, SizeSplitter, SizedPart};
use crate::{blank, geometry, pages};

/// Document transformation engine.
///
/// Tunables (blank threshold, crop working scale, resize margin, baseline DPI,
/// object optimisation) come from the [`EngineConfig`].
#[derive(Debug)]
pub struct Engine<R> {
    config: EngineConfig,
    backend: LopdfBackend,
    codec: ImageCodec,
    renderer: R,
}

impl<R: Renderer> Engine<R> {
    /// Build an engine, rejecting an out-of-domain configuration.
    pub fn new(renderer: R, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend: LopdfBackend::new(),
            codec: ImageCodec::new(),
            renderer,
        })
    }

    pub fn with_defaults(renderer: R) -> Self {
        Self {
            config: EngineConfig::default(),
            backend: LopdfBackend::new(),
            codec: ImageCodec::new(),
            renderer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn write_options(&self) -> WriteOptions {
        WriteOptions {
            optimize_objects: self.config.optimize_objects,
        }
    }

    // -- I/O --------------------------------------------------------------------

    pub fn load(&self, bytes: &[u8]) -> Result<Document> {
        self.backend.load(bytes)
    }

    pub fn save(&self, document: &Document) -> Result<Vec<u8>> {
        self.backend.serialize(document, self.write_options())
    }

    pub fn outline(&self, document: &Document) -> Result<Outline> {
        self.backend.outline(document)
    }

    // -- Blank pages ------------------------------------------------------------

    fn detector(&self) -> Result<BlankPageDetector> {
        BlankPageDetector::new(self.config.blank_variance_threshold)
    }

    pub fn is_blank(&self, document: &Document, page_index: usize) -> Result<bool> {
        self.detector()?.is_blank(&self.renderer, document, page_index)
    }

    pub fn remove_blank_pages(
        &self,
        document: &Document,
        progress: &mut dyn ProgressSink,
    ) -> Result<BlankRemoval> {
        blank::remove_blank_pages(document, &self.renderer, &self.detector()?, progress)
    }

    // -- Geometry ---------------------------------------------------------------

    pub fn resize(
        &self,
        document: &Document,
        target: PageSize,
        scale_content: bool,
    ) -> Result<Document> {
        geometry::resize(document, target, scale_content, self.config.resize_margin_factor)
    }

    /// Resize to the configured default paper size.
    pub fn resize_to_default_paper(
        &self,
        document: &Document,
        scale_content: bool,
    ) -> Result<Document> {
        self.resize(document, self.config.default_paper_size.size(), scale_content)
    }

    #[instrument(skip(self, document, progress))]
    pub fn crop(
        &self,
        document: &Document,
        margins: CropMargins,
        mode: CropMode,
        progress: &mut dyn ProgressSink,
    ) -> Result<Document> {
        match mode {
            CropMode::Absolute(unit) => geometry::crop_absolute(document, margins, unit),
            CropMode::Percentage => geometry::crop_percentage(
                document,
                margins,
                &self.renderer,
                &self.codec,
                self.config.crop_working_scale,
                progress,
            ),
        }
    }

    pub fn adjust_dpi(&self, document: &Document, target_dpi: f64) -> Result<Document> {
        geometry::adjust_dpi(document, target_dpi, self.config.baseline_dpi)
    }

    pub fn nup(&self, documents: &[Document], layout: NUpLayout) -> Result<Document> {
        geometry::nup(documents, layout)
    }

    // -- Compression ------------------------------------------------------------

    pub fn compress(
        &self,
        document: &Document,
        mode: CompressionMode,
        progress: &mut dyn ProgressSink,
    ) -> Result<Compressed> {
        Compressor::new(&self.renderer, &self.codec, &self.backend)
            .compress(document, mode, progress)
    }

    // -- Splitting --------------------------------------------------------------

    pub fn split_by_size(
        &self,
        document: &Document,
        target_bytes: usize,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<SizedPart>> {
        SizeSplitter::new(target_bytes)?
            .with_write_options(self.write_options())
            .split(document, &self.backend, progress)
    }

    /// Read the document's bookmarks and split at `target_level`.
    pub fn split_by_outline(
        &self,
        document: &Document,
        target_level: u32,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<Document>> {
        let outline = self.outline(document)?;
        OutlineSplitter::new().split(document, &outline, target_level, progress)
    }

    // -- Page selection ---------------------------------------------------------

    /// Remove pages given as a 1-based range expression such as `"2, 5-7"`.
    pub fn remove_pages(&self, document: &Document, ranges: &str) -> Result<Document> {
        let selection = PageSelection::parse(ranges, document.page_count())?;
        pages::remove_pages(document, &selection)
    }
}
