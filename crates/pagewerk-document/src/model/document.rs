// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document — an ordered page arena plus the source files and images its pages
// draw from.

use std::sync::Arc;

use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::Rotation;

use super::page::{ContentSource, ImageHandle, Layer, Page, SourceId};
use crate::pdf::source::SourceDocument;
use crate::raster::EncodedImage;

/// An in-memory document.
///
/// Pages refer to content through integer handles into the document's own
/// source and image arenas. Cloning is cheap (arena entries are shared via
/// `Arc`), and every transformation returns a new `Document` instead of
/// mutating its input, so the same source page can be embedded into many
/// outputs without aliasing.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pages: Vec<Page>,
    sources: Vec<Arc<SourceDocument>>,
    images: Vec<Arc<EncodedImage>>,
}

impl Document {
    /// An empty document with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a freshly loaded source file; page `i` draws source page `i`.
    pub(crate) fn from_source(source: SourceDocument) -> Self {
        let mut document = Self::new();
        let boxes: Vec<_> = source
            .pages()
            .iter()
            .map(|info| (info.width_pt(), info.height_pt(), info.rotation))
            .collect();
        let source_id = SourceId(document.sources.len());
        document.sources.push(Arc::new(source));

        for (page, (width, height, rotation)) in boxes.into_iter().enumerate() {
            let layer = Layer::new(
                ContentSource::SourcePage {
                    source: source_id,
                    page,
                },
                Default::default(),
            );
            document.push_page(width, height, rotation, vec![layer]);
        }
        document
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Result<&Page> {
        self.pages.get(index).ok_or(PagewerkError::PageOutOfRange {
            page: index,
            total: self.pages.len(),
        })
    }

    pub fn source(&self, id: SourceId) -> Option<&SourceDocument> {
        self.sources.get(id.0).map(Arc::as_ref)
    }

    pub fn image(&self, handle: ImageHandle) -> Option<&EncodedImage> {
        self.images.get(handle.0).map(Arc::as_ref)
    }

    /// Source files in arena order.
    pub fn sources(&self) -> impl Iterator<Item = (SourceId, &SourceDocument)> {
        self.sources
            .iter()
            .enumerate()
            .map(|(id, source)| (SourceId(id), source.as_ref()))
    }

    // -- Construction ---------------------------------------------------------

    /// Append a page built from layers that already belong to this document.
    /// Returns the new page's index.
    pub fn push_page(
        &mut self,
        width_pt: f64,
        height_pt: f64,
        rotation: Rotation,
        layers: Vec<Layer>,
    ) -> usize {
        let index = self.pages.len();
        self.pages
            .push(Page::new(index as u32, width_pt, height_pt, rotation).with_layers(layers));
        index
    }

    /// Add an encoded image to the arena.
    pub fn add_image(&mut self, image: EncodedImage) -> ImageHandle {
        let handle = ImageHandle(self.images.len());
        self.images.push(Arc::new(image));
        handle
    }

    /// Copy the layers of `from`'s page `index` into this document's arenas.
    ///
    /// The returned layers reference this document only; the caller decides
    /// which page they end up on.
    pub fn import_layers(&mut self, from: &Document, index: usize) -> Result<Vec<Layer>> {
        let mut layers = from.page(index)?.layers().to_vec();
        for layer in &mut layers {
            layer.content = self.import_content(from, layer.content)?;
        }
        Ok(layers)
    }

    /// Append a copy of `from`'s page `index` as the last page.
    pub fn append_page_from(&mut self, from: &Document, index: usize) -> Result<usize> {
        let layers = self.import_layers(from, index)?;
        let page = from.page(index)?;
        Ok(self.push_page(page.width_pt, page.height_pt, page.rotation, layers))
    }

    /// Build a standalone document from the given pages, in the given order.
    pub fn materialize(&self, indices: &[usize]) -> Result<Document> {
        let mut document = Document::new();
        for &index in indices {
            document.append_page_from(self, index)?;
        }
        Ok(document)
    }

    /// Build a standalone document from a contiguous page range.
    pub fn materialize_range(&self, range: std::ops::Range<usize>) -> Result<Document> {
        let indices: Vec<usize> = range.collect();
        self.materialize(&indices)
    }

    /// A copy of this document with every page passed through `f`.
    ///
    /// `f` may change geometry and layer transforms but must not introduce
    /// handles from another document.
    pub fn map_pages(&self, mut f: impl FnMut(&mut Page)) -> Document {
        let mut document = self.clone();
        for page in &mut document.pages {
            f(page);
        }
        document.reindex();
        document
    }

    fn reindex(&mut self) {
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.index = index as u32;
        }
    }

    fn import_content(&mut self, from: &Document, content: ContentSource) -> Result<ContentSource> {
        match content {
            ContentSource::SourcePage { source, page } => {
                let shared = from.sources.get(source.0).ok_or_else(|| {
                    PagewerkError::PdfError(format!("dangling source handle {}", source.0))
                })?;
                let id = match self.sources.iter().position(|s| Arc::ptr_eq(s, shared)) {
                    Some(existing) => existing,
                    None => {
                        self.sources.push(Arc::clone(shared));
                        self.sources.len() - 1
                    }
                };
                Ok(ContentSource::SourcePage {
                    source: SourceId(id),
                    page,
                })
            }
            ContentSource::Image(handle) => {
                let shared = from.images.get(handle.0).ok_or_else(|| {
                    PagewerkError::PdfError(format!("dangling image handle {}", handle.0))
                })?;
                let id = match self.images.iter().position(|i| Arc::ptr_eq(i, shared)) {
                    Some(existing) => existing,
                    None => {
                        self.images.push(Arc::clone(shared));
                        self.images.len() - 1
                    }
                };
                Ok(ContentSource::Image(ImageHandle(id)))
            }
        }
    }
}
