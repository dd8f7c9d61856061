// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — the `lopdf` backend: loading, serialising, and outline reading.

pub(crate) mod optimize;
pub mod outline;
pub mod source;
pub mod writer;

use std::collections::HashMap;

use pagewerk_core::{Outline, OutlineNode};
use pagewerk_core::error::Result;
use tracing::{debug, instrument};

use crate::backend::{Loader, OutlineReader, WriteOptions, Writer};
use crate::model::{ContentSource, Document, SourceId};
use outline::{SourceOutlineItem, read_outline};
pub use source::{PageInfo, SourceDocument};

/// Loader, writer, and outline reader backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Loader for LopdfBackend {
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn load(&self, bytes: &[u8]) -> Result<Document> {
        let source = SourceDocument::from_bytes(bytes)?;
        Ok(Document::from_source(source))
    }
}

impl Writer for LopdfBackend {
    fn serialize(&self, document: &Document, options: WriteOptions) -> Result<Vec<u8>> {
        writer::write_document(document, options)
    }
}

impl OutlineReader for LopdfBackend {
    /// Bookmarks of every source file the document draws from, mapped onto
    /// the document's own page indices.
    ///
    /// A bookmark whose target page is not in the document takes the page of
    /// its first placed descendant, and is dropped if it has none. Dropped
    /// bookmarks that point nowhere in their file are counted as unanchored.
    #[instrument(skip_all, fields(pages = document.page_count()))]
    fn outline(&self, document: &Document) -> Result<Outline> {
        // (source, source page) -> first document page showing it.
        let mut placement: HashMap<(SourceId, usize), u32> = HashMap::new();
        for page in document.pages() {
            let first_source_layer = page.layers().iter().find_map(|layer| match layer.content {
                ContentSource::SourcePage { source, page } => Some((source, page)),
                ContentSource::Image(_) => None,
            });
            if let Some(key) = first_source_layer {
                placement.entry(key).or_insert(page.index);
            }
        }

        let mut nodes = Vec::new();
        let mut unanchored = 0;
        for (source_id, source) in document.sources() {
            let placer = Placer {
                source: source_id,
                placement: &placement,
            };
            for item in read_outline(source) {
                nodes.extend(placer.place(&item, 0, &mut unanchored));
            }
        }

        debug!(top_level = nodes.len(), unanchored, "Outline mapped onto document pages");
        Ok(Outline::new(nodes, unanchored))
    }
}

struct Placer<'a> {
    source: SourceId,
    placement: &'a HashMap<(SourceId, usize), u32>,
}

impl Placer<'_> {
    fn place(
        &self,
        item: &SourceOutlineItem,
        level: u32,
        unanchored: &mut usize,
    ) -> Option<OutlineNode> {
        let children: Vec<OutlineNode> = item
            .children
            .iter()
            .filter_map(|child| self.place(child, level + 1, unanchored))
            .collect();

        let page_index = item
            .page
            .and_then(|page| self.placement.get(&(self.source, page)).copied())
            .or_else(|| children.first().map(|child| child.page_index));

        match page_index {
            Some(page_index) => Some(
                OutlineNode::new(item.title.clone(), page_index, level).with_children(children),
            ),
            None => {
                if item.page.is_none() {
                    *unanchored += 1;
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixtureBookmark, FixturePage, fixture_pdf_bytes};

    fn load(pages: usize, outline: Option<&[FixtureBookmark]>) -> Document {
        let fixture: Vec<FixturePage> =
            (0..pages).map(|_| FixturePage::sized(200.0, 300.0)).collect();
        LopdfBackend::new()
            .load(&fixture_pdf_bytes(&fixture, outline))
            .unwrap()
    }

    #[test]
    fn load_then_serialize_round_trips() {
        let backend = LopdfBackend::new();
        let document = load(3, None);
        let bytes = backend.serialize(&document, WriteOptions::optimized()).unwrap();
        let reloaded = backend.load(&bytes).unwrap();
        assert_eq!(reloaded.page_count(), 3);
        assert_eq!(reloaded.page(2).unwrap().size(), document.page(2).unwrap().size());
    }

    #[test]
    fn outline_levels_follow_nesting() {
        let outline = vec![
            FixtureBookmark::new("One", 0),
            FixtureBookmark::new("Two", 2).with_children(vec![FixtureBookmark::new("Two.a", 3)]),
        ];
        let document = load(5, Some(&outline));
        let nodes = LopdfBackend::new().outline(&document).unwrap().nodes;
        assert_eq!(nodes.len(), 2);
        assert_eq!((nodes[1].page_index, nodes[1].level), (2, 0));
        assert_eq!(nodes[1].children[0].page_index, 3);
        assert_eq!(nodes[1].children[0].level, 1);
    }

    #[test]
    fn outline_follows_pages_into_sub_documents() {
        let outline = vec![
            FixtureBookmark::new("Front", 0),
            FixtureBookmark::new("Back", 3),
        ];
        let document = load(4, Some(&outline));
        let tail = document.materialize(&[2, 3]).unwrap();
        let outline = LopdfBackend::new().outline(&tail).unwrap();
        assert_eq!(outline.unanchored, 0);
        let nodes = outline.nodes;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].title, "Back");
        assert_eq!(nodes[0].page_index, 1);
    }

    #[test]
    fn missing_outline_is_empty() {
        let document = load(2, None);
        assert!(LopdfBackend::new().outline(&document).unwrap().is_empty());
    }

    #[test]
    fn link_bookmarks_are_counted_but_not_placed() {
        let outline = vec![
            FixtureBookmark::link("Website", "https://example.org"),
            FixtureBookmark::link("Parent", "https://example.org/a")
                .with_children(vec![FixtureBookmark::new("Child", 1)]),
        ];
        let document = load(3, Some(&outline));
        let outline = LopdfBackend::new().outline(&document).unwrap();
        assert_eq!(outline.unanchored, 1);
        assert_eq!(outline.nodes.len(), 1);
        assert_eq!(outline.nodes[0].title, "Parent");
        assert_eq!(outline.nodes[0].page_index, 1);
        assert!(!outline.is_empty());
    }
}
