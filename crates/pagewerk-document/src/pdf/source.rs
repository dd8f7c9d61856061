// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source documents — parsed PDF files whose pages the model draws from, using
// the `lopdf` crate.

use lopdf::{Dictionary, Object, ObjectId};
use pagewerk_core::Rotation;
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, instrument, warn};

/// US Letter, the media box assumed when a page declares none.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Bound on `/Parent` hops when resolving inherited page attributes.
const MAX_INHERITANCE_DEPTH: usize = 64;

/// Geometry of one source page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub(crate) object_id: ObjectId,
    /// `[x0, y0, x1, y1]` with `x0 <= x1` and `y0 <= y1`.
    pub media_box: [f64; 4],
    pub rotation: Rotation,
}

impl PageInfo {
    pub fn width_pt(&self) -> f64 {
        self.media_box[2] - self.media_box[0]
    }

    pub fn height_pt(&self) -> f64 {
        self.media_box[3] - self.media_box[1]
    }
}

/// A parsed PDF file. Read-only once loaded; shared between documents via `Arc`.
pub struct SourceDocument {
    document: lopdf::Document,
    pages: Vec<PageInfo>,
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("pages", &self.pages.len())
            .field("objects", &self.document.objects.len())
            .finish()
    }
}

impl SourceDocument {
    /// Parse PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = lopdf::Document::load_mem(data).map_err(|err| {
            PagewerkError::MalformedDocument(format!("failed to load PDF from memory: {}", err))
        })?;
        Self::from_lopdf(document)
    }

    /// Wrap an already-parsed lopdf document.
    pub fn from_lopdf(document: lopdf::Document) -> Result<Self> {
        // lopdf pages are keyed by 1-indexed page number, in page-tree order.
        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();

        let mut pages = Vec::with_capacity(page_ids.len());
        for (index, object_id) in page_ids.into_iter().enumerate() {
            let dict = document
                .get_object(object_id)
                .and_then(Object::as_dict)
                .map_err(|err| {
                    PagewerkError::MalformedDocument(format!(
                        "page {} is not a dictionary: {}",
                        index + 1,
                        err
                    ))
                })?;
            pages.push(PageInfo {
                object_id,
                media_box: read_media_box(&document, dict, index),
                rotation: read_rotation(&document, dict, index),
            });
        }

        debug!(pages = pages.len(), "PDF loaded");
        Ok(Self { document, pages })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn pages(&self) -> &[PageInfo] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn inner(&self) -> &lopdf::Document {
        &self.document
    }

    /// 0-based index of the page with the given object id.
    pub(crate) fn page_index_of(&self, object_id: ObjectId) -> Option<usize> {
        self.pages.iter().position(|p| p.object_id == object_id)
    }

    fn page_info(&self, index: usize) -> Result<&PageInfo> {
        self.pages.get(index).ok_or(PagewerkError::PageOutOfRange {
            page: index,
            total: self.pages.len(),
        })
    }

    /// Decoded content stream(s) of a page, concatenated.
    ///
    /// A stream whose filter cannot be decoded is an error; its raw bytes are
    /// never passed on as content.
    pub(crate) fn page_content(&self, index: usize) -> Result<Vec<u8>> {
        let info = self.page_info(index)?;
        let mut content = Vec::new();
        for stream_id in self.document.get_page_contents(info.object_id) {
            let stream = self
                .document
                .get_object(stream_id)
                .and_then(Object::as_stream)
                .map_err(|err| {
                    PagewerkError::PdfError(format!(
                        "cannot read content of page {}: {}",
                        index + 1,
                        err
                    ))
                })?;
            let decoded = if stream.dict.has(b"Filter") {
                stream.decompressed_content().map_err(|err| {
                    PagewerkError::PdfError(format!(
                        "cannot decode content of page {}: {}",
                        index + 1,
                        err
                    ))
                })?
            } else {
                stream.content.clone()
            };
            if !content.is_empty() {
                content.push(b'\n');
            }
            content.extend_from_slice(&decoded);
        }
        Ok(content)
    }

    /// The page's `/Resources`, following inheritance from the page tree.
    pub(crate) fn page_resources(&self, index: usize) -> Result<Option<&Object>> {
        let info = self.page_info(index)?;
        let dict = self
            .document
            .get_object(info.object_id)
            .and_then(Object::as_dict)
            .map_err(|err| PagewerkError::PdfError(format!("cannot read page object: {}", err)))?;
        Ok(inherited(&self.document, dict, b"Resources"))
    }
}

/// Follow a reference to the object it names; other objects pass through.
pub(crate) fn resolve<'a>(document: &'a lopdf::Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        other => other,
    }
}

/// Look up `key` on a page dictionary or, failing that, on its ancestors.
fn inherited<'a>(
    document: &'a lopdf::Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = page;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent = match current.get(b"Parent") {
            Ok(Object::Reference(id)) => document.get_object(*id).ok()?,
            _ => return None,
        };
        current = parent.as_dict().ok()?;
    }
    None
}

pub(crate) fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

fn read_media_box(document: &lopdf::Document, page: &Dictionary, index: usize) -> [f64; 4] {
    let parsed = inherited(document, page, b"MediaBox")
        .map(|object| resolve(document, object))
        .and_then(|object| object.as_array().ok())
        .and_then(|items| {
            let values: Vec<f64> = items
                .iter()
                .filter_map(|item| number(resolve(document, item)))
                .collect();
            <[f64; 4]>::try_from(values).ok()
        });

    match parsed {
        Some([x0, y0, x1, y1]) if (x1 - x0).abs() > 0.0 && (y1 - y0).abs() > 0.0 => {
            [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)]
        }
        _ => {
            warn!(page = index + 1, "Missing or degenerate /MediaBox, assuming Letter");
            DEFAULT_MEDIA_BOX
        }
    }
}

fn read_rotation(document: &lopdf::Document, page: &Dictionary, index: usize) -> Rotation {
    let Some(value) = inherited(document, page, b"Rotate") else {
        return Rotation::Deg0;
    };
    match number(resolve(document, value)).and_then(|deg| Rotation::from_degrees(deg as i64)) {
        Some(rotation) => rotation,
        None => {
            warn!(page = index + 1, ?value, "Ignoring /Rotate that is not a multiple of 90");
            Rotation::Deg0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixturePage, fixture_pdf_bytes};
    use lopdf::{Stream, dictionary};

    /// A one-page source whose content stream is replaced by `stream`.
    fn with_page_stream(stream: Stream) -> SourceDocument {
        let bytes = fixture_pdf_bytes(&[FixturePage::sized(100.0, 100.0)], None);
        let mut document = lopdf::Document::load_mem(&bytes).unwrap();
        let page_id = *document.get_pages().get(&1).unwrap();
        let content_id = document.get_page_contents(page_id)[0];
        document.objects.insert(content_id, Object::Stream(stream));
        SourceDocument::from_lopdf(document).unwrap()
    }

    #[test]
    fn reads_page_boxes_and_rotation() {
        let bytes = fixture_pdf_bytes(
            &[
                FixturePage::sized(595.28, 841.89),
                FixturePage::sized(612.0, 792.0).rotated(90),
            ],
            None,
        );
        let source = SourceDocument::from_bytes(&bytes).unwrap();
        assert_eq!(source.page_count(), 2);
        assert!((source.pages()[0].width_pt() - 595.28).abs() < 0.01);
        assert_eq!(source.pages()[1].rotation, Rotation::Deg90);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = SourceDocument::from_bytes(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PagewerkError::MalformedDocument(_)));
    }

    #[test]
    fn inherits_resources_from_the_page_tree() {
        let bytes = fixture_pdf_bytes(&[FixturePage::sized(100.0, 100.0)], None);
        let source = SourceDocument::from_bytes(&bytes).unwrap();
        assert!(source.page_resources(0).unwrap().is_some());
        assert!(!source.page_content(0).unwrap().is_empty());
    }

    #[test]
    fn offset_media_boxes_are_normalised() {
        let bytes = fixture_pdf_bytes(
            &[FixturePage::sized(100.0, 50.0).with_origin(20.0, 30.0)],
            None,
        );
        let source = SourceDocument::from_bytes(&bytes).unwrap();
        let info = &source.pages()[0];
        assert_eq!(info.media_box, [20.0, 30.0, 120.0, 80.0]);
        assert_eq!((info.width_pt(), info.height_pt()), (100.0, 50.0));
    }

    #[test]
    fn flate_content_is_decoded() {
        let plain = b"0 0 m 10 10 l S\n".repeat(50);
        let mut stream = Stream::new(Dictionary::new(), plain.clone());
        stream.compress().unwrap();
        assert!(stream.dict.has(b"Filter"));
        assert_eq!(with_page_stream(stream).page_content(0).unwrap(), plain);
    }

    #[test]
    fn undecodable_content_is_an_error() {
        let stream = Stream::new(
            dictionary! { "Filter" => "NoSuchDecode" },
            b"opaque bytes".to_vec(),
        );
        assert!(matches!(
            with_page_stream(stream).page_content(0),
            Err(PagewerkError::PdfError(_))
        ));
    }
}
