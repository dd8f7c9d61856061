// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared test fixtures: small PDFs built with lopdf, plus fake renderers and
// writers with predictable output.

use std::cell::Cell;
use std::collections::HashSet;

use image::{DynamicImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Object, ObjectId, Stream, dictionary};
use pagewerk_core::error::{PagewerkError, Result};

use crate::backend::{Loader, Renderer, WriteOptions, Writer};
use crate::model::Document;
use crate::pdf::LopdfBackend;
use crate::raster::RasterImage;

/// One page of a fixture PDF.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixturePage {
    width: f64,
    height: f64,
    origin: (f64, f64),
    rotate: i64,
}

impl FixturePage {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            origin: (0.0, 0.0),
            rotate: 0,
        }
    }

    pub fn rotated(mut self, degrees: i64) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = (x, y);
        self
    }
}

/// Where a fixture bookmark leads.
#[derive(Debug, Clone)]
enum FixtureTarget {
    /// 0-based page of the fixture.
    Page(usize),
    Uri(String),
}

/// One bookmark of a fixture PDF.
#[derive(Debug, Clone)]
pub(crate) struct FixtureBookmark {
    title: String,
    target: FixtureTarget,
    children: Vec<FixtureBookmark>,
}

impl FixtureBookmark {
    pub fn new(title: &str, page: usize) -> Self {
        Self {
            title: title.to_string(),
            target: FixtureTarget::Page(page),
            children: Vec::new(),
        }
    }

    /// A bookmark whose action opens a URI instead of a page.
    pub fn link(title: &str, uri: &str) -> Self {
        Self {
            title: title.to_string(),
            target: FixtureTarget::Uri(uri.to_string()),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<FixtureBookmark>) -> Self {
        self.children = children;
        self
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Build a PDF with the given pages and, optionally, an outline. Each page
/// shows "Page N" in Helvetica; fonts live on the page tree node so pages
/// inherit their resources.
pub(crate) fn fixture_pdf_bytes(
    pages: &[FixturePage],
    outline: Option<&[FixtureBookmark]>,
) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids = Vec::with_capacity(pages.len());
    for (index, page) in pages.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
                Operation::new("Td", vec![real(page.origin.0 + 20.0), real(page.origin.1 + 20.0)]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {}", index + 1))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("fixture content encodes"),
        ));
        let (x, y) = page.origin;
        let mut dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![real(x), real(y), real(x + page.width), real(y + page.height)],
            "Contents" => content_id,
        };
        if page.rotate != 0 {
            dict.set("Rotate", page.rotate);
        }
        page_ids.push(doc.add_object(dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(bookmarks) = outline {
        let outlines_id = doc.new_object_id();
        let (first, last, count) = add_bookmarks(&mut doc, bookmarks, outlines_id, &page_ids);
        let mut outlines = dictionary! { "Type" => "Outlines", "Count" => count };
        if let (Some(first), Some(last)) = (first, last) {
            outlines.set("First", first);
            outlines.set("Last", last);
        }
        doc.objects.insert(outlines_id, Object::Dictionary(outlines));
        catalog.set("Outlines", outlines_id);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture PDF saves");
    bytes
}

/// Write sibling bookmarks under `parent`; returns (first, last, total count).
fn add_bookmarks(
    doc: &mut lopdf::Document,
    bookmarks: &[FixtureBookmark],
    parent: ObjectId,
    page_ids: &[ObjectId],
) -> (Option<ObjectId>, Option<ObjectId>, i64) {
    let ids: Vec<ObjectId> = bookmarks.iter().map(|_| doc.new_object_id()).collect();
    let mut total = 0;

    for (position, bookmark) in bookmarks.iter().enumerate() {
        let id = ids[position];
        let (first, last, count) = add_bookmarks(doc, &bookmark.children, id, page_ids);
        total += 1 + count;

        let mut dict = dictionary! {
            "Title" => Object::string_literal(bookmark.title.clone()),
            "Parent" => parent,
        };
        match &bookmark.target {
            FixtureTarget::Page(page) => {
                dict.set("Dest", vec![Object::Reference(page_ids[*page]), "Fit".into()]);
            }
            FixtureTarget::Uri(uri) => {
                dict.set(
                    "A",
                    dictionary! { "S" => "URI", "URI" => Object::string_literal(uri.clone()) },
                );
            }
        }
        if position > 0 {
            dict.set("Prev", ids[position - 1]);
        }
        if let Some(next) = ids.get(position + 1) {
            dict.set("Next", *next);
        }
        if let (Some(first), Some(last)) = (first, last) {
            dict.set("First", first);
            dict.set("Last", last);
            dict.set("Count", count);
        }
        doc.objects.insert(id, Object::Dictionary(dict));
    }

    (ids.first().copied(), ids.last().copied(), total)
}

/// A loaded document with pages of the given (width, height) in points.
pub(crate) fn fixture_document(sizes: &[(f64, f64)]) -> Document {
    let pages: Vec<FixturePage> = sizes.iter().map(|&(w, h)| FixturePage::sized(w, h)).collect();
    load_fixture(&pages, None)
}

pub(crate) fn load_fixture(pages: &[FixturePage], outline: Option<&[FixtureBookmark]>) -> Document {
    LopdfBackend::new()
        .load(&fixture_pdf_bytes(pages, outline))
        .expect("fixture PDF loads")
}

fn raster_size(document: &Document, page_index: usize, scale: f64) -> Result<(u32, u32)> {
    let page = document.page(page_index)?;
    Ok((
        (page.width_pt * scale).ceil().max(1.0) as u32,
        (page.height_pt * scale).ceil().max(1.0) as u32,
    ))
}

/// Renders every page as one flat colour and counts calls.
#[derive(Debug)]
pub(crate) struct UniformRenderer {
    rgba: [u8; 4],
    pub calls: Cell<usize>,
}

impl UniformRenderer {
    pub fn white() -> Self {
        Self {
            rgba: [255, 255, 255, 255],
            calls: Cell::new(0),
        }
    }
}

impl Renderer for UniformRenderer {
    fn render(&self, document: &Document, page_index: usize, scale: f64) -> Result<RasterImage> {
        self.calls.set(self.calls.get() + 1);
        let (width, height) = raster_size(document, page_index, scale)?;
        Ok(RasterImage::uniform(width, height, self.rgba))
    }
}

/// Renders the listed pages white and every other page as black and white
/// stripes.
#[derive(Debug, Default)]
pub(crate) struct StripedRenderer {
    blank: HashSet<usize>,
}

impl StripedRenderer {
    pub fn with_blank_pages(pages: &[usize]) -> Self {
        Self {
            blank: pages.iter().copied().collect(),
        }
    }
}

impl Renderer for StripedRenderer {
    fn render(&self, document: &Document, page_index: usize, scale: f64) -> Result<RasterImage> {
        let (width, height) = raster_size(document, page_index, scale)?;
        if self.blank.contains(&page_index) {
            return Ok(RasterImage::uniform(width, height, [255, 255, 255, 255]));
        }
        let striped = RgbaImage::from_fn(width, height, |_, y| {
            if (y / 2) % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        Ok(RasterImage::from_dynamic(DynamicImage::ImageRgba8(striped)))
    }
}

/// Fails on one page, renders the rest white.
#[derive(Debug)]
pub(crate) struct FailingRenderer {
    pub fail_on: usize,
}

impl Renderer for FailingRenderer {
    fn render(&self, document: &Document, page_index: usize, scale: f64) -> Result<RasterImage> {
        if page_index == self.fail_on {
            return Err(PagewerkError::RenderFailure {
                page: page_index,
                detail: "simulated renderer failure".into(),
            });
        }
        let (width, height) = raster_size(document, page_index, scale)?;
        Ok(RasterImage::uniform(width, height, [255, 255, 255, 255]))
    }
}

/// A writer whose output size is `overhead` plus each page's width in points,
/// so tests control part sizes through page widths. Counts serialisations.
#[derive(Debug)]
pub(crate) struct WidthWeightedWriter {
    overhead: usize,
    pub calls: Cell<usize>,
}

impl WidthWeightedWriter {
    pub fn new(overhead: usize) -> Self {
        Self {
            overhead,
            calls: Cell::new(0),
        }
    }
}

impl Writer for WidthWeightedWriter {
    fn serialize(&self, document: &Document, _options: WriteOptions) -> Result<Vec<u8>> {
        self.calls.set(self.calls.get() + 1);
        let weight: usize = document.pages().iter().map(|p| p.width_pt as usize).sum();
        Ok(vec![0; self.overhead + weight])
    }
}
