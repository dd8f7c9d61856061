// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise a model `Document` into a fresh PDF using `lopdf`.
//
// Every output page is a thin wrapper: its content stream paints one XObject
// per layer through the layer's transform. Source pages become Form XObjects
// (content + deep-copied resources) and embedded rasters become Image
// XObjects. Each source object is copied at most once per output file.

use std::collections::HashMap;

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};
use pagewerk_core::Rotation;
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, instrument, warn};

use super::optimize;
use crate::backend::WriteOptions;
use crate::model::{ContentSource, Document, ImageHandle, Page, SourceId};
use crate::raster::{ImageFormat, RasterImage};

const PRODUCER: &str = concat!("pagewerk ", env!("CARGO_PKG_VERSION"));

/// Largest magnitude written as a PDF integer.
const MAX_INTEGER: f64 = 1e15;

/// lopdf stores reals as `f32`; integral values are written as integers so
/// they stay exact.
fn number(value: f64) -> Object {
    if value.fract() == 0.0 && value.abs() < MAX_INTEGER {
        Object::Integer(value as i64)
    } else {
        Object::Real(value as f32)
    }
}

/// A length in points, rounded to 1/1000 pt.
fn length(value: f64) -> Object {
    number((value * 1000.0).round() / 1000.0)
}

/// A `cm` / `/Matrix` operand list: scale and shear factors as-is,
/// translations as lengths.
fn matrix(values: [f64; 6]) -> Vec<Object> {
    let [a, b, c, d, e, f] = values;
    vec![number(a), number(b), number(c), number(d), length(e), length(f)]
}

fn pdf_error(context: &str) -> impl Fn(lopdf::Error) -> PagewerkError + '_ {
    move |err| PagewerkError::PdfError(format!("{context}: {err}"))
}

/// Serialise `document` to PDF bytes.
#[instrument(skip_all, fields(pages = document.page_count(), optimize = options.optimize_objects))]
pub fn write_document(document: &Document, options: WriteOptions) -> Result<Vec<u8>> {
    let mut output = PdfBuilder::new(document).build()?;

    if options.optimize_objects {
        let merged = optimize::deduplicate_streams(&mut output);
        let pruned = output.prune_objects().len();
        output.renumber_objects();
        output.compress();
        debug!(merged, pruned, "Output optimised");
    }

    let mut bytes = Vec::new();
    output
        .save_to(&mut bytes)
        .map_err(|err| PagewerkError::PdfError(format!("failed to serialise PDF: {}", err)))?;

    debug!(output_bytes = bytes.len(), "PDF serialised");
    Ok(bytes)
}

/// Builds one output lopdf document from a model document.
struct PdfBuilder<'a> {
    document: &'a Document,
    output: lopdf::Document,
    pages_id: ObjectId,
    /// Form XObject per (source, source page).
    forms: HashMap<(SourceId, usize), ObjectId>,
    /// Image XObject per arena image.
    images: HashMap<ImageHandle, ObjectId>,
    /// Source object id → output object id, per source.
    copied: HashMap<SourceId, HashMap<ObjectId, ObjectId>>,
}

impl<'a> PdfBuilder<'a> {
    fn new(document: &'a Document) -> Self {
        let mut output = lopdf::Document::with_version("1.7");
        let pages_id = output.new_object_id();
        Self {
            document,
            output,
            pages_id,
            forms: HashMap::new(),
            images: HashMap::new(),
            copied: HashMap::new(),
        }
    }

    fn build(mut self) -> Result<lopdf::Document> {
        let document = self.document;
        let mut kids = Vec::with_capacity(document.page_count());
        for page in document.pages() {
            kids.push(Object::Reference(self.build_page(page)?));
        }

        let count = kids.len() as i64;
        self.output.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.output.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = self.output.add_object(dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(created),
        });
        self.output.trailer.set("Root", catalog_id);
        self.output.trailer.set("Info", info_id);

        Ok(self.output)
    }

    fn build_page(&mut self, page: &Page) -> Result<ObjectId> {
        let mut xobjects = Dictionary::new();
        let mut operations = Vec::with_capacity(page.layers().len() * 4);

        for (position, layer) in page.layers().iter().enumerate() {
            let xobject_id = match layer.content {
                ContentSource::SourcePage { source, page } => self.form_xobject(source, page)?,
                ContentSource::Image(handle) => self.image_xobject(handle)?,
            };
            let name = format!("L{position}").into_bytes();
            xobjects.set(name.clone(), xobject_id);

            operations.push(Operation::new("q", vec![]));
            if !layer.transform.is_identity() {
                operations.push(Operation::new("cm", matrix(layer.transform.to_array())));
            }
            operations.push(Operation::new("Do", vec![Object::Name(name)]));
            operations.push(Operation::new("Q", vec![]));
        }

        let content = Content { operations }
            .encode()
            .map_err(pdf_error("failed to encode page content"))?;
        let content_id = self.output.add_object(Stream::new(Dictionary::new(), content));

        let mut dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                length(0.0),
                length(0.0),
                length(page.width_pt),
                length(page.height_pt),
            ],
            "Resources" => dictionary! { "XObject" => xobjects },
            "Contents" => content_id,
        };
        if page.rotation != Rotation::Deg0 {
            dict.set("Rotate", i64::from(page.rotation.degrees()));
        }
        Ok(self.output.add_object(dict))
    }

    /// A Form XObject drawing source page `page`, shifted so its media box
    /// starts at the origin.
    fn form_xobject(&mut self, source_id: SourceId, page: usize) -> Result<ObjectId> {
        if let Some(id) = self.forms.get(&(source_id, page)) {
            return Ok(*id);
        }

        let document = self.document;
        let source = document.source(source_id).ok_or_else(|| {
            PagewerkError::PdfError(format!("dangling source handle {:?}", source_id))
        })?;
        let info = source.pages().get(page).ok_or(PagewerkError::PageOutOfRange {
            page,
            total: source.page_count(),
        })?;
        let [x0, y0, x1, y1] = info.media_box;

        let resources = match source.page_resources(page)? {
            Some(resources) => self.copy_object(source_id, source.inner(), resources),
            None => Object::Dictionary(Dictionary::new()),
        };
        let content = source.page_content(page)?;

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => 1i64,
            "BBox" => vec![length(x0), length(y0), length(x1), length(y1)],
            "Matrix" => matrix([1.0, 0.0, 0.0, 1.0, -x0, -y0]),
            "Resources" => resources,
        };
        let id = self.output.add_object(Stream::new(dict, content));
        self.forms.insert((source_id, page), id);
        Ok(id)
    }

    fn image_xobject(&mut self, handle: ImageHandle) -> Result<ObjectId> {
        if let Some(id) = self.images.get(&handle) {
            return Ok(*id);
        }

        let image = self.document.image(handle).ok_or_else(|| {
            PagewerkError::PdfError(format!("dangling image handle {:?}", handle))
        })?;

        let stream = match image.format {
            ImageFormat::Jpeg => Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(image.width_px),
                    "Height" => i64::from(image.height_px),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8i64,
                    "Filter" => "DCTDecode",
                },
                image.bytes.clone(),
            )
            .with_compression(false),
            ImageFormat::Png => {
                let rgb = RasterImage::from_bytes(&image.bytes)?
                    .into_dynamic()
                    .to_rgb8();
                let mut stream = Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => i64::from(rgb.width()),
                        "Height" => i64::from(rgb.height()),
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8i64,
                    },
                    rgb.into_raw(),
                );
                stream
                    .compress()
                    .map_err(pdf_error("failed to compress image samples"))?;
                stream
            }
        };

        let id = self.output.add_object(stream);
        self.images.insert(handle, id);
        Ok(id)
    }

    // -- Object copying -------------------------------------------------------

    /// Deep-copy `object` from `source` into the output, following references.
    /// `/Parent` entries are dropped to avoid dragging in the source page tree.
    fn copy_object(&mut self, key: SourceId, source: &lopdf::Document, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.copy_reference(key, source, *id)),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(key, source, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy_object(key, source, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let dict = self.copy_dictionary(key, source, &stream.dict);
                Object::Stream(Stream::new(dict, stream.content.clone()))
            }
            other => other.clone(),
        }
    }

    fn copy_dictionary(
        &mut self,
        key: SourceId,
        source: &lopdf::Document,
        dict: &Dictionary,
    ) -> Dictionary {
        let mut copy = Dictionary::new();
        for (name, value) in dict.iter() {
            if name.as_slice() == b"Parent" {
                continue;
            }
            let value = self.copy_object(key, source, value);
            copy.set(name.clone(), value);
        }
        copy
    }

    fn copy_reference(
        &mut self,
        key: SourceId,
        source: &lopdf::Document,
        id: ObjectId,
    ) -> ObjectId {
        if let Some(existing) = self.copied.get(&key).and_then(|map| map.get(&id)) {
            return *existing;
        }

        // Reserve the id first so reference cycles terminate.
        let new_id = self.output.new_object_id();
        self.copied.entry(key).or_default().insert(id, new_id);

        let copied = match source.get_object(id) {
            Ok(object) => self.copy_object(key, source, object),
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using Null");
                Object::Null
            }
        };
        self.output.objects.insert(new_id, copied);
        new_id
    }
}
