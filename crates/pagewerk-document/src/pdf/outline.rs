// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outline (bookmark) extraction from a source PDF's `/Outlines` tree.

use std::collections::HashSet;

use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, warn};

use super::source::{SourceDocument, resolve};

/// Bound on name-tree recursion when resolving named destinations.
const MAX_NAME_TREE_DEPTH: usize = 32;

/// A bookmark as found in the source file, pointing at a source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceOutlineItem {
    pub title: String,
    /// 0-based source page index, if the destination resolved.
    pub page: Option<usize>,
    pub children: Vec<SourceOutlineItem>,
}

/// Read the bookmark tree of `source`. Returns an empty list when the file has
/// no `/Outlines` or the outline has no items.
pub(crate) fn read_outline(source: &SourceDocument) -> Vec<SourceOutlineItem> {
    let document = source.inner();
    let Some(first) = document
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"Outlines").ok())
        .and_then(|outlines| resolve(document, outlines).as_dict().ok())
        .and_then(|outlines| outlines.get(b"First").ok())
        .and_then(|first| first.as_reference().ok())
    else {
        return Vec::new();
    };

    let mut visited = HashSet::new();
    let items = read_siblings(source, first, &mut visited);
    debug!(top_level = items.len(), visited = visited.len(), "Outline read");
    items
}

fn read_siblings(
    source: &SourceDocument,
    first: ObjectId,
    visited: &mut HashSet<ObjectId>,
) -> Vec<SourceOutlineItem> {
    let document = source.inner();
    let mut items = Vec::new();
    let mut next = Some(first);

    while let Some(id) = next {
        if !visited.insert(id) {
            warn!(?id, "Outline item visited twice, stopping at the cycle");
            break;
        }
        let Ok(dict) = document.get_object(id).and_then(Object::as_dict) else {
            warn!(?id, "Outline item is not a dictionary");
            break;
        };

        let children = match dict.get(b"First").and_then(Object::as_reference) {
            Ok(child) => read_siblings(source, child, visited),
            Err(_) => Vec::new(),
        };

        let title = dict
            .get(b"Title")
            .ok()
            .map(|title| decode_text(resolve(document, title)))
            .unwrap_or_default();
        let page = destination_page(source, dict);
        if page.is_none() {
            warn!(%title, "Bookmark destination could not be resolved");
        }

        items.push(SourceOutlineItem {
            title,
            page,
            children,
        });
        next = dict.get(b"Next").and_then(Object::as_reference).ok();
    }

    items
}

/// The 0-based page an outline item's `/Dest` or GoTo `/A` points at.
fn destination_page(source: &SourceDocument, item: &Dictionary) -> Option<usize> {
    let document = source.inner();
    let destination = match item.get(b"Dest") {
        Ok(dest) => dest,
        Err(_) => {
            let action = resolve(document, item.get(b"A").ok()?).as_dict().ok()?;
            if action.get(b"S").and_then(Object::as_name).ok()? != b"GoTo" {
                return None;
            }
            action.get(b"D").ok()?
        }
    };
    resolve_destination(source, resolve(document, destination))
}

fn resolve_destination(source: &SourceDocument, destination: &Object) -> Option<usize> {
    let document = source.inner();
    match destination {
        Object::Array(items) => match items.first()? {
            Object::Reference(page_id) => source.page_index_of(*page_id),
            // Some producers write a page number instead of a reference.
            Object::Integer(page) => usize::try_from(*page)
                .ok()
                .filter(|p| *p < source.page_count()),
            _ => None,
        },
        Object::Dictionary(dict) => {
            resolve_destination(source, resolve(document, dict.get(b"D").ok()?))
        }
        Object::Name(name) | Object::String(name, _) => {
            let target = named_destination(document, name)?;
            match resolve(document, target) {
                Object::Name(_) | Object::String(..) => None,
                other => resolve_destination(source, other),
            }
        }
        _ => None,
    }
}

/// Look a named destination up in the catalog's `/Dests` dictionary or the
/// `/Names` → `/Dests` name tree.
fn named_destination<'a>(document: &'a lopdf::Document, name: &[u8]) -> Option<&'a Object> {
    let catalog = document.catalog().ok()?;

    if let Some(found) = catalog
        .get(b"Dests")
        .ok()
        .and_then(|dests| resolve(document, dests).as_dict().ok())
        .and_then(|dests| dests.get(name).ok())
    {
        return Some(found);
    }

    let tree = catalog
        .get(b"Names")
        .ok()
        .and_then(|names| resolve(document, names).as_dict().ok())
        .and_then(|names| names.get(b"Dests").ok())
        .and_then(|dests| resolve(document, dests).as_dict().ok())?;
    search_name_tree(document, tree, name, 0)
}

fn search_name_tree<'a>(
    document: &'a lopdf::Document,
    node: &'a Dictionary,
    name: &[u8],
    depth: usize,
) -> Option<&'a Object> {
    if depth > MAX_NAME_TREE_DEPTH {
        return None;
    }
    if let Ok(names) = node.get(b"Names").and_then(Object::as_array) {
        for pair in names.chunks(2) {
            if let [Object::String(key, _), value] = pair {
                if key.as_slice() == name {
                    return Some(value);
                }
            }
        }
    }
    let kids = node.get(b"Kids").and_then(Object::as_array).ok()?;
    kids.iter().find_map(|kid| {
        let kid = resolve(document, kid).as_dict().ok()?;
        search_name_tree(document, kid, name, depth + 1)
    })
}

/// Decode a PDF text string: UTF-16BE with a byte-order mark, otherwise
/// treated as Latin-1 (close enough to PDFDocEncoding for titles).
pub(crate) fn decode_text(object: &Object) -> String {
    let bytes = match object {
        Object::String(bytes, _) => bytes.as_slice(),
        Object::Name(bytes) => bytes.as_slice(),
        _ => return String::new(),
    };
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}
