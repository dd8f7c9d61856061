// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// N-up — tile the pages of one or more documents onto fewer sheets.

use pagewerk_core::error::Result;
use pagewerk_core::{NUpLayout, Rotation};
use tracing::{debug, info, instrument};

use crate::model::{Document, Transform};

/// Lay every page of `documents` (in call order, then page order) onto sheets
/// of `layout.pages_per_sheet()` cells, filled row-major from the top left.
///
/// Cells on a sheet all take the size of the first page placed on it, and the
/// sheet is `cols × cell_width` by `rows × cell_height`. Pages are centred in
/// their cell without scaling, so a larger page overflows its cell. The last
/// sheet may have empty cells.
#[instrument(skip(documents), fields(documents = documents.len()))]
pub fn nup(documents: &[Document], layout: NUpLayout) -> Result<Document> {
    let (cols, rows) = layout.grid();
    let per_sheet = layout.pages_per_sheet() as usize;

    let placements: Vec<(&Document, usize)> = documents
        .iter()
        .flat_map(|document| (0..document.page_count()).map(move |index| (document, index)))
        .collect();

    let mut output = Document::new();
    for (sheet, cells) in placements.chunks(per_sheet).enumerate() {
        let Some(&(first_doc, first_index)) = cells.first() else {
            continue;
        };
        let first = first_doc.page(first_index)?;
        let (cell_w, cell_h) = (first.width_pt, first.height_pt);
        let sheet_w = cell_w * f64::from(cols);
        let sheet_h = cell_h * f64::from(rows);

        let mut layers = Vec::new();
        for (slot, &(document, index)) in cells.iter().enumerate() {
            let page = document.page(index)?;
            let col = (slot as u32 % cols) as f64;
            let row = (slot as u32 / cols) as f64;
            let x = col * cell_w + (cell_w - page.width_pt) / 2.0;
            let y = sheet_h - (row + 1.0) * cell_h + (cell_h - page.height_pt) / 2.0;

            let placement = Transform::translate(x, y);
            for mut layer in output.import_layers(document, index)? {
                layer.transform = layer.transform.then(&placement);
                layers.push(layer);
            }
        }

        debug!(sheet = sheet + 1, cells = cells.len(), sheet_w, sheet_h, "Sheet laid out");
        output.push_page(sheet_w, sheet_h, Rotation::Deg0, layers);
    }

    info!(
        pages = placements.len(),
        sheets = output.page_count(),
        pages_per_sheet = per_sheet,
        "N-up complete"
    );
    Ok(output)
}
