// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page removal — drop the pages a user selected.

use pagewerk_core::PageSelection;
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{info, instrument};

use crate::model::Document;

fn check_bounds(document: &Document, selection: &PageSelection) -> Result<()> {
    let total = document.page_count();
    match selection.indices().iter().find(|&&index| index >= total) {
        Some(&page) => Err(PagewerkError::PageOutOfRange { page, total }),
        None => Ok(()),
    }
}

/// A copy of `document` without the selected pages.
#[instrument(skip_all, fields(pages = document.page_count(), selected = selection.len()))]
pub fn remove_pages(document: &Document, selection: &PageSelection) -> Result<Document> {
    check_bounds(document, selection)?;
    let kept: Vec<usize> = (0..document.page_count())
        .filter(|index| !selection.contains(*index))
        .collect();
    let result = document.materialize(&kept)?;
    info!(remaining = result.page_count(), "Pages removed");
    Ok(result)
}
