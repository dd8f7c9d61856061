// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page geometry — resize, crop, DPI adjustment, and N-up tiling.
//
// Every operation takes a `Document` by reference and returns a new one; the
// input is never modified.

pub mod crop;
pub mod nup;

pub use crop::{crop_absolute, crop_percentage};
pub use nup::nup;

use pagewerk_core::PageSize;
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, info, instrument};

use crate::model::{Document, Transform};

/// Fraction of the fit scale kept when content is scaled, leaving a 5% margin.
pub const DEFAULT_MARGIN_FACTOR: f64 = 0.95;

/// DPI page geometry is assumed to be authored at.
pub const DEFAULT_BASELINE_DPI: f64 = 72.0;

fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PagewerkError::InvalidOption(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

/// Set every page to `target`.
///
/// With `scale_content`, content is scaled about the origin by
/// `min(target_w / w, target_h / h) × margin_factor`. Without it, only the
/// canvas changes and content keeps its coordinates, so it may be clipped or
/// sit in a corner of a larger page.
#[instrument(skip(document), fields(pages = document.page_count()))]
pub fn resize(
    document: &Document,
    target: PageSize,
    scale_content: bool,
    margin_factor: f64,
) -> Result<Document> {
    ensure_positive("target width", target.width_pt)?;
    ensure_positive("target height", target.height_pt)?;
    ensure_positive("margin factor", margin_factor)?;

    let resized = document.map_pages(|page| {
        if scale_content {
            let scale = (target.width_pt / page.width_pt).min(target.height_pt / page.height_pt)
                * margin_factor;
            debug!(page = page.index + 1, scale, "Scaling page content");
            page.transform_content(&Transform::scale(scale));
        }
        page.set_size(target);
    });

    info!(
        width_pt = target.width_pt,
        height_pt = target.height_pt,
        scale_content,
        "Pages resized"
    );
    Ok(resized)
}

/// Rescale page width and height by `target_dpi / baseline_dpi`. Content
/// coordinates are untouched.
#[instrument(skip(document), fields(pages = document.page_count()))]
pub fn adjust_dpi(document: &Document, target_dpi: f64, baseline_dpi: f64) -> Result<Document> {
    ensure_positive("target DPI", target_dpi)?;
    ensure_positive("baseline DPI", baseline_dpi)?;

    let factor = target_dpi / baseline_dpi;
    let adjusted = document.map_pages(|page| {
        page.width_pt *= factor;
        page.height_pt *= factor;
    });
    info!(factor, "Page DPI adjusted");
    Ok(adjusted)
}
