// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop — absolute (geometry only) and percentage (rasterising).

use pagewerk_core::error::Result;
use pagewerk_core::{CropMargins, CropMode, LengthUnit};
use tracing::{debug, info, instrument, warn};

use crate::backend::{Encoder, Renderer};
use crate::model::{Document, Layer, Transform};
use crate::progress::{Progress, ProgressSink};
use crate::raster::{CropRect, ImageFormat};

/// Pixels per point used to rasterise pages for percentage crop.
pub const DEFAULT_WORKING_SCALE: f64 = 2.0;

/// Trim fixed margins (in `unit`) from every page.
///
/// The page shrinks to `(W - left - right) × (H - top - bottom)` and its
/// content shifts so the kept region starts at the origin. Vector content is
/// preserved. A page the margins would collapse is left unchanged.
#[instrument(skip(document), fields(pages = document.page_count()))]
pub fn crop_absolute(
    document: &Document,
    margins: CropMargins,
    unit: LengthUnit,
) -> Result<Document> {
    margins.validate(CropMode::Absolute(unit))?;
    let m = margins.to_points(unit);

    let mut skipped = 0usize;
    let cropped = document.map_pages(|page| {
        let width = page.width_pt - m.left - m.right;
        let height = page.height_pt - m.top - m.bottom;
        if width <= 0.0 || height <= 0.0 {
            warn!(
                page = page.index + 1,
                width, height, "Crop margins exceed the page, leaving it unchanged"
            );
            skipped += 1;
            return;
        }
        page.transform_content(&Transform::translate(-m.left, -m.bottom));
        page.width_pt = width;
        page.height_pt = height;
    });

    info!(skipped, "Absolute crop applied");
    Ok(cropped)
}

/// Trim margins given as percentages of each page's own width and height.
///
/// Each page is rendered at `working_scale`, the kept region is cut out of the
/// raster, and the result is embedded (PNG) as the only content of a new page
/// sized `pixels / working_scale`. Rotation carries over.
#[instrument(skip(document, renderer, encoder, progress), fields(pages = document.page_count()))]
pub fn crop_percentage<R, E>(
    document: &Document,
    margins: CropMargins,
    renderer: &R,
    encoder: &E,
    working_scale: f64,
    progress: &mut dyn ProgressSink,
) -> Result<Document>
where
    R: Renderer + ?Sized,
    E: Encoder + ?Sized,
{
    margins.validate(CropMode::Percentage)?;
    super::ensure_positive("working scale", working_scale)?;

    let total = document.page_count();
    let mut output = Document::new();

    for (index, page) in document.pages().iter().enumerate() {
        let m = margins.resolve_percent(page.width_pt, page.height_pt);
        let region = CropRect::new(
            m.left,
            m.top,
            page.width_pt - m.left - m.right,
            page.height_pt - m.top - m.bottom,
        );

        let raster = renderer.render_region(document, index, working_scale, region)?;
        let width_pt = f64::from(raster.width()) / working_scale;
        let height_pt = f64::from(raster.height()) / working_scale;
        let encoded = encoder.encode(&raster, ImageFormat::Png, 1.0)?;
        drop(raster);

        let handle = encoder.embed(&mut output, encoded);
        output.push_page(
            width_pt,
            height_pt,
            page.rotation,
            vec![Layer::full_page_image(handle, width_pt, height_pt)],
        );
        debug!(page = index + 1, width_pt, height_pt, "Page cropped");
        progress.report(Progress::of(index + 1, total));
    }

    info!(pages = output.page_count(), "Percentage crop applied");
    Ok(output)
}
