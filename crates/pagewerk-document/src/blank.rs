// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blank-page detection by luminance variance, and the page-removal flow built
// on it.

use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, info, instrument};

use crate::backend::Renderer;
use crate::model::Document;
use crate::progress::{Progress, ProgressSink};

/// Pages are classified from a render at one pixel per point.
const CLASSIFY_SCALE: f64 = 1.0;

/// Classifies pages as blank when their rendered luminance barely varies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlankPageDetector {
    threshold: f64,
}

impl BlankPageDetector {
    /// `threshold` is the variance threshold as a fraction of 255²; smaller is
    /// stricter. Must be finite and non-negative.
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(PagewerkError::InvalidOption(format!(
                "blank variance threshold must be a non-negative number, got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Render page `page_index` and decide whether it is blank.
    ///
    /// Blank means `variance < threshold × 255²`, strictly. A render failure
    /// is returned as an error, never treated as "not blank".
    #[instrument(skip(self, renderer, document), fields(threshold = self.threshold))]
    pub fn is_blank<R: Renderer + ?Sized>(
        &self,
        renderer: &R,
        document: &Document,
        page_index: usize,
    ) -> Result<bool> {
        let raster = renderer.render(document, page_index, CLASSIFY_SCALE)?;
        let variance = raster.luminance_variance();
        let blank = variance < self.threshold * 255.0 * 255.0;
        debug!(page = page_index + 1, variance, blank, "Page classified");
        Ok(blank)
    }
}

/// Result of [`remove_blank_pages`].
#[derive(Debug, Clone)]
pub struct BlankRemoval {
    /// The input without its blank pages. May have zero pages.
    pub document: Document,
    /// 0-based indices (in the input) of the pages that were dropped.
    pub removed: Vec<usize>,
}

/// Classify every page and build a document from the non-blank ones.
///
/// Progress is reported after each classified page. Any render failure aborts
/// the whole operation.
#[instrument(skip_all, fields(pages = document.page_count(), threshold = detector.threshold()))]
pub fn remove_blank_pages<R: Renderer + ?Sized>(
    document: &Document,
    renderer: &R,
    detector: &BlankPageDetector,
    progress: &mut dyn ProgressSink,
) -> Result<BlankRemoval> {
    let total = document.page_count();
    let mut kept = Vec::with_capacity(total);
    let mut removed = Vec::new();

    for index in 0..total {
        if detector.is_blank(renderer, document, index)? {
            removed.push(index);
        } else {
            kept.push(index);
        }
        progress.report(Progress::of(index + 1, total));
    }

    let document = document.materialize(&kept)?;
    info!(kept = kept.len(), removed = removed.len(), "Blank pages removed");
    Ok(BlankRemoval { document, removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::raster::RasterImage;
    use crate::test_support::{FailingRenderer, StripedRenderer, UniformRenderer, fixture_document};

    /// Renders a fixed raster regardless of page.
    struct FixedRenderer(RasterImage);

    impl Renderer for FixedRenderer {
        fn render(&self, _: &Document, _: usize, _: f64) -> Result<RasterImage> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn uniform_page_is_blank_at_any_positive_threshold() {
        let document = fixture_document(&[(100.0, 100.0)]);
        for threshold in [1e-9, 0.001, 0.01, 0.1] {
            let detector = BlankPageDetector::new(threshold).unwrap();
            assert!(detector.is_blank(&UniformRenderer::white(), &document, 0).unwrap());
        }
    }

    #[test]
    fn variance_equal_to_threshold_is_not_blank() {
        // Half black, half white pixels: luminance variance is exactly 127.5².
        let image = image::RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let raster = RasterImage::from_dynamic(image::DynamicImage::ImageRgba8(image));
        let variance = raster.luminance_variance();
        assert_eq!(variance, 127.5 * 127.5);

        let document = fixture_document(&[(10.0, 10.0)]);
        let renderer = FixedRenderer(raster);
        let at_boundary = BlankPageDetector::new(variance / (255.0 * 255.0)).unwrap();
        assert!(!at_boundary.is_blank(&renderer, &document, 0).unwrap());
        let just_above = BlankPageDetector::new(0.2500001).unwrap();
        assert!(just_above.is_blank(&renderer, &document, 0).unwrap());
    }

    #[test]
    fn zero_threshold_never_matches() {
        let document = fixture_document(&[(50.0, 50.0)]);
        let detector = BlankPageDetector::new(0.0).unwrap();
        assert!(!detector.is_blank(&UniformRenderer::white(), &document, 0).unwrap());
    }

    #[test]
    fn rejects_nonsense_thresholds() {
        assert!(BlankPageDetector::new(f64::NAN).is_err());
        assert!(BlankPageDetector::new(-0.5).is_err());
    }

    #[test]
    fn render_failure_propagates() {
        let document = fixture_document(&[(50.0, 50.0), (50.0, 50.0)]);
        let detector = BlankPageDetector::new(0.01).unwrap();
        let err = detector
            .is_blank(&FailingRenderer { fail_on: 1 }, &document, 1)
            .unwrap_err();
        assert!(matches!(err, PagewerkError::RenderFailure { page: 1, .. }));
    }

    #[test]
    fn removes_only_blank_pages() {
        let document = fixture_document(&[(10.0, 10.0), (20.0, 20.0), (30.0, 30.0), (40.0, 40.0)]);
        let renderer = StripedRenderer::with_blank_pages(&[1, 3]);
        let detector = BlankPageDetector::new(0.01).unwrap();

        let mut reports = Vec::new();
        let result = remove_blank_pages(&document, &renderer, &detector, &mut |p: Progress| {
            reports.push(p.completed)
        })
        .unwrap();

        assert_eq!(result.removed, vec![1, 3]);
        let widths: Vec<f64> = result.document.pages().iter().map(|p| p.width_pt).collect();
        assert_eq!(widths, vec![10.0, 30.0]);
        assert_eq!(reports, vec![1, 2, 3, 4]);
    }

    #[test]
    fn all_blank_gives_empty_document() {
        let document = fixture_document(&[(10.0, 10.0), (10.0, 10.0)]);
        let detector = BlankPageDetector::new(0.01).unwrap();
        let result =
            remove_blank_pages(&document, &UniformRenderer::white(), &detector, &mut NoProgress)
                .unwrap();
        assert!(result.document.is_empty());
        assert_eq!(result.removed, vec![0, 1]);
    }

    #[test]
    fn removal_aborts_on_render_failure() {
        let document = fixture_document(&[(10.0, 10.0), (10.0, 10.0), (10.0, 10.0)]);
        let detector = BlankPageDetector::new(0.01).unwrap();
        let result = remove_blank_pages(
            &document,
            &FailingRenderer { fail_on: 2 },
            &detector,
            &mut NoProgress,
        );
        assert!(matches!(result, Err(PagewerkError::RenderFailure { page: 2, .. })));
    }
}
