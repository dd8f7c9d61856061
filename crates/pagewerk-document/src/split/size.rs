// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Size-bounded split — find the longest run of pages that serialises within a
// byte budget, by binary search over real serialisations.

use pagewerk_core::OperationState;
use pagewerk_core::error::{PagewerkError, Result};
use tracing::{debug, info, instrument, warn};

use crate::backend::{WriteOptions, Writer};
use crate::model::Document;
use crate::progress::{Progress, ProgressSink};

/// One output part and the bytes it serialised to while being measured.
#[derive(Debug, Clone)]
pub struct SizedPart {
    pub document: Document,
    pub bytes: Vec<u8>,
}

/// Splits documents into parts whose serialised size stays within a budget.
///
/// Every part fits `target_bytes` except a single page that is too large on
/// its own; such a page becomes a part by itself.
#[derive(Debug, Clone)]
pub struct SizeSplitter {
    target_bytes: usize,
    options: WriteOptions,
    state: OperationState,
}

impl SizeSplitter {
    pub fn new(target_bytes: usize) -> Result<Self> {
        if target_bytes == 0 {
            return Err(PagewerkError::InvalidOption(
                "target size must be at least one byte".into(),
            ));
        }
        Ok(Self {
            target_bytes,
            options: WriteOptions::optimized(),
            state: OperationState::Idle,
        })
    }

    /// Options used for every trial serialisation (and so for the parts).
    pub fn with_write_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn target_bytes(&self) -> usize {
        self.target_bytes
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Partition `document` front to back. Progress reports
    /// `(pages consumed, total pages)` after each part is settled.
    #[instrument(skip_all, fields(pages = document.page_count(), target_bytes = self.target_bytes))]
    pub fn split<W: Writer + ?Sized>(
        &mut self,
        document: &Document,
        writer: &W,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<SizedPart>> {
        let target = self.target_bytes;
        let options = self.options;
        super::tracked(&mut self.state, || {
            split_by_size(document, writer, target, options, progress)
        })
    }
}

fn split_by_size<W: Writer + ?Sized>(
    document: &Document,
    writer: &W,
    target: usize,
    options: WriteOptions,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<SizedPart>> {
    let total = document.page_count();
    let mut parts = Vec::new();
    let mut cursor = 0;

    while cursor < total {
        let part = longest_fitting_run(document, writer, cursor, target, options)?;
        let taken = part.document.page_count();
        if part.bytes.len() > target {
            warn!(
                page = cursor + 1,
                bytes = part.bytes.len(),
                target,
                "Single page exceeds the size budget, emitting it alone"
            );
        }
        debug!(
            part = parts.len() + 1,
            from = cursor + 1,
            pages = taken,
            bytes = part.bytes.len(),
            "Part settled"
        );

        cursor += taken;
        parts.push(part);
        progress.report(Progress::of(cursor, total));
    }

    info!(parts = parts.len(), "Size split complete");
    Ok(parts)
}

/// Binary search for the largest `k` such that pages `cursor..cursor + k`
/// serialise within `target`. Always takes at least one page.
fn longest_fitting_run<W: Writer + ?Sized>(
    document: &Document,
    writer: &W,
    cursor: usize,
    target: usize,
    options: WriteOptions,
) -> Result<SizedPart> {
    let mut left = 1;
    let mut right = document.page_count() - cursor;
    let mut best: Option<SizedPart> = None;

    while left <= right {
        let mid = left + (right - left) / 2;
        let candidate = document.materialize_range(cursor..cursor + mid)?;
        let bytes = writer.serialize(&candidate, options)?;
        if bytes.len() <= target {
            best = Some(SizedPart {
                document: candidate,
                bytes,
            });
            left = mid + 1;
        } else {
            right = mid - 1;
        }
    }

    match best {
        Some(part) => Ok(part),
        None => {
            let document = document.materialize_range(cursor..cursor + 1)?;
            let bytes = writer.serialize(&document, options)?;
            Ok(SizedPart { document, bytes })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::LopdfBackend;
    use crate::progress::NoProgress;
    use crate::test_support::{WidthWeightedWriter, fixture_document};

    struct BrokenWriter;

    impl Writer for BrokenWriter {
        fn serialize(&self, _: &Document, _: WriteOptions) -> Result<Vec<u8>> {
            Err(PagewerkError::PdfError("disk full".into()))
        }
    }

    fn page_counts(parts: &[SizedPart]) -> Vec<usize> {
        parts.iter().map(|p| p.document.page_count()).collect()
    }

    #[test]
    fn ten_half_budget_pages_make_five_pairs() {
        let document = fixture_document(&vec![(500.0, 100.0); 10]);
        let writer = WidthWeightedWriter::new(0);
        let mut splitter = SizeSplitter::new(1000).unwrap();
        let parts = splitter.split(&document, &writer, &mut NoProgress).unwrap();
        assert_eq!(page_counts(&parts), vec![2, 2, 2, 2, 2]);
        assert!(parts.iter().all(|p| p.bytes.len() <= 1000));
        assert_eq!(splitter.state(), OperationState::Completed);
    }

    #[test]
    fn per_part_overhead_shrinks_parts() {
        let document = fixture_document(&vec![(300.0, 100.0); 7]);
        let writer = WidthWeightedWriter::new(150);
        let mut splitter = SizeSplitter::new(1000).unwrap();
        let parts = splitter.split(&document, &writer, &mut NoProgress).unwrap();
        // 150 + 3 × 300 = 1050 is over, 150 + 2 × 300 = 750 fits.
        assert_eq!(page_counts(&parts), vec![2, 2, 2, 1]);
    }

    #[test]
    fn oversized_page_is_emitted_alone() {
        let document =
            fixture_document(&[(100.0, 10.0), (5000.0, 10.0), (100.0, 10.0), (100.0, 10.0)]);
        let writer = WidthWeightedWriter::new(0);
        let mut splitter = SizeSplitter::new(250).unwrap();
        let parts = splitter.split(&document, &writer, &mut NoProgress).unwrap();
        assert_eq!(page_counts(&parts), vec![1, 1, 2]);
        assert_eq!(parts[1].bytes.len(), 5000);
        assert_eq!(parts[1].document.page(0).unwrap().width_pt, 5000.0);
    }

    #[test]
    fn every_page_is_kept_in_order_and_progress_tracks_the_cursor() {
        let widths = [120.0, 80.0, 300.0, 40.0, 40.0, 200.0, 90.0, 10.0, 400.0];
        let sizes: Vec<(f64, f64)> = widths.iter().map(|w| (*w, 10.0)).collect();
        let document = fixture_document(&sizes);
        let writer = WidthWeightedWriter::new(20);
        let mut cursors = Vec::new();
        let parts = SizeSplitter::new(350)
            .unwrap()
            .split(&document, &writer, &mut |p: Progress| cursors.push(p.completed))
            .unwrap();

        let rejoined: Vec<f64> = parts
            .iter()
            .flat_map(|p| p.document.pages().iter().map(|page| page.width_pt))
            .collect();
        assert_eq!(rejoined, widths.to_vec());
        for part in &parts {
            assert!(part.bytes.len() <= 350 || part.document.page_count() == 1);
        }
        assert_eq!(cursors.len(), parts.len());
        assert_eq!(cursors.last(), Some(&widths.len()));
        assert!(cursors.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn serialisations_are_logarithmic_per_part() {
        let document = fixture_document(&vec![(10.0, 10.0); 64]);
        let writer = WidthWeightedWriter::new(0);
        let parts = SizeSplitter::new(10_000)
            .unwrap()
            .split(&document, &writer, &mut NoProgress)
            .unwrap();
        assert_eq!(parts.len(), 1);
        assert!(writer.calls.get() <= 7, "calls: {}", writer.calls.get());
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(matches!(
            SizeSplitter::new(0),
            Err(PagewerkError::InvalidOption(_))
        ));
    }

    #[test]
    fn writer_failure_marks_the_split_failed() {
        let document = fixture_document(&[(10.0, 10.0)]);
        let mut splitter = SizeSplitter::new(100).unwrap();
        assert_eq!(splitter.state(), OperationState::Idle);
        let result = splitter.split(&document, &BrokenWriter, &mut NoProgress);
        assert!(matches!(result, Err(PagewerkError::PdfError(_))));
        assert_eq!(splitter.state(), OperationState::Failed);
    }

    #[test]
    fn real_pdf_parts_respect_the_budget() {
        let document = fixture_document(&vec![(300.0, 300.0); 12]);
        let backend = LopdfBackend::new();
        let single = backend
            .serialize(&document.materialize(&[0]).unwrap(), WriteOptions::optimized())
            .unwrap()
            .len();
        let target = single * 3;
        let parts = SizeSplitter::new(target)
            .unwrap()
            .split(&document, &backend, &mut NoProgress)
            .unwrap();
        assert!(parts.len() > 1 && parts.len() < 12, "parts: {}", parts.len());
        assert_eq!(parts.iter().map(|p| p.document.page_count()).sum::<usize>(), 12);
        for part in &parts {
            assert!(part.bytes.len() <= target);
        }
    }

    #[test]
    fn empty_document_has_no_parts() {
        let parts = SizeSplitter::new(10)
            .unwrap()
            .split(&Document::new(), &WidthWeightedWriter::new(0), &mut NoProgress)
            .unwrap();
        assert!(parts.is_empty());
    }
}
