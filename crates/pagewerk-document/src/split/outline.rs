// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outline-bounded split — cut a document where bookmarks at one nesting depth
// begin.

use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::{OperationState, Outline, OutlineNode};
use tracing::{info, instrument, warn};

use crate::model::Document;
use crate::progress::{Progress, ProgressSink};

/// Splits documents at bookmark boundaries.
#[derive(Debug, Clone, Default)]
pub struct OutlineSplitter {
    state: OperationState,
}

impl OutlineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Split `document` at the bookmarks `target_level` deep (1 = top level).
    ///
    /// Each bookmark's page starts a part that runs to the next bookmark's
    /// page; the last part runs to the end. Pages before the first bookmark
    /// form a leading part of their own.
    ///
    /// # Errors
    ///
    /// `NoOutline` when the file has no bookmarks at all. When bookmarks exist
    /// but none sit at `target_level`, or none point at a page of the
    /// document, this is not an error: every page becomes its own part.
    #[instrument(skip(self, document, outline, progress), fields(pages = document.page_count()))]
    pub fn split(
        &mut self,
        document: &Document,
        outline: &Outline,
        target_level: u32,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<Document>> {
        super::tracked(&mut self.state, || {
            split_by_outline(document, outline, target_level, progress)
        })
    }
}

fn split_by_outline(
    document: &Document,
    outline: &Outline,
    target_level: u32,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<Document>> {
    if outline.is_empty() {
        return Err(PagewerkError::NoOutline);
    }
    if target_level == 0 {
        return Err(PagewerkError::InvalidOption(
            "outline level starts at 1 (top-level bookmarks)".into(),
        ));
    }

    let total = document.page_count();
    let mut points = Vec::new();
    collect_split_points(&outline.nodes, 0, target_level - 1, &mut points);

    let found = points.len();
    points.retain(|&page| page < total);
    if points.len() < found {
        warn!(
            dropped = found - points.len(),
            total,
            "Bookmarks past the last page ignored"
        );
    }
    points.sort_unstable();
    points.dedup();

    let ranges: Vec<std::ops::Range<usize>> = if points.is_empty() {
        info!(target_level, "No bookmarks at this level, splitting per page");
        (0..total).map(|page| page..page + 1).collect()
    } else {
        let mut starts = points;
        if starts[0] != 0 {
            starts.insert(0, 0);
        }
        let ends = starts.iter().skip(1).copied().chain(std::iter::once(total));
        starts.iter().copied().zip(ends).map(|(s, e)| s..e).collect()
    };

    let mut parts = Vec::with_capacity(ranges.len());
    for range in ranges {
        let end = range.end;
        parts.push(document.materialize_range(range)?);
        progress.report(Progress::of(end, total));
    }

    info!(target_level, parts = parts.len(), "Outline split complete");
    Ok(parts)
}

/// Page indices of nodes exactly `depth` levels down, in pre-order.
fn collect_split_points(nodes: &[OutlineNode], current: u32, depth: u32, out: &mut Vec<usize>) {
    for node in nodes {
        if current == depth {
            out.push(node.page_index as usize);
        } else {
            collect_split_points(&node.children, current + 1, depth, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::test_support::fixture_document;

    fn document(pages: usize) -> Document {
        // Width encodes the original page number for assertions.
        let sizes: Vec<(f64, f64)> = (0..pages).map(|i| (100.0 + i as f64, 100.0)).collect();
        fixture_document(&sizes)
    }

    fn origins(parts: &[Document]) -> Vec<Vec<usize>> {
        parts
            .iter()
            .map(|part| {
                part.pages()
                    .iter()
                    .map(|p| (p.width_pt - 100.0) as usize)
                    .collect()
            })
            .collect()
    }

    fn book() -> Outline {
        Outline::from(vec![
            OutlineNode::new("Preface", 0, 0),
            OutlineNode::new("Part I", 2, 0).with_children(vec![
                OutlineNode::new("Ch 1", 2, 1),
                OutlineNode::new("Ch 2", 4, 1),
            ]),
            OutlineNode::new("Part II", 6, 0).with_children(vec![OutlineNode::new("Ch 3", 7, 1)]),
        ])
    }

    #[test]
    fn splits_at_top_level_bookmarks() {
        let mut splitter = OutlineSplitter::new();
        let parts = splitter.split(&document(9), &book(), 1, &mut NoProgress).unwrap();
        assert_eq!(
            origins(&parts),
            vec![vec![0, 1], vec![2, 3, 4, 5], vec![6, 7, 8]]
        );
        assert_eq!(splitter.state(), OperationState::Completed);
    }

    #[test]
    fn second_level_adds_a_leading_part() {
        let parts = OutlineSplitter::new()
            .split(&document(9), &book(), 2, &mut NoProgress)
            .unwrap();
        assert_eq!(
            origins(&parts),
            vec![vec![0, 1], vec![2, 3], vec![4, 5, 6], vec![7, 8]]
        );
    }

    #[test]
    fn empty_level_falls_back_to_one_part_per_page() {
        let parts = OutlineSplitter::new()
            .split(&document(5), &book(), 3, &mut NoProgress)
            .unwrap();
        assert_eq!(parts.len(), 5);
        assert_eq!(origins(&parts), vec![vec![0], vec![1], vec![2], vec![3], vec![4]]);
    }

    #[test]
    fn no_outline_is_an_error() {
        let mut splitter = OutlineSplitter::new();
        let result = splitter.split(&document(3), &Outline::default(), 1, &mut NoProgress);
        assert!(matches!(result, Err(PagewerkError::NoOutline)));
        assert_eq!(splitter.state(), OperationState::Failed);
    }

    #[test]
    fn level_zero_is_rejected() {
        let result = OutlineSplitter::new().split(&document(3), &book(), 0, &mut NoProgress);
        assert!(matches!(result, Err(PagewerkError::InvalidOption(_))));
    }

    #[test]
    fn duplicate_unordered_and_stray_points_are_normalised() {
        let outline = Outline::from(vec![
            OutlineNode::new("B", 3, 0),
            OutlineNode::new("A", 1, 0),
            OutlineNode::new("A again", 1, 0),
            OutlineNode::new("Beyond", 40, 0),
        ]);
        let mut reports = Vec::new();
        let parts = OutlineSplitter::new()
            .split(&document(5), &outline, 1, &mut |p: Progress| reports.push(p.completed))
            .unwrap();
        assert_eq!(origins(&parts), vec![vec![0], vec![1, 2], vec![3, 4]]);
        assert_eq!(reports, vec![1, 3, 5]);
    }

    #[test]
    fn outline_is_not_modified() {
        let outline = book();
        let before = outline.clone();
        OutlineSplitter::new()
            .split(&document(9), &outline, 2, &mut NoProgress)
            .unwrap();
        assert_eq!(outline, before);
    }

    #[test]
    fn unanchored_bookmarks_fall_back_to_one_part_per_page() {
        let mut splitter = OutlineSplitter::new();
        let parts = splitter
            .split(&document(3), &Outline::new(Vec::new(), 2), 1, &mut NoProgress)
            .unwrap();
        assert_eq!(origins(&parts), vec![vec![0], vec![1], vec![2]]);
        assert_eq!(splitter.state(), OperationState::Completed);
    }
}
