// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress reporting for long-running, page-by-page operations.
//
// Progress is purely observational. A sink cannot cancel an operation or make
// it skip pages; it only hears about work already done.

/// A snapshot of how far an operation has got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Units of work done (pages rendered, pages placed into parts, ...).
    pub completed: usize,
    pub total: usize,
    /// 0–100.
    pub percent: u8,
}

impl Progress {
    /// `completed` of `total`, rounded to the nearest percent and capped at
    /// `cap`. An empty operation counts as finished.
    pub fn capped(completed: usize, total: usize, cap: u8) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((completed as f64 * 100.0 / total as f64).round() as u64).min(100) as u8
        };
        Self {
            completed,
            total,
            percent: percent.min(cap),
        }
    }

    pub fn of(completed: usize, total: usize) -> Self {
        Self::capped(completed, total, 100)
    }

    /// The final 100% report.
    pub fn done(total: usize) -> Self {
        Self {
            completed: total,
            total,
            percent: 100,
        }
    }
}

/// Receives [`Progress`] updates.
pub trait ProgressSink {
    fn report(&mut self, progress: Progress);
}

impl<F: FnMut(Progress)> ProgressSink for F {
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: Progress) {}
}
