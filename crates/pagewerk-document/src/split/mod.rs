// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Splitting — partition a document into parts bounded by serialised size or
// by outline structure.

pub mod outline;
pub mod size;

pub use outline::OutlineSplitter;
pub use size::{SizeSplitter, SizedPart};

use pagewerk_core::OperationState;
use pagewerk_core::error::Result;

/// Run `body` under the `Idle → Processing → Completed | Failed` lifecycle.
fn tracked<T>(state: &mut OperationState, body: impl FnOnce() -> Result<T>) -> Result<T> {
    *state = OperationState::Processing;
    let result = body();
    *state = match result {
        Ok(_) => OperationState::Completed,
        Err(_) => OperationState::Failed,
    };
    result
}
