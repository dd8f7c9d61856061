// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagewerk.

use thiserror::Error;

/// Top-level error type for all Pagewerk operations.
///
/// Every core operation is all-or-nothing: the first error aborts the whole
/// operation and no partial output is returned alongside it.
#[derive(Debug, Error)]
pub enum PagewerkError {
    // -- Input errors --
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // -- Processing errors --
    #[error("rendering failed for page {page}: {detail}")]
    RenderFailure { page: usize, detail: String },

    #[error("document has no outline (bookmarks)")]
    NoOutline,

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Configuration / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagewerkError>;
