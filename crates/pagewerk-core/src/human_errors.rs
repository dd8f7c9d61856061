// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the UI layer.
//
// Every engine error is mapped to plain English with a clear suggestion. The
// severity drives how the caller presents it.

use crate::error::PagewerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user must change their input (page range, margins, settings).
    ActionRequired,
    /// The document itself cannot be processed this way.
    Permanent,
    /// Something went wrong inside the engine; trying again may help.
    Internal,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether running the same operation again could succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `PagewerkError` into a `HumanError`.
pub fn humanize_error(err: &PagewerkError) -> HumanError {
    match err {
        // -- Input errors --
        PagewerkError::MalformedDocument(_) => HumanError {
            message: "This file couldn't be opened as a PDF.".into(),
            suggestion: "The file may be damaged or not a PDF. Try opening it in a PDF viewer."
                .into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PagewerkError::InvalidRange(detail) => HumanError {
            message: "The pages or margins you entered can't be used.".into(),
            suggestion: format!("Check the numbers and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewerkError::InvalidOption(detail) => HumanError {
            message: "One of the settings is out of range.".into(),
            suggestion: format!("Adjust the setting and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewerkError::PageOutOfRange { page, total } => HumanError {
            message: "That page doesn't exist.".into(),
            suggestion: format!(
                "This document has {total} pages; page {} isn't one of them.",
                page + 1
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Processing errors --
        PagewerkError::RenderFailure { page, .. } => HumanError {
            message: format!("Page {} couldn't be drawn.", page + 1),
            suggestion: "Nothing was saved. Try the vector-preserving option instead.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },

        PagewerkError::NoOutline => HumanError {
            message: "This document has no bookmarks.".into(),
            suggestion: "Splitting by bookmarks needs an outline. Try splitting by size instead."
                .into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PagewerkError::PdfError(_) => HumanError {
            message: "The new PDF couldn't be written.".into(),
            suggestion: "Try again. If this keeps happening, the file may be unusual.".into(),
            retriable: true,
            severity: Severity::Internal,
        },

        PagewerkError::ImageError(_) => HumanError {
            message: "A page image couldn't be processed.".into(),
            suggestion: "Try a different quality setting, or use the vector-preserving option."
                .into(),
            retriable: true,
            severity: Severity::Internal,
        },

        // -- Configuration --
        PagewerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The settings file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Defaults will be used.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading the settings file.".into(),
                    suggestion: "Try again. If this keeps happening, check the file's permissions."
                        .into(),
                    retriable: true,
                    severity: Severity::Internal,
                }
            }
        }

        PagewerkError::Serialization(_) => HumanError {
            message: "The settings file isn't in the expected format.".into(),
            suggestion: "Fix the file or delete it to go back to the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
