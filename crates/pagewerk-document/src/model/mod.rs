// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document model — page arena, content layers, and affine transforms.

pub mod document;
pub mod page;
pub mod transform;

pub use document::Document;
pub use page::{ContentSource, ImageHandle, Layer, Page, SourceId};
pub use transform::Transform;
