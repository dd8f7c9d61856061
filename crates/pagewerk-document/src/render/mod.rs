// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Renderers — implementations of `crate::backend::Renderer`.
//
// Rasterising PDF content needs a real rendering engine; the pdfium-backed
// renderer is compiled only with the "pdfium" feature.

#[cfg(feature = "pdfium")]
pub mod pdfium;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRenderer;
