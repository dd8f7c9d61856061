// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pagewerk document engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{PagewerkError, Result};

/// Points per inch. The point is the native length unit of a PDF page.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Points per millimetre (72 / 25.4).
pub const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Length units accepted for custom page sizes and absolute crop margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    Pt,
    Mm,
    Inch,
}

impl LengthUnit {
    /// Convert a length in this unit to points.
    pub fn to_points(self, value: f64) -> f64 {
        match self {
            Self::Pt => value,
            Self::Mm => value * POINTS_PER_MM,
            Self::Inch => value * POINTS_PER_INCH,
        }
    }

    /// Convert a length in points to this unit.
    pub fn from_points(self, points: f64) -> f64 {
        match self {
            Self::Pt => points,
            Self::Mm => points / POINTS_PER_MM,
            Self::Inch => points / POINTS_PER_INCH,
        }
    }
}

/// Width and height of a page in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_pt: f64,
    pub height_pt: f64,
}

impl PageSize {
    pub fn new(width_pt: f64, height_pt: f64) -> Self {
        Self {
            width_pt,
            height_pt,
        }
    }

    /// Build a page size from dimensions in an arbitrary unit.
    ///
    /// Both dimensions must be finite and strictly positive.
    pub fn custom(width: f64, height: f64, unit: LengthUnit) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(PagewerkError::InvalidOption(format!(
                "page size must be positive, got {width} x {height} {unit:?}"
            )));
        }
        Ok(Self::new(unit.to_points(width), unit.to_points(height)))
    }

    /// The same size turned on its side.
    pub fn landscape(self) -> Self {
        Self::new(self.height_pt, self.width_pt)
    }

    /// Dimensions in the given unit (width, height).
    pub fn dimensions_in(&self, unit: LengthUnit) -> (f64, f64) {
        (unit.from_points(self.width_pt), unit.from_points(self.height_pt))
    }
}

/// Named paper presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PaperSize {
    /// Every preset, in the order the UI lists them.
    pub const ALL: [PaperSize; 6] = [
        Self::A4,
        Self::A3,
        Self::A5,
        Self::Letter,
        Self::Legal,
        Self::Tabloid,
    ];

    /// Portrait dimensions in points.
    pub fn size(&self) -> PageSize {
        match self {
            Self::A4 => PageSize::new(595.28, 841.89),
            Self::A3 => PageSize::new(841.89, 1190.55),
            Self::A5 => PageSize::new(420.94, 595.28),
            Self::Letter => PageSize::new(612.0, 792.0),
            Self::Legal => PageSize::new(612.0, 1008.0),
            Self::Tabloid => PageSize::new(792.0, 1224.0),
        }
    }

    /// Parse a preset name, ignoring case ("a4", "Letter", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "a3" => Some(Self::A3),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            "tabloid" | "ledger" => Some(Self::Tabloid),
            _ => None,
        }
    }
}

impl From<PaperSize> for PageSize {
    fn from(paper: PaperSize) -> Self {
        paper.size()
    }
}

/// Page rotation as stored in the page's `/Rotate` entry (clockwise).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalise any multiple of 90 (including negatives) into a rotation.
    /// Returns `None` for angles that are not a multiple of 90.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// Margins to trim from each page edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl CropMargins {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same margin on all four edges.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    fn values(&self) -> [f64; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    /// Check the margins are usable for `mode`.
    ///
    /// Negative or non-finite margins are always rejected. In percentage mode
    /// each margin must be within 0–100 and opposing margins must leave a
    /// strictly positive remainder.
    pub fn validate(&self, mode: CropMode) -> Result<()> {
        if self.values().iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(PagewerkError::InvalidRange(format!(
                "crop margins must be non-negative numbers, got {self:?}"
            )));
        }
        if mode == CropMode::Percentage {
            if self.values().iter().any(|v| *v > 100.0) {
                return Err(PagewerkError::InvalidRange(format!(
                    "percentage margins must be within 0-100, got {self:?}"
                )));
            }
            if self.left + self.right >= 100.0 || self.top + self.bottom >= 100.0 {
                return Err(PagewerkError::InvalidRange(format!(
                    "percentage margins leave nothing of the page: {self:?}"
                )));
            }
        }
        Ok(())
    }

    /// Margins converted to points (absolute mode).
    pub fn to_points(&self, unit: LengthUnit) -> Self {
        Self::new(
            unit.to_points(self.top),
            unit.to_points(self.right),
            unit.to_points(self.bottom),
            unit.to_points(self.left),
        )
    }

    /// Margins resolved in points against one page's own dimensions
    /// (percentage mode).
    pub fn resolve_percent(&self, width_pt: f64, height_pt: f64) -> Self {
        Self::new(
            height_pt * self.top / 100.0,
            width_pt * self.right / 100.0,
            height_pt * self.bottom / 100.0,
            width_pt * self.left / 100.0,
        )
    }
}

/// How crop margins are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropMode {
    /// Absolute lengths; only page geometry changes.
    Absolute(LengthUnit),
    /// Percent of each page's own width/height; the page is rasterised.
    Percentage,
}

/// Fill order of the N-up grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NUpDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Pages-per-sheet layout for N-up tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NUpLayout {
    pages_per_sheet: u32,
    direction: NUpDirection,
}

impl NUpLayout {
    /// Supported pages-per-sheet values.
    pub const SUPPORTED: [u32; 6] = [2, 4, 6, 8, 9, 16];

    pub fn new(pages_per_sheet: u32, direction: NUpDirection) -> Result<Self> {
        if !Self::SUPPORTED.contains(&pages_per_sheet) {
            return Err(PagewerkError::InvalidOption(format!(
                "{pages_per_sheet} pages per sheet is not supported (expected one of {:?})",
                Self::SUPPORTED
            )));
        }
        Ok(Self {
            pages_per_sheet,
            direction,
        })
    }

    pub fn pages_per_sheet(&self) -> u32 {
        self.pages_per_sheet
    }

    pub fn direction(&self) -> NUpDirection {
        self.direction
    }

    /// Grid dimensions as (columns, rows).
    pub fn grid(&self) -> (u32, u32) {
        match (self.pages_per_sheet, self.direction) {
            (2, NUpDirection::Horizontal) => (2, 1),
            (2, NUpDirection::Vertical) => (1, 2),
            (4, _) => (2, 2),
            (6, NUpDirection::Horizontal) => (3, 2),
            (6, NUpDirection::Vertical) => (2, 3),
            (8, NUpDirection::Horizontal) => (4, 2),
            (8, NUpDirection::Vertical) => (2, 4),
            (9, _) => (3, 3),
            // `new` only admits SUPPORTED values, leaving 16.
            _ => (4, 4),
        }
    }
}

/// Bitmap compression presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionPreset {
    /// Smaller output, render scale 1.5, JPEG quality 0.6.
    HighStrength,
    /// Better fidelity, render scale 2.0, JPEG quality 0.8.
    QualityFirst,
}

impl CompressionPreset {
    /// Render scale in pixels per point.
    pub fn render_scale(&self) -> f64 {
        match self {
            Self::HighStrength => 1.5,
            Self::QualityFirst => 2.0,
        }
    }

    /// Lossy encoding quality in 0.0–1.0.
    pub fn quality(&self) -> f32 {
        match self {
            Self::HighStrength => 0.6,
            Self::QualityFirst => 0.8,
        }
    }
}

/// Recompression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionMode {
    /// Re-serialise with structural optimisation; nothing is rasterised.
    VectorPreserving,
    /// Re-render every page to a lossy bitmap.
    Bitmap(CompressionPreset),
}

/// One bookmark in a document's outline tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub title: String,
    /// 0-based index of the page the bookmark points at.
    pub page_index: u32,
    /// 0-based nesting depth (top-level bookmarks are 0).
    pub level: u32,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(title: impl Into<String>, page_index: u32, level: u32) -> Self {
        Self {
            title: title.into(),
            page_index,
            level,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }
}

/// A document's bookmarks, mapped onto its pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Top-level bookmarks that point at a page of the document.
    pub nodes: Vec<OutlineNode>,
    /// Bookmarks in the file that point nowhere in it (URI or remote
    /// actions, dangling references). They do not appear in `nodes`.
    pub unanchored: usize,
}

impl Outline {
    pub fn new(nodes: Vec<OutlineNode>, unanchored: usize) -> Self {
        Self { nodes, unanchored }
    }

    /// True when the file has no bookmarks at all, anchored or not.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.unanchored == 0
    }
}

impl From<Vec<OutlineNode>> for Outline {
    fn from(nodes: Vec<OutlineNode>) -> Self {
        Self::new(nodes, 0)
    }
}

/// Lifecycle of a long-running operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationState {
    #[default]
    Idle,
    Processing,
    Completed,
    Failed,
}

/// A parsed, validated set of pages (0-based, sorted, unique).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelection {
    indices: Vec<usize>,
}

impl PageSelection {
    /// Parse a 1-based page range expression such as `"1-3, 5, 8-"` against a
    /// document of `page_count` pages.
    ///
    /// `a-` runs to the last page and `-b` starts at the first one.
    pub fn parse(input: &str, page_count: usize) -> Result<Self> {
        let mut pages = BTreeSet::new();

        for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (start, end) = match token.split_once('-') {
                Some((a, b)) => {
                    let start = if a.trim().is_empty() {
                        1
                    } else {
                        parse_page_number(a, token)?
                    };
                    let end = if b.trim().is_empty() {
                        page_count
                    } else {
                        parse_page_number(b, token)?
                    };
                    (start, end)
                }
                None => {
                    let page = parse_page_number(token, token)?;
                    (page, page)
                }
            };

            if start > end {
                return Err(PagewerkError::InvalidRange(format!(
                    "range '{token}' runs backwards"
                )));
            }
            if end > page_count {
                return Err(PagewerkError::InvalidRange(format!(
                    "range '{token}' exceeds the document's {page_count} pages"
                )));
            }
            pages.extend((start - 1)..end);
        }

        if pages.is_empty() {
            return Err(PagewerkError::InvalidRange(format!(
                "'{input}' selects no pages"
            )));
        }

        Ok(Self {
            indices: pages.into_iter().collect(),
        })
    }

    /// Build a selection from 0-based indices.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let set: BTreeSet<usize> = indices.into_iter().collect();
        Self {
            indices: set.into_iter().collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

fn parse_page_number(text: &str, token: &str) -> Result<usize> {
    let page: usize = text.trim().parse().map_err(|_| {
        PagewerkError::InvalidRange(format!("'{token}' is not a page number or range"))
    })?;
    if page == 0 {
        return Err(PagewerkError::InvalidRange(
            "page numbers start at 1".to_string(),
        ));
    }
    Ok(page)
}
