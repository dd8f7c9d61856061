// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PagewerkError, Result};

/// Tunables exposed to the UI layer. Missing fields in a config file fall back
/// to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Blank-page sensitivity; a page is blank when its luminance variance is
    /// below `threshold * 255²`. UI range 0.001–0.1.
    pub blank_variance_threshold: f64,
    /// Pixels per point used when percentage crop rasterises a page.
    pub crop_working_scale: f64,
    /// Fraction of the fit scale kept when resize scales content (0.95 leaves
    /// a 5% margin).
    pub resize_margin_factor: f64,
    /// DPI that page geometry is assumed to be authored at.
    pub baseline_dpi: f64,
    /// Paper size preselected for resize.
    pub default_paper_size: crate::PaperSize,
    /// Serialise outputs with shared-object deduplication and stream compression.
    pub optimize_objects: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blank_variance_threshold: 0.01,
            crop_working_scale: 2.0,
            resize_margin_factor: 0.95,
            baseline_dpi: 72.0,
            default_paper_size: crate::PaperSize::A4,
            optimize_objects: true,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Serialise to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values outside their meaningful domain.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PagewerkError::InvalidOption(format!(
                    "{name} must be a positive number, got {value}"
                )))
            }
        };
        positive("blank_variance_threshold", self.blank_variance_threshold)?;
        positive("crop_working_scale", self.crop_working_scale)?;
        positive("resize_margin_factor", self.resize_margin_factor)?;
        positive("baseline_dpi", self.baseline_dpi)?;
        if self.resize_margin_factor > 1.0 {
            return Err(PagewerkError::InvalidOption(format!(
                "resize_margin_factor must not exceed 1.0, got {}",
                self.resize_margin_factor
            )));
        }
        Ok(())
    }
}
