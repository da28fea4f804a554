// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Default target page width: ISO A4 in points at 72 dpi.
pub const DEFAULT_PAGE_WIDTH: u32 = 595;

/// How page images are compressed inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PageEncoding {
    /// Lossless Flate-compressed raw samples.
    Flate,
    /// Baseline JPEG at the given quality (1-100).
    Jpeg { quality: u8 },
}

/// Resampling filter used when scaling images to the page width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

/// Settings for a single export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Width of every output page, in points. Must be positive.
    pub target_page_width: u32,
    /// Title written to the document information dictionary.
    pub title: String,
    /// Page image compression.
    pub encoding: PageEncoding,
    /// Resampling filter.
    pub filter: ResizeFilter,
    /// Largest image (width * height) accepted, both as decoded and as
    /// scaled to the page width.
    pub max_source_pixels: u64,
    /// File name used when the output location is a directory.
    pub output_file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target_page_width: DEFAULT_PAGE_WIDTH,
            title: "Folio Export".into(),
            encoding: PageEncoding::Flate,
            filter: ResizeFilter::Lanczos3,
            max_source_pixels: 100_000_000,
            output_file_name: "folio_export.pdf".into(),
        }
    }
}

impl ExportConfig {
    /// Default settings with a different page width.
    pub fn with_page_width(target_page_width: u32) -> Self {
        Self {
            target_page_width,
            ..Self::default()
        }
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    ///
    /// An unreadable or malformed file is reported as `InvalidConfig`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FolioError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            FolioError::InvalidConfig(format!("{} is not valid JSON: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the exporter cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.target_page_width == 0 {
            return Err(FolioError::InvalidConfig(
                "target page width must be a positive integer".into(),
            ));
        }
        if let PageEncoding::Jpeg { quality } = self.encoding {
            if !(1..=100).contains(&quality) {
                return Err(FolioError::InvalidConfig(format!(
                    "JPEG quality must be between 1 and 100, got {quality}"
                )));
            }
        }
        if self.max_source_pixels == 0 {
            return Err(FolioError::InvalidConfig(
                "max_source_pixels must be positive".into(),
            ));
        }
        if self.output_file_name.trim().is_empty() {
            return Err(FolioError::InvalidConfig(
                "output file name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
