// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Folio.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of one entry in a page list.
///
/// Each page source gets its own id, so the same image added twice yields
/// two distinct pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Standard paper sizes, used to pick a target page width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    /// Width in PDF points (1/72 inch), rounded to the nearest point.
    pub fn width_pt(&self) -> u32 {
        match self {
            Self::A4 => 595,
            Self::A5 => 420,
            Self::Letter | Self::Legal => 612,
        }
    }

    /// Parse a case-insensitive paper name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            _ => None,
        }
    }
}

/// Pixel (and point) dimensions of one output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    /// Size of a page scaled to `target_width`, preserving the source aspect
    /// ratio. The height is `round(h * W / w)` with halves rounded up.
    ///
    /// Returns `None` for a zero-sized source or a result that rounds to a
    /// zero height.
    pub fn fit_width(source_width: u32, source_height: u32, target_width: u32) -> Option<Self> {
        if source_width == 0 || source_height == 0 || target_width == 0 {
            return None;
        }
        // round(h * W / w) half-up, in integers so exact halves are not lost
        // to floating-point error.
        let (w, h, target) = (
            u128::from(source_width),
            u128::from(source_height),
            u128::from(target_width),
        );
        let height = (2 * h * target + w) / (2 * w);
        let height = u32::try_from(height).ok().filter(|&h| h > 0)?;
        Some(Self {
            width: target_width,
            height,
        })
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A page source that was dropped from the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPage {
    /// Zero-based position in the snapshotted input list.
    pub index: usize,
    pub id: PageId,
    /// Human-facing name of the source (usually a file path).
    pub label: String,
    /// Why the page was skipped.
    pub reason: String,
}

/// Successful outcome of an export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    /// Where the document was written; `None` for caller-supplied writers.
    pub path: Option<PathBuf>,
    /// Output page sizes in document order (page 1 first).
    pub pages: Vec<PageSize>,
    /// Sources that contributed no page.
    pub skipped: Vec<SkippedPage>,
    /// Size of the serialized document.
    pub bytes_written: u64,
    /// Hex-encoded SHA-256 of the serialized document.
    pub sha256: String,
    pub finished_at: DateTime<Utc>,
}

impl ExportReport {
    /// Number of pages in the produced document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True when every input source produced a page.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}
