// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Per-page errors (recovered by skipping the page) --
    #[error("page source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image scaling failed: {0}")]
    Scale(String),

    // -- Export errors --
    #[error("nothing to export: the page list is empty")]
    EmptyPageList,

    #[error("no pages produced: all {attempted} page source(s) failed to decode")]
    NoPagesProduced { attempted: usize },

    #[error("cannot write output document {}: {source}", path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document write failed: {0}")]
    Write(String),

    #[error("export cancelled")]
    Cancelled,

    // -- Page list --
    #[error("page index {index} out of range (list has {len} page(s))")]
    PageIndex { index: usize, len: usize },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Generic I/O and serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("PDF operation failed: {0}")]
    PdfError(String),
}

/// How an error affects an export in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Affects a single page; the page is skipped and the export continues.
    PerPage,
    /// There was nothing to write: an empty list, or every page failed.
    NothingToExport,
    /// The output destination could not be opened or written.
    Sink,
    /// Page composition or serialization failed unexpectedly.
    InternalWrite,
    /// The caller cancelled the export.
    Cancelled,
    /// Bad configuration or a bad argument from the caller.
    Config,
}

impl FolioError {
    /// Classify this error for the export failure policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceUnavailable(_) | Self::Decode(_) | Self::Scale(_) => ErrorKind::PerPage,
            Self::EmptyPageList | Self::NoPagesProduced { .. } => ErrorKind::NothingToExport,
            Self::Sink { .. } | Self::Io(_) => ErrorKind::Sink,
            Self::Write(_) | Self::Serialization(_) | Self::PdfError(_) => {
                ErrorKind::InternalWrite
            }
            Self::Cancelled => ErrorKind::Cancelled,
            Self::PageIndex { .. } | Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// Build a sink error for `path`.
    pub fn sink(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Sink {
            path: path.into(),
            source,
        }
    }

    /// True when the error only costs a single page.
    pub fn is_per_page(&self) -> bool {
        self.kind() == ErrorKind::PerPage
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
