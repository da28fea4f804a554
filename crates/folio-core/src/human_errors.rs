// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the final export notice.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how a front end presents the message.

use std::io::ErrorKind as IoKind;

use crate::error::FolioError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// One page was dropped; the rest of the document is fine.
    PageSkipped,
    /// User must do something (pick images, choose another folder).
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether running the same export again could succeed.
    pub retriable: bool,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `FolioError` into a `HumanError` suitable for the final notice.
pub fn humanize_error(err: &FolioError) -> HumanError {
    match err {
        // -- Per-page errors --
        FolioError::SourceUnavailable(detail) => HumanError {
            message: "One of the images could not be opened.".into(),
            suggestion: format!("Check that the file still exists and can be read. ({detail})"),
            retriable: true,
            severity: Severity::PageSkipped,
        },

        FolioError::Decode(_) => HumanError {
            message: "One of the images could not be read.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::PageSkipped,
        },

        FolioError::Scale(_) => HumanError {
            message: "One of the images could not be resized.".into(),
            suggestion: "Very thin images may shrink to nothing at the chosen page width. Try a wider page.".into(),
            retriable: false,
            severity: Severity::PageSkipped,
        },

        // -- Export errors --
        FolioError::EmptyPageList => HumanError {
            message: "No pages to export.".into(),
            suggestion: "Add at least one image, then export again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::NoPagesProduced { attempted } => HumanError {
            message: "None of the images could be used.".into(),
            suggestion: format!(
                "All {attempted} image(s) were unreadable. Check the files open in an image viewer, then try again."
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::Sink { path, source } => humanize_sink_error(&path.display().to_string(), source),

        FolioError::Io(source) => humanize_sink_error("the output file", source),

        FolioError::PdfError(_) => HumanError {
            message: "This PDF file couldn't be read.".into(),
            suggestion: "The file may be damaged or not a PDF. Try opening it in a PDF viewer first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        FolioError::Write(_) | FolioError::Serialization(_) => HumanError {
            message: "Something went wrong while building the PDF.".into(),
            suggestion: "Try exporting again. If this keeps happening, remove the most recently added image.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },

        FolioError::Cancelled => HumanError {
            message: "Export cancelled.".into(),
            suggestion: "No file was saved.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        FolioError::PageIndex { index, len } => HumanError {
            message: "That page doesn't exist.".into(),
            suggestion: format!("Choose a page between 0 and {}. (Asked for {index})", len.saturating_sub(1)),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::InvalidConfig(detail) => HumanError {
            message: "The export settings aren't valid.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// Map an output I/O error to plain English based on its kind.
fn humanize_sink_error(target: &str, source: &std::io::Error) -> HumanError {
    match source.kind() {
        IoKind::PermissionDenied | IoKind::ReadOnlyFilesystem => HumanError {
            message: "The PDF can't be saved there.".into(),
            suggestion: format!("You don't have permission to write {target}. Choose another folder."),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        IoKind::NotFound => HumanError {
            message: "The folder for the PDF doesn't exist.".into(),
            suggestion: format!("Create the folder for {target} or choose another one."),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        IoKind::StorageFull => HumanError {
            message: "There isn't enough space to save the PDF.".into(),
            suggestion: "Free up some space, or export fewer pages.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: "The PDF couldn't be saved.".into(),
            suggestion: format!("Try again, or choose another folder. (Detail: {source})"),
            retriable: true,
            severity: Severity::Permanent,
        },
    }
}
