// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open a produced document and inspect its pages using `lopdf`.

use std::path::Path;

use folio_core::PageSize;
use folio_core::error::{FolioError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument};

/// Read-only view of an existing PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            FolioError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            FolioError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// MediaBox size of every page, in page order, rounded to whole points.
    pub fn page_sizes(&self) -> Result<Vec<PageSize>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, id)| {
                self.media_box(id).ok_or_else(|| {
                    FolioError::PdfError(format!("page {number} has no usable MediaBox"))
                })
            })
            .collect()
    }

    /// Document title from the information dictionary.
    pub fn title(&self) -> Option<String> {
        let info = self.document.trailer.get(b"Info").ok()?;
        let info = match info {
            Object::Reference(id) => self.document.get_dictionary(*id).ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        match info.get(b"Title").ok()? {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// MediaBox of a page, following `Parent` links for inherited boxes.
    fn media_box(&self, page_id: ObjectId) -> Option<PageSize> {
        let mut dict: &Dictionary = self.document.get_dictionary(page_id).ok()?;
        loop {
            if let Ok(Object::Array(rect)) = dict.get(b"MediaBox") {
                return rect_size(rect);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.document.get_dictionary(parent).ok()?;
        }
    }
}

/// Width and height of a `[llx lly urx ury]` rectangle.
fn rect_size(rect: &[Object]) -> Option<PageSize> {
    let coords: Vec<f64> = rect.iter().map(number).collect::<Option<_>>()?;
    let [llx, lly, urx, ury] = coords.as_slice() else {
        return None;
    };
    let width = (urx - llx).abs().round();
    let height = (ury - lly).abs().round();
    Some(PageSize {
        width: width as u32,
        height: height as u32,
    })
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}
