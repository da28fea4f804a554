// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page sources — opaque, re-readable references to one input image.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

use folio_core::PageId;

/// A re-readable origin of one input image.
///
/// Sources are owned by the caller and shared with the exporter through
/// `Arc`; the exporter only ever calls [`PageSource::open`].
pub trait PageSource: Send + Sync + std::fmt::Debug {
    /// Stable identity of this entry.
    fn id(&self) -> PageId;

    /// Human-facing name used in logs and skip reports.
    fn label(&self) -> String;

    /// Open a fresh byte stream over the encoded image.
    fn open(&self) -> std::io::Result<Box<dyn Read + Send>>;
}

/// An image file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    id: PageId,
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: PageId::new(),
            path: path.into(),
        }
    }
}

impl PageSource for FileSource {
    fn id(&self) -> PageId {
        self.id
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(file))
    }
}

/// Encoded image bytes already held in memory.
///
/// Cloning shares the underlying buffer.
#[derive(Clone)]
pub struct MemorySource {
    id: PageId,
    label: String,
    bytes: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: PageId::new(),
            label: label.into(),
            bytes: bytes.into(),
        }
    }
}

impl std::fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySource")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl PageSource for MemorySource {
    fn id(&self) -> PageId {
        self.id
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.bytes))))
    }
}
