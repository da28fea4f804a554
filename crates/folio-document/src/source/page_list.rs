// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered page list — insertion order is page order. Supports the add, remove,
// drag-reorder, and clear operations of the picker, and hands the exporter an
// immutable snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use folio_core::PageId;
use folio_core::error::{FolioError, Result};
use tracing::debug;

use super::page_source::{FileSource, PageSource};

/// Ordered, mutable sequence of page sources. Duplicates are allowed.
#[derive(Debug, Default, Clone)]
pub struct PageList {
    pages: Vec<Arc<dyn PageSource>>,
}

impl PageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list of file sources in the given order.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut list = Self::new();
        list.extend_paths(paths);
        list
    }

    /// Append a source and return its id.
    pub fn push(&mut self, source: impl PageSource + 'static) -> PageId {
        self.push_shared(Arc::new(source))
    }

    /// Append an already shared source.
    pub fn push_shared(&mut self, source: Arc<dyn PageSource>) -> PageId {
        let id = source.id();
        self.pages.push(source);
        id
    }

    /// Append one file source per path.
    pub fn extend_paths<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            self.push(FileSource::new(path));
        }
    }

    /// Insert a source at `index`, shifting later pages back.
    pub fn insert(&mut self, index: usize, source: impl PageSource + 'static) -> Result<PageId> {
        if index > self.pages.len() {
            return Err(FolioError::PageIndex {
                index,
                len: self.pages.len(),
            });
        }
        let source: Arc<dyn PageSource> = Arc::new(source);
        let id = source.id();
        self.pages.insert(index, source);
        Ok(id)
    }

    /// Remove and return the page at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Arc<dyn PageSource>> {
        self.check_index(index)?;
        Ok(self.pages.remove(index))
    }

    /// Move the page at `from` so that it ends up at position `to`.
    ///
    /// Both indexes refer to the list as it is before the move. The list is
    /// left unchanged if either is out of range.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        debug!(from, to, "page moved");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PageSource>> {
        self.pages.iter()
    }

    /// Ids in page order.
    pub fn ids(&self) -> Vec<PageId> {
        self.pages.iter().map(|p| p.id()).collect()
    }

    /// Copy of the ordered handle list. Later mutations of this list do not
    /// affect the snapshot.
    pub fn snapshot(&self) -> Vec<Arc<dyn PageSource>> {
        self.pages.clone()
    }

    /// Reject an empty list before an export is started.
    pub fn ensure_exportable(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(FolioError::EmptyPageList);
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.pages.len() {
            return Err(FolioError::PageIndex {
                index,
                len: self.pages.len(),
            });
        }
        Ok(())
    }
}
