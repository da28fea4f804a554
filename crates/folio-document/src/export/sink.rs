// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File sink — writes the finished document next to its destination and renames
// it into place only once every byte is on disk. A sink dropped before
// `commit` removes its temporary file, so failed exports leave nothing behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use folio_core::error::{FolioError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Output file that appears atomically on [`FileSink::commit`].
#[derive(Debug)]
pub struct FileSink {
    /// Final destination.
    path: PathBuf,
    /// Temporary file in the destination directory.
    temp: NamedTempFile,
}

impl FileSink {
    /// Open a temporary file in the destination directory.
    ///
    /// Fails with [`FolioError::Sink`] when the directory is missing or not
    /// writable.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp = tempfile::Builder::new()
            .prefix(".folio-")
            .suffix(".pdf.part")
            .tempfile_in(&dir)
            .map_err(|err| FolioError::sink(&path, err))?;
        debug!(temp = %temp.path().display(), "Output sink opened");
        Ok(Self { path, temp })
    }

    /// Write the whole document to the temporary file.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let file = self.temp.as_file_mut();
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|err| FolioError::sink(&self.path, err))
    }

    /// Sync the temporary file and move it to the destination, replacing any
    /// existing file there.
    pub fn commit(self) -> Result<PathBuf> {
        let Self { path, temp } = self;
        temp.as_file()
            .sync_all()
            .map_err(|err| FolioError::sink(&path, err))?;
        temp.persist(&path)
            .map_err(|err| FolioError::sink(&path, err.error))?;
        info!("Wrote PDF to {}", path.display());
        Ok(path)
    }
}
