// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — Document processing for Folio.
//
// Provides page sources and the ordered page list, image decoding and scaling,
// a streaming PDF page writer and reader (via `lopdf`), and the exporter that
// binds an ordered list of images into one fixed-width PDF.

pub mod export;
pub mod image;
pub mod pdf;
pub mod source;

// Re-export the primary types so callers can use `folio_document::DocumentExporter` etc.
pub use export::exporter::{CancelToken, DocumentExporter, export};
pub use export::sink::FileSink;
pub use image::decoder::{DecodedImage, ImageDecoder, PixelFormat, RasterDecoder};
pub use image::scaler::{ImageScaler, ResizeScaler};
pub use pdf::reader::PdfReader;
pub use pdf::writer::{DocumentFormat, DocumentWriter, PdfFormat, PdfPageWriter};
pub use source::page_list::PageList;
pub use source::page_source::{FileSource, MemorySource, PageSource};
