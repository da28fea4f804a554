// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — builds a multi-page document with one full-bleed image per page
// using `lopdf`.
//
// Each page image is compressed as soon as it is added, so the writer holds
// only encoded streams and never more than one raw pixel buffer (borrowed from
// the caller).

use chrono::Utc;
use folio_core::PageEncoding;
use folio_core::error::{FolioError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, info, instrument};

use crate::image::decoder::{DecodedImage, PixelFormat};

/// Accumulates pages and serializes them into one document. A writer lives
/// on the thread that runs the export.
pub trait DocumentWriter {
    /// Append one page sized exactly to `page`, with the image drawn at the
    /// origin and no margin.
    fn add_page(&mut self, page: &DecodedImage) -> Result<()>;

    /// Pages added so far.
    fn page_count(&self) -> usize;

    /// Serialize the document.
    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

/// Creates a fresh [`DocumentWriter`] for each export.
pub trait DocumentFormat: Send + Sync {
    fn create_writer(&self, title: &str) -> Box<dyn DocumentWriter>;
}

/// PDF output built with `lopdf`.
#[derive(Debug, Clone, Copy)]
pub struct PdfFormat {
    encoding: PageEncoding,
}

impl PdfFormat {
    pub fn new(encoding: PageEncoding) -> Self {
        Self { encoding }
    }
}

impl Default for PdfFormat {
    fn default() -> Self {
        Self::new(PageEncoding::Flate)
    }
}

impl DocumentFormat for PdfFormat {
    fn create_writer(&self, title: &str) -> Box<dyn DocumentWriter> {
        Box::new(PdfPageWriter::new(title, self.encoding))
    }
}

/// Writes one image XObject and one page object per added page.
///
/// Page geometry is in PDF points, one image pixel per point, so a page
/// added from a 595-pixel-wide image is 595 points (A4) wide.
pub struct PdfPageWriter {
    document: Document,
    /// Reserved id of the page tree root; written in `finish`.
    pages_id: ObjectId,
    kids: Vec<Object>,
    encoding: PageEncoding,
    title: String,
}

impl PdfPageWriter {
    pub fn new(title: impl Into<String>, encoding: PageEncoding) -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
            encoding,
            title: title.into(),
        }
    }

    /// Build the image XObject stream for `page`.
    fn image_stream(&self, page: &DecodedImage) -> Result<Stream> {
        let color_space = match page.format() {
            PixelFormat::Rgb8 => "DeviceRGB",
            PixelFormat::Luma8 => "DeviceGray",
        };
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(page.width()),
            "Height" => i64::from(page.height()),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
        };

        match self.encoding {
            PageEncoding::Flate => {
                let mut stream = Stream::new(dict, page.pixels().to_vec());
                stream
                    .compress()
                    .map_err(|err| FolioError::Write(format!("page compression failed: {err}")))?;
                Ok(stream)
            }
            PageEncoding::Jpeg { quality } => {
                let color_type = match page.format() {
                    PixelFormat::Rgb8 => ExtendedColorType::Rgb8,
                    PixelFormat::Luma8 => ExtendedColorType::L8,
                };
                let mut jpeg = Vec::new();
                JpegEncoder::new_with_quality(&mut jpeg, quality)
                    .write_image(page.pixels(), page.width(), page.height(), color_type)
                    .map_err(|err| FolioError::Write(format!("JPEG encoding failed: {err}")))?;
                dict.set("Filter", "DCTDecode");
                Ok(Stream::new(dict, jpeg).with_compression(false))
            }
        }
    }
}

impl DocumentWriter for PdfPageWriter {
    #[instrument(skip(self, page), fields(page_number = self.kids.len() + 1, size = %page.size()))]
    fn add_page(&mut self, page: &DecodedImage) -> Result<()> {
        let (width, height) = (i64::from(page.width()), i64::from(page.height()));

        let image_id = self.document.add_object(self.image_stream(page)?);

        // Map the unit square onto the full page: [w 0 0 h 0 0] cm.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![width.into(), 0.into(), 0.into(), height.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|err| FolioError::Write(format!("content stream encoding failed: {err}")))?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "Contents" => content_id,
        });
        self.kids.push(page_id.into());

        debug!(width, height, "Page added");
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.kids.len()
    }

    #[instrument(skip(self), fields(pages = self.kids.len()))]
    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let Self {
            mut document,
            pages_id,
            kids,
            title,
            ..
        } = *self;

        let count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = document.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal(concat!("Folio ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(created),
        });
        document.trailer.set("Root", catalog_id);
        document.trailer.set("Info", info_id);

        let mut output = Vec::new();
        document
            .save_to(&mut output)
            .map_err(|err| FolioError::Write(format!("PDF serialization failed: {err}")))?;

        info!(pages = count, bytes = output.len(), "PDF document serialized");
        Ok(output)
    }
}
