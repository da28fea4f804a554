// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document exporter — binds an ordered list of images into one PDF whose pages
// all share the target width.
//
// Pages are processed one at a time in input order. A source that cannot be
// opened or decoded is skipped and recorded; only sink and serialization
// failures abort the export. At most one decoded image is alive at a time.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use folio_core::error::{FolioError, Result};
use folio_core::{ExportConfig, ExportReport, PageSize, SkippedPage};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use super::sink::FileSink;
use crate::image::decoder::{DecodedImage, ImageDecoder, RasterDecoder};
use crate::image::scaler::{ImageScaler, ResizeScaler};
use crate::pdf::writer::{DocumentFormat, DocumentWriter, PdfFormat};
use crate::source::page_list::PageList;
use crate::source::page_source::PageSource;

/// Cooperative cancellation flag, checked before each page.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Pages rendered into a writer, before serialization.
struct RenderedPages {
    sizes: Vec<PageSize>,
    skipped: Vec<SkippedPage>,
}

/// Orchestrates decoding, scaling, and page writing for one export.
///
/// The decoder, scaler, and document format are swappable, which lets tests
/// drive the pipeline with synthetic images.
#[derive(Clone)]
pub struct DocumentExporter {
    config: ExportConfig,
    decoder: Arc<dyn ImageDecoder>,
    scaler: Arc<dyn ImageScaler>,
    format: Arc<dyn DocumentFormat>,
    cancel: CancelToken,
}

impl DocumentExporter {
    /// Exporter with the default `image`-crate decoder, resize scaler, and
    /// `lopdf` writer, configured from `config`.
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            decoder: Arc::new(RasterDecoder::new(config.max_source_pixels)),
            scaler: Arc::new(ResizeScaler::new(config.filter)),
            format: Arc::new(PdfFormat::new(config.encoding)),
            cancel: CancelToken::new(),
            config,
        })
    }

    /// Default settings with the given page width.
    pub fn with_page_width(target_page_width: u32) -> Result<Self> {
        Self::new(ExportConfig::with_page_width(target_page_width))
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn ImageDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_scaler(mut self, scaler: Arc<dyn ImageScaler>) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn with_format(mut self, format: Arc<dyn DocumentFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Token that cancels exports started from this exporter.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    // -- Export entry points ---------------------------------------------------

    /// Export `pages` to the file at `path`.
    ///
    /// The output is created before any page is decoded, so an unwritable
    /// destination fails fast. On any failure no file is left at `path`
    /// (an existing file there is left untouched).
    #[instrument(skip_all, fields(page_count = pages.len(), width = self.config.target_page_width))]
    pub fn export_to_file(
        &self,
        pages: &[Arc<dyn PageSource>],
        path: impl AsRef<Path>,
    ) -> Result<ExportReport> {
        let snapshot = pages.to_vec();
        let mut sink = FileSink::create(path)?;

        let (bytes, rendered) = self.render(&snapshot)?;
        sink.write_all(&bytes)?;
        let path = sink.commit()?;

        Ok(self.report(Some(path), &bytes, rendered))
    }

    /// Export `pages` into a caller-supplied writer.
    ///
    /// Nothing is written unless the document was built successfully; the
    /// writer is flushed before returning.
    #[instrument(skip(self, pages, writer), fields(page_count = pages.len(), width = self.config.target_page_width))]
    pub fn export_to_writer<W: Write>(
        &self,
        pages: &[Arc<dyn PageSource>],
        writer: &mut W,
    ) -> Result<ExportReport> {
        let snapshot = pages.to_vec();
        let (bytes, rendered) = self.render(&snapshot)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(self.report(None, &bytes, rendered))
    }

    /// Run [`DocumentExporter::export_to_file`] on the blocking thread pool.
    ///
    /// The page list is snapshotted before the future is returned, so the
    /// caller may keep editing its list while the export runs. The future
    /// resolves exactly once, with the report or the failure.
    pub fn export_async(
        &self,
        pages: &PageList,
        path: PathBuf,
    ) -> impl Future<Output = Result<ExportReport>> + Send + use<> {
        let snapshot = pages.snapshot();
        let exporter = self.clone();
        async move {
            match tokio::task::spawn_blocking(move || exporter.export_to_file(&snapshot, &path))
                .await
            {
                Ok(result) => result,
                Err(err) => Err(FolioError::Write(format!("export task failed: {err}"))),
            }
        }
    }

    // -- Pipeline -------------------------------------------------------------

    /// Render every page and serialize the document.
    fn render(&self, pages: &[Arc<dyn PageSource>]) -> Result<(Vec<u8>, RenderedPages)> {
        info!(
            pages = pages.len(),
            width = self.config.target_page_width,
            "Starting export"
        );
        let mut writer = self.format.create_writer(&self.config.title);
        let rendered = self.render_pages(pages, writer.as_mut())?;
        let bytes = writer.finish()?;
        Ok((bytes, rendered))
    }

    fn render_pages(
        &self,
        pages: &[Arc<dyn PageSource>],
        writer: &mut dyn DocumentWriter,
    ) -> Result<RenderedPages> {
        let mut sizes = Vec::with_capacity(pages.len());
        let mut skipped = Vec::new();

        for (index, source) in pages.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(index, "Export cancelled");
                return Err(FolioError::Cancelled);
            }

            match self.render_page(source.as_ref()) {
                Ok(page) => {
                    writer.add_page(&page)?;
                    sizes.push(page.size());
                    debug!(
                        index,
                        page_number = sizes.len(),
                        size = %page.size(),
                        "Page written"
                    );
                    // `page` is dropped here, before the next source is opened.
                }
                Err(err) if err.is_per_page() => {
                    warn!(index, source = %source.label(), error = %err, "Skipping page");
                    skipped.push(SkippedPage {
                        index,
                        id: source.id(),
                        label: source.label(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        if sizes.is_empty() {
            return Err(FolioError::NoPagesProduced {
                attempted: pages.len(),
            });
        }
        Ok(RenderedPages { sizes, skipped })
    }

    /// Open, decode, and scale one source to the target width.
    fn render_page(&self, source: &dyn PageSource) -> Result<DecodedImage> {
        let bytes = read_source(source)?;
        let decoded = self.decoder.decode(&bytes)?;
        drop(bytes);

        let size = PageSize::fit_width(
            decoded.width(),
            decoded.height(),
            self.config.target_page_width,
        )
        .ok_or_else(|| {
            FolioError::Decode(format!(
                "{}x{} image cannot be fitted to a width of {}",
                decoded.width(),
                decoded.height(),
                self.config.target_page_width
            ))
        })?;
        debug!(from = %decoded.size(), to = %size, "Page geometry");

        // Thin, tall sources can pass the decoder's limit yet blow up once
        // scaled to the page width.
        let output_pixels = u64::from(size.width) * u64::from(size.height);
        if output_pixels > self.config.max_source_pixels {
            return Err(FolioError::Scale(format!(
                "scaled page {size} has {output_pixels} pixels, limit is {}",
                self.config.max_source_pixels
            )));
        }

        self.scaler.scale(decoded, size)
    }

    fn report(&self, path: Option<PathBuf>, bytes: &[u8], rendered: RenderedPages) -> ExportReport {
        let report = ExportReport {
            path,
            pages: rendered.sizes,
            skipped: rendered.skipped,
            bytes_written: bytes.len() as u64,
            sha256: hex::encode(Sha256::digest(bytes)),
            finished_at: Utc::now(),
        };
        info!(
            pages = report.page_count(),
            skipped = report.skipped.len(),
            bytes = report.bytes_written,
            "Export complete"
        );
        report
    }
}

/// Read a source's whole byte stream.
fn read_source(source: &dyn PageSource) -> Result<Vec<u8>> {
    let unavailable =
        |err: std::io::Error| FolioError::SourceUnavailable(format!("{}: {err}", source.label()));
    let mut stream = source.open().map_err(unavailable)?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).map_err(unavailable)?;
    Ok(bytes)
}

/// Export `pages` to `path` with default settings and the given page width.
pub fn export(
    pages: &PageList,
    target_page_width: u32,
    path: impl AsRef<Path>,
) -> Result<ExportReport> {
    DocumentExporter::with_page_width(target_page_width)?.export_to_file(&pages.snapshot(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;

    use folio_core::ResizeFilter;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use crate::image::decoder::PixelFormat;
    use crate::pdf::reader::PdfReader;
    use crate::source::page_source::{FileSource, MemorySource};

    // -- Synthetic collaborators ----------------------------------------------

    /// Decodes `b"WxH:tag"` into a gray image filled with `tag`.
    struct SyntheticDecoder;

    impl ImageDecoder for SyntheticDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<DecodedImage> {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| FolioError::Decode("not utf-8".into()))?;
            let (dims, tag) = text
                .split_once(':')
                .ok_or_else(|| FolioError::Decode("missing tag".into()))?;
            let (w, h) = dims
                .split_once('x')
                .ok_or_else(|| FolioError::Decode("missing size".into()))?;
            let w: u32 = w.parse().map_err(|_| FolioError::Decode("bad width".into()))?;
            let h: u32 = h.parse().map_err(|_| FolioError::Decode("bad height".into()))?;
            let tag: u8 = tag.parse().map_err(|_| FolioError::Decode("bad tag".into()))?;
            DecodedImage::new(w, h, PixelFormat::Luma8, vec![tag; (w * h) as usize])
        }
    }

    /// Scaler that only fills the target size with the source's first sample.
    struct FillScaler;

    impl ImageScaler for FillScaler {
        fn scale(&self, image: DecodedImage, size: PageSize) -> Result<DecodedImage> {
            let tag = image.pixels()[0];
            DecodedImage::new(
                size.width,
                size.height,
                PixelFormat::Luma8,
                vec![tag; (size.width * size.height) as usize],
            )
        }
    }

    /// Records (size, tag) of every page added, in order.
    #[derive(Default, Clone)]
    struct RecordingFormat {
        pages: Arc<Mutex<Vec<(PageSize, u8)>>>,
        fail_on_page: Option<usize>,
    }

    struct RecordingWriter {
        pages: Arc<Mutex<Vec<(PageSize, u8)>>>,
        fail_on_page: Option<usize>,
        count: usize,
    }

    impl DocumentFormat for RecordingFormat {
        fn create_writer(&self, _title: &str) -> Box<dyn DocumentWriter> {
            Box::new(RecordingWriter {
                pages: Arc::clone(&self.pages),
                fail_on_page: self.fail_on_page,
                count: 0,
            })
        }
    }

    impl DocumentWriter for RecordingWriter {
        fn add_page(&mut self, page: &DecodedImage) -> Result<()> {
            self.count += 1;
            if self.fail_on_page == Some(self.count) {
                return Err(FolioError::Write("injected failure".into()));
            }
            self.pages
                .lock()
                .unwrap()
                .push((page.size(), page.pixels()[0]));
            Ok(())
        }

        fn page_count(&self) -> usize {
            self.count
        }

        fn finish(self: Box<Self>) -> Result<Vec<u8>> {
            Ok(format!("pages={}", self.count).into_bytes())
        }
    }

    fn synthetic_exporter(width: u32, format: RecordingFormat) -> DocumentExporter {
        DocumentExporter::with_page_width(width)
            .unwrap()
            .with_decoder(Arc::new(SyntheticDecoder))
            .with_scaler(Arc::new(FillScaler))
            .with_format(Arc::new(format))
    }

    fn memory(encoded: &str) -> Arc<dyn PageSource> {
        Arc::new(MemorySource::new(encoded, encoded.as_bytes().to_vec()))
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 60, 90])));
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .expect("encode test image");
        buffer
    }

    // -- Pipeline behaviour ---------------------------------------------------

    #[test]
    fn unreadable_source_is_skipped_and_order_kept() {
        let format = RecordingFormat::default();
        let exporter = synthetic_exporter(595, format.clone());
        let pages = vec![
            memory("1000x2000:1"),
            Arc::new(FileSource::new("/no/such/image.png")) as Arc<dyn PageSource>,
            memory("800x400:3"),
        ];

        let mut out = Vec::<u8>::new();
        let report = exporter.export_to_writer(&pages, &mut out).unwrap();

        assert_eq!(
            *format.pages.lock().unwrap(),
            vec![
                (PageSize { width: 595, height: 1190 }, 1),
                (PageSize { width: 595, height: 298 }, 3),
            ]
        );
        assert_eq!(report.page_count(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(report.skipped[0].id, pages[1].id());
        assert_eq!(out, b"pages=2");
        assert_eq!(report.bytes_written, 7);
        assert!(report.path.is_none());
    }

    #[test]
    fn every_page_is_exactly_target_width() {
        let format = RecordingFormat::default();
        let exporter = synthetic_exporter(612, format.clone());
        let pages: Vec<_> = ["3x7:1", "1000x1:2", "612x900:3", "5000x300:4"]
            .into_iter()
            .map(memory)
            .collect();

        let report = exporter.export_to_writer(&pages, &mut Vec::<u8>::new()).unwrap();

        let expected = [(3, 7), (1000, 1), (612, 900), (5000, 300)]
            .map(|(w, h)| PageSize::fit_width(w, h, 612).unwrap());
        assert_eq!(report.pages, expected);
        assert!(report.pages.iter().all(|p| p.width == 612));
        assert_eq!(report.pages[0].height, 1428);
        assert_eq!(report.pages[1].height, 1);
    }

    #[test]
    fn all_failures_is_no_pages_produced() {
        let exporter = synthetic_exporter(595, RecordingFormat::default());
        let pages = vec![memory("garbage"), memory("0x10:1")];
        let err = exporter.export_to_writer(&pages, &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, FolioError::NoPagesProduced { attempted: 2 }));
    }

    #[test]
    fn empty_input_is_no_pages_produced() {
        let exporter = synthetic_exporter(595, RecordingFormat::default());
        let mut out = Vec::<u8>::new();
        let err = exporter.export_to_writer(&[], &mut out).unwrap_err();
        assert!(matches!(err, FolioError::NoPagesProduced { attempted: 0 }));
        assert!(out.is_empty());
    }

    #[test]
    fn writer_failure_aborts_the_export() {
        let format = RecordingFormat {
            fail_on_page: Some(2),
            ..RecordingFormat::default()
        };
        let exporter = synthetic_exporter(595, format);
        let pages = vec![memory("10x10:1"), memory("10x10:2"), memory("10x10:3")];
        let mut out = Vec::<u8>::new();
        let err = exporter.export_to_writer(&pages, &mut out).unwrap_err();
        assert!(matches!(err, FolioError::Write(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn oversized_scaled_page_is_skipped() {
        let format = RecordingFormat::default();
        let exporter = synthetic_exporter(595, format.clone());
        // 1x100000 is well under the source limit but scales to 595x59500000.
        let pages = vec![memory("1x100000:1"), memory("10x10:2")];

        let report = exporter.export_to_writer(&pages, &mut Vec::<u8>::new()).unwrap();

        assert_eq!(
            *format.pages.lock().unwrap(),
            vec![(PageSize { width: 595, height: 595 }, 2)]
        );
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 0);
        assert!(report.skipped[0].reason.contains("595x59500000"));
    }

    #[test]
    fn output_limit_follows_config() {
        let config = ExportConfig {
            max_source_pixels: 595 * 600,
            ..ExportConfig::default()
        };
        let exporter = DocumentExporter::new(config)
            .unwrap()
            .with_decoder(Arc::new(SyntheticDecoder))
            .with_scaler(Arc::new(FillScaler))
            .with_format(Arc::new(RecordingFormat::default()));

        let err = exporter
            .export_to_writer(&[memory("100x101:1")], &mut Vec::<u8>::new())
            .unwrap_err();
        assert!(matches!(err, FolioError::NoPagesProduced { attempted: 1 }));

        let report = exporter
            .export_to_writer(&[memory("100x100:1")], &mut Vec::<u8>::new())
            .unwrap();
        assert_eq!(report.pages, vec![PageSize { width: 595, height: 595 }]);
    }

    #[test]
    fn cancelled_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        let exporter = synthetic_exporter(595, RecordingFormat::default());
        exporter.cancel_token().cancel();

        let err = exporter
            .export_to_file(&[memory("10x10:1")], &target)
            .unwrap_err();
        assert!(matches!(err, FolioError::Cancelled));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    // -- Real decoder and PDF writer ------------------------------------------

    #[test]
    fn mixed_sources_produce_a_two_page_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book.pdf");
        let config = ExportConfig {
            filter: ResizeFilter::Triangle,
            ..ExportConfig::default()
        };
        let exporter = DocumentExporter::new(config).unwrap();

        let mut list = PageList::new();
        list.push(MemorySource::new("a.png", png(1000, 2000)));
        list.push(MemorySource::new("b.png", b"\x89PNG\r\n\x1a\n broken".to_vec()));
        list.push(MemorySource::new("c.png", png(800, 400)));

        let report = exporter.export_to_file(&list.snapshot(), &target).unwrap();
        assert_eq!(report.path.as_deref(), Some(target.as_path()));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].label, "b.png");

        let reader = PdfReader::open(&target).unwrap();
        assert_eq!(reader.source_path(), target.to_str());
        assert_eq!(
            reader.page_sizes().unwrap(),
            vec![
                PageSize { width: 595, height: 1190 },
                PageSize { width: 595, height: 298 },
            ]
        );
        let on_disk = std::fs::read(&target).unwrap();
        assert_eq!(report.bytes_written, on_disk.len() as u64);
        assert_eq!(report.sha256, hex::encode(Sha256::digest(&on_disk)));
    }

    #[test]
    fn corrupt_only_input_fails_and_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book.pdf");
        let exporter = DocumentExporter::with_page_width(595).unwrap();
        let pages = vec![memory("corrupt bytes")];

        let err = exporter.export_to_file(&pages, &target).unwrap_err();
        assert!(matches!(err, FolioError::NoPagesProduced { attempted: 1 }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn unwritable_destination_is_a_sink_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be.
        let not_a_dir = dir.path().join("blocker");
        std::fs::write(&not_a_dir, b"").unwrap();
        let target = not_a_dir.join("book.pdf");

        let exporter = DocumentExporter::with_page_width(595).unwrap();
        let pages = vec![Arc::new(MemorySource::new("a.png", png(20, 20))) as Arc<dyn PageSource>];

        let err = exporter.export_to_file(&pages, &target).unwrap_err();
        assert!(matches!(err, FolioError::Sink { .. }));
        assert!(!target.exists());
    }

    #[test]
    fn free_function_uses_given_width() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("letter.pdf");
        let mut list = PageList::new();
        list.push(MemorySource::new("a.png", png(100, 50)));

        let report = export(&list, 612, &target).unwrap();
        assert_eq!(report.pages, vec![PageSize { width: 612, height: 306 }]);
    }

    #[test]
    fn zero_width_is_rejected_up_front() {
        assert!(matches!(
            DocumentExporter::with_page_width(0),
            Err(FolioError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn async_export_uses_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("async.pdf");
        let exporter = DocumentExporter::with_page_width(595).unwrap();

        let mut list = PageList::new();
        list.push(MemorySource::new("a.png", png(50, 50)));
        list.push(MemorySource::new("b.png", png(50, 100)));

        let export = exporter.export_async(&list, target.clone());
        list.clear();
        let report = export.await.unwrap();

        assert_eq!(report.page_count(), 2);
        assert_eq!(PdfReader::open(&target).unwrap().page_count(), 2);
    }
}
