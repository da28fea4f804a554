// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations for the `folio` binary.

use std::path::{Path, PathBuf};

use clap::Args;
use folio_core::error::{FolioError, Result};
use folio_core::{ExportConfig, ExportReport, PageEncoding, PaperSize};
use folio_document::{DocumentExporter, PageList, PdfReader};
use tracing::info;

#[derive(Args)]
pub struct ExportArgs {
    /// Images to bind, in page order
    #[arg(value_name = "IMAGE")]
    images: Vec<PathBuf>,

    /// Output PDF file, or a directory to place the default file name in
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Page width in points (default 595, A4)
    #[arg(short, long, conflicts_with = "paper")]
    width: Option<u32>,

    /// Take the page width from a paper size (a4, a5, letter, legal)
    #[arg(long, value_parser = parse_paper)]
    paper: Option<PaperSize>,

    /// Store pages as JPEG at this quality (1-100) instead of lossless
    #[arg(long, value_name = "QUALITY")]
    jpeg: Option<u8>,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// JSON file with export settings; flags override it
    #[arg(long, value_name = "FILE", env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Move page FROM to position TO (0-based) before exporting; repeatable
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    moves: Vec<(usize, usize)>,

    /// Print the export report as JSON on stdout
    #[arg(long)]
    json: bool,
}

/// Build the page list, run the export off the main thread, and print the
/// single final outcome.
pub async fn export(args: ExportArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let mut pages = PageList::from_paths(args.images.iter().cloned());
    for &(from, to) in &args.moves {
        pages.move_page(from, to)?;
    }
    pages.ensure_exportable()?;

    let output = resolve_output(args.output.as_deref(), &config.output_file_name);
    let exporter = DocumentExporter::new(config)?;
    info!(pages = pages.len(), output = %output.display(), "exporting");

    let report = exporter.export_async(&pages, output).await?;
    print_report(&report, args.json)
}

/// Print page count and page sizes of an existing PDF.
pub fn inspect(file: &Path) -> Result<()> {
    let reader = PdfReader::open(file)?;
    println!("{}: {} page(s)", file.display(), reader.page_count());
    for (index, size) in reader.page_sizes()?.iter().enumerate() {
        println!("  page {}: {size} pt", index + 1);
    }
    Ok(())
}

fn resolve_config(args: &ExportArgs) -> Result<ExportConfig> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    };
    if let Some(paper) = args.paper {
        config.target_page_width = paper.width_pt();
    }
    if let Some(width) = args.width {
        config.target_page_width = width;
    }
    if let Some(quality) = args.jpeg {
        config.encoding = PageEncoding::Jpeg { quality };
    }
    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    config.validate()?;
    Ok(config)
}

/// A directory (or nothing) gets the configured default file name.
fn resolve_output(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

fn print_report(report: &ExportReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let location = report
        .path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    if report.is_complete() {
        println!("Exported {} page(s) to {location}", report.page_count());
    } else {
        println!(
            "Exported {} page(s) to {location} ({} skipped)",
            report.page_count(),
            report.skipped.len()
        );
    }
    for skipped in &report.skipped {
        println!("  skipped #{} {}: {}", skipped.index, skipped.label, skipped.reason);
    }
    Ok(())
}

fn parse_paper(value: &str) -> std::result::Result<PaperSize, String> {
    PaperSize::from_name(value).ok_or_else(|| format!("unknown paper size '{value}'"))
}

fn parse_move(value: &str) -> std::result::Result<(usize, usize), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|err| format!("invalid page index '{s}': {err}"))
    };
    Ok((parse(from)?, parse(to)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ExportArgs,
    }

    fn parse(argv: &[&str]) -> ExportArgs {
        Harness::try_parse_from(std::iter::once("folio").chain(argv.iter().copied()))
            .expect("valid arguments")
            .args
    }

    #[test]
    fn move_argument_parses() {
        assert_eq!(parse_move("3:0"), Ok((3, 0)));
        assert!(parse_move("3-0").is_err());
        assert!(parse_move("a:1").is_err());
    }

    #[test]
    fn paper_sets_width() {
        let args = parse(&["--paper", "letter", "a.png"]);
        assert_eq!(resolve_config(&args).unwrap().target_page_width, 612);
    }

    #[test]
    fn zero_width_is_rejected() {
        let args = parse(&["--width", "0", "a.png"]);
        assert!(matches!(resolve_config(&args), Err(FolioError::InvalidConfig(_))));
    }

    #[test]
    fn jpeg_flag_switches_encoding() {
        let args = parse(&["--jpeg", "70", "a.png"]);
        assert_eq!(
            resolve_config(&args).unwrap().encoding,
            PageEncoding::Jpeg { quality: 70 }
        );
    }

    #[test]
    fn directory_output_gets_default_name() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_output(Some(dir.path()), "folio_export.pdf"),
            dir.path().join("folio_export.pdf")
        );
        assert_eq!(
            resolve_output(None, "folio_export.pdf"),
            PathBuf::from("folio_export.pdf")
        );
    }

    #[tokio::test]
    async fn empty_image_list_is_rejected() {
        let err = export(parse(&[])).await.unwrap_err();
        assert!(matches!(err, FolioError::EmptyPageList));
    }
}
