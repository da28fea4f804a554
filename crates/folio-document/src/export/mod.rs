// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export module — the page-by-page export pipeline and its output sinks.

pub mod exporter;
pub mod sink;

pub use exporter::{CancelToken, DocumentExporter, export};
pub use sink::FileSink;
