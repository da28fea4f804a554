// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source module — re-readable image sources and the ordered page list.

pub mod page_list;
pub mod page_source;

pub use page_list::PageList;
pub use page_source::{FileSource, MemorySource, PageSource};
