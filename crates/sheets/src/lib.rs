//! Spreadsheet-style cost ledger sink.
//!
//! [`api::SheetsApi`] wraps the Drive/Sheets REST endpoints;
//! [`sink::LedgerSink`] is the trait seam the pipeline engine flushes
//! through, with pure row-building helpers alongside it.

pub mod api;
pub mod sink;

pub use api::{SheetsApi, SheetsApiError, SheetsConfig};
pub use sink::{LedgerFlush, LedgerSink};
