//! Dual-sink cost persistence.
//!
//! Sink 1 writes one `cost_entries` row per ledger record through the
//! durable run record; run totals are recomputed by a database trigger.
//! Sink 2 flushes the same ledger to the spreadsheet. The sinks are
//! independent: a relational failure never skips the spreadsheet
//! attempt, and vice versa.

use promptforge_sheets::api::SheetsApiError;
use promptforge_sheets::sink::{LedgerFlush, LedgerSink};

use crate::context::{PersistenceError, RunRecord};

/// Failure of one or both cost sinks. Non-fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum CostLogError {
    #[error("relational cost insert failed: {0}")]
    Relational(PersistenceError),

    #[error("spreadsheet flush failed: {0}")]
    Spreadsheet(SheetsApiError),

    #[error("relational cost insert failed: {relational}; spreadsheet flush failed: {spreadsheet}")]
    Both {
        relational: PersistenceError,
        spreadsheet: SheetsApiError,
    },
}

/// Flush the run's cost ledger to every configured sink.
///
/// Each sink is attempted regardless of the other's outcome; the first
/// error per sink is kept for the step report. With no durable record
/// and no spreadsheet configured this logs a warning and succeeds.
pub async fn log_costs(
    record: Option<&dyn RunRecord>,
    sink: Option<&dyn LedgerSink>,
    flush: &LedgerFlush,
) -> Result<(), CostLogError> {
    if record.is_none() && sink.is_none() {
        tracing::warn!(
            run_key = %flush.run_key,
            "No cost sink configured, ledger stays in-process only",
        );
        return Ok(());
    }

    let relational_err = match record {
        Some(record) => record.record_costs(&flush.records).await.err(),
        None => None,
    };

    let spreadsheet_err = match sink {
        Some(sink) => sink.flush(flush).await.err(),
        None => None,
    };

    match (relational_err, spreadsheet_err) {
        (None, None) => Ok(()),
        (Some(r), None) => Err(CostLogError::Relational(r)),
        (None, Some(s)) => Err(CostLogError::Spreadsheet(s)),
        (Some(r), Some(s)) => Err(CostLogError::Both {
            relational: r,
            spreadsheet: s,
        }),
    }
}
