//! Ledger sink trait and row building.
//!
//! Row construction is pure so it can be unit-tested without HTTP; the
//! [`LedgerSink`] implementation for [`SheetsApi`] sequences the REST
//! calls: folder, spreadsheet, headers, appends, summary rewrite.

use async_trait::async_trait;
use promptforge_core::ledger::CostRecord;
use promptforge_core::pricing::TokenUsage;

use crate::api::{SheetsApi, SheetsApiError, COSTS_TAB, SUMMARY_TAB, VERSIONS_TAB};

/// Header row for the costs tab.
pub const COST_HEADERS: &[&str] = &[
    "Timestamp",
    "Run",
    "Account",
    "Assistant",
    "Operation",
    "Model",
    "Input Tokens",
    "Output Tokens",
    "Cache Read",
    "Cache Write",
    "Cost (USD)",
];

/// Header row for the versions tab.
pub const VERSION_HEADERS: &[&str] = &[
    "Timestamp",
    "Run",
    "Assistant",
    "Version",
    "Iterations",
    "Prompt Hash",
    "Total Cost (USD)",
];

/// Everything the spreadsheet sink needs for one run's flush.
#[derive(Debug, Clone)]
pub struct LedgerFlush {
    pub run_key: String,
    pub account_key: String,
    pub assistant_key: String,
    pub records: Vec<CostRecord>,
    /// Version label of the saved prompt, when one was assigned.
    pub version: Option<String>,
    pub total_iterations: i32,
    pub prompt_hash: Option<String>,
    pub totals: TokenUsage,
    pub total_cost_usd: f64,
}

/// Anything that can receive one run's cost ledger.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    async fn flush(&self, flush: &LedgerFlush) -> Result<(), SheetsApiError>;
}

// ---------------------------------------------------------------------------
// Row builders
// ---------------------------------------------------------------------------

/// Build one costs-tab row from a cost record.
pub fn cost_row(flush: &LedgerFlush, record: &CostRecord) -> Vec<String> {
    vec![
        record.recorded_at.to_rfc3339(),
        flush.run_key.clone(),
        flush.account_key.clone(),
        flush.assistant_key.clone(),
        record.operation.as_str().to_string(),
        record.model.clone(),
        record.usage.input_tokens.to_string(),
        record.usage.output_tokens.to_string(),
        record.usage.cache_read_tokens.to_string(),
        record.usage.cache_write_tokens.to_string(),
        format!("{:.6}", record.cost_usd),
    ]
}

/// Build the versions-tab row for the saved prompt version.
pub fn version_row(flush: &LedgerFlush) -> Option<Vec<String>> {
    let version = flush.version.as_ref()?;
    Some(vec![
        chrono::Utc::now().to_rfc3339(),
        flush.run_key.clone(),
        flush.assistant_key.clone(),
        version.clone(),
        flush.total_iterations.to_string(),
        flush.prompt_hash.clone().unwrap_or_default(),
        format!("{:.6}", flush.total_cost_usd),
    ])
}

/// Build the summary block rewritten on every flush.
pub fn summary_rows(flush: &LedgerFlush) -> Vec<Vec<String>> {
    vec![
        vec!["Last Run".to_string(), flush.run_key.clone()],
        vec![
            "Last Updated".to_string(),
            chrono::Utc::now().to_rfc3339(),
        ],
        vec![
            "Input Tokens".to_string(),
            flush.totals.input_tokens.to_string(),
        ],
        vec![
            "Output Tokens".to_string(),
            flush.totals.output_tokens.to_string(),
        ],
        vec![
            "Total Cost (USD)".to_string(),
            format!("{:.6}", flush.total_cost_usd),
        ],
    ]
}

// ---------------------------------------------------------------------------
// SheetsApi sink
// ---------------------------------------------------------------------------

#[async_trait]
impl LedgerSink for SheetsApi {
    async fn flush(&self, flush: &LedgerFlush) -> Result<(), SheetsApiError> {
        let folder_id = self.find_or_create_folder().await?;
        let spreadsheet_id = self.find_or_create_spreadsheet(&folder_id).await?;

        self.ensure_headers(&spreadsheet_id, COSTS_TAB, COST_HEADERS)
            .await?;
        self.ensure_headers(&spreadsheet_id, VERSIONS_TAB, VERSION_HEADERS)
            .await?;

        let cost_rows: Vec<Vec<String>> = flush
            .records
            .iter()
            .map(|r| cost_row(flush, r))
            .collect();
        self.append_rows(&spreadsheet_id, COSTS_TAB, &cost_rows)
            .await?;

        if let Some(row) = version_row(flush) {
            self.append_rows(&spreadsheet_id, VERSIONS_TAB, &[row])
                .await?;
        }

        let summary = summary_rows(flush);
        let range = format!("{SUMMARY_TAB}!A1:B{}", summary.len());
        self.update_range(&spreadsheet_id, &range, &summary).await?;

        tracing::info!(
            run_key = %flush.run_key,
            entries = flush.records.len(),
            "Flushed cost ledger to spreadsheet",
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use promptforge_core::ledger::Operation;

    fn flush() -> LedgerFlush {
        LedgerFlush {
            run_key: "pipeline_abc".to_string(),
            account_key: "acct-1".to_string(),
            assistant_key: "asst-1".to_string(),
            records: vec![CostRecord {
                operation: Operation::Generation,
                model: "claude-sonnet-4-5".to_string(),
                usage: TokenUsage {
                    input_tokens: 100,
                    output_tokens: 50,
                    ..Default::default()
                },
                cost_usd: 0.00105,
                recorded_at: chrono::Utc::now(),
            }],
            version: Some("v2".to_string()),
            total_iterations: 1,
            prompt_hash: Some("deadbeef".to_string()),
            totals: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
                ..Default::default()
            },
            total_cost_usd: 0.00105,
        }
    }

    #[test]
    fn cost_row_matches_header_width() {
        let f = flush();
        let row = cost_row(&f, &f.records[0]);
        assert_eq!(row.len(), COST_HEADERS.len());
        assert_eq!(row[4], "generation");
        assert_eq!(row[6], "100");
        assert_eq!(row[10], "0.001050");
    }

    #[test]
    fn version_row_matches_header_width() {
        let f = flush();
        let row = version_row(&f).unwrap();
        assert_eq!(row.len(), VERSION_HEADERS.len());
        assert_eq!(row[3], "v2");
        assert_eq!(row[5], "deadbeef");
    }

    #[test]
    fn version_row_absent_without_version() {
        let mut f = flush();
        f.version = None;
        assert!(version_row(&f).is_none());
    }

    #[test]
    fn summary_block_carries_totals() {
        let rows = summary_rows(&flush());
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2][1], "100");
        assert_eq!(rows[3][1], "50");
        assert_eq!(rows[4][1], "0.001050");
    }
}
