//! Per-run session usage ledger.
//!
//! One [`SessionLedger`] is constructed per pipeline run and threaded
//! `&mut` through the call chain. It must never be shared between
//! concurrent runs; a shared accumulator would attribute one run's
//! token costs to another.

use serde::Serialize;

use crate::pricing::TokenUsage;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// The billable operation a cost record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Generation,
    Analysis,
    Improvement,
}

impl Operation {
    /// Stable string form used in database rows and spreadsheet cells.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::Analysis => "analysis",
            Self::Improvement => "improvement",
        }
    }
}

// ---------------------------------------------------------------------------
// Cost records
// ---------------------------------------------------------------------------

/// One billable provider call, as accumulated in the session ledger.
#[derive(Debug, Clone, Serialize)]
pub struct CostRecord {
    pub operation: Operation,
    pub model: String,
    pub usage: TokenUsage,
    pub cost_usd: f64,
    pub recorded_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Mutable token and cost totals for the currently executing run.
#[derive(Debug, Default)]
pub struct SessionLedger {
    totals: TokenUsage,
    records: Vec<CostRecord>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero all totals and drop all records. Called exactly once at the
    /// start of each pipeline run.
    pub fn reset(&mut self) {
        self.totals = TokenUsage::default();
        self.records.clear();
    }

    /// Add a usage to the running totals without recording a cost entry.
    pub fn track(&mut self, usage: &TokenUsage) {
        self.totals.add(usage);
    }

    /// Append a cost record and add its usage to the running totals.
    pub fn record(&mut self, record: CostRecord) {
        self.totals.add(&record.usage);
        self.records.push(record);
    }

    /// Accumulated token totals.
    pub fn totals(&self) -> &TokenUsage {
        &self.totals
    }

    /// All cost records, in the order the operations completed.
    pub fn records(&self) -> &[CostRecord] {
        &self.records
    }

    /// Sum of `cost_usd` over all records.
    pub fn total_cost_usd(&self) -> f64 {
        self.records.iter().map(|r| r.cost_usd).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
