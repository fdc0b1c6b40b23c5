//! Static model price table and pure cost calculation.
//!
//! Prices are USD per 1,000,000 tokens, kept separately for input,
//! output, cache-read, and cache-write token classes. Costs scale
//! linearly with token counts. Nothing here rounds; rounding is a
//! display concern.

use serde::{Deserialize, Serialize};

/// Tokens per pricing unit (rates are USD per million tokens).
pub const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;

/// Model used when a cost entry names a model the table does not know.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

// ---------------------------------------------------------------------------
// Price table
// ---------------------------------------------------------------------------

/// Per-model rates in USD per million tokens.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    pub model: &'static str,
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
    pub cache_read_per_mtok: f64,
    pub cache_write_per_mtok: f64,
}

/// All models with known pricing. Read-only and process-wide.
pub const PRICE_TABLE: &[ModelPricing] = &[
    ModelPricing {
        model: "claude-sonnet-4-5",
        input_per_mtok: 3.0,
        output_per_mtok: 15.0,
        cache_read_per_mtok: 0.30,
        cache_write_per_mtok: 3.75,
    },
    ModelPricing {
        model: "claude-haiku-4-5",
        input_per_mtok: 1.0,
        output_per_mtok: 5.0,
        cache_read_per_mtok: 0.10,
        cache_write_per_mtok: 1.25,
    },
    ModelPricing {
        model: "claude-opus-4-1",
        input_per_mtok: 15.0,
        output_per_mtok: 75.0,
        cache_read_per_mtok: 1.50,
        cache_write_per_mtok: 18.75,
    },
];

/// Look up pricing for a model identifier.
pub fn pricing_for(model: &str) -> Option<&'static ModelPricing> {
    PRICE_TABLE.iter().find(|p| p.model == model)
}

// ---------------------------------------------------------------------------
// Token usage
// ---------------------------------------------------------------------------

/// Token counts reported by the completion provider for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
    #[serde(default)]
    pub cache_read_tokens: i64,
    #[serde(default)]
    pub cache_write_tokens: i64,
}

impl TokenUsage {
    /// Sum another usage into this one, field by field.
    pub fn add(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
        self.cache_write_tokens += other.cache_write_tokens;
    }
}

// ---------------------------------------------------------------------------
// Cost calculation
// ---------------------------------------------------------------------------

/// Cost of one operation, broken down by token class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub cache_cost: f64,
    pub total_cost_usd: f64,
}

/// Compute the USD cost of a token usage against a model's rates.
///
/// Unknown models fall back to [`DEFAULT_MODEL`] pricing with a warning;
/// this never fails. Pure apart from the warning log.
pub fn cost_for(usage: &TokenUsage, model: &str) -> CostBreakdown {
    let pricing = match pricing_for(model) {
        Some(p) => p,
        None => {
            tracing::warn!(
                model,
                fallback = DEFAULT_MODEL,
                "Unknown model in cost calculation, using default pricing",
            );
            pricing_for(DEFAULT_MODEL).unwrap_or(&PRICE_TABLE[0])
        }
    };

    let input_cost = usage.input_tokens as f64 / TOKENS_PER_PRICE_UNIT * pricing.input_per_mtok;
    let output_cost = usage.output_tokens as f64 / TOKENS_PER_PRICE_UNIT * pricing.output_per_mtok;
    let cache_cost = usage.cache_read_tokens as f64 / TOKENS_PER_PRICE_UNIT
        * pricing.cache_read_per_mtok
        + usage.cache_write_tokens as f64 / TOKENS_PER_PRICE_UNIT * pricing.cache_write_per_mtok;

    CostBreakdown {
        input_cost,
        output_cost,
        cache_cost,
        total_cost_usd: input_cost + output_cost + cache_cost,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
