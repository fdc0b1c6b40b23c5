//! Pure domain logic for the prompt pipeline engine.
//!
//! Everything in this crate is deterministic and I/O-free: the price
//! table and cost calculator, the per-run usage ledger, the briefing
//! model, the step/status vocabulary, version labels, hashing, and
//! injection-artifact packaging. Async orchestration lives in
//! `promptforge-pipeline`; persistence lives in `promptforge-db`.

pub mod briefing;
pub mod error;
pub mod hashing;
pub mod ledger;
pub mod packaging;
pub mod pricing;
pub mod steps;
pub mod types;
pub mod versioning;
