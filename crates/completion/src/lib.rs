//! HTTP client for the external text-completion provider.
//!
//! [`api::CompletionApi`] talks to a messages-style HTTP endpoint;
//! [`provider::CompletionProvider`] is the trait seam the pipeline
//! engine (and its tests) program against.

pub mod api;
pub mod provider;

pub use api::{CompletionApi, CompletionApiError, CompletionRequest, Message, Role};
pub use provider::{Completion, CompletionProvider};
