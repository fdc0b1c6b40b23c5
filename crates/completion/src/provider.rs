//! Provider trait seam between the engine and the HTTP client.

use async_trait::async_trait;
use promptforge_core::pricing::TokenUsage;

use crate::api::{CompletionApi, CompletionApiError, CompletionRequest};

/// Result of one successful completion call.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
    pub stop_reason: Option<String>,
    pub model: String,
}

/// Anything that can execute a completion request.
///
/// The pipeline engine programs against this trait; production wiring
/// passes [`CompletionApi`], tests pass scripted stubs.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest)
        -> Result<Completion, CompletionApiError>;
}

#[async_trait]
impl CompletionProvider for CompletionApi {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Completion, CompletionApiError> {
        CompletionApi::complete(self, request).await
    }
}
