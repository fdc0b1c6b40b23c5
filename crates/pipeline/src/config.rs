//! Engine configuration loaded from environment variables.

use promptforge_core::pricing::DEFAULT_MODEL;

/// Pipeline configuration.
///
/// All fields have defaults suitable for local development apart from
/// the provider API key, which is validated at run start (a missing key
/// is a fatal `LoadAccountConfig` failure, not a construction error).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Response token cap per completion call (default: `4096`).
    pub max_tokens: i64,
    /// Number of analyze/improve refinement rounds (default: `2`).
    pub max_iterations: u32,
    /// Per-call completion timeout in seconds (default: `120`).
    pub completion_timeout_secs: u64,
    /// Completion provider base URL.
    pub completion_api_url: String,
    /// Completion provider credential.
    pub completion_api_key: String,
    /// Postgres URL; `None` disables durable persistence.
    pub database_url: Option<String>,
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                     |
    /// |---------------------------|-----------------------------|
    /// | `PIPELINE_MODEL`          | the default model           |
    /// | `PIPELINE_MAX_TOKENS`     | `4096`                      |
    /// | `PIPELINE_MAX_ITERATIONS` | `2`                         |
    /// | `COMPLETION_TIMEOUT_SECS` | `120`                       |
    /// | `COMPLETION_API_URL`      | `https://api.anthropic.com` |
    /// | `COMPLETION_API_KEY`      | empty                       |
    /// | `DATABASE_URL`            | unset                       |
    pub fn from_env() -> Self {
        let model = std::env::var("PIPELINE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let max_tokens: i64 = std::env::var("PIPELINE_MAX_TOKENS")
            .unwrap_or_else(|_| "4096".into())
            .parse()
            .expect("PIPELINE_MAX_TOKENS must be a valid i64");

        let max_iterations: u32 = std::env::var("PIPELINE_MAX_ITERATIONS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("PIPELINE_MAX_ITERATIONS must be a valid u32");

        let completion_timeout_secs: u64 = std::env::var("COMPLETION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("COMPLETION_TIMEOUT_SECS must be a valid u64");

        let completion_api_url = std::env::var("COMPLETION_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".into());

        let completion_api_key = std::env::var("COMPLETION_API_KEY").unwrap_or_default();

        let database_url = std::env::var("DATABASE_URL").ok();

        Self {
            model,
            max_tokens,
            max_iterations,
            completion_timeout_secs,
            completion_api_url,
            completion_api_key,
            database_url,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            max_iterations: 2,
            completion_timeout_secs: 120,
            completion_api_url: "https://api.anthropic.com".to_string(),
            completion_api_key: String::new(),
            database_url: None,
        }
    }
}
