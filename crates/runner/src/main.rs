//! `promptforge-runner` -- one-shot pipeline runner.
//!
//! Reads a pipeline input file (account key, assistant key, briefing)
//! as JSON, executes one run against the configured completion
//! provider, and prints the run result as JSON on stdout. Exits 0 when
//! the run completed, 1 when it failed.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default | Description                     |
//! |---------------------------|----------|---------|---------------------------------|
//! | `COMPLETION_API_KEY`      | yes      | --      | Completion provider credential  |
//! | `COMPLETION_API_URL`      | no       | `https://api.anthropic.com` | Provider base URL |
//! | `PIPELINE_MODEL`          | no       | default model | Model for all calls       |
//! | `PIPELINE_MAX_ITERATIONS` | no       | `2`     | Analyze/improve rounds          |
//! | `DATABASE_URL`            | no       | --      | Postgres; omit for local-only   |
//! | `SHEETS_ENABLED`          | no       | `false` | Spreadsheet cost ledger         |

use promptforge_completion::api::CompletionApi;
use promptforge_pipeline::{
    run_pipeline, EnvAccountRegistry, PgRunPersistence, PipelineConfig, PipelineInput,
    RunPersistence,
};
use promptforge_sheets::api::{SheetsApi, SheetsConfig};
use promptforge_sheets::sink::LedgerSink;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let input_path = std::env::args().nth(1).unwrap_or_else(|| {
        tracing::error!("Usage: promptforge-runner <input.json>");
        std::process::exit(2);
    });

    let input_raw = std::fs::read_to_string(&input_path).unwrap_or_else(|e| {
        tracing::error!(path = %input_path, error = %e, "Failed to read input file");
        std::process::exit(2);
    });

    let input: PipelineInput = serde_json::from_str(&input_raw).unwrap_or_else(|e| {
        tracing::error!(path = %input_path, error = %e, "Input file is not valid pipeline input");
        std::process::exit(2);
    });

    let config = PipelineConfig::from_env();

    let provider = CompletionApi::with_timeout(
        config.completion_api_url.clone(),
        config.completion_api_key.clone(),
        config.completion_timeout_secs,
    );
    let registry = EnvAccountRegistry::new(config.completion_api_key.clone());

    let pool = match &config.database_url {
        Some(url) => match promptforge_db::connect(url).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::error!(error = %e, "Database unavailable, running without persistence");
                None
            }
        },
        None => None,
    };
    let persistence = pool.map(PgRunPersistence::new);

    let sheets_config = SheetsConfig::from_env();
    let sink = if sheets_config.enabled {
        Some(SheetsApi::new(sheets_config))
    } else {
        None
    };

    let result = run_pipeline(
        &config,
        &registry,
        &provider,
        persistence.as_ref().map(|p| p as &dyn RunPersistence),
        sink.as_ref().map(|s| s as &dyn LedgerSink),
        input,
    )
    .await;

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialize run result"),
    }

    if result.error.is_some() {
        std::process::exit(1);
    }
}
