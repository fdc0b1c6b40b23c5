//! REST client for the Drive/Sheets ledger endpoints.
//!
//! Handles folder and spreadsheet find-or-create, header rows, row
//! appends, and summary-range rewrites using [`reqwest`]. Everything
//! here is best-effort from the pipeline's point of view; errors are
//! surfaced to the caller, which logs and moves on.

use serde::Deserialize;

/// Sheet tab holding one row per cost entry.
pub const COSTS_TAB: &str = "Costs";
/// Sheet tab holding one row per prompt version.
pub const VERSIONS_TAB: &str = "Versions";
/// Sheet tab holding the rewritten running-totals block.
pub const SUMMARY_TAB: &str = "Summary";

/// Configuration for the spreadsheet ledger sink.
///
/// | Env Var                  | Default                              |
/// |--------------------------|--------------------------------------|
/// | `SHEETS_ENABLED`         | `false`                              |
/// | `SHEETS_API_URL`         | `https://sheets.googleapis.com`      |
/// | `DRIVE_API_URL`          | `https://www.googleapis.com`         |
/// | `SHEETS_ACCESS_TOKEN`    | empty                                |
/// | `SHEETS_FOLDER_NAME`     | `Prompt Pipeline`                    |
/// | `SHEETS_SPREADSHEET_NAME`| `Cost Ledger`                        |
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub enabled: bool,
    pub sheets_api_url: String,
    pub drive_api_url: String,
    pub access_token: String,
    pub folder_name: String,
    pub spreadsheet_name: String,
}

impl SheetsConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let enabled = std::env::var("SHEETS_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Self {
            enabled,
            sheets_api_url: std::env::var("SHEETS_API_URL")
                .unwrap_or_else(|_| "https://sheets.googleapis.com".into()),
            drive_api_url: std::env::var("DRIVE_API_URL")
                .unwrap_or_else(|_| "https://www.googleapis.com".into()),
            access_token: std::env::var("SHEETS_ACCESS_TOKEN").unwrap_or_default(),
            folder_name: std::env::var("SHEETS_FOLDER_NAME")
                .unwrap_or_else(|_| "Prompt Pipeline".into()),
            spreadsheet_name: std::env::var("SHEETS_SPREADSHEET_NAME")
                .unwrap_or_else(|_| "Cost Ledger".into()),
        }
    }
}

/// Errors from the spreadsheet ledger layer.
#[derive(Debug, thiserror::Error)]
pub enum SheetsApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Sheets API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedSpreadsheet {
    #[serde(rename = "spreadsheetId")]
    spreadsheet_id: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the ledger spreadsheet.
pub struct SheetsApi {
    client: reqwest::Client,
    config: SheetsConfig,
}

impl SheetsApi {
    pub fn new(config: SheetsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    /// Locate the ledger folder by name, creating it if absent.
    /// Returns the folder file ID.
    pub async fn find_or_create_folder(&self) -> Result<String, SheetsApiError> {
        let q = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.folder' and trashed = false",
            self.config.folder_name.replace('\'', "\\'")
        );
        let list: FileList = self
            .get_json(
                &format!("{}/drive/v3/files", self.config.drive_api_url),
                &[("q", q.as_str()), ("fields", "files(id)")],
            )
            .await?;
        if let Some(found) = list.files.first() {
            return Ok(found.id.clone());
        }

        tracing::info!(folder = %self.config.folder_name, "Creating ledger folder");
        let created: FileRef = self
            .post_json(
                &format!("{}/drive/v3/files", self.config.drive_api_url),
                &serde_json::json!({
                    "name": self.config.folder_name,
                    "mimeType": "application/vnd.google-apps.folder",
                }),
            )
            .await?;
        Ok(created.id)
    }

    /// Locate the ledger spreadsheet inside a folder, creating it (with
    /// its three tabs) if absent. Returns the spreadsheet ID.
    pub async fn find_or_create_spreadsheet(
        &self,
        folder_id: &str,
    ) -> Result<String, SheetsApiError> {
        let q = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            self.config.spreadsheet_name.replace('\'', "\\'"),
            folder_id
        );
        let list: FileList = self
            .get_json(
                &format!("{}/drive/v3/files", self.config.drive_api_url),
                &[("q", q.as_str()), ("fields", "files(id)")],
            )
            .await?;
        if let Some(found) = list.files.first() {
            return Ok(found.id.clone());
        }

        tracing::info!(
            spreadsheet = %self.config.spreadsheet_name,
            "Creating ledger spreadsheet",
        );
        let created: CreatedSpreadsheet = self
            .post_json(
                &format!("{}/v4/spreadsheets", self.config.sheets_api_url),
                &serde_json::json!({
                    "properties": {"title": self.config.spreadsheet_name},
                    "sheets": [
                        {"properties": {"title": COSTS_TAB}},
                        {"properties": {"title": VERSIONS_TAB}},
                        {"properties": {"title": SUMMARY_TAB}},
                    ],
                }),
            )
            .await?;

        // Move the new spreadsheet into the ledger folder.
        let url = format!(
            "{}/drive/v3/files/{}?addParents={}",
            self.config.drive_api_url, created.spreadsheet_id, folder_id
        );
        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.config.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Self::check_status(response).await?;

        Ok(created.spreadsheet_id)
    }

    /// Write a header row to a tab if its first row is empty.
    pub async fn ensure_headers(
        &self,
        spreadsheet_id: &str,
        tab: &str,
        headers: &[&str],
    ) -> Result<(), SheetsApiError> {
        let range = format!("{tab}!1:1");
        let current: ValueRange = self
            .get_json(
                &format!(
                    "{}/v4/spreadsheets/{}/values/{}",
                    self.config.sheets_api_url, spreadsheet_id, range
                ),
                &[],
            )
            .await?;
        if !current.values.is_empty() {
            return Ok(());
        }
        let row: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        self.update_range(spreadsheet_id, &range, &[row]).await
    }

    /// Append rows after the last data row of a tab.
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        tab: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsApiError> {
        if rows.is_empty() {
            return Ok(());
        }
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{tab}!A1:append?valueInputOption=RAW",
            self.config.sheets_api_url, spreadsheet_id,
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&serde_json::json!({"values": rows}))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// Overwrite a range with the given rows.
    pub async fn update_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsApiError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}?valueInputOption=RAW",
            self.config.sheets_api_url, spreadsheet_id, range
        );
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.config.access_token)
            .json(&serde_json::json!({"values": rows}))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- private helpers ----

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SheetsApiError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, SheetsApiError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SheetsApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SheetsApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SheetsApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), SheetsApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
