//! Minimal Google Sheets REST client: read a worksheet, append a row.

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::auth::{ServiceAccountKey, TokenProvider};
use super::SheetsError;
use crate::config::SheetsConfig;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Query of `values.append`. Cells are stored as sent, never parsed as
/// formulas, dates or numbers.
pub const APPEND_QUERY: [(&str, &str); 2] = [
    ("valueInputOption", "RAW"),
    ("insertDataOption", "INSERT_ROWS"),
];

/// Response body of `spreadsheets.values.get`
#[derive(Debug, Default, Deserialize)]
pub struct ValueRange {
    /// Absent when the range is empty
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Cells as display strings
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        Value::String(text) => text,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// A1 range covering a whole worksheet
pub fn worksheet_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

/// `.../spreadsheets/{id}/values/{range}{suffix}`
pub fn values_url(spreadsheet_id: &str, range: &str, suffix: &str) -> Result<Url, SheetsError> {
    let mut url = Url::parse(SHEETS_API).map_err(|e| SheetsError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| SheetsError::InvalidUrl(SHEETS_API.to_string()))?
        .push(spreadsheet_id)
        .push("values")
        .push(&format!("{range}{suffix}"));
    Ok(url)
}

/// Drive search query matching a spreadsheet by exact title
pub fn title_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

/// Client bound to one spreadsheet
pub struct SheetsClient {
    http: reqwest::Client,
    auth: TokenProvider,
    title: String,
    spreadsheet_id: OnceCell<String>,
}

impl SheetsClient {
    /// Build a client from the bot configuration, reading the key file.
    pub fn from_config(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let key = ServiceAccountKey::from_file(&config.credentials_path)?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let auth = TokenProvider::new(key, http.clone())?;

        Ok(Self {
            http,
            auth,
            title: config.sheet_name.clone(),
            spreadsheet_id: OnceCell::new_with(config.spreadsheet_id.clone()),
        })
    }

    /// Resolve the spreadsheet id once, by title unless it was configured.
    pub async fn spreadsheet_id(&self) -> Result<&str, SheetsError> {
        self.spreadsheet_id
            .get_or_try_init(|| self.find_by_title())
            .await
            .map(String::as_str)
    }

    async fn find_by_title(&self) -> Result<String, SheetsError> {
        let token = self.auth.access_token().await?;
        let query = title_query(&self.title);
        let response = self
            .http
            .get(DRIVE_FILES_API)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("pageSize", "1"),
            ])
            .send()
            .await?;
        let list: DriveFileList = checked(response).await?.json().await?;

        let id = list
            .files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| SheetsError::SpreadsheetNotFound {
                title: self.title.clone(),
                shared_with: self.auth.client_email().to_string(),
            })?;
        info!(title = %self.title, spreadsheet_id = %id, "Spreadsheet resolved");
        Ok(id)
    }

    /// All rows of `worksheet`
    pub async fn get_values(&self, worksheet: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = values_url(self.spreadsheet_id().await?, &worksheet_range(worksheet), "")?;
        let token = self.auth.access_token().await?;

        debug!(worksheet, "Reading worksheet");
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let range: ValueRange = checked(response).await?.json().await?;
        Ok(range.into_rows())
    }

    /// Append `row` after the last row of `worksheet`
    pub async fn append_row(&self, worksheet: &str, row: Vec<Value>) -> Result<(), SheetsError> {
        let url = values_url(
            self.spreadsheet_id().await?,
            &worksheet_range(worksheet),
            ":append",
        )?;
        let token = self.auth.access_token().await?;

        debug!(worksheet, "Appending row");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&APPEND_QUERY)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`SheetsError::Api`]
async fn checked(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
    let status: StatusCode = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SheetsError::Api { status, body })
}
