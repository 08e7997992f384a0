//! Google Sheets backed menu source and order sink.
//!
//! - `auth`: service-account token exchange
//! - `client`: the REST calls (`values.get`, `values.append`, Drive lookup by title)

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::{MenuError, SinkError};
use crate::menu::MenuSource;
use crate::order::{Order, OrderSink};

pub mod auth;
pub mod client;

pub use client::SheetsClient;

/// Errors raised while talking to Google
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Failed to read credentials file {path}: {source}")]
    CredentialsFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid service account key: {0}")]
    Credentials(String),
    #[error("Failed to sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Google API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Spreadsheet '{title}' not found or not shared with {shared_with}")]
    SpreadsheetNotFound { title: String, shared_with: String },
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl From<SheetsError> for MenuError {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::Http(e) if e.is_decode() => MenuError::Malformed(e.to_string()),
            other => MenuError::Unavailable(other.to_string()),
        }
    }
}

impl From<SheetsError> for SinkError {
    fn from(err: SheetsError) -> Self {
        SinkError::Write(err.to_string())
    }
}

/// Menu read from one worksheet
pub struct SheetMenuSource {
    client: Arc<SheetsClient>,
    worksheet: String,
}

impl SheetMenuSource {
    pub fn new(client: Arc<SheetsClient>, worksheet: impl Into<String>) -> Self {
        Self {
            client,
            worksheet: worksheet.into(),
        }
    }
}

#[async_trait]
impl MenuSource for SheetMenuSource {
    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, MenuError> {
        Ok(self.client.get_values(&self.worksheet).await?)
    }
}

/// Orders appended to one worksheet
pub struct SheetOrderSink {
    client: Arc<SheetsClient>,
    worksheet: String,
}

impl SheetOrderSink {
    pub fn new(client: Arc<SheetsClient>, worksheet: impl Into<String>) -> Self {
        Self {
            client,
            worksheet: worksheet.into(),
        }
    }
}

#[async_trait]
impl OrderSink for SheetOrderSink {
    async fn append(&self, order: &Order) -> Result<(), SinkError> {
        Ok(self.client.append_row(&self.worksheet, order.to_row()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_becomes_unavailable_menu() {
        let err = SheetsError::Api {
            status: reqwest::StatusCode::FORBIDDEN,
            body: "caller does not have permission".into(),
        };
        match MenuError::from(err) {
            MenuError::Unavailable(msg) => assert!(msg.contains("403")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_not_found_names_service_account() {
        let err = SheetsError::SpreadsheetNotFound {
            title: "Orders".into(),
            shared_with: "bot@p.iam.gserviceaccount.com".into(),
        };
        assert_eq!(
            SinkError::from(err).to_string(),
            "Order write failed: Spreadsheet 'Orders' not found or not shared with bot@p.iam.gserviceaccount.com"
        );
    }
}
