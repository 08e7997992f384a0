//! Menu model and loading.
//!
//! The menu is read fresh every time it is needed: when a conversation
//! starts and when an item is selected. Nothing is cached.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::errors::MenuError;

/// One orderable item as listed in the menu sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Label shown on the button
    pub name: String,
    /// Opaque code stored in the order row
    pub code: String,
}

impl MenuEntry {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Tabular store the menu is read from
#[async_trait]
pub trait MenuSource: Send + Sync {
    /// Return all rows of the menu table, header row included.
    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, MenuError>;
}

/// Turn raw menu rows into entries.
///
/// The first row is a header. A data row is kept only when its first two
/// cells are both non-empty; they become the display name and the code.
pub fn parse_menu_rows(rows: &[Vec<String>]) -> Vec<MenuEntry> {
    rows.iter()
        .skip(1)
        .filter_map(|row| match (row.first(), row.get(1)) {
            (Some(name), Some(code)) if !name.is_empty() && !code.is_empty() => {
                Some(MenuEntry::new(name.clone(), code.clone()))
            }
            _ => None,
        })
        .collect()
}

/// Fetch and parse the current menu.
///
/// Errors are logged and produce an empty menu.
pub async fn load_menu(source: &dyn MenuSource) -> Vec<MenuEntry> {
    match source.fetch_rows().await {
        Ok(rows) => {
            let menu = parse_menu_rows(&rows);
            if menu.is_empty() {
                warn!(rows = rows.len(), "Menu sheet is empty or misformatted");
            }
            menu
        }
        Err(e) => {
            error!(error = %e, "Error loading menu");
            Vec::new()
        }
    }
}

/// Whether `code` is one of the entries' codes
pub fn contains_code(menu: &[MenuEntry], code: &str) -> bool {
    menu.iter().any(|entry| entry.code == code)
}
