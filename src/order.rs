//! Completed orders and the collaborators that receive them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{NotifyError, SinkError};

/// A completed order, built once all three answers are known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub name: String,
    pub item_code: String,
    pub quantity: u32,
}

impl Order {
    pub fn new(name: impl Into<String>, item_code: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            item_code: item_code.into(),
            quantity,
        }
    }

    /// Cells of the sheet row, in column order: name, item code, quantity.
    pub fn to_row(&self) -> Vec<Value> {
        vec![json!(self.name), json!(self.item_code), json!(self.quantity)]
    }
}

/// Append-only store for completed orders
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn append(&self, order: &Order) -> Result<(), SinkError>;
}

/// One-way channel to the administrator
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, order: &Order) -> Result<(), NotifyError>;
}
