//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use teloxide::types::UserId;
use tokio::sync::mpsc;

use order_bot::config::RetryConfig;
use order_bot::dialogue::OrderDialogue;
use order_bot::errors::{MenuError, NotifyError, SinkError};
use order_bot::menu::MenuSource;
use order_bot::order::{Notifier, Order, OrderSink};
use order_bot::session::SessionStore;

pub const ALICE: UserId = UserId(1001);
pub const BOB: UserId = UserId(1002);

/// Menu sheet with a header row followed by `entries`
pub struct StaticMenu {
    rows: Vec<Vec<String>>,
}

impl StaticMenu {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        let mut rows = vec![vec!["Name".to_string(), "Code".to_string()]];
        rows.extend(
            entries
                .iter()
                .map(|(name, code)| vec![name.to_string(), code.to_string()]),
        );
        Self { rows }
    }

    pub fn pizza_and_soda() -> Self {
        Self::new(&[("Pizza", "PZ1"), ("Soda", "SD1")])
    }
}

#[async_trait]
impl MenuSource for StaticMenu {
    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, MenuError> {
        Ok(self.rows.clone())
    }
}

/// Menu source that is never reachable
pub struct FailingMenu;

#[async_trait]
impl MenuSource for FailingMenu {
    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, MenuError> {
        Err(MenuError::Unavailable("sheet offline".into()))
    }
}

/// Sink keeping every appended row
#[derive(Default)]
pub struct RecordingSink {
    orders: Mutex<Vec<Order>>,
}

impl RecordingSink {
    pub fn rows(&self) -> Vec<Vec<serde_json::Value>> {
        self.orders().iter().map(Order::to_row).collect()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderSink for RecordingSink {
    async fn append(&self, order: &Order) -> Result<(), SinkError> {
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }
}

/// Sink failing its first `failures` appends, then recording like [`RecordingSink`]
pub struct FlakySink {
    remaining_failures: AtomicUsize,
    attempts: AtomicUsize,
    inner: RecordingSink,
}

impl FlakySink {
    pub fn new(failures: usize) -> Self {
        Self {
            remaining_failures: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
            inner: RecordingSink::default(),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn orders(&self) -> Vec<Order> {
        self.inner.orders()
    }

    pub fn heal(&self) {
        self.remaining_failures.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderSink for FlakySink {
    async fn append(&self, order: &Order) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(SinkError::Write("quota exceeded".into()));
        }
        self.inner.append(order).await
    }
}

/// Notifier forwarding every order into a channel
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<Order>,
}

impl RecordingNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Order>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
        self.tx
            .send(order.clone())
            .map_err(|e| NotifyError(e.to_string()))
    }
}

/// Notifier whose chat is unreachable
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _order: &Order) -> Result<(), NotifyError> {
        Err(NotifyError("chat not found".into()))
    }
}

/// Retry policy with millisecond delays so failure paths stay fast
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        base_retry_delay_ms: 1,
        max_retry_delay_ms: 2,
        ..RetryConfig::default()
    }
}

/// Dialogue over `menu` and `sink` with an hour-long session TTL
pub fn dialogue_with(menu: Arc<dyn MenuSource>, sink: Arc<dyn OrderSink>) -> OrderDialogue {
    OrderDialogue::new(
        menu,
        sink,
        Arc::new(SessionStore::new(Duration::from_secs(3600))),
        fast_retry(1),
    )
}
