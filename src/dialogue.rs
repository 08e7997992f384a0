//! Order dialogue: the per-user conversation state machine.
//!
//! A conversation walks through `Idle -> AwaitingQuantity -> AwaitingName`
//! and submits the order when the name arrives. Every inbound event yields
//! exactly one [`Reply`]; failures of the collaborators are turned into
//! prompts rather than errors.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use teloxide::types::UserId;
use tracing::{debug, error, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::RetryConfig;
use crate::errors::SinkError;
use crate::menu::{contains_code, load_menu, MenuEntry, MenuSource};
use crate::order::{Notifier, Order, OrderSink};
use crate::session::{OrderState, SessionStore};

/// Longest accepted customer name, in characters
pub const MAX_NAME_CHARS: usize = 255;

/// Inbound event from a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueEvent {
    /// `/start`: show the menu and start over
    Start,
    /// `/cancel`: drop the order in progress
    Cancel,
    /// A menu button was pressed, carrying the item code
    SelectItem(String),
    /// Any other text message
    Text(String),
}

/// User-facing message, rendered by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prompt {
    EnterQuantity,
    InvalidQuantity,
    EnterName,
    InvalidName,
    NameTooLong,
    OrderPlaced,
    OrderFailed,
    ChooseItemFirst,
    UnknownItem,
    Cancelled,
}

impl Prompt {
    /// Localization key of the prompt
    pub fn message_key(self) -> &'static str {
        match self {
            Prompt::EnterQuantity => "enter-quantity",
            Prompt::InvalidQuantity => "invalid-quantity",
            Prompt::EnterName => "enter-name",
            Prompt::InvalidName => "invalid-name",
            Prompt::NameTooLong => "name-too-long",
            Prompt::OrderPlaced => "order-placed",
            Prompt::OrderFailed => "order-failed",
            Prompt::ChooseItemFirst => "choose-item-first",
            Prompt::UnknownItem => "unknown-item",
            Prompt::Cancelled => "order-cancelled",
        }
    }
}

/// Answer to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Welcome message with one selectable option per entry
    Menu(Vec<MenuEntry>),
    Prompt(Prompt),
}

/// Why a customer name was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong,
}

/// Parse a quantity answer.
///
/// Only plain ASCII digits are accepted, the value must be at least 1 and
/// fit in a `u32`. Signs, decimals and surrounding whitespace are refused.
pub fn parse_quantity(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok().filter(|quantity| *quantity > 0)
}

/// Validates a customer name input
pub fn validate_customer_name(name: &str) -> Result<String, NameError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }

    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(NameError::TooLong);
    }

    Ok(trimmed.to_string())
}

/// Event with the menu lookups already resolved
enum Input<'a> {
    Start(Vec<MenuEntry>),
    Cancel,
    Select { code: &'a str, on_menu: bool },
    Text(&'a str),
}

enum Step {
    /// Move to a new state and answer
    Goto(OrderState, Reply),
    /// Keep the current state
    Stay(Prompt),
    /// All answers collected
    Submit(Order),
}

fn transition(state: &OrderState, input: Input<'_>) -> Step {
    match (state, input) {
        (_, Input::Start(menu)) => Step::Goto(OrderState::Idle, Reply::Menu(menu)),
        (_, Input::Cancel) => Step::Goto(OrderState::Idle, Reply::Prompt(Prompt::Cancelled)),
        (_, Input::Select { code, on_menu: true }) => Step::Goto(
            OrderState::AwaitingQuantity {
                item_code: code.to_string(),
            },
            Reply::Prompt(Prompt::EnterQuantity),
        ),
        (_, Input::Select { on_menu: false, .. }) => Step::Stay(Prompt::UnknownItem),
        (OrderState::Idle, Input::Text(_)) => Step::Stay(Prompt::ChooseItemFirst),
        (OrderState::AwaitingQuantity { item_code }, Input::Text(text)) => match parse_quantity(text) {
            Some(quantity) => Step::Goto(
                OrderState::AwaitingName {
                    item_code: item_code.clone(),
                    quantity,
                },
                Reply::Prompt(Prompt::EnterName),
            ),
            None => Step::Stay(Prompt::InvalidQuantity),
        },
        (OrderState::AwaitingName { item_code, quantity }, Input::Text(text)) => {
            match validate_customer_name(text) {
                Ok(name) => Step::Submit(Order::new(name, item_code.clone(), *quantity)),
                Err(NameError::Empty) => Step::Stay(Prompt::InvalidName),
                Err(NameError::TooLong) => Step::Stay(Prompt::NameTooLong),
            }
        }
    }
}

/// The conversation core, shared by all transport handlers
pub struct OrderDialogue {
    menu: Arc<dyn MenuSource>,
    sink: Arc<dyn OrderSink>,
    notifier: Option<Arc<dyn Notifier>>,
    sessions: Arc<SessionStore>,
    retry: RetryConfig,
    breaker: CircuitBreaker,
}

impl OrderDialogue {
    pub fn new(
        menu: Arc<dyn MenuSource>,
        sink: Arc<dyn OrderSink>,
        sessions: Arc<SessionStore>,
        retry: RetryConfig,
    ) -> Self {
        let breaker = CircuitBreaker::new(&retry);
        Self {
            menu,
            sink,
            notifier: None,
            sessions,
            retry,
            breaker,
        }
    }

    /// Send a summary of every placed order through `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Process one event of `user` and return the answer to show them.
    pub async fn handle(&self, user: UserId, event: DialogueEvent) -> Reply {
        let mut session = self.sessions.lock(user).await;
        debug!(user_id = %user, event = ?event, state = ?session.state, "Handling dialogue event");

        let input = match &event {
            DialogueEvent::Start => Input::Start(load_menu(self.menu.as_ref()).await),
            DialogueEvent::Cancel => Input::Cancel,
            DialogueEvent::SelectItem(code) => {
                let menu = load_menu(self.menu.as_ref()).await;
                Input::Select {
                    code,
                    on_menu: contains_code(&menu, code),
                }
            }
            DialogueEvent::Text(text) => Input::Text(text),
        };

        match transition(&session.state, input) {
            Step::Goto(next, reply) => {
                session.state = next;
                reply
            }
            Step::Stay(prompt) => {
                if prompt == Prompt::UnknownItem {
                    warn!(user_id = %user, event = ?event, "Selected item is not on the menu");
                }
                Reply::Prompt(prompt)
            }
            Step::Submit(order) => match self.submit(&order).await {
                Ok(()) => {
                    info!(
                        user_id = %user,
                        item_code = %order.item_code,
                        quantity = order.quantity,
                        "Order placed"
                    );
                    session.reset();
                    self.dispatch_notification(order);
                    Reply::Prompt(Prompt::OrderPlaced)
                }
                Err(e) => {
                    // Item and quantity stay in the session so the name can be resent.
                    error!(user_id = %user, error = %e, "Failed to save order");
                    Reply::Prompt(Prompt::OrderFailed)
                }
            },
        }
    }

    async fn submit(&self, order: &Order) -> Result<(), SinkError> {
        if self.breaker.is_open() {
            return Err(SinkError::CircuitOpen);
        }

        let mut attempt = 0;
        loop {
            match self.sink.append(order).await {
                Ok(()) => {
                    self.breaker.record_success();
                    return Ok(());
                }
                Err(e) if attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = with_jitter(self.retry.backoff_delay(attempt));
                    warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "Order write failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    self.breaker.record_failure();
                    return Err(e);
                }
            }
        }
    }

    fn dispatch_notification(&self, order: Order) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&order).await {
                warn!(error = %e, item_code = %order.item_code, "Admin notification failed");
            }
        });
    }
}

/// Add up to 25% random jitter to a retry delay
fn with_jitter(delay: Duration) -> Duration {
    let max_jitter = (delay.as_millis() as u64) / 4;
    if max_jitter == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn awaiting_quantity() -> OrderState {
        OrderState::AwaitingQuantity {
            item_code: "PZ1".into(),
        }
    }

    #[test]
    fn test_quantity_parsing() {
        assert_eq!(parse_quantity("3"), Some(3));
        assert_eq!(parse_quantity("007"), Some(7));
        assert_eq!(parse_quantity("4294967295"), Some(u32::MAX));

        for bad in ["", "0", "000", "-1", "+2", "2.5", " 3", "3 ", "three", "4294967296", "３"] {
            assert_eq!(parse_quantity(bad), None, "accepted {bad:?}");
        }
    }

    #[test]
    fn test_customer_name_validation() {
        assert_eq!(validate_customer_name("  Alice  "), Ok("Alice".to_string()));
        assert_eq!(validate_customer_name(""), Err(NameError::Empty));
        assert_eq!(validate_customer_name(" \n "), Err(NameError::Empty));
        assert!(validate_customer_name(&"é".repeat(MAX_NAME_CHARS)).is_ok());
        assert_eq!(
            validate_customer_name(&"a".repeat(MAX_NAME_CHARS + 1)),
            Err(NameError::TooLong)
        );
    }

    #[test]
    fn test_text_before_item_is_refused() {
        assert!(matches!(
            transition(&OrderState::Idle, Input::Text("hello")),
            Step::Stay(Prompt::ChooseItemFirst)
        ));
    }

    #[test]
    fn test_invalid_quantity_stays() {
        assert!(matches!(
            transition(&awaiting_quantity(), Input::Text("many")),
            Step::Stay(Prompt::InvalidQuantity)
        ));
    }

    #[test]
    fn test_quantity_moves_to_name() {
        match transition(&awaiting_quantity(), Input::Text("2")) {
            Step::Goto(state, reply) => {
                assert_eq!(
                    state,
                    OrderState::AwaitingName {
                        item_code: "PZ1".into(),
                        quantity: 2
                    }
                );
                assert_eq!(reply, Reply::Prompt(Prompt::EnterName));
            }
            _ => panic!("expected a transition to AwaitingName"),
        }
    }

    #[test]
    fn test_name_submits_order() {
        let state = OrderState::AwaitingName {
            item_code: "SD1".into(),
            quantity: 5,
        };
        match transition(&state, Input::Text("Bob")) {
            Step::Submit(order) => assert_eq!(order, Order::new("Bob", "SD1", 5)),
            _ => panic!("expected an order submission"),
        }
    }

    #[test]
    fn test_selection_from_any_state_restarts_capture() {
        let state = OrderState::AwaitingName {
            item_code: "SD1".into(),
            quantity: 5,
        };
        match transition(&state, Input::Select { code: "PZ1", on_menu: true }) {
            Step::Goto(next, _) => assert_eq!(next, awaiting_quantity()),
            _ => panic!("expected a transition to AwaitingQuantity"),
        }
        assert!(matches!(
            transition(&state, Input::Select { code: "XX", on_menu: false }),
            Step::Stay(Prompt::UnknownItem)
        ));
    }

    #[test]
    fn test_start_and_cancel_reset() {
        let state = awaiting_quantity();
        assert!(matches!(
            transition(&state, Input::Start(Vec::new())),
            Step::Goto(OrderState::Idle, Reply::Menu(_))
        ));
        assert!(matches!(
            transition(&state, Input::Cancel),
            Step::Goto(OrderState::Idle, Reply::Prompt(Prompt::Cancelled))
        ));
    }

    #[test]
    fn test_jitter_bounds() {
        let base = Duration::from_millis(400);
        for _ in 0..50 {
            let delay = with_jitter(base);
            assert!(delay >= base && delay <= Duration::from_millis(500));
        }
        assert_eq!(with_jitter(Duration::ZERO), Duration::ZERO);
    }
}
