//! # Order Bot
//!
//! A Telegram bot that shows a menu kept in a Google Sheet, walks each user
//! through item, quantity and name, and appends the order as a row to the
//! orders worksheet. An optional admin chat is told about every order.

pub mod bot;
pub mod circuit_breaker;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod health;
pub mod localization;
pub mod menu;
pub mod order;
pub mod session;
pub mod sheets;
