//! Telegram notifications for new uploads.
//!
//! [`TelegramNotifier`] implements the core [`Notifier`] contract on top of
//! the Telegram Bot API: `sendMessage` for text submissions, `sendPhoto` or
//! `sendDocument` when the stored blob travels along as an attachment.
//!
//! An unconfigured notifier (empty token or chat id) is a silent no-op.
//!
//! [`Notifier`]: sharebox_core::notify::Notifier

mod config;
mod notifier;
mod types;

pub use config::TelegramConfig;
pub use notifier::TelegramNotifier;
