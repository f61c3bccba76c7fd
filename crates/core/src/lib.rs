//! Core business logic for Sharebox.
//!
//! This crate contains the upload/persist/notify pipeline with ZERO web or
//! database dependencies. Persistence and delivery are reached through the
//! [`share::FileRepository`] and [`notify::Notifier`] traits.
//!
//! # Modules
//!
//! - `storage` - Blob store on the local filesystem
//! - `share` - Upload orchestration and retrieval
//! - `notify` - Notification contract and message formatting

pub mod notify;
pub mod share;
pub mod storage;
