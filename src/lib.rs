//! Library crate for userdeck.
//!
//! This crate exposes the building blocks of the TUI:
//! - Records API model, request builder and HTTP transport (`api`)
//! - Application state, state machine and event loop (`app`)
//! - Command-line options and config paths (`config`)
//! - Error types (`error`)
//! - File logging setup (`logging`)
//! - In-memory search helpers (`search`)
//! - UI rendering (`ui`)
//!
//! It is used by the `userdeck` binary and by tests.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod search;
pub mod ui;

pub use error::{ApiError, Result};
