// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ps-session: one editing session over a pipeline form.
//!
//! The session owns the current form, its derived variable scopes and its
//! error document, and re-derives both after every edit.

pub mod config;
mod error;
mod session;

pub use config::{ConfigError, EngineConfig, DEFAULT_HISTORY_LIMIT};
pub use error::{EditError, SaveError};
pub use session::{ParseFailure, Session, Snapshot, TaskKind};
