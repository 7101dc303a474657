// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session error types

use ps_core::StageKey;
use ps_engine::EngineError;
use ps_wire::{ServerError, WireError};
use thiserror::Error;

/// Reasons a save is refused or failed
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("a save is already in progress")]
    InProgress,
    #[error("All task names must be unique")]
    NamesNotUnique(Vec<String>),
    #[error("Scanning is mandatory, please enable scanning")]
    ScanRequired,
    #[error("pipeline has invalid stages: {}", stage_list(.0))]
    Invalid(Vec<StageKey>),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Errors from editing operations
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("unknown plugin {0}")]
    UnknownPlugin(u32),
}

fn stage_list(stages: &[StageKey]) -> String {
    stages
        .iter()
        .map(StageKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
