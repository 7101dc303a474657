// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for document operations

use ps_core::StageKey;
use thiserror::Error;

/// Errors raised by operations addressed at a task that cannot be edited.
///
/// Validation failures are never reported here; they live in the
/// [`ErrorDocument`](ps_core::ErrorDocument).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{stage}: task index {index} out of range ({len} tasks)")]
    TaskOutOfRange {
        stage: StageKey,
        index: usize,
        len: usize,
    },
    #[error("{0} does not hold tasks")]
    NoTasks(StageKey),
    #[error("{stage}: task {index} has no step type yet")]
    UnsetTask { stage: StageKey, index: usize },
}

/// Check that `index` addresses an existing task of a task-bearing stage.
pub fn check_index(stage: StageKey, index: usize, len: usize) -> Result<(), EngineError> {
    if stage == StageKey::Build {
        return Err(EngineError::NoTasks(stage));
    }
    if index >= len {
        return Err(EngineError::TaskOutOfRange { stage, index, len });
    }
    Ok(())
}
