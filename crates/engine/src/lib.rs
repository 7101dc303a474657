// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Pipeline stage editing engine: structural edits, variable scope
//! resolution and validation over a [`ps_core::StageDocument`].

pub mod document;
mod error;
pub mod resolver;
pub mod validate;

pub use document::{
    add_condition, add_task, check_uniqueness, clear_stale_condition_variables,
    duplicate_task_names, filter_invalid_condition_details, move_task_to_other_stage,
    new_condition, next_condition_id, next_variable_id, prepare_for_save, remove_task,
    reorder_task, set_mount_code_to_container, set_mount_directory_from_host, set_script_type,
    set_step_type, update_task, StepKind,
};
pub use error::{check_index, EngineError};
pub use resolver::{
    calculate_stage_variables, derive_document_variables, heal_post_build_references,
    snapshot_key, visible_variables, DocumentVariables, Recalculation, StageVariables,
    VariableSnapshot, VisibleVariables,
};
pub use validate::{
    validate_build_stage, validate_form, validate_name, validate_stage, validate_task,
    TaskScope, ValidationScope,
};
