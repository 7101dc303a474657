// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ps-core: Stage document model for the pipeline stage engine

pub mod catalog;
pub mod condition;
pub mod error_doc;
pub mod form;
pub mod serde_util;
pub mod stage;
pub mod task;
pub mod variable;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use catalog::{Catalog, GlobalVariable, Plugin, PluginType};
pub use condition::{ConditionCategory, ConditionDetail, ConditionOperator, ConditionType};
pub use error_doc::{
    BuildStageErrors, ConditionErrors, DetailErrors, ErrorDocument, FieldError, StageErrors,
    TaskErrors, VariableErrors,
};
pub use form::{
    DockerArg, GitMaterial, PipelineForm, SourceMaterial, SourceType, TriggerType,
    WebhookCondition,
};
pub use stage::{RefVariableStage, Stage, StageDocument, StageKey};
pub use task::{
    CommandArgs, InlineStepDetail, MountPathMap, PluginRefStepDetail, PortMap, ScriptType,
    StepDetail, StepType, Task, DEFAULT_CODE_MOUNT_PATH, DEFAULT_SHELL_SCRIPT,
};
pub use variable::{Variable, VariableFormat, VariableType};
