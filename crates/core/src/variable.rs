// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task input and output variables.

use crate::serde_util::{empty_as_none, null_default};
use crate::stage::RefVariableStage;
use serde::{Deserialize, Serialize};

/// Where an input variable takes its value from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    /// Literal value typed by the user
    #[default]
    New,
    /// Reference to a platform-provided global variable
    Global,
    /// Reference to an output of an earlier task
    FromPreviousStep,
}

/// Declared value format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariableFormat {
    #[default]
    String,
    Number,
    Bool,
    Date,
    File,
}

/// An input or output variable of a task.
///
/// Reference fields (`ref_variable_*`) are only meaningful when
/// `variable_type` is not [`VariableType::New`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    #[serde(default)]
    pub id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub format: VariableFormat,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_default")]
    pub default_value: String,
    #[serde(default, deserialize_with = "null_default")]
    pub allow_empty_value: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub variable_type: VariableType,
    #[serde(default, deserialize_with = "null_default")]
    pub ref_variable_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub ref_variable_step_index: u32,
    #[serde(
        default,
        with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub ref_variable_stage: Option<RefVariableStage>,
}

impl Variable {
    /// A `NEW` variable with the given id and name and no value.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// A variable that reads the output `name` of task `step_index` (1-based)
    /// in `stage`.
    pub fn from_previous_step(
        id: u32,
        name: impl Into<String>,
        stage: RefVariableStage,
        step_index: u32,
        ref_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            variable_type: VariableType::FromPreviousStep,
            ref_variable_stage: Some(stage),
            ref_variable_step_index: step_index,
            ref_variable_name: ref_name.into(),
            ..Self::default()
        }
    }

    /// A variable bound to the global variable `ref_name`.
    pub fn global(id: u32, name: impl Into<String>, ref_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            variable_type: VariableType::Global,
            ref_variable_name: ref_name.into(),
            ..Self::default()
        }
    }

    pub fn is_from_previous_step(&self) -> bool {
        self.variable_type == VariableType::FromPreviousStep
    }

    /// Drop any reference and fall back to an empty `NEW` value.
    pub fn reset_reference(&mut self) {
        self.variable_type = VariableType::New;
        self.ref_variable_step_index = 0;
        self.ref_variable_name.clear();
        self.ref_variable_stage = None;
        self.value.clear();
    }
}

#[cfg(test)]
#[path = "variable_tests.rs"]
mod tests;
