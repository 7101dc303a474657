// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error document: a validity mirror of the pipeline form.
//!
//! Every validated leaf of the form has a [`FieldError`]; every task and
//! stage node carries an aggregate `is_valid` that is the AND of its
//! children. The document is derived state, rebuilt after each validating
//! mutation and never persisted.

use crate::stage::StageKey;
use serde::Serialize;

/// Validity of a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl Default for FieldError {
    fn default() -> Self {
        Self::valid()
    }
}

impl FieldError {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }

    /// Invalid, with the message carried by the enclosing row
    pub fn missing() -> Self {
        Self {
            is_valid: false,
            message: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableErrors {
    /// Id of the variable these errors belong to
    pub id: u32,
    pub name: FieldError,
    pub value: FieldError,
}

impl VariableErrors {
    pub fn is_valid(&self) -> bool {
        self.name.is_valid && self.value.is_valid
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionErrors {
    pub id: u32,
    pub condition_on_variable: FieldError,
    pub condition_operator: FieldError,
    pub conditional_value: FieldError,
    /// Row-level summary shown when any field is missing
    pub message: Option<String>,
}

impl ConditionErrors {
    pub fn is_valid(&self) -> bool {
        self.condition_on_variable.is_valid
            && self.condition_operator.is_valid
            && self.conditional_value.is_valid
    }
}

/// Errors of a task's detail block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailErrors {
    pub input_variables: Vec<VariableErrors>,
    pub output_variables: Vec<VariableErrors>,
    pub condition_details: Vec<ConditionErrors>,
    pub is_input_variables_valid: bool,
    pub is_output_variables_valid: bool,
    pub is_condition_details_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_script_at: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_image_path: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_code_to_container_path: Option<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mount_path_map: Vec<FieldError>,
}

impl Default for DetailErrors {
    fn default() -> Self {
        Self {
            input_variables: Vec::new(),
            output_variables: Vec::new(),
            condition_details: Vec::new(),
            is_input_variables_valid: true,
            is_output_variables_valid: true,
            is_condition_details_valid: true,
            script: None,
            store_script_at: None,
            container_image_path: None,
            mount_code_to_container_path: None,
            mount_path_map: Vec::new(),
        }
    }
}

impl DetailErrors {
    /// Field leaves set on this block, excluding variable and condition rows
    fn field_leaves(&self) -> impl Iterator<Item = &FieldError> {
        self.script
            .iter()
            .chain(self.store_script_at.iter())
            .chain(self.container_image_path.iter())
            .chain(self.mount_code_to_container_path.iter())
            .chain(self.mount_path_map.iter())
    }

    pub fn is_valid(&self) -> bool {
        self.is_input_variables_valid
            && self.is_output_variables_valid
            && self.is_condition_details_valid
            && self.field_leaves().all(|f| f.is_valid)
    }

    fn messages(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for var in self.input_variables.iter().chain(&self.output_variables) {
            out.extend(var.name.message.as_deref());
            out.extend(var.value.message.as_deref());
        }
        out.extend(self.field_leaves().filter_map(|f| f.message.as_deref()));
        out.extend(
            self.condition_details
                .iter()
                .filter_map(|c| c.message.as_deref()),
        );
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskErrors {
    pub is_valid: bool,
    pub name: FieldError,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_step_detail: Option<DetailErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_ref_step_detail: Option<DetailErrors>,
}

impl Default for TaskErrors {
    fn default() -> Self {
        Self {
            is_valid: true,
            name: FieldError::valid(),
            inline_step_detail: None,
            plugin_ref_step_detail: None,
        }
    }
}

impl TaskErrors {
    pub fn detail(&self) -> Option<&DetailErrors> {
        self.inline_step_detail
            .as_ref()
            .or(self.plugin_ref_step_detail.as_ref())
    }

    /// Every message attached to this task, name first
    pub fn messages(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.name.message.as_deref().into_iter().collect();
        if let Some(detail) = self.detail() {
            out.extend(detail.messages());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageErrors {
    pub is_valid: bool,
    pub steps: Vec<TaskErrors>,
}

impl Default for StageErrors {
    fn default() -> Self {
        Self {
            is_valid: true,
            steps: Vec::new(),
        }
    }
}

/// The build stage is validated through the pipeline's source materials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStageErrors {
    pub is_valid: bool,
    pub materials: Vec<FieldError>,
}

impl Default for BuildStageErrors {
    fn default() -> Self {
        Self {
            is_valid: true,
            materials: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDocument {
    pub name: FieldError,
    pub pre_build_stage: StageErrors,
    pub build_stage: BuildStageErrors,
    pub post_build_stage: StageErrors,
}

impl ErrorDocument {
    /// Errors of a task-bearing stage. The build stage has none.
    pub fn stage(&self, key: StageKey) -> Option<&StageErrors> {
        match key {
            StageKey::PreBuild => Some(&self.pre_build_stage),
            StageKey::Build => None,
            StageKey::PostBuild => Some(&self.post_build_stage),
        }
    }

    pub fn stage_mut(&mut self, key: StageKey) -> Option<&mut StageErrors> {
        match key {
            StageKey::PreBuild => Some(&mut self.pre_build_stage),
            StageKey::Build => None,
            StageKey::PostBuild => Some(&mut self.post_build_stage),
        }
    }

    pub fn stage_is_valid(&self, key: StageKey) -> bool {
        match key {
            StageKey::Build => self.build_stage.is_valid,
            _ => self.stage(key).map_or(true, |s| s.is_valid),
        }
    }

    /// True when nothing blocks a save
    pub fn is_valid(&self) -> bool {
        StageKey::ALL.iter().all(|k| self.stage_is_valid(*k))
    }
}

#[cfg(test)]
#[path = "error_doc_tests.rs"]
mod tests;
