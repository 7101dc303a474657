// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Form validation.
//!
//! Validation never stops at the first failure: every leaf of the form gets
//! a [`FieldError`] so the whole error document can be shown at once.

use crate::resolver::{visible_variables, DocumentVariables, VisibleVariables};
use ps_core::{
    BuildStageErrors, ConditionCategory, ConditionDetail, ConditionErrors, DetailErrors,
    ErrorDocument, FieldError, GlobalVariable, InlineStepDetail, PipelineForm,
    PluginRefStepDetail, ScriptType, StageErrors, StageKey, StepDetail, Task, TaskErrors, Variable,
    VariableErrors, VariableType,
};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Allowed characters of a variable name
#[allow(clippy::expect_used)]
pub static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("constant regex pattern is valid"));

pub const REQUIRED: &str = "This is required";
pub const VARIABLE_NAME_AND_VALUE_REQUIRED: &str = "Variable name and value are required";
pub const VARIABLE_NAME_REQUIRED: &str = "Variable name is required";
pub const VARIABLE_VALUE_REQUIRED: &str = "Variable value is required";
pub const VARIABLE_NAME_NOT_UNIQUE: &str = "Variable name should be unique";
pub const VARIABLE_NAME_INVALID: &str =
    "Invalid name. Only alphanumeric characters and underscore are allowed";
pub const DISK_PATH_REQUIRED: &str = "File path on disk is required";
pub const CONTAINER_PATH_REQUIRED: &str = "File path on container is required";
pub const BOTH_PATHS_REQUIRED: &str = "File path on disk and container are required";
pub const OUTCOME_CONDITION_INCOMPLETE: &str =
    "Please complete or remove this pass/failure condition";
pub const EXECUTION_CONDITION_INCOMPLETE: &str =
    "Please complete or remove this trigger/skip condition";

/// Everything a task is validated against besides itself
#[derive(Debug, Clone, Copy)]
pub struct TaskScope<'a> {
    pub visible: VisibleVariables<'a>,
    /// Whether plugin input values are checked like inline ones
    pub validate_plugin_inputs: bool,
}

/// Derived state a whole form is validated against
#[derive(Debug, Clone, Copy)]
pub struct ValidationScope<'a> {
    pub vars: &'a DocumentVariables,
    pub globals: &'a [GlobalVariable],
    pub validate_plugin_inputs: bool,
}

impl<'a> ValidationScope<'a> {
    pub fn new(vars: &'a DocumentVariables, globals: &'a [GlobalVariable]) -> Self {
        Self {
            vars,
            globals,
            validate_plugin_inputs: true,
        }
    }

    pub fn task_scope(&self, key: StageKey, position: usize) -> TaskScope<'a> {
        TaskScope {
            visible: visible_variables(self.vars, key, position, self.globals),
            validate_plugin_inputs: self.validate_plugin_inputs,
        }
    }
}

fn required(value: &str) -> FieldError {
    if value.trim().is_empty() {
        FieldError::invalid(REQUIRED)
    } else {
        FieldError::valid()
    }
}

pub fn validate_name(name: &str) -> FieldError {
    required(name)
}

pub fn validate_task(task: &Task, scope: &TaskScope<'_>) -> TaskErrors {
    let name = required(&task.name);
    let (inline_step_detail, plugin_ref_step_detail) = match &task.detail {
        StepDetail::Unset => (None, None),
        StepDetail::Inline(detail) => (Some(inline_errors(detail, scope)), None),
        StepDetail::PluginRef(detail) => (None, Some(plugin_errors(detail, scope))),
    };
    let detail_valid = inline_step_detail
        .as_ref()
        .or(plugin_ref_step_detail.as_ref())
        .map_or(true, DetailErrors::is_valid);
    TaskErrors {
        is_valid: name.is_valid && detail_valid,
        name,
        inline_step_detail,
        plugin_ref_step_detail,
    }
}

fn inline_errors(detail: &InlineStepDetail, scope: &TaskScope<'_>) -> DetailErrors {
    let input_variables = validate_inputs(&detail.input_variables, &scope.visible);
    let output_variables = validate_outputs(&detail.output_variables);
    let condition_details = validate_conditions(
        &detail.condition_details,
        &detail.input_variables,
        &detail.output_variables,
    );

    let mut errors = DetailErrors {
        is_input_variables_valid: input_variables.iter().all(VariableErrors::is_valid),
        is_output_variables_valid: output_variables.iter().all(VariableErrors::is_valid),
        is_condition_details_valid: condition_details.iter().all(ConditionErrors::is_valid),
        input_variables,
        output_variables,
        condition_details,
        ..DetailErrors::default()
    };

    match detail.script_type {
        ScriptType::Shell => errors.script = Some(required(&detail.script)),
        ScriptType::ContainerImage => {
            errors.container_image_path = Some(required(&detail.container_image_path));
            if detail.is_mount_custom_script {
                errors.script = Some(required(&detail.script));
                errors.store_script_at = Some(required(&detail.store_script_at));
            }
            if detail.mount_code_to_container {
                errors.mount_code_to_container_path =
                    Some(required(&detail.mount_code_to_container_path));
            }
            if detail.mount_directory_from_host {
                errors.mount_path_map = detail
                    .mount_path_map
                    .iter()
                    .map(|m| {
                        match (
                            m.file_path_on_disk.trim().is_empty(),
                            m.file_path_on_container.trim().is_empty(),
                        ) {
                            (true, true) => FieldError::invalid(BOTH_PATHS_REQUIRED),
                            (true, false) => FieldError::invalid(DISK_PATH_REQUIRED),
                            (false, true) => FieldError::invalid(CONTAINER_PATH_REQUIRED),
                            (false, false) => FieldError::valid(),
                        }
                    })
                    .collect();
            }
        }
        ScriptType::Dockerfile => {}
    }
    errors
}

fn plugin_errors(detail: &PluginRefStepDetail, scope: &TaskScope<'_>) -> DetailErrors {
    let input_variables = if scope.validate_plugin_inputs {
        validate_inputs(&detail.input_variables, &scope.visible)
    } else {
        Vec::new()
    };
    let condition_details = validate_conditions(
        &detail.condition_details,
        &detail.input_variables,
        &detail.output_variables,
    );
    DetailErrors {
        is_input_variables_valid: input_variables.iter().all(VariableErrors::is_valid),
        is_condition_details_valid: condition_details.iter().all(ConditionErrors::is_valid),
        input_variables,
        condition_details,
        ..DetailErrors::default()
    }
}

/// Count occurrences of each non-empty name
fn name_counts(vars: &[Variable]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for var in vars.iter().filter(|v| !v.name.is_empty()) {
        *counts.entry(var.name.as_str()).or_insert(0) += 1;
    }
    counts
}

fn check_name(name: &str, counts: &HashMap<&str, usize>) -> FieldError {
    if name.is_empty() {
        FieldError::invalid(VARIABLE_NAME_REQUIRED)
    } else if !NAME_PATTERN.is_match(name) {
        FieldError::invalid(VARIABLE_NAME_INVALID)
    } else if counts.get(name).copied().unwrap_or(0) > 1 {
        FieldError::invalid(VARIABLE_NAME_NOT_UNIQUE)
    } else {
        FieldError::valid()
    }
}

fn has_value(var: &Variable, visible: &VisibleVariables<'_>) -> bool {
    if var.allow_empty_value || !var.default_value.is_empty() {
        return true;
    }
    match var.variable_type {
        VariableType::New => !var.value.is_empty(),
        VariableType::Global | VariableType::FromPreviousStep => visible.resolves(var),
    }
}

fn validate_inputs(vars: &[Variable], visible: &VisibleVariables<'_>) -> Vec<VariableErrors> {
    let counts = name_counts(vars);
    vars.iter()
        .map(|var| {
            let valued = has_value(var, visible);
            let (name, value) = if var.name.is_empty() && !valued {
                (
                    FieldError::invalid(VARIABLE_NAME_AND_VALUE_REQUIRED),
                    FieldError::missing(),
                )
            } else {
                let value = if valued {
                    FieldError::valid()
                } else {
                    FieldError::invalid(VARIABLE_VALUE_REQUIRED)
                };
                (check_name(&var.name, &counts), value)
            };
            VariableErrors {
                id: var.id,
                name,
                value,
            }
        })
        .collect()
}

fn validate_outputs(vars: &[Variable]) -> Vec<VariableErrors> {
    let counts = name_counts(vars);
    vars.iter()
        .map(|var| VariableErrors {
            id: var.id,
            name: check_name(&var.name, &counts),
            value: FieldError::valid(),
        })
        .collect()
}

fn validate_conditions(
    conditions: &[ConditionDetail],
    inputs: &[Variable],
    outputs: &[Variable],
) -> Vec<ConditionErrors> {
    conditions
        .iter()
        .map(|c| {
            let (available, message) = match c.condition_type.category() {
                ConditionCategory::Execution => (inputs, EXECUTION_CONDITION_INCOMPLETE),
                ConditionCategory::Outcome => (outputs, OUTCOME_CONDITION_INCOMPLETE),
            };
            let known = !c.condition_on_variable.is_empty()
                && available.iter().any(|v| v.name == c.condition_on_variable);
            let cell = |ok: bool| {
                if ok {
                    FieldError::valid()
                } else {
                    FieldError::missing()
                }
            };
            let mut errors = ConditionErrors {
                id: c.id,
                condition_on_variable: cell(known),
                condition_operator: cell(c.condition_operator.is_some()),
                conditional_value: cell(!c.conditional_value.is_empty()),
                message: None,
            };
            if !errors.is_valid() {
                errors.message = Some(message.to_string());
            }
            errors
        })
        .collect()
}

/// Validate the tasks of `key`. The stage is only valid when the pipeline
/// name is too.
pub fn validate_stage(
    form: &PipelineForm,
    key: StageKey,
    scope: &ValidationScope<'_>,
) -> StageErrors {
    let steps: Vec<TaskErrors> = form
        .stages
        .stage(key)
        .steps
        .iter()
        .enumerate()
        .map(|(position, task)| validate_task(task, &scope.task_scope(key, position)))
        .collect();
    StageErrors {
        is_valid: validate_name(&form.name).is_valid && steps.iter().all(|t| t.is_valid),
        steps,
    }
}

/// The build stage needs a pipeline name and at least one material with a
/// branch. A webhook material satisfies the material check on its own.
pub fn validate_build_stage(form: &PipelineForm) -> BuildStageErrors {
    let materials: Vec<FieldError> = form
        .materials
        .iter()
        .map(|m| {
            if m.is_webhook() {
                FieldError::valid()
            } else {
                required(m.effective_value())
            }
        })
        .collect();
    let materials_valid = form.materials.iter().any(|m| m.is_webhook())
        || materials.iter().any(|m| m.is_valid);
    BuildStageErrors {
        is_valid: validate_name(&form.name).is_valid && materials_valid,
        materials,
    }
}

pub fn validate_form(form: &PipelineForm, scope: &ValidationScope<'_>) -> ErrorDocument {
    ErrorDocument {
        name: validate_name(&form.name),
        pre_build_stage: validate_stage(form, StageKey::PreBuild, scope),
        build_stage: validate_build_stage(form),
        post_build_stage: validate_stage(form, StageKey::PostBuild, scope),
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
