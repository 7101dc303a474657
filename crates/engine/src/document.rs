// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural edits of the stage document.
//!
//! Every operation takes the current document by reference and returns a
//! fresh one; callers swap the result in whole. Operations that shift task
//! positions run the resolver so that no reference is left pointing at the
//! wrong task.

use crate::error::{check_index, EngineError};
use crate::resolver::{calculate_stage_variables, heal_post_build_references, Recalculation};
use ps_core::{
    ConditionCategory, ConditionDetail, ConditionType, InlineStepDetail, MountPathMap, Plugin,
    PluginRefStepDetail, ScriptType, StageDocument, StageKey, StepDetail, Task, Variable,
    DEFAULT_CODE_MOUNT_PATH, DEFAULT_SHELL_SCRIPT,
};
use std::collections::HashSet;

/// Append an unset task to `key`. Returns the new document and the task's
/// 0-based position.
pub fn add_task(doc: &StageDocument, key: StageKey) -> Result<(StageDocument, usize), EngineError> {
    if key == StageKey::Build {
        return Err(EngineError::NoTasks(key));
    }
    let mut next = doc.clone();
    let stage = next.stage_mut(key);
    let vars = calculate_stage_variables(stage, key, Recalculation::AddTask);
    let index = vars.index as u32;
    let mut task = Task::new(index, format!("Task {index}"));
    task.index = index;
    stage.steps.push(task);
    tracing::debug!(stage = %key, index, "task added");
    Ok((next, vars.index - 1))
}

/// Remove the task at `index`, repairing references that pointed at it or
/// at any task after it.
pub fn remove_task(
    doc: &StageDocument,
    key: StageKey,
    index: usize,
) -> Result<StageDocument, EngineError> {
    check_index(key, index, doc.stage(key).steps.len())?;
    let mut next = doc.clone();
    let removed = next.stage_mut(key).steps.remove(index);
    calculate_stage_variables(
        next.stage_mut(key),
        key,
        Recalculation::Structural { start_index: index },
    );
    if key == StageKey::PreBuild {
        heal_post_build_references(&mut next.post_build_stage, index);
    }
    tracing::debug!(stage = %key, index, name = %removed.name, "task removed");
    Ok(next)
}

/// Move the task at `from` to position `to` within the same stage.
pub fn reorder_task(
    doc: &StageDocument,
    key: StageKey,
    from: usize,
    to: usize,
) -> Result<StageDocument, EngineError> {
    let len = doc.stage(key).steps.len();
    check_index(key, from, len)?;
    check_index(key, to, len)?;
    let mut next = doc.clone();
    if from == to {
        return Ok(next);
    }
    let steps = &mut next.stage_mut(key).steps;
    let task = steps.remove(from);
    steps.insert(to, task);
    let start_index = from.min(to);
    calculate_stage_variables(
        next.stage_mut(key),
        key,
        Recalculation::Structural { start_index },
    );
    if key == StageKey::PreBuild {
        heal_post_build_references(&mut next.post_build_stage, start_index);
    }
    Ok(next)
}

/// Move the task at `index` to the end of the other task-bearing stage.
///
/// Plugin tasks keep their plugin and variables but lose their conditions
/// and stored detail id. Returns the new document and the task's position in
/// the target stage.
pub fn move_task_to_other_stage(
    doc: &StageDocument,
    from: StageKey,
    index: usize,
) -> Result<(StageDocument, usize), EngineError> {
    let to = from.opposite().ok_or(EngineError::NoTasks(from))?;
    check_index(from, index, doc.stage(from).steps.len())?;

    let mut next = doc.clone();
    let mut task = next.stage_mut(from).steps.remove(index);
    if let StepDetail::PluginRef(detail) = &mut task.detail {
        detail.id = 0;
        detail.condition_details.clear();
    }
    next.stage_mut(to).steps.push(task);
    let position = next.stage(to).steps.len() - 1;

    calculate_stage_variables(
        next.stage_mut(from),
        from,
        Recalculation::Structural { start_index: index },
    );
    let recalc = match to {
        StageKey::PreBuild => Recalculation::MoveTask {
            start_index: position,
        },
        _ => Recalculation::Structural {
            start_index: position,
        },
    };
    calculate_stage_variables(next.stage_mut(to), to, recalc);
    if from == StageKey::PreBuild {
        heal_post_build_references(&mut next.post_build_stage, index);
    }
    tracing::debug!(from = %from, to = %to, index, position, "task moved across stages");
    Ok((next, position))
}

/// Replace the task at `index` with the result of `edit`.
pub fn update_task(
    doc: &StageDocument,
    key: StageKey,
    index: usize,
    edit: impl FnOnce(&Task) -> Result<Task, EngineError>,
) -> Result<StageDocument, EngineError> {
    check_index(key, index, doc.stage(key).steps.len())?;
    let mut next = doc.clone();
    let slot = &mut next.stage_mut(key).steps[index];
    let mut edited = edit(slot)?;
    edited.index = slot.index;
    *slot = edited;
    Ok(next)
}

// ── Task-level edits ────────────────────────────────────────────────────────

/// Variant chosen for a task
#[derive(Debug, Clone, Copy)]
pub enum StepKind<'a> {
    Inline,
    PluginRef(&'a Plugin),
}

/// Give `task` a new variant, discarding its previous detail.
///
/// Inline tasks start as shell tasks with the boilerplate script. Plugin
/// tasks copy the plugin's declared inputs and outputs, and take the
/// plugin's name and description where the task has none.
pub fn set_step_type(task: &Task, kind: StepKind<'_>) -> Task {
    let detail = match kind {
        StepKind::Inline => StepDetail::Inline(InlineStepDetail::shell()),
        StepKind::PluginRef(plugin) => StepDetail::PluginRef(PluginRefStepDetail {
            id: 0,
            plugin_id: plugin.id,
            condition_details: Vec::new(),
            input_variables: plugin.input_variables.clone(),
            output_variables: plugin.output_variables.clone(),
        }),
    };
    let mut next = Task {
        detail,
        ..task.clone()
    };
    if let StepKind::PluginRef(plugin) = kind {
        if next.name.is_empty() {
            next.name = plugin.name.clone();
        }
        if next.description.is_empty() {
            next.description = plugin.description.clone();
        }
    }
    next
}

/// Switch an inline task's script type. Leaving shell clears a script that
/// was never edited; entering it with no script installs the boilerplate.
/// Non-inline tasks are returned unchanged.
pub fn set_script_type(task: &Task, script_type: ScriptType) -> Task {
    let mut next = task.clone();
    if let Some(detail) = next.inline_mut() {
        if detail.script_type == ScriptType::Shell
            && script_type != ScriptType::Shell
            && detail.has_default_script()
        {
            detail.script.clear();
        }
        if script_type == ScriptType::Shell && detail.script.is_empty() {
            detail.script = DEFAULT_SHELL_SCRIPT.to_string();
        }
        detail.script_type = script_type;
    }
    next
}

pub fn set_mount_code_to_container(task: &Task, enabled: bool) -> Task {
    let mut next = task.clone();
    if let Some(detail) = next.inline_mut() {
        detail.mount_code_to_container = enabled;
        if enabled && detail.mount_code_to_container_path.is_empty() {
            detail.mount_code_to_container_path = DEFAULT_CODE_MOUNT_PATH.to_string();
        }
    }
    next
}

pub fn set_mount_directory_from_host(task: &Task, enabled: bool) -> Task {
    let mut next = task.clone();
    if let Some(detail) = next.inline_mut() {
        detail.mount_directory_from_host = enabled;
        if enabled && detail.mount_path_map.is_empty() {
            detail.mount_path_map.push(MountPathMap::default());
        }
    }
    next
}

/// Add a condition row, dropping every row of the opposing type.
pub fn add_condition(task: &Task, condition: ConditionDetail) -> Option<Task> {
    let mut next = task.clone();
    let conditions = next.condition_details_mut()?;
    let opposing = condition.condition_type.opposing();
    conditions.retain(|c| c.condition_type != opposing);
    conditions.push(condition);
    Some(next)
}

/// Drop condition rows that cannot apply: execution conditions when the
/// task has no inputs, outcome conditions when it has no outputs.
pub fn filter_invalid_condition_details(
    conditions: &[ConditionDetail],
    input_count: usize,
    output_count: usize,
) -> Vec<ConditionDetail> {
    conditions
        .iter()
        .filter(|c| match c.condition_type.category() {
            ConditionCategory::Execution => input_count > 0,
            ConditionCategory::Outcome => output_count > 0,
        })
        .cloned()
        .collect()
}

/// Blank the variable of condition rows whose variable no longer exists on
/// the task (inputs for execution conditions, outputs for outcome ones).
pub fn clear_stale_condition_variables(doc: &StageDocument) -> StageDocument {
    let mut next = doc.clone();
    for key in [StageKey::PreBuild, StageKey::PostBuild] {
        for task in &mut next.stage_mut(key).steps {
            let inputs: HashSet<String> =
                task.input_variables().iter().map(|v| v.name.clone()).collect();
            let outputs: HashSet<String> =
                task.output_variables().iter().map(|v| v.name.clone()).collect();
            let Some(conditions) = task.condition_details_mut() else {
                continue;
            };
            for condition in conditions.iter_mut() {
                let known = match condition.condition_type.category() {
                    ConditionCategory::Execution => &inputs,
                    ConditionCategory::Outcome => &outputs,
                };
                if !condition.condition_on_variable.is_empty()
                    && !known.contains(&condition.condition_on_variable)
                {
                    condition.condition_on_variable.clear();
                }
            }
        }
    }
    next
}

/// True when no two tasks across pre- and post-build share a name.
pub fn check_uniqueness(doc: &StageDocument) -> bool {
    let mut seen = HashSet::new();
    doc.task_names().all(|name| seen.insert(name))
}

/// Names used by more than one task, in first-seen order
pub fn duplicate_task_names(doc: &StageDocument) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dupes: Vec<String> = Vec::new();
    for name in doc.task_names() {
        if !seen.insert(name) && !dupes.iter().any(|d| d == name) {
            dupes.push(name.to_string());
        }
    }
    dupes
}

/// Normalise the document for submission.
///
/// Container image tasks drop whatever their disabled toggles hide, lose
/// their outputs and outcome conditions, and keep only port rows with at
/// least one side set. Condition rows that cannot apply are removed from
/// every task.
pub fn prepare_for_save(doc: &StageDocument) -> StageDocument {
    let mut next = doc.clone();
    for key in [StageKey::PreBuild, StageKey::PostBuild] {
        for task in &mut next.stage_mut(key).steps {
            if let Some(detail) = task.inline_mut() {
                if detail.script_type == ScriptType::ContainerImage {
                    strip_container_detail(detail);
                }
            }
            let inputs = task.input_variables().len();
            let outputs = task.output_variables().len();
            if let Some(conditions) = task.condition_details_mut() {
                *conditions = filter_invalid_condition_details(conditions, inputs, outputs);
            }
        }
    }
    next
}

fn strip_container_detail(detail: &mut InlineStepDetail) {
    if !detail.is_mount_custom_script {
        detail.script.clear();
        detail.store_script_at.clear();
    }
    if !detail.mount_code_to_container {
        detail.mount_code_to_container_path.clear();
    }
    if !detail.mount_directory_from_host {
        detail.mount_path_map.clear();
    }
    detail.output_variables.clear();
    detail
        .condition_details
        .retain(|c| c.condition_type.category() != ConditionCategory::Outcome);
    detail.port_map.retain(|p| !p.is_blank());
}

/// Next free id among `vars`
pub fn next_variable_id(vars: &[Variable]) -> u32 {
    vars.iter().map(|v| v.id).max().unwrap_or(0) + 1
}

/// Next free id among `conditions`
pub fn next_condition_id(conditions: &[ConditionDetail]) -> u32 {
    conditions.iter().map(|c| c.id).max().unwrap_or(0) + 1
}

/// Convenience for building the row `add_condition` expects
pub fn new_condition(task: &Task, condition_type: ConditionType) -> ConditionDetail {
    ConditionDetail::new(next_condition_id(task.condition_details()), condition_type)
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
