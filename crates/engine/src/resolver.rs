// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Variable scope derivation.
//!
//! A task may reference the outputs of tasks that run before it. For every
//! stage the resolver walks the tasks in order and records, per position, a
//! snapshot of the outputs produced by the tasks above. Snapshot keys are
//! `"{step_index}.{output_name}"` so that two tasks emitting the same name
//! never collide.
//!
//! The same walk enforces reference integrity: after a structural edit,
//! references that now point at a removed or shifted task are reset to plain
//! values.

use indexmap::IndexMap;
use ps_core::{
    GlobalVariable, RefVariableStage, ScriptType, Stage, StageDocument, StageKey, Variable,
    VariableType,
};

/// Outputs visible at one task position, keyed by `"{step_index}.{name}"`
pub type VariableSnapshot = IndexMap<String, Variable>;

/// Snapshot key of an output emitted by the task at 1-based `step_index`
pub fn snapshot_key(step_index: u32, name: &str) -> String {
    format!("{step_index}.{name}")
}

/// Why a stage is being recalculated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recalculation {
    /// Fresh document, no references are touched
    Load,
    /// A task is about to be appended
    AddTask,
    /// Tasks at or after `start_index` (0-based) moved or were removed
    Structural { start_index: usize },
    /// A task from the other stage was appended at `start_index`
    MoveTask { start_index: usize },
}

impl Recalculation {
    fn start_index(&self) -> Option<usize> {
        match self {
            Recalculation::Structural { start_index } | Recalculation::MoveTask { start_index } => {
                Some(*start_index)
            }
            Recalculation::Load | Recalculation::AddTask => None,
        }
    }

    fn pushes_trailing_snapshot(&self) -> bool {
        matches!(
            self,
            Recalculation::AddTask | Recalculation::MoveTask { .. }
        )
    }
}

/// Derived variable scope of one stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageVariables {
    /// 1-based index the next appended task receives
    pub index: usize,
    /// Snapshot per task position; `[i]` holds what task `i` may reference
    pub calculated_stage_variables: Vec<VariableSnapshot>,
    /// Every output of the stage
    pub outputs: VariableSnapshot,
}

impl StageVariables {
    pub fn for_task(&self, position: usize) -> Option<&VariableSnapshot> {
        self.calculated_stage_variables.get(position)
    }
}

/// Recompute the stage's scope, reindexing tasks and repairing references.
///
/// Besides the snapshots, this normalises two things on the stage it walks:
/// every task's `index` is rewritten to its 1-based position, and container
/// image tasks that carry a script are flagged as mounting it.
pub fn calculate_stage_variables(
    stage: &mut Stage,
    key: StageKey,
    recalc: Recalculation,
) -> StageVariables {
    let own_tag = key.ref_stage();
    let start = recalc.start_index();
    let mut snapshots = Vec::with_capacity(stage.steps.len() + 1);
    let mut outputs = VariableSnapshot::new();

    for (i, task) in stage.steps.iter_mut().enumerate() {
        snapshots.push(outputs.clone());
        let step_index = i as u32 + 1;
        task.index = step_index;
        if task.is_unset() {
            continue;
        }

        if let Some(detail) = task.inline_mut() {
            if detail.script_type == ScriptType::ContainerImage
                && !detail.script.is_empty()
                && !detail.is_mount_custom_script
            {
                detail.is_mount_custom_script = true;
            }
        }

        for output in task.output_variables() {
            if output.name.is_empty() {
                continue;
            }
            let mut var = output.clone();
            var.ref_variable_step_index = step_index;
            var.ref_variable_stage = own_tag;
            outputs.insert(snapshot_key(step_index, &output.name), var);
        }

        let Some(start) = start else { continue };
        if i < start {
            continue;
        }
        let Some(inputs) = task.input_variables_mut() else {
            continue;
        };
        for input in inputs.iter_mut() {
            if stale_reference(input, key, own_tag, start) {
                tracing::debug!(
                    stage = %key,
                    task = step_index,
                    variable = %input.name,
                    ref_step = input.ref_variable_step_index,
                    "resetting stale variable reference"
                );
                input.reset_reference();
            }
        }
    }

    if recalc.pushes_trailing_snapshot() {
        snapshots.push(outputs.clone());
    }

    StageVariables {
        index: stage.steps.len() + 1,
        calculated_stage_variables: snapshots,
        outputs,
    }
}

fn stale_reference(
    input: &Variable,
    key: StageKey,
    own_tag: Option<RefVariableStage>,
    start: usize,
) -> bool {
    if !input.is_from_previous_step() {
        return false;
    }
    let same_stage =
        input.ref_variable_stage == own_tag && input.ref_variable_step_index as usize > start;
    let forward_into_post =
        key == StageKey::PreBuild && input.ref_variable_stage == Some(RefVariableStage::PostCi);
    same_stage || forward_into_post
}

/// Reset post-build references into pre-build that pointed at or after the
/// removed pre-build position (0-based).
///
/// Returns the number of references reset.
pub fn heal_post_build_references(post: &mut Stage, removed_pre_index: usize) -> usize {
    let mut healed = 0;
    for task in post.steps.iter_mut() {
        let task_index = task.index;
        let Some(inputs) = task.input_variables_mut() else {
            continue;
        };
        for input in inputs.iter_mut() {
            if input.is_from_previous_step()
                && input.ref_variable_stage == Some(RefVariableStage::PreCi)
                && input.ref_variable_step_index as usize > removed_pre_index
            {
                tracing::debug!(
                    task = task_index,
                    variable = %input.name,
                    ref_step = input.ref_variable_step_index,
                    "resetting post-build reference into removed pre-build task"
                );
                input.reset_reference();
                healed += 1;
            }
        }
    }
    healed
}

/// Derived scope of every stage of a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentVariables {
    pub pre_build_stage: StageVariables,
    pub build_stage: StageVariables,
    pub post_build_stage: StageVariables,
}

impl DocumentVariables {
    pub fn stage(&self, key: StageKey) -> &StageVariables {
        match key {
            StageKey::PreBuild => &self.pre_build_stage,
            StageKey::Build => &self.build_stage,
            StageKey::PostBuild => &self.post_build_stage,
        }
    }

    pub fn stage_mut(&mut self, key: StageKey) -> &mut StageVariables {
        match key {
            StageKey::PreBuild => &mut self.pre_build_stage,
            StageKey::Build => &mut self.build_stage,
            StageKey::PostBuild => &mut self.post_build_stage,
        }
    }
}

/// Derive every stage's scope without touching references.
pub fn derive_document_variables(doc: &mut StageDocument) -> DocumentVariables {
    let mut vars = DocumentVariables::default();
    for key in StageKey::ALL {
        *vars.stage_mut(key) = calculate_stage_variables(doc.stage_mut(key), key, Recalculation::Load);
    }
    vars
}

/// What one task may reference
#[derive(Debug, Clone, Copy)]
pub struct VisibleVariables<'a> {
    /// All pre-build outputs; only set for post-build tasks
    pub from_pre_build: Option<&'a VariableSnapshot>,
    /// Outputs of earlier tasks of the same stage; `None` when the scope has
    /// not been derived for this position
    pub from_previous_steps: Option<&'a VariableSnapshot>,
    pub globals: &'a [GlobalVariable],
    stage: StageKey,
}

impl<'a> VisibleVariables<'a> {
    /// Scope without derived snapshots. Any named reference is accepted.
    pub fn unscoped(stage: StageKey, globals: &'a [GlobalVariable]) -> Self {
        Self {
            from_pre_build: None,
            from_previous_steps: None,
            globals,
            stage,
        }
    }

    pub fn stage(&self) -> StageKey {
        self.stage
    }

    /// Candidates a reference may pick, pre-build outputs first
    pub fn candidates(&self) -> impl Iterator<Item = &'a Variable> {
        self.from_pre_build
            .into_iter()
            .chain(self.from_previous_steps)
            .flat_map(|snapshot| snapshot.values())
    }

    /// True if `var` has a usable value through its reference.
    ///
    /// Plain (`NEW`) variables carry their own value and never resolve.
    pub fn resolves(&self, var: &Variable) -> bool {
        if var.ref_variable_name.is_empty() {
            return false;
        }
        match var.variable_type {
            VariableType::New => false,
            VariableType::Global => {
                self.globals.is_empty()
                    || self.globals.iter().any(|g| g.name == var.ref_variable_name)
            }
            VariableType::FromPreviousStep => {
                let key = snapshot_key(var.ref_variable_step_index, &var.ref_variable_name);
                let target = var.ref_variable_stage.or(self.stage.ref_stage());
                if target == self.stage.ref_stage() {
                    self.from_previous_steps
                        .map_or(true, |snapshot| snapshot.contains_key(&key))
                } else if target == Some(RefVariableStage::PreCi)
                    && self.stage == StageKey::PostBuild
                {
                    self.from_pre_build
                        .map_or(true, |snapshot| snapshot.contains_key(&key))
                } else {
                    false
                }
            }
        }
    }
}

/// Scope of the task at `position` of stage `key`.
///
/// A position one past the last task yields the scope a newly appended task
/// would see when the stage was recalculated for an add.
pub fn visible_variables<'a>(
    vars: &'a DocumentVariables,
    key: StageKey,
    position: usize,
    globals: &'a [GlobalVariable],
) -> VisibleVariables<'a> {
    let from_pre_build = match key {
        StageKey::PostBuild => Some(&vars.pre_build_stage.outputs),
        _ => None,
    };
    VisibleVariables {
        from_pre_build,
        from_previous_steps: vars.stage(key).for_task(position),
        globals,
        stage: key,
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
