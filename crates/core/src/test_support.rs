// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    InlineStepDetail, PipelineForm, Plugin, PluginRefStepDetail, ScriptType, SourceMaterial,
    SourceType, Stage, StageDocument, StepDetail, Task, Variable,
};

// ── Task builders ───────────────────────────────────────────────────────────

pub fn shell_task(id: u32, name: &str, script: &str) -> Task {
    Task {
        id,
        name: name.to_string(),
        detail: StepDetail::Inline(InlineStepDetail {
            script_type: ScriptType::Shell,
            script: script.to_string(),
            ..InlineStepDetail::default()
        }),
        ..Task::default()
    }
}

pub fn container_task(id: u32, name: &str, image: &str) -> Task {
    Task {
        id,
        name: name.to_string(),
        detail: StepDetail::Inline(InlineStepDetail {
            script_type: ScriptType::ContainerImage,
            container_image_path: image.to_string(),
            ..InlineStepDetail::default()
        }),
        ..Task::default()
    }
}

pub fn plugin_task(id: u32, name: &str, plugin_id: u32) -> Task {
    Task {
        id,
        name: name.to_string(),
        detail: StepDetail::PluginRef(PluginRefStepDetail {
            plugin_id,
            ..PluginRefStepDetail::default()
        }),
        ..Task::default()
    }
}

/// Append output variables named `names` to a typed task
pub fn with_outputs(mut task: Task, names: &[&str]) -> Task {
    let outputs: Vec<Variable> = names
        .iter()
        .enumerate()
        .map(|(i, n)| Variable::new(i as u32 + 1, *n))
        .collect();
    match &mut task.detail {
        StepDetail::Inline(d) => d.output_variables.extend(outputs),
        StepDetail::PluginRef(d) => d.output_variables.extend(outputs),
        StepDetail::Unset => {}
    }
    task
}

/// Append input variables to a typed task
pub fn with_inputs(mut task: Task, inputs: Vec<Variable>) -> Task {
    if let Some(list) = task.input_variables_mut() {
        list.extend(inputs);
    }
    task
}

// ── Variable builders ───────────────────────────────────────────────────────

pub fn literal_input(id: u32, name: &str, value: &str) -> Variable {
    Variable {
        value: value.to_string(),
        ..Variable::new(id, name)
    }
}

// ── Document builders ───────────────────────────────────────────────────────

pub fn stage_of(steps: Vec<Task>) -> Stage {
    let mut stage = Stage::new(steps);
    stage.reindex();
    stage
}

/// A valid pipeline form with one fixed-branch material
pub fn form_with(pre: Vec<Task>, post: Vec<Task>) -> PipelineForm {
    PipelineForm {
        name: "ci-pipeline".to_string(),
        materials: vec![SourceMaterial {
            id: 1,
            git_material_id: 1,
            name: "app".to_string(),
            source_type: SourceType::BranchFixed,
            value: "main".to_string(),
            is_selected: true,
            ..SourceMaterial::default()
        }],
        stages: StageDocument {
            pre_build_stage: stage_of(pre),
            build_stage: Stage::default(),
            post_build_stage: stage_of(post),
        },
        ..PipelineForm::default()
    }
}

pub fn plugin(id: u32, name: &str, inputs: &[&str], outputs: &[&str]) -> Plugin {
    Plugin {
        id,
        name: name.to_string(),
        description: format!("{name} plugin"),
        input_variables: inputs
            .iter()
            .enumerate()
            .map(|(i, n)| Variable::new(i as u32 + 1, *n))
            .collect(),
        output_variables: outputs
            .iter()
            .enumerate()
            .map(|(i, n)| Variable::new(i as u32 + 1, *n))
            .collect(),
        ..Plugin::default()
    }
}
