// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared builders for the behavioral specifications.

#![allow(dead_code)]

use ps_core::test_support::{form_with, plugin, shell_task, with_inputs, with_outputs};
use ps_core::{Catalog, GlobalVariable, PipelineForm, RefVariableStage, Task, Variable};
use ps_session::{EngineConfig, Session};
use ps_wire::PatchTarget;
use std::sync::Arc;

pub const TARGET: PatchTarget = PatchTarget {
    app_id: 7,
    app_workflow_id: 3,
};

pub fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog {
        plugins: vec![plugin(9, "sonar", &["TOKEN"], &["REPORT"])],
        global_variables: vec![GlobalVariable::new("DOCKER_IMAGE_TAG")],
    })
}

pub fn config() -> EngineConfig {
    EngineConfig {
        app_id: TARGET.app_id,
        app_workflow_id: TARGET.app_workflow_id,
        ..EngineConfig::default()
    }
}

pub fn session(form: PipelineForm) -> Session {
    Session::new(config(), catalog(), form)
}

/// Shell task producing `outputs`
pub fn producer(id: u32, name: &str, outputs: &[&str]) -> Task {
    with_outputs(shell_task(id, name, "make"), outputs)
}

/// Shell task reading output `ref_name` of pre-build task `step` (1-based)
pub fn pre_consumer(id: u32, name: &str, step: u32, ref_name: &str) -> Task {
    with_inputs(
        shell_task(id, name, "echo $IN"),
        vec![Variable::from_previous_step(
            1,
            "IN",
            RefVariableStage::PreCi,
            step,
            ref_name,
        )],
    )
}

/// Pre-build producers `p1..pn`, each with output `OUT{i}`, and the given
/// post-build tasks
pub fn chain(n: u32, post: Vec<Task>) -> PipelineForm {
    let pre = (1..=n)
        .map(|i| producer(i, &format!("p{i}"), &[&format!("OUT{i}")]))
        .collect();
    form_with(pre, post)
}

pub fn indices(form: &PipelineForm, key: ps_core::StageKey) -> Vec<u32> {
    form.stages.stage(key).steps.iter().map(|t| t.index).collect()
}
