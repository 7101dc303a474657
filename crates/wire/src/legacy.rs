// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration of pipelines saved before stages existed.
//!
//! Older pipelines carry bare `beforeDockerBuildScripts` and
//! `afterDockerBuildScripts` lists. Each script becomes an inline shell task
//! that can still read the Docker build context it used to get from the
//! environment.

use ps_core::{InlineStepDetail, ScriptType, Stage, StepDetail, Task, Variable};
use serde::{Deserialize, Serialize};

/// Globals the legacy scripts could read, with the ids they are given
const DOCKER_CONTEXT: [(u32, &str); 4] = [
    (4, "DOCKER_IMAGE"),
    (3, "DOCKER_REGISTRY_URL"),
    (2, "DOCKER_REPOSITORY"),
    (1, "DOCKER_IMAGE_TAG"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyScript {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub output_location: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub index: u32,
}

pub fn migrate_legacy_scripts(scripts: &[LegacyScript]) -> Stage {
    let steps = scripts
        .iter()
        .map(|legacy| Task {
            id: legacy.id,
            index: legacy.index,
            name: legacy.name.clone(),
            description: String::new(),
            output_directory_path: vec![legacy.output_location.clone()],
            trigger_if_parent_stage_fail: false,
            detail: StepDetail::Inline(InlineStepDetail {
                script_type: ScriptType::Shell,
                script: legacy.script.clone(),
                input_variables: DOCKER_CONTEXT
                    .iter()
                    .map(|(id, name)| Variable::global(*id, *name, *name))
                    .collect(),
                ..InlineStepDetail::default()
            }),
        })
        .collect();
    Stage::new(steps)
}

#[cfg(test)]
#[path = "legacy_tests.rs"]
mod tests;
