// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stages and the stage document.

use crate::serde_util::null_default;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three configurable build stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKey {
    #[serde(rename = "preBuildStage")]
    PreBuild,
    #[serde(rename = "buildStage")]
    Build,
    #[serde(rename = "postBuildStage")]
    PostBuild,
}

impl StageKey {
    pub const ALL: [StageKey; 3] = [StageKey::PreBuild, StageKey::Build, StageKey::PostBuild];

    /// Wire key of the stage inside the pipeline form
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKey::PreBuild => "preBuildStage",
            StageKey::Build => "buildStage",
            StageKey::PostBuild => "postBuildStage",
        }
    }

    /// Tag applied to variables produced by this stage, if it produces any.
    pub fn ref_stage(&self) -> Option<RefVariableStage> {
        match self {
            StageKey::PreBuild => Some(RefVariableStage::PreCi),
            StageKey::Build => None,
            StageKey::PostBuild => Some(RefVariableStage::PostCi),
        }
    }

    /// The stage a task lands in when moved out of this one.
    pub fn opposite(&self) -> Option<StageKey> {
        match self {
            StageKey::PreBuild => Some(StageKey::PostBuild),
            StageKey::Build => None,
            StageKey::PostBuild => Some(StageKey::PreBuild),
        }
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage a referenced variable was produced in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefVariableStage {
    #[serde(rename = "PRE_CI")]
    PreCi,
    #[serde(rename = "POST_CI")]
    PostCi,
}

/// An ordered list of tasks. `steps` order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default)]
    pub id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub steps: Vec<Task>,
}

impl Stage {
    pub fn new(steps: Vec<Task>) -> Self {
        Self { id: 0, steps }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Rewrite every task's `index` to its 1-based position.
    pub fn reindex(&mut self) {
        for (i, task) in self.steps.iter_mut().enumerate() {
            task.index = i as u32 + 1;
        }
    }
}

/// The three stages of a pipeline.
///
/// The build stage never carries tasks on the wire; it exists so that every
/// [`StageKey`] addresses a stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDocument {
    #[serde(default)]
    pub pre_build_stage: Stage,
    #[serde(default)]
    pub build_stage: Stage,
    #[serde(default)]
    pub post_build_stage: Stage,
}

impl StageDocument {
    pub fn stage(&self, key: StageKey) -> &Stage {
        match key {
            StageKey::PreBuild => &self.pre_build_stage,
            StageKey::Build => &self.build_stage,
            StageKey::PostBuild => &self.post_build_stage,
        }
    }

    pub fn stage_mut(&mut self, key: StageKey) -> &mut Stage {
        match key {
            StageKey::PreBuild => &mut self.pre_build_stage,
            StageKey::Build => &mut self.build_stage,
            StageKey::PostBuild => &mut self.post_build_stage,
        }
    }

    /// Look up a task by stage and 0-based position
    pub fn task(&self, key: StageKey, position: usize) -> Option<&Task> {
        self.stage(key).steps.get(position)
    }

    /// Task names of the pre- and post-build stages, in order
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.pre_build_stage
            .steps
            .iter()
            .chain(self.post_build_stage.steps.iter())
            .map(|t| t.name.as_str())
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
