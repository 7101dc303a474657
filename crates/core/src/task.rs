// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tasks and their detail blocks.
//!
//! A task is either unset (freshly added, no type chosen), an inline
//! script/container task, or a reference to a catalog plugin. On the wire the
//! variant is selected by a `stepType` string tag next to an
//! `inlineStepDetail` or `pluginRefStepDetail` block; in memory it is the
//! [`StepDetail`] sum type.

use crate::condition::ConditionDetail;
use crate::serde_util::null_default;
use crate::variable::Variable;
use serde::{Deserialize, Serialize};

/// Script executed on behalf of shell tasks until the user edits it.
pub const DEFAULT_SHELL_SCRIPT: &str =
    "#!/bin/sh \nset -eo pipefail \n#set -v  ## uncomment this to debug the script \n";

/// Default mount point for source code inside a container image task.
pub const DEFAULT_CODE_MOUNT_PATH: &str = "/sourcecode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScriptType {
    #[default]
    Shell,
    #[serde(rename = "CONTAINERIMAGE")]
    ContainerImage,
    Dockerfile,
}

/// Wire tag for the task variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepType {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "INLINE")]
    Inline,
    #[serde(rename = "PLUGIN_REF")]
    PluginRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMap {
    #[serde(default)]
    pub port_on_local: Option<u16>,
    #[serde(default)]
    pub port_on_container: Option<u16>,
}

impl PortMap {
    pub fn is_blank(&self) -> bool {
        self.port_on_local.is_none() && self.port_on_container.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountPathMap {
    #[serde(default, deserialize_with = "null_default")]
    pub file_path_on_disk: String,
    #[serde(default, deserialize_with = "null_default")]
    pub file_path_on_container: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandArgs {
    #[serde(default, deserialize_with = "null_default")]
    pub command: String,
    #[serde(default, deserialize_with = "null_default")]
    pub args: Vec<String>,
}

/// Detail block of an inline task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineStepDetail {
    #[serde(default, deserialize_with = "null_default")]
    pub script_type: ScriptType,
    #[serde(default, deserialize_with = "null_default")]
    pub script: String,
    /// Where a custom script is written inside a container image task
    #[serde(default, deserialize_with = "null_default")]
    pub store_script_at: String,
    #[serde(default, deserialize_with = "null_default")]
    pub is_mount_custom_script: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub condition_details: Vec<ConditionDetail>,
    #[serde(default, deserialize_with = "null_default")]
    pub input_variables: Vec<Variable>,
    #[serde(default, deserialize_with = "null_default")]
    pub output_variables: Vec<Variable>,
    #[serde(default, deserialize_with = "null_default")]
    pub command_args_map: Vec<CommandArgs>,
    #[serde(default, deserialize_with = "null_default")]
    pub port_map: Vec<PortMap>,
    #[serde(default, deserialize_with = "null_default")]
    pub mount_path_map: Vec<MountPathMap>,
    #[serde(default, deserialize_with = "null_default")]
    pub mount_code_to_container: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub mount_code_to_container_path: String,
    #[serde(default, deserialize_with = "null_default")]
    pub mount_directory_from_host: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub container_image_path: String,
    #[serde(default, deserialize_with = "null_default")]
    pub image_pull_secret: String,
}

impl InlineStepDetail {
    /// Fresh shell task detail with the boilerplate script
    pub fn shell() -> Self {
        Self {
            script_type: ScriptType::Shell,
            script: DEFAULT_SHELL_SCRIPT.to_string(),
            ..Self::default()
        }
    }

    pub fn has_default_script(&self) -> bool {
        self.script == DEFAULT_SHELL_SCRIPT
    }
}

/// Detail block of a plugin-backed task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRefStepDetail {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub plugin_id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub condition_details: Vec<ConditionDetail>,
    #[serde(default, deserialize_with = "null_default")]
    pub input_variables: Vec<Variable>,
    #[serde(default, deserialize_with = "null_default")]
    pub output_variables: Vec<Variable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StepDetail {
    #[default]
    Unset,
    Inline(InlineStepDetail),
    PluginRef(PluginRefStepDetail),
}

impl StepDetail {
    pub fn step_type(&self) -> StepType {
        match self {
            StepDetail::Unset => StepType::Unset,
            StepDetail::Inline(_) => StepType::Inline,
            StepDetail::PluginRef(_) => StepType::PluginRef,
        }
    }
}

/// A single task of a stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRepr", into = "TaskRepr")]
pub struct Task {
    pub id: u32,
    /// 1-based position in the owning stage, rewritten on every structural edit
    pub index: u32,
    pub name: String,
    pub description: String,
    pub output_directory_path: Vec<String>,
    pub trigger_if_parent_stage_fail: bool,
    pub detail: StepDetail,
}

impl Task {
    /// An unset task
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn step_type(&self) -> StepType {
        self.detail.step_type()
    }

    pub fn is_unset(&self) -> bool {
        matches!(self.detail, StepDetail::Unset)
    }

    pub fn inline(&self) -> Option<&InlineStepDetail> {
        match &self.detail {
            StepDetail::Inline(d) => Some(d),
            _ => None,
        }
    }

    pub fn inline_mut(&mut self) -> Option<&mut InlineStepDetail> {
        match &mut self.detail {
            StepDetail::Inline(d) => Some(d),
            _ => None,
        }
    }

    pub fn plugin_ref(&self) -> Option<&PluginRefStepDetail> {
        match &self.detail {
            StepDetail::PluginRef(d) => Some(d),
            _ => None,
        }
    }

    pub fn input_variables(&self) -> &[Variable] {
        match &self.detail {
            StepDetail::Unset => &[],
            StepDetail::Inline(d) => &d.input_variables,
            StepDetail::PluginRef(d) => &d.input_variables,
        }
    }

    /// Input variables of a typed task; `None` when the task is unset.
    pub fn input_variables_mut(&mut self) -> Option<&mut Vec<Variable>> {
        match &mut self.detail {
            StepDetail::Unset => None,
            StepDetail::Inline(d) => Some(&mut d.input_variables),
            StepDetail::PluginRef(d) => Some(&mut d.input_variables),
        }
    }

    pub fn output_variables(&self) -> &[Variable] {
        match &self.detail {
            StepDetail::Unset => &[],
            StepDetail::Inline(d) => &d.output_variables,
            StepDetail::PluginRef(d) => &d.output_variables,
        }
    }

    pub fn condition_details(&self) -> &[ConditionDetail] {
        match &self.detail {
            StepDetail::Unset => &[],
            StepDetail::Inline(d) => &d.condition_details,
            StepDetail::PluginRef(d) => &d.condition_details,
        }
    }

    pub fn condition_details_mut(&mut self) -> Option<&mut Vec<ConditionDetail>> {
        match &mut self.detail {
            StepDetail::Unset => None,
            StepDetail::Inline(d) => Some(&mut d.condition_details),
            StepDetail::PluginRef(d) => Some(&mut d.condition_details),
        }
    }
}

/// Wire shape of a task
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRepr {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    index: u32,
    #[serde(default, deserialize_with = "null_default")]
    name: String,
    #[serde(default, deserialize_with = "null_default")]
    description: String,
    #[serde(default, deserialize_with = "null_default")]
    output_directory_path: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    trigger_if_parent_stage_fail: bool,
    #[serde(default, deserialize_with = "null_default")]
    step_type: StepType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_step_detail: Option<InlineStepDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plugin_ref_step_detail: Option<PluginRefStepDetail>,
}

impl TryFrom<TaskRepr> for Task {
    type Error = String;

    fn try_from(raw: TaskRepr) -> Result<Self, Self::Error> {
        let detail = match raw.step_type {
            StepType::Unset => StepDetail::Unset,
            StepType::Inline => StepDetail::Inline(raw.inline_step_detail.ok_or_else(|| {
                format!("task '{}': stepType INLINE without inlineStepDetail", raw.name)
            })?),
            StepType::PluginRef => {
                StepDetail::PluginRef(raw.plugin_ref_step_detail.ok_or_else(|| {
                    format!(
                        "task '{}': stepType PLUGIN_REF without pluginRefStepDetail",
                        raw.name
                    )
                })?)
            }
        };
        Ok(Task {
            id: raw.id,
            index: raw.index,
            name: raw.name,
            description: raw.description,
            output_directory_path: raw.output_directory_path,
            trigger_if_parent_stage_fail: raw.trigger_if_parent_stage_fail,
            detail,
        })
    }
}

impl From<Task> for TaskRepr {
    fn from(task: Task) -> Self {
        let step_type = task.step_type();
        let (inline_step_detail, plugin_ref_step_detail) = match task.detail {
            StepDetail::Unset => (None, None),
            StepDetail::Inline(d) => (Some(d), None),
            StepDetail::PluginRef(d) => (None, Some(d)),
        };
        TaskRepr {
            id: task.id,
            index: task.index,
            name: task.name,
            description: task.description,
            output_directory_path: task.output_directory_path,
            trigger_if_parent_stage_fail: task.trigger_if_parent_stage_fail,
            step_type,
            inline_step_detail,
            plugin_ref_step_detail,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
