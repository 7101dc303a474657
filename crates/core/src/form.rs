// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pipeline form: stage document plus the non-stage fields edited
//! alongside it.

use crate::serde_util::null_default;
use crate::stage::StageDocument;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerType {
    #[default]
    Auto,
    Manual,
}

/// How a source material selects the revision to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    #[default]
    #[serde(rename = "SOURCE_TYPE_BRANCH_FIXED")]
    BranchFixed,
    #[serde(rename = "SOURCE_TYPE_BRANCH_REGEX")]
    BranchRegex,
    #[serde(rename = "WEBHOOK")]
    Webhook,
}

/// A git repository attached to the application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitMaterial {
    pub git_material_id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
}

/// A source material as edited in the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMaterial {
    #[serde(default)]
    pub id: u32,
    pub git_material_id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "null_default")]
    pub source_type: SourceType,
    #[serde(default, deserialize_with = "null_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_default")]
    pub regex: String,
    #[serde(default)]
    pub is_selected: bool,
}

impl SourceMaterial {
    pub fn is_webhook(&self) -> bool {
        self.source_type == SourceType::Webhook
    }

    /// Branch pattern or fixed branch, whichever the material uses
    pub fn effective_value(&self) -> &str {
        if self.regex.is_empty() {
            &self.value
        } else {
            &self.regex
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerArg {
    pub key: String,
    pub value: String,
}

impl DockerArg {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One selector of a webhook event filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookCondition {
    pub selector_id: String,
    pub value: String,
}

/// The whole document owned by an editing session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineForm {
    pub name: String,
    pub trigger_type: TriggerType,
    pub materials: Vec<SourceMaterial>,
    pub docker_args: Vec<DockerArg>,
    pub scan_enabled: bool,
    pub webhook_conditions: Vec<WebhookCondition>,
    #[serde(flatten)]
    pub stages: StageDocument,
}
