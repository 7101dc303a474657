// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patch requests sent to the pipeline endpoint.

use crate::error::WireError;
use indexmap::IndexMap;
use ps_core::{PipelineForm, SourceMaterial, SourceType, Stage, StageDocument, WebhookCondition};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Action of a patch request; serialized as its integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PatchAction {
    Create,
    UpdateSource,
    Delete,
}

impl From<PatchAction> for u8 {
    fn from(action: PatchAction) -> u8 {
        match action {
            PatchAction::Create => 0,
            PatchAction::UpdateSource => 1,
            PatchAction::Delete => 2,
        }
    }
}

impl TryFrom<u8> for PatchAction {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PatchAction::Create),
            1 => Ok(PatchAction::UpdateSource),
            2 => Ok(PatchAction::Delete),
            other => Err(format!("unknown patch action {other}")),
        }
    }
}

/// Where a pipeline lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchTarget {
    pub app_id: u32,
    pub app_workflow_id: u32,
}

/// Server-owned fields of a pipeline that already exists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRecord {
    pub id: u32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub linked_count: u32,
}

/// Deployment facts that shape the request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOptions {
    pub is_job: bool,
    pub security_module_installed: bool,
}

impl PatchOptions {
    /// Scanning can only be requested for build pipelines on deployments
    /// running the security module.
    pub fn scan_enabled(&self, requested: bool) -> bool {
        !self.is_job && self.security_module_installed && requested
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
    pub app_id: u32,
    pub app_workflow_id: u32,
    pub action: PatchAction,
    pub ci_pipeline: CiPipelinePatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CiPipelinePatch {
    Full(Box<CiPipelineBody>),
    Delete { id: u32, name: String },
}

impl CiPipelinePatch {
    pub fn body(&self) -> Option<&CiPipelineBody> {
        match self {
            CiPipelinePatch::Full(body) => Some(body),
            CiPipelinePatch::Delete { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CiPipelineBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub name: String,
    pub active: bool,
    pub is_external: bool,
    pub is_manual: bool,
    pub linked_count: u32,
    pub ci_material: Vec<CiMaterial>,
    pub pre_build_stage: StagePayload,
    pub post_build_stage: StagePayload,
    pub scan_enabled: bool,
    pub docker_args: IndexMap<String, String>,
}

/// A stage as submitted: a stage without tasks is sent as `{}`
#[derive(Debug, Clone, PartialEq)]
pub enum StagePayload {
    Empty,
    Stage(Stage),
}

impl From<&Stage> for StagePayload {
    fn from(stage: &Stage) -> Self {
        if stage.is_empty() {
            StagePayload::Empty
        } else {
            StagePayload::Stage(stage.clone())
        }
    }
}

impl Serialize for StagePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StagePayload::Empty => serializer.serialize_map(Some(0))?.end(),
            StagePayload::Stage(stage) => stage.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSource {
    #[serde(rename = "type", default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub regex: String,
}

/// A source material on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiMaterial {
    pub git_material_id: u32,
    #[serde(default)]
    pub id: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_material_name: String,
    pub source: MaterialSource,
}

/// JSON carried in the `value` of a webhook material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookValue {
    #[serde(default)]
    pub event_id: u32,
    #[serde(default)]
    pub condition: IndexMap<String, String>,
}

impl WebhookValue {
    /// Parse a material value; an empty value is an unconfigured webhook.
    pub fn parse(material: &SourceMaterial) -> Result<Self, WireError> {
        if material.value.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&material.value).map_err(|source| WireError::WebhookValue {
            material: material.name.clone(),
            source,
        })
    }
}

/// Materials that go into the request: the selected ones, or only the
/// webhook material when one is selected alongside others.
fn submitted_materials(materials: &[SourceMaterial]) -> Vec<&SourceMaterial> {
    let selected: Vec<&SourceMaterial> = materials.iter().filter(|m| m.is_selected).collect();
    if selected.len() > 1 {
        if let Some(webhook) = selected.iter().find(|m| m.is_webhook()) {
            return vec![*webhook];
        }
    }
    selected
}

fn ci_material(
    material: &SourceMaterial,
    conditions: &[WebhookCondition],
) -> Result<CiMaterial, WireError> {
    let value = match material.source_type {
        SourceType::BranchFixed => material.value.trim().to_string(),
        SourceType::BranchRegex => String::new(),
        SourceType::Webhook => {
            let event_id = WebhookValue::parse(material)?.event_id;
            let condition = conditions
                .iter()
                .filter(|c| !c.selector_id.is_empty())
                .map(|c| (c.selector_id.clone(), c.value.clone()))
                .collect();
            serde_json::to_string(&WebhookValue {
                event_id,
                condition,
            })?
        }
    };
    Ok(CiMaterial {
        git_material_id: material.git_material_id,
        id: material.id,
        git_material_name: String::new(),
        source: MaterialSource {
            source_type: material.source_type,
            value,
            regex: material.regex.trim().to_string(),
        },
    })
}

/// Build the create/update request for `form`.
///
/// The stage document is normalised before it is sent. `record` is `None`
/// for a pipeline that has not been created yet.
pub fn create_patch_request(
    form: &PipelineForm,
    target: PatchTarget,
    record: Option<&PipelineRecord>,
    options: PatchOptions,
) -> Result<PatchRequest, WireError> {
    let stages: StageDocument = ps_engine::prepare_for_save(&form.stages);
    let ci_material = submitted_materials(&form.materials)
        .into_iter()
        .map(|m| ci_material(m, &form.webhook_conditions))
        .collect::<Result<Vec<_>, _>>()?;
    let docker_args = form
        .docker_args
        .iter()
        .filter(|a| !a.key.is_empty() && !a.value.is_empty())
        .map(|a| (a.key.clone(), a.value.clone()))
        .collect();
    let record = record.cloned();
    let action = match &record {
        Some(r) if r.id != 0 => PatchAction::UpdateSource,
        _ => PatchAction::Create,
    };
    let record = record.unwrap_or_default();

    let body = CiPipelineBody {
        id: (record.id != 0).then_some(record.id),
        name: form.name.clone(),
        active: record.active,
        is_external: record.is_external,
        is_manual: form.trigger_type == ps_core::TriggerType::Manual,
        linked_count: record.linked_count,
        ci_material,
        pre_build_stage: StagePayload::from(&stages.pre_build_stage),
        post_build_stage: StagePayload::from(&stages.post_build_stage),
        scan_enabled: options.scan_enabled(form.scan_enabled),
        docker_args,
    };
    tracing::debug!(
        name = %body.name,
        ?action,
        materials = body.ci_material.len(),
        "built pipeline patch request"
    );
    Ok(PatchRequest {
        app_id: target.app_id,
        app_workflow_id: target.app_workflow_id,
        action,
        ci_pipeline: CiPipelinePatch::Full(Box::new(body)),
    })
}

/// Build the request that deletes pipeline `id`.
pub fn delete_request(target: PatchTarget, id: u32, name: &str) -> PatchRequest {
    PatchRequest {
        app_id: target.app_id,
        app_workflow_id: target.app_workflow_id,
        action: PatchAction::Delete,
        ci_pipeline: CiPipelinePatch::Delete {
            id,
            name: name.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
