// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing pipeline responses back into an editable form.

use crate::error::{ServerError, UserMessage, WireError};
use crate::legacy::{migrate_legacy_scripts, LegacyScript};
use crate::patch::{CiMaterial, PipelineRecord, WebhookValue};
use indexmap::IndexMap;
use ps_core::serde_util::null_default;
use ps_core::{
    DockerArg, ErrorDocument, GitMaterial, GlobalVariable, PipelineForm, SourceMaterial,
    SourceType, Stage, StageDocument, TriggerType, WebhookCondition,
};
use ps_engine::{derive_document_variables, validate_form, DocumentVariables, ValidationScope};
use serde::{Deserialize, Serialize};

/// A pipeline as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiPipelineResponse {
    #[serde(default)]
    pub id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub is_manual: bool,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub scan_enabled: bool,
    #[serde(default)]
    pub linked_count: u32,
    /// Set on linked pipelines; their materials come from the parent
    #[serde(default)]
    pub parent_ci_pipeline: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub ci_material: Vec<CiMaterial>,
    #[serde(default, deserialize_with = "null_default")]
    pub docker_args: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_build_stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_build_stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_docker_build_scripts: Option<Vec<LegacyScript>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_docker_build_scripts: Option<Vec<LegacyScript>>,
}

impl CiPipelineResponse {
    pub fn record(&self) -> PipelineRecord {
        PipelineRecord {
            id: self.id,
            active: self.active,
            is_external: self.is_external,
            linked_count: self.linked_count,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    #[serde(default)]
    code: u16,
    result: Option<T>,
    #[serde(default, deserialize_with = "null_default")]
    errors: Vec<UserMessage>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T, WireError> {
        if !self.errors.is_empty() || self.code >= 300 {
            return Err(ServerError {
                code: self.code,
                errors: self.errors,
            }
            .into());
        }
        self.result.ok_or(WireError::EmptyResult)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveResult {
    #[serde(default, deserialize_with = "null_default")]
    ci_pipelines: Vec<CiPipelineResponse>,
}

/// Parse the response to a patch request: the first pipeline of
/// `result.ciPipelines`, or the server's error messages.
pub fn parse_response_envelope(json: &str) -> Result<CiPipelineResponse, WireError> {
    let envelope: Envelope<SaveResult> = serde_json::from_str(json)?;
    envelope
        .into_result()?
        .ci_pipelines
        .into_iter()
        .next()
        .ok_or(WireError::EmptyResult)
}

/// Parse the response to a pipeline fetch: a single pipeline in `result`.
pub fn parse_pipeline_envelope(json: &str) -> Result<CiPipelineResponse, WireError> {
    let envelope: Envelope<CiPipelineResponse> = serde_json::from_str(json)?;
    envelope.into_result()
}

/// Materials of the form: the configured ones, followed by every other git
/// material of the application as an unconfigured fixed branch.
pub fn create_material_list(
    response: &CiPipelineResponse,
    git_materials: &[GitMaterial],
) -> Vec<SourceMaterial> {
    let mut materials: Vec<SourceMaterial> = response
        .ci_material
        .iter()
        .map(|m| SourceMaterial {
            id: m.id,
            git_material_id: m.git_material_id,
            name: m.git_material_name.clone(),
            source_type: m.source.source_type,
            value: m.source.value.clone(),
            regex: m.source.regex.clone(),
            is_selected: true,
        })
        .collect();
    if response.parent_ci_pipeline != 0 {
        return materials;
    }
    for git in git_materials {
        if response
            .ci_material
            .iter()
            .any(|m| m.git_material_id == git.git_material_id)
        {
            continue;
        }
        materials.push(SourceMaterial {
            id: 0,
            git_material_id: git.git_material_id,
            name: git.name.clone(),
            source_type: SourceType::BranchFixed,
            value: String::new(),
            regex: String::new(),
            is_selected: true,
        });
    }
    materials
}

/// Selector conditions stored in a webhook material value. An unconfigured
/// webhook yields a single blank row to edit.
pub fn create_webhook_condition_list(
    material: &SourceMaterial,
) -> Result<Vec<WebhookCondition>, WireError> {
    let value = WebhookValue::parse(material)?;
    if value.condition.is_empty() {
        return Ok(vec![WebhookCondition::default()]);
    }
    Ok(value
        .condition
        .into_iter()
        .map(|(selector_id, value)| WebhookCondition { selector_id, value })
        .collect())
}

/// Turn a pipeline response into the form it is edited as.
pub fn parse_ci_pipeline(
    response: &CiPipelineResponse,
    git_materials: &[GitMaterial],
) -> Result<PipelineForm, WireError> {
    let pre_build_stage = match &response.before_docker_build_scripts {
        Some(scripts) => {
            tracing::debug!(count = scripts.len(), "migrating legacy pre-build scripts");
            migrate_legacy_scripts(scripts)
        }
        None => response.pre_build_stage.clone().unwrap_or_default(),
    };
    let post_build_stage = match &response.after_docker_build_scripts {
        Some(scripts) => {
            tracing::debug!(count = scripts.len(), "migrating legacy post-build scripts");
            migrate_legacy_scripts(scripts)
        }
        None => response.post_build_stage.clone().unwrap_or_default(),
    };

    let materials = create_material_list(response, git_materials);
    let webhook_conditions = match materials.first() {
        Some(first) if first.is_webhook() => create_webhook_condition_list(first)?,
        _ => Vec::new(),
    };

    Ok(PipelineForm {
        name: response.name.clone(),
        trigger_type: if response.is_manual {
            TriggerType::Manual
        } else {
            TriggerType::Auto
        },
        materials,
        docker_args: response
            .docker_args
            .iter()
            .map(|(k, v)| DockerArg::new(k.clone(), v.clone()))
            .collect(),
        scan_enabled: response.scan_enabled,
        webhook_conditions,
        stages: StageDocument {
            pre_build_stage,
            build_stage: Stage::default(),
            post_build_stage,
        },
    })
}

/// A parsed pipeline with its derived state
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPipeline {
    pub form: PipelineForm,
    pub variables: DocumentVariables,
    pub errors: ErrorDocument,
    pub record: PipelineRecord,
}

/// Parse `response` and derive its variable scopes and error document.
pub fn load_pipeline(
    response: &CiPipelineResponse,
    git_materials: &[GitMaterial],
    globals: &[GlobalVariable],
    validate_plugin_inputs: bool,
) -> Result<LoadedPipeline, WireError> {
    let mut form = parse_ci_pipeline(response, git_materials)?;
    let variables = derive_document_variables(&mut form.stages);
    let scope = ValidationScope {
        vars: &variables,
        globals,
        validate_plugin_inputs,
    };
    let errors = validate_form(&form, &scope);
    Ok(LoadedPipeline {
        form,
        variables,
        errors,
        record: response.record(),
    })
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
