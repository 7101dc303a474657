// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference scenarios for saving, validation, scoping and migration.

use crate::prelude::*;
use ps_core::test_support::{form_with, shell_task};
use ps_core::{RefVariableStage, ScriptType, StageKey, StepType, VariableType};
use ps_wire::{create_patch_request, parse_ci_pipeline, CiPipelineResponse, PatchOptions};
use serde_json::json;

#[test]
fn empty_pre_build_stage_is_sent_as_empty_object() {
    let form = form_with(vec![], vec![shell_task(1, "notify", "curl hook")]);
    let request = create_patch_request(&form, TARGET, None, PatchOptions::default()).unwrap();
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["ciPipeline"]["preBuildStage"], json!({}));
    assert_eq!(
        value["ciPipeline"]["postBuildStage"]["steps"][0]["name"],
        json!("notify")
    );
}

#[test]
fn unnamed_shell_task_without_script_reports_both_fields() {
    let session = session(form_with(vec![shell_task(1, "", "")], vec![]));
    let step = &session.errors().pre_build_stage.steps[0];

    assert!(!step.is_valid);
    assert_eq!(step.name.message.as_deref(), Some("This is required"));
    let script = step.detail().unwrap().script.as_ref().unwrap();
    assert_eq!(script.message.as_deref(), Some("This is required"));
    assert_eq!(step.messages(), vec!["This is required", "This is required"]);
}

#[yare::parameterized(
    first = { 0 },
    after_one = { 1 },
    after_three = { 3 },
)]
fn pre_build_output_resolves_from_any_post_build_position(preceding: u32) {
    let mut post: Vec<_> = (1..=preceding)
        .map(|i| shell_task(i, &format!("post{i}"), "true"))
        .collect();
    post.push(pre_consumer(preceding + 1, "deploy", 1, "IMAGE_TAG"));
    let session = session(form_with(vec![producer(1, "tag", &["IMAGE_TAG"])], post));

    let position = preceding as usize;
    let task = &session.form().stages.post_build_stage.steps[position];
    let input = &task.input_variables()[0];
    assert_eq!(input.variable_type, VariableType::FromPreviousStep);
    assert_eq!(input.ref_variable_stage, Some(RefVariableStage::PreCi));
    assert!(session
        .visible_variables(StageKey::PostBuild, position)
        .resolves(input));

    let errors = &session.errors().post_build_stage;
    assert!(errors.steps[position].is_valid);
    assert!(errors.is_valid);
}

#[test]
fn legacy_scripts_migrate_to_a_pre_build_stage() {
    let response: CiPipelineResponse = serde_json::from_value(json!({
        "id": 1,
        "name": "legacy",
        "beforeDockerBuildScripts": [
            {"id": 1, "name": "s1", "script": "echo hi", "outputLocation": "/out", "index": 1}
        ]
    }))
    .unwrap();
    let form = parse_ci_pipeline(&response, &[]).unwrap();

    let steps = &form.stages.pre_build_stage.steps;
    assert_eq!(steps.len(), 1);
    let task = &steps[0];
    assert_eq!(task.name, "s1");
    assert_eq!(task.step_type(), StepType::Inline);
    assert_eq!(task.output_directory_path, vec!["/out"]);
    let detail = task.inline().unwrap();
    assert_eq!(detail.script_type, ScriptType::Shell);
    assert_eq!(detail.script, "echo hi");

    let inputs: Vec<(&str, VariableType)> = detail
        .input_variables
        .iter()
        .map(|v| (v.name.as_str(), v.variable_type))
        .collect();
    similar_asserts::assert_eq!(
        inputs,
        vec![
            ("DOCKER_IMAGE", VariableType::Global),
            ("DOCKER_REGISTRY_URL", VariableType::Global),
            ("DOCKER_REPOSITORY", VariableType::Global),
            ("DOCKER_IMAGE_TAG", VariableType::Global),
        ]
    );
    assert!(form.stages.post_build_stage.is_empty());
}
