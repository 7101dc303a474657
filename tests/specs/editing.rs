// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A full editing round: load a saved pipeline, edit it, save it and take
//! the server's answer.

use crate::prelude::*;
use ps_core::{StageKey, TriggerType};
use ps_session::{SaveError, Session, TaskKind};
use ps_wire::{
    load_pipeline, parse_response_envelope, PatchAction, ServerError, TextFormat, UserMessage,
};
use serde_json::json;

const SAVED: &str = r#"{
  "code": 200,
  "result": {"ciPipelines": [{
    "id": 40,
    "name": "web-ci",
    "active": true,
    "ciMaterial": [{
      "gitMaterialId": 2, "id": 8, "gitMaterialName": "web",
      "source": {"type": "SOURCE_TYPE_BRANCH_FIXED", "value": "main", "regex": ""}
    }],
    "preBuildStage": {"id": 3, "steps": [{
      "id": 1, "index": 1, "name": "tag", "stepType": "INLINE",
      "inlineStepDetail": {
        "scriptType": "SHELL", "script": "echo v1 > tag",
        "outputVariables": [{"id": 1, "name": "IMAGE_TAG"}]
      }
    }]},
    "postBuildStage": null
  }]}
}"#;

fn loaded_session() -> Session {
    let response = parse_response_envelope(SAVED).unwrap();
    let loaded = load_pipeline(&response, &[], &catalog().global_variables, true).unwrap();
    Session::load(config(), catalog(), loaded)
}

#[test]
fn loaded_pipeline_is_ready_to_edit() {
    let session = loaded_session();
    assert_eq!(session.record().map(|r| r.id), Some(40));
    assert_eq!(session.form().trigger_type, TriggerType::Auto);
    assert!(session.errors().is_valid());
    assert!(session
        .variables()
        .pre_build_stage
        .outputs
        .contains_key("1.IMAGE_TAG"));
}

#[test]
fn edit_and_save_a_post_build_plugin() {
    let mut session = loaded_session();
    let position = session.add_task(StageKey::PostBuild).unwrap();
    session
        .set_step_type(StageKey::PostBuild, position, TaskKind::Plugin(9))
        .unwrap();
    assert!(matches!(
        session.begin_save(),
        Err(SaveError::Invalid(stages)) if stages == vec![StageKey::PostBuild]
    ));

    session
        .update_task(StageKey::PostBuild, position, |task| {
            if let Some(inputs) = task.input_variables_mut() {
                inputs[0].value = "secret".to_string();
            }
        })
        .unwrap();
    let request = session.begin_save().unwrap();

    assert_eq!(request.action, PatchAction::UpdateSource);
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["appId"], json!(TARGET.app_id));
    assert_eq!(value["ciPipeline"]["id"], json!(40));
    let step = &value["ciPipeline"]["postBuildStage"]["steps"][0];
    assert_eq!(step["name"], json!("Task 1"));
    assert_eq!(step["stepType"], json!("PLUGIN_REF"));
    assert_eq!(step["pluginRefStepDetail"]["pluginId"], json!(9));
}

#[test]
fn rejected_save_keeps_the_edits() {
    let mut session = loaded_session();
    session.update_form(|form| form.name = "web-ci-renamed".to_string());
    session.begin_save().unwrap();

    let err = session
        .finish_save(Err(ServerError {
            code: 409,
            errors: vec![UserMessage::new("pipeline name already exists")],
        }))
        .unwrap_err();

    assert!(matches!(err, SaveError::Server(_)));
    assert!(!session.is_saving());
    assert_eq!(session.form().name, "web-ci-renamed");
    assert!(session.can_undo());
}

#[test]
fn hand_edited_yaml_replaces_a_task() {
    let mut session = loaded_session();
    let text = session
        .task_text(StageKey::PreBuild, 0, TextFormat::Yaml)
        .unwrap();
    let edited = text.replace("echo v1 > tag", "echo v2 > tag");
    assert!(session
        .edit_task_text(StageKey::PreBuild, 0, &edited, TextFormat::Yaml)
        .unwrap());
    assert_eq!(
        session.form().stages.pre_build_stage.steps[0]
            .inline()
            .unwrap()
            .script,
        "echo v2 > tag"
    );

    assert!(!session
        .edit_task_text(StageKey::PreBuild, 0, "name: [unclosed", TextFormat::Yaml)
        .unwrap());
    assert!(session.parse_failure().is_some());
    assert_eq!(
        session.form().stages.pre_build_stage.steps[0]
            .inline()
            .unwrap()
            .script,
        "echo v2 > tag"
    );
}

#[test]
fn delete_request_names_the_saved_pipeline() {
    let session = loaded_session();
    let request = session.delete_request().unwrap();
    similar_asserts::assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "appId": 7,
            "appWorkflowId": 3,
            "action": 2,
            "ciPipeline": {"id": 40, "name": "web-ci"}
        })
    );
}
