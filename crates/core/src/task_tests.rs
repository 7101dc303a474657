// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{ConditionDetail, ConditionType, Variable};
use serde_json::json;

#[test]
fn inline_task_wire_shape() {
    let mut task = Task::new(3, "build docs");
    task.index = 1;
    task.detail = StepDetail::Inline(InlineStepDetail::shell());

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["stepType"], "INLINE");
    assert_eq!(json["name"], "build docs");
    assert_eq!(json["inlineStepDetail"]["scriptType"], "SHELL");
    assert_eq!(json["inlineStepDetail"]["script"], DEFAULT_SHELL_SCRIPT);
    assert!(json.get("pluginRefStepDetail").is_none());
}

#[test]
fn unset_task_serializes_empty_step_type() {
    let json = serde_json::to_value(Task::new(1, "Task 1")).unwrap();
    assert_eq!(json["stepType"], "");
    assert!(json.get("inlineStepDetail").is_none());
}

#[test]
fn plugin_task_roundtrip() {
    let task = Task {
        id: 7,
        index: 2,
        name: "sonar".to_string(),
        detail: StepDetail::PluginRef(PluginRefStepDetail {
            id: 11,
            plugin_id: 42,
            condition_details: vec![ConditionDetail::new(1, ConditionType::Pass)],
            input_variables: vec![Variable::new(1, "SONAR_URL")],
            output_variables: vec![Variable::new(2, "REPORT")],
        }),
        ..Task::default()
    };
    let json = serde_json::to_string(&task).unwrap();
    let parsed: Task = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, task);
}

#[test]
fn inline_tag_without_block_is_rejected() {
    let err = serde_json::from_value::<Task>(json!({
        "id": 1,
        "name": "broken",
        "stepType": "INLINE"
    }))
    .unwrap_err();
    assert!(err.to_string().contains("without inlineStepDetail"), "{err}");
}

#[test]
fn backend_nulls_become_defaults() {
    let task: Task = serde_json::from_value(json!({
        "id": 1,
        "index": 1,
        "name": "legacy",
        "description": null,
        "outputDirectoryPath": null,
        "stepType": "INLINE",
        "inlineStepDetail": {
            "scriptType": "CONTAINERIMAGE",
            "script": null,
            "inputVariables": null,
            "portMap": [{"portOnLocal": 8080, "portOnContainer": null}],
            "mountPathMap": null,
            "containerImagePath": "alpine:latest"
        }
    }))
    .unwrap();

    assert!(task.description.is_empty());
    assert!(task.output_directory_path.is_empty());
    let detail = task.inline().unwrap();
    assert_eq!(detail.script_type, ScriptType::ContainerImage);
    assert!(detail.script.is_empty());
    assert!(detail.input_variables.is_empty());
    assert_eq!(detail.port_map[0].port_on_local, Some(8080));
    assert_eq!(detail.port_map[0].port_on_container, None);
}

#[yare::parameterized(
    shell     = { "SHELL", ScriptType::Shell },
    container = { "CONTAINERIMAGE", ScriptType::ContainerImage },
    docker    = { "DOCKERFILE", ScriptType::Dockerfile },
)]
fn script_type_wire_names(wire: &str, expected: ScriptType) {
    let parsed: ScriptType = serde_json::from_value(json!(wire)).unwrap();
    assert_eq!(parsed, expected);
}

#[test]
fn variable_accessors_follow_variant() {
    let mut task = Task::new(1, "t");
    assert!(task.input_variables().is_empty());
    assert!(task.input_variables_mut().is_none());

    task.detail = StepDetail::Inline(InlineStepDetail::default());
    task.input_variables_mut()
        .unwrap()
        .push(Variable::new(1, "A"));
    assert_eq!(task.input_variables().len(), 1);
    assert!(task.plugin_ref().is_none());
}

#[test]
fn blank_port_map() {
    assert!(PortMap::default().is_blank());
    let half = PortMap {
        port_on_local: Some(80),
        port_on_container: None,
    };
    assert!(!half.is_blank());
}
