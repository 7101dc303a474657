// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn reset_reference_reverts_to_new() {
    let mut var = Variable::from_previous_step(1, "TAG", RefVariableStage::PreCi, 2, "IMAGE_TAG");
    var.value = "stale".to_string();
    var.reset_reference();

    assert_eq!(var.variable_type, VariableType::New);
    assert_eq!(var.ref_variable_step_index, 0);
    assert!(var.ref_variable_name.is_empty());
    assert!(var.ref_variable_stage.is_none());
    assert!(var.value.is_empty());
    assert_eq!(var.name, "TAG");
}

#[test]
fn reference_fields_wire_names() {
    let var = Variable::from_previous_step(4, "TAG", RefVariableStage::PostCi, 1, "OUT");
    let json = serde_json::to_value(&var).unwrap();
    assert_eq!(json["variableType"], "FROM_PREVIOUS_STEP");
    assert_eq!(json["refVariableStage"], "POST_CI");
    assert_eq!(json["refVariableStepIndex"], 1);
    assert_eq!(json["refVariableName"], "OUT");
    assert_eq!(json["format"], "STRING");
}

#[test]
fn new_variable_omits_ref_stage() {
    let json = serde_json::to_value(Variable::new(1, "A")).unwrap();
    assert!(json.get("refVariableStage").is_none());
}

#[yare::parameterized(
    missing = { json!({"id": 1, "name": "A"}) },
    empty   = { json!({"id": 1, "name": "A", "refVariableStage": ""}) },
    null    = { json!({"id": 1, "name": "A", "refVariableStage": null}) },
)]
fn absent_ref_stage_parses_as_none(input: serde_json::Value) {
    let var: Variable = serde_json::from_value(input).unwrap();
    assert!(var.ref_variable_stage.is_none());
    assert_eq!(var.variable_type, VariableType::New);
}

#[test]
fn global_reference() {
    let var = Variable::global(2, "IMG", "DOCKER_IMAGE");
    assert_eq!(var.variable_type, VariableType::Global);
    assert!(!var.is_from_previous_step());
    assert_eq!(var.ref_variable_name, "DOCKER_IMAGE");
}
