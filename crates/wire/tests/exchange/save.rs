// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Saving a loaded pipeline.

use super::{load, SAVED_PIPELINE};
use ps_wire::{create_patch_request, PatchAction, PatchOptions, PatchTarget};
use serde_json::json;

const TARGET: PatchTarget = PatchTarget {
    app_id: 1,
    app_workflow_id: 2,
};

#[test]
fn loaded_pipeline_is_valid() {
    let loaded = load(SAVED_PIPELINE);
    assert!(loaded.errors.is_valid(), "{:#?}", loaded.errors);
}

#[test]
fn unchanged_pipeline_saves_as_an_update() {
    let loaded = load(SAVED_PIPELINE);
    let request = create_patch_request(
        &loaded.form,
        TARGET,
        Some(&loaded.record),
        PatchOptions::default(),
    )
    .unwrap();
    assert_eq!(request.action, PatchAction::UpdateSource);

    let value = serde_json::to_value(&request).unwrap();
    let ci = &value["ciPipeline"];
    assert_eq!(ci["id"], json!(21));
    assert_eq!(ci["active"], json!(true));
    assert_eq!(ci["dockerArgs"], json!({"GO_VERSION": "1.22"}));
    similar_asserts::assert_eq!(
        ci["ciMaterial"],
        json!([{
            "gitMaterialId": 4,
            "id": 30,
            "source": {"type": "SOURCE_TYPE_BRANCH_FIXED", "value": "main", "regex": ""}
        }])
    );
    let tag = &ci["postBuildStage"]["steps"][0];
    assert_eq!(tag["stepType"], json!("INLINE"));
    assert_eq!(
        tag["inlineStepDetail"]["inputVariables"][0]["refVariableStage"],
        json!("PRE_CI")
    );
}

#[test]
fn null_lists_are_sent_as_empty_lists() {
    let loaded = load(SAVED_PIPELINE);
    let request =
        create_patch_request(&loaded.form, TARGET, Some(&loaded.record), PatchOptions::default())
            .unwrap();
    let value = serde_json::to_value(&request).unwrap();
    let version = &value["ciPipeline"]["preBuildStage"]["steps"][0];
    assert_eq!(version["outputDirectoryPath"], json!([]));
    assert_eq!(version["inlineStepDetail"]["conditionDetails"], json!([]));
}
