// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipelines saved with bare docker build scripts.

use super::load;
use ps_core::VariableType;
use serde_json::json;

#[test]
fn legacy_scripts_load_as_valid_shell_tasks() {
    let json = json!({
        "code": 200,
        "result": {"ciPipelines": [{
            "id": 3,
            "name": "old-ci",
            "ciMaterial": [{"gitMaterialId": 1, "source": {"type": "SOURCE_TYPE_BRANCH_FIXED", "value": "master"}}],
            "beforeDockerBuildScripts": [
                {"id": 1, "index": 1, "name": "prepare", "outputLocation": "/out", "script": "./prepare.sh"}
            ],
            "afterDockerBuildScripts": [
                {"id": 2, "index": 1, "name": "notify", "outputLocation": "", "script": "./notify.sh"}
            ]
        }]}
    })
    .to_string();

    let loaded = load(&json);
    let pre = &loaded.form.stages.pre_build_stage.steps;
    let post = &loaded.form.stages.post_build_stage.steps;
    assert_eq!(pre.len(), 1);
    assert_eq!(post.len(), 1);
    assert_eq!(pre[0].inline().unwrap().script, "./prepare.sh");
    assert!(pre[0]
        .input_variables()
        .iter()
        .all(|v| v.variable_type == VariableType::Global));
    // no catalog loaded, so the docker globals are taken on trust
    assert!(loaded.errors.is_valid(), "{:#?}", loaded.errors);
}
