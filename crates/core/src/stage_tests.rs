// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn reindex_is_one_based_and_contiguous() {
    let mut stage = Stage::new(vec![Task::new(9, "a"), Task::new(4, "b"), Task::new(1, "c")]);
    stage.reindex();
    let indexes: Vec<u32> = stage.steps.iter().map(|t| t.index).collect();
    assert_eq!(indexes, vec![1, 2, 3]);
    // ids are untouched
    assert_eq!(stage.steps[0].id, 9);
}

#[yare::parameterized(
    pre   = { StageKey::PreBuild, "\"preBuildStage\"", Some(RefVariableStage::PreCi) },
    build = { StageKey::Build, "\"buildStage\"", None },
    post  = { StageKey::PostBuild, "\"postBuildStage\"", Some(RefVariableStage::PostCi) },
)]
fn stage_key_wire_and_tag(key: StageKey, wire: &str, tag: Option<RefVariableStage>) {
    assert_eq!(serde_json::to_string(&key).unwrap(), wire);
    assert_eq!(key.ref_stage(), tag);
    assert_eq!(format!("\"{key}\""), wire);
}

#[test]
fn opposite_stage() {
    assert_eq!(StageKey::PreBuild.opposite(), Some(StageKey::PostBuild));
    assert_eq!(StageKey::PostBuild.opposite(), Some(StageKey::PreBuild));
    assert_eq!(StageKey::Build.opposite(), None);
}

#[test]
fn task_names_cover_pre_then_post() {
    let doc = StageDocument {
        pre_build_stage: Stage::new(vec![Task::new(1, "lint")]),
        build_stage: Stage::default(),
        post_build_stage: Stage::new(vec![Task::new(1, "scan"), Task::new(2, "notify")]),
    };
    let names: Vec<&str> = doc.task_names().collect();
    assert_eq!(names, vec!["lint", "scan", "notify"]);
    assert_eq!(doc.task(StageKey::PostBuild, 1).unwrap().name, "notify");
    assert!(doc.task(StageKey::PreBuild, 1).is_none());
}

#[test]
fn null_steps_parse_as_empty() {
    let stage: Stage = serde_json::from_str(r#"{"id": 3, "steps": null}"#).unwrap();
    assert_eq!(stage.id, 3);
    assert!(stage.is_empty());
}
