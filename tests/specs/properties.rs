// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Properties that hold for every document the engine produces.

use crate::prelude::*;
use ps_core::test_support::{
    form_with, literal_input, plugin_task, shell_task, with_inputs, with_outputs,
};
use ps_core::{ConditionType, StageKey, VariableType};
use ps_engine::prepare_for_save;
use ps_session::Session;
use ps_wire::{create_patch_request, parse_ci_pipeline, CiPipelineResponse, PatchOptions};

#[derive(Debug, Clone, Copy)]
enum Op {
    Add(StageKey),
    Remove(StageKey, usize),
    Reorder(StageKey, usize, usize),
    Move(StageKey, usize),
}

fn apply(session: &mut Session, op: Op) {
    // out-of-range ops are rejected and leave the document as it was
    let _ = match op {
        Op::Add(key) => session.add_task(key).map(|_| ()),
        Op::Remove(key, i) => session.remove_task(key, i),
        Op::Reorder(key, from, to) => session.reorder_task(key, from, to),
        Op::Move(key, i) => session.move_task_to_other_stage(key, i).map(|_| ()),
    };
}

fn assert_contiguous(session: &Session) {
    for key in [StageKey::PreBuild, StageKey::PostBuild] {
        let len = session.form().stages.stage(key).steps.len() as u32;
        let expected: Vec<u32> = (1..=len).collect();
        assert_eq!(indices(session.form(), key), expected, "{key} indices");
    }
}

// ── P1: index contiguity ────────────────────────────────────────────────────

#[yare::parameterized(
    adds = { vec![Op::Add(StageKey::PreBuild), Op::Add(StageKey::PreBuild), Op::Add(StageKey::PostBuild)] },
    remove_head = { vec![Op::Remove(StageKey::PreBuild, 0)] },
    remove_middle = { vec![Op::Remove(StageKey::PreBuild, 1), Op::Remove(StageKey::PostBuild, 0)] },
    reorder_both_ways = { vec![Op::Reorder(StageKey::PreBuild, 0, 2), Op::Reorder(StageKey::PreBuild, 2, 1)] },
    moves = { vec![Op::Move(StageKey::PreBuild, 1), Op::Move(StageKey::PostBuild, 0), Op::Move(StageKey::PostBuild, 1)] },
    mixed = { vec![Op::Add(StageKey::PostBuild), Op::Move(StageKey::PreBuild, 0), Op::Remove(StageKey::PostBuild, 0), Op::Reorder(StageKey::PostBuild, 1, 0), Op::Add(StageKey::PreBuild)] },
    rejected = { vec![Op::Remove(StageKey::PreBuild, 9), Op::Add(StageKey::Build), Op::Reorder(StageKey::PostBuild, 0, 7)] },
)]
fn p1_indices_stay_contiguous(ops: Vec<Op>) {
    let mut session = session(chain(3, vec![shell_task(1, "post", "make")]));
    assert_contiguous(&session);
    for op in ops {
        apply(&mut session, op);
        assert_contiguous(&session);
    }
}

// ── P2: post-build sees every pre-build output ──────────────────────────────

#[yare::parameterized(
    one_post_task = { 1 },
    several_post_tasks = { 4 },
)]
fn p2_post_build_sees_all_pre_build_outputs(post_tasks: u32) {
    let post = (1..=post_tasks)
        .map(|i| producer(i, &format!("q{i}"), &["LOCAL"]))
        .collect();
    let session = session(chain(3, post));
    for position in 0..post_tasks as usize {
        let visible = session.visible_variables(StageKey::PostBuild, position);
        let from_pre = visible.from_pre_build.unwrap();
        for i in 1..=3 {
            assert!(
                from_pre.contains_key(&format!("{i}.OUT{i}")),
                "position {position} misses OUT{i}"
            );
        }
    }
}

// ── P3: forward-only within a stage ─────────────────────────────────────────

#[test]
fn p3_tasks_only_see_earlier_outputs() {
    let session = session(chain(4, vec![]));
    for position in 0..4 {
        let visible = session.visible_variables(StageKey::PreBuild, position);
        assert!(visible.from_pre_build.is_none());
        let steps: Vec<u32> = visible
            .candidates()
            .map(|v| v.ref_variable_step_index)
            .collect();
        assert_eq!(steps.len(), position);
        assert!(steps.iter().all(|s| *s < position as u32 + 1));
    }
}

// ── P4: reference invalidation ──────────────────────────────────────────────

#[test]
fn p4_removing_a_task_resets_references_to_it() {
    let mut form = chain(
        3,
        vec![
            pre_consumer(1, "uses-p2", 2, "OUT2"),
            pre_consumer(2, "uses-p1", 1, "OUT1"),
        ],
    );
    form.stages
        .pre_build_stage
        .steps
        .push(pre_consumer(4, "also-uses-p2", 2, "OUT2"));
    let mut session = session(form);
    session.remove_task(StageKey::PreBuild, 1).unwrap();

    let stages = &session.form().stages;
    for task in [&stages.pre_build_stage.steps[2], &stages.post_build_stage.steps[0]] {
        let input = &task.input_variables()[0];
        assert_eq!(input.variable_type, VariableType::New, "{}", task.name);
        assert_eq!(input.ref_variable_step_index, 0);
        assert_eq!(input.ref_variable_name, "");
    }
    let kept = &stages.post_build_stage.steps[1].input_variables()[0];
    assert_eq!(kept.variable_type, VariableType::FromPreviousStep);
    assert_eq!(kept.ref_variable_step_index, 1);
}

// ── P5: opposing condition types exclude each other ─────────────────────────

#[yare::parameterized(
    fail_then_pass = { ConditionType::Fail, ConditionType::Pass },
    pass_then_fail = { ConditionType::Pass, ConditionType::Fail },
    skip_then_trigger = { ConditionType::Skip, ConditionType::Trigger },
    trigger_then_skip = { ConditionType::Trigger, ConditionType::Skip },
)]
fn p5_adding_a_condition_drops_its_opposite(first: ConditionType, second: ConditionType) {
    let mut session = session(form_with(vec![producer(1, "a", &["OUT"])], vec![]));
    session.add_condition(StageKey::PreBuild, 0, first).unwrap();
    session.add_condition(StageKey::PreBuild, 0, first).unwrap();
    session.add_condition(StageKey::PreBuild, 0, second).unwrap();

    let types: Vec<ConditionType> = session.form().stages.pre_build_stage.steps[0]
        .condition_details()
        .iter()
        .map(|c| c.condition_type)
        .collect();
    assert_eq!(types, vec![second]);
}

// ── P6: a saved document loads back unchanged ───────────────────────────────

#[test]
fn p6_saved_stages_load_back_unchanged() {
    let mut lint = with_inputs(
        shell_task(3, "lint", "make lint"),
        vec![literal_input(1, "LEVEL", "strict")],
    );
    lint.description = "static checks".to_string();
    let form = form_with(
        vec![producer(1, "version", &["TAG"]), plugin_task(2, "scan", 9), lint],
        vec![with_outputs(pre_consumer(1, "publish", 1, "TAG"), &["URL"])],
    );
    let request = create_patch_request(&form, TARGET, None, PatchOptions::default()).unwrap();
    let body = serde_json::to_value(request.ci_pipeline.body().unwrap()).unwrap();
    let response: CiPipelineResponse = serde_json::from_value(body).unwrap();
    let reloaded = parse_ci_pipeline(&response, &[]).unwrap();

    let expected = prepare_for_save(&form.stages);
    similar_asserts::assert_eq!(
        reloaded.stages.pre_build_stage.steps,
        expected.pre_build_stage.steps
    );
    similar_asserts::assert_eq!(
        reloaded.stages.post_build_stage.steps,
        expected.post_build_stage.steps
    );
}
