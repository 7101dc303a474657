// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Wire formats of the pipeline endpoint: patch requests, responses, legacy
//! migration and task text.

mod error;
pub mod legacy;
pub mod patch;
pub mod response;
pub mod task_text;

pub use error::{ServerError, UserMessage, WireError};
pub use legacy::{migrate_legacy_scripts, LegacyScript};
pub use patch::{
    create_patch_request, delete_request, CiMaterial, CiPipelineBody, CiPipelinePatch,
    MaterialSource, PatchAction, PatchOptions, PatchRequest, PatchTarget, PipelineRecord,
    StagePayload, WebhookValue,
};
pub use response::{
    create_material_list, create_webhook_condition_list, load_pipeline, parse_ci_pipeline,
    parse_pipeline_envelope, parse_response_envelope, CiPipelineResponse, LoadedPipeline,
};
pub use task_text::{parse_task, render_task, TextFormat};
