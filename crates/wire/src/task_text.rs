// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Editing a task as raw text.
//!
//! A task can be rendered to JSON or YAML, hand edited, and parsed back. The
//! text uses the same shape as the wire.

use crate::error::WireError;
use ps_core::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextFormat {
    #[default]
    Yaml,
    Json,
}

pub fn render_task(task: &Task, format: TextFormat) -> Result<String, WireError> {
    Ok(match format {
        TextFormat::Json => serde_json::to_string_pretty(task)?,
        TextFormat::Yaml => serde_yaml::to_string(task)?,
    })
}

pub fn parse_task(text: &str, format: TextFormat) -> Result<Task, WireError> {
    Ok(match format {
        TextFormat::Json => serde_json::from_str(text)?,
        TextFormat::Yaml => serde_yaml::from_str(text)?,
    })
}

#[cfg(test)]
#[path = "task_text_tests.rs"]
mod tests;
