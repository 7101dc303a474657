// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the wire layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One user-facing message returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessage {
    #[serde(default)]
    pub user_message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub internal_message: String,
}

impl UserMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            user_message: message.into(),
            ..Self::default()
        }
    }
}

/// A rejected request, as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("server error {code}: {}", join_messages(.errors))]
pub struct ServerError {
    pub code: u16,
    #[serde(default)]
    pub errors: Vec<UserMessage>,
}

fn join_messages(errors: &[UserMessage]) -> String {
    if errors.is_empty() {
        return "no message".to_string();
    }
    errors
        .iter()
        .map(|e| e.user_message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("response carried no pipeline")]
    EmptyResult,
    #[error("material '{material}' has a malformed webhook value: {source}")]
    WebhookValue {
        material: String,
        source: serde_json::Error,
    },
}
