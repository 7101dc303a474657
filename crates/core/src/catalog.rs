// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only inputs supplied by the platform: plugins and global variables.

use crate::serde_util::null_default;
use crate::variable::{Variable, VariableFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PluginType {
    #[default]
    Preset,
    Shared,
}

/// A reusable step definition from the plugin catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub id: u32,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub icon: String,
    #[serde(default, rename = "type", deserialize_with = "null_default")]
    pub plugin_type: PluginType,
    #[serde(default, deserialize_with = "null_default")]
    pub input_variables: Vec<Variable>,
    #[serde(default, deserialize_with = "null_default")]
    pub output_variables: Vec<Variable>,
}

/// A platform-provided variable visible to every task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalVariable {
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub format: VariableFormat,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
}

impl GlobalVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Everything the engine consumes but never edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub plugins: Vec<Plugin>,
    pub global_variables: Vec<GlobalVariable>,
}

impl Catalog {
    pub fn plugin(&self, id: u32) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.id == id)
    }

    pub fn global_variable(&self, name: &str) -> Option<&GlobalVariable> {
        self.global_variables.iter().find(|g| g.name == name)
    }
}
