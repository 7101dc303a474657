// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment configuration of an editing session.
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! app_id = 12
//! app_workflow_id = 3
//! is_job = false
//! security_module_installed = true
//! force_security_scanning = true
//! ```

use ps_wire::{PatchOptions, PatchTarget};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default number of undo steps kept by a session
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub app_id: u32,
    pub app_workflow_id: u32,
    /// Job pipelines never scan
    pub is_job: bool,
    pub security_module_installed: bool,
    /// Refuse to save build pipelines with scanning off
    pub force_security_scanning: bool,
    pub validate_plugin_inputs: bool,
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_id: 0,
            app_workflow_id: 0,
            is_job: false,
            security_module_installed: false,
            force_security_scanning: false,
            validate_plugin_inputs: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn target(&self) -> PatchTarget {
        PatchTarget {
            app_id: self.app_id,
            app_workflow_id: self.app_workflow_id,
        }
    }

    pub fn patch_options(&self) -> PatchOptions {
        PatchOptions {
            is_job: self.is_job,
            security_module_installed: self.security_module_installed,
        }
    }

    /// Whether the scan setting allows a save
    pub fn scan_allows_save(&self, scan_enabled: bool) -> bool {
        self.is_job || !self.security_module_installed || scan_enabled || !self.force_security_scanning
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
