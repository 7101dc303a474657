// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task conditions.
//!
//! Conditions come in two categories. Trigger/skip conditions decide whether
//! a task runs and are evaluated against its input variables. Pass/fail
//! conditions decide the task's outcome and are evaluated against its output
//! variables. Within a category only one type may be active at a time.

use crate::serde_util::{empty_as_none, null_default};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionType {
    Pass,
    Fail,
    Trigger,
    Skip,
}

/// Which variable list a condition is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionCategory {
    /// TRIGGER/SKIP, over input variables
    Execution,
    /// PASS/FAIL, over output variables
    Outcome,
}

impl ConditionType {
    pub fn category(&self) -> ConditionCategory {
        match self {
            ConditionType::Trigger | ConditionType::Skip => ConditionCategory::Execution,
            ConditionType::Pass | ConditionType::Fail => ConditionCategory::Outcome,
        }
    }

    /// The other type in the same category
    pub fn opposing(&self) -> ConditionType {
        match self {
            ConditionType::Pass => ConditionType::Fail,
            ConditionType::Fail => ConditionType::Pass,
            ConditionType::Trigger => ConditionType::Skip,
            ConditionType::Skip => ConditionType::Trigger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Eq => "==",
            ConditionOperator::Ne => "!=",
            ConditionOperator::Lt => "<",
            ConditionOperator::Gt => ">",
            ConditionOperator::Le => "<=",
            ConditionOperator::Ge => ">=",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDetail {
    #[serde(default)]
    pub id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub condition_on_variable: String,
    #[serde(default, with = "empty_as_none")]
    pub condition_operator: Option<ConditionOperator>,
    pub condition_type: ConditionType,
    #[serde(default, deserialize_with = "null_default")]
    pub conditional_value: String,
}

impl ConditionDetail {
    /// An empty condition of the given type
    pub fn new(id: u32, condition_type: ConditionType) -> Self {
        Self {
            id,
            condition_on_variable: String::new(),
            condition_operator: None,
            condition_type,
            conditional_value: String::new(),
        }
    }

    pub fn on(
        mut self,
        variable: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<String>,
    ) -> Self {
        self.condition_on_variable = variable.into();
        self.condition_operator = Some(operator);
        self.conditional_value = value.into();
        self
    }
}
