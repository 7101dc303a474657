// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The editing session.
//!
//! A session holds one immutable [`Snapshot`] at a time. Every edit builds
//! the next snapshot from the current one through the copy-on-write
//! operations of `ps-engine`, clears condition variables that no longer
//! exist, re-derives variable scopes and validates the whole form. Previous
//! snapshots are kept for undo.

use crate::config::EngineConfig;
use crate::error::{EditError, SaveError};
use ps_core::{
    Catalog, ConditionType, ErrorDocument, GitMaterial, PipelineForm, ScriptType, StageDocument,
    StageKey, Task,
};
use ps_engine::{
    check_index, clear_stale_condition_variables, derive_document_variables, duplicate_task_names,
    new_condition, validate_build_stage, validate_form, validate_name, visible_variables,
    DocumentVariables, EngineError, StepKind, ValidationScope, VisibleVariables,
};
use ps_wire::{
    create_patch_request, delete_request, load_pipeline, parse_task, render_task,
    CiPipelineResponse, LoadedPipeline, PatchRequest, PipelineRecord, ServerError, TextFormat,
};
use std::collections::VecDeque;
use std::sync::Arc;

/// Form state with everything derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub form: PipelineForm,
    pub variables: DocumentVariables,
    pub errors: ErrorDocument,
}

/// Variant to give a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Inline,
    /// Plugin id from the catalog
    Plugin(u32),
}

/// Task text that failed to parse. The form keeps its previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub stage: StageKey,
    pub index: usize,
    pub format: TextFormat,
    pub message: String,
}

pub struct Session {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    current: Arc<Snapshot>,
    undo: VecDeque<Arc<Snapshot>>,
    redo: Vec<Arc<Snapshot>>,
    record: Option<PipelineRecord>,
    parse_failure: Option<ParseFailure>,
    saving: bool,
}

impl Session {
    /// Start editing `form`, typically a new pipeline.
    pub fn new(config: EngineConfig, catalog: Arc<Catalog>, form: PipelineForm) -> Self {
        let current = Arc::new(derive(form, &config, &catalog));
        Self {
            config,
            catalog,
            current,
            undo: VecDeque::new(),
            redo: Vec::new(),
            record: None,
            parse_failure: None,
            saving: false,
        }
    }

    /// Continue editing a pipeline loaded from the backend.
    pub fn load(config: EngineConfig, catalog: Arc<Catalog>, loaded: LoadedPipeline) -> Self {
        tracing::info!(id = loaded.record.id, name = %loaded.form.name, "pipeline loaded");
        let current = Arc::new(Snapshot {
            form: loaded.form,
            variables: loaded.variables,
            errors: loaded.errors,
        });
        Self {
            config,
            catalog,
            current,
            undo: VecDeque::new(),
            redo: Vec::new(),
            record: Some(loaded.record),
            parse_failure: None,
            saving: false,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    pub fn form(&self) -> &PipelineForm {
        &self.current.form
    }

    pub fn errors(&self) -> &ErrorDocument {
        &self.current.errors
    }

    pub fn variables(&self) -> &DocumentVariables {
        &self.current.variables
    }

    /// What the task at `position` of `key` may reference
    pub fn visible_variables(&self, key: StageKey, position: usize) -> VisibleVariables<'_> {
        visible_variables(
            &self.current.variables,
            key,
            position,
            &self.catalog.global_variables,
        )
    }

    pub fn record(&self) -> Option<&PipelineRecord> {
        self.record.as_ref()
    }

    pub fn parse_failure(&self) -> Option<&ParseFailure> {
        self.parse_failure.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    // ── Structural edits ────────────────────────────────────────────────────

    /// Append an unset task. Returns its position.
    pub fn add_task(&mut self, key: StageKey) -> Result<usize, EditError> {
        let (stages, position) = ps_engine::add_task(&self.current.form.stages, key)?;
        self.commit_stages(stages);
        Ok(position)
    }

    pub fn remove_task(&mut self, key: StageKey, index: usize) -> Result<(), EditError> {
        let stages = ps_engine::remove_task(&self.current.form.stages, key, index)?;
        self.commit_stages(stages);
        Ok(())
    }

    pub fn reorder_task(&mut self, key: StageKey, from: usize, to: usize) -> Result<(), EditError> {
        let stages = ps_engine::reorder_task(&self.current.form.stages, key, from, to)?;
        self.commit_stages(stages);
        Ok(())
    }

    /// Move a task to the other task-bearing stage. Returns its new position.
    pub fn move_task_to_other_stage(
        &mut self,
        key: StageKey,
        index: usize,
    ) -> Result<usize, EditError> {
        let (stages, position) =
            ps_engine::move_task_to_other_stage(&self.current.form.stages, key, index)?;
        self.commit_stages(stages);
        Ok(position)
    }

    // ── Task edits ──────────────────────────────────────────────────────────

    pub fn set_step_type(
        &mut self,
        key: StageKey,
        index: usize,
        kind: TaskKind,
    ) -> Result<(), EditError> {
        let catalog = Arc::clone(&self.catalog);
        let step_kind = match kind {
            TaskKind::Inline => StepKind::Inline,
            TaskKind::Plugin(id) => {
                StepKind::PluginRef(catalog.plugin(id).ok_or(EditError::UnknownPlugin(id))?)
            }
        };
        self.edit_task(key, index, |task| {
            Ok(ps_engine::set_step_type(task, step_kind))
        })
    }

    pub fn set_script_type(
        &mut self,
        key: StageKey,
        index: usize,
        script_type: ScriptType,
    ) -> Result<(), EditError> {
        self.edit_task(key, index, |task| {
            Ok(ps_engine::set_script_type(task, script_type))
        })
    }

    pub fn set_mount_code_to_container(
        &mut self,
        key: StageKey,
        index: usize,
        enabled: bool,
    ) -> Result<(), EditError> {
        self.edit_task(key, index, |task| {
            Ok(ps_engine::set_mount_code_to_container(task, enabled))
        })
    }

    pub fn set_mount_directory_from_host(
        &mut self,
        key: StageKey,
        index: usize,
        enabled: bool,
    ) -> Result<(), EditError> {
        self.edit_task(key, index, |task| {
            Ok(ps_engine::set_mount_directory_from_host(task, enabled))
        })
    }

    /// Add a blank condition row of `condition_type`. Returns the row id.
    pub fn add_condition(
        &mut self,
        key: StageKey,
        index: usize,
        condition_type: ConditionType,
    ) -> Result<u32, EditError> {
        let mut id = 0;
        self.edit_task(key, index, |task| {
            let condition = new_condition(task, condition_type);
            id = condition.id;
            ps_engine::add_condition(task, condition).ok_or(EngineError::UnsetTask {
                stage: key,
                index,
            })
        })?;
        Ok(id)
    }

    /// Apply a free-form edit to one task.
    pub fn update_task(
        &mut self,
        key: StageKey,
        index: usize,
        edit: impl FnOnce(&mut Task),
    ) -> Result<(), EditError> {
        self.edit_task(key, index, |task| {
            let mut next = task.clone();
            edit(&mut next);
            Ok(next)
        })
    }

    /// Apply a free-form edit to the non-stage fields of the form, or to the
    /// form as a whole.
    pub fn update_form(&mut self, edit: impl FnOnce(&mut PipelineForm)) {
        let mut form = self.current.form.clone();
        edit(&mut form);
        self.commit(form);
    }

    // ── Task text ───────────────────────────────────────────────────────────

    pub fn task_text(
        &self,
        key: StageKey,
        index: usize,
        format: TextFormat,
    ) -> Result<String, EditError> {
        let task = self.task(key, index)?;
        Ok(render_task(task, format)?)
    }

    /// Replace a task with the parsed `text`.
    ///
    /// Text that does not parse leaves the form untouched and is recorded as
    /// the session's [`ParseFailure`]; the call then returns `Ok(false)`.
    pub fn edit_task_text(
        &mut self,
        key: StageKey,
        index: usize,
        text: &str,
        format: TextFormat,
    ) -> Result<bool, EditError> {
        self.task(key, index)?;
        match parse_task(text, format) {
            Ok(parsed) => {
                self.edit_task(key, index, |_| Ok(parsed))?;
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(stage = %key, index, error = %err, "task text rejected");
                self.parse_failure = Some(ParseFailure {
                    stage: key,
                    index,
                    format,
                    message: err.to_string(),
                });
                Ok(false)
            }
        }
    }

    // ── Validation and history ──────────────────────────────────────────────

    /// Re-validate one stage and return whether it is valid.
    pub fn validate_stage(&mut self, key: StageKey) -> bool {
        let snapshot = Arc::make_mut(&mut self.current);
        snapshot.errors.name = validate_name(&snapshot.form.name);
        match key {
            StageKey::Build => {
                snapshot.errors.build_stage = validate_build_stage(&snapshot.form);
            }
            _ => {
                let scope = ValidationScope {
                    validate_plugin_inputs: self.config.validate_plugin_inputs,
                    ..ValidationScope::new(&snapshot.variables, &self.catalog.global_variables)
                };
                let stage = ps_engine::validate_stage(&snapshot.form, key, &scope);
                if let Some(slot) = snapshot.errors.stage_mut(key) {
                    *slot = stage;
                }
            }
        }
        snapshot.errors.stage_is_valid(key)
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(std::mem::replace(&mut self.current, previous));
        self.parse_failure = None;
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(std::mem::replace(&mut self.current, next));
        self.parse_failure = None;
        true
    }

    // ── Save ────────────────────────────────────────────────────────────────

    /// Check the form and build the request that saves it.
    ///
    /// Task names must be unique, every stage must validate and the scan
    /// setting must satisfy the deployment's security policy. On success the
    /// session is marked as saving until [`Session::finish_save`].
    pub fn begin_save(&mut self) -> Result<PatchRequest, SaveError> {
        if self.saving {
            return Err(SaveError::InProgress);
        }
        let duplicates = duplicate_task_names(&self.current.form.stages);
        if !duplicates.is_empty() {
            tracing::debug!(?duplicates, "save refused: duplicate task names");
            return Err(SaveError::NamesNotUnique(duplicates));
        }
        let invalid: Vec<StageKey> = StageKey::ALL
            .into_iter()
            .filter(|key| !self.validate_stage(*key))
            .collect();
        if !self.config.scan_allows_save(self.current.form.scan_enabled) {
            return Err(SaveError::ScanRequired);
        }
        if !invalid.is_empty() {
            tracing::debug!(?invalid, "save refused: invalid stages");
            return Err(SaveError::Invalid(invalid));
        }
        let request = create_patch_request(
            &self.current.form,
            self.config.target(),
            self.record.as_ref(),
            self.config.patch_options(),
        )?;
        self.saving = true;
        tracing::info!(action = ?request.action, name = %self.current.form.name, "saving pipeline");
        Ok(request)
    }

    /// Settle a save started by [`Session::begin_save`].
    ///
    /// The saving flag is cleared whatever the outcome. A saved pipeline
    /// replaces the form and resets the history.
    pub fn finish_save(
        &mut self,
        result: Result<CiPipelineResponse, ServerError>,
    ) -> Result<(), SaveError> {
        self.saving = false;
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(code = err.code, error = %err, "save failed");
                return Err(err.into());
            }
        };
        let git_materials: Vec<GitMaterial> = self
            .current
            .form
            .materials
            .iter()
            .map(|m| GitMaterial {
                git_material_id: m.git_material_id,
                name: m.name.clone(),
            })
            .collect();
        let loaded = load_pipeline(
            &response,
            &git_materials,
            &self.catalog.global_variables,
            self.config.validate_plugin_inputs,
        )?;
        tracing::info!(id = loaded.record.id, "pipeline saved");
        self.record = Some(loaded.record);
        self.current = Arc::new(Snapshot {
            form: loaded.form,
            variables: loaded.variables,
            errors: loaded.errors,
        });
        self.undo.clear();
        self.redo.clear();
        self.parse_failure = None;
        Ok(())
    }

    /// Request deleting the saved pipeline, if there is one.
    pub fn delete_request(&self) -> Option<PatchRequest> {
        let record = self.record.as_ref().filter(|r| r.id != 0)?;
        Some(delete_request(
            self.config.target(),
            record.id,
            &self.current.form.name,
        ))
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn task(&self, key: StageKey, index: usize) -> Result<&Task, EngineError> {
        let steps = &self.current.form.stages.stage(key).steps;
        check_index(key, index, steps.len())?;
        Ok(&steps[index])
    }

    fn edit_task(
        &mut self,
        key: StageKey,
        index: usize,
        edit: impl FnOnce(&Task) -> Result<Task, EngineError>,
    ) -> Result<(), EditError> {
        let stages = ps_engine::update_task(&self.current.form.stages, key, index, edit)?;
        self.commit_stages(stages);
        Ok(())
    }

    fn commit_stages(&mut self, stages: StageDocument) {
        let mut form = self.current.form.clone();
        form.stages = stages;
        self.commit(form);
    }

    fn commit(&mut self, form: PipelineForm) {
        let next = Arc::new(derive(form, &self.config, &self.catalog));
        let previous = std::mem::replace(&mut self.current, next);
        if self.config.history_limit > 0 {
            self.undo.push_back(previous);
            if self.undo.len() > self.config.history_limit {
                self.undo.pop_front();
            }
        }
        self.redo.clear();
        self.parse_failure = None;
    }
}

fn derive(mut form: PipelineForm, config: &EngineConfig, catalog: &Catalog) -> Snapshot {
    form.stages = clear_stale_condition_variables(&form.stages);
    let variables = derive_document_variables(&mut form.stages);
    let scope = ValidationScope {
        validate_plugin_inputs: config.validate_plugin_inputs,
        ..ValidationScope::new(&variables, &catalog.global_variables)
    };
    let errors = validate_form(&form, &scope);
    Snapshot {
        form,
        variables,
        errors,
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
