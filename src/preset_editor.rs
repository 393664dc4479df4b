//! Editor for prompt presets and the global default transformation prompt.
//!
//! The editor keeps the preset list, the selected preset and two editable
//! fields (name and body). Selecting a preset copies its values into the
//! fields. Whenever the selection disappears from the list (after a delete,
//! or a refresh), the first remaining preset is selected; with an empty list
//! the selection and both fields are cleared.

use crate::dialog::{FormFields, PresetForm};
use crate::error::{ClientError, ClientResult};
use crate::hooks::PresetHooks;
use crate::models::{PresetRequest, PromptPreset};

#[derive(Debug, Clone, Default)]
pub struct PresetEditor {
    presets: Vec<PromptPreset>,
    selected: Option<String>,
    name: String,
    body: String,
    default_instructions: String,
}

impl PresetEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, hooks: &PresetHooks) -> ClientResult<()> {
        let presets = hooks.presets().await?;
        self.apply_presets(presets);
        Ok(())
    }

    /// Replace the list, keeping the selection if it still exists.
    pub fn apply_presets(&mut self, presets: Vec<PromptPreset>) {
        self.presets = presets;
        let still_there = self
            .selected
            .as_deref()
            .map(|id| self.presets.iter().any(|p| p.prompt_id == id))
            .unwrap_or(false);
        if still_there {
            return;
        }
        match self.presets.first().map(|p| p.prompt_id.clone()) {
            Some(first) => {
                self.select(&first);
            }
            None => self.clear_selection(),
        }
    }

    pub fn select(&mut self, preset_id: &str) -> bool {
        let Some(preset) = self.presets.iter().find(|p| p.prompt_id == preset_id) else {
            return false;
        };
        self.name = preset.name.clone();
        self.body = preset.transformation_instructions.clone();
        self.selected = Some(preset.prompt_id.clone());
        true
    }

    /// Start a new preset: no selection, empty fields.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.name.clear();
        self.body.clear();
    }

    /// Create a preset (no selection) or update the selected one.
    ///
    /// The saved preset becomes the selection.
    pub async fn save(&mut self, hooks: &PresetHooks) -> ClientResult<PromptPreset> {
        let form = PresetForm {
            name: self.name.clone(),
            transformation_instructions: self.body.clone(),
        };
        form.validate()?;
        let request = PresetRequest {
            name: form.name,
            transformation_instructions: form.transformation_instructions,
        };
        let saved = match self.selected.clone() {
            Some(id) => hooks.update_preset(&id, &request).await?,
            None => hooks.create_preset(&request).await?,
        };
        self.selected = Some(saved.prompt_id.clone());
        match hooks.presets().await {
            Ok(list) => self.apply_presets(list),
            Err(e) => {
                // The save went through; keep the stale list with the saved
                // values in place.
                tracing::debug!(error = %e, "preset refresh failed after save");
                upsert(&mut self.presets, saved.clone());
            }
        }
        Ok(saved)
    }

    /// Delete the selected preset and move the selection on.
    pub async fn delete_selected(&mut self, hooks: &PresetHooks) -> ClientResult<()> {
        let id = self
            .selected
            .clone()
            .ok_or_else(|| ClientError::Validation("no preset selected".into()))?;
        hooks.delete_preset(&id).await?;
        let remaining: Vec<PromptPreset> = match hooks.presets().await {
            Ok(list) => list,
            Err(e) => {
                tracing::debug!(error = %e, "preset refresh failed after delete");
                self.presets.clone()
            }
        };
        self.selected = None;
        self.apply_presets(remaining.into_iter().filter(|p| p.prompt_id != id).collect());
        Ok(())
    }

    pub async fn load_default(&mut self, hooks: &PresetHooks) -> ClientResult<()> {
        self.default_instructions = hooks.default_prompt().await?.transformation_instructions;
        Ok(())
    }

    pub async fn save_default(&mut self, hooks: &PresetHooks) -> ClientResult<()> {
        let saved = hooks
            .update_default_prompt(&self.default_instructions)
            .await?;
        self.default_instructions = saved.transformation_instructions;
        Ok(())
    }

    pub fn presets(&self) -> &[PromptPreset] {
        &self.presets
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn default_instructions(&self) -> &str {
        &self.default_instructions
    }

    pub fn set_default_instructions(&mut self, text: impl Into<String>) {
        self.default_instructions = text.into();
    }
}

/// Replace the preset with the same id, or append it.
fn upsert(presets: &mut Vec<PromptPreset>, preset: PromptPreset) {
    match presets.iter_mut().find(|p| p.prompt_id == preset.prompt_id) {
        Some(slot) => *slot = preset,
        None => presets.push(preset),
    }
}
