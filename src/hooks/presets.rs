//! Hooks for transformation prompt presets and the default transformation
//! prompt. Neither is scoped to a notebook, so their keys carry no id.

use crate::cache::QueryKey;
use crate::error::ClientResult;
use crate::models::{DefaultPrompt, PresetRequest, PromptPreset};

use super::{HookContext, Messages, PendingFlag};

pub struct PresetHooks {
    ctx: HookContext,
    creating: PendingFlag,
    updating: PendingFlag,
    deleting: PendingFlag,
    saving_default: PendingFlag,
}

impl PresetHooks {
    pub fn new(ctx: HookContext) -> Self {
        Self {
            ctx,
            creating: PendingFlag::new("create preset"),
            updating: PendingFlag::new("update preset"),
            deleting: PendingFlag::new("delete preset"),
            saving_default: PendingFlag::new("update default prompt"),
        }
    }

    pub async fn presets(&self) -> ClientResult<Vec<PromptPreset>> {
        let api = self.ctx.api.clone();
        let presets = self
            .ctx
            .query(QueryKey::PromptPresets, true, || async move {
                api.list_presets().await
            })
            .await?;
        Ok(presets.unwrap_or_default())
    }

    pub async fn default_prompt(&self) -> ClientResult<DefaultPrompt> {
        let api = self.ctx.api.clone();
        let prompt = self
            .ctx
            .query(QueryKey::DefaultPrompt, true, || async move {
                api.get_default_prompt().await
            })
            .await?;
        Ok(prompt.unwrap_or(DefaultPrompt {
            transformation_instructions: String::new(),
        }))
    }

    pub async fn create_preset(&self, request: &PresetRequest) -> ClientResult<PromptPreset> {
        self.ctx
            .mutate(
                &self.creating,
                Messages {
                    success: "Preset created",
                    failure: "Failed to create preset",
                },
                || self.ctx.api.create_preset(request),
                |_| vec![QueryKey::PromptPresets],
            )
            .await
    }

    pub async fn update_preset(
        &self,
        preset_id: &str,
        request: &PresetRequest,
    ) -> ClientResult<PromptPreset> {
        self.ctx
            .mutate(
                &self.updating,
                Messages {
                    success: "Preset updated",
                    failure: "Failed to update preset",
                },
                || self.ctx.api.update_preset(preset_id, request),
                |_| vec![QueryKey::PromptPresets],
            )
            .await
    }

    pub async fn delete_preset(&self, preset_id: &str) -> ClientResult<()> {
        self.ctx
            .mutate(
                &self.deleting,
                Messages {
                    success: "Preset deleted",
                    failure: "Failed to delete preset",
                },
                || self.ctx.api.delete_preset(preset_id),
                |_| vec![QueryKey::PromptPresets],
            )
            .await
    }

    pub async fn update_default_prompt(&self, instructions: &str) -> ClientResult<DefaultPrompt> {
        let request = DefaultPrompt {
            transformation_instructions: instructions.to_string(),
        };
        self.ctx
            .mutate(
                &self.saving_default,
                Messages {
                    success: "Default prompt saved",
                    failure: "Failed to save default prompt",
                },
                || self.ctx.api.update_default_prompt(&request),
                |_| vec![QueryKey::DefaultPrompt],
            )
            .await
    }

    pub fn is_saving(&self) -> bool {
        self.creating.is_pending() || self.updating.is_pending()
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.is_pending()
    }
}
