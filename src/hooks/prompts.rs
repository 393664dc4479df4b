//! Hooks for notebook system prompts and the per-notebook active prompt.

use crate::cache::QueryKey;
use crate::error::ClientResult;
use crate::models::{ActivePromptResponse, CreatePromptRequest, SystemPrompt, UpdatePromptRequest};

use super::{has_id, HookContext, Messages, PendingFlag};

pub struct PromptHooks {
    ctx: HookContext,
    creating: PendingFlag,
    updating: PendingFlag,
    deleting: PendingFlag,
    activating: PendingFlag,
}

impl PromptHooks {
    pub fn new(ctx: HookContext) -> Self {
        Self {
            ctx,
            creating: PendingFlag::new("create prompt"),
            updating: PendingFlag::new("update prompt"),
            deleting: PendingFlag::new("delete prompt"),
            activating: PendingFlag::new("set active prompt"),
        }
    }

    /// Prompt list of `notebook_id`, each tagged with its notebook.
    pub async fn prompts(&self, notebook_id: &str) -> ClientResult<Option<Vec<SystemPrompt>>> {
        let api = self.ctx.api.clone();
        let nb = notebook_id.to_string();
        self.ctx
            .query(
                QueryKey::Prompts(nb.clone()),
                has_id(notebook_id),
                || async move {
                    let mut prompts = api.list_prompts(&nb).await?;
                    for p in &mut prompts {
                        p.notebook_id = Some(nb.clone());
                    }
                    Ok(prompts)
                },
            )
            .await
    }

    pub async fn prompt(&self, prompt_id: &str) -> ClientResult<Option<SystemPrompt>> {
        let api = self.ctx.api.clone();
        let id = prompt_id.to_string();
        self.ctx
            .query(QueryKey::Prompt(id.clone()), has_id(prompt_id), || async move {
                api.get_prompt(&id).await
            })
            .await
    }

    /// The active prompt of `notebook_id`; `None` when unset or disabled.
    pub async fn active_prompt(&self, notebook_id: &str) -> ClientResult<Option<SystemPrompt>> {
        let api = self.ctx.api.clone();
        let nb = notebook_id.to_string();
        let active = self
            .ctx
            .query(
                QueryKey::ActivePrompt(nb.clone()),
                has_id(notebook_id),
                || async move { api.get_active_prompt(&nb).await },
            )
            .await?;
        Ok(active.flatten())
    }

    pub async fn create_prompt(
        &self,
        notebook_id: &str,
        name: &str,
        content: &str,
    ) -> ClientResult<SystemPrompt> {
        let request = CreatePromptRequest {
            notebook_id: notebook_id.to_string(),
            name: name.to_string(),
            content: content.to_string(),
        };
        let nb = notebook_id.to_string();
        let mut created = self
            .ctx
            .mutate(
                &self.creating,
                Messages {
                    success: "Prompt created",
                    failure: "Failed to create prompt",
                },
                || self.ctx.api.create_prompt(&request),
                |_| vec![QueryKey::Prompts(nb.clone())],
            )
            .await?;
        created.notebook_id = Some(notebook_id.to_string());
        Ok(created)
    }

    /// Update a prompt owned by `notebook_id`.
    ///
    /// Only that notebook's list and active prompt are invalidated, together
    /// with the single-prompt entry.
    pub async fn update_prompt(
        &self,
        prompt_id: &str,
        notebook_id: &str,
        request: &UpdatePromptRequest,
    ) -> ClientResult<SystemPrompt> {
        let mut updated = self
            .ctx
            .mutate(
                &self.updating,
                Messages {
                    success: "Prompt updated",
                    failure: "Failed to update prompt",
                },
                || self.ctx.api.update_prompt(prompt_id, request),
                |_| prompt_keys(prompt_id, notebook_id),
            )
            .await?;
        updated.notebook_id = Some(notebook_id.to_string());
        Ok(updated)
    }

    pub async fn delete_prompt(&self, prompt_id: &str, notebook_id: &str) -> ClientResult<()> {
        self.ctx
            .mutate(
                &self.deleting,
                Messages {
                    success: "Prompt deleted",
                    failure: "Failed to delete prompt",
                },
                || self.ctx.api.delete_prompt(prompt_id),
                |_| prompt_keys(prompt_id, notebook_id),
            )
            .await
    }

    /// Make `prompt_id` the active prompt of `notebook_id`, or clear it.
    pub async fn set_active_prompt(
        &self,
        notebook_id: &str,
        prompt_id: Option<&str>,
    ) -> ClientResult<ActivePromptResponse> {
        let success = if prompt_id.is_some() {
            "Active prompt set"
        } else {
            "Active prompt cleared"
        };
        self.ctx
            .mutate(
                &self.activating,
                Messages {
                    success,
                    failure: "Failed to update active prompt",
                },
                || self.ctx.api.set_active_prompt(notebook_id, prompt_id),
                |_| {
                    vec![
                        QueryKey::ActivePrompt(notebook_id.to_string()),
                        QueryKey::Notebook(notebook_id.to_string()),
                    ]
                },
            )
            .await
    }

    pub fn is_creating(&self) -> bool {
        self.creating.is_pending()
    }

    pub fn is_updating(&self) -> bool {
        self.updating.is_pending()
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.is_pending()
    }
}

fn prompt_keys(prompt_id: &str, notebook_id: &str) -> Vec<QueryKey> {
    vec![
        QueryKey::Prompt(prompt_id.to_string()),
        QueryKey::Prompts(notebook_id.to_string()),
        QueryKey::ActivePrompt(notebook_id.to_string()),
    ]
}
