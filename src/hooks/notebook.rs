//! Read hooks behind the notebook page, plus chat context assembly.

use crate::cache::QueryKey;
use crate::context::ContextSelections;
use crate::error::ClientResult;
use crate::models::{BuildContextRequest, BuildContextResponse, Note, Notebook, Source};

use super::{has_id, HookContext};

pub struct NotebookHooks {
    ctx: HookContext,
}

impl NotebookHooks {
    pub fn new(ctx: HookContext) -> Self {
        Self { ctx }
    }

    pub async fn notebook(&self, notebook_id: &str) -> ClientResult<Option<Notebook>> {
        let api = self.ctx.api.clone();
        let nb = notebook_id.to_string();
        self.ctx
            .query(QueryKey::Notebook(nb.clone()), has_id(notebook_id), || async move {
                api.get_notebook(&nb).await
            })
            .await
    }

    pub async fn sources(&self, notebook_id: &str) -> ClientResult<Option<Vec<Source>>> {
        let api = self.ctx.api.clone();
        let nb = notebook_id.to_string();
        self.ctx
            .query(QueryKey::Sources(nb.clone()), has_id(notebook_id), || async move {
                api.list_sources(&nb).await
            })
            .await
    }

    pub async fn notes(&self, notebook_id: &str) -> ClientResult<Option<Vec<Note>>> {
        let api = self.ctx.api.clone();
        let nb = notebook_id.to_string();
        self.ctx
            .query(QueryKey::Notes(nb.clone()), has_id(notebook_id), || async move {
                api.list_notes(&nb).await
            })
            .await
    }

    /// Mark the notebook and its collections stale so the next reads refetch.
    pub fn invalidate(&self, notebook_id: &str) {
        let nb = notebook_id.to_string();
        self.ctx.cache.invalidate(&[
            QueryKey::Notebook(nb.clone()),
            QueryKey::Sources(nb.clone()),
            QueryKey::Notes(nb),
        ]);
    }

    /// Assemble chat context for `notebook_id` from the selections of the
    /// listed `sources` and `notes`.
    ///
    /// Not cached: the result depends on selections that never reach the
    /// cache.
    pub async fn build_context(
        &self,
        notebook_id: &str,
        selections: &ContextSelections,
        sources: &[Source],
        notes: &[Note],
    ) -> ClientResult<BuildContextResponse> {
        let request = BuildContextRequest {
            notebook_id: notebook_id.to_string(),
            context_config: selections.context_config(sources, notes),
        };
        self.ctx.api.build_context(&request).await
    }
}
