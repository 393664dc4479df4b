//! Notebook page state: the loaded collections, context selections and
//! panel visibility for one notebook.
//!
//! The page never writes to the backend. It reads through
//! [`NotebookHooks`] and reconciles selections every time a collection
//! arrives, so a refresh after a mutation elsewhere picks up new items with
//! their defaults while keeping every recorded choice.

use crate::context::{ContextMode, ContextSelections};
use crate::error::ClientResult;
use crate::hooks::NotebookHooks;
use crate::models::{BuildContextResponse, Note, Notebook, Source};
use crate::panels::{Layout, Panel, PanelState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Loading,
    Ready,
    /// The notebook does not exist; rendered in place, not as an error.
    NotFound,
}

pub struct NotebookPage {
    notebook_id: String,
    status: PageStatus,
    notebook: Option<Notebook>,
    sources: Vec<Source>,
    notes: Vec<Note>,
    selections: ContextSelections,
    panels: PanelState,
}

impl NotebookPage {
    pub fn new(notebook_id: impl Into<String>, layout: Layout) -> Self {
        Self {
            notebook_id: notebook_id.into(),
            status: PageStatus::Loading,
            notebook: None,
            sources: Vec::new(),
            notes: Vec::new(),
            selections: ContextSelections::new(),
            panels: PanelState::new(layout),
        }
    }

    /// Fetch the notebook and its collections, then reconcile selections.
    ///
    /// Reads go through the query cache, so a second call only sees new
    /// items once their keys are stale; [`NotebookPage::reload`] forces that.
    ///
    /// A missing notebook (404 or empty id) yields [`PageStatus::NotFound`];
    /// any other failure is returned and leaves the page as it was.
    pub async fn refresh(&mut self, hooks: &NotebookHooks) -> ClientResult<PageStatus> {
        let notebook = match hooks.notebook(&self.notebook_id).await {
            Ok(Some(nb)) => nb,
            Ok(None) => return Ok(self.mark_not_found()),
            Err(e) if e.is_not_found() => return Ok(self.mark_not_found()),
            Err(e) => return Err(e),
        };

        let sources = hooks.sources(&self.notebook_id).await?.unwrap_or_default();
        let notes = hooks.notes(&self.notebook_id).await?.unwrap_or_default();

        self.notebook = Some(notebook);
        self.apply_sources(sources);
        self.apply_notes(notes);
        self.status = PageStatus::Ready;
        Ok(self.status)
    }

    /// Invalidate the notebook and its collections, then [`refresh`](Self::refresh).
    pub async fn reload(&mut self, hooks: &NotebookHooks) -> ClientResult<PageStatus> {
        hooks.invalidate(&self.notebook_id);
        self.refresh(hooks).await
    }

    fn mark_not_found(&mut self) -> PageStatus {
        tracing::debug!(notebook_id = %self.notebook_id, "notebook not found");
        self.status = PageStatus::NotFound;
        self.status
    }

    pub fn apply_sources(&mut self, sources: Vec<Source>) {
        let assigned = self.selections.reconcile_sources(&sources);
        if assigned > 0 {
            tracing::debug!(assigned, "defaulted source context modes");
        }
        self.sources = sources;
    }

    pub fn apply_notes(&mut self, notes: Vec<Note>) {
        let assigned = self.selections.reconcile_notes(&notes);
        if assigned > 0 {
            tracing::debug!(assigned, "defaulted note context modes");
        }
        self.notes = notes;
    }

    /// Build chat context from the items currently listed on the page.
    pub async fn build_context(&self, hooks: &NotebookHooks) -> ClientResult<BuildContextResponse> {
        hooks
            .build_context(&self.notebook_id, &self.selections, &self.sources, &self.notes)
            .await
    }

    pub fn set_source_mode(&mut self, source_id: &str, mode: ContextMode) {
        self.selections.set_source_mode(source_id, mode);
    }

    pub fn set_note_mode(&mut self, note_id: &str, mode: ContextMode) -> bool {
        self.selections.set_note_mode(note_id, mode)
    }

    pub fn toggle_panel(&mut self, panel: Panel) -> Option<bool> {
        self.panels.toggle(panel)
    }

    pub fn notebook_id(&self) -> &str {
        &self.notebook_id
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn notebook(&self) -> Option<&Notebook> {
        self.notebook.as_ref()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn selections(&self) -> &ContextSelections {
        &self.selections
    }

    pub fn panels(&self) -> &PanelState {
        &self.panels
    }
}
