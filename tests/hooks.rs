//! Hook, dialog and page behavior against an in-memory backend.
//!
//! `FakeBackend` implements `NotebookApi` over plain vectors and records
//! every call, so these tests can count side effects and check cache
//! bookkeeping without a network.

use async_trait::async_trait;
use notebook_client::api::NotebookApi;
use notebook_client::cache::{CacheEvent, QueryCache, QueryKey};
use notebook_client::context::ContextMode;
use notebook_client::dialog::{DialogState, EditTarget, EditorDialog, PresetForm, PromptForm};
use notebook_client::error::{ClientError, ClientResult};
use notebook_client::hooks::{
    HookContext, NotebookHooks, PresetHooks, PromptHooks, TransformationHooks,
};
use notebook_client::models::*;
use notebook_client::notify::{NotificationKind, RecordingNotifier};
use notebook_client::page::{NotebookPage, PageStatus};
use notebook_client::panels::{Layout, Panel};
use notebook_client::preset_editor::PresetEditor;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

// ─── Fake backend ───────────────────────────────────────────────────

#[derive(Default)]
struct BackendState {
    notebooks: Vec<Notebook>,
    sources: HashMap<String, Vec<Source>>,
    notes: HashMap<String, Vec<Note>>,
    /// (notebook id, prompt)
    prompts: Vec<(String, SystemPrompt)>,
    active: HashMap<String, String>,
    presets: Vec<PromptPreset>,
    default_prompt: String,
    transformations: Vec<Transformation>,
    calls: Vec<String>,
    next_id: u32,
    fail_writes: bool,
    fail_preset_list: bool,
}

struct FakeBackend {
    state: Mutex<BackendState>,
    /// When set, `delete_preset` waits for a permit before answering.
    delete_gate: Option<Arc<Semaphore>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            state: Mutex::new(BackendState::default()),
            delete_gate: None,
        }
    }

    fn with_state(f: impl FnOnce(&mut BackendState)) -> Self {
        let backend = Self::new();
        f(&mut *backend.state.lock().unwrap());
        backend
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    fn record(&self, call: &str) -> std::sync::MutexGuard<'_, BackendState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        state
    }

    fn write(&self, call: &str) -> ClientResult<std::sync::MutexGuard<'_, BackendState>> {
        let state = self.record(call);
        if state.fail_writes {
            return Err(ClientError::Status {
                status: 500,
                message: "database is locked".into(),
            });
        }
        Ok(state)
    }
}

fn fresh_id(state: &mut BackendState, table: &str) -> String {
    state.next_id += 1;
    format!("{}:{}", table, state.next_id)
}

#[async_trait]
impl NotebookApi for FakeBackend {
    async fn list_prompts(&self, notebook_id: &str) -> ClientResult<Vec<SystemPrompt>> {
        let state = self.record("list_prompts");
        Ok(state
            .prompts
            .iter()
            .filter(|(nb, _)| nb == notebook_id)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn get_prompt(&self, prompt_id: &str) -> ClientResult<SystemPrompt> {
        let state = self.record("get_prompt");
        state
            .prompts
            .iter()
            .find(|(_, p)| p.id == prompt_id)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| ClientError::NotFound("prompt".into()))
    }

    async fn create_prompt(&self, request: &CreatePromptRequest) -> ClientResult<SystemPrompt> {
        let mut state = self.write("create_prompt")?;
        let prompt = SystemPrompt {
            id: fresh_id(&mut state, "system_prompt"),
            name: request.name.clone(),
            content: request.content.clone(),
            created: String::new(),
            updated: String::new(),
            notebook_id: None,
        };
        state
            .prompts
            .push((request.notebook_id.clone(), prompt.clone()));
        Ok(prompt)
    }

    async fn update_prompt(
        &self,
        prompt_id: &str,
        request: &UpdatePromptRequest,
    ) -> ClientResult<SystemPrompt> {
        let mut state = self.write("update_prompt")?;
        let (_, prompt) = state
            .prompts
            .iter_mut()
            .find(|(_, p)| p.id == prompt_id)
            .ok_or_else(|| ClientError::NotFound("prompt".into()))?;
        if let Some(name) = &request.name {
            prompt.name = name.clone();
        }
        if let Some(content) = &request.content {
            prompt.content = content.clone();
        }
        Ok(prompt.clone())
    }

    async fn delete_prompt(&self, prompt_id: &str) -> ClientResult<()> {
        let mut state = self.write("delete_prompt")?;
        state.prompts.retain(|(_, p)| p.id != prompt_id);
        Ok(())
    }

    async fn get_active_prompt(&self, notebook_id: &str) -> ClientResult<Option<SystemPrompt>> {
        let state = self.record("get_active_prompt");
        let Some(id) = state.active.get(notebook_id) else {
            return Ok(None);
        };
        Ok(state
            .prompts
            .iter()
            .find(|(_, p)| &p.id == id)
            .map(|(_, p)| p.clone()))
    }

    async fn set_active_prompt(
        &self,
        notebook_id: &str,
        prompt_id: Option<&str>,
    ) -> ClientResult<ActivePromptResponse> {
        let mut state = self.write("set_active_prompt")?;
        match prompt_id {
            Some(id) => {
                state.active.insert(notebook_id.to_string(), id.to_string());
            }
            None => {
                state.active.remove(notebook_id);
            }
        }
        Ok(ActivePromptResponse {
            message: "ok".into(),
            active_prompt_id: prompt_id.map(str::to_string),
        })
    }

    async fn list_transformations(&self) -> ClientResult<Vec<Transformation>> {
        Ok(self.record("list_transformations").transformations.clone())
    }

    async fn get_transformation(&self, id: &str) -> ClientResult<Transformation> {
        let state = self.record("get_transformation");
        state
            .transformations
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("transformation".into()))
    }

    async fn create_transformation(
        &self,
        request: &TransformationCreate,
    ) -> ClientResult<Transformation> {
        let mut state = self.write("create_transformation")?;
        let t = Transformation {
            id: fresh_id(&mut state, "transformation"),
            name: request.name.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            prompt: request.prompt.clone(),
            apply_default: request.apply_default,
            created: String::new(),
            updated: String::new(),
        };
        state.transformations.push(t.clone());
        Ok(t)
    }

    async fn update_transformation(
        &self,
        id: &str,
        request: &TransformationUpdate,
    ) -> ClientResult<Transformation> {
        let mut state = self.write("update_transformation")?;
        let t = state
            .transformations
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ClientError::NotFound("transformation".into()))?;
        if let Some(title) = &request.title {
            t.title = title.clone();
        }
        Ok(t.clone())
    }

    async fn delete_transformation(&self, id: &str) -> ClientResult<()> {
        let mut state = self.write("delete_transformation")?;
        state.transformations.retain(|t| t.id != id);
        Ok(())
    }

    async fn execute_transformation(
        &self,
        request: &ExecuteTransformationRequest,
    ) -> ClientResult<ExecuteTransformationResponse> {
        self.write("execute_transformation")?;
        Ok(ExecuteTransformationResponse {
            output: request.input_text.to_uppercase(),
            transformation_id: request.transformation_id.clone(),
            model_id: request.model_id.clone(),
        })
    }

    async fn list_presets(&self) -> ClientResult<Vec<PromptPreset>> {
        let state = self.record("list_presets");
        if state.fail_preset_list {
            return Err(ClientError::Status {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(state.presets.clone())
    }

    async fn create_preset(&self, request: &PresetRequest) -> ClientResult<PromptPreset> {
        let mut state = self.write("create_preset")?;
        let preset = preset(
            &fresh_id(&mut state, "prompt"),
            &request.name,
            &request.transformation_instructions,
        );
        state.presets.push(preset.clone());
        Ok(preset)
    }

    async fn update_preset(&self, id: &str, request: &PresetRequest) -> ClientResult<PromptPreset> {
        let mut state = self.write("update_preset")?;
        let p = state
            .presets
            .iter_mut()
            .find(|p| p.prompt_id == id)
            .ok_or_else(|| ClientError::NotFound("preset".into()))?;
        p.name = request.name.clone();
        p.transformation_instructions = request.transformation_instructions.clone();
        Ok(p.clone())
    }

    async fn delete_preset(&self, id: &str) -> ClientResult<()> {
        if let Some(gate) = &self.delete_gate {
            let _permit = gate.acquire().await.unwrap();
        }
        let mut state = self.write("delete_preset")?;
        state.presets.retain(|p| p.prompt_id != id);
        Ok(())
    }

    async fn get_default_prompt(&self) -> ClientResult<DefaultPrompt> {
        let state = self.record("get_default_prompt");
        Ok(DefaultPrompt {
            transformation_instructions: state.default_prompt.clone(),
        })
    }

    async fn update_default_prompt(&self, request: &DefaultPrompt) -> ClientResult<DefaultPrompt> {
        let mut state = self.write("update_default_prompt")?;
        state.default_prompt = request.transformation_instructions.clone();
        Ok(request.clone())
    }

    async fn get_notebook(&self, notebook_id: &str) -> ClientResult<Notebook> {
        let state = self.record("get_notebook");
        state
            .notebooks
            .iter()
            .find(|n| n.id == notebook_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("notebook".into()))
    }

    async fn list_sources(&self, notebook_id: &str) -> ClientResult<Vec<Source>> {
        let state = self.record("list_sources");
        Ok(state.sources.get(notebook_id).cloned().unwrap_or_default())
    }

    async fn list_notes(&self, notebook_id: &str) -> ClientResult<Vec<Note>> {
        let state = self.record("list_notes");
        Ok(state.notes.get(notebook_id).cloned().unwrap_or_default())
    }

    async fn build_context(
        &self,
        request: &BuildContextRequest,
    ) -> ClientResult<BuildContextResponse> {
        self.record("build_context");
        Ok(BuildContextResponse {
            context: request.context_config.clone(),
            token_count: 0,
            char_count: 0,
        })
    }
}

// ─── Fixtures ───────────────────────────────────────────────────────

fn preset(id: &str, name: &str, body: &str) -> PromptPreset {
    PromptPreset {
        prompt_id: id.to_string(),
        name: name.to_string(),
        transformation_instructions: body.to_string(),
        created: String::new(),
        updated: String::new(),
    }
}

fn prompt(id: &str, name: &str) -> SystemPrompt {
    SystemPrompt {
        id: id.to_string(),
        name: name.to_string(),
        content: format!("{} content", name),
        created: String::new(),
        updated: String::new(),
        notebook_id: None,
    }
}

fn notebook(id: &str) -> Notebook {
    Notebook {
        id: id.to_string(),
        name: "Research".to_string(),
        description: String::new(),
        archived: false,
        created: String::new(),
        updated: String::new(),
        source_count: 0,
        note_count: 0,
    }
}

fn source(id: &str, insights: u64) -> Source {
    Source {
        id: id.to_string(),
        title: Some(id.to_string()),
        insights_count: insights,
        embedded: true,
        created: String::new(),
        updated: String::new(),
    }
}

fn note(id: &str) -> Note {
    Note {
        id: id.to_string(),
        title: None,
        note_type: Some("human".to_string()),
        created: String::new(),
        updated: String::new(),
    }
}

struct Harness {
    backend: Arc<FakeBackend>,
    cache: Arc<QueryCache>,
    notifier: Arc<RecordingNotifier>,
    ctx: HookContext,
}

fn harness(backend: FakeBackend) -> Harness {
    let backend = Arc::new(backend);
    let cache = Arc::new(QueryCache::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let ctx = HookContext::new(backend.clone(), cache.clone(), notifier.clone());
    Harness {
        backend,
        cache,
        notifier,
        ctx,
    }
}

// ─── Queries ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_query_served_from_cache_until_invalidated() {
    let h = harness(FakeBackend::with_state(|s| {
        s.prompts.push(("nb1".into(), prompt("p1", "Reviewer")));
    }));
    let hooks = PromptHooks::new(h.ctx.clone());

    let first = hooks.prompts("nb1").await.unwrap().unwrap();
    let second = hooks.prompts("nb1").await.unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].notebook_id.as_deref(), Some("nb1"));
    assert_eq!(h.backend.count("list_prompts"), 1);

    h.cache.invalidate(&[QueryKey::Prompts("nb1".into())]);
    hooks.prompts("nb1").await.unwrap();
    assert_eq!(h.backend.count("list_prompts"), 2);
}

#[tokio::test]
async fn test_blank_id_disables_query() {
    let h = harness(FakeBackend::new());
    let prompts = PromptHooks::new(h.ctx.clone());
    let notebook = NotebookHooks::new(h.ctx.clone());

    assert_eq!(prompts.prompts("").await.unwrap(), None);
    assert_eq!(prompts.prompt("  ").await.unwrap(), None);
    assert_eq!(prompts.active_prompt("").await.unwrap(), None);
    assert_eq!(notebook.sources("").await.unwrap(), None);
    assert!(h.backend.calls().is_empty());
    assert!(h.cache.is_empty());
}

#[tokio::test]
async fn test_read_failure_raises_no_notification() {
    let h = harness(FakeBackend::new());
    let hooks = PromptHooks::new(h.ctx.clone());
    let err = hooks.prompt("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(h.notifier.notifications().is_empty());
}

// ─── Mutations and invalidation ─────────────────────────────────────

#[tokio::test]
async fn test_create_prompt_invalidates_only_its_notebook() {
    let h = harness(FakeBackend::new());
    let hooks = PromptHooks::new(h.ctx.clone());
    hooks.prompts("nb1").await.unwrap();
    hooks.prompts("nb2").await.unwrap();
    let mut events = h.cache.subscribe();

    let created = hooks.create_prompt("nb1", "Reviewer", "Review code.").await.unwrap();
    assert_eq!(created.notebook_id.as_deref(), Some("nb1"));

    assert!(!h.cache.is_fresh(&QueryKey::Prompts("nb1".into())));
    assert!(h.cache.is_fresh(&QueryKey::Prompts("nb2".into())));
    assert_eq!(
        events.try_recv().unwrap(),
        CacheEvent::Invalidated(QueryKey::Prompts("nb1".into()))
    );
    assert!(events.try_recv().is_err());

    let refreshed = hooks.prompts("nb1").await.unwrap().unwrap();
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].name, "Reviewer");
}

#[tokio::test]
async fn test_update_prompt_invalidates_detail_list_and_active() {
    let h = harness(FakeBackend::with_state(|s| {
        s.prompts.push(("nb1".into(), prompt("p1", "Reviewer")));
        s.prompts.push(("nb2".into(), prompt("p2", "Editor")));
        s.active.insert("nb1".into(), "p1".into());
    }));
    let hooks = PromptHooks::new(h.ctx.clone());
    hooks.prompt("p1").await.unwrap();
    hooks.prompts("nb1").await.unwrap();
    hooks.prompts("nb2").await.unwrap();
    let active = hooks.active_prompt("nb1").await.unwrap().unwrap();
    assert_eq!(active.name, "Reviewer");
    let mut events = h.cache.subscribe();

    let request = UpdatePromptRequest {
        name: Some("Critic".into()),
        content: None,
    };
    hooks.update_prompt("p1", "nb1", &request).await.unwrap();

    for key in [
        QueryKey::Prompt("p1".into()),
        QueryKey::Prompts("nb1".into()),
        QueryKey::ActivePrompt("nb1".into()),
    ] {
        assert!(!h.cache.is_fresh(&key), "{} should be stale", key);
        assert_eq!(events.try_recv().unwrap(), CacheEvent::Invalidated(key));
    }
    assert!(events.try_recv().is_err());
    assert!(h.cache.is_fresh(&QueryKey::Prompts("nb2".into())));

    let active = hooks.active_prompt("nb1").await.unwrap().unwrap();
    assert_eq!(active.name, "Critic");
}

#[tokio::test]
async fn test_set_active_prompt_invalidates_notebook() {
    let h = harness(FakeBackend::with_state(|s| {
        s.notebooks.push(notebook("nb1"));
        s.prompts.push(("nb1".into(), prompt("p1", "Reviewer")));
    }));
    let prompts = PromptHooks::new(h.ctx.clone());
    let notebooks = NotebookHooks::new(h.ctx.clone());
    notebooks.notebook("nb1").await.unwrap();
    assert_eq!(prompts.active_prompt("nb1").await.unwrap(), None);

    let response = prompts.set_active_prompt("nb1", Some("p1")).await.unwrap();
    assert_eq!(response.active_prompt_id.as_deref(), Some("p1"));
    assert!(!h.cache.is_fresh(&QueryKey::Notebook("nb1".into())));
    assert!(!h.cache.is_fresh(&QueryKey::ActivePrompt("nb1".into())));
    assert_eq!(
        prompts.active_prompt("nb1").await.unwrap().map(|p| p.id),
        Some("p1".to_string())
    );

    prompts.set_active_prompt("nb1", None).await.unwrap();
    assert_eq!(prompts.active_prompt("nb1").await.unwrap(), None);
    assert_eq!(h.notifier.last().unwrap().title, "Active prompt cleared");
}

#[tokio::test]
async fn test_transformation_mutations_invalidate_list_and_detail() {
    let h = harness(FakeBackend::new());
    let hooks = TransformationHooks::new(h.ctx.clone());
    let created = hooks
        .create_transformation(&TransformationCreate {
            name: "summary".into(),
            title: "Summary".into(),
            description: String::new(),
            prompt: "Summarize.".into(),
            apply_default: false,
        })
        .await
        .unwrap();
    assert_eq!(hooks.transformations().await.unwrap().len(), 1);
    hooks.transformation(&created.id).await.unwrap();

    let update = TransformationUpdate {
        title: Some("Short summary".into()),
        ..Default::default()
    };
    hooks.update_transformation(&created.id, &update).await.unwrap();
    assert!(!h.cache.is_fresh(&QueryKey::Transformations));
    assert!(!h.cache.is_fresh(&QueryKey::Transformation(created.id.clone())));
    let fetched = hooks.transformation(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, "Short summary");
}

#[tokio::test]
async fn test_execute_transformation_leaves_cache_alone() {
    let h = harness(FakeBackend::new());
    let hooks = TransformationHooks::new(h.ctx.clone());
    hooks.transformations().await.unwrap();

    let response = hooks
        .execute_transformation(&ExecuteTransformationRequest {
            transformation_id: "transformation:1".into(),
            input_text: "hello".into(),
            model_id: "model:1".into(),
        })
        .await
        .unwrap();
    assert_eq!(response.output, "HELLO");
    assert!(h.cache.is_fresh(&QueryKey::Transformations));
    assert!(!hooks.is_executing());
}

#[tokio::test]
async fn test_failed_mutation_notifies_generically_and_keeps_cache() {
    let h = harness(FakeBackend::new());
    let hooks = PromptHooks::new(h.ctx.clone());
    hooks.prompts("nb1").await.unwrap();
    h.backend.fail_writes(true);

    let err = hooks.create_prompt("nb1", "Reviewer", "Review.").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));
    assert!(h.cache.is_fresh(&QueryKey::Prompts("nb1".into())));

    let n = h.notifier.last().unwrap();
    assert_eq!(n.kind, NotificationKind::Failure);
    assert_eq!(n.title, "Failed to create prompt");
    assert_eq!(n.description, "Please try again.");
    assert!(!n.description.contains("database"));
    assert!(!hooks.is_creating());
}

#[tokio::test]
async fn test_same_mutation_in_flight_is_rejected() {
    let gate = Arc::new(Semaphore::new(0));
    let mut backend = FakeBackend::with_state(|s| {
        s.presets.push(preset("prompt:1", "Brief", "Be brief."));
    });
    backend.delete_gate = Some(gate.clone());
    let h = harness(backend);
    let hooks = PresetHooks::new(h.ctx.clone());

    let first = hooks.delete_preset("prompt:1");
    let second = async {
        while !hooks.is_deleting() {
            tokio::task::yield_now().await;
        }
        let result = hooks.delete_preset("prompt:1").await;
        gate.add_permits(1);
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    assert!(matches!(second, Err(ClientError::MutationPending("delete preset"))));
    assert_eq!(h.backend.count("delete_preset"), 1);
    assert_eq!(h.notifier.notifications().len(), 1);
    assert!(!hooks.is_deleting());
}

// ─── Prompt dialog ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_prompt_through_dialog() {
    let h = harness(FakeBackend::new());
    let hooks = PromptHooks::new(h.ctx.clone());
    let mut dialog = EditorDialog::<PromptForm>::new();

    dialog.open_create();
    let form = dialog.form_mut().unwrap();
    form.name = "Reviewer".into();
    form.content = "Review code.".into();
    let created = dialog.submit(&hooks, "nb1").await.unwrap();

    assert_eq!(created.name, "Reviewer");
    assert_eq!(h.backend.count("create_prompt"), 1);
    assert_eq!(dialog.state(), &DialogState::Closed);
    assert_eq!(dialog.form(), &PromptForm::default());
    assert_eq!(h.notifier.last().unwrap().title, "Prompt created");
}

#[tokio::test]
async fn test_empty_content_never_reaches_backend() {
    let h = harness(FakeBackend::new());
    let hooks = PromptHooks::new(h.ctx.clone());
    let mut dialog = EditorDialog::<PromptForm>::new();

    dialog.open_create();
    dialog.form_mut().unwrap().name = "Reviewer".into();
    let err = dialog.submit(&hooks, "nb1").await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert!(h.backend.calls().is_empty());
    assert_eq!(dialog.state(), &DialogState::Create);
    assert_eq!(dialog.form().name, "Reviewer");
}

#[tokio::test]
async fn test_failed_submit_keeps_dialog_open() {
    let h = harness(FakeBackend::new());
    h.backend.fail_writes(true);
    let hooks = PromptHooks::new(h.ctx.clone());
    let mut dialog = EditorDialog::<PromptForm>::new();

    dialog.open_create();
    let form = dialog.form_mut().unwrap();
    form.name = "Reviewer".into();
    form.content = "Review code.".into();
    assert!(dialog.submit(&hooks, "nb1").await.is_err());

    assert_eq!(dialog.state(), &DialogState::Create);
    assert_eq!(dialog.form().content, "Review code.");
    assert!(dialog.can_submit());
}

#[tokio::test]
async fn test_edit_from_summary_loads_detail_then_updates() {
    let h = harness(FakeBackend::with_state(|s| {
        s.prompts.push(("nb1".into(), prompt("p1", "Reviewer")));
    }));
    let hooks = PromptHooks::new(h.ctx.clone());
    let mut dialog = EditorDialog::<PromptForm>::new();

    dialog.open_edit(EditTarget::Summary { id: "p1".into() });
    assert!(!dialog.can_submit());
    dialog.load_detail(&hooks).await.unwrap();
    assert_eq!(dialog.state(), &DialogState::Edit { id: "p1".into() });
    assert_eq!(dialog.form().name, "Reviewer");

    dialog.form_mut().unwrap().content = "Be strict.".into();
    let updated = dialog.submit(&hooks, "nb1").await.unwrap();
    assert_eq!(updated.content, "Be strict.");
    assert_eq!(h.backend.count("update_prompt"), 1);
    assert_eq!(dialog.state(), &DialogState::Closed);
}

#[tokio::test]
async fn test_missing_detail_closes_dialog() {
    let h = harness(FakeBackend::new());
    let hooks = PromptHooks::new(h.ctx.clone());
    let mut dialog = EditorDialog::<PromptForm>::new();

    dialog.open_edit(EditTarget::Summary { id: "gone".into() });
    let err = dialog.load_detail(&hooks).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!dialog.is_open());
}

#[tokio::test]
async fn test_preset_dialog_creates_preset() {
    let h = harness(FakeBackend::new());
    let hooks = PresetHooks::new(h.ctx.clone());
    let mut dialog = EditorDialog::<PresetForm>::new();

    dialog.open_create();
    let form = dialog.form_mut().unwrap();
    form.name = "Brief".into();
    form.transformation_instructions = "Be brief.".into();
    dialog.submit(&hooks).await.unwrap();

    assert_eq!(hooks.presets().await.unwrap().len(), 1);
    assert!(!dialog.is_open());
}

// ─── Preset editor ──────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_selected_moves_to_first_remaining() {
    let h = harness(FakeBackend::with_state(|s| {
        s.presets.push(preset("prompt:a", "A", "Alpha"));
        s.presets.push(preset("prompt:b", "B", "Beta"));
    }));
    let hooks = PresetHooks::new(h.ctx.clone());
    let mut editor = PresetEditor::new();
    editor.load(&hooks).await.unwrap();
    assert_eq!(editor.selected(), Some("prompt:a"));

    editor.delete_selected(&hooks).await.unwrap();
    assert_eq!(editor.selected(), Some("prompt:b"));
    assert_eq!(editor.name(), "B");
    assert_eq!(editor.body(), "Beta");

    editor.delete_selected(&hooks).await.unwrap();
    assert_eq!(editor.selected(), None);
    assert_eq!(editor.name(), "");
    assert_eq!(editor.body(), "");
    assert_eq!(h.backend.count("delete_preset"), 2);
}

#[tokio::test]
async fn test_save_without_selection_creates() {
    let h = harness(FakeBackend::new());
    let hooks = PresetHooks::new(h.ctx.clone());
    let mut editor = PresetEditor::new();
    editor.load(&hooks).await.unwrap();

    editor.set_name("Brief");
    editor.set_body("Be brief.");
    let saved = editor.save(&hooks).await.unwrap();
    assert_eq!(editor.selected(), Some(saved.prompt_id.as_str()));
    assert_eq!(editor.presets().len(), 1);

    editor.set_body("Be very brief.");
    editor.save(&hooks).await.unwrap();
    assert_eq!(h.backend.count("create_preset"), 1);
    assert_eq!(h.backend.count("update_preset"), 1);
    assert_eq!(editor.body(), "Be very brief.");
}

#[tokio::test]
async fn test_save_succeeds_when_list_refresh_fails() {
    let h = harness(FakeBackend::with_state(|s| {
        s.presets.push(preset("prompt:a", "A", "Alpha"));
    }));
    let hooks = PresetHooks::new(h.ctx.clone());
    let mut editor = PresetEditor::new();
    editor.load(&hooks).await.unwrap();
    h.backend.state.lock().unwrap().fail_preset_list = true;

    editor.set_body("Alpha, revised");
    let updated = editor.save(&hooks).await.unwrap();
    assert_eq!(updated.transformation_instructions, "Alpha, revised");
    assert_eq!(editor.presets()[0].transformation_instructions, "Alpha, revised");

    editor.clear_selection();
    editor.set_name("B");
    editor.set_body("Beta");
    let created = editor.save(&hooks).await.unwrap();
    assert_eq!(editor.selected(), Some(created.prompt_id.as_str()));
    assert_eq!(editor.presets().len(), 2);
    assert_eq!(editor.name(), "B");

    assert_eq!(h.backend.count("create_preset"), 1);
    assert_eq!(h.backend.count("update_preset"), 1);
    assert!(h.notifier.notifications().iter().all(|n| !n.is_failure()));
}

#[tokio::test]
async fn test_default_prompt_round_trip() {
    let h = harness(FakeBackend::with_state(|s| {
        s.default_prompt = "Be helpful.".into();
    }));
    let hooks = PresetHooks::new(h.ctx.clone());
    let mut editor = PresetEditor::new();

    editor.load_default(&hooks).await.unwrap();
    assert_eq!(editor.default_instructions(), "Be helpful.");
    editor.set_default_instructions("Be precise.");
    editor.save_default(&hooks).await.unwrap();

    assert!(!h.cache.is_fresh(&QueryKey::DefaultPrompt));
    assert_eq!(
        hooks.default_prompt().await.unwrap().transformation_instructions,
        "Be precise."
    );
}

// ─── Notebook page ──────────────────────────────────────────────────

#[tokio::test]
async fn test_page_reconciles_on_refresh() {
    let h = harness(FakeBackend::with_state(|s| {
        s.notebooks.push(notebook("nb1"));
        s.sources
            .insert("nb1".into(), vec![source("source:1", 0), source("source:2", 4)]);
        s.notes.insert("nb1".into(), vec![note("note:1")]);
    }));
    let hooks = NotebookHooks::new(h.ctx.clone());
    let mut page = NotebookPage::new("nb1", Layout::Extended);

    assert_eq!(page.refresh(&hooks).await.unwrap(), PageStatus::Ready);
    assert_eq!(page.selections().source_mode("source:1"), Some(ContextMode::Full));
    assert_eq!(page.selections().source_mode("source:2"), Some(ContextMode::Insights));
    assert_eq!(page.selections().note_mode("note:1"), Some(ContextMode::Full));

    page.set_source_mode("source:1", ContextMode::Off);
    h.backend
        .state
        .lock()
        .unwrap()
        .sources
        .get_mut("nb1")
        .unwrap()
        .push(source("source:3", 1));
    h.cache.invalidate(&[QueryKey::Sources("nb1".into())]);
    page.refresh(&hooks).await.unwrap();

    assert_eq!(page.sources().len(), 3);
    assert_eq!(page.selections().source_mode("source:1"), Some(ContextMode::Off));
    assert_eq!(page.selections().source_mode("source:3"), Some(ContextMode::Insights));
}

#[tokio::test]
async fn test_missing_notebook_renders_not_found() {
    let h = harness(FakeBackend::new());
    let hooks = NotebookHooks::new(h.ctx.clone());

    let mut page = NotebookPage::new("notebook:missing", Layout::Standard);
    assert_eq!(page.refresh(&hooks).await.unwrap(), PageStatus::NotFound);
    assert!(page.notebook().is_none());

    let mut blank = NotebookPage::new("", Layout::Standard);
    assert_eq!(blank.refresh(&hooks).await.unwrap(), PageStatus::NotFound);
    assert_eq!(h.backend.count("get_notebook"), 1);
}

#[tokio::test]
async fn test_build_context_sends_selections() {
    let h = harness(FakeBackend::with_state(|s| {
        s.notebooks.push(notebook("nb1"));
        s.sources.insert("nb1".into(), vec![source("source:1", 2)]);
        s.notes.insert("nb1".into(), vec![note("note:1")]);
    }));
    let hooks = NotebookHooks::new(h.ctx.clone());
    let mut page = NotebookPage::new("nb1", Layout::Extended);
    page.refresh(&hooks).await.unwrap();
    assert!(page.set_note_mode("note:1", ContextMode::Off));

    let built = page.build_context(&hooks).await.unwrap();
    assert_eq!(built.context["sources"]["source:1"], "insights");
    assert_eq!(built.context["notes"]["note:1"], "not in context");
}

#[tokio::test]
async fn test_removed_source_left_out_of_context() {
    let h = harness(FakeBackend::with_state(|s| {
        s.notebooks.push(notebook("nb1"));
        s.sources
            .insert("nb1".into(), vec![source("source:1", 0), source("source:2", 0)]);
    }));
    let hooks = NotebookHooks::new(h.ctx.clone());
    let mut page = NotebookPage::new("nb1", Layout::Extended);
    page.refresh(&hooks).await.unwrap();

    h.backend
        .state
        .lock()
        .unwrap()
        .sources
        .insert("nb1".into(), vec![source("source:2", 0)]);
    page.reload(&hooks).await.unwrap();

    let built = page.build_context(&hooks).await.unwrap();
    assert!(built.context["sources"].get("source:1").is_none());
    assert_eq!(built.context["sources"]["source:2"], "full content");
    assert_eq!(page.selections().tracked_sources(), 2);
}

#[tokio::test]
async fn test_reload_refetches_collections() {
    let h = harness(FakeBackend::with_state(|s| {
        s.notebooks.push(notebook("nb1"));
        s.notes.insert("nb1".into(), vec![note("note:1")]);
    }));
    let hooks = NotebookHooks::new(h.ctx.clone());
    let mut page = NotebookPage::new("nb1", Layout::Standard);
    page.refresh(&hooks).await.unwrap();

    h.backend
        .state
        .lock()
        .unwrap()
        .notes
        .get_mut("nb1")
        .unwrap()
        .push(note("note:2"));
    page.refresh(&hooks).await.unwrap();
    assert_eq!(page.notes().len(), 1);
    assert_eq!(h.backend.count("list_notes"), 1);

    page.reload(&hooks).await.unwrap();
    assert_eq!(page.notes().len(), 2);
    assert_eq!(page.selections().note_mode("note:2"), Some(ContextMode::Full));
    assert_eq!(h.backend.count("list_notes"), 2);
    assert_eq!(h.backend.count("get_notebook"), 2);
}

#[tokio::test]
async fn test_page_panels_drive_grid_span() {
    let mut page = NotebookPage::new("nb1", Layout::Extended);
    assert_eq!(page.panels().grid_span(), 4);
    assert_eq!(page.toggle_panel(Panel::Chat), Some(false));
    assert_eq!(page.toggle_panel(Panel::Prompts), Some(false));
    assert_eq!(page.panels().grid_span(), 2);
    assert!(page.panels().is_open(Panel::Sources));
}
