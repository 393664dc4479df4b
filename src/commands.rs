//! CLI command runners.
//!
//! Each runner wires a [`HookContext`] against the configured backend and
//! drives the same hooks, dialogs and page state a UI would, printing
//! results on stdout. Notifications go to the notifier chosen by
//! `--notify` (stderr by default).

use anyhow::{bail, Context, Result};
use std::sync::Arc;

use crate::api::HttpApi;
use crate::cache::QueryCache;
use crate::config::Config;
use crate::context::ContextMode;
use crate::dialog::{EditTarget, EditorDialog, PresetForm, PromptForm};
use crate::hooks::{HookContext, NotebookHooks, PresetHooks, PromptHooks, TransformationHooks};
use crate::models::{
    ExecuteTransformationRequest, SystemPrompt, TransformationCreate, TransformationUpdate,
};
use crate::notify::Notifier;
use crate::page::{NotebookPage, PageStatus};
use crate::panels::{Layout, Panel};
use crate::preset_editor::PresetEditor;

/// Build the hook context for one CLI invocation.
pub fn connect(config: &Config, notifier: Arc<dyn Notifier>) -> Result<HookContext> {
    let api = HttpApi::new(&config.api)
        .with_context(|| format!("Failed to build HTTP client for {}", config.api.base_url))?;
    Ok(HookContext::new(
        Arc::new(api),
        Arc::new(QueryCache::new()),
        notifier,
    ))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

// ============ Prompts ============

pub async fn list_prompts(ctx: HookContext, notebook_id: &str) -> Result<()> {
    let hooks = PromptHooks::new(ctx);
    let Some(prompts) = hooks.prompts(notebook_id).await? else {
        bail!("notebook id must not be empty");
    };
    let active = hooks.active_prompt(notebook_id).await?.map(|p| p.id);

    println!("{:<2} {:<32} {:<24} CONTENT", "", "ID", "NAME");
    for p in &prompts {
        let mark = if active.as_deref() == Some(p.id.as_str()) {
            "*"
        } else {
            ""
        };
        println!(
            "{:<2} {:<32} {:<24} {}",
            mark,
            p.id,
            preview(&p.name, 24),
            preview(&p.content, 48)
        );
    }
    if prompts.is_empty() {
        println!("(no prompts)");
    }
    Ok(())
}

pub async fn get_prompt(ctx: HookContext, prompt_id: &str) -> Result<()> {
    let hooks = PromptHooks::new(ctx);
    match hooks.prompt(prompt_id).await {
        Ok(Some(p)) => print_json(&p),
        Ok(None) => bail!("prompt id must not be empty"),
        Err(e) if e.is_not_found() => bail!("prompt not found: {}", prompt_id),
        Err(e) => Err(e.into()),
    }
}

pub async fn create_prompt(
    ctx: HookContext,
    notebook_id: &str,
    name: &str,
    content: &str,
) -> Result<()> {
    let hooks = PromptHooks::new(ctx);
    let mut dialog = EditorDialog::<PromptForm>::new();
    dialog.open_create();
    if let Some(form) = dialog.form_mut() {
        form.name = name.to_string();
        form.content = content.to_string();
    }
    let created = dialog.submit(&hooks, notebook_id).await?;
    print_json(&created)
}

pub async fn update_prompt(
    ctx: HookContext,
    notebook_id: &str,
    prompt_id: &str,
    name: Option<String>,
    content: Option<String>,
) -> Result<()> {
    let hooks = PromptHooks::new(ctx);
    let mut dialog = EditorDialog::<PromptForm>::new();
    dialog.open_edit(EditTarget::<SystemPrompt>::Summary {
        id: prompt_id.to_string(),
    });
    dialog
        .load_detail(&hooks)
        .await
        .with_context(|| format!("Failed to load prompt {}", prompt_id))?;
    if let Some(form) = dialog.form_mut() {
        if let Some(name) = name {
            form.name = name;
        }
        if let Some(content) = content {
            form.content = content;
        }
    }
    let updated = dialog.submit(&hooks, notebook_id).await?;
    print_json(&updated)
}

pub async fn delete_prompt(ctx: HookContext, notebook_id: &str, prompt_id: &str) -> Result<()> {
    let hooks = PromptHooks::new(ctx);
    hooks.delete_prompt(prompt_id, notebook_id).await?;
    println!("deleted {}", prompt_id);
    Ok(())
}

pub async fn set_active_prompt(
    ctx: HookContext,
    notebook_id: &str,
    prompt_id: Option<&str>,
) -> Result<()> {
    let hooks = PromptHooks::new(ctx);
    let response = hooks.set_active_prompt(notebook_id, prompt_id).await?;
    match response.active_prompt_id {
        Some(id) => println!("active prompt: {}", id),
        None => println!("active prompt: (none)"),
    }
    Ok(())
}

pub async fn show_active_prompt(ctx: HookContext, notebook_id: &str) -> Result<()> {
    let hooks = PromptHooks::new(ctx);
    match hooks.active_prompt(notebook_id).await? {
        Some(p) => print_json(&p),
        None => {
            println!("(no active prompt)");
            Ok(())
        }
    }
}

// ============ Presets ============

pub async fn list_presets(ctx: HookContext) -> Result<()> {
    let hooks = PresetHooks::new(ctx);
    let presets = hooks.presets().await?;
    println!("{:<32} {:<24} INSTRUCTIONS", "ID", "NAME");
    for p in &presets {
        println!(
            "{:<32} {:<24} {}",
            p.prompt_id,
            preview(&p.name, 24),
            preview(&p.transformation_instructions, 48)
        );
    }
    if presets.is_empty() {
        println!("(no presets)");
    }
    Ok(())
}

pub async fn create_preset(ctx: HookContext, name: &str, instructions: &str) -> Result<()> {
    let hooks = PresetHooks::new(ctx);
    let mut dialog = EditorDialog::<PresetForm>::new();
    dialog.open_create();
    if let Some(form) = dialog.form_mut() {
        form.name = name.to_string();
        form.transformation_instructions = instructions.to_string();
    }
    let created = dialog.submit(&hooks).await?;
    print_json(&created)
}

pub async fn update_preset(
    ctx: HookContext,
    preset_id: &str,
    name: Option<String>,
    instructions: Option<String>,
) -> Result<()> {
    let hooks = PresetHooks::new(ctx);
    let mut editor = PresetEditor::new();
    editor.load(&hooks).await?;
    if !editor.select(preset_id) {
        bail!("preset not found: {}", preset_id);
    }
    if let Some(name) = name {
        editor.set_name(name);
    }
    if let Some(instructions) = instructions {
        editor.set_body(instructions);
    }
    let saved = editor.save(&hooks).await?;
    print_json(&saved)
}

pub async fn delete_preset(ctx: HookContext, preset_id: &str) -> Result<()> {
    let hooks = PresetHooks::new(ctx);
    let mut editor = PresetEditor::new();
    editor.load(&hooks).await?;
    if !editor.select(preset_id) {
        bail!("preset not found: {}", preset_id);
    }
    editor.delete_selected(&hooks).await?;
    println!("deleted {}", preset_id);
    match editor.selected() {
        Some(id) => println!("selected: {} ({})", id, editor.name()),
        None => println!("selected: (none)"),
    }
    Ok(())
}

pub async fn show_default_prompt(ctx: HookContext) -> Result<()> {
    let hooks = PresetHooks::new(ctx);
    let mut editor = PresetEditor::new();
    editor.load_default(&hooks).await?;
    println!("{}", editor.default_instructions());
    Ok(())
}

pub async fn set_default_prompt(ctx: HookContext, instructions: &str) -> Result<()> {
    let hooks = PresetHooks::new(ctx);
    let mut editor = PresetEditor::new();
    editor.set_default_instructions(instructions);
    editor.save_default(&hooks).await?;
    println!("{}", editor.default_instructions());
    Ok(())
}

// ============ Transformations ============

pub async fn list_transformations(ctx: HookContext) -> Result<()> {
    let hooks = TransformationHooks::new(ctx);
    let all = hooks.transformations().await?;
    println!("{:<32} {:<20} {:<8} TITLE", "ID", "NAME", "DEFAULT");
    for t in &all {
        println!(
            "{:<32} {:<20} {:<8} {}",
            t.id,
            preview(&t.name, 20),
            t.apply_default,
            preview(&t.title, 40)
        );
    }
    if all.is_empty() {
        println!("(no transformations)");
    }
    Ok(())
}

pub async fn get_transformation(ctx: HookContext, id: &str) -> Result<()> {
    let hooks = TransformationHooks::new(ctx);
    match hooks.transformation(id).await {
        Ok(Some(t)) => print_json(&t),
        Ok(None) => bail!("transformation id must not be empty"),
        Err(e) if e.is_not_found() => bail!("transformation not found: {}", id),
        Err(e) => Err(e.into()),
    }
}

pub async fn create_transformation(ctx: HookContext, request: TransformationCreate) -> Result<()> {
    for (field, value) in [
        ("name", &request.name),
        ("title", &request.title),
        ("prompt", &request.prompt),
    ] {
        if value.trim().is_empty() {
            bail!("{} must not be empty", field);
        }
    }
    let hooks = TransformationHooks::new(ctx);
    let created = hooks.create_transformation(&request).await?;
    print_json(&created)
}

pub async fn update_transformation(
    ctx: HookContext,
    id: &str,
    request: TransformationUpdate,
) -> Result<()> {
    let hooks = TransformationHooks::new(ctx);
    let updated = hooks.update_transformation(id, &request).await?;
    print_json(&updated)
}

pub async fn delete_transformation(ctx: HookContext, id: &str) -> Result<()> {
    let hooks = TransformationHooks::new(ctx);
    hooks.delete_transformation(id).await?;
    println!("deleted {}", id);
    Ok(())
}

pub async fn execute_transformation(
    ctx: HookContext,
    request: ExecuteTransformationRequest,
) -> Result<()> {
    let hooks = TransformationHooks::new(ctx);
    let response = hooks.execute_transformation(&request).await?;
    println!("{}", response.output);
    Ok(())
}

// ============ Notebook context ============

/// Options for `nbc context`.
pub struct ContextOptions {
    /// `kind:id=mode` overrides, where kind is `source` or `note`.
    pub overrides: Vec<String>,
    pub hide: Vec<String>,
    pub build: bool,
}

pub async fn show_context(ctx: HookContext, notebook_id: &str, opts: ContextOptions) -> Result<()> {
    let hooks = NotebookHooks::new(ctx);
    let mut page = NotebookPage::new(notebook_id, Layout::Extended);

    if page.refresh(&hooks).await? == PageStatus::NotFound {
        println!("Notebook not found: {}", notebook_id);
        return Ok(());
    }

    for raw in &opts.overrides {
        apply_override(&mut page, raw)?;
    }
    for name in &opts.hide {
        let panel = Panel::parse(name).with_context(|| format!("unknown panel: {}", name))?;
        page.toggle_panel(panel);
    }

    if let Some(nb) = page.notebook() {
        println!("Notebook: {} ({})", nb.name, nb.id);
    }
    println!();
    println!("{:<8} {:<32} {:<10} TITLE", "KIND", "ID", "MODE");
    let selections = page.selections();
    for s in page.sources() {
        let mode = selections.source_mode(&s.id).unwrap_or(ContextMode::Off);
        println!(
            "{:<8} {:<32} {:<10} {}",
            "source",
            s.id,
            mode,
            s.title.as_deref().unwrap_or("")
        );
    }
    for n in page.notes() {
        let mode = selections.note_mode(&n.id).unwrap_or(ContextMode::Off);
        println!(
            "{:<8} {:<32} {:<10} {}",
            "note",
            n.id,
            mode,
            n.title.as_deref().unwrap_or("")
        );
    }
    println!();
    let open: Vec<String> = page
        .panels()
        .open_panels()
        .iter()
        .map(|p| p.to_string())
        .collect();
    println!(
        "panels: {} (grid span {})",
        if open.is_empty() {
            "(none)".to_string()
        } else {
            open.join(", ")
        },
        page.panels().grid_span()
    );

    if opts.build {
        let built = page.build_context(&hooks).await?;
        println!(
            "context: {} chars, ~{} tokens",
            built.char_count, built.token_count
        );
        print_json(&built.context)?;
    }
    Ok(())
}

fn apply_override(page: &mut NotebookPage, raw: &str) -> Result<()> {
    let (target, mode) = raw
        .rsplit_once('=')
        .with_context(|| format!("invalid override '{}': expected kind:id=mode", raw))?;
    let (kind, id) = target
        .split_once(':')
        .with_context(|| format!("invalid override '{}': expected kind:id=mode", raw))?;
    let mode =
        ContextMode::parse(mode).with_context(|| format!("unknown context mode: {}", mode))?;
    match kind {
        "source" => {
            if !page.sources().iter().any(|s| s.id == id) {
                bail!("source {} is not in this notebook", id);
            }
            page.set_source_mode(id, mode)
        }
        "note" => {
            if !page.notes().iter().any(|n| n.id == id) {
                bail!("note {} is not in this notebook", id);
            }
            if !page.set_note_mode(id, mode) {
                bail!("notes accept only 'off' or 'full'");
            }
        }
        other => bail!("unknown item kind '{}': expected source or note", other),
    }
    Ok(())
}
