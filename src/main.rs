//! # Notebook client CLI (`nbc`)
//!
//! The `nbc` binary drives the notebook client layer from a terminal: it
//! manages system prompts, prompt presets and transformations through the
//! same hooks a UI uses, shows the context selections of a notebook page,
//! and serves the runtime configuration endpoint for the web frontend.
//!
//! ## Usage
//!
//! ```bash
//! nbc --config ./config/nbc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `nbc serve` | Start the runtime config server (`GET /config`) |
//! | `nbc prompts <action>` | List, create, update, delete and activate notebook prompts |
//! | `nbc presets <action>` | Manage transformation prompt presets |
//! | `nbc default-prompt <action>` | Show or replace the default transformation prompt |
//! | `nbc transformations <action>` | Manage and execute transformations |
//! | `nbc context <notebook>` | Show (and optionally build) a notebook's chat context |
//!
//! ## Examples
//!
//! ```bash
//! # Create a system prompt in a notebook
//! nbc prompts create notebook:abc --name Reviewer --content "Review code."
//!
//! # Make it the active prompt
//! nbc prompts activate notebook:abc system_prompt:xyz
//!
//! # Exclude a source from chat context and assemble the context
//! nbc context notebook:abc --set source:source:123=off --build
//! ```

mod api;
mod cache;
mod commands;
mod config;
mod context;
mod dialog;
mod error;
mod hooks;
mod models;
mod notify;
mod page;
mod panels;
mod preset_editor;
mod server;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::models::{ExecuteTransformationRequest, TransformationCreate, TransformationUpdate};
use crate::notify::{Notifier, NotifyMode};

/// Notebook client: prompts, presets, transformations and notebook context
/// against a notebook backend.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file falls back to built-in defaults.
#[derive(Parser)]
#[command(
    name = "nbc",
    about = "Notebook client: prompts, presets, transformations and notebook context",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/nbc.toml")]
    config: PathBuf,

    /// Notification output: `human`, `json` or `log`.
    ///
    /// Defaults to `human` when stderr is a terminal, otherwise `log`.
    #[arg(long, global = true)]
    notify: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the runtime config server.
    ///
    /// Serves `GET /config` with the API URL the browser should use, and
    /// `GET /health`.
    Serve,

    /// Manage notebook system prompts.
    Prompts {
        #[command(subcommand)]
        action: PromptAction,
    },

    /// Manage transformation prompt presets.
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },

    /// Show or replace the default transformation prompt.
    DefaultPrompt {
        #[command(subcommand)]
        action: DefaultPromptAction,
    },

    /// Manage and execute transformations.
    Transformations {
        #[command(subcommand)]
        action: TransformationAction,
    },

    /// Show a notebook's sources and notes with their context modes.
    ///
    /// Modes are defaulted the way the notebook page does it; `--set`
    /// overrides them for this run before the context is built.
    Context {
        /// Notebook ID.
        notebook: String,

        /// Override a mode: `source:<id>=off|insights|full` or
        /// `note:<id>=off|full`. Repeatable.
        #[arg(long = "set")]
        overrides: Vec<String>,

        /// Hide a panel (`sources`, `notes`, `prompts`, `chat`). Repeatable.
        #[arg(long)]
        hide: Vec<String>,

        /// Assemble the chat context on the backend and print it.
        #[arg(long)]
        build: bool,
    },
}

#[derive(Subcommand)]
enum PromptAction {
    /// List the prompts of a notebook (`*` marks the active one).
    List { notebook: String },
    /// Show one prompt.
    Get { id: String },
    /// Create a prompt in a notebook.
    Create {
        notebook: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        content: String,
    },
    /// Update a prompt. Omitted fields keep their current value.
    Update {
        notebook: String,
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a prompt.
    Delete { notebook: String, id: String },
    /// Set the active prompt of a notebook; omit the id to clear it.
    Activate { notebook: String, id: Option<String> },
    /// Show the active prompt of a notebook.
    Active { notebook: String },
}

#[derive(Subcommand)]
enum PresetAction {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        instructions: String,
    },
    /// Update a preset. Omitted fields keep their current value.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Delete a preset and report which preset is selected next.
    Delete { id: String },
}

#[derive(Subcommand)]
enum DefaultPromptAction {
    Get,
    Set { instructions: String },
}

#[derive(Subcommand)]
enum TransformationAction {
    List,
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        apply_default: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        apply_default: Option<bool>,
    },
    Delete {
        id: String,
    },
    /// Run a transformation over input text with a model.
    Execute {
        id: String,
        #[arg(long)]
        model: String,
        /// Input text to transform.
        input: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let notify_mode = match cli.notify.as_deref() {
        Some(s) => NotifyMode::parse(s)
            .ok_or_else(|| anyhow::anyhow!("unknown notify mode '{}': use human, json or log", s))?,
        None => NotifyMode::default_for_tty(),
    };

    let cfg = config::load_or_default(&cli.config)?;

    let notifier: Arc<dyn Notifier> = Arc::from(notify_mode.notifier());
    let ctx = || commands::connect(&cfg, notifier.clone());

    match cli.command {
        Commands::Serve => server::run_server(&cfg).await?,
        Commands::Prompts { action } => match action {
            PromptAction::List { notebook } => commands::list_prompts(ctx()?, &notebook).await?,
            PromptAction::Get { id } => commands::get_prompt(ctx()?, &id).await?,
            PromptAction::Create {
                notebook,
                name,
                content,
            } => commands::create_prompt(ctx()?, &notebook, &name, &content).await?,
            PromptAction::Update {
                notebook,
                id,
                name,
                content,
            } => commands::update_prompt(ctx()?, &notebook, &id, name, content).await?,
            PromptAction::Delete { notebook, id } => {
                commands::delete_prompt(ctx()?, &notebook, &id).await?
            }
            PromptAction::Activate { notebook, id } => {
                commands::set_active_prompt(ctx()?, &notebook, id.as_deref()).await?
            }
            PromptAction::Active { notebook } => {
                commands::show_active_prompt(ctx()?, &notebook).await?
            }
        },
        Commands::Presets { action } => match action {
            PresetAction::List => commands::list_presets(ctx()?).await?,
            PresetAction::Create { name, instructions } => {
                commands::create_preset(ctx()?, &name, &instructions).await?
            }
            PresetAction::Update {
                id,
                name,
                instructions,
            } => commands::update_preset(ctx()?, &id, name, instructions).await?,
            PresetAction::Delete { id } => commands::delete_preset(ctx()?, &id).await?,
        },
        Commands::DefaultPrompt { action } => match action {
            DefaultPromptAction::Get => commands::show_default_prompt(ctx()?).await?,
            DefaultPromptAction::Set { instructions } => {
                commands::set_default_prompt(ctx()?, &instructions).await?
            }
        },
        Commands::Transformations { action } => match action {
            TransformationAction::List => commands::list_transformations(ctx()?).await?,
            TransformationAction::Get { id } => commands::get_transformation(ctx()?, &id).await?,
            TransformationAction::Create {
                name,
                title,
                description,
                prompt,
                apply_default,
            } => {
                let request = TransformationCreate {
                    name,
                    title,
                    description,
                    prompt,
                    apply_default,
                };
                commands::create_transformation(ctx()?, request).await?
            }
            TransformationAction::Update {
                id,
                name,
                title,
                description,
                prompt,
                apply_default,
            } => {
                let request = TransformationUpdate {
                    name,
                    title,
                    description,
                    prompt,
                    apply_default,
                };
                commands::update_transformation(ctx()?, &id, request).await?
            }
            TransformationAction::Delete { id } => {
                commands::delete_transformation(ctx()?, &id).await?
            }
            TransformationAction::Execute { id, model, input } => {
                let request = ExecuteTransformationRequest {
                    transformation_id: id,
                    input_text: input,
                    model_id: model,
                };
                commands::execute_transformation(ctx()?, request).await?
            }
        },
        Commands::Context {
            notebook,
            overrides,
            hide,
            build,
        } => {
            let opts = commands::ContextOptions {
                overrides,
                hide,
                build,
            };
            commands::show_context(ctx()?, &notebook, opts).await?
        }
    }

    Ok(())
}
