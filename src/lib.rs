//! # Notebook Client
//!
//! Client-side state layer for a notebook-style knowledge assistant.
//!
//! Notebook Client sits between a user interface and the notebook backend's
//! REST API. It wraps the API in typed calls, caches reads by query key,
//! invalidates those keys after mutations, reports mutation outcomes as
//! notifications, and owns the page-level state of a notebook: which sources
//! and notes go into the chat context, which panels are visible, and the
//! lifecycle of the prompt and preset editors.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Page state │──▶│    Hooks     │──▶│  NotebookApi  │──▶ backend /api
//! │ dialogs,   │   │ query+mutate │   │  (HttpApi)    │
//! │ selections │   └──────┬──────┘   └──────────────┘
//! └────────────┘          │
//!                ┌────────┴────────┐
//!                ▼                 ▼
//!          ┌──────────┐      ┌──────────┐
//!          │QueryCache│      │ Notifier │
//!          └──────────┘      └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! nbc prompts list notebook:abc
//! nbc prompts create notebook:abc --name Reviewer --content "Review code."
//! nbc presets list
//! nbc context notebook:abc --build
//! nbc serve                    # runtime config endpoint for the frontend
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Wire types for the backend API |
//! | [`error`] | Client error type |
//! | [`api`] | `NotebookApi` trait and its HTTP implementation |
//! | [`cache`] | Query cache keyed by [`cache::QueryKey`] |
//! | [`notify`] | Success/failure notifications |
//! | [`hooks`] | Cached queries and invalidating mutations |
//! | [`context`] | Per-notebook context selections |
//! | [`panels`] | Panel visibility and grid span |
//! | [`page`] | Notebook page state |
//! | [`dialog`] | Prompt/preset editor dialog state machine |
//! | [`preset_editor`] | Preset selection and default prompt editing |
//! | [`server`] | Runtime config HTTP server |
//! | [`commands`] | CLI command runners |

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod context;
pub mod dialog;
pub mod error;
pub mod hooks;
pub mod models;
pub mod notify;
pub mod page;
pub mod panels;
pub mod preset_editor;
pub mod server;
