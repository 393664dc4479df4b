//! Wire types exchanged with the notebook backend.
//!
//! Every persisted entity here is owned by the backend. The client only ever
//! holds derived copies, refreshed through the query cache. Timestamps are
//! kept as the opaque strings the backend renders.

use serde::{Deserialize, Serialize};

/// A notebook: parent of sources, notes and system prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub source_count: u64,
    #[serde(default)]
    pub note_count: u64,
}

/// Source as listed for a notebook.
///
/// `insights_count` drives the default context mode of the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub insights_count: u64,
    #[serde(default)]
    pub embedded: bool,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub note_type: Option<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
}

/// A notebook-scoped system prompt.
///
/// The backend does not echo `notebook_id`; the hooks fill it in from the
/// notebook the prompt was fetched or created under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemPrompt {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub notebook_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePromptRequest {
    pub notebook_id: String,
    pub name: String,
    pub content: String,
}

/// Partial prompt update. Absent fields are left unchanged server side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePromptRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Body of `PUT /notebooks/{id}/active-prompt`. `None` clears the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetActivePromptRequest {
    pub prompt_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePromptResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub active_prompt_id: Option<String>,
}

/// Reusable block of transformation instructions, independent of notebooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPreset {
    pub prompt_id: String,
    pub name: String,
    pub transformation_instructions: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRequest {
    pub name: String,
    pub transformation_instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultPrompt {
    pub transformation_instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub prompt: String,
    #[serde(default)]
    pub apply_default: bool,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationCreate {
    pub name: String,
    pub title: String,
    pub description: String,
    pub prompt: String,
    #[serde(default)]
    pub apply_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_default: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteTransformationRequest {
    pub transformation_id: String,
    pub input_text: String,
    pub model_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteTransformationResponse {
    pub output: String,
    pub transformation_id: String,
    pub model_id: String,
}

/// Body of `POST /chat/context`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildContextRequest {
    pub notebook_id: String,
    pub context_config: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildContextResponse {
    pub context: serde_json::Value,
    pub token_count: u64,
    pub char_count: u64,
}
