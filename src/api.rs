//! Typed wrappers around the notebook backend's REST API.
//!
//! [`NotebookApi`] is the seam between the hooks and the network: the hooks
//! only ever talk to a `dyn NotebookApi`, and [`HttpApi`] is the production
//! implementation on top of `reqwest`. Each method issues exactly one request
//! and unwraps the JSON body into the matching [`crate::models`] type.
//!
//! # Endpoints
//!
//! | Method | Path |
//! |--------|------|
//! | `GET`/`POST` | `/notebooks/{id}/prompts` |
//! | `GET`/`PUT`/`DELETE` | `/prompts/{id}` |
//! | `GET`/`PUT` | `/notebooks/{id}/active-prompt` |
//! | `GET`/`POST` | `/transformations` |
//! | `GET`/`PUT`/`DELETE` | `/transformations/{id}` |
//! | `POST` | `/transformations/execute` |
//! | `GET`/`POST` | `/transformations/prompts` |
//! | `PUT`/`DELETE` | `/transformations/prompts/{id}` |
//! | `GET`/`PUT` | `/transformations/default-prompt` |
//! | `GET` | `/notebooks/{id}`, `/sources?notebook_id=`, `/notes?notebook_id=` |
//! | `POST` | `/chat/context` |
//!
//! All paths live under the `/api` prefix of the configured base URL.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    ActivePromptResponse, BuildContextRequest, BuildContextResponse, CreatePromptRequest,
    DefaultPrompt, ExecuteTransformationRequest, ExecuteTransformationResponse, Note, Notebook,
    PresetRequest, PromptPreset, SetActivePromptRequest, Source, SystemPrompt, Transformation,
    TransformationCreate, TransformationUpdate, UpdatePromptRequest,
};

/// Backend operations used by the hooks.
///
/// Implementations must perform exactly one network side effect per call.
#[async_trait]
pub trait NotebookApi: Send + Sync {
    // Prompts
    async fn list_prompts(&self, notebook_id: &str) -> ClientResult<Vec<SystemPrompt>>;
    async fn get_prompt(&self, prompt_id: &str) -> ClientResult<SystemPrompt>;
    async fn create_prompt(&self, request: &CreatePromptRequest) -> ClientResult<SystemPrompt>;
    async fn update_prompt(
        &self,
        prompt_id: &str,
        request: &UpdatePromptRequest,
    ) -> ClientResult<SystemPrompt>;
    async fn delete_prompt(&self, prompt_id: &str) -> ClientResult<()>;
    async fn get_active_prompt(&self, notebook_id: &str) -> ClientResult<Option<SystemPrompt>>;
    async fn set_active_prompt(
        &self,
        notebook_id: &str,
        prompt_id: Option<&str>,
    ) -> ClientResult<ActivePromptResponse>;

    // Transformations
    async fn list_transformations(&self) -> ClientResult<Vec<Transformation>>;
    async fn get_transformation(&self, id: &str) -> ClientResult<Transformation>;
    async fn create_transformation(
        &self,
        request: &TransformationCreate,
    ) -> ClientResult<Transformation>;
    async fn update_transformation(
        &self,
        id: &str,
        request: &TransformationUpdate,
    ) -> ClientResult<Transformation>;
    async fn delete_transformation(&self, id: &str) -> ClientResult<()>;
    async fn execute_transformation(
        &self,
        request: &ExecuteTransformationRequest,
    ) -> ClientResult<ExecuteTransformationResponse>;

    // Prompt presets and the default transformation prompt
    async fn list_presets(&self) -> ClientResult<Vec<PromptPreset>>;
    async fn create_preset(&self, request: &PresetRequest) -> ClientResult<PromptPreset>;
    async fn update_preset(&self, id: &str, request: &PresetRequest)
        -> ClientResult<PromptPreset>;
    async fn delete_preset(&self, id: &str) -> ClientResult<()>;
    async fn get_default_prompt(&self) -> ClientResult<DefaultPrompt>;
    async fn update_default_prompt(&self, request: &DefaultPrompt) -> ClientResult<DefaultPrompt>;

    // Notebook page
    async fn get_notebook(&self, notebook_id: &str) -> ClientResult<Notebook>;
    async fn list_sources(&self, notebook_id: &str) -> ClientResult<Vec<Source>>;
    async fn list_notes(&self, notebook_id: &str) -> ClientResult<Vec<Note>>;
    async fn build_context(
        &self,
        request: &BuildContextRequest,
    ) -> ClientResult<BuildContextResponse>;
}

/// [`NotebookApi`] over HTTP.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client for the API at `config.base_url`.
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> ClientResult<T> {
        let response = checked(request.send().await?, what).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_discard(&self, request: RequestBuilder, what: &str) -> ClientResult<()> {
        checked(request.send().await?, what).await?;
        Ok(())
    }
}

/// Map non-success statuses to [`ClientError`].
///
/// The backend reports failures as `{"detail": "..."}`; when that shape is
/// present its message is kept, otherwise the raw body.
async fn checked(response: reqwest::Response, what: &str) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(what.to_string()));
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or(body);
    tracing::debug!(status = status.as_u16(), what, "backend request failed");
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl NotebookApi for HttpApi {
    async fn list_prompts(&self, notebook_id: &str) -> ClientResult<Vec<SystemPrompt>> {
        let url = self.url(&format!("/notebooks/{}/prompts", notebook_id));
        self.send(self.client.get(url), "notebook").await
    }

    async fn get_prompt(&self, prompt_id: &str) -> ClientResult<SystemPrompt> {
        let url = self.url(&format!("/prompts/{}", prompt_id));
        self.send(self.client.get(url), "prompt").await
    }

    async fn create_prompt(&self, request: &CreatePromptRequest) -> ClientResult<SystemPrompt> {
        let url = self.url(&format!("/notebooks/{}/prompts", request.notebook_id));
        self.send(self.client.post(url).json(request), "notebook").await
    }

    async fn update_prompt(
        &self,
        prompt_id: &str,
        request: &UpdatePromptRequest,
    ) -> ClientResult<SystemPrompt> {
        let url = self.url(&format!("/prompts/{}", prompt_id));
        self.send(self.client.put(url).json(request), "prompt").await
    }

    async fn delete_prompt(&self, prompt_id: &str) -> ClientResult<()> {
        let url = self.url(&format!("/prompts/{}", prompt_id));
        self.send_discard(self.client.delete(url), "prompt").await
    }

    async fn get_active_prompt(&self, notebook_id: &str) -> ClientResult<Option<SystemPrompt>> {
        let url = self.url(&format!("/notebooks/{}/active-prompt", notebook_id));
        self.send(self.client.get(url), "notebook").await
    }

    async fn set_active_prompt(
        &self,
        notebook_id: &str,
        prompt_id: Option<&str>,
    ) -> ClientResult<ActivePromptResponse> {
        let url = self.url(&format!("/notebooks/{}/active-prompt", notebook_id));
        let body = SetActivePromptRequest {
            prompt_id: prompt_id.map(str::to_string),
        };
        self.send(self.client.put(url).json(&body), "notebook or prompt").await
    }

    async fn list_transformations(&self) -> ClientResult<Vec<Transformation>> {
        self.send(self.client.get(self.url("/transformations")), "transformations").await
    }

    async fn get_transformation(&self, id: &str) -> ClientResult<Transformation> {
        let url = self.url(&format!("/transformations/{}", id));
        self.send(self.client.get(url), "transformation").await
    }

    async fn create_transformation(
        &self,
        request: &TransformationCreate,
    ) -> ClientResult<Transformation> {
        let url = self.url("/transformations");
        self.send(self.client.post(url).json(request), "transformation").await
    }

    async fn update_transformation(
        &self,
        id: &str,
        request: &TransformationUpdate,
    ) -> ClientResult<Transformation> {
        let url = self.url(&format!("/transformations/{}", id));
        self.send(self.client.put(url).json(request), "transformation").await
    }

    async fn delete_transformation(&self, id: &str) -> ClientResult<()> {
        let url = self.url(&format!("/transformations/{}", id));
        self.send_discard(self.client.delete(url), "transformation").await
    }

    async fn execute_transformation(
        &self,
        request: &ExecuteTransformationRequest,
    ) -> ClientResult<ExecuteTransformationResponse> {
        let url = self.url("/transformations/execute");
        self.send(self.client.post(url).json(request), "transformation or model").await
    }

    async fn list_presets(&self) -> ClientResult<Vec<PromptPreset>> {
        self.send(self.client.get(self.url("/transformations/prompts")), "presets").await
    }

    async fn create_preset(&self, request: &PresetRequest) -> ClientResult<PromptPreset> {
        let url = self.url("/transformations/prompts");
        self.send(self.client.post(url).json(request), "preset").await
    }

    async fn update_preset(
        &self,
        id: &str,
        request: &PresetRequest,
    ) -> ClientResult<PromptPreset> {
        let url = self.url(&format!("/transformations/prompts/{}", id));
        self.send(self.client.put(url).json(request), "preset").await
    }

    async fn delete_preset(&self, id: &str) -> ClientResult<()> {
        let url = self.url(&format!("/transformations/prompts/{}", id));
        self.send_discard(self.client.delete(url), "preset").await
    }

    async fn get_default_prompt(&self) -> ClientResult<DefaultPrompt> {
        let url = self.url("/transformations/default-prompt");
        self.send(self.client.get(url), "default prompt").await
    }

    async fn update_default_prompt(&self, request: &DefaultPrompt) -> ClientResult<DefaultPrompt> {
        let url = self.url("/transformations/default-prompt");
        self.send(self.client.put(url).json(request), "default prompt").await
    }

    async fn get_notebook(&self, notebook_id: &str) -> ClientResult<Notebook> {
        let url = self.url(&format!("/notebooks/{}", notebook_id));
        self.send(self.client.get(url), "notebook").await
    }

    async fn list_sources(&self, notebook_id: &str) -> ClientResult<Vec<Source>> {
        let request = self
            .client
            .get(self.url("/sources"))
            .query(&[("notebook_id", notebook_id)]);
        self.send(request, "notebook").await
    }

    async fn list_notes(&self, notebook_id: &str) -> ClientResult<Vec<Note>> {
        let request = self
            .client
            .get(self.url("/notes"))
            .query(&[("notebook_id", notebook_id)]);
        self.send(request, "notebook").await
    }

    async fn build_context(
        &self,
        request: &BuildContextRequest,
    ) -> ClientResult<BuildContextResponse> {
        let url = self.url("/chat/context");
        self.send(self.client.post(url).json(request), "notebook").await
    }
}
