//! Create/edit dialog state for prompts and presets.
//!
//! ```text
//!            open_create            submit ok
//!   Closed ───────────────▶ Create ───────────▶ Closed
//!     │
//!     │ open_edit(full)                submit ok
//!     ├──────────────────────▶ Edit ───────────▶ Closed
//!     │                         ▲
//!     │ open_edit(summary)      │ detail_loaded
//!     └──▶ EditLoadingDetail ───┘
//! ```
//!
//! A failed submission keeps the dialog open with the input untouched.
//! Validation runs before any request is built, so an invalid form never
//! reaches the network.

use crate::error::{ClientError, ClientResult};
use crate::hooks::{PresetHooks, PromptHooks};
use crate::models::{PresetRequest, PromptPreset, SystemPrompt, UpdatePromptRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Create,
    Edit { id: String },
    /// Opened from a summary; the full record is being fetched.
    EditLoadingDetail { id: String },
}

/// What the dialog is opened on.
#[derive(Debug, Clone)]
pub enum EditTarget<R> {
    Full(R),
    Summary { id: String },
}

/// What a validated submission should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission<F> {
    pub target: SubmitTarget,
    pub fields: F,
}

/// Editable fields of one dialog.
pub trait FormFields: Default + Clone {
    type Record;

    fn id_of(record: &Self::Record) -> &str;
    fn from_record(record: &Self::Record) -> Self;
    fn validate(&self) -> ClientResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptForm {
    pub name: String,
    pub content: String,
}

impl FormFields for PromptForm {
    type Record = SystemPrompt;

    fn id_of(record: &SystemPrompt) -> &str {
        &record.id
    }

    fn from_record(record: &SystemPrompt) -> Self {
        Self {
            name: record.name.clone(),
            content: record.content.clone(),
        }
    }

    fn validate(&self) -> ClientResult<()> {
        require("name", &self.name)?;
        require("content", &self.content)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetForm {
    pub name: String,
    pub transformation_instructions: String,
}

impl FormFields for PresetForm {
    type Record = PromptPreset;

    fn id_of(record: &PromptPreset) -> &str {
        &record.prompt_id
    }

    fn from_record(record: &PromptPreset) -> Self {
        Self {
            name: record.name.clone(),
            transformation_instructions: record.transformation_instructions.clone(),
        }
    }

    fn validate(&self) -> ClientResult<()> {
        require("name", &self.name)?;
        require("transformation instructions", &self.transformation_instructions)
    }
}

fn require(field: &str, value: &str) -> ClientResult<()> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct EditorDialog<F: FormFields> {
    state: DialogState,
    form: F,
    submitting: bool,
}

impl<F: FormFields> Default for EditorDialog<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FormFields> EditorDialog<F> {
    pub fn new() -> Self {
        Self {
            state: DialogState::Closed,
            form: F::default(),
            submitting: false,
        }
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Editable form while the dialog accepts input.
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self.state {
            DialogState::Create | DialogState::Edit { .. } if !self.submitting => {
                Some(&mut self.form)
            }
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state != DialogState::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn open_create(&mut self) {
        self.state = DialogState::Create;
        self.form = F::default();
        self.submitting = false;
    }

    pub fn open_edit(&mut self, target: EditTarget<F::Record>) {
        self.submitting = false;
        match target {
            EditTarget::Full(record) => {
                self.form = F::from_record(&record);
                self.state = DialogState::Edit {
                    id: F::id_of(&record).to_string(),
                };
            }
            EditTarget::Summary { id } => {
                self.form = F::default();
                self.state = DialogState::EditLoadingDetail { id };
            }
        }
    }

    /// Seed the form from a fetched record.
    ///
    /// Ignored unless the dialog is still waiting for that record's id.
    pub fn detail_loaded(&mut self, record: &F::Record) -> bool {
        match &self.state {
            DialogState::EditLoadingDetail { id } if id == F::id_of(record) => {
                self.form = F::from_record(record);
                self.state = DialogState::Edit { id: id.clone() };
                true
            }
            _ => false,
        }
    }

    /// The detail could not be loaded; back to where the user started.
    pub fn detail_failed(&mut self) {
        if matches!(self.state, DialogState::EditLoadingDetail { .. }) {
            self.close();
        }
    }

    pub fn close(&mut self) {
        self.state = DialogState::Closed;
        self.form = F::default();
        self.submitting = false;
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.state, DialogState::Create | DialogState::Edit { .. }) && !self.submitting
    }

    /// Validate and mark the dialog as submitting.
    pub fn begin_submit(&mut self) -> ClientResult<Submission<F>> {
        let target = match &self.state {
            _ if self.submitting => return Err(ClientError::MutationPending("submit")),
            DialogState::Create => SubmitTarget::Create,
            DialogState::Edit { id } => SubmitTarget::Update { id: id.clone() },
            DialogState::EditLoadingDetail { .. } => {
                return Err(ClientError::Validation("details are still loading".into()))
            }
            DialogState::Closed => {
                return Err(ClientError::Validation("dialog is not open".into()))
            }
        };
        self.form.validate()?;
        self.submitting = true;
        Ok(Submission {
            target,
            fields: self.form.clone(),
        })
    }

    /// Close and reset on success; keep everything on failure.
    pub fn finish_submit(&mut self, succeeded: bool) {
        self.submitting = false;
        if succeeded {
            self.close();
        }
    }
}

impl EditorDialog<PromptForm> {
    /// Fetch the full prompt the dialog is waiting for.
    pub async fn load_detail(&mut self, hooks: &PromptHooks) -> ClientResult<()> {
        let id = match &self.state {
            DialogState::EditLoadingDetail { id } => id.clone(),
            _ => return Ok(()),
        };
        match hooks.prompt(&id).await {
            Ok(Some(prompt)) => {
                self.detail_loaded(&prompt);
                Ok(())
            }
            Ok(None) => {
                self.detail_failed();
                Err(ClientError::NotFound("prompt".into()))
            }
            Err(e) => {
                self.detail_failed();
                Err(e)
            }
        }
    }

    /// Create or update a prompt of `notebook_id` from the form.
    pub async fn submit(
        &mut self,
        hooks: &PromptHooks,
        notebook_id: &str,
    ) -> ClientResult<SystemPrompt> {
        let submission = self.begin_submit()?;
        let fields = submission.fields;
        let result = match submission.target {
            SubmitTarget::Create => {
                hooks
                    .create_prompt(notebook_id, &fields.name, &fields.content)
                    .await
            }
            SubmitTarget::Update { id } => {
                let request = UpdatePromptRequest {
                    name: Some(fields.name),
                    content: Some(fields.content),
                };
                hooks.update_prompt(&id, notebook_id, &request).await
            }
        };
        self.finish_submit(result.is_ok());
        result
    }
}

impl EditorDialog<PresetForm> {
    pub async fn submit(&mut self, hooks: &PresetHooks) -> ClientResult<PromptPreset> {
        let submission = self.begin_submit()?;
        let request = PresetRequest {
            name: submission.fields.name,
            transformation_instructions: submission.fields.transformation_instructions,
        };
        let result = match submission.target {
            SubmitTarget::Create => hooks.create_preset(&request).await,
            SubmitTarget::Update { id } => hooks.update_preset(&id, &request).await,
        };
        self.finish_submit(result.is_ok());
        result
    }
}
