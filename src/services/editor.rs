use std::sync::Arc;

use tracing::{info, warn};

use crate::api::dto::EvaluationPayload;
use crate::api::BackendApi;
use crate::error::AppError;
use crate::models::{DraftUpdate, EvaluationDraft, UcType};

pub const MSG_ALL_FIELDS_REQUIRED: &str = "All fields are required for each evaluation.";
pub const MSG_MIXED_NEEDS_TWO: &str = "UCs of type 'mixed' must have exactly two evaluations.";
pub const MSG_CONTINUOUS_NEEDS_THREE: &str =
    "UCs of type 'continuous' must have at least three evaluations.";
pub const MSG_LOAD_FAILED: &str = "Error fetching evaluations";
pub const MSG_SAVE_FAILED: &str = "Failed to save evaluations. Please try again.";
pub const MSG_SAVE_OK: &str = "Evaluations saved successfully!";
pub const MSG_DELETE_FAILED: &str = "Failed to delete UC. Please try again.";

/// Lifecycle of the editing screen. `Failed` keeps a retry path back to
/// `Loading` instead of rendering an error string forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed,
}

/// Advisory outcome of the last operation, rendered as a success or error
/// banner. Never fatal; the editor stays interactive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error(String),
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Feedback::Success(msg) | Feedback::Error(msg) => msg,
        }
    }
}

/// The evaluation-editing session for one UC: an ordered draft list, the
/// unit's closed flag, and the validation/feedback slots. All backend access
/// goes through the injected [`BackendApi`].
pub struct EvaluationEditor {
    api: Arc<dyn BackendApi>,
    uc_id: i64,
    uc_type: UcType,
    state: LoadState,
    closed: bool,
    drafts: Vec<EvaluationDraft>,
    form_error: Option<String>,
    status: Option<Feedback>,
}

impl EvaluationEditor {
    pub fn new(api: Arc<dyn BackendApi>, uc_id: i64, uc_type: UcType) -> Self {
        EvaluationEditor {
            api,
            uc_id,
            uc_type,
            state: LoadState::Loading,
            closed: false,
            drafts: Vec::new(),
            form_error: None,
            status: None,
        }
    }

    pub fn uc_id(&self) -> i64 {
        self.uc_id
    }

    pub fn uc_type(&self) -> UcType {
        self.uc_type
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn drafts(&self) -> &[EvaluationDraft] {
        &self.drafts
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn status(&self) -> Option<&Feedback> {
        self.status.as_ref()
    }

    /// Fetches the UC's closed status and its persisted evaluations,
    /// replacing the draft list. Either call failing parks the editor in
    /// `Failed`; [`EvaluationEditor::retry`] goes back to `Loading`.
    pub async fn load(&mut self) -> Result<(), AppError> {
        self.state = LoadState::Loading;
        let loaded = self.fetch_initial().await;
        match loaded {
            Ok((closed, drafts)) => {
                self.closed = closed;
                self.drafts = drafts;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(err) => {
                warn!("editor load failed for UC {}: {}", self.uc_id, err);
                self.state = LoadState::Failed;
                self.status = Some(Feedback::Error(MSG_LOAD_FAILED.to_string()));
                Err(err)
            }
        }
    }

    async fn fetch_initial(&self) -> Result<(bool, Vec<EvaluationDraft>), AppError> {
        let closed = self.api.fetch_uc_closed(self.uc_id).await?;
        let evaluations = self.api.fetch_evaluations(self.uc_id).await?;
        let drafts = evaluations
            .into_iter()
            .map(EvaluationDraft::from_persisted)
            .collect();
        Ok((closed, drafts))
    }

    /// Re-runs `load` after a failed one. A no-op in any other state.
    pub async fn retry(&mut self) -> Result<(), AppError> {
        if self.state != LoadState::Failed {
            return Ok(());
        }
        self.load().await
    }

    /// Appends an empty draft and returns its local identifier. No network.
    pub fn add_draft(&mut self) -> i64 {
        let draft = EvaluationDraft::new(self.uc_id);
        let id = draft.id;
        self.drafts.push(draft);
        id
    }

    /// Removes a record from the in-memory list. No network: a removed
    /// persisted evaluation disappears server-side on the next save, via
    /// the endpoint's replace-the-set semantics.
    pub fn remove_draft(&mut self, id: i64) -> bool {
        let before = self.drafts.len();
        self.drafts.retain(|draft| draft.id != id);
        self.drafts.len() != before
    }

    /// Merges partial field updates into one record.
    pub fn update_draft(&mut self, id: i64, patch: DraftUpdate) -> bool {
        match self.drafts.iter_mut().find(|draft| draft.id == id) {
            Some(draft) => {
                draft.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Checks every record for unset required fields (type, date, weight,
    /// student count, computer flag). The room may stay unassigned. The
    /// first violation sets the form error; violations are not enumerated.
    pub fn validate(&mut self) -> bool {
        for draft in &self.drafts {
            if draft.kind.is_none()
                || draft.date.is_none()
                || draft.weight.is_none()
                || draft.student_num.is_none()
                || draft.need_computer.is_none()
            {
                self.form_error = Some(MSG_ALL_FIELDS_REQUIRED.to_string());
                return false;
            }
        }
        self.form_error = None;
        true
    }

    /// Submits the full draft list as one bulk save. Local identifiers are
    /// stripped (the payload type has no id field) and unassigned rooms
    /// collapse into the no-room sentinel. The draft list is left untouched
    /// whether the call succeeds or fails; server-assigned ids are not
    /// reconciled back.
    pub async fn save(&mut self) -> Result<(), AppError> {
        if !self.validate() {
            return Err(AppError::validation(MSG_ALL_FIELDS_REQUIRED));
        }
        let payloads: Vec<EvaluationPayload> = self
            .drafts
            .iter()
            .filter_map(EvaluationPayload::from_draft)
            .collect();
        debug_assert_eq!(payloads.len(), self.drafts.len());

        match self.api.save_evaluations(self.uc_id, &payloads).await {
            Ok(()) => {
                info!("saved {} evaluations for UC {}", payloads.len(), self.uc_id);
                self.status = Some(Feedback::Success(MSG_SAVE_OK.to_string()));
                Ok(())
            }
            Err(err) => {
                warn!("save failed for UC {}: {}", self.uc_id, err);
                self.status = Some(Feedback::Error(MSG_SAVE_FAILED.to_string()));
                Err(err)
            }
        }
    }

    /// Closes or reopens the UC. Closing is gated locally by the
    /// type-specific evaluation count; a violation produces the descriptive
    /// message and no network call. Backend refusals are surfaced verbatim.
    pub async fn toggle_closed(&mut self, desired_closed: bool) -> Result<(), AppError> {
        if desired_closed {
            if let Some(msg) = self.close_violation() {
                self.status = Some(Feedback::Error(msg.to_string()));
                return Err(AppError::validation(msg));
            }
        }

        let result = if desired_closed {
            self.api.close_uc(self.uc_id).await
        } else {
            self.api.open_uc(self.uc_id).await
        };

        match result {
            Ok(()) => {
                self.closed = desired_closed;
                let msg = if desired_closed {
                    "UC closed successfully!"
                } else {
                    "UC reopened successfully!"
                };
                self.status = Some(Feedback::Success(msg.to_string()));
                Ok(())
            }
            Err(err) => {
                let msg = err
                    .backend_message()
                    .filter(|m| !m.is_empty())
                    .unwrap_or("Failed to update UC status. Please try again.")
                    .to_string();
                warn!("status toggle failed for UC {}: {}", self.uc_id, err);
                self.status = Some(Feedback::Error(msg));
                Err(err)
            }
        }
    }

    fn close_violation(&self) -> Option<&'static str> {
        let count = self.drafts.len();
        match self.uc_type {
            UcType::Mixed if count != 2 => Some(MSG_MIXED_NEEDS_TWO),
            UcType::Continuous if count < 3 => Some(MSG_CONTINUOUS_NEEDS_THREE),
            _ => None,
        }
    }

    /// Irrevocably deletes the UC. On success the caller navigates away;
    /// this editor is then dead.
    pub async fn delete_uc(&mut self) -> Result<(), AppError> {
        match self.api.delete_uc(self.uc_id).await {
            Ok(()) => {
                info!("deleted UC {}", self.uc_id);
                Ok(())
            }
            Err(err) => {
                warn!("delete failed for UC {}: {}", self.uc_id, err);
                self.status = Some(Feedback::Error(MSG_DELETE_FAILED.to_string()));
                Err(err)
            }
        }
    }
}
