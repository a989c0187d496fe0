use serde::{Deserialize, Serialize};

use crate::models::{EvaluationDraft, EvaluationKind, RoomAssignment};

/// One record of the bulk-save body for `POST /evaluation/save?ucId=`.
///
/// Deliberately has no id field: local draft identifiers (and server ids of
/// previously fetched records) are stripped by construction. The backend
/// replaces the UC's whole evaluation set with the submitted list and
/// reassigns ids itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationPayload {
    pub date: String,
    pub need_computer: bool,
    pub room_id: i64,
    pub student_num: u32,
    #[serde(rename = "type")]
    pub kind: EvaluationKind,
    pub uc_id: i64,
    pub weight: u32,
}

impl EvaluationPayload {
    /// Builds the wire record from a validated draft. `None` when a required
    /// field is still unset; callers validate before converting, so a `None`
    /// here means the draft list changed underneath them.
    pub fn from_draft(draft: &EvaluationDraft) -> Option<Self> {
        Some(EvaluationPayload {
            date: draft.date.clone()?,
            need_computer: draft.need_computer?,
            // Unassigned collapses into the in-class sentinel at save time.
            room_id: match draft.room {
                RoomAssignment::Unassigned => RoomAssignment::NO_ROOM,
                other => other.to_room_id(),
            },
            student_num: draft.student_num?,
            kind: draft.kind?,
            uc_id: draft.uc_id,
            weight: draft.weight?,
        })
    }
}
