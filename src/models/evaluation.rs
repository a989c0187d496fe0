use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The kinds of gradable activity the backend knows. Serialized with the
/// human-readable labels the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationKind {
    Test,
    #[serde(rename = "Final Test in Exam Season")]
    FinalTestInExamSeason,
    #[serde(rename = "Work developed throughout Semester")]
    WorkDevelopedThroughoutSemester,
    #[serde(rename = "Delivery of Work")]
    DeliveryOfWork,
    #[serde(rename = "Delivery of Group Work")]
    DeliveryOfGroupWork,
    #[serde(rename = "Presentation of Work")]
    PresentationOfWork,
    #[serde(rename = "Presentation of Group Work")]
    PresentationOfGroupWork,
    Monography,
    #[serde(rename = "Individual Practical Exercise")]
    IndividualPracticalExercise,
    Pitch,
    #[serde(rename = "Final Exam")]
    FinalExam,
    #[serde(rename = "Oral Exam")]
    OralExam,
}

impl EvaluationKind {
    pub const ALL: [EvaluationKind; 12] = [
        EvaluationKind::Test,
        EvaluationKind::FinalTestInExamSeason,
        EvaluationKind::WorkDevelopedThroughoutSemester,
        EvaluationKind::DeliveryOfWork,
        EvaluationKind::DeliveryOfGroupWork,
        EvaluationKind::PresentationOfWork,
        EvaluationKind::PresentationOfGroupWork,
        EvaluationKind::Monography,
        EvaluationKind::IndividualPracticalExercise,
        EvaluationKind::Pitch,
        EvaluationKind::FinalExam,
        EvaluationKind::OralExam,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EvaluationKind::Test => "Test",
            EvaluationKind::FinalTestInExamSeason => "Final Test in Exam Season",
            EvaluationKind::WorkDevelopedThroughoutSemester => {
                "Work developed throughout Semester"
            }
            EvaluationKind::DeliveryOfWork => "Delivery of Work",
            EvaluationKind::DeliveryOfGroupWork => "Delivery of Group Work",
            EvaluationKind::PresentationOfWork => "Presentation of Work",
            EvaluationKind::PresentationOfGroupWork => "Presentation of Group Work",
            EvaluationKind::Monography => "Monography",
            EvaluationKind::IndividualPracticalExercise => "Individual Practical Exercise",
            EvaluationKind::Pitch => "Pitch",
            EvaluationKind::FinalExam => "Final Exam",
            EvaluationKind::OralExam => "Oral Exam",
        }
    }
}

impl fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EvaluationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.label().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unknown evaluation type: {s}"))
    }
}

/// Where an evaluation takes place. The backend conflates "no room" into the
/// `-1` sentinel; client-side the two intents stay distinct: `InClass` is a
/// deliberate "held during class, no room needed", `Unassigned` is "not yet
/// chosen". Both serialize to `-1` at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomAssignment {
    #[default]
    Unassigned,
    InClass,
    Room(i64),
}

impl RoomAssignment {
    /// The backend's "no room" sentinel.
    pub const NO_ROOM: i64 = -1;

    pub fn from_room_id(id: i64) -> Self {
        if id == Self::NO_ROOM {
            RoomAssignment::InClass
        } else {
            RoomAssignment::Room(id)
        }
    }

    pub fn to_room_id(self) -> i64 {
        match self {
            RoomAssignment::Unassigned | RoomAssignment::InClass => Self::NO_ROOM,
            RoomAssignment::Room(id) => id,
        }
    }

    /// The concrete room, when one is bound.
    pub fn room_id(self) -> Option<i64> {
        match self {
            RoomAssignment::Room(id) => Some(id),
            _ => None,
        }
    }
}

/// A persisted evaluation as `GET /evaluation/get` returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(default)]
    pub id: Option<i64>,
    pub uc_id: i64,
    #[serde(rename = "type")]
    pub kind: EvaluationKind,
    pub weight: u32,
    pub date: String,
    pub room_id: i64,
    pub student_num: u32,
    pub need_computer: bool,
}

/// One record of the editor's in-memory list. Fetched records keep their
/// server id as local identity; client-created records get a timestamp id.
/// Neither is ever transmitted.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDraft {
    pub id: i64,
    pub uc_id: i64,
    pub kind: Option<EvaluationKind>,
    pub weight: Option<u32>,
    pub date: Option<String>,
    pub student_num: Option<u32>,
    pub need_computer: Option<bool>,
    pub room: RoomAssignment,
}

impl EvaluationDraft {
    pub fn new(uc_id: i64) -> Self {
        EvaluationDraft {
            id: Utc::now().timestamp_millis(),
            uc_id,
            kind: None,
            weight: None,
            date: None,
            student_num: None,
            need_computer: None,
            room: RoomAssignment::Unassigned,
        }
    }

    pub fn from_persisted(ev: Evaluation) -> Self {
        EvaluationDraft {
            id: ev.id.unwrap_or_else(|| Utc::now().timestamp_millis()),
            uc_id: ev.uc_id,
            kind: Some(ev.kind),
            weight: Some(ev.weight),
            date: Some(ev.date),
            student_num: Some(ev.student_num),
            need_computer: Some(ev.need_computer),
            room: RoomAssignment::from_room_id(ev.room_id),
        }
    }

    pub fn apply(&mut self, patch: DraftUpdate) {
        if let Some(kind) = patch.kind {
            self.kind = Some(kind);
        }
        if let Some(weight) = patch.weight {
            self.weight = Some(weight);
        }
        if let Some(date) = patch.date {
            self.date = Some(date);
        }
        if let Some(student_num) = patch.student_num {
            self.student_num = Some(student_num);
        }
        if let Some(need_computer) = patch.need_computer {
            self.need_computer = Some(need_computer);
        }
        if let Some(room) = patch.room {
            self.room = room;
        }
    }
}

/// Partial field update for one draft; unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct DraftUpdate {
    pub kind: Option<EvaluationKind>,
    pub weight: Option<u32>,
    pub date: Option<String>,
    pub student_num: Option<u32>,
    pub need_computer: Option<bool>,
    pub room: Option<RoomAssignment>,
}
