use std::fmt;

use serde::{Deserialize, Serialize};

/// Evaluation-type tag of a UC. It decides how many evaluations the unit
/// needs before it can be closed: `Mixed` exactly two, `Continuous` at
/// least three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UcType {
    Mixed,
    Continuous,
}

impl fmt::Display for UcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UcType::Mixed => write!(f, "mixed"),
            UcType::Continuous => write!(f, "continuous"),
        }
    }
}

/// A curricular unit. Field names follow the backend's wire shape
/// (`ano` = academic year 1-3, `semestre` = 1-2, `tipo` = evaluation-type
/// tag, `ucclosed` = lifecycle gate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Uc {
    pub id: i64,
    pub name: String,
    pub ano: u8,
    pub semestre: u8,
    pub tipo: UcType,
    pub mandatory: bool,
    pub ucclosed: bool,
}

/// Body of `POST /uc/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUcRequest {
    pub course_id: i64,
    pub name: String,
    pub ano: u8,
    pub semestre: u8,
    pub tipo: UcType,
    pub mandatory: bool,
}

/// Body of `PUT /uc/edit?ucId=`. The owning course never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUcRequest {
    pub name: String,
    pub ano: u8,
    pub semestre: u8,
    pub tipo: UcType,
    pub mandatory: bool,
}
