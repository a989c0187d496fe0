use serde::{Deserialize, Serialize};

/// One of the two semester records. They are edited in place via
/// `PUT /semester/edit`, never created or deleted. Dates are `YYYY-MM-DD`
/// strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Semester {
    pub id: i64,
    pub num_semester: u8,
    pub start_date: String,
    pub end_date: String,
}
