use serde::{Deserialize, Serialize};

/// Reference data from the backend's availability query. Never created or
/// edited by this client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub designation: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub capacity: u32,
    pub location: String,
    pub room_num_name: String,
}

/// Constraints for `GET /room/getAvailableRooms`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomQuery {
    pub exam_time: String,
    pub student_num: u32,
    pub need_computer: bool,
}
