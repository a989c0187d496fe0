use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::api::BackendApi;
use crate::error::AppError;
use crate::models::{Room, RoomAssignment, RoomQuery};

pub const MSG_INVALID_SEARCH: &str = "Please enter valid inputs for all fields.";
pub const MSG_ROOMS_FAILED: &str = "Could not fetch rooms. Please try again.";
pub const UNKNOWN_ROOM_LABEL: &str = "Unknown room";

/// The `datetime-local` shape evaluation dates travel in.
pub const EXAM_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Room selection for one evaluation draft: runs the availability query and
/// binds a result to the draft being edited. Results are not cached between
/// searches and there is no pagination.
pub struct RoomPicker {
    api: Arc<dyn BackendApi>,
    rooms: Vec<Room>,
    open: bool,
    error: Option<String>,
}

impl RoomPicker {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        RoomPicker {
            api,
            rooms: Vec::new(),
            open: false,
            error: None,
        }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Runs the availability query. All constraints are required and the
    /// headcount must be positive; violations fail locally with an input
    /// message and no request. The picker opens with whatever the query
    /// returned (or its error).
    pub async fn search(
        &mut self,
        exam_time: &str,
        student_num: u32,
        need_computer: bool,
    ) -> Result<&[Room], AppError> {
        if student_num == 0 || NaiveDateTime::parse_from_str(exam_time, EXAM_TIME_FORMAT).is_err() {
            self.error = Some(MSG_INVALID_SEARCH.to_string());
            return Err(AppError::validation(MSG_INVALID_SEARCH));
        }

        let query = RoomQuery {
            exam_time: exam_time.to_string(),
            student_num,
            need_computer,
        };
        self.open = true;
        match self.api.fetch_available_rooms(&query).await {
            Ok(rooms) => {
                self.error = None;
                self.rooms = rooms;
                Ok(&self.rooms)
            }
            Err(err) => {
                warn!("room search failed: {}", err);
                self.error = Some(MSG_ROOMS_FAILED.to_string());
                Err(err)
            }
        }
    }

    /// Display name for a room id, for ids that were assigned in an earlier
    /// session and are missing from the last result set. Failures substitute
    /// a placeholder instead of propagating.
    pub async fn resolve_label(&self, room_id: i64) -> String {
        if let Some(room) = self.rooms.iter().find(|room| room.id == room_id) {
            return room.room_num_name.clone();
        }
        match self.api.fetch_room(room_id).await {
            Ok(room) => room.room_num_name,
            Err(err) => {
                warn!("room {} lookup failed: {}", room_id, err);
                UNKNOWN_ROOM_LABEL.to_string()
            }
        }
    }

    /// Binds a room from the last result set and closes the picker.
    /// `None` when the id is not among the results.
    pub fn select(&mut self, room_id: i64) -> Option<RoomAssignment> {
        if self.rooms.iter().any(|room| room.id == room_id) {
            self.open = false;
            Some(RoomAssignment::Room(room_id))
        } else {
            None
        }
    }
}
