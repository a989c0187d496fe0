pub mod admin;
pub mod directory;
pub mod editor;
pub mod rooms;

pub use admin::{AdminService, AssignmentOutcome};
pub use directory::CourseDirectory;
pub use editor::{EvaluationEditor, Feedback, LoadState};
pub use rooms::RoomPicker;
