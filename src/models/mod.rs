pub mod course;
pub mod evaluation;
pub mod room;
pub mod semester;
pub mod uc;
pub mod user;

pub use course::{Course, NewCourseRequest};
pub use evaluation::{DraftUpdate, Evaluation, EvaluationDraft, EvaluationKind, RoomAssignment};
pub use room::{Room, RoomQuery};
pub use semester::Semester;
pub use uc::{NewUcRequest, Uc, UcType, UpdateUcRequest};
pub use user::{LoginRequest, NewUserRequest, Role, SessionUser, User, UserPermissionCourse};
