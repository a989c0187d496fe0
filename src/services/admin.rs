use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::BackendApi;
use crate::error::AppError;
use crate::models::{
    NewCourseRequest, NewUcRequest, NewUserRequest, Semester, Uc, UpdateUcRequest, User,
    UserPermissionCourse,
};

pub const MSG_COURSE_NAME_REQUIRED: &str = "Course name is required.";
pub const MSG_UC_NAME_REQUIRED: &str = "UC name is required.";
pub const MSG_UC_YEAR_RANGE: &str = "Year must be between 1 and 3.";
pub const MSG_UC_SEMESTER_RANGE: &str = "Semester must be 1 or 2.";
pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields.";
pub const MSG_SELECT_USER_AND_COURSE: &str = "Please select a user and at least one course";
pub const MSG_DATE_FORMAT: &str = "Dates must be YYYY-MM-DD.";

/// Result of one permission write in a bulk assignment. Writes are issued
/// sequentially so a failure in one course leaves the others reported
/// individually.
#[derive(Debug)]
pub struct AssignmentOutcome {
    pub course_id: i64,
    pub result: Result<(), AppError>,
}

impl AssignmentOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// The administrative forms: each is required-field validation followed by
/// a single REST call. No cross-form state.
pub struct AdminService {
    api: Arc<dyn BackendApi>,
}

impl AdminService {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        AdminService { api }
    }

    pub async fn add_course(&self, name: &str) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(AppError::validation(MSG_COURSE_NAME_REQUIRED));
        }
        let req = NewCourseRequest {
            course_name: name.trim().to_string(),
        };
        self.api.create_course(&req).await?;
        info!("course added: {}", req.course_name);
        Ok(())
    }

    pub async fn add_uc(&self, req: NewUcRequest) -> Result<(), AppError> {
        Self::validate_uc_fields(&req.name, req.ano, req.semestre)?;
        self.api.create_uc(&req).await?;
        info!("UC added to course {}: {}", req.course_id, req.name);
        Ok(())
    }

    /// Current state of a UC, for prefilling the edit form.
    pub async fn uc(&self, uc_id: i64) -> Result<Uc, AppError> {
        self.api.fetch_uc(uc_id).await
    }

    pub async fn edit_uc(&self, uc_id: i64, req: UpdateUcRequest) -> Result<(), AppError> {
        Self::validate_uc_fields(&req.name, req.ano, req.semestre)?;
        self.api.update_uc(uc_id, &req).await?;
        info!("UC {} updated", uc_id);
        Ok(())
    }

    fn validate_uc_fields(name: &str, ano: u8, semestre: u8) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(AppError::validation(MSG_UC_NAME_REQUIRED));
        }
        if !(1..=3).contains(&ano) {
            return Err(AppError::validation(MSG_UC_YEAR_RANGE));
        }
        if !(1..=2).contains(&semestre) {
            return Err(AppError::validation(MSG_UC_SEMESTER_RANGE));
        }
        Ok(())
    }

    pub async fn users(&self) -> Result<Vec<User>, AppError> {
        self.api.fetch_users().await
    }

    pub async fn add_user(&self, req: NewUserRequest) -> Result<(), AppError> {
        if req.username.trim().is_empty()
            || req.name.trim().is_empty()
            || req.email.trim().is_empty()
            || req.password.is_empty()
        {
            return Err(AppError::validation(MSG_FILL_ALL_FIELDS));
        }
        self.api.create_user(&req).await?;
        info!("user added: {}", req.username);
        Ok(())
    }

    /// Grants a user visibility into each listed course, one write per
    /// course, sequentially. Every write gets its own outcome; a failure
    /// does not stop the remainder.
    pub async fn assign_courses(
        &self,
        user_id: i64,
        course_ids: &[i64],
    ) -> Result<Vec<AssignmentOutcome>, AppError> {
        if course_ids.is_empty() {
            return Err(AppError::validation(MSG_SELECT_USER_AND_COURSE));
        }
        let mut outcomes = Vec::with_capacity(course_ids.len());
        for &course_id in course_ids {
            let perm = UserPermissionCourse { user_id, course_id };
            let result = self.api.add_course_permission(&perm).await;
            if let Err(err) = &result {
                warn!(
                    "permission write failed for user {} course {}: {}",
                    user_id, course_id, err
                );
            }
            outcomes.push(AssignmentOutcome { course_id, result });
        }
        Ok(outcomes)
    }

    pub async fn semesters(&self) -> Result<Vec<Semester>, AppError> {
        self.api.fetch_semesters().await
    }

    pub async fn update_semester(&self, semester: Semester) -> Result<(), AppError> {
        if semester.start_date.trim().is_empty() || semester.end_date.trim().is_empty() {
            return Err(AppError::validation(MSG_FILL_ALL_FIELDS));
        }
        if NaiveDate::parse_from_str(&semester.start_date, "%Y-%m-%d").is_err()
            || NaiveDate::parse_from_str(&semester.end_date, "%Y-%m-%d").is_err()
        {
            return Err(AppError::validation(MSG_DATE_FORMAT));
        }
        self.api.update_semester(&semester).await?;
        info!("semester {} updated", semester.num_semester);
        Ok(())
    }
}
