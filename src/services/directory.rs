use std::sync::Arc;

use crate::api::BackendApi;
use crate::error::AppError;
use crate::models::{Course, Uc};

/// Read-only navigation layer: courses and their current UCs.
pub struct CourseDirectory {
    api: Arc<dyn BackendApi>,
}

impl CourseDirectory {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        CourseDirectory { api }
    }

    pub async fn courses(&self) -> Result<Vec<Course>, AppError> {
        self.api.fetch_courses().await
    }

    /// A course's current UCs, sorted ascending by academic year. The
    /// backend returns them unordered; sorting happens client-side.
    pub async fn current_ucs(&self, course_id: i64) -> Result<Vec<Uc>, AppError> {
        let mut ucs = self.api.fetch_current_ucs(course_id).await?;
        ucs.sort_by_key(|uc| uc.ano);
        Ok(ucs)
    }

    /// Whether every UC is closed, which is what gates generating the
    /// course map.
    pub fn all_closed(ucs: &[Uc]) -> bool {
        ucs.iter().all(|uc| uc.ucclosed)
    }
}
