pub mod dto;
pub mod stub;

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::{
    Course, Evaluation, LoginRequest, NewCourseRequest, NewUcRequest, NewUserRequest, Room,
    RoomQuery, Semester, SessionUser, Uc, UpdateUcRequest, User, UserPermissionCourse,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    pub fn new_from_env() -> Self {
        let base_url =
            env::var("COURSEMAP_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        BackendConfig { base_url }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        BackendConfig {
            base_url: base_url.into(),
        }
    }
}

/// The remote curriculum service. Everything the application does goes
/// through this seam; tests substitute [`stub::StubBackend`].
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn create_course(&self, req: &NewCourseRequest) -> Result<(), AppError>;

    async fn fetch_current_ucs(&self, course_id: i64) -> Result<Vec<Uc>, AppError>;
    async fn fetch_uc(&self, uc_id: i64) -> Result<Uc, AppError>;
    async fn create_uc(&self, req: &NewUcRequest) -> Result<(), AppError>;
    async fn update_uc(&self, uc_id: i64, req: &UpdateUcRequest) -> Result<(), AppError>;
    async fn delete_uc(&self, uc_id: i64) -> Result<(), AppError>;
    async fn fetch_uc_closed(&self, uc_id: i64) -> Result<bool, AppError>;
    async fn close_uc(&self, uc_id: i64) -> Result<(), AppError>;
    async fn open_uc(&self, uc_id: i64) -> Result<(), AppError>;

    async fn fetch_evaluations(&self, uc_id: i64) -> Result<Vec<Evaluation>, AppError>;
    async fn save_evaluations(
        &self,
        uc_id: i64,
        evaluations: &[dto::EvaluationPayload],
    ) -> Result<(), AppError>;

    async fn fetch_available_rooms(&self, query: &RoomQuery) -> Result<Vec<Room>, AppError>;
    async fn fetch_room(&self, room_id: i64) -> Result<Room, AppError>;

    async fn fetch_users(&self) -> Result<Vec<User>, AppError>;
    async fn create_user(&self, req: &NewUserRequest) -> Result<(), AppError>;
    async fn login(&self, req: &LoginRequest) -> Result<SessionUser, AppError>;
    async fn add_course_permission(&self, perm: &UserPermissionCourse) -> Result<(), AppError>;

    async fn fetch_semesters(&self) -> Result<Vec<Semester>, AppError>;
    async fn update_semester(&self, semester: &Semester) -> Result<(), AppError>;
}

pub struct HttpBackendClient {
    client: Client,
    config: BackendConfig,
}

impl HttpBackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        Ok(HttpBackendClient { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Maps a non-success status to [`AppError::Backend`], keeping whatever
    /// text the backend put in the body.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("backend error {}: {}", status, message);
            return Err(AppError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.client.get(self.url(path)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl BackendApi for HttpBackendClient {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        self.get_json("/course/getAll").await
    }

    async fn create_course(&self, req: &NewCourseRequest) -> Result<(), AppError> {
        self.post_json("/course/add", req).await
    }

    async fn fetch_current_ucs(&self, course_id: i64) -> Result<Vec<Uc>, AppError> {
        self.get_json(&format!("/uc/current?courseId={course_id}"))
            .await
    }

    async fn fetch_uc(&self, uc_id: i64) -> Result<Uc, AppError> {
        self.get_json(&format!("/uc/getUC?ucId={uc_id}")).await
    }

    async fn create_uc(&self, req: &NewUcRequest) -> Result<(), AppError> {
        self.post_json("/uc/add", req).await
    }

    async fn update_uc(&self, uc_id: i64, req: &UpdateUcRequest) -> Result<(), AppError> {
        self.put_json(&format!("/uc/edit?ucId={uc_id}"), req).await
    }

    async fn delete_uc(&self, uc_id: i64) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.url(&format!("/uc/delete?ucId={uc_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_uc_closed(&self, uc_id: i64) -> Result<bool, AppError> {
        self.get_json(&format!("/uc/getUcClosed?ucId={uc_id}"))
            .await
    }

    async fn close_uc(&self, uc_id: i64) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url(&format!("/uc/close?ucId={uc_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn open_uc(&self, uc_id: i64) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url(&format!("/uc/open?ucId={uc_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_evaluations(&self, uc_id: i64) -> Result<Vec<Evaluation>, AppError> {
        self.get_json(&format!("/evaluation/get?ucId={uc_id}"))
            .await
    }

    async fn save_evaluations(
        &self,
        uc_id: i64,
        evaluations: &[dto::EvaluationPayload],
    ) -> Result<(), AppError> {
        self.post_json(&format!("/evaluation/save?ucId={uc_id}"), evaluations)
            .await
    }

    async fn fetch_available_rooms(&self, query: &RoomQuery) -> Result<Vec<Room>, AppError> {
        // examTime carries a datetime-local string, let reqwest encode it.
        let response = self
            .client
            .get(self.url("/room/getAvailableRooms"))
            .query(&[
                ("examTime", query.exam_time.as_str()),
                ("studentNum", &query.student_num.to_string()),
                ("needComputer", &query.need_computer.to_string()),
            ])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn fetch_room(&self, room_id: i64) -> Result<Room, AppError> {
        self.get_json(&format!("/room/getRoom?roomId={room_id}"))
            .await
    }

    async fn fetch_users(&self) -> Result<Vec<User>, AppError> {
        self.get_json("/user/all").await
    }

    async fn create_user(&self, req: &NewUserRequest) -> Result<(), AppError> {
        self.post_json("/user/add", req).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<SessionUser, AppError> {
        let response = self
            .client
            .post(self.url("/user/login"))
            .json(req)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn add_course_permission(&self, perm: &UserPermissionCourse) -> Result<(), AppError> {
        self.post_json("/userPermissionCourse/add", perm).await
    }

    async fn fetch_semesters(&self) -> Result<Vec<Semester>, AppError> {
        self.get_json("/semester/getAll").await
    }

    async fn update_semester(&self, semester: &Semester) -> Result<(), AppError> {
        self.put_json("/semester/edit", semester).await
    }
}
