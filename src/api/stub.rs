//! In-memory [`BackendApi`] double for tests: serves fixture data, records
//! every call, and fails on demand per operation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{
    Course, Evaluation, LoginRequest, NewCourseRequest, NewUcRequest, NewUserRequest, Room,
    RoomQuery, Semester, SessionUser, Uc, UpdateUcRequest, User, UserPermissionCourse,
};

use super::dto::EvaluationPayload;
use super::BackendApi;

#[derive(Default)]
struct StubState {
    courses: Vec<Course>,
    ucs: Vec<Uc>,
    evaluations: Vec<Evaluation>,
    rooms: Vec<Room>,
    users: Vec<User>,
    semesters: Vec<Semester>,
    permissions: Vec<UserPermissionCourse>,
    session_user: Option<SessionUser>,
    saved: Vec<(i64, Vec<EvaluationPayload>)>,
    calls: Vec<String>,
    failures: HashMap<String, (u16, String)>,
    failing_permission_courses: Vec<i64>,
    next_id: i64,
}

#[derive(Default)]
pub struct StubBackend {
    state: Mutex<StubState>,
}

impl StubBackend {
    pub fn new() -> Self {
        StubBackend::default()
    }

    pub fn push_course(&self, course: Course) {
        self.lock().courses.push(course);
    }

    pub fn push_uc(&self, uc: Uc) {
        self.lock().ucs.push(uc);
    }

    pub fn push_evaluation(&self, ev: Evaluation) {
        self.lock().evaluations.push(ev);
    }

    pub fn push_room(&self, room: Room) {
        self.lock().rooms.push(room);
    }

    pub fn push_user(&self, user: User) {
        self.lock().users.push(user);
    }

    pub fn push_semester(&self, semester: Semester) {
        self.lock().semesters.push(semester);
    }

    pub fn set_session_user(&self, user: SessionUser) {
        self.lock().session_user = Some(user);
    }

    /// Makes `op` answer with a 500 and a canned body.
    pub fn fail_on(&self, op: &str) {
        self.fail_on_with(op, 500, "stub failure");
    }

    pub fn fail_on_with(&self, op: &str, status: u16, message: &str) {
        self.lock()
            .failures
            .insert(op.to_string(), (status, message.to_string()));
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.failures.clear();
        state.failing_permission_courses.clear();
    }

    /// Makes permission writes fail for one course id only.
    pub fn fail_permission_for(&self, course_id: i64) {
        self.lock().failing_permission_courses.push(course_id);
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| c == &op).count()
    }

    /// Every bulk-save body this stub has received, oldest first.
    pub fn saved(&self) -> Vec<(i64, Vec<EvaluationPayload>)> {
        self.lock().saved.clone()
    }

    pub fn uc_closed(&self, uc_id: i64) -> Option<bool> {
        self.lock()
            .ucs
            .iter()
            .find(|uc| uc.id == uc_id)
            .map(|uc| uc.ucclosed)
    }

    pub fn permissions(&self) -> Vec<UserPermissionCourse> {
        self.lock().permissions.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().expect("stub state poisoned")
    }

    fn record(&self, op: &str) -> Result<(), AppError> {
        let mut state = self.lock();
        state.calls.push(op.to_string());
        if let Some((status, message)) = state.failures.get(op) {
            return Err(AppError::Backend {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(())
    }

    fn alloc_id(state: &mut StubState) -> i64 {
        state.next_id += 1;
        state.next_id
    }
}

#[async_trait]
impl BackendApi for StubBackend {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        self.record("fetch_courses")?;
        Ok(self.lock().courses.clone())
    }

    async fn create_course(&self, req: &NewCourseRequest) -> Result<(), AppError> {
        self.record("create_course")?;
        let mut state = self.lock();
        let id = Self::alloc_id(&mut state);
        state.courses.push(Course {
            id,
            course_name: req.course_name.clone(),
        });
        Ok(())
    }

    async fn fetch_current_ucs(&self, course_id: i64) -> Result<Vec<Uc>, AppError> {
        self.record("fetch_current_ucs")?;
        let _ = course_id;
        Ok(self.lock().ucs.clone())
    }

    async fn fetch_uc(&self, uc_id: i64) -> Result<Uc, AppError> {
        self.record("fetch_uc")?;
        self.lock()
            .ucs
            .iter()
            .find(|uc| uc.id == uc_id)
            .cloned()
            .ok_or_else(|| AppError::Backend {
                status: 404,
                message: format!("no UC {uc_id}"),
            })
    }

    async fn create_uc(&self, req: &NewUcRequest) -> Result<(), AppError> {
        self.record("create_uc")?;
        let mut state = self.lock();
        let id = Self::alloc_id(&mut state);
        state.ucs.push(Uc {
            id,
            name: req.name.clone(),
            ano: req.ano,
            semestre: req.semestre,
            tipo: req.tipo,
            mandatory: req.mandatory,
            ucclosed: false,
        });
        Ok(())
    }

    async fn update_uc(&self, uc_id: i64, req: &UpdateUcRequest) -> Result<(), AppError> {
        self.record("update_uc")?;
        let mut state = self.lock();
        if let Some(uc) = state.ucs.iter_mut().find(|uc| uc.id == uc_id) {
            uc.name = req.name.clone();
            uc.ano = req.ano;
            uc.semestre = req.semestre;
            uc.tipo = req.tipo;
            uc.mandatory = req.mandatory;
        }
        Ok(())
    }

    async fn delete_uc(&self, uc_id: i64) -> Result<(), AppError> {
        self.record("delete_uc")?;
        self.lock().ucs.retain(|uc| uc.id != uc_id);
        Ok(())
    }

    async fn fetch_uc_closed(&self, uc_id: i64) -> Result<bool, AppError> {
        self.record("fetch_uc_closed")?;
        Ok(self.uc_closed(uc_id).unwrap_or(false))
    }

    async fn close_uc(&self, uc_id: i64) -> Result<(), AppError> {
        self.record("close_uc")?;
        let mut state = self.lock();
        if let Some(uc) = state.ucs.iter_mut().find(|uc| uc.id == uc_id) {
            uc.ucclosed = true;
        }
        Ok(())
    }

    async fn open_uc(&self, uc_id: i64) -> Result<(), AppError> {
        self.record("open_uc")?;
        let mut state = self.lock();
        if let Some(uc) = state.ucs.iter_mut().find(|uc| uc.id == uc_id) {
            uc.ucclosed = false;
        }
        Ok(())
    }

    async fn fetch_evaluations(&self, uc_id: i64) -> Result<Vec<Evaluation>, AppError> {
        self.record("fetch_evaluations")?;
        Ok(self
            .lock()
            .evaluations
            .iter()
            .filter(|ev| ev.uc_id == uc_id)
            .cloned()
            .collect())
    }

    async fn save_evaluations(
        &self,
        uc_id: i64,
        evaluations: &[EvaluationPayload],
    ) -> Result<(), AppError> {
        self.record("save_evaluations")?;
        let mut state = self.lock();
        state.saved.push((uc_id, evaluations.to_vec()));
        // Replace-the-set semantics, ids reassigned server-side.
        state.evaluations.retain(|ev| ev.uc_id != uc_id);
        let mut replacements = Vec::with_capacity(evaluations.len());
        for payload in evaluations {
            let id = Self::alloc_id(&mut state);
            replacements.push(Evaluation {
                id: Some(id),
                uc_id,
                kind: payload.kind,
                weight: payload.weight,
                date: payload.date.clone(),
                room_id: payload.room_id,
                student_num: payload.student_num,
                need_computer: payload.need_computer,
            });
        }
        state.evaluations.extend(replacements);
        Ok(())
    }

    async fn fetch_available_rooms(&self, query: &RoomQuery) -> Result<Vec<Room>, AppError> {
        self.record("fetch_available_rooms")?;
        Ok(self
            .lock()
            .rooms
            .iter()
            .filter(|room| room.capacity >= query.student_num)
            .cloned()
            .collect())
    }

    async fn fetch_room(&self, room_id: i64) -> Result<Room, AppError> {
        self.record("fetch_room")?;
        self.lock()
            .rooms
            .iter()
            .find(|room| room.id == room_id)
            .cloned()
            .ok_or_else(|| AppError::Backend {
                status: 404,
                message: format!("no room {room_id}"),
            })
    }

    async fn fetch_users(&self) -> Result<Vec<User>, AppError> {
        self.record("fetch_users")?;
        Ok(self.lock().users.clone())
    }

    async fn create_user(&self, req: &NewUserRequest) -> Result<(), AppError> {
        self.record("create_user")?;
        let mut state = self.lock();
        let id = Self::alloc_id(&mut state);
        state.users.push(User {
            id,
            name: req.name.clone(),
            username: req.username.clone(),
            email: req.email.clone(),
            role: req.role,
        });
        Ok(())
    }

    async fn login(&self, req: &LoginRequest) -> Result<SessionUser, AppError> {
        self.record("login")?;
        let _ = req;
        self.lock()
            .session_user
            .clone()
            .ok_or_else(|| AppError::Backend {
                status: 401,
                message: "invalid credentials".to_string(),
            })
    }

    async fn add_course_permission(&self, perm: &UserPermissionCourse) -> Result<(), AppError> {
        self.record("add_course_permission")?;
        let mut state = self.lock();
        if state.failing_permission_courses.contains(&perm.course_id) {
            return Err(AppError::Backend {
                status: 500,
                message: format!("permission write rejected for course {}", perm.course_id),
            });
        }
        state.permissions.push(perm.clone());
        Ok(())
    }

    async fn fetch_semesters(&self) -> Result<Vec<Semester>, AppError> {
        self.record("fetch_semesters")?;
        Ok(self.lock().semesters.clone())
    }

    async fn update_semester(&self, semester: &Semester) -> Result<(), AppError> {
        self.record("update_semester")?;
        let mut state = self.lock();
        if let Some(existing) = state
            .semesters
            .iter_mut()
            .find(|s| s.num_semester == semester.num_semester)
        {
            *existing = semester.clone();
        }
        Ok(())
    }
}
