//! Exercises the real reqwest client against a local axum stand-in for the
//! curriculum backend, pinning paths, query parameters, and body shapes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use coursemap::api::dto::EvaluationPayload;
use coursemap::api::{BackendApi, BackendConfig, HttpBackendClient};
use coursemap::models::{
    Course, Evaluation, EvaluationKind, LoginRequest, NewCourseRequest, NewUcRequest,
    NewUserRequest, Role, Room, RoomQuery, Semester, SessionUser, Uc, UcType, UpdateUcRequest,
    UserPermissionCourse,
};
use coursemap::AppError;

#[derive(Default)]
struct ServerState {
    courses: Vec<Course>,
    ucs: Vec<Uc>,
    evaluations: Vec<Evaluation>,
    raw_saves: Vec<serde_json::Value>,
    rooms: Vec<Room>,
    users: Vec<coursemap::models::User>,
    semesters: Vec<Semester>,
    permissions: Vec<UserPermissionCourse>,
    last_exam_time: Option<String>,
    next_id: i64,
}

type Shared = Arc<Mutex<ServerState>>;

#[derive(Deserialize)]
struct UcIdQuery {
    #[serde(rename = "ucId")]
    uc_id: i64,
}

#[derive(Deserialize)]
struct CourseIdQuery {
    #[serde(rename = "courseId")]
    course_id: i64,
}

#[derive(Deserialize)]
struct RoomIdQuery {
    #[serde(rename = "roomId")]
    room_id: i64,
}

fn router(shared: Shared) -> Router {
    Router::new()
        .route("/course/getAll", get(course_get_all))
        .route("/course/add", post(course_add))
        .route("/uc/current", get(uc_current))
        .route("/uc/getUC", get(uc_get))
        .route("/uc/add", post(uc_add))
        .route("/uc/edit", put(uc_edit))
        .route("/uc/delete", delete(uc_delete))
        .route("/uc/getUcClosed", get(uc_closed))
        .route("/uc/close", post(uc_close))
        .route("/uc/open", post(uc_open))
        .route("/evaluation/get", get(eval_get))
        .route("/evaluation/save", post(eval_save))
        .route("/room/getAvailableRooms", get(rooms_available))
        .route("/room/getRoom", get(room_get))
        .route("/user/all", get(user_all))
        .route("/user/add", post(user_add))
        .route("/user/login", post(user_login))
        .route("/userPermissionCourse/add", post(permission_add))
        .route("/semester/getAll", get(semester_all))
        .route("/semester/edit", put(semester_edit))
        .with_state(shared)
}

async fn course_get_all(State(state): State<Shared>) -> Json<Vec<Course>> {
    Json(state.lock().unwrap().courses.clone())
}

async fn course_add(State(state): State<Shared>, Json(req): Json<NewCourseRequest>) -> StatusCode {
    let mut state = state.lock().unwrap();
    state.next_id += 1;
    let id = state.next_id;
    state.courses.push(Course {
        id,
        course_name: req.course_name,
    });
    StatusCode::OK
}

async fn uc_current(State(state): State<Shared>, Query(q): Query<CourseIdQuery>) -> Json<Vec<Uc>> {
    let _ = q.course_id;
    Json(state.lock().unwrap().ucs.clone())
}

async fn uc_get(
    State(state): State<Shared>,
    Query(q): Query<UcIdQuery>,
) -> Result<Json<Uc>, StatusCode> {
    state
        .lock()
        .unwrap()
        .ucs
        .iter()
        .find(|uc| uc.id == q.uc_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn uc_add(State(state): State<Shared>, Json(req): Json<NewUcRequest>) -> StatusCode {
    let mut state = state.lock().unwrap();
    state.next_id += 1;
    let id = state.next_id;
    state.ucs.push(Uc {
        id,
        name: req.name,
        ano: req.ano,
        semestre: req.semestre,
        tipo: req.tipo,
        mandatory: req.mandatory,
        ucclosed: false,
    });
    StatusCode::OK
}

async fn uc_edit(
    State(state): State<Shared>,
    Query(q): Query<UcIdQuery>,
    Json(req): Json<UpdateUcRequest>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    match state.ucs.iter_mut().find(|uc| uc.id == q.uc_id) {
        Some(uc) => {
            uc.name = req.name;
            uc.ano = req.ano;
            uc.semestre = req.semestre;
            uc.tipo = req.tipo;
            uc.mandatory = req.mandatory;
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn uc_delete(State(state): State<Shared>, Query(q): Query<UcIdQuery>) -> StatusCode {
    state.lock().unwrap().ucs.retain(|uc| uc.id != q.uc_id);
    StatusCode::OK
}

async fn uc_closed(
    State(state): State<Shared>,
    Query(q): Query<UcIdQuery>,
) -> Result<Json<bool>, StatusCode> {
    state
        .lock()
        .unwrap()
        .ucs
        .iter()
        .find(|uc| uc.id == q.uc_id)
        .map(|uc| Json(uc.ucclosed))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn uc_close(
    State(state): State<Shared>,
    Query(q): Query<UcIdQuery>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut state = state.lock().unwrap();
    match state.ucs.iter_mut().find(|uc| uc.id == q.uc_id) {
        Some(uc) if uc.ucclosed => Err((
            StatusCode::CONFLICT,
            format!("UC {} is already closed", q.uc_id),
        )),
        Some(uc) => {
            uc.ucclosed = true;
            Ok(StatusCode::OK)
        }
        None => Err((StatusCode::NOT_FOUND, "no such UC".to_string())),
    }
}

async fn uc_open(State(state): State<Shared>, Query(q): Query<UcIdQuery>) -> StatusCode {
    let mut state = state.lock().unwrap();
    if let Some(uc) = state.ucs.iter_mut().find(|uc| uc.id == q.uc_id) {
        uc.ucclosed = false;
    }
    StatusCode::OK
}

async fn eval_get(State(state): State<Shared>, Query(q): Query<UcIdQuery>) -> Json<Vec<Evaluation>> {
    Json(
        state
            .lock()
            .unwrap()
            .evaluations
            .iter()
            .filter(|ev| ev.uc_id == q.uc_id)
            .cloned()
            .collect(),
    )
}

async fn eval_save(
    State(state): State<Shared>,
    Query(q): Query<UcIdQuery>,
    Json(records): Json<Vec<serde_json::Value>>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut state = state.lock().unwrap();
    state.evaluations.retain(|ev| ev.uc_id != q.uc_id);
    for record in records {
        let payload: EvaluationPayload = serde_json::from_value(record.clone())
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        state.next_id += 1;
        let id = state.next_id;
        state.evaluations.push(Evaluation {
            id: Some(id),
            uc_id: q.uc_id,
            kind: payload.kind,
            weight: payload.weight,
            date: payload.date,
            room_id: payload.room_id,
            student_num: payload.student_num,
            need_computer: payload.need_computer,
        });
        state.raw_saves.push(record);
    }
    Ok(StatusCode::OK)
}

async fn rooms_available(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Room>>, StatusCode> {
    let exam_time = params.get("examTime").ok_or(StatusCode::BAD_REQUEST)?;
    let student_num: u32 = params
        .get("studentNum")
        .and_then(|raw| raw.parse().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;
    let _need_computer: bool = params
        .get("needComputer")
        .and_then(|raw| raw.parse().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;

    let mut state = state.lock().unwrap();
    state.last_exam_time = Some(exam_time.clone());
    Ok(Json(
        state
            .rooms
            .iter()
            .filter(|room| room.capacity >= student_num)
            .cloned()
            .collect(),
    ))
}

async fn room_get(
    State(state): State<Shared>,
    Query(q): Query<RoomIdQuery>,
) -> Result<Json<Room>, StatusCode> {
    state
        .lock()
        .unwrap()
        .rooms
        .iter()
        .find(|room| room.id == q.room_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn user_all(State(state): State<Shared>) -> Json<Vec<coursemap::models::User>> {
    Json(state.lock().unwrap().users.clone())
}

async fn user_add(State(state): State<Shared>, Json(req): Json<NewUserRequest>) -> StatusCode {
    let mut state = state.lock().unwrap();
    state.next_id += 1;
    let id = state.next_id;
    state.users.push(coursemap::models::User {
        id,
        name: req.name,
        username: req.username,
        email: req.email,
        role: req.role,
    });
    StatusCode::OK
}

async fn user_login(
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionUser>, (StatusCode, String)> {
    if req.username == "astaff" && req.password == "secret" {
        Ok(Json(SessionUser {
            id: 1,
            name: "Alice Staff".to_string(),
            username: "astaff".to_string(),
            email: "astaff@example.edu".to_string(),
            role: Role::Admin,
        }))
    } else {
        Err((StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()))
    }
}

async fn permission_add(
    State(state): State<Shared>,
    Json(perm): Json<UserPermissionCourse>,
) -> StatusCode {
    state.lock().unwrap().permissions.push(perm);
    StatusCode::OK
}

async fn semester_all(State(state): State<Shared>) -> Json<Vec<Semester>> {
    Json(state.lock().unwrap().semesters.clone())
}

async fn semester_edit(State(state): State<Shared>, Json(semester): Json<Semester>) -> StatusCode {
    let mut state = state.lock().unwrap();
    match state
        .semesters
        .iter_mut()
        .find(|s| s.num_semester == semester.num_semester)
    {
        Some(existing) => {
            *existing = semester;
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn spawn_backend() -> (Shared, HttpBackendClient) {
    let shared: Shared = Arc::new(Mutex::new(ServerState::default()));
    let app = router(shared.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    let client = HttpBackendClient::new(BackendConfig::with_base_url(format!("http://{addr}")))
        .expect("client");
    (shared, client)
}

#[tokio::test]
async fn course_create_and_list_round_trip() {
    let (_state, client) = spawn_backend().await;

    client
        .create_course(&NewCourseRequest {
            course_name: "Informatics".to_string(),
        })
        .await
        .expect("create");

    let courses = client.fetch_courses().await.expect("list");
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].course_name, "Informatics");
}

#[tokio::test]
async fn uc_lifecycle_over_http() {
    let (_state, client) = spawn_backend().await;

    client
        .create_uc(&NewUcRequest {
            course_id: 1,
            name: "Databases".to_string(),
            ano: 2,
            semestre: 1,
            tipo: UcType::Mixed,
            mandatory: true,
        })
        .await
        .expect("create uc");

    let ucs = client.fetch_current_ucs(1).await.expect("current");
    assert_eq!(ucs.len(), 1);
    let uc_id = ucs[0].id;
    assert!(!client.fetch_uc_closed(uc_id).await.expect("closed?"));

    client
        .update_uc(
            uc_id,
            &UpdateUcRequest {
                name: "Databases II".to_string(),
                ano: 3,
                semestre: 2,
                tipo: UcType::Continuous,
                mandatory: false,
            },
        )
        .await
        .expect("update");
    let uc = client.fetch_uc(uc_id).await.expect("get");
    assert_eq!(uc.name, "Databases II");
    assert_eq!(uc.tipo, UcType::Continuous);

    client.close_uc(uc_id).await.expect("close");
    assert!(client.fetch_uc_closed(uc_id).await.expect("closed?"));

    // Closing twice: the backend's own error text must come through.
    let err = client.close_uc(uc_id).await.expect_err("second close");
    match err {
        AppError::Backend { status, message } => {
            assert_eq!(status, 409);
            assert!(message.contains("already closed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    client.open_uc(uc_id).await.expect("open");
    client.delete_uc(uc_id).await.expect("delete");
    let err = client.fetch_uc(uc_id).await.expect_err("gone");
    assert!(matches!(err, AppError::Backend { status: 404, .. }));
}

#[tokio::test]
async fn bulk_save_sends_idless_camel_case_records() {
    let (state, client) = spawn_backend().await;

    let payloads = vec![
        EvaluationPayload {
            date: "2026-01-15T10:00".to_string(),
            need_computer: true,
            room_id: 7,
            student_num: 25,
            kind: EvaluationKind::FinalExam,
            uc_id: 3,
            weight: 60,
        },
        EvaluationPayload {
            date: "2026-01-20T14:00".to_string(),
            need_computer: false,
            room_id: -1,
            student_num: 25,
            kind: EvaluationKind::DeliveryOfGroupWork,
            uc_id: 3,
            weight: 40,
        },
    ];
    client.save_evaluations(3, &payloads).await.expect("save");

    {
        let state = state.lock().unwrap();
        assert_eq!(state.raw_saves.len(), 2);
        for raw in &state.raw_saves {
            let object = raw.as_object().expect("json object");
            assert!(!object.contains_key("id"));
            for key in ["date", "needComputer", "roomId", "studentNum", "type", "ucId", "weight"] {
                assert!(object.contains_key(key), "missing wire field {key}");
            }
        }
        assert_eq!(state.raw_saves[0]["type"], "Final Exam");
    }

    let fetched = client.fetch_evaluations(3).await.expect("fetch");
    assert_eq!(fetched.len(), 2);
    assert!(fetched.iter().all(|ev| ev.id.is_some()));
    assert_eq!(fetched[1].room_id, -1);
}

#[tokio::test]
async fn room_query_carries_all_three_constraints() {
    let (state, client) = spawn_backend().await;
    {
        let mut state = state.lock().unwrap();
        state.rooms.push(Room {
            id: 1,
            designation: "Computer lab".to_string(),
            room_type: "lab".to_string(),
            capacity: 30,
            location: "Building C".to_string(),
            room_num_name: "C-101".to_string(),
        });
        state.rooms.push(Room {
            id: 2,
            designation: "Lecture room".to_string(),
            room_type: "classroom".to_string(),
            capacity: 10,
            location: "Building C".to_string(),
            room_num_name: "C-102".to_string(),
        });
    }

    let rooms = client
        .fetch_available_rooms(&RoomQuery {
            exam_time: "2026-01-15T10:00".to_string(),
            student_num: 20,
            need_computer: true,
        })
        .await
        .expect("rooms");

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].room_num_name, "C-101");
    assert_eq!(
        state.lock().unwrap().last_exam_time.as_deref(),
        Some("2026-01-15T10:00")
    );

    let room = client.fetch_room(1).await.expect("room by id");
    assert_eq!(room.id, 1);
    let err = client.fetch_room(99).await.expect_err("missing room");
    assert!(matches!(err, AppError::Backend { status: 404, .. }));
}

#[tokio::test]
async fn login_round_trip_and_rejection() {
    let (_state, client) = spawn_backend().await;

    let user = client
        .login(&LoginRequest {
            username: "astaff".to_string(),
            password: "secret".to_string(),
        })
        .await
        .expect("login");
    assert_eq!(user.role, Role::Admin);

    let err = client
        .login(&LoginRequest {
            username: "astaff".to_string(),
            password: "nope".to_string(),
        })
        .await
        .expect_err("rejected");
    assert!(matches!(err, AppError::Backend { status: 401, .. }));
}

#[tokio::test]
async fn permissions_and_semesters_over_http() {
    let (state, client) = spawn_backend().await;
    state.lock().unwrap().semesters.push(Semester {
        id: 1,
        num_semester: 1,
        start_date: "2025-09-15".to_string(),
        end_date: "2026-01-31".to_string(),
    });

    client
        .add_course_permission(&UserPermissionCourse {
            user_id: 4,
            course_id: 9,
        })
        .await
        .expect("permission");
    assert_eq!(state.lock().unwrap().permissions.len(), 1);

    client
        .update_semester(&Semester {
            id: 1,
            num_semester: 1,
            start_date: "2025-09-22".to_string(),
            end_date: "2026-02-06".to_string(),
        })
        .await
        .expect("semester edit");

    let semesters = client.fetch_semesters().await.expect("semesters");
    assert_eq!(semesters[0].start_date, "2025-09-22");

    client
        .create_user(&NewUserRequest {
            username: "bob".to_string(),
            name: "Bob".to_string(),
            email: "bob@example.edu".to_string(),
            password: "pw".to_string(),
            role: Role::User,
        })
        .await
        .expect("user add");
    let users = client.fetch_users().await.expect("users");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "bob");
}
