use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursemap::error::AppError;
use coursemap::models::{NewUcRequest, NewUserRequest, Role, Semester, UcType, UpdateUcRequest};
use coursemap::services::{
    AdminService, AssignmentOutcome, CourseDirectory, EvaluationEditor, RoomPicker,
};
use coursemap::state::AppState;

#[derive(Parser)]
#[command(name = "coursemap")]
#[command(about = "Administration client for the curriculum backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login { username: String, password: String },
    /// Clear the persisted session
    Logout,
    /// Show the current session
    Whoami,
    /// Course directory
    Courses {
        #[command(subcommand)]
        command: CourseCommand,
    },
    /// Curricular units
    Uc {
        #[command(subcommand)]
        command: UcCommand,
    },
    /// Show a UC's saved evaluations
    Evaluations { uc_id: i64 },
    /// Query available rooms for an exam slot
    Rooms {
        /// Exam date and time, e.g. 2026-01-15T10:00
        exam_time: String,
        /// Expected number of students
        students: u32,
        #[arg(long)]
        computer: bool,
    },
    /// User administration (admin only)
    Users {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Grant a user visibility into courses (admin only)
    Assign {
        user_id: i64,
        #[arg(required = true)]
        course_ids: Vec<i64>,
    },
    /// Semester dates (admin only)
    Semesters {
        #[command(subcommand)]
        command: SemesterCommand,
    },
}

#[derive(Subcommand)]
enum CourseCommand {
    List,
    Add { name: String },
}

#[derive(Subcommand)]
enum UcCommand {
    /// List a course's current UCs
    List { course_id: i64 },
    Show { uc_id: i64 },
    Add {
        course_id: i64,
        name: String,
        #[arg(long)]
        ano: u8,
        #[arg(long)]
        semestre: u8,
        /// "mixed" or "continuous"
        #[arg(long)]
        tipo: String,
        #[arg(long)]
        mandatory: bool,
    },
    Edit {
        uc_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        ano: Option<u8>,
        #[arg(long)]
        semestre: Option<u8>,
        #[arg(long)]
        tipo: Option<String>,
        #[arg(long)]
        mandatory: Option<bool>,
    },
    /// Irrevocably delete a UC
    Delete { uc_id: i64 },
    /// Close a UC (locks its evaluation structure)
    Close { uc_id: i64 },
    /// Reopen a closed UC
    Open { uc_id: i64 },
}

#[derive(Subcommand)]
enum UserCommand {
    List,
    Add {
        username: String,
        name: String,
        email: String,
        password: String,
        /// "admin" or "user"
        #[arg(long, default_value = "user")]
        role: String,
    },
}

#[derive(Subcommand)]
enum SemesterCommand {
    Show,
    Edit {
        /// 1 or 2
        num: u8,
        /// YYYY-MM-DD
        start: String,
        /// YYYY-MM-DD
        end: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "coursemap=warn".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut state = AppState::initialize()?;

    match cli.command {
        Commands::Login { username, password } => {
            let user = state.session.login(&state.api, &username, &password).await?;
            println!("Logged in as {} ({})", user.name, user.role);
        }
        Commands::Logout => {
            state.teardown()?;
            println!("Logged out");
        }
        Commands::Whoami => match state.session.current_user() {
            Some(user) => println!("{} <{}> role={}", user.name, user.email, user.role),
            None => println!("Not logged in"),
        },
        Commands::Courses { command } => match command {
            CourseCommand::List => {
                require_auth(&state)?;
                let directory = CourseDirectory::new(state.api.clone());
                for course in directory.courses().await? {
                    println!("{}\t{}", course.id, course.course_name);
                }
            }
            CourseCommand::Add { name } => {
                require_auth(&state)?;
                AdminService::new(state.api.clone()).add_course(&name).await?;
                println!("Course added successfully!");
            }
        },
        Commands::Uc { command } => run_uc(&state, command).await?,
        Commands::Evaluations { uc_id } => {
            require_auth(&state)?;
            let uc = AdminService::new(state.api.clone()).uc(uc_id).await?;
            let mut editor = EvaluationEditor::new(state.api.clone(), uc_id, uc.tipo);
            editor.load().await?;
            println!(
                "UC {} ({}) - {}",
                uc.name,
                uc.tipo,
                if editor.closed() { "closed" } else { "open" }
            );
            let picker = RoomPicker::new(state.api.clone());
            for draft in editor.drafts() {
                let kind = draft
                    .kind
                    .map(|k| k.label().to_string())
                    .unwrap_or_else(|| "-".to_string());
                let room = match draft.room.room_id() {
                    Some(id) => picker.resolve_label(id).await,
                    None => "in class".to_string(),
                };
                println!(
                    "{}\t{}%\t{}\t{} students\t{}",
                    kind,
                    draft.weight.unwrap_or(0),
                    draft.date.as_deref().unwrap_or("-"),
                    draft.student_num.unwrap_or(0),
                    room,
                );
            }
        }
        Commands::Rooms {
            exam_time,
            students,
            computer,
        } => {
            require_auth(&state)?;
            let mut picker = RoomPicker::new(state.api.clone());
            let rooms = picker.search(&exam_time, students, computer).await?;
            for room in rooms {
                println!(
                    "{}\t{}\t{} seats\t{}",
                    room.id, room.room_num_name, room.capacity, room.location
                );
            }
        }
        Commands::Users { command } => match command {
            UserCommand::List => {
                require_admin(&state)?;
                for user in AdminService::new(state.api.clone()).users().await? {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        user.id, user.username, user.name, user.email, user.role
                    );
                }
            }
            UserCommand::Add {
                username,
                name,
                email,
                password,
                role,
            } => {
                require_admin(&state)?;
                let req = NewUserRequest {
                    username,
                    name,
                    email,
                    password,
                    role: parse_role(&role)?,
                };
                AdminService::new(state.api.clone()).add_user(req).await?;
                println!("User added successfully!");
            }
        },
        Commands::Assign {
            user_id,
            course_ids,
        } => {
            require_admin(&state)?;
            let outcomes = AdminService::new(state.api.clone())
                .assign_courses(user_id, &course_ids)
                .await?;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(()) => println!("course {}: assigned", outcome.course_id),
                    Err(err) => println!("course {}: failed ({err})", outcome.course_id),
                }
            }
            if outcomes.iter().all(AssignmentOutcome::succeeded) {
                println!("Courses assigned successfully!");
            }
        }
        Commands::Semesters { command } => match command {
            SemesterCommand::Show => {
                require_admin(&state)?;
                for semester in AdminService::new(state.api.clone()).semesters().await? {
                    println!(
                        "Semester {}: {} to {}",
                        semester.num_semester, semester.start_date, semester.end_date
                    );
                }
            }
            SemesterCommand::Edit { num, start, end } => {
                require_admin(&state)?;
                let semester = Semester {
                    id: num as i64,
                    num_semester: num,
                    start_date: start,
                    end_date: end,
                };
                AdminService::new(state.api.clone())
                    .update_semester(semester)
                    .await?;
                println!("Semester updated successfully!");
            }
        },
    }
    Ok(())
}

async fn run_uc(state: &AppState, command: UcCommand) -> Result<(), AppError> {
    require_auth(state)?;
    let admin = AdminService::new(state.api.clone());
    match command {
        UcCommand::List { course_id } => {
            let directory = CourseDirectory::new(state.api.clone());
            let ucs = directory.current_ucs(course_id).await?;
            for uc in &ucs {
                println!(
                    "{}\t{}\tyear {}\tsem {}\t{}\t{}",
                    uc.id,
                    uc.name,
                    uc.ano,
                    uc.semestre,
                    uc.tipo,
                    if uc.ucclosed { "closed" } else { "open" }
                );
            }
            if CourseDirectory::all_closed(&ucs) && !ucs.is_empty() {
                println!("All UCs closed - course map can be generated.");
            }
        }
        UcCommand::Show { uc_id } => {
            let uc = admin.uc(uc_id).await?;
            println!(
                "{}\t{}\tyear {}\tsem {}\t{}\tmandatory={}\t{}",
                uc.id,
                uc.name,
                uc.ano,
                uc.semestre,
                uc.tipo,
                uc.mandatory,
                if uc.ucclosed { "closed" } else { "open" }
            );
        }
        UcCommand::Add {
            course_id,
            name,
            ano,
            semestre,
            tipo,
            mandatory,
        } => {
            let req = NewUcRequest {
                course_id,
                name,
                ano,
                semestre,
                tipo: parse_uc_type(&tipo)?,
                mandatory,
            };
            admin.add_uc(req).await?;
            println!("UC added successfully!");
        }
        UcCommand::Edit {
            uc_id,
            name,
            ano,
            semestre,
            tipo,
            mandatory,
        } => {
            // Prefill from the current record, then apply the overrides.
            let current = admin.uc(uc_id).await?;
            let req = UpdateUcRequest {
                name: name.unwrap_or(current.name),
                ano: ano.unwrap_or(current.ano),
                semestre: semestre.unwrap_or(current.semestre),
                tipo: match tipo {
                    Some(t) => parse_uc_type(&t)?,
                    None => current.tipo,
                },
                mandatory: mandatory.unwrap_or(current.mandatory),
            };
            admin.edit_uc(uc_id, req).await?;
            println!("UC updated successfully!");
        }
        UcCommand::Delete { uc_id } => {
            let uc = admin.uc(uc_id).await?;
            let mut editor = EvaluationEditor::new(state.api.clone(), uc_id, uc.tipo);
            editor.delete_uc().await?;
            println!("UC deleted.");
        }
        UcCommand::Close { uc_id } => {
            toggle_uc(state, &admin, uc_id, true).await?;
        }
        UcCommand::Open { uc_id } => {
            toggle_uc(state, &admin, uc_id, false).await?;
        }
    }
    Ok(())
}

async fn toggle_uc(
    state: &AppState,
    admin: &AdminService,
    uc_id: i64,
    desired_closed: bool,
) -> Result<(), AppError> {
    let uc = admin.uc(uc_id).await?;
    let mut editor = EvaluationEditor::new(state.api.clone(), uc_id, uc.tipo);
    editor.load().await?;
    editor.toggle_closed(desired_closed).await?;
    if let Some(feedback) = editor.status() {
        println!("{}", feedback.message());
    }
    Ok(())
}

fn require_auth(state: &AppState) -> Result<(), AppError> {
    if state.session.is_authenticated() {
        Ok(())
    } else {
        Err(AppError::Unauthenticated)
    }
}

fn require_admin(state: &AppState) -> Result<(), AppError> {
    require_auth(state)?;
    if state.session.is_admin() {
        Ok(())
    } else {
        Err(AppError::validation("This area is for admins only."))
    }
}

fn parse_uc_type(raw: &str) -> Result<UcType, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mixed" => Ok(UcType::Mixed),
        "continuous" => Ok(UcType::Continuous),
        _ => Err(AppError::validation("Type must be 'mixed' or 'continuous'.")),
    }
}

fn parse_role(raw: &str) -> Result<Role, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "admin" => Ok(Role::Admin),
        "user" => Ok(Role::User),
        _ => Err(AppError::validation("Role must be 'admin' or 'user'.")),
    }
}
