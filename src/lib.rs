pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod state;

pub use error::AppError;
pub use state::AppState;
