//! Errors surfaced at the process boundary

mod app_error;

pub use app_error::{AppError, AppResult};
