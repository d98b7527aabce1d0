pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use crate::core::*;
pub use errors::{AppError, AppResult};
pub use state::AppState;
