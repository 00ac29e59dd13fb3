pub mod context;
pub mod services;

pub use context::{ChatSession, Companion, CompanionError, CompanionResult};
pub use services::LogRefresher;
