// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod scheduler;
pub mod strategy;

// Re-export commonly used types
pub use config::BotConfig;
pub use error::BotError;
pub use models::*;

// Error handling
pub type Result<T> = std::result::Result<T, BotError>;
