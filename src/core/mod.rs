// Public modules
pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod install;
pub mod provider;
pub mod ssh;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
