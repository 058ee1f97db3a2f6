// --- File: crates/intervu_common/src/lib.rs ---

pub mod error; // Error handling
pub mod logging; // Logging utilities
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{config_error, external_service_error, HttpStatusCode, IntervuError};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error};

// This crate holds what every Intervu crate shares: the collaborator traits
// (calendar store, notifier), the common error type and logging setup.
