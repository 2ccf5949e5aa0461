// Credit Limits Back-Office - Core Library
// Exposes all modules for use in the TUI, CLI, API server, and tests

pub mod types;
pub mod format;
pub mod validation;   // Limit/reason admissibility
pub mod change_log;   // Audit descriptions for committed edits
pub mod filter;       // Status filter + name search
pub mod db;           // Mock applications API (in-memory SQLite)
pub mod form;         // Edit form state
pub mod store;        // Single-writer application state
pub mod config;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use types::{
    Application, ApplicationPatch, ApplicationStatus, ApplicationUpdate,
    ChangeLogEntry, ChangeReason, NewLogEntry,
    EXTENDED_REASONS, HIGH_LIMIT_THRESHOLD, MAX_LIMIT, MIN_LIMIT, STANDARD_REASONS,
};
pub use validation::{validate, LimitError, ReasonError, ValidationResult};
pub use change_log::{describe_changes, record_change};
pub use filter::{filter_applications, matches_search, DebouncedSearch, StatusFilter};
pub use db::{demo_applications, load_csv, ApiError, ApplicationsApi, MockApi};
pub use form::{EditForm, FormField};
pub use store::{AppState, SubmitOutcome};
pub use config::{init_logging, AppConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
