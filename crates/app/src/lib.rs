// Session controller driving user actions against the gateway
pub mod dashboard;

// Logging setup and build reporting
pub mod process;

// App state (configuration, paths)
pub mod state;

pub mod version;

pub use dashboard::{Dashboard, DashboardError, ACCEPTED_MIME_TYPES};
pub use state::{AppConfig, AppState, StateError};
