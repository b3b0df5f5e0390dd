pub mod app_state;

use std::sync::Arc;

pub use app_state::{default_data_dir, AppState};

/// How commands receive the application state.
pub type SharedState = Arc<tokio::sync::Mutex<AppState>>;
