pub mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::launch::{LaunchBackend, LaunchOrchestrator, LauncherSignal, SessionState};
pub use crate::core::state::{default_data_dir, AppState, SharedState};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,nova_launcher_lib=debug")),
        )
        .try_init();

    if result.is_ok() {
        tracing::info!("NovaLauncher core starting...");
    }
}
