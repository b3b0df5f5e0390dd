use std::time::Duration;

use reqwest::Client;

const APP_USER_AGENT: &str = concat!("NovaLauncher/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared client for the few metadata requests the launcher makes itself.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
}
