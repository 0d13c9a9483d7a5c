use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::error::{ApiError, ApiResult};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Process-wide client with the default 10s timeout. Used when no explicit
/// configuration is in play.
pub fn shared_client() -> ApiResult<&'static Client> {
    CLIENT.get_or_try_init(|| build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
}

pub fn build_client(timeout: Duration) -> ApiResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ApiError::Network(format!("failed to build http client: {err}")))
}
