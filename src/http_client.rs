use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("practice_planner/", env!("CARGO_PKG_VERSION"));

/// Every plan-service call shares this deadline; a hung backend surfaces as
/// a timeout error instead of leaving a request pending forever.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build http client")
}
