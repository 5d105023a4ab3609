use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::http_client::http_client;
use crate::plan::PracticePlan;
use crate::position_cache::PositionCache;
use crate::reference::Position;

pub const PREVIEW_PATH: &str = "/api/practice-plans/generator/preview";
pub const GENERATE_PATH: &str = "/api/practice-plans/generator";

pub fn positions_path(sport_id: i64) -> String {
    format!("/api/positions/sport/{sport_id}")
}

/// The plan service as seen by the session: one call per user action.
pub trait PlanApi: Send + Sync {
    fn fetch_positions(&self, sport_id: i64) -> Result<Vec<Position>>;
    fn preview_plan(&self, body: &Value) -> Result<PracticePlan>;
    fn save_plan(&self, body: &Value) -> Result<PracticePlan>;
}

/// Error body returned by the service on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

/// A failed call, already reduced to the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiFailure {
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorResponse>(body)
            .ok()
            .map(|resp| resp.message)
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
        Self {
            status: Some(status.as_u16()),
            message,
        }
    }

    pub fn transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out waiting for the practice plan service".to_string()
        } else if err.is_connect() {
            "Could not reach the practice plan service".to_string()
        } else {
            format!("Request failed: {err}")
        };
        Self {
            status: None,
            message,
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiFailure {}

/// Collapse any call error into the single string the session stores.
pub fn error_message(err: &anyhow::Error) -> String {
    if let Some(failure) = err.downcast_ref::<ApiFailure>() {
        return failure.message.clone();
    }
    format!("{err:#}")
}

thread_local! {
    static IN_CALL: Cell<bool> = const { Cell::new(false) };
}

/// Keep panics raised inside `run_call` off stderr; `run_call` already turns
/// them into errors. Panics anywhere else still reach the previous hook.
pub fn install_quiet_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if !IN_CALL.with(Cell::get) {
            previous(info);
        }
    }));
}

/// Run one call and reduce every outcome, a panic included, to
/// `Result<T, String>`.
pub fn run_call<T>(call: impl FnOnce() -> Result<T>) -> Result<T, String> {
    IN_CALL.with(|flag| flag.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(call));
    IN_CALL.with(|flag| flag.set(false));
    match outcome {
        Ok(result) => result.map_err(|err| error_message(&err)),
        Err(_) => Err("Request aborted unexpectedly".to_string()),
    }
}

pub struct HttpPlanApi {
    config: ApiConfig,
    client: Client,
    positions: PositionCache,
}

impl HttpPlanApi {
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_position_cache(config, PositionCache::in_user_cache())
    }

    pub fn with_position_cache(config: ApiConfig, positions: PositionCache) -> Result<Self> {
        let client = http_client(config.timeout)?;
        Ok(Self {
            config,
            client,
            positions,
        })
    }

    fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = self.config.endpoint(path);
        let resp = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .map_err(ApiFailure::transport)?;
        let status = resp.status();
        let raw = resp.text().map_err(ApiFailure::transport)?;
        if !status.is_success() {
            return Err(ApiFailure::from_response(status, &raw).into());
        }
        serde_json::from_str::<T>(&raw).with_context(|| format!("unexpected response from {path}"))
    }
}

impl PlanApi for HttpPlanApi {
    fn fetch_positions(&self, sport_id: i64) -> Result<Vec<Position>> {
        let url = self.config.endpoint(&positions_path(sport_id));
        self.positions.fetch(&self.client, &url, sport_id)
    }

    fn preview_plan(&self, body: &Value) -> Result<PracticePlan> {
        self.post_json(PREVIEW_PATH, body)
    }

    fn save_plan(&self, body: &Value) -> Result<PracticePlan> {
        self.post_json(GENERATE_PATH, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins() {
        let body = r#"{"message":"Total duration too short","status":400,"errorCode":"E_RANGE"}"#;
        let failure = ApiFailure::from_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(failure.message, "Total duration too short");
        assert_eq!(failure.status, Some(400));
    }

    #[test]
    fn non_json_body_falls_back_to_status() {
        let failure = ApiFailure::from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(failure.message, "API error: 502");
    }

    #[test]
    fn empty_message_falls_back_to_status() {
        let failure = ApiFailure::from_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":""}"#);
        assert_eq!(failure.message, "API error: 500");
    }

    #[test]
    fn call_flag_is_scoped_to_run_call() {
        let inside = run_call(|| Ok(IN_CALL.with(Cell::get)));
        assert_eq!(inside, Ok(true));
        assert!(!IN_CALL.with(Cell::get));

        let failed: Result<(), String> = run_call(|| panic!("boom"));
        assert_eq!(failed, Err("Request aborted unexpectedly".to_string()));
        assert!(!IN_CALL.with(Cell::get));
    }

    #[test]
    fn error_message_unwraps_context() {
        let err = anyhow::Error::new(ApiFailure {
            status: Some(404),
            message: "Sport not found".to_string(),
        })
        .context("positions request");
        assert_eq!(error_message(&err), "Sport not found");
    }
}
