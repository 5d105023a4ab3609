use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use practice_planner::api::{ApiFailure, PlanApi};
use practice_planner::form::FormParams;
use practice_planner::plan::{PracticePlan, parse_plan_json};
use practice_planner::reference::Position;
use practice_planner::schema;
use practice_planner::session::{PlanSession, RequestKind};
use serde_json::{Value, json};

fn fixture_plan() -> PracticePlan {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures/practice_plan.json");
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    parse_plan_json(&raw).expect("fixture should parse")
}

enum Reply {
    Plan,
    Fail(&'static str),
    Panic,
}

struct FakeApi {
    preview: Reply,
    save: Reply,
    calls: Mutex<Vec<(&'static str, Value)>>,
}

impl FakeApi {
    fn new(preview: Reply, save: Reply) -> Self {
        Self {
            preview,
            save,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(&'static str, Value)> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn answer(&self, endpoint: &'static str, reply: &Reply, body: &Value) -> Result<PracticePlan> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((endpoint, body.clone()));
        match reply {
            Reply::Plan => Ok(fixture_plan()),
            Reply::Fail(message) => Err(ApiFailure {
                status: Some(400),
                message: message.to_string(),
            }
            .into()),
            Reply::Panic => panic!("connection reset"),
        }
    }
}

impl PlanApi for FakeApi {
    fn fetch_positions(&self, _sport_id: i64) -> Result<Vec<Position>> {
        Err(anyhow!("positions are not used here"))
    }

    fn preview_plan(&self, body: &Value) -> Result<PracticePlan> {
        self.answer("preview", &self.preview, body)
    }

    fn save_plan(&self, body: &Value) -> Result<PracticePlan> {
        self.answer("save", &self.save, body)
    }
}

#[test]
fn preview_success_stores_plan() {
    let api = FakeApi::new(Reply::Plan, Reply::Plan);
    let mut session = PlanSession::new();
    session.generate_preview(&api);

    assert!(!session.loading);
    assert!(session.success);
    assert!(session.error.is_none());
    assert_eq!(
        session.plan.as_ref().map(|p| p.name.as_str()),
        Some("Basketball - Offense Practice Plan")
    );

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "preview");
    assert_eq!(calls[0].1["sportId"], json!(1));
    assert_eq!(calls[0].1["totalDurationMinutes"], json!(90));
    assert_eq!(calls[0].1["warmupDurationMinutes"], json!(15));
    assert_eq!(calls[0].1["coachingStations"], json!(3));
    assert!(calls[0].1.get("focusAreaId").is_none());
    assert!(calls[0].1.get("positionId").is_none());
    assert!(calls[0].1.get("ageGroup").is_none());
}

#[test]
fn preview_failure_surfaces_server_message() {
    let api = FakeApi::new(Reply::Fail("Total duration too short"), Reply::Plan);
    let mut session = PlanSession::new();
    session.update_field(schema::TOTAL_DURATION, "10");
    session.generate_preview(&api);

    assert!(!session.loading);
    assert!(!session.success);
    assert!(session.plan.is_none());
    assert_eq!(session.error.as_deref(), Some("Total duration too short"));
    assert_eq!(api.calls()[0].1["totalDurationMinutes"], json!(10));
}

#[test]
fn new_preview_clears_previous_outcome() {
    let api = FakeApi::new(Reply::Plan, Reply::Plan);
    let mut session = PlanSession::new();
    session.generate_preview(&api);
    assert!(session.plan.is_some());

    let request = session.begin_preview();
    assert!(session.loading);
    assert!(session.plan.is_none());
    assert!(!session.success);
    assert!(session.error.is_none());
    assert_eq!(request.ticket.kind, RequestKind::Preview);
}

#[test]
fn save_without_preview_sends_nothing() {
    let api = FakeApi::new(Reply::Plan, Reply::Plan);
    let mut session = PlanSession::new();
    session.save_previewed_plan(&api);

    assert!(api.calls().is_empty());
    assert!(!session.loading);
    assert!(session.saved_plan.is_none());
    assert!(session.begin_save().is_none());
}

#[test]
fn save_posts_current_params_to_generator() {
    let api = FakeApi::new(Reply::Plan, Reply::Plan);
    let mut session = PlanSession::new();
    session.generate_preview(&api);
    session.update_field(schema::WARMUP_DURATION, "20");
    session.save_previewed_plan(&api);

    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0, "save");
    assert_eq!(calls[1].1["warmupDurationMinutes"], json!(20));
    assert!(session.success);
    assert_eq!(session.saved_plan.as_ref().and_then(|p| p.id), Some(42));
}

#[test]
fn failed_save_keeps_previewed_plan() {
    let api = FakeApi::new(Reply::Plan, Reply::Fail("Database unavailable"));
    let mut session = PlanSession::new();
    session.generate_preview(&api);
    session.save_previewed_plan(&api);

    assert!(!session.loading);
    assert!(!session.success);
    assert!(session.plan.is_some());
    assert!(session.saved_plan.is_none());
    assert_eq!(session.error.as_deref(), Some("Database unavailable"));
}

#[test]
fn panicking_call_still_clears_loading() {
    let api = FakeApi::new(Reply::Panic, Reply::Plan);
    let mut session = PlanSession::new();
    session.generate_preview(&api);

    assert!(!session.loading);
    assert!(session.plan.is_none());
    assert_eq!(session.error.as_deref(), Some("Request aborted unexpectedly"));
}

#[test]
fn superseded_preview_is_dropped() {
    let mut session = PlanSession::new();
    let first = session.begin_preview();
    let second = session.begin_preview();

    assert!(session.finish(second.ticket, Err("late".to_string())));
    assert_eq!(session.error.as_deref(), Some("late"));

    // The earlier call answers last; it must not overwrite anything.
    assert!(!session.finish(first.ticket, Ok(fixture_plan())));
    assert!(session.plan.is_none());
    assert_eq!(session.error.as_deref(), Some("late"));
    assert!(!session.loading);
}

#[test]
fn reset_restores_defaults_and_abandons_in_flight_call() {
    let mut session = PlanSession::new();
    session.update_field(schema::TOTAL_DURATION, "120");
    session.update_field(schema::AGE_GROUP, "15-17");
    let request = session.begin_preview();
    session.reset();

    assert!(!session.loading);
    assert_eq!(session.params, FormParams::defaults());
    assert!(!session.finish(request.ticket, Ok(fixture_plan())));
    assert!(session.plan.is_none());
    assert!(!session.success);
}
