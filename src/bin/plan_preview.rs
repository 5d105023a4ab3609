use anyhow::{Result, anyhow};

use practice_planner::api::HttpPlanApi;
use practice_planner::config::ApiConfig;
use practice_planner::plan_view;
use practice_planner::session::PlanSession;

fn main() -> Result<()> {
    let config = ApiConfig::from_env();
    let api = HttpPlanApi::new(config.clone())?;

    let mut session = PlanSession::new();
    for (name, raw) in parse_field_args() {
        session.update_field(&name, &raw);
    }
    for issue in session.params.validate() {
        eprintln!("warning: {}", issue.message());
    }

    println!("Plan service: {}", config.endpoint("/api"));
    println!("Request: {}", session.params.to_request_body());
    session.generate_preview(&api);
    if let Some(err) = session.error.take() {
        return Err(anyhow!("preview failed: {err}"));
    }
    let Some(plan) = session.plan.as_ref() else {
        return Err(anyhow!("preview returned no plan"));
    };
    println!();
    println!("{}", plan_view::plan_text(plan, parse_rotation_arg()));

    if has_flag("--save") {
        session.save_previewed_plan(&api);
        if let Some(err) = session.error.take() {
            return Err(anyhow!("save failed: {err}"));
        }
        let id = session
            .saved_plan
            .as_ref()
            .and_then(|plan| plan.id)
            .map(|id| format!(" (#{id})"))
            .unwrap_or_default();
        println!();
        println!("Practice plan saved{id}");
    }

    Ok(())
}

/// `name=value` pairs, applied in order on top of the default form.
fn parse_field_args() -> Vec<(String, String)> {
    std::env::args()
        .skip(1)
        .filter(|arg| !arg.starts_with("--"))
        .filter_map(|arg| {
            let (name, value) = arg.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn parse_rotation_arg() -> usize {
    std::env::args()
        .skip(1)
        .find_map(|arg| {
            arg.strip_prefix("--rotation=")
                .and_then(|val| val.trim().parse::<usize>().ok())
        })
        .map(|n| n.saturating_sub(1))
        .unwrap_or(0)
}

fn has_flag(flag: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == flag)
}
