use std::fs;
use std::path::PathBuf;

use practice_planner::plan::{SectionBody, parse_plan_json, plan_warnings, scheduled_minutes};
use practice_planner::plan_view::{instruction_lines, plan_rows, plan_text};
use practice_planner::reference::Position;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_plan_fixture_into_tagged_sections() {
    let plan = parse_plan_json(&read_fixture("practice_plan.json")).expect("fixture should parse");
    assert_eq!(plan.id, Some(42));
    assert_eq!(plan.total_duration_minutes, 90);
    assert_eq!(plan.sections.len(), 4);
    assert_eq!(scheduled_minutes(&plan.sections), 90);

    match &plan.sections[0].body {
        SectionBody::Single { drill } => {
            let drill = drill.as_ref().expect("warmup drill");
            assert_eq!(drill.name, "Dynamic Stretch");
            assert_eq!(drill.equipment.len(), 1);
        }
        other => panic!("warmup should be single, got {other:?}"),
    }
    match &plan.sections[1].body {
        SectionBody::Concurrent { station_groups } => {
            assert_eq!(station_groups.len(), 3);
            assert!(station_groups.iter().all(|g| g.stations.len() == 3));
        }
        other => panic!("stations should be concurrent, got {other:?}"),
    }
    // Missing `concurrent` flag means a single activity.
    assert!(!plan.sections[3].is_concurrent());
    assert_eq!(plan.equipment_needed.len(), 3);
    assert!(plan_warnings(&plan).is_empty());
}

#[test]
fn concurrent_flag_without_groups_is_single() {
    let raw = r#"{
        "name": "P", "description": "", "sportName": "Soccer", "focusAreaName": "Defense",
        "totalDurationMinutes": 10,
        "sections": [{"sectionType": "Stations", "durationMinutes": 10, "concurrent": true}],
        "equipmentNeeded": []
    }"#;
    let plan = parse_plan_json(raw).expect("plan should parse");
    assert!(!plan.sections[0].is_concurrent());
    assert!(plan.sections[0].drill().is_none());
}

#[test]
fn plan_serializes_back_to_wire_shape() {
    let plan = parse_plan_json(&read_fixture("practice_plan.json")).expect("fixture should parse");
    let value = serde_json::to_value(&plan).expect("plan should serialize");
    let sections = value["sections"].as_array().expect("sections array");
    assert_eq!(sections[1]["concurrent"], serde_json::json!(true));
    assert!(sections[1].get("drill").is_none());
    assert_eq!(sections[0]["concurrent"], serde_json::json!(false));
    assert!(sections[0].get("stationGroups").is_none());
}

#[test]
fn parses_positions_fixture() {
    let positions: Vec<Position> =
        serde_json::from_str(&read_fixture("positions_basketball.json")).expect("positions");
    assert_eq!(positions.len(), 3);
    assert_eq!(positions[0].name, "Point Guard");
    assert_eq!(positions[2].description.as_deref(), Some("Plays near the basket"));
    assert!(positions[1].sport_name.is_none());
}

#[test]
fn table_rows_carry_start_offsets_and_station_slots() {
    let plan = parse_plan_json(&read_fixture("practice_plan.json")).expect("fixture should parse");
    let rows = plan_rows(&plan, 0);
    // warmup, rotation header, 3 stations, position group, team time
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0].time, "0m");
    assert_eq!(rows[0].equipment, "Cones (4)");
    assert_eq!(rows[1].time, "15m");
    assert_eq!(rows[1].detail, "3 rotations with 3 stations");
    assert!(rows[1].is_rotation_header);
    assert_eq!(rows[2].time, "15m+0m");
    assert_eq!(rows[3].time, "15m+5m");
    assert_eq!(rows[4].time, "15m+10m");
    assert_eq!(rows[3].duration, "5 min");
    assert_eq!(rows[4].equipment, "None");
    assert_eq!(rows[5].time, "1h 0m");
    assert_eq!(rows[6].time, "1h 15m");
    assert_eq!(rows[6].equipment, "Pinnies (10)");
}

#[test]
fn later_rotation_moves_groups_and_clamps() {
    let plan = parse_plan_json(&read_fixture("practice_plan.json")).expect("fixture should parse");
    let second = plan_rows(&plan, 1);
    assert_eq!(second[2].activity, "Station 1 - Group 2");
    let clamped = plan_rows(&plan, 99);
    assert_eq!(clamped[2].activity, "Station 1 - Group 3");
}

#[test]
fn instructions_list_sections_then_stations() {
    let plan = parse_plan_json(&read_fixture("practice_plan.json")).expect("fixture should parse");
    let lines = instruction_lines(&plan);
    assert_eq!(lines[0], "1. Dynamic Stretch (Warmup) - 15 min");
    assert!(lines.iter().any(|l| l == "    Coaching points: Eyes up"));
    assert!(lines.iter().any(|l| l.contains(
        "groups rotate between stations every 5 minutes. Complete 3 full rotations."
    )));
    assert!(lines.iter().any(|l| l == "  Station 2: Closeout Drill"));

    let text = plan_text(&plan, 0);
    assert!(text.starts_with("Basketball - Offense Practice Plan | 90 / 90 minutes"));
    assert!(text.contains("Equipment Needed"));
    assert!(text.contains("  Cones: 12"));
}
