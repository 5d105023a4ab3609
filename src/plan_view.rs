use ratatui::style::Color;

use crate::plan::{
    PracticePlan, Section, equipment_label, format_minutes, format_offset, plan_warnings,
    rotation_interval, scheduled_minutes, section_color, section_start_offsets,
    station_offset_minutes, station_slot_minutes,
};

/// One line of the plan table, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    pub time: String,
    pub activity: String,
    pub detail: String,
    pub duration: String,
    pub equipment: String,
    pub color: Color,
    pub is_rotation_header: bool,
}

pub fn header_lines(plan: &PracticePlan) -> Vec<String> {
    let scheduled = scheduled_minutes(&plan.sections);
    let mut lines = vec![
        format!(
            "{} | {} / {} minutes",
            plan.name, scheduled, plan.total_duration_minutes
        ),
        format!("Focus: {} | {}", plan.focus_area_name, plan.sport_name),
    ];
    if !plan.description.is_empty() {
        lines.push(plan.description.clone());
    }
    for warning in plan_warnings(plan) {
        lines.push(format!("! {warning}"));
    }
    lines
}

/// Table rows; concurrent sections expand to the stations of `rotation`.
pub fn plan_rows(plan: &PracticePlan, rotation: usize) -> Vec<PlanRow> {
    let starts = section_start_offsets(&plan.sections);
    let mut rows = Vec::new();
    for (section, start) in plan.sections.iter().zip(starts) {
        let start_label = format_offset(start);
        if section.is_concurrent() {
            push_rotation_rows(&mut rows, section, &start_label, rotation);
            continue;
        }
        let drill = section.drill();
        rows.push(PlanRow {
            time: start_label,
            activity: section.section_type.clone(),
            detail: drill.map(|d| d.name.clone()).unwrap_or_default(),
            duration: format!("{} min", section.duration_minutes),
            equipment: drill
                .map(|d| equipment_label(&d.equipment))
                .unwrap_or_else(|| "None".to_string()),
            color: section_color(&section.section_type),
            is_rotation_header: false,
        });
    }
    rows
}

fn push_rotation_rows(rows: &mut Vec<PlanRow>, section: &Section, start: &str, rotation: usize) {
    let groups = section.station_groups();
    let stations_per_group = groups.first().map(|g| g.stations.len()).unwrap_or(0);
    let color = section_color(&section.section_type);
    rows.push(PlanRow {
        time: start.to_string(),
        activity: format!("{} - Rotations", section.section_type),
        detail: format!(
            "{} rotations with {} stations",
            groups.len(),
            stations_per_group
        ),
        duration: format!("{} min", section.duration_minutes),
        equipment: String::new(),
        color,
        is_rotation_header: true,
    });

    let rotation_idx = rotation.min(groups.len().saturating_sub(1));
    let Some(group) = groups.get(rotation_idx) else {
        return;
    };
    let count = group.stations.len();
    let slot = station_slot_minutes(group);
    for (idx, station) in group.stations.iter().enumerate() {
        // Groups advance one station per rotation.
        let team = (idx + rotation_idx) % count + 1;
        rows.push(PlanRow {
            time: format!(
                "{start}+{}m",
                format_minutes(station_offset_minutes(group, idx))
            ),
            activity: format!("Station {} - Group {team}", station.station_number),
            detail: station.drill.name.clone(),
            duration: format!("{} min", format_minutes(slot)),
            equipment: equipment_label(&station.drill.equipment),
            color,
            is_rotation_header: false,
        });
    }
}

/// Drill instructions: timed sections first, then each station block.
pub fn instruction_lines(plan: &PracticePlan) -> Vec<String> {
    let mut lines = Vec::new();
    for (idx, section) in plan.sections.iter().enumerate() {
        let Some(drill) = section.drill() else {
            continue;
        };
        lines.push(format!(
            "{}. {} ({}) - {} min",
            idx + 1,
            drill.name,
            section.section_type,
            section.duration_minutes
        ));
        push_drill_notes(
            &mut lines,
            drill.description.as_deref(),
            drill.instructions.as_deref(),
            section.coaching_points.as_deref(),
        );
        lines.push(String::new());
    }

    for section in plan.sections.iter().filter(|s| s.is_concurrent()) {
        let groups = section.station_groups();
        let Some(first) = groups.first() else {
            continue;
        };
        lines.push(section.section_type.clone());
        if let Some(interval) = rotation_interval(section) {
            lines.push(format!(
                "  Rotation pattern: groups rotate between stations every {} minutes. Complete {} full rotations.",
                format_minutes(interval),
                groups.len()
            ));
        }
        for station in &first.stations {
            lines.push(format!(
                "  Station {}: {}",
                station.station_number, station.drill.name
            ));
            push_drill_notes(
                &mut lines,
                station.drill.description.as_deref(),
                station.drill.instructions.as_deref(),
                station.coaching_points.as_deref(),
            );
        }
        lines.push(String::new());
    }
    lines
}

fn push_drill_notes(
    lines: &mut Vec<String>,
    description: Option<&str>,
    instructions: Option<&str>,
    coaching_points: Option<&str>,
) {
    if let Some(text) = description.filter(|t| !t.is_empty()) {
        lines.push(format!("    {text}"));
    }
    if let Some(text) = instructions.filter(|t| !t.is_empty()) {
        lines.push(format!("    Instructions: {text}"));
    }
    if let Some(text) = coaching_points.filter(|t| !t.is_empty()) {
        lines.push(format!("    Coaching points: {text}"));
    }
}

pub fn equipment_lines(plan: &PracticePlan) -> Vec<String> {
    plan.equipment_needed
        .iter()
        .map(|item| format!("{}: {}", item.equipment_name, item.total_quantity))
        .collect()
}

/// Whole plan as plain text, for output outside the terminal UI.
pub fn plan_text(plan: &PracticePlan, rotation: usize) -> String {
    let mut out = header_lines(plan);
    out.push(String::new());
    out.push(format!(
        "{:<10} {:<28} {:<28} {:<9} Equipment",
        "Time", "Activity", "Drill", "Duration"
    ));
    for row in plan_rows(plan, rotation) {
        out.push(format!(
            "{:<10} {:<28} {:<28} {:<9} {}",
            row.time, row.activity, row.detail, row.duration, row.equipment
        ));
    }
    let instructions = instruction_lines(plan);
    if !instructions.is_empty() {
        out.push(String::new());
        out.push("Drill Instructions".to_string());
        out.extend(instructions);
    }
    let equipment = equipment_lines(plan);
    if !equipment.is_empty() {
        out.push("Equipment Needed".to_string());
        out.extend(equipment.into_iter().map(|line| format!("  {line}")));
    }
    out.join("\n")
}
