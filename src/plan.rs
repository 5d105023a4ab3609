use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticePlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport_id: Option<i64>,
    #[serde(default)]
    pub sport_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area_id: Option<i64>,
    #[serde(default)]
    pub focus_area_name: String,
    pub total_duration_minutes: u32,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub equipment_needed: Vec<EquipmentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireSection", into = "WireSection")]
pub struct Section {
    pub section_type: String,
    pub duration_minutes: u32,
    pub coaching_points: Option<String>,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Single { drill: Option<Drill> },
    Concurrent { station_groups: Vec<StationGroup> },
}

// The service flags concurrent sections with a boolean and leaves the unused
// payload field out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSection {
    section_type: String,
    duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    drill: Option<Drill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    station_groups: Option<Vec<StationGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coaching_points: Option<String>,
    #[serde(default)]
    concurrent: bool,
}

impl From<WireSection> for Section {
    fn from(wire: WireSection) -> Self {
        let body = match (wire.concurrent, wire.station_groups) {
            (true, Some(station_groups)) => SectionBody::Concurrent { station_groups },
            _ => SectionBody::Single { drill: wire.drill },
        };
        Section {
            section_type: wire.section_type,
            duration_minutes: wire.duration_minutes,
            coaching_points: wire.coaching_points,
            body,
        }
    }
}

impl From<Section> for WireSection {
    fn from(section: Section) -> Self {
        let (drill, station_groups, concurrent) = match section.body {
            SectionBody::Single { drill } => (drill, None, false),
            SectionBody::Concurrent { station_groups } => (None, Some(station_groups), true),
        };
        WireSection {
            section_type: section.section_type,
            duration_minutes: section.duration_minutes,
            drill,
            station_groups,
            coaching_points: section.coaching_points,
            concurrent,
        }
    }
}

impl Section {
    pub fn drill(&self) -> Option<&Drill> {
        match &self.body {
            SectionBody::Single { drill } => drill.as_ref(),
            SectionBody::Concurrent { .. } => None,
        }
    }

    pub fn station_groups(&self) -> &[StationGroup] {
        match &self.body {
            SectionBody::Single { .. } => &[],
            SectionBody::Concurrent { station_groups } => station_groups,
        }
    }

    pub fn is_concurrent(&self) -> bool {
        matches!(self.body, SectionBody::Concurrent { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationGroup {
    pub rotation_number: u32,
    pub duration_minutes: u32,
    #[serde(default)]
    pub stations: Vec<Station>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub station_number: u32,
    pub drill: Drill,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coaching_points: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drill {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub focus_area_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area_name: Option<String>,
    #[serde(default)]
    pub sport_ids: Vec<i64>,
    #[serde(default)]
    pub position_ids: Vec<i64>,
    #[serde(default)]
    pub kpi_ids: Vec<i64>,
    #[serde(default)]
    pub equipment: Vec<DrillEquipment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillEquipment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub drill_id: i64,
    pub equipment_id: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drill_name: Option<String>,
    pub equipment_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSummary {
    pub equipment_id: i64,
    pub equipment_name: String,
    pub total_quantity: u32,
}

pub fn parse_plan_json(raw: &str) -> Result<PracticePlan> {
    serde_json::from_str(raw).context("invalid practice plan json")
}

pub fn scheduled_minutes(sections: &[Section]) -> u32 {
    sections
        .iter()
        .fold(0u32, |total, s| total.saturating_add(s.duration_minutes))
}

/// Minute offset at which each section starts.
pub fn section_start_offsets(sections: &[Section]) -> Vec<u32> {
    let mut elapsed = 0u32;
    sections
        .iter()
        .map(|s| {
            let start = elapsed;
            elapsed = elapsed.saturating_add(s.duration_minutes);
            start
        })
        .collect()
}

pub fn format_offset(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rest}m")
    } else {
        format!("{rest}m")
    }
}

/// Minutes each group spends at one station within a rotation group.
pub fn station_slot_minutes(group: &StationGroup) -> f32 {
    if group.stations.is_empty() {
        return 0.0;
    }
    group.duration_minutes as f32 / group.stations.len() as f32
}

/// Offset of a station's slot from the start of its section.
pub fn station_offset_minutes(group: &StationGroup, station_index: usize) -> f32 {
    station_index as f32 * station_slot_minutes(group)
}

/// Minutes between rotations, taken from the first rotation group.
pub fn rotation_interval(section: &Section) -> Option<f32> {
    section
        .station_groups()
        .first()
        .filter(|group| !group.stations.is_empty())
        .map(station_slot_minutes)
}

pub fn format_minutes(minutes: f32) -> String {
    if minutes.fract() == 0.0 {
        format!("{}", minutes as u32)
    } else {
        format!("{minutes:.1}")
    }
}

pub fn section_color(section_type: &str) -> Color {
    match section_type {
        "Warmup" => Color::Yellow,
        "Team Time" => Color::Green,
        "Position Group" => Color::Magenta,
        t if t.contains("Station") => Color::Blue,
        _ => Color::Gray,
    }
}

pub fn equipment_label(items: &[DrillEquipment]) -> String {
    if items.is_empty() {
        return "None".to_string();
    }
    items
        .iter()
        .map(|item| format!("{} ({})", item.equipment_name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Notes about plan shapes the service promises but this client never checks
/// before rendering.
pub fn plan_warnings(plan: &PracticePlan) -> Vec<String> {
    let mut out = Vec::new();
    let scheduled = scheduled_minutes(&plan.sections);
    if scheduled != plan.total_duration_minutes {
        out.push(format!(
            "Sections cover {scheduled} of {} minutes",
            plan.total_duration_minutes
        ));
    }
    for (idx, section) in plan.sections.iter().enumerate() {
        let groups = section.station_groups();
        let Some(first) = groups.first() else {
            continue;
        };
        let expected = first.stations.len();
        if groups.iter().any(|g| g.stations.len() != expected) {
            out.push(format!(
                "Section {} ({}) has rotations with uneven station counts",
                idx + 1,
                section.section_type
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drill(id: i64, name: &str) -> Drill {
        Drill {
            id,
            name: name.to_string(),
            description: None,
            instructions: None,
            duration_minutes: None,
            difficulty_level: None,
            focus_area_id: 1,
            focus_area_name: None,
            sport_ids: Vec::new(),
            position_ids: Vec::new(),
            kpi_ids: Vec::new(),
            equipment: Vec::new(),
        }
    }

    fn group(rotation: u32, minutes: u32, stations: usize) -> StationGroup {
        StationGroup {
            rotation_number: rotation,
            duration_minutes: minutes,
            stations: (0..stations)
                .map(|i| Station {
                    station_number: i as u32 + 1,
                    drill: drill(i as i64, "Drill"),
                    coaching_points: None,
                })
                .collect(),
        }
    }

    #[test]
    fn offsets_format_with_hours() {
        assert_eq!(format_offset(0), "0m");
        assert_eq!(format_offset(45), "45m");
        assert_eq!(format_offset(60), "1h 0m");
        assert_eq!(format_offset(135), "2h 15m");
    }

    #[test]
    fn station_slots_divide_by_station_count() {
        let g = group(1, 15, 3);
        assert_eq!(station_slot_minutes(&g), 5.0);
        assert_eq!(station_offset_minutes(&g, 2), 10.0);
        assert_eq!(format_minutes(station_slot_minutes(&group(1, 10, 4))), "2.5");
    }

    #[test]
    fn uneven_rotations_are_reported() {
        let plan = PracticePlan {
            id: None,
            name: "P".to_string(),
            description: String::new(),
            sport_id: None,
            sport_name: String::new(),
            focus_area_id: None,
            focus_area_name: String::new(),
            total_duration_minutes: 20,
            sections: vec![Section {
                section_type: "Stations".to_string(),
                duration_minutes: 20,
                coaching_points: None,
                body: SectionBody::Concurrent {
                    station_groups: vec![group(1, 10, 3), group(2, 10, 2)],
                },
            }],
            equipment_needed: Vec::new(),
        };
        let warnings = plan_warnings(&plan);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("uneven"));
    }

    #[test]
    fn oversized_durations_saturate() {
        let section = |minutes| Section {
            section_type: "Warmup".to_string(),
            duration_minutes: minutes,
            coaching_points: None,
            body: SectionBody::Single { drill: None },
        };
        let sections = vec![section(u32::MAX - 1), section(10), section(5)];
        assert_eq!(scheduled_minutes(&sections), u32::MAX);
        assert_eq!(section_start_offsets(&sections), vec![0, u32::MAX - 1, u32::MAX]);
    }

    #[test]
    fn station_type_colors_blue() {
        assert_eq!(section_color("Coaching Stations"), Color::Blue);
        assert_eq!(section_color("Warmup"), Color::Yellow);
        assert_eq!(section_color("Cooldown"), Color::Gray);
    }
}
