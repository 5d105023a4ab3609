use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sport {
    pub id: i64,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusArea {
    pub id: i64,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeGroup {
    pub value: &'static str,
    pub label: &'static str,
}

// Mirrors the seed rows of the plan service database.
pub const SPORTS: &[Sport] = &[
    Sport {
        id: 1,
        name: "Basketball",
    },
    Sport {
        id: 2,
        name: "Football",
    },
    Sport {
        id: 3,
        name: "Soccer",
    },
    Sport {
        id: 4,
        name: "Baseball",
    },
];

pub const FOCUS_AREAS: &[FocusArea] = &[
    FocusArea {
        id: 1,
        name: "Fundamentals",
    },
    FocusArea {
        id: 2,
        name: "Offense",
    },
    FocusArea {
        id: 3,
        name: "Defense",
    },
];

pub const AGE_GROUPS: &[AgeGroup] = &[
    AgeGroup {
        value: "",
        label: "Any Age",
    },
    AgeGroup {
        value: "6-8",
        label: "6-8 years",
    },
    AgeGroup {
        value: "9-11",
        label: "9-11 years",
    },
    AgeGroup {
        value: "12-14",
        label: "12-14 years",
    },
    AgeGroup {
        value: "15-17",
        label: "15-17 years",
    },
    AgeGroup {
        value: "18+",
        label: "18+ years",
    },
];

pub fn sport_name(id: i64) -> Option<&'static str> {
    SPORTS.iter().find(|s| s.id == id).map(|s| s.name)
}

pub fn focus_area_name(id: i64) -> Option<&'static str> {
    FOCUS_AREAS.iter().find(|f| f.id == id).map(|f| f.name)
}

pub fn age_group_label(value: &str) -> Option<&'static str> {
    AGE_GROUPS.iter().find(|g| g.value == value).map(|g| g.label)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sport_id: i64,
    #[serde(default)]
    pub sport_name: Option<String>,
}

/// Positions for the currently selected sport.
///
/// Each fetch is tagged with a generation; `apply` drops any response whose
/// generation is no longer the latest, so the list always reflects the most
/// recent selection.
#[derive(Debug, Clone, Default)]
pub struct PositionState {
    pub positions: Vec<Position>,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionTicket {
    pub generation: u64,
    pub sport_id: i64,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new sport selection. Returns the request to issue, if any.
    pub fn select_sport(&mut self, sport_id: Option<i64>) -> Option<PositionTicket> {
        self.generation += 1;
        self.error = None;
        let Some(sport_id) = sport_id else {
            self.positions.clear();
            self.loading = false;
            return None;
        };
        self.loading = true;
        Some(PositionTicket {
            generation: self.generation,
            sport_id,
        })
    }

    pub fn is_current(&self, ticket: PositionTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Returns false when the response was stale and discarded.
    pub fn apply(&mut self, ticket: PositionTicket, result: Result<Vec<Position>, String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(positions) => {
                self.positions = positions;
                self.error = None;
            }
            Err(err) => {
                self.positions.clear();
                self.error = Some(format!("Failed to load positions: {err}"));
            }
        }
        true
    }

    pub fn contains(&self, position_id: i64) -> bool {
        self.positions.iter().any(|p| p.id == position_id)
    }

    pub fn name_of(&self, position_id: i64) -> Option<&str> {
        self.positions
            .iter()
            .find(|p| p.id == position_id)
            .map(|p| p.name.as_str())
    }
}
