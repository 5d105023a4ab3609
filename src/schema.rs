/// How a form field coerces raw input and how the form renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    // Integer identifier picked from a lookup table (sport, focus area, position).
    Id,
    // Free integer constrained by `FieldSpec::bounds`.
    Number,
    // String value picked from a lookup table (age group).
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i64,
    pub max: Option<i64>,
}

impl Bounds {
    pub const fn new(min: i64, max: i64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: i64) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && self.max.is_none_or(|max| value <= max)
    }

    pub fn hint(&self) -> String {
        match self.max {
            Some(max) => format!("{}-{}", self.min, max),
            None => format!(">={}", self.min),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub bounds: Option<Bounds>,
    pub required: bool,
}

impl FieldSpec {
    pub fn is_integer(&self) -> bool {
        matches!(self.kind, FieldKind::Id | FieldKind::Number)
    }
}

pub const SPORT_ID: &str = "sportId";
pub const FOCUS_AREA_ID: &str = "focusAreaId";
pub const POSITION_ID: &str = "positionId";
pub const AGE_GROUP: &str = "ageGroup";
pub const TOTAL_DURATION: &str = "totalDurationMinutes";
pub const WARMUP_DURATION: &str = "warmupDurationMinutes";
pub const COACHING_STATIONS: &str = "coachingStations";
pub const STATION_TOTAL_DURATION: &str = "stationTotalDurationMinutes";
pub const STATION_ROTATION: &str = "stationRotationMinutes";
pub const POSITION_GROUP_DURATION: &str = "positionGroupDurationMinutes";
pub const TEAM_TIME_DURATION: &str = "teamTimeDurationMinutes";
pub const MAX_EQUIPMENT_TYPES: &str = "maxEquipmentTypes";

/// Every field the plan generator accepts, in form order. Request bodies are
/// serialized in this order too.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: SPORT_ID,
        label: "Sport",
        kind: FieldKind::Id,
        bounds: None,
        required: true,
    },
    FieldSpec {
        name: FOCUS_AREA_ID,
        label: "Focus Area",
        kind: FieldKind::Id,
        bounds: None,
        required: false,
    },
    FieldSpec {
        name: POSITION_ID,
        label: "Position",
        kind: FieldKind::Id,
        bounds: None,
        required: false,
    },
    FieldSpec {
        name: AGE_GROUP,
        label: "Age Group",
        kind: FieldKind::Label,
        bounds: None,
        required: false,
    },
    FieldSpec {
        name: TOTAL_DURATION,
        label: "Total Practice Duration (min)",
        kind: FieldKind::Number,
        bounds: Some(Bounds::new(30, 240)),
        required: true,
    },
    FieldSpec {
        name: WARMUP_DURATION,
        label: "Warmup Duration (min)",
        kind: FieldKind::Number,
        bounds: Some(Bounds::new(5, 30)),
        required: true,
    },
    FieldSpec {
        name: COACHING_STATIONS,
        label: "Coaching Stations",
        kind: FieldKind::Number,
        bounds: Some(Bounds::new(1, 6)),
        required: true,
    },
    FieldSpec {
        name: STATION_TOTAL_DURATION,
        label: "Total Station Time (min)",
        kind: FieldKind::Number,
        bounds: Some(Bounds::new(0, 120)),
        required: false,
    },
    FieldSpec {
        name: STATION_ROTATION,
        label: "Time Per Rotation (min)",
        kind: FieldKind::Number,
        bounds: Some(Bounds::new(3, 20)),
        required: false,
    },
    FieldSpec {
        name: POSITION_GROUP_DURATION,
        label: "Position Group Time (min)",
        kind: FieldKind::Number,
        bounds: Some(Bounds::new(0, 45)),
        required: false,
    },
    FieldSpec {
        name: TEAM_TIME_DURATION,
        label: "Team Time (min)",
        kind: FieldKind::Number,
        bounds: Some(Bounds::new(0, 60)),
        required: false,
    },
    FieldSpec {
        name: MAX_EQUIPMENT_TYPES,
        label: "Max Equipment Types",
        kind: FieldKind::Number,
        bounds: Some(Bounds::at_least(1)),
        required: false,
    },
];

pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}
