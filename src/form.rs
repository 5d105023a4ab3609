use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::reference;
use crate::schema::{self, FIELDS, FieldKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The user left this field blank: no constraint is sent to the backend.
    Unset,
    Number(i64),
    Text(String),
    /// Raw input that did not parse for an integer field.
    Invalid(String),
}

impl FieldValue {
    pub fn is_unset(&self) -> bool {
        match self {
            FieldValue::Unset => true,
            FieldValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// What an edit box should start from when the user edits this value.
    pub fn raw(&self) -> String {
        match self {
            FieldValue::Unset => String::new(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(text) | FieldValue::Invalid(text) => text.clone(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FieldValue::Unset => Value::Null,
            FieldValue::Number(n) => Value::from(*n),
            FieldValue::Text(text) => Value::from(text.as_str()),
            FieldValue::Invalid(_) => Value::Null,
        }
    }
}

/// Coerce one raw input event into a stored value, per the field schema.
pub fn coerce(name: &str, raw: &str) -> FieldValue {
    let Some(spec) = schema::field_spec(name) else {
        return FieldValue::Text(raw.to_string());
    };
    if raw.is_empty() {
        return FieldValue::Unset;
    }
    match spec.kind {
        FieldKind::Id | FieldKind::Number => match raw.trim().parse::<i64>() {
            Ok(n) => FieldValue::Number(n),
            Err(_) => FieldValue::Invalid(raw.to_string()),
        },
        FieldKind::Label => FieldValue::Text(raw.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormParams {
    values: BTreeMap<String, FieldValue>,
}

impl Default for FormParams {
    fn default() -> Self {
        Self::defaults()
    }
}

impl FormParams {
    pub fn defaults() -> Self {
        let mut values = BTreeMap::new();
        for spec in FIELDS {
            values.insert(spec.name.to_string(), default_value(spec.name));
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> &FieldValue {
        self.values.get(name).unwrap_or(&FieldValue::Unset)
    }

    pub fn number(&self, name: &str) -> Option<i64> {
        self.get(name).as_number()
    }

    /// Apply one input event. Only `name` changes.
    pub fn update(&mut self, name: &str, raw: &str) {
        self.values.insert(name.to_string(), coerce(name, raw));
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn clear(&mut self, name: &str) {
        self.set(name, FieldValue::Unset);
    }

    /// Request body for the generator endpoints: every unset field is omitted,
    /// schema fields come first in form order, unknown fields follow by name.
    pub fn to_request_body(&self) -> Value {
        let mut body = Map::new();
        for spec in FIELDS {
            let value = self.get(spec.name);
            if !value.is_unset() {
                body.insert(spec.name.to_string(), value.to_json());
            }
        }
        for (name, value) in &self.values {
            if schema::field_spec(name).is_some() || value.is_unset() {
                continue;
            }
            body.insert(name.clone(), value.to_json());
        }
        Value::Object(body)
    }

    pub fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        for spec in FIELDS {
            let value = self.get(spec.name);
            let problem = match value {
                FieldValue::Unset if spec.required => Some(IssueKind::Missing),
                FieldValue::Invalid(_) => Some(IssueKind::NotANumber),
                FieldValue::Number(n) => spec
                    .bounds
                    .filter(|bounds| !bounds.contains(*n))
                    .map(|_| IssueKind::OutOfRange),
                _ => None,
            };
            if let Some(kind) = problem {
                issues.push(FieldIssue {
                    field: spec.name,
                    kind,
                });
            }
        }
        issues
    }

    /// One-line summary of what the parameters ask for.
    pub fn describe(&self) -> String {
        let total = self.number(schema::TOTAL_DURATION).unwrap_or(0);
        let sport = self
            .number(schema::SPORT_ID)
            .and_then(reference::sport_name)
            .unwrap_or("");
        let focus = self
            .number(schema::FOCUS_AREA_ID)
            .and_then(reference::focus_area_name);
        let warmup = self.number(schema::WARMUP_DURATION).unwrap_or(0);
        let stations = self.number(schema::COACHING_STATIONS).unwrap_or(0);
        let rotation = self
            .number(schema::STATION_ROTATION)
            .filter(|minutes| *minutes > 0);

        let mut out = if sport.is_empty() {
            format!("A {total}-minute practice plan")
        } else {
            format!("A {total}-minute {sport} practice plan")
        };
        if let Some(focus) = focus.filter(|name| *name != "Mixed") {
            out.push_str(&format!(" focusing on {focus}"));
        }
        out.push_str(&format!(
            ". Features a {warmup}-minute warmup followed by {stations}"
        ));
        match rotation {
            Some(minutes) => {
                out.push_str(&format!(" coaching stations ({minutes} minutes each)."))
            }
            None => out.push_str(" coaching stations."),
        }
        out
    }
}

fn default_value(name: &str) -> FieldValue {
    match name {
        schema::SPORT_ID => FieldValue::Number(1),
        schema::TOTAL_DURATION => FieldValue::Number(90),
        schema::WARMUP_DURATION => FieldValue::Number(15),
        schema::TEAM_TIME_DURATION => FieldValue::Number(15),
        schema::STATION_TOTAL_DURATION => FieldValue::Number(45),
        schema::STATION_ROTATION => FieldValue::Number(5),
        schema::POSITION_GROUP_DURATION => FieldValue::Number(15),
        schema::COACHING_STATIONS => FieldValue::Number(3),
        _ => FieldValue::Unset,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    NotANumber,
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn message(&self) -> String {
        let label = schema::field_spec(self.field)
            .map(|spec| spec.label)
            .unwrap_or(self.field);
        match self.kind {
            IssueKind::Missing => format!("{label} is required"),
            IssueKind::NotANumber => format!("{label} must be a whole number"),
            IssueKind::OutOfRange => {
                let hint = schema::field_spec(self.field)
                    .and_then(|spec| spec.bounds)
                    .map(|bounds| bounds.hint())
                    .unwrap_or_default();
                format!("{label} must be within {hint}")
            }
        }
    }
}
