use std::collections::VecDeque;

use crate::form::FieldValue;
use crate::plan::PracticePlan;
use crate::reference::{
    AGE_GROUPS, FOCUS_AREAS, Position, PositionState, PositionTicket, SPORTS, age_group_label,
    focus_area_name, sport_name,
};
use crate::schema::{self, FIELDS, FieldKind, FieldSpec};
use crate::session::{PlanRequest, PlanSession, PlanTicket, RequestKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Form,
    Plan,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub pane: Pane,
    pub session: PlanSession,
    pub positions: PositionState,
    pub field_selected: usize,
    pub edit_buffer: Option<String>,
    pub selected_rotation: usize,
    pub plan_scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            pane: Pane::Form,
            session: PlanSession::new(),
            positions: PositionState::new(),
            field_selected: 0,
            edit_buffer: None,
            selected_rotation: 0,
            plan_scroll: 0,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Positions for the sport currently in the form, issued once at start.
    pub fn initial_commands(&mut self) -> Vec<ProviderCommand> {
        let sport = self.session.params.number(schema::SPORT_ID);
        self.positions
            .select_sport(sport)
            .map(ProviderCommand::FetchPositions)
            .into_iter()
            .collect()
    }

    pub fn selected_field(&self) -> &'static FieldSpec {
        &FIELDS[self.field_selected.min(FIELDS.len() - 1)]
    }

    pub fn select_next(&mut self) {
        if self.field_selected + 1 < FIELDS.len() {
            self.field_selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.field_selected = self.field_selected.saturating_sub(1);
    }

    pub fn is_editing(&self) -> bool {
        self.edit_buffer.is_some()
    }

    pub fn begin_edit(&mut self) {
        let spec = self.selected_field();
        if spec.kind != FieldKind::Number {
            return;
        }
        let current = self.session.params.get(spec.name).raw();
        self.edit_buffer = Some(current);
    }

    pub fn cancel_edit(&mut self) {
        self.edit_buffer = None;
    }

    pub fn edit_push(&mut self, ch: char) {
        if let Some(buf) = self.edit_buffer.as_mut()
            && buf.len() < 6
        {
            buf.push(ch);
        }
    }

    pub fn edit_pop(&mut self) {
        if let Some(buf) = self.edit_buffer.as_mut() {
            buf.pop();
        }
    }

    pub fn commit_edit(&mut self) -> Option<ProviderCommand> {
        let raw = self.edit_buffer.take()?;
        let name = self.selected_field().name;
        self.set_field(name, &raw)
    }

    /// Apply one input event. A sport change starts a position fetch.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Option<ProviderCommand> {
        let before = self.session.params.get(schema::SPORT_ID).clone();
        self.session.update_field(name, raw);
        if name != schema::SPORT_ID {
            return None;
        }
        let after = self.session.params.get(schema::SPORT_ID).clone();
        if before == after {
            return None;
        }
        self.sport_changed()
    }

    fn sport_changed(&mut self) -> Option<ProviderCommand> {
        let sport = self.session.params.number(schema::SPORT_ID);
        self.positions
            .select_sport(sport)
            .map(ProviderCommand::FetchPositions)
    }

    /// Step a lookup field through its options; `forward` picks direction.
    pub fn cycle_choice(&mut self, forward: bool) -> Option<ProviderCommand> {
        let spec = self.selected_field();
        let options = self.choice_values(spec.name);
        if options.is_empty() {
            return None;
        }
        let current = self.session.params.get(spec.name).raw();
        let idx = options.iter().position(|v| *v == current);
        let next = match (idx, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(i), false) => (i + options.len() - 1) % options.len(),
        };
        let raw = options[next].clone();
        self.set_field(spec.name, &raw)
    }

    /// Raw values a lookup field can take; the empty string means unset.
    pub fn choice_values(&self, name: &str) -> Vec<String> {
        match name {
            schema::SPORT_ID => SPORTS.iter().map(|s| s.id.to_string()).collect(),
            schema::FOCUS_AREA_ID => std::iter::once(String::new())
                .chain(FOCUS_AREAS.iter().map(|f| f.id.to_string()))
                .collect(),
            schema::POSITION_ID => std::iter::once(String::new())
                .chain(self.positions.positions.iter().map(|p| p.id.to_string()))
                .collect(),
            schema::AGE_GROUP => AGE_GROUPS.iter().map(|g| g.value.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    /// Text shown for a field's current value in the form.
    pub fn display_value(&self, name: &str) -> String {
        let value = self.session.params.get(name);
        let n = value.as_number();
        match name {
            schema::SPORT_ID => n
                .and_then(sport_name)
                .map(str::to_string)
                .unwrap_or_else(|| "Select Sport".to_string()),
            schema::FOCUS_AREA_ID => n
                .and_then(focus_area_name)
                .map(str::to_string)
                .unwrap_or_else(|| "All Focus Areas".to_string()),
            schema::POSITION_ID => match n {
                Some(id) => self
                    .positions
                    .name_of(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{id}")),
                None if self.positions.loading => "Loading...".to_string(),
                None if self.positions.positions.is_empty() => "(none for sport)".to_string(),
                None => "All Positions".to_string(),
            },
            schema::AGE_GROUP => age_group_label(&value.raw()).unwrap_or("Any Age").to_string(),
            _ => match value {
                FieldValue::Unset => "-".to_string(),
                other => other.raw(),
            },
        }
    }

    pub fn request_preview(&mut self) -> Option<ProviderCommand> {
        if self.session.loading {
            return None;
        }
        self.selected_rotation = 0;
        self.plan_scroll = 0;
        Some(ProviderCommand::GeneratePlan(self.session.begin_preview()))
    }

    pub fn request_save(&mut self) -> Option<ProviderCommand> {
        if self.session.loading {
            return None;
        }
        let Some(request) = self.session.begin_save() else {
            self.push_log("[INFO] Nothing to save yet: generate a preview first");
            return None;
        };
        Some(ProviderCommand::GeneratePlan(request))
    }

    pub fn reset(&mut self) -> Option<ProviderCommand> {
        let before = self.session.params.get(schema::SPORT_ID).clone();
        self.session.reset();
        self.edit_buffer = None;
        self.selected_rotation = 0;
        self.plan_scroll = 0;
        self.push_log("[INFO] Form reset to defaults");
        if *self.session.params.get(schema::SPORT_ID) == before {
            return None;
        }
        self.sport_changed()
    }

    pub fn cycle_rotation(&mut self, forward: bool) {
        let count = self
            .session
            .plan
            .as_ref()
            .and_then(|plan| {
                plan.sections
                    .iter()
                    .map(|s| s.station_groups().len())
                    .max()
            })
            .unwrap_or(0);
        if count == 0 {
            self.selected_rotation = 0;
            return;
        }
        self.selected_rotation = if forward {
            (self.selected_rotation + 1) % count
        } else {
            (self.selected_rotation + count - 1) % count
        };
    }

    pub fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Form => Pane::Plan,
            Pane::Plan => Pane::Form,
        };
    }

    pub fn scroll_plan(&mut self, down: bool) {
        self.plan_scroll = if down {
            self.plan_scroll.saturating_add(5)
        } else {
            self.plan_scroll.saturating_sub(5)
        };
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    PositionsLoaded {
        ticket: PositionTicket,
        result: Result<Vec<Position>, String>,
    },
    PlanFinished {
        ticket: PlanTicket,
        result: Result<PracticePlan, String>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchPositions(PositionTicket),
    GeneratePlan(PlanRequest),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::PositionsLoaded { ticket, result } => {
            let failed = result.as_ref().err().cloned();
            if !state.positions.apply(ticket, result) {
                state.push_log(format!(
                    "[INFO] Dropped stale positions for sport {}",
                    ticket.sport_id
                ));
                return;
            }
            if let Some(err) = failed {
                state.push_log(format!("[WARN] Positions error: {err}"));
                return;
            }
            // A position picked for the previous sport no longer applies.
            if let Some(position_id) = state.session.params.number(schema::POSITION_ID)
                && !state.positions.contains(position_id)
            {
                state.session.params.clear(schema::POSITION_ID);
                state.push_log("[INFO] Position cleared: not offered for this sport");
            }
        }
        Delta::PlanFinished { ticket, result } => {
            let outcome = result
                .as_ref()
                .map(|plan| plan.name.clone())
                .map_err(|err| err.clone());
            if !state.session.finish(ticket, result) {
                state.push_log("[INFO] Dropped response from a superseded request");
                return;
            }
            match (ticket.kind, outcome) {
                (RequestKind::Preview, Ok(name)) => {
                    state.pane = Pane::Plan;
                    state.push_log(format!("[INFO] Preview ready: {name}"));
                }
                (RequestKind::Save, Ok(_)) => {
                    let id = state
                        .session
                        .saved_plan
                        .as_ref()
                        .and_then(|plan| plan.id)
                        .map(|id| format!(" (#{id})"))
                        .unwrap_or_default();
                    state.push_log(format!("[INFO] Practice plan saved successfully{id}"));
                }
                (RequestKind::Preview, Err(err)) => {
                    state.push_log(format!("[WARN] Preview failed: {err}"));
                }
                (RequestKind::Save, Err(err)) => {
                    state.push_log(format!("[WARN] Save failed: {err}"));
                }
            }
        }
        Delta::Log(line) => state.push_log(line),
    }
}
