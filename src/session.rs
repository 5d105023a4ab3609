use serde_json::Value;

use crate::api::{self, PlanApi};
use crate::form::FormParams;
use crate::plan::PracticePlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Preview,
    Save,
}

/// Identifies one preview/save call. Only the most recently issued ticket
/// may change session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTicket {
    pub generation: u64,
    pub kind: RequestKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub ticket: PlanTicket,
    pub body: Value,
}

#[derive(Debug, Clone, Default)]
pub struct PlanSession {
    pub params: FormParams,
    pub plan: Option<PracticePlan>,
    pub saved_plan: Option<PracticePlan>,
    pub loading: bool,
    pub success: bool,
    pub error: Option<String>,
    generation: u64,
}

impl PlanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_field(&mut self, name: &str, raw: &str) {
        self.params.update(name, raw);
    }

    fn next_ticket(&mut self, kind: RequestKind) -> PlanTicket {
        self.generation += 1;
        PlanTicket {
            generation: self.generation,
            kind,
        }
    }

    pub fn is_current(&self, ticket: PlanTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Start a preview: clears the previous outcome and returns the request
    /// to send.
    pub fn begin_preview(&mut self) -> PlanRequest {
        self.loading = true;
        self.error = None;
        self.plan = None;
        self.success = false;
        PlanRequest {
            ticket: self.next_ticket(RequestKind::Preview),
            body: self.params.to_request_body(),
        }
    }

    /// Returns false when the ticket was superseded and the result dropped.
    pub fn finish_preview(&mut self, ticket: PlanTicket, result: Result<PracticePlan, String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(plan) => {
                self.plan = Some(plan);
                self.success = true;
            }
            Err(message) => {
                self.plan = None;
                self.success = false;
                self.error = Some(message);
            }
        }
        true
    }

    /// Start a save of the current parameters. `None` when nothing has been
    /// previewed yet.
    pub fn begin_save(&mut self) -> Option<PlanRequest> {
        self.plan.as_ref()?;
        self.loading = true;
        self.error = None;
        Some(PlanRequest {
            ticket: self.next_ticket(RequestKind::Save),
            body: self.params.to_request_body(),
        })
    }

    pub fn finish_save(&mut self, ticket: PlanTicket, result: Result<PracticePlan, String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(saved) => {
                self.saved_plan = Some(saved);
                self.success = true;
            }
            Err(message) => {
                self.success = false;
                self.error = Some(message);
            }
        }
        true
    }

    pub fn finish(&mut self, ticket: PlanTicket, result: Result<PracticePlan, String>) -> bool {
        match ticket.kind {
            RequestKind::Preview => self.finish_preview(ticket, result),
            RequestKind::Save => self.finish_save(ticket, result),
        }
    }

    /// Restore defaults. Any call still in flight is superseded.
    pub fn reset(&mut self) {
        self.params = FormParams::defaults();
        self.plan = None;
        self.saved_plan = None;
        self.success = false;
        self.error = None;
        self.loading = false;
        self.generation += 1;
    }

    /// Blocking preview for callers without a worker thread.
    pub fn generate_preview(&mut self, api: &dyn PlanApi) {
        let request = self.begin_preview();
        let result = api::run_call(|| api.preview_plan(&request.body));
        self.finish_preview(request.ticket, result);
    }

    /// Blocking save; a no-op without a previewed plan.
    pub fn save_previewed_plan(&mut self, api: &dyn PlanApi) {
        let Some(request) = self.begin_save() else {
            return;
        };
        let result = api::run_call(|| api.save_plan(&request.body));
        self.finish_save(request.ticket, result);
    }
}
