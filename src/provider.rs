use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::api::{self, PlanApi};
use crate::session::RequestKind;
use crate::state::{Delta, ProviderCommand};

/// Runs plan-service calls off the UI thread. Each command is answered by a
/// delta carrying the ticket it was issued with; the worker never decides
/// whether a result is stale, `apply_delta` does.
pub fn spawn_provider(
    api: Arc<dyn PlanApi>,
    parallelism: usize,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let pool = build_fetch_pool(parallelism);
        if pool.is_none() {
            let _ = tx.send(Delta::Log(
                "[WARN] Fetch pool unavailable, using one thread per request".to_string(),
            ));
        }

        while let Ok(cmd) = cmd_rx.recv() {
            let api = api.clone();
            let tx = tx.clone();
            let job = move || run_command(api.as_ref(), cmd, &tx);
            if let Some(pool) = pool.as_ref() {
                pool.spawn(job);
            } else {
                thread::spawn(job);
            }
        }
    })
}

pub fn run_command(api: &dyn PlanApi, cmd: ProviderCommand, tx: &Sender<Delta>) {
    match cmd {
        ProviderCommand::FetchPositions(ticket) => {
            let result = api::run_call(|| api.fetch_positions(ticket.sport_id));
            let _ = tx.send(Delta::PositionsLoaded { ticket, result });
        }
        ProviderCommand::GeneratePlan(request) => {
            let result = match request.ticket.kind {
                RequestKind::Preview => api::run_call(|| api.preview_plan(&request.body)),
                RequestKind::Save => api::run_call(|| api.save_plan(&request.body)),
            };
            let _ = tx.send(Delta::PlanFinished {
                ticket: request.ticket,
                result,
            });
        }
    }
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|idx| format!("plan-fetch-{idx}"))
        .build()
        .ok()
}
