//! Request dispatcher.
//!
//! Runs on the tokio runtime, executes generate requests on behalf of the UI
//! thread and reports each outcome back tagged with its sequence number.

use crate::controller::PendingRequest;
use crate::engine::GenerationService;
use crate::error::GenerateError;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;

/// Commands emitted by the UI thread.
#[derive(Debug)]
pub(crate) enum UiCommand {
    Generate(PendingRequest),
    Quit,
}

/// Events sent back to the UI thread.
#[derive(Debug)]
pub(crate) enum AppEvent {
    GenerationFinished {
        seq: u64,
        outcome: Result<String, GenerateError>,
    },
}

/// Serve UI commands until `Quit` or until the UI side hangs up.
///
/// Requests are not serialized here; the controller decides which outcome wins.
pub(crate) async fn run_dispatcher(
    service: Arc<dyn GenerationService>,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut in_flight: JoinSet<(u64, Result<String, GenerateError>)> = JoinSet::new();
    let mut seq_by_task: HashMap<tokio::task::Id, u64> = HashMap::new();

    let res = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Generate(pending)) => {
                        let service = service.clone();
                        let seq = pending.seq;
                        tracing::debug!(seq, in_flight = in_flight.len(), "spawning request");
                        let handle = in_flight.spawn(async move {
                            let outcome = service.generate(&pending.request).await;
                            (pending.seq, outcome)
                        });
                        seq_by_task.insert(handle.id(), seq);
                    }
                    Some(UiCommand::Quit) | None => break Ok(()),
                }
            }
            Some(joined) = in_flight.join_next_with_id(), if !in_flight.is_empty() => {
                match joined {
                    Ok((id, (seq, outcome))) => {
                        seq_by_task.remove(&id);
                        let _ = event_tx.send(AppEvent::GenerationFinished { seq, outcome });
                    }
                    Err(e) => {
                        // Every request must resolve, so a task that died still reports.
                        if let Some(seq) = seq_by_task.remove(&e.id()) {
                            tracing::error!(seq, error = %e, "request task failed");
                            let _ = event_tx.send(AppEvent::GenerationFinished {
                                seq,
                                outcome: Err(GenerateError::Interrupted),
                            });
                        }
                    }
                }
            }
        }
    };

    if !in_flight.is_empty() {
        tracing::debug!(count = in_flight.len(), "aborting in-flight requests");
    }
    in_flight.abort_all();
    res
}
