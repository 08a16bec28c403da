use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analyze::request_analysis;
use crate::config::{AnalyzeConfig, RevealConfig};
use crate::events::DashboardEvent;
use crate::state::{DashboardState, FailureKind, SessionCommand};

use super::reveal::{spawn_reveal, RevealHandle};
use super::status::{emit_session_update, fail_and_notify};

const COMMAND_CHANNEL_CAPACITY: usize = 16;
const NETWORK_FAILURE_MESSAGE: &str = "failed to reach the analysis service";
const CONFIG_FAILURE_MESSAGE: &str = "analysis service address is not configured";

pub(crate) fn spawn_session_worker(
    state: Arc<RwLock<DashboardState>>,
    analyze: AnalyzeConfig,
    reveal: RevealConfig,
    shutdown: CancellationToken,
    event_tx: broadcast::Sender<DashboardEvent>,
) -> (mpsc::Sender<SessionCommand>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    info!("session worker spawned");
    let handle = tokio::spawn(run_session_worker(
        state, analyze, reveal, rx, shutdown, event_tx,
    ));
    (tx, handle)
}

async fn run_session_worker(
    state: Arc<RwLock<DashboardState>>,
    analyze: AnalyzeConfig,
    reveal: RevealConfig,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    shutdown: CancellationToken,
    event_tx: broadcast::Sender<DashboardEvent>,
) {
    let mut active_reveal: Option<RevealHandle> = None;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            command = cmd_rx.recv() => {
                let Some(command) = command else { break };
                match command {
                    SessionCommand::Submit => {
                        // the previous reveal must be gone before any
                        // new ticks can be scheduled
                        if let Some(handle) = active_reveal.take() {
                            handle.stop().await;
                        }
                        active_reveal =
                            handle_submit(&state, &analyze, reveal, &event_tx).await;
                    }
                }
            }
        }
    }
    if let Some(handle) = active_reveal.take() {
        handle.stop().await;
    }
    info!("session worker stopped");
}

async fn handle_submit(
    state: &Arc<RwLock<DashboardState>>,
    analyze: &AnalyzeConfig,
    reveal: RevealConfig,
    event_tx: &broadcast::Sender<DashboardEvent>,
) -> Option<RevealHandle> {
    let submission_id = Uuid::new_v4().to_string();

    // a missing base address fails the submit outright, without ever
    // entering Pending or touching the network
    let Some(base_url) = analyze.base_url.as_deref() else {
        warn!(submission = %submission_id, "analysis api base url not configured");
        fail_and_notify(
            state,
            event_tx,
            FailureKind::Config,
            CONFIG_FAILURE_MESSAGE.to_string(),
        )
        .await;
        return None;
    };

    let request = {
        let mut guard = state.write().await;
        guard.begin_pending();
        guard.build_request()
    };
    emit_session_update(state, event_tx).await;

    let request = match request {
        Ok(request) => request,
        Err(message) => {
            warn!(submission = %submission_id, error = %message, "request build failed");
            fail_and_notify(state, event_tx, FailureKind::Request, message).await;
            return None;
        }
    };

    info!(
        submission = %submission_id,
        team_size = request.team_size,
        "analysis request started"
    );
    match request_analysis(analyze, base_url, &request).await {
        Ok(result) => {
            if !reveal.settle_delay.is_zero() {
                tokio::time::sleep(reveal.settle_delay).await;
            }
            let target = result.reveal_target();
            {
                let mut guard = state.write().await;
                guard.succeed(result);
            }
            emit_session_update(state, event_tx).await;
            info!(
                submission = %submission_id,
                health_score = target,
                "analysis request succeeded"
            );
            Some(spawn_reveal(
                target,
                reveal,
                Arc::clone(state),
                event_tx.clone(),
            ))
        }
        Err(err) => {
            warn!(submission = %submission_id, error = %err, "analysis request failed");
            fail_and_notify(
                state,
                event_tx,
                FailureKind::Network,
                NETWORK_FAILURE_MESSAGE.to_string(),
            )
            .await;
            None
        }
    }
}
