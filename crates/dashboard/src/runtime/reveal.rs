use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::RevealConfig;
use crate::events::DashboardEvent;
use crate::state::DashboardState;

use super::status::emit_session_update;

pub(crate) struct RevealHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RevealHandle {
    /// Cancels the counting task and waits until it has released the
    /// state, so no tick can land after this returns.
    pub(crate) async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

pub(crate) fn spawn_reveal(
    target: i64,
    config: RevealConfig,
    state: Arc<RwLock<DashboardState>>,
    event_tx: broadcast::Sender<DashboardEvent>,
) -> RevealHandle {
    let cancel = CancellationToken::new();
    let task = tokio::spawn(run_reveal(
        target,
        config,
        state,
        event_tx,
        cancel.clone(),
    ));
    RevealHandle { cancel, task }
}

async fn run_reveal(
    target: i64,
    config: RevealConfig,
    state: Arc<RwLock<DashboardState>>,
    event_tx: broadcast::Sender<DashboardEvent>,
    cancel: CancellationToken,
) {
    let mut revealed: i64 = 0;
    while revealed < target {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(revealed = revealed, target = target, "reveal cancelled");
                return;
            }
            _ = tokio::time::sleep(config.tick) => {}
        }
        revealed = (revealed + config.step).min(target);
        let landed = {
            let mut guard = state.write().await;
            guard.set_revealed_score(revealed)
        };
        if !landed {
            return;
        }
        emit_session_update(&state, &event_tx).await;
    }
    info!(target = target, "reveal complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionStatus;
    use protocol::AnalysisResult;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn reveal_config(step: i64) -> RevealConfig {
        RevealConfig {
            step,
            tick: Duration::from_millis(20),
            settle_delay: Duration::ZERO,
        }
    }

    fn succeeded_state(score: i64) -> Arc<RwLock<DashboardState>> {
        let mut state = DashboardState::new();
        state.succeed(AnalysisResult::from_value(&json!({ "health_score": score })));
        Arc::new(RwLock::new(state))
    }

    async fn next_revealed(rx: &mut broadcast::Receiver<DashboardEvent>) -> i64 {
        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("event before timeout")
            .expect("channel open");
        match event {
            DashboardEvent::SessionUpdated { session } => {
                assert_eq!(session.status, SessionStatus::Succeeded);
                session.revealed_score.expect("revealed score")
            }
            DashboardEvent::SessionSnapshot { .. } => panic!("unexpected snapshot"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn counts_up_by_step_and_clamps_at_target() {
        let state = succeeded_state(87);
        let (event_tx, mut rx) = broadcast::channel(512);
        let handle = spawn_reveal(87, reveal_config(2), Arc::clone(&state), event_tx);

        let mut observed = Vec::new();
        for _ in 0..44 {
            observed.push(next_revealed(&mut rx).await);
        }
        let mut expected: Vec<i64> = (1..=43).map(|tick| tick * 2).collect();
        expected.push(87);
        assert_eq!(observed, expected);

        timeout(Duration::from_secs(1), handle.task)
            .await
            .expect("task ends")
            .expect("task join");
        assert!(rx.try_recv().is_err());
        assert_eq!(state.read().await.session_view().revealed_score, Some(87));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_target_settles_without_ticking() {
        let state = succeeded_state(0);
        let (event_tx, mut rx) = broadcast::channel(512);
        let handle = spawn_reveal(0, reveal_config(2), Arc::clone(&state), event_tx);

        timeout(Duration::from_secs(1), handle.task)
            .await
            .expect("task ends")
            .expect("task join");
        assert!(rx.try_recv().is_err());
        assert_eq!(state.read().await.session_view().revealed_score, Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_the_counter_mid_flight() {
        let state = succeeded_state(1000);
        let (event_tx, mut rx) = broadcast::channel(512);
        let handle = spawn_reveal(1000, reveal_config(2), Arc::clone(&state), event_tx);

        let first = next_revealed(&mut rx).await;
        let second = next_revealed(&mut rx).await;
        assert_eq!(first, 2);
        assert_eq!(second, 4);

        handle.stop().await;
        let frozen = state.read().await.session_view().revealed_score;
        assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());
        assert_eq!(state.read().await.session_view().revealed_score, frozen);
    }
}
