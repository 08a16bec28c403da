use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::events::DashboardEvent;
use crate::state::{DashboardState, FailureKind};

pub(crate) async fn emit_session_update(
    state: &Arc<RwLock<DashboardState>>,
    event_tx: &broadcast::Sender<DashboardEvent>,
) {
    let session = {
        let guard = state.read().await;
        guard.session_view()
    };
    let _ = event_tx.send(DashboardEvent::SessionUpdated { session });
}

pub(crate) async fn fail_and_notify(
    state: &Arc<RwLock<DashboardState>>,
    event_tx: &broadcast::Sender<DashboardEvent>,
    kind: FailureKind,
    message: String,
) {
    {
        let mut guard = state.write().await;
        guard.fail(kind, message);
    }
    emit_session_update(state, event_tx).await;
}
