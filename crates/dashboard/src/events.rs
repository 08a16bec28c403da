use crate::state::SessionView;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum DashboardEvent {
    SessionSnapshot { session: SessionView },
    SessionUpdated { session: SessionView },
}
