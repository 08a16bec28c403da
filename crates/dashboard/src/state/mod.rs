mod dashboard;
mod form;
mod model;

pub(crate) use dashboard::DashboardState;
pub(crate) use model::{FailureKind, SessionCommand, SessionStatus, SessionView};
