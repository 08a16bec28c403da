use protocol::AnalysisResult;
use serde::Serialize;

pub(crate) enum SessionCommand {
    Submit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FailureKind {
    Config,
    Request,
    Network,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SessionState {
    Idle,
    Pending,
    Failed {
        kind: FailureKind,
        message: String,
    },
    Succeeded {
        result: AnalysisResult,
        revealed_score: i64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SessionStatus {
    Idle,
    Pending,
    Failed,
    Succeeded,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct SessionView {
    pub(crate) status: SessionStatus,
    pub(crate) error_kind: Option<FailureKind>,
    pub(crate) error: Option<String>,
    pub(crate) result: Option<AnalysisResult>,
    pub(crate) revealed_score: Option<i64>,
    pub(crate) finished_at: Option<String>,
}
