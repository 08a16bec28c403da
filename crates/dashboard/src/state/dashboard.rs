use std::collections::BTreeMap;
use std::time::SystemTime;

use protocol::{AnalysisRequest, AnalysisResult};

use super::form::FormFields;
use super::model::{FailureKind, SessionState, SessionStatus, SessionView};

pub(crate) struct DashboardState {
    form: FormFields,
    session: SessionState,
    finished_at: Option<SystemTime>,
}

impl DashboardState {
    pub(crate) fn new() -> Self {
        Self {
            form: FormFields::default(),
            session: SessionState::Idle,
            finished_at: None,
        }
    }

    pub(crate) fn set_field(&mut self, name: &str, value: String) -> bool {
        self.form.set_field(name, value)
    }

    pub(crate) fn form_entries(&self) -> BTreeMap<String, String> {
        self.form.entries()
    }

    pub(crate) fn build_request(&self) -> Result<AnalysisRequest, String> {
        self.form.build_request()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.session == SessionState::Pending
    }

    /// Entry into Pending drops any previous result or error wholesale.
    pub(crate) fn begin_pending(&mut self) {
        self.session = SessionState::Pending;
        self.finished_at = None;
    }

    pub(crate) fn fail(&mut self, kind: FailureKind, message: String) {
        self.session = SessionState::Failed { kind, message };
        self.finished_at = Some(SystemTime::now());
    }

    pub(crate) fn succeed(&mut self, result: AnalysisResult) {
        self.session = SessionState::Succeeded {
            result,
            revealed_score: 0,
        };
        self.finished_at = Some(SystemTime::now());
    }

    /// Only meaningful while Succeeded; reports whether the write landed.
    pub(crate) fn set_revealed_score(&mut self, score: i64) -> bool {
        match &mut self.session {
            SessionState::Succeeded { revealed_score, .. } => {
                *revealed_score = score;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn session_view(&self) -> SessionView {
        let finished_at = self.finished_at.map(format_time);
        match &self.session {
            SessionState::Idle => SessionView {
                status: SessionStatus::Idle,
                error_kind: None,
                error: None,
                result: None,
                revealed_score: None,
                finished_at,
            },
            SessionState::Pending => SessionView {
                status: SessionStatus::Pending,
                error_kind: None,
                error: None,
                result: None,
                revealed_score: None,
                finished_at,
            },
            SessionState::Failed { kind, message } => SessionView {
                status: SessionStatus::Failed,
                error_kind: Some(*kind),
                error: Some(message.clone()),
                result: None,
                revealed_score: None,
                finished_at,
            },
            SessionState::Succeeded {
                result,
                revealed_score,
            } => SessionView {
                status: SessionStatus::Succeeded,
                error_kind: None,
                error: None,
                result: Some(result.clone()),
                revealed_score: Some(*revealed_score),
                finished_at,
            },
        }
    }
}

fn format_time(time: SystemTime) -> String {
    humantime::format_rfc3339(time).to_string()
}
