/// Progress of one asynchronous concern (auth handshake, data sync).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Success,
    Failed,
    Denied,
}

/// A phase plus the human-readable reason shown next to it.
///
/// Transitions only move forward within a session; a configuration change
/// re-arms both statuses to pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub phase: Phase,
    pub reason: String,
}

impl Status {
    pub fn pending(reason: impl Into<String>) -> Self {
        Self { phase: Phase::Pending, reason: reason.into() }
    }

    pub fn success(reason: impl Into<String>) -> Self {
        Self { phase: Phase::Success, reason: reason.into() }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self { phase: Phase::Failed, reason: reason.into() }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self { phase: Phase::Denied, reason: reason.into() }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self.phase, Phase::Failed | Phase::Denied)
    }
}

/// One remediation step shown when the backend blocks the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub title: String,
    pub detail: String,
    /// Whether this step is the one currently blocking the session.
    pub blocked: bool,
}

/// The actionable checklist shown instead of the content view when auth
/// failed or data access was denied. Names the two backend-side settings
/// the operator has to fix; neither status being blocked yields no
/// checklist at all.
pub fn connection_checklist(
    project_id: &str,
    auth: &Status,
    data: &Status,
) -> Option<Vec<ChecklistItem>> {
    if !auth.is_blocked() && !data.is_blocked() {
        return None;
    }
    Some(vec![
        ChecklistItem {
            title: "Anonymous Authentication".into(),
            detail: format!(
                "Enable anonymous sign-in for project '{}' in the backend's authentication settings.",
                project_id
            ),
            blocked: auth.is_blocked(),
        },
        ChecklistItem {
            title: "Collection Access Rules".into(),
            detail: "Publish access rules that allow reads and writes on the record collection."
                .into(),
            blocked: data.is_blocked(),
        },
    ])
}
