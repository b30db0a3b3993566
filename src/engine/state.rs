use super::RowId;
use std::fmt;

/// Where the sequencer currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// No workflow is running.
    Idle,
    /// Free to pull the next step. Only observed mid-call.
    Advancing,
    /// A Question or Collect row is waiting for the consumer.
    Blocked { row: RowId },
    /// A LoadWorkflow step is waiting for its workflow to be resolved.
    Suspended { workflow: String },
}

impl EngineState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EngineState::Idle)
    }

    pub fn blocked_row(&self) -> Option<RowId> {
        match self {
            EngineState::Blocked { row } => Some(*row),
            _ => None,
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Advancing => write!(f, "advancing"),
            EngineState::Blocked { row } => write!(f, "blocked on {}", row),
            EngineState::Suspended { workflow } => write!(f, "loading '{}'", workflow),
        }
    }
}

/// A sub-workflow load the sequencer is waiting on.
///
/// Hand it back through `Session::complete_load` together with the
/// resolution result. A ticket issued before the session was ended or
/// restarted is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub(crate) epoch: u64,
    pub(crate) step_guid: String,
    pub(crate) workflow_name: String,
    pub(crate) clear_window: bool,
    pub(crate) parent_answer: Option<String>,
}

impl PendingLoad {
    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    pub fn clear_window(&self) -> bool {
        self.clear_window
    }
}

/// Notifications queued for the presentation layer and notes sink.
/// Drained with `Session::drain_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RowAdded(RowId),
    RowsRetracted(Vec<RowId>),
    NotesAppended(String),
    WorkflowLoaded { name: String, depth: usize },
    WorkflowResumed { name: String },
    WorkflowEnded { name: String },
    LoadSkipped { name: String, reason: String },
    /// `system.endinteraction` wants the user to confirm.
    ConfirmationRequested,
    /// The interaction ended; the consumer should leave the workflow view.
    NavigateAway,
}
