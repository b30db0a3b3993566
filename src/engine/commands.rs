use super::session::Session;
use super::state::{EngineState, SessionEvent};
use std::fmt;
use tracing::{debug, info, warn};

/// A directive carried in an Answer's `Execute` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `system.endworkflow`
    EndWorkflow,
    /// `system.endinteraction`
    EndInteraction,
    Unknown(String),
}

impl Command {
    pub fn parse(text: &str) -> Command {
        let text = text.trim();
        match text.to_ascii_lowercase().as_str() {
            "system.endworkflow" => Command::EndWorkflow,
            "system.endinteraction" => Command::EndInteraction,
            _ => Command::Unknown(text.to_string()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::EndWorkflow => write!(f, "system.endworkflow"),
            Command::EndInteraction => write!(f, "system.endinteraction"),
            Command::Unknown(text) => write!(f, "{}", text),
        }
    }
}

/// Splits an `Execute` string into commands: on `;` when present, otherwise on `,`.
pub fn parse_commands(execute: &str) -> Vec<Command> {
    let separator = if execute.contains(';') { ';' } else { ',' };
    execute
        .split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Command::parse)
        .collect()
}

impl Session {
    /// Runs the commands of an answer in order. Returns true when one of
    /// them ended the running workflow.
    pub(crate) fn run_commands(&mut self, execute: &str) -> bool {
        let mut ended = false;
        for command in parse_commands(execute) {
            debug!(command = %command, "Running command");
            match command {
                Command::EndWorkflow => {
                    self.end_workflow();
                    ended = true;
                }
                Command::EndInteraction => self.request_end_interaction(),
                Command::Unknown(name) => warn!(command = %name, "Unknown command, ignoring"),
            }
        }
        ended
    }

    /// Inside a sub-workflow, returns to the parent. At the top level the
    /// workflow is terminated and, outside interaction mode, Workflow and
    /// Customer variables are cleared.
    fn end_workflow(&mut self) {
        if self.pop_frame() {
            return;
        }
        let name = self.current.as_ref().map(|context| context.name.clone());
        self.reset_execution();
        if !self.config.interaction_mode {
            self.variables.clear_session_scopes();
        }
        info!(workflow = name.as_deref().unwrap_or_default(), "Workflow ended by command");
        if let Some(name) = name {
            self.events.push(SessionEvent::WorkflowEnded { name });
        }
    }

    fn request_end_interaction(&mut self) {
        if self.confirmation_pending {
            return;
        }
        self.confirmation_pending = true;
        self.events.push(SessionEvent::ConfirmationRequested);
    }

    /// Resolves a pending `system.endinteraction`. Confirming ends the
    /// session, clears every variable and asks the consumer to navigate
    /// away; declining discards the request.
    pub fn confirm_end_interaction(&mut self, confirmed: bool) -> EngineState {
        if !self.confirmation_pending {
            debug!("No end-interaction request to confirm");
            return self.state.clone();
        }
        self.confirmation_pending = false;
        if confirmed {
            self.end_session();
            self.variables.clear(None);
            info!("Interaction ended");
            self.events.push(SessionEvent::NavigateAway);
        } else {
            debug!("End-interaction request declined");
        }
        self.state.clone()
    }
}
