use super::call_stack::CallStack;
use super::notes::NotesBuffer;
use super::row::{self, Row, RowId};
use super::state::{EngineState, PendingLoad, SessionEvent};
use crate::config::EngineConfig;
use crate::error::{InputError, ResolutionError};
use crate::resolver::WorkflowResolver;
use crate::variables::{Scope, VariableStore};
use crate::workflow::{Step, Workflow};
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Identity of the workflow a list of pending steps belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WorkflowContext {
    pub(crate) name: String,
    pub(crate) uid: String,
}

/// A step waiting to be processed, tagged with the answer that spliced it in
/// and the workflow it belongs to.
#[derive(Debug, Clone)]
pub(crate) struct PendingStep {
    pub(crate) step: Arc<Step>,
    pub(crate) parent_answer: Option<String>,
    pub(crate) workflow: String,
}

/// System values seeded when a session starts.
#[derive(Debug, Clone, Default)]
pub struct SystemContext {
    /// Generated when absent.
    pub interaction_id: Option<String>,
    /// Falls back to the configured username.
    pub username: Option<String>,
}

/// One conversation's workflow engine.
///
/// A `Session` is owned by its caller and driven through `&mut self`, so no
/// two entry points can mutate the pending list, cursor or rows at once.
/// Sub-workflow loads are the only suspension point: the sequencer stops in
/// [`EngineState::Suspended`] and the caller resolves the workflow, either
/// with [`Session::drive`] or by handing the result to
/// [`Session::complete_load`].
#[derive(Debug)]
pub struct Session {
    pub(crate) config: EngineConfig,
    pub(crate) variables: VariableStore,
    pub(crate) notes: NotesBuffer,
    pub(crate) current: Option<WorkflowContext>,
    /// The top-level workflow that last ran to completion; answer changes may revive it.
    pub(crate) finished: Option<WorkflowContext>,
    pub(crate) pending: Vec<PendingStep>,
    pub(crate) cursor: usize,
    pub(crate) rows: Vec<Row>,
    pub(crate) stack: CallStack,
    pub(crate) state: EngineState,
    pub(crate) pending_load: Option<PendingLoad>,
    pub(crate) epoch: u64,
    pub(crate) next_row_id: u64,
    pub(crate) events: Vec<SessionEvent>,
    pub(crate) confirmation_pending: bool,
}

pub struct SessionBuilder {
    config: EngineConfig,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn with_interaction_mode(mut self, enabled: bool) -> Self {
        self.config.interaction_mode = enabled;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = Some(path.into());
        self
    }

    pub fn build(self) -> Session {
        let variables = match &self.config.snapshot_path {
            Some(path) => VariableStore::with_snapshot_path(path),
            None => VariableStore::new(),
        };
        Session {
            notes: NotesBuffer::new(self.config.interaction_mode),
            config: self.config,
            variables,
            current: None,
            finished: None,
            pending: Vec::new(),
            cursor: 0,
            rows: Vec::new(),
            stack: CallStack::default(),
            state: EngineState::Idle,
            pending_load: None,
            epoch: 0,
            next_row_id: 1,
            events: Vec::new(),
            confirmation_pending: false,
        }
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Session {
    fn default() -> Self {
        SessionBuilder::new().build()
    }
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn new(config: EngineConfig) -> Self {
        SessionBuilder::new().with_config(config).build()
    }

    // --- Session lifecycle ---

    /// Resets the engine and seeds the System variables for a new session.
    pub fn start_session(&mut self, context: SystemContext) {
        self.reset_execution();
        self.variables.clear_session_scopes();
        self.notes.clear_all();

        let interaction_id = context
            .interaction_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.variables
            .set("interactionid", interaction_id.as_str(), Scope::System);
        if let Some(username) = context.username.or_else(|| self.config.username.clone()) {
            self.variables.set("username", username, Scope::System);
        }
        info!(interaction = %interaction_id, epoch = self.epoch, "Session started");
    }

    /// Ends the session: all engine state returns to empty and Workflow and
    /// Customer variables are cleared. In-flight loads become stale.
    pub fn end_session(&mut self) {
        self.reset_execution();
        self.variables.clear_session_scopes();
        self.notes.clear_all();
        info!(epoch = self.epoch, "Session ended");
    }

    /// Starts `workflow` as the top-level workflow, replacing whatever was running.
    pub fn load_workflow(&mut self, workflow: Workflow) -> EngineState {
        self.reset_execution();
        self.notes.clear_workflow();
        self.variables
            .set("workflowid", workflow.uid.as_str(), Scope::System);
        info!(workflow = %workflow.name, uid = %workflow.uid, "Workflow started");
        self.enter(workflow, None);
        self.advance()
    }

    /// Resolves `id` (a uid or alias), starts it and runs until the engine
    /// blocks on the consumer or finishes.
    pub async fn start_workflow(
        &mut self,
        resolver: &dyn WorkflowResolver,
        id: &str,
    ) -> Result<EngineState, ResolutionError> {
        let workflow = resolver.resolve_by_uid_or_alias(id).await?;
        self.load_workflow(workflow);
        Ok(self.drive(resolver).await)
    }

    /// Resolves pending sub-workflow loads until the engine blocks or goes idle.
    pub async fn drive(&mut self, resolver: &dyn WorkflowResolver) -> EngineState {
        while let Some(ticket) = self.pending_load.clone() {
            let result = resolver.resolve_by_name(ticket.workflow_name()).await;
            self.complete_load(ticket, result);
        }
        self.state.clone()
    }

    pub(crate) fn reset_execution(&mut self) {
        self.epoch += 1;
        self.current = None;
        self.finished = None;
        self.pending.clear();
        self.cursor = 0;
        self.rows.clear();
        self.stack.clear();
        self.state = EngineState::Idle;
        self.pending_load = None;
        self.confirmation_pending = false;
    }

    /// Switches execution to `workflow`'s steps, tagging them with the answer
    /// that led here so an answer change retracts them too.
    pub(crate) fn enter(&mut self, workflow: Workflow, parent_answer: Option<String>) {
        self.pending = workflow
            .steps
            .iter()
            .map(|step| PendingStep {
                step: Arc::clone(step),
                parent_answer: parent_answer.clone(),
                workflow: workflow.name.clone(),
            })
            .collect();
        self.cursor = 0;
        self.current = Some(WorkflowContext {
            name: workflow.name.clone(),
            uid: workflow.uid,
        });
        self.finished = None;
        self.events.push(SessionEvent::WorkflowLoaded {
            name: workflow.name,
            depth: self.stack.depth(),
        });
    }

    pub(crate) fn next_row_id(&mut self) -> RowId {
        let id = RowId(self.next_row_id);
        self.next_row_id += 1;
        id
    }

    pub(crate) fn row_index(&self, id: RowId) -> Result<usize, InputError> {
        self.rows
            .iter()
            .position(|row| row.id == id && row.visible)
            .ok_or(InputError::UnknownRow(id))
    }

    // --- Accessors ---

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every row, including rows hidden behind a `ClearWindow` sub-workflow.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| row.visible)
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Rows whose answers led to `id`, nearest first.
    pub fn ancestry(&self, id: RowId) -> Vec<RowId> {
        match self.rows.iter().position(|row| row.id == id) {
            Some(index) => row::ancestors(&self.rows, index)
                .into_iter()
                .map(|i| self.rows[i].id)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableStore {
        &mut self.variables
    }

    pub fn notes(&self) -> &NotesBuffer {
        &self.notes
    }

    /// Name of the workflow whose steps are being processed.
    pub fn current_workflow(&self) -> Option<&str> {
        self.current.as_ref().map(|context| context.name.as_str())
    }

    /// Current sub-workflow nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn pending_load(&self) -> Option<&PendingLoad> {
        self.pending_load.as_ref()
    }

    pub fn is_confirmation_pending(&self) -> bool {
        self.confirmation_pending
    }

    /// Takes every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    pub(crate) fn interpolate(&self, template: &str) -> String {
        self.variables.interpolate(template)
    }

    pub(crate) fn append_note(&mut self, template: &str) {
        let note = self.interpolate(template);
        if note.trim().is_empty() {
            return;
        }
        self.notes.append(note.clone());
        self.events.push(SessionEvent::NotesAppended(note));
    }
}
