use super::call_stack::ParentFrame;
use super::row::{Row, RowId};
use super::session::{PendingStep, Session};
use super::state::{EngineState, PendingLoad, SessionEvent};
use crate::error::ResolutionError;
use crate::formula::evaluate;
use crate::workflow::{Assignment, Step, StepKind, Workflow};
use std::mem;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the sequencer does after processing one pending step.
enum Flow {
    Continue,
    Suspend,
}

impl Session {
    /// Pulls pending steps until a row blocks, a sub-workflow load is
    /// requested, or the workflow is exhausted.
    ///
    /// The blocking check runs before every pull, so an unanswered Question
    /// or Collect row anywhere in the visible history halts sequencing.
    pub(crate) fn advance(&mut self) -> EngineState {
        if self.pending_load.is_some() {
            return self.state.clone();
        }

        loop {
            if let Some(row) = self.rows.iter().find(|row| row.is_waiting()) {
                self.state = EngineState::Blocked { row: row.id };
                break;
            }

            if self.cursor >= self.pending.len() {
                if self.stack.is_empty() {
                    self.finish();
                    break;
                }
                self.pop_frame();
                continue;
            }

            self.state = EngineState::Advancing;
            let entry = self.pending[self.cursor].clone();
            self.cursor += 1;
            if let Flow::Suspend = self.process(entry) {
                break;
            }
        }

        self.state.clone()
    }

    fn process(&mut self, entry: PendingStep) -> Flow {
        let PendingStep {
            step,
            parent_answer,
            workflow,
        } = entry;

        let duplicate = self.rows.iter().any(|row| {
            row.step.guid == step.guid && row.workflow_name.eq_ignore_ascii_case(&workflow)
        });
        if duplicate {
            debug!(step = %step.guid, workflow = %workflow, "Step already has a row, skipping");
            return Flow::Continue;
        }

        if let Some(condition) = &step.condition {
            let outcome = evaluate(condition, &self.variables);
            if !outcome.is_true() {
                debug!(step = %step.guid, condition = %condition, %outcome, "Step condition not met, skipping");
                return Flow::Continue;
            }
        }

        match &step.kind {
            StepKind::VariableAssignment { assignments } => {
                self.apply_assignments(&step.guid, assignments);
                Flow::Continue
            }
            StepKind::LoadWorkflow {
                workflow_name,
                clear_window,
            } => self.request_load(&step.guid, workflow_name, *clear_window, parent_answer),
            _ => {
                self.materialize(Arc::clone(&step), &workflow, parent_answer);
                Flow::Continue
            }
        }
    }

    fn apply_assignments(&mut self, step_guid: &str, assignments: &[Assignment]) {
        for assignment in assignments {
            if let Some(condition) = &assignment.condition {
                if !evaluate(condition, &self.variables).is_true() {
                    debug!(step = step_guid, variable = %assignment.target.name, "Assignment condition not met");
                    continue;
                }
            }
            let value = self.interpolate(&assignment.value);
            debug!(
                step = step_guid,
                variable = %assignment.target.name,
                scope = %assignment.target.scope,
                "Assigning variable"
            );
            self.variables
                .set(&assignment.target.name, value, assignment.target.scope);
        }
    }

    fn materialize(&mut self, step: Arc<Step>, workflow: &str, parent_answer: Option<String>) {
        let id = self.next_row_id();
        debug!(row = %id, step = %step.guid, kind = %step.kind, workflow, "Materialized row");
        let note = match step.kind {
            StepKind::NotesBlock => Some(step.notes.clone().unwrap_or_else(|| step.prompt.clone())),
            _ => None,
        };
        self.rows.push(Row::new(id, step, workflow, parent_answer));
        self.events.push(SessionEvent::RowAdded(id));
        if let Some(template) = note {
            self.append_note(&template);
        }
    }

    fn request_load(
        &mut self,
        step_guid: &str,
        name: &str,
        clear_window: bool,
        parent_answer: Option<String>,
    ) -> Flow {
        if let Err(error) = self.check_load(name) {
            warn!(step = step_guid, workflow = name, error = %error, "Skipping LoadWorkflow");
            self.events.push(SessionEvent::LoadSkipped {
                name: name.to_string(),
                reason: error.to_string(),
            });
            return Flow::Continue;
        }

        debug!(step = step_guid, workflow = name, clear_window, "Waiting for sub-workflow");
        self.pending_load = Some(PendingLoad {
            epoch: self.epoch,
            step_guid: step_guid.to_string(),
            workflow_name: name.to_string(),
            clear_window,
            parent_answer,
        });
        self.state = EngineState::Suspended {
            workflow: name.to_string(),
        };
        Flow::Suspend
    }

    fn check_load(&self, name: &str) -> Result<(), ResolutionError> {
        let depth = self.stack.depth();
        let running = self
            .current
            .as_ref()
            .is_some_and(|context| context.name.eq_ignore_ascii_case(name));
        if running || self.stack.contains_workflow(name) {
            return Err(ResolutionError::Recursive {
                name: name.to_string(),
                depth,
            });
        }
        if depth >= self.config.max_depth {
            return Err(ResolutionError::DepthExceeded {
                name: name.to_string(),
                max_depth: self.config.max_depth,
            });
        }
        Ok(())
    }

    /// Hands the resolution of a [`PendingLoad`] back to the sequencer and
    /// resumes it.
    ///
    /// Tickets issued before the session was ended or restarted, or that no
    /// longer match the outstanding load, are discarded without effect. A
    /// failed resolution skips the LoadWorkflow step.
    pub fn complete_load(
        &mut self,
        ticket: PendingLoad,
        result: Result<Workflow, ResolutionError>,
    ) -> EngineState {
        if ticket.epoch != self.epoch || self.pending_load.as_ref() != Some(&ticket) {
            debug!(
                workflow = %ticket.workflow_name,
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "Discarding stale workflow load"
            );
            return self.state.clone();
        }

        self.pending_load = None;
        self.state = EngineState::Advancing;
        match result {
            Ok(workflow) => self.enter_subworkflow(workflow, ticket),
            Err(error) => {
                warn!(step = %ticket.step_guid, workflow = %ticket.workflow_name, error = %error, "Sub-workflow could not be resolved, skipping");
                self.events.push(SessionEvent::LoadSkipped {
                    name: ticket.workflow_name,
                    reason: error.to_string(),
                });
            }
        }
        self.advance()
    }

    fn enter_subworkflow(&mut self, workflow: Workflow, ticket: PendingLoad) {
        let visible: Vec<RowId> = self.visible_rows().map(|row| row.id).collect();
        let (saved_rows, hidden_rows) = if ticket.clear_window {
            for row in &mut self.rows {
                row.visible = false;
            }
            (Vec::new(), visible)
        } else {
            (visible, Vec::new())
        };

        if let Some(parent) = self.current.take() {
            self.stack.push(ParentFrame {
                workflow: parent,
                pending: mem::take(&mut self.pending),
                cursor: self.cursor,
                saved_rows,
                hidden_rows,
                load_answer: ticket.parent_answer.clone(),
            });
        }

        info!(
            workflow = %workflow.name,
            depth = self.stack.depth(),
            clear_window = ticket.clear_window,
            "Entering sub-workflow"
        );
        self.enter(workflow, ticket.parent_answer);
    }

    /// Returns to the parent workflow, merging the sub-workflow's rows into
    /// the parent's history: saved rows first, then the sub-workflow's. After
    /// a `ClearWindow` load the sub-workflow's rows replace the hidden ones.
    pub(crate) fn pop_frame(&mut self) -> bool {
        let Some(frame) = self.stack.pop() else {
            return false;
        };
        let ParentFrame {
            workflow,
            pending,
            cursor,
            saved_rows,
            hidden_rows,
            ..
        } = frame;

        if saved_rows.is_empty() {
            // Rows this frame hid are gone for good unless a frame further
            // down saved them.
            let stack = &self.stack;
            self.rows
                .retain(|row| !hidden_rows.contains(&row.id) || stack.keeps_row(row.id));
        } else {
            let (mut merged, rest): (Vec<Row>, Vec<Row>) = mem::take(&mut self.rows)
                .into_iter()
                .partition(|row| saved_rows.contains(&row.id));
            for row in &mut merged {
                row.visible = true;
            }
            merged.extend(rest);
            self.rows = merged;
        }

        let finished = self.current.take().map(|context| context.name);
        info!(
            workflow = %workflow.name,
            from = finished.as_deref().unwrap_or_default(),
            depth = self.stack.depth(),
            "Resuming parent workflow"
        );
        self.pending = pending;
        self.cursor = cursor;
        self.events.push(SessionEvent::WorkflowResumed {
            name: workflow.name.clone(),
        });
        self.current = Some(workflow);
        true
    }

    /// The top-level workflow ran out of steps.
    fn finish(&mut self) {
        self.state = EngineState::Idle;
        let Some(context) = self.current.take() else {
            return;
        };
        info!(workflow = %context.name, rows = self.rows.len(), "Workflow finished");
        if let Err(error) = self.variables.persist() {
            warn!(error = %error, "Failed to persist variable snapshot");
        }
        self.events.push(SessionEvent::WorkflowEnded {
            name: context.name.clone(),
        });
        self.finished = Some(context);
    }
}
