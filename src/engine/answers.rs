use super::row::{self, RowId};
use super::session::{PendingStep, Session, WorkflowContext};
use super::state::{EngineState, SessionEvent};
use crate::error::InputError;
use crate::formula::compare::{parse_date, parse_number};
use crate::formula::evaluate;
use crate::workflow::{Answer, CollectFormat, Step, StepKind};
use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

impl Session {
    /// The answers of a Question row that are currently offered.
    pub fn available_answers(&self, row: RowId) -> Result<Vec<&Answer>, InputError> {
        let index = self.row_index(row)?;
        let step = &self.rows[index].step;
        if !matches!(step.kind, StepKind::Question { .. }) {
            return Err(InputError::WrongStepKind {
                row,
                expected: "Question",
                found: step.kind.label(),
            });
        }
        Ok(step
            .answers()
            .iter()
            .filter(|answer| self.is_offered(answer))
            .collect())
    }

    fn is_offered(&self, answer: &Answer) -> bool {
        answer
            .condition
            .as_deref()
            .is_none_or(|formula| evaluate(formula, &self.variables).is_true())
    }

    /// Selects `answer_guid` on a Question row and resumes sequencing.
    ///
    /// Choosing a different answer than before retracts every row the
    /// previous answer produced, directly or through nested answers, before
    /// the new answer's sub-steps are spliced in. Re-selecting the current
    /// answer changes nothing.
    pub fn answer_question(
        &mut self,
        row: RowId,
        answer_guid: &str,
    ) -> Result<EngineState, InputError> {
        self.ensure_accepting_input()?;
        let index = self.row_index(row)?;
        let step = Arc::clone(&self.rows[index].step);
        if !matches!(step.kind, StepKind::Question { .. }) {
            return Err(InputError::WrongStepKind {
                row,
                expected: "Question",
                found: step.kind.label(),
            });
        }
        let answer = step
            .find_answer(answer_guid)
            .filter(|answer| self.is_offered(answer))
            .ok_or_else(|| InputError::UnknownAnswer {
                row,
                answer: answer_guid.to_string(),
            })?;

        let previous = self.rows[index].selected_answer.clone();
        if previous.as_deref() == Some(answer.guid.as_str()) {
            debug!(row = %row, answer = %answer.guid, "Answer unchanged");
            return Ok(self.state.clone());
        }
        let retracted = previous.map(|previous| self.retract_branch(index, &previous));

        let question = &mut self.rows[index];
        question.answered = true;
        question.selected_answer = Some(answer.guid.clone());
        let workflow_name = question.workflow_name.clone();
        info!(row = %row, step = %step.guid, answer = %answer.guid, "Question answered");

        self.record_answer(&step, answer);

        if let Some(execute) = &answer.execute {
            if self.run_commands(execute) {
                return Ok(self.advance());
            }
        }

        if let Some(branch) = &retracted {
            self.unwind_into(branch);
        }
        if !answer.sub_steps.is_empty() {
            self.splice(&answer.guid, &answer.sub_steps, &workflow_name);
        }
        Ok(self.advance())
    }

    /// Offers a value to a Collect row. Rejected input leaves the row waiting.
    pub fn collect_value(&mut self, row: RowId, value: &str) -> Result<EngineState, InputError> {
        self.ensure_accepting_input()?;
        let index = self.row_index(row)?;
        let step = Arc::clone(&self.rows[index].step);
        let StepKind::Collect { format, validation } = &step.kind else {
            return Err(InputError::WrongStepKind {
                row,
                expected: "Collect",
                found: step.kind.label(),
            });
        };

        let value = value.trim();
        if value.is_empty() {
            debug!(row = %row, "Empty value rejected");
            return Err(InputError::EmptyValue(row));
        }
        if !matches_format(*format, value) {
            return Err(InputError::InvalidFormat {
                row,
                value: value.to_string(),
                format: format.to_string(),
            });
        }
        if let Some(pattern) = validation {
            if !pattern.is_match(value) {
                return Err(InputError::ValidationFailed {
                    row,
                    value: value.to_string(),
                    pattern: pattern.as_str().to_string(),
                });
            }
        }

        if let Some(target) = &step.variable {
            self.variables.set(&target.name, value, target.scope);
        }
        let collected = &mut self.rows[index];
        let changed = collected.value.as_deref() != Some(value);
        collected.answered = true;
        collected.value = Some(value.to_string());
        info!(row = %row, step = %step.guid, "Value collected");

        if changed {
            if let Some(notes) = &step.notes {
                self.append_note(notes);
            }
        }
        Ok(self.advance())
    }

    fn ensure_accepting_input(&self) -> Result<(), InputError> {
        if let Some(load) = &self.pending_load {
            return Err(InputError::Suspended(load.workflow_name.clone()));
        }
        if self.rows.is_empty() {
            return Err(InputError::NoActiveWorkflow);
        }
        Ok(())
    }

    /// Writes the selected value to the step's and the answer's variables
    /// and appends the answer's notes.
    fn record_answer(&mut self, step: &Step, answer: &Answer) {
        let value = match &answer.value {
            Some(template) => self.interpolate(template),
            None => answer.text.clone(),
        };
        for target in [&step.variable, &answer.variable].into_iter().flatten() {
            self.variables.set(&target.name, value.as_str(), target.scope);
        }
        if let Some(notes) = &answer.notes {
            self.append_note(notes);
        }
    }

    /// Queues `sub_steps` ahead of whatever is left of the pending list of
    /// `workflow_name`: the running workflow, or a parent suspended on the stack.
    fn splice(&mut self, answer_guid: &str, sub_steps: &[Arc<Step>], workflow_name: &str) {
        if self.current.is_none() {
            // The workflow had already finished; the answer change revives it.
            let revived = self.finished.take().unwrap_or_else(|| WorkflowContext {
                name: workflow_name.to_string(),
                uid: String::new(),
            });
            debug!(workflow = %revived.name, "Resuming finished workflow");
            self.current = Some(revived);
        }

        let queued = sub_steps.iter().map(|step| PendingStep {
            step: Arc::clone(step),
            parent_answer: Some(answer_guid.to_string()),
            workflow: workflow_name.to_string(),
        });
        let running = self
            .current
            .as_ref()
            .is_some_and(|context| context.name.eq_ignore_ascii_case(workflow_name));
        let (pending, cursor) = match self.stack.position_of(workflow_name) {
            Some(frame) if !running => {
                debug!(workflow = workflow_name, frame, "Queueing sub-steps in a suspended parent");
                let frame = &mut self.stack.frames_mut()[frame];
                (&mut frame.pending, &mut frame.cursor)
            }
            _ => (&mut self.pending, &mut self.cursor),
        };

        let rest = pending.split_off((*cursor).min(pending.len()));
        *pending = queued.chain(rest).collect();
        *cursor = 0;
    }

    /// Abandons the sub-workflows that were entered from a retracted branch,
    /// returning to the workflow that loaded the outermost of them.
    fn unwind_into(&mut self, branch: &AHashSet<String>) {
        let Some(frame) = self.stack.entered_from(branch) else {
            return;
        };
        info!(
            from = self.current_workflow().unwrap_or_default(),
            levels = self.stack.depth() - frame,
            "Leaving sub-workflows of a retracted answer"
        );
        while self.stack.depth() > frame {
            self.pop_frame();
        }
    }

    /// Removes the rows and unprocessed steps descending from `previous`,
    /// the answer being replaced on the question at `question`. Returns the
    /// answer GUIDs of the retracted branch.
    fn retract_branch(&mut self, question: usize, previous: &str) -> AHashSet<String> {
        let doomed = row::branch_rows(&self.rows, question, previous);

        let mut branch: AHashSet<String> = AHashSet::new();
        branch.insert(previous.to_string());
        for &index in &doomed {
            branch.extend(
                self.rows[index]
                    .step
                    .answers()
                    .iter()
                    .map(|answer| answer.guid.clone()),
            );
        }

        let retracted: Vec<RowId> = doomed.iter().map(|&index| self.rows[index].id).collect();
        self.rows.retain(|row| !retracted.contains(&row.id));

        let mut dropped = drop_tagged(&mut self.pending, self.cursor, &branch);
        for frame in self.stack.frames_mut() {
            dropped += drop_tagged(&mut frame.pending, frame.cursor, &branch);
        }

        info!(
            answer = previous,
            rows = retracted.len(),
            pending = dropped,
            "Retracted previous answer"
        );
        if !retracted.is_empty() {
            self.events.push(SessionEvent::RowsRetracted(retracted));
        }
        branch
    }
}

/// Drops the unprocessed entries of `pending` spliced in by one of `branch`.
fn drop_tagged(pending: &mut Vec<PendingStep>, cursor: usize, branch: &AHashSet<String>) -> usize {
    let keep = cursor.min(pending.len());
    let tail = pending.split_off(keep);
    let before = tail.len();
    pending.extend(tail.into_iter().filter(|entry| {
        !entry
            .parent_answer
            .as_deref()
            .is_some_and(|guid| branch.contains(guid))
    }));
    before - (pending.len() - keep)
}

fn matches_format(format: CollectFormat, value: &str) -> bool {
    match format {
        CollectFormat::Text => true,
        CollectFormat::Number => parse_number(value).is_some(),
        CollectFormat::Date => parse_date(value).is_some(),
        CollectFormat::Email => EMAIL.is_match(value),
    }
}
