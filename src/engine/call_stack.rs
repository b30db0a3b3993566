use super::RowId;
use super::session::{PendingStep, WorkflowContext};
use ahash::AHashSet;

/// The saved execution context of a parent workflow.
#[derive(Debug, Clone)]
pub struct ParentFrame {
    pub(crate) workflow: WorkflowContext,
    pub(crate) pending: Vec<PendingStep>,
    /// Cursor into `pending`, already past the LoadWorkflow step.
    pub(crate) cursor: usize,
    /// Rows visible when the sub-workflow started. Empty for `ClearWindow` loads.
    pub(crate) saved_rows: Vec<RowId>,
    /// Rows a `ClearWindow` load hid. They stay in the arena until the frame
    /// is popped, and only frames further down may bring them back.
    pub(crate) hidden_rows: Vec<RowId>,
    /// Tag of the LoadWorkflow step that left this workflow.
    pub(crate) load_answer: Option<String>,
}

impl ParentFrame {
    pub fn workflow_name(&self) -> &str {
        &self.workflow.name
    }

    pub fn saved_rows(&self) -> &[RowId] {
        &self.saved_rows
    }

    pub fn hidden_rows(&self) -> &[RowId] {
        &self.hidden_rows
    }
}

/// LIFO of parent frames; its depth is the current sub-workflow nesting depth.
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<ParentFrame>,
}

impl CallStack {
    pub fn push(&mut self, frame: ParentFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<ParentFrame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// True if `name` is already running somewhere below the top of the stack.
    pub fn contains_workflow(&self, name: &str) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.workflow.name.eq_ignore_ascii_case(name))
    }

    pub fn frames(&self) -> &[ParentFrame] {
        &self.frames
    }

    pub(crate) fn frames_mut(&mut self) -> &mut [ParentFrame] {
        &mut self.frames
    }

    /// Index of the frame holding `name`, if it is suspended on the stack.
    pub(crate) fn position_of(&self, name: &str) -> Option<usize> {
        self.frames
            .iter()
            .position(|frame| frame.workflow.name.eq_ignore_ascii_case(name))
    }

    /// The lowest frame that left its workflow through a LoadWorkflow step
    /// tagged with one of `answers`.
    pub(crate) fn entered_from(&self, answers: &AHashSet<String>) -> Option<usize> {
        self.frames.iter().position(|frame| {
            frame
                .load_answer
                .as_deref()
                .is_some_and(|guid| answers.contains(guid))
        })
    }

    /// True if some frame will restore `row` when it is popped.
    pub(crate) fn keeps_row(&self, row: RowId) -> bool {
        self.frames.iter().any(|frame| frame.saved_rows.contains(&row))
    }
}
