use crate::workflow::Step;
use ahash::{AHashMap, AHashSet};
use std::fmt;
use std::sync::Arc;

/// Engine-generated row identifier, distinct from the step's GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

/// A materialized, renderable instance of a step within one execution.
#[derive(Debug, Clone)]
pub struct Row {
    pub id: RowId,
    pub step: Arc<Step>,
    pub workflow_name: String,
    /// GUID of the answer whose sub-steps produced this row.
    pub parent_answer: Option<String>,
    pub answered: bool,
    pub selected_answer: Option<String>,
    /// The accepted value of a Collect row.
    pub value: Option<String>,
    /// False while the row is hidden behind a `ClearWindow` sub-workflow.
    pub visible: bool,
}

impl Row {
    pub(crate) fn new(
        id: RowId,
        step: Arc<Step>,
        workflow_name: &str,
        parent_answer: Option<String>,
    ) -> Self {
        Self {
            id,
            step,
            workflow_name: workflow_name.to_string(),
            parent_answer,
            answered: false,
            selected_answer: None,
            value: None,
            visible: true,
        }
    }

    /// An unanswered Question or Collect row.
    pub fn is_waiting(&self) -> bool {
        self.visible && !self.answered && self.step.kind.is_blocking()
    }
}

/// Maps every answer GUID offered by a row to that row's position.
fn answer_owners(rows: &[Row]) -> AHashMap<&str, usize> {
    rows.iter()
        .enumerate()
        .flat_map(|(index, row)| {
            row.step
                .answers()
                .iter()
                .map(move |answer| (answer.guid.as_str(), index))
        })
        .collect()
}

/// Walks `parent_answer` links from the row at `index` back to the root,
/// returning ancestor row positions nearest-first.
pub fn ancestors(rows: &[Row], index: usize) -> Vec<usize> {
    let owners = answer_owners(rows);
    let mut chain = Vec::new();
    let mut seen = AHashSet::new();
    let mut current = index;
    while let Some(parent) = rows[current]
        .parent_answer
        .as_deref()
        .and_then(|guid| owners.get(guid).copied())
    {
        if !seen.insert(parent) {
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}

/// Positions of the rows after `question` that descend from `answer_guid`,
/// directly or through intermediate rows' own answers.
pub fn branch_rows(rows: &[Row], question: usize, answer_guid: &str) -> Vec<usize> {
    let mut branch: AHashSet<&str> = AHashSet::new();
    branch.insert(answer_guid);
    let mut found = Vec::new();
    for (index, row) in rows.iter().enumerate().skip(question + 1) {
        let in_branch = row
            .parent_answer
            .as_deref()
            .is_some_and(|guid| branch.contains(guid));
        if in_branch {
            found.push(index);
            branch.extend(row.step.answers().iter().map(|answer| answer.guid.as_str()));
        }
    }
    found
}
