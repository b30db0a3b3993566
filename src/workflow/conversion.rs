use super::definition::*;
use super::document::{AnswerDocument, AssignmentDocument, StepDocument, WorkflowDocument};
use crate::error::DefinitionError;
use crate::variables::Scope;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

/// A trait for document models that can be converted into a `Workflow`.
///
/// This is the extension point for workflow sources that do not use the JSON
/// document shape. Conversion is lenient: malformed steps are logged and
/// dropped so externally authored documents degrade instead of failing.
///
/// # Example
///
/// ```rust,no_run
/// use tejun::prelude::*;
/// use tejun::error::DefinitionError;
///
/// struct Checklist { title: String, items: Vec<String> }
///
/// impl IntoWorkflow for Checklist {
///     fn into_workflow(self) -> std::result::Result<Workflow, DefinitionError> {
///         let steps = self
///             .items
///             .into_iter()
///             .enumerate()
///             .map(|(i, item)| Step::instruction(format!("item-{}", i), item))
///             .collect();
///         Ok(Workflow::new(self.title.clone(), self.title, steps))
///     }
/// }
/// ```
pub trait IntoWorkflow {
    /// Consumes the object and converts it into an executable workflow definition.
    fn into_workflow(self) -> Result<Workflow, DefinitionError>;
}

impl IntoWorkflow for WorkflowDocument {
    fn into_workflow(self) -> Result<Workflow, DefinitionError> {
        let uid = self.uid.clone().unwrap_or_default();
        let name = non_empty(self.name).ok_or_else(|| DefinitionError::MissingName(uid.clone()))?;
        let uid = if uid.trim().is_empty() {
            name.clone()
        } else {
            uid
        };
        let steps = convert_steps(&name, self.steps, "");
        Ok(Workflow {
            name,
            uid,
            aliases: self.aliases,
            steps,
        })
    }
}

impl Workflow {
    /// Parses a JSON workflow document and converts it.
    pub fn from_json(json: &str) -> Result<Workflow, DefinitionError> {
        WorkflowDocument::from_json(json)
            .map_err(|e| DefinitionError::JsonParseError(e.to_string()))?
            .into_workflow()
    }
}

fn convert_steps(workflow: &str, documents: Vec<StepDocument>, prefix: &str) -> Vec<Arc<Step>> {
    documents
        .into_iter()
        .enumerate()
        .filter_map(|(i, doc)| {
            let position = if prefix.is_empty() {
                i.to_string()
            } else {
                format!("{}.{}", prefix, i)
            };
            convert_step(workflow, doc, &position).map(Arc::new)
        })
        .collect()
}

fn convert_step(workflow: &str, doc: StepDocument, position: &str) -> Option<Step> {
    let guid = non_empty(doc.guid).unwrap_or_else(|| {
        let synthesized = format!("{}#{}", workflow, position);
        warn!(workflow, step = %synthesized, "Step has no GUID, using its position");
        synthesized
    });

    let Some(step_type) = doc.step_type.as_deref() else {
        warn!(workflow, step = %guid, "Step has no StepType, skipping");
        return None;
    };
    let normalized: String = step_type
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();

    let scope = parse_scope(doc.scope.as_deref(), &guid);
    let variable = non_empty(doc.variable_name.clone()).map(|name| VariableTarget::new(name, scope));

    let kind = match normalized.as_str() {
        "userinstruction" | "instruction" => StepKind::UserInstruction,
        "question" => {
            let answers: Vec<Answer> = doc
                .answers
                .into_iter()
                .enumerate()
                .map(|(i, answer)| convert_answer(workflow, &guid, answer, &format!("{}.{}", position, i)))
                .collect();
            if answers.is_empty() {
                warn!(workflow, step = %guid, "Question has no answers, showing it as an instruction");
                StepKind::UserInstruction
            } else {
                StepKind::Question { answers }
            }
        }
        "collect" => {
            let format = match doc.format.as_deref() {
                None => CollectFormat::Text,
                Some(name) => CollectFormat::parse(name).unwrap_or_else(|| {
                    warn!(workflow, step = %guid, format = name, "Unknown collect format, accepting text");
                    CollectFormat::Text
                }),
            };
            let validation = non_empty(doc.validation).and_then(|pattern| match Regex::new(&pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(workflow, step = %guid, pattern = %pattern, error = %e, "Invalid validation pattern, ignoring it");
                    None
                }
            });
            StepKind::Collect { format, validation }
        }
        "notesblock" | "notes" | "note" => StepKind::NotesBlock,
        "variableassignment" | "assignment" | "setvariable" => {
            let mut assignments: Vec<Assignment> = Vec::new();
            if let Some(target) = variable.clone() {
                assignments.push(Assignment {
                    target,
                    value: doc.variable_value.clone().unwrap_or_default(),
                    condition: None,
                });
            }
            assignments.extend(
                doc.assignments
                    .into_iter()
                    .filter_map(|assignment| convert_assignment(&guid, assignment)),
            );
            if assignments.is_empty() {
                warn!(workflow, step = %guid, "VariableAssignment has nothing to assign, skipping");
                return None;
            }
            StepKind::VariableAssignment { assignments }
        }
        "loadworkflow" | "subworkflow" => {
            let Some(workflow_name) = non_empty(doc.workflow_name) else {
                warn!(workflow, step = %guid, "LoadWorkflow does not name a workflow, skipping");
                return None;
            };
            StepKind::LoadWorkflow {
                workflow_name,
                clear_window: doc.clear_window,
            }
        }
        _ => {
            warn!(workflow, step = %guid, step_type, "Unknown step type, skipping");
            return None;
        }
    };

    let prompt = match doc.prompt {
        Some(prompt) => prompt,
        None => {
            if kind.produces_row() && !matches!(kind, StepKind::NotesBlock) {
                warn!(workflow, step = %guid, "Step has no prompt");
            }
            String::new()
        }
    };

    Some(Step {
        guid,
        prompt,
        secondary_text: doc.secondary_text,
        variable,
        notes: non_empty(doc.notes),
        condition: non_empty(doc.evaluate),
        kind,
    })
}

fn convert_answer(workflow: &str, step_guid: &str, doc: AnswerDocument, position: &str) -> Answer {
    let guid = non_empty(doc.guid).unwrap_or_else(|| {
        let synthesized = format!("{}#{}", workflow, position);
        warn!(workflow, step = step_guid, answer = %synthesized, "Answer has no GUID, using its position");
        synthesized
    });
    let scope = parse_scope(doc.scope.as_deref(), &guid);
    Answer {
        text: doc.prompt.unwrap_or_default(),
        variable: non_empty(doc.variable_name).map(|name| VariableTarget::new(name, scope)),
        value: doc.variable_value,
        condition: non_empty(doc.evaluate),
        execute: non_empty(doc.execute),
        notes: non_empty(doc.notes),
        sub_steps: convert_steps(workflow, doc.sub_steps, position),
        guid,
    }
}

fn convert_assignment(step_guid: &str, doc: AssignmentDocument) -> Option<Assignment> {
    let Some(name) = non_empty(doc.variable_name) else {
        warn!(step = step_guid, "Assignment has no VariableName, skipping");
        return None;
    };
    Some(Assignment {
        target: VariableTarget::new(name, parse_scope(doc.scope.as_deref(), step_guid)),
        value: doc.variable_value.unwrap_or_default(),
        condition: non_empty(doc.evaluate),
    })
}

fn parse_scope(scope: Option<&str>, owner: &str) -> Scope {
    match scope {
        None => Scope::Workflow,
        Some(name) if name.trim().is_empty() => Scope::Workflow,
        Some(name) => Scope::parse(name).unwrap_or_else(|| {
            warn!(owner, scope = name, "Unknown variable scope, using Workflow");
            Scope::Workflow
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
