use serde::{Deserialize, Serialize};

// --- JSON document shapes ---
// Field names follow the existing workflow documents and must not change.

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WorkflowDocument {
    #[serde(rename = "Name", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "UID", alias = "Uid", alias = "uid", default)]
    pub uid: Option<String>,
    #[serde(rename = "Aliases", alias = "aliases", default)]
    pub aliases: Vec<String>,
    #[serde(rename = "Steps", alias = "steps", default)]
    pub steps: Vec<StepDocument>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StepDocument {
    #[serde(rename = "GUID", alias = "Guid", alias = "guid", default)]
    pub guid: Option<String>,
    #[serde(rename = "StepType", alias = "stepType", default)]
    pub step_type: Option<String>,
    #[serde(rename = "Prompt", alias = "prompt", default)]
    pub prompt: Option<String>,
    #[serde(rename = "SecondaryText", alias = "secondaryText", default)]
    pub secondary_text: Option<String>,
    #[serde(rename = "VariableName", alias = "variableName", default)]
    pub variable_name: Option<String>,
    #[serde(rename = "VariableValue", alias = "variableValue", default)]
    pub variable_value: Option<String>,
    #[serde(rename = "Scope", alias = "scope", default)]
    pub scope: Option<String>,
    #[serde(rename = "Format", alias = "format", default)]
    pub format: Option<String>,
    #[serde(rename = "Validation", alias = "validation", default)]
    pub validation: Option<String>,
    #[serde(rename = "Answers", alias = "answers", default)]
    pub answers: Vec<AnswerDocument>,
    #[serde(rename = "Notes", alias = "notes", default)]
    pub notes: Option<String>,
    #[serde(rename = "WorkflowName", alias = "workflowName", default)]
    pub workflow_name: Option<String>,
    #[serde(rename = "ClearWindow", alias = "clearWindow", default)]
    pub clear_window: bool,
    #[serde(rename = "Evaluate", alias = "evaluate", default)]
    pub evaluate: Option<String>,
    #[serde(rename = "Assignments", alias = "assignments", default)]
    pub assignments: Vec<AssignmentDocument>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AnswerDocument {
    #[serde(rename = "GUID", alias = "Guid", alias = "guid", default)]
    pub guid: Option<String>,
    #[serde(rename = "Prompt", alias = "Text", alias = "prompt", alias = "text", default)]
    pub prompt: Option<String>,
    #[serde(rename = "VariableName", alias = "variableName", default)]
    pub variable_name: Option<String>,
    #[serde(rename = "VariableValue", alias = "variableValue", default)]
    pub variable_value: Option<String>,
    #[serde(rename = "Scope", alias = "scope", default)]
    pub scope: Option<String>,
    #[serde(rename = "Evaluate", alias = "evaluate", default)]
    pub evaluate: Option<String>,
    #[serde(rename = "Execute", alias = "execute", default)]
    pub execute: Option<String>,
    #[serde(rename = "Notes", alias = "notes", default)]
    pub notes: Option<String>,
    #[serde(rename = "SubSteps", alias = "subSteps", default)]
    pub sub_steps: Vec<StepDocument>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AssignmentDocument {
    #[serde(rename = "VariableName", alias = "variableName", default)]
    pub variable_name: Option<String>,
    #[serde(rename = "VariableValue", alias = "variableValue", default)]
    pub variable_value: Option<String>,
    #[serde(rename = "Scope", alias = "scope", default)]
    pub scope: Option<String>,
    #[serde(rename = "Evaluate", alias = "evaluate", default)]
    pub evaluate: Option<String>,
}

impl WorkflowDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
