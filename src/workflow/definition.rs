use crate::variables::Scope;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// A loaded workflow. Immutable once built; rows and pending lists hold
/// shared references to its steps.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    pub name: String,
    pub uid: String,
    /// Additional identifiers the resolution service accepts for this workflow.
    pub aliases: Vec<String>,
    pub steps: Vec<Arc<Step>>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, uid: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
            aliases: Vec::new(),
            steps: steps.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }
}

/// A single step definition. Steps are never mutated at runtime; `guid` is
/// stable and used for duplicate-row detection.
#[derive(Debug, Clone)]
pub struct Step {
    pub guid: String,
    pub prompt: String,
    pub secondary_text: Option<String>,
    /// Variable written by Question and Collect steps.
    pub variable: Option<VariableTarget>,
    /// Note template appended when a NotesBlock is shown or a Collect value is accepted.
    pub notes: Option<String>,
    /// Formula gating the step; the step is skipped unless it evaluates to `true`.
    pub condition: Option<String>,
    pub kind: StepKind,
}

/// The closed set of step types with their per-type payload.
#[derive(Debug, Clone)]
pub enum StepKind {
    UserInstruction,
    Question {
        answers: Vec<Answer>,
    },
    Collect {
        format: CollectFormat,
        validation: Option<Regex>,
    },
    NotesBlock,
    VariableAssignment {
        assignments: Vec<Assignment>,
    },
    LoadWorkflow {
        workflow_name: String,
        clear_window: bool,
    },
}

impl StepKind {
    /// Question and Collect steps halt sequencing until answered.
    pub fn is_blocking(&self) -> bool {
        matches!(self, StepKind::Question { .. } | StepKind::Collect { .. })
    }

    /// Whether the step materializes into a row.
    pub fn produces_row(&self) -> bool {
        !matches!(
            self,
            StepKind::VariableAssignment { .. } | StepKind::LoadWorkflow { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepKind::UserInstruction => "UserInstruction",
            StepKind::Question { .. } => "Question",
            StepKind::Collect { .. } => "Collect",
            StepKind::NotesBlock => "NotesBlock",
            StepKind::VariableAssignment { .. } => "VariableAssignment",
            StepKind::LoadWorkflow { .. } => "LoadWorkflow",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Accepted input shapes for a Collect step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectFormat {
    #[default]
    Text,
    Number,
    Date,
    Email,
}

impl CollectFormat {
    pub fn parse(name: &str) -> Option<CollectFormat> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "string" => Some(CollectFormat::Text),
            "number" | "numeric" | "integer" => Some(CollectFormat::Number),
            "date" => Some(CollectFormat::Date),
            "email" => Some(CollectFormat::Email),
            _ => None,
        }
    }
}

impl fmt::Display for CollectFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectFormat::Text => write!(f, "text"),
            CollectFormat::Number => write!(f, "number"),
            CollectFormat::Date => write!(f, "date"),
            CollectFormat::Email => write!(f, "email"),
        }
    }
}

/// A variable name together with the scope it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableTarget {
    pub name: String,
    pub scope: Scope,
}

impl VariableTarget {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }

    pub fn workflow(name: impl Into<String>) -> Self {
        Self::new(name, Scope::Workflow)
    }
}

/// One write performed by a VariableAssignment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub target: VariableTarget,
    /// Value template; interpolated before it is stored.
    pub value: String,
    pub condition: Option<String>,
}

/// A selectable answer of a Question step.
#[derive(Debug, Clone)]
pub struct Answer {
    pub guid: String,
    pub text: String,
    pub variable: Option<VariableTarget>,
    pub value: Option<String>,
    /// Formula deciding whether the answer is offered.
    pub condition: Option<String>,
    /// Command directives, e.g. `system.endworkflow`.
    pub execute: Option<String>,
    pub notes: Option<String>,
    pub sub_steps: Vec<Arc<Step>>,
}

impl Answer {
    pub fn new(guid: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            text: text.into(),
            variable: None,
            value: None,
            condition: None,
            execute: None,
            notes: None,
            sub_steps: Vec::new(),
        }
    }

    pub fn with_sub_steps(mut self, steps: Vec<Step>) -> Self {
        self.sub_steps = steps.into_iter().map(Arc::new).collect();
        self
    }

    pub fn with_variable(mut self, target: VariableTarget, value: Option<&str>) -> Self {
        self.variable = Some(target);
        self.value = value.map(str::to_string);
        self
    }

    pub fn with_condition(mut self, formula: impl Into<String>) -> Self {
        self.condition = Some(formula.into());
        self
    }

    pub fn with_execute(mut self, commands: impl Into<String>) -> Self {
        self.execute = Some(commands.into());
        self
    }

    pub fn with_notes(mut self, template: impl Into<String>) -> Self {
        self.notes = Some(template.into());
        self
    }
}

impl Step {
    fn bare(guid: impl Into<String>, prompt: impl Into<String>, kind: StepKind) -> Self {
        Self {
            guid: guid.into(),
            prompt: prompt.into(),
            secondary_text: None,
            variable: None,
            notes: None,
            condition: None,
            kind,
        }
    }

    pub fn instruction(guid: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::bare(guid, prompt, StepKind::UserInstruction)
    }

    pub fn question(
        guid: impl Into<String>,
        prompt: impl Into<String>,
        answers: Vec<Answer>,
    ) -> Self {
        Self::bare(guid, prompt, StepKind::Question { answers })
    }

    pub fn collect(
        guid: impl Into<String>,
        prompt: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        let mut step = Self::bare(
            guid,
            prompt,
            StepKind::Collect {
                format: CollectFormat::Text,
                validation: None,
            },
        );
        step.variable = Some(VariableTarget::workflow(variable));
        step
    }

    pub fn notes_block(guid: impl Into<String>, template: impl Into<String>) -> Self {
        let template = template.into();
        let mut step = Self::bare(guid, template.clone(), StepKind::NotesBlock);
        step.notes = Some(template);
        step
    }

    pub fn assignment(guid: impl Into<String>, assignments: Vec<Assignment>) -> Self {
        Self::bare(guid, "", StepKind::VariableAssignment { assignments })
    }

    pub fn load_workflow(
        guid: impl Into<String>,
        workflow_name: impl Into<String>,
        clear_window: bool,
    ) -> Self {
        Self::bare(
            guid,
            "",
            StepKind::LoadWorkflow {
                workflow_name: workflow_name.into(),
                clear_window,
            },
        )
    }

    pub fn with_condition(mut self, formula: impl Into<String>) -> Self {
        self.condition = Some(formula.into());
        self
    }

    pub fn with_variable(mut self, target: VariableTarget) -> Self {
        self.variable = Some(target);
        self
    }

    pub fn with_notes(mut self, template: impl Into<String>) -> Self {
        self.notes = Some(template.into());
        self
    }

    pub fn with_secondary_text(mut self, text: impl Into<String>) -> Self {
        self.secondary_text = Some(text.into());
        self
    }

    /// Replaces the format and validation of a Collect step. Other kinds are returned unchanged.
    pub fn with_format(mut self, format: CollectFormat, validation: Option<Regex>) -> Self {
        if let StepKind::Collect { .. } = self.kind {
            self.kind = StepKind::Collect { format, validation };
        }
        self
    }

    /// The answers of a Question step; empty for every other kind.
    pub fn answers(&self) -> &[Answer] {
        match &self.kind {
            StepKind::Question { answers } => answers,
            _ => &[],
        }
    }

    pub fn find_answer(&self, guid: &str) -> Option<&Answer> {
        self.answers().iter().find(|answer| answer.guid == guid)
    }
}
