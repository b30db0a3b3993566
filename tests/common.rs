//! Common test utilities for building workflows and driving sessions.
use tejun::prelude::*;

/// `Q1` with a "Yes" answer that spawns `U1`, and a "No" answer with no sub-steps.
#[allow(dead_code)]
pub fn yes_no_workflow() -> Workflow {
    Workflow::new(
        "YesNo",
        "yes-no",
        vec![Step::question(
            "Q1",
            "Is the device powered on?",
            vec![
                Answer::new("yes", "Yes")
                    .with_sub_steps(vec![Step::instruction("U1", "Check the status light")]),
                Answer::new("no", "No"),
            ],
        )],
    )
}

/// Two levels of nested answers followed by a closing instruction:
///
/// ```text
/// Q1 ── a1 ── Q2 ── b1 ── U2
///  │           └─── b2
///  └─── a2 ── U3
/// DONE
/// ```
#[allow(dead_code)]
pub fn nested_workflow() -> Workflow {
    Workflow::new(
        "Nested",
        "nested",
        vec![
            Step::instruction("INTRO", "Welcome"),
            Step::question(
                "Q1",
                "Which area?",
                vec![
                    Answer::new("a1", "Billing").with_sub_steps(vec![Step::question(
                        "Q2",
                        "Which invoice?",
                        vec![
                            Answer::new("b1", "Latest").with_sub_steps(vec![Step::instruction(
                                "U2",
                                "Open the latest invoice",
                            )]),
                            Answer::new("b2", "Older"),
                        ],
                    )]),
                    Answer::new("a2", "Technical")
                        .with_sub_steps(vec![Step::instruction("U3", "Open a ticket")]),
                ],
            ),
            Step::instruction("DONE", "Wrap up"),
        ],
    )
}

/// `P1`, a LoadWorkflow of `Child`, then `P2`.
#[allow(dead_code)]
pub fn parent_workflow(clear_window: bool) -> Workflow {
    Workflow::new(
        "Parent",
        "parent",
        vec![
            Step::instruction("P1", "Parent start"),
            Step::load_workflow("LOAD", "Child", clear_window),
            Step::instruction("P2", "Parent end"),
        ],
    )
    .with_aliases(vec!["main".to_string()])
}

/// An instruction and a Collect of `account`.
#[allow(dead_code)]
pub fn child_workflow() -> Workflow {
    Workflow::new(
        "Child",
        "child",
        vec![
            Step::instruction("C1", "Child start"),
            Step::collect("C2", "Account number?", "account"),
        ],
    )
}

#[allow(dead_code)]
pub fn catalog() -> CatalogResolver {
    CatalogResolver::with_workflows([parent_workflow(false), child_workflow()])
}

/// Step GUIDs of the visible rows, in order.
#[allow(dead_code)]
pub fn visible_guids(session: &Session) -> Vec<String> {
    session
        .visible_rows()
        .map(|row| row.step.guid.clone())
        .collect()
}

/// The row of the step with `guid`, panicking when it was not materialized.
#[allow(dead_code)]
pub fn row_of(session: &Session, guid: &str) -> RowId {
    session
        .visible_rows()
        .find(|row| row.step.guid == guid)
        .map(|row| row.id)
        .unwrap_or_else(|| panic!("no visible row for step '{}'", guid))
}

/// The row the session is blocked on.
#[allow(dead_code)]
pub fn blocked(state: &EngineState) -> RowId {
    state
        .blocked_row()
        .unwrap_or_else(|| panic!("expected a blocked session, got {}", state))
}

/// A support workflow in the JSON document format.
#[allow(dead_code)]
pub const SUPPORT_WORKFLOW_JSON: &str = r#"
{
    "Name": "Support",
    "UID": "support-001",
    "Aliases": ["help"],
    "Steps": [
        {
            "GUID": "greet",
            "StepType": "UserInstruction",
            "Prompt": "Hello ~username~"
        },
        {
            "GUID": "set-tier",
            "StepType": "VariableAssignment",
            "VariableName": "tier",
            "VariableValue": "gold",
            "Scope": "Customer"
        },
        {
            "GUID": "hologram",
            "StepType": "Hologram",
            "Prompt": "Never shown"
        },
        {
            "GUID": "issue",
            "StepType": "question",
            "Prompt": "What is the issue?",
            "VariableName": "issue",
            "Answers": [
                {
                    "GUID": "issue-login",
                    "Prompt": "Cannot log in",
                    "Notes": "Customer cannot log in",
                    "SubSteps": [
                        {
                            "GUID": "email",
                            "StepType": "Collect",
                            "Prompt": "Account e-mail?",
                            "VariableName": "email",
                            "Format": "email",
                            "Notes": "E-mail: ~email~"
                        }
                    ]
                },
                {
                    "GUID": "issue-vip",
                    "Text": "Priority line",
                    "Evaluate": "tier.equals(platinum)"
                },
                {
                    "GUID": "issue-done",
                    "Prompt": "Nothing, thanks",
                    "Execute": "system.endworkflow"
                }
            ]
        },
        {
            "GUID": "bye",
            "StepType": "NotesBlock",
            "Notes": "Closed ~issue~"
        }
    ]
}
"#;
