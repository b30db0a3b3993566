//! Command processor tests.
mod common;
use common::*;
use tejun::engine::{Command, parse_commands};
use tejun::prelude::*;
use tokio_test::block_on;

fn ending_workflow(execute: &str) -> Workflow {
    Workflow::new(
        "Ending",
        "ending",
        vec![
            Step::question(
                "Q",
                "Anything else?",
                vec![
                    Answer::new("stop", "No, that's all")
                        .with_execute(execute)
                        .with_sub_steps(vec![Step::instruction("NEVER", "Not shown")]),
                    Answer::new("more", "Yes"),
                ],
            ),
            Step::instruction("LATER", "Later"),
        ],
    )
}

#[cfg(test)]
mod parsing_tests {
    use super::*;

    #[test]
    fn test_separators() {
        assert_eq!(
            parse_commands("System.EndWorkflow , custom.thing"),
            vec![
                Command::EndWorkflow,
                Command::Unknown("custom.thing".to_string())
            ]
        );
        assert_eq!(
            parse_commands("system.endinteraction; a,b ;"),
            vec![Command::EndInteraction, Command::Unknown("a,b".to_string())]
        );
        assert!(parse_commands("  ").is_empty());
        assert_eq!(Command::parse(" SYSTEM.ENDWORKFLOW ").to_string(), "system.endworkflow");
    }
}

#[cfg(test)]
mod end_workflow_tests {
    use super::*;

    #[test]
    fn test_end_workflow_at_top_level_clears_variables() {
        let mut session = Session::default();
        session.start_session(SystemContext::default());
        session.variables_mut().set("phone", "555", Scope::Customer);
        let q = blocked(&session.load_workflow(ending_workflow("system.endworkflow")));

        let state = session.answer_question(q, "stop").unwrap();
        assert!(state.is_idle());
        assert_eq!(session.visible_rows().count(), 0);
        assert_eq!(session.current_workflow(), None);
        assert!(session.variables().get("phone").is_none());
        assert!(session.variables().get("interactionid").is_some());
        assert!(session.drain_events().contains(&SessionEvent::WorkflowEnded {
            name: "Ending".to_string()
        }));
    }

    #[test]
    fn test_end_workflow_in_interaction_mode_keeps_variables() {
        let mut session = Session::builder().with_interaction_mode(true).build();
        session.variables_mut().set("phone", "555", Scope::Customer);
        let q = blocked(&session.load_workflow(ending_workflow("system.endworkflow")));

        assert!(session.answer_question(q, "stop").unwrap().is_idle());
        assert_eq!(session.variables().get_text("phone").as_deref(), Some("555"));
    }

    #[test]
    fn test_end_workflow_inside_a_sub_workflow_returns_to_the_parent() {
        let parent = Workflow::new(
            "Host",
            "host",
            vec![
                Step::instruction("H1", "Host start"),
                Step::load_workflow("LOAD", "Ending", false),
                Step::instruction("H2", "Host end"),
            ],
        );
        let catalog = CatalogResolver::with_workflows([parent, ending_workflow("system.endworkflow")]);
        let mut session = Session::default();

        let q = blocked(&block_on(session.start_workflow(&catalog, "host")).unwrap());
        assert_eq!(session.depth(), 1);

        let state = session.answer_question(q, "stop").unwrap();
        assert!(state.is_idle());
        assert_eq!(session.depth(), 0);
        assert_eq!(visible_guids(&session), ["H1", "Q", "H2"]);
    }

    #[test]
    fn test_unknown_commands_are_ignored() {
        let mut session = Session::default();
        let q = blocked(&session.load_workflow(ending_workflow("crm.open; audit.log")));

        let state = session.answer_question(q, "stop").unwrap();
        assert!(state.is_idle());
        assert_eq!(visible_guids(&session), ["Q", "NEVER", "LATER"]);
    }
}

#[cfg(test)]
mod end_interaction_tests {
    use super::*;

    #[test]
    fn test_confirmed_end_interaction() {
        let mut session = Session::default();
        session.start_session(SystemContext::default());
        let q = blocked(&session.load_workflow(ending_workflow("system.endinteraction")));

        session.answer_question(q, "stop").unwrap();
        assert!(session.is_confirmation_pending());
        assert!(session.drain_events().contains(&SessionEvent::ConfirmationRequested));
        assert_eq!(visible_guids(&session), ["Q", "NEVER", "LATER"]);

        let state = session.confirm_end_interaction(true);
        assert!(state.is_idle());
        assert!(!session.is_confirmation_pending());
        assert_eq!(session.visible_rows().count(), 0);
        assert!(session.variables().is_empty());
        assert_eq!(session.drain_events(), vec![SessionEvent::NavigateAway]);
    }

    #[test]
    fn test_declined_end_interaction() {
        let mut session = Session::default();
        let q = blocked(&session.load_workflow(ending_workflow("system.endinteraction")));
        session.answer_question(q, "stop").unwrap();
        session.drain_events();

        session.confirm_end_interaction(false);
        assert!(!session.is_confirmation_pending());
        assert_eq!(visible_guids(&session), ["Q", "NEVER", "LATER"]);
        assert!(session.drain_events().is_empty());

        // Nothing left to confirm.
        session.confirm_end_interaction(true);
        assert_eq!(session.visible_rows().count(), 3);
    }
}
