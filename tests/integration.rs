//! End-to-end tests: JSON documents, the catalog resolver, configuration and snapshots.
mod common;
use common::*;
use std::fs;
use tejun::error::ConfigError;
use tejun::prelude::*;
use tokio_test::block_on;

fn support_session() -> (Session, CatalogResolver) {
    let workflow = Workflow::from_json(SUPPORT_WORKFLOW_JSON).expect("support workflow parses");
    let catalog = CatalogResolver::with_workflows([workflow]);
    let mut session = Session::builder().with_username("agent7").build();
    session.start_session(SystemContext::default());
    (session, catalog)
}

#[cfg(test)]
mod document_tests {
    use super::*;

    #[test]
    fn test_support_document_conversion() {
        let workflow = Workflow::from_json(SUPPORT_WORKFLOW_JSON).unwrap();
        assert_eq!(workflow.name, "Support");
        assert_eq!(workflow.uid, "support-001");
        assert_eq!(workflow.aliases, ["help"]);

        let guids: Vec<&str> = workflow.steps.iter().map(|step| step.guid.as_str()).collect();
        assert_eq!(guids, ["greet", "set-tier", "issue", "bye"]);

        let issue = &workflow.steps[2];
        assert!(matches!(issue.kind, StepKind::Question { .. }));
        assert_eq!(issue.answers().len(), 3);
        assert_eq!(issue.answers()[1].text, "Priority line");
        assert_eq!(
            issue.answers()[2].execute.as_deref(),
            Some("system.endworkflow")
        );

        let email = &issue.answers()[0].sub_steps[0];
        assert!(matches!(
            email.kind,
            StepKind::Collect {
                format: CollectFormat::Email,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_guids_are_synthesized() {
        let workflow = Workflow::from_json(
            r#"{"Name": "Bare", "Steps": [{"StepType": "UserInstruction", "Prompt": "Hi"}]}"#,
        )
        .unwrap();
        assert_eq!(workflow.uid, "Bare");
        assert_eq!(workflow.steps[0].guid, "Bare#0");
    }

    #[test]
    fn test_invalid_documents() {
        let nameless = Workflow::from_json(r#"{"UID": "x-1", "Steps": []}"#).unwrap_err();
        assert_eq!(nameless, DefinitionError::MissingName("x-1".to_string()));
        assert!(matches!(
            Workflow::from_json("{ not json"),
            Err(DefinitionError::JsonParseError(_))
        ));
    }
}

#[cfg(test)]
mod end_to_end_tests {
    use super::*;

    #[test]
    fn test_support_walkthrough() {
        let (mut session, catalog) = support_session();

        let issue = blocked(&block_on(session.start_workflow(&catalog, "HELP")).unwrap());
        assert_eq!(visible_guids(&session), ["greet", "issue"]);
        assert_eq!(session.current_workflow(), Some("Support"));
        assert_eq!(
            session.variables().get_text("workflowid").as_deref(),
            Some("support-001")
        );

        let greet = session.row(row_of(&session, "greet")).unwrap();
        assert_eq!(
            session.variables().interpolate(&greet.step.prompt),
            "Hello agent7"
        );
        assert_eq!(
            session.variables().get_in("tier", Scope::Customer),
            Some(&VariableValue::from("gold"))
        );

        let offered: Vec<String> = session
            .available_answers(issue)
            .unwrap()
            .into_iter()
            .map(|answer| answer.guid.clone())
            .collect();
        assert_eq!(offered, ["issue-login", "issue-done"]);
        assert!(matches!(
            session.answer_question(issue, "issue-vip"),
            Err(InputError::UnknownAnswer { .. })
        ));

        let email = blocked(&session.answer_question(issue, "issue-login").unwrap());
        assert_eq!(
            session.variables().get_text("issue").as_deref(),
            Some("Cannot log in")
        );
        assert!(matches!(
            session.collect_value(email, "not-an-email"),
            Err(InputError::InvalidFormat { .. })
        ));

        let state = session.collect_value(email, " ada@example.com ").unwrap();
        assert!(state.is_idle());
        assert_eq!(visible_guids(&session), ["greet", "issue", "email", "bye"]);
        assert_eq!(
            session.notes().workflow_notes(),
            [
                "Customer cannot log in",
                "E-mail: ada@example.com",
                "Closed Cannot log in"
            ]
        );
    }

    #[test]
    fn test_ending_the_workflow_from_an_answer() {
        let (mut session, catalog) = support_session();
        let issue = blocked(&block_on(session.start_workflow(&catalog, "support-001")).unwrap());

        let state = session.answer_question(issue, "issue-done").unwrap();
        assert!(state.is_idle());
        assert_eq!(session.visible_rows().count(), 0);
        assert!(session.variables().get("tier").is_none());
        assert_eq!(
            session.variables().get_text("username").as_deref(),
            Some("agent7")
        );
    }

    #[test]
    fn test_catalog_from_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("support.json"), SUPPORT_WORKFLOW_JSON).unwrap();
        fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        fs::write(dir.path().join("nameless.json"), r#"{"Steps": []}"#).unwrap();
        fs::write(dir.path().join("README.txt"), "not a workflow").unwrap();

        let catalog = CatalogResolver::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["Support"]);

        let workflow = block_on(catalog.resolve_by_name("support")).unwrap();
        assert_eq!(workflow.uid, "support-001");
        assert!(block_on(catalog.resolve_by_uid_or_alias("Help")).is_ok());

        let missing = CatalogResolver::from_dir(&dir.path().join("absent"));
        assert!(matches!(missing, Err(ResolutionError::Unavailable(_))));
    }

    #[test]
    fn test_snapshot_written_when_the_workflow_finishes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("variables.bin");
        let workflow = Workflow::new(
            "Snap",
            "snap",
            vec![Step::collect("PHONE", "Phone?", "phone")],
        );

        let mut session = Session::builder().with_snapshot_path(&path).build();
        let phone = blocked(&session.load_workflow(workflow));
        assert!(!path.exists());

        session.collect_value(phone, "555-0100").unwrap();
        assert!(path.exists());

        let mut restored = VariableStore::with_snapshot_path(&path);
        assert!(restored.restore().unwrap());
        assert_eq!(restored.get_text("phone").as_deref(), Some("555-0100"));
        assert_eq!(restored.get_text("workflowid").as_deref(), Some("snap"));
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_defaults_and_overrides() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());

        let config = EngineConfig::from_toml_str(
            "max_depth = 3\ninteraction_mode = true\nusername = \"agent7\"\n",
        )
        .unwrap();
        assert_eq!(config.max_depth, 3);
        assert!(config.interaction_mode);
        assert_eq!(config.pace_ms, 0);
        assert_eq!(config.username.as_deref(), Some("agent7"));

        let session = Session::new(config);
        assert_eq!(session.config().max_depth, 3);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EngineConfig::from_toml_str("max_depth = \"deep\""),
            Err(ConfigError::Parse(_))
        ));

        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            EngineConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tejun.toml");
        fs::write(&path, "pace_ms = 250\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.pace_ms, 250);
        assert_eq!(config.max_depth, EngineConfig::default().max_depth);
    }
}
