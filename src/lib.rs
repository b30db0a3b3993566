//! # Tejun - Guided Workflow Execution Engine
//!
//! **Tejun** runs tree-shaped, server-supplied workflows: ordered lists of
//! steps (instructions, questions, value collection, notes, variable
//! assignments and nested sub-workflow loads) that a presentation layer
//! reveals to a human one row at a time.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Workflows**: Parse JSON workflow documents with `Workflow::from_json`, or implement `IntoWorkflow` for your own format.
//! 2.  **Resolve**: Put them behind a `WorkflowResolver`, e.g. the in-memory `CatalogResolver`.
//! 3.  **Run**: Create a `Session`, start a workflow and let it advance until it blocks on a Question or Collect row.
//! 4.  **Respond**: Feed the consumer's choices back with `answer_question` / `collect_value`; the session resumes, retracting rows when an answer changes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tejun::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let workflow = Workflow::new(
//!         "Greeting",
//!         "greet-1",
//!         vec![
//!             Step::collect("name", "What is your name?", "name"),
//!             Step::instruction("hello", "Hello ~name~!"),
//!         ],
//!     );
//!
//!     let mut session = Session::builder().with_username("agent").build();
//!     session.start_session(SystemContext::default());
//!
//!     let state = session.load_workflow(workflow);
//!     if let Some(row) = state.blocked_row() {
//!         session.collect_value(row, "Ada")?;
//!     }
//!
//!     println!("{}", TranscriptFormatter::format_session(&session));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod formula;
pub mod prelude;
pub mod resolver;
pub mod transcript;
pub mod variables;
pub mod workflow;
