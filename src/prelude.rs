//! Prelude module for convenient imports
//!
//! Re-exports the types most consumers of the engine need.
//!
//! # Example
//!
//! ```rust,no_run
//! use tejun::prelude::*;
//!
//! # async fn run_example() -> Result<()> {
//! let catalog = CatalogResolver::from_dir(Path::new("workflows"))?;
//! let mut session = Session::new(EngineConfig::from_file(Path::new("tejun.toml"))?);
//! session.start_session(SystemContext::default());
//!
//! let state = session.start_workflow(&catalog, "password-reset").await?;
//! println!("{}", state);
//! # Ok(())
//! # }
//! ```

// Engine
pub use crate::config::EngineConfig;
pub use crate::engine::{
    EngineState, PendingLoad, Row, RowId, Session, SessionBuilder, SessionEvent, SystemContext,
};

// Workflow model
pub use crate::workflow::{
    Answer, Assignment, CollectFormat, IntoWorkflow, Step, StepKind, VariableTarget, Workflow,
};

// Variables and formulas
pub use crate::formula::{Outcome, evaluate};
pub use crate::variables::{Scope, VariableStore, VariableValue};

// Resolution
pub use crate::resolver::{CatalogResolver, WorkflowResolver};

// Error types
pub use crate::error::{DefinitionError, InputError, ResolutionError};

// Transcript formatting
pub use crate::transcript::TranscriptFormatter;

pub use std::path::Path;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
