use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifetime class of a variable.
///
/// Lookups without an explicit scope walk `PRECEDENCE` in order, so a System
/// variable shadows a Workflow variable of the same name, which in turn
/// shadows a Customer variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Seeded once per top-level session (interaction id, username, ...).
    System,
    /// Set while a workflow runs; cleared with the session.
    #[default]
    Workflow,
    /// Facts about the customer collected during the interaction.
    Customer,
}

impl Scope {
    pub const PRECEDENCE: [Scope; 3] = [Scope::System, Scope::Workflow, Scope::Customer];

    pub(crate) fn index(self) -> usize {
        match self {
            Scope::System => 0,
            Scope::Workflow => 1,
            Scope::Customer => 2,
        }
    }

    /// Parses an authored scope name, ignoring case.
    pub fn parse(name: &str) -> Option<Scope> {
        match name.trim().to_ascii_lowercase().as_str() {
            "system" => Some(Scope::System),
            "workflow" => Some(Scope::Workflow),
            "customer" => Some(Scope::Customer),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::System => write!(f, "System"),
            Scope::Workflow => write!(f, "Workflow"),
            Scope::Customer => write!(f, "Customer"),
        }
    }
}
