use super::interpolate::interpolate_with;
use super::{Scope, VariableValue};
use ahash::AHashMap;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the dynamic variable holding the current date (`YYYY-MM-DD`).
pub const TODAY: &str = "today";
/// Name of the dynamic variable holding the current local datetime (`YYYY-MM-DDTHH:MM:SS`).
pub const NOW: &str = "now";

/// Scoped, case-insensitive key/value state shared by the sequencer, the
/// formula evaluator and the command processor.
///
/// All keys are folded to lowercase on both reads and writes.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    scopes: [AHashMap<String, VariableValue>; 3],
    snapshot_path: Option<PathBuf>,
}

pub(crate) fn fold_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that persists to (and clears) a snapshot file.
    pub fn with_snapshot_path(path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    pub fn set(&mut self, name: &str, value: impl Into<VariableValue>, scope: Scope) {
        let key = fold_key(name);
        if key.is_empty() {
            warn!(scope = %scope, "Ignoring assignment to a variable with an empty name");
            return;
        }
        let value = value.into();
        debug!(variable = %key, scope = %scope, value = %value, "Variable set");
        self.scopes[scope.index()].insert(key, value);
    }

    /// Looks a variable up across scopes (System > Workflow > Customer).
    ///
    /// `today` and `now` fall back to the current local date and time when no
    /// explicit variable of that name exists.
    pub fn get(&self, name: &str) -> Option<VariableValue> {
        let key = fold_key(name);
        Scope::PRECEDENCE
            .iter()
            .find_map(|scope| self.scopes[scope.index()].get(&key).cloned())
            .or_else(|| dynamic_value(&key))
    }

    /// Looks a variable up in a single scope. Dynamic values are not consulted.
    pub fn get_in(&self, name: &str, scope: Scope) -> Option<&VariableValue> {
        self.scopes[scope.index()].get(&fold_key(name))
    }

    /// Convenience for `get` rendered as text.
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.to_string())
    }

    pub fn remove(&mut self, name: &str, scope: Scope) -> Option<VariableValue> {
        self.scopes[scope.index()].remove(&fold_key(name))
    }

    /// Clears one scope, or every scope when `scope` is `None`.
    ///
    /// Clearing everything also deletes the persisted snapshot so the next
    /// session starts empty. Idempotent.
    pub fn clear(&mut self, scope: Option<Scope>) {
        match scope {
            Some(scope) => self.scopes[scope.index()].clear(),
            None => {
                self.scopes.iter_mut().for_each(|scope| scope.clear());
                self.remove_snapshot();
            }
        }
    }

    /// Clears the Workflow and Customer scopes, keeping System variables.
    pub fn clear_session_scopes(&mut self) {
        self.clear(Some(Scope::Workflow));
        self.clear(Some(Scope::Customer));
    }

    /// Replaces every `~name~` and `~#name#~` token with the variable's value.
    /// Unresolved tokens are left verbatim.
    pub fn interpolate(&self, text: &str) -> String {
        interpolate_with(text, |name| self.get(name))
    }

    /// Iterates the explicit variables of one scope, in no particular order.
    pub fn iter_scope(&self, scope: Scope) -> impl Iterator<Item = (&str, &VariableValue)> {
        self.scopes[scope.index()]
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.scopes.iter().map(|scope| scope.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn scopes(&self) -> &[AHashMap<String, VariableValue>; 3] {
        &self.scopes
    }

    pub(crate) fn replace_scopes(&mut self, scopes: [AHashMap<String, VariableValue>; 3]) {
        self.scopes = scopes;
    }

    fn remove_snapshot(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed variable snapshot"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Could not remove variable snapshot"),
        }
    }
}

fn dynamic_value(key: &str) -> Option<VariableValue> {
    match key {
        TODAY => Some(VariableValue::Text(Local::now().format("%Y-%m-%d").to_string())),
        NOW => Some(VariableValue::Text(
            Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        )),
        _ => None,
    }
}
