use crate::error::ResolutionError;
use crate::workflow::Workflow;
use ahash::AHashMap;
use futures::future::BoxFuture;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Workflow Resolution Service: turns names and identifiers into workflows.
///
/// The engine only calls it for the initial load and for LoadWorkflow steps,
/// and treats any error as "skip this step".
pub trait WorkflowResolver: Send + Sync {
    fn resolve_by_name(&self, name: &str) -> BoxFuture<'_, Result<Workflow, ResolutionError>>;

    fn resolve_by_uid_or_alias(&self, id: &str) -> BoxFuture<'_, Result<Workflow, ResolutionError>>;
}

/// An in-memory catalog of workflows, optionally loaded from a directory of
/// JSON documents. Lookups ignore case.
#[derive(Debug, Clone, Default)]
pub struct CatalogResolver {
    by_name: AHashMap<String, Workflow>,
    /// uid or alias -> folded name
    ids: AHashMap<String, String>,
}

impl CatalogResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workflows(workflows: impl IntoIterator<Item = Workflow>) -> Self {
        let mut catalog = Self::new();
        for workflow in workflows {
            catalog.insert(workflow);
        }
        catalog
    }

    /// Adds or replaces a workflow.
    pub fn insert(&mut self, workflow: Workflow) {
        let key = workflow.name.to_lowercase();
        for id in std::iter::once(&workflow.uid).chain(workflow.aliases.iter()) {
            if !id.trim().is_empty() {
                self.ids.insert(id.trim().to_lowercase(), key.clone());
            }
        }
        debug!(workflow = %workflow.name, steps = workflow.steps.len(), "Catalogued workflow");
        self.by_name.insert(key, workflow);
    }

    /// Loads every `*.json` document in `dir`. Documents that fail to parse
    /// are logged and skipped.
    pub fn from_dir(dir: &Path) -> Result<Self, ResolutionError> {
        let entries = fs::read_dir(dir).map_err(|e| {
            ResolutionError::Unavailable(format!("Could not read '{}': {}", dir.display(), e))
        })?;
        let mut catalog = Self::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let loaded = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| Workflow::from_json(&json).map_err(|e| e.to_string()));
            match loaded {
                Ok(workflow) => catalog.insert(workflow),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping workflow document"),
            }
        }
        info!(dir = %dir.display(), workflows = catalog.len(), "Loaded workflow catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.values().map(|workflow| workflow.name.as_str())
    }

    fn lookup_name(&self, name: &str) -> Result<Workflow, ResolutionError> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound(name.to_string()))
    }

    fn lookup_id(&self, id: &str) -> Result<Workflow, ResolutionError> {
        let folded = id.trim().to_lowercase();
        match self.ids.get(&folded) {
            Some(name) => self.lookup_name(name),
            None => self.lookup_name(id),
        }
    }
}

impl WorkflowResolver for CatalogResolver {
    fn resolve_by_name(&self, name: &str) -> BoxFuture<'_, Result<Workflow, ResolutionError>> {
        let result = self.lookup_name(name);
        Box::pin(async move { result })
    }

    fn resolve_by_uid_or_alias(&self, id: &str) -> BoxFuture<'_, Result<Workflow, ResolutionError>> {
        let result = self.lookup_id(id);
        Box::pin(async move { result })
    }
}
