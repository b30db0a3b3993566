use itertools::Itertools;

/// Accumulated note text produced by answers, collects and notes blocks.
///
/// In interaction mode every note is mirrored into a buffer that survives
/// the end of individual workflows, so notes from several workflows run in
/// one interaction are kept together.
#[derive(Debug, Clone, Default)]
pub struct NotesBuffer {
    workflow: Vec<String>,
    interaction: Vec<String>,
    mirror: bool,
}

impl NotesBuffer {
    pub fn new(mirror: bool) -> Self {
        Self {
            mirror,
            ..Self::default()
        }
    }

    pub fn append(&mut self, note: impl Into<String>) {
        let note = note.into();
        if self.mirror {
            self.interaction.push(note.clone());
        }
        self.workflow.push(note);
    }

    pub fn workflow_notes(&self) -> &[String] {
        &self.workflow
    }

    pub fn interaction_notes(&self) -> &[String] {
        &self.interaction
    }

    /// Notes of the current workflow, one per line.
    pub fn text(&self) -> String {
        self.workflow.iter().join("\n")
    }

    pub fn clear_workflow(&mut self) {
        self.workflow.clear();
    }

    pub fn clear_all(&mut self) {
        self.workflow.clear();
        self.interaction.clear();
    }
}
