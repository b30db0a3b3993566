use crate::engine::{Row, Session};
use crate::workflow::StepKind;
use itertools::Itertools;

/// Formats the live row sequence of a session into readable text.
pub struct TranscriptFormatter;

impl TranscriptFormatter {
    /// Renders every visible row, indented by how many answers led to it.
    pub fn format_session(session: &Session) -> String {
        session
            .visible_rows()
            .map(|row| Self::format_row(session, row))
            .join("\n")
    }

    /// Renders a single row: its prompt, then the offered answers of a
    /// Question or the collected value of a Collect step.
    pub fn format_row(session: &Session, row: &Row) -> String {
        let indent = "  ".repeat(session.ancestry(row.id).len());
        let variables = session.variables();

        let mut lines = vec![format!(
            "{}{} {}",
            indent,
            Self::marker(row),
            variables.interpolate(&row.step.prompt)
        )];
        if let Some(secondary) = &row.step.secondary_text {
            lines.push(format!("{}    {}", indent, variables.interpolate(secondary)));
        }

        match &row.step.kind {
            StepKind::Question { .. } => {
                let offered = session.available_answers(row.id).unwrap_or_default();
                for (i, answer) in offered.iter().enumerate() {
                    let selected = row.selected_answer.as_deref() == Some(answer.guid.as_str());
                    lines.push(format!(
                        "{}    {} {}. {}",
                        indent,
                        if selected { "(x)" } else { "( )" },
                        i + 1,
                        variables.interpolate(&answer.text)
                    ));
                }
            }
            StepKind::Collect { format, .. } => {
                let value = match &row.value {
                    Some(value) => value.clone(),
                    None => format!("<{}>", format),
                };
                lines.push(format!("{}    > {}", indent, value));
            }
            _ => {}
        }

        lines.join("\n")
    }

    fn marker(row: &Row) -> &'static str {
        match row.step.kind {
            StepKind::Question { .. } | StepKind::Collect { .. } if row.answered => "[x]",
            StepKind::Question { .. } | StepKind::Collect { .. } => "[ ]",
            StepKind::NotesBlock => "[n]",
            _ => " - ",
        }
    }
}
