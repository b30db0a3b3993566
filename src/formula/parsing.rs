use super::expression::{Clause, Condition, Formula, Operation};

const OR: &str = ".or.";
const AND: &str = ".and.";

/// Parses a formula. Never fails: unparseable parts become `Clause::Invalid`.
///
/// The formula is split on whichever of `.or.` / `.and.` occurs first
/// (case-insensitive). Parts are not split again, so a formula mixing both
/// operators yields clauses that fail to parse.
pub fn parse_formula(text: &str) -> Formula {
    let lowered = text.to_ascii_lowercase();
    let operator = match (lowered.find(OR), lowered.find(AND)) {
        (Some(or), Some(and)) => Some(if or < and { OR } else { AND }),
        (Some(_), None) => Some(OR),
        (None, Some(_)) => Some(AND),
        (None, None) => None,
    };

    match operator {
        None => Formula::Single(parse_clause(text)),
        Some(op) => {
            let clauses = split_ignore_case(text, &lowered, op)
                .into_iter()
                .map(parse_clause)
                .collect();
            if op == OR {
                Formula::Any(clauses)
            } else {
                Formula::All(clauses)
            }
        }
    }
}

/// Splits `text` on every occurrence of the lowercase `separator`, matching
/// against `lowered` (an ASCII-lowercased copy with identical byte offsets).
fn split_ignore_case<'a>(text: &'a str, lowered: &str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (index, _) in lowered.match_indices(separator) {
        parts.push(&text[start..index]);
        start = index + separator.len();
    }
    parts.push(&text[start..]);
    parts
}

fn parse_clause(text: &str) -> Clause {
    match parse_condition(text) {
        Some(condition) => Clause::Condition(condition),
        None => Clause::Invalid(text.trim().to_string()),
    }
}

/// Parses `variable[.operation(param)]`.
pub fn parse_condition(text: &str) -> Option<Condition> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.ends_with(')') {
        let open = text.find('(')?;
        let head = &text[..open];
        let param = &text[open + 1..text.len() - 1];
        let (variable, op_name) = head.rsplit_once('.')?;
        let operation = Operation::from_name(op_name).filter(|op| op.takes_param())?;
        let variable = clean_variable(variable)?;
        return Some(Condition {
            variable,
            operation: Some(operation),
            param: Some(param.to_string()),
        });
    }

    if let Some((variable, op_name)) = text.rsplit_once('.') {
        if let Some(operation) = Operation::from_name(op_name).filter(|op| !op.takes_param()) {
            return Some(Condition {
                variable: clean_variable(variable)?,
                operation: Some(operation),
                param: None,
            });
        }
    }

    Some(Condition {
        variable: clean_variable(text)?,
        operation: None,
        param: None,
    })
}

/// Strips optional `~name~` / `~#name#~` wrapping and rejects names that
/// cannot be variables.
fn clean_variable(raw: &str) -> Option<String> {
    let name = raw.trim().trim_matches('~').trim_matches('#').trim();
    if name.is_empty() || name.contains(|c: char| c.is_whitespace() || "()~#".contains(c)) {
        return None;
    }
    Some(name.to_lowercase())
}
