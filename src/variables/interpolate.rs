use super::VariableValue;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Matches `~#name#~` or `~name~`. Names cannot contain whitespace, `~` or `#`.
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"~#([^~#\s]+)#~|~([^~#\s]+)~").unwrap());

/// Single-pass token substitution. Substituted values are never rescanned.
pub fn interpolate_with<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<VariableValue>,
{
    if !text.contains('~') {
        return text.to_string();
    }
    TOKEN
        .replace_all(text, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match lookup(name) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
