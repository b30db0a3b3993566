use super::compare::compare_operands;
use super::expression::{Clause, Condition, Formula, Operation};
use super::parsing::parse_formula;
use crate::variables::{VariableStore, VariableValue};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// The three-valued result of a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    True,
    False,
    /// A lookup, parse or comparison failed somewhere in the chain.
    Unknown,
}

impl Outcome {
    pub fn is_true(self) -> bool {
        self == Outcome::True
    }

    fn negate(self) -> Outcome {
        match self {
            Outcome::True => Outcome::False,
            Outcome::False => Outcome::True,
            Outcome::Unknown => Outcome::Unknown,
        }
    }
}

impl From<bool> for Outcome {
    fn from(value: bool) -> Self {
        if value { Outcome::True } else { Outcome::False }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::True => write!(f, "true"),
            Outcome::False => write!(f, "false"),
            Outcome::Unknown => write!(f, "unknown"),
        }
    }
}

/// Evaluates formulas against a variable store. Read-only.
pub struct FormulaEvaluator<'a> {
    store: &'a VariableStore,
}

impl<'a> FormulaEvaluator<'a> {
    pub fn new(store: &'a VariableStore) -> Self {
        Self { store }
    }

    pub fn evaluate(&self, formula: &str) -> Outcome {
        if formula.trim().is_empty() {
            return Outcome::Unknown;
        }
        let outcome = self.evaluate_formula(&parse_formula(formula));
        debug!(formula, outcome = %outcome, "Formula evaluated");
        outcome
    }

    /// `.or.` short-circuits to true on the first true clause, `.and.` to
    /// false on the first clause that is not true.
    pub fn evaluate_formula(&self, formula: &Formula) -> Outcome {
        match formula {
            Formula::Single(clause) => self.evaluate_clause(clause),
            Formula::Any(clauses) => Outcome::from(
                clauses
                    .iter()
                    .any(|clause| self.evaluate_clause(clause).is_true()),
            ),
            Formula::All(clauses) => Outcome::from(
                clauses
                    .iter()
                    .all(|clause| self.evaluate_clause(clause).is_true()),
            ),
        }
    }

    fn evaluate_clause(&self, clause: &Clause) -> Outcome {
        match clause {
            Clause::Condition(condition) => self.evaluate_condition(condition),
            Clause::Invalid(_) => Outcome::Unknown,
        }
    }

    pub fn evaluate_condition(&self, condition: &Condition) -> Outcome {
        let value = self.store.get(&condition.variable);

        let Some(operation) = condition.operation else {
            return value.as_ref().map_or(Outcome::Unknown, truthy);
        };

        match operation {
            Operation::Empty => Outcome::from(value.as_ref().is_none_or(VariableValue::is_blank)),
            Operation::NotEmpty => {
                Outcome::from(!value.as_ref().is_none_or(VariableValue::is_blank))
            }
            _ => {
                let (Some(value), Some(param)) = (value, condition.param.as_deref()) else {
                    return Outcome::Unknown;
                };
                let param = self.store.interpolate(param);
                compare(operation, &value, param.trim())
            }
        }
    }
}

fn compare(operation: Operation, value: &VariableValue, param: &str) -> Outcome {
    match operation {
        Operation::Equals => Outcome::from(text_equals(&value.to_string(), param)),
        Operation::NotEquals => Outcome::from(!text_equals(&value.to_string(), param)),
        Operation::Contains => contains(value, param),
        Operation::NotContains => contains(value, param).negate(),
        Operation::GreaterThan => ordering(value, param, |o| o == Ordering::Greater),
        Operation::GreaterThanEqualTo => ordering(value, param, |o| o != Ordering::Less),
        Operation::LessThan => ordering(value, param, |o| o == Ordering::Less),
        Operation::LessThanEqualTo => ordering(value, param, |o| o != Ordering::Greater),
        Operation::Empty | Operation::NotEmpty => Outcome::Unknown,
    }
}

fn text_equals(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

fn contains(value: &VariableValue, param: &str) -> Outcome {
    match value {
        VariableValue::List(items) => Outcome::from(items.iter().any(|item| item.trim() == param)),
        VariableValue::Text(text) => {
            Outcome::from(text.to_lowercase().contains(&param.to_lowercase()))
        }
    }
}

fn ordering(value: &VariableValue, param: &str, accept: impl Fn(Ordering) -> bool) -> Outcome {
    match compare_operands(&value.to_string(), param) {
        Some(order) => Outcome::from(accept(order)),
        None => Outcome::Unknown,
    }
}

fn truthy(value: &VariableValue) -> Outcome {
    match value {
        VariableValue::List(_) => Outcome::from(!value.is_blank()),
        VariableValue::Text(text) => match text.trim().to_lowercase().as_str() {
            "" | "false" | "no" | "n" | "0" | "off" => Outcome::False,
            _ => Outcome::True,
        },
    }
}
