//! The conditional-formula language used by step and answer conditions.
//!
//! A formula is one or more conditions joined by `.or.` or `.and.`; a
//! condition is `variable[.operation(param)]`. Evaluation is total: any
//! failure yields [`Outcome::Unknown`], which callers treat as "not satisfied".

pub mod compare;
mod evaluator;
pub mod expression;
pub mod parsing;

pub use evaluator::{FormulaEvaluator, Outcome};
pub use expression::{Clause, Condition, Formula, Operation};
pub use parsing::{parse_condition, parse_formula};

use crate::variables::VariableStore;

/// Evaluates `formula` against `store`.
pub fn evaluate(formula: &str, store: &VariableStore) -> Outcome {
    FormulaEvaluator::new(store).evaluate(formula)
}
