use std::fmt;

/// Master macro to define every condition operation, its authored names and
/// whether it takes a parenthesized parameter.
macro_rules! define_operations {
    ( $( ($variant:ident, $name:literal, $takes_param:literal $(, $alias:literal)* ) ),* $(,)? ) => {
        /// An operation applied to a variable inside a condition.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $( $variant, )*
        }

        impl Operation {
            /// Looks an operation up by its authored name, ignoring case.
            pub fn from_name(name: &str) -> Option<Operation> {
                match name.trim().to_ascii_lowercase().as_str() {
                    $( $name $( | $alias )* => Some(Operation::$variant), )*
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( Operation::$variant => $name, )*
                }
            }

            pub fn takes_param(self) -> bool {
                match self {
                    $( Operation::$variant => $takes_param, )*
                }
            }
        }
    };
}

define_operations! {
    (Empty, "empty", false, "isempty"),
    (NotEmpty, "notempty", false, "isnotempty"),
    (Equals, "equals", true, "equal", "eq"),
    (NotEquals, "notequals", true, "notequal", "ne"),
    (Contains, "contains", true),
    (NotContains, "notcontains", true),
    (GreaterThan, "greaterthan", true, "gt"),
    (GreaterThanEqualTo, "greaterthanequalto", true, "greaterthanorequalto", "gte"),
    (LessThan, "lessthan", true, "lt"),
    (LessThanEqualTo, "lessthanequalto", true, "lessthanorequalto", "lte"),
}

/// `variable[.operation(param)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub variable: String,
    pub operation: Option<Operation>,
    /// Raw parameter text; may contain `~name~` tokens resolved at evaluation time.
    pub param: Option<String>,
}

/// One operand of a compound formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Condition(Condition),
    /// Text that does not parse as a condition. Always evaluates to unknown.
    Invalid(String),
}

/// A parsed formula. Compound formulas are flat: only the first operator
/// found is split on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Single(Clause),
    Any(Vec<Clause>),
    All(Vec<Clause>),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.variable)?;
        match (self.operation, &self.param) {
            (Some(op), Some(param)) => write!(f, ".{}({})", op.name(), param),
            (Some(op), None) => write!(f, ".{}", op.name()),
            (None, _) => Ok(()),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Condition(condition) => write!(f, "{}", condition),
            Clause::Invalid(text) => write!(f, "<invalid: {}>", text),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (clauses, joiner) = match self {
            Formula::Single(clause) => return write!(f, "{}", clause),
            Formula::Any(clauses) => (clauses, ".or."),
            Formula::All(clauses) => (clauses, ".and."),
        };
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", joiner)?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}
