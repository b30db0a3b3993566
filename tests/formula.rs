//! Formula evaluator tests.
use tejun::formula::compare::{compare_operands, parse_number};
use tejun::formula::{Clause, Formula, Operation, parse_condition, parse_formula};
use tejun::prelude::*;
use std::cmp::Ordering;

fn store_with(pairs: &[(&str, &str)]) -> VariableStore {
    let mut store = VariableStore::new();
    for (name, value) in pairs {
        store.set(name, *value, Scope::Workflow);
    }
    store
}

#[cfg(test)]
mod parsing_tests {
    use super::*;

    #[test]
    fn test_parse_condition_shapes() {
        let bare = parse_condition("IsVip").unwrap();
        assert_eq!(bare.variable, "isvip");
        assert_eq!(bare.operation, None);

        let empty = parse_condition("~#phone#~.notempty").unwrap();
        assert_eq!(empty.variable, "phone");
        assert_eq!(empty.operation, Some(Operation::NotEmpty));

        let cmp = parse_condition("age.GreaterThanEqualTo(~minimum~)").unwrap();
        assert_eq!(cmp.operation, Some(Operation::GreaterThanEqualTo));
        assert_eq!(cmp.param.as_deref(), Some("~minimum~"));
    }

    #[test]
    fn test_parse_condition_rejects_garbage() {
        assert!(parse_condition("").is_none());
        assert!(parse_condition("two words").is_none());
        assert!(parse_condition("age.frobnicate(3)").is_none());
    }

    #[test]
    fn test_first_operator_wins() {
        match parse_formula("a.equals(1).OR.b.equals(2).and.c.equals(3)") {
            Formula::Any(clauses) => assert_eq!(clauses.len(), 2),
            other => panic!("expected an .or. split, got {:?}", other),
        }
        match parse_formula("a.equals(1).and.b.equals(2).or.c.equals(3)") {
            Formula::All(clauses) => assert_eq!(clauses.len(), 2),
            other => panic!("expected an .and. split, got {:?}", other),
        }
        assert!(matches!(
            parse_formula("not a formula"),
            Formula::Single(Clause::Invalid(_))
        ));
    }
}

#[cfg(test)]
mod evaluation_tests {
    use super::*;

    #[test]
    fn test_cascade_example() {
        let adult = store_with(&[("age", "21")]);
        assert_eq!(evaluate("age.greaterthan(18)", &adult), Outcome::True);

        let named = store_with(&[("age", "bob")]);
        assert_eq!(evaluate("age.greaterthan(18)", &named), Outcome::Unknown);
    }

    #[test]
    fn test_ordering_cascade() {
        let store = store_with(&[
            ("amount", "$1,250.50"),
            ("start", "2024-03-05"),
            ("grade", "c"),
        ]);
        assert_eq!(evaluate("amount.greaterthan(1000)", &store), Outcome::True);
        assert_eq!(evaluate("amount.lessthanequalto(1250.5)", &store), Outcome::True);
        assert_eq!(evaluate("start.greaterthan(2024-01-01)", &store), Outcome::True);
        assert_eq!(evaluate("start.lessthan(01/01/2024)", &store), Outcome::False);
        assert_eq!(evaluate("grade.greaterthan(B)", &store), Outcome::True);
        assert_eq!(evaluate("start.greaterthan(soon)", &store), Outcome::Unknown);
    }

    #[test]
    fn test_compare_operands_directly() {
        assert_eq!(compare_operands("10", "9"), Some(Ordering::Greater));
        assert_eq!(compare_operands("2024-01-01", "2023-12-31"), Some(Ordering::Greater));
        assert_eq!(compare_operands("apple", "Banana"), Some(Ordering::Less));
        assert_eq!(compare_operands("5", "five"), None);
        assert_eq!(compare_operands("2024-01-01", "tomorrow"), None);
        assert_eq!(compare_operands("18", "2024-01-01"), None);
        assert_eq!(parse_number(" 1,000 "), Some(1000.0));
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_equality_ignores_case_and_padding() {
        let store = store_with(&[("name", " Bob ")]);
        assert_eq!(evaluate("name.equals(bob)", &store), Outcome::True);
        assert_eq!(evaluate("name.notequals(BOB)", &store), Outcome::False);
        assert_eq!(evaluate("name.notequals(alice)", &store), Outcome::True);
    }

    #[test]
    fn test_contains_on_text_and_lists() {
        let mut store = store_with(&[("note", "This is URGENT")]);
        store.set("tags", vec!["vip", "new"], Scope::Customer);

        assert_eq!(evaluate("note.contains(urgent)", &store), Outcome::True);
        assert_eq!(evaluate("note.notcontains(urgent)", &store), Outcome::False);
        assert_eq!(evaluate("tags.contains(vip)", &store), Outcome::True);
        assert_eq!(evaluate("tags.contains(vi)", &store), Outcome::False);
        assert_eq!(evaluate("tags.notcontains(old)", &store), Outcome::True);
    }

    #[test]
    fn test_empty_checks_treat_missing_as_empty() {
        let store = store_with(&[("blank", "   "), ("phone", "555")]);
        assert_eq!(evaluate("missing.empty", &store), Outcome::True);
        assert_eq!(evaluate("missing.notempty", &store), Outcome::False);
        assert_eq!(evaluate("blank.empty", &store), Outcome::True);
        assert_eq!(evaluate("phone.notempty", &store), Outcome::True);
    }

    #[test]
    fn test_missing_variables_are_unknown() {
        let store = VariableStore::new();
        assert_eq!(evaluate("missing", &store), Outcome::Unknown);
        assert_eq!(evaluate("missing.equals(1)", &store), Outcome::Unknown);
    }

    #[test]
    fn test_truthiness() {
        let store = store_with(&[("on", "Yes"), ("off", "no"), ("zero", "0"), ("word", "anything")]);
        assert_eq!(evaluate("on", &store), Outcome::True);
        assert_eq!(evaluate("off", &store), Outcome::False);
        assert_eq!(evaluate("zero", &store), Outcome::False);
        assert_eq!(evaluate("~word~", &store), Outcome::True);
    }

    #[test]
    fn test_param_interpolation() {
        let store = store_with(&[("age", "18"), ("minimum", "18"), ("plan", "gold"), ("wanted", "GOLD")]);
        assert_eq!(evaluate("age.greaterthanequalto(~minimum~)", &store), Outcome::True);
        assert_eq!(evaluate("age.greaterthan(~minimum~)", &store), Outcome::False);
        assert_eq!(evaluate("plan.equals(~#wanted#~)", &store), Outcome::True);
    }

    #[test]
    fn test_or_and_short_circuit() {
        let store = store_with(&[("a", "0"), ("b", "2")]);
        assert_eq!(evaluate("a.equals(1).or.b.equals(2)", &store), Outcome::True);
        assert_eq!(evaluate("a.equals(1) .OR. b.equals(3)", &store), Outcome::False);
        assert_eq!(evaluate("a.equals(0).and.b.equals(2)", &store), Outcome::True);
        assert_eq!(evaluate("a.equals(0).AND.missing.equals(2)", &store), Outcome::False);
        assert_eq!(evaluate("missing.equals(1).or.b.equals(2)", &store), Outcome::True);
    }

    #[test]
    fn test_mixed_operators_are_not_precedence_aware() {
        // Split on the first `.or.` only: the second clause swallows the `.and.`.
        let store = store_with(&[("a", "0"), ("b", "2"), ("c", "3")]);
        assert_eq!(
            evaluate("a.equals(1).or.b.equals(2).and.c.equals(3)", &store),
            Outcome::False
        );

        let first_true = store_with(&[("a", "1")]);
        assert_eq!(
            evaluate("a.equals(1).or.b.equals(2).and.c.equals(3)", &first_true),
            Outcome::True
        );
    }

    #[test]
    fn test_invalid_formulas_are_unknown() {
        let store = store_with(&[("age", "30")]);
        assert_eq!(evaluate("", &store), Outcome::Unknown);
        assert_eq!(evaluate("   ", &store), Outcome::Unknown);
        assert_eq!(evaluate("age is over 18", &store), Outcome::Unknown);
        assert_eq!(evaluate("age.frobnicate(3)", &store), Outcome::Unknown);
        assert_eq!(Outcome::Unknown.to_string(), "unknown");
    }
}
