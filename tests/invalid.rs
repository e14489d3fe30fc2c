use calc_formula::{EvaluationContext, FormulaError, FormulaEvaluator};

fn amount() -> EvaluationContext {
    EvaluationContext::new().with("Amount", 5)
}

#[test]
fn test_injection_like_input_is_rejected() {
    let ev = FormulaEvaluator::default();
    assert_eq!(ev.evaluate("Amount + 1; DROP TABLE", &amount()), None);
    assert!(matches!(
        ev.try_evaluate("Amount + 1; DROP TABLE", &amount()),
        Err(FormulaError::InvalidCharacters(_))
    ));
}

#[test]
fn test_code_like_input_is_rejected() {
    let ev = FormulaEvaluator::default();
    for f in [
        "Amount + process.exit(1)",
        "Amount, 1",
        "Amount ** 2",
        "Amount % 2",
        "Amount ^ 2",
        "1e3",
        "Infinity",
        "Amount = 3",
    ] {
        assert_eq!(ev.evaluate(f, &amount()), None, "{f}");
    }
}

#[test]
fn test_malformed_arithmetic_is_null() {
    let ev = FormulaEvaluator::default();
    for f in ["(Amount +", "Amount )", "Amount Amount", "()", "1..2", "* Amount"] {
        assert!(
            matches!(ev.try_evaluate(f, &amount()), Err(FormulaError::Syntax(_))),
            "{f}"
        );
    }
}

#[test]
fn test_zero_over_zero_is_null() {
    let row = EvaluationContext::new().with("A", 0).with("B", "0");
    assert_eq!(FormulaEvaluator::default().evaluate("A / B", &row), None);
}
