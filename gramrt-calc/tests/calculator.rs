use gramrt::{Outcome, Stacks, SymbolProvider};
use gramrt_calc::{
    CalcLexer, Calculator, Evaluation, LexSymbol, Mode, ReaderLines, Statement, StrLines,
};
use proptest::prelude::*;

const MODES: [Mode; 2] = [Mode::Static, Mode::Dynamic];

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn evaluate(text: &str, mode: Mode) -> Vec<Evaluation> {
    Calculator::new(StrLines::new(text), mode)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn values(text: &str, mode: Mode) -> Vec<Option<f64>> {
    evaluate(text, mode)
        .into_iter()
        .map(|e| e.outcome.complete().map(|s| s.value()))
        .collect()
}

#[test]
fn lexer_splits_a_formula() {
    init_logger();
    use LexSymbol::*;
    let mut stacks = Stacks::new();
    let mut lexer = CalcLexer::new(StrLines::new("12+99/3/-3"));
    let mut symbols = Vec::new();
    while lexer.has_input().unwrap() {
        symbols.push(lexer.peek(&mut stacks).unwrap());
        lexer.discard();
    }
    assert_eq!(
        symbols,
        vec![Number, AddOp, Number, DivOp, Number, DivOp, SubOp, Number, EndOfLine]
    );
    assert!(stacks.attrs.is_empty());
    assert!(stacks.states.is_empty());
}

#[test]
fn evaluates_with_precedence_in_both_modes() {
    init_logger();
    for mode in MODES {
        let results = evaluate("12+99/3/-3", mode);
        let Outcome::Complete(Statement::Expression {
            value,
            infix,
            postfix,
        }) = &results[0].outcome
        else {
            panic!("expected an expression in {mode:?} mode");
        };
        assert_eq!(*value, 1.0);
        assert_eq!(postfix.as_str(), " 12 99 3 / 3 u- / +");
        assert_eq!(infix.as_str(), " (12+ ( (99/3) / (-3) ) ) ");
        assert!(results[0].ignored.is_none());
    }
}

#[test]
fn power_is_right_associative() {
    for mode in MODES {
        assert_eq!(
            values("2^3^2\n2^3*2\n2*3^2", mode),
            vec![Some(512.0), Some(16.0), Some(18.0)]
        );
    }
}

#[test]
fn subtraction_and_division_are_left_associative() {
    for mode in MODES {
        assert_eq!(
            values("10-4-3\n64/4/2\n1-2+3", mode),
            vec![Some(3.0), Some(8.0), Some(2.0)]
        );
    }
}

#[test]
fn parentheses_and_signs() {
    for mode in MODES {
        assert_eq!(
            values("(1+2)*3\n-(2+3)*2\n+4-(-1)\n((7))", mode),
            vec![Some(9.0), Some(-10.0), Some(5.0), Some(7.0)]
        );
    }
}

#[test]
fn names_persist_across_lines() {
    for mode in MODES {
        let mut calc = Calculator::new(StrLines::new("x=4\nx*x\nx=x+1\nx"), mode);
        let results: Vec<Statement> = (&mut calc)
            .map(|e| e.unwrap().outcome.complete().unwrap())
            .collect();
        assert!(matches!(
            &results[0],
            Statement::Assignment { name, value, reassigned: false, .. }
                if name.as_str() == "x" && *value == 4.0
        ));
        assert_eq!(results[1].value(), 16.0);
        assert!(matches!(
            &results[2],
            Statement::Assignment { value, reassigned: true, .. } if *value == 5.0
        ));
        assert_eq!(results[3].value(), 5.0);
        assert_eq!(calc.names().get("x"), Some(5.0));
        assert_eq!(calc.names().len(), 1);
    }
}

#[test]
fn undefined_name_is_nan() {
    for mode in MODES {
        let results = evaluate("z+1", mode);
        let statement = results[0].outcome.clone().complete().unwrap();
        assert!(statement.value().is_nan());
        assert_eq!(statement.postfix(), " NaN 1 +");
    }
}

#[test]
fn rejected_line_leaves_stacks_unchanged() {
    init_logger();
    for mode in MODES {
        let mut calc = Calculator::new(StrLines::new("#\n1+1"), mode);
        let first = calc.evaluate_next().unwrap().unwrap();
        assert_eq!(first.outcome, Outcome::Rejected);
        assert_eq!(first.ignored.as_deref(), Some("#"));
        assert_eq!(first.diagnostics.len(), 1);
        assert!(first.diagnostics[0].contains("parser state 1"));
        assert!(calc.stacks().attrs.is_empty());
        assert!(calc.stacks().states.is_empty());

        let second = calc.evaluate_next().unwrap().unwrap();
        assert_eq!(second.outcome.complete().unwrap().value(), 2.0);
        assert!(second.diagnostics.is_empty());
        assert!(calc.evaluate_next().unwrap().is_none());
    }
}

#[test]
fn remaining_characters_are_ignored() {
    for mode in MODES {
        let results = evaluate("4 5\n1+2)*3\n3.5.2", mode);
        let ignored: Vec<Option<&str>> = results.iter().map(|e| e.ignored.as_deref()).collect();
        assert_eq!(ignored, vec![Some(" 5"), Some(")*3"), Some(".2")]);
        let got: Vec<f64> = results
            .iter()
            .map(|e| e.outcome.clone().complete().unwrap().value())
            .collect();
        assert_eq!(got, vec![4.0, 3.0, 3.5]);
    }
}

#[test]
fn empty_line_is_rejected() {
    for mode in MODES {
        let results = evaluate("\n2", mode);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].outcome, Outcome::Rejected);
        assert!(results[0].ignored.is_none());
        assert_eq!(results[1].outcome.clone().complete().unwrap().value(), 2.0);
    }
}

#[test]
fn reads_from_a_buffered_reader() {
    let input = "a=2\r\na^10\r\n".as_bytes();
    let results: Vec<f64> = Calculator::new(ReaderLines::new(input), Mode::Dynamic)
        .map(|e| e.unwrap().outcome.complete().unwrap().value())
        .collect();
    assert_eq!(results, vec![2.0, 1024.0]);
}

fn formula() -> impl Strategy<Value = String> {
    let leaf = (1u32..100).prop_map(|n| n.to_string());
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(vec!['+', '-', '*', '/', '^']), inner.clone())
                .prop_map(|(a, op, b)| format!("{a}{op}{b}")),
            inner.clone().prop_map(|a| format!("({a})")),
            inner.prop_map(|a| format!("-({a})")),
        ]
    })
}

proptest! {
    #[test]
    fn static_and_dynamic_agree(text in formula()) {
        let by_static = evaluate(&text, Mode::Static).remove(0).outcome;
        let by_dynamic = evaluate(&text, Mode::Dynamic).remove(0).outcome;
        match (by_static, by_dynamic) {
            (Outcome::Complete(s), Outcome::Complete(d)) => {
                prop_assert_eq!(s.infix(), d.infix());
                prop_assert_eq!(s.postfix(), d.postfix());
                let (a, b) = (s.value(), d.value());
                prop_assert!(a == b || (a.is_nan() && b.is_nan()), "{} vs {}", a, b);
            }
            (Outcome::Rejected, Outcome::Rejected) => {}
            (s, d) => prop_assert!(false, "{:?} vs {:?}", s, d),
        }
    }
}
