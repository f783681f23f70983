//! Calculator parser with dynamic priorities.
//!
//! One rule `Expression = Expression OperatorPriority op Expression` covers
//! all five binary operators. `OperatorPriority` derives the empty string;
//! its attribute is the binding power of the operator that follows, stored
//! when the operator is shifted. Each shift/reduce decision compares that
//! stored power, adjusted for associativity, against the power of the new
//! lookahead through a [`Resolver`].

use super::actions::{self, ASSIGNMENT_PRIORITY, CalcCtx, COMPLETE_PRIORITY, Statement};
use crate::{CalcError, CalcLexer, LexSymbol, LineSource};
use gramrt::{Automaton, AutomatonState, Resolver, Stacks, Step, SymbolProvider, Value};
use std::marker::PhantomData;

/// Resumption keys pushed by the states that expect an expression.
const KEY_START: u32 = 0;
const KEY_BINARY: u32 = 1;
const KEY_ASSIGN: u32 = 2;
const KEY_PAREN: u32 = 3;
const KEY_UNARY: u32 = 4;

/// Rule `Expression op Expression` takes six cells: value and infix of the
/// left operand, the stored priority, the operator, value and infix of the
/// right operand.
const BINARY_RHS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DynState {
    Start = 1,
    Completed,
    ExpectOperator,
    BinaryRhs,
    BinaryDone,
    AfterIdentifier,
    ExpectEqual,
    AssignRhs,
    AssignDone,
    ParenOpen,
    ParenDone,
    Unary,
}

impl From<DynState> for usize {
    fn from(s: DynState) -> usize {
        s as usize
    }
}

impl AutomatonState for DynState {
    fn description(self) -> &'static str {
        match self {
            DynState::Start => "Start = ▲Expression | ▲Identifier \"=\" Expression",
            DynState::Completed => {
                "Start = Expression▲; Expression = Expression ▲OperatorPriority op Expression"
            }
            DynState::ExpectOperator => {
                "Expression = Expression OperatorPriority ▲op Expression"
            }
            DynState::BinaryRhs => "Expression = Expression OperatorPriority op ▲Expression",
            DynState::BinaryDone => {
                "Expression = Expression OperatorPriority op Expression▲; \
                 Expression = Expression ▲OperatorPriority op Expression"
            }
            DynState::AfterIdentifier => {
                "Start = Identifier ▲\"=\" Expression; Primary = Identifier▲"
            }
            DynState::ExpectEqual => "Start = Identifier ▲\"=\" Expression",
            DynState::AssignRhs => "Start = Identifier \"=\" ▲Expression",
            DynState::AssignDone => {
                "Start = Identifier \"=\" Expression▲; \
                 Expression = Expression ▲OperatorPriority op Expression"
            }
            DynState::ParenOpen => "Primary = \"(\" ▲Expression \")\"",
            DynState::ParenDone => {
                "Expression = Expression ▲OperatorPriority op Expression; \
                 Primary = \"(\" Expression ▲\")\""
            }
            DynState::Unary => "Expression = (\"+\" | \"-\") ▲Primary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Reduce,
    Shift,
}

pub(crate) struct DynamicCalc<L> {
    _source: PhantomData<fn() -> L>,
}

impl<L> DynamicCalc<L> {
    pub(crate) fn new() -> Self {
        Self {
            _source: PhantomData,
        }
    }
}

type DynStep = Step<DynState, Statement, LexSymbol>;

impl<L: LineSource> DynamicCalc<L> {
    /// Dispatch of the states expecting an expression.
    fn operand(
        symbol: LexSymbol,
        input: &mut CalcLexer<L>,
        stacks: &mut Stacks<Value>,
        ctx: &mut CalcCtx,
        done: DynState,
    ) -> Result<DynStep, CalcError> {
        match symbol {
            s if s <= LexSymbol::SubOp => {
                input.accept(stacks);
                Ok(Step::Goto(DynState::Unary))
            }
            LexSymbol::LeftParen => {
                input.accept(stacks);
                Ok(Step::Goto(DynState::ParenOpen))
            }
            LexSymbol::Number => {
                input.accept(stacks);
                actions::number_primary(&mut stacks.attrs, ctx)?;
                Ok(Step::Goto(done))
            }
            LexSymbol::Identifier => {
                input.accept(stacks);
                actions::identifier_primary(&mut stacks.attrs, ctx)?;
                Ok(Step::Goto(done))
            }
            other => Ok(Step::Reject(other)),
        }
    }

    /// Continues after a complete expression, according to the state that
    /// started it.
    fn branch(stacks: &mut Stacks<Value>, ctx: &mut CalcCtx) -> Result<DynStep, CalcError> {
        loop {
            let next = match stacks.states.peek()? {
                KEY_BINARY => DynState::BinaryDone,
                KEY_ASSIGN => DynState::AssignDone,
                KEY_PAREN => DynState::ParenDone,
                KEY_UNARY => {
                    stacks.states.pop()?;
                    actions::unary(&mut stacks.attrs, ctx)?;
                    continue;
                }
                _ => DynState::Completed,
            };
            return Ok(Step::Goto(next));
        }
    }

    /// Reduces or shifts the lookahead operator, whichever has the higher
    /// priority. `reduce_priority` is only evaluated for operators.
    fn decide(
        symbol: LexSymbol,
        reduce_priority: impl FnOnce() -> i32,
    ) -> Result<Decision, CalcError> {
        if symbol >= LexSymbol::OtherCharacter {
            return Ok(Decision::Reduce);
        }
        let shift = actions::binding_power(symbol)?;
        Ok(Resolver::new()
            .computed(Decision::Reduce, reduce_priority)
            .fixed(Decision::Shift, shift)
            .select()
            .unwrap_or(Decision::Reduce))
    }

    /// OperatorPriority(p) = ε, then continue with the operator.
    fn shift(symbol: LexSymbol, stacks: &mut Stacks<Value>) -> Result<DynStep, CalcError> {
        let power = actions::binding_power(symbol)?;
        stacks.attrs.push(Value::Int(power));
        Ok(Step::Goto(DynState::ExpectOperator))
    }
}

impl<L: LineSource> Automaton for DynamicCalc<L> {
    type Provider = CalcLexer<L>;
    type State = DynState;
    type Output = Statement;
    type Context = CalcCtx;
    type Error = CalcError;

    fn start_state(&self) -> DynState {
        DynState::Start
    }

    fn step(
        &mut self,
        state: DynState,
        input: &mut CalcLexer<L>,
        stacks: &mut Stacks<Value>,
        ctx: &mut CalcCtx,
    ) -> Result<DynStep, CalcError> {
        match state {
            DynState::Start => {
                stacks.states.push(KEY_START);
                let symbol = input.peek(stacks)?;
                if symbol == LexSymbol::Identifier {
                    input.accept(stacks);
                    return Ok(Step::Goto(DynState::AfterIdentifier));
                }
                Self::operand(symbol, input, stacks, ctx, DynState::Completed)
            }
            DynState::Completed => {
                let symbol = input.peek(stacks)?;
                match Self::decide(symbol, || COMPLETE_PRIORITY)? {
                    Decision::Reduce => {
                        let statement = actions::finish_expression(&mut stacks.attrs, ctx)?;
                        stacks.states.pop()?;
                        Ok(Step::Halt(statement))
                    }
                    Decision::Shift => Self::shift(symbol, stacks),
                }
            }
            DynState::ExpectOperator => {
                let symbol = input.peek(stacks)?;
                if !symbol.is_operator() {
                    return Ok(Step::Reject(symbol));
                }
                input.accept(stacks);
                Ok(Step::Goto(DynState::BinaryRhs))
            }
            DynState::BinaryRhs => {
                stacks.states.push(KEY_BINARY);
                let symbol = input.peek(stacks)?;
                Self::operand(symbol, input, stacks, ctx, DynState::BinaryDone)
            }
            DynState::BinaryDone => {
                let symbol = input.peek(stacks)?;
                let power = stacks.attrs.int(-3)?;
                let op = stacks.attrs.char(-2)?;
                let decision =
                    Self::decide(symbol, || actions::binary_expression_priority(power, op))?;
                match decision {
                    Decision::Reduce => {
                        stacks.states.pop()?;
                        actions::binary(&mut stacks.attrs, ctx, BINARY_RHS)?;
                        Self::branch(stacks, ctx)
                    }
                    Decision::Shift => Self::shift(symbol, stacks),
                }
            }
            DynState::AfterIdentifier => {
                if input.peek(stacks)? == LexSymbol::EqualChar {
                    return Ok(Step::Goto(DynState::ExpectEqual));
                }
                actions::identifier_primary(&mut stacks.attrs, ctx)?;
                Ok(Step::Goto(DynState::Completed))
            }
            DynState::ExpectEqual => {
                let symbol = input.peek(stacks)?;
                if symbol != LexSymbol::EqualChar {
                    return Ok(Step::Reject(symbol));
                }
                input.accept(stacks);
                Ok(Step::Goto(DynState::AssignRhs))
            }
            DynState::AssignRhs => {
                stacks.states.push(KEY_ASSIGN);
                let symbol = input.peek(stacks)?;
                Self::operand(symbol, input, stacks, ctx, DynState::AssignDone)
            }
            DynState::AssignDone => {
                let symbol = input.peek(stacks)?;
                match Self::decide(symbol, || ASSIGNMENT_PRIORITY)? {
                    Decision::Reduce => {
                        stacks.states.pop()?;
                        let statement = actions::finish_assignment(&mut stacks.attrs, ctx)?;
                        stacks.states.pop()?;
                        Ok(Step::Halt(statement))
                    }
                    Decision::Shift => Self::shift(symbol, stacks),
                }
            }
            DynState::ParenOpen => {
                stacks.states.push(KEY_PAREN);
                let symbol = input.peek(stacks)?;
                Self::operand(symbol, input, stacks, ctx, DynState::ParenDone)
            }
            DynState::ParenDone => {
                let symbol = input.peek(stacks)?;
                if symbol.is_operator() {
                    return Self::shift(symbol, stacks);
                }
                if symbol != LexSymbol::RightParen {
                    return Ok(Step::Reject(symbol));
                }
                input.accept(stacks);
                stacks.states.pop()?;
                actions::parenthesize(&mut stacks.attrs)?;
                Self::branch(stacks, ctx)
            }
            DynState::Unary => {
                stacks.states.push(KEY_UNARY);
                let symbol = input.peek(stacks)?;
                match symbol {
                    LexSymbol::LeftParen => {
                        input.accept(stacks);
                        return Ok(Step::Goto(DynState::ParenOpen));
                    }
                    LexSymbol::Number => {
                        input.accept(stacks);
                        actions::number_primary(&mut stacks.attrs, ctx)?;
                    }
                    LexSymbol::Identifier => {
                        input.accept(stacks);
                        actions::identifier_primary(&mut stacks.attrs, ctx)?;
                    }
                    other => return Ok(Step::Reject(other)),
                }
                stacks.states.pop()?;
                actions::unary(&mut stacks.attrs, ctx)?;
                Self::branch(stacks, ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrLines;
    use gramrt::{AbortOnError, Executor, Outcome};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn parse(line: &str, ctx: &mut CalcCtx) -> Outcome<Statement> {
        init_logger();
        let mut stacks = Stacks::new();
        let mut lexer = CalcLexer::new(StrLines::new(line));
        let outcome = Executor::new()
            .run(
                &mut DynamicCalc::new(),
                &mut lexer,
                &mut stacks,
                ctx,
                &mut AbortOnError,
            )
            .unwrap();
        if outcome.is_complete() {
            assert!(stacks.attrs.is_empty(), "{}", stacks.attrs.dump());
            assert!(stacks.states.is_empty());
        }
        outcome
    }

    fn value(line: &str) -> f64 {
        parse(line, &mut CalcCtx::new())
            .complete()
            .map(|s| s.value())
            .unwrap_or(f64::NAN)
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(value("1+2*3"), 7.0);
        assert_eq!(value("2*3+1"), 7.0);
        assert_eq!(value("8-3-2"), 3.0);
        assert_eq!(value("16/4/2"), 2.0);
        assert_eq!(value("2^3^2"), 512.0);
        assert_eq!(value("2*3^2"), 18.0);
    }

    #[test]
    fn unary_and_parentheses() {
        assert_eq!(value("-3+5"), 2.0);
        assert_eq!(value("-(1+2)*2"), -6.0);
        assert_eq!(value("((4))"), 4.0);
        assert_eq!(value("2*(3+4)"), 14.0);
    }

    #[test]
    fn notations() {
        let statement = parse("12+99/3/-3", &mut CalcCtx::new()).complete().unwrap();
        assert_eq!(statement.value(), 1.0);
        assert_eq!(statement.postfix(), " 12 99 3 / 3 u- / +");
        assert_eq!(statement.infix(), " (12+ ( (99/3) / (-3) ) ) ");
    }

    #[test]
    fn assignment_and_lookup() {
        let mut ctx = CalcCtx::new();
        let first = parse("x=2+3", &mut ctx).complete().unwrap();
        assert!(matches!(
            first,
            Statement::Assignment {
                reassigned: false,
                ..
            }
        ));
        assert_eq!(ctx.names.get("x"), Some(5.0));
        let again = parse("x=x*x", &mut ctx).complete().unwrap();
        assert!(matches!(again, Statement::Assignment { reassigned: true, .. }));
        assert_eq!(again.value(), 25.0);
        let expr = parse("x", &mut ctx).complete().unwrap();
        assert!(matches!(expr, Statement::Expression { .. }));
        assert_eq!(expr.value(), 25.0);
    }

    #[test]
    fn rejections_unwind() {
        for line in ["#", "1+", "(1", "x=", "--1", "1*)"] {
            assert_eq!(
                parse(line, &mut CalcCtx::new()),
                Outcome::Rejected,
                "{line}"
            );
        }
    }

    #[test]
    fn stops_before_unexpected_symbol() {
        assert_eq!(value("1+2)"), 3.0);
        assert_eq!(value("4 5"), 4.0);
    }

    #[test]
    fn reduce_priority_is_computed_only_against_operators() {
        type Calc = DynamicCalc<StrLines>;
        let mut calls = 0;
        let mut decide = |symbol, priority| {
            Calc::decide(symbol, || {
                calls += 1;
                priority
            })
            .unwrap()
        };
        assert_eq!(decide(LexSymbol::EndOfLine, 11), Decision::Reduce);
        assert_eq!(decide(LexSymbol::RightParen, -99), Decision::Reduce);
        assert_eq!(decide(LexSymbol::MultOp, 11), Decision::Shift);
        assert_eq!(decide(LexSymbol::AddOp, 11), Decision::Reduce);
        assert_eq!(decide(LexSymbol::PowOp, 29), Decision::Shift);
        // equal priorities: the reduce is declared first
        assert_eq!(decide(LexSymbol::AddOp, 10), Decision::Reduce);
        assert_eq!(calls, 4);
    }
}
