//! Calculator parser with static priorities.
//!
//! Every binary operator has its own rule and its own states. The rule
//! priorities (`+` 11, `-` 12, `*` 21, `/` 22, `^` 29) were weighed against
//! the lookahead levels (`+ -` 10, `* /` 20, `^` 30) when the automaton was
//! built, so each "done" state simply branches on the lookahead.

use super::actions::{self, CalcCtx, Statement};
use crate::{CalcError, CalcLexer, LexSymbol, LineSource};
use gramrt::{Automaton, AutomatonState, Stacks, Step, SymbolProvider, Value};
use std::marker::PhantomData;

const KEY_START: u32 = 0;
const KEY_POW: u32 = 1;
const KEY_ADD: u32 = 2;
const KEY_SUB: u32 = 3;
const KEY_DIV: u32 = 4;
const KEY_MUL: u32 = 5;
const KEY_ASSIGN: u32 = 6;
const KEY_PAREN: u32 = 7;
const KEY_MINUS: u32 = 8;
const KEY_PLUS: u32 = 9;

/// Cells of `Expression op Expression`.
const BINARY_RHS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StaticState {
    Start = 1,
    Completed,
    ExpectPow,
    PowRhs,
    PowDone,
    ExpectAddSub,
    AddRhs,
    AddDone,
    SubRhs,
    SubDone,
    ExpectMulDiv,
    DivRhs,
    DivDone,
    MulRhs,
    MulDone,
    AfterIdentifier,
    ExpectEqual,
    AssignRhs,
    AssignDone,
    ParenOpen,
    ParenDone,
    UnaryMinus,
    UnaryPlus,
}

impl From<StaticState> for usize {
    fn from(s: StaticState) -> usize {
        s as usize
    }
}

impl AutomatonState for StaticState {
    fn description(self) -> &'static str {
        use StaticState::*;
        match self {
            Start => "Start = ▲Expression | ▲Identifier \"=\" Expression",
            Completed => "Start = Expression▲; Expression = Expression ▲op Expression",
            ExpectPow => "Expression = Expression ▲\"^\" Expression",
            PowRhs => "Expression = Expression \"^\" ▲Expression",
            PowDone => "Expression = Expression \"^\" Expression▲ | Expression ▲\"^\" Expression",
            ExpectAddSub => "Expression = Expression ▲\"+\" Expression | Expression ▲\"-\" Expression",
            AddRhs => "Expression = Expression \"+\" ▲Expression",
            AddDone => "Expression = Expression \"+\" Expression▲ | Expression ▲op Expression",
            SubRhs => "Expression = Expression \"-\" ▲Expression",
            SubDone => "Expression = Expression \"-\" Expression▲ | Expression ▲op Expression",
            ExpectMulDiv => "Expression = Expression ▲\"*\" Expression | Expression ▲\"/\" Expression",
            DivRhs => "Expression = Expression \"/\" ▲Expression",
            DivDone => "Expression = Expression \"/\" Expression▲ | Expression ▲\"^\" Expression",
            MulRhs => "Expression = Expression \"*\" ▲Expression",
            MulDone => "Expression = Expression \"*\" Expression▲ | Expression ▲\"^\" Expression",
            AfterIdentifier => "Start = Identifier ▲\"=\" Expression; Primary = Identifier▲",
            ExpectEqual => "Start = Identifier ▲\"=\" Expression",
            AssignRhs => "Start = Identifier \"=\" ▲Expression",
            AssignDone => {
                "Start = Identifier \"=\" Expression▲; Expression = Expression ▲op Expression"
            }
            ParenOpen => "Primary = \"(\" ▲Expression \")\"",
            ParenDone => "Expression = Expression ▲op Expression; Primary = \"(\" Expression ▲\")\"",
            UnaryMinus => "Expression = \"-\" ▲Primary",
            UnaryPlus => "Expression = \"+\" ▲Primary",
        }
    }
}

/// Whether a "done" state shifts `symbol` rather than reducing.
fn shifts(state: StaticState, symbol: LexSymbol) -> bool {
    match state {
        StaticState::AddDone | StaticState::SubDone => matches!(
            symbol,
            LexSymbol::MultOp | LexSymbol::DivOp | LexSymbol::PowOp
        ),
        StaticState::MulDone | StaticState::DivDone | StaticState::PowDone => {
            symbol == LexSymbol::PowOp
        }
        _ => symbol.is_operator(),
    }
}

/// The state that accepts operator `symbol`.
fn expect_operator(symbol: LexSymbol) -> StaticState {
    match symbol {
        LexSymbol::AddOp | LexSymbol::SubOp => StaticState::ExpectAddSub,
        LexSymbol::PowOp => StaticState::ExpectPow,
        _ => StaticState::ExpectMulDiv,
    }
}

type StaticStep = Step<StaticState, Statement, LexSymbol>;

pub(crate) struct StaticCalc<L> {
    _source: PhantomData<fn() -> L>,
}

impl<L> StaticCalc<L> {
    pub(crate) fn new() -> Self {
        Self {
            _source: PhantomData,
        }
    }
}

impl<L: LineSource> StaticCalc<L> {
    fn operand(
        symbol: LexSymbol,
        input: &mut CalcLexer<L>,
        stacks: &mut Stacks<Value>,
        ctx: &mut CalcCtx,
        done: StaticState,
    ) -> Result<StaticStep, CalcError> {
        let next = match symbol {
            LexSymbol::AddOp => StaticState::UnaryPlus,
            LexSymbol::SubOp => StaticState::UnaryMinus,
            LexSymbol::LeftParen => StaticState::ParenOpen,
            LexSymbol::Number | LexSymbol::Identifier => done,
            other => return Ok(Step::Reject(other)),
        };
        input.accept(stacks);
        match symbol {
            LexSymbol::Number => actions::number_primary(&mut stacks.attrs, ctx)?,
            LexSymbol::Identifier => actions::identifier_primary(&mut stacks.attrs, ctx)?,
            _ => {}
        }
        Ok(Step::Goto(next))
    }

    fn branch(stacks: &mut Stacks<Value>, ctx: &mut CalcCtx) -> Result<StaticStep, CalcError> {
        loop {
            let next = match stacks.states.peek()? {
                KEY_POW => StaticState::PowDone,
                KEY_ADD => StaticState::AddDone,
                KEY_SUB => StaticState::SubDone,
                KEY_DIV => StaticState::DivDone,
                KEY_MUL => StaticState::MulDone,
                KEY_ASSIGN => StaticState::AssignDone,
                KEY_PAREN => StaticState::ParenDone,
                KEY_MINUS | KEY_PLUS => {
                    stacks.states.pop()?;
                    actions::unary(&mut stacks.attrs, ctx)?;
                    continue;
                }
                _ => StaticState::Completed,
            };
            return Ok(Step::Goto(next));
        }
    }

    /// Block of the states that close a binary rule.
    fn binary_done(
        state: StaticState,
        input: &mut CalcLexer<L>,
        stacks: &mut Stacks<Value>,
        ctx: &mut CalcCtx,
    ) -> Result<StaticStep, CalcError> {
        let symbol = input.peek(stacks)?;
        if shifts(state, symbol) {
            return Ok(Step::Goto(expect_operator(symbol)));
        }
        stacks.states.pop()?;
        actions::binary(&mut stacks.attrs, ctx, BINARY_RHS)?;
        Self::branch(stacks, ctx)
    }

    /// Block of the states that expect the right operand of a rule.
    fn rhs(
        key: u32,
        done: StaticState,
        input: &mut CalcLexer<L>,
        stacks: &mut Stacks<Value>,
        ctx: &mut CalcCtx,
    ) -> Result<StaticStep, CalcError> {
        stacks.states.push(key);
        let symbol = input.peek(stacks)?;
        Self::operand(symbol, input, stacks, ctx, done)
    }

    /// Block of the states that accept one of two operators.
    fn accept_either(
        input: &mut CalcLexer<L>,
        stacks: &mut Stacks<Value>,
        first: (LexSymbol, StaticState),
        second: (LexSymbol, StaticState),
    ) -> Result<StaticStep, CalcError> {
        let symbol = input.peek(stacks)?;
        let next = if symbol == first.0 {
            first.1
        } else if symbol == second.0 {
            second.1
        } else {
            return Ok(Step::Reject(symbol));
        };
        input.accept(stacks);
        Ok(Step::Goto(next))
    }
}

impl<L: LineSource> Automaton for StaticCalc<L> {
    type Provider = CalcLexer<L>;
    type State = StaticState;
    type Output = Statement;
    type Context = CalcCtx;
    type Error = CalcError;

    fn start_state(&self) -> StaticState {
        StaticState::Start
    }

    fn step(
        &mut self,
        state: StaticState,
        input: &mut CalcLexer<L>,
        stacks: &mut Stacks<Value>,
        ctx: &mut CalcCtx,
    ) -> Result<StaticStep, CalcError> {
        use StaticState::*;
        match state {
            Start => {
                stacks.states.push(KEY_START);
                let symbol = input.peek(stacks)?;
                if symbol == LexSymbol::Identifier {
                    input.accept(stacks);
                    return Ok(Step::Goto(AfterIdentifier));
                }
                Self::operand(symbol, input, stacks, ctx, Completed)
            }
            Completed => {
                let symbol = input.peek(stacks)?;
                if shifts(state, symbol) {
                    return Ok(Step::Goto(expect_operator(symbol)));
                }
                let statement = actions::finish_expression(&mut stacks.attrs, ctx)?;
                stacks.states.pop()?;
                Ok(Step::Halt(statement))
            }
            ExpectPow => {
                let symbol = input.peek(stacks)?;
                if symbol != LexSymbol::PowOp {
                    return Ok(Step::Reject(symbol));
                }
                input.accept(stacks);
                Ok(Step::Goto(PowRhs))
            }
            ExpectAddSub => Self::accept_either(
                input,
                stacks,
                (LexSymbol::AddOp, AddRhs),
                (LexSymbol::SubOp, SubRhs),
            ),
            ExpectMulDiv => Self::accept_either(
                input,
                stacks,
                (LexSymbol::MultOp, MulRhs),
                (LexSymbol::DivOp, DivRhs),
            ),
            PowRhs => Self::rhs(KEY_POW, PowDone, input, stacks, ctx),
            AddRhs => Self::rhs(KEY_ADD, AddDone, input, stacks, ctx),
            SubRhs => Self::rhs(KEY_SUB, SubDone, input, stacks, ctx),
            DivRhs => Self::rhs(KEY_DIV, DivDone, input, stacks, ctx),
            MulRhs => Self::rhs(KEY_MUL, MulDone, input, stacks, ctx),
            AssignRhs => Self::rhs(KEY_ASSIGN, AssignDone, input, stacks, ctx),
            ParenOpen => Self::rhs(KEY_PAREN, ParenDone, input, stacks, ctx),
            PowDone | AddDone | SubDone | DivDone | MulDone => {
                Self::binary_done(state, input, stacks, ctx)
            }
            AfterIdentifier => {
                if input.peek(stacks)? == LexSymbol::EqualChar {
                    return Ok(Step::Goto(ExpectEqual));
                }
                actions::identifier_primary(&mut stacks.attrs, ctx)?;
                Ok(Step::Goto(Completed))
            }
            ExpectEqual => {
                let symbol = input.peek(stacks)?;
                if symbol != LexSymbol::EqualChar {
                    return Ok(Step::Reject(symbol));
                }
                input.accept(stacks);
                Ok(Step::Goto(AssignRhs))
            }
            AssignDone => {
                let symbol = input.peek(stacks)?;
                if shifts(state, symbol) {
                    return Ok(Step::Goto(expect_operator(symbol)));
                }
                stacks.states.pop()?;
                let statement = actions::finish_assignment(&mut stacks.attrs, ctx)?;
                stacks.states.pop()?;
                Ok(Step::Halt(statement))
            }
            ParenDone => {
                let symbol = input.peek(stacks)?;
                if symbol.is_operator() {
                    return Ok(Step::Goto(expect_operator(symbol)));
                }
                if symbol != LexSymbol::RightParen {
                    return Ok(Step::Reject(symbol));
                }
                input.accept(stacks);
                stacks.states.pop()?;
                actions::parenthesize(&mut stacks.attrs)?;
                Self::branch(stacks, ctx)
            }
            UnaryMinus | UnaryPlus => {
                stacks.states.push(if state == UnaryMinus { KEY_MINUS } else { KEY_PLUS });
                let symbol = input.peek(stacks)?;
                match symbol {
                    LexSymbol::LeftParen => {
                        input.accept(stacks);
                        return Ok(Step::Goto(ParenOpen));
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
