//! Layer 2: lexical symbols.
//!
//! [`CalcLexer`] runs a small automaton over the [`Classifier`] for every
//! symbol it fetches. The automaton works on the shared stacks: digits and
//! letters are accepted onto the attribute stack and combined by reductions,
//! and when it halts the finished attribute is lifted into the lexer's side
//! buffer, where it waits until the parser accepts the symbol.
//!
//! The lexer's grammar has no error states: every character class either
//! extends the current symbol or ends it.

use crate::classifier::{CharClass, Classifier};
use crate::source::LineSource;
use crate::CalcError;
use gramrt::{
    AbortOnError, AttrStack, Automaton, AutomatonState, ExecStats, Executor, Outcome, Position,
    ProviderCtx, Span, StackConfig, StackError, Stacks, Step, SymbolProvider,
    Value,
};
use smartstring::alias::String;
use std::fmt;
use std::marker::PhantomData;

/// Lexical symbols, in the order the parsers' range tests depend on.
///
/// `AddOp` ..= `DecimalPoint` are character classes passed on unchanged.
/// Operators and `OtherCharacter` carry a `Char`, `Number` a `Number` and
/// `Identifier` a `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LexSymbol {
    AddOp,
    SubOp,
    MultOp,
    DivOp,
    PowOp,
    OtherCharacter,
    RightParen,
    EndOfLine,
    EqualChar,
    LTChar,
    GTChar,
    LeftParen,
    DecimalPoint,
    Number,
    Identifier,
}

impl LexSymbol {
    /// Number of attribute cells the symbol carries.
    pub fn arity(self) -> usize {
        match self {
            LexSymbol::AddOp
            | LexSymbol::SubOp
            | LexSymbol::MultOp
            | LexSymbol::DivOp
            | LexSymbol::PowOp
            | LexSymbol::OtherCharacter
            | LexSymbol::Number
            | LexSymbol::Identifier => 1,
            _ => 0,
        }
    }

    pub fn is_operator(self) -> bool {
        self <= LexSymbol::PowOp
    }

    pub fn operator_char(self) -> Option<char> {
        match self {
            LexSymbol::AddOp => Some('+'),
            LexSymbol::SubOp => Some('-'),
            LexSymbol::MultOp => Some('*'),
            LexSymbol::DivOp => Some('/'),
            LexSymbol::PowOp => Some('^'),
            _ => None,
        }
    }

    /// The symbol a character class stands for on its own. `None` for digits
    /// and letters, which only occur inside numbers and identifiers.
    pub fn passed_on(class: CharClass) -> Option<LexSymbol> {
        Some(match class {
            CharClass::AddOp => LexSymbol::AddOp,
            CharClass::SubOp => LexSymbol::SubOp,
            CharClass::MultOp => LexSymbol::MultOp,
            CharClass::DivOp => LexSymbol::DivOp,
            CharClass::PowOp => LexSymbol::PowOp,
            CharClass::OtherCharacter => LexSymbol::OtherCharacter,
            CharClass::RightParen => LexSymbol::RightParen,
            CharClass::EndOfLine => LexSymbol::EndOfLine,
            CharClass::EqualChar => LexSymbol::EqualChar,
            CharClass::LTChar => LexSymbol::LTChar,
            CharClass::GTChar => LexSymbol::GTChar,
            CharClass::LeftParen => LexSymbol::LeftParen,
            CharClass::DecimalPoint => LexSymbol::DecimalPoint,
            CharClass::Digit | CharClass::Letter => return None,
        })
    }
}

/// Single-character symbols print as that character, the rest by name.
impl fmt::Display for LexSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LexSymbol::AddOp => "+",
            LexSymbol::SubOp => "-",
            LexSymbol::MultOp => "*",
            LexSymbol::DivOp => "/",
            LexSymbol::PowOp => "^",
            LexSymbol::RightParen => ")",
            LexSymbol::EqualChar => "=",
            LexSymbol::LTChar => "<",
            LexSymbol::GTChar => ">",
            LexSymbol::LeftParen => "(",
            LexSymbol::DecimalPoint => ".",
            other => return fmt::Debug::fmt(other, f),
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Start = 1,
    Integer,
    Fraction,
    FractionDigits,
    Identifier,
}

impl From<LexState> for usize {
    fn from(s: LexState) -> usize {
        s as usize
    }
}

impl AutomatonState for LexState {
    fn description(self) -> &'static str {
        match self {
            LexState::Start => "Symbol = ▲Number | ▲Identifier | ▲passed-on character",
            LexState::Integer => {
                "Number = integer ▲ | integer ▲\".\" | integer ▲\".\" integer; integer = integer ▲Digit"
            }
            LexState::Fraction => "Number = integer \".\" ▲ | integer \".\" ▲integer",
            LexState::FractionDigits => {
                "Number = integer \".\" integer ▲; integer = integer ▲Digit"
            }
            LexState::Identifier => "Identifier = Identifier ▲(Letter | Digit) | Identifier ▲",
        }
    }
}

fn digit_value(c: char) -> f64 {
    c.to_digit(10).map_or(0.0, f64::from)
}

/// integer(value, length) = Digit(c)
fn first_digit(a: &mut AttrStack<Value>) -> Result<(), StackError> {
    let d = digit_value(a.char(-1)?);
    a.set(-1, Value::Number(d))?;
    a.set(0, Value::Int(1))
}

/// integer(value, length) = integer(value, length), Digit(c)
fn next_digit(a: &mut AttrStack<Value>) -> Result<(), StackError> {
    let value = a.number(-2)? * 10.0 + digit_value(a.char(0)?);
    let length = a.int(-1)? + 1;
    a.set(-2, Value::Number(value))?;
    a.set(-1, Value::Int(length))
}

/// Number(value) = integer(value, _), ".", integer(digits, n)
fn join_fraction(a: &mut AttrStack<Value>) -> Result<(), StackError> {
    let fraction = a.number(-1)? / 10f64.powi(a.int(0)?);
    let value = a.number(-3)? + fraction;
    a.set(-3, Value::Number(value))
}

struct LexAutomaton<L> {
    _source: PhantomData<fn() -> L>,
}

impl<L> LexAutomaton<L> {
    fn new() -> Self {
        Self {
            _source: PhantomData,
        }
    }
}

impl<L: LineSource> Automaton for LexAutomaton<L> {
    type Provider = Classifier<L>;
    type State = LexState;
    type Output = LexSymbol;
    type Context = ();
    type Error = CalcError;

    fn start_state(&self) -> LexState {
        LexState::Start
    }

    fn step(
        &mut self,
        state: LexState,
        input: &mut Classifier<L>,
        stacks: &mut Stacks<Value>,
        _ctx: &mut (),
    ) -> Result<Step<LexState, LexSymbol, CharClass>, CalcError> {
        let class = input.peek(stacks)?;
        match state {
            LexState::Start => match class {
                CharClass::Digit => {
                    input.accept(stacks);
                    stacks.attrs.reduce(1, 2, first_digit)?;
                    Ok(Step::Goto(LexState::Integer))
                }
                CharClass::Letter => {
                    input.accept(stacks);
                    stacks.attrs.reduce(1, 1, |a| -> Result<(), StackError> {
                        let mut identifier = String::new();
                        identifier.push(a.char(0)?);
                        a.set(0, Value::Text(identifier))
                    })?;
                    Ok(Step::Goto(LexState::Identifier))
                }
                _ => {
                    let Some(symbol) = LexSymbol::passed_on(class) else {
                        return Ok(Step::Reject(class));
                    };
                    input.accept(stacks);
                    if let Some(op) = symbol.operator_char() {
                        stacks.attrs.push(Value::Char(op));
                    }
                    Ok(Step::Halt(symbol))
                }
            },
            LexState::Integer => match class {
                CharClass::DecimalPoint => {
                    input.accept(stacks);
                    Ok(Step::Goto(LexState::Fraction))
                }
                CharClass::Digit => {
                    input.accept(stacks);
                    stacks.attrs.reduce(3, 2, next_digit)?;
                    Ok(Step::Goto(LexState::Integer))
                }
                _ => {
                    stacks.attrs.free(1)?;
                    Ok(Step::Halt(LexSymbol::Number))
                }
            },
            LexState::Fraction => match class {
                CharClass::Digit => {
                    input.accept(stacks);
                    stacks.attrs.reduce(1, 2, first_digit)?;
                    Ok(Step::Goto(LexState::FractionDigits))
                }
                _ => {
                    stacks.attrs.free(1)?;
                    Ok(Step::Halt(LexSymbol::Number))
                }
            },
            LexState::FractionDigits => match class {
                CharClass::Digit => {
                    input.accept(stacks);
                    stacks.attrs.reduce(3, 2, next_digit)?;
                    Ok(Step::Goto(LexState::FractionDigits))
                }
                _ => {
                    stacks.attrs.reduce(4, 1, join_fraction)?;
                    Ok(Step::Halt(LexSymbol::Number))
                }
            },
            LexState::Identifier => match class {
                CharClass::Digit | CharClass::Letter => {
                    input.accept(stacks);
                    stacks.attrs.reduce(2, 1, |a| -> Result<(), StackError> {
                        let c = a.char(0)?;
                        a.peek_mut(-1)?.as_text_mut(-1)?.push(c);
                        Ok(())
                    })?;
                    Ok(Step::Goto(LexState::Identifier))
                }
                _ => Ok(Step::Halt(LexSymbol::Identifier)),
            },
        }
    }
}

/// Symbol source of the calculator parsers.
pub struct CalcLexer<L> {
    ctx: ProviderCtx<LexSymbol, Value>,
    classifier: Classifier<L>,
    automaton: LexAutomaton<L>,
    exec: Executor,
    span: Span,
    lexeme: String,
}

impl<L: LineSource> CalcLexer<L> {
    pub fn new(source: L) -> Self {
        Self::with_config(source, &StackConfig::default())
    }

    pub fn with_config(source: L, config: &StackConfig) -> Self {
        Self {
            ctx: ProviderCtx::with_config(config),
            classifier: Classifier::with_ctx(source, ProviderCtx::with_config(config)),
            automaton: LexAutomaton::new(),
            exec: Executor::new(),
            span: Span::default(),
            lexeme: String::new(),
        }
    }

    /// `false` once the input is exhausted and no symbol is pending.
    pub fn has_input(&mut self) -> Result<bool, CalcError> {
        if !self.is_accepted() {
            return Ok(true);
        }
        self.classifier.has_input()
    }

    /// Source range of the most recently fetched symbol.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn position(&self) -> Position {
        self.classifier.position()
    }

    /// Statistics of the lexer automaton over all symbols so far.
    pub fn exec_stats(&self) -> ExecStats {
        self.exec.stats()
    }

    /// Source text of the most recently fetched symbol, as written.
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Skips the rest of the current line and returns it, starting with the
    /// source text of a pending symbol.
    pub fn remaining_of_line(&mut self) -> String {
        let mut text = String::new();
        if !self.is_accepted() {
            text.push_str(&self.lexeme);
            self.discard();
        }
        text.push_str(&self.classifier.remaining_of_line());
        text
    }
}

impl<L: LineSource> SymbolProvider for CalcLexer<L> {
    type Symbol = LexSymbol;
    type Value = Value;
    type Error = CalcError;

    fn ctx(&self) -> &ProviderCtx<LexSymbol, Value> {
        &self.ctx
    }

    fn ctx_mut(&mut self) -> &mut ProviderCtx<LexSymbol, Value> {
        &mut self.ctx
    }

    fn fetch(&mut self, stacks: &mut Stacks<Value>) -> Result<LexSymbol, CalcError> {
        let start = self.classifier.position();
        self.classifier.take_lexeme();
        let outcome = self.exec.run(
            &mut self.automaton,
            &mut self.classifier,
            stacks,
            &mut (),
            &mut AbortOnError,
        )?;
        let Outcome::Complete(symbol) = outcome else {
            return Err(CalcError::LexerRejected);
        };
        self.ctx.stage_from(&mut stacks.attrs, symbol.arity())?;
        self.span = Span::new(start, self.classifier.position());
        self.lexeme = self.classifier.take_lexeme();
        log::trace!("lexed {:?} at {}", symbol, self.span.display());
        Ok(symbol)
    }
}
