//! # Calculator Parsers
//!
//! Layer 3 of the calculator: an automaton over [`LexSymbol`]s that evaluates
//! one formula per line. Two automata recognize the same language:
//!
//! - the **static** parser has one rule per binary operator, with operator
//!   precedence and associativity settled when the automaton was built;
//! - the **dynamic** parser has a single binary rule and decides each
//!   shift/reduce conflict at run time, comparing the binding power stored
//!   with the left operator against that of the lookahead.
//!
//! Grammar (both modes):
//!
//! ```text
//! Start      = Expression | Identifier "=" Expression
//! Expression = Primary | ("+" | "-") Primary | Expression op Expression
//! Primary    = "(" Expression ")" | Number | Identifier
//! op         = "+" | "-" | "*" | "/" | "^"
//! ```
//!
//! Completing `Start` has the lowest priority, so a formula extends as far
//! as the line allows. Parsing stops at the first symbol that cannot continue
//! the formula; the rest of the line is skipped and reported in
//! [`Evaluation::ignored`].
//!
//! [`Calculator`] owns the stacks, the lexer and the table of defined names
//! of one session and runs the selected automaton once per line.

mod actions;
mod dynamic_calc;
mod static_calc;

pub use actions::{CalcCtx, Statement};

use crate::{CalcError, CalcLexer, LexSymbol, LineSource, SymTab};
use dynamic_calc::DynamicCalc;
use gramrt::{
    ErrorHandler, ExecStats, Executor, Outcome, Rejection, Resume, StackConfig, Stacks, Value,
};
use smartstring::alias::String;
use static_calc::StaticCalc;

/// Which parser evaluates the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Precedence baked into the automaton.
    Static,
    /// Precedence decided at run time from stored binding powers.
    #[default]
    Dynamic,
}

/// Result of evaluating one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub outcome: Outcome<Statement>,
    /// Text left on the line after the parse ended, if any.
    pub ignored: Option<String>,
    /// Messages recorded by the error handler.
    pub diagnostics: Vec<std::string::String>,
}

/// Error handler that reports each rejection and aborts the line.
#[derive(Debug, Clone, Default)]
pub struct ReportErrors {
    pub messages: Vec<std::string::String>,
}

impl<L: LineSource> ErrorHandler<CalcLexer<L>> for ReportErrors {
    fn on_reject(&mut self, rejection: &Rejection<LexSymbol>, input: &mut CalcLexer<L>) -> Resume {
        let message = format!(
            "illegal symbol \"{}\" in parser state {}:\n{}",
            rejection.symbol, rejection.state_id, rejection.description
        );
        log::warn!("{} ({})", message, input.span().display());
        self.messages.push(message);
        Resume::Abort
    }
}

/// A calculator session over a line source.
///
/// # Example
/// ```rust
/// # use gramrt_calc::{Calculator, Mode, StrLines};
/// let mut calc = Calculator::new(StrLines::new("x=2^10\nx/4"), Mode::Dynamic);
/// let first = calc.evaluate_next().unwrap().unwrap();
/// assert_eq!(first.outcome.complete().unwrap().value(), 1024.0);
/// let second = calc.evaluate_next().unwrap().unwrap();
/// assert_eq!(second.outcome.complete().unwrap().value(), 256.0);
/// assert!(calc.evaluate_next().unwrap().is_none());
/// ```
pub struct Calculator<L> {
    stacks: Stacks<Value>,
    lexer: CalcLexer<L>,
    ctx: CalcCtx,
    exec: Executor,
    mode: Mode,
    static_calc: StaticCalc<L>,
    dynamic_calc: DynamicCalc<L>,
}

impl<L: LineSource> Calculator<L> {
    pub fn new(source: L, mode: Mode) -> Self {
        Self::with_config(source, mode, &StackConfig::default())
    }

    pub fn with_config(source: L, mode: Mode, config: &StackConfig) -> Self {
        Self {
            stacks: Stacks::with_config(config),
            lexer: CalcLexer::with_config(source, config),
            ctx: CalcCtx::new(),
            exec: Executor::new(),
            mode,
            static_calc: StaticCalc::new(),
            dynamic_calc: DynamicCalc::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Evaluates the next formula. `None` at end of input.
    ///
    /// A rejected formula is not an error: it yields an [`Evaluation`] with
    /// [`Outcome::Rejected`] and the handler's diagnostics. Either way the
    /// rest of the line is skipped, so the next call starts on a new line.
    pub fn evaluate_next(&mut self) -> Result<Option<Evaluation>, CalcError> {
        if !self.lexer.has_input()? {
            return Ok(None);
        }
        self.ctx.postfix.clear();
        let mut handler = ReportErrors::default();
        log::debug!("evaluating line {} in {:?} mode", self.lexer.position().line, self.mode);
        let outcome = match self.mode {
            Mode::Static => self.exec.run(
                &mut self.static_calc,
                &mut self.lexer,
                &mut self.stacks,
                &mut self.ctx,
                &mut handler,
            ),
            Mode::Dynamic => self.exec.run(
                &mut self.dynamic_calc,
                &mut self.lexer,
                &mut self.stacks,
                &mut self.ctx,
                &mut handler,
            ),
        };
        let rest = self.lexer.remaining_of_line();
        let outcome = outcome?;
        let ignored = (!rest.is_empty()).then_some(rest);
        if let Some(text) = &ignored {
            log::debug!("remaining characters ignored: {:?}", text);
        }
        Ok(Some(Evaluation {
            outcome,
            ignored,
            diagnostics: handler.messages,
        }))
    }

    /// The table of defined names.
    pub fn names(&self) -> &SymTab {
        &self.ctx.names
    }

    pub fn stacks(&self) -> &Stacks<Value> {
        &self.stacks
    }

    /// Statistics of the parser automata.
    pub fn parser_stats(&self) -> ExecStats {
        self.exec.stats()
    }

    /// Statistics of the lexer automaton.
    pub fn lexer_stats(&self) -> ExecStats {
        self.lexer.exec_stats()
    }
}

impl<L: LineSource> Iterator for Calculator<L> {
    type Item = Result<Evaluation, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.evaluate_next().transpose()
    }
}
