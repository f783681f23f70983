//! The automaton driver.
//!
//! A generated (or hand-written) automaton is a set of states, each a basic
//! block that peeks the lookahead, branches on it, and then shifts, reduces or
//! rejects. [`Automaton::step`] runs one such block and tells the driver what
//! to do next; [`Executor::run`] loops over the steps and owns the rejection
//! and unwind policy:
//!
//! - a stack mark is taken when `run` starts and before every step;
//! - [`Step::Reject`] consults the [`ErrorHandler`]. `Retry` unwinds to the
//!   step's mark and runs the same state again; `Abort` unwinds to the entry
//!   mark and returns [`Outcome::Rejected`];
//! - an `Err` from a step unwinds to the entry mark and is returned.
//!
//! Either way a caller that did not get [`Outcome::Complete`] finds both stacks
//! at exactly the depths they had before the call.

use crate::{SymbolProvider, StackError, Stacks};
use std::fmt::{self, Debug};

/// Default number of consecutive retries granted in one state.
pub const DEFAULT_RETRY_LIMIT: usize = 64;

/// A state of an automaton, used as an explicit dispatch key.
pub trait AutomatonState: Copy + Debug + Eq + Into<usize> {
    /// The pending grammar items of this state, for diagnostics.
    fn description(self) -> &'static str;
}

/// What the driver does after a state's block ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<S, T, Sym> {
    Goto(S),
    Halt(T),
    /// No transition for `Sym` in the current state.
    Reject(Sym),
}

/// Result of one top-level parse.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    /// Aborted by the error handler; no result, stacks unwound.
    Rejected,
}

impl<T> Outcome<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Complete(_))
    }

    pub fn complete(self) -> Option<T> {
        match self {
            Outcome::Complete(t) => Some(t),
            Outcome::Rejected => None,
        }
    }
}

/// What an error handler wants after a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Run the rejecting state again. The handler is expected to have
    /// consumed or discarded input first.
    Retry,
    Abort,
}

/// Details handed to an [`ErrorHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection<Sym> {
    pub state_id: usize,
    pub description: &'static str,
    pub symbol: Sym,
}

impl<Sym: Debug> fmt::Display for Rejection<Sym> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no transition for {:?} in state {}: {}",
            self.symbol, self.state_id, self.description
        )
    }
}

/// Decides how to continue after a rejection.
///
/// Handlers get the input provider so they can skip input, but never the
/// stacks.
pub trait ErrorHandler<P: SymbolProvider> {
    fn on_reject(&mut self, rejection: &Rejection<P::Symbol>, input: &mut P) -> Resume;
}

impl<P, F> ErrorHandler<P> for F
where
    P: SymbolProvider,
    F: FnMut(&Rejection<P::Symbol>, &mut P) -> Resume,
{
    fn on_reject(&mut self, rejection: &Rejection<P::Symbol>, input: &mut P) -> Resume {
        self(rejection, input)
    }
}

/// Aborts on every rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortOnError;

impl<P: SymbolProvider> ErrorHandler<P> for AbortOnError {
    fn on_reject(&mut self, _rejection: &Rejection<P::Symbol>, _input: &mut P) -> Resume {
        Resume::Abort
    }
}

pub type CellOf<A> = <<A as Automaton>::Provider as SymbolProvider>::Value;
pub type SymbolOf<A> = <<A as Automaton>::Provider as SymbolProvider>::Symbol;
pub type StepOf<A> = Step<<A as Automaton>::State, <A as Automaton>::Output, SymbolOf<A>>;

/// A shift/reduce automaton expressed as explicit state dispatch.
pub trait Automaton {
    type Provider: SymbolProvider;
    type State: AutomatonState;
    type Output;
    /// Client data the semantic actions write to (symbol tables, output).
    type Context;
    type Error: From<StackError>;

    fn start_state(&self) -> Self::State;

    /// Runs the block of `state`.
    fn step(
        &mut self,
        state: Self::State,
        input: &mut Self::Provider,
        stacks: &mut Stacks<CellOf<Self>>,
        ctx: &mut Self::Context,
    ) -> Result<StepOf<Self>, Self::Error>;
}

#[derive(Debug, Clone, Default)]
pub struct ExecStats {
    pub steps: usize,
    pub rejections: usize,
    pub retries: usize,
    pub aborts: usize,
}

/// Drives automata. One executor can run any number of parses in sequence;
/// statistics accumulate.
#[derive(Debug, Clone)]
pub struct Executor {
    pub stats: ExecStats,
    retry_limit: usize,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        Self::with_retry_limit(DEFAULT_RETRY_LIMIT)
    }

    pub fn with_retry_limit(retry_limit: usize) -> Self {
        Self {
            stats: ExecStats::default(),
            retry_limit,
        }
    }

    pub fn stats(&self) -> ExecStats {
        self.stats.clone()
    }

    /// Runs `automaton` from its start state until it halts or is aborted.
    pub fn run<A, H>(
        &mut self,
        automaton: &mut A,
        input: &mut A::Provider,
        stacks: &mut Stacks<CellOf<A>>,
        ctx: &mut A::Context,
        handler: &mut H,
    ) -> Result<Outcome<A::Output>, A::Error>
    where
        A: Automaton,
        H: ErrorHandler<A::Provider>,
    {
        let entry = stacks.mark();
        let mut state = automaton.start_state();
        let mut retries = 0usize;
        stacks.dump();
        loop {
            let mark = stacks.mark();
            self.stats.steps += 1;
            log::trace!("State {:?}", state);
            let step = match automaton.step(state, input, stacks, ctx) {
                Ok(step) => step,
                Err(e) => {
                    log::debug!("step failed in {:?}, unwinding to {:?}", state, entry);
                    stacks.restore(entry)?;
                    return Err(e);
                }
            };
            match step {
                Step::Goto(next) => {
                    state = next;
                    retries = 0;
                    stacks.dump();
                }
                Step::Halt(output) => {
                    log::trace!("Halt in {:?}", state);
                    return Ok(Outcome::Complete(output));
                }
                Step::Reject(symbol) => {
                    self.stats.rejections += 1;
                    let rejection = Rejection {
                        state_id: state.into(),
                        description: state.description(),
                        symbol,
                    };
                    log::debug!("{}", rejection);
                    let resume = if retries >= self.retry_limit {
                        log::warn!(
                            "{} retries in state {}, aborting",
                            retries,
                            rejection.state_id
                        );
                        Resume::Abort
                    } else {
                        handler.on_reject(&rejection, input)
                    };
                    match resume {
                        Resume::Retry => {
                            stacks.restore(mark)?;
                            retries += 1;
                            self.stats.retries += 1;
                        }
                        Resume::Abort => {
                            stacks.restore(entry)?;
                            self.stats.aborts += 1;
                            log::debug!("aborted, stacks unwound to {:?}", entry);
                            return Ok(Outcome::Rejected);
                        }
                    }
                }
            }
        }
    }
}
