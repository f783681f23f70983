//! Runtime substrate for generated shift/reduce parsers.
//!
//! A parse session is a chain of [`SymbolProvider`]s (a character classifier,
//! a lexer, ...) feeding an [`Automaton`] driven by an [`Executor`]. Every layer
//! shares one [`Stacks`] pair: an [`AttrStack`] of semantic attributes and a
//! [`StateStack`] of resumption keys. Ambiguities are settled by a
//! [`Resolver`] over fixed or computed priorities.

mod attr_stack;
mod cursor;
mod error;
mod executor;
mod priority;
mod provider;
mod stacks;
mod state_stack;
mod value;

pub use crate::attr_stack::{AttrStack, DEFAULT_ATTR_CAPACITY};
pub use crate::cursor::{Cursor, Position, Span};
pub use crate::error::StackError;
pub use crate::executor::{
    AbortOnError, Automaton, AutomatonState, CellOf, DEFAULT_RETRY_LIMIT, ErrorHandler, ExecStats,
    Executor, Outcome, Rejection, Resume, Step, StepOf, SymbolOf,
};
pub use crate::priority::{Assoc, Resolver, index_of_maximum};
pub use crate::provider::{ProviderCtx, ProviderState, ProviderStats, SymbolProvider};
pub use crate::stacks::{StackConfig, StackMark, Stacks};
pub use crate::state_stack::{DEFAULT_STATE_CAPACITY, StateStack};
pub use crate::value::{Cell, Value, ValueKind};
