//! # Calculator Error Type
//!
//! This module defines [`CalcError`], the error enum of the calculator
//! pipeline. It aggregates failures from:
//!
//! - **the runtime stacks** (arity bookkeeping between automaton and stacks),
//! - **the line source** (reading input),
//! - **semantic actions** that meet an attribute they cannot interpret.
//!
//! Rejections of the input itself are not errors: they arrive as
//! [`Outcome::Rejected`](gramrt::Outcome::Rejected) together with the
//! diagnostics written by the error handler.
use crate::lexer::LexSymbol;
use gramrt::StackError;
use thiserror::Error;

/// Represents all possible errors that can occur within the calculator.
///
/// # Examples
/// Wrapping a stack error:
/// ```rust
/// # use gramrt::StackError;
/// # use gramrt_calc::CalcError;
/// let underlying = StackError::Underflow { requested: 2, depth: 1 };
/// let err: CalcError = underlying.into();
/// assert!(matches!(err, CalcError::Stack(_)));
/// ```
#[derive(Debug, Error)]
pub enum CalcError {
    /// A stack contract was violated.
    #[error("stack error: {0}")]
    Stack(#[from] StackError),

    /// The line source failed.
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),

    /// A binary or unary action received a character that is not one of its
    /// operators.
    #[error("unknown operator {0:?}")]
    UnknownOperator(char),

    /// A binding power was requested for a symbol that is not an operator.
    #[error("symbol {0} has no binding power")]
    NotAnOperator(LexSymbol),

    /// The lexer automaton stopped without producing a symbol.
    #[error("lexer produced no symbol")]
    LexerRejected,
}
