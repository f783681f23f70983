//! Stack contract violations.
//!
//! Every fallible operation of [`AttrStack`](crate::AttrStack),
//! [`StateStack`](crate::StateStack) and the typed [`Value`](crate::Value)
//! accessors reports failure through [`StackError`]. A failing call leaves the
//! stack exactly as it was.
//!
//! These errors mean the automaton and the runtime disagree about arity
//! bookkeeping. They are not recoverable rejections of the input: an
//! [`Executor`](crate::Executor) unwinds both stacks and hands the error back
//! to its caller instead of consulting the error handler.
//!
//! # Examples
//!
//! ```rust
//! # use gramrt::{AttrStack, StackError, Value};
//! let mut a: AttrStack<Value> = AttrStack::new();
//! a.push(Value::Number(1.0));
//! let err = a.free(2).unwrap_err();
//! assert_eq!(err, StackError::Underflow { requested: 2, depth: 1 });
//! assert_eq!(a.count(), 1);
//! ```

use crate::value::ValueKind;
use thiserror::Error;

/// A violated stack contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// An argument that can never be valid for the operation, e.g. unwinding
    /// to a depth above the current top, or popping zero states and asking for
    /// the last one popped.
    #[error("invalid argument to {operation}: {detail}")]
    InvalidArgument {
        /// Name of the rejected operation.
        operation: &'static str,
        /// What was wrong with the argument.
        detail: String,
    },

    /// A relative offset that does not address a cell in `[0, top]`.
    #[error("offset {offset} out of range for stack of depth {depth}")]
    OutOfRange {
        /// Requested offset from the top (0 = top).
        offset: isize,
        /// Number of cells on the stack.
        depth: usize,
    },

    /// More elements were requested than the stack holds.
    #[error("stack underflow: {requested} requested, {depth} available")]
    Underflow {
        /// Number of elements the caller asked to remove.
        requested: usize,
        /// Number of elements on the stack.
        depth: usize,
    },

    /// A typed accessor found a different alternative than the one it reads.
    #[error("cell at offset {offset} holds {found}, expected {expected}")]
    KindMismatch {
        /// Offset of the inspected cell.
        offset: isize,
        /// Alternative the reader expected.
        expected: ValueKind,
        /// Alternative actually stored.
        found: ValueKind,
    },
}

impl StackError {
    pub(crate) fn invalid(operation: &'static str, detail: impl Into<String>) -> Self {
        StackError::InvalidArgument {
            operation,
            detail: detail.into(),
        }
    }
}
