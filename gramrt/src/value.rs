//! Value cells: one slot of the attribute stack.
//!
//! A cell holds the semantic attribute of one grammar symbol. The runtime
//! stores cells generically through the [`Cell`] trait; [`Value`] is the stock
//! cell covering the attribute kinds a typical expression grammar needs.
//!
//! Unlike an overlay union, a [`Value`] always knows which alternative is
//! live. The checked accessors ([`Value::as_number`], [`Value::as_text`], ...)
//! turn a reader/writer disagreement into a [`StackError::KindMismatch`]
//! instead of a silent misread.

use crate::StackError;
use smartstring::alias::String;
use std::fmt::{self, Debug};
use std::mem;

/// Contract for anything stored on an [`AttrStack`](crate::AttrStack).
///
/// `Default` is the empty state: new cells are created with it, and popped
/// cells are reset to it so owned resources are released before reuse.
pub trait Cell: Default + Debug {
    /// Resets the cell to its empty state.
    #[inline]
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Names the live alternative of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Empty,
    Number,
    Text,
    Char,
    Int,
}

impl ValueKind {
    /// Lowercase names, in declaration order.
    pub const STRS: &'static [&'static str] = &["empty", "number", "text", "char", "int"];
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ValueKind::STRS[*self as usize])
    }
}

/// The stock attribute cell.
///
/// # Example
/// ```rust
/// # use gramrt::{Value, ValueKind};
/// let mut v = Value::Char('7');
/// assert_eq!(v.kind(), ValueKind::Char);
/// assert_eq!(v.as_char(0).unwrap(), '7');
/// assert!(v.as_number(0).is_err());
///
/// let taken = v.take();
/// assert!(matches!(taken, Value::Char('7')));
/// assert!(v.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Cleared or not yet written.
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Char(char),
    Int(i32),
}

impl Cell for Value {}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Empty => ValueKind::Empty,
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Char(_) => ValueKind::Char,
            Value::Int(_) => ValueKind::Int,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Moves the contents out, leaving [`Value::Empty`] behind.
    pub fn take(&mut self) -> Value {
        mem::take(self)
    }

    fn mismatch(&self, offset: isize, expected: ValueKind) -> StackError {
        StackError::KindMismatch {
            offset,
            expected,
            found: self.kind(),
        }
    }

    /// Reads a `Number`. `offset` is only used to label the error.
    pub fn as_number(&self, offset: isize) -> Result<f64, StackError> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(other.mismatch(offset, ValueKind::Number)),
        }
    }

    pub fn as_int(&self, offset: isize) -> Result<i32, StackError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch(offset, ValueKind::Int)),
        }
    }

    pub fn as_char(&self, offset: isize) -> Result<char, StackError> {
        match self {
            Value::Char(c) => Ok(*c),
            other => Err(other.mismatch(offset, ValueKind::Char)),
        }
    }

    pub fn as_text(&self, offset: isize) -> Result<&str, StackError> {
        match self {
            Value::Text(s) => Ok(s.as_str()),
            other => Err(other.mismatch(offset, ValueKind::Text)),
        }
    }

    /// Mutable access to a `Text` cell, for actions that extend a string in place.
    pub fn as_text_mut(&mut self, offset: isize) -> Result<&mut String, StackError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch(offset, ValueKind::Text)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("_"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::Int(i) => write!(f, "{i}i"),
        }
    }
}
