use crate::StackError;

/// Default initial capacity of a state stack.
pub const DEFAULT_STATE_CAPACITY: usize = 10;

/// A LIFO stack of resumption keys.
///
/// An automaton pushes a key wherever a later reduction must know which
/// calling context to return to, and dispatches on [`peek`](Self::peek) after
/// the reduction pops. The runtime never interprets the keys.
#[derive(Debug, Clone, Default)]
pub struct StateStack {
    keys: Vec<u32>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STATE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn push(&mut self, key: u32) {
        log::trace!("push state {} at depth {}", key, self.keys.len());
        self.keys.push(key);
    }

    pub fn pop(&mut self) -> Result<u32, StackError> {
        self.keys.pop().ok_or(StackError::Underflow {
            requested: 1,
            depth: 0,
        })
    }

    /// Pops `n` keys and returns the last one popped (the deepest).
    pub fn pop_n(&mut self, n: usize) -> Result<u32, StackError> {
        if n == 0 {
            return Err(StackError::invalid("pop_n", "nothing to return for n = 0"));
        }
        let depth = self.keys.len();
        if n > depth {
            return Err(StackError::Underflow {
                requested: n,
                depth,
            });
        }
        let last = self.keys[depth - n];
        self.keys.truncate(depth - n);
        Ok(last)
    }

    /// The top key, left in place.
    pub fn peek(&self) -> Result<u32, StackError> {
        self.keys.last().copied().ok_or(StackError::OutOfRange {
            offset: 0,
            depth: 0,
        })
    }

    /// Drops `n` keys without reading them.
    pub fn discard(&mut self, n: usize) -> Result<(), StackError> {
        let depth = self.keys.len();
        if n > depth {
            return Err(StackError::Underflow {
                requested: n,
                depth,
            });
        }
        self.keys.truncate(depth - n);
        Ok(())
    }

    pub fn truncate_to(&mut self, depth: usize) -> Result<(), StackError> {
        let current = self.keys.len();
        if depth > current {
            return Err(StackError::invalid(
                "truncate_to",
                format!("depth {depth} above depth {current}"),
            ));
        }
        self.keys.truncate(depth);
        Ok(())
    }

    /// Keys from bottom to top.
    pub fn as_slice(&self) -> &[u32] {
        &self.keys
    }
}
