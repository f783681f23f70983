use crate::attr_stack::DEFAULT_ATTR_CAPACITY;
use crate::state_stack::DEFAULT_STATE_CAPACITY;
use crate::{AttrStack, Cell, StackError, StateStack};

/// Initial capacities of the stacks of one parse session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackConfig {
    pub attr_capacity: usize,
    pub state_capacity: usize,
    /// Side buffer of each symbol provider.
    pub staged_capacity: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            attr_capacity: DEFAULT_ATTR_CAPACITY,
            state_capacity: DEFAULT_STATE_CAPACITY,
            staged_capacity: DEFAULT_ATTR_CAPACITY,
        }
    }
}

/// Depths of both stacks at some point of a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackMark {
    pub attrs: usize,
    pub states: usize,
}

/// The attribute stack and state stack shared by every layer of one parse
/// session.
///
/// Providers and automata receive `&mut Stacks<V>` as a context argument, so a
/// session owns exactly one pair and no two sessions can share it.
#[derive(Debug, Clone)]
pub struct Stacks<V> {
    pub attrs: AttrStack<V>,
    pub states: StateStack,
}

impl<V: Cell> Default for Stacks<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Cell> Stacks<V> {
    pub fn new() -> Self {
        Self::with_config(&StackConfig::default())
    }

    pub fn with_config(config: &StackConfig) -> Self {
        Self {
            attrs: AttrStack::with_capacity(config.attr_capacity),
            states: StateStack::with_capacity(config.state_capacity),
        }
    }

    pub fn mark(&self) -> StackMark {
        StackMark {
            attrs: self.attrs.count(),
            states: self.states.depth(),
        }
    }

    /// Unwinds both stacks to the depths recorded in `mark`.
    ///
    /// Fails with `InvalidArgument`, touching neither stack, if either stack is
    /// already below its mark.
    pub fn restore(&mut self, mark: StackMark) -> Result<(), StackError> {
        if mark.attrs > self.attrs.count() || mark.states > self.states.depth() {
            return Err(StackError::invalid(
                "restore",
                format!(
                    "mark {}/{} above depths {}/{}",
                    mark.attrs,
                    mark.states,
                    self.attrs.count(),
                    self.states.depth()
                ),
            ));
        }
        log::trace!(
            "restore stacks {}/{} -> {}/{}",
            self.attrs.count(),
            self.states.depth(),
            mark.attrs,
            mark.states
        );
        self.attrs.truncate_to(mark.attrs)?;
        self.states.truncate_to(mark.states)
    }

    /// Logs both stacks at trace level.
    pub fn dump(&self) {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "attrs [{}]  states {:?}",
                self.attrs.dump(),
                self.states.as_slice()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn default_config_capacities() {
        let c = StackConfig::default();
        assert_eq!((c.attr_capacity, c.state_capacity, c.staged_capacity), (10, 10, 10));
        let s: Stacks<Value> = Stacks::with_config(&c);
        assert!(s.attrs.capacity() >= 10);
    }

    #[test]
    fn restore_unwinds_both() {
        let mut s: Stacks<Value> = Stacks::new();
        s.attrs.push(Value::Int(1));
        s.states.push(0);
        let mark = s.mark();
        s.attrs.reserve(3);
        s.states.push(2);
        s.states.push(3);
        s.restore(mark).unwrap();
        assert_eq!(s.mark(), StackMark { attrs: 1, states: 1 });
        assert_eq!(s.attrs.int(0).unwrap(), 1);
    }

    #[test]
    fn restore_refuses_marks_above_top() {
        let mut s: Stacks<Value> = Stacks::new();
        s.attrs.push(Value::Int(1));
        let mark = s.mark();
        s.attrs.free(1).unwrap();
        s.states.push(9);
        assert!(s.restore(mark).is_err());
        assert_eq!(s.states.depth(), 1);
    }
}
