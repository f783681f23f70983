//! Priority-based ambiguity resolution.
//!
//! Where a grammar is ambiguous the automaton has several candidate actions
//! (typically one shift and one or more reduces). Each candidate carries a
//! priority, either fixed when the automaton was built or computed from the
//! current input, and the candidate with the strictly greatest priority wins.
//! On a tie the candidate declared first wins.
//!
//! Computed priorities are evaluated once each, in declaration order, when
//! [`Resolver::select`] runs. They must be pure with respect to the current
//! lookahead: a priority function that accepts input or touches the stacks
//! changes the very state the other candidates are judged on.
//!
//! # Example
//! ```rust
//! # use gramrt::{Assoc, Resolver};
//! #[derive(Debug, PartialEq)]
//! enum Act { Reduce, Shift }
//!
//! // left operand built with "-" (power 10), lookahead "*" (power 20)
//! let act = Resolver::new()
//!     .computed(Act::Reduce, || Assoc::Left.reduce_priority(10))
//!     .fixed(Act::Shift, 20)
//!     .select();
//! assert_eq!(act, Some(Act::Shift));
//! ```

use std::fmt::Debug;

enum Priority<'a, P> {
    Fixed(P),
    Computed(Box<dyn FnOnce() -> P + 'a>),
}

impl<P> Priority<'_, P> {
    fn eval(self) -> P {
        match self {
            Priority::Fixed(p) => p,
            Priority::Computed(f) => f(),
        }
    }
}

/// Collects the candidates of one decision point.
pub struct Resolver<'a, A, P: Ord> {
    candidates: Vec<(A, Priority<'a, P>)>,
}

impl<A, P: Ord> Default for Resolver<'_, A, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, A, P: Ord> Resolver<'a, A, P> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::with_capacity(2),
        }
    }

    /// Adds a candidate whose priority was decided at build time.
    pub fn fixed(mut self, action: A, priority: P) -> Self {
        self.candidates.push((action, Priority::Fixed(priority)));
        self
    }

    /// Adds a candidate whose priority is computed from the current input.
    pub fn computed(mut self, action: A, priority: impl FnOnce() -> P + 'a) -> Self {
        self.candidates
            .push((action, Priority::Computed(Box::new(priority))));
        self
    }

    /// Picks the first candidate holding the strict maximum, or `None` when
    /// there are no candidates.
    pub fn select(self) -> Option<A>
    where
        A: Debug,
        P: Debug,
    {
        let mut best: Option<(A, P)> = None;
        for (action, priority) in self.candidates {
            let p = priority.eval();
            log::trace!("candidate {:?} priority {:?}", action, p);
            let better = match &best {
                Some((_, best_p)) => p > *best_p,
                None => true,
            };
            if better {
                best = Some((action, p));
            }
        }
        if let Some((action, p)) = &best {
            log::trace!("selected {:?} at {:?}", action, p);
        }
        best.map(|(action, _)| action)
    }
}

/// Index of the first maximal element, `None` for an empty slice.
pub fn index_of_maximum<P: Ord>(priorities: &[P]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, p) in priorities.iter().enumerate() {
        match best {
            Some(b) if *p <= priorities[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Associativity of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

impl Assoc {
    /// Priority of reducing `a op b` against a lookahead operator of the same
    /// binding power `power`: above it for left associativity, below it for
    /// right.
    pub fn reduce_priority(self, power: i32) -> i32 {
        match self {
            Assoc::Left => power + 1,
            Assoc::Right => power - 1,
        }
    }
}
