//! The attribute stack.
//!
//! Reductions of a shift/reduce automaton read the attributes of the `k`
//! symbols just recognized and write back the attributes of the new
//! nonterminal, in place, at varying depths below the top. [`AttrStack`]
//! therefore offers relative indexed access ([`peek`](AttrStack::peek),
//! [`peek_mut`](AttrStack::peek_mut), [`peek_and_clear`](AttrStack::peek_and_clear))
//! and bulk [`reserve`](AttrStack::reserve) / [`free`](AttrStack::free) rather
//! than only one-at-a-time push and pop.
//!
//! Offsets count from the top: `0` is the top cell, `-1` the one below it, and
//! so on. Positive offsets never address a cell.

use crate::value::{Cell, Value, ValueKind};
use crate::StackError;
use smartstring::alias::String;
use std::fmt::Write;

/// Default initial capacity of an attribute stack.
pub const DEFAULT_ATTR_CAPACITY: usize = 10;

/// A growable stack of attribute cells.
///
/// `count()` equals `top_index() + 1`, and `top_index()` is `-1` exactly when
/// the stack is empty. Capacity grows by doubling; cells below the top are
/// never moved out or disturbed by growth.
///
/// # Example
/// ```rust
/// # use gramrt::{AttrStack, StackError, Value};
/// let mut a: AttrStack<Value> = AttrStack::new();
/// a.push(Value::Number(99.0));
/// a.push(Value::Char('/'));
/// a.push(Value::Number(3.0));
///
/// // Expression = Expression "/" Expression: three cells in, one cell out.
/// a.reduce(3, 1, |a| -> Result<(), StackError> {
///     let q = a.number(-2)? / a.number(0)?;
///     a.set(-2, Value::Number(q))
/// })
/// .unwrap();
///
/// assert_eq!(a.count(), 1);
/// assert_eq!(a.number(0).unwrap(), 33.0);
/// ```
#[derive(Debug, Clone)]
pub struct AttrStack<V> {
    cells: Vec<V>,
}

impl<V: Cell> Default for AttrStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Cell> AttrStack<V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ATTR_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// Number of cells on the stack (`top + 1`).
    #[inline]
    pub fn count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the top cell, `-1` when empty.
    #[inline]
    pub fn top_index(&self) -> isize {
        self.cells.len() as isize - 1
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cells.capacity()
    }

    /// Doubles the backing storage until `needed` cells fit.
    fn grow_for(&mut self, needed: usize) {
        let capacity = self.cells.capacity();
        if needed <= capacity {
            return;
        }
        let mut new_capacity = capacity.max(1);
        while new_capacity < needed {
            new_capacity *= 2;
        }
        log::trace!("attribute stack grows {} -> {}", capacity, new_capacity);
        self.cells.reserve_exact(new_capacity - self.cells.len());
    }

    /// Grows the stack by `n` empty cells.
    pub fn reserve(&mut self, n: usize) {
        let needed = self.cells.len() + n;
        self.grow_for(needed);
        self.cells.resize_with(needed, V::default);
    }

    /// Pushes one cell.
    pub fn push(&mut self, cell: V) {
        let needed = self.cells.len() + 1;
        self.grow_for(needed);
        self.cells.push(cell);
    }

    /// Clears and removes the top `n` cells.
    pub fn free(&mut self, n: usize) -> Result<(), StackError> {
        let depth = self.cells.len();
        if n > depth {
            return Err(StackError::Underflow {
                requested: n,
                depth,
            });
        }
        self.cells.truncate(depth - n);
        Ok(())
    }

    /// Alias of [`free`](Self::free).
    #[inline]
    pub fn pop(&mut self, n: usize) -> Result<(), StackError> {
        self.free(n)
    }

    /// Removes the top cell and returns its contents.
    pub fn pop_one(&mut self) -> Result<V, StackError> {
        self.cells.pop().ok_or(StackError::Underflow {
            requested: 1,
            depth: 0,
        })
    }

    /// Signed form of reserve/free: positive `delta` reserves, negative frees.
    pub fn adjust(&mut self, delta: isize) -> Result<(), StackError> {
        if delta >= 0 {
            self.reserve(delta as usize);
            Ok(())
        } else {
            self.free(delta.unsigned_abs())
        }
    }

    /// Unwinds the stack to exactly `depth` cells.
    pub fn truncate_to(&mut self, depth: usize) -> Result<(), StackError> {
        let count = self.cells.len();
        if depth > count {
            return Err(StackError::invalid(
                "truncate_to",
                format!("depth {depth} above count {count}"),
            ));
        }
        self.cells.truncate(depth);
        Ok(())
    }

    fn index(&self, offset: isize) -> Result<usize, StackError> {
        let depth = self.cells.len();
        if offset > 0 || offset.unsigned_abs() >= depth {
            return Err(StackError::OutOfRange { offset, depth });
        }
        Ok(depth - 1 - offset.unsigned_abs())
    }

    /// The cell at `top + offset`.
    pub fn peek(&self, offset: isize) -> Result<&V, StackError> {
        let i = self.index(offset)?;
        Ok(&self.cells[i])
    }

    pub fn peek_mut(&mut self, offset: isize) -> Result<&mut V, StackError> {
        let i = self.index(offset)?;
        Ok(&mut self.cells[i])
    }

    /// Moves the cell at `top + offset` out, leaving it empty in place.
    pub fn peek_and_clear(&mut self, offset: isize) -> Result<V, StackError> {
        let i = self.index(offset)?;
        Ok(std::mem::take(&mut self.cells[i]))
    }

    /// Moves the top `n` cells of `src` onto this stack, keeping their order.
    ///
    /// `src` loses those cells. Fails with `Underflow`, leaving both stacks
    /// unchanged, if `src` holds fewer than `n` cells.
    pub fn transfer_from(&mut self, src: &mut AttrStack<V>, n: usize) -> Result<(), StackError> {
        let depth = src.cells.len();
        if n > depth {
            return Err(StackError::Underflow {
                requested: n,
                depth,
            });
        }
        let needed = self.cells.len() + n;
        self.grow_for(needed);
        self.cells.extend(src.cells.drain(depth - n..));
        Ok(())
    }

    /// Moves every cell of `src` onto this stack, keeping their order.
    pub fn append(&mut self, src: &mut AttrStack<V>) {
        let needed = self.cells.len() + src.cells.len();
        self.grow_for(needed);
        self.cells.append(&mut src.cells);
    }

    /// Removes every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Runs the semantic action of a production whose right-hand side holds
    /// `rhs` cells and whose left-hand side holds `lhs` cells.
    ///
    /// When the left side is larger the extra cells are reserved before the
    /// action runs, so it can write them as output parameters; when it is
    /// smaller the surplus is freed afterwards. Either way `count()` changes by
    /// exactly `lhs - rhs`.
    ///
    /// If the action fails the stack is cut back to its depth on entry. Cells
    /// the action overwrote before failing keep their new contents.
    pub fn reduce<R, E>(
        &mut self,
        rhs: usize,
        lhs: usize,
        action: impl FnOnce(&mut Self) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StackError>,
    {
        let depth = self.cells.len();
        if rhs > depth {
            return Err(StackError::Underflow {
                requested: rhs,
                depth,
            }
            .into());
        }
        if lhs > rhs {
            self.reserve(lhs - rhs);
        }
        let result = match action(self) {
            Ok(result) => result,
            Err(e) => {
                self.cells.truncate(depth);
                return Err(e);
            }
        };
        if rhs > lhs {
            self.free(rhs - lhs)?;
        }
        Ok(result)
    }

    /// Cells from bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.cells.iter()
    }

    /// Renders the stack bottom to top for trace output.
    pub fn dump(&self) -> String {
        let mut output = String::new();
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                output.push_str(", ");
            }
            let _ = write!(output, "{cell:?}");
        }
        output
    }
}

/// Typed access for the stock [`Value`] cell.
impl AttrStack<Value> {
    pub fn number(&self, offset: isize) -> Result<f64, StackError> {
        self.peek(offset)?.as_number(offset)
    }

    pub fn int(&self, offset: isize) -> Result<i32, StackError> {
        self.peek(offset)?.as_int(offset)
    }

    pub fn char(&self, offset: isize) -> Result<char, StackError> {
        self.peek(offset)?.as_char(offset)
    }

    pub fn text(&self, offset: isize) -> Result<&str, StackError> {
        self.peek(offset)?.as_text(offset)
    }

    /// Moves a `Text` cell out, leaving it empty. A cell of another kind is
    /// left untouched.
    pub fn take_text(&mut self, offset: isize) -> Result<String, StackError> {
        let cell = self.peek_mut(offset)?;
        if let Value::Text(s) = cell {
            let s = std::mem::take(s);
            cell.clear();
            return Ok(s);
        }
        Err(StackError::KindMismatch {
            offset,
            expected: ValueKind::Text,
            found: cell.kind(),
        })
    }

    /// Overwrites the cell at `top + offset`.
    pub fn set(&mut self, offset: isize, value: Value) -> Result<(), StackError> {
        *self.peek_mut(offset)? = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stack_of(values: &[f64]) -> AttrStack<Value> {
        let mut a = AttrStack::new();
        for v in values {
            a.push(Value::Number(*v));
        }
        a
    }

    #[test]
    fn empty_stack_has_top_minus_one() {
        let a: AttrStack<Value> = AttrStack::new();
        assert_eq!(a.top_index(), -1);
        assert_eq!(a.count(), 0);
        assert!(a.is_empty());
    }

    #[test]
    fn reserve_adds_empty_cells_without_touching_others() {
        let mut a = stack_of(&[1.0, 2.0]);
        a.reserve(3);
        assert_eq!(a.count(), 5);
        assert!(a.peek(0).unwrap().is_empty());
        assert!(a.peek(-2).unwrap().is_empty());
        assert_eq!(a.number(-3).unwrap(), 2.0);
        assert_eq!(a.number(-4).unwrap(), 1.0);
    }

    #[test]
    fn capacity_doubles() {
        let mut a: AttrStack<Value> = AttrStack::with_capacity(2);
        a.reserve(2);
        assert_eq!(a.capacity(), 2);
        a.reserve(1);
        assert_eq!(a.capacity(), 4);
        a.reserve(6);
        assert_eq!(a.capacity(), 16);
    }

    #[test]
    fn zero_capacity_still_grows() {
        let mut a: AttrStack<Value> = AttrStack::with_capacity(0);
        a.push(Value::Int(1));
        a.push(Value::Int(2));
        a.push(Value::Int(3));
        assert_eq!(a.count(), 3);
        assert_eq!(a.int(0).unwrap(), 3);
    }

    #[test]
    fn peek_addresses_relative_to_top() {
        let a = stack_of(&[10.0, 20.0, 30.0]);
        assert_eq!(a.number(0).unwrap(), 30.0);
        assert_eq!(a.number(-2).unwrap(), 10.0);
    }

    #[test]
    fn peek_out_of_range() {
        let a = stack_of(&[10.0]);
        assert_eq!(
            a.peek(-1).unwrap_err(),
            StackError::OutOfRange {
                offset: -1,
                depth: 1
            }
        );
        assert!(matches!(
            a.peek(1),
            Err(StackError::OutOfRange { offset: 1, .. })
        ));
        let e: AttrStack<Value> = AttrStack::new();
        assert!(e.peek(0).is_err());
    }

    #[test]
    fn peek_and_clear_leaves_empty_cell() {
        let mut a = AttrStack::new();
        a.push(Value::Char('x'));
        a.push(Value::Int(1));
        let c = a.peek_and_clear(-1).unwrap();
        assert_eq!(c, Value::Char('x'));
        assert!(a.peek(-1).unwrap().is_empty());
        assert_eq!(a.count(), 2);
    }

    #[test]
    fn free_underflow_leaves_stack_unchanged() {
        let mut a = stack_of(&[7.0]);
        assert_eq!(
            a.free(2).unwrap_err(),
            StackError::Underflow {
                requested: 2,
                depth: 1
            }
        );
        assert_eq!(a.count(), 1);
        assert_eq!(a.number(0).unwrap(), 7.0);
    }

    #[test]
    fn freed_cells_read_back_empty_after_reserve() {
        let mut a = AttrStack::new();
        a.push(Value::Text("owned".into()));
        a.push(Value::Number(1.0));
        a.free(2).unwrap();
        a.reserve(2);
        assert!(a.iter().all(Value::is_empty));
    }

    #[test]
    fn pop_one_returns_top() {
        let mut a = stack_of(&[1.0, 2.0]);
        assert_eq!(a.pop_one().unwrap(), Value::Number(2.0));
        assert_eq!(a.count(), 1);
        a.pop(1).unwrap();
        assert!(a.pop_one().is_err());
    }

    #[test]
    fn adjust_is_signed_reserve_and_free() {
        let mut a = stack_of(&[1.0]);
        a.adjust(2).unwrap();
        assert_eq!(a.count(), 3);
        a.adjust(-3).unwrap();
        assert_eq!(a.count(), 0);
        assert!(a.adjust(-1).is_err());
    }

    #[test]
    fn truncate_to_rejects_growing() {
        let mut a = stack_of(&[1.0, 2.0, 3.0]);
        a.truncate_to(1).unwrap();
        assert_eq!(a.count(), 1);
        assert!(matches!(
            a.truncate_to(4),
            Err(StackError::InvalidArgument { .. })
        ));
        assert_eq!(a.count(), 1);
    }

    #[test]
    fn transfer_keeps_order() {
        let mut shared = stack_of(&[1.0, 2.0, 3.0]);
        let mut side = AttrStack::new();
        side.transfer_from(&mut shared, 2).unwrap();
        assert_eq!(shared.count(), 1);
        assert_eq!(side.number(-1).unwrap(), 2.0);
        assert_eq!(side.number(0).unwrap(), 3.0);

        shared.transfer_from(&mut side, 2).unwrap();
        assert_eq!(shared.count(), 3);
        assert_eq!(shared.number(0).unwrap(), 3.0);
        assert!(side.is_empty());

        assert!(side.transfer_from(&mut shared, 4).is_err());
        assert_eq!(shared.count(), 3);
    }

    #[test]
    fn reduce_reserves_before_growing_action() {
        // integer(value, length) = Digit(c): one cell in, two out.
        let mut a = AttrStack::new();
        a.push(Value::Char('4'));
        a.reduce(1, 2, |a| -> Result<(), StackError> {
            assert_eq!(a.count(), 2);
            let c = a.peek_and_clear(-1)?.as_char(-1)?;
            a.set(-1, Value::Number(c.to_digit(10).unwrap_or(0) as f64))?;
            a.set(0, Value::Int(1))
        })
        .unwrap();
        assert_eq!(a.number(-1).unwrap(), 4.0);
        assert_eq!(a.int(0).unwrap(), 1);
    }

    #[test]
    fn reduce_checks_rhs_depth() {
        let mut a = stack_of(&[1.0]);
        let r: Result<(), StackError> = a.reduce(2, 1, |_| Ok(()));
        assert!(matches!(r, Err(StackError::Underflow { requested: 2, .. })));
        assert_eq!(a.count(), 1);
    }

    #[test]
    fn failed_reduce_drops_reserved_cells() {
        let mut a = AttrStack::new();
        a.push(Value::Char('4'));
        let r = a.reduce(1, 2, |a| a.peek(-5).map(|_| ()));
        assert!(matches!(r, Err(StackError::OutOfRange { offset: -5, depth: 2 })));
        assert_eq!(a.count(), 1);
        assert_eq!(a.char(0).unwrap(), '4');
    }

    #[test]
    fn extreme_offsets_are_out_of_range() {
        let mut a = stack_of(&[1.0, 2.0]);
        assert!(matches!(
            a.peek(isize::MIN),
            Err(StackError::OutOfRange { offset: isize::MIN, depth: 2 })
        ));
        assert!(a.peek_mut(isize::MAX).is_err());
        assert!(a.peek(-2).is_err());
        assert_eq!(a.number(-1).unwrap(), 1.0);
        assert!(AttrStack::<Value>::new().peek(isize::MIN).is_err());
        assert!(AttrStack::<Value>::new().peek(0).is_err());
    }

    #[test]
    fn take_text_checks_kind_first() {
        let mut a = AttrStack::new();
        a.push(Value::Text("abc".into()));
        a.push(Value::Int(5));
        assert!(a.take_text(0).is_err());
        assert_eq!(a.int(0).unwrap(), 5);
        assert_eq!(a.take_text(-1).unwrap(), "abc");
        assert!(a.peek(-1).unwrap().is_empty());
    }

    #[test]
    fn dump_lists_bottom_to_top() {
        let mut a = AttrStack::new();
        a.push(Value::Int(1));
        a.push(Value::Char('a'));
        assert_eq!(a.dump(), "Int(1), Char('a')");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Reserve(usize),
        Free(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..6).prop_map(Op::Reserve),
            (0usize..6).prop_map(Op::Free),
        ]
    }

    proptest! {
        #[test]
        fn count_tracks_net_reserved_minus_freed(ops in prop::collection::vec(op(), 0..40)) {
            let mut a: AttrStack<Value> = AttrStack::new();
            let mut expected = 0usize;
            for op in ops {
                match op {
                    Op::Reserve(n) => {
                        a.reserve(n);
                        expected += n;
                    }
                    Op::Free(n) => {
                        if n <= expected {
                            a.free(n).unwrap();
                            expected -= n;
                        } else {
                            prop_assert!(a.free(n).is_err());
                        }
                    }
                }
                prop_assert_eq!(a.count(), expected);
                prop_assert_eq!(a.top_index(), expected as isize - 1);
            }
        }

        #[test]
        fn reduce_changes_count_by_lhs_minus_rhs(base in 0usize..8, rhs in 0usize..5, lhs in 0usize..3) {
            let mut a: AttrStack<Value> = AttrStack::new();
            a.reserve(base + rhs);
            let before = a.count();
            let r: Result<(), StackError> = a.reduce(rhs, lhs, |_| Ok(()));
            prop_assert!(r.is_ok());
            prop_assert_eq!(a.count() as isize, before as isize - rhs as isize + lhs as isize);
        }
    }
}
