//! The peek/accept symbol protocol.
//!
//! Every layer of a parse session (classifier, lexer, parser input) is a
//! [`SymbolProvider`]. A provider is either [`Accepted`](ProviderState::Accepted),
//! holding no symbol, or [`Pending`](ProviderState::Pending), holding a computed
//! lookahead whose attributes wait in a side buffer. `peek` computes a symbol
//! only when none is pending, so the automaton can inspect the same lookahead
//! from as many branch points as it likes; `accept` commits the staged
//! attributes to the shared attribute stack.
//!
//! A higher layer's [`fetch`](SymbolProvider::fetch) drives the lower layer's
//! `peek`/`accept`; the lexer of the calculator, for example, runs a whole
//! automaton over classified characters inside its `fetch`.

use crate::stacks::StackConfig;
use crate::{AttrStack, Cell, StackError, Stacks};
use std::fmt::Debug;

/// Whether a provider holds an uncommitted lookahead symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState<S> {
    /// No pending symbol; the next `peek` computes one.
    Accepted,
    /// `S` was computed and its attributes are staged.
    Pending(S),
}

#[derive(Debug, Clone, Default)]
pub struct ProviderStats {
    pub fetched: usize,
    pub accepted: usize,
    pub discarded: usize,
}

/// State shared by every provider implementation.
#[derive(Debug, Clone)]
pub struct ProviderCtx<S, V> {
    pub state: ProviderState<S>,
    /// Attributes of the pending symbol, bottom to top.
    pub staged: AttrStack<V>,
    pub stats: ProviderStats,
}

impl<S, V: Cell> Default for ProviderCtx<S, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, V: Cell> ProviderCtx<S, V> {
    pub fn new() -> Self {
        Self::with_config(&StackConfig::default())
    }

    pub fn with_config(config: &StackConfig) -> Self {
        Self {
            state: ProviderState::Accepted,
            staged: AttrStack::with_capacity(config.staged_capacity),
            stats: ProviderStats::default(),
        }
    }

    /// Stages one attribute of the symbol being fetched.
    pub fn stage(&mut self, cell: V) {
        self.staged.push(cell);
    }

    /// Stages the top `n` cells of `attrs`, removing them there.
    ///
    /// A provider whose symbol is built by an automaton running on the shared
    /// stack uses this to lift the finished attribute off it.
    pub fn stage_from(&mut self, attrs: &mut AttrStack<V>, n: usize) -> Result<(), StackError> {
        self.staged.transfer_from(attrs, n)
    }
}

/// A source of lookahead symbols obeying the peek/accept protocol.
///
/// Implementors supply [`fetch`](Self::fetch) and the context accessors; the
/// protocol itself comes from the provided methods.
pub trait SymbolProvider {
    /// Symbol kinds. Their `Ord` is the declaration order, which automata
    /// rely on for range tests.
    type Symbol: Copy + Ord + Debug;
    type Value: Cell;
    type Error: From<StackError>;

    fn ctx(&self) -> &ProviderCtx<Self::Symbol, Self::Value>;
    fn ctx_mut(&mut self) -> &mut ProviderCtx<Self::Symbol, Self::Value>;

    /// Computes the next symbol, staging its attributes with
    /// [`ProviderCtx::stage`]. Called only while `Accepted`.
    fn fetch(&mut self, stacks: &mut Stacks<Self::Value>) -> Result<Self::Symbol, Self::Error>;

    /// Called whenever the pending symbol is consumed, by `accept` or
    /// `discard`. Providers advance their cursor here.
    fn on_accept(&mut self) {}

    /// Returns the lookahead symbol, computing it if none is pending.
    ///
    /// Repeated calls without an intervening `accept` return the same symbol
    /// and change nothing.
    fn peek(&mut self, stacks: &mut Stacks<Self::Value>) -> Result<Self::Symbol, Self::Error> {
        if let ProviderState::Pending(symbol) = self.ctx().state {
            return Ok(symbol);
        }
        let symbol = match self.fetch(stacks) {
            Ok(symbol) => symbol,
            Err(e) => {
                self.ctx_mut().staged.clear();
                return Err(e);
            }
        };
        let ctx = self.ctx_mut();
        ctx.state = ProviderState::Pending(symbol);
        ctx.stats.fetched += 1;
        log::trace!("peek {:?} [{}]", symbol, ctx.staged.dump());
        Ok(symbol)
    }

    /// Commits the pending symbol: its staged attributes move onto
    /// `stacks.attrs` in order. A no-op when nothing is pending.
    fn accept(&mut self, stacks: &mut Stacks<Self::Value>) {
        let ProviderState::Pending(symbol) = self.ctx().state else {
            return;
        };
        let ctx = self.ctx_mut();
        stacks.attrs.append(&mut ctx.staged);
        ctx.state = ProviderState::Accepted;
        ctx.stats.accepted += 1;
        log::trace!("accept {:?}", symbol);
        self.on_accept();
    }

    /// Drops the pending symbol and its staged attributes without pushing
    /// them. A no-op when nothing is pending.
    fn discard(&mut self) {
        let ProviderState::Pending(symbol) = self.ctx().state else {
            return;
        };
        let ctx = self.ctx_mut();
        ctx.staged.clear();
        ctx.state = ProviderState::Accepted;
        ctx.stats.discarded += 1;
        log::trace!("discard {:?}", symbol);
        self.on_accept();
    }

    fn is_accepted(&self) -> bool {
        matches!(self.ctx().state, ProviderState::Accepted)
    }

    fn stats(&self) -> ProviderStats {
        self.ctx().stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Sym {
        Pair,
        Word,
        End,
    }

    /// Emits a `Pair` with two cells, then a `Word` with one, then `End`s.
    struct Script {
        ctx: ProviderCtx<Sym, Value>,
        next: usize,
        consumed: usize,
    }

    impl Script {
        fn new() -> Self {
            Self {
                ctx: ProviderCtx::new(),
                next: 0,
                consumed: 0,
            }
        }
    }

    impl SymbolProvider for Script {
        type Symbol = Sym;
        type Value = Value;
        type Error = StackError;

        fn ctx(&self) -> &ProviderCtx<Sym, Value> {
            &self.ctx
        }

        fn ctx_mut(&mut self) -> &mut ProviderCtx<Sym, Value> {
            &mut self.ctx
        }

        fn fetch(&mut self, _stacks: &mut Stacks<Value>) -> Result<Sym, StackError> {
            self.next += 1;
            Ok(match self.next {
                1 => {
                    self.ctx.stage(Value::Number(1.0));
                    self.ctx.stage(Value::Int(2));
                    Sym::Pair
                }
                2 => {
                    self.ctx.stage(Value::Text("w".into()));
                    Sym::Word
                }
                _ => Sym::End,
            })
        }

        fn on_accept(&mut self) {
            self.consumed += 1;
        }
    }

    #[test]
    fn peek_is_idempotent() {
        init_logger();
        let mut stacks = Stacks::new();
        let mut p = Script::new();
        let a = p.peek(&mut stacks).unwrap();
        let staged_a = p.ctx().staged.dump();
        let b = p.peek(&mut stacks).unwrap();
        assert_eq!(a, b);
        assert_eq!(staged_a, p.ctx().staged.dump());
        assert_eq!(p.stats().fetched, 1);
        assert_eq!(stacks.attrs.count(), 0);
        assert!(!p.is_accepted());
    }

    #[test]
    fn accept_moves_exactly_the_staged_cells() {
        init_logger();
        let mut stacks = Stacks::new();
        stacks.attrs.push(Value::Char('x'));
        let mut p = Script::new();
        p.peek(&mut stacks).unwrap();
        p.accept(&mut stacks);
        assert!(p.is_accepted());
        assert_eq!(stacks.attrs.count(), 3);
        assert_eq!(stacks.attrs.number(-1).unwrap(), 1.0);
        assert_eq!(stacks.attrs.int(0).unwrap(), 2);
        assert!(p.ctx().staged.is_empty());

        p.accept(&mut stacks);
        assert_eq!(stacks.attrs.count(), 3);
        assert_eq!(p.stats().accepted, 1);
        assert_eq!(p.consumed, 1);
    }

    #[test]
    fn discard_drops_staged_cells() {
        let mut stacks = Stacks::new();
        let mut p = Script::new();
        p.peek(&mut stacks).unwrap();
        p.discard();
        assert!(p.is_accepted());
        assert_eq!(stacks.attrs.count(), 0);
        assert_eq!(p.peek(&mut stacks).unwrap(), Sym::Word);
        assert_eq!(p.stats().discarded, 1);
        assert_eq!(p.consumed, 1);
    }

    #[test]
    fn symbols_keep_declaration_order() {
        assert!(Sym::Pair < Sym::Word && Sym::Word < Sym::End);
    }
}
