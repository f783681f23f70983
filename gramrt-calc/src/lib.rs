//! # gramrt-calc
//!
//! A formula calculator built on **gramrt**, chaining three automata over
//! one shared pair of stacks:
//!
//! 1. a [`Classifier`] reading lines from a [`LineSource`] and handing out
//!    one [`CharClass`] per character, with a synthetic
//!    [`CharClass::EndOfLine`] after every line;
//! 2. a [`CalcLexer`] grouping classes into [`LexSymbol`]s: numbers,
//!    identifiers, operators and the characters passed on unchanged;
//! 3. a [`Calculator`] running either the static or the dynamic priority
//!    parser (see [`Mode`]) and evaluating one formula per line.
//!
//! Defined names live in a [`SymTab`] for the whole session.
//!
//! ## Example
//!
//! ```rust
//! use gramrt::Outcome;
//! use gramrt_calc::{Calculator, Mode, Statement, StrLines};
//!
//! let mut calc = Calculator::new(StrLines::new("a=1+2*3\na^2"), Mode::Static);
//!
//! let first = calc.next().unwrap().unwrap();
//! let Outcome::Complete(Statement::Assignment { name, value, .. }) = first.outcome else {
//!     panic!("expected assignment")
//! };
//! assert_eq!((name.as_str(), value), ("a", 7.0));
//!
//! let second = calc.next().unwrap().unwrap();
//! assert_eq!(second.outcome.complete().unwrap().value(), 49.0);
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: the two calculator parsers and their semantic actions

mod classifier;
mod error;
mod lexer;
pub mod parser;
mod source;
mod symtab;

pub use classifier::{CharClass, Classifier};
pub use error::CalcError;
pub use lexer::{CalcLexer, LexSymbol};
pub use parser::{CalcCtx, Calculator, Evaluation, Mode, ReportErrors, Statement};
pub use source::{LineSource, ReaderLines, StrLines};
pub use symtab::SymTab;
