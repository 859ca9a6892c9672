//! LALR(1) parse table construction.
//!
//! A [`Grammar`](grammar::Grammar) is defined in code, then
//! [`Config::generate`] builds the LALR automaton and fills the action and
//! reduce-goto tables, reporting conflicts and unused symbols to a
//! [`DiagnosticSink`](diagnostics::DiagnosticSink).
//!
//! ```
//! use lalrtab::{diagnostics::Diagnostics, grammar::{Assoc, Grammar, SymbolID::*}, Config};
//!
//! let g = Grammar::define(|def| {
//!     let plus = def.terminal("PLUS", None)?;
//!     let int = def.terminal("INT", None)?;
//!     def.precedence(Assoc::Left, [plus])?;
//!     let e = def.nonterminal("E")?;
//!     def.rule(e, [N(e), T(plus), N(e)], None)?;
//!     def.rule(e, [T(int)], None)?;
//!     Ok(())
//! })?;
//!
//! let mut diagnostics = Diagnostics::new();
//! let generated = Config::new().generate(&g, &mut diagnostics)?;
//! assert!(generated.is_emittable());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod automaton;
pub mod diagnostics;
pub mod error;
mod first_sets;
pub mod generate;
pub mod grammar;
pub mod item;
pub mod packed;
pub mod table;
pub mod usage;
mod util;

pub use crate::generate::{Config, Generated, Summary, Timings};
