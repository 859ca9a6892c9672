//! Grammar-level diagnostics and the sinks that receive them.

use crate::{
    automaton::StateID,
    error::InternalError,
    grammar::{Grammar, NonterminalID, ProductionID, TerminalID, TerminalSet},
    item::ItemCore,
    util::display_fn,
};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational, never counted.
    Note,
    Warning,
    Error,
}

/// How precedence settled a shift/reduce conflict.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    Shift,
    Reduce,
    /// Both actions were dropped in favor of an explicit syntax error.
    NonAssoc,
}
impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift => f.write_str("shifting"),
            Self::Reduce => f.write_str("reducing"),
            Self::NonAssoc => f.write_str("a syntax error (nonassoc)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// Two completed items of a state share lookaheads. The production with
    /// the lower index was kept.
    ReduceReduceConflict {
        state: StateID,
        first: ItemCore,
        second: ItemCore,
        lookaheads: TerminalSet,
    },

    /// A completed item competes with a shift and precedence could not
    /// decide. The shift was kept.
    ShiftReduceConflict {
        state: StateID,
        reduce: ItemCore,
        shifts: Vec<ItemCore>,
        terminal: TerminalID,
    },

    /// A shift/reduce conflict settled by precedence and associativity.
    ResolvedByPrecedence {
        state: StateID,
        production: ProductionID,
        terminal: TerminalID,
        resolution: Resolution,
    },

    UnreducedProduction {
        production: ProductionID,
    },

    UnusedTerminal {
        terminal: TerminalID,
    },

    UnusedNonterminal {
        nonterminal: NonterminalID,
    },

    TooManyConflicts {
        expected: usize,
        actual: usize,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::ResolvedByPrecedence { .. } => Severity::Note,
            Self::TooManyConflicts { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// Whether this diagnostic counts against the expected-conflicts budget.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ReduceReduceConflict { .. } | Self::ShiftReduceConflict { .. }
        )
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| match self {
            Self::ReduceReduceConflict {
                state,
                first,
                second,
                lookaheads,
            } => {
                writeln!(
                    f,
                    "*** Reduce/Reduce conflict found in state #{}",
                    state.index()
                )?;
                writeln!(f, "  between {}", first.display(g))?;
                writeln!(f, "  and     {}", second.display(g))?;
                writeln!(f, "  under symbols: {}", lookaheads.display(g))?;
                let winner = if first.production < second.production {
                    "first"
                } else {
                    "second"
                };
                write!(f, "  Resolved in favor of the {} production.", winner)
            }
            Self::ShiftReduceConflict {
                state,
                reduce,
                shifts,
                terminal,
            } => {
                writeln!(
                    f,
                    "*** Shift/Reduce conflict found in state #{}",
                    state.index()
                )?;
                writeln!(f, "  between {}", reduce.display(g))?;
                for shift in shifts {
                    writeln!(f, "  and     {}", shift.display(g))?;
                }
                writeln!(f, "  under symbol {}", g.terminals[terminal].name)?;
                write!(f, "  Resolved in favor of shifting.")
            }
            Self::ResolvedByPrecedence {
                state,
                production,
                terminal,
                resolution,
            } => {
                let production = g.productions.get(production);
                write!(
                    f,
                    "Shift/Reduce conflict in state #{} between \"{}\" and {} resolved by precedence in favor of {}",
                    state.index(),
                    display_fn(move |f| match production {
                        Some(p) => write!(f, "{}", p.display(g)),
                        None => f.write_str("<unknown>"),
                    }),
                    g.terminals[terminal].name,
                    resolution,
                )
            }
            Self::UnreducedProduction { production } => match g.productions.get(production) {
                Some(p) => write!(f, "*** Production \"{}\" never reduced", p.display(g)),
                None => write!(f, "*** Production {:?} never reduced", production),
            },
            Self::UnusedTerminal { terminal } => write!(
                f,
                "Terminal \"{}\" was declared but never used",
                g.terminals[terminal].name
            ),
            Self::UnusedNonterminal { nonterminal } => write!(
                f,
                "Non terminal \"{}\" was declared but never used",
                g.nonterminals[nonterminal].name
            ),
            Self::TooManyConflicts { expected, actual } => write!(
                f,
                "*** More conflicts encountered than expected -- parser generation aborted ({} found, {} expected)",
                actual, expected
            ),
        })
    }
}

/// Receives diagnostics while the tables are built.
///
/// Reporting never changes how construction proceeds.
pub trait DiagnosticSink {
    fn report(&mut self, g: &Grammar, diagnostic: Diagnostic);

    /// Called once when generation stops on an invariant violation.
    fn fatal(&mut self, error: &InternalError) {
        let _ = error;
    }
}

/// A sink that keeps every diagnostic and counts them by severity,
/// forwarding each to `tracing`.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    notes: usize,
    warnings: usize,
    errors: usize,
    fatals: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn note_count(&self) -> usize {
        self.notes
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn fatal_count(&self) -> usize {
        self.fatals
    }

    /// Whether anything was reported that should suppress emission.
    pub fn has_errors(&self) -> bool {
        self.errors > 0 || self.fatals > 0
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for diagnostic in &self.entries {
                writeln!(f, "{}", diagnostic.display(g))?;
            }
            Ok(())
        })
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, g: &Grammar, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Note => {
                self.notes += 1;
                tracing::debug!("{}", diagnostic.display(g));
            }
            Severity::Warning => {
                self.warnings += 1;
                tracing::warn!("{}", diagnostic.display(g));
            }
            Severity::Error => {
                self.errors += 1;
                tracing::error!("{}", diagnostic.display(g));
            }
        }
        self.entries.push(diagnostic);
    }

    fn fatal(&mut self, error: &InternalError) {
        self.fatals += 1;
        tracing::error!("internal error: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;

    #[test]
    fn messages() {
        let g = Grammar::define(|def| {
            let a = def.terminal("A", None)?;
            def.terminal("UNUSED", None)?;
            let s = def.nonterminal("s")?;
            let x = def.nonterminal("x")?;
            def.rule(s, [T(a)], None)?;
            def.rule(x, [], None)?;
            Ok(())
        })
        .unwrap();
        let a = g.terminal_by_name("A").unwrap();
        let unused = g.terminal_by_name("UNUSED").unwrap();
        let p1 = ProductionID::from_raw(1);
        let p2 = ProductionID::from_raw(2);

        let d = Diagnostic::UnusedTerminal { terminal: unused };
        assert_eq!(
            d.display(&g).to_string(),
            "Terminal \"UNUSED\" was declared but never used"
        );
        assert_eq!(d.severity(), Severity::Warning);

        let d = Diagnostic::UnreducedProduction { production: p2 };
        assert_eq!(d.display(&g).to_string(), "*** Production \"x ::= ε\" never reduced");

        let d = Diagnostic::ReduceReduceConflict {
            state: StateID::from_raw(3),
            first: ItemCore::new(p2, 0),
            second: ItemCore::new(p1, 1),
            lookaheads: [TerminalID::EOF, a].into_iter().collect(),
        };
        assert!(d.is_conflict());
        assert_eq!(
            d.display(&g).to_string(),
            "*** Reduce/Reduce conflict found in state #3\n\
             \x20 between x ::= (*)\n\
             \x20 and     s ::= A (*)\n\
             \x20 under symbols: {EOF, A}\n\
             \x20 Resolved in favor of the second production."
        );

        let d = Diagnostic::ResolvedByPrecedence {
            state: StateID::from_raw(2),
            production: p1,
            terminal: a,
            resolution: Resolution::Shift,
        };
        assert_eq!(d.severity(), Severity::Note);
        assert!(!d.is_conflict());
        assert_eq!(
            d.display(&g).to_string(),
            "Shift/Reduce conflict in state #2 between \"s ::= A\" and A resolved by precedence in favor of shifting"
        );
    }

    #[test]
    fn collector_counts_by_severity() {
        let g = Grammar::define(|def| {
            let a = def.terminal("A", None)?;
            let s = def.nonterminal("s")?;
            def.rule(s, [T(a)], None)?;
            Ok(())
        })
        .unwrap();
        let a = g.terminal_by_name("A").unwrap();

        let mut diagnostics = Diagnostics::new();
        diagnostics.report(
            &g,
            Diagnostic::ResolvedByPrecedence {
                state: StateID::START,
                production: ProductionID::from_raw(1),
                terminal: a,
                resolution: Resolution::Reduce,
            },
        );
        diagnostics.report(&g, Diagnostic::UnusedTerminal { terminal: a });
        assert!(!diagnostics.has_errors());
        diagnostics.report(
            &g,
            Diagnostic::TooManyConflicts {
                expected: 0,
                actual: 1,
            },
        );
        diagnostics.fatal(&InternalError::EmptyKernel);

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.note_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.fatal_count(), 1);
        assert!(diagnostics.has_errors());
    }
}
