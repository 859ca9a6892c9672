//! The driver running every construction phase in order.

use crate::{
    automaton::{Automaton, StateID},
    diagnostics::{Diagnostic, DiagnosticSink, Severity},
    error::InternalError,
    grammar::{Grammar, NonterminalID, ProductionID, TerminalID},
    packed::PackedTables,
    table::{self, ActionTable, ConflictStats, ReduceGotoTable},
    usage,
    util::plural,
};
use std::{
    fmt,
    time::{Duration, Instant},
};

#[derive(Debug, Clone)]
pub struct Config {
    expect_conflicts: usize,
    compact_reduces: bool,
    nowarn: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            expect_conflicts: 0,
            compact_reduces: false,
            nowarn: false,
        }
    }

    /// Set the number of conflicts tolerated before the output is refused.
    pub fn expect_conflicts(&mut self, count: usize) -> &mut Self {
        self.expect_conflicts = count;
        self
    }

    /// Make the most frequent reduction of each row its default action.
    pub fn compact_reduces(&mut self, enabled: bool) -> &mut Self {
        self.compact_reduces = enabled;
        self
    }

    /// Suppress the warnings about unused symbols and unreduced productions.
    ///
    /// They are still counted in the summary.
    pub fn nowarn(&mut self, enabled: bool) -> &mut Self {
        self.nowarn = enabled;
        self
    }

    /// Build the automaton and the parse tables of `g`.
    ///
    /// Grammar-level problems go to `sink` and never stop construction.
    /// An `Err` means an invariant of the construction itself was violated;
    /// it has been passed to [`DiagnosticSink::fatal`] as well.
    #[tracing::instrument(skip_all)]
    pub fn generate(
        &self,
        g: &Grammar,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Generated, InternalError> {
        let mut counting = CountingSink {
            inner: sink,
            warnings: 0,
            errors: 0,
        };
        match self.run(g, &mut counting) {
            Ok(generated) => Ok(generated),
            Err(err) => {
                tracing::error!("parser generation aborted: {}", err);
                counting.inner.fatal(&err);
                Err(err)
            }
        }
    }

    fn run(&self, g: &Grammar, sink: &mut CountingSink<'_>) -> Result<Generated, InternalError> {
        let mut timings = Timings::default();

        let s = Instant::now();
        let unused = usage::check_unused(g, self.nowarn, sink);
        timings.check_unused = s.elapsed();
        tracing::info!("check_unused: {:?} elapsed", timings.check_unused);

        let s = Instant::now();
        let mut automaton = Automaton::build_machine(g)?;
        timings.build_machine = s.elapsed();
        tracing::info!("build_machine: {:?} elapsed", timings.build_machine);

        let s = Instant::now();
        automaton.propagate_lookaheads()?;
        timings.propagate_lookaheads = s.elapsed();
        tracing::info!(
            "propagate_lookaheads: {:?} elapsed",
            timings.propagate_lookaheads
        );

        let s = Instant::now();
        let (mut action_table, reduce_table, conflicts) = table::build_tables(g, &automaton, sink)?;
        if self.compact_reduces {
            action_table.compact();
        }
        timings.build_tables = s.elapsed();
        tracing::info!("build_tables: {:?} elapsed", timings.build_tables);

        let s = Instant::now();
        let unreduced = table::check_reductions(g, &action_table);
        if !self.nowarn {
            for &production in &unreduced {
                sink.report(g, Diagnostic::UnreducedProduction { production });
            }
        }
        timings.check_reductions = s.elapsed();
        tracing::info!("check_reductions: {:?} elapsed", timings.check_reductions);

        if conflicts.conflicts > self.expect_conflicts {
            sink.report(
                g,
                Diagnostic::TooManyConflicts {
                    expected: self.expect_conflicts,
                    actual: conflicts.conflicts,
                },
            );
        }

        let summary = Summary {
            num_terminals: g.num_terminals(),
            num_nonterminals: g.num_nonterminals(),
            num_productions: g.num_productions(),
            num_states: automaton.states.len(),
            unused_terminals: unused.terminals,
            unused_nonterminals: unused.nonterminals,
            unreduced,
            conflicts,
            expected_conflicts: self.expect_conflicts,
            errors: sink.errors,
            warnings: sink.warnings,
        };

        Ok(Generated {
            action_table,
            reduce_table,
            automaton,
            start_state: StateID::START,
            start_production: ProductionID::START,
            summary,
            timings,
        })
    }
}

/// Forwards to the caller's sink while counting by severity.
struct CountingSink<'s> {
    inner: &'s mut dyn DiagnosticSink,
    warnings: usize,
    errors: usize,
}

impl DiagnosticSink for CountingSink<'_> {
    fn report(&mut self, g: &Grammar, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Note => (),
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
        self.inner.report(g, diagnostic);
    }

    fn fatal(&mut self, error: &InternalError) {
        self.errors += 1;
        self.inner.fatal(error);
    }
}

/// The finished tables, together with what they were built from.
#[derive(Debug)]
pub struct Generated {
    pub action_table: ActionTable,
    pub reduce_table: ReduceGotoTable,
    pub automaton: Automaton,
    pub start_state: StateID,
    pub start_production: ProductionID,
    pub summary: Summary,
    pub timings: Timings,
}

impl Generated {
    /// Whether the tables should be handed to code emission, i.e. nothing
    /// of error severity was reported.
    pub fn is_emittable(&self) -> bool {
        self.summary.errors == 0
    }

    pub fn packed(&self) -> Result<PackedTables, InternalError> {
        PackedTables::pack(
            &self.action_table,
            &self.reduce_table,
            self.start_state,
            self.start_production,
        )
    }

    /// The grammar, the automaton and both tables as text.
    pub fn dump<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        crate::util::display_fn(move |f| {
            writeln!(f, "{}", g)?;
            writeln!(f, "{}", self.automaton.display(g))?;
            writeln!(f, "{}", self.action_table.display(g))?;
            write!(f, "{}", self.reduce_table.display(g))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub num_terminals: usize,
    pub num_nonterminals: usize,
    pub num_productions: usize,
    pub num_states: usize,
    pub unused_terminals: Vec<TerminalID>,
    pub unused_nonterminals: Vec<NonterminalID>,
    pub unreduced: Vec<ProductionID>,
    pub conflicts: ConflictStats,
    pub expected_conflicts: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {} error{} and {} warning{}",
            self.errors,
            plural(self.errors),
            self.warnings,
            plural(self.warnings)
        )?;
        writeln!(
            f,
            "  {} terminal{}, {} non-terminal{}, and {} production{} declared, ",
            self.num_terminals,
            plural(self.num_terminals),
            self.num_nonterminals,
            plural(self.num_nonterminals),
            self.num_productions,
            plural(self.num_productions)
        )?;
        writeln!(f, "  producing {} unique parse states.", self.num_states)?;
        let unused_t = self.unused_terminals.len();
        writeln!(f, "  {} terminal{} declared but not used.", unused_t, plural(unused_t))?;
        let unused_n = self.unused_nonterminals.len();
        writeln!(
            f,
            "  {} non-terminal{} declared but not used.",
            unused_n,
            plural(unused_n)
        )?;
        let unreduced = self.unreduced.len();
        writeln!(
            f,
            "  {} production{} never reduced.",
            unreduced,
            plural(unreduced)
        )?;
        write!(
            f,
            "  {} conflict{} detected ({} expected).",
            self.conflicts.conflicts,
            plural(self.conflicts.conflicts),
            self.expected_conflicts
        )
    }
}

/// Time spent in each phase.
#[derive(Debug, Default, Copy, Clone)]
pub struct Timings {
    pub check_unused: Duration,
    pub build_machine: Duration,
    pub propagate_lookaheads: Duration,
    pub build_tables: Duration,
    pub check_reductions: Duration,
}

impl Timings {
    pub fn total(&self) -> Duration {
        self.check_unused
            + self.build_machine
            + self.propagate_lookaheads
            + self.build_tables
            + self.check_reductions
    }
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total();
        let line = |f: &mut fmt::Formatter<'_>, label: &str, d: Duration| {
            let percent = if total.is_zero() {
                0.0
            } else {
                d.as_secs_f64() * 100.0 / total.as_secs_f64()
            };
            writeln!(f, "    {:<22}{:>12.3?} ({:>5.1}%)", label, d, percent)
        };
        writeln!(f, "  Timing Summary")?;
        line(f, "Total time", total)?;
        line(f, "  Checking", self.check_unused)?;
        line(f, "  Machine", self.build_machine)?;
        line(f, "  Propagation", self.propagate_lookaheads)?;
        line(f, "  Table", self.build_tables)?;
        line(f, "  Reductions", self.check_reductions)
    }
}
