//! Calculation of the LALR parse tables with conflict resolution.

use crate::{
    automaton::{Automaton, LalrState, StateID},
    diagnostics::{Diagnostic, DiagnosticSink, Resolution},
    error::InternalError,
    grammar::{Assoc, Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
    item::{ItemCore, LalrItem},
    util::{display_fn, Map},
};
use std::{cmp::Ordering, fmt};

/// The action that the parser in a state performs on a particular
/// lookahead symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ParseAction {
    /// No action; a syntax error.
    Error,

    /// Read the lookahead symbol and transition to the specified state.
    Shift(StateID),

    /// Reduce by the specified production. Reducing by the start production
    /// under EOF is the accept action.
    Reduce(ProductionID),

    /// Reject the lookahead symbol.
    ///
    /// It behaves like `Error` at parse time, but is inserted explicitly by
    /// resolving a shift/reduce conflict between non-associative operators.
    NonAssoc,
}
impl ParseAction {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error | Self::NonAssoc)
    }
}

/// What happened to a proposed action on insertion.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The cell was free, or already held the same action.
    Placed,

    /// Two reductions met; the production with the lower index was kept.
    ReduceReduce,

    /// A shift met a reduction and precedence decided between them.
    Resolved {
        production: ProductionID,
        resolution: Resolution,
    },

    /// A shift met a reduction that precedence could not decide.
    /// The shift was kept.
    Unresolved { production: ProductionID },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRow {
    /// One cell per terminal, indexed by terminal index.
    pub actions: Vec<ParseAction>,
    /// The reduction taken when no explicit entry matches, if the row was
    /// compacted.
    pub default_reduce: Option<ProductionID>,
}

impl ActionRow {
    pub fn new(num_terminals: usize) -> Self {
        Self {
            actions: vec![ParseAction::Error; num_terminals],
            default_reduce: None,
        }
    }

    pub fn get(&self, t: TerminalID) -> Option<ParseAction> {
        self.actions.get(t.index()).copied()
    }

    /// Propose `action` for the cell of `t`, resolving any conflict with the
    /// action already there.
    ///
    /// Shift/reduce conflicts are resolved the same way whichever of the two
    /// actions arrived first.
    pub fn insert(
        &mut self,
        g: &Grammar,
        state: StateID,
        t: TerminalID,
        proposed: ParseAction,
    ) -> Result<Insertion, InternalError> {
        use ParseAction::*;

        let bogus = InternalError::BogusConflictResolution { state, terminal: t };
        let cell = self.actions.get_mut(t.index()).ok_or_else(|| bogus.clone())?;

        match (*cell, proposed) {
            (_, Error | NonAssoc) => Err(bogus),

            (Error, _) => {
                *cell = proposed;
                Ok(Insertion::Placed)
            }

            (Reduce(current), Reduce(new)) => {
                if current == new {
                    return Ok(Insertion::Placed);
                }
                if new < current {
                    *cell = Reduce(new);
                }
                Ok(Insertion::ReduceReduce)
            }

            (Shift(next), Reduce(production)) | (Reduce(production), Shift(next)) => {
                let insertion = match resolve_shift_reduce(g, production, t)? {
                    Some(resolution) => {
                        *cell = match resolution {
                            Resolution::Shift => Shift(next),
                            Resolution::Reduce => Reduce(production),
                            Resolution::NonAssoc => NonAssoc,
                        };
                        Insertion::Resolved {
                            production,
                            resolution,
                        }
                    }
                    None => {
                        *cell = Shift(next);
                        Insertion::Unresolved { production }
                    }
                };
                Ok(insertion)
            }

            (Shift(current), Shift(new)) if current == new => Ok(Insertion::Placed),

            (Shift(_), Shift(_)) | (NonAssoc, _) => Err(bogus),
        }
    }

    /// Choose the most frequent reduction of this row as its default.
    /// On ties the production that reached the count first wins.
    pub fn compute_default(&mut self) {
        let mut counts: Map<ProductionID, usize> = Map::default();
        let mut max = 0;
        let mut default = None;
        for action in &self.actions {
            if let ParseAction::Reduce(p) = action {
                let count = counts.entry(*p).or_default();
                *count += 1;
                if *count > max {
                    max = *count;
                    default = Some(*p);
                }
            }
        }
        self.default_reduce = default;
    }
}

/// Decide a shift/reduce conflict between `production` and the terminal `t`.
///
/// Returns `None` when neither side has a precedence.
fn resolve_shift_reduce(
    g: &Grammar,
    production: ProductionID,
    t: TerminalID,
) -> Result<Option<Resolution>, InternalError> {
    let reduce_prec = g.production(production)?.precedence;
    let shift_prec = g.terminals.get(&t).and_then(|t| t.precedence);

    let resolution = match (shift_prec, reduce_prec) {
        (None, None) => return Ok(None),
        (Some(_), None) => Resolution::Shift,
        (None, Some(_)) => Resolution::Reduce,
        (Some(shift_prec), Some(reduce_prec)) => {
            match shift_prec.priority.cmp(&reduce_prec.priority) {
                Ordering::Greater => Resolution::Shift,
                Ordering::Less => Resolution::Reduce,
                Ordering::Equal => match shift_prec.assoc {
                    Assoc::Left => Resolution::Reduce,
                    Assoc::Right => Resolution::Shift,
                    Assoc::Nonassoc => Resolution::NonAssoc,
                },
            }
        }
    };
    Ok(Some(resolution))
}

/// State × terminal → action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable {
    pub rows: Vec<ActionRow>,
}

impl ActionTable {
    pub fn row(&self, state: StateID) -> Option<&ActionRow> {
        self.rows.get(state.index())
    }

    /// The action of a cell, without falling back to the default reduction.
    pub fn get(&self, state: StateID, t: TerminalID) -> Option<ParseAction> {
        self.row(state)?.get(t)
    }

    /// Compute the default reduction of every row.
    pub fn compact(&mut self) {
        for row in &mut self.rows {
            row.compute_default();
        }
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, row) in self.rows.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:?}", StateID::from_raw(i as u16))?;
                writeln!(f, "## actions")?;
                for (t, action) in row.actions.iter().enumerate() {
                    let token = &g.terminals[t];
                    match action {
                        ParseAction::Error => (),
                        ParseAction::Shift(n) => {
                            writeln!(f, "- {} => shift({:?})", token, n)?;
                        }
                        ParseAction::Reduce(ProductionID::START) => {
                            writeln!(f, "- {} => accept", token)?;
                        }
                        ParseAction::Reduce(p) => {
                            writeln!(f, "- {} => reduce({})", token, display_production(g, *p))?;
                        }
                        ParseAction::NonAssoc => {
                            writeln!(f, "- {} => nonassoc", token)?;
                        }
                    }
                }
                if let Some(p) = row.default_reduce {
                    writeln!(f, "## default")?;
                    writeln!(f, "- reduce({})", display_production(g, p))?;
                }
            }
            Ok(())
        })
    }
}

fn display_production(g: &Grammar, id: ProductionID) -> impl fmt::Display + '_ {
    display_fn(move |f| match g.productions.get(&id) {
        Some(p) => write!(f, "{}", p.display(g)),
        None => write!(f, "{:?}", id),
    })
}

/// State × nonterminal → the state entered after a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceGotoTable {
    pub rows: Vec<Vec<Option<StateID>>>,
}

impl ReduceGotoTable {
    pub fn goto(&self, state: StateID, n: NonterminalID) -> Option<StateID> {
        self.rows.get(state.index())?.get(n.index()).copied().flatten()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, row) in self.rows.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:?}", StateID::from_raw(i as u16))?;
                writeln!(f, "## gotos")?;
                for (n, goto) in row.iter().enumerate() {
                    if let Some(goto) = goto {
                        writeln!(f, "- {} => goto({:?})", g.nonterminals[n], goto)?;
                    }
                }
            }
            Ok(())
        })
    }
}

/// Counters collected while filling the tables.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ConflictStats {
    /// Conflicts reported as warnings; these count against the expected
    /// number of conflicts.
    pub conflicts: usize,
    /// Cells where a shift met a reduction, resolved or not.
    pub shift_reduce: usize,
    /// Pairs of completed items sharing lookaheads.
    pub reduce_reduce: usize,
    /// Shift/reduce conflicts settled by precedence.
    pub resolved_by_precedence: usize,
}

/// Fill one action row and one goto row per state of `automaton`.
pub fn build_tables(
    g: &Grammar,
    automaton: &Automaton,
    sink: &mut dyn DiagnosticSink,
) -> Result<(ActionTable, ReduceGotoTable, ConflictStats), InternalError> {
    let span = tracing::debug_span!("build_tables");
    let _entered = span.enter();

    let num_terminals = g.num_terminals();
    let num_nonterminals = g.num_nonterminals();

    let mut actions = ActionTable {
        rows: Vec::with_capacity(automaton.states.len()),
    };
    let mut gotos = ReduceGotoTable {
        rows: Vec::with_capacity(automaton.states.len()),
    };
    let mut stats = ConflictStats::default();

    for state in &automaton.states {
        let mut row = ActionRow::new(num_terminals);
        let mut goto_row = vec![None; num_nonterminals];
        let mut unresolved: Vec<(TerminalID, ProductionID)> = vec![];

        let completed = completed_items(g, state)?;
        for item in &completed {
            for t in item.lookahead.iter() {
                let insertion = row.insert(g, state.id, t, ParseAction::Reduce(item.core.production))?;
                record(g, state.id, t, insertion, &mut stats, &mut unresolved, sink);
            }
        }

        for &(symbol, target) in &state.transitions {
            match symbol {
                SymbolID::T(t) => {
                    let insertion = row.insert(g, state.id, t, ParseAction::Shift(target))?;
                    record(g, state.id, t, insertion, &mut stats, &mut unresolved, sink);
                }
                SymbolID::N(n) => goto_row[n.index()] = Some(target),
            }
        }

        report_conflicts(g, state, &completed, &unresolved, &mut stats, sink)?;

        actions.rows.push(row);
        gotos.rows.push(goto_row);
    }

    Ok((actions, gotos, stats))
}

fn completed_items<'s>(
    g: &Grammar,
    state: &'s LalrState,
) -> Result<Vec<&'s LalrItem>, InternalError> {
    let mut completed = vec![];
    for item in state.items.iter() {
        if item.dot_at_end(g)? {
            completed.push(item);
        }
    }
    // reduce/reduce pairs are reported in declaration order
    completed.sort_by_key(|item| item.core.production);
    Ok(completed)
}

fn record(
    g: &Grammar,
    state: StateID,
    terminal: TerminalID,
    insertion: Insertion,
    stats: &mut ConflictStats,
    unresolved: &mut Vec<(TerminalID, ProductionID)>,
    sink: &mut dyn DiagnosticSink,
) {
    match insertion {
        Insertion::Placed | Insertion::ReduceReduce => (),
        Insertion::Resolved {
            production,
            resolution,
        } => {
            stats.shift_reduce += 1;
            stats.resolved_by_precedence += 1;
            sink.report(
                g,
                Diagnostic::ResolvedByPrecedence {
                    state,
                    production,
                    terminal,
                    resolution,
                },
            );
        }
        Insertion::Unresolved { production } => {
            stats.shift_reduce += 1;
            unresolved.push((terminal, production));
        }
    }
}

/// One diagnostic per pair of completed items with common lookaheads, then
/// one per terminal whose shift/reduce conflict was left to the default.
fn report_conflicts(
    g: &Grammar,
    state: &LalrState,
    completed: &[&LalrItem],
    unresolved: &[(TerminalID, ProductionID)],
    stats: &mut ConflictStats,
    sink: &mut dyn DiagnosticSink,
) -> Result<(), InternalError> {
    for (i, first) in completed.iter().enumerate() {
        for second in &completed[i + 1..] {
            let common = first.lookahead.intersection(&second.lookahead);
            if common.is_empty() {
                continue;
            }
            tracing::debug!(
                "reduce/reduce conflict in {:?} between {:?} and {:?}",
                state.id,
                first.core,
                second.core
            );
            stats.reduce_reduce += 1;
            stats.conflicts += 1;
            sink.report(
                g,
                Diagnostic::ReduceReduceConflict {
                    state: state.id,
                    first: first.core,
                    second: second.core,
                    lookaheads: common,
                },
            );
        }
    }

    for &(terminal, production) in unresolved {
        let reduce = completed
            .iter()
            .map(|item| item.core)
            .find(|core| core.production == production)
            .ok_or(InternalError::BogusConflictResolution {
                state: state.id,
                terminal,
            })?;
        let mut shifts: Vec<ItemCore> = vec![];
        for item in state.items.iter() {
            if item.symbol_after_dot(g)? == Some(SymbolID::T(terminal)) {
                shifts.push(item.core);
            }
        }
        tracing::debug!(
            "shift/reduce conflict in {:?} under {:?}",
            state.id,
            terminal
        );
        stats.conflicts += 1;
        sink.report(
            g,
            Diagnostic::ShiftReduceConflict {
                state: state.id,
                reduce,
                shifts,
                terminal,
            },
        );
    }

    Ok(())
}

/// Productions that no cell of `table` reduces by, in index order.
pub fn check_reductions(g: &Grammar, table: &ActionTable) -> Vec<ProductionID> {
    let mut reduced = vec![false; g.num_productions()];
    for row in &table.rows {
        for action in &row.actions {
            if let ParseAction::Reduce(p) = action {
                if let Some(flag) = reduced.get_mut(p.index()) {
                    *flag = true;
                }
            }
        }
        if let Some(p) = row.default_reduce {
            if let Some(flag) = reduced.get_mut(p.index()) {
                *flag = true;
            }
        }
    }
    g.productions
        .keys()
        .copied()
        .filter(|p| !reduced.get(p.index()).copied().unwrap_or(false))
        .collect()
}
