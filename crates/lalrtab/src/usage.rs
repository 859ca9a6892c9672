//! Detection of declared symbols that no production refers to.

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink},
    grammar::{Grammar, NonterminalID, TerminalID},
};

/// Symbols found unused by [`check_unused`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Unused {
    pub terminals: Vec<TerminalID>,
    pub nonterminals: Vec<NonterminalID>,
}

/// Collect the symbols whose use count is zero, warning about each unless
/// `nowarn` is set. `EOF` and `error` are never reported.
#[tracing::instrument(skip_all)]
pub fn check_unused(g: &Grammar, nowarn: bool, sink: &mut dyn DiagnosticSink) -> Unused {
    let mut unused = Unused::default();

    for t in g.terminals.values() {
        if t.id == TerminalID::EOF || t.id == TerminalID::ERROR || t.use_count > 0 {
            continue;
        }
        unused.terminals.push(t.id);
        if !nowarn {
            sink.report(g, Diagnostic::UnusedTerminal { terminal: t.id });
        }
    }

    for n in g.nonterminals.values() {
        if n.use_count > 0 {
            continue;
        }
        unused.nonterminals.push(n.id);
        if !nowarn {
            sink.report(g, Diagnostic::UnusedNonterminal { nonterminal: n.id });
        }
    }

    tracing::debug!(
        "{} unused terminals, {} unused nonterminals",
        unused.terminals.len(),
        unused.nonterminals.len()
    );
    unused
}
