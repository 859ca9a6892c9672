//! Calculation of nullability and first sets.

use crate::grammar::{Grammar, NonterminalID, SymbolID, SymbolPart, TerminalSet};

/// Fill in the derived `nullable` and `first_set` fields of every
/// nonterminal and production.
pub(crate) fn compute(g: &mut Grammar) {
    compute_nullability(g);
    compute_first_sets(g);
}

fn compute_nullability(g: &mut Grammar) {
    // 値が更新されなくなるまで繰り返す
    loop {
        let view: &Grammar = g;
        let newly_nullable: Vec<NonterminalID> = view
            .nonterminals
            .values()
            .filter(|n| !n.nullable)
            .filter(|n| {
                n.productions.iter().any(|p| {
                    view.productions[p]
                        .rhs
                        .iter()
                        .all(|part| is_nullable(view, part.symbol))
                })
            })
            .map(|n| n.id)
            .collect();
        if newly_nullable.is_empty() {
            break;
        }
        for id in newly_nullable {
            g.nonterminals[&id].nullable = true;
        }
    }

    let view: &Grammar = g;
    let nullable_productions: Vec<_> = view
        .productions
        .values()
        .filter(|p| p.rhs.iter().all(|part| is_nullable(view, part.symbol)))
        .map(|p| p.id)
        .collect();
    for id in nullable_productions {
        g.productions[&id].nullable = true;
    }
}

fn compute_first_sets(g: &mut Grammar) {
    let ids: Vec<NonterminalID> = g.nonterminals.keys().copied().collect();
    let mut changed = true;
    while changed {
        changed = false;
        for &id in &ids {
            let view: &Grammar = g;
            let mut first_set = TerminalSet::new();
            for p in &view.nonterminals[&id].productions {
                let (prod_first, _) = first_of(view, &view.productions[p].rhs);
                first_set.union_with(&prod_first);
            }
            changed |= g.nonterminals[&id].first_set.union_with(&first_set);
        }
    }

    let view: &Grammar = g;
    let firsts: Vec<_> = view
        .productions
        .values()
        .map(|p| (p.id, first_of(view, &p.rhs).0))
        .collect();
    for (id, first_set) in firsts {
        g.productions[&id].first_set = first_set;
    }
}

fn is_nullable(g: &Grammar, symbol: SymbolID) -> bool {
    match symbol {
        SymbolID::T(_) => false,
        SymbolID::N(n) => g.nonterminals[&n].nullable,
    }
}

/// `First(symbols)`, together with whether every one of `symbols` is nullable.
pub(crate) fn first_of(g: &Grammar, symbols: &[SymbolPart]) -> (TerminalSet, bool) {
    let mut first_set = TerminalSet::new();
    for part in symbols {
        match part.symbol {
            SymbolID::T(t) => {
                first_set.insert(t);
                return (first_set, false);
            }
            SymbolID::N(n) => {
                let n = &g.nonterminals[&n];
                first_set.union_with(&n.first_set);
                if !n.nullable {
                    return (first_set, false);
                }
            }
        }
    }
    (first_set, true)
}

/// `First(symbols lookahead)`, and whether `symbols` let the lookahead through.
pub(crate) fn first_with_lookahead(
    g: &Grammar,
    symbols: &[SymbolPart],
    lookahead: &TerminalSet,
) -> (TerminalSet, bool) {
    let (mut first_set, nullable) = first_of(g, symbols);
    if nullable {
        first_set.union_with(lookahead);
    }
    (first_set, nullable)
}
