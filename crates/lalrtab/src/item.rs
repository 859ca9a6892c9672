//! LALR items and item sets.

use crate::{
    automaton::StateID,
    error::InternalError,
    first_sets,
    grammar::{Grammar, ProductionID, SymbolID, TerminalSet},
    util::{display_fn, Map},
};
use std::fmt;

/// The LR(0) part of an item, i.e. a production with a marker position.
///
/// This pair is the identity of an item; the lookahead does not take part.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemCore {
    pub production: ProductionID,
    pub dot: u16,
}
impl ItemCore {
    pub const fn new(production: ProductionID, dot: u16) -> Self {
        Self { production, dot }
    }

    pub fn symbol_after_dot(&self, g: &Grammar) -> Result<Option<SymbolID>, InternalError> {
        Ok(g.production(self.production)?.symbol_at(self.dot as usize))
    }

    pub fn dot_at_end(&self, g: &Grammar) -> Result<bool, InternalError> {
        Ok(self.dot as usize >= g.production(self.production)?.len())
    }

    /// `A ::= b (*) C`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let production = match g.productions.get(&self.production) {
                Some(p) => p,
                None => return write!(f, "{:?}", self),
            };
            write!(f, "{} ::=", g.nonterminals[&production.lhs])?;
            for (i, part) in production.rhs.iter().enumerate() {
                if i == self.dot as usize {
                    f.write_str(" (*)")?;
                }
                write!(f, " {}", g.symbol_name(part.symbol))?;
            }
            if self.dot as usize >= production.len() {
                f.write_str(" (*)")?;
            }
            Ok(())
        })
    }
}
impl fmt::Debug for ItemCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.production, self.dot)
    }
}

/// A reference to an item slot in a state, used as a propagation link.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub state: StateID,
    pub slot: usize,
}

#[derive(Debug, Clone)]
pub struct LalrItem {
    pub core: ItemCore,
    pub lookahead: TerminalSet,
    /// Items that receive this item's lookahead once the automaton is complete.
    pub propagate_to: Vec<ItemRef>,
}

impl LalrItem {
    /// An item with the marker at the front of `production`.
    pub fn new(production: ProductionID, lookahead: TerminalSet) -> Self {
        Self {
            core: ItemCore::new(production, 0),
            lookahead,
            propagate_to: vec![],
        }
    }

    pub fn symbol_after_dot(&self, g: &Grammar) -> Result<Option<SymbolID>, InternalError> {
        self.core.symbol_after_dot(g)
    }

    pub fn dot_at_end(&self, g: &Grammar) -> Result<bool, InternalError> {
        self.core.dot_at_end(g)
    }

    /// The item with the marker moved over the next symbol.
    ///
    /// The lookahead of the new item starts out empty and is filled in by
    /// propagation.
    pub fn shift(&self, g: &Grammar) -> Result<Self, InternalError> {
        if self.dot_at_end(g)? {
            return Err(InternalError::ShiftAtEnd {
                production: self.core.production,
            });
        }
        Ok(Self {
            core: ItemCore::new(self.core.production, self.core.dot + 1),
            lookahead: TerminalSet::new(),
            propagate_to: vec![],
        })
    }

    pub fn add_propagate(&mut self, target: ItemRef) {
        if !self.propagate_to.contains(&target) {
            self.propagate_to.push(target);
        }
    }
}

/// Sorted item cores identifying a state before closure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Kernel(Vec<ItemCore>);
impl Kernel {
    pub fn cores(&self) -> &[ItemCore] {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl FromIterator<ItemCore> for Kernel {
    fn from_iter<I: IntoIterator<Item = ItemCore>>(iter: I) -> Self {
        let mut cores: Vec<ItemCore> = iter.into_iter().collect();
        cores.sort();
        cores.dedup();
        Self(cores)
    }
}

/// Items addressed by slot, in insertion order, at most one per core.
#[derive(Debug, Default, Clone)]
pub struct LalrItemSet {
    items: Vec<LalrItem>,
    slots: Map<ItemCore, usize>,
}

impl LalrItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LalrItem> + '_ {
        self.items.iter()
    }

    pub fn get(&self, slot: usize) -> Option<&LalrItem> {
        self.items.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut LalrItem> {
        self.items.get_mut(slot)
    }

    pub fn find(&self, core: ItemCore) -> Option<usize> {
        self.slots.get(&core).copied()
    }

    /// Add `item`, or merge its lookahead into the item with the same core.
    ///
    /// Returns the slot of the item and whether it was newly inserted.
    pub fn add(&mut self, item: LalrItem) -> (usize, bool) {
        match self.slots.get(&item.core) {
            Some(&slot) => {
                self.items[slot].lookahead.union_with(&item.lookahead);
                (slot, false)
            }
            None => {
                let slot = self.items.len();
                self.slots.insert(item.core, slot);
                self.items.push(item);
                (slot, true)
            }
        }
    }

    /// The kernel built from every item currently in this set.
    pub fn kernel(&self) -> Kernel {
        self.items.iter().map(|item| item.core).collect()
    }

    /// Close this set for state `owner`.
    ///
    /// For `[A ::= α (*) B β, L]` the items `[B ::= (*) γ, First(β L)]` are
    /// added. When `β` is nullable the parent also gets a propagation link to
    /// each added item, so lookaheads it receives later flow on.
    pub fn compute_closure(&mut self, g: &Grammar, owner: StateID) -> Result<(), InternalError> {
        let mut consider: Vec<usize> = (0..self.items.len()).rev().collect();
        while let Some(slot) = consider.pop() {
            let core = self.items[slot].core;
            let production = g.production(core.production)?;
            let nt = match production.symbol_at(core.dot as usize) {
                Some(SymbolID::N(nt)) => nt,
                _ => continue,
            };

            let rest = &production.rhs[core.dot as usize + 1..];
            let (lookahead, needs_propagation) =
                first_sets::first_with_lookahead(g, rest, &self.items[slot].lookahead);

            for &p in &g.nonterminals[&nt].productions {
                let (added, is_new) = self.add(LalrItem::new(p, lookahead.clone()));
                if needs_propagation {
                    self.items[slot].add_propagate(ItemRef {
                        state: owner,
                        slot: added,
                    });
                }
                if is_new {
                    consider.push(added);
                }
            }
        }
        Ok(())
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for item in &self.items {
                writeln!(
                    f,
                    "- [{}, {}]",
                    item.core.display(g),
                    item.lookahead.display(g)
                )?;
            }
            Ok(())
        })
    }
}

/// Item sets compare by their cores only.
impl PartialEq for LalrItemSet {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self.slots.keys().all(|core| other.slots.contains_key(core))
    }
}
impl Eq for LalrItemSet {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{SymbolID::*, TerminalID};

    fn grammar() -> Grammar {
        // s → a s b | ε | c t
        // t → s d
        Grammar::define(|def| {
            let a = def.terminal("A", None)?;
            let b = def.terminal("B", None)?;
            let c = def.terminal("C", None)?;
            let d = def.terminal("D", None)?;
            let s = def.nonterminal("s")?;
            let t = def.nonterminal("t")?;
            def.rule(s, [T(a), N(s), T(b)], None)?;
            def.rule(s, [], None)?;
            def.rule(s, [T(c), N(t)], None)?;
            def.rule(t, [N(s), T(d)], None)?;
            Ok(())
        })
        .unwrap()
    }

    fn start_set() -> LalrItemSet {
        let mut items = LalrItemSet::new();
        items.add(LalrItem::new(
            ProductionID::START,
            [TerminalID::EOF].into_iter().collect(),
        ));
        items
    }

    #[test]
    fn closure_of_start_item() {
        let g = grammar();
        let mut items = start_set();
        items.compute_closure(&g, StateID::START).unwrap();
        eprintln!("{}", items.display(&g));

        // $START ::= (*) s, plus the three s productions
        assert_eq!(items.len(), 4);
        let eof: TerminalSet = [TerminalID::EOF].into_iter().collect();
        for item in items.iter().skip(1) {
            assert_eq!(item.core.dot, 0);
            assert_eq!(item.lookahead, eof);
        }
        // s is the last symbol, so the start item passes its lookahead on
        let start = items.get(0).unwrap();
        assert_eq!(start.propagate_to.len(), 3);
        assert!(start
            .propagate_to
            .iter()
            .all(|link| link.state == StateID::START));
    }

    #[test]
    fn closure_uses_first_of_remainder() {
        let g = grammar();
        let d = g.terminal_by_name("D").unwrap();
        let t = g.nonterminal_by_name("t").unwrap();
        let t_prod = g.nonterminals[&t].productions[0];

        let mut items = LalrItemSet::new();
        items.add(LalrItem::new(t_prod, TerminalSet::new()));
        items.compute_closure(&g, StateID::START).unwrap();

        // t ::= (*) s D adds the s productions under {D} without links
        assert_eq!(items.len(), 4);
        assert!(items.get(0).unwrap().propagate_to.is_empty());
        let expected: TerminalSet = [d].into_iter().collect();
        for item in items.iter().skip(1) {
            assert_eq!(item.lookahead, expected);
        }
    }

    #[test]
    fn closure_is_idempotent() {
        let g = grammar();
        let mut once = start_set();
        once.compute_closure(&g, StateID::START).unwrap();
        let mut twice = once.clone();
        twice.compute_closure(&g, StateID::START).unwrap();

        assert_eq!(once, twice);
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.core, b.core);
            assert_eq!(a.lookahead, b.lookahead);
            assert_eq!(a.propagate_to, b.propagate_to);
        }
    }

    #[test]
    fn add_merges_lookaheads() {
        let t = TerminalID::from_raw;
        let p = ProductionID::from_raw(1);
        let mut items = LalrItemSet::new();
        let (first, is_new) = items.add(LalrItem::new(p, [t(2)].into_iter().collect()));
        assert!(is_new);
        let (second, is_new) = items.add(LalrItem::new(p, [t(3)].into_iter().collect()));
        assert!(!is_new);
        assert_eq!(first, second);
        assert_eq!(items.len(), 1);
        assert_eq!(
            items.get(first).unwrap().lookahead,
            [t(2), t(3)].into_iter().collect()
        );
    }

    #[test]
    fn shift_moves_marker() {
        let g = grammar();
        let item = LalrItem::new(
            ProductionID::from_raw(1),
            [TerminalID::EOF].into_iter().collect(),
        );
        let shifted = item.shift(&g).unwrap();
        assert_eq!(shifted.core, ItemCore::new(ProductionID::from_raw(1), 1));
        assert!(shifted.lookahead.is_empty());

        let shifted = shifted.shift(&g).unwrap().shift(&g).unwrap();
        assert!(shifted.dot_at_end(&g).unwrap());
        assert_eq!(
            shifted.shift(&g).unwrap_err(),
            InternalError::ShiftAtEnd {
                production: ProductionID::from_raw(1)
            }
        );
    }

    #[test]
    fn equality_ignores_lookaheads() {
        let t = TerminalID::from_raw;
        let mut a = LalrItemSet::new();
        a.add(LalrItem::new(ProductionID::from_raw(1), [t(2)].into_iter().collect()));
        a.add(LalrItem::new(ProductionID::from_raw(2), TerminalSet::new()));
        let mut b = LalrItemSet::new();
        b.add(LalrItem::new(ProductionID::from_raw(2), [t(5)].into_iter().collect()));
        b.add(LalrItem::new(ProductionID::from_raw(1), TerminalSet::new()));
        assert_eq!(a, b);
        assert_eq!(a.kernel(), b.kernel());
    }
}
