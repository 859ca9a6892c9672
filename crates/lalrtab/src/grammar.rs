//! Context-free grammars.

use crate::{
    error::InternalError,
    first_sets,
    util::{display_fn, Map},
};
use std::fmt;

// ==== symbol and production identifiers ====

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID(u16);
impl TerminalID {
    /// The end of input.
    pub const EOF: Self = Self(0);
    /// The reserved terminal used for error recovery.
    pub const ERROR: Self = Self(1);
    const OFFSET: u16 = 2;

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
impl fmt::Debug for TerminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EOF => write!(f, "T#EOF"),
            Self::ERROR => write!(f, "T#Error"),
            _ => write!(f, "T#{:03}", self.0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID(u16);
impl NonterminalID {
    /// The synthetic start symbol `$START`.
    pub const START: Self = Self(0);
    const OFFSET: u16 = 1;

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
impl fmt::Debug for NonterminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::START => write!(f, "N#Start"),
            _ => write!(f, "N#{:03}", self.0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}
impl fmt::Debug for SymbolID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T(t) => write!(f, "{:?}", t),
            Self::N(n) => write!(f, "{:?}", n),
        }
    }
}
impl From<TerminalID> for SymbolID {
    fn from(t: TerminalID) -> Self {
        Self::T(t)
    }
}
impl From<NonterminalID> for SymbolID {
    fn from(n: NonterminalID) -> Self {
        Self::N(n)
    }
}

/// Index of a production. Lower indices win reduce/reduce conflicts.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID(u16);
impl ProductionID {
    /// The start production `$START ::= S`.
    pub const START: Self = Self(0);
    const OFFSET: u16 = 1;

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
impl fmt::Debug for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::START => write!(f, "P#Start"),
            _ => write!(f, "P#{:03}", self.0),
        }
    }
}

// ==== terminal sets ====

/// A set of terminal symbols, used for first sets and item lookaheads.
#[derive(Default, Clone)]
pub struct TerminalSet {
    inner: bit_set::BitSet,
}
impl TerminalSet {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn contains(&self, id: TerminalID) -> bool {
        self.inner.contains(id.index())
    }
    pub fn insert(&mut self, id: TerminalID) -> bool {
        self.inner.insert(id.index())
    }
    /// Merge `other` into this set, returning whether this set grew.
    pub fn union_with(&mut self, other: &Self) -> bool {
        if other.inner.is_subset(&self.inner) {
            return false;
        }
        self.inner.union_with(&other.inner);
        true
    }
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            inner: self.inner.intersection(&other.inner).collect(),
        }
    }
    pub fn is_subset(&self, other: &Self) -> bool {
        self.inner.is_subset(&other.inner)
    }
    pub fn intersects(&self, other: &Self) -> bool {
        !self.inner.is_disjoint(&other.inner)
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = TerminalID> + '_ {
        self.inner.iter().map(|raw| TerminalID(raw as u16))
    }
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            f.write_str("{")?;
            crate::util::write_comma_separated(
                f,
                self.iter().map(|t| g.terminals[&t].name.as_str()),
            )?;
            f.write_str("}")
        })
    }
}
impl PartialEq for TerminalSet {
    fn eq(&self, other: &Self) -> bool {
        self.inner.is_subset(&other.inner) && other.inner.is_subset(&self.inner)
    }
}
impl Eq for TerminalSet {}
impl fmt::Debug for TerminalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
impl FromIterator<TerminalID> for TerminalSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = TerminalID>,
    {
        Self {
            inner: iter.into_iter().map(TerminalID::index).collect(),
        }
    }
}

// ==== precedence ====

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Precedence {
    pub priority: u16,
    pub assoc: Assoc,
}
impl Precedence {
    pub const fn new(priority: u16, assoc: Assoc) -> Self {
        Self { priority, assoc }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
}
impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Nonassoc => write!(f, "nonassoc"),
        }
    }
}

// ==== symbols ====

#[derive(Debug)]
pub struct Terminal {
    pub id: TerminalID,
    pub name: String,
    /// The type tag of the semantic value, opaque to the generator.
    pub stack_type: Option<String>,
    pub precedence: Option<Precedence>,
    pub use_count: usize,
}
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    pub id: NonterminalID,
    pub name: String,
    pub stack_type: Option<String>,
    /// Whether this symbol was introduced to host a mid-rule action.
    pub is_embedded_action: bool,
    pub nullable: bool,
    pub first_set: TerminalSet,
    /// Productions with this symbol on the left side, in index order.
    pub productions: Vec<ProductionID>,
    pub use_count: usize,
}
impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ==== productions ====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolPart {
    pub symbol: SymbolID,
    pub label: Option<String>,
}

/// A right-hand side element as written in a rule declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RhsPart {
    Symbol(SymbolPart),
    Action(String),
}
impl RhsPart {
    pub fn labeled(symbol: impl Into<SymbolID>, label: &str) -> Self {
        Self::Symbol(SymbolPart {
            symbol: symbol.into(),
            label: Some(label.into()),
        })
    }
    pub fn action(code: &str) -> Self {
        Self::Action(code.into())
    }
}
impl From<SymbolID> for RhsPart {
    fn from(symbol: SymbolID) -> Self {
        Self::Symbol(SymbolPart {
            symbol,
            label: None,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProductionKind {
    Plain,
    /// An empty production hosting a mid-rule action of `base`.
    /// `offset` is the position of the hosting symbol in `base`'s right side,
    /// i.e. the number of already-parsed values below it on the stack.
    EmbeddedAction { base: ProductionID, offset: usize },
}

#[derive(Debug)]
pub struct Production {
    pub id: ProductionID,
    pub lhs: NonterminalID,
    /// Right side symbols; mid-rule actions have been split out.
    pub rhs: Vec<SymbolPart>,
    /// Code run on reduction.
    pub action: Option<String>,
    pub precedence: Option<Precedence>,
    pub nullable: bool,
    pub first_set: TerminalSet,
    pub kind: ProductionKind,
}
impl Production {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    /// The symbol at position `pos` of the right side, if any.
    pub fn symbol_at(&self, pos: usize) -> Option<SymbolID> {
        self.rhs.get(pos).map(|part| part.symbol)
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{} ::=", g.nonterminals[&self.lhs])?;
            if self.rhs.is_empty() {
                f.write_str(" ε")?;
            }
            for part in &self.rhs {
                write!(f, " {}", g.symbol_name(part.symbol))?;
            }
            Ok(())
        })
    }
}

// ==== grammar ====

#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub productions: Map<ProductionID, Production>,
    pub start_symbol: NonterminalID,
}

impl Grammar {
    /// Define a grammar, then close it: add the start production and compute
    /// nullability and first sets.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            productions: Map::default(),
            start: None,
            next_terminal: TerminalID::OFFSET,
            next_nonterminal: NonterminalID::OFFSET,
            next_production: ProductionID::OFFSET,
            next_embedded: 0,
            next_priority: 1,
        };
        def.insert_terminal(TerminalID::EOF, "EOF", None);
        def.insert_terminal(TerminalID::ERROR, "error", None);
        def.insert_nonterminal(NonterminalID::START, "$START", false, None);

        f(&mut def)?;

        def.end()
    }

    /// Look up a production by index.
    pub fn production(&self, id: ProductionID) -> Result<&Production, InternalError> {
        self.productions
            .get(&id)
            .ok_or(InternalError::UnknownProduction(id))
    }

    pub fn terminal_by_name(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .values()
            .find(|t| t.name == name)
            .map(|t| t.id)
    }

    pub fn nonterminal_by_name(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .values()
            .find(|n| n.name == name)
            .map(|n| n.id)
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => &self.terminals[&t].name,
            SymbolID::N(n) => &self.nonterminals[&n].name,
        }
    }

    pub fn num_terminals(&self) -> usize {
        self.terminals.len()
    }

    pub fn num_nonterminals(&self) -> usize {
        self.nonterminals.len()
    }

    pub fn num_productions(&self) -> usize {
        self.productions.len()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#### terminals:")?;
        for t in self.terminals.values() {
            write!(f, "- [{}] {}", t.id.index(), t.name)?;
            if let Some(ty) = &t.stack_type {
                write!(f, " <{}>", ty)?;
            }
            if let Some(prec) = t.precedence {
                write!(f, " (priority = {}, assoc = {})", prec.priority, prec.assoc)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "#### nonterminals:")?;
        for n in self.nonterminals.values() {
            write!(f, "- [{}] {}", n.id.index(), n.name)?;
            if let Some(ty) = &n.stack_type {
                write!(f, " <{}>", ty)?;
            }
            if n.nullable {
                f.write_str(" (nullable)")?;
            }
            write!(f, " first = {}", n.first_set.display(self))?;
            writeln!(f)?;
        }
        writeln!(f, "#### productions:")?;
        for p in self.productions.values() {
            write!(f, "- [{}] {}", p.id.index(), p.display(self))?;
            if let ProductionKind::EmbeddedAction { base, offset } = p.kind {
                write!(f, " (embedded in [{}] at {})", base.index(), offset)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The registries under construction, handed to the closure passed to
/// [`Grammar::define`].
#[derive(Debug)]
pub struct GrammarDef {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    productions: Map<ProductionID, Production>,
    start: Option<NonterminalID>,
    next_terminal: u16,
    next_nonterminal: u16,
    next_production: u16,
    next_embedded: usize,
    next_priority: u16,
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(
        &mut self,
        name: &str,
        precedence: Option<Precedence>,
    ) -> Result<TerminalID, GrammarDefError> {
        if self.terminals.values().any(|t| t.name == name) {
            return Err(GrammarDefError::DuplicateTerminal { name: name.into() });
        }
        let id = TerminalID(self.next_terminal);
        self.next_terminal = self
            .next_terminal
            .checked_add(1)
            .ok_or(GrammarDefError::TooManySymbols)?;
        self.insert_terminal(id, name, precedence);
        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarDefError> {
        if self.nonterminals.values().any(|n| n.name == name) {
            return Err(GrammarDefError::DuplicateNonterminal { name: name.into() });
        }
        let id = self.fresh_nonterminal()?;
        self.insert_nonterminal(id, name, false, None);
        Ok(id)
    }

    /// Attach the semantic value type tag to a symbol.
    pub fn stack_type(
        &mut self,
        symbol: impl Into<SymbolID>,
        ty: &str,
    ) -> Result<(), GrammarDefError> {
        let symbol = symbol.into();
        let slot = match symbol {
            SymbolID::T(t) => self.terminals.get_mut(&t).map(|t| &mut t.stack_type),
            SymbolID::N(n) => self.nonterminals.get_mut(&n).map(|n| &mut n.stack_type),
        };
        let slot = slot.ok_or(GrammarDefError::UnknownSymbol { symbol })?;
        slot.replace(ty.into());
        Ok(())
    }

    /// Declare one precedence level for `terminals`.
    ///
    /// Each call opens a level binding tighter than every level declared
    /// before it.
    pub fn precedence<I>(&mut self, assoc: Assoc, terminals: I) -> Result<(), GrammarDefError>
    where
        I: IntoIterator<Item = TerminalID>,
    {
        let prec = Precedence::new(self.next_priority, assoc);
        self.next_priority = self
            .next_priority
            .checked_add(1)
            .ok_or_else(|| GrammarDefError::from("too many precedence levels"))?;
        for t in terminals {
            let terminal = self
                .terminals
                .get_mut(&t)
                .ok_or(GrammarDefError::UnknownSymbol {
                    symbol: SymbolID::T(t),
                })?;
            terminal.precedence.replace(prec);
        }
        Ok(())
    }

    /// Specify a production rule into this grammar.
    pub fn rule<I>(
        &mut self,
        left: NonterminalID,
        right: I,
        precedence: Option<Precedence>,
    ) -> Result<ProductionID, GrammarDefError>
    where
        I: IntoIterator<Item = SymbolID>,
    {
        self.rule_with_parts(left, right.into_iter().map(RhsPart::from), precedence)
    }

    /// Specify a production rule whose right side carries labels or actions.
    ///
    /// A trailing action part becomes the action of the production. Every
    /// other action part is moved into a fresh empty production of a hidden
    /// nonterminal `NT$k`, which takes the place of the action.
    pub fn rule_with_parts<I>(
        &mut self,
        left: NonterminalID,
        right: I,
        precedence: Option<Precedence>,
    ) -> Result<ProductionID, GrammarDefError>
    where
        I: IntoIterator<Item = RhsPart>,
    {
        if !self.nonterminals.contains_key(&left) || left == NonterminalID::START {
            return Err(GrammarDefError::UnknownSymbol {
                symbol: SymbolID::N(left),
            });
        }

        let mut parts: Vec<RhsPart> = Vec::new();
        for part in right {
            // adjacent actions are run as one
            if let (RhsPart::Action(code), Some(RhsPart::Action(prev))) = (&part, parts.last_mut()) {
                prev.push('\n');
                prev.push_str(code);
                continue;
            }
            parts.push(part);
        }
        for part in &parts {
            if let RhsPart::Symbol(SymbolPart { symbol, .. }) = part {
                self.check_symbol(*symbol)?;
            }
        }

        let action = if matches!(parts.last(), Some(RhsPart::Action(_))) {
            match parts.pop() {
                Some(RhsPart::Action(code)) => Some(code),
                _ => None,
            }
        } else {
            None
        };

        let num_embedded = parts
            .iter()
            .filter(|p| matches!(p, RhsPart::Action(_)))
            .count();
        if num_embedded == 0 {
            let duplicated = self.productions.values().any(|p| {
                p.lhs == left
                    && p.rhs.len() == parts.len()
                    && p.rhs.iter().zip(&parts).all(|(a, b)| match b {
                        RhsPart::Symbol(b) => a.symbol == b.symbol,
                        RhsPart::Action(_) => false,
                    })
            });
            if duplicated {
                return Err(GrammarDefError::DuplicateRule {
                    lhs: self.nonterminals[&left].name.clone(),
                });
            }
        }

        // embedded action productions take the indices right before the base
        let base = u16::try_from(num_embedded)
            .ok()
            .and_then(|n| self.next_production.checked_add(n))
            .map(ProductionID)
            .ok_or(GrammarDefError::TooManyProductions)?;

        let lhs_type = self.nonterminals[&left].stack_type.clone();
        let mut rhs = Vec::with_capacity(parts.len());
        for (offset, part) in parts.into_iter().enumerate() {
            match part {
                RhsPart::Symbol(part) => rhs.push(part),
                RhsPart::Action(code) => {
                    let nt = self.fresh_nonterminal()?;
                    let name = format!("NT${}", self.next_embedded);
                    self.next_embedded += 1;
                    self.insert_nonterminal(nt, &name, true, lhs_type.clone());
                    self.push_production(
                        nt,
                        vec![],
                        Some(code),
                        None,
                        ProductionKind::EmbeddedAction { base, offset },
                    )?;
                    rhs.push(SymbolPart {
                        symbol: SymbolID::N(nt),
                        label: None,
                    });
                }
            }
        }

        let id = self.push_production(left, rhs, action, precedence, ProductionKind::Plain)?;
        debug_assert_eq!(id, base);
        Ok(id)
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: NonterminalID) -> Result<(), GrammarDefError> {
        self.check_symbol(SymbolID::N(symbol))?;
        if symbol == NonterminalID::START {
            return Err(GrammarDefError::UnknownSymbol {
                symbol: SymbolID::N(symbol),
            });
        }
        self.start.replace(symbol);
        Ok(())
    }

    fn end(mut self) -> Result<Grammar, GrammarDefError> {
        // when not specified, the first declared nonterminal is the start symbol
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .values()
                .find(|n| n.id != NonterminalID::START && !n.is_embedded_action)
                .map(|n| n.id)
                .ok_or(GrammarDefError::NoStartSymbol)?,
        };
        if self.productions.is_empty() {
            return Err(GrammarDefError::EmptyGrammar);
        }

        self.productions.insert(
            ProductionID::START,
            Production {
                id: ProductionID::START,
                lhs: NonterminalID::START,
                rhs: vec![SymbolPart {
                    symbol: SymbolID::N(start),
                    label: None,
                }],
                action: None,
                precedence: None,
                nullable: false,
                first_set: TerminalSet::new(),
                kind: ProductionKind::Plain,
            },
        );
        self.productions.sort_keys();
        self.note_uses(NonterminalID::START, &[SymbolID::N(start)]);

        // an undeclared production precedence comes from its rightmost terminal
        // that has one
        for p in self.productions.values_mut() {
            if p.precedence.is_none() {
                p.precedence = p.rhs.iter().rev().find_map(|part| match part.symbol {
                    SymbolID::T(t) => self.terminals[&t].precedence,
                    SymbolID::N(_) => None,
                });
            }
        }

        for p in self.productions.values() {
            self.nonterminals[&p.lhs].productions.push(p.id);
        }

        let mut grammar = Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            productions: self.productions,
            start_symbol: start,
        };
        first_sets::compute(&mut grammar);

        Ok(grammar)
    }

    fn insert_terminal(&mut self, id: TerminalID, name: &str, precedence: Option<Precedence>) {
        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.into(),
                stack_type: None,
                precedence,
                use_count: 0,
            },
        );
    }

    fn insert_nonterminal(
        &mut self,
        id: NonterminalID,
        name: &str,
        is_embedded_action: bool,
        stack_type: Option<String>,
    ) {
        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.into(),
                stack_type,
                is_embedded_action,
                nullable: false,
                first_set: TerminalSet::new(),
                productions: vec![],
                use_count: 0,
            },
        );
    }

    fn fresh_nonterminal(&mut self) -> Result<NonterminalID, GrammarDefError> {
        let id = NonterminalID(self.next_nonterminal);
        self.next_nonterminal = self
            .next_nonterminal
            .checked_add(1)
            .ok_or(GrammarDefError::TooManySymbols)?;
        Ok(id)
    }

    fn push_production(
        &mut self,
        lhs: NonterminalID,
        rhs: Vec<SymbolPart>,
        action: Option<String>,
        precedence: Option<Precedence>,
        kind: ProductionKind,
    ) -> Result<ProductionID, GrammarDefError> {
        let id = ProductionID(self.next_production);
        self.next_production = self
            .next_production
            .checked_add(1)
            .ok_or(GrammarDefError::TooManyProductions)?;
        let symbols: Vec<SymbolID> = rhs.iter().map(|part| part.symbol).collect();
        self.note_uses(lhs, &symbols);
        self.productions.insert(
            id,
            Production {
                id,
                lhs,
                rhs,
                action,
                precedence,
                nullable: false,
                first_set: TerminalSet::new(),
                kind,
            },
        );
        Ok(id)
    }

    fn note_uses(&mut self, lhs: NonterminalID, rhs: &[SymbolID]) {
        self.nonterminals[&lhs].use_count += 1;
        for symbol in rhs {
            match symbol {
                SymbolID::T(t) => self.terminals[t].use_count += 1,
                SymbolID::N(n) => self.nonterminals[n].use_count += 1,
            }
        }
    }

    fn check_symbol(&self, symbol: SymbolID) -> Result<(), GrammarDefError> {
        let known = match symbol {
            SymbolID::T(t) => self.terminals.contains_key(&t),
            SymbolID::N(n) => self.nonterminals.contains_key(&n),
        };
        if known {
            Ok(())
        } else {
            Err(GrammarDefError::UnknownSymbol { symbol })
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GrammarDefError {
    #[error("the terminal `{name}' has already been declared")]
    DuplicateTerminal { name: String },

    #[error("the nonterminal `{name}' has already been declared")]
    DuplicateNonterminal { name: String },

    #[error("duplicate production rule detected for `{lhs}'")]
    DuplicateRule { lhs: String },

    #[error("the symbol {symbol:?} is not declared in this grammar")]
    UnknownSymbol { symbol: SymbolID },

    #[error("the start symbol is not specified and no nonterminal is declared")]
    NoStartSymbol,

    #[error("the grammar has no production rules")]
    EmptyGrammar,

    #[error("too many symbols declared")]
    TooManySymbols,

    #[error("too many production rules declared")]
    TooManyProductions,

    #[error("Other error: {}", msg)]
    Other { msg: String },
}
impl From<&str> for GrammarDefError {
    fn from(msg: &str) -> Self {
        Self::Other { msg: msg.into() }
    }
}
impl From<String> for GrammarDefError {
    fn from(msg: String) -> Self {
        Self::Other { msg }
    }
}
