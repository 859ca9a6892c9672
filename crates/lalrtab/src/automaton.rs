//! The LALR viable-prefix recognizer.

use crate::{
    error::InternalError,
    grammar::{Grammar, ProductionID, SymbolID, TerminalID},
    item::{ItemCore, ItemRef, Kernel, LalrItem, LalrItemSet},
    util::{display_fn, Map, Set},
};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u16);
impl StateID {
    pub const START: Self = Self(0);

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
impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

#[derive(Debug)]
pub struct LalrState {
    pub id: StateID,
    /// The closed item set. The kernel items occupy the first slots.
    pub items: LalrItemSet,
    pub kernel_len: usize,
    /// Outgoing edges in discovery order.
    pub transitions: Vec<(SymbolID, StateID)>,
}

impl LalrState {
    pub fn kernel_items(&self) -> impl Iterator<Item = &LalrItem> + '_ {
        self.items.iter().take(self.kernel_len)
    }

    pub fn transition(&self, symbol: SymbolID) -> Option<StateID> {
        self.transitions
            .iter()
            .find(|(sym, _)| *sym == symbol)
            .map(|(_, to)| *to)
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            writeln!(f, "## kernels:")?;
            for item in self.kernel_items() {
                writeln!(
                    f,
                    "- [{}, {}]",
                    item.core.display(g),
                    item.lookahead.display(g)
                )?;
            }
            if self.items.len() > self.kernel_len {
                writeln!(f, "## closure:")?;
                for item in self.items.iter().skip(self.kernel_len) {
                    writeln!(
                        f,
                        "- [{}, {}]",
                        item.core.display(g),
                        item.lookahead.display(g)
                    )?;
                }
            }
            if !self.transitions.is_empty() {
                writeln!(f, "## transitions:")?;
                for (sym, to) in &self.transitions {
                    writeln!(f, "- {} => {:?}", g.symbol_name(*sym), to)?;
                }
            }
            Ok(())
        })
    }
}

#[derive(Debug)]
pub struct Automaton {
    /// States indexed by their ID, in discovery order.
    pub states: Vec<LalrState>,
    kernels: Map<Kernel, StateID>,
    /// Number of passes lookahead propagation took to reach its fixed point.
    pub propagation_passes: usize,
}

impl Automaton {
    /// Build the states and transitions, then propagate lookaheads until
    /// nothing changes.
    pub fn build(g: &Grammar) -> Result<Self, InternalError> {
        let mut automaton = Self::build_machine(g)?;
        automaton.propagate_lookaheads()?;
        Ok(automaton)
    }

    pub(crate) fn build_machine(g: &Grammar) -> Result<Self, InternalError> {
        let span = tracing::debug_span!("build_machine");
        let _entered = span.enter();

        let mut automaton = Self {
            states: vec![],
            kernels: Map::default(),
            propagation_passes: 0,
        };

        let mut start_items = LalrItemSet::new();
        start_items.add(LalrItem::new(
            ProductionID::START,
            [TerminalID::EOF].into_iter().collect(),
        ));
        let kernel = start_items.kernel();
        start_items.compute_closure(g, automaton.next_state_id()?)?;
        let start = automaton.create_state(kernel, start_items)?;

        let mut work_stack = vec![start];
        while let Some(st) = work_stack.pop() {
            let outgoing: Set<SymbolID> = {
                let mut outgoing = Set::default();
                for item in automaton.state(st)?.items.iter() {
                    if let Some(sym) = item.symbol_after_dot(g)? {
                        outgoing.insert(sym);
                    }
                }
                outgoing
            };

            for sym in outgoing {
                // shift every item expecting `sym`, remembering where it came from
                let mut new_items = LalrItemSet::new();
                let mut linked: Vec<(usize, ItemCore)> = vec![];
                for (slot, item) in automaton.state(st)?.items.iter().enumerate() {
                    if item.symbol_after_dot(g)? == Some(sym) {
                        let shifted = item.shift(g)?;
                        linked.push((slot, shifted.core));
                        new_items.add(shifted);
                    }
                }

                let kernel = new_items.kernel();
                let target = match automaton.kernels.get(&kernel) {
                    Some(&existing) => {
                        tracing::trace!("{:?} --({:?})--> {:?} (existing)", st, sym, existing);
                        existing
                    }
                    None => {
                        new_items.compute_closure(g, automaton.next_state_id()?)?;
                        let created = automaton.create_state(kernel, new_items)?;
                        tracing::trace!("{:?} --({:?})--> {:?} (new)", st, sym, created);
                        work_stack.push(created);
                        created
                    }
                };

                // the links point at the items that actually live in the target
                for (slot, core) in linked {
                    let target_slot = automaton
                        .state(target)?
                        .items
                        .find(core)
                        .ok_or(InternalError::DanglingPropagation {
                            from: st,
                            to: target,
                        })?;
                    automaton.item_mut(ItemRef { state: st, slot })?.add_propagate(ItemRef {
                        state: target,
                        slot: target_slot,
                    });
                }

                automaton.states[st.index()].transitions.push((sym, target));
            }
        }

        tracing::debug!("{} states", automaton.states.len());
        Ok(automaton)
    }

    fn next_state_id(&self) -> Result<StateID, InternalError> {
        u16::try_from(self.states.len())
            .map(StateID)
            .map_err(|_| InternalError::TooManyStates)
    }

    /// Register a state for `kernel`, whose closure is `items`.
    pub(crate) fn create_state(
        &mut self,
        kernel: Kernel,
        items: LalrItemSet,
    ) -> Result<StateID, InternalError> {
        if kernel.is_empty() || items.is_empty() {
            return Err(InternalError::EmptyKernel);
        }
        if let Some(&existing) = self.kernels.get(&kernel) {
            return Err(InternalError::DuplicateState { existing });
        }
        let id = self.next_state_id()?;
        let kernel_len = kernel.cores().len();
        self.kernels.insert(kernel, id);
        self.states.push(LalrState {
            id,
            items,
            kernel_len,
            transitions: vec![],
        });
        Ok(id)
    }

    /// Push lookaheads along the propagation links until a full pass over all
    /// items changes nothing. Returns the number of passes.
    pub fn propagate_lookaheads(&mut self) -> Result<usize, InternalError> {
        let span = tracing::debug_span!("propagate_lookaheads");
        let _entered = span.enter();

        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for state in 0..self.states.len() {
                for slot in 0..self.states[state].items.len() {
                    let mut stack = vec![ItemRef {
                        state: StateID(state as u16),
                        slot,
                    }];
                    while let Some(source) = stack.pop() {
                        let item = self.item(source)?;
                        let lookahead = item.lookahead.clone();
                        let links = item.propagate_to.clone();
                        for link in links {
                            if self.item_mut(link)?.lookahead.union_with(&lookahead) {
                                changed = true;
                                stack.push(link);
                            }
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }

        tracing::debug!("{} passes", passes);
        self.propagation_passes = passes;
        Ok(passes)
    }

    pub fn state(&self, id: StateID) -> Result<&LalrState, InternalError> {
        self.states
            .get(id.index())
            .ok_or(InternalError::UnknownState(id))
    }

    pub fn find_state(&self, kernel: &Kernel) -> Option<StateID> {
        self.kernels.get(kernel).copied()
    }

    pub fn item(&self, r: ItemRef) -> Result<&LalrItem, InternalError> {
        self.state(r.state)?
            .items
            .get(r.slot)
            .ok_or(InternalError::DanglingPropagation {
                from: r.state,
                to: r.state,
            })
    }

    fn item_mut(&mut self, r: ItemRef) -> Result<&mut LalrItem, InternalError> {
        self.states
            .get_mut(r.state.index())
            .ok_or(InternalError::UnknownState(r.state))?
            .items
            .get_mut(r.slot)
            .ok_or(InternalError::DanglingPropagation {
                from: r.state,
                to: r.state,
            })
    }

    pub fn kernels(&self) -> impl Iterator<Item = (&Kernel, StateID)> + '_ {
        self.kernels.iter().map(|(k, id)| (k, *id))
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, state) in self.states.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                if state.id == StateID::START {
                    writeln!(f, "#### State {:?} (start)", state.id)?;
                } else {
                    writeln!(f, "#### State {:?}", state.id)?;
                }
                write!(f, "{}", state.display(g))?;
            }
            Ok(())
        })
    }
}
