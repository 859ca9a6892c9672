//! Invariant violations detected while building the automaton or the tables.
//!
//! These never describe a problem with the input grammar; grammar-level
//! problems are reported through [`crate::diagnostics`] instead.

use crate::{
    automaton::StateID,
    grammar::{ProductionID, TerminalID},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InternalError {
    #[error("attempt to construct an LALR state from an empty kernel")]
    EmptyKernel,

    #[error("attempt to construct a duplicate LALR state (kernel already owned by {existing:?})")]
    DuplicateState { existing: StateID },

    #[error("propagation link from {from:?} has no matching item in {to:?}")]
    DanglingPropagation { from: StateID, to: StateID },

    #[error("attempt to shift past the end of production {production:?}")]
    ShiftAtEnd { production: ProductionID },

    #[error("conflict resolution of bogus actions in {state:?} under {terminal:?}")]
    BogusConflictResolution {
        state: StateID,
        terminal: TerminalID,
    },

    #[error("unknown production {0:?}")]
    UnknownProduction(ProductionID),

    #[error("the number of states exceeds the representable range")]
    TooManyStates,

    #[error("unknown state {0:?}")]
    UnknownState(StateID),

    #[error("malformed packed table: {msg}")]
    MalformedPackedTable { msg: String },
}
