//! # Deterministic finite automata
//! The DFA here differs from the textbook 5-tuple in three deliberate ways, all inherited
//! by the whole crate:
//!
//! * **States are contiguous indices.** The states are `0..state_count()`, the initial
//!   state is always `0`, and there is one additional special state, [`DEAD_STATE`]: an
//!   absorbing, never-accepting sentinel. Keeping the dead state out of the table lets the
//!   runtime loops short-circuit the moment it is entered instead of spinning through the
//!   rest of the input, which is what makes [`Dfa::munch`] usable on long inputs.
//! * **The named alphabet is partial.** The transition table stores one column per *named*
//!   input (`Σ⁻`, a finite subset of `T`) plus a single UNKNOWN column. Any symbol that is
//!   not named routes through the UNKNOWN column, so the automaton is total over all of `T`
//!   without naming every value of the type.
//! * **Totality is enforced at construction.** A [`Dfa`] can only be obtained through
//!   [`DfaBuilder::finalize`], which rejects tables with undefined cells; the runtime
//!   therefore never fails.
//!
//! ## Example
//! ```
//! use munch::dfa::{DfaBuilder, DEAD_STATE};
//!
//! // L = { "a" }: state 1 accepts, everything else falls into the dead state
//! let mut builder = DfaBuilder::new(['a'], 2);
//! builder.set_transition(0, &'a', 1).unwrap();
//! builder.set_unknown_transition(0, DEAD_STATE).unwrap();
//! builder.set_all_transitions(1, DEAD_STATE).unwrap();
//! builder.set_acceptance(1, true).unwrap();
//! let dfa = builder.finalize().unwrap();
//!
//! assert!(dfa.accepts(&['a']));
//! assert!(!dfa.accepts(&[] as &[char]));
//! assert!(!dfa.accepts(&['b']));
//! assert!(!dfa.accepts(&['a', 'b']));
//!
//! // munch finds the longest accepted prefix
//! assert_eq!(dfa.munch(&['a', 'b', 'c']), Some(1));
//! assert_eq!(dfa.munch(&['x']), None);
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

pub mod build;

pub use build::{DfaBuilder, DfaBuilderError};

/// Index of the dead state: the absorbing, never-accepting sentinel outside the table.
pub const DEAD_STATE: usize = usize::MAX;

/// A deterministic finite automaton over symbols of type `T`.
///
/// Built with a [`DfaBuilder`]; immutable afterwards. See the
/// [module-level documentation](crate::dfa) for the model.
#[derive(Clone, Debug)]
pub struct Dfa<T> {
    pub(crate) transitions: HashMap<T, Vec<usize>>,
    pub(crate) unknown_transitions: Vec<usize>,
    pub(crate) accepting: Vec<bool>,
}

impl<T: Eq + Hash> Dfa<T> {
    /// The number of states, not counting the dead state.
    pub fn state_count(&self) -> usize {
        self.unknown_transitions.len()
    }

    /// Tests whether `state` is accepting. The dead state never is.
    ///
    /// # Panics
    /// If `state` is neither a valid state index nor [`DEAD_STATE`].
    pub fn is_accepting(&self, state: usize) -> bool {
        state != DEAD_STATE && self.accepting[state]
    }

    /// The transition from `state` on the named input `x`, or `None` if `x` is not part of
    /// the named alphabet (in which case the [unknown transition](Dfa::unknown_transition)
    /// applies).
    ///
    /// # Panics
    /// If `state` is neither a valid state index nor [`DEAD_STATE`].
    pub fn transition(&self, state: usize, x: &T) -> Option<usize> {
        if state == DEAD_STATE {
            return Some(DEAD_STATE);
        }
        self.transitions.get(x).map(|column| column[state])
    }

    /// The transition from `state` on any input outside the named alphabet.
    ///
    /// # Panics
    /// If `state` is neither a valid state index nor [`DEAD_STATE`].
    pub fn unknown_transition(&self, state: usize) -> usize {
        if state == DEAD_STATE {
            return DEAD_STATE;
        }
        self.unknown_transitions[state]
    }

    /// The named alphabet `Σ⁻`, in no particular order.
    pub fn alphabet(&self) -> impl Iterator<Item = &T> {
        self.transitions.keys()
    }

    fn step(&self, state: usize, x: &T) -> usize {
        match self.transitions.get(x) {
            Some(column) => column[state],
            None => self.unknown_transitions[state],
        }
    }

    /// Tests whether the automaton accepts the given sequence.
    ///
    /// Symbols are consumed lazily and iteration stops as soon as the dead state is
    /// entered.
    pub fn accepts<I>(&self, sequence: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut iter = sequence.into_iter();
        let mut state = 0;
        while state != DEAD_STATE {
            match iter.next() {
                Some(x) => state = self.step(state, x.borrow()),
                None => break,
            }
        }
        self.is_accepting(state)
    }

    /// The length of the longest prefix of the sequence accepted by the automaton, or
    /// `None` if no prefix is accepted.
    ///
    /// `Some(0)` means the empty prefix is the longest accepted one (`ε` is in the
    /// language); that is distinct from no prefix matching at all. Symbols are consumed
    /// lazily and iteration stops as soon as the dead state is entered.
    pub fn munch<I>(&self, sequence: I) -> Option<usize>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut iter = sequence.into_iter();
        let mut state = 0;
        let mut steps = 0;
        let mut longest = self.is_accepting(state).then_some(0);
        while state != DEAD_STATE {
            match iter.next() {
                Some(x) => {
                    steps += 1;
                    state = self.step(state, x.borrow());
                    if self.is_accepting(state) {
                        longest = Some(steps);
                    }
                }
                None => break,
            }
        }
        longest
    }
}
