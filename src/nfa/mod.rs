//! # Nondeterministic finite automata, with ε-transitions
//! The NFA shares the DFA's alphabet treatment — named transition columns `Σ⁻` plus a
//! single UNKNOWN column — but maps each state and input to a *set* of successor states,
//! and additionally carries ε-transitions taken without consuming input. There is no dead
//! state: running out of active states simply rejects. The initial state is `0`.
//!
//! NFAs are cheap to build (see the Thompson construction behind
//! [`Regex::to_nfa`](crate::regex::Regex::to_nfa)) but slower to run than DFAs, since the
//! evaluation tracks a whole set of states and chases ε-closures after every step. The
//! [`NfaBuilder`] can [eliminate ε-transitions](NfaBuilder::epsilon_elimination) in place
//! and [convert to a deterministic builder](NfaBuilder::make_deterministic) by the subset
//! construction.
//!
//! ## Example
//! ```
//! use munch::nfa::NfaBuilder;
//!
//! // L = words ending in "ab"
//! let mut builder = NfaBuilder::new(['a', 'b'], 3);
//! builder.add_transition(0, &'a', 0).unwrap();
//! builder.add_transition(0, &'b', 0).unwrap();
//! builder.add_transition(0, &'a', 1).unwrap();
//! builder.add_transition(1, &'b', 2).unwrap();
//! builder.set_acceptance(2, true).unwrap();
//! let nfa = builder.finalize().unwrap();
//!
//! assert!(nfa.accepts(&['a', 'b']));
//! assert!(nfa.accepts(&['b', 'a', 'a', 'b']));
//! assert!(!nfa.accepts(&['a', 'b', 'a']));
//!
//! // The subset construction yields an equivalent DFA
//! let dfa = builder.make_deterministic().finalize().unwrap();
//! assert!(dfa.accepts(&['b', 'a', 'a', 'b']));
//! assert!(!dfa.accepts(&['a', 'b', 'a']));
//! ```

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::hash::Hash;

pub mod build;

pub use build::{NfaBuilder, NfaBuilderError};

/// A nondeterministic finite automaton (with ε-transitions) over symbols of type `T`.
///
/// Built with an [`NfaBuilder`]; immutable afterwards. See the
/// [module-level documentation](crate::nfa) for the model.
#[derive(Clone, Debug)]
pub struct Nfa<T> {
    pub(crate) transitions: HashMap<T, Vec<BTreeSet<usize>>>,
    pub(crate) epsilon_transitions: Vec<BTreeSet<usize>>,
    pub(crate) unknown_transitions: Vec<BTreeSet<usize>>,
    pub(crate) accepting: Vec<bool>,
}

impl<T: Eq + Hash> Nfa<T> {
    /// The number of states.
    pub fn state_count(&self) -> usize {
        self.unknown_transitions.len()
    }

    /// Tests whether `state` is accepting.
    ///
    /// # Panics
    /// If `state` is not a valid state index.
    pub fn is_accepting(&self, state: usize) -> bool {
        self.accepting[state]
    }

    /// The successors of `state` on the named input `x`, or `None` if `x` is not part of
    /// the named alphabet (in which case the [unknown transition](Nfa::unknown_transition)
    /// applies).
    ///
    /// # Panics
    /// If `state` is not a valid state index.
    pub fn transition(&self, state: usize, x: &T) -> Option<&BTreeSet<usize>> {
        self.transitions.get(x).map(|column| &column[state])
    }

    /// The ε-successors of `state`.
    ///
    /// # Panics
    /// If `state` is not a valid state index.
    pub fn epsilon_transition(&self, state: usize) -> &BTreeSet<usize> {
        &self.epsilon_transitions[state]
    }

    /// The successors of `state` on any input outside the named alphabet.
    ///
    /// # Panics
    /// If `state` is not a valid state index.
    pub fn unknown_transition(&self, state: usize) -> &BTreeSet<usize> {
        &self.unknown_transitions[state]
    }

    /// The named alphabet `Σ⁻`, in no particular order.
    pub fn alphabet(&self) -> impl Iterator<Item = &T> {
        self.transitions.keys()
    }

    /// Tests whether any state has ε-transitions.
    pub fn has_epsilon_transitions(&self) -> bool {
        self.epsilon_transitions.iter().any(|set| !set.is_empty())
    }

    // Extends `current` with everything reachable through ε-transitions (BFS).
    fn epsilon_close(&self, current: &mut BTreeSet<usize>) {
        let mut queue: VecDeque<usize> = current.iter().copied().collect();
        while let Some(state) = queue.pop_front() {
            for &target in &self.epsilon_transitions[state] {
                if current.insert(target) {
                    queue.push_back(target);
                }
            }
        }
    }

    /// Tests whether the automaton accepts the given sequence, tracking the full set of
    /// active states and chasing ε-closures after every step.
    pub fn accepts<I>(&self, sequence: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let mut current = BTreeSet::from([0]);
        self.epsilon_close(&mut current);

        for x in sequence {
            let x = x.borrow();
            let mut next = BTreeSet::new();
            for &state in &current {
                let targets = match self.transitions.get(x) {
                    Some(column) => &column[state],
                    None => &self.unknown_transitions[state],
                };
                next.extend(targets.iter().copied());
            }
            current = next;
            self.epsilon_close(&mut current);
        }

        current.iter().any(|&state| self.accepting[state])
    }
}
