//! Mutable construction of [`Nfa`]s: the [`NfaBuilder`] plus ε-closure computation,
//! ε-elimination, builder melding (the workhorse of the Thompson construction) and the
//! subset construction to a deterministic builder.

use crate::dfa::{DfaBuilder, DEAD_STATE};
use crate::nfa::Nfa;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// Errors reported by [`NfaBuilder`] operations. All checks are eager: the first invalid
/// argument fails the call, leaving the builder unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NfaBuilderError {
    #[error("invalid state index {0}")]
    InvalidState(usize),
    #[error("input {0} is not in the named alphabet")]
    UnknownInput(String),
    #[error("a NFA must have at least one state")]
    NoStates,
}

/// A mutable builder producing an immutable [`Nfa`] via [`finalize`](NfaBuilder::finalize).
///
/// Unlike the DFA builder there is no notion of completeness: absent transitions are
/// simply empty target sets. State `0` is the initial state.
#[derive(Clone, Debug)]
pub struct NfaBuilder<T> {
    transitions: HashMap<T, Vec<BTreeSet<usize>>>,
    epsilon_transitions: Vec<BTreeSet<usize>>,
    unknown_transitions: Vec<BTreeSet<usize>>,
    accepting: Vec<bool>,
}

impl<T: Eq + Hash + Clone> NfaBuilder<T> {
    /// Creates a builder with the given named alphabet and number of states.
    pub fn new(inputs: impl IntoIterator<Item = T>, states: usize) -> Self {
        let mut builder = Self::with_states(states);
        for input in inputs {
            builder.add_input(input);
        }
        builder
    }

    /// Creates a builder with an empty named alphabet and the given number of states.
    pub fn with_states(states: usize) -> Self {
        NfaBuilder {
            transitions: HashMap::new(),
            epsilon_transitions: vec![BTreeSet::new(); states],
            unknown_transitions: vec![BTreeSet::new(); states],
            accepting: vec![false; states],
        }
    }

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

    /// The named alphabet `Σ⁻`, in no particular order.
    pub fn alphabet(&self) -> impl Iterator<Item = &T> {
        self.transitions.keys()
    }

    /// The successors of `state` on the named input `x`; falls back to the UNKNOWN column
    /// when `x` is not named.
    ///
    /// # Panics
    /// If `state` is not a valid state index.
    pub fn transition(&self, state: usize, x: &T) -> &BTreeSet<usize> {
        match self.transitions.get(x) {
            Some(column) => &column[state],
            None => &self.unknown_transitions[state],
        }
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

    fn check_state(&self, state: usize) -> Result<usize, NfaBuilderError> {
        if state < self.state_count() {
            Ok(state)
        } else {
            Err(NfaBuilderError::InvalidState(state))
        }
    }

    /// Adds `input` to the named alphabet. The new column starts out as a copy of the
    /// UNKNOWN column, since that is the transition the input resolved to so far.
    pub fn add_input(&mut self, input: T) -> &mut Self {
        if !self.transitions.contains_key(&input) {
            let column = self.unknown_transitions.clone();
            self.transitions.insert(input, column);
        }
        self
    }

    /// Adds a fresh state with no transitions and returns its index.
    pub fn add_state(&mut self, accepting: bool) -> usize {
        for column in self.transitions.values_mut() {
            column.push(BTreeSet::new());
        }
        self.epsilon_transitions.push(BTreeSet::new());
        self.unknown_transitions.push(BTreeSet::new());
        self.accepting.push(accepting);
        self.state_count() - 1
    }

    /// Marks `state` as accepting or not.
    pub fn set_acceptance(
        &mut self,
        state: usize,
        value: bool,
    ) -> Result<&mut Self, NfaBuilderError> {
        self.check_state(state)?;
        self.accepting[state] = value;
        Ok(self)
    }

    /// Adds `to` to `δ(state, x)` for the named input `x`.
    pub fn add_transition(
        &mut self,
        state: usize,
        x: &T,
        to: usize,
    ) -> Result<&mut Self, NfaBuilderError>
    where
        T: fmt::Debug,
    {
        self.check_state(state)?;
        self.check_state(to)?;
        match self.transitions.get_mut(x) {
            Some(column) => {
                column[state].insert(to);
                Ok(self)
            }
            None => Err(NfaBuilderError::UnknownInput(format!("{x:?}"))),
        }
    }

    /// Adds every state of `to` to `δ(state, x)` for the named input `x`.
    pub fn add_transitions(
        &mut self,
        state: usize,
        x: &T,
        to: impl IntoIterator<Item = usize>,
    ) -> Result<&mut Self, NfaBuilderError>
    where
        T: fmt::Debug,
    {
        for target in to {
            self.add_transition(state, x, target)?;
        }
        Ok(self)
    }

    /// Adds `to` to `δ(state, ε)`.
    pub fn add_epsilon_transition(
        &mut self,
        state: usize,
        to: usize,
    ) -> Result<&mut Self, NfaBuilderError> {
        self.check_state(state)?;
        self.check_state(to)?;
        self.epsilon_transitions[state].insert(to);
        Ok(self)
    }

    /// Adds `to` to `δ(state, UNKNOWN)`.
    pub fn add_unknown_transition(
        &mut self,
        state: usize,
        to: usize,
    ) -> Result<&mut Self, NfaBuilderError> {
        self.check_state(state)?;
        self.check_state(to)?;
        self.unknown_transitions[state].insert(to);
        Ok(self)
    }

    /// All states reachable from `state` through ε-transitions alone (breadth-first).
    ///
    /// `state` itself is included only if some ε-path leads back to it.
    ///
    /// # Panics
    /// If `state` is not a valid state index.
    pub fn epsilon_closure(&self, state: usize) -> BTreeSet<usize> {
        let mut closure = BTreeSet::new();
        let mut queue = VecDeque::from([state]);
        while let Some(current) = queue.pop_front() {
            for &target in &self.epsilon_transitions[current] {
                if closure.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        closure
    }

    /// Removes all ε-transitions without changing the language.
    ///
    /// For every state `i` and every `j` in the ε-closure of `i`, the targets of
    /// `δ(j, x)` are merged into `δ(i, x)` for every named input and for UNKNOWN, and `i`
    /// becomes accepting if `j` is. All ε-edges are then cleared.
    pub fn epsilon_elimination(&mut self) -> &mut Self {
        let inputs: Vec<T> = self.transitions.keys().cloned().collect();
        for i in 0..self.state_count() {
            for j in self.epsilon_closure(i) {
                for x in &inputs {
                    let column = self
                        .transitions
                        .get_mut(x)
                        .expect("iterating the builder's own alphabet");
                    let merged: Vec<usize> = column[j].iter().copied().collect();
                    column[i].extend(merged);
                }
                let merged: Vec<usize> = self.unknown_transitions[j].iter().copied().collect();
                self.unknown_transitions[i].extend(merged);

                if self.accepting[j] {
                    self.accepting[i] = true;
                }
            }
            self.epsilon_transitions[i].clear();
        }
        self
    }

    /// Integrates another builder into this one, appending its states after the current
    /// ones. Returns the new index of `that`'s initial state.
    ///
    /// Inputs named by only one side fall back to the other side's UNKNOWN column, exactly
    /// as they would when running the automata separately.
    pub fn meld(&mut self, that: &NfaBuilder<T>) -> usize {
        for input in that.transitions.keys() {
            self.add_input(input.clone());
        }

        let offset = self.state_count();
        let shifted = |set: &BTreeSet<usize>| -> BTreeSet<usize> {
            set.iter().map(|&state| state + offset).collect()
        };

        for (input, column) in self.transitions.iter_mut() {
            let source = that
                .transitions
                .get(input)
                .unwrap_or(&that.unknown_transitions);
            column.extend(source.iter().map(&shifted));
        }
        self.epsilon_transitions
            .extend(that.epsilon_transitions.iter().map(&shifted));
        self.unknown_transitions
            .extend(that.unknown_transitions.iter().map(&shifted));
        self.accepting.extend_from_slice(&that.accepting);

        offset
    }

    /// Builds the immutable [`Nfa`]. Errors with [`NfaBuilderError::NoStates`] on an
    /// empty builder.
    pub fn finalize(&self) -> Result<Nfa<T>, NfaBuilderError> {
        if self.state_count() == 0 {
            return Err(NfaBuilderError::NoStates);
        }
        Ok(Nfa {
            transitions: self.transitions.clone(),
            epsilon_transitions: self.epsilon_transitions.clone(),
            unknown_transitions: self.unknown_transitions.clone(),
            accepting: self.accepting.clone(),
        })
    }

    // The set of states reachable from `subset` on `input` (`None` = the UNKNOWN column),
    // as a bit-vector. Assumes ε-transitions have been eliminated.
    fn subset_step(&self, subset: &[bool], input: Option<&T>) -> Vec<bool> {
        let mut out = vec![false; self.state_count()];
        for (state, &active) in subset.iter().enumerate() {
            if active {
                let targets = match input {
                    Some(x) => self.transition(state, x),
                    None => &self.unknown_transitions[state],
                };
                for &target in targets {
                    out[target] = true;
                }
            }
        }
        out
    }

    /// Converts this builder into a builder for an equivalent DFA by the subset
    /// construction.
    ///
    /// ε-transitions are eliminated first (on a copy). Each DFA state is a reachable
    /// subset of NFA states, represented as a bit-vector; the start subset is `{0}`, the
    /// empty subset is the dead state, and a subset accepts iff any member does. Only
    /// reachable subsets are materialized, and the result is completed towards the dead
    /// state, so it finalizes as-is.
    pub fn make_deterministic(&self) -> DfaBuilder<T>
    where
        T: fmt::Debug,
    {
        if self.state_count() == 0 {
            return DfaBuilder::with_states(0);
        }

        let mut nfa = self.clone();
        nfa.epsilon_elimination();

        let inputs: Vec<T> = nfa.transitions.keys().cloned().collect();
        let mut builder = DfaBuilder::new(inputs.iter().cloned(), 0);

        let dead = vec![false; nfa.state_count()];
        let mut start = dead.clone();
        start[0] = true;

        let mut indices: HashMap<Vec<bool>, usize> = HashMap::new();
        indices.insert(start.clone(), builder.add_state());
        indices.insert(dead, DEAD_STATE);

        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let from = indices[&current];

            for x in &inputs {
                let to = nfa.subset_step(&current, Some(x));
                let target = match indices.get(&to) {
                    Some(&index) => index,
                    None => {
                        let index = builder.add_state();
                        indices.insert(to.clone(), index);
                        queue.push_back(to);
                        index
                    }
                };
                builder
                    .set_transition(from, x, target)
                    .expect("subset states and inputs are valid by construction");
            }

            let to = nfa.subset_step(&current, None);
            let target = match indices.get(&to) {
                Some(&index) => index,
                None => {
                    let index = builder.add_state();
                    indices.insert(to.clone(), index);
                    queue.push_back(to);
                    index
                }
            };
            builder
                .set_unknown_transition(from, target)
                .expect("subset states are valid by construction");
        }

        for (subset, &index) in &indices {
            if index != DEAD_STATE {
                let accepting = subset
                    .iter()
                    .enumerate()
                    .any(|(state, &active)| active && nfa.accepting[state]);
                if accepting {
                    builder
                        .set_acceptance(index, true)
                        .expect("subset states are valid by construction");
                }
            }
        }

        builder
            .complete(DEAD_STATE)
            .expect("the dead state is always a valid completion target");
        builder
    }
}
