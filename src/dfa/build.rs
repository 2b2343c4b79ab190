//! Mutable construction of [`Dfa`]s: the [`DfaBuilder`] plus the operations that are only
//! meaningful on a table under construction (completion, complementation, the product
//! construction and conversion to a nondeterministic builder).

use crate::dfa::{Dfa, DEAD_STATE};
use crate::nfa::NfaBuilder;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// Errors reported by [`DfaBuilder`] operations. All checks are eager: the first invalid
/// argument fails the call, leaving the builder unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DfaBuilderError {
    #[error("invalid state index {0}")]
    InvalidState(usize),
    #[error("input {0} is not in the named alphabet")]
    UnknownInput(String),
    #[error("cannot finalize: the transition table has undefined cells")]
    Incomplete,
    #[error("a DFA must have at least one state")]
    NoStates,
}

/// A mutable builder producing an immutable [`Dfa`] via [`finalize`](DfaBuilder::finalize).
///
/// Cells start out undefined; [`finalize`](DfaBuilder::finalize) requires every cell of
/// every named column and of the UNKNOWN column to be defined ([`complete`](DfaBuilder::complete)
/// fills the remaining ones in bulk). State `0` is the initial state; [`DEAD_STATE`]
/// is always a valid transition *target* but never a source.
#[derive(Clone, Debug)]
pub struct DfaBuilder<T> {
    transitions: HashMap<T, Vec<Option<usize>>>,
    unknown_transitions: Vec<Option<usize>>,
    accepting: Vec<bool>,
}

impl<T: Eq + Hash + Clone> DfaBuilder<T> {
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
        DfaBuilder {
            transitions: HashMap::new(),
            unknown_transitions: vec![None; states],
            accepting: vec![false; states],
        }
    }

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

    /// The named alphabet `Σ⁻`, in no particular order.
    pub fn alphabet(&self) -> impl Iterator<Item = &T> {
        self.transitions.keys()
    }

    /// The transition from `state` on the named input `x`, `None` while undefined.
    ///
    /// Falls back to the UNKNOWN column when `x` is not named, mirroring how the finalized
    /// automaton treats such inputs.
    ///
    /// # Panics
    /// If `state` is neither a valid state index nor [`DEAD_STATE`].
    pub fn transition(&self, state: usize, x: &T) -> Option<usize> {
        if state == DEAD_STATE {
            return Some(DEAD_STATE);
        }
        match self.transitions.get(x) {
            Some(column) => column[state],
            None => self.unknown_transitions[state],
        }
    }

    /// The UNKNOWN-column transition from `state`, `None` while undefined.
    ///
    /// # Panics
    /// If `state` is neither a valid state index nor [`DEAD_STATE`].
    pub fn unknown_transition(&self, state: usize) -> Option<usize> {
        if state == DEAD_STATE {
            return Some(DEAD_STATE);
        }
        self.unknown_transitions[state]
    }

    fn check_source(&self, state: usize) -> Result<usize, DfaBuilderError> {
        if state < self.state_count() {
            Ok(state)
        } else {
            Err(DfaBuilderError::InvalidState(state))
        }
    }

    fn check_target(&self, state: usize) -> Result<usize, DfaBuilderError> {
        if state < self.state_count() || state == DEAD_STATE {
            Ok(state)
        } else {
            Err(DfaBuilderError::InvalidState(state))
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

    /// Adds a fresh non-accepting state with undefined transitions and returns its index.
    pub fn add_state(&mut self) -> usize {
        for column in self.transitions.values_mut() {
            column.push(None);
        }
        self.unknown_transitions.push(None);
        self.accepting.push(false);
        self.state_count() - 1
    }

    /// Marks `state` as accepting or not.
    pub fn set_acceptance(&mut self, state: usize, value: bool) -> Result<&mut Self, DfaBuilderError> {
        self.check_source(state)?;
        self.accepting[state] = value;
        Ok(self)
    }

    /// Marks every state in `states` as accepting or not.
    pub fn set_acceptance_all(
        &mut self,
        states: impl IntoIterator<Item = usize>,
        value: bool,
    ) -> Result<&mut Self, DfaBuilderError> {
        for state in states {
            self.set_acceptance(state, value)?;
        }
        Ok(self)
    }

    /// Sets `δ(state, x) := to` for the named input `x`.
    pub fn set_transition(
        &mut self,
        state: usize,
        x: &T,
        to: usize,
    ) -> Result<&mut Self, DfaBuilderError>
    where
        T: fmt::Debug,
    {
        self.check_source(state)?;
        self.check_target(to)?;
        match self.transitions.get_mut(x) {
            Some(column) => {
                column[state] = Some(to);
                Ok(self)
            }
            None => Err(DfaBuilderError::UnknownInput(format!("{x:?}"))),
        }
    }

    /// Sets `δ(state, UNKNOWN) := to`.
    pub fn set_unknown_transition(
        &mut self,
        state: usize,
        to: usize,
    ) -> Result<&mut Self, DfaBuilderError> {
        self.check_source(state)?;
        self.check_target(to)?;
        self.unknown_transitions[state] = Some(to);
        Ok(self)
    }

    /// Sets every transition out of `state` (named and UNKNOWN) to `to`.
    pub fn set_all_transitions(
        &mut self,
        state: usize,
        to: usize,
    ) -> Result<&mut Self, DfaBuilderError> {
        self.check_source(state)?;
        self.check_target(to)?;
        for column in self.transitions.values_mut() {
            column[state] = Some(to);
        }
        self.unknown_transitions[state] = Some(to);
        Ok(self)
    }

    /// Sets every still-undefined cell to `to`.
    pub fn complete(&mut self, to: usize) -> Result<&mut Self, DfaBuilderError> {
        self.check_target(to)?;
        for column in self.transitions.values_mut() {
            for cell in column.iter_mut() {
                cell.get_or_insert(to);
            }
        }
        for cell in self.unknown_transitions.iter_mut() {
            cell.get_or_insert(to);
        }
        Ok(self)
    }

    /// Tests whether every cell is defined.
    pub fn is_complete(&self) -> bool {
        self.transitions
            .values()
            .all(|column| column.iter().all(Option::is_some))
            && self.unknown_transitions.iter().all(Option::is_some)
    }

    /// Swaps accepting and rejecting states, making this builder recognize the complement
    /// language once completed.
    ///
    /// Transitions into the dead state would silently reject words the complement must
    /// accept, so every DEAD-bound transition is redirected into a fresh "live" state:
    /// accepting and transitioning into itself on any input. The dead state itself stays
    /// non-accepting by definition.
    pub fn complement(&mut self) -> &mut Self {
        for accepting in self.accepting.iter_mut() {
            *accepting = !*accepting;
        }

        let live = self.add_state();
        for column in self.transitions.values_mut() {
            column[live] = Some(live);
        }
        self.unknown_transitions[live] = Some(live);
        self.accepting[live] = true;

        let redirect = |cell: &mut Option<usize>| {
            if *cell == Some(DEAD_STATE) {
                *cell = Some(live);
            }
        };
        for column in self.transitions.values_mut() {
            column.iter_mut().for_each(redirect);
        }
        self.unknown_transitions.iter_mut().for_each(redirect);
        self
    }

    // Like transition/unknown_transition, with undefined cells counting as DEAD. Only
    // meaningful inside the product construction.
    fn transition_or_dead(&self, state: usize, x: &T) -> usize {
        self.transition(state, x).unwrap_or(DEAD_STATE)
    }

    fn unknown_transition_or_dead(&self, state: usize) -> usize {
        self.unknown_transition(state).unwrap_or(DEAD_STATE)
    }

    fn set_cell(&mut self, state: usize, x: &T, to: usize) {
        let column = self
            .transitions
            .get_mut(x)
            .expect("product inputs are in the alphabet by construction");
        column[state] = Some(to);
    }

    /// The product construction of two builders: a builder whose states are the pairs of
    /// component states (dead states included), tracking both automata simultaneously.
    ///
    /// A pair `(l, r)` is encoded as `l + r·(n+1)` where `n` is `self.state_count()` and
    /// index `n` on each axis stands for that component's dead state; the all-dead pair is
    /// the product's dead state. The alphabet is the union of both named alphabets, and
    /// undefined component cells count as DEAD. Acceptance is left all-false; callers
    /// decide it per pair (see [`conjunction`](DfaBuilder::conjunction)).
    pub fn product(&self, other: &Self) -> DfaBuilder<T> {
        let lsize = self.state_count() + 1;
        let rsize = other.state_count() + 1;

        let encode = move |l: usize, r: usize| -> usize {
            match (l == DEAD_STATE, r == DEAD_STATE) {
                (true, true) => DEAD_STATE,
                (true, false) => (lsize - 1) + r * lsize,
                (false, true) => l + (rsize - 1) * lsize,
                (false, false) => l + r * lsize,
            }
        };
        let decode = move |i: usize| -> (usize, usize) {
            let l = i % lsize;
            let r = i / lsize;
            (
                if l == lsize - 1 { DEAD_STATE } else { l },
                if r == rsize - 1 { DEAD_STATE } else { r },
            )
        };

        let mut inputs: Vec<T> = self.transitions.keys().cloned().collect();
        for input in other.transitions.keys() {
            if !self.transitions.contains_key(input) {
                inputs.push(input.clone());
            }
        }

        let size = lsize * rsize - 1;
        let mut builder = DfaBuilder::new(inputs.iter().cloned(), size);

        for x in &inputs {
            for i in 0..size {
                let (l, r) = decode(i);
                let to = encode(self.transition_or_dead(l, x), other.transition_or_dead(r, x));
                builder.set_cell(i, x, to);
            }
        }
        for i in 0..size {
            let (l, r) = decode(i);
            let to = encode(
                self.unknown_transition_or_dead(l),
                other.unknown_transition_or_dead(r),
            );
            builder.unknown_transitions[i] = Some(to);
        }

        builder
    }

    /// The conjunction of two builders: the product construction, accepting exactly the
    /// pairs where both components accept.
    pub fn conjunction(&self, other: &Self) -> DfaBuilder<T> {
        let lsize = self.state_count() + 1;
        let rsize = other.state_count() + 1;
        let mut builder = self.product(other);
        for i in 0..builder.state_count() {
            let l = i % lsize;
            let r = i / lsize;
            let accepting = l != lsize - 1
                && r != rsize - 1
                && self.is_accepting(l)
                && other.is_accepting(r);
            builder.accepting[i] = accepting;
        }
        builder
    }

    /// Converts this builder into a builder for an equivalent NFA.
    ///
    /// Defined transitions into non-dead states become singleton target sets; transitions
    /// into the dead state and undefined cells become empty sets (an NFA has no dead
    /// state: running out of states rejects just the same).
    pub fn make_nondeterministic(&self) -> NfaBuilder<T>
    where
        T: fmt::Debug,
    {
        let mut builder = NfaBuilder::with_states(self.state_count());

        for (input, column) in &self.transitions {
            builder.add_input(input.clone());
            for (state, cell) in column.iter().enumerate() {
                if let Some(to) = cell {
                    if *to != DEAD_STATE {
                        builder
                            .add_transition(state, input, *to)
                            .expect("DFA states and inputs are valid in the NFA builder");
                    }
                }
            }
        }

        for (state, cell) in self.unknown_transitions.iter().enumerate() {
            if let Some(to) = cell {
                if *to != DEAD_STATE {
                    builder
                        .add_unknown_transition(state, *to)
                        .expect("DFA states are valid in the NFA builder");
                }
            }
        }

        for (state, &accepting) in self.accepting.iter().enumerate() {
            builder
                .set_acceptance(state, accepting)
                .expect("DFA states are valid in the NFA builder");
        }

        builder
    }

    /// Builds the immutable [`Dfa`].
    ///
    /// Errors with [`DfaBuilderError::NoStates`] on an empty builder and with
    /// [`DfaBuilderError::Incomplete`] if any cell is undefined.
    pub fn finalize(&self) -> Result<Dfa<T>, DfaBuilderError> {
        if self.state_count() == 0 {
            return Err(DfaBuilderError::NoStates);
        }
        if !self.is_complete() {
            return Err(DfaBuilderError::Incomplete);
        }

        let defined = |cell: &Option<usize>| {
            cell.expect("all cells are defined after the completeness check")
        };
        Ok(Dfa {
            transitions: self
                .transitions
                .iter()
                .map(|(input, column)| (input.clone(), column.iter().map(defined).collect()))
                .collect(),
            unknown_transitions: self.unknown_transitions.iter().map(defined).collect(),
            accepting: self.accepting.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_validate_their_arguments() {
        let mut builder = DfaBuilder::new(['a'], 2);

        assert_eq!(
            builder.set_transition(5, &'a', 0).unwrap_err(),
            DfaBuilderError::InvalidState(5)
        );
        assert_eq!(
            builder.set_transition(0, &'a', 7).unwrap_err(),
            DfaBuilderError::InvalidState(7)
        );
        assert_eq!(
            builder.set_transition(0, &'x', 0).unwrap_err(),
            DfaBuilderError::UnknownInput("'x'".to_string())
        );
        assert_eq!(
            builder.set_acceptance(DEAD_STATE, true).unwrap_err(),
            DfaBuilderError::InvalidState(DEAD_STATE)
        );
        // The dead state is a valid target
        assert!(builder.set_transition(0, &'a', DEAD_STATE).is_ok());
    }

    #[test]
    fn finalize_requires_a_complete_table() {
        assert_eq!(
            DfaBuilder::<char>::with_states(0).finalize().unwrap_err(),
            DfaBuilderError::NoStates
        );

        let mut builder = DfaBuilder::new(['a'], 2);
        builder.set_transition(0, &'a', 1).unwrap();
        assert_eq!(builder.finalize().unwrap_err(), DfaBuilderError::Incomplete);
        assert!(!builder.is_complete());

        builder.complete(DEAD_STATE).unwrap();
        assert!(builder.is_complete());
        let dfa = builder.finalize().unwrap();
        assert_eq!(dfa.transition(0, &'a'), Some(1));
        assert_eq!(dfa.unknown_transition(1), DEAD_STATE);
    }

    #[test]
    fn add_input_copies_the_unknown_column() {
        let mut builder = DfaBuilder::with_states(2);
        builder.set_unknown_transition(0, 1).unwrap();
        builder.add_input('a');
        // 'a' behaves like any unknown input did when it was added
        assert_eq!(builder.transition(0, &'a'), Some(1));
        assert_eq!(builder.transition(1, &'a'), None);
    }

    #[test]
    fn complement_flips_acceptance_and_revives_dead_transitions() {
        // L = { "a" }
        let mut builder = DfaBuilder::new(['a'], 2);
        builder.set_transition(0, &'a', 1).unwrap();
        builder.set_acceptance(1, true).unwrap();
        builder.complete(DEAD_STATE).unwrap();

        builder.complement();
        let dfa = builder.finalize().unwrap();

        assert!(dfa.accepts(&[] as &[char]));
        assert!(!dfa.accepts(&['a']));
        assert!(dfa.accepts(&['b']));
        assert!(dfa.accepts(&['a', 'b']));
        assert!(dfa.accepts(&['a', 'a', 'a']));
    }

    #[test]
    fn conjunction_accepts_the_intersection() {
        // L1 = words of even length (over unknown inputs)
        let mut even = DfaBuilder::<char>::with_states(2);
        even.set_unknown_transition(0, 1).unwrap();
        even.set_unknown_transition(1, 0).unwrap();
        even.set_acceptance(0, true).unwrap();

        // L2 = *a
        let mut stars = DfaBuilder::new(['a'], 1);
        stars.set_transition(0, &'a', 0).unwrap();
        stars.set_unknown_transition(0, DEAD_STATE).unwrap();
        stars.set_acceptance(0, true).unwrap();

        let dfa = even.conjunction(&stars).finalize().unwrap();

        assert!(dfa.accepts(&[] as &[char]));
        assert!(dfa.accepts(&['a', 'a']));
        assert!(dfa.accepts(&['a', 'a', 'a', 'a']));
        assert!(!dfa.accepts(&['a']));
        assert!(!dfa.accepts(&['a', 'b']));
        assert!(!dfa.accepts(&['b', 'b']));
    }

    #[test]
    fn make_nondeterministic_preserves_the_language() {
        let mut builder = DfaBuilder::new(['a', 'b'], 2);
        builder.set_transition(0, &'a', 1).unwrap();
        builder.set_transition(1, &'b', 0).unwrap();
        builder.set_acceptance(1, true).unwrap();
        builder.complete(DEAD_STATE).unwrap();

        let nfa = builder.make_nondeterministic().finalize().unwrap();
        let dfa = builder.finalize().unwrap();

        for word in [
            vec![],
            vec!['a'],
            vec!['a', 'b'],
            vec!['a', 'b', 'a'],
            vec!['b'],
            vec!['a', 'a'],
        ] {
            assert_eq!(dfa.accepts(&word), nfa.accepts(&word), "word {word:?}");
        }
    }
}
