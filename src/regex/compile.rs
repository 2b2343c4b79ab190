//! Compilation of regexes into automata: a Thompson-style construction building one small
//! NFA builder per combinator and melding them together. Complement and conjunction have no
//! direct nondeterministic construction, so their operands are determinized first and the
//! result is converted back into an NFA builder.

use crate::dfa::{Dfa, DfaBuilder};
use crate::nfa::{Nfa, NfaBuilder};
use crate::regex::{Literal, Regex, RegexNode};
use std::hash::Hash;
use thiserror::Error;

/// Errors reported when compiling a regex to an automaton.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// Predicate literals have no named transition column: a finite table cannot
    /// enumerate the symbols a predicate accepts. Derivation-based matching (and the
    /// derivation lexer) support them instead.
    #[error("predicate literals cannot be compiled to automaton transitions")]
    PredicateLiteral,
}

fn empty<T: Eq + Hash + Clone>() -> NfaBuilder<T> {
    NfaBuilder::with_states(1)
}

fn epsilon<T: Eq + Hash + Clone>() -> NfaBuilder<T> {
    let mut builder = NfaBuilder::with_states(1);
    builder
        .set_acceptance(0, true)
        .expect("state 0 exists by construction");
    builder
}

fn alphabet<T: Eq + Hash + Clone>() -> NfaBuilder<T> {
    let mut builder = NfaBuilder::with_states(2);
    builder
        .add_unknown_transition(0, 1)
        .expect("states 0 and 1 exist by construction");
    builder
        .set_acceptance(1, true)
        .expect("state 1 exists by construction");
    builder
}

fn literal<T: Eq + Hash + Clone + std::fmt::Debug>(value: &T) -> NfaBuilder<T> {
    let mut builder = NfaBuilder::new([value.clone()], 2);
    builder
        .add_transition(0, value, 1)
        .expect("states and input exist by construction");
    builder
        .set_acceptance(1, true)
        .expect("state 1 exists by construction");
    builder
}

fn disjunction<T: Eq + Hash + Clone>(left: &NfaBuilder<T>, right: &NfaBuilder<T>) -> NfaBuilder<T> {
    let mut builder = NfaBuilder::with_states(1);
    let l = builder.meld(left);
    let r = builder.meld(right);
    builder
        .add_epsilon_transition(0, l)
        .expect("melded initial states exist");
    builder
        .add_epsilon_transition(0, r)
        .expect("melded initial states exist");
    builder
}

fn sequence<T: Eq + Hash + Clone>(left: &NfaBuilder<T>, right: &NfaBuilder<T>) -> NfaBuilder<T> {
    let mut builder = left.clone();
    let r = builder.meld(right);

    // Left's accepting states flow into right's start and stop accepting themselves
    for state in 0..r {
        if builder.is_accepting(state) {
            builder
                .add_epsilon_transition(state, r)
                .expect("states below the meld offset exist");
            builder
                .set_acceptance(state, false)
                .expect("states below the meld offset exist");
        }
    }

    builder
}

fn closure<T: Eq + Hash + Clone>(inner: &NfaBuilder<T>) -> NfaBuilder<T> {
    let mut builder = NfaBuilder::with_states(0);
    builder.add_state(true);
    let start = builder.meld(inner);
    builder
        .add_epsilon_transition(0, start)
        .expect("melded initial state exists");

    for state in start..builder.state_count() {
        if builder.is_accepting(state) {
            builder
                .add_epsilon_transition(state, 0)
                .expect("state 0 exists by construction");
        }
    }

    builder
}

fn complement<T: Eq + Hash + Clone + std::fmt::Debug>(inner: &NfaBuilder<T>) -> NfaBuilder<T> {
    let mut deterministic: DfaBuilder<T> = inner.make_deterministic();
    deterministic.complement();
    deterministic.make_nondeterministic()
}

fn conjunction<T: Eq + Hash + Clone + std::fmt::Debug>(
    left: &NfaBuilder<T>,
    right: &NfaBuilder<T>,
) -> NfaBuilder<T> {
    left.make_deterministic()
        .conjunction(&right.make_deterministic())
        .make_nondeterministic()
}

impl<T: Eq + Hash + Clone + std::fmt::Debug> Regex<T> {
    /// Compiles this regex into an NFA builder, one Thompson construction per node.
    ///
    /// Errors with [`CompileError::PredicateLiteral`] if the regex contains predicate
    /// literals; those only support derivation-based matching.
    pub fn to_nfa_builder(&self) -> Result<NfaBuilder<T>, CompileError> {
        match self.node() {
            RegexNode::Empty => Ok(empty()),
            RegexNode::Epsilon => Ok(epsilon()),
            RegexNode::Alphabet => Ok(alphabet()),
            RegexNode::Literal(Literal::Value(value)) => Ok(literal(value)),
            RegexNode::Literal(Literal::Predicate(_)) => Err(CompileError::PredicateLiteral),
            RegexNode::Disjunction(a, b) => {
                Ok(disjunction(&a.to_nfa_builder()?, &b.to_nfa_builder()?))
            }
            RegexNode::Sequence(a, b) => Ok(sequence(&a.to_nfa_builder()?, &b.to_nfa_builder()?)),
            RegexNode::KleeneStar(a) => Ok(closure(&a.to_nfa_builder()?)),
            RegexNode::Complement(a) => Ok(complement(&a.to_nfa_builder()?)),
            RegexNode::Conjunction(a, b) => {
                Ok(conjunction(&a.to_nfa_builder()?, &b.to_nfa_builder()?))
            }
        }
    }

    /// Compiles this regex into an [`Nfa`] accepting the same language.
    pub fn to_nfa(&self) -> Result<Nfa<T>, CompileError> {
        Ok(self
            .to_nfa_builder()?
            .finalize()
            .expect("Thompson constructions have at least one state"))
    }

    /// Compiles this regex into a [`Dfa`] accepting the same language, going through the
    /// NFA and the subset construction.
    pub fn to_dfa(&self) -> Result<Dfa<T>, CompileError> {
        Ok(self
            .to_nfa_builder()?
            .make_deterministic()
            .finalize()
            .expect("the subset construction produces a complete builder"))
    }
}
