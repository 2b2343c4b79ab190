//! Operations on the regex tree: nullability, Brzozowski derivation, structural metrics and
//! precedence-aware printing. Each operation is a postorder walk over the tree, written as an
//! exhaustive match on the node kinds.

use crate::regex::{Literal, Regex, RegexNode};
use std::borrow::Borrow;
use std::fmt;

impl<T> Regex<T> {
    /// Tests whether this regex accepts the empty word.
    ///
    /// `ε` and `*a` are nullable; `∅`, `Σ` and literals are not; `a | b` is nullable iff
    /// either side is, `a·b` and `a & b` iff both sides are, and `¬a` iff `a` is not.
    pub fn is_nullable(&self) -> bool {
        match &*self.node {
            RegexNode::Empty => false,
            RegexNode::Epsilon => true,
            RegexNode::Alphabet => false,
            RegexNode::Literal(_) => false,
            RegexNode::Disjunction(a, b) => a.is_nullable() || b.is_nullable(),
            RegexNode::Sequence(a, b) => a.is_nullable() && b.is_nullable(),
            RegexNode::KleeneStar(_) => true,
            RegexNode::Complement(a) => !a.is_nullable(),
            RegexNode::Conjunction(a, b) => a.is_nullable() && b.is_nullable(),
        }
    }

    /// The size of the tree: the total number of nodes.
    pub fn size(&self) -> usize {
        match &*self.node {
            RegexNode::Empty
            | RegexNode::Epsilon
            | RegexNode::Alphabet
            | RegexNode::Literal(_) => 1,
            RegexNode::Disjunction(a, b)
            | RegexNode::Sequence(a, b)
            | RegexNode::Conjunction(a, b) => a.size() + b.size() + 1,
            RegexNode::KleeneStar(a) | RegexNode::Complement(a) => a.size() + 1,
        }
    }

    /// The depth of the tree: the length of the longest root-to-leaf path, counting nodes.
    pub fn depth(&self) -> usize {
        match &*self.node {
            RegexNode::Empty
            | RegexNode::Epsilon
            | RegexNode::Alphabet
            | RegexNode::Literal(_) => 1,
            RegexNode::Disjunction(a, b)
            | RegexNode::Sequence(a, b)
            | RegexNode::Conjunction(a, b) => a.depth().max(b.depth()) + 1,
            RegexNode::KleeneStar(a) | RegexNode::Complement(a) => a.depth() + 1,
        }
    }
}

impl<T: PartialEq> Regex<T> {
    /// The Brzozowski derivative w.r.t. `x`: the regex accepting `{w : x·w ∈ L(self)}`.
    ///
    /// Every intermediate result goes through the smart constructors, so the identities of
    /// the algebra hold at each derivation step.
    pub fn derive(&self, x: &T) -> Regex<T> {
        match &*self.node {
            RegexNode::Empty => Regex::empty(),
            RegexNode::Epsilon => Regex::empty(),
            RegexNode::Alphabet => Regex::epsilon(),
            RegexNode::Literal(lit) => {
                if lit.matches(x) {
                    Regex::epsilon()
                } else {
                    Regex::empty()
                }
            }
            RegexNode::Disjunction(a, b) => a.derive(x).or(&b.derive(x)),
            RegexNode::Sequence(a, b) => {
                let d = a.derive(x).then(b);
                if a.is_nullable() {
                    d.or(&b.derive(x))
                } else {
                    d
                }
            }
            RegexNode::KleeneStar(a) => a.derive(x).then(self),
            RegexNode::Complement(a) => a.derive(x).complement(),
            RegexNode::Conjunction(a, b) => a.derive(x).and(&b.derive(x)),
        }
    }

    /// Derives w.r.t. every symbol of `word` in order.
    pub fn derive_seq<I>(&self, word: I) -> Regex<T>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        word.into_iter()
            .fold(self.clone(), |r, x| r.derive(x.borrow()))
    }

    /// Tests whether `word` is in the language: derives through the whole word and checks
    /// nullability of the result.
    pub fn accepts<I>(&self, word: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        self.derive_seq(word).is_nullable()
    }
}

// Precedence levels for printing; unary operators bind like atoms.
const PREC_ATOM: u8 = 1;
const PREC_SEQ: u8 = 2;
const PREC_CONJ: u8 = 3;
const PREC_DISJ: u8 = 4;

fn paren_if_gtr((s, prec): (String, u8), level: u8) -> String {
    if prec > level {
        format!("({s})")
    } else {
        s
    }
}

fn paren_if_geq((s, prec): (String, u8), level: u8) -> String {
    if prec >= level {
        format!("({s})")
    } else {
        s
    }
}

impl<T: fmt::Display> Regex<T> {
    fn render(&self) -> (String, u8) {
        let binop = |op: &str, l: (String, u8), r: (String, u8), level: u8| {
            (
                format!("{}{op}{}", paren_if_gtr(l, level), paren_if_geq(r, level)),
                level,
            )
        };
        let unop = |op: &str, r: (String, u8)| {
            (format!("{op}{}", paren_if_gtr(r, PREC_ATOM)), PREC_ATOM)
        };

        match &*self.node {
            RegexNode::Empty => ("∅".to_string(), PREC_ATOM),
            RegexNode::Epsilon => ("ε".to_string(), PREC_ATOM),
            RegexNode::Alphabet => ("Σ".to_string(), PREC_ATOM),
            RegexNode::Literal(Literal::Value(v)) => (v.to_string(), PREC_ATOM),
            RegexNode::Literal(Literal::Predicate(_)) => ("⟨pred⟩".to_string(), PREC_ATOM),
            RegexNode::Disjunction(a, b) => binop(" | ", a.render(), b.render(), PREC_DISJ),
            RegexNode::Sequence(a, b) => binop("", a.render(), b.render(), PREC_SEQ),
            RegexNode::Conjunction(a, b) => binop(" & ", a.render(), b.render(), PREC_CONJ),
            RegexNode::KleeneStar(a) => unop("*", a.render()),
            RegexNode::Complement(a) => unop("¬", a.render()),
        }
    }
}

/// Renders the regex with the conventional operator notation.
///
/// `∅`, `ε` and `Σ` print as themselves, literals via their `Display`, predicate literals
/// as `⟨pred⟩`; `*` and `¬` are prefix operators binding tightest, then sequencing
/// (implicit), then ` & `, then ` | `. Parentheses appear exactly where precedence
/// requires them.
impl<T: fmt::Display> fmt::Display for Regex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render().0)
    }
}
