//! # Parser combinators
//! A [`Parser<T, R>`] consumes a slice of tokens of type `T` and produces values of type
//! `R`. Parsers are algebraic: the primitives [`Parser::elem`] (one token satisfying a
//! predicate) and [`Parser::eps`] (succeed without consuming) combine through `|`
//! (alternation), `&` (sequencing, pairing the two results) and [`Parser::map`].
//!
//! The evaluation is an *ambiguous backtracking* one: a parser applied at a position
//! yields **every** `(value, rest)` pair it can produce, not just the first. The
//! top-level entry points then look at the complete parses (those consuming all input):
//! [`Parser::parse_all`] returns all of them, while [`Parser::parse`] demands exactly one
//! and reports [`ParserError::NoParse`] or [`ParserError::Ambiguous`] otherwise.
//!
//! ## Recursion
//! A grammar that refers to itself needs a parser identity that exists before its body
//! does. [`Recursive`] provides it: [`Recursive::parser`] hands out a usable placeholder,
//! and [`Recursive::define`] binds the body exactly once (a second binding is
//! [`ParserError::AlreadyBound`]). The placeholder holds a *weak* reference to the body —
//! that is what breaks the ownership cycle between a recursive parser and itself — so
//! parsing through a placeholder whose body has been dropped (or was never bound) fails
//! with [`ParserError::Expired`].
//!
//! ```
//! use munch::parser::Parser;
//!
//! // A list of digits summed together: p = ε(0) | (digit & p).map(+)
//! let digit = Parser::elem(|c: &char| c.is_ascii_digit()).map(|c| c as i64 - '0' as i64);
//! let rec = munch::parser::Recursive::new();
//! let body = Parser::eps(0).or(&digit.then(&rec.parser()).map(|(d, rest)| d + rest));
//! let sum = rec.define(body).unwrap();
//!
//! assert_eq!(sum.parse(&['1', '2', '4']), Ok(7));
//! assert_eq!(sum.parse(&[]), Ok(0));
//! ```
//!
//! Derived combinators ([`opt`], [`many`], [`many1`], [`repsep`], [`repsep1`],
//! [`either`]) live in [`combinators`] and are re-exported here.
//!
//! Left-recursive grammars are out of scope: a parser that re-enters itself without
//! consuming a token recurses without progress.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use thiserror::Error;

pub mod combinators;

pub use combinators::{either, many, many1, opt, repsep, repsep1, Either};

/// Errors reported by parsing and by [`Recursive`] binding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParserError {
    /// No parse consumed the whole input.
    #[error("parsing failed: no complete parse")]
    NoParse,
    /// More than one parse consumed the whole input.
    #[error("parsing is ambiguous: {0} complete parses")]
    Ambiguous(usize),
    /// A recursive placeholder was invoked with its body dropped or never bound.
    #[error("recursive parser expired")]
    Expired,
    /// [`Recursive::define`] was called twice on the same cell.
    #[error("recursive parser already bound")]
    AlreadyBound,
}

// Every parse yields all (value, next position) pairs.
type Parses<R> = Vec<(R, usize)>;

trait ParseNode<T, R> {
    fn parse_at(&self, input: &[T], position: usize) -> Result<Parses<R>, ParserError>;
}

struct Elem<T> {
    predicate: Rc<dyn Fn(&T) -> bool>,
}

impl<T: Clone> ParseNode<T, T> for Elem<T> {
    fn parse_at(&self, input: &[T], position: usize) -> Result<Parses<T>, ParserError> {
        match input.get(position) {
            Some(token) if (self.predicate)(token) => Ok(vec![(token.clone(), position + 1)]),
            _ => Ok(vec![]),
        }
    }
}

struct Epsilon<R> {
    value: R,
}

impl<T, R: Clone> ParseNode<T, R> for Epsilon<R> {
    fn parse_at(&self, _input: &[T], position: usize) -> Result<Parses<R>, ParserError> {
        Ok(vec![(self.value.clone(), position)])
    }
}

struct Disjunction<T, R> {
    left: Parser<T, R>,
    right: Parser<T, R>,
}

impl<T, R> ParseNode<T, R> for Disjunction<T, R> {
    fn parse_at(&self, input: &[T], position: usize) -> Result<Parses<R>, ParserError> {
        let mut parses = self.left.node.parse_at(input, position)?;
        parses.extend(self.right.node.parse_at(input, position)?);
        Ok(parses)
    }
}

struct Sequence<T, A, B> {
    left: Parser<T, A>,
    right: Parser<T, B>,
}

impl<T, A: Clone, B> ParseNode<T, (A, B)> for Sequence<T, A, B> {
    fn parse_at(&self, input: &[T], position: usize) -> Result<Parses<(A, B)>, ParserError> {
        let mut parses = Vec::new();
        for (first, next) in self.left.node.parse_at(input, position)? {
            for (second, rest) in self.right.node.parse_at(input, next)? {
                parses.push(((first.clone(), second), rest));
            }
        }
        Ok(parses)
    }
}

struct MapNode<T, U, R> {
    underlying: Parser<T, U>,
    map: Rc<dyn Fn(U) -> R>,
}

impl<T, U, R> ParseNode<T, R> for MapNode<T, U, R> {
    fn parse_at(&self, input: &[T], position: usize) -> Result<Parses<R>, ParserError> {
        Ok(self
            .underlying
            .node
            .parse_at(input, position)?
            .into_iter()
            .map(|(value, rest)| ((self.map)(value), rest))
            .collect())
    }
}

// The placeholder node handed out by Recursive::parser before binding. The weak target
// breaks the ownership cycle between a recursive parser and its own body.
struct RecursionNode<T, R> {
    target: RefCell<Option<Weak<dyn ParseNode<T, R>>>>,
}

impl<T, R> ParseNode<T, R> for RecursionNode<T, R> {
    fn parse_at(&self, input: &[T], position: usize) -> Result<Parses<R>, ParserError> {
        let node = match &*self.target.borrow() {
            Some(weak) => weak.upgrade().ok_or(ParserError::Expired)?,
            None => return Err(ParserError::Expired),
        };
        node.parse_at(input, position)
    }
}

/// A parser from tokens of type `T` to values of type `R`.
///
/// Immutable, with cheap `Clone` (reference-counted sharing). See the
/// [module-level documentation](crate::parser).
pub struct Parser<T, R> {
    node: Rc<dyn ParseNode<T, R>>,
}

impl<T, R> Clone for Parser<T, R> {
    fn clone(&self) -> Self {
        Parser {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: Clone + 'static> Parser<T, T> {
    /// Consumes one token satisfying `predicate` and yields it.
    pub fn elem(predicate: impl Fn(&T) -> bool + 'static) -> Self {
        Parser {
            node: Rc::new(Elem {
                predicate: Rc::new(predicate),
            }),
        }
    }

    /// Consumes one token equal to `value` and yields it.
    pub fn elem_eq(value: T) -> Self
    where
        T: PartialEq,
    {
        Parser::elem(move |token| *token == value)
    }

    /// Consumes any one token and yields it.
    pub fn success() -> Self {
        Parser::elem(|_| true)
    }

    /// Consumes nothing and never yields: the parser of the empty language.
    pub fn failure() -> Self {
        Parser::elem(|_| false)
    }
}

impl<T: 'static, R: Clone + 'static> Parser<T, R> {
    /// Yields `value` without consuming anything.
    pub fn eps(value: R) -> Self {
        Parser {
            node: Rc::new(Epsilon { value }),
        }
    }
}

impl<T: 'static, R: 'static> Parser<T, R> {
    /// Alternation: every parse of `self` and every parse of `that`, on the same input.
    pub fn or(&self, that: &Parser<T, R>) -> Parser<T, R> {
        Parser {
            node: Rc::new(Disjunction {
                left: self.clone(),
                right: that.clone(),
            }),
        }
    }

    /// Sequencing: for every parse of `self`, continue with every parse of `that` on the
    /// remaining input, pairing the two values.
    pub fn then<R2: 'static>(&self, that: &Parser<T, R2>) -> Parser<T, (R, R2)>
    where
        R: Clone,
    {
        Parser {
            node: Rc::new(Sequence {
                left: self.clone(),
                right: that.clone(),
            }),
        }
    }

    /// Applies `map` to every yielded value.
    pub fn map<U: 'static>(&self, map: impl Fn(R) -> U + 'static) -> Parser<T, U> {
        Parser {
            node: Rc::new(MapNode {
                underlying: self.clone(),
                map: Rc::new(map),
            }),
        }
    }

    /// Applies this parser at `position`, yielding every `(value, next position)` pair.
    ///
    /// This is the raw ambiguous evaluation; most callers want [`Parser::parse`] or
    /// [`Parser::parse_all`].
    pub fn apply(&self, input: &[T], position: usize) -> Result<Vec<(R, usize)>, ParserError> {
        self.node.parse_at(input, position)
    }

    /// All values of parses consuming the whole input.
    pub fn parse_all(&self, input: &[T]) -> Result<Vec<R>, ParserError> {
        Ok(self
            .apply(input, 0)?
            .into_iter()
            .filter(|(_, rest)| *rest == input.len())
            .map(|(value, _)| value)
            .collect())
    }

    /// The unique value of the parse consuming the whole input.
    ///
    /// Errors with [`ParserError::NoParse`] if there is none and
    /// [`ParserError::Ambiguous`] if there are several.
    pub fn parse(&self, input: &[T]) -> Result<R, ParserError> {
        let mut parses = self.parse_all(input)?;
        match parses.len() {
            1 => Ok(parses.pop().expect("length was just checked")),
            0 => Err(ParserError::NoParse),
            n => Err(ParserError::Ambiguous(n)),
        }
    }
}

impl<T: 'static, R: 'static> std::ops::BitOr for Parser<T, R> {
    type Output = Parser<T, R>;

    fn bitor(self, rhs: Parser<T, R>) -> Parser<T, R> {
        self.or(&rhs)
    }
}

impl<T: 'static, A: Clone + 'static, B: 'static> std::ops::BitAnd<Parser<T, B>>
    for Parser<T, A>
{
    type Output = Parser<T, (A, B)>;

    fn bitand(self, rhs: Parser<T, B>) -> Parser<T, (A, B)> {
        self.then(&rhs)
    }
}

/// A once-bindable cell giving a parser an identity before its body is built, so the body
/// may refer to itself.
///
/// [`Recursive::parser`] returns a placeholder parser; after [`Recursive::define`] binds
/// the body, it returns the body itself. The placeholder only ever holds a weak
/// reference: some strong reference to the bound body (the value returned by `define`, or
/// the `Recursive` itself) must be kept alive for the placeholder to keep working.
pub struct Recursive<T, R> {
    node: Rc<RecursionNode<T, R>>,
    body: RefCell<Option<Parser<T, R>>>,
}

impl<T: 'static, R: 'static> Recursive<T, R> {
    /// Creates a fresh, unbound cell.
    pub fn new() -> Self {
        Recursive {
            node: Rc::new(RecursionNode {
                target: RefCell::new(None),
            }),
            body: RefCell::new(None),
        }
    }

    /// The parser identity of this cell: the bound body if it exists, a weak placeholder
    /// otherwise.
    pub fn parser(&self) -> Parser<T, R> {
        match &*self.body.borrow() {
            Some(body) => body.clone(),
            None => Parser {
                node: self.node.clone() as Rc<dyn ParseNode<T, R>>,
            },
        }
    }

    /// Binds `body` to this cell and returns it. Errors with
    /// [`ParserError::AlreadyBound`] on a second binding.
    pub fn define(&self, body: Parser<T, R>) -> Result<Parser<T, R>, ParserError> {
        if self.body.borrow().is_some() {
            return Err(ParserError::AlreadyBound);
        }
        *self.node.target.borrow_mut() = Some(Rc::downgrade(&body.node));
        *self.body.borrow_mut() = Some(body.clone());
        Ok(body)
    }
}

impl<T: 'static, R: 'static> Default for Recursive<T, R> {
    fn default() -> Self {
        Recursive::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower() -> Parser<char, char> {
        Parser::elem(|c: &char| c.is_ascii_lowercase())
    }

    #[test]
    fn elem_consumes_exactly_one_matching_token() {
        let p = lower();
        assert_eq!(p.parse(&['a']), Ok('a'));
        assert_eq!(p.parse(&['A']), Err(ParserError::NoParse));
        assert_eq!(p.parse(&[]), Err(ParserError::NoParse));
        assert_eq!(p.parse(&['a', 'b']), Err(ParserError::NoParse));

        assert_eq!(Parser::elem_eq('x').parse(&['x']), Ok('x'));
        assert_eq!(Parser::elem_eq('x').parse(&['y']), Err(ParserError::NoParse));

        assert_eq!(Parser::<char, char>::success().parse(&['?']), Ok('?'));
        assert_eq!(
            Parser::<char, char>::failure().parse(&['?']),
            Err(ParserError::NoParse)
        );
    }

    #[test]
    fn eps_consumes_nothing() {
        let p: Parser<char, i32> = Parser::eps(42);
        assert_eq!(p.parse(&[]), Ok(42));
        assert_eq!(p.parse(&['a']), Err(ParserError::NoParse));
    }

    #[test]
    fn alternation_collects_parses_from_both_sides() {
        let p = lower().or(&Parser::elem_eq('1'));
        assert_eq!(p.parse(&['a']), Ok('a'));
        assert_eq!(p.parse(&['1']), Ok('1'));
        assert_eq!(p.parse(&['A']), Err(ParserError::NoParse));

        // The union is a multiset: both branches' parses are kept
        let doubled = lower().or(&lower());
        assert_eq!(doubled.parse_all(&['a']), Ok(vec!['a', 'a']));
        assert_eq!(doubled.parse(&['a']), Err(ParserError::Ambiguous(2)));
    }

    #[test]
    fn sequencing_pairs_the_results() {
        let p = lower().then(&Parser::elem(|c: &char| c.is_ascii_digit()));
        assert_eq!(p.parse(&['a', '1']), Ok(('a', '1')));
        assert_eq!(p.parse(&['a']), Err(ParserError::NoParse));
        assert_eq!(p.parse(&['1', 'a']), Err(ParserError::NoParse));

        let with_ops = lower().clone() & Parser::elem_eq('!');
        assert_eq!(with_ops.parse(&['z', '!']), Ok(('z', '!')));
    }

    #[test]
    fn map_transforms_each_value() {
        let digit = Parser::elem(|c: &char| c.is_ascii_digit()).map(|c| c as i64 - '0' as i64);
        assert_eq!(digit.parse(&['7']), Ok(7));
    }

    #[test]
    fn recursive_parser_sums_a_token_list() {
        // p = ε(0) | (any & p).map(+): all complete parses agree on the sum
        let any = Parser::<i64, i64>::success();
        let rec = Recursive::new();
        let body = Parser::eps(0).or(&any.then(&rec.parser()).map(|(head, rest)| head + rest));
        let sum = rec.define(body).unwrap();

        assert_eq!(sum.parse_all(&[1, 10, 100]), Ok(vec![111]));
        assert_eq!(sum.parse(&[1, 10, 100]), Ok(111));
        assert_eq!(sum.parse(&[]), Ok(0));
    }

    #[test]
    fn define_binds_exactly_once() {
        let rec: Recursive<char, char> = Recursive::new();
        assert!(rec.define(lower()).is_ok());
        assert_eq!(
            rec.define(lower()).err().unwrap(),
            ParserError::AlreadyBound
        );
    }

    #[test]
    fn unbound_placeholder_expires() {
        let rec: Recursive<char, char> = Recursive::new();
        let placeholder = rec.parser();
        assert_eq!(placeholder.parse(&['a']), Err(ParserError::Expired));
    }

    #[test]
    fn placeholder_expires_when_the_body_is_dropped() {
        let placeholder = {
            let rec: Recursive<char, char> = Recursive::new();
            let placeholder = rec.parser();
            let bound = rec.define(lower()).unwrap();
            assert_eq!(placeholder.parse(&['a']), Ok('a'));
            drop(bound);
            placeholder
            // rec (and with it the body) drops here
        };
        assert_eq!(placeholder.parse(&['a']), Err(ParserError::Expired));
    }

    #[test]
    fn bound_parser_outlives_the_cell() {
        let sum = {
            let any = Parser::<i64, i64>::success();
            let rec = Recursive::new();
            let body = Parser::eps(0).or(&any.then(&rec.parser()).map(|(head, rest)| head + rest));
            rec.define(body).unwrap()
            // rec drops here; `sum` keeps the body (and thus the weak target) alive
        };
        assert_eq!(sum.parse(&[2, 3]), Ok(5));
    }
}
