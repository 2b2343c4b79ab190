//! Derived combinators built on the parser primitives: optionality, repetition,
//! separator-delimited repetition and tagged alternation.
//!
//! The repetition combinators are right-recursive [`Recursive`] constructions: the
//! recursion accumulates elements back-to-front and the final [`map`](Parser::map)
//! reverses them. They inherit the ambiguous-evaluation semantics, so e.g.
//! `many(p).then(&many(p))` yields one parse per split point.

use crate::parser::{Parser, Recursive};

/// A two-armed tagged union for [`either`]. Nest it for wider alternations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

/// Zero or one occurrence of `parser`: yields `None` without consuming, or `Some` of a
/// parse.
pub fn opt<T, R>(parser: &Parser<T, R>) -> Parser<T, Option<R>>
where
    T: 'static,
    R: Clone + 'static,
{
    Parser::eps(None).or(&parser.map(Some))
}

/// Zero or more occurrences of `element`, collected in order.
pub fn many<T, R>(element: &Parser<T, R>) -> Parser<T, Vec<R>>
where
    T: 'static,
    R: Clone + 'static,
{
    let rec = Recursive::new();
    let body = Parser::eps(Vec::new()).or(&element
        .then(&rec.parser())
        .map(|(head, mut tail): (R, Vec<R>)| {
            tail.push(head);
            tail
        }));
    let bound = rec.define(body).expect("the recursive cell is freshly created");

    bound.map(|mut items| {
        items.reverse();
        items
    })
}

/// One or more occurrences of `element`, collected in order.
pub fn many1<T, R>(element: &Parser<T, R>) -> Parser<T, Vec<R>>
where
    T: 'static,
    R: Clone + 'static,
{
    let rec = Recursive::new();
    let body = element
        .then(&Parser::eps(Vec::new()).or(&rec.parser()))
        .map(|(head, mut tail): (R, Vec<R>)| {
            tail.push(head);
            tail
        });
    let bound = rec.define(body).expect("the recursive cell is freshly created");

    bound.map(|mut items| {
        items.reverse();
        items
    })
}

/// One or more occurrences of `element` separated by `separator`, keeping only the
/// elements.
pub fn repsep1<T, R, S>(element: &Parser<T, R>, separator: &Parser<T, S>) -> Parser<T, Vec<R>>
where
    T: 'static,
    R: Clone + 'static,
    S: Clone + 'static,
{
    let rec = Recursive::new();
    let tail_element = separator.then(element).map(|(_, element)| element);
    let body = Parser::eps(Vec::new()).or(&tail_element
        .then(&rec.parser())
        .map(|(head, mut tail): (R, Vec<R>)| {
            tail.push(head);
            tail
        }));
    let bound = rec.define(body).expect("the recursive cell is freshly created");

    element
        .then(&bound)
        .map(|(head, mut tail): (R, Vec<R>)| {
            tail.push(head);
            tail
        })
        .map(|mut items| {
            items.reverse();
            items
        })
}

/// Zero or more occurrences of `element` separated by `separator`, keeping only the
/// elements.
pub fn repsep<T, R, S>(element: &Parser<T, R>, separator: &Parser<T, S>) -> Parser<T, Vec<R>>
where
    T: 'static,
    R: Clone + 'static,
    S: Clone + 'static,
{
    Parser::eps(Vec::new()).or(&repsep1(element, separator))
}

/// Tagged alternation: a parse of `left` as [`Either::Left`] or a parse of `right` as
/// [`Either::Right`].
pub fn either<T, L, R>(left: &Parser<T, L>, right: &Parser<T, R>) -> Parser<T, Either<L, R>>
where
    T: 'static,
    L: 'static,
    R: 'static,
{
    left.map(Either::Left).or(&right.map(Either::Right))
}
