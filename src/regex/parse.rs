//! # Regex text syntax
//! Parses the textual notation produced by the [`Display`](std::fmt::Display) implementation
//! on [`Regex`] back into a regex over `char`.
//!
//! The reserved characters are `(`, `)`, `∅`, `ε`, `Σ`, `|`, `&`, `*`, `+`, `~`, `¬` and
//! `\`; any other non-whitespace character is a literal, and reserved characters (or
//! whitespace) can be used as literals by escaping them with a backslash. `∅` is the empty
//! language, `ε` the empty word and `Σ` the one-symbol wildcard. `*` and `~` (or `¬`) are
//! prefix operators for Kleene star and complement, `+` is a postfix Kleene plus,
//! sequencing is implicit, `&` is conjunction and `|` is disjunction, binding in that
//! order (star/complement tightest, disjunction loosest). Parentheses group. Whitespace is
//! not significant.
//!
//! ```
//! use munch::regex::parse;
//!
//! let r = parse::regex("*(ab | c)").unwrap();
//! assert!(r.accepts("abcab".chars()));
//! assert!(!r.accepts("ac".chars()));
//!
//! let printed = r.to_string();
//! assert!(parse::regex(&printed).is_ok());
//! ```

use crate::regex::Regex;
use nom::branch::alt;
use nom::character::complete::{anychar, char as symbol, multispace0, one_of};
use nom::combinator::{all_consuming, map, value, verify};
use nom::error::Error;
use nom::multi::{many0, many1, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{Finish, IResult};

/// Parses a regular expression over `char` from its textual notation. The whole string must
/// be parsable (modulo leading/trailing whitespace), otherwise this function errors.
pub fn regex(input: &str) -> Result<Regex<char>, Error<&str>> {
    all_consuming(expression)(input.trim())
        .finish()
        .map(|(_, regex)| regex)
}

fn expression(input: &str) -> IResult<&str, Regex<char>> {
    alternation(input)
}

fn alternation(input: &str) -> IResult<&str, Regex<char>> {
    map(separated_list1(symbol('|'), conjunction), |parts| {
        parts
            .into_iter()
            .reduce(|l, r| l.or(&r))
            .expect("separated_list1 yields at least one element")
    })(input)
}

fn conjunction(input: &str) -> IResult<&str, Regex<char>> {
    map(separated_list1(symbol('&'), sequence), |parts| {
        parts
            .into_iter()
            .reduce(|l, r| l.and(&r))
            .expect("separated_list1 yields at least one element")
    })(input)
}

fn sequence(input: &str) -> IResult<&str, Regex<char>> {
    map(
        many1(delimited(multispace0, prefixed, multispace0)),
        |parts| {
            parts
                .into_iter()
                .reduce(|l, r| l.then(&r))
                .expect("many1 yields at least one element")
        },
    )(input)
}

fn prefixed(input: &str) -> IResult<&str, Regex<char>> {
    map(
        pair(many0(terminated(one_of("*~¬"), multispace0)), postfixed),
        |(ops, regex)| {
            // The operator closest to the operand applies first
            ops.into_iter().rev().fold(regex, |r, op| match op {
                '*' => r.star(),
                _ => r.complement(),
            })
        },
    )(input)
}

fn postfixed(input: &str) -> IResult<&str, Regex<char>> {
    map(
        pair(atom, many0(preceded(multispace0, symbol('+')))),
        |(regex, pluses)| pluses.into_iter().fold(regex, |r, _| r.plus()),
    )(input)
}

fn atom(input: &str) -> IResult<&str, Regex<char>> {
    alt((
        delimited(
            symbol('('),
            delimited(multispace0, expression, multispace0),
            symbol(')'),
        ),
        value(Regex::empty(), symbol('∅')),
        value(Regex::epsilon(), symbol('ε')),
        value(Regex::alphabet(), symbol('Σ')),
        escaped_literal,
        plain_literal,
    ))(input)
}

fn escaped_literal(input: &str) -> IResult<&str, Regex<char>> {
    map(preceded(symbol('\\'), anychar), Regex::literal)(input)
}

fn plain_literal(input: &str) -> IResult<&str, Regex<char>> {
    map(
        verify(anychar, |c| !is_reserved(*c) && !c.is_whitespace()),
        Regex::literal,
    )(input)
}

fn is_reserved(c: char) -> bool {
    [
        '(', ')', '∅', 'ε', 'Σ', '|', '&', '*', '+', '~', '¬', '\\',
    ]
    .contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn atoms_parse() {
        assert!(regex("∅").unwrap().is_empty());
        assert!(regex("ε").unwrap().is_epsilon());
        assert!(regex("Σ").unwrap().is_alphabet());
        assert!(regex("a").unwrap().accepts(&chars("a")));
        assert!(regex("\\*").unwrap().accepts(&chars("*")));
        assert!(regex("\\\\").unwrap().accepts(&chars("\\")));
    }

    #[test]
    fn operators_bind_in_precedence_order() {
        // Sequencing binds tighter than & which binds tighter than |
        let r = regex("ab | c & d").unwrap();
        assert!(r.accepts(&chars("ab")));
        assert!(!r.accepts(&chars("c")));
        assert!(!r.accepts(&chars("d")));

        let star = regex("*(ab|c)").unwrap();
        assert!(star.accepts(&chars("")));
        assert!(star.accepts(&chars("abcab")));
        assert!(!star.accepts(&chars("a")));

        let plus = regex("a+").unwrap();
        assert!(plus.accepts(&chars("a")));
        assert!(plus.accepts(&chars("aaa")));
        assert!(!plus.accepts(&chars("")));

        let not = regex("~(a|b)").unwrap();
        assert!(not.accepts(&chars("")));
        assert!(not.accepts(&chars("ab")));
        assert!(!not.accepts(&chars("a")));

        let conj = regex("*a & ~ε").unwrap();
        assert!(conj.accepts(&chars("a")));
        assert!(!conj.accepts(&chars("")));
    }

    #[test]
    fn whitespace_is_insignificant() {
        let spaced = regex(" * ( a b | c ) ").unwrap();
        assert!(spaced.accepts(&chars("abc")));
        let space_lit = regex("a\\ b").unwrap();
        assert!(space_lit.accepts(&chars("a b")));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(regex("").is_err());
        assert!(regex("(a").is_err());
        assert!(regex("a)").is_err());
        assert!(regex("a |").is_err());
        assert!(regex("*").is_err());
        assert!(regex("+a").is_err());
    }

    #[test]
    fn printing_round_trips_through_the_parser() {
        for src in ["a", "ab | c & d", "*(a | b)", "¬*a", "*¬(ab)", "Σ*Σ", "a | (b | c)"] {
            let first = regex(src).unwrap();
            let printed = first.to_string();
            let reparsed = regex(&printed).unwrap();
            assert_eq!(
                printed,
                reparsed.to_string(),
                "printing {src} did not round-trip"
            );
        }
    }
}
