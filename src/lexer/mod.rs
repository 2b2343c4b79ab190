//! # Maximal-munch lexer
//! A [`Lexer`] splits a symbol stream into tokens by repeatedly applying a prioritized
//! list of [`Rule`]s at the current position: every rule reports the length of the longest
//! non-empty prefix its matcher accepts, the longest match wins, and ties go to the rule
//! declared first. The winning rule's action maps the matched symbols to a token, which is
//! wrapped with the line and column of its first symbol (see [`Positioned`]). If no rule
//! matches, lexing fails with [`LexerError::NoApplicableRule`].
//!
//! Input is read through an [`InputBuffer`], so the source is pulled lazily and the
//! consumed prefix is released after every token; the buffer never holds more than the
//! current scan window.
//!
//! Two lexer flavours share this loop:
//!
//! * [`Lexer::make_dfa_lexer`] compiles every rule's regex to a [`Dfa`] once, up front,
//!   and matches with [`Dfa::munch`]. This is the fast path: the dead state cuts scans
//!   short as soon as no longer match is possible.
//! * [`Lexer::make_derivation_lexer`] keeps the regexes and matches by Brzozowski
//!   derivation, re-deriving over the scan window for every rule at every position. Slow,
//!   but it needs no compilation and supports predicate literals.
//!
//! Both take a `newline` matcher used purely for position tracking: after each token, if
//! the newline matcher accepts a non-empty prefix at the start of the token's window, the
//! line number is incremented, the column resets to 1, and the newline length is consumed
//! *in addition to* the token length. Pass [`Regex::empty`] to disable line tracking
//! (every token is then reported on line 1).
//!
//! Produced tokens can be post-processed: [`Lexer::map`] transforms every token and
//! [`Lexer::filter`] drops tokens failing a predicate; both wrap the lexer in a further
//! stage and compose freely.
//!
//! ```
//! use munch::lexer::{Lexer, Rule};
//! use munch::regex::Regex;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Token {
//!     Number(i64),
//!     Space,
//! }
//!
//! let digit = Regex::range('0', '9');
//! let lexer = Lexer::make_dfa_lexer(
//!     [
//!         Rule::new(digit.plus(), |w: &[char]| {
//!             Token::Number(w.iter().collect::<String>().parse().unwrap())
//!         }),
//!         Rule::new(Regex::literal(' ').plus(), |_: &[char]| Token::Space),
//!     ],
//!     Regex::empty(),
//! )
//! .unwrap()
//! .map(|token| token.into_value())
//! .filter(|token| *token != Token::Space);
//!
//! let tokens = lexer.lex("12 345".chars()).unwrap();
//! assert_eq!(tokens, vec![Token::Number(12), Token::Number(345)]);
//! ```

use crate::buffer::{BufferError, InputBuffer};
use crate::dfa::Dfa;
use crate::regex::{CompileError, Regex};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use thiserror::Error;

/// Errors reported when applying a [`Lexer`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexerError {
    /// At the given position, no rule matched a non-empty prefix.
    #[error("no lexing rule applies at line {line}, column {column}")]
    NoApplicableRule { line: usize, column: usize },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// A value wrapped with the line and column (both 1-based) of its first symbol.
///
/// Equality includes the position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positioned<R> {
    line: usize,
    column: usize,
    value: R,
}

impl<R> Positioned<R> {
    pub fn new(line: usize, column: usize, value: R) -> Self {
        Positioned {
            line,
            column,
            value,
        }
    }

    /// The line where the value starts.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The column where the value starts.
    pub fn column(&self) -> usize {
        self.column
    }

    /// A reference to the wrapped value.
    pub fn value(&self) -> &R {
        &self.value
    }

    /// Unwraps the value, dropping the position.
    pub fn into_value(self) -> R {
        self.value
    }
}

/// A lexing rule: a matcher deciding which prefixes are acceptable, and an action mapping
/// the matched symbols to a token. Rules are ordered; declaration order is priority.
pub struct Rule<T, M, R> {
    matcher: M,
    action: Rc<dyn Fn(&[T]) -> R>,
}

impl<T, M, R> Rule<T, M, R> {
    pub fn new(matcher: M, action: impl Fn(&[T]) -> R + 'static) -> Self {
        Rule {
            matcher,
            action: Rc::new(action),
        }
    }
}

impl<T, M: Clone, R> Clone for Rule<T, M, R> {
    fn clone(&self) -> Self {
        Rule {
            matcher: self.matcher.clone(),
            action: Rc::clone(&self.action),
        }
    }
}

// The one operation the munch loop needs from a matcher: the length of the longest
// non-empty accepted prefix of the buffer, scanning (and pulling) from offset 0.
trait Matcher<T> {
    fn longest_match(&self, input: &mut InputBuffer<'_, T>) -> Option<usize>;
}

impl<T: Clone + Eq + Hash> Matcher<T> for Dfa<T> {
    fn longest_match(&self, input: &mut InputBuffer<'_, T>) -> Option<usize> {
        self.munch(input.cursor()).filter(|&length| length > 0)
    }
}

impl<T: Clone + PartialEq> Matcher<T> for Regex<T> {
    fn longest_match(&self, input: &mut InputBuffer<'_, T>) -> Option<usize> {
        let mut regex = self.clone();
        let mut longest = None;
        let mut index = 0;
        while let Some(x) = input.get(index) {
            index += 1;
            regex = regex.derive(x);
            if regex.is_nullable() {
                longest = Some(index);
            }
        }
        longest
    }
}

trait Stage<T, R> {
    fn apply(&self, input: &mut InputBuffer<'_, T>) -> Result<Vec<R>, LexerError>;
}

// The maximal-munch loop, shared by the DFA and derivation lexers through the Matcher
// trait.
struct RuleLexer<T, M, R> {
    rules: Vec<Rule<T, M, R>>,
    newline: M,
}

impl<T, M: Matcher<T>, R> Stage<T, Positioned<R>> for RuleLexer<T, M, R> {
    fn apply(&self, input: &mut InputBuffer<'_, T>) -> Result<Vec<Positioned<R>>, LexerError> {
        let mut output = Vec::new();
        let mut line = 1;
        let mut column = 1;

        while !input.is_done() {
            // (rule index, match length); strictly longer matches win, ties keep the
            // earliest rule
            let mut best: Option<(usize, usize)> = None;
            for (index, rule) in self.rules.iter().enumerate() {
                if let Some(length) = rule.matcher.longest_match(input) {
                    if best.map_or(true, |(_, best_length)| length > best_length) {
                        best = Some((index, length));
                    }
                }
            }

            let Some((index, length)) = best else {
                return Err(LexerError::NoApplicableRule { line, column });
            };

            let token = {
                let matched = input.prefix(length)?;
                (self.rules[index].action)(matched)
            };
            output.push(Positioned::new(line, column, token));

            column += length;
            let mut consumed = length;
            if let Some(newline_length) = self.newline.longest_match(input) {
                line += 1;
                column = 1;
                consumed += newline_length;
            }
            input.release(consumed)?;
        }

        Ok(output)
    }
}

struct MapStage<T, U, R> {
    underlying: Lexer<T, U>,
    map: Rc<dyn Fn(U) -> R>,
}

impl<T, U, R> Stage<T, R> for MapStage<T, U, R> {
    fn apply(&self, input: &mut InputBuffer<'_, T>) -> Result<Vec<R>, LexerError> {
        Ok(self
            .underlying
            .stage
            .apply(input)?
            .into_iter()
            .map(|token| (self.map)(token))
            .collect())
    }
}

struct FilterStage<T, R> {
    underlying: Lexer<T, R>,
    predicate: Rc<dyn Fn(&R) -> bool>,
}

impl<T, R> Stage<T, R> for FilterStage<T, R> {
    fn apply(&self, input: &mut InputBuffer<'_, T>) -> Result<Vec<R>, LexerError> {
        let mut tokens = self.underlying.stage.apply(input)?;
        tokens.retain(|token| (self.predicate)(token));
        Ok(tokens)
    }
}

/// A lexer producing tokens of type `R` from symbols of type `T`.
///
/// Built with [`Lexer::make_dfa_lexer`] or [`Lexer::make_derivation_lexer`]; immutable
/// afterwards, with cheap `Clone`. See the [module-level documentation](crate::lexer).
pub struct Lexer<T, R> {
    stage: Rc<dyn Stage<T, R>>,
}

impl<T, R> Clone for Lexer<T, R> {
    fn clone(&self) -> Self {
        Lexer {
            stage: Rc::clone(&self.stage),
        }
    }
}

impl<T, R> Lexer<T, Positioned<R>>
where
    T: Clone + Eq + Hash + fmt::Debug + 'static,
    R: 'static,
{
    /// Builds a lexer that compiles every rule's regex (and the newline regex) to a DFA
    /// once, at construction.
    ///
    /// Errors with [`CompileError::PredicateLiteral`] if any matcher contains predicate
    /// literals; use the [derivation lexer](Lexer::make_derivation_lexer) for those.
    pub fn make_dfa_lexer(
        rules: impl IntoIterator<Item = Rule<T, Regex<T>, R>>,
        newline: Regex<T>,
    ) -> Result<Self, CompileError> {
        let compiled = rules
            .into_iter()
            .map(|rule| {
                Ok(Rule {
                    matcher: rule.matcher.to_dfa()?,
                    action: rule.action,
                })
            })
            .collect::<Result<Vec<_>, CompileError>>()?;
        Ok(Lexer {
            stage: Rc::new(RuleLexer {
                rules: compiled,
                newline: newline.to_dfa()?,
            }),
        })
    }
}

impl<T, R> Lexer<T, Positioned<R>>
where
    T: Clone + PartialEq + 'static,
    R: 'static,
{
    /// Builds a lexer that keeps the rule regexes and matches by derivation.
    ///
    /// Far slower than the [DFA lexer](Lexer::make_dfa_lexer) (every rule re-derives over
    /// the scan window at every position) but needs no compilation and supports predicate
    /// literals.
    pub fn make_derivation_lexer(
        rules: impl IntoIterator<Item = Rule<T, Regex<T>, R>>,
        newline: Regex<T>,
    ) -> Self {
        Lexer {
            stage: Rc::new(RuleLexer {
                rules: rules.into_iter().collect(),
                newline,
            }),
        }
    }
}

impl<T: 'static, R: 'static> Lexer<T, R> {
    /// Applies the lexer to a buffered input, producing all tokens.
    pub fn apply(&self, input: &mut InputBuffer<'_, T>) -> Result<Vec<R>, LexerError> {
        self.stage.apply(input)
    }

    /// Applies the lexer to any iterable input.
    pub fn lex<'s, I>(&self, source: I) -> Result<Vec<R>, LexerError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 's,
    {
        let mut buffer = InputBuffer::new(source.into_iter());
        self.apply(&mut buffer)
    }

    /// A lexer applying `map` to every token this one produces.
    pub fn map<U: 'static>(&self, map: impl Fn(R) -> U + 'static) -> Lexer<T, U> {
        Lexer {
            stage: Rc::new(MapStage {
                underlying: self.clone(),
                map: Rc::new(map),
            }),
        }
    }

    /// A lexer discarding every token for which `predicate` is false.
    pub fn filter(&self, predicate: impl Fn(&R) -> bool + 'static) -> Lexer<T, R> {
        Lexer {
            stage: Rc::new(FilterStage {
                underlying: self.clone(),
                predicate: Rc::new(predicate),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Token {
        Keyword,
        Word(String),
        Number(i64),
        OpenParen,
        CloseParen,
        Separator,
        Operator,
        Comment,
    }

    use Token::*;

    // The rule set of the original arithmetic-language tests: keywords, identifiers,
    // numbers, parentheses, whitespace, operators and line comments, in priority order.
    fn rules() -> Vec<Rule<char, Regex<char>, Token>> {
        let alpha = Regex::range('a', 'z').or(&Regex::range('A', 'Z'));
        let digit = Regex::range('0', '9');
        let eol = Regex::literal('\n');
        let space = Regex::any_of("\t\n\x0b\x0c\r ".chars());
        let keywords = [
            Regex::word("if".chars()),
            Regex::word("then".chars()),
            Regex::word("else".chars()),
            Regex::word("return".chars()),
        ];

        vec![
            Rule::new(Regex::any_of_regexes(&keywords), |_: &[char]| Keyword),
            Rule::new(alpha.star(), |w: &[char]| Word(w.iter().collect())),
            Rule::new(digit.star(), |w: &[char]| {
                Number(w.iter().collect::<String>().parse().unwrap())
            }),
            Rule::new(Regex::literal('('), |_: &[char]| OpenParen),
            Rule::new(Regex::literal(')'), |_: &[char]| CloseParen),
            Rule::new(space.star(), |_: &[char]| Separator),
            Rule::new(Regex::any_of("+-/*".chars()), |_: &[char]| Operator),
            Rule::new(
                Regex::word("//".chars())
                    .then(&digit.or(&alpha).or(&Regex::literal(' ')).star())
                    .then(&eol),
                |_: &[char]| Comment,
            ),
        ]
    }

    fn lexers() -> Vec<Lexer<char, Positioned<Token>>> {
        vec![
            Lexer::make_dfa_lexer(rules(), Regex::empty()).unwrap(),
            Lexer::make_derivation_lexer(rules(), Regex::empty()),
        ]
    }

    #[track_caller]
    fn check(input: &str, expected: &[(usize, Token)]) {
        for lexer in lexers() {
            let tokens = lexer.lex(input.chars()).unwrap();
            let expected: Vec<Positioned<Token>> = expected
                .iter()
                .map(|(column, token)| Positioned::new(1, *column, token.clone()))
                .collect();
            assert_eq!(tokens, expected, "lexing {input:?}");
        }
    }

    #[test]
    fn simple_arithmetic_expression() {
        check(
            "12x+4",
            &[
                (1, Number(12)),
                (3, Word("x".to_string())),
                (4, Operator),
                (5, Number(4)),
            ],
        );
    }

    #[test]
    fn maximal_munch_prefers_the_longest_match() {
        // The comment rule swallows the whole line even though `/` alone is an operator
        check("//th15 15 a c0mment\n", &[(1, Comment)]);
    }

    #[test]
    fn priority_breaks_ties_in_declaration_order() {
        // "if" is both a keyword and a word; the keyword rule comes first
        check("if", &[(1, Keyword)]);
    }

    #[test]
    fn monoline_expression_with_exact_columns() {
        check(
            "return if (x equals 12) then (3) else (potato)",
            &[
                (1, Keyword),
                (7, Separator),
                (8, Keyword),
                (10, Separator),
                (11, OpenParen),
                (12, Word("x".to_string())),
                (13, Separator),
                (14, Word("equals".to_string())),
                (20, Separator),
                (21, Number(12)),
                (23, CloseParen),
                (24, Separator),
                (25, Keyword),
                (29, Separator),
                (30, OpenParen),
                (31, Number(3)),
                (32, CloseParen),
                (33, Separator),
                (34, Keyword),
                (38, Separator),
                (39, OpenParen),
                (40, Word("potato".to_string())),
                (46, CloseParen),
            ],
        );
    }

    #[test]
    fn no_applicable_rule_reports_the_position() {
        for lexer in lexers() {
            let result = lexer.lex("x?".chars());
            assert_eq!(
                result.unwrap_err(),
                LexerError::NoApplicableRule { line: 1, column: 2 }
            );
        }
    }

    #[test]
    fn map_drops_positions_and_filter_drops_tokens() {
        for lexer in lexers() {
            let plain = lexer
                .map(|token| token.into_value())
                .filter(|token| *token != Separator);
            let tokens = plain.lex("12 + 4".chars()).unwrap();
            assert_eq!(tokens, vec![Number(12), Operator, Number(4)]);
        }
    }

    #[test]
    fn newline_matcher_tracks_lines_and_consumes_in_addition() {
        // The newline length is consumed on top of the token length, measured from the
        // same window start: after the Separator token below, the '\n' matched by the
        // newline regex consumes one extra symbol ('c').
        let rules = vec![
            Rule::new(Regex::range('a', 'z').plus(), |w: &[char]| {
                Word(w.iter().collect())
            }),
            Rule::new(Regex::literal('\n'), |_: &[char]| Separator),
        ];
        let lexer = Lexer::make_dfa_lexer(rules, Regex::literal('\n')).unwrap();
        let tokens = lexer.lex("ab\ncd".chars()).unwrap();
        assert_eq!(
            tokens,
            vec![
                Positioned::new(1, 1, Word("ab".to_string())),
                Positioned::new(1, 3, Separator),
                Positioned::new(2, 1, Word("d".to_string())),
            ]
        );
    }

    #[test]
    fn derivation_lexer_supports_predicate_literals() {
        let rules = vec![
            Rule::new(
                Regex::literal_if(|c: &char| c.is_ascii_digit()).plus(),
                |w: &[char]| Number(w.iter().collect::<String>().parse().unwrap()),
            ),
            Rule::new(Regex::literal(' ').plus(), |_: &[char]| Separator),
        ];

        assert_eq!(
            Lexer::make_dfa_lexer(rules.clone(), Regex::empty()).err().unwrap(),
            CompileError::PredicateLiteral
        );

        let lexer = Lexer::make_derivation_lexer(rules, Regex::empty());
        let tokens = lexer.lex("42 7".chars()).unwrap();
        assert_eq!(
            tokens,
            vec![
                Positioned::new(1, 1, Number(42)),
                Positioned::new(1, 3, Separator),
                Positioned::new(1, 4, Number(7)),
            ]
        );
    }

    #[test]
    fn empty_input_produces_no_tokens() {
        for lexer in lexers() {
            assert_eq!(lexer.lex("".chars()).unwrap(), vec![]);
        }
    }
}
