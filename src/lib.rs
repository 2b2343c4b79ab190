//! # munch
//!
//! `munch` is a Rust library for building text-processing front-ends: a regular
//! expression algebra with Brzozowski derivatives, finite automata (deterministic and
//! nondeterministic with ε-transitions), a maximal-munch lexer over a lazy input buffer,
//! and ambiguity-aware parser combinators with fix-point recursion.
//!
//! The pieces stack naturally: raw input flows through an [`InputBuffer`](buffer::InputBuffer)
//! into a [`Lexer`](lexer::Lexer) whose rules are [`Regex`](regex::Regex)es — compiled
//! down to [`Dfa`](dfa::Dfa)s at construction for speed — and the resulting token stream
//! feeds a [`Parser`](parser::Parser). Each layer is also usable on its own, and every
//! value is immutable once built (builders are the only mutable pieces, and they
//! `finalize` into immutable artifacts). Everything is single-threaded by design;
//! sharing is reference-counted with value semantics.
//!
//! ## A taste
//!
//! ```
//! use munch::lexer::{Lexer, Rule};
//! use munch::parser::{repsep1, Parser};
//! use munch::regex::Regex;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Token {
//!     Number(i64),
//!     Plus,
//!     Space,
//! }
//!
//! // Lexing: regexes compiled to DFAs, maximal munch, priority by rule order
//! let digit = Regex::range('0', '9');
//! let lexer = Lexer::make_dfa_lexer(
//!     [
//!         Rule::new(digit.plus(), |w: &[char]| {
//!             Token::Number(w.iter().collect::<String>().parse().unwrap())
//!         }),
//!         Rule::new(Regex::literal('+'), |_: &[char]| Token::Plus),
//!         Rule::new(Regex::literal(' ').plus(), |_: &[char]| Token::Space),
//!     ],
//!     Regex::empty(),
//! )
//! .unwrap()
//! .map(|token| token.into_value())
//! .filter(|token| *token != Token::Space);
//!
//! let tokens = lexer.lex("1 + 2 + 39".chars()).unwrap();
//!
//! // Parsing: numbers separated by '+', summed
//! let number = Parser::elem(|t: &Token| matches!(t, Token::Number(_)))
//!     .map(|t| match t {
//!         Token::Number(n) => n,
//!         _ => unreachable!(),
//!     });
//! let plus = Parser::elem_eq(Token::Plus);
//! let sum = repsep1(&number, &plus).map(|ns| ns.into_iter().sum::<i64>());
//!
//! assert_eq!(sum.parse(&tokens), Ok(42));
//! ```
//!
//! ## The layers
//!
//! * [`regex`] — the algebra `{∅, ε, Σ, literal, a|b, a·b, *a, ¬a, a&b}` with smart
//!   constructors, derivation-based matching, metrics, printing, and a text syntax for
//!   `Regex<char>`. Closed under complement and intersection, generic over the symbol
//!   type, with predicate literals for classes the alphabet cannot enumerate.
//! * [`dfa`] / [`nfa`] — automata with named-alphabet transition tables plus an UNKNOWN
//!   column, built through validating builders. The DFA runtime short-circuits through an
//!   explicit dead state; the builders convert both ways (subset construction one way,
//!   trivial embedding the other) and support product, conjunction and complement.
//!   Regexes compile in via [`Regex::to_nfa`](regex::Regex::to_nfa) /
//!   [`to_dfa`](regex::Regex::to_dfa).
//! * [`buffer`] — a lazy, releasable window over a one-shot input source.
//! * [`lexer`] — ordered rules, longest-match selection with first-rule tie-breaking,
//!   line/column tracking, and `map`/`filter` post-stages.
//! * [`parser`] — ambiguous backtracking combinators enumerating every parse, with
//!   recursion through once-bindable [`Recursive`](parser::Recursive) cells and weak
//!   back-references.

pub mod buffer;
pub mod dfa;
pub mod lexer;
pub mod nfa;
pub mod parser;
pub mod regex;
