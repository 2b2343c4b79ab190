use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lazy_static::lazy_static;
use munch::dfa::Dfa;
use munch::lexer::{Lexer, Rule};
use munch::nfa::Nfa;
use munch::regex::Regex;
use rand::prelude::*;

// *(ab|c) with a dash of nesting, the workhorse pattern of the matching benchmarks
fn nested_regex() -> Regex<char> {
    let ab = Regex::literal('a').then(&Regex::literal('b'));
    let inner = ab.or(&Regex::literal('c')).star();
    inner.then(&Regex::literal('d').opt()).then(&inner)
}

lazy_static! {
    // A long input entirely inside the language of nested_regex()
    static ref MATCHING_INPUT: Vec<char> = {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut input = Vec::with_capacity(120_000);
        for _ in 0..40_000 {
            if rng.gen_bool(0.5) {
                input.extend(['a', 'b']);
            } else {
                input.push('c');
            }
        }
        input
    };
    // The same input with a poisoned prefix: no prefix beyond the first symbol matches
    static ref POISONED_INPUT: Vec<char> = {
        let mut input = vec!['z', 'z'];
        input.extend(MATCHING_INPUT.iter().copied());
        input
    };
    static ref COMPILED_DFA: Dfa<char> = nested_regex().to_dfa().unwrap();
    static ref COMPILED_NFA: Nfa<char> = nested_regex().to_nfa().unwrap();
}

pub fn regex_compilation(c: &mut Criterion) {
    let regex = nested_regex();
    c.bench_function("compile regex to NFA", |b| {
        b.iter(|| black_box(&regex).to_nfa().unwrap())
    });
    c.bench_function("compile regex to DFA", |b| {
        b.iter(|| black_box(&regex).to_dfa().unwrap())
    });
}

pub fn acceptance(c: &mut Criterion) {
    c.bench_function("dfa accepts long input", |b| {
        b.iter(|| COMPILED_DFA.accepts(black_box(MATCHING_INPUT.iter())))
    });
    c.bench_function("nfa accepts long input", |b| {
        b.iter(|| COMPILED_NFA.accepts(black_box(MATCHING_INPUT.iter())))
    });
}

// The dead state pays off on inputs that stop matching early: the munch loop exits at
// the first poisoned symbol instead of scanning the remaining 120k symbols.
pub fn dead_state_early_termination(c: &mut Criterion) {
    c.bench_function("munch full match", |b| {
        b.iter(|| COMPILED_DFA.munch(black_box(MATCHING_INPUT.iter())))
    });
    c.bench_function("munch early exit", |b| {
        b.iter(|| COMPILED_DFA.munch(black_box(POISONED_INPUT.iter())))
    });
}

fn arithmetic_rules() -> Vec<Rule<char, Regex<char>, u8>> {
    let digit = Regex::range('0', '9');
    let alpha = Regex::range('a', 'z');
    vec![
        Rule::new(digit.plus(), |_: &[char]| 0u8),
        Rule::new(alpha.plus(), |_: &[char]| 1u8),
        Rule::new(Regex::any_of("+-*/ ".chars()).plus(), |_: &[char]| 2u8),
    ]
}

pub fn lexers(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x1e8);
    let fragments = ["x1", "12", "foo", " + ", "bar42", " * ", "7 - "];
    let input: Vec<char> = (0..120)
        .flat_map(|_| fragments.choose(&mut rng).unwrap().chars())
        .collect();

    let dfa_lexer = Lexer::make_dfa_lexer(arithmetic_rules(), Regex::empty()).unwrap();
    let derivation_lexer = Lexer::make_derivation_lexer(arithmetic_rules(), Regex::empty());

    c.bench_function("dfa lexer", |b| {
        b.iter(|| dfa_lexer.lex(black_box(input.iter().copied())).unwrap())
    });
    c.bench_function("derivation lexer", |b| {
        b.iter(|| derivation_lexer.lex(black_box(input.iter().copied())).unwrap())
    });
    c.bench_function("dfa lexer construction", |b| {
        b.iter(|| Lexer::make_dfa_lexer(arithmetic_rules(), Regex::empty()).unwrap())
    });
}

criterion_group!(
    benches,
    regex_compilation,
    acceptance,
    dead_state_early_termination,
    lexers
);
criterion_main!(benches);
