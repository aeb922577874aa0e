use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ccg_astar::ccg::combinator::en_default_binary_rules;
use ccg_astar::ccg::grammar::RootMatchMode;
use ccg_astar::{Category, GrammarPack, ParserConfig, ScoreTensors, Token};

/// A five-category toy grammar (`NP/N`, `N`, `NP`, `S\NP`, `(S\NP)/NP`)
/// large enough to force real agenda churn without needing a real
/// grammar pack on disk.
fn setup_grammar() -> GrammarPack {
    let np = Category::np();
    let n = Category::n();
    let s = Category::s();
    let det = Category::forward(np.clone(), n.clone());
    let iv = Category::backward(s.clone(), np.clone());
    let tv = Category::forward(iv.clone(), np.clone());

    let mut grammar = GrammarPack::new(
        vec![det.clone(), n.clone(), np.clone(), iv.clone(), tv.clone()],
        en_default_binary_rules(),
    );
    grammar.mark_seen(&det, &n);
    grammar.mark_seen(&np, &iv);
    grammar.mark_seen(&np, &tv);
    grammar.mark_seen(&tv, &np);
    grammar.set_root_categories(&[s], RootMatchMode::Exact);
    grammar
}

fn uniform_scores(words: &[&str], num_cats: usize, favored: &[usize]) -> ScoreTensors {
    let n = words.len();
    let tag_log_prob = (0..n)
        .map(|i| {
            (0..num_cats)
                .map(|c| if c == favored[i] { -0.1 } else { -5.0 })
                .collect()
        })
        .collect();
    let dep_log_prob = (0..n)
        .map(|i| {
            (0..=n)
                .map(|j| if j == n { -0.1 } else if j == i { -5.0 } else { -0.5 })
                .collect()
        })
        .collect();
    ScoreTensors::new(tag_log_prob, dep_log_prob)
}

fn bench_ccg_parsing(c: &mut Criterion) {
    let grammar = setup_grammar();
    let config = ParserConfig::default();

    let short_tokens = vec![Token::new("the"), Token::new("cat"), Token::new("sleeps")];
    let short_scores = uniform_scores(&["the", "cat", "sleeps"], 5, &[0, 1, 3]);

    let long_tokens = vec![
        Token::new("the"),
        Token::new("dog"),
        Token::new("chases"),
        Token::new("the"),
        Token::new("cat"),
    ];
    let long_scores = uniform_scores(&["the", "dog", "chases", "the", "cat"], 5, &[0, 1, 4, 0, 1]);

    let mut group = c.benchmark_group("ccg_astar parsing");

    group.bench_function("three word sentence", |b| {
        b.iter(|| {
            ccg_astar::ccg::astar::parse(
                black_box(&grammar),
                black_box(&short_scores),
                black_box(&short_tokens),
                black_box(&config),
                black_box(&Default::default()),
            )
        })
    });

    group.bench_function("five word sentence", |b| {
        b.iter(|| {
            ccg_astar::ccg::astar::parse(
                black_box(&grammar),
                black_box(&long_scores),
                black_box(&long_tokens),
                black_box(&config),
                black_box(&Default::default()),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_ccg_parsing);
criterion_main!(benches);
