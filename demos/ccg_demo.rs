//! A hand-built English grammar pack and a handful of score tensors,
//! enough to exercise the A* driver end to end without a real
//! supertagger/dependency model on hand.

use ccg_astar::ccg::combinator::en_default_binary_rules;
use ccg_astar::ccg::grammar::RootMatchMode;
use ccg_astar::{Category, GrammarPack, Parser, ParserConfig, ScoreTensors, Token};

/// Builds a toy grammar covering determiners, nouns, intransitive and
/// transitive verbs, and an auxiliary, wired up with the seen-rules pairs
/// a real grammar pack would derive from a treebank.
fn setup_english_grammar() -> GrammarPack {
    let s = Category::s();
    let np = Category::np();
    let n = Category::n();

    let det = Category::forward(np.clone(), n.clone());
    let iv = Category::backward(s.clone(), np.clone());
    let tv = Category::forward(iv.clone(), np.clone());
    let aux = Category::forward(iv.clone(), iv.clone());

    let mut grammar = GrammarPack::new(
        vec![det.clone(), n.clone(), np.clone(), iv.clone(), tv.clone(), aux.clone(), s.clone()],
        en_default_binary_rules(),
    );

    grammar.mark_seen(&det, &n);
    grammar.mark_seen(&np, &iv);
    grammar.mark_seen(&np, &tv);
    grammar.mark_seen(&tv, &np);
    grammar.mark_seen(&aux, &iv);
    grammar.mark_seen(&np, &aux);

    grammar.category_dictionary.insert("the".to_string(), [0usize].into_iter().collect());
    grammar.category_dictionary.insert("cat".to_string(), [1usize].into_iter().collect());
    grammar.category_dictionary.insert("dog".to_string(), [1usize].into_iter().collect());
    grammar.category_dictionary.insert("sleeps".to_string(), [3usize].into_iter().collect());
    grammar.category_dictionary.insert("runs".to_string(), [3usize].into_iter().collect());
    grammar.category_dictionary.insert("chases".to_string(), [4usize].into_iter().collect());
    grammar.category_dictionary.insert("will".to_string(), [5usize].into_iter().collect());

    grammar.set_root_categories(&[s], RootMatchMode::Exact);
    grammar
}

/// Every category gets a small fixed bias toward the index a handwritten
/// lexicon would assign the word, standing in for a real supertagger's
/// output distribution.
fn toy_scores(words: &[&str], favored: &[usize], num_cats: usize) -> ScoreTensors {
    let n = words.len();
    let tag_log_prob = (0..n)
        .map(|i| {
            (0..num_cats)
                .map(|c| if c == favored[i] { -0.05 } else { -4.0 })
                .collect()
        })
        .collect();
    // Each word's highest-probability head is the next word; the last
    // word's head is the virtual ROOT (column n).
    let dep_log_prob = (0..n)
        .map(|i| {
            (0..=n)
                .map(|j| if j == (i + 1).min(n) { -0.1 } else { -3.0 })
                .collect()
        })
        .collect();
    ScoreTensors::new(tag_log_prob, dep_log_prob)
}

fn main() {
    env_logger::init();

    println!("=== CCG A* CHART PARSER ===");

    let grammar = setup_english_grammar();
    let config = ParserConfig {
        nbest: 3,
        ..ParserConfig::default()
    };
    let parser = Parser::new(grammar, config);

    let sentences: &[(&str, &[usize])] = &[
        ("the cat sleeps", &[0, 1, 3]),
        ("the dog chases the cat", &[0, 1, 4, 0, 1]),
        ("the dog will chase the cat", &[0, 1, 5, 4, 0, 1]),
    ];

    for (sentence, favored) in sentences {
        println!("\nParsing: {}", sentence);
        let tokens: Vec<Token> = Token::tokenize_whitespace(sentence);
        let scores = toy_scores(
            &tokens.iter().map(|t| t.surface.as_str()).collect::<Vec<_>>(),
            favored,
            7,
        );
        match parser.parse(&tokens, &scores) {
            Ok(derivations) if derivations.is_empty() => println!("  no parse found"),
            Ok(derivations) => {
                for (rank, derivation) in derivations.iter().enumerate() {
                    println!("  #{} (score {:.4})", rank + 1, derivation.score);
                    print!("{}", derivation.tree);
                }
            }
            Err(failure) => println!("  parse failed: {}", failure),
        }
    }
}
