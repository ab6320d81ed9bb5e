use criterion::{Criterion, black_box, criterion_group, criterion_main};

use spantask::engine::edit_distance::{distance, word_distance};
use spantask::engine::scoring::{score, tokenize_recall};

const WORDS: &[&str] = &[
    "house", "river", "candle", "garden", "pencil", "window", "forest", "bottle", "carpet",
    "ladder", "mirror", "bucket",
];

fn make_list(len: usize, offset: usize) -> Vec<String> {
    (0..len)
        .map(|i| WORDS[(i + offset) % WORDS.len()].to_string())
        .collect()
}

/// Misspells every third word by swapping its first two letters.
fn sloppy(list: &[String]) -> Vec<String> {
    list.iter()
        .enumerate()
        .map(|(i, w)| {
            if i % 3 != 0 {
                return w.clone();
            }
            let mut chars: Vec<char> = w.chars().collect();
            chars.swap(0, 1);
            chars.into_iter().collect()
        })
        .collect()
}

fn bench_distance(c: &mut Criterion) {
    c.bench_function("word_distance (6 letters)", |b| {
        b.iter(|| word_distance(black_box("candle"), black_box("cnadel")))
    });

    let a = make_list(12, 0);
    let b = make_list(12, 5);
    c.bench_function("sequence distance (12 words)", |bench| {
        bench.iter(|| distance(black_box(&a), black_box(&b)))
    });
}

fn bench_score(c: &mut Criterion) {
    let presented = make_list(7, 2);
    let mut entered = sloppy(&presented);
    entered.swap(1, 4);

    c.bench_function("score ordered strict (7 items)", |b| {
        b.iter(|| score(black_box(&entered), black_box(&presented), 0, true))
    });
    c.bench_function("score ordered sloppy (7 items)", |b| {
        b.iter(|| score(black_box(&entered), black_box(&presented), 1, true))
    });
    c.bench_function("score unordered sloppy (7 items)", |b| {
        b.iter(|| score(black_box(&entered), black_box(&presented), 1, false))
    });
}

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_recall letters", |b| {
        b.iter(|| tokenize_recall(black_box("F, K q  R,t"), true))
    });
    c.bench_function("tokenize_recall words", |b| {
        b.iter(|| tokenize_recall(black_box("House, river  CANDLE,garden"), false))
    });
}

criterion_group!(benches, bench_distance, bench_score, bench_tokenize);
criterion_main!(benches);
