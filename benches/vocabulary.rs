use burn_text_cnn::pipelines::text_classification::Vocabulary;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const WORDS: [&str; 12] = [
    "great", "sound", "awful", "battery", "life", "price", "value", "broke", "after", "week",
    "don't", "well-made",
];

fn corpus(documents: usize) -> Vec<String> {
    (0..documents)
        .map(|i| {
            (0..20)
                .map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_vocabulary(c: &mut Criterion) {
    let texts = corpus(1_000);

    c.bench_function("fit 1000 documents", |b| {
        b.iter(|| Vocabulary::fit(black_box(texts.iter().map(String::as_str))))
    });

    let vocabulary = Vocabulary::fit(texts.iter().map(String::as_str));

    c.bench_function("encode 1000 documents", |b| {
        b.iter(|| {
            for text in &texts {
                black_box(vocabulary.encode(text));
            }
        })
    });
}

criterion_group!(benches, bench_vocabulary);
criterion_main!(benches);
