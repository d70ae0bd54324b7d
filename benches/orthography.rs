//! Benchmarks for written-spelling derivation and article selection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use italian_lexicon::{ArticleSelector, Gender, Number, Orthography};

const STRESSED: &[&str] = &[
    "pàrlo", "parlàvano", "città", "perché", "fè", "càse", "bèllo", "grànde", "parlerò",
    "virtù", "décolleté", "sé", "ùltimo", "andàrono", "caffè",
];

const NOUNS: &[(&str, Gender, Number)] = &[
    ("studente", Gender::Masculine, Number::Singular),
    ("gnomo", Gender::Masculine, Number::Singular),
    ("amico", Gender::Masculine, Number::Singular),
    ("amici", Gender::Masculine, Number::Plural),
    ("hotel", Gender::Masculine, Number::Singular),
    ("casa", Gender::Feminine, Number::Singular),
    ("erba", Gender::Feminine, Number::Singular),
    ("zii", Gender::Masculine, Number::Plural),
];

fn bench_derive_written(c: &mut Criterion) {
    let orthography = Orthography::default();
    let total_bytes: usize = STRESSED.iter().map(|w| w.len()).sum();

    let mut group = c.benchmark_group("Written Spelling");
    group.throughput(Throughput::Bytes(total_bytes as u64));

    group.bench_function(BenchmarkId::new("derive_written", "sample"), |b| {
        b.iter(|| {
            for word in STRESSED {
                black_box(orthography.derive_written(black_box(word)));
            }
        });
    });
    group.finish();
}

fn bench_articles(c: &mut Criterion) {
    let mut group = c.benchmark_group("Articles");
    group.throughput(Throughput::Elements(NOUNS.len() as u64));

    group.bench_function(BenchmarkId::new("definite", "cold"), |b| {
        b.iter_with_setup(ArticleSelector::default, |selector| {
            for &(word, gender, number) in NOUNS {
                black_box(selector.definite(word, gender, number));
            }
        });
    });

    let selector = ArticleSelector::default();
    group.bench_function(BenchmarkId::new("definite", "cached"), |b| {
        b.iter(|| {
            for &(word, gender, number) in NOUNS {
                black_box(selector.definite(black_box(word), gender, number));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_derive_written, bench_articles);
criterion_main!(benches);
