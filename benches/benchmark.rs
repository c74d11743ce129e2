use std::{hint::black_box, sync::Arc, time::Duration};

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use feature_scorer::{
    Category, DistributionBuilder, DuplicateDetector, EngineConfig, Feature, FeatureId, FeatureRegistry,
    FrequencyVector, FrequencyVectorBuilder, HeuristicFeature, ParsedDocument, Tokenizer, UniverseVector,
    VectorFeature, Vectorizer,
};
use feature_scorer::{
    feature::rules,
    vectorizer::{cache::DocumentCache, universe::LazyUniverse},
};
use rayon::prelude::*;

const WORDS: &[&str] = &[
    "robots", "factory", "automation", "welding", "startup", "funding", "round", "investors", "bank", "rates",
    "inflation", "markets", "election", "results", "storm", "coast", "quarterly", "revenue", "earnings", "shares",
    "acquires", "launches", "smartphone", "battery", "satellite", "vaccine", "trial", "energy", "solar", "grid",
    "shipping", "port", "retail", "sales", "airline", "pilots", "union", "strike", "software", "cloud",
];

/// deterministic pseudo articles, no randomness so runs are comparable
fn synthetic_texts(count: usize, length: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            (0..length)
                .map(|j| WORDS[(i * 7 + j * j * 3 + j) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn synthetic_documents(texts: &[String]) -> Vec<ParsedDocument> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let title: String = text.split(' ').take(8).collect::<Vec<_>>().join(" ");
            ParsedDocument::new(format!("doc{i}"), title).with_paragraph(text.clone())
        })
        .collect()
}

fn build_universe(texts: &[String], tokenizer: &Tokenizer) -> FrequencyVector {
    let builder = FrequencyVectorBuilder::new();
    texts.par_iter().for_each(|text| builder.add_text(text, tokenizer));
    builder.build()
}

fn vectorizer_benchmark(c: &mut Criterion) {
    let tokenizer = Tokenizer::with_default_stopwords();
    let texts = synthetic_texts(2_000, 300);

    c.bench_function("build_universe", |b| {
        b.iter(|| build_universe(black_box(&texts), &tokenizer));
    });

    let universe = Arc::new(UniverseVector::new(build_universe(&texts, &tokenizer)));
    let tokenizer = Arc::new(tokenizer);
    let documents = synthetic_documents(&texts[..200]);

    c.bench_function("document_vector_cold", |b| {
        b.iter_batched(
            || {
                // capacity 0 disables the memo
                Vectorizer::new(
                    tokenizer.clone(),
                    LazyUniverse::preloaded(universe.clone()),
                    DocumentCache::new(0, Duration::ZERO),
                )
            },
            |vectorizer| {
                for doc in &documents {
                    black_box(vectorizer.document_vector(doc).ok());
                }
            },
            BatchSize::LargeInput,
        );
    });

    let vectorizer = Vectorizer::new(
        tokenizer,
        LazyUniverse::preloaded(universe),
        DocumentCache::new(1_000, Duration::from_secs(60)),
    );
    c.bench_function("document_vector_warm", |b| {
        b.iter(|| {
            for doc in &documents {
                black_box(vectorizer.document_vector(doc).ok());
            }
        });
    });
}

fn classify_benchmark(c: &mut Criterion) {
    let tokenizer = Tokenizer::with_default_stopwords();
    let texts = synthetic_texts(2_000, 300);
    let universe = UniverseVector::new(build_universe(&texts, &tokenizer));
    let vectorizer = Vectorizer::with_universe(Arc::new(tokenizer.clone()), universe);

    let mut features: Vec<Feature> = (0..150u32)
        .map(|i| {
            let seed = FrequencyVector::from_texts(&texts[i as usize * 5..i as usize * 5 + 5], &tokenizer);
            let mut distribution = DistributionBuilder::new();
            distribution.extend((0..500).map(|k| f64::from(k) / 1000.0));
            VectorFeature::new(
                FeatureId(10_001 + i),
                Category::Industry,
                format!("industry {i}"),
                seed,
                distribution.build(),
            )
            .map(Feature::from)
        })
        .collect::<Result<_, _>>()
        .unwrap_or_default();
    for (id, rules) in [(30_000, rules::acquisitions()), (30_001, rules::launches()), (30_003, rules::big_money())] {
        if let Ok(feature) = HeuristicFeature::new(FeatureId(id), Category::ManualHeuristic, "heuristic", &rules) {
            features.push(feature.into());
        }
    }
    let registry = FeatureRegistry::from_features(features);
    let documents = synthetic_documents(&texts[1_000..1_050]);
    let top = EngineConfig::default().classification.top_per_category;

    c.bench_function("classify_153_features", |b| {
        b.iter(|| {
            for doc in &documents {
                black_box(registry.classify(doc, &vectorizer, top).ok());
            }
        });
    });

    let detector = DuplicateDetector::new(&vectorizer, EngineConfig::default().duplicates);
    c.bench_function("filter_out_duplicates", |b| {
        b.iter_batched(
            || documents.clone(),
            |docs| black_box(detector.filter_out_duplicates(docs).ok()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, vectorizer_benchmark, classify_benchmark);
criterion_main!(benches);
