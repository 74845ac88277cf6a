//! Performance benchmarks for harmonic analysis

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cadenza::{AnalysisConfig, AnalysisContext, Analyzer};

fn bench_analyze_progression(c: &mut Criterion) {
    let analyzer = Analyzer::new(AnalysisConfig::default());

    // A representative 8-chord phrase with a secondary dominant
    let context = AnalysisContext::from_romans(
        "C",
        &["I", "vi", "ii65", "V/V", "V7", "I64", "V", "I"],
    );

    c.bench_function("analyze_8_chords", |b| {
        b.iter(|| {
            let _ = analyzer.analyze(black_box(&context));
        });
    });
}

fn bench_pattern_library_load(c: &mut Criterion) {
    use cadenza::PatternLibrary;

    c.bench_function("builtin_library_load", |b| {
        b.iter(|| {
            let _ = black_box(PatternLibrary::builtin());
        });
    });
}

criterion_group!(benches, bench_analyze_progression, bench_pattern_library_load);
criterion_main!(benches);
