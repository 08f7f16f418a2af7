//! Lexer throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cal_lex::{CleanExitOptions, Lexer};

fn sample_object(procedures: usize) -> String {
    let mut source = String::from("OBJECT Codeunit 50000 Benchmark\n{\n  CODE\n  {\n");
    source.push_str("    VAR\n      Total@1 : Decimal;\n      Counter@2 : Integer;\n");
    for i in 0..procedures {
        source.push_str(&format!(
            "    PROCEDURE Step{i}@{i}(Amount@1000 : Decimal) : Decimal;\n    BEGIN\n      IF Amount > 0 THEN\n        Total := Total + Amount * 2\n      ELSE\n        Total := Total - 1;\n      EXIT(Total);\n    END;\n\n"
        ));
    }
    source.push_str("  }\n}\n");
    source
}

fn bench_tokenize(c: &mut Criterion) {
    let small = sample_object(5);
    let large = sample_object(200);

    c.bench_function("tokenize_small_codeunit", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(&small));
            black_box(lexer.tokenize())
        })
    });

    c.bench_function("tokenize_large_codeunit", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(&large));
            black_box(lexer.tokenize())
        })
    });

    c.bench_function("tokenize_with_clean_exit", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(&large));
            let tokens = lexer.tokenize();
            let verdict = lexer.is_clean_exit(CleanExitOptions::default());
            black_box((tokens, verdict.passed))
        })
    });
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
