//! Parser throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cal_lex::Lexer;
use cal_par::Parser;

fn sample_codeunit(procedures: usize) -> String {
    let mut source = String::from("OBJECT Codeunit 50001 ParserBench\n{\n  CODE\n  {\n");
    source.push_str("    VAR\n      Total@1 : Decimal;\n");
    for i in 0..procedures {
        source.push_str(&format!(
            "    PROCEDURE Crunch{i}@{i}(Amount@1000 : Decimal) : Decimal;\n    BEGIN\n      CASE Amount OF\n        0: Total := 0;\n        1..10: Total := Total + Amount;\n        ELSE Total := Total + Amount * 2;\n      END;\n      EXIT(Total);\n    END;\n\n"
        ));
    }
    source.push_str("  }\n}\n");
    source
}

fn bench_parse(c: &mut Criterion) {
    let small = sample_codeunit(5);
    let large = sample_codeunit(200);
    let small_tokens = Lexer::new(&small).tokenize();
    let large_tokens = Lexer::new(&large).tokenize();

    c.bench_function("parse_small_codeunit", |b| {
        b.iter(|| {
            let mut parser = Parser::new(black_box(small_tokens.clone()));
            black_box(parser.parse())
        })
    });

    c.bench_function("parse_large_codeunit", |b| {
        b.iter(|| {
            let mut parser = Parser::new(black_box(large_tokens.clone()));
            black_box(parser.parse())
        })
    });

    c.bench_function("lex_and_parse_large", |b| {
        b.iter(|| {
            let tokens = Lexer::new(black_box(&large)).tokenize();
            let mut parser = Parser::new(tokens);
            black_box(parser.parse())
        })
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
