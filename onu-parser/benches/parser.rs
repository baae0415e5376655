use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use onu_parser::{lexer::scan, parser::parse};

fn program(source: &str) {
    let (tokens, errors) = scan(source);
    assert!(errors.is_empty());
    let _ast = parse(tokens).unwrap();
}

fn long_expr(c: &mut Criterion) {
    let mut group = c.benchmark_group("long-expr");

    let mut source = "1".to_string();
    for _i in 0..1000 {
        source.push_str(" + 1");
    }
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("long-expr", |b| b.iter(|| program(&source)));
}

fn stress_precedence(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress-precedence");

    let mut source = "1".to_string();
    for _i in 0..200 {
        source.push_str(" == 2 < 3 + 5 * 5");
    }
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("stress-precedence", |b| b.iter(|| program(&source)));
}

fn many_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("many-functions");

    let mut source = String::new();
    for i in 0..200 {
        source.push_str(&format!(
            "var f{i} = fun(a, b) {{\n  if (a < b) {{ return a }} else {{ return b }}\n}}\nf{i}(1, 2)\n",
            i = i
        ));
    }
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("lex", |b| b.iter(|| scan(&source)));
    group.bench_function("lex-and-parse", |b| b.iter(|| program(&source)));
}

criterion_group!(benches, long_expr, stress_precedence, many_functions);
criterion_main!(benches);
