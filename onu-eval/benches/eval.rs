use criterion::{criterion_group, criterion_main, Criterion};
use onu_eval::Evaluator;
use onu_parser::{ast::Program, lexer::scan, parser::parse};
use onu_value::Environment;

fn compile(source: &str) -> Program {
    let (tokens, errors) = scan(source);
    assert!(errors.is_empty());
    parse(tokens).unwrap()
}

fn fib(c: &mut Criterion) {
    let program = compile(
        "var fib = fun(n) {\n  if (n < 2) { return n }\n  fib(n - 1) + fib(n - 2)\n}\nfib(20)",
    );
    c.bench_function("fib-20", |b| {
        b.iter(|| Evaluator::new().eval_program(&program, &Environment::new()).unwrap())
    });
}

fn closures(c: &mut Criterion) {
    let program = compile(
        "var make = fun(x) { fun(y) { x + y } }\nvar loop = fun go(n, acc) { if (n) { go(n - 1, make(n)(acc)) } else { acc } }\nloop(200, 0)",
    );
    c.bench_function("closures", |b| {
        b.iter(|| Evaluator::new().eval_program(&program, &Environment::new()).unwrap())
    });
}

criterion_group!(benches, fib, closures);
criterion_main!(benches);
