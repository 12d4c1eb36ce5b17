//! Benchmarks for the Ghost evaluator.
//!
//! Each benchmark parses once and measures evaluation alone.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::rc::Rc;

use ghostc::eval::{Environment, Evaluator, Value};
use ghostc::intern::StringInterner;
use ghostc::syntax::{Lexer, Parser, Program};

fn parsed(source: &str, interner: &Rc<StringInterner>) -> Program {
    let tokens = Lexer::new(source, interner).lex_all();
    let result = Parser::new(&tokens, interner).parse_program();
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    result.program
}

fn bench_eval_arithmetic(c: &mut Criterion) {
    let interner = Rc::new(StringInterner::new());
    let program = parsed("1 + 2 * 3 - 4 / 2", &interner);
    let evaluator = Evaluator::new(Rc::clone(&interner));

    c.bench_function("eval_arithmetic", |b| {
        b.iter(|| {
            let env = Environment::new();
            black_box(evaluator.eval_program(&program, &env))
        })
    });
}

fn bench_eval_comparison(c: &mut Criterion) {
    let interner = Rc::new(StringInterner::new());
    let program = parsed("1 < 2 and 3 > 2 or false", &interner);
    let evaluator = Evaluator::new(Rc::clone(&interner));

    c.bench_function("eval_comparison", |b| {
        b.iter(|| {
            let env = Environment::new();
            black_box(evaluator.eval_program(&program, &env))
        })
    });
}

fn bench_eval_list_construction(c: &mut Criterion) {
    let interner = Rc::new(StringInterner::new());
    let program = parsed("[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]", &interner);
    let evaluator = Evaluator::new(Rc::clone(&interner));

    c.bench_function("eval_list_construction", |b| {
        b.iter(|| {
            let env = Environment::new();
            black_box(evaluator.eval_program(&program, &env))
        })
    });
}

fn bench_eval_while_loop(c: &mut Criterion) {
    let interner = Rc::new(StringInterner::new());
    let program = parsed("n := 0; while (n < 100) { n = n + 1 }; n", &interner);
    let evaluator = Evaluator::new(Rc::clone(&interner));

    c.bench_function("eval_while_loop", |b| {
        b.iter(|| {
            let env = Environment::new();
            black_box(evaluator.eval_program(&program, &env))
        })
    });
}

fn bench_eval_closure_call(c: &mut Criterion) {
    let interner = Rc::new(StringInterner::new());
    let program = parsed(
        "makeAdder := function(x) { function(y) { x + y } };
         add5 := makeAdder(5);
         add5(3)",
        &interner,
    );
    let evaluator = Evaluator::new(Rc::clone(&interner));

    c.bench_function("eval_closure_call", |b| {
        b.iter(|| {
            let env = Environment::new();
            black_box(evaluator.eval_program(&program, &env))
        })
    });
}

fn bench_environment_define_lookup(c: &mut Criterion) {
    let interner = StringInterner::new();
    let names: Vec<_> = (0..10)
        .map(|i| interner.intern(&format!("var_{}", i)))
        .collect();

    c.bench_function("environment_define_lookup", |b| {
        b.iter(|| {
            let env = Environment::new();
            for (i, name) in names.iter().enumerate() {
                env.borrow_mut()
                    .set(*name, Value::Number((i as i64).into()));
            }
            for name in &names {
                black_box(env.borrow().get(*name));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_eval_arithmetic,
    bench_eval_comparison,
    bench_eval_list_construction,
    bench_eval_while_loop,
    bench_eval_closure_call,
    bench_environment_define_lookup,
);

criterion_main!(benches);
