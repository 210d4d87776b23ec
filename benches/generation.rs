use apigen::generator::render;
use apigen::validation::compile_model;
use apigen::{parse_model, GeneratorConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// An annotated module with `routes` handlers, each with its own parameter struct.
fn annotated_source(routes: usize) -> String {
    let mut source = String::from("pub struct Api;\n\nimpl Api {\n");
    for i in 0..routes {
        source.push_str(&format!(
            "    /// apigen:api {{\"url\": \"/resource{i}\", \"auth\": {}, \"method\": \"POST\"}}\n    \
             pub fn op{i}(&self, ctx: &Context, params: Params{i}) -> Result<Out, ApiError> {{ unimplemented!() }}\n",
            i % 2 == 0
        ));
    }
    source.push_str("}\n");
    for i in 0..routes {
        source.push_str(&format!(
            "\n#[derive(Default)]\npub struct Params{i} {{\n    \
             #[apivalidator(\"required,min=3,max=64\")]\n    pub login: String,\n    \
             #[apivalidator(\"enum=a|b|c,default=a\")]\n    pub kind: String,\n    \
             #[apivalidator(\"min=1,max=100\")]\n    pub limit: i32,\n}}\n"
        ));
    }
    source
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_model");
    for routes in [1, 10, 100] {
        let source = annotated_source(routes);
        group.bench_with_input(BenchmarkId::from_parameter(routes), &source, |b, source| {
            b.iter(|| parse_model(black_box(source), "api"))
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let config = GeneratorConfig::default();
    let mut group = c.benchmark_group("render");
    for routes in [1, 10, 100] {
        let Ok(model) = parse_model(&annotated_source(routes), "api") else {
            continue;
        };
        let plan = compile_model(&model);
        group.bench_with_input(BenchmarkId::from_parameter(routes), &model, |b, model| {
            b.iter(|| render(black_box(model), black_box(&plan), &config))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_render);
criterion_main!(benches);
