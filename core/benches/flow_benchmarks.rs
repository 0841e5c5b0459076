use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use flow::{ContextData, FlowError, Pipeline, PipelineControl, Registry};
use tokio::runtime::Runtime;

#[derive(Clone, Debug, Default)]
struct BasketContext {
  lines: Vec<i64>,
  total_cents: i64,
}

fn build_pipeline(num_steps: usize) -> Pipeline<BasketContext, FlowError> {
  let names: Vec<String> = (0..num_steps).map(|i| format!("line_{}", i)).collect();
  let refs: Vec<&str> = names.iter().map(String::as_str).collect();
  let mut pipeline = Pipeline::<BasketContext, FlowError>::new(&refs);
  for (i, name) in names.iter().enumerate() {
    let price = (i as i64 + 1) * 100;
    pipeline.on(name, move |ctx: ContextData<BasketContext>| async move {
      let mut guard = ctx.write();
      guard.lines.push(price);
      guard.total_cents += price;
      Ok::<_, FlowError>(PipelineControl::Continue)
    });
  }
  pipeline
}

fn bench_direct_run(c: &mut Criterion) {
  let mut group = c.benchmark_group("PipelineRun");
  let rt = Runtime::new().unwrap();

  for num_steps in [1usize, 4, 16] {
    let pipeline = build_pipeline(num_steps);
    group.bench_with_input(BenchmarkId::from_parameter(num_steps), &num_steps, |b, _| {
      b.to_async(&rt).iter(|| async {
        let ctx = ContextData::new(BasketContext::default());
        pipeline.run(ctx).await.unwrap()
      });
    });
  }
  group.finish();
}

fn bench_registry_dispatch(c: &mut Criterion) {
  let rt = Runtime::new().unwrap();
  let registry = Registry::<FlowError>::new();
  registry.register_pipeline(build_pipeline(4));

  c.bench_function("RegistryDispatch/4_steps", |b| {
    b.to_async(&rt).iter(|| async {
      let ctx = ContextData::new(BasketContext::default());
      registry.run(ctx).await.unwrap()
    });
  });
}

criterion_group!(benches, bench_direct_run, bench_registry_dispatch);
criterion_main!(benches);
