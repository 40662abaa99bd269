use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_injector::naming::apply_pattern;
use ferrous_injector::*;
use std::sync::Arc;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct ClockImpl;

impl Clock for ClockImpl {
    fn now(&self) -> u64 {
        42
    }
}

impl Component for ClockImpl {
    fn component_type() -> ComponentType<Self> {
        ComponentType::new()
            .singleton()
            .constructor(Constructor::new(|| ClockImpl))
            .implements::<dyn Clock>(|c| c as Arc<dyn Clock>)
    }
}

struct Report {
    clock: Arc<dyn Clock>,
    rows: Vec<u64>,
}

impl Component for Report {
    fn component_type() -> ComponentType<Self> {
        ComponentType::new().constructor(
            Constructor::with_args(|args| {
                Ok(Report {
                    clock: args.next::<dyn Clock>()?,
                    rows: Vec::with_capacity(16),
                })
            })
            .param::<dyn Clock>(),
        )
    }
}

fn container() -> Container {
    let mut builder = ContainerBuilder::new();
    builder.component::<ClockImpl>().component::<Report>();
    builder.build()
}

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let container = container();

    // Prime the singleton
    let _ = container.get_instance::<dyn Clock>().unwrap();

    c.bench_function("singleton_hit_by_convention", |b| {
        b.iter(|| {
            let v = container.get_instance::<dyn Clock>().unwrap();
            black_box(v.now());
        })
    });
}

fn bench_transient_with_dependency(c: &mut Criterion) {
    let container = container();
    let _ = container.get_instance::<Report>().unwrap();

    c.bench_function("transient_with_dependency", |b| {
        b.iter(|| {
            let v = container.get_instance::<Report>().unwrap();
            black_box((v.clock.now(), v.rows.capacity()));
        })
    });
}

fn bench_cold_definition(c: &mut Criterion) {
    c.bench_function("cold_convention_lookup", |b| {
        b.iter_batched(
            container,
            |container| {
                let v = container.get_instance::<dyn Clock>().unwrap();
                black_box(v.now());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_apply_pattern(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_pattern");
    let name = QualifiedName::parse("com.example.billing.api.Invoicer");

    for pattern in ["${package}.${class}Impl", "${package-2}.impl.${class}Impl"] {
        group.bench_with_input(BenchmarkId::from_parameter(pattern), pattern, |b, p| {
            b.iter(|| black_box(apply_pattern(&name, p)))
        });
    }

    group.finish();
}

struct Nop;

impl Interceptor for Nop {}

fn bench_intercepted_call(c: &mut Criterion) {
    interception_proxy! {
        struct ClockProxy for dyn Clock {
            fn now(&self) -> u64;
        }
    }

    let mut group = c.benchmark_group("intercepted_call");

    for &interceptors in &[0usize, 1, 4] {
        let mut builder = ContainerBuilder::new();
        builder.component::<ClockImpl>().proxy::<ClockProxy>();
        for _ in 0..interceptors {
            builder.define_interceptor_provider(FnInterceptorProvider::new(|_, _| {
                Some(Box::new(Nop) as Box<dyn Interceptor>)
            }));
        }
        let clock = builder.build().get_required::<dyn Clock>();

        group.bench_with_input(BenchmarkId::new("interceptors", interceptors), &interceptors, |b, _| {
            b.iter(|| black_box(clock.now()))
        });
    }

    group.finish();
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");
    let container = container();

    // Prime the singleton
    let _ = container.get_instance::<dyn Clock>().unwrap();

    for &thread_count in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("singleton_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let container = &container;
                            s.spawn(move |_| {
                                for _ in 0..iters / threads as u64 {
                                    let v = container.get_instance::<dyn Clock>().unwrap();
                                    black_box(v);
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_transient_with_dependency,
    bench_cold_definition,
    bench_apply_pattern,
    bench_intercepted_call
);

criterion_group!(macro_benches, bench_contention);

criterion_main!(micro_benches, macro_benches);
