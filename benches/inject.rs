use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, Criterion};
use wireup::{provide, Bind, Context, Provide};

trait Reader: Send + Sync {
    fn read(&self) -> u32;
}

struct FileHandle;

impl Reader for FileHandle {
    fn read(&self) -> u32 {
        1
    }
}

// Filler types so the capability scan has entries to skip.
struct A;
struct B;
struct C;
struct D;

struct Server {
    file: Option<Arc<FileHandle>>,
    reader: Option<Arc<dyn Reader>>,
}

impl Bind for Server {
    type Deps = (Option<Arc<FileHandle>>, Option<Arc<dyn Reader>>);

    fn bind(&mut self, (file, reader): Self::Deps) {
        self.file = file;
        self.reader = reader;
    }
}

fn context() -> Context {
    let ctx = Context::new();
    ctx.add((
        provide!(FileHandle => dyn Reader),
        Provide::new(A),
        Provide::new(B),
        Provide::new(C),
        Provide::new(D),
    ));
    ctx
}

fn inject_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Inject");

    group.bench_function("exact_match", |b| {
        let ctx = context();
        b.iter(|| {
            ctx.inject(|file: Option<Arc<FileHandle>>| black_box(file))
                .unwrap();
        });
    });

    group.bench_function("capability_match", |b| {
        let ctx = context();
        b.iter(|| {
            ctx.inject(|reader: Option<Arc<dyn Reader>>| {
                black_box(reader.map(|reader| reader.read()))
            })
            .unwrap();
        });
    });

    group.bench_function("no_match", |b| {
        let ctx = Context::new();
        b.iter(|| {
            ctx.inject(|reader: Option<Arc<dyn Reader>>| black_box(reader))
                .unwrap();
        });
    });

    group.bench_function("bind", |b| {
        let ctx = context();
        let mut server = Server {
            file: None,
            reader: None,
        };
        b.iter(|| {
            ctx.inject(&mut server).unwrap();
        });
    });

    group.finish();
}

fn add_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Add");

    group.bench_function("overwrite", |b| {
        let ctx = context();
        b.iter(|| {
            ctx.add(provide!(FileHandle => dyn Reader));
        });
    });

    group.finish();
}

criterion_group!(benches, inject_benchmarks, add_benchmarks);
criterion_main!(benches);
