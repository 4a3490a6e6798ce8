use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rawbson::{
    binary::{Float32, VectorView},
    builder::Builder,
    raw::{RawDocument, RawDocumentBuf},
};

fn construct_deep_doc(depth: usize) -> RawDocumentBuf {
    let mut builder = Builder::new_document();
    for _ in 0..depth {
        builder.key("value").unwrap();
        builder.open_document().unwrap();
    }
    builder.key("value").unwrap();
    builder.append(23_i64).unwrap();
    for _ in 0..depth {
        builder.close_document().unwrap();
    }
    builder.extract_document().unwrap()
}

fn construct_broad_doc(size: usize) -> RawDocumentBuf {
    let mut builder = Builder::new_document();
    for i in 0..size {
        builder.key(format!("key {}", i)).unwrap();
        builder.append("lorem ipsum").unwrap();
    }
    builder.extract_document().unwrap()
}

fn access_deep(c: &mut Criterion) {
    let mut group = c.benchmark_group("access-deep");
    for depth in [10, 100, 1000] {
        let doc = construct_deep_doc(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &doc, |b, doc| {
            b.iter(|| {
                let mut doc: &RawDocument = doc;
                while let Ok(next) = doc.get_document("value") {
                    doc = next;
                }
                doc.get_i64("value").unwrap();
            })
        });
    }
    group.finish();
}

fn access_broad(c: &mut Criterion) {
    const SIZE: usize = 1000;
    let mut group = c.benchmark_group("access-broad");
    let doc = construct_broad_doc(SIZE);
    for count in [1, 10, 50] {
        let keys: Vec<_> = ((SIZE - count)..SIZE).map(|i| format!("key {}", i)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &keys, |b, keys| {
            b.iter(|| {
                for key in keys {
                    doc.get_str(key).unwrap();
                }
            })
        });
    }
    group.finish();
}

fn iterate_broad(c: &mut Criterion) {
    const SIZE: usize = 1000;
    let doc = construct_broad_doc(SIZE);
    c.bench_function("iterate-broad", |b| {
        b.iter(|| assert_eq!(black_box(&doc).iter().count(), SIZE))
    });
}

fn validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    let broad = construct_broad_doc(1000);
    let deep = construct_deep_doc(100);
    group.bench_function("broad", |b| b.iter(|| black_box(&broad).validate().unwrap()));
    group.bench_function("deep", |b| b.iter(|| black_box(&deep).validate().unwrap()));
    group.finish();
}

fn build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.bench_function("broad", |b| b.iter(|| construct_broad_doc(1000)));
    group.bench_function("deep", |b| b.iter(|| construct_deep_doc(100)));
    group.finish();
}

fn vector(c: &mut Criterion) {
    const LEN: usize = 4096;
    let mut group = c.benchmark_group("vector-float32");
    group.bench_function("write", |b| {
        b.iter(|| {
            let mut builder = Builder::new_document();
            builder.key("v").unwrap();
            let mut vector = builder.append_vector::<Float32>(LEN).unwrap();
            for i in 0..LEN {
                vector.set(i, i as f32).unwrap();
            }
            builder.extract_document().unwrap()
        })
    });

    let mut builder = Builder::new_document();
    builder.key("v").unwrap();
    builder.append_vector::<Float32>(LEN).unwrap();
    let doc = builder.extract_document().unwrap();
    group.bench_function("read", |b| {
        b.iter(|| {
            let view = VectorView::<Float32>::new(doc.get_binary("v").unwrap()).unwrap();
            view.iter().sum::<f32>()
        })
    });
    group.finish();
}

criterion_group!(benches, access_deep, access_broad, iterate_broad, validate, build, vector);
criterion_main!(benches);
