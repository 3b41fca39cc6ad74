use bounded_collections::BoundedHeap;
use criterion::{
    criterion_group,
    criterion_main,
    Criterion,
};

criterion_group!(bench_solve, bench_bounded_heap_push_or_update, bench_bounded_heap_pop);
criterion_main!(bench_solve);

fn bench_bounded_heap_push_or_update(c: &mut Criterion) {
    let len = 100_000;
    c.bench_function("BoundedHeap::push_or_update (bump all keys)", |bencher| {
        bencher.iter(|| {
            let mut heap = BoundedHeap::<usize, u64>::default();
            heap.resize_capacity(len);
            for key in 0..len {
                heap.push_or_update(key, |weight| weight + 1).unwrap();
            }
        })
    });
}

fn bench_bounded_heap_pop(c: &mut Criterion) {
    let len = 100_000;
    c.bench_function("BoundedHeap::pop (drain)", |bencher| {
        bencher.iter_batched(
            || {
                let mut heap = BoundedHeap::<usize, u64>::default();
                heap.resize_capacity(len);
                for key in 0..len {
                    heap.push_or_update(key, |_| key as u64).unwrap();
                }
                heap
            },
            |mut heap| {
                while heap.pop().is_some() {}
            },
            criterion::BatchSize::LargeInput,
        )
    });
}
