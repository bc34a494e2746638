use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use strided_nonzero::{count_nonzero, count_nonzero_view, ElementType, MatrixGenerator, StridedArray};

fn bench_count_contiguous(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_contiguous");
    let mut gen = MatrixGenerator::seeded(0);
    for size in [100usize, 500, 1000] {
        group.throughput(Throughput::Elements((size * size) as u64));
        for dtype in [ElementType::U8, ElementType::I32, ElementType::F64] {
            let m = match gen.with_exact_count(size, size, dtype, size * size / 2) {
                Ok(m) => m,
                Err(err) => panic!("generation failed: {err}"),
            };
            group.bench_with_input(BenchmarkId::new(dtype.name(), size), &m, |b, m| {
                b.iter(|| count_nonzero(black_box(m)));
            });
        }
    }
    group.finish();
}

fn bench_count_strided(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_strided");
    let mut rng = StdRng::seed_from_u64(0);
    for size in [100usize, 500, 1000] {
        let a = StridedArray::<f32>::from_fn_row_major(&[size, size], |_| {
            if rng.gen_bool(0.3) {
                rng.gen::<f32>()
            } else {
                0.0
            }
        });
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("row_major", size), &size, |b, _| {
            b.iter(|| count_nonzero_view(black_box(&a.view())));
        });

        let t = match a.view().transpose_2d() {
            Ok(t) => t,
            Err(err) => panic!("transpose failed: {err}"),
        };
        group.bench_with_input(BenchmarkId::new("transposed", size), &size, |b, _| {
            b.iter(|| count_nonzero_view(black_box(&t)));
        });

        let half = size / 2;
        let w = match a.view().window_2d(half / 2, half, half / 2, half) {
            Ok(w) => w,
            Err(err) => panic!("window failed: {err}"),
        };
        group.bench_with_input(BenchmarkId::new("window", size), &size, |b, _| {
            b.iter(|| count_nonzero_view(black_box(&w)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_count_contiguous, bench_count_strided);
criterion_main!(benches);
