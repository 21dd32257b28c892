//! Benchmarks for the fixed-point FFT.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use jjil::fft::{fft_2d, Fft};
use jjil::image::Complex32Image;
use jjil::math::Complex;

fn signal(len: usize) -> Vec<Complex> {
    (0..len)
        .map(|i| Complex::real(((i * 37) % 255) as i32 - 128) << 5)
        .collect()
}

fn benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft_1d");
    for len in [64usize, 256, 1024] {
        let fft = Fft::new(len).expect("valid length");
        let input = signal(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &input, |b, input| {
            b.iter(|| fft.forward(black_box(input)).expect("no overflow"))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("fft_2d");
    for side in [64usize, 256] {
        let fft = Fft::new(side).expect("valid length");
        let image = Complex32Image::from_fn(side, side, |x, y| {
            Complex::real((((x * 7 + y * 13) % 255) as i32 - 128) << 5)
        })
        .expect("non-empty image");
        group.bench_with_input(BenchmarkId::from_parameter(side), &image, |b, image| {
            b.iter(|| fft_2d(&fft, black_box(image)).expect("no overflow"))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
