//! Throughput benchmarks for the denoising pipeline.

use criterion::{criterion_group, criterion_main, Criterion};
use mosquito_nr::{DenoiseConfig, MosquitoDenoiser};

fn test_plane(width: usize, height: usize) -> Vec<u8> {
    let mut v = 0x2545_f491u32;
    (0..width * height)
        .map(|_| {
            v = v.wrapping_mul(1664525).wrapping_add(1013904223);
            (v >> 24) as u8
        })
        .collect()
}

fn bench_denoise(c: &mut Criterion) {
    let (width, height) = (640usize, 360usize);
    let src = test_plane(width, height);
    let mut dst = vec![0u8; width * height];

    let mut group = c.benchmark_group("denoise_640x360");

    for (name, config) in [
        ("radius1_full_restore", DenoiseConfig::default().with_radius(1)),
        ("radius2_full_restore", DenoiseConfig::default().with_radius(2)),
        (
            "radius2_partial_restore",
            DenoiseConfig::default().with_radius(2).with_restore(64),
        ),
        (
            "radius2_smoothing_only",
            DenoiseConfig::default().with_radius(2).with_restore(0),
        ),
    ] {
        let mut filter =
            MosquitoDenoiser::new(width as u32, height as u32, config.with_threads(1)).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| filter.process_plane(&src, width, &mut dst, width).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_denoise);
criterion_main!(benches);
