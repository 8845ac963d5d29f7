use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use doptrak_core::{interpolate_peak, SpectrumFrame, SpeedConfig, TrackerConfig, VehicleTracker};

/// Four triangular peaks spread across the frame.
fn busy_frame(n: usize) -> SpectrumFrame {
    let mut bins = vec![0.0; n];
    let peaks = [
        (n / 8, 180.0),
        (n / 4, 240.0),
        (n / 2, 300.0),
        (5 * n / 8, 210.0),
    ];
    for &(center, magnitude) in &peaks {
        bins[center - 1] = magnitude * 0.6;
        bins[center] = magnitude;
        bins[center + 1] = magnitude * 0.55;
    }
    SpectrumFrame::from_magnitudes(bins).unwrap()
}

fn bench_process_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_frame");

    for &n in &[128usize, 512] {
        let frame = busy_frame(n);
        let mut tracker = VehicleTracker::new(TrackerConfig {
            fft_size: n,
            ..TrackerConfig::default()
        })
        .unwrap();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("cycle", n), &n, |b, _| {
            b.iter(|| tracker.process_frame(black_box(&frame)).unwrap())
        });
    }

    group.finish();
}

fn bench_interpolate_peak(c: &mut Criterion) {
    let frame = busy_frame(128);
    let config = SpeedConfig::default();

    c.bench_function("interpolate_peak", |b| {
        b.iter(|| interpolate_peak(black_box(&frame), black_box(64), &config))
    });
}

criterion_group!(benches, bench_process_frame, bench_interpolate_peak);
criterion_main!(benches);
