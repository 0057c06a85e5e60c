use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stridestats::fields::gain_threshold;
use stridestats::metrics::normalized_power;
use stridestats::{report_many, Activity, AnalysisConfig, Record, Source};

/// Performance benchmarks for activity analysis
///
/// Activity lengths cover a short run up to an ultra recorded at 1 Hz.

const DURATIONS: [usize; 4] = [600, 3600, 4 * 3600, 24 * 3600];

fn bench_normalized_power(c: &mut Criterion) {
    let mut group = c.benchmark_group("Normalized Power");

    for &seconds in &DURATIONS {
        let series: Vec<(f64, f64)> = (0..seconds)
            .map(|i| (i as f64, 200.0 + 80.0 * ((i as f64) / 45.0).sin()))
            .collect();

        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(
            BenchmarkId::new("normalized_power", seconds),
            &series,
            |b, series| {
                b.iter(|| normalized_power(black_box(series), 30.0));
            },
        );
    }

    group.finish();
}

fn bench_moving_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("Moving Time");

    for &seconds in &DURATIONS {
        let activity = create_benchmark_activity(seconds);

        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(
            BenchmarkId::new("timer_records", seconds),
            &activity,
            |b, activity| {
                b.iter(|| activity.time().timer(black_box(Source::Records)));
            },
        );
    }

    group.finish();
}

fn bench_elevation_gain(c: &mut Criterion) {
    let mut group = c.benchmark_group("Elevation Gain");

    for &seconds in &DURATIONS {
        let elevation: Vec<f64> = (0..seconds)
            .map(|i| 1600.0 + 50.0 * ((i as f64) / 600.0).sin() + (i % 7) as f64 * 0.3)
            .collect();

        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(
            BenchmarkId::new("gain_threshold", seconds),
            &elevation,
            |b, elevation| {
                b.iter(|| gain_threshold(black_box(elevation), 5.0));
            },
        );
    }

    group.finish();
}

fn bench_batch_reports(c: &mut Criterion) {
    let mut group = c.benchmark_group("Activity Reports");
    let config = AnalysisConfig::default();

    for &count in &[1, 10, 50] {
        let activities: Vec<Activity> = (0..count)
            .map(|_| create_benchmark_activity(3600))
            .collect();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("report_many", count),
            &activities,
            |b, activities| {
                b.iter(|| report_many(black_box(activities), &config));
            },
        );
    }

    group.finish();
}

/// 1 Hz run with rolling terrain and a stop every 20 minutes
fn create_benchmark_activity(seconds: usize) -> Activity {
    let records = (0..=seconds)
        .map(|i| {
            let stopped = i % 1200 >= 1170;
            Record {
                lat: Some(40.0 + i as f64 * 1e-5),
                lon: Some(-105.2 + ((i as f64) / 300.0).sin() * 1e-3),
                speed: Some(if stopped { 0.0 } else { 3.2 }),
                elevation: Some(1600.0 + 50.0 * ((i as f64) / 600.0).sin()),
                heartrate: Some(145.0 + 10.0 * ((i as f64) / 900.0).sin()),
                power: Some(if stopped { 0.0 } else { 240.0 }),
                ..Record::at(i as f64)
            }
        })
        .collect();

    Activity::from_records(records).unwrap_or_default()
}

criterion_group!(
    benches,
    bench_normalized_power,
    bench_moving_time,
    bench_elevation_gain,
    bench_batch_reports
);

criterion_main!(benches);
