//! Benchmark for room outline transforms.
//!
//! TARGET: a 64 point floor plus ceiling outline well under 10 microseconds
//!
//! Run with: cargo bench --package stage_shared --bench transform_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use stage_shared::{Quaternion, Transform3D, Vec3};

fn outline(points: usize) -> Vec<Vec3> {
    (0..points)
        .map(|i| {
            let a = i as f64 / points as f64 * std::f64::consts::TAU;
            Vec3::new(a.cos() * 4.0, a.sin() * 4.0, 0.0)
        })
        .collect()
}

fn benchmark_single_point(c: &mut Criterion) {
    let transform = Transform3D::from_rotation_translation(
        Quaternion::from_axis_angle(Vec3::Z, 0.7),
        Vec3::new(3.0, -1.0, 0.5),
    );

    c.bench_function("single_point_transform", |b| {
        let p = Vec3::new(1.0, 2.0, 3.0);
        b.iter(|| black_box(transform.transform_point(black_box(p))));
    });
}

fn benchmark_room_outline(c: &mut Criterion) {
    let transform = Transform3D::from_rotation_translation(
        Quaternion::from_axis_angle(Vec3::Z, 0.7),
        Vec3::new(3.0, -1.0, 0.5),
    );
    let floor = outline(64);
    let ceiling = outline(64);

    let mut group = c.benchmark_group("room_outline");
    group.throughput(Throughput::Elements(128));

    group.bench_function("64_point_floor_and_ceiling", |b| {
        b.iter(|| {
            black_box(transform.transform_points(black_box(&floor)));
            black_box(transform.transform_points(black_box(&ceiling)));
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_single_point, benchmark_room_outline);
criterion_main!(benches);
