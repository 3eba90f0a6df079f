use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lathe_contour::{build_contour, AxisId, Feature, Polarity, RotationAxis};

/// A long stepped shaft: one outer section and one bore section per step,
/// plus a cross hole every tenth step.
fn synthetic_shaft(sections: usize) -> Vec<Feature> {
    let mut features = Vec::with_capacity(sections * 2 + sections / 10);
    for i in 0..sections {
        let x0 = i as f64 * 5.0;
        let x1 = x0 + 5.0;
        let r = 8.0 + (i % 7) as f64;
        features.push(Feature::cylinder(Polarity::Outer, x0, x1, r));
        features.push(Feature::cylinder(Polarity::Inner, x0, x1, 2.0 + (i % 3) as f64));
        if i % 10 == 0 {
            features.push(Feature::cylinder(Polarity::Inner, x0 + 1.0, x0 + 3.0, 1.0).off_axis());
        }
    }
    // extractors report faces in no particular order
    features.reverse();
    features
}

fn bench_build_contour(c: &mut Criterion) {
    let features = synthetic_shaft(100);
    let axis = RotationAxis::Rotational(AxisId::Z);

    c.bench_function("lathe_contour_build_200_features", |b| {
        b.iter(|| {
            let contour = build_contour(black_box(&features), axis).unwrap();
            black_box((contour.outer.len(), contour.inner.len()));
        });
    });
}

criterion_group!(benches, bench_build_contour);
criterion_main!(benches);
