//! End-to-end properties of `build_contour` on hand-written parts.

use approx::assert_relative_eq;
use lathe_contour::{
    build_contour, AxialPoint, AxisId, Contour, ContourError, ContourTolerance, Feature,
    FeatureKind, Polarity, RotationAxis,
};

const Z: RotationAxis = RotationAxis::Rotational(AxisId::Z);
const TOL: ContourTolerance = ContourTolerance::DEFAULT;

fn points(line: &lathe_contour::Polyline) -> Vec<(f64, f64)> {
    line.points().iter().map(|p| (p.axial, p.radius)).collect()
}

/// Flanged bushing: flange, chamfered body, counterbore over a through bore,
/// two bolt holes through the flange and a cross hole in the body.
fn bushing() -> Vec<Feature> {
    vec![
        Feature::annulus(Polarity::Outer, 0.0, 4.0, 20.0).with_label("#10"),
        Feature::cylinder(Polarity::Outer, 0.0, 6.0, 20.0).with_label("#11"),
        Feature::annulus(Polarity::Outer, 6.0, 12.0, 20.0).with_label("#12"),
        Feature::cylinder(Polarity::Outer, 6.0, 28.0, 12.0).with_label("#13"),
        Feature::cone(Polarity::Outer, (28.0, 12.0), (30.0, 10.0))
            .with_declared_radius(0.785)
            .with_label("#14"),
        Feature::cylinder(Polarity::Inner, 0.0, 8.0, 7.0).with_label("#20"),
        Feature::cylinder(Polarity::Inner, 0.0, 30.0, 4.0).with_label("#21"),
        Feature::cylinder(Polarity::Inner, 0.0, 6.0, 2.5)
            .off_axis()
            .with_label("#30"),
        Feature::cylinder(Polarity::Inner, 0.0, 6.0, 2.5)
            .off_axis()
            .with_label("#31"),
        Feature::new(
            FeatureKind::Cylindrical,
            Polarity::Inner,
            vec![AxialPoint::new(17.3, 4.1), AxialPoint::new(19.7, 12.9)],
        )
        .off_axis()
        .with_label("#32"),
    ]
}

fn assert_well_formed(contour: &Contour) {
    let lines = std::iter::once(&contour.outer).chain(&contour.inner);
    for line in lines {
        assert!(line.is_axially_ordered(&TOL), "not ordered: {:?}", points(line));
        assert!(line.max_points_at_same_position(&TOL) <= 2, "zig-zag: {:?}", points(line));
    }
    let (lo, hi) = contour.outer.axial_span().unwrap();
    for line in &contour.inner {
        let (a, b) = line.axial_span().unwrap();
        assert!(a >= lo - TOL.linear && b <= hi + TOL.linear);
    }
}

#[test]
fn bushing_contour() {
    let contour = build_contour(&bushing(), Z).unwrap();
    assert_well_formed(&contour);

    assert_eq!(
        points(&contour.outer),
        vec![
            (0.0, 4.0),
            (0.0, 20.0),
            (6.0, 20.0),
            (6.0, 12.0),
            (28.0, 12.0),
            (30.0, 10.0),
        ]
    );
    assert_eq!(contour.inner.len(), 1);
    assert_eq!(
        points(&contour.inner[0]),
        vec![(0.0, 7.0), (8.0, 7.0), (8.0, 4.0), (30.0, 4.0)]
    );
    assert_eq!(contour.hole_count, 3);
    assert_eq!(contour.summary.holes_reported, 3);
    assert_eq!(contour.summary.excluded_off_axis, 3);
}

#[test]
fn idempotent() {
    let features = bushing();
    let first = build_contour(&features, Z).unwrap();
    let second = build_contour(&features, Z).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn off_axis_points_never_appear() {
    let features = bushing();
    let contour = build_contour(&features, Z).unwrap();
    let off_axis: Vec<AxialPoint> = features
        .iter()
        .filter(|f| !f.axis_alignment)
        .flat_map(|f| f.boundary_points.iter().copied())
        .collect();
    let all = std::iter::once(&contour.outer)
        .chain(&contour.inner)
        .flat_map(|l| l.points().iter().copied());
    for p in all {
        assert!(!off_axis.contains(&p), "off-axis point {p:?} leaked into the contour");
    }
}

#[test]
fn cone_with_half_angle_radius_keeps_its_role() {
    let features = vec![
        Feature::cylinder(Polarity::Outer, 0.0, 10.0, 10.0),
        Feature::cone(Polarity::Outer, (10.0, 10.0), (15.0, 6.0))
            .with_declared_radius(1.23)
            .with_semi_angle(1.23),
        Feature::cylinder(Polarity::Inner, 0.0, 15.0, 3.0),
    ];
    let contour = build_contour(&features, Z).unwrap();
    assert_eq!(contour.summary.outer_traced, 2);
    assert_eq!(contour.summary.reclassified, 0);
    let last = contour.outer.points().last().unwrap();
    assert_relative_eq!(last.axial, 15.0);
    assert_relative_eq!(last.radius, 6.0);
}

#[test]
fn concentric_bores_give_flat_envelope() {
    let features = vec![
        Feature::cylinder(Polarity::Outer, 0.0, 12.0, 10.0),
        Feature::cylinder(Polarity::Inner, 0.0, 12.0, 8.5),
        Feature::cylinder(Polarity::Inner, 0.0, 12.0, 4.1),
        Feature::cylinder(Polarity::Inner, 0.0, 12.0, 6.0),
    ];
    let contour = build_contour(&features, Z).unwrap();
    assert_eq!(contour.inner.len(), 1);
    assert_eq!(points(&contour.inner[0]), vec![(0.0, 8.5), (12.0, 8.5)]);
}

#[test]
fn shoulder_step_preserved() {
    let features = vec![
        Feature::cylinder(Polarity::Outer, 11.0, 24.0, 4.5),
        Feature::cylinder(Polarity::Outer, 0.0, 11.0, 8.0),
    ];
    let contour = build_contour(&features, Z).unwrap();
    assert_eq!(
        points(&contour.outer),
        vec![(0.0, 8.0), (11.0, 8.0), (11.0, 4.5), (24.0, 4.5)]
    );
}

#[test]
fn prismatic_part_has_no_contour() {
    let block = vec![
        Feature::new(
            FeatureKind::Planar,
            Polarity::Outer,
            vec![AxialPoint::new(0.0, 0.0), AxialPoint::new(40.0, 0.0)],
        )
        .off_axis(),
        Feature::cylinder(Polarity::Inner, 0.0, 10.0, 3.0).off_axis(),
    ];
    let err = build_contour(&block, RotationAxis::Prismatic).unwrap_err();
    assert!(err.is_expected());
    assert!(matches!(err, ContourError::EmptyOuterContour { hole_count: 2, .. }));
}

#[test]
fn bore_longer_than_part_is_clipped() {
    let features = vec![
        Feature::cylinder(Polarity::Outer, 0.0, 10.0, 6.0),
        Feature::cylinder(Polarity::Inner, -1.0, 11.0, 2.0),
    ];
    let contour = build_contour(&features, Z).unwrap();
    assert_eq!(points(&contour.inner[0]), vec![(0.0, 2.0), (10.0, 2.0)]);
    assert_eq!(contour.summary.clipped_inner, 1);
}

#[test]
fn degenerate_features_are_counted() {
    let mut features = bushing();
    features.push(Feature::new(FeatureKind::Other, Polarity::Outer, vec![]));
    features.push(Feature::new(
        FeatureKind::Other,
        Polarity::Outer,
        vec![AxialPoint::new(3.0, 1.0)],
    ));
    let contour = build_contour(&features, Z).unwrap();
    assert_eq!(contour.summary.degenerate_dropped, 2);
    assert_eq!(contour.outer, build_contour(&bushing(), Z).unwrap().outer);
}

#[test]
fn degenerate_off_axis_features_are_not_holes() {
    let holes = build_contour(&bushing(), Z).unwrap().hole_count;
    let mut features = bushing();
    features.push(
        Feature::new(FeatureKind::Cylindrical, Polarity::Inner, vec![AxialPoint::new(5.0, 3.0)])
            .off_axis(),
    );
    let contour = build_contour(&features, Z).unwrap();
    assert_eq!(contour.hole_count, holes);
    assert_eq!(contour.summary.excluded_off_axis, holes);
    assert_eq!(contour.summary.degenerate_dropped, 1);
}
