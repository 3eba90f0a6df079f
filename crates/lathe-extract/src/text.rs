//! Lower-fidelity extractor: scans the Part 21 text with regular expressions.
//!
//! No solid is resolved. Each `ADVANCED_FACE` contributes its surface, and
//! its extent along the axis comes from the `CIRCLE` records reachable
//! through its bounds. When those references are broken, every circle
//! lying on the surface is used instead and the face is warned about.
//! Files the B-rep reader rejects (broken references, unsupported schemas)
//! often still scan.

use std::collections::{BTreeMap, BTreeSet};

use lathe_contour::{AxialPoint, Feature, RotationAxis};
use lathe_math::{AxisFrame, Dir3, Point3, Vec3};
use lathe_step::{Circle, ConeSurface, CylinderSurface, PlaneSurface, StepSurface, TorusSurface};
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::axis::{axis_id, choose_axis, feature_kind, polarity, Projector};
use crate::{ExtractError, ExtractSettings, PartFeatures, SurfaceExtractor};

const NUM: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[Ee][-+]?\d+)?";

/// Regex scanner over Part 21 records.
#[derive(Debug, Clone, Default)]
pub struct TextPatternExtractor {
    settings: ExtractSettings,
}

impl TextPatternExtractor {
    /// Create an extractor with the given tolerances.
    pub fn new(settings: ExtractSettings) -> Self {
        Self { settings }
    }
}

impl SurfaceExtractor for TextPatternExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    #[instrument(skip_all, fields(extractor = "text", bytes = source.len()))]
    fn extract(&self, source: &[u8]) -> Result<PartFeatures, ExtractError> {
        let text = String::from_utf8_lossy(source);
        if !text.contains("ISO-10303-21") {
            return Err(ExtractError::Pattern("missing ISO-10303-21 header".into()));
        }
        let patterns = Patterns::compile()?;
        let scan = Scan::new(&patterns, &text);
        let tol = self.settings.tolerance();

        let faces: Vec<(u64, u64, bool)> = scan
            .of_type("ADVANCED_FACE")
            .filter_map(|(id, record)| {
                let caps = patterns.face.captures(&record.args)?;
                let surface_id = caps[1].parse().ok()?;
                Some((id, surface_id, &caps[2] == "T"))
            })
            .collect();
        if faces.is_empty() {
            return Err(ExtractError::NoSurfaces);
        }

        let surfaces: BTreeMap<u64, (StepSurface, Option<f64>)> = faces
            .iter()
            .filter_map(|&(_, surface_id, _)| Some((surface_id, scan.surface(surface_id)?)))
            .collect();
        let circles: BTreeMap<u64, Circle> = scan
            .of_type("CIRCLE")
            .filter_map(|(id, _)| Some((id, scan.circle(id)?)))
            .collect();

        let candidates = faces.iter().filter_map(|(_, surface_id, _)| {
            let (surface, _) = surfaces.get(surface_id)?;
            Some((surface.axis()?, surface.radius().unwrap_or(0.0)))
        });
        let Some(frame) = choose_axis(candidates, &tol) else {
            info!(faces = faces.len(), "no surface of revolution, part is prismatic");
            return Ok(PartFeatures {
                features: Vec::new(),
                axis: RotationAxis::Prismatic,
            });
        };
        let projector = Projector::new(frame, tol);

        let mut features = Vec::new();
        for &(face_id, surface_id, same_sense) in &faces {
            let Some((surface, declared)) = surfaces.get(&surface_id) else {
                debug!(face = face_id, surface = surface_id, "surface not scanned, skipping");
                continue;
            };
            let Some(kind) = feature_kind(surface) else {
                continue;
            };
            let aligned = projector.is_aligned(surface);
            let mut edges: Vec<&Circle> = scan
                .edge_curves(face_id)
                .iter()
                .filter_map(|id| circles.get(id))
                .collect();
            if edges.is_empty() {
                edges = circles
                    .values()
                    .filter(|c| lies_on(surface, c, &projector))
                    .collect();
                warn!(
                    face = face_id,
                    circles = edges.len(),
                    "face bounds not resolved, using every circle on its surface"
                );
            }
            let mut points: Vec<AxialPoint> = Vec::new();
            for circle in edges {
                if aligned {
                    points.push(projector.circle_point(circle));
                } else {
                    points.extend(projector.circle_footprint(circle));
                }
            }

            let mut feature = Feature::new(kind, polarity(same_sense), projector.finish(points))
                .with_label(format!("#{face_id}"));
            if !aligned {
                feature = feature.off_axis();
            }
            if let Some(value) = declared {
                feature = feature.with_declared_radius(*value);
            }
            if let StepSurface::Cone(cone) = surface {
                feature = feature.with_semi_angle(cone.semi_angle);
            }
            features.push(feature);
        }

        let id = axis_id(&frame, &tol);
        info!(records = scan.records.len(), features = features.len(), axis = ?id, "extracted");
        Ok(PartFeatures {
            features,
            axis: RotationAxis::Rotational(id),
        })
    }
}

/// Whether a circle bounds the surface: coaxial with the surface's own
/// axis, at a radius the surface passes through.
///
/// Cone half-angles are tried in radians and in degrees; exporters differ.
fn lies_on(surface: &StepSurface, circle: &Circle, rotation: &Projector) -> bool {
    let Some(axis) = surface.axis() else {
        return false;
    };
    let own = Projector::new(axis, rotation.tol);
    if !own.is_coaxial_circle(circle) {
        return false;
    }
    let linear = rotation.tol.linear;
    let t = axis.axial(&circle.center);
    match surface {
        StepSurface::Cylinder(c) => (circle.radius - c.radius).abs() <= linear,
        StepSurface::Cone(c) => {
            let in_degrees = c.radius + t * c.semi_angle.to_radians().tan();
            (circle.radius - c.radius_at(t)).abs() <= linear
                || (circle.radius - in_degrees).abs() <= linear
        }
        StepSurface::Torus(tor) => {
            t.abs() <= tor.minor_radius + linear
                && circle.radius >= tor.major_radius - tor.minor_radius - linear
                && circle.radius <= tor.major_radius + tor.minor_radius + linear
        }
        _ => false,
    }
}

struct Patterns {
    record: Regex,
    named: Regex,
    triple: Regex,
    refs: Regex,
    placed: Regex,
    face: Regex,
    trailing: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, ExtractError> {
        Ok(Self {
            record: compile(r"(?s)^#(\d+)\s*=\s*([A-Za-z0-9_]+)\s*\((.*)\)$")?,
            named: compile(r"(?s)^\s*'(?:[^']|'')*'\s*,\s*(.*)$")?,
            triple: compile(&format!(r"\(\s*({n})\s*,\s*({n})\s*,\s*({n})\s*\)", n = NUM))?,
            refs: compile(r"#(\d+)|\$")?,
            placed: compile(&format!(r"^#(\d+)\s*,\s*({n})(?:\s*,\s*({n}))?\s*$", n = NUM))?,
            face: compile(r"#(\d+)\s*,\s*\.([TF])\.\s*$")?,
            trailing: compile(&format!(r"({n})\s*$", n = NUM))?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern)
        .map_err(|e| ExtractError::Pattern(format!("invalid pattern `{pattern}`: {e}")))
}

struct Record {
    kind: String,
    args: String,
}

/// Split Part 21 text into `;`-terminated records, ignoring `;` inside
/// strings and dropping comments. Whitespace runs collapse to one space.
fn split_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            if c == '\'' {
                in_string = false;
            }
            current.push(c);
            continue;
        }
        match c {
            '\'' => {
                in_string = true;
                current.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' => {
                let record = current.trim();
                if !record.is_empty() {
                    records.push(record.to_string());
                }
                current.clear();
            }
            c if c.is_whitespace() => {
                if !current.is_empty() && !current.ends_with(' ') {
                    current.push(' ');
                }
            }
            c => current.push(c),
        }
    }
    records
}

struct Scan<'p> {
    patterns: &'p Patterns,
    records: BTreeMap<u64, Record>,
}

impl<'p> Scan<'p> {
    fn new(patterns: &'p Patterns, text: &str) -> Self {
        let mut records = BTreeMap::new();
        for raw in split_records(text) {
            let Some(caps) = patterns.record.captures(&raw) else {
                continue;
            };
            let Ok(id) = caps[1].parse::<u64>() else {
                continue;
            };
            records.insert(
                id,
                Record {
                    kind: caps[2].to_ascii_uppercase(),
                    args: caps[3].to_string(),
                },
            );
        }
        Self { patterns, records }
    }

    fn of_type<'s>(&'s self, kind: &'s str) -> impl Iterator<Item = (u64, &'s Record)> + 's {
        self.records
            .iter()
            .filter(move |(_, r)| r.kind == kind)
            .map(|(id, r)| (*id, r))
    }

    /// Arguments after the leading name string.
    fn body(&self, id: u64, kinds: &[&str]) -> Option<&str> {
        let record = self.records.get(&id)?;
        if !kinds.contains(&record.kind.as_str()) {
            return None;
        }
        match self.patterns.named.captures(&record.args) {
            Some(caps) => caps.get(1).map(|m| m.as_str()),
            None => Some(record.args.as_str()),
        }
    }

    fn triple(&self, id: u64, kind: &str) -> Option<Vec3> {
        let caps = self.patterns.triple.captures(self.body(id, &[kind])?)?;
        let x = caps[1].parse().ok()?;
        let y = caps[2].parse().ok()?;
        let z = caps[3].parse().ok()?;
        Some(Vec3::new(x, y, z))
    }

    fn point(&self, id: u64) -> Option<Point3> {
        self.triple(id, "CARTESIAN_POINT").map(Point3::from)
    }

    fn direction(&self, id: u64) -> Option<Dir3> {
        let v = self.triple(id, "DIRECTION")?;
        (v.norm() > 0.0).then(|| Dir3::new_normalize(v))
    }

    /// Location and Z axis of an axis placement. A missing axis means +Z.
    fn frame(&self, id: u64) -> Option<AxisFrame> {
        let body = self.body(id, &["AXIS2_PLACEMENT_3D", "AXIS1_PLACEMENT"])?;
        let mut refs = self
            .patterns
            .refs
            .captures_iter(body)
            .map(|caps| caps.get(1).and_then(|m| m.as_str().parse::<u64>().ok()));
        let location = self.point(refs.next()??)?;
        let direction = match refs.next().flatten() {
            Some(axis) => self.direction(axis)?,
            None => Dir3::new_normalize(Vec3::z()),
        };
        Some(AxisFrame { origin: location, direction })
    }

    /// `(placement, first value, second value)` of a placed curve or surface.
    fn placed(&self, id: u64, kind: &str) -> Option<(AxisFrame, f64, Option<f64>)> {
        let caps = self.patterns.placed.captures(self.body(id, &[kind])?)?;
        let frame = self.frame(caps[1].parse().ok()?)?;
        let first: f64 = caps[2].parse().ok()?;
        let second = match caps.get(3) {
            Some(m) => Some(m.as_str().parse::<f64>().ok()?),
            None => None,
        };
        Some((frame, first, second))
    }

    /// A rotational surface and its trailing numeric argument.
    fn surface(&self, id: u64) -> Option<(StepSurface, Option<f64>)> {
        let kind = self.records.get(&id)?.kind.as_str();
        let surface = match kind {
            "CYLINDRICAL_SURFACE" => {
                let (axis, radius, _) = self.placed(id, kind)?;
                (radius > 0.0).then_some(StepSurface::Cylinder(CylinderSurface { axis, radius }))?
            }
            "CONICAL_SURFACE" => {
                let (axis, radius, angle) = self.placed(id, kind)?;
                let semi_angle = angle?;
                (radius >= 0.0 && semi_angle > 0.0).then_some(StepSurface::Cone(ConeSurface {
                    axis,
                    radius,
                    semi_angle,
                }))?
            }
            "TOROIDAL_SURFACE" => {
                let (axis, major_radius, minor) = self.placed(id, kind)?;
                let minor_radius = minor?;
                let torus = TorusSurface {
                    axis,
                    major_radius,
                    minor_radius,
                };
                (major_radius > 0.0 && minor_radius > 0.0).then_some(StepSurface::Torus(torus))?
            }
            "PLANE" => {
                let placement = self.patterns.refs.captures(self.body(id, &[kind])?)?.get(1)?;
                let frame = self.frame(placement.as_str().parse().ok()?)?;
                return Some((
                    StepSurface::Plane(PlaneSurface {
                        origin: frame.origin,
                        normal: frame.direction,
                    }),
                    None,
                ));
            }
            _ => {
                debug!(surface = id, kind, "surface type not scanned");
                return None;
            }
        };
        let trailing = self
            .body(id, &[kind])
            .and_then(|body| self.patterns.trailing.captures(body))
            .and_then(|caps| caps[1].parse().ok());
        Some((surface, trailing))
    }

    /// Curves bounding a face, found by following its references through
    /// bounds, loops and edges. Vertices and surfaces are not entered.
    fn edge_curves(&self, face: u64) -> BTreeSet<u64> {
        const WALKED: [&str; 7] = [
            "FACE_BOUND",
            "FACE_OUTER_BOUND",
            "EDGE_LOOP",
            "ORIENTED_EDGE",
            "EDGE_CURVE",
            "SURFACE_CURVE",
            "SEAM_CURVE",
        ];
        let mut curves = BTreeSet::new();
        let mut seen = BTreeSet::from([face]);
        let mut stack = vec![face];
        while let Some(id) = stack.pop() {
            let Some(record) = self.records.get(&id) else {
                continue;
            };
            for next in self.references(&record.args) {
                if !seen.insert(next) {
                    continue;
                }
                match self.records.get(&next).map(|r| r.kind.as_str()) {
                    Some("CIRCLE") => {
                        curves.insert(next);
                    }
                    Some(kind) if WALKED.contains(&kind) => stack.push(next),
                    _ => {}
                }
            }
        }
        curves
    }

    fn references<'a>(&'a self, args: &'a str) -> impl Iterator<Item = u64> + 'a {
        self.patterns
            .refs
            .captures_iter(args)
            .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
    }

    fn circle(&self, id: u64) -> Option<Circle> {
        let (frame, radius, _) = self.placed(id, "CIRCLE")?;
        (radius > 0.0).then_some(Circle {
            center: frame.origin,
            normal: frame.direction,
            radius,
        })
    }
}
