//! Leaf solids of the CSG tree
//!
//! Every primitive answers the same three questions exactly: where a vertical
//! line at `(x, y)` is inside it, how much volume it encloses and what its
//! bounds are. Meshes are generated separately and oriented outward.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::{DVec2, DVec3};

use crate::geometry::{BoundingBox, IntervalSet, Polygon, Workplane};

pub(crate) type Triangle = [DVec3; 3];

/// Profile pushed along its workplane normal between `w0` and `w1`
#[derive(Debug, Clone)]
pub(crate) struct Extrusion {
    pub polygon: Polygon,
    pub plane: Workplane,
    pub w0: f64,
    pub w1: f64,
}

impl Extrusion {
    pub fn bounding_box(&self) -> BoundingBox {
        let (min, max) = self.polygon.bounds();
        let mut corners = Vec::with_capacity(8);
        for u in [min.x, max.x] {
            for v in [min.y, max.y] {
                for w in [self.w0, self.w1] {
                    corners.push(self.plane.to_world(u, v, w));
                }
            }
        }
        BoundingBox::from_points(corners)
    }

    pub fn volume(&self) -> f64 {
        self.polygon.area() * (self.w1 - self.w0)
    }

    pub fn spans_z(&self, x: f64, y: f64) -> IntervalSet {
        let local = self.plane.to_local(DVec3::new(x, y, 0.0));
        let zx = self.plane.x_dir().z;
        let zy = self.plane.y_dir().z;
        let zn = self.plane.normal().z;

        if zn != 0.0 {
            if self.polygon.contains(DVec2::new(local.x, local.y)) {
                IntervalSet::single(self.w0, self.w1).transformed(zn, 0.0)
            } else {
                IntervalSet::empty()
            }
        } else if local.z < self.w0 || local.z > self.w1 {
            IntervalSet::empty()
        } else if zx != 0.0 {
            IntervalSet::from_spans(self.polygon.spans_along_u(local.y)).transformed(zx, 0.0)
        } else {
            IntervalSet::from_spans(self.polygon.spans_along_v(local.x)).transformed(zy, 0.0)
        }
    }

    pub fn triangles(&self) -> Vec<Triangle> {
        let plane = self.plane;
        let bottom: Vec<DVec3> = self
            .polygon
            .points()
            .iter()
            .map(|p| plane.to_world(p.x, p.y, self.w0))
            .collect();
        let top: Vec<DVec3> = self
            .polygon
            .points()
            .iter()
            .map(|p| plane.to_world(p.x, p.y, self.w1))
            .collect();

        let mut tris = Vec::new();
        push_cap(&self.polygon, &bottom, true, &mut tris);
        push_cap(&self.polygon, &top, false, &mut tris);
        push_band(&bottom, &top, &mut tris);
        orient_outward(tris)
    }
}

/// Profile drawn on a vertical plane revolved about the world Z axis
#[derive(Debug, Clone)]
pub(crate) struct Revolution {
    /// `u` is the radius, `v` the height
    pub polygon: Polygon,
    /// Azimuth of the plane's x direction (radians)
    pub start: f64,
    /// Revolution angle (radians)
    pub sweep: f64,
}

impl Revolution {
    pub fn is_full(&self) -> bool {
        self.sweep >= TAU - 1e-9
    }

    fn covers_azimuth(&self, angle: f64) -> bool {
        self.is_full() || (angle - self.start).rem_euclid(TAU) <= self.sweep + 1e-12
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let (min, max) = self.polygon.bounds();
        let mut angles = vec![self.start, self.start + self.sweep];
        for k in 0..4 {
            let cardinal = k as f64 * FRAC_PI_2;
            if self.covers_azimuth(cardinal) {
                angles.push(cardinal);
            }
        }
        let mut points = Vec::with_capacity(angles.len() * 4);
        for a in angles {
            for r in [min.x.max(0.0), max.x] {
                for z in [min.y, max.y] {
                    points.push(DVec3::new(r * a.cos(), r * a.sin(), z));
                }
            }
        }
        BoundingBox::from_points(points)
    }

    /// Pappus: swept angle times the first moment of area about the axis
    pub fn volume(&self) -> f64 {
        let moment: f64 = self
            .polygon
            .edges()
            .map(|(a, b)| (a.x + b.x) * a.perp_dot(b))
            .sum::<f64>()
            / 6.0;
        self.sweep * moment.abs()
    }

    pub fn spans_z(&self, x: f64, y: f64) -> IntervalSet {
        if !self.covers_azimuth(y.atan2(x)) {
            return IntervalSet::empty();
        }
        IntervalSet::from_spans(self.polygon.spans_along_v(x.hypot(y)))
    }

    pub fn triangles(&self, segments_per_turn: usize) -> Vec<Triangle> {
        let full = self.is_full();
        let segments = ((segments_per_turn as f64 * self.sweep / TAU).ceil() as usize)
            .max(if full { 3 } else { 1 });
        let ring_count = if full { segments } else { segments + 1 };

        let rings: Vec<Vec<DVec3>> = (0..ring_count)
            .map(|k| {
                let a = self.start + self.sweep * k as f64 / segments as f64;
                let (sin, cos) = a.sin_cos();
                self.polygon
                    .points()
                    .iter()
                    .map(|p| DVec3::new(p.x * cos, p.x * sin, p.y))
                    .collect()
            })
            .collect();

        let mut tris = Vec::new();
        for k in 0..segments {
            let next = if full { (k + 1) % ring_count } else { k + 1 };
            push_band(&rings[k], &rings[next], &mut tris);
        }
        if !full {
            push_cap(&self.polygon, &rings[0], true, &mut tris);
            push_cap(&self.polygon, &rings[ring_count - 1], false, &mut tris);
        }
        orient_outward(tris)
    }
}

/// Section kept parallel to its plane while its origin follows a path
///
/// A world point is `x·(a + offset(s)) + y·b + axis·s` for section
/// coordinates `(a, b)` and station `s`.
#[derive(Debug, Clone)]
pub(crate) struct SweptSection {
    pub polygon: Polygon,
    pub plane: Workplane,
    pub axis: DVec3,
    /// Sampled path as `(station, offset)`, stations strictly increasing
    pub path: Vec<DVec2>,
}

impl SweptSection {
    fn station_range(&self) -> (f64, f64) {
        (self.path[0].x, self.path[self.path.len() - 1].x)
    }

    fn offset_at(&self, s: f64) -> f64 {
        let i = match self.path.binary_search_by(|p| p.x.total_cmp(&s)) {
            Ok(i) => return self.path[i].y,
            Err(i) => i.clamp(1, self.path.len() - 1),
        };
        let (a, b) = (self.path[i - 1], self.path[i]);
        a.y + (b.y - a.y) * (s - a.x) / (b.x - a.x)
    }

    fn world(&self, a: f64, b: f64, station: f64, offset: f64) -> DVec3 {
        self.plane.x_dir() * (a + offset) + self.plane.y_dir() * b + self.axis * station
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let (min, max) = self.polygon.bounds();
        let mut points = Vec::with_capacity(self.path.len() * 4);
        for p in &self.path {
            for a in [min.x, max.x] {
                for b in [min.y, max.y] {
                    points.push(self.world(a, b, p.x, p.y));
                }
            }
        }
        BoundingBox::from_points(points)
    }

    pub fn volume(&self) -> f64 {
        let (s0, s1) = self.station_range();
        self.polygon.area() * (s1 - s0)
    }

    pub fn spans_z(&self, x: f64, y: f64) -> IntervalSet {
        let base = DVec3::new(x, y, 0.0);
        let along_x = base.dot(self.plane.x_dir());
        let along_y = base.dot(self.plane.y_dir());

        if self.axis.z != 0.0 {
            let sections = self.polygon.spans_along_u(along_y);
            let mut stations = Vec::new();
            for w in self.path.windows(2) {
                let (p0, p1) = (w[0], w[1]);
                for &(c, d) in &sections {
                    // inside when along_x - d <= offset(s) <= along_x - c
                    let (lo, hi) = (along_x - d, along_x - c);
                    let du = p1.y - p0.y;
                    if du.abs() < 1e-12 {
                        if p0.y >= lo && p0.y <= hi {
                            stations.push((p0.x, p1.x));
                        }
                        continue;
                    }
                    let t_lo = (lo - p0.y) / du;
                    let t_hi = (hi - p0.y) / du;
                    let ta = t_lo.min(t_hi).max(0.0);
                    let tb = t_lo.max(t_hi).min(1.0);
                    if tb > ta {
                        let ds = p1.x - p0.x;
                        stations.push((p0.x + ta * ds, p0.x + tb * ds));
                    }
                }
            }
            return IntervalSet::from_spans(stations).transformed(self.axis.z, 0.0);
        }

        let station = base.dot(self.axis);
        let (s0, s1) = self.station_range();
        if station < s0 || station > s1 {
            return IntervalSet::empty();
        }
        let offset = self.offset_at(station);
        let zx = self.plane.x_dir().z;
        if zx != 0.0 {
            IntervalSet::from_spans(self.polygon.spans_along_u(along_y))
                .transformed(zx, zx * offset)
        } else {
            IntervalSet::from_spans(self.polygon.spans_along_v(along_x - offset))
                .transformed(self.plane.y_dir().z, 0.0)
        }
    }

    pub fn triangles(&self) -> Vec<Triangle> {
        let sections: Vec<Vec<DVec3>> = self
            .path
            .iter()
            .map(|p| {
                self.polygon
                    .points()
                    .iter()
                    .map(|q| self.world(q.x, q.y, p.x, p.y))
                    .collect()
            })
            .collect();

        let mut tris = Vec::new();
        for w in sections.windows(2) {
            push_band(&w[0], &w[1], &mut tris);
        }
        push_cap(&self.polygon, &sections[0], true, &mut tris);
        push_cap(&self.polygon, &sections[sections.len() - 1], false, &mut tris);
        orient_outward(tris)
    }
}

/// Quads joining two congruent loops
fn push_band(a: &[DVec3], b: &[DVec3], out: &mut Vec<Triangle>) {
    let n = a.len();
    for i in 0..n {
        let j = (i + 1) % n;
        push_nondegenerate([a[i], a[j], b[j]], out);
        push_nondegenerate([a[i], b[j], b[i]], out);
    }
}

fn push_cap(polygon: &Polygon, loop_points: &[DVec3], reversed: bool, out: &mut Vec<Triangle>) {
    for [i, j, k] in polygon.triangulate() {
        if reversed {
            push_nondegenerate([loop_points[i], loop_points[k], loop_points[j]], out);
        } else {
            push_nondegenerate([loop_points[i], loop_points[j], loop_points[k]], out);
        }
    }
}

pub(crate) fn push_nondegenerate(tri: Triangle, out: &mut Vec<Triangle>) {
    if (tri[1] - tri[0]).cross(tri[2] - tri[0]).length_squared() > 1e-24 {
        out.push(tri);
    }
}

pub(crate) fn signed_volume(tris: &[Triangle]) -> f64 {
    tris.iter()
        .map(|[a, b, c]| a.dot(b.cross(*c)) / 6.0)
        .sum()
}

pub(crate) fn flip(tri: Triangle) -> Triangle {
    [tri[0], tri[2], tri[1]]
}

/// Flip a closed mesh whose triangles face inward
fn orient_outward(tris: Vec<Triangle>) -> Vec<Triangle> {
    if signed_volume(&tris) < 0.0 {
        tris.into_iter().map(flip).collect()
    } else {
        tris
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(u0: f64, v0: f64, u1: f64, v1: f64) -> Polygon {
        Polygon::new(vec![
            DVec2::new(u0, v0),
            DVec2::new(u1, v0),
            DVec2::new(u1, v1),
            DVec2::new(u0, v1),
        ])
        .unwrap()
    }

    #[test]
    fn test_extrusion_on_xz_spans() {
        // 2 wide, 4 tall, 6 deep in -Y
        let e = Extrusion {
            polygon: rect(0.0, 0.0, 2.0, 4.0),
            plane: Workplane::XZ,
            w0: 0.0,
            w1: 6.0,
        };
        assert_relative_eq!(e.volume(), 48.0);
        let spans = e.spans_z(1.0, -3.0);
        assert_eq!(spans.spans(), &[(0.0, 4.0)]);
        assert!(e.spans_z(1.0, 3.0).is_empty());
        let bbox = e.bounding_box();
        assert_relative_eq!(bbox.min.y, -6.0);
        assert_relative_eq!(bbox.max.z, 4.0);
    }

    #[test]
    fn test_extrusion_on_xy_spans() {
        let e = Extrusion {
            polygon: rect(-1.0, -1.0, 1.0, 1.0),
            plane: Workplane::YX,
            w0: -1.0,
            w1: 3.0,
        };
        // YX normal is -Z so the slab covers z in [-3, 1]
        assert_eq!(e.spans_z(0.0, 0.0).spans(), &[(-3.0, 1.0)]);
    }

    #[test]
    fn test_extrusion_mesh_volume() {
        let e = Extrusion {
            polygon: rect(0.0, 0.0, 2.0, 3.0),
            plane: Workplane::YZ,
            w0: -1.0,
            w1: 1.0,
        };
        assert_relative_eq!(signed_volume(&e.triangles()), e.volume(), max_relative = 1e-9);
    }

    #[test]
    fn test_revolution_volume_is_pappus() {
        let r = Revolution {
            polygon: rect(1.0, -1.0, 3.0, 1.0),
            start: 0.0,
            sweep: TAU,
        };
        // annulus area pi*(9-1) times height 2
        assert_relative_eq!(r.volume(), std::f64::consts::PI * 16.0, max_relative = 1e-12);
        assert_eq!(r.spans_z(0.0, 2.0).spans(), &[(-1.0, 1.0)]);
        assert!(r.spans_z(0.5, 0.0).is_empty());
    }

    #[test]
    fn test_partial_revolution_limits_azimuth() {
        let r = Revolution {
            polygon: rect(0.0, 0.0, 2.0, 1.0),
            start: 0.0,
            sweep: FRAC_PI_2,
        };
        assert!(!r.spans_z(1.0, 1.0).is_empty());
        assert!(r.spans_z(-1.0, 1.0).is_empty());
        let bbox = r.bounding_box();
        assert_relative_eq!(bbox.min.x, 0.0);
        assert_relative_eq!(bbox.max.y, 2.0);
        let mesh_volume = signed_volume(&r.triangles(96));
        assert_relative_eq!(mesh_volume, r.volume(), max_relative = 0.01);
    }

    #[test]
    fn test_sweep_with_vertical_axis() {
        let s = SweptSection {
            polygon: rect(-1.0, -1.0, 1.0, 1.0),
            plane: Workplane::XY,
            axis: DVec3::Z,
            path: vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 5.0)],
        };
        assert_relative_eq!(s.volume(), 40.0);
        // at x = 5 the section centre passes at station 10
        let spans = s.spans_z(5.0, 0.0);
        assert_eq!(spans.spans().len(), 1);
        assert_relative_eq!(spans.spans()[0].0, 8.0, epsilon = 1e-9);
        assert_relative_eq!(spans.spans()[0].1, 10.0, epsilon = 1e-9);
        assert_relative_eq!(signed_volume(&s.triangles()), 40.0, max_relative = 1e-9);
    }

    #[test]
    fn test_sweep_with_horizontal_axis() {
        let s = SweptSection {
            polygon: rect(-1.0, -1.0, 1.0, 1.0),
            plane: Workplane::XZ,
            axis: DVec3::Y,
            path: vec![DVec2::new(0.0, 0.0), DVec2::new(4.0, 2.0)],
        };
        // XZ section: a along X, b along Z
        assert_eq!(s.spans_z(1.5, 2.0).spans(), &[(-1.0, 1.0)]);
        assert!(s.spans_z(0.0, 4.0).is_empty());
        assert!(s.spans_z(0.0, 5.0).is_empty());
    }
}
