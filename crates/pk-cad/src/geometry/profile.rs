//! 2D profiles built from lines, splines and three-point arcs

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::polygon::Polygon;
use super::spline::SplineCurve;
use crate::kernel::{CadError, CadResult, KernelSettings};

/// One edge of a profile, starting where the previous edge ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Edge {
    /// Straight segment to a point
    Line(DVec2),
    /// Interpolating spline through the listed points; the last one is the end
    Spline(Vec<DVec2>),
    /// Circular arc through `mid` ending at `end`
    Arc { mid: DVec2, end: DVec2 },
}

impl Edge {
    fn end(&self) -> Option<DVec2> {
        match self {
            Edge::Line(p) => Some(*p),
            Edge::Spline(points) => points.last().copied(),
            Edge::Arc { end, .. } => Some(*end),
        }
    }
}

/// A closed planar outline; the final edge back to `start` is implicit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    start: DVec2,
    edges: Vec<Edge>,
}

impl Profile {
    pub fn new(start: DVec2) -> Self {
        Self {
            start,
            edges: Vec::new(),
        }
    }

    /// Straight-edged outline through the given points
    pub fn polyline(points: &[DVec2]) -> Self {
        let mut profile = Self::new(points.first().copied().unwrap_or(DVec2::ZERO));
        for p in points.iter().skip(1) {
            profile.push(Edge::Line(*p));
        }
        profile
    }

    /// Full circle made of two half arcs
    pub fn circle(center: DVec2, radius: f64) -> Self {
        let east = center + DVec2::new(radius, 0.0);
        let west = center - DVec2::new(radius, 0.0);
        Self::new(east)
            .arc_to(center + DVec2::new(0.0, radius), west)
            .arc_to(center - DVec2::new(0.0, radius), east)
    }

    pub fn line_to(mut self, p: DVec2) -> Self {
        self.push(Edge::Line(p));
        self
    }

    pub fn spline_through(mut self, points: Vec<DVec2>) -> Self {
        self.push(Edge::Spline(points));
        self
    }

    pub fn arc_to(mut self, mid: DVec2, end: DVec2) -> Self {
        self.push(Edge::Arc { mid, end });
        self
    }

    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn start(&self) -> DVec2 {
        self.start
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Point where the last explicit edge ends
    pub fn current(&self) -> DVec2 {
        self.edges
            .iter()
            .rev()
            .find_map(Edge::end)
            .unwrap_or(self.start)
    }

    /// Discretise into a closed polygon
    pub fn to_polygon(&self, settings: &KernelSettings) -> CadResult<Polygon> {
        let mut points = vec![self.start];
        let mut cursor = self.start;
        for edge in &self.edges {
            match edge {
                Edge::Line(p) => points.push(*p),
                Edge::Spline(through) => {
                    if through.is_empty() {
                        return Err(CadError::InvalidProfile(
                            "spline edge has no points".to_string(),
                        ));
                    }
                    let mut knots = Vec::with_capacity(through.len() + 1);
                    knots.push(cursor);
                    knots.extend(through.iter().copied());
                    let curve = SplineCurve::through(&knots)?;
                    points.extend(curve.sample(settings.spline_segments).into_iter().skip(1));
                }
                Edge::Arc { mid, end } => {
                    let arc = ThreePointArc::new(cursor, *mid, *end)?;
                    points.extend(arc.sample(settings.arc_step_degrees).into_iter().skip(1));
                }
            }
            cursor = edge.end().unwrap_or(cursor);
        }
        Polygon::new(points)
    }
}

/// Circular arc defined by start, an interior point and end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreePointArc {
    pub center: DVec2,
    pub radius: f64,
    pub start_angle: f64,
    /// Signed sweep in radians, positive when counter-clockwise
    pub sweep: f64,
}

impl ThreePointArc {
    pub fn new(start: DVec2, mid: DVec2, end: DVec2) -> CadResult<Self> {
        let d = 2.0 * (start.x * (mid.y - end.y) + mid.x * (end.y - start.y) + end.x * (start.y - mid.y));
        let scale = (mid - start).length().max((end - mid).length()).max(1e-12);
        if d.abs() <= 1e-12 * scale * scale {
            return Err(CadError::InvalidProfile(format!(
                "arc points {:?}, {:?}, {:?} are collinear",
                start, mid, end
            )));
        }
        let s2 = start.length_squared();
        let m2 = mid.length_squared();
        let e2 = end.length_squared();
        let center = DVec2::new(
            (s2 * (mid.y - end.y) + m2 * (end.y - start.y) + e2 * (start.y - mid.y)) / d,
            (s2 * (end.x - mid.x) + m2 * (start.x - end.x) + e2 * (mid.x - start.x)) / d,
        );
        let radius = center.distance(start);
        let angle = |p: DVec2| (p.y - center.y).atan2(p.x - center.x);
        let a0 = angle(start);
        let ccw_to_end = (angle(end) - a0).rem_euclid(TAU);
        let ccw_to_mid = (angle(mid) - a0).rem_euclid(TAU);
        let ccw_to_end = if ccw_to_end <= 1e-12 { TAU } else { ccw_to_end };
        let sweep = if ccw_to_mid < ccw_to_end {
            ccw_to_end
        } else {
            ccw_to_end - TAU
        };
        Ok(Self {
            center,
            radius,
            start_angle: a0,
            sweep,
        })
    }

    pub fn point_at(&self, fraction: f64) -> DVec2 {
        let a = self.start_angle + self.sweep * fraction;
        self.center + DVec2::new(a.cos(), a.sin()) * self.radius
    }

    /// Points along the arc at most `step_degrees` apart, both ends included
    pub fn sample(&self, step_degrees: f64) -> Vec<DVec2> {
        let step = step_degrees.max(0.1).to_radians();
        let n = ((self.sweep.abs() / step).ceil() as usize).max(2);
        (0..=n).map(|k| self.point_at(k as f64 / n as f64)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_polyline_profile() {
        let profile = Profile::polyline(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(0.0, 1.0),
        ]);
        let polygon = profile.to_polygon(&KernelSettings::default()).unwrap();
        assert_relative_eq!(polygon.area(), 2.0);
    }

    #[test]
    fn test_circle_area_converges() {
        let settings = KernelSettings::default().with_arc_step_degrees(1.0);
        let polygon = Profile::circle(DVec2::new(5.0, 5.0), 2.0)
            .to_polygon(&settings)
            .unwrap();
        assert_relative_eq!(polygon.area(), PI * 4.0, max_relative = 1e-3);
        assert_relative_eq!(polygon.centroid().x, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arc_direction_follows_mid_point() {
        let ccw = ThreePointArc::new(
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(-1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(ccw.sweep, PI, epsilon = 1e-12);

        let cw = ThreePointArc::new(
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, -1.0),
            DVec2::new(-1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(cw.sweep, -PI, epsilon = 1e-12);
        assert_relative_eq!(cw.point_at(0.5).y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_arc_is_rejected() {
        let arc = ThreePointArc::new(DVec2::ZERO, DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0));
        assert!(matches!(arc, Err(CadError::InvalidProfile(_))));
    }

    #[test]
    fn test_spline_edge_passes_through_points() {
        let profile = Profile::new(DVec2::new(0.0, 0.0))
            .line_to(DVec2::new(4.0, 0.0))
            .spline_through(vec![DVec2::new(3.0, 2.0), DVec2::new(0.0, 3.0)]);
        let polygon = profile.to_polygon(&KernelSettings::default()).unwrap();
        assert!(polygon
            .points()
            .iter()
            .any(|p| p.distance(DVec2::new(3.0, 2.0)) < 1e-9));
        assert_eq!(profile.current(), DVec2::new(0.0, 3.0));
    }
}
