//! Closed planar point loops

use glam::DVec2;

use crate::kernel::{CadError, CadResult};

/// Points closer than this are merged when building a polygon
const MERGE_DISTANCE: f64 = 1e-9;

/// A closed, non-empty loop of 2D points (the closing edge is implicit)
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<DVec2>,
}

impl Polygon {
    /// Build a polygon, merging repeated points and rejecting degenerate loops
    pub fn new(points: Vec<DVec2>) -> CadResult<Self> {
        let mut merged: Vec<DVec2> = Vec::with_capacity(points.len());
        for p in points {
            if !p.is_finite() {
                return Err(CadError::InvalidProfile(format!(
                    "profile point {:?} is not finite",
                    p
                )));
            }
            if merged
                .last()
                .is_none_or(|last| last.distance(p) > MERGE_DISTANCE)
            {
                merged.push(p);
            }
        }
        while merged.len() > 1 && merged[0].distance(merged[merged.len() - 1]) <= MERGE_DISTANCE {
            merged.pop();
        }

        if merged.len() < 3 {
            return Err(CadError::InvalidProfile(format!(
                "a closed profile needs at least 3 distinct points, got {}",
                merged.len()
            )));
        }

        let polygon = Self { points: merged };
        let (min, max) = polygon.bounds();
        let scale = (max - min).max_element().max(1.0);
        if polygon.area() <= 1e-12 * scale * scale {
            return Err(CadError::InvalidProfile(
                "profile encloses no area".to_string(),
            ));
        }
        Ok(polygon)
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the edges, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace area, positive for counter-clockwise loops
    pub fn signed_area(&self) -> f64 {
        0.5 * self.edges().map(|(a, b)| a.perp_dot(b)).sum::<f64>()
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Area centroid
    pub fn centroid(&self) -> DVec2 {
        let signed = self.signed_area();
        let mut acc = DVec2::ZERO;
        for (a, b) in self.edges() {
            acc += (a + b) * a.perp_dot(b);
        }
        acc / (6.0 * signed)
    }

    /// Minimum and maximum corner of the axis-aligned bounding rectangle
    pub fn bounds(&self) -> (DVec2, DVec2) {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for p in &self.points {
            min = min.min(*p);
            max = max.max(*p);
        }
        (min, max)
    }

    /// Even-odd point containment
    pub fn contains(&self, p: DVec2) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Inside spans `(u0, u1)` of the horizontal line at height `v`
    pub fn spans_along_u(&self, v: f64) -> Vec<(f64, f64)> {
        let mut crossings: Vec<f64> = self
            .edges()
            .filter(|(a, b)| (a.y > v) != (b.y > v))
            .map(|(a, b)| a.x + (v - a.y) * (b.x - a.x) / (b.y - a.y))
            .collect();
        pair_crossings(&mut crossings)
    }

    /// Inside spans `(v0, v1)` of the vertical line at `u`
    pub fn spans_along_v(&self, u: f64) -> Vec<(f64, f64)> {
        let mut crossings: Vec<f64> = self
            .edges()
            .filter(|(a, b)| (a.x > u) != (b.x > u))
            .map(|(a, b)| a.y + (u - a.x) * (b.y - a.y) / (b.x - a.x))
            .collect();
        pair_crossings(&mut crossings)
    }

    /// Ear-clipping triangulation; triangles follow the loop's winding
    pub fn triangulate(&self) -> Vec<[usize; 3]> {
        let n = self.points.len();
        let orientation = if self.is_ccw() { 1.0 } else { -1.0 };
        let mut remaining: Vec<usize> = (0..n).collect();
        let mut triangles = Vec::with_capacity(n.saturating_sub(2));

        while remaining.len() > 3 {
            let m = remaining.len();
            let mut clipped = false;

            for i in 0..m {
                let prev = remaining[(i + m - 1) % m];
                let curr = remaining[i];
                let next = remaining[(i + 1) % m];
                let (a, b, c) = (self.points[prev], self.points[curr], self.points[next]);
                let turn = (b - a).perp_dot(c - b) * orientation;

                if turn.abs() <= 1e-14 * (b - a).length_squared().max(1.0) {
                    // collinear vertex, drop without emitting a sliver
                    remaining.remove(i);
                    clipped = true;
                    break;
                }
                if turn < 0.0 {
                    continue;
                }
                let blocked = remaining.iter().any(|&k| {
                    k != prev
                        && k != curr
                        && k != next
                        && point_in_triangle(self.points[k], a, b, c)
                });
                if !blocked {
                    triangles.push([prev, curr, next]);
                    remaining.remove(i);
                    clipped = true;
                    break;
                }
            }

            if !clipped {
                // self-touching input: fall back to a fan over what is left
                let first = remaining[0];
                for w in remaining[1..].windows(2) {
                    triangles.push([first, w[0], w[1]]);
                }
                return triangles;
            }
        }

        if remaining.len() == 3 {
            triangles.push([remaining[0], remaining[1], remaining[2]]);
        }
        triangles
    }
}

fn pair_crossings(crossings: &mut [f64]) -> Vec<(f64, f64)> {
    crossings.sort_by(|a, b| a.total_cmp(b));
    crossings
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

fn point_in_triangle(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Polygon {
        Polygon::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(size, 0.0),
            DVec2::new(size, size),
            DVec2::new(0.0, size),
        ])
        .unwrap()
    }

    fn l_shape() -> Polygon {
        Polygon::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(4.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 3.0),
            DVec2::new(0.0, 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_area_and_centroid() {
        let sq = square(2.0);
        assert_relative_eq!(sq.area(), 4.0);
        assert!(sq.is_ccw());
        assert_relative_eq!(sq.centroid().x, 1.0);
        assert_relative_eq!(sq.centroid().y, 1.0);
    }

    #[test]
    fn test_rejects_degenerate() {
        let line = Polygon::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
        ]);
        assert!(matches!(line, Err(CadError::InvalidProfile(_))));

        let two = Polygon::new(vec![DVec2::ZERO, DVec2::ONE, DVec2::ZERO]);
        assert!(two.is_err());
    }

    #[test]
    fn test_closing_duplicate_is_merged() {
        let p = Polygon::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn test_spans() {
        let l = l_shape();
        let low = l.spans_along_u(0.5);
        assert_eq!(low.len(), 1);
        assert_relative_eq!(low[0].0, 0.0);
        assert_relative_eq!(low[0].1, 4.0);

        let high = l.spans_along_u(2.0);
        assert_relative_eq!(high[0].1, 1.0);

        let column = l.spans_along_v(2.0);
        assert_eq!(column.len(), 1);
        assert_relative_eq!(column[0].1, 1.0);
        assert!(l.spans_along_v(5.0).is_empty());
    }

    #[test]
    fn test_contains() {
        let l = l_shape();
        assert!(l.contains(DVec2::new(0.5, 2.5)));
        assert!(l.contains(DVec2::new(3.5, 0.5)));
        assert!(!l.contains(DVec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_triangulation_covers_area() {
        for polygon in [square(3.0), l_shape()] {
            let tris = polygon.triangulate();
            assert_eq!(tris.len(), polygon.len() - 2);
            let total: f64 = tris
                .iter()
                .map(|t| {
                    let p = polygon.points();
                    0.5 * (p[t[1]] - p[t[0]]).perp_dot(p[t[2]] - p[t[0]])
                })
                .sum();
            assert_relative_eq!(total, polygon.signed_area(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_triangulation_clockwise() {
        let mut pts = l_shape().points().to_vec();
        pts.reverse();
        let cw = Polygon::new(pts).unwrap();
        assert!(!cw.is_ccw());
        let p = cw.points();
        for t in cw.triangulate() {
            let a = (p[t[1]] - p[t[0]]).perp_dot(p[t[2]] - p[t[0]]);
            assert!(a < 0.0, "triangle winding should follow the loop");
        }
    }
}
