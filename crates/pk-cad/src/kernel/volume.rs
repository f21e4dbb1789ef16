//! Volume of CSG trees
//!
//! Primitive volumes are closed-form. Boolean volumes are expressed through
//! primitive volumes and overlap volumes; an overlap is integrated on a
//! midpoint grid over the intersection of the operands' bounds, with the
//! exact inside length of each vertical line as the integrand.

use super::csg::{Node, NodeKind};
use super::traits::BooleanType;
use crate::geometry::{BoundingBox, IntervalSet};

pub(crate) fn volume(node: &Node, resolution: usize) -> f64 {
    match &node.kind {
        NodeKind::Extrusion(e) => e.volume(),
        NodeKind::Revolution(r) => r.volume(),
        NodeKind::Sweep(s) => s.volume(),
        NodeKind::Placed { inner, .. } => volume(inner, resolution),
        NodeKind::Boolean { op, base, tool } => {
            let shared = overlap(base, &[tool.as_ref()], resolution);
            match op {
                BooleanType::Union => volume(base, resolution) + volume(tool, resolution) - shared,
                BooleanType::Subtract => volume(base, resolution) - shared,
                BooleanType::Intersect => shared,
            }
        }
        NodeKind::Compound(children) => {
            let mut total = 0.0;
            for (i, child) in children.iter().enumerate() {
                total += volume(child, resolution);
                let earlier: Vec<&Node> = children[..i]
                    .iter()
                    .map(|c| c.as_ref())
                    .filter(|c| c.bbox.overlaps(&child.bbox))
                    .collect();
                if !earlier.is_empty() {
                    total -= overlap(child, &earlier, resolution);
                }
            }
            total.max(0.0)
        }
    }
}

/// Volume shared by `node` and the union of `others`
fn overlap(node: &Node, others: &[&Node], resolution: usize) -> f64 {
    let region = others
        .iter()
        .filter_map(|o| node.bbox.intersection(&o.bbox))
        .reduce(|a, b| a.merge(&b));
    let Some(region) = region else {
        return 0.0;
    };
    integrate_xy(&region, resolution, |x, y| {
        let own = node.spans_z(x, y);
        if own.is_empty() {
            return 0.0;
        }
        let other = others
            .iter()
            .fold(IntervalSet::empty(), |acc, o| acc.union(&o.spans_z(x, y)));
        own.intersection(&other).length()
    })
}

/// Midpoint rule over the XY footprint of `region`, cells kept near square
fn integrate_xy(region: &BoundingBox, resolution: usize, f: impl Fn(f64, f64) -> f64) -> f64 {
    let size = region.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return 0.0;
    }
    let res = resolution.max(1) as f64;
    let aspect = (size.x / size.y).sqrt();
    let nx = (res * aspect).ceil().clamp(1.0, 4.0 * res) as usize;
    let ny = (res / aspect).ceil().clamp(1.0, 4.0 * res) as usize;
    let dx = size.x / nx as f64;
    let dy = size.y / ny as f64;

    let mut sum = 0.0;
    for i in 0..nx {
        let x = region.min.x + (i as f64 + 0.5) * dx;
        for j in 0..ny {
            let y = region.min.y + (j as f64 + 0.5) * dy;
            sum += f(x, y);
        }
    }
    sum * dx * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;

    #[test]
    fn test_integrate_constant() {
        let region = BoundingBox::new(DVec3::ZERO, DVec3::new(3.0, 1.0, 1.0));
        assert_relative_eq!(integrate_xy(&region, 20, |_, _| 2.0), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_integrate_linear_is_exact() {
        let region = BoundingBox::new(DVec3::ZERO, DVec3::new(2.0, 2.0, 1.0));
        // midpoint rule integrates linear functions exactly
        assert_relative_eq!(integrate_xy(&region, 7, |x, y| x + y), 8.0, epsilon = 1e-9);
    }
}
