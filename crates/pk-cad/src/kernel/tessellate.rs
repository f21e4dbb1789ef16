//! Triangle meshes for CSG trees
//!
//! Primitives are meshed directly. Boolean results clip the operand meshes
//! against each other's partition trees, so cut walls follow the tool's faces
//! exactly and the result stays closed.

use super::bsp::{Bsp, Facet, flip_all};
use super::csg::{Node, NodeKind, place};
use super::primitive::{Triangle, push_nondegenerate};
use super::settings::KernelSettings;
use super::traits::BooleanType;
use crate::geometry::BoundingBox;

pub(crate) fn triangles(node: &Node, settings: &KernelSettings) -> Vec<Triangle> {
    match &node.kind {
        NodeKind::Extrusion(e) => e.triangles(),
        NodeKind::Revolution(r) => r.triangles(settings.revolve_segments),
        NodeKind::Sweep(s) => s.triangles(),
        NodeKind::Placed {
            inner,
            angle,
            offset,
        } => triangles(inner, settings)
            .into_iter()
            .map(|t| t.map(|p| place(p, *angle, *offset)))
            .collect(),
        NodeKind::Boolean { op, base, tool } => {
            let a = Operand {
                triangles: triangles(base, settings),
                bbox: base.bbox,
            };
            let b = Operand {
                triangles: triangles(tool, settings),
                bbox: tool.bbox,
            };
            combine(*op, a, b, tolerance(node))
        }
        NodeKind::Compound(children) => {
            let eps = tolerance(node);
            let mut merged = Operand {
                triangles: Vec::new(),
                bbox: BoundingBox::empty(),
            };
            for child in children {
                let next = Operand {
                    triangles: triangles(child, settings),
                    bbox: child.bbox,
                };
                let bbox = merged.bbox.merge(&next.bbox);
                let triangles = if touches(&merged.bbox, &next.bbox, eps) {
                    combine(BooleanType::Union, merged, next, eps)
                } else {
                    let mut all = merged.triangles;
                    all.extend(next.triangles);
                    all
                };
                merged = Operand { triangles, bbox };
            }
            merged.triangles
        }
    }
}

/// Closed mesh of one side of a boolean with the bounds of its exact solid
struct Operand {
    triangles: Vec<Triangle>,
    bbox: BoundingBox,
}

/// Distance below which a vertex counts as lying on a plane
fn tolerance(node: &Node) -> f64 {
    node.bbox.largest_dimension().max(1.0) * 1e-8
}

fn touches(a: &BoundingBox, b: &BoundingBox, eps: f64) -> bool {
    a.expanded(eps).overlaps(&b.expanded(eps))
}

fn combine(op: BooleanType, a: Operand, b: Operand, eps: f64) -> Vec<Triangle> {
    let a_facets: Vec<Facet> = a.triangles.into_iter().filter_map(Facet::from_triangle).collect();
    let b_facets: Vec<Facet> = b.triangles.into_iter().filter_map(Facet::from_triangle).collect();

    // Facets clear of the other operand's bounds are wholly outside it
    let near = |f: &Facet, other: &BoundingBox| {
        touches(&BoundingBox::new(f.min(), f.max()), other, eps)
    };
    let (a_near, a_far): (Vec<Facet>, Vec<Facet>) =
        a_facets.iter().cloned().partition(|f| near(f, &b.bbox));
    let (b_near, b_far): (Vec<Facet>, Vec<Facet>) =
        b_facets.iter().cloned().partition(|f| near(f, &a.bbox));

    let mut out: Vec<Facet> = match op {
        BooleanType::Union => a_far.into_iter().chain(b_far).collect(),
        BooleanType::Subtract => a_far,
        BooleanType::Intersect => Vec::new(),
    };

    if !a_near.is_empty() || !b_near.is_empty() {
        let mut a_tree = Bsp::build(a_facets, eps);
        let mut b_tree = Bsp::build(b_facets, eps);
        match op {
            BooleanType::Union => {
                out.extend(b_tree.clip(a_near));
                // faces of `b` lying on same-facing faces of `a` are dropped here
                let b_outside = a_tree.clip(b_near);
                out.extend(flip_all(a_tree.clip(flip_all(b_outside))));
            }
            BooleanType::Subtract => {
                a_tree.invert();
                out.extend(flip_all(b_tree.clip(flip_all(a_near))));
                let b_inside = a_tree.clip(b_near);
                out.extend(a_tree.clip(flip_all(b_inside)));
            }
            BooleanType::Intersect => {
                a_tree.invert();
                let b_inside = flip_all(a_tree.clip(b_near));
                b_tree.invert();
                out.extend(flip_all(b_tree.clip(flip_all(a_near))));
                out.extend(flip_all(a_tree.clip(b_inside)));
            }
        }
    }

    let mut triangles = Vec::with_capacity(out.len());
    for facet in &out {
        for tri in facet.triangles() {
            push_nondegenerate(tri, &mut triangles);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::super::primitive::signed_volume;
    use super::*;
    use crate::geometry::{Profile, Workplane};
    use crate::kernel::{CadKernel, CsgKernel, Extent};
    use approx::assert_relative_eq;
    use glam::{DVec2, DVec3};

    #[test]
    fn test_union_of_overlapping_boxes() {
        let kernel = CsgKernel::new(KernelSettings::default().with_volume_resolution(50));
        let profile = Profile::polyline(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
        ]);
        let a = kernel
            .extrude(&profile, Workplane::XY, Extent::Symmetric(2.0))
            .unwrap();
        let b = kernel.translate(&a, DVec3::new(1.0, 0.0, 0.0));
        let union = kernel
            .boolean(&a, &b, BooleanType::Union)
            .unwrap();
        let tris = triangles(&union.node, kernel.settings());
        assert_relative_eq!(signed_volume(&tris), 12.0, max_relative = 1e-9);
    }

    #[test]
    fn test_disjoint_compound_keeps_everything() {
        let kernel = CsgKernel::default();
        let profile = Profile::circle(DVec2::new(5.0, 0.0), 1.0);
        let ring = kernel.revolve(&profile, Workplane::XZ, 90.0).unwrap();
        let copies = [ring.clone(), kernel.rotate_z(&ring, 180.0)];
        let compound = kernel.compound(&copies).unwrap();
        let single = triangles(&ring.node, kernel.settings()).len();
        assert_eq!(triangles(&compound.node, kernel.settings()).len(), 2 * single);
    }

    fn square(u0: f64, u1: f64) -> Profile {
        Profile::polyline(&[
            DVec2::new(u0, u0),
            DVec2::new(u1, u0),
            DVec2::new(u1, u1),
            DVec2::new(u0, u1),
        ])
    }

    fn area(tri: &Triangle) -> f64 {
        (tri[1] - tri[0]).cross(tri[2] - tri[0]).length() / 2.0
    }

    #[test]
    fn test_hole_through_block_is_closed() {
        let kernel = CsgKernel::default();
        let block = kernel
            .extrude(
                &square(0.0, 4.0),
                Workplane::XY,
                Extent::From {
                    offset: 0.0,
                    distance: 4.0,
                },
            )
            .unwrap();
        // tool reaches well past both caps of the block
        let hole = kernel
            .extrude(&square(1.0, 3.0), Workplane::XY, Extent::Symmetric(20.0))
            .unwrap();
        let cut = kernel.boolean(&block, &hole, BooleanType::Subtract).unwrap();
        let tris = triangles(&cut.node, kernel.settings());

        assert_relative_eq!(signed_volume(&tris), 48.0, max_relative = 1e-9);
        // a closed surface encloses the same volume wherever it sits
        let shifted: Vec<Triangle> = tris
            .iter()
            .map(|t| (*t).map(|p| p + DVec3::new(7.0, -3.0, 5.0)))
            .collect();
        assert_relative_eq!(signed_volume(&shifted), 48.0, max_relative = 1e-9);

        let on_wall = |tri: &Triangle| {
            [1.0, 3.0].iter().any(|&c| {
                tri.iter().all(|p| (p.x - c).abs() < 1e-9)
                    || tri.iter().all(|p| (p.y - c).abs() < 1e-9)
            })
        };
        let wall_area: f64 = tris.iter().filter(|t| on_wall(t)).map(area).sum();
        assert_relative_eq!(wall_area, 32.0, max_relative = 1e-9);

        let top = tris
            .iter()
            .flat_map(|t| t.iter())
            .fold(f64::NEG_INFINITY, |acc, p| acc.max(p.z));
        assert_relative_eq!(top, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_intersection_keeps_common_block() {
        let kernel = CsgKernel::default();
        let a = kernel
            .extrude(&square(0.0, 2.0), Workplane::XY, Extent::Symmetric(2.0))
            .unwrap();
        let b = kernel.translate(&a, DVec3::new(1.0, 1.0, 1.0));
        let common = kernel.boolean(&a, &b, BooleanType::Intersect).unwrap();
        let tris = triangles(&common.node, kernel.settings());
        assert_relative_eq!(signed_volume(&tris), 1.0, max_relative = 1e-9);
        assert!(tris.iter().flatten().all(|p| p.x >= 1.0 - 1e-9 && p.y >= 1.0 - 1e-9));
    }

    #[test]
    fn test_overlapping_compound_is_merged() {
        let kernel = CsgKernel::default();
        let bar = kernel
            .extrude(
                &Profile::polyline(&[
                    DVec2::new(-10.0, -1.0),
                    DVec2::new(10.0, -1.0),
                    DVec2::new(10.0, 1.0),
                    DVec2::new(-10.0, 1.0),
                ]),
                Workplane::XY,
                Extent::Symmetric(2.0),
            )
            .unwrap();
        let cross = kernel
            .compound(&[bar.clone(), kernel.rotate_z(&bar, 90.0)])
            .unwrap();
        let tris = triangles(&cross.node, kernel.settings());
        assert_relative_eq!(signed_volume(&tris), 152.0, max_relative = 1e-9);
    }
}
