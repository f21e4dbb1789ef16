//! Binary space partitioning of closed triangle meshes
//!
//! A tree is built from the planes of a closed surface. Clipping a facet list
//! against it splits every facet exactly along the planes it crosses and keeps
//! the pieces that end up in front of the surface.

use glam::DVec3;

use super::primitive::Triangle;

const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = FRONT | BACK;

#[derive(Debug, Clone, Copy)]
struct Plane {
    normal: DVec3,
    w: f64,
}

impl Plane {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }
}

/// Convex planar polygon, counter-clockwise seen from the front of its plane
#[derive(Debug, Clone)]
pub(crate) struct Facet {
    vertices: Vec<DVec3>,
    plane: Plane,
}

impl Facet {
    /// `None` for triangles without area
    pub fn from_triangle(tri: Triangle) -> Option<Self> {
        let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).try_normalize()?;
        Some(Self {
            vertices: tri.to_vec(),
            plane: Plane {
                normal,
                w: normal.dot(tri[0]),
            },
        })
    }

    pub fn flipped(mut self) -> Self {
        self.vertices.reverse();
        self.plane = self.plane.flipped();
        self
    }

    pub fn min(&self) -> DVec3 {
        self.vertices.iter().fold(DVec3::INFINITY, |acc, v| acc.min(*v))
    }

    pub fn max(&self) -> DVec3 {
        self.vertices
            .iter()
            .fold(DVec3::NEG_INFINITY, |acc, v| acc.max(*v))
    }

    /// Fan triangulation
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (1..self.vertices.len().saturating_sub(1))
            .map(|i| [self.vertices[0], self.vertices[i], self.vertices[i + 1]])
    }
}

/// Where the pieces of a split facet go
#[derive(Default)]
struct Split {
    coplanar_front: Vec<Facet>,
    coplanar_back: Vec<Facet>,
    front: Vec<Facet>,
    back: Vec<Facet>,
}

fn split(plane: Plane, facet: Facet, eps: f64, out: &mut Split) {
    let sides: Vec<u8> = facet
        .vertices
        .iter()
        .map(|v| {
            let t = plane.normal.dot(*v) - plane.w;
            if t < -eps {
                BACK
            } else if t > eps {
                FRONT
            } else {
                0
            }
        })
        .collect();

    match sides.iter().fold(0, |acc, s| acc | s) {
        0 if plane.normal.dot(facet.plane.normal) > 0.0 => out.coplanar_front.push(facet),
        0 => out.coplanar_back.push(facet),
        FRONT => out.front.push(facet),
        BACK => out.back.push(facet),
        _ => {
            let n = facet.vertices.len();
            let mut front = Vec::with_capacity(n + 1);
            let mut back = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (si, sj) = (sides[i], sides[j]);
                let (vi, vj) = (facet.vertices[i], facet.vertices[j]);
                if si != BACK {
                    front.push(vi);
                }
                if si != FRONT {
                    back.push(vi);
                }
                if si | sj == SPANNING {
                    let t = (plane.w - plane.normal.dot(vi)) / plane.normal.dot(vj - vi);
                    let v = vi.lerp(vj, t);
                    front.push(v);
                    back.push(v);
                }
            }
            if front.len() >= 3 {
                out.front.push(Facet {
                    vertices: front,
                    plane: facet.plane,
                });
            }
            if back.len() >= 3 {
                out.back.push(Facet {
                    vertices: back,
                    plane: facet.plane,
                });
            }
        }
    }
}

#[derive(Debug)]
struct BspNode {
    plane: Plane,
    front: Option<usize>,
    back: Option<usize>,
}

/// Partition of space by the faces of one closed surface
///
/// Front leaves are outside the surface, back leaves inside.
#[derive(Debug)]
pub(crate) struct Bsp {
    nodes: Vec<BspNode>,
    eps: f64,
}

impl Bsp {
    pub fn build(facets: Vec<Facet>, eps: f64) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            eps,
        };
        if facets.is_empty() {
            return tree;
        }
        let mut pending = vec![(tree.push_node(&facets), facets)];
        while let Some((index, facets)) = pending.pop() {
            let plane = tree.nodes[index].plane;
            let mut parts = Split::default();
            for facet in facets {
                split(plane, facet, eps, &mut parts);
            }
            if !parts.front.is_empty() {
                let child = tree.push_node(&parts.front);
                tree.nodes[index].front = Some(child);
                pending.push((child, parts.front));
            }
            if !parts.back.is_empty() {
                let child = tree.push_node(&parts.back);
                tree.nodes[index].back = Some(child);
                pending.push((child, parts.back));
            }
        }
        tree
    }

    fn push_node(&mut self, facets: &[Facet]) -> usize {
        self.nodes.push(BspNode {
            plane: facets[0].plane,
            front: None,
            back: None,
        });
        self.nodes.len() - 1
    }

    /// Swap inside and outside
    pub fn invert(&mut self) {
        for node in &mut self.nodes {
            node.plane = node.plane.flipped();
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Pieces of `facets` outside the surface
    ///
    /// A piece lying on a face is kept when it faces the same way.
    pub fn clip(&self, facets: Vec<Facet>) -> Vec<Facet> {
        if self.nodes.is_empty() {
            return facets;
        }
        let mut kept = Vec::with_capacity(facets.len());
        let mut pending = vec![(0, facets)];
        while let Some((index, facets)) = pending.pop() {
            let node = &self.nodes[index];
            let mut parts = Split::default();
            for facet in facets {
                split(node.plane, facet, self.eps, &mut parts);
            }
            let mut front = parts.front;
            front.append(&mut parts.coplanar_front);
            let mut back = parts.back;
            back.append(&mut parts.coplanar_back);

            match node.front {
                Some(child) if !front.is_empty() => pending.push((child, front)),
                _ => kept.append(&mut front),
            }
            if let Some(child) = node.back {
                if !back.is_empty() {
                    pending.push((child, back));
                }
            }
        }
        kept
    }
}

pub(crate) fn flip_all(facets: Vec<Facet>) -> Vec<Facet> {
    facets.into_iter().map(Facet::flipped).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tetrahedron() -> Vec<Facet> {
        let o = DVec3::ZERO;
        let (x, y, z) = (DVec3::X, DVec3::Y, DVec3::Z);
        [[o, y, x], [o, x, z], [o, z, y], [x, y, z]]
            .into_iter()
            .filter_map(Facet::from_triangle)
            .collect()
    }

    fn area(facets: &[Facet]) -> f64 {
        facets
            .iter()
            .flat_map(|f| f.triangles())
            .map(|[a, b, c]| (b - a).cross(c - a).length() / 2.0)
            .sum()
    }

    #[test]
    fn test_clip_splits_crossing_facet() {
        let tree = Bsp::build(unit_tetrahedron(), 1e-9);
        // a large triangle in z = 0.25 reaching through the tetrahedron
        let sheet = [
            DVec3::new(-1.0, -1.0, 0.25),
            DVec3::new(3.0, -1.0, 0.25),
            DVec3::new(-1.0, 3.0, 0.25),
        ];
        let facets: Vec<Facet> = Facet::from_triangle(sheet).into_iter().collect();
        let outside = tree.clip(facets.clone());
        let mut inverted = Bsp::build(unit_tetrahedron(), 1e-9);
        inverted.invert();
        let inside = inverted.clip(facets);
        // the tetrahedron's section at z = 0.25 is a right triangle with legs 0.75
        assert!((area(&inside) - 0.28125).abs() < 1e-9);
        assert!((area(&outside) + area(&inside) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_tree_keeps_everything() {
        let tree = Bsp::build(Vec::new(), 1e-9);
        assert_eq!(tree.clip(unit_tetrahedron()).len(), 4);
    }

    #[test]
    fn test_degenerate_triangle_is_skipped() {
        let flat = [DVec3::ZERO, DVec3::X, DVec3::X * 2.0];
        assert!(Facet::from_triangle(flat).is_none());
    }
}
