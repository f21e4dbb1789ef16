//! CAD kernel trait definitions
//!
//! These traits define the interface that all CAD kernels must implement.

use std::sync::Arc;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::csg::Node;
use super::settings::KernelSettings;
use crate::geometry::{BoundingBox, Profile, Workplane};

/// Error type for CAD kernel operations
#[derive(Debug, Clone, Error)]
pub enum CadError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Tessellation failed: {0}")]
    TessellationFailed(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for CAD operations
pub type CadResult<T> = Result<T, CadError>;

/// A tessellated mesh output from the CAD kernel
///
/// Triangles do not share vertices, so each vertex normal is its face normal.
#[derive(Debug, Clone, Default)]
pub struct TessellatedMesh {
    /// Vertex positions (3 floats per vertex)
    pub vertices: Vec<[f32; 3]>,
    /// Vertex normals (3 floats per vertex)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (3 indices per triangle)
    pub indices: Vec<u32>,
}

impl TessellatedMesh {
    /// Create an empty tessellated mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as vertex triples
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.vertices[t[0] as usize],
                self.vertices[t[1] as usize],
                self.vertices[t[2] as usize],
            ]
        })
    }

    /// Append one triangle with a flat normal
    pub fn push_triangle(&mut self, tri: [DVec3; 3]) {
        let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
        let n = [normal.x as f32, normal.y as f32, normal.z as f32];
        for p in tri {
            self.indices.push(self.vertices.len() as u32);
            self.vertices.push([p.x as f32, p.y as f32, p.z as f32]);
            self.normals.push(n);
        }
    }

    /// Enclosed volume by the divergence theorem (closed, outward meshes)
    pub fn volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| {
                let a = DVec3::from(a.map(f64::from));
                let b = DVec3::from(b.map(f64::from));
                let c = DVec3::from(c.map(f64::from));
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|v| DVec3::from(v.map(f64::from))))
    }
}

/// Boolean operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanType {
    /// Union (add)
    Union,
    /// Subtraction (cut)
    Subtract,
    /// Intersection (common)
    Intersect,
}

/// Extent of an extrusion along the plane normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Extent {
    /// Centered on the plane, total thickness given
    Symmetric(f64),
    /// From `offset` along the normal for `distance` (may be negative)
    From { offset: f64, distance: f64 },
}

impl Extent {
    /// Normal-axis range covered, low end first
    pub fn range(self) -> (f64, f64) {
        match self {
            Extent::Symmetric(d) => (-d.abs() / 2.0, d.abs() / 2.0),
            Extent::From { offset, distance } => {
                let end = offset + distance;
                (offset.min(end), offset.max(end))
            }
        }
    }

    pub fn thickness(self) -> f64 {
        let (lo, hi) = self.range();
        hi - lo
    }
}

/// A 3D solid body
///
/// Solids are immutable; operations build new solids that share structure
/// with their operands.
#[derive(Debug, Clone)]
pub struct Solid {
    /// Unique identifier
    pub id: Uuid,
    pub(crate) node: Arc<Node>,
}

impl Solid {
    pub(crate) fn from_node(node: Node) -> Self {
        Self {
            id: Uuid::new_v4(),
            node: Arc::new(node),
        }
    }

    /// Axis-aligned bounds of the solid
    pub fn bounding_box(&self) -> BoundingBox {
        self.node.bbox
    }
}

/// The main CAD kernel trait
///
/// Implementations of this trait provide the actual geometry operations.
/// Angles are in degrees; revolution and placement are about the world Z axis.
pub trait CadKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Discretisation and integration settings in use
    fn settings(&self) -> &KernelSettings;

    /// Extrude a closed profile along its workplane normal
    fn extrude(&self, profile: &Profile, plane: Workplane, extent: Extent) -> CadResult<Solid>;

    /// Revolve a profile drawn on a vertical workplane around the Z axis
    ///
    /// # Arguments
    /// * `profile` - Outline with `u` as radius and `v` as height
    /// * `plane` - XZ or YZ; the revolution starts at the plane's x direction
    /// * `angle` - Revolution angle in degrees, `0 < angle <= 360`
    fn revolve(&self, profile: &Profile, plane: Workplane, angle: f64) -> CadResult<Solid>;

    /// Sweep a section along a path while keeping it parallel to its plane
    ///
    /// # Arguments
    /// * `profile` - Section outline on `plane`
    /// * `plane` - Section workplane
    /// * `path` - Path points `(offset, station)` on `path_plane`
    /// * `path_plane` - Plane sharing `plane`'s first axis; its y direction is the sweep axis
    fn sweep(
        &self,
        profile: &Profile,
        plane: Workplane,
        path: &[DVec2],
        path_plane: Workplane,
    ) -> CadResult<Solid>;

    /// Perform a boolean operation on two solids
    fn boolean(&self, base: &Solid, tool: &Solid, op: BooleanType) -> CadResult<Solid>;

    /// Union of any number of solids
    fn compound(&self, solids: &[Solid]) -> CadResult<Solid>;

    /// Rotate about the world Z axis, counter-clockwise seen from +Z
    fn rotate_z(&self, solid: &Solid, angle: f64) -> Solid;

    fn translate(&self, solid: &Solid, offset: DVec3) -> Solid;

    /// Enclosed volume
    fn volume(&self, solid: &Solid) -> f64;

    fn bounding_box(&self, solid: &Solid) -> BoundingBox {
        solid.bounding_box()
    }

    /// Point membership, boundary included
    fn contains(&self, solid: &Solid, point: DVec3) -> bool;

    /// Tessellate a solid into triangles
    fn tessellate(&self, solid: &Solid) -> CadResult<TessellatedMesh>;
}

/// Get the default CAD kernel
pub fn default_kernel() -> Box<dyn CadKernel> {
    Box::new(super::csg::CsgKernel::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_range() {
        assert_eq!(Extent::Symmetric(4.0).range(), (-2.0, 2.0));
        assert_eq!(
            Extent::From {
                offset: 1.0,
                distance: -3.0
            }
            .range(),
            (-2.0, 1.0)
        );
        assert_eq!(Extent::Symmetric(-4.0).thickness(), 4.0);
    }

    #[test]
    fn test_mesh_volume_of_tetrahedron() {
        let mut mesh = TessellatedMesh::new();
        let o = DVec3::ZERO;
        let x = DVec3::X;
        let y = DVec3::Y;
        let z = DVec3::Z;
        mesh.push_triangle([o, y, x]);
        mesh.push_triangle([o, x, z]);
        mesh.push_triangle([o, z, y]);
        mesh.push_triangle([x, y, z]);
        assert_eq!(mesh.triangle_count(), 4);
        assert!((mesh.volume() - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_kernel_name() {
        assert_eq!(default_kernel().name(), "csg");
    }
}
