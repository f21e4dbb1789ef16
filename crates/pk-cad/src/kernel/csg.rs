//! Constructive solid geometry kernel
//!
//! Solids are immutable trees of primitives, rigid placements and boolean
//! nodes. All queries reduce to the set of intervals where a vertical line
//! through `(x, y)` lies inside the solid.

use std::sync::Arc;

use glam::{DVec2, DVec3};
use tracing::debug;

use super::primitive::{Extrusion, Revolution, SweptSection};
use super::settings::KernelSettings;
use super::traits::{
    BooleanType, CadError, CadKernel, CadResult, Extent, Solid, TessellatedMesh,
};
use super::{tessellate, volume};
use crate::geometry::{BoundingBox, CubicSpline, IntervalSet, Profile, Workplane};

#[derive(Debug)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub bbox: BoundingBox,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Extrusion(Extrusion),
    Revolution(Revolution),
    Sweep(SweptSection),
    /// Rotation about Z (radians) followed by a translation
    Placed {
        inner: Arc<Node>,
        angle: f64,
        offset: DVec3,
    },
    Boolean {
        op: BooleanType,
        base: Arc<Node>,
        tool: Arc<Node>,
    },
    Compound(Vec<Arc<Node>>),
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        let bbox = match &kind {
            NodeKind::Extrusion(e) => e.bounding_box(),
            NodeKind::Revolution(r) => r.bounding_box(),
            NodeKind::Sweep(s) => s.bounding_box(),
            NodeKind::Placed {
                inner,
                angle,
                offset,
            } => BoundingBox::from_points(
                inner
                    .bbox
                    .corners()
                    .into_iter()
                    .map(|p| place(p, *angle, *offset)),
            ),
            NodeKind::Boolean { op, base, tool } => match op {
                BooleanType::Union => base.bbox.merge(&tool.bbox),
                BooleanType::Subtract => base.bbox,
                BooleanType::Intersect => base
                    .bbox
                    .intersection(&tool.bbox)
                    .unwrap_or_else(BoundingBox::empty),
            },
            NodeKind::Compound(children) => children
                .iter()
                .fold(BoundingBox::empty(), |acc, c| acc.merge(&c.bbox)),
        };
        Self { kind, bbox }
    }

    /// Inside intervals of the vertical line through `(x, y)`
    pub fn spans_z(&self, x: f64, y: f64) -> IntervalSet {
        if !self.bbox.contains_xy(x, y) {
            return IntervalSet::empty();
        }
        match &self.kind {
            NodeKind::Extrusion(e) => e.spans_z(x, y),
            NodeKind::Revolution(r) => r.spans_z(x, y),
            NodeKind::Sweep(s) => s.spans_z(x, y),
            NodeKind::Placed {
                inner,
                angle,
                offset,
            } => {
                let q = DVec2::from_angle(-angle).rotate(DVec2::new(x - offset.x, y - offset.y));
                inner.spans_z(q.x, q.y).transformed(1.0, offset.z)
            }
            NodeKind::Boolean { op, base, tool } => {
                let a = base.spans_z(x, y);
                match op {
                    BooleanType::Union => a.union(&tool.spans_z(x, y)),
                    BooleanType::Subtract if a.is_empty() => a,
                    BooleanType::Subtract => a.difference(&tool.spans_z(x, y)),
                    BooleanType::Intersect if a.is_empty() => a,
                    BooleanType::Intersect => a.intersection(&tool.spans_z(x, y)),
                }
            }
            NodeKind::Compound(children) => children
                .iter()
                .fold(IntervalSet::empty(), |acc, c| acc.union(&c.spans_z(x, y))),
        }
    }

    pub fn contains(&self, p: DVec3) -> bool {
        self.bbox.contains(p) && self.spans_z(p.x, p.y).contains(p.z)
    }
}

/// Apply a Z rotation (radians) then a translation
pub(crate) fn place(p: DVec3, angle: f64, offset: DVec3) -> DVec3 {
    let xy = DVec2::from_angle(angle).rotate(DVec2::new(p.x, p.y));
    DVec3::new(xy.x, xy.y, p.z) + offset
}

/// Pure-Rust CSG kernel with exact primitive queries
#[derive(Debug, Clone, Default)]
pub struct CsgKernel {
    settings: KernelSettings,
}

impl CsgKernel {
    pub fn new(settings: KernelSettings) -> Self {
        Self { settings }
    }
}

impl CadKernel for CsgKernel {
    fn name(&self) -> &str {
        "csg"
    }

    fn settings(&self) -> &KernelSettings {
        &self.settings
    }

    fn extrude(&self, profile: &Profile, plane: Workplane, extent: Extent) -> CadResult<Solid> {
        let (w0, w1) = extent.range();
        if !(w1 - w0 > 0.0) {
            return Err(CadError::InvalidParameter(format!(
                "extrusion distance must be non-zero, got {:?}",
                extent
            )));
        }
        let polygon = profile.to_polygon(&self.settings)?;
        debug!(
            "Extruding {} point profile on {} over [{}, {}]",
            polygon.len(),
            plane,
            w0,
            w1
        );
        Ok(Solid::from_node(Node::new(NodeKind::Extrusion(Extrusion {
            polygon,
            plane,
            w0,
            w1,
        }))))
    }

    fn revolve(&self, profile: &Profile, plane: Workplane, angle: f64) -> CadResult<Solid> {
        if !(angle > 0.0 && angle <= 360.0) {
            return Err(CadError::InvalidParameter(format!(
                "revolve angle must be in (0, 360], got {}",
                angle
            )));
        }
        if !plane.is_vertical() {
            return Err(CadError::InvalidParameter(format!(
                "revolving about Z needs a workplane whose y axis is Z (XZ or YZ), got {}",
                plane
            )));
        }
        let polygon = profile.to_polygon(&self.settings)?;
        let (min, _) = polygon.bounds();
        if min.x < -1e-9 {
            return Err(CadError::InvalidProfile(format!(
                "revolve profile crosses the axis (minimum radius {})",
                min.x
            )));
        }
        let x = plane.x_dir();
        debug!("Revolving {} point profile on {} by {} degrees", polygon.len(), plane, angle);
        Ok(Solid::from_node(Node::new(NodeKind::Revolution(Revolution {
            polygon,
            start: x.y.atan2(x.x),
            sweep: angle.to_radians(),
        }))))
    }

    fn sweep(
        &self,
        profile: &Profile,
        plane: Workplane,
        path: &[DVec2],
        path_plane: Workplane,
    ) -> CadResult<Solid> {
        if plane == path_plane || plane.first_axis() != path_plane.first_axis() {
            return Err(CadError::InvalidParameter(format!(
                "sweep path workplane {} must differ from and share its first axis with {}",
                path_plane, plane
            )));
        }
        if path.len() < 2 {
            return Err(CadError::InvalidParameter(
                "sweep path needs at least 2 points".to_string(),
            ));
        }

        let mut knots: Vec<DVec2> = path.iter().map(|p| DVec2::new(p.y, p.x)).collect();
        if knots[knots.len() - 1].x < knots[0].x {
            knots.reverse();
        }
        if knots.windows(2).any(|w| w[1].x <= w[0].x) {
            return Err(CadError::InvalidParameter(
                "sweep path must advance monotonically along the sweep axis".to_string(),
            ));
        }
        let spline = CubicSpline::natural(
            knots.iter().map(|k| k.x).collect(),
            knots.iter().map(|k| k.y).collect(),
        )?;
        let sampled: Vec<DVec2> = spline
            .sample(self.settings.spline_segments)
            .into_iter()
            .map(|(s, u)| DVec2::new(s, u))
            .collect();

        let polygon = profile.to_polygon(&self.settings)?;
        debug!(
            "Sweeping {} point profile on {} along {} stations of {}",
            polygon.len(),
            plane,
            sampled.len(),
            path_plane
        );
        Ok(Solid::from_node(Node::new(NodeKind::Sweep(SweptSection {
            polygon,
            plane,
            axis: path_plane.y_dir(),
            path: sampled,
        }))))
    }

    fn boolean(&self, base: &Solid, tool: &Solid, op: BooleanType) -> CadResult<Solid> {
        debug!("Boolean {:?} of {} with {}", op, base.id, tool.id);
        Ok(Solid::from_node(Node::new(NodeKind::Boolean {
            op,
            base: base.node.clone(),
            tool: tool.node.clone(),
        })))
    }

    fn compound(&self, solids: &[Solid]) -> CadResult<Solid> {
        match solids {
            [] => Err(CadError::InvalidParameter(
                "compound needs at least one solid".to_string(),
            )),
            [single] => Ok(single.clone()),
            _ => Ok(Solid::from_node(Node::new(NodeKind::Compound(
                solids.iter().map(|s| s.node.clone()).collect(),
            )))),
        }
    }

    fn rotate_z(&self, solid: &Solid, angle: f64) -> Solid {
        let radians = angle.to_radians();
        let node = match &solid.node.kind {
            NodeKind::Placed {
                inner,
                angle: existing,
                offset,
            } => NodeKind::Placed {
                inner: inner.clone(),
                angle: existing + radians,
                offset: place(*offset, radians, DVec3::ZERO),
            },
            _ => NodeKind::Placed {
                inner: solid.node.clone(),
                angle: radians,
                offset: DVec3::ZERO,
            },
        };
        Solid::from_node(Node::new(node))
    }

    fn translate(&self, solid: &Solid, offset: DVec3) -> Solid {
        let node = match &solid.node.kind {
            NodeKind::Placed {
                inner,
                angle,
                offset: existing,
            } => NodeKind::Placed {
                inner: inner.clone(),
                angle: *angle,
                offset: *existing + offset,
            },
            _ => NodeKind::Placed {
                inner: solid.node.clone(),
                angle: 0.0,
                offset,
            },
        };
        Solid::from_node(Node::new(node))
    }

    fn volume(&self, solid: &Solid) -> f64 {
        volume::volume(&solid.node, self.settings.volume_resolution)
    }

    fn contains(&self, solid: &Solid, point: DVec3) -> bool {
        solid.node.contains(point)
    }

    fn tessellate(&self, solid: &Solid) -> CadResult<TessellatedMesh> {
        let triangles = tessellate::triangles(&solid.node, &self.settings);
        let mut mesh = TessellatedMesh::new();
        for tri in triangles {
            if !tri.iter().all(|p| p.is_finite()) {
                return Err(CadError::TessellationFailed(
                    "non-finite vertex in mesh".to_string(),
                ));
            }
            mesh.push_triangle(tri);
        }
        debug!("Tessellated {} into {} triangles", solid.id, mesh.triangle_count());
        Ok(mesh)
    }
}
