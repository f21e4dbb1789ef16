//! Generic parametric shapes
//!
//! A [`Shape`] is a 2D outline on a workplane turned into a solid by rotating,
//! extruding or sweeping it, then placed around the Z axis and combined with
//! other shapes through boolean operations.

mod placement;
mod points;

use std::path::Path;

use glam::DVec2;
use pk_cad::{BooleanType, BoundingBox, CadError, CadKernel, Extent, Profile, Solid, Workplane};
use tracing::debug;

use crate::components::CuttingWedgeFS;
use crate::constants::DEFAULT_COLOR;
use crate::export::{ExportResult, save_stl};

pub use placement::AzimuthPlacement;
pub use points::{Connection, ProfilePoint, profile_from_points, with_connection};

/// The 2D outline of a shape
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Points(Vec<ProfilePoint>),
    Circle { center: DVec2, radius: f64 },
}

impl Outline {
    pub fn validate(&self) -> ShapeResult<()> {
        match self {
            Outline::Points(points) if points.len() < 3 => Err(ShapeError::InvalidPoints(
                format!("a shape needs at least 3 points, got {}", points.len()),
            )),
            Outline::Points(_) => Ok(()),
            Outline::Circle { radius, .. } if !(*radius > 0.0) => Err(
                ShapeError::InvalidParameter(format!("circle radius must be positive, got {}", radius)),
            ),
            Outline::Circle { .. } => Ok(()),
        }
    }

    pub fn to_profile(&self) -> ShapeResult<Profile> {
        self.validate()?;
        match self {
            Outline::Points(points) => profile_from_points(points),
            Outline::Circle { center, radius } => Ok(Profile::circle(*center, *radius)),
        }
    }
}

/// How the outline becomes a solid
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Revolve about Z by `rotation_angle` degrees
    Rotate { rotation_angle: f64 },
    /// Extrude along the workplane normal
    Extrude { extent: Extent },
    /// Sweep along a spline through `path_points` on `path_workplane`
    Sweep {
        path_points: Vec<DVec2>,
        path_workplane: Workplane,
    },
}

/// A parametric shape
#[derive(Debug, Clone)]
pub struct Shape {
    pub name: String,
    /// Display color (RGBA)
    pub color: [f32; 4],
    /// Material tag used in the neutronics description
    pub material_tag: Option<String>,
    pub stp_filename: Option<String>,
    pub stl_filename: Option<String>,
    pub workplane: Workplane,
    pub outline: Outline,
    pub kind: ShapeKind,
    pub azimuth_placement: AzimuthPlacement,
    /// Keep only the sector `[0, angle]` degrees of the placed solid
    pub sector_angle: Option<f64>,
    pub cut: Vec<Shape>,
    pub intersect: Vec<Shape>,
    pub union: Vec<Shape>,
}

impl Shape {
    /// Create a shape with default metadata
    pub fn new(outline: Outline, kind: ShapeKind, workplane: Workplane) -> Self {
        Self {
            name: "shape".to_string(),
            color: DEFAULT_COLOR,
            material_tag: None,
            stp_filename: None,
            stl_filename: None,
            workplane,
            outline,
            kind,
            azimuth_placement: AzimuthPlacement::default(),
            sector_angle: None,
            cut: Vec::new(),
            intersect: Vec::new(),
            union: Vec::new(),
        }
    }

    pub fn rotate_straight(points: &[(f64, f64)], rotation_angle: f64) -> Self {
        Self::rotate_mixed(with_connection(points, Connection::Straight), rotation_angle)
    }

    pub fn rotate_spline(points: &[(f64, f64)], rotation_angle: f64) -> Self {
        Self::rotate_mixed(with_connection(points, Connection::Spline), rotation_angle)
    }

    pub fn rotate_mixed(points: Vec<ProfilePoint>, rotation_angle: f64) -> Self {
        Self::new(
            Outline::Points(points),
            ShapeKind::Rotate { rotation_angle },
            Workplane::XZ,
        )
    }

    pub fn rotate_circle(center: (f64, f64), radius: f64, rotation_angle: f64) -> Self {
        Self::new(
            Outline::Circle {
                center: DVec2::new(center.0, center.1),
                radius,
            },
            ShapeKind::Rotate { rotation_angle },
            Workplane::XZ,
        )
    }

    /// Extrude `distance` split evenly either side of the workplane
    pub fn extrude_straight(points: &[(f64, f64)], distance: f64) -> Self {
        Self::extrude_mixed(with_connection(points, Connection::Straight), distance)
    }

    pub fn extrude_spline(points: &[(f64, f64)], distance: f64) -> Self {
        Self::extrude_mixed(with_connection(points, Connection::Spline), distance)
    }

    pub fn extrude_mixed(points: Vec<ProfilePoint>, distance: f64) -> Self {
        Self::new(
            Outline::Points(points),
            ShapeKind::Extrude {
                extent: Extent::Symmetric(distance),
            },
            Workplane::XZ,
        )
    }

    pub fn extrude_circle(center: (f64, f64), radius: f64, distance: f64) -> Self {
        Self::new(
            Outline::Circle {
                center: DVec2::new(center.0, center.1),
                radius,
            },
            ShapeKind::Extrude {
                extent: Extent::Symmetric(distance),
            },
            Workplane::XZ,
        )
    }

    /// Sweep section points, given relative to the path, along `path_points`
    ///
    /// Defaults to an XY section swept along a path on XZ.
    pub fn sweep_straight(points: &[(f64, f64)], path_points: &[(f64, f64)]) -> Self {
        Self::sweep_mixed(with_connection(points, Connection::Straight), path_points)
    }

    pub fn sweep_spline(points: &[(f64, f64)], path_points: &[(f64, f64)]) -> Self {
        Self::sweep_mixed(with_connection(points, Connection::Spline), path_points)
    }

    pub fn sweep_mixed(points: Vec<ProfilePoint>, path_points: &[(f64, f64)]) -> Self {
        Self::new(Outline::Points(points), sweep_kind(path_points), Workplane::XY)
    }

    pub fn sweep_circle(radius: f64, path_points: &[(f64, f64)]) -> Self {
        Self::new(
            Outline::Circle {
                center: DVec2::ZERO,
                radius,
            },
            sweep_kind(path_points),
            Workplane::XY,
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_material_tag(mut self, tag: impl Into<String>) -> Self {
        self.material_tag = Some(tag.into());
        self
    }

    pub fn with_stp_filename(mut self, filename: impl Into<String>) -> Self {
        self.stp_filename = Some(filename.into());
        self
    }

    pub fn with_stl_filename(mut self, filename: impl Into<String>) -> Self {
        self.stl_filename = Some(filename.into());
        self
    }

    pub fn with_workplane(mut self, workplane: Workplane) -> Self {
        self.workplane = workplane;
        self
    }

    /// Set the path workplane of a swept shape; ignored by other kinds
    pub fn with_path_workplane(mut self, workplane: Workplane) -> Self {
        if let ShapeKind::Sweep { path_workplane, .. } = &mut self.kind {
            *path_workplane = workplane;
        }
        self
    }

    pub fn with_extent(mut self, new_extent: Extent) -> Self {
        if let ShapeKind::Extrude { extent } = &mut self.kind {
            *extent = new_extent;
        }
        self
    }

    pub fn with_azimuth(mut self, placement: impl Into<AzimuthPlacement>) -> Self {
        self.azimuth_placement = placement.into();
        self
    }

    pub fn with_sector_angle(mut self, angle: f64) -> Self {
        self.sector_angle = Some(angle);
        self
    }

    pub fn with_cut(mut self, tool: Shape) -> Self {
        self.cut.push(tool);
        self
    }

    pub fn with_intersect(mut self, tool: Shape) -> Self {
        self.intersect.push(tool);
        self
    }

    pub fn with_union(mut self, tool: Shape) -> Self {
        self.union.push(tool);
        self
    }

    /// Check parameters without building geometry
    pub fn validate(&self) -> ShapeResult<()> {
        self.outline.validate()?;
        match &self.kind {
            ShapeKind::Rotate { rotation_angle } => {
                if !(*rotation_angle > 0.0 && *rotation_angle <= 360.0) {
                    return Err(ShapeError::InvalidParameter(format!(
                        "{}: rotation angle must be in (0, 360], got {}",
                        self.name, rotation_angle
                    )));
                }
            }
            ShapeKind::Extrude { extent } => {
                if !(extent.thickness() > 0.0) {
                    return Err(ShapeError::InvalidParameter(format!(
                        "{}: extrusion distance must be non-zero",
                        self.name
                    )));
                }
            }
            ShapeKind::Sweep {
                path_points,
                path_workplane,
            } => {
                if path_points.len() < 2 {
                    return Err(ShapeError::InvalidPoints(format!(
                        "{}: sweep path needs at least 2 points, got {}",
                        self.name,
                        path_points.len()
                    )));
                }
                if path_workplane.first_axis() != self.workplane.first_axis() {
                    return Err(ShapeError::InvalidWorkplane(format!(
                        "workplane {} and path workplane {} must start with the same letter",
                        self.workplane, path_workplane
                    )));
                }
                if *path_workplane == self.workplane {
                    return Err(ShapeError::InvalidWorkplane(format!(
                        "workplane and path workplane must be different, both are {}",
                        self.workplane
                    )));
                }
            }
        }
        if let Some(angle) = self.sector_angle {
            if !(angle > 0.0 && angle <= 360.0) {
                return Err(ShapeError::InvalidParameter(format!(
                    "{}: sector angle must be in (0, 360], got {}",
                    self.name, angle
                )));
            }
        }
        if self.azimuth_placement.is_empty() {
            return Err(ShapeError::InvalidParameter(format!(
                "{}: azimuth placement has no angles",
                self.name
            )));
        }
        Ok(())
    }

    /// Build the solid: base body, azimuth copies, sector, then cut, intersect and union
    pub fn solid(&self, kernel: &dyn CadKernel) -> ShapeResult<Solid> {
        self.validate()?;
        let profile = self.outline.to_profile()?;
        let base = match &self.kind {
            ShapeKind::Rotate { rotation_angle } => {
                kernel.revolve(&profile, self.workplane, *rotation_angle)?
            }
            ShapeKind::Extrude { extent } => kernel.extrude(&profile, self.workplane, *extent)?,
            ShapeKind::Sweep {
                path_points,
                path_workplane,
            } => kernel.sweep(&profile, self.workplane, path_points, *path_workplane)?,
        };

        let mut solid = match &self.azimuth_placement {
            AzimuthPlacement::Single(angle) if *angle == 0.0 => base,
            AzimuthPlacement::Single(angle) => kernel.rotate_z(&base, *angle),
            AzimuthPlacement::Multiple(angles) => {
                let copies: Vec<Solid> = angles
                    .iter()
                    .map(|angle| kernel.rotate_z(&base, *angle))
                    .collect();
                kernel.compound(&copies)?
            }
        };

        if let Some(angle) = self.sector_angle.filter(|a| *a < 360.0) {
            let wedge = CuttingWedgeFS::new(kernel.bounding_box(&solid), angle).to_shape();
            solid = kernel.boolean(&solid, &wedge.solid(kernel)?, BooleanType::Subtract)?;
        }

        for (tools, op) in [
            (&self.cut, BooleanType::Subtract),
            (&self.intersect, BooleanType::Intersect),
            (&self.union, BooleanType::Union),
        ] {
            for tool in tools {
                debug!("{}: {:?} with {}", self.name, op, tool.name);
                solid = kernel.boolean(&solid, &tool.solid(kernel)?, op)?;
            }
        }
        Ok(solid)
    }

    pub fn volume(&self, kernel: &dyn CadKernel) -> ShapeResult<f64> {
        Ok(kernel.volume(&self.solid(kernel)?))
    }

    pub fn bounding_box(&self, kernel: &dyn CadKernel) -> ShapeResult<BoundingBox> {
        Ok(kernel.bounding_box(&self.solid(kernel)?))
    }

    /// Tessellate and write a binary STL file
    pub fn export_stl(&self, kernel: &dyn CadKernel, path: impl AsRef<Path>) -> ExportResult<()> {
        let solid = self.solid(kernel)?;
        save_stl(kernel, &solid, path)
    }

    /// STL filename, falling back to the shape name
    pub fn stl_filename_or_default(&self) -> String {
        self.stl_filename
            .clone()
            .unwrap_or_else(|| format!("{}.stl", self.name))
    }
}

fn sweep_kind(path_points: &[(f64, f64)]) -> ShapeKind {
    ShapeKind::Sweep {
        path_points: path_points.iter().map(|&(u, v)| DVec2::new(u, v)).collect(),
        path_workplane: Workplane::XZ,
    }
}

/// Shape-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ShapeError {
    #[error("Invalid points: {0}")]
    InvalidPoints(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid workplane: {0}")]
    InvalidWorkplane(String),
    #[error("Geometry kernel error: {0}")]
    Cad(#[from] CadError),
}

pub type ShapeResult<T> = Result<T, ShapeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pk_cad::CsgKernel;
    use std::f64::consts::PI;

    const BOX: [(f64, f64); 4] = [(10.0, -5.0), (20.0, -5.0), (20.0, 5.0), (10.0, 5.0)];

    #[test]
    fn test_rotate_straight_volume() {
        let kernel = CsgKernel::default();
        let shape = Shape::rotate_straight(&BOX, 360.0);
        // annulus 10..20, height 10
        let expected = PI * (400.0 - 100.0) * 10.0;
        assert_relative_eq!(shape.volume(&kernel).unwrap(), expected, max_relative = 1e-9);

        let half = Shape::rotate_straight(&BOX, 180.0);
        assert_relative_eq!(half.volume(&kernel).unwrap(), expected / 2.0, max_relative = 1e-9);
    }

    #[test]
    fn test_extrude_is_symmetric() {
        let kernel = CsgKernel::default();
        let shape = Shape::extrude_straight(&BOX, 8.0);
        let bbox = shape.bounding_box(&kernel).unwrap();
        // XZ normal is -Y
        assert_relative_eq!(bbox.min.y, -4.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.y, 4.0, epsilon = 1e-9);
        assert_relative_eq!(shape.volume(&kernel).unwrap(), 800.0, epsilon = 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let shape = Shape::rotate_straight(&[(1.0, 0.0), (2.0, 0.0)], 360.0);
        assert!(matches!(shape.validate(), Err(ShapeError::InvalidPoints(_))));
    }

    #[test]
    fn test_bad_rotation_angle() {
        let shape = Shape::rotate_straight(&BOX, 0.0);
        assert!(matches!(shape.validate(), Err(ShapeError::InvalidParameter(_))));
    }

    #[test]
    fn test_azimuth_copies() {
        let kernel = CsgKernel::default();
        let single = Shape::extrude_straight(&BOX, 2.0);
        let copies = single.clone().with_azimuth(vec![0.0, 90.0, 180.0, 270.0]);
        assert_relative_eq!(
            copies.volume(&kernel).unwrap(),
            4.0 * single.volume(&kernel).unwrap(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_single_azimuth_turns_counter_clockwise() {
        let kernel = CsgKernel::default();
        let shape = Shape::extrude_straight(&BOX, 2.0);
        let single = shape.clone().with_azimuth(90.0).solid(&kernel).unwrap();
        assert!(kernel.contains(&single, glam::DVec3::new(0.0, 15.0, 0.0)));
        assert!(!kernel.contains(&single, glam::DVec3::new(0.0, -15.0, 0.0)));
        let listed = shape.with_azimuth(vec![90.0]).solid(&kernel).unwrap();
        let (a, b) = (kernel.bounding_box(&single), kernel.bounding_box(&listed));
        assert!(a.min.abs_diff_eq(b.min, 1e-9) && a.max.abs_diff_eq(b.max, 1e-9));
    }

    #[test]
    fn test_sector_cut() {
        let kernel = CsgKernel::default();
        let ring = Shape::rotate_straight(&BOX, 360.0);
        let sector = ring.clone().with_sector_angle(90.0);
        assert_relative_eq!(
            sector.volume(&kernel).unwrap(),
            ring.volume(&kernel).unwrap() / 4.0,
            max_relative = 0.02
        );
        // the kept quarter is x > 0, y > 0
        let solid = sector.solid(&kernel).unwrap();
        assert!(kernel.contains(&solid, glam::DVec3::new(10.0, 10.0, 0.0)));
        assert!(!kernel.contains(&solid, glam::DVec3::new(-10.0, 10.0, 0.0)));
    }

    #[test]
    fn test_cut_with_tool() {
        let kernel = CsgKernel::default();
        let outer = Shape::rotate_straight(&BOX, 360.0);
        let tool = Shape::rotate_straight(&[(0.0, -20.0), (15.0, -20.0), (15.0, 20.0), (0.0, 20.0)], 360.0);
        let cut = outer.clone().with_cut(tool);
        let expected = PI * (400.0 - 225.0) * 10.0;
        assert_relative_eq!(cut.volume(&kernel).unwrap(), expected, max_relative = 0.01);
    }

    #[test]
    fn test_sweep_workplanes() {
        let section = [(-5.0, 5.0), (5.0, 5.0), (5.0, -5.0), (-5.0, -5.0)];
        let path = [(50.0, 0.0), (20.0, 200.0), (50.0, 400.0)];
        assert!(Shape::sweep_straight(&section, &path).validate().is_ok());

        let same = Shape::sweep_straight(&section, &path).with_path_workplane(Workplane::XY);
        assert!(matches!(same.validate(), Err(ShapeError::InvalidWorkplane(_))));

        let unrelated = Shape::sweep_straight(&section, &path).with_path_workplane(Workplane::YZ);
        assert!(matches!(unrelated.validate(), Err(ShapeError::InvalidWorkplane(_))));
    }

    #[test]
    fn test_sweep_circle_volume() {
        let kernel = CsgKernel::default();
        let shape = Shape::sweep_circle(20.0, &[(100.0, 0.0), (50.0, 200.0), (100.0, 400.0)]);
        let polygon = Profile::circle(DVec2::ZERO, 20.0)
            .to_polygon(kernel.settings())
            .unwrap();
        assert_relative_eq!(
            shape.volume(&kernel).unwrap(),
            polygon.area() * 400.0,
            max_relative = 1e-9
        );
    }
}
