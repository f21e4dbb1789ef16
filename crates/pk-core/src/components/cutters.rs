//! Cutting tools used to remove material from other components

use glam::DVec2;
use pk_cad::{BoundingBox, Extent, Workplane};
use serde::{Deserialize, Serialize};

use super::{Component, clip_to_positive_radius, rectangle};
use crate::shape::{AzimuthPlacement, Shape, ShapeError, ShapeResult};

/// Extra room left around the solid a full-size wedge is fitted to
const WEDGE_MARGIN: f64 = 1.0;

fn cutter(shape: Shape, name: &str) -> Shape {
    shape
        .with_name(name)
        .with_stl_filename(format!("{}.stl", name))
}

/// Revolved rectangle touching the Z axis, covering `rotation_angle` degrees from `azimuth`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingWedge {
    pub height: f64,
    pub radius: f64,
    pub rotation_angle: f64,
    #[serde(default)]
    pub azimuth: f64,
}

impl CuttingWedge {
    pub fn new(height: f64, radius: f64, rotation_angle: f64) -> Self {
        Self {
            height,
            radius,
            rotation_angle,
            azimuth: 0.0,
        }
    }

    pub fn with_azimuth(mut self, azimuth: f64) -> Self {
        self.azimuth = azimuth;
        self
    }

    fn shape(&self) -> Shape {
        let h = self.height / 2.0;
        let outline = rectangle(DVec2::new(0.0, -h), DVec2::new(self.radius, h));
        cutter(
            Shape::rotate_straight(&outline, self.rotation_angle).with_azimuth(self.azimuth),
            "cutting_wedge",
        )
    }
}

impl Component for CuttingWedge {
    fn to_shape(&self) -> ShapeResult<Shape> {
        if !(self.height > 0.0 && self.radius > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "cutting wedge height and radius must be positive, got {} and {}",
                self.height, self.radius
            )));
        }
        Ok(self.shape())
    }
}

/// Wedge sized from a bounding box that removes everything outside `[0, angle]` degrees
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingWedgeFS {
    wedge: CuttingWedge,
}

impl CuttingWedgeFS {
    pub fn new(bbox: BoundingBox, angle: f64) -> Self {
        let reach = [bbox.min.x, bbox.max.x, bbox.min.y, bbox.max.y]
            .into_iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let height = bbox.min.z.abs().max(bbox.max.z.abs());
        let wedge = CuttingWedge::new(
            2.0 * height + WEDGE_MARGIN,
            2.0 * reach + WEDGE_MARGIN,
            360.0 - angle,
        )
        .with_azimuth(angle);
        Self { wedge }
    }

    pub fn wedge(&self) -> &CuttingWedge {
        &self.wedge
    }

    /// Sizes come from a bounding box so the shape is always valid
    pub fn to_shape(&self) -> Shape {
        self.wedge.shape()
    }
}

fn default_rotation() -> f64 {
    360.0
}

/// Triangular port cut in the poloidal plane and revolved about Z
///
/// The triangle opens from `center_point` towards `polar_placement_angle`
/// (degrees, 0 pointing outboard) over `polar_coverage_angle`. Each copy is
/// centred on its azimuth angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortCutterRotated {
    pub center_point: (f64, f64),
    pub polar_coverage_angle: f64,
    pub polar_placement_angle: f64,
    pub max_distance_from_center: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
    pub azimuth_placement_angles: Vec<f64>,
}

impl PortCutterRotated {
    pub fn new(
        center_point: (f64, f64),
        polar_coverage_angle: f64,
        polar_placement_angle: f64,
        max_distance_from_center: f64,
    ) -> Self {
        Self {
            center_point,
            polar_coverage_angle,
            polar_placement_angle,
            max_distance_from_center,
            rotation_angle: 360.0,
            azimuth_placement_angles: vec![0.0],
        }
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    pub fn with_azimuth_placement_angles(mut self, angles: Vec<f64>) -> Self {
        self.azimuth_placement_angles = angles;
        self
    }

    fn outline(&self) -> Vec<DVec2> {
        let center = DVec2::new(self.center_point.0, self.center_point.1);
        let half = self.polar_coverage_angle / 2.0;
        let edge = |angle: f64| {
            center + DVec2::from_angle(angle.to_radians()) * self.max_distance_from_center
        };
        clip_to_positive_radius(&[
            center,
            edge(self.polar_placement_angle - half),
            edge(self.polar_placement_angle + half),
        ])
    }
}

impl Component for PortCutterRotated {
    fn to_shape(&self) -> ShapeResult<Shape> {
        if !(self.polar_coverage_angle > 0.0 && self.polar_coverage_angle < 180.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "polar coverage angle must be in (0, 180), got {}",
                self.polar_coverage_angle
            )));
        }
        if !(self.max_distance_from_center > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "port distance from center must be positive, got {}",
                self.max_distance_from_center
            )));
        }
        let points: Vec<(f64, f64)> = self.outline().iter().map(|p| (p.x, p.y)).collect();
        if points.len() < 3 {
            return Err(ShapeError::InvalidPoints(
                "port cutter lies entirely across the axis".to_string(),
            ));
        }
        let offset = self.rotation_angle / 2.0;
        let azimuths: Vec<f64> = self
            .azimuth_placement_angles
            .iter()
            .map(|a| a - offset)
            .collect();
        Ok(cutter(
            Shape::rotate_straight(&points, self.rotation_angle)
                .with_azimuth(AzimuthPlacement::Multiple(azimuths)),
            "port_cutter",
        ))
    }
}

/// Straight port extruded radially outwards from `start_radius`
///
/// Cross-sections lie on the ZY plane; `center_point` is the (height,
/// toroidal offset) of the port centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortCutterRectangular {
    pub height: f64,
    pub width: f64,
    pub distance: f64,
    #[serde(default)]
    pub center_point: (f64, f64),
    #[serde(default)]
    pub start_radius: f64,
    pub azimuth_placement_angles: Vec<f64>,
}

/// Circular counterpart of [`PortCutterRectangular`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortCutterCircular {
    pub radius: f64,
    pub distance: f64,
    #[serde(default)]
    pub center_point: (f64, f64),
    #[serde(default)]
    pub start_radius: f64,
    pub azimuth_placement_angles: Vec<f64>,
}

/// Place a ZY cross-section between `start` and `start + distance` along X
fn radial_port(shape: Shape, start: f64, distance: f64, azimuths: &[f64]) -> ShapeResult<Shape> {
    if !(distance > 0.0 && start >= 0.0) {
        return Err(ShapeError::InvalidParameter(format!(
            "port needs a positive distance and non-negative start radius, got {} and {}",
            distance, start
        )));
    }
    Ok(cutter(
        shape
            .with_workplane(Workplane::ZY)
            .with_extent(Extent::From {
                offset: -start,
                distance: -distance,
            })
            .with_azimuth(AzimuthPlacement::Multiple(azimuths.to_vec())),
        "port_cutter",
    ))
}

impl PortCutterRectangular {
    pub fn new(height: f64, width: f64, distance: f64) -> Self {
        Self {
            height,
            width,
            distance,
            center_point: (0.0, 0.0),
            start_radius: 0.0,
            azimuth_placement_angles: vec![0.0],
        }
    }

    pub fn with_start_radius(mut self, radius: f64) -> Self {
        self.start_radius = radius;
        self
    }

    pub fn with_center_point(mut self, center_point: (f64, f64)) -> Self {
        self.center_point = center_point;
        self
    }

    pub fn with_azimuth_placement_angles(mut self, angles: Vec<f64>) -> Self {
        self.azimuth_placement_angles = angles;
        self
    }
}

impl Component for PortCutterRectangular {
    fn to_shape(&self) -> ShapeResult<Shape> {
        if !(self.height > 0.0 && self.width > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "port height and width must be positive, got {} and {}",
                self.height, self.width
            )));
        }
        let center = DVec2::new(self.center_point.0, self.center_point.1);
        let half = DVec2::new(self.height, self.width) / 2.0;
        let outline = rectangle(center - half, center + half);
        radial_port(
            Shape::extrude_straight(&outline, self.distance),
            self.start_radius,
            self.distance,
            &self.azimuth_placement_angles,
        )
    }
}

impl PortCutterCircular {
    pub fn new(radius: f64, distance: f64) -> Self {
        Self {
            radius,
            distance,
            center_point: (0.0, 0.0),
            start_radius: 0.0,
            azimuth_placement_angles: vec![0.0],
        }
    }

    pub fn with_start_radius(mut self, radius: f64) -> Self {
        self.start_radius = radius;
        self
    }

    pub fn with_center_point(mut self, center_point: (f64, f64)) -> Self {
        self.center_point = center_point;
        self
    }

    pub fn with_azimuth_placement_angles(mut self, angles: Vec<f64>) -> Self {
        self.azimuth_placement_angles = angles;
        self
    }
}

impl Component for PortCutterCircular {
    fn to_shape(&self) -> ShapeResult<Shape> {
        radial_port(
            Shape::extrude_circle(self.center_point, self.radius, self.distance),
            self.start_radius,
            self.distance,
            &self.azimuth_placement_angles,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;
    use pk_cad::{CadKernel, CsgKernel};
    use std::f64::consts::PI;

    #[test]
    fn test_cutting_wedge() {
        let kernel = CsgKernel::default();
        let wedge = CuttingWedge::new(100.0, 100.0, 90.0).with_azimuth(90.0);
        let expected = PI * 100.0 * 100.0 * 100.0 / 4.0;
        assert_relative_eq!(wedge.volume(&kernel).unwrap(), expected, max_relative = 1e-9);

        let solid = wedge.solid(&kernel).unwrap();
        assert!(kernel.contains(&solid, DVec3::new(-20.0, 20.0, 0.0)));
        assert!(!kernel.contains(&solid, DVec3::new(20.0, 20.0, 0.0)));
    }

    #[test]
    fn test_full_size_wedge_covers_the_rest_of_the_turn() {
        let kernel = CsgKernel::default();
        let bbox = BoundingBox::new(DVec3::new(-50.0, -80.0, -30.0), DVec3::new(60.0, 40.0, 10.0));
        let fs = CuttingWedgeFS::new(bbox, 90.0);
        assert_relative_eq!(fs.wedge().rotation_angle, 270.0);
        assert_relative_eq!(fs.wedge().azimuth, 90.0);
        assert!(fs.wedge().radius > 160.0);
        assert!(fs.wedge().height > 60.0);

        let solid = fs.to_shape().solid(&kernel).unwrap();
        assert!(kernel.contains(&solid, DVec3::new(-40.0, 5.0, 0.0)));
        assert!(kernel.contains(&solid, DVec3::new(30.0, -70.0, -25.0)));
        assert!(!kernel.contains(&solid, DVec3::new(30.0, 30.0, 5.0)));
    }

    #[test]
    fn test_rotated_port() {
        let kernel = CsgKernel::default();
        let port = PortCutterRotated::new((400.0, 0.0), 20.0, 0.0, 300.0)
            .with_rotation_angle(10.0)
            .with_azimuth_placement_angles(vec![0.0, 180.0]);
        let solid = port.solid(&kernel).unwrap();
        assert!(kernel.contains(&solid, DVec3::new(500.0, 0.0, 0.0)));
        assert!(kernel.contains(&solid, DVec3::new(-500.0, 0.0, 0.0)));
        assert!(!kernel.contains(&solid, DVec3::new(0.0, 500.0, 0.0)));
    }

    #[test]
    fn test_rotated_port_across_the_axis_is_clipped() {
        let kernel = CsgKernel::default();
        let port = PortCutterRotated::new((50.0, 0.0), 20.0, 180.0, 300.0);
        let bbox = kernel.bounding_box(&port.solid(&kernel).unwrap());
        assert!(bbox.max.x <= 50.0 + 1e-6);
        assert!(port.volume(&kernel).unwrap() > 0.0);
    }

    #[test]
    fn test_rectangular_port() {
        let kernel = CsgKernel::default();
        let port = PortCutterRectangular::new(100.0, 50.0, 300.0).with_start_radius(200.0);
        assert_relative_eq!(
            port.volume(&kernel).unwrap(),
            100.0 * 50.0 * 300.0,
            max_relative = 1e-9
        );
        let bbox = kernel.bounding_box(&port.solid(&kernel).unwrap());
        assert_relative_eq!(bbox.min.x, 200.0, epsilon = 1e-6);
        assert_relative_eq!(bbox.max.x, 500.0, epsilon = 1e-6);
        assert_relative_eq!(bbox.max.z, 50.0, epsilon = 1e-6);
        assert_relative_eq!(bbox.max.y, 25.0, epsilon = 1e-6);

        let turned = port.with_azimuth_placement_angles(vec![90.0]);
        let bbox = kernel.bounding_box(&turned.solid(&kernel).unwrap());
        assert_relative_eq!(bbox.min.y, 200.0, epsilon = 1e-6);
    }

    #[test]
    fn test_circular_port() {
        let kernel = CsgKernel::default();
        let port = PortCutterCircular::new(20.0, 100.0)
            .with_start_radius(300.0)
            .with_azimuth_placement_angles(vec![0.0, 120.0, 240.0]);
        let volume = port.volume(&kernel).unwrap();
        assert_relative_eq!(volume, 3.0 * PI * 400.0 * 100.0, max_relative = 1e-2);
        let solid = port.solid(&kernel).unwrap();
        assert!(kernel.contains(&solid, DVec3::new(350.0, 0.0, 0.0)));
        assert!(!kernel.contains(&solid, DVec3::new(250.0, 0.0, 0.0)));
    }
}
