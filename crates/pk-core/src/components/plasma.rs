//! Plasma boundary

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::Component;
use crate::constants::{DEFAULT_PLASMA_POINTS, PLASMA_COLOR};
use crate::shape::{Connection, ProfilePoint, Shape, ShapeError, ShapeResult};

/// Magnetic configuration of the plasma edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlasmaConfiguration {
    #[default]
    NonNull,
    SingleNull,
    DoubleNull,
}

/// Plasma with a shaped (elongated, triangular) boundary
///
/// The boundary is `R = R0 + a·cos(θ + asin(δ)·sin θ)`, `Z = κ·a·sin θ + dz`,
/// with θ measured from the outboard midplane towards the top. It passes
/// through the high point `(R0 − δ·a, κ·a)` at θ = π/2 and the low point at
/// θ = −π/2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plasma {
    pub major_radius: f64,
    pub minor_radius: f64,
    pub elongation: f64,
    pub triangularity: f64,
    #[serde(default)]
    pub vertical_displacement: f64,
    /// Relative distance of the x-points beyond the boundary extremes
    #[serde(default = "default_x_point_shift")]
    pub x_point_shift: f64,
    #[serde(default)]
    pub configuration: PlasmaConfiguration,
    #[serde(default = "default_num_points")]
    pub num_points: usize,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

fn default_x_point_shift() -> f64 {
    0.1
}

fn default_num_points() -> usize {
    DEFAULT_PLASMA_POINTS
}

fn default_rotation() -> f64 {
    360.0
}

impl Plasma {
    pub fn new(major_radius: f64, minor_radius: f64, elongation: f64, triangularity: f64) -> Self {
        Self {
            major_radius,
            minor_radius,
            elongation,
            triangularity,
            vertical_displacement: 0.0,
            x_point_shift: default_x_point_shift(),
            configuration: PlasmaConfiguration::NonNull,
            num_points: DEFAULT_PLASMA_POINTS,
            rotation_angle: 360.0,
        }
    }

    pub fn with_vertical_displacement(mut self, dz: f64) -> Self {
        self.vertical_displacement = dz;
        self
    }

    pub fn with_configuration(mut self, configuration: PlasmaConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_x_point_shift(mut self, shift: f64) -> Self {
        self.x_point_shift = shift;
        self
    }

    pub fn with_num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    pub fn validate(&self) -> ShapeResult<()> {
        if !(self.minor_radius > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "plasma minor radius must be positive, got {}",
                self.minor_radius
            )));
        }
        if !(self.major_radius > self.minor_radius) {
            return Err(ShapeError::InvalidParameter(format!(
                "plasma major radius {} must exceed the minor radius {}",
                self.major_radius, self.minor_radius
            )));
        }
        if !(self.elongation > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "plasma elongation must be positive, got {}",
                self.elongation
            )));
        }
        if !(-1.0..=1.0).contains(&self.triangularity) {
            return Err(ShapeError::InvalidParameter(format!(
                "plasma triangularity must be within [-1, 1], got {}",
                self.triangularity
            )));
        }
        if self.num_points < 3 {
            return Err(ShapeError::InvalidParameter(format!(
                "plasma needs at least 3 boundary points, got {}",
                self.num_points
            )));
        }
        Ok(())
    }

    /// Boundary point at poloidal angle `theta` (radians)
    pub fn boundary_point(&self, theta: f64) -> DVec2 {
        let (a, s) = (self.minor_radius, self.triangularity.asin());
        DVec2::new(
            self.major_radius + a * (theta + s * theta.sin()).cos(),
            self.elongation * a * theta.sin() + self.vertical_displacement,
        )
    }

    /// Unit normal pointing out of the plasma at poloidal angle `theta`
    pub fn boundary_normal(&self, theta: f64) -> DVec2 {
        let (a, s) = (self.minor_radius, self.triangularity.asin());
        let dr = -a * (theta + s * theta.sin()).sin() * (1.0 + s * theta.cos());
        let dz = self.elongation * a * theta.cos();
        DVec2::new(dz, -dr).normalize_or_zero()
    }

    /// `num_points` boundary points, counter-clockwise from the outboard midplane
    pub fn outline(&self) -> Vec<DVec2> {
        (0..self.num_points)
            .map(|i| self.boundary_point(TAU * i as f64 / self.num_points as f64))
            .collect()
    }

    pub fn high_point(&self) -> DVec2 {
        DVec2::new(
            self.major_radius - self.triangularity * self.minor_radius,
            self.elongation * self.minor_radius + self.vertical_displacement,
        )
    }

    pub fn low_point(&self) -> DVec2 {
        DVec2::new(
            self.major_radius - self.triangularity * self.minor_radius,
            -self.elongation * self.minor_radius + self.vertical_displacement,
        )
    }

    pub fn inner_equatorial_point(&self) -> DVec2 {
        DVec2::new(self.major_radius - self.minor_radius, self.vertical_displacement)
    }

    pub fn outer_equatorial_point(&self) -> DVec2 {
        DVec2::new(self.major_radius + self.minor_radius, self.vertical_displacement)
    }

    pub fn upper_x_point(&self) -> DVec2 {
        let shift = 1.0 + self.x_point_shift;
        DVec2::new(
            self.major_radius - shift * self.triangularity * self.minor_radius,
            shift * self.elongation * self.minor_radius + self.vertical_displacement,
        )
    }

    pub fn lower_x_point(&self) -> DVec2 {
        let shift = 1.0 + self.x_point_shift;
        DVec2::new(
            self.major_radius - shift * self.triangularity * self.minor_radius,
            -shift * self.elongation * self.minor_radius + self.vertical_displacement,
        )
    }

    /// Outline points with x-points inserted as sharp corners
    pub fn profile_points(&self) -> Vec<ProfilePoint> {
        let mut points: Vec<ProfilePoint> = self
            .outline()
            .into_iter()
            .map(|p| ProfilePoint::spline(p.x, p.y))
            .collect();
        let x_points = match self.configuration {
            PlasmaConfiguration::NonNull => vec![],
            PlasmaConfiguration::SingleNull => vec![(self.lower_x_point(), 3.0 * FRAC_PI_2)],
            PlasmaConfiguration::DoubleNull => vec![
                (self.upper_x_point(), FRAC_PI_2),
                (self.lower_x_point(), 3.0 * FRAC_PI_2),
            ],
        };
        for (x_point, theta) in x_points {
            // replace the sample nearest the x-point's poloidal angle
            let step = TAU / self.num_points as f64;
            let nearest = ((theta / step).round() as usize) % self.num_points;
            let prev = (nearest + self.num_points - 1) % self.num_points;
            points[nearest] = ProfilePoint::new(x_point.x, x_point.y, Connection::Straight);
            points[prev].connection = Connection::Straight;
        }
        points
    }
}

impl Component for Plasma {
    fn to_shape(&self) -> ShapeResult<Shape> {
        self.validate()?;
        Ok(Shape::rotate_mixed(self.profile_points(), self.rotation_angle)
            .with_name("plasma")
            .with_color(PLASMA_COLOR)
            .with_material_tag("DT_plasma")
            .with_stp_filename("plasma.stp")
            .with_stl_filename("plasma.stl"))
    }
}

/// Plasma defined by its inner and outer equatorial radii and its top point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasmaFromPoints {
    pub outer_equatorial_x_point: f64,
    pub inner_equatorial_x_point: f64,
    pub high_point: (f64, f64),
    #[serde(default)]
    pub configuration: PlasmaConfiguration,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl PlasmaFromPoints {
    pub fn new(outer_equatorial_x_point: f64, inner_equatorial_x_point: f64, high_point: (f64, f64)) -> Self {
        Self {
            outer_equatorial_x_point,
            inner_equatorial_x_point,
            high_point,
            configuration: PlasmaConfiguration::NonNull,
            rotation_angle: 360.0,
        }
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    /// Equivalent shaped plasma
    pub fn plasma(&self) -> ShapeResult<Plasma> {
        if !(self.outer_equatorial_x_point > self.inner_equatorial_x_point) {
            return Err(ShapeError::InvalidParameter(format!(
                "outer equatorial point {} must lie outside the inner one {}",
                self.outer_equatorial_x_point, self.inner_equatorial_x_point
            )));
        }
        let major = (self.outer_equatorial_x_point + self.inner_equatorial_x_point) / 2.0;
        let minor = major - self.inner_equatorial_x_point;
        let elongation = self.high_point.1 / minor;
        let triangularity = (major - self.high_point.0) / minor;
        let plasma = Plasma::new(major, minor, elongation, triangularity)
            .with_configuration(self.configuration)
            .with_rotation_angle(self.rotation_angle);
        plasma.validate()?;
        Ok(plasma)
    }
}

impl Component for PlasmaFromPoints {
    fn to_shape(&self) -> ShapeResult<Shape> {
        self.plasma()?.to_shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pk_cad::{CadKernel, CsgKernel};
    use std::f64::consts::PI;

    fn iter_like() -> Plasma {
        Plasma::new(450.0, 150.0, 2.0, 0.55)
    }

    #[test]
    fn test_derived_points() {
        let plasma = iter_like();
        assert_eq!(plasma.inner_equatorial_point(), DVec2::new(300.0, 0.0));
        assert_eq!(plasma.outer_equatorial_point(), DVec2::new(600.0, 0.0));
        let high = plasma.high_point();
        assert_relative_eq!(high.x, 450.0 - 0.55 * 150.0, epsilon = 1e-9);
        assert_relative_eq!(high.y, 300.0, epsilon = 1e-9);
        // the boundary passes through the high and low points
        let top = plasma.boundary_point(FRAC_PI_2);
        assert_relative_eq!(top.x, high.x, epsilon = 1e-9);
        assert_relative_eq!(top.y, high.y, epsilon = 1e-9);
        let bottom = plasma.boundary_point(-FRAC_PI_2);
        assert_relative_eq!(bottom.x, plasma.low_point().x, epsilon = 1e-9);
        assert_relative_eq!(bottom.y, plasma.low_point().y, epsilon = 1e-9);
        assert!(plasma.lower_x_point().y < plasma.low_point().y);
    }

    #[test]
    fn test_normals_point_outwards() {
        let plasma = iter_like();
        assert_relative_eq!(plasma.boundary_normal(0.0).x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(plasma.boundary_normal(PI).x, -1.0, epsilon = 1e-9);
        assert!(plasma.boundary_normal(FRAC_PI_2).y > 0.99);
    }

    #[test]
    fn test_plasma_volume() {
        let kernel = CsgKernel::default();
        // circular cross-section: torus volume 2π²Ra²
        let plasma = Plasma::new(300.0, 100.0, 1.0, 0.0).with_num_points(200);
        let volume = plasma.volume(&kernel).unwrap();
        let expected = 2.0 * PI * PI * 300.0 * 100.0 * 100.0;
        assert_relative_eq!(volume, expected, max_relative = 1e-3);
    }

    #[test]
    fn test_single_null_reaches_x_point() {
        let kernel = CsgKernel::default();
        let plasma = iter_like().with_configuration(PlasmaConfiguration::SingleNull);
        let bbox = kernel.bounding_box(&plasma.solid(&kernel).unwrap());
        assert_relative_eq!(bbox.min.z, plasma.lower_x_point().y, epsilon = 1e-6);
        assert!(bbox.max.z < plasma.upper_x_point().y);
    }

    #[test]
    fn test_from_points() {
        let plasma = PlasmaFromPoints::new(450.0, 250.0, (300.0, 150.0))
            .plasma()
            .unwrap();
        assert_relative_eq!(plasma.major_radius, 350.0);
        assert_relative_eq!(plasma.minor_radius, 100.0);
        assert_relative_eq!(plasma.elongation, 1.5);
        assert_relative_eq!(plasma.triangularity, 0.5);
        assert_relative_eq!(plasma.high_point().x, 300.0, epsilon = 1e-9);
        let top = plasma.boundary_point(FRAC_PI_2);
        assert_relative_eq!(top.x, 300.0, epsilon = 1e-9);
        assert_relative_eq!(top.y, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_plasma() {
        assert!(Plasma::new(100.0, 150.0, 2.0, 0.5).validate().is_err());
        assert!(Plasma::new(450.0, 150.0, 2.0, 1.5).validate().is_err());
    }
}
