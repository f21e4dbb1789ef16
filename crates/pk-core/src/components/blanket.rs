//! Breeder blankets

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{Component, Distribution, Plasma, clip_to_positive_radius};
use crate::constants::{BLANKET_COLOR, DEFAULT_BLANKET_POINTS};
use crate::shape::{Connection, ProfilePoint, Shape, ShapeError, ShapeResult};

/// Blanket following the plasma boundary between two poloidal angles
///
/// Angles are in degrees, 0 at the outboard midplane and increasing towards
/// the top. The offset from the plasma and the thickness may vary linearly
/// along the poloidal range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlanketFP {
    pub plasma: Plasma,
    pub thickness: Distribution,
    pub offset_from_plasma: Distribution,
    pub start_angle: f64,
    pub stop_angle: f64,
    #[serde(default = "default_points")]
    pub num_points: usize,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

fn default_points() -> usize {
    DEFAULT_BLANKET_POINTS
}

fn default_rotation() -> f64 {
    360.0
}

impl BlanketFP {
    pub fn new(
        plasma: Plasma,
        thickness: impl Into<Distribution>,
        start_angle: f64,
        stop_angle: f64,
    ) -> Self {
        Self {
            plasma,
            thickness: thickness.into(),
            offset_from_plasma: Distribution::Constant(0.0),
            start_angle,
            stop_angle,
            num_points: DEFAULT_BLANKET_POINTS,
            rotation_angle: 360.0,
        }
    }

    pub fn with_offset(mut self, offset: impl Into<Distribution>) -> Self {
        self.offset_from_plasma = offset.into();
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
        self.plasma.validate()?;
        self.thickness.validate("blanket thickness")?;
        self.offset_from_plasma.validate("blanket offset from plasma")?;
        if !(self.thickness.min() > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "blanket thickness must be positive, got minimum {}",
                self.thickness.min()
            )));
        }
        if self.start_angle == self.stop_angle {
            return Err(ShapeError::InvalidParameter(format!(
                "blanket start and stop angles are both {}",
                self.start_angle
            )));
        }
        if self.num_points < 2 {
            return Err(ShapeError::InvalidParameter(format!(
                "blanket needs at least 2 points per surface, got {}",
                self.num_points
            )));
        }
        Ok(())
    }

    /// Plasma-facing and rear surfaces, both ordered from start to stop angle
    pub fn surfaces(&self) -> (Vec<DVec2>, Vec<DVec2>) {
        let last = (self.num_points - 1).max(1) as f64;
        (0..self.num_points)
            .map(|i| {
                let fraction = i as f64 / last;
                let theta = (self.start_angle + (self.stop_angle - self.start_angle) * fraction)
                    .to_radians();
                let p = self.plasma.boundary_point(theta);
                let n = self.plasma.boundary_normal(theta);
                let offset = self.offset_from_plasma.value_at(fraction);
                let thickness = self.thickness.value_at(fraction);
                (p + n * offset, p + n * (offset + thickness))
            })
            .unzip()
    }
}

impl Component for BlanketFP {
    fn to_shape(&self) -> ShapeResult<Shape> {
        self.validate()?;
        let (inner, outer) = self.surfaces();
        let mut loop_points: Vec<DVec2> = inner.clone();
        loop_points.extend(outer.iter().rev());

        let points = if loop_points.iter().any(|p| p.x < 0.0) {
            // surfaces pushed across the axis are trimmed there
            clip_to_positive_radius(&loop_points)
                .into_iter()
                .map(|p| ProfilePoint::straight(p.x, p.y))
                .collect()
        } else {
            let n = inner.len();
            loop_points
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let connection = if i == n - 1 || i == 2 * n - 1 {
                        Connection::Straight
                    } else {
                        Connection::Spline
                    };
                    ProfilePoint::new(p.x, p.y, connection)
                })
                .collect()
        };

        Ok(Shape::rotate_mixed(points, self.rotation_angle)
            .with_name("blanket")
            .with_color(BLANKET_COLOR)
            .with_material_tag("blanket_mat")
            .with_stp_filename("blanket.stp")
            .with_stl_filename("blanket.stl"))
    }
}

/// Blanket bounded by a three-point arc and its copy offset horizontally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlanketConstantThicknessArcH {
    pub inner_lower_point: (f64, f64),
    pub inner_mid_point: (f64, f64),
    pub inner_upper_point: (f64, f64),
    pub thickness: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

/// Blanket bounded by a three-point arc and its copy offset vertically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlanketConstantThicknessArcV {
    pub inner_lower_point: (f64, f64),
    pub inner_mid_point: (f64, f64),
    pub inner_upper_point: (f64, f64),
    pub thickness: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl BlanketConstantThicknessArcH {
    pub fn new(lower: (f64, f64), mid: (f64, f64), upper: (f64, f64), thickness: f64) -> Self {
        Self {
            inner_lower_point: lower,
            inner_mid_point: mid,
            inner_upper_point: upper,
            thickness,
            rotation_angle: 360.0,
        }
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }
}

impl BlanketConstantThicknessArcV {
    pub fn new(lower: (f64, f64), mid: (f64, f64), upper: (f64, f64), thickness: f64) -> Self {
        Self {
            inner_lower_point: lower,
            inner_mid_point: mid,
            inner_upper_point: upper,
            thickness,
            rotation_angle: 360.0,
        }
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }
}

fn arc_blanket(
    arc: [(f64, f64); 3],
    offset: DVec2,
    thickness: f64,
    rotation_angle: f64,
) -> ShapeResult<Shape> {
    if !(thickness > 0.0) {
        return Err(ShapeError::InvalidParameter(format!(
            "blanket thickness must be positive, got {}",
            thickness
        )));
    }
    let [lower, mid, upper] = arc.map(|(x, y)| DVec2::new(x, y));
    let points = vec![
        ProfilePoint::circle(lower.x, lower.y),
        ProfilePoint::circle(mid.x, mid.y),
        ProfilePoint::straight(upper.x, upper.y),
        ProfilePoint::circle(upper.x + offset.x, upper.y + offset.y),
        ProfilePoint::circle(mid.x + offset.x, mid.y + offset.y),
        ProfilePoint::straight(lower.x + offset.x, lower.y + offset.y),
    ];
    Ok(Shape::rotate_mixed(points, rotation_angle)
        .with_name("blanket")
        .with_color(BLANKET_COLOR)
        .with_material_tag("blanket_mat")
        .with_stl_filename("blanket.stl"))
}

impl Component for BlanketConstantThicknessArcH {
    fn to_shape(&self) -> ShapeResult<Shape> {
        arc_blanket(
            [self.inner_lower_point, self.inner_mid_point, self.inner_upper_point],
            DVec2::new(self.thickness, 0.0),
            self.thickness,
            self.rotation_angle,
        )
    }
}

impl Component for BlanketConstantThicknessArcV {
    fn to_shape(&self) -> ShapeResult<Shape> {
        arc_blanket(
            [self.inner_lower_point, self.inner_mid_point, self.inner_upper_point],
            DVec2::new(0.0, self.thickness),
            self.thickness,
            self.rotation_angle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pk_cad::{CadKernel, CsgKernel};
    use std::f64::consts::PI;

    fn circular_plasma() -> Plasma {
        Plasma::new(400.0, 100.0, 1.0, 0.0)
    }

    #[test]
    fn test_full_shell_volume() {
        let kernel = CsgKernel::default();
        // a complete constant-thickness shell around a circular plasma is a torus shell
        let blanket = BlanketFP::new(circular_plasma(), 20.0, 0.0, 360.0)
            .with_offset(10.0)
            .with_num_points(120);
        let volume = blanket.volume(&kernel).unwrap();
        let expected = 2.0 * PI * PI * 400.0 * (130.0_f64.powi(2) - 110.0_f64.powi(2));
        assert_relative_eq!(volume, expected, max_relative = 5e-3);
    }

    #[test]
    fn test_varying_offset() {
        let blanket = BlanketFP::new(circular_plasma(), 10.0, -90.0, 90.0)
            .with_offset(vec![0.0, 50.0])
            .with_num_points(11);
        let (inner, outer) = blanket.surfaces();
        // θ = -90 at the bottom, θ = 90 at the top with 50 of offset
        assert_relative_eq!(inner[0].y, -100.0, epsilon = 1e-9);
        assert_relative_eq!(inner[10].y, 150.0, epsilon = 1e-9);
        assert_relative_eq!(outer[10].y, 160.0, epsilon = 1e-9);
    }

    #[test]
    fn test_surfaces_crossing_the_axis_are_clipped() {
        let kernel = CsgKernel::default();
        let blanket = BlanketFP::new(circular_plasma(), 50.0, -179.0, 179.0).with_offset(280.0);
        let bbox = blanket.solid(&kernel).unwrap().bounding_box();
        assert!(bbox.min.z < 0.0);
        assert!(blanket.volume(&kernel).unwrap() > 0.0);
    }

    #[test]
    fn test_invalid_blanket() {
        let blanket = BlanketFP::new(circular_plasma(), 0.0, -90.0, 90.0);
        assert!(blanket.to_shape().is_err());
        let blanket = BlanketFP::new(circular_plasma(), 10.0, 45.0, 45.0);
        assert!(blanket.to_shape().is_err());
    }

    #[test]
    fn test_arc_blankets() {
        let kernel = CsgKernel::default();
        // outboard arc offset radially, upper arc offset vertically
        let h = BlanketConstantThicknessArcH::new((300.0, -200.0), (500.0, 0.0), (300.0, 200.0), 20.0);
        let v = BlanketConstantThicknessArcV::new((300.0, 200.0), (400.0, 250.0), (500.0, 200.0), 20.0);
        assert!(h.volume(&kernel).unwrap() > 0.0);
        assert!(v.volume(&kernel).unwrap() > 0.0);
        let bbox = kernel.bounding_box(&h.solid(&kernel).unwrap());
        assert_relative_eq!(bbox.max.z, 200.0, epsilon = 1e-6);
        let bbox = kernel.bounding_box(&v.solid(&kernel).unwrap());
        assert_relative_eq!(bbox.min.z, 200.0, epsilon = 1e-6);
        assert!(bbox.max.z > 260.0 && bbox.max.z <= 270.0 + 1e-6);
    }

    #[test]
    fn test_arc_offset_along_its_chord_has_no_area() {
        let kernel = CsgKernel::default();
        // a vertical chord shifted vertically sweeps no area
        let v = BlanketConstantThicknessArcV::new((300.0, -200.0), (500.0, 0.0), (300.0, 200.0), 20.0);
        assert!(matches!(
            v.volume(&kernel),
            Err(ShapeError::Cad(pk_cad::CadError::InvalidProfile(_)))
        ));
    }
}
