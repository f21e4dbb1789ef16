//! Poloidal field coils and their casings

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{Component, rectangle};
use crate::constants::{COIL_CASE_COLOR, COIL_COLOR};
use crate::shape::{Shape, ShapeError, ShapeResult};

fn default_rotation() -> f64 {
    360.0
}

/// Rectangular coil cross-section revolved about the Z axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoloidalFieldCoil {
    pub height: f64,
    pub width: f64,
    /// Cross-section centre (radius, height)
    pub center_point: (f64, f64),
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl PoloidalFieldCoil {
    pub fn new(height: f64, width: f64, center_point: (f64, f64)) -> Self {
        Self {
            height,
            width,
            center_point,
            rotation_angle: 360.0,
        }
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    fn validate(&self) -> ShapeResult<()> {
        if !(self.height > 0.0 && self.width > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "coil height and width must be positive, got {} x {}",
                self.height, self.width
            )));
        }
        if self.center_point.0 - self.width / 2.0 < 0.0 {
            return Err(ShapeError::InvalidParameter(format!(
                "coil centred at radius {} with width {} crosses the axis",
                self.center_point.0, self.width
            )));
        }
        Ok(())
    }

    /// Corners of the cross-section grown by `margin` on every side
    fn bounds(&self, margin: f64) -> (DVec2, DVec2) {
        let center = DVec2::new(self.center_point.0, self.center_point.1);
        let half = DVec2::new(self.width, self.height) / 2.0 + margin;
        (center - half, center + half)
    }
}

impl Component for PoloidalFieldCoil {
    fn to_shape(&self) -> ShapeResult<Shape> {
        self.validate()?;
        let (min, max) = self.bounds(0.0);
        Ok(Shape::rotate_straight(&rectangle(min, max), self.rotation_angle)
            .with_name("pf_coil")
            .with_color(COIL_COLOR)
            .with_material_tag("pf_coil_mat")
            .with_stp_filename("pf_coil.stp")
            .with_stl_filename("pf_coil.stl"))
    }
}

/// Several coils described by parallel lists, built as one shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoloidalFieldCoilSet {
    pub heights: Vec<f64>,
    pub widths: Vec<f64>,
    pub center_points: Vec<(f64, f64)>,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl PoloidalFieldCoilSet {
    pub fn new(heights: Vec<f64>, widths: Vec<f64>, center_points: Vec<(f64, f64)>) -> Self {
        Self {
            heights,
            widths,
            center_points,
            rotation_angle: 360.0,
        }
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    /// The individual coils
    pub fn coils(&self) -> ShapeResult<Vec<PoloidalFieldCoil>> {
        let n = self.center_points.len();
        if n == 0 || self.heights.len() != n || self.widths.len() != n {
            return Err(ShapeError::InvalidParameter(format!(
                "coil set needs equally long, non-empty lists: {} heights, {} widths, {} center points",
                self.heights.len(),
                self.widths.len(),
                n
            )));
        }
        Ok((0..n)
            .map(|i| {
                PoloidalFieldCoil::new(self.heights[i], self.widths[i], self.center_points[i])
                    .with_rotation_angle(self.rotation_angle)
            })
            .collect())
    }
}

impl Component for PoloidalFieldCoilSet {
    fn to_shape(&self) -> ShapeResult<Shape> {
        let mut shapes = self
            .coils()?
            .iter()
            .map(Component::to_shape)
            .collect::<ShapeResult<Vec<_>>>()?
            .into_iter();
        let first = shapes
            .next()
            .ok_or_else(|| ShapeError::InvalidParameter("coil set is empty".to_string()))?;
        Ok(shapes
            .fold(first, Shape::with_union)
            .with_stp_filename("pf_coils.stp")
            .with_stl_filename("pf_coils.stl"))
    }
}

/// Casing of constant thickness around a poloidal field coil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoloidalFieldCoilCase {
    pub coil: PoloidalFieldCoil,
    pub casing_thickness: f64,
}

impl PoloidalFieldCoilCase {
    pub fn new(coil: PoloidalFieldCoil, casing_thickness: f64) -> Self {
        Self {
            coil,
            casing_thickness,
        }
    }
}

impl Component for PoloidalFieldCoilCase {
    fn to_shape(&self) -> ShapeResult<Shape> {
        self.coil.validate()?;
        if !(self.casing_thickness > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "casing thickness must be positive, got {}",
                self.casing_thickness
            )));
        }
        let (outer_min, outer_max) = self.coil.bounds(self.casing_thickness);
        if outer_min.x < 0.0 {
            return Err(ShapeError::InvalidParameter(
                "coil casing crosses the axis".to_string(),
            ));
        }
        let (inner_min, inner_max) = self.coil.bounds(0.0);
        let rotation = self.coil.rotation_angle;
        Ok(
            Shape::rotate_straight(&rectangle(outer_min, outer_max), rotation)
                .with_cut(Shape::rotate_straight(&rectangle(inner_min, inner_max), rotation))
                .with_name("pf_coil_case")
                .with_color(COIL_CASE_COLOR)
                .with_material_tag("pf_coil_case_mat")
                .with_stp_filename("pf_coil_case.stp")
                .with_stl_filename("pf_coil_case.stl"),
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
    fn test_coil_volume() {
        let kernel = CsgKernel::default();
        let coil = PoloidalFieldCoil::new(20.0, 10.0, (100.0, 50.0));
        // Pappus: area 200 at radius 100
        assert_relative_eq!(coil.volume(&kernel).unwrap(), 2.0 * PI * 100.0 * 200.0, max_relative = 1e-9);
    }

    #[test]
    fn test_coil_set() {
        let kernel = CsgKernel::default();
        let set = PoloidalFieldCoilSet::new(
            vec![20.0, 20.0],
            vec![10.0, 10.0],
            vec![(100.0, 50.0), (100.0, -50.0)],
        );
        assert_relative_eq!(
            set.volume(&kernel).unwrap(),
            2.0 * 2.0 * PI * 100.0 * 200.0,
            max_relative = 1e-9
        );

        let mismatched = PoloidalFieldCoilSet::new(vec![20.0], vec![10.0, 10.0], vec![(100.0, 0.0)]);
        assert!(mismatched.to_shape().is_err());
    }

    #[test]
    fn test_case_surrounds_coil() {
        let kernel = CsgKernel::default();
        let coil = PoloidalFieldCoil::new(20.0, 10.0, (100.0, 0.0));
        let case = PoloidalFieldCoilCase::new(coil, 5.0);
        // outer 20 x 30 minus inner 10 x 20, all centred at radius 100
        let expected = 2.0 * PI * 100.0 * (600.0 - 200.0);
        assert_relative_eq!(case.volume(&kernel).unwrap(), expected, max_relative = 1e-2);

        let solid = case.solid(&kernel).unwrap();
        assert!(!kernel.contains(&solid, DVec3::new(100.0, 0.0, 0.0)));
        assert!(kernel.contains(&solid, DVec3::new(107.0, 0.0, 0.0)));
    }
}
