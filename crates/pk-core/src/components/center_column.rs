//! Center column shields

use serde::{Deserialize, Serialize};

use super::Component;
use crate::constants::SHIELD_COLOR;
use crate::shape::{ProfilePoint, Shape, ShapeError, ShapeResult};

fn default_rotation() -> f64 {
    360.0
}

fn shield_shape(points: Vec<ProfilePoint>, rotation_angle: f64) -> Shape {
    Shape::rotate_mixed(points, rotation_angle)
        .with_name("center_column_shield")
        .with_color(SHIELD_COLOR)
        .with_material_tag("center_column_shield_mat")
        .with_stp_filename("center_column_shield.stp")
        .with_stl_filename("center_column_shield.stl")
}

fn check_increasing(values: &[(&str, f64)]) -> ShapeResult<()> {
    if let Some((name, value)) = values.first() {
        if !(*value >= 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "{} must not be negative, got {}",
                name, value
            )));
        }
    }
    for pair in values.windows(2) {
        let ((a_name, a), (b_name, b)) = (pair[0], pair[1]);
        if !(a < b) {
            return Err(ShapeError::InvalidParameter(format!(
                "{} ({}) must be smaller than {} ({})",
                a_name, a, b_name, b
            )));
        }
    }
    Ok(())
}

fn check_heights(height: f64, arc_height: Option<f64>) -> ShapeResult<()> {
    if !(height > 0.0) {
        return Err(ShapeError::InvalidParameter(format!(
            "center column height must be positive, got {}",
            height
        )));
    }
    if let Some(arc_height) = arc_height {
        if !(arc_height > 0.0 && arc_height < height) {
            return Err(ShapeError::InvalidParameter(format!(
                "arc height {} must be positive and smaller than the height {}",
                arc_height, height
            )));
        }
    }
    Ok(())
}

/// Hollow cylinder centred on the midplane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterColumnShieldCylinder {
    pub height: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl CenterColumnShieldCylinder {
    pub fn new(height: f64, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            height,
            inner_radius,
            outer_radius,
            rotation_angle: 360.0,
        }
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }
}

impl Component for CenterColumnShieldCylinder {
    fn to_shape(&self) -> ShapeResult<Shape> {
        check_heights(self.height, None)?;
        check_increasing(&[
            ("inner radius", self.inner_radius),
            ("outer radius", self.outer_radius),
        ])?;
        let h = self.height / 2.0;
        let points = vec![
            ProfilePoint::straight(self.inner_radius, h),
            ProfilePoint::straight(self.outer_radius, h),
            ProfilePoint::straight(self.outer_radius, -h),
            ProfilePoint::straight(self.inner_radius, -h),
        ];
        Ok(shield_shape(points, self.rotation_angle))
    }
}

/// Shield whose outer face curves in to `mid_radius` at the midplane along a spline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterColumnShieldHyperbola {
    pub height: f64,
    pub inner_radius: f64,
    pub mid_radius: f64,
    pub outer_radius: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl CenterColumnShieldHyperbola {
    pub fn new(height: f64, inner_radius: f64, mid_radius: f64, outer_radius: f64) -> Self {
        Self {
            height,
            inner_radius,
            mid_radius,
            outer_radius,
            rotation_angle: 360.0,
        }
    }
}

impl Component for CenterColumnShieldHyperbola {
    fn to_shape(&self) -> ShapeResult<Shape> {
        check_heights(self.height, None)?;
        check_increasing(&[
            ("inner radius", self.inner_radius),
            ("mid radius", self.mid_radius),
            ("outer radius", self.outer_radius),
        ])?;
        let h = self.height / 2.0;
        let points = vec![
            ProfilePoint::straight(self.inner_radius, 0.0),
            ProfilePoint::straight(self.inner_radius, h),
            ProfilePoint::spline(self.outer_radius, h),
            ProfilePoint::spline(self.mid_radius, 0.0),
            ProfilePoint::straight(self.outer_radius, -h),
            ProfilePoint::straight(self.inner_radius, -h),
        ];
        Ok(shield_shape(points, self.rotation_angle))
    }
}

/// Hyperbola shield with straight sections above and below `arc_height`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterColumnShieldFlatTopHyperbola {
    pub height: f64,
    pub arc_height: f64,
    pub inner_radius: f64,
    pub mid_radius: f64,
    pub outer_radius: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl CenterColumnShieldFlatTopHyperbola {
    pub fn new(
        height: f64,
        arc_height: f64,
        inner_radius: f64,
        mid_radius: f64,
        outer_radius: f64,
    ) -> Self {
        Self {
            height,
            arc_height,
            inner_radius,
            mid_radius,
            outer_radius,
            rotation_angle: 360.0,
        }
    }
}

impl Component for CenterColumnShieldFlatTopHyperbola {
    fn to_shape(&self) -> ShapeResult<Shape> {
        check_heights(self.height, Some(self.arc_height))?;
        check_increasing(&[
            ("inner radius", self.inner_radius),
            ("mid radius", self.mid_radius),
            ("outer radius", self.outer_radius),
        ])?;
        let (h, a) = (self.height / 2.0, self.arc_height / 2.0);
        let points = vec![
            ProfilePoint::straight(self.inner_radius, 0.0),
            ProfilePoint::straight(self.inner_radius, h),
            ProfilePoint::straight(self.outer_radius, h),
            ProfilePoint::spline(self.outer_radius, a),
            ProfilePoint::spline(self.mid_radius, 0.0),
            ProfilePoint::straight(self.outer_radius, -a),
            ProfilePoint::straight(self.outer_radius, -h),
            ProfilePoint::straight(self.inner_radius, -h),
        ];
        Ok(shield_shape(points, self.rotation_angle))
    }
}

/// Shield whose outer face is a circular arc through `mid_radius` at the midplane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterColumnShieldCircular {
    pub height: f64,
    pub inner_radius: f64,
    pub mid_radius: f64,
    pub outer_radius: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl CenterColumnShieldCircular {
    pub fn new(height: f64, inner_radius: f64, mid_radius: f64, outer_radius: f64) -> Self {
        Self {
            height,
            inner_radius,
            mid_radius,
            outer_radius,
            rotation_angle: 360.0,
        }
    }
}

impl Component for CenterColumnShieldCircular {
    fn to_shape(&self) -> ShapeResult<Shape> {
        check_heights(self.height, None)?;
        check_increasing(&[
            ("inner radius", self.inner_radius),
            ("mid radius", self.mid_radius),
            ("outer radius", self.outer_radius),
        ])?;
        let h = self.height / 2.0;
        let points = vec![
            ProfilePoint::straight(self.inner_radius, 0.0),
            ProfilePoint::straight(self.inner_radius, h),
            ProfilePoint::circle(self.outer_radius, h),
            ProfilePoint::circle(self.mid_radius, 0.0),
            ProfilePoint::straight(self.outer_radius, -h),
            ProfilePoint::straight(self.inner_radius, -h),
        ];
        Ok(shield_shape(points, self.rotation_angle))
    }
}

/// Circular shield with straight sections above and below `arc_height`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterColumnShieldFlatTopCircular {
    pub height: f64,
    pub arc_height: f64,
    pub inner_radius: f64,
    pub mid_radius: f64,
    pub outer_radius: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl CenterColumnShieldFlatTopCircular {
    pub fn new(
        height: f64,
        arc_height: f64,
        inner_radius: f64,
        mid_radius: f64,
        outer_radius: f64,
    ) -> Self {
        Self {
            height,
            arc_height,
            inner_radius,
            mid_radius,
            outer_radius,
            rotation_angle: 360.0,
        }
    }
}

impl Component for CenterColumnShieldFlatTopCircular {
    fn to_shape(&self) -> ShapeResult<Shape> {
        check_heights(self.height, Some(self.arc_height))?;
        check_increasing(&[
            ("inner radius", self.inner_radius),
            ("mid radius", self.mid_radius),
            ("outer radius", self.outer_radius),
        ])?;
        let (h, a) = (self.height / 2.0, self.arc_height / 2.0);
        let points = vec![
            ProfilePoint::straight(self.inner_radius, 0.0),
            ProfilePoint::straight(self.inner_radius, h),
            ProfilePoint::straight(self.outer_radius, h),
            ProfilePoint::circle(self.outer_radius, a),
            ProfilePoint::circle(self.mid_radius, 0.0),
            ProfilePoint::straight(self.outer_radius, -a),
            ProfilePoint::straight(self.outer_radius, -h),
            ProfilePoint::straight(self.inner_radius, -h),
        ];
        Ok(shield_shape(points, self.rotation_angle))
    }
}
