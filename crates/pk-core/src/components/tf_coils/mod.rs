//! Toroidal field coils

mod inner;
mod princeton_d;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{Component, rectangle};
use crate::constants::COIL_COLOR;
use crate::shape::{AzimuthPlacement, Shape, ShapeError, ShapeResult};

pub use inner::{InnerTfCoilsCircular, InnerTfCoilsFlat};
pub use princeton_d::ToroidalFieldCoilPrincetonD;

fn default_rotation() -> f64 {
    360.0
}

fn default_true() -> bool {
    true
}

/// Shared checks for outboard coil sets
fn check_coil_set(thickness: f64, distance: f64, number_of_coils: usize) -> ShapeResult<()> {
    if !(thickness > 0.0 && distance > 0.0) {
        return Err(ShapeError::InvalidParameter(format!(
            "coil thickness and distance must be positive, got {} and {}",
            thickness, distance
        )));
    }
    if number_of_coils == 0 {
        return Err(ShapeError::InvalidParameter(
            "number of coils must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Extrude an outboard coil outline on XZ, copy it around Z and trim to the sector
fn outboard_coil_shape(
    outline: &[(f64, f64)],
    distance: f64,
    placement: &AzimuthPlacement,
    rotation_angle: f64,
) -> Shape {
    let shape = Shape::extrude_straight(outline, distance).with_azimuth(placement.clone());
    if rotation_angle < 360.0 {
        shape.with_sector_angle(rotation_angle)
    } else {
        shape
    }
}

/// Rectangular picture-frame coils placed evenly around the Z axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToroidalFieldCoilRectangle {
    /// Inner top corner (radius, height)
    pub horizontal_start_point: (f64, f64),
    /// Inner face of the outboard leg at the midplane (radius, height)
    pub vertical_mid_point: (f64, f64),
    pub thickness: f64,
    /// Toroidal extent of each coil
    pub distance: f64,
    pub number_of_coils: usize,
    #[serde(default = "default_true")]
    pub with_inner_leg: bool,
    #[serde(default)]
    pub azimuth_start_angle: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

impl ToroidalFieldCoilRectangle {
    pub fn new(
        horizontal_start_point: (f64, f64),
        vertical_mid_point: (f64, f64),
        thickness: f64,
        distance: f64,
        number_of_coils: usize,
    ) -> Self {
        Self {
            horizontal_start_point,
            vertical_mid_point,
            thickness,
            distance,
            number_of_coils,
            with_inner_leg: true,
            azimuth_start_angle: 0.0,
            rotation_angle: 360.0,
        }
    }

    pub fn with_inner_leg(mut self, with_inner_leg: bool) -> Self {
        self.with_inner_leg = with_inner_leg;
        self
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    pub fn with_azimuth_start_angle(mut self, angle: f64) -> Self {
        self.azimuth_start_angle = angle;
        self
    }

    pub fn azimuth_placement(&self) -> AzimuthPlacement {
        AzimuthPlacement::evenly_spaced(self.number_of_coils, self.azimuth_start_angle)
    }

    /// Outline of the outboard frame, open on the inboard side
    pub fn outline(&self) -> [(f64, f64); 8] {
        let (hx, hz) = self.horizontal_start_point;
        let vx = self.vertical_mid_point.0;
        let t = self.thickness;
        [
            (hx, hz),
            (vx, hz),
            (vx, -hz),
            (hx, -hz),
            (hx, -hz - t),
            (vx + t, -hz - t),
            (vx + t, hz + t),
            (hx, hz + t),
        ]
    }
}

impl Component for ToroidalFieldCoilRectangle {
    fn to_shape(&self) -> ShapeResult<Shape> {
        check_coil_set(self.thickness, self.distance, self.number_of_coils)?;
        let (hx, hz) = self.horizontal_start_point;
        if !(hz > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "coil top height must be above the midplane, got {}",
                hz
            )));
        }
        if !(self.vertical_mid_point.0 > hx) {
            return Err(ShapeError::InvalidParameter(format!(
                "outboard leg radius {} must exceed the start radius {}",
                self.vertical_mid_point.0, hx
            )));
        }

        let placement = self.azimuth_placement();
        let mut shape =
            outboard_coil_shape(&self.outline(), self.distance, &placement, self.rotation_angle);
        if self.with_inner_leg {
            let t = self.thickness;
            let leg = rectangle(DVec2::new(hx - t, -hz - t), DVec2::new(hx, hz + t));
            shape = shape.with_union(outboard_coil_shape(
                &leg,
                self.distance,
                &placement,
                self.rotation_angle,
            ));
        }
        Ok(shape
            .with_name("tf_coil")
            .with_color(COIL_COLOR)
            .with_material_tag("outer_tf_coil_mat")
            .with_stp_filename("tf_coil.stp")
            .with_stl_filename("tf_coil.stl"))
    }
}
