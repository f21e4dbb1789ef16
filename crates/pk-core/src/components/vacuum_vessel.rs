//! Cylindrical vacuum vessel

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{Component, rectangle};
use crate::constants::VESSEL_COLOR;
use crate::shape::{Shape, ShapeError, ShapeResult};

/// Closed cylindrical vessel with walls and lids of one thickness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacuumVessel {
    /// Outer height, centred on the midplane
    pub height: f64,
    pub inner_radius: f64,
    pub thickness: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

fn default_rotation() -> f64 {
    360.0
}

impl VacuumVessel {
    pub fn new(height: f64, inner_radius: f64, thickness: f64) -> Self {
        Self {
            height,
            inner_radius,
            thickness,
            rotation_angle: 360.0,
        }
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }
}

impl Component for VacuumVessel {
    fn to_shape(&self) -> ShapeResult<Shape> {
        if !(self.thickness > 0.0 && self.inner_radius > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "vessel radius and thickness must be positive, got {} and {}",
                self.inner_radius, self.thickness
            )));
        }
        let h = self.height / 2.0;
        if !(h > self.thickness) {
            return Err(ShapeError::InvalidParameter(format!(
                "vessel height {} leaves no room inside lids of thickness {}",
                self.height, self.thickness
            )));
        }
        let outer = rectangle(
            DVec2::new(0.0, -h),
            DVec2::new(self.inner_radius + self.thickness, h),
        );
        let inner = rectangle(
            DVec2::new(0.0, -(h - self.thickness)),
            DVec2::new(self.inner_radius, h - self.thickness),
        );
        Ok(Shape::rotate_straight(&outer, self.rotation_angle)
            .with_cut(Shape::rotate_straight(&inner, self.rotation_angle))
            .with_name("vacuum_vessel")
            .with_color(VESSEL_COLOR)
            .with_material_tag("vacuum_vessel_mat")
            .with_stp_filename("vacuum_vessel.stp")
            .with_stl_filename("vacuum_vessel.stl"))
    }
}
