//! Spherical tokamak with a cylindrical center column and no inboard blanket

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ParametricReactor, ReactorError, ReactorResult, check_positive, check_rotation};
use crate::components::{
    BlanketFP, CenterColumnShieldCylinder, Component, Plasma, PoloidalFieldCoilSet,
    ToroidalFieldCoilRectangle,
};
use crate::constants::{BLANKET_COLOR, COIL_COLOR, DIVERTOR_COLOR};
use crate::shape::Shape;

/// Ball reactor laid out from radial and vertical thicknesses
///
/// The PF coil set is built when its vertical and radial thicknesses and the
/// rear blanket gap are all given; the outboard TF coils additionally need
/// the PF-to-TF gap and both TF thicknesses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallReactor {
    pub inner_bore_radial_thickness: f64,
    pub inboard_tf_leg_radial_thickness: f64,
    pub center_column_shield_radial_thickness: f64,
    pub divertor_radial_thickness: f64,
    pub inner_plasma_gap_radial_thickness: f64,
    pub plasma_radial_thickness: f64,
    pub outer_plasma_gap_radial_thickness: f64,
    pub firstwall_radial_thickness: f64,
    pub blanket_radial_thickness: f64,
    pub blanket_rear_wall_radial_thickness: f64,
    pub elongation: f64,
    pub triangularity: f64,
    pub number_of_tf_coils: usize,
    #[serde(default)]
    pub pf_coil_to_rear_blanket_radial_gap: Option<f64>,
    #[serde(default)]
    pub pf_coil_radial_thicknesses: Option<Vec<f64>>,
    #[serde(default)]
    pub pf_coil_vertical_thicknesses: Option<Vec<f64>>,
    #[serde(default)]
    pub pf_coil_to_tf_coil_radial_gap: Option<f64>,
    #[serde(default)]
    pub outboard_tf_coil_radial_thickness: Option<f64>,
    #[serde(default)]
    pub outboard_tf_coil_poloidal_thickness: Option<f64>,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

fn default_rotation() -> f64 {
    360.0
}

impl Default for BallReactor {
    fn default() -> Self {
        Self {
            inner_bore_radial_thickness: 50.0,
            inboard_tf_leg_radial_thickness: 50.0,
            center_column_shield_radial_thickness: 50.0,
            divertor_radial_thickness: 100.0,
            inner_plasma_gap_radial_thickness: 50.0,
            plasma_radial_thickness: 200.0,
            outer_plasma_gap_radial_thickness: 50.0,
            firstwall_radial_thickness: 50.0,
            blanket_radial_thickness: 100.0,
            blanket_rear_wall_radial_thickness: 50.0,
            elongation: 2.0,
            triangularity: 0.55,
            number_of_tf_coils: 16,
            pf_coil_to_rear_blanket_radial_gap: Some(50.0),
            pf_coil_radial_thicknesses: Some(vec![50.0, 50.0, 50.0, 50.0]),
            pf_coil_vertical_thicknesses: Some(vec![50.0, 50.0, 50.0, 50.0]),
            pf_coil_to_tf_coil_radial_gap: Some(50.0),
            outboard_tf_coil_radial_thickness: Some(50.0),
            outboard_tf_coil_poloidal_thickness: Some(70.0),
            rotation_angle: 180.0,
        }
    }
}

/// Radii where one layer ends and the next starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialBuild {
    pub inboard_tf_coils_start: f64,
    pub inboard_tf_coils_end: f64,
    pub center_column_shield_end: f64,
    pub divertor_end: f64,
    pub firstwall_start: f64,
    pub blanket_start: f64,
    pub blanket_rear_wall_start: f64,
    pub blanket_rear_wall_end: f64,
}

/// Heights above the midplane, from the plasma top outwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalBuild {
    pub plasma_gap: f64,
    pub firstwall_start: f64,
    pub blanket_rear_wall_end: f64,
    pub tf_coil_height: f64,
    pub center_column_shield_height: f64,
}

impl BallReactor {
    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    /// Radius of the plasma's inboard equatorial point
    pub fn inner_equatorial_point(&self) -> f64 {
        self.inner_bore_radial_thickness
            + self.inboard_tf_leg_radial_thickness
            + self.center_column_shield_radial_thickness
            + self.inner_plasma_gap_radial_thickness
    }

    pub fn major_radius(&self) -> f64 {
        self.inner_equatorial_point() + self.plasma_radial_thickness / 2.0
    }

    pub fn minor_radius(&self) -> f64 {
        self.plasma_radial_thickness / 2.0
    }

    pub fn plasma(&self) -> Plasma {
        Plasma::new(
            self.major_radius(),
            self.minor_radius(),
            self.elongation,
            self.triangularity,
        )
        .with_rotation_angle(self.rotation_angle)
    }

    pub fn radial_build(&self) -> RadialBuild {
        let inboard_tf_coils_start = self.inner_bore_radial_thickness;
        let inboard_tf_coils_end = inboard_tf_coils_start + self.inboard_tf_leg_radial_thickness;
        let center_column_shield_end =
            inboard_tf_coils_end + self.center_column_shield_radial_thickness;
        let firstwall_start = center_column_shield_end
            + self.inner_plasma_gap_radial_thickness
            + self.plasma_radial_thickness
            + self.outer_plasma_gap_radial_thickness;
        let blanket_start = firstwall_start + self.firstwall_radial_thickness;
        let blanket_rear_wall_start = blanket_start + self.blanket_radial_thickness;
        RadialBuild {
            inboard_tf_coils_start,
            inboard_tf_coils_end,
            center_column_shield_end,
            divertor_end: center_column_shield_end + self.divertor_radial_thickness,
            firstwall_start,
            blanket_start,
            blanket_rear_wall_start,
            blanket_rear_wall_end: blanket_rear_wall_start
                + self.blanket_rear_wall_radial_thickness,
        }
    }

    pub fn vertical_build(&self) -> VerticalBuild {
        let plasma_gap = self.outer_plasma_gap_radial_thickness;
        let firstwall_start = self.plasma().high_point().y + plasma_gap;
        let blanket_rear_wall_end = firstwall_start
            + self.firstwall_radial_thickness
            + self.blanket_radial_thickness
            + self.blanket_rear_wall_radial_thickness;
        VerticalBuild {
            plasma_gap,
            firstwall_start,
            blanket_rear_wall_end,
            tf_coil_height: blanket_rear_wall_end,
            center_column_shield_height: 2.0 * blanket_rear_wall_end,
        }
    }

    /// Inner and outer radius of the divertor ring
    pub fn divertor_radii(&self) -> DVec2 {
        let radial = self.radial_build();
        DVec2::new(radial.center_column_shield_end, radial.divertor_end)
    }

    fn validate(&self) -> ReactorResult<()> {
        check_positive(&[
            ("inner bore radial thickness", self.inner_bore_radial_thickness),
            ("inboard TF leg radial thickness", self.inboard_tf_leg_radial_thickness),
            (
                "center column shield radial thickness",
                self.center_column_shield_radial_thickness,
            ),
            ("divertor radial thickness", self.divertor_radial_thickness),
            ("inner plasma gap", self.inner_plasma_gap_radial_thickness),
            ("plasma radial thickness", self.plasma_radial_thickness),
            ("outer plasma gap", self.outer_plasma_gap_radial_thickness),
            ("first wall radial thickness", self.firstwall_radial_thickness),
            ("blanket radial thickness", self.blanket_radial_thickness),
            ("blanket rear wall radial thickness", self.blanket_rear_wall_radial_thickness),
        ])?;
        check_rotation(self.rotation_angle)
    }

    /// Blanket layer following the plasma, `depth` beyond the plasma gaps
    fn plasma_layer(&self, plasma: &Plasma, depth: f64, thickness: f64) -> BlanketFP {
        let inner = self.inner_plasma_gap_radial_thickness + depth;
        let vertical = self.outer_plasma_gap_radial_thickness + depth;
        let outer = self.outer_plasma_gap_radial_thickness + depth;
        BlanketFP::new(plasma.clone(), thickness, -179.0, 179.0)
            .with_offset(vec![inner, vertical, outer, vertical, inner])
            .with_rotation_angle(self.rotation_angle)
    }

    /// PF coil centres, evenly spaced over the rear wall height plus the gap
    fn pf_coil_center_points(
        &self,
        radial: &RadialBuild,
        vertical: &VerticalBuild,
        gap: f64,
        widths: &[f64],
    ) -> Vec<(f64, f64)> {
        let top = vertical.blanket_rear_wall_end + gap;
        let step = 2.0 * top / (widths.len() + 1) as f64;
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                (
                    radial.blanket_rear_wall_end + gap + w / 2.0,
                    top - step * (i + 1) as f64,
                )
            })
            .collect()
    }

    fn pf_and_tf_coils(
        &self,
        radial: &RadialBuild,
        vertical: &VerticalBuild,
    ) -> ReactorResult<Vec<Shape>> {
        let (Some(gap), Some(widths), Some(heights)) = (
            self.pf_coil_to_rear_blanket_radial_gap,
            self.pf_coil_radial_thicknesses.as_ref(),
            self.pf_coil_vertical_thicknesses.as_ref(),
        ) else {
            debug!("PF coil parameters incomplete, no PF or TF coils");
            return Ok(Vec::new());
        };
        check_positive(&[("PF coil to rear blanket gap", gap)])?;

        let center_points = self.pf_coil_center_points(radial, vertical, gap, widths);
        let pf_coils = PoloidalFieldCoilSet::new(heights.clone(), widths.clone(), center_points)
            .with_rotation_angle(self.rotation_angle)
            .to_shape()?
            .with_name("pf_coil")
            .with_material_tag("pf_coil_mat");
        let mut shapes = vec![pf_coils];

        let (Some(_), Some(tf_thickness)) = (
            self.pf_coil_to_tf_coil_radial_gap,
            self.outboard_tf_coil_radial_thickness,
        ) else {
            return Ok(shapes);
        };
        let distance = self.outboard_tf_coil_poloidal_thickness.ok_or_else(|| {
            ReactorError::InvalidParameter(
                "outboard TF coil poloidal thickness is required for TF coils".to_string(),
            )
        })?;
        let widest = widths.iter().copied().fold(0.0, f64::max);
        let pf_coil_end = radial.blanket_rear_wall_end + gap + widest;
        // offset from the PF coils by the rear blanket gap, as in the reference reactor
        let tf_coil_start = pf_coil_end + gap;
        let tf_coil = ToroidalFieldCoilRectangle::new(
            (radial.inboard_tf_coils_start, vertical.tf_coil_height),
            (tf_coil_start, 0.0),
            tf_thickness,
            distance,
            self.number_of_tf_coils,
        )
        .with_inner_leg(false)
        .with_rotation_angle(self.rotation_angle)
        .to_shape()?
        .with_color(COIL_COLOR)
        .with_material_tag("tf_coil_mat");
        shapes.push(tf_coil);
        Ok(shapes)
    }
}

/// Full-turn cylinder from the axis, used to trim blanket layers
fn center_cutter(radius: f64, height: f64) -> ReactorResult<Shape> {
    Ok(CenterColumnShieldCylinder::new(height, 0.0, radius)
        .to_shape()?
        .with_name("center_cutter"))
}

fn named(shape: Shape, name: &str) -> Shape {
    shape
        .with_name(name)
        .with_material_tag(format!("{}_mat", name))
        .with_stp_filename(format!("{}.stp", name))
        .with_stl_filename(format!("{}.stl", name))
}

impl ParametricReactor for BallReactor {
    fn name(&self) -> &str {
        "ball_reactor"
    }

    fn shapes(&self) -> ReactorResult<Vec<Shape>> {
        self.validate()?;
        let plasma = self.plasma();
        let radial = self.radial_build();
        let vertical = self.vertical_build();
        debug!("Ball reactor radial build: {:?}", radial);
        debug!("Ball reactor vertical build: {:?}", vertical);

        let mut shapes = vec![plasma.to_shape()?];

        shapes.push(named(
            CenterColumnShieldCylinder::new(
                2.0 * vertical.tf_coil_height,
                radial.inboard_tf_coils_start,
                radial.inboard_tf_coils_end,
            )
            .with_rotation_angle(self.rotation_angle)
            .to_shape()?
            .with_color(COIL_COLOR),
            "inboard_tf_coils",
        ));

        shapes.push(
            CenterColumnShieldCylinder::new(
                vertical.center_column_shield_height,
                radial.inboard_tf_coils_end,
                radial.center_column_shield_end,
            )
            .with_rotation_angle(self.rotation_angle)
            .to_shape()?,
        );

        // spans the layers top and bottom, reaching the axis on the inboard side
        let inboard = plasma.inner_equatorial_point().x;
        let envelope = BlanketFP::new(
            plasma.clone(),
            self.firstwall_radial_thickness
                + self.blanket_radial_thickness
                + self.blanket_rear_wall_radial_thickness,
            -179.0,
            179.0,
        )
        .with_offset(vec![
            inboard,
            vertical.plasma_gap,
            self.outer_plasma_gap_radial_thickness,
            vertical.plasma_gap,
            inboard,
        ])
        .with_rotation_angle(self.rotation_angle);
        shapes.push(named(
            CenterColumnShieldCylinder::new(
                2.0 * vertical.blanket_rear_wall_end,
                radial.center_column_shield_end,
                radial.divertor_end,
            )
            .with_rotation_angle(self.rotation_angle)
            .to_shape()?
            .with_intersect(envelope.to_shape()?)
            .with_color(DIVERTOR_COLOR),
            "divertor",
        ));

        // the divertor cutter contains the center column cutter, so one cut trims both
        let cutter = center_cutter(
            radial.divertor_end,
            1.5 * vertical.center_column_shield_height,
        )?;
        let layers = [
            ("firstwall", 0.0, self.firstwall_radial_thickness),
            (
                "blanket",
                self.firstwall_radial_thickness,
                self.blanket_radial_thickness,
            ),
            (
                "blanket_rear_wall",
                self.firstwall_radial_thickness + self.blanket_radial_thickness,
                self.blanket_rear_wall_radial_thickness,
            ),
        ];
        for (name, depth, thickness) in layers {
            let layer = self.plasma_layer(&plasma, depth, thickness).to_shape()?;
            shapes.push(named(
                layer.with_cut(cutter.clone()).with_color(BLANKET_COLOR),
                name,
            ));
        }

        shapes.extend(self.pf_and_tf_coils(&radial, &vertical)?);
        Ok(shapes)
    }
}
