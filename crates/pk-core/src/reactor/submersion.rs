//! Submersion tokamak: the outboard blanket and first wall sit inside a support ring
//! with the TF coils outside it and the PF coils outside those

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ParametricReactor, ReactorError, ReactorResult, check_positive, check_rotation};
use crate::components::{
    BlanketFP, CenterColumnShieldCylinder, Component, Plasma, PlasmaFromPoints,
    PoloidalFieldCoilSet, ToroidalFieldCoilRectangle, rectangle,
};
use crate::constants::{BLANKET_COLOR, COIL_COLOR, DIVERTOR_COLOR, SHIELD_COLOR};
use crate::shape::Shape;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmersionTokamak {
    pub inner_bore_radial_thickness: f64,
    pub inboard_tf_leg_radial_thickness: f64,
    pub center_column_shield_radial_thickness: f64,
    pub divertor_radial_thickness: f64,
    pub inner_plasma_gap_radial_thickness: f64,
    pub plasma_radial_thickness: f64,
    pub outer_plasma_gap_radial_thickness: f64,
    pub firstwall_radial_thickness: f64,
    pub blanket_rear_wall_radial_thickness: f64,
    pub number_of_tf_coils: usize,
    pub support_radial_thickness: f64,
    pub inboard_blanket_radial_thickness: f64,
    pub outboard_blanket_radial_thickness: f64,
    /// Top of the plasma (radius, height)
    pub plasma_high_point: (f64, f64),
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
    #[serde(default)]
    pub tf_coil_to_rear_blanket_radial_gap: Option<f64>,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

fn default_rotation() -> f64 {
    360.0
}

impl Default for SubmersionTokamak {
    fn default() -> Self {
        Self {
            inner_bore_radial_thickness: 30.0,
            inboard_tf_leg_radial_thickness: 30.0,
            center_column_shield_radial_thickness: 30.0,
            divertor_radial_thickness: 80.0,
            inner_plasma_gap_radial_thickness: 50.0,
            plasma_radial_thickness: 200.0,
            outer_plasma_gap_radial_thickness: 50.0,
            firstwall_radial_thickness: 30.0,
            blanket_rear_wall_radial_thickness: 30.0,
            number_of_tf_coils: 16,
            support_radial_thickness: 50.0,
            inboard_blanket_radial_thickness: 30.0,
            outboard_blanket_radial_thickness: 30.0,
            plasma_high_point: (200.0, 150.0),
            pf_coil_radial_thicknesses: Some(vec![30.0, 30.0, 30.0, 30.0]),
            pf_coil_vertical_thicknesses: Some(vec![30.0, 30.0, 30.0, 30.0]),
            pf_coil_to_tf_coil_radial_gap: Some(50.0),
            outboard_tf_coil_radial_thickness: Some(30.0),
            outboard_tf_coil_poloidal_thickness: Some(30.0),
            tf_coil_to_rear_blanket_radial_gap: Some(20.0),
            rotation_angle: 180.0,
        }
    }
}

/// Layer boundaries from the axis outwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmersionRadialBuild {
    pub inboard_tf_leg_start: f64,
    pub center_column_shield_start: f64,
    pub inboard_blanket_start: f64,
    pub inboard_firstwall_start: f64,
    pub inboard_firstwall_end: f64,
    pub divertor_end: f64,
    pub plasma_inner: f64,
    pub plasma_outer: f64,
    pub outboard_firstwall_start: f64,
    pub support_start: f64,
    pub support_end: f64,
}

/// Outboard TF coil placement
#[derive(Debug, Clone, Copy, PartialEq)]
struct TfCoilBuild {
    start: f64,
    thickness: f64,
    distance: f64,
    height: f64,
}

impl SubmersionTokamak {
    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    pub fn radial_build(&self) -> SubmersionRadialBuild {
        let inboard_tf_leg_start = self.inner_bore_radial_thickness;
        let center_column_shield_start =
            inboard_tf_leg_start + self.inboard_tf_leg_radial_thickness;
        let inboard_blanket_start =
            center_column_shield_start + self.center_column_shield_radial_thickness;
        let inboard_firstwall_start = inboard_blanket_start + self.inboard_blanket_radial_thickness;
        let inboard_firstwall_end = inboard_firstwall_start + self.firstwall_radial_thickness;
        let plasma_inner = inboard_firstwall_end + self.inner_plasma_gap_radial_thickness;
        let plasma_outer = plasma_inner + self.plasma_radial_thickness;
        let outboard_firstwall_start = plasma_outer + self.outer_plasma_gap_radial_thickness;
        let support_start = outboard_firstwall_start
            + self.firstwall_radial_thickness
            + self.outboard_blanket_radial_thickness
            + self.blanket_rear_wall_radial_thickness;
        SubmersionRadialBuild {
            inboard_tf_leg_start,
            center_column_shield_start,
            inboard_blanket_start,
            inboard_firstwall_start,
            inboard_firstwall_end,
            divertor_end: inboard_firstwall_end + self.divertor_radial_thickness,
            plasma_inner,
            plasma_outer,
            outboard_firstwall_start,
            support_start,
            support_end: support_start + self.support_radial_thickness,
        }
    }

    pub fn plasma(&self) -> ReactorResult<Plasma> {
        let radial = self.radial_build();
        Ok(
            PlasmaFromPoints::new(radial.plasma_outer, radial.plasma_inner, self.plasma_high_point)
                .with_rotation_angle(self.rotation_angle)
                .plasma()?,
        )
    }

    /// Height of the outer face of the rear wall above the midplane
    pub fn blanket_rear_wall_end_height(&self) -> f64 {
        self.plasma_high_point.1
            + self.outer_plasma_gap_radial_thickness
            + self.firstwall_radial_thickness
            + self.outboard_blanket_radial_thickness
            + self.blanket_rear_wall_radial_thickness
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
            ("blanket rear wall radial thickness", self.blanket_rear_wall_radial_thickness),
            ("support radial thickness", self.support_radial_thickness),
            ("inboard blanket radial thickness", self.inboard_blanket_radial_thickness),
            ("outboard blanket radial thickness", self.outboard_blanket_radial_thickness),
            ("plasma high point height", self.plasma_high_point.1),
        ])?;
        check_rotation(self.rotation_angle)
    }

    fn tf_coil_build(&self, radial: &SubmersionRadialBuild) -> ReactorResult<Option<TfCoilBuild>> {
        let (Some(thickness), Some(distance), Some(gap)) = (
            self.outboard_tf_coil_radial_thickness,
            self.outboard_tf_coil_poloidal_thickness,
            self.tf_coil_to_rear_blanket_radial_gap,
        ) else {
            return Ok(None);
        };
        check_positive(&[("TF coil to rear blanket gap", gap)])?;
        Ok(Some(TfCoilBuild {
            start: radial.support_end + gap,
            thickness,
            distance,
            height: self.blanket_rear_wall_end_height() + self.support_radial_thickness + gap,
        }))
    }

    /// PF coil centres outside the TF coils, spread over the coil height
    fn pf_coil_center_points(&self, tf: &TfCoilBuild, gap: f64, widths: &[f64]) -> Vec<(f64, f64)> {
        let top = tf.height + tf.thickness;
        let step = 2.0 * top / (widths.len() + 1) as f64;
        let start = tf.start + tf.thickness + gap;
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| (start + w / 2.0, top - step * (i + 1) as f64))
            .collect()
    }

    fn coils(&self, radial: &SubmersionRadialBuild) -> ReactorResult<Vec<Shape>> {
        let pf_parameters = (
            self.pf_coil_radial_thicknesses.as_ref(),
            self.pf_coil_vertical_thicknesses.as_ref(),
            self.pf_coil_to_tf_coil_radial_gap,
        );
        let Some(tf) = self.tf_coil_build(radial)? else {
            if let (Some(_), Some(_), Some(_)) = pf_parameters {
                return Err(ReactorError::InvalidParameter(
                    "PF coils are placed outside the TF coils and need the TF coil parameters"
                        .to_string(),
                ));
            }
            debug!("TF coil parameters incomplete, no TF or PF coils");
            return Ok(Vec::new());
        };

        let inboard_leg = CenterColumnShieldCylinder::new(
            2.0 * (tf.height + tf.thickness),
            radial.inboard_tf_leg_start,
            radial.center_column_shield_start,
        )
        .with_rotation_angle(self.rotation_angle)
        .to_shape()?
        .with_color(COIL_COLOR);
        let outboard = ToroidalFieldCoilRectangle::new(
            (radial.inboard_tf_leg_start, tf.height),
            (tf.start, 0.0),
            tf.thickness,
            tf.distance,
            self.number_of_tf_coils,
        )
        .with_inner_leg(false)
        .with_rotation_angle(self.rotation_angle)
        .to_shape()?
        .with_material_tag("tf_coil_mat");
        let mut shapes = vec![named(inboard_leg, "inboard_tf_coils"), outboard];

        if let (Some(widths), Some(heights), Some(gap)) = pf_parameters {
            check_positive(&[("PF coil to TF coil gap", gap)])?;
            let center_points = self.pf_coil_center_points(&tf, gap, widths);
            shapes.push(
                PoloidalFieldCoilSet::new(heights.clone(), widths.clone(), center_points)
                    .with_rotation_angle(self.rotation_angle)
                    .to_shape()?
                    .with_name("pf_coil")
                    .with_material_tag("pf_coil_mat"),
            );
        }
        Ok(shapes)
    }

    /// Layer following the plasma, `depth` beyond the plasma gaps
    fn plasma_layer(&self, plasma: &Plasma, depth: f64, thickness: f64) -> BlanketFP {
        let inner = self.inner_plasma_gap_radial_thickness + depth;
        let outer = self.outer_plasma_gap_radial_thickness + depth;
        BlanketFP::new(plasma.clone(), thickness, -179.0, 179.0)
            .with_offset(vec![inner, outer, outer, outer, inner])
            .with_rotation_angle(self.rotation_angle)
    }

    fn ring(&self, height: f64, inner: f64, outer: f64) -> ReactorResult<Shape> {
        Ok(CenterColumnShieldCylinder::new(height, inner, outer)
            .with_rotation_angle(self.rotation_angle)
            .to_shape()?)
    }
}

fn named(shape: Shape, name: &str) -> Shape {
    shape
        .with_name(name)
        .with_material_tag(format!("{}_mat", name))
        .with_stp_filename(format!("{}.stp", name))
        .with_stl_filename(format!("{}.stl", name))
}

impl ParametricReactor for SubmersionTokamak {
    fn name(&self) -> &str {
        "submersion_tokamak"
    }

    fn shapes(&self) -> ReactorResult<Vec<Shape>> {
        self.validate()?;
        let radial = self.radial_build();
        let plasma = self.plasma()?;
        let rear_wall_end_height = self.blanket_rear_wall_end_height();
        let inboard_height = 2.0 * rear_wall_end_height;
        debug!("Submersion tokamak radial build: {:?}", radial);

        let mut shapes = vec![plasma.to_shape()?];
        shapes.push(self.ring(
            inboard_height,
            radial.center_column_shield_start,
            radial.inboard_blanket_start,
        )?);
        shapes.push(named(
            self.ring(
                inboard_height,
                radial.inboard_blanket_start,
                radial.inboard_firstwall_start,
            )?
            .with_color(BLANKET_COLOR),
            "inboard_blanket",
        ));
        shapes.push(named(
            self.ring(
                inboard_height,
                radial.inboard_firstwall_start,
                radial.inboard_firstwall_end,
            )?,
            "inboard_firstwall",
        ));

        let inboard = plasma.inner_equatorial_point().x;
        let outer_gap = self.outer_plasma_gap_radial_thickness;
        let envelope = BlanketFP::new(
            plasma.clone(),
            self.firstwall_radial_thickness
                + self.outboard_blanket_radial_thickness
                + self.blanket_rear_wall_radial_thickness,
            -179.0,
            179.0,
        )
        .with_offset(vec![inboard, outer_gap, outer_gap, outer_gap, inboard])
        .with_rotation_angle(self.rotation_angle);
        shapes.push(named(
            self.ring(inboard_height, radial.inboard_firstwall_end, radial.divertor_end)?
                .with_intersect(envelope.to_shape()?)
                .with_color(DIVERTOR_COLOR),
            "divertor",
        ));

        let cutter = CenterColumnShieldCylinder::new(1.5 * inboard_height, 0.0, radial.divertor_end)
            .to_shape()?
            .with_name("divertor_cutter");
        let fw = self.firstwall_radial_thickness;
        let blanket = self.outboard_blanket_radial_thickness;
        let layers = [
            ("outboard_firstwall", 0.0, fw),
            ("outboard_blanket", fw, blanket),
            (
                "blanket_rear_wall",
                fw + blanket,
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

        let support = rectangle(
            DVec2::new(radial.support_start, -rear_wall_end_height),
            DVec2::new(radial.support_end, rear_wall_end_height),
        );
        shapes.push(named(
            Shape::rotate_straight(&support, self.rotation_angle).with_color(SHIELD_COLOR),
            "supports",
        ));

        shapes.extend(self.coils(&radial)?);
        Ok(shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_radial_build() {
        let radial = SubmersionTokamak::default().radial_build();
        assert_relative_eq!(radial.inboard_blanket_start, 90.0);
        assert_relative_eq!(radial.inboard_firstwall_end, 150.0);
        assert_relative_eq!(radial.divertor_end, 230.0);
        assert_relative_eq!(radial.plasma_inner, 200.0);
        assert_relative_eq!(radial.plasma_outer, 400.0);
        assert_relative_eq!(radial.support_start, 540.0);
        assert_relative_eq!(radial.support_end, 590.0);
    }

    #[test]
    fn test_plasma_from_points() {
        let reactor = SubmersionTokamak::default();
        let plasma = reactor.plasma().unwrap();
        assert_relative_eq!(plasma.major_radius, 300.0);
        assert_relative_eq!(plasma.minor_radius, 100.0);
        assert_relative_eq!(plasma.elongation, 1.5);
        assert_relative_eq!(reactor.blanket_rear_wall_end_height(), 290.0);
    }

    #[test]
    fn test_shapes() {
        let shapes = SubmersionTokamak::default().shapes().unwrap();
        let names: Vec<&str> = shapes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "plasma",
                "center_column_shield",
                "inboard_blanket",
                "inboard_firstwall",
                "divertor",
                "outboard_firstwall",
                "outboard_blanket",
                "blanket_rear_wall",
                "supports",
                "inboard_tf_coils",
                "tf_coil",
                "pf_coil",
            ]
        );
    }

    #[test]
    fn test_coil_positions() {
        let reactor = SubmersionTokamak::default();
        let radial = reactor.radial_build();
        let tf = reactor.tf_coil_build(&radial).unwrap().unwrap();
        assert_relative_eq!(tf.start, 610.0);
        assert_relative_eq!(tf.height, 360.0);

        let points = reactor.pf_coil_center_points(&tf, 50.0, &[30.0; 4]);
        assert!(points.iter().all(|p| (p.0 - 705.0).abs() < 1e-9));
        for (point, want) in points.iter().zip([234.0, 78.0, -78.0, -234.0]) {
            assert_relative_eq!(point.1, want, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pf_coils_need_tf_coils() {
        let reactor = SubmersionTokamak {
            tf_coil_to_rear_blanket_radial_gap: None,
            ..SubmersionTokamak::default()
        };
        assert!(matches!(
            reactor.shapes(),
            Err(ReactorError::InvalidParameter(_))
        ));

        let bare = SubmersionTokamak {
            tf_coil_to_rear_blanket_radial_gap: None,
            pf_coil_radial_thicknesses: None,
            ..SubmersionTokamak::default()
        };
        assert_eq!(bare.shapes().unwrap().len(), 9);
    }
}
