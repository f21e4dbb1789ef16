use std::f64::consts::FRAC_PI_2;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{check_coil_set, default_rotation, default_true, outboard_coil_shape};
use crate::components::{Component, rectangle};
use crate::constants::{COIL_COLOR, PRINCETON_D_SEGMENT_POINTS};
use crate::shape::{
    AzimuthPlacement, Connection, ProfilePoint, Shape, ShapeError, ShapeResult,
};

/// Simpson intervals used for the height integral
const INTEGRATION_INTERVALS: usize = 64;

/// Princeton-D (constant tension) coils placed evenly around the Z axis
///
/// The inner edge of the D runs from `r1` on the inboard side to `r2` on the
/// outboard midplane; the coil is `thickness` thick outwards of that edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToroidalFieldCoilPrincetonD {
    pub r1: f64,
    pub r2: f64,
    pub thickness: f64,
    pub distance: f64,
    pub number_of_coils: usize,
    #[serde(default = "default_true")]
    pub with_inner_leg: bool,
    #[serde(default)]
    pub azimuth_start_angle: f64,
    #[serde(default = "default_rotation")]
    pub rotation_angle: f64,
}

/// Point on the D curve with the poloidal parameter it was sampled at
#[derive(Debug, Clone, Copy)]
struct DPoint {
    position: DVec2,
    phi: f64,
}

impl DPoint {
    /// Outward unit normal
    fn normal(&self) -> DVec2 {
        DVec2::new(-self.phi.sin(), self.phi.cos())
    }
}

impl ToroidalFieldCoilPrincetonD {
    pub fn new(r1: f64, r2: f64, thickness: f64, distance: f64, number_of_coils: usize) -> Self {
        Self {
            r1,
            r2,
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

    fn validate(&self) -> ShapeResult<()> {
        check_coil_set(self.thickness, self.distance, self.number_of_coils)?;
        if !(self.r1 > 0.0 && self.r1 < self.r2) {
            return Err(ShapeError::InvalidParameter(format!(
                "Princeton-D radii must satisfy 0 < r1 < r2, got {} and {}",
                self.r1, self.r2
            )));
        }
        Ok(())
    }

    /// Upper half of the D, from the top of the inboard leg to `r2` on the midplane
    fn upper_half(&self) -> Vec<DPoint> {
        let k = 0.5 * (self.r2 / self.r1).ln();
        let r0 = (self.r1 * self.r2).sqrt();
        let z0 = k * r0 * height_integral(k, -FRAC_PI_2);
        let at = |phi: f64| DPoint {
            position: DVec2::new(
                r0 * (-k * phi.sin()).exp(),
                z0 - k * r0 * height_integral(k, phi),
            ),
            phi,
        };

        let n = PRINCETON_D_SEGMENT_POINTS;
        let step = FRAC_PI_2 / (n - 1) as f64;
        // inward segment reversed so the curve starts at r1
        let mut points: Vec<DPoint> = (0..n).rev().map(|j| at(j as f64 * step)).collect();
        points.extend((1..n).map(|j| at(-(j as f64) * step)));
        points
    }

    /// Inner and outer edges of the full D, both from the top to the bottom of the inboard leg
    pub fn edges(&self) -> (Vec<DVec2>, Vec<DVec2>) {
        let upper = self.upper_half();
        let mirrored = upper.iter().rev().skip(1).map(|p| DPoint {
            position: DVec2::new(p.position.x, -p.position.y),
            phi: -p.phi,
        });
        let full: Vec<DPoint> = upper.iter().copied().chain(mirrored).collect();
        let inner = full.iter().map(|p| p.position).collect();
        let outer = full
            .iter()
            .map(|p| p.position + p.normal() * self.thickness)
            .collect();
        (inner, outer)
    }

    fn profile_points(&self) -> Vec<ProfilePoint> {
        let (inner, mut outer) = self.edges();
        outer.reverse();
        let mut points = spline_run(&inner);
        points.extend(spline_run(&outer));
        points
    }
}

/// Spline through `points`, leaving the last one with a straight connection
fn spline_run(points: &[DVec2]) -> Vec<ProfilePoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let connection = if i + 1 == points.len() {
                Connection::Straight
            } else {
                Connection::Spline
            };
            ProfilePoint::new(p.x, p.y, connection)
        })
        .collect()
}

/// Simpson estimate of the integral of `sin(ψ) e^(-k sin ψ)` from 0 to `phi`
fn height_integral(k: f64, phi: f64) -> f64 {
    let f = |psi: f64| psi.sin() * (-k * psi.sin()).exp();
    let n = INTEGRATION_INTERVALS;
    let h = phi / n as f64;
    let interior: f64 = (1..n)
        .map(|i| {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            weight * f(i as f64 * h)
        })
        .sum();
    h / 3.0 * (f(0.0) + interior + f(phi))
}

impl Component for ToroidalFieldCoilPrincetonD {
    fn to_shape(&self) -> ShapeResult<Shape> {
        self.validate()?;
        let placement = self.azimuth_placement();
        let mut shape = Shape::extrude_mixed(self.profile_points(), self.distance)
            .with_azimuth(placement.clone());
        if self.rotation_angle < 360.0 {
            shape = shape.with_sector_angle(self.rotation_angle);
        }

        if self.with_inner_leg {
            let (inner, outer) = self.edges();
            let corners = [inner.first(), inner.last(), outer.first(), outer.last()];
            let corners: Vec<DVec2> = corners.into_iter().flatten().copied().collect();
            let min = corners.iter().copied().fold(DVec2::splat(f64::INFINITY), DVec2::min);
            let max = corners
                .iter()
                .copied()
                .fold(DVec2::splat(f64::NEG_INFINITY), DVec2::max);
            shape = shape.with_union(outboard_coil_shape(
                &rectangle(min, max),
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pk_cad::{CadKernel, CsgKernel};

    #[test]
    fn test_d_closes_on_the_midplane() {
        let coil = ToroidalFieldCoilPrincetonD::new(100.0, 600.0, 50.0, 30.0, 8);
        let (inner, outer) = coil.edges();
        let n = PRINCETON_D_SEGMENT_POINTS;
        assert_eq!(inner.len(), 4 * (n - 1) + 1);
        assert_eq!(outer.len(), inner.len());

        let mid = inner[2 * (n - 1)];
        assert_relative_eq!(mid.x, 600.0, epsilon = 1e-9);
        assert_relative_eq!(mid.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(outer[2 * (n - 1)].x, 650.0, epsilon = 1e-9);

        // inboard leg at r1, symmetric about the midplane
        let (top, bottom) = (inner[0], inner[inner.len() - 1]);
        assert_relative_eq!(top.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(top.y, -bottom.y, epsilon = 1e-9);
        assert!(top.y > 0.0);
        assert_relative_eq!(outer[0].x, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_d_peak_is_at_the_geometric_mean_radius() {
        let coil = ToroidalFieldCoilPrincetonD::new(100.0, 400.0, 20.0, 30.0, 1);
        let (inner, _) = coil.edges();
        let top = inner
            .iter()
            .copied()
            .fold(DVec2::new(0.0, f64::NEG_INFINITY), |a, b| if b.y > a.y { b } else { a });
        assert_relative_eq!(top.x, 200.0, epsilon = 1e-6);
    }

    #[test]
    fn test_coil_solid() {
        let kernel = CsgKernel::default();
        let coil = ToroidalFieldCoilPrincetonD::new(100.0, 600.0, 50.0, 30.0, 4);
        let solid = coil.solid(&kernel).unwrap();
        let bbox = kernel.bounding_box(&solid);
        assert!(bbox.max.x > 600.0 && bbox.max.x < 660.0);
        assert!(bbox.min.x < -600.0);
        assert!(coil.volume(&kernel).unwrap() > 0.0);

        let without_leg = coil.clone().with_inner_leg(false);
        assert!(without_leg.volume(&kernel).unwrap() < coil.volume(&kernel).unwrap());
    }

    #[test]
    fn test_invalid_radii() {
        let coil = ToroidalFieldCoilPrincetonD::new(600.0, 100.0, 50.0, 30.0, 4);
        assert!(coil.to_shape().is_err());
    }
}
