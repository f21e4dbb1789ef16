//! ITER-like divertor with two vertical targets and an optional dome

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::Component;
use crate::constants::DIVERTOR_COLOR;
use crate::shape::{ProfilePoint, Shape, ShapeError, ShapeResult};

/// A vertical target: a straight leg from the anchor followed by a circular arc
///
/// The inner target curves towards larger radius; the outer target is its
/// mirror image and curves inwards. `tilt` and `coverage` are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalTarget {
    /// Upper end of the target (radius, height)
    pub anchor: (f64, f64),
    pub tilt: f64,
    pub length: f64,
    pub radius: f64,
    pub coverage: f64,
}

/// Dome between the strike points of the two targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dome {
    pub length: f64,
    pub height: f64,
    /// Position of the dome centre between the target ends, `0..=1`
    pub position: f64,
}

/// Leg end, arc mid point and arc end of a target in local coordinates
struct TargetPoints {
    leg_end: DVec2,
    arc_mid: DVec2,
    arc_end: DVec2,
}

impl VerticalTarget {
    pub fn new(anchor: (f64, f64), tilt: f64, length: f64, radius: f64, coverage: f64) -> Self {
        Self {
            anchor,
            tilt,
            length,
            radius,
            coverage,
        }
    }

    fn validate(&self, which: &str) -> ShapeResult<()> {
        if !(self.length >= 0.0 && self.radius > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "{} target needs a non-negative length and positive radius, got {} and {}",
                which, self.length, self.radius
            )));
        }
        if !(self.coverage > 0.0 && self.coverage <= 180.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "{} target coverage must be in (0, 180], got {}",
                which, self.coverage
            )));
        }
        Ok(())
    }

    fn anchor(&self) -> DVec2 {
        DVec2::new(self.anchor.0, self.anchor.1)
    }

    /// Target points relative to the anchor, curving towards +x
    fn local_points(&self) -> TargetPoints {
        let tilt = self.tilt.to_radians();
        let leg_end = DVec2::new(tilt.sin(), -tilt.cos()) * self.length;
        let center = leg_end + DVec2::from_angle(tilt) * self.radius;
        let start = tilt + std::f64::consts::PI;
        let coverage = self.coverage.to_radians();
        TargetPoints {
            leg_end,
            arc_mid: center + DVec2::from_angle(start + coverage / 2.0) * self.radius,
            arc_end: center + DVec2::from_angle(start + coverage) * self.radius,
        }
    }

    /// Anchor, leg end, arc mid point and arc end in the poloidal plane
    fn points(&self, mirrored: bool) -> [DVec2; 4] {
        let local = self.local_points();
        let flip = if mirrored {
            DVec2::new(-1.0, 1.0)
        } else {
            DVec2::ONE
        };
        let anchor = self.anchor();
        [
            anchor,
            anchor + local.leg_end * flip,
            anchor + local.arc_mid * flip,
            anchor + local.arc_end * flip,
        ]
    }
}

/// Divertor cassette bounded above by the inner and outer vertical targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterTypeDivertor {
    pub inner_target: VerticalTarget,
    pub outer_target: VerticalTarget,
    pub dome: Option<Dome>,
    /// Depth of the cassette below its lowest target point
    pub thickness: f64,
    pub rotation_angle: f64,
}

impl Default for IterTypeDivertor {
    fn default() -> Self {
        Self {
            inner_target: VerticalTarget::new((450.0, -300.0), 15.0, 80.0, 40.0, 90.0),
            outer_target: VerticalTarget::new((610.0, -300.0), 15.0, 60.0, 30.0, 90.0),
            dome: Some(Dome {
                length: 20.0,
                height: 20.0,
                position: 0.5,
            }),
            thickness: 20.0,
            rotation_angle: 360.0,
        }
    }
}

impl IterTypeDivertor {
    pub fn with_dome(mut self, dome: Option<Dome>) -> Self {
        self.dome = dome;
        self
    }

    pub fn with_rotation_angle(mut self, angle: f64) -> Self {
        self.rotation_angle = angle;
        self
    }

    fn validate(&self) -> ShapeResult<()> {
        self.inner_target.validate("inner")?;
        self.outer_target.validate("outer")?;
        if !(self.thickness > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "divertor thickness must be positive, got {}",
                self.thickness
            )));
        }
        Ok(())
    }

    /// Closed outline of the cassette
    pub fn profile_points(&self) -> ShapeResult<Vec<ProfilePoint>> {
        self.validate()?;
        let [inner_anchor, inner_leg, inner_mid, inner_end] = self.inner_target.points(false);
        let [outer_anchor, outer_leg, outer_mid, outer_end] = self.outer_target.points(true);
        if !(inner_end.x < outer_end.x) {
            return Err(ShapeError::InvalidParameter(format!(
                "inner target ends at radius {} beyond the outer target end at {}",
                inner_end.x, outer_end.x
            )));
        }

        let mut points = vec![
            ProfilePoint::straight(inner_anchor.x, inner_anchor.y),
            ProfilePoint::circle(inner_leg.x, inner_leg.y),
            ProfilePoint::circle(inner_mid.x, inner_mid.y),
            ProfilePoint::straight(inner_end.x, inner_end.y),
        ];

        if let Some(dome) = &self.dome {
            let span = outer_end.x - inner_end.x;
            if !(dome.position >= 0.0 && dome.position <= 1.0) {
                return Err(ShapeError::InvalidParameter(format!(
                    "dome position must be in [0, 1], got {}",
                    dome.position
                )));
            }
            if !(dome.length > 0.0 && dome.height > 0.0) {
                return Err(ShapeError::InvalidParameter(format!(
                    "dome length and height must be positive, got {} and {}",
                    dome.length, dome.height
                )));
            }
            let centre = inner_end.x + span * dome.position;
            let (a, b) = (centre - dome.length / 2.0, centre + dome.length / 2.0);
            if !(a > inner_end.x && b < outer_end.x) {
                return Err(ShapeError::InvalidParameter(format!(
                    "dome from {} to {} does not fit between the targets ({} to {})",
                    a, b, inner_end.x, outer_end.x
                )));
            }
            let floor = |x: f64| inner_end.y + (outer_end.y - inner_end.y) * (x - inner_end.x) / span;
            points.extend([
                ProfilePoint::straight(a, floor(a)),
                ProfilePoint::straight(a, floor(a) + dome.height),
                ProfilePoint::straight(b, floor(b) + dome.height),
                ProfilePoint::straight(b, floor(b)),
            ]);
        }

        points.extend([
            ProfilePoint::circle(outer_end.x, outer_end.y),
            ProfilePoint::circle(outer_mid.x, outer_mid.y),
            ProfilePoint::straight(outer_leg.x, outer_leg.y),
            ProfilePoint::straight(outer_anchor.x, outer_anchor.y),
        ]);

        let (min_x, max_x, min_z) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY),
            |(min_x, max_x, min_z), p| (min_x.min(p.x), max_x.max(p.x), min_z.min(p.y)),
        );
        let base = min_z - self.thickness;
        points.extend([
            ProfilePoint::straight(max_x, base),
            ProfilePoint::straight(min_x, base),
        ]);
        Ok(points)
    }
}

impl Component for IterTypeDivertor {
    fn to_shape(&self) -> ShapeResult<Shape> {
        Ok(Shape::rotate_mixed(self.profile_points()?, self.rotation_angle)
            .with_name("divertor")
            .with_color(DIVERTOR_COLOR)
            .with_material_tag("divertor_mat")
            .with_stp_filename("divertor.stp")
            .with_stl_filename("divertor.stl"))
    }
}
