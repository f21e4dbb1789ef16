use glam::DVec2;
use pk_cad::Workplane;
use serde::{Deserialize, Serialize};

use crate::components::Component;
use crate::constants::COIL_COLOR;
use crate::shape::{AzimuthPlacement, ProfilePoint, Shape, ShapeError, ShapeResult};

/// Layout shared by the flat and circular inboard coil sets
#[derive(Debug, Clone)]
struct InnerTfLayout {
    height: f64,
    inner_radius: f64,
    outer_radius: f64,
    gap_size: f64,
    number_of_coils: Option<usize>,
    azimuth_placement_angles: Option<Vec<f64>>,
    azimuth_start_angle: f64,
}

/// Angular extent of one coil and the half-gap angle at a radius, radians
#[derive(Debug, Clone, Copy)]
struct Wedge {
    theta: f64,
    omega: f64,
}

impl Wedge {
    fn at(&self, radius: f64, fraction: f64) -> DVec2 {
        DVec2::from_angle(self.omega + self.theta * fraction) * radius
    }
}

impl InnerTfLayout {
    fn azimuth_angles(&self) -> ShapeResult<Vec<f64>> {
        match (self.number_of_coils, &self.azimuth_placement_angles) {
            (Some(count), Some(angles)) if count != angles.len() => {
                Err(ShapeError::InvalidParameter(format!(
                    "{} azimuth placement angles given for {} coils",
                    angles.len(),
                    count
                )))
            }
            (_, Some(angles)) if angles.is_empty() => Err(ShapeError::InvalidParameter(
                "azimuth placement angle list is empty".to_string(),
            )),
            (_, Some(angles)) => Ok(angles.clone()),
            (Some(count), None) if count > 0 => {
                Ok(AzimuthPlacement::evenly_spaced(count, self.azimuth_start_angle).angles())
            }
            _ => Err(ShapeError::InvalidParameter(
                "inner TF coils need a coil count or azimuth placement angles".to_string(),
            )),
        }
    }

    fn wedge(&self, radius: f64, count: usize) -> ShapeResult<Wedge> {
        let ratio = self.gap_size / (2.0 * radius);
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ShapeError::InvalidParameter(format!(
                "gap size {} does not fit at radius {}",
                self.gap_size, radius
            )));
        }
        let n = count as f64;
        let theta = (2.0 * std::f64::consts::PI * radius - self.gap_size * n) / (radius * n);
        if !(theta > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "{} coils with gaps of {} leave no room at radius {}",
                count, self.gap_size, radius
            )));
        }
        Ok(Wedge {
            theta,
            omega: ratio.asin(),
        })
    }

    fn validate(&self) -> ShapeResult<()> {
        if !(self.height > 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "inner TF coil height must be positive, got {}",
                self.height
            )));
        }
        if !(self.inner_radius > 0.0 && self.inner_radius < self.outer_radius) {
            return Err(ShapeError::InvalidParameter(format!(
                "inner TF coil radii must satisfy 0 < inner < outer, got {} and {}",
                self.inner_radius, self.outer_radius
            )));
        }
        if !(self.gap_size >= 0.0) {
            return Err(ShapeError::InvalidParameter(format!(
                "gap size must not be negative, got {}",
                self.gap_size
            )));
        }
        Ok(())
    }

    /// Build the extruded coil set from an outline generator
    fn shape(
        &self,
        outline: impl Fn(Wedge, Wedge) -> Vec<ProfilePoint>,
        file_stem: &str,
    ) -> ShapeResult<Shape> {
        self.validate()?;
        let angles = self.azimuth_angles()?;
        let inner = self.wedge(self.inner_radius, angles.len())?;
        let outer = self.wedge(self.outer_radius, angles.len())?;
        Ok(Shape::extrude_mixed(outline(inner, outer), self.height)
            .with_workplane(Workplane::XY)
            .with_azimuth(angles)
            .with_name("inner_tf_coils")
            .with_color(COIL_COLOR)
            .with_material_tag("inner_tf_coil_mat")
            .with_stp_filename(format!("{}.stp", file_stem))
            .with_stl_filename(format!("{}.stl", file_stem)))
    }
}

macro_rules! inner_tf_coils {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub height: f64,
            pub inner_radius: f64,
            pub outer_radius: f64,
            /// Toroidal gap between neighbouring coils
            pub gap_size: f64,
            pub number_of_coils: Option<usize>,
            pub azimuth_placement_angles: Option<Vec<f64>>,
            #[serde(default)]
            pub azimuth_start_angle: f64,
        }

        impl $name {
            /// `number_of_coils` coils spaced evenly from azimuth 0
            pub fn new(
                height: f64,
                inner_radius: f64,
                outer_radius: f64,
                number_of_coils: usize,
                gap_size: f64,
            ) -> Self {
                Self {
                    height,
                    inner_radius,
                    outer_radius,
                    gap_size,
                    number_of_coils: Some(number_of_coils),
                    azimuth_placement_angles: None,
                    azimuth_start_angle: 0.0,
                }
            }

            pub fn with_azimuth_start_angle(mut self, angle: f64) -> Self {
                self.azimuth_start_angle = angle;
                self
            }

            /// Place the coils at explicit angles instead of spacing them evenly
            pub fn with_azimuth_placement_angles(mut self, angles: Vec<f64>) -> Self {
                self.azimuth_placement_angles = Some(angles);
                self
            }

            /// Azimuth angles the coils are placed at, degrees
            pub fn azimuth_angles(&self) -> ShapeResult<Vec<f64>> {
                self.layout().azimuth_angles()
            }

            fn layout(&self) -> InnerTfLayout {
                InnerTfLayout {
                    height: self.height,
                    inner_radius: self.inner_radius,
                    outer_radius: self.outer_radius,
                    gap_size: self.gap_size,
                    number_of_coils: self.number_of_coils,
                    azimuth_placement_angles: self.azimuth_placement_angles.clone(),
                    azimuth_start_angle: self.azimuth_start_angle,
                }
            }
        }
    };
}

inner_tf_coils!(
    /// Inboard TF coil legs with flat inner and outer faces
    InnerTfCoilsFlat
);

inner_tf_coils!(
    /// Inboard TF coil legs with faces following the inner and outer radii
    InnerTfCoilsCircular
);

impl Component for InnerTfCoilsFlat {
    fn to_shape(&self) -> ShapeResult<Shape> {
        self.layout().shape(
            |inner, outer| {
                [inner.at(self.inner_radius, 0.0), inner.at(self.inner_radius, 1.0)]
                    .into_iter()
                    .chain([outer.at(self.outer_radius, 1.0), outer.at(self.outer_radius, 0.0)])
                    .map(|p| ProfilePoint::straight(p.x, p.y))
                    .collect()
            },
            "InnerTfCoilsFlat",
        )
    }
}

impl Component for InnerTfCoilsCircular {
    fn to_shape(&self) -> ShapeResult<Shape> {
        self.layout().shape(
            |inner, outer| {
                let (ri, ro) = (self.inner_radius, self.outer_radius);
                let [p1, p2, p3] = [0.0, 0.5, 1.0].map(|f| inner.at(ri, f));
                let [p4, p5, p6] = [0.0, 0.5, 1.0].map(|f| outer.at(ro, f));
                vec![
                    ProfilePoint::circle(p1.x, p1.y),
                    ProfilePoint::circle(p2.x, p2.y),
                    ProfilePoint::straight(p3.x, p3.y),
                    ProfilePoint::circle(p6.x, p6.y),
                    ProfilePoint::circle(p5.x, p5.y),
                    ProfilePoint::straight(p4.x, p4.y),
                ]
            },
            "InnerTfCoilsCircular",
        )
    }
}
