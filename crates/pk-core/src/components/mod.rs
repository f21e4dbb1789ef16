//! Parametric reactor components
//!
//! Each component is a small parameter struct that validates its inputs and
//! describes itself as a [`Shape`].

mod blanket;
mod center_column;
mod cutters;
mod divertor;
mod pf_coils;
mod plasma;
mod tf_coils;
mod vacuum_vessel;

use glam::DVec2;
use pk_cad::{CadKernel, Solid};
use serde::{Deserialize, Serialize};

use crate::shape::{Shape, ShapeError, ShapeResult};

pub use blanket::{BlanketConstantThicknessArcH, BlanketConstantThicknessArcV, BlanketFP};
pub use center_column::{
    CenterColumnShieldCircular, CenterColumnShieldCylinder, CenterColumnShieldFlatTopCircular,
    CenterColumnShieldFlatTopHyperbola, CenterColumnShieldHyperbola,
};
pub use cutters::{
    CuttingWedge, CuttingWedgeFS, PortCutterCircular, PortCutterRectangular, PortCutterRotated,
};
pub use divertor::{Dome, IterTypeDivertor, VerticalTarget};
pub use pf_coils::{PoloidalFieldCoil, PoloidalFieldCoilCase, PoloidalFieldCoilSet};
pub use plasma::{Plasma, PlasmaConfiguration, PlasmaFromPoints};
pub use tf_coils::{
    InnerTfCoilsCircular, InnerTfCoilsFlat, ToroidalFieldCoilPrincetonD,
    ToroidalFieldCoilRectangle,
};
pub use vacuum_vessel::VacuumVessel;

/// A reactor component that can describe itself as a shape
pub trait Component {
    /// Validate the parameters and build the shape description
    fn to_shape(&self) -> ShapeResult<Shape>;

    fn solid(&self, kernel: &dyn CadKernel) -> ShapeResult<Solid> {
        self.to_shape()?.solid(kernel)
    }

    fn volume(&self, kernel: &dyn CadKernel) -> ShapeResult<f64> {
        self.to_shape()?.volume(kernel)
    }
}

/// A quantity that is constant or varies linearly through evenly spaced values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Distribution {
    Constant(f64),
    /// Values spread evenly from the start to the end of the range
    Linear(Vec<f64>),
}

impl Distribution {
    /// Value at `fraction` of the range, `0..=1`
    pub fn value_at(&self, fraction: f64) -> f64 {
        match self {
            Distribution::Constant(v) => *v,
            Distribution::Linear(values) => match values.len() {
                0 => 0.0,
                1 => values[0],
                n => {
                    let pos = fraction.clamp(0.0, 1.0) * (n - 1) as f64;
                    let i = (pos.floor() as usize).min(n - 2);
                    let t = pos - i as f64;
                    values[i] + (values[i + 1] - values[i]) * t
                }
            },
        }
    }

    pub fn min(&self) -> f64 {
        match self {
            Distribution::Constant(v) => *v,
            Distribution::Linear(values) => values.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }

    pub(crate) fn validate(&self, what: &str) -> ShapeResult<()> {
        match self {
            Distribution::Linear(values) if values.is_empty() => Err(
                ShapeError::InvalidParameter(format!("{} needs at least one value", what)),
            ),
            _ if !self.min().is_finite() => Err(ShapeError::InvalidParameter(format!(
                "{} must be finite",
                what
            ))),
            _ => Ok(()),
        }
    }
}

impl From<f64> for Distribution {
    fn from(value: f64) -> Self {
        Distribution::Constant(value)
    }
}

impl From<Vec<f64>> for Distribution {
    fn from(values: Vec<f64>) -> Self {
        Distribution::Linear(values)
    }
}

/// Axis-aligned rectangle on a workplane, as straight profile points
pub(crate) fn rectangle(min: DVec2, max: DVec2) -> [(f64, f64); 4] {
    [
        (min.x, max.y),
        (max.x, max.y),
        (max.x, min.y),
        (min.x, min.y),
    ]
}

/// Clip a closed outline to the half plane `x >= 0`
pub(crate) fn clip_to_positive_radius(points: &[DVec2]) -> Vec<DVec2> {
    let n = points.len();
    let mut clipped = Vec::with_capacity(n + 2);
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        if a.x >= 0.0 {
            clipped.push(a);
        }
        if (a.x >= 0.0) != (b.x >= 0.0) {
            let t = a.x / (a.x - b.x);
            clipped.push(DVec2::new(0.0, a.y + (b.y - a.y) * t));
        }
    }
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distribution() {
        assert_eq!(Distribution::Constant(3.0).value_at(0.7), 3.0);
        let linear = Distribution::Linear(vec![10.0, 20.0, 40.0]);
        assert_relative_eq!(linear.value_at(0.0), 10.0);
        assert_relative_eq!(linear.value_at(0.25), 15.0);
        assert_relative_eq!(linear.value_at(0.75), 30.0);
        assert_relative_eq!(linear.value_at(1.0), 40.0);
        assert_relative_eq!(linear.min(), 10.0);
        assert!(Distribution::Linear(vec![]).validate("offset").is_err());
    }

    #[test]
    fn test_clip_to_positive_radius() {
        let square = [
            DVec2::new(-1.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, -1.0),
            DVec2::new(-1.0, -1.0),
        ];
        let clipped = clip_to_positive_radius(&square);
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p.x >= 0.0));
        assert!(clipped.contains(&DVec2::new(0.0, 1.0)));
        assert!(clipped.contains(&DVec2::new(0.0, -1.0)));
    }
}
