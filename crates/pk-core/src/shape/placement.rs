//! Azimuthal placement of shape copies around the Z axis

use serde::{Deserialize, Serialize};

/// Azimuth angles (degrees) at which copies of a shape are placed
///
/// Every angle, single or in a list, turns the shape counter-clockwise about
/// +Z seen from above, so `Single(a)` and `Multiple(vec![a])` place the shape
/// identically. Designs written for a clockwise single-angle convention need
/// the angle negated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AzimuthPlacement {
    Single(f64),
    Multiple(Vec<f64>),
}

impl Default for AzimuthPlacement {
    fn default() -> Self {
        AzimuthPlacement::Single(0.0)
    }
}

impl AzimuthPlacement {
    /// `count` copies spaced evenly over a full turn, the first at `start`
    pub fn evenly_spaced(count: usize, start: f64) -> Self {
        let step = 360.0 / count.max(1) as f64;
        AzimuthPlacement::Multiple((0..count).map(|i| start + i as f64 * step).collect())
    }

    pub fn angles(&self) -> Vec<f64> {
        match self {
            AzimuthPlacement::Single(angle) => vec![*angle],
            AzimuthPlacement::Multiple(angles) => angles.clone(),
        }
    }

    /// Number of copies placed
    pub fn len(&self) -> usize {
        match self {
            AzimuthPlacement::Single(_) => 1,
            AzimuthPlacement::Multiple(angles) => angles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<f64> for AzimuthPlacement {
    fn from(angle: f64) -> Self {
        AzimuthPlacement::Single(angle)
    }
}

impl From<Vec<f64>> for AzimuthPlacement {
    fn from(angles: Vec<f64>) -> Self {
        AzimuthPlacement::Multiple(angles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evenly_spaced() {
        assert_eq!(
            AzimuthPlacement::evenly_spaced(6, 0.0).angles(),
            vec![0.0, 60.0, 120.0, 180.0, 240.0, 300.0]
        );
        assert_eq!(
            AzimuthPlacement::evenly_spaced(4, 20.0).angles(),
            vec![20.0, 110.0, 200.0, 290.0]
        );
    }

    #[test]
    fn test_single() {
        let placement = AzimuthPlacement::default();
        assert_eq!(placement.angles(), vec![0.0]);
        assert_eq!(placement.len(), 1);
        assert!(AzimuthPlacement::Multiple(vec![]).is_empty());
    }
}
