//! Kernel discretisation settings

use serde::{Deserialize, Serialize};

/// Default samples per spline span
pub const DEFAULT_SPLINE_SEGMENTS: usize = 12;

/// Default angular step for arcs (degrees)
pub const DEFAULT_ARC_STEP_DEGREES: f64 = 5.0;

/// Default mesh segments for a full revolution
pub const DEFAULT_REVOLVE_SEGMENTS: usize = 96;

/// Default grid lines per axis when integrating overlap volumes
pub const DEFAULT_VOLUME_RESOLUTION: usize = 200;

/// How finely curves are discretised and volumes integrated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelSettings {
    /// Samples per spline span
    pub spline_segments: usize,
    /// Maximum angle between arc samples (degrees)
    pub arc_step_degrees: f64,
    /// Mesh segments for a full revolution
    pub revolve_segments: usize,
    /// Grid lines per axis for overlap integration
    pub volume_resolution: usize,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            spline_segments: DEFAULT_SPLINE_SEGMENTS,
            arc_step_degrees: DEFAULT_ARC_STEP_DEGREES,
            revolve_segments: DEFAULT_REVOLVE_SEGMENTS,
            volume_resolution: DEFAULT_VOLUME_RESOLUTION,
        }
    }
}

impl KernelSettings {
    pub fn with_spline_segments(mut self, segments: usize) -> Self {
        self.spline_segments = segments.max(1);
        self
    }

    pub fn with_arc_step_degrees(mut self, step: f64) -> Self {
        self.arc_step_degrees = step;
        self
    }

    pub fn with_revolve_segments(mut self, segments: usize) -> Self {
        self.revolve_segments = segments.max(3);
        self
    }

    pub fn with_volume_resolution(mut self, resolution: usize) -> Self {
        self.volume_resolution = resolution.max(1);
        self
    }
}
