//! CAD kernel abstraction
//!
//! This module defines the CadKernel trait and its pure-Rust CSG implementation.

mod bsp;
mod csg;
mod primitive;
mod settings;
mod tessellate;
mod traits;
mod volume;

pub use csg::CsgKernel;
pub use settings::{
    DEFAULT_ARC_STEP_DEGREES, DEFAULT_REVOLVE_SEGMENTS, DEFAULT_SPLINE_SEGMENTS,
    DEFAULT_VOLUME_RESOLUTION, KernelSettings,
};
pub use traits::*;
