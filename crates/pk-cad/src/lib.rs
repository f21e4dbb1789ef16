//! Geometry kernel for parametric reactor components
//!
//! This crate provides:
//! - Named workplanes, 2D profiles, splines and arcs
//! - The CadKernel trait for solid modelling operations
//! - A pure-Rust CSG kernel: extrude, revolve, sweep, booleans, placement
//! - Volume, containment and tessellation queries

pub mod geometry;
pub mod kernel;

// Re-exports for convenience
pub use geometry::{
    BoundingBox, CubicSpline, Edge, IntervalSet, Polygon, Profile, SplineCurve, ThreePointArc,
    Workplane,
};
pub use kernel::{
    BooleanType, CadError, CadKernel, CadResult, CsgKernel, Extent, KernelSettings, Solid,
    TessellatedMesh, default_kernel,
};
