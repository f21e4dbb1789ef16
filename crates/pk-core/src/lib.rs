//! Parametric fusion reactor geometry
//!
//! This crate provides:
//! - Parametric shapes built from point lists by rotation, extrusion or sweep
//! - Reactor components: plasma, blankets, shields, coils, divertors, vessels, cutters
//! - Parametric reactors assembled from radial and vertical builds
//! - STL and neutronics description export, and RON design files

pub mod components;
pub mod constants;
pub mod export;
pub mod project;
pub mod reactor;
pub mod shape;

// Re-exports for convenience
pub use components::Component;
pub use export::{ExportError, ExportOptions, ExportResult, NeutronicsEntry};
pub use project::{ProjectError, ReactorDesign, ReactorParams};
pub use reactor::{
    BallReactor, ParametricReactor, Reactor, ReactorError, ReactorResult, SubmersionTokamak,
};
pub use shape::{AzimuthPlacement, Connection, ProfilePoint, Shape, ShapeError, ShapeResult};
