//! Planar and spatial geometry used by the kernel

mod bbox;
mod interval;
mod polygon;
mod profile;
mod spline;
mod workplane;

pub use bbox::BoundingBox;
pub use interval::IntervalSet;
pub use polygon::Polygon;
pub use profile::{Edge, Profile, ThreePointArc};
pub use spline::{CubicSpline, SplineCurve};
pub use workplane::Workplane;

pub(crate) use workplane::axis_of;
