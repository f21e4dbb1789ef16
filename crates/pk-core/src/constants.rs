//! Global constants for pk-core

/// Default color for shapes (gray, RGBA)
pub const DEFAULT_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

pub const PLASMA_COLOR: [f32; 4] = [0.93, 0.45, 0.73, 0.6];
pub const BLANKET_COLOR: [f32; 4] = [0.36, 0.64, 0.34, 1.0];
pub const SHIELD_COLOR: [f32; 4] = [0.52, 0.52, 0.74, 1.0];
pub const DIVERTOR_COLOR: [f32; 4] = [0.92, 0.56, 0.2, 1.0];
pub const COIL_COLOR: [f32; 4] = [0.72, 0.45, 0.2, 1.0];
pub const COIL_CASE_COLOR: [f32; 4] = [0.6, 0.6, 0.62, 1.0];
pub const VESSEL_COLOR: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

/// Boundary samples used for plasma outlines
pub const DEFAULT_PLASMA_POINTS: usize = 50;

/// Samples per surface for blankets following the plasma
pub const DEFAULT_BLANKET_POINTS: usize = 50;

/// Points on each quarter of a Princeton-D coil
pub const PRINCETON_D_SEGMENT_POINTS: usize = 70;

/// Name of the graveyard shape in neutronics descriptions
pub const GRAVEYARD_NAME: &str = "graveyard";

/// File the graveyard mesh is written to
pub const GRAVEYARD_STL_FILENAME: &str = "graveyard.stl";
