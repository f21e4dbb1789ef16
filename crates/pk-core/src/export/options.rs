//! Export options for reactor output

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_graveyard_offset() -> f64 {
    100.0
}

/// What a reactor build writes and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Output directory
    pub output_dir: PathBuf,
    /// Write one binary STL per shape
    pub export_stl: bool,
    /// Write `manifest.json` describing materials and files
    pub export_neutronics_description: bool,
    /// Include the plasma in the neutronics description
    pub include_plasma: bool,
    /// Add a graveyard shell around the reactor
    pub include_graveyard: bool,
    /// Gap between the reactor and the inside of the graveyard
    #[serde(default = "default_graveyard_offset")]
    pub graveyard_offset: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            export_stl: true,
            export_neutronics_description: true,
            include_plasma: false,
            include_graveyard: true,
            graveyard_offset: default_graveyard_offset(),
        }
    }
}
