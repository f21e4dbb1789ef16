//! Reactor design files

use std::path::Path;
use std::str::FromStr;

use pk_cad::{CsgKernel, KernelSettings};
use serde::{Deserialize, Serialize};

use crate::export::ExportOptions;
use crate::reactor::{BallReactor, ParametricReactor, Reactor, ReactorResult, SubmersionTokamak};

/// Current design file format version
pub const DESIGN_VERSION: u32 = 1;

/// Parameters of one of the parametric reactors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReactorParams {
    Ball(BallReactor),
    Submersion(SubmersionTokamak),
}

impl ReactorParams {
    pub fn parametric(&self) -> &dyn ParametricReactor {
        match self {
            ReactorParams::Ball(reactor) => reactor,
            ReactorParams::Submersion(reactor) => reactor,
        }
    }
}

/// A reactor design: what to build, how finely, and where to write it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorDesign {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub kernel: KernelSettings,
    pub reactor: ReactorParams,
    #[serde(default)]
    pub output: ExportOptions,
}

fn default_version() -> u32 {
    DESIGN_VERSION
}

impl ReactorDesign {
    pub fn new(name: impl Into<String>, reactor: ReactorParams) -> Self {
        Self {
            version: DESIGN_VERSION,
            name: name.into(),
            kernel: KernelSettings::default(),
            reactor,
            output: ExportOptions::default(),
        }
    }

    /// Starter design for `kind` (`ball` or `submersion`)
    pub fn template(kind: &str) -> Result<Self, ProjectError> {
        match kind.to_ascii_lowercase().as_str() {
            "ball" => Ok(Self::new("ball_reactor", ReactorParams::Ball(BallReactor::default()))),
            "submersion" => Ok(Self::new(
                "submersion_tokamak",
                ReactorParams::Submersion(SubmersionTokamak::default()),
            )),
            other => Err(ProjectError::UnknownReactor(other.to_string())),
        }
    }

    pub fn kernel(&self) -> CsgKernel {
        CsgKernel::new(self.kernel)
    }

    /// Lay out the reactor's shapes
    pub fn reactor(&self) -> ReactorResult<Reactor> {
        let mut reactor = self.reactor.parametric().reactor()?;
        reactor.name = self.name.clone();
        Ok(reactor)
    }

    /// Save design to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ProjectError::Io(e.to_string()))?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ProjectError> {
        Ok(self.to_ron()?.into_bytes())
    }

    pub fn to_ron(&self) -> Result<String, ProjectError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ProjectError::Serialize(e.to_string()))
    }

    /// Load design from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ProjectError::Io(e.to_string()))?;
        content.parse()
    }

    pub fn load_from_bytes(data: &[u8]) -> Result<Self, ProjectError> {
        std::str::from_utf8(data)
            .map_err(|e| ProjectError::Deserialize(e.to_string()))?
            .parse()
    }
}

impl FromStr for ReactorDesign {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let design: ReactorDesign =
            ron::from_str(s).map_err(|e| ProjectError::Deserialize(e.to_string()))?;
        if design.version > DESIGN_VERSION {
            return Err(ProjectError::UnsupportedVersion(design.version));
        }
        Ok(design)
    }
}

/// Design-file errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Unsupported design version {0}")]
    UnsupportedVersion(u32),
    #[error("Unknown reactor kind '{0}', expected 'ball' or 'submersion'")]
    UnknownReactor(String),
}
