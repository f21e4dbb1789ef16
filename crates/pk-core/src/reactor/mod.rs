//! Reactors: named collections of shapes built and exported together

mod ball;
mod submersion;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glam::DVec2;
use pk_cad::{BoundingBox, CadKernel, Solid, Workplane};
use tracing::{debug, info, warn};

use crate::components::rectangle;
use crate::constants::{DEFAULT_COLOR, GRAVEYARD_NAME, GRAVEYARD_STL_FILENAME};
use crate::export::{
    ExportError, ExportOptions, NeutronicsEntry, sanitize_filename, save_stl,
    write_neutronics_description,
};
use crate::shape::{Shape, ShapeError};

pub use ball::BallReactor;
pub use submersion::SubmersionTokamak;

/// Wall thickness of the graveyard shell
pub const GRAVEYARD_THICKNESS: f64 = 10.0;

/// Filename of the neutronics description written next to the STL files
pub const NEUTRONICS_DESCRIPTION_FILENAME: &str = "manifest.json";

/// Reactor-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReactorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Reactor has no shapes")]
    Empty,
    #[error(transparent)]
    Component(#[from] ShapeError),
    #[error("Shape {name}: {source}")]
    Shape {
        name: String,
        #[source]
        source: ShapeError,
    },
    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type ReactorResult<T> = Result<T, ReactorError>;

/// A parametric reactor design that lays out its shapes from a radial and vertical build
pub trait ParametricReactor {
    fn name(&self) -> &str;

    /// Shapes in build order
    fn shapes(&self) -> ReactorResult<Vec<Shape>>;

    fn reactor(&self) -> ReactorResult<Reactor> {
        Ok(Reactor::new(self.name()).with_shapes(self.shapes()?))
    }
}

/// A shape together with its built solid
#[derive(Debug, Clone)]
pub struct BuiltShape {
    pub shape: Shape,
    pub solid: Solid,
}

/// Named collection of shapes
#[derive(Debug, Clone)]
pub struct Reactor {
    pub name: String,
    shapes: Vec<Shape>,
}

/// What [`Reactor::export`] wrote
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub stl_files: Vec<PathBuf>,
    pub neutronics_description: Option<PathBuf>,
}

impl Reactor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shapes: Vec::new(),
        }
    }

    pub fn with_shapes(mut self, shapes: Vec<Shape>) -> Self {
        self.shapes.extend(shapes);
        self
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.name == name)
    }

    pub fn shape_names(&self) -> Vec<&str> {
        self.shapes.iter().map(|s| s.name.as_str()).collect()
    }

    /// Build every shape in order
    pub fn build(&self, kernel: &dyn CadKernel) -> ReactorResult<Vec<BuiltShape>> {
        if self.shapes.is_empty() {
            return Err(ReactorError::Empty);
        }
        info!("Building reactor {} ({} shapes)", self.name, self.shapes.len());
        self.shapes
            .iter()
            .map(|shape| {
                debug!("Building {}", shape.name);
                let solid = shape.solid(kernel).map_err(|source| ReactorError::Shape {
                    name: shape.name.clone(),
                    source,
                })?;
                Ok(BuiltShape {
                    shape: shape.clone(),
                    solid,
                })
            })
            .collect()
    }

    /// Volume of every shape, by name
    pub fn volumes(&self, kernel: &dyn CadKernel) -> ReactorResult<Vec<(String, f64)>> {
        Ok(self
            .build(kernel)?
            .iter()
            .map(|built| (built.shape.name.clone(), kernel.volume(&built.solid)))
            .collect())
    }

    /// Bounds of all built shapes
    pub fn bounding_box(&self, kernel: &dyn CadKernel) -> ReactorResult<BoundingBox> {
        Ok(bounds_of(kernel, &self.build(kernel)?))
    }

    /// Hollow cube around the reactor, `offset` clear of its largest extent
    pub fn make_graveyard(&self, kernel: &dyn CadKernel, offset: f64) -> ReactorResult<Shape> {
        graveyard_around(&self.bounding_box(kernel)?, offset)
    }

    /// Files are compared as written, after sanitising
    fn check_unique_filenames(&self, with_graveyard: bool) -> ReactorResult<()> {
        let mut seen = HashSet::new();
        let graveyard = with_graveyard.then(|| GRAVEYARD_STL_FILENAME.to_string());
        let filenames = self
            .shapes
            .iter()
            .map(|shape| sanitize_filename(&shape.stl_filename_or_default()))
            .chain(graveyard);
        for filename in filenames {
            if !seen.insert(filename.clone()) {
                return Err(ExportError::DuplicateFilename(filename).into());
            }
        }
        Ok(())
    }

    /// Write one STL file per shape into `dir`
    pub fn export_stl(
        &self,
        kernel: &dyn CadKernel,
        dir: impl AsRef<Path>,
    ) -> ReactorResult<Vec<PathBuf>> {
        self.check_unique_filenames(false)?;
        let built = self.build(kernel)?;
        write_stl_files(kernel, &built, dir.as_ref())
    }

    /// Material and file entries for every shape
    ///
    /// The plasma is left out unless `include_plasma`; the graveyard, when
    /// given, is appended last.
    pub fn neutronics_description(
        &self,
        include_plasma: bool,
        graveyard: Option<&Shape>,
    ) -> Vec<NeutronicsEntry> {
        self.shapes
            .iter()
            .filter(|shape| include_plasma || !is_plasma(shape))
            .chain(graveyard)
            .map(|shape| NeutronicsEntry {
                material: shape
                    .material_tag
                    .clone()
                    .unwrap_or_else(|| shape.name.clone()),
                stp_filename: shape.stp_filename.clone(),
                stl_filename: sanitize_filename(&shape.stl_filename_or_default()),
            })
            .collect()
    }

    /// Write the neutronics description to `path`
    pub fn export_neutronics_description(
        &self,
        path: impl AsRef<Path>,
        include_plasma: bool,
        graveyard: Option<&Shape>,
    ) -> ReactorResult<()> {
        let entries = self.neutronics_description(include_plasma, graveyard);
        write_neutronics_description(&entries, path)?;
        Ok(())
    }

    /// Build once and write everything `options` asks for
    pub fn export(
        &self,
        kernel: &dyn CadKernel,
        options: &ExportOptions,
    ) -> ReactorResult<ExportSummary> {
        self.check_unique_filenames(options.include_graveyard)?;
        let mut built = self.build(kernel)?;
        let mut summary = ExportSummary::default();

        let graveyard = if options.include_graveyard {
            let shape = graveyard_around(&bounds_of(kernel, &built), options.graveyard_offset)?;
            let solid = shape.solid(kernel).map_err(|source| ReactorError::Shape {
                name: shape.name.clone(),
                source,
            })?;
            built.push(BuiltShape {
                shape: shape.clone(),
                solid,
            });
            Some(shape)
        } else {
            None
        };

        if options.export_stl {
            summary.stl_files = write_stl_files(kernel, &built, &options.output_dir)?;
        }
        if options.export_neutronics_description {
            std::fs::create_dir_all(&options.output_dir)
                .map_err(|e| ExportError::Io(e.to_string()))?;
            let path = options.output_dir.join(NEUTRONICS_DESCRIPTION_FILENAME);
            self.export_neutronics_description(&path, options.include_plasma, graveyard.as_ref())?;
            info!("Wrote neutronics description {}", path.display());
            summary.neutronics_description = Some(path);
        }
        Ok(summary)
    }
}

/// Every named thickness must be positive
pub(crate) fn check_positive(values: &[(&str, f64)]) -> ReactorResult<()> {
    match values.iter().find(|(_, v)| !(*v > 0.0)) {
        Some((name, value)) => Err(ReactorError::InvalidParameter(format!(
            "{} must be positive, got {}",
            name, value
        ))),
        None => Ok(()),
    }
}

pub(crate) fn check_rotation(angle: f64) -> ReactorResult<()> {
    if !(angle > 0.0 && angle <= 360.0) {
        return Err(ReactorError::InvalidParameter(format!(
            "rotation angle must be in (0, 360], got {}",
            angle
        )));
    }
    if angle == 360.0 {
        warn!("Rotation angle is 360 degrees, building full rings");
    }
    Ok(())
}

fn is_plasma(shape: &Shape) -> bool {
    shape.name == "plasma"
}

fn bounds_of(kernel: &dyn CadKernel, built: &[BuiltShape]) -> BoundingBox {
    built
        .iter()
        .map(|b| kernel.bounding_box(&b.solid))
        .fold(BoundingBox::empty(), |acc, bbox| acc.merge(&bbox))
}

fn write_stl_files(
    kernel: &dyn CadKernel,
    built: &[BuiltShape],
    dir: &Path,
) -> ReactorResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::Io(e.to_string()))?;
    let mut paths = Vec::with_capacity(built.len());
    for b in built {
        let path = dir.join(sanitize_filename(&b.shape.stl_filename_or_default()));
        save_stl(kernel, &b.solid, &path)?;
        info!("Wrote {} ({})", path.display(), b.shape.name);
        paths.push(path);
    }
    Ok(paths)
}

fn graveyard_around(bbox: &BoundingBox, offset: f64) -> ReactorResult<Shape> {
    if bbox.is_empty() {
        return Err(ReactorError::Empty);
    }
    if !(offset >= 0.0) {
        return Err(ReactorError::InvalidParameter(format!(
            "graveyard offset must not be negative, got {}",
            offset
        )));
    }
    let reach = [bbox.min, bbox.max]
        .iter()
        .map(|p| p.abs().max_element())
        .fold(0.0_f64, f64::max);
    let inner = reach + offset;
    let outer = inner + GRAVEYARD_THICKNESS;
    let square = |half: f64| rectangle(DVec2::splat(-half), DVec2::splat(half));
    Ok(Shape::extrude_straight(&square(outer), 2.0 * outer)
        .with_workplane(Workplane::XY)
        .with_cut(Shape::extrude_straight(&square(inner), 2.0 * inner).with_workplane(Workplane::XY))
        .with_name(GRAVEYARD_NAME)
        .with_color(DEFAULT_COLOR)
        .with_material_tag("Graveyard")
        .with_stp_filename("graveyard.stp")
        .with_stl_filename(GRAVEYARD_STL_FILENAME))
}
