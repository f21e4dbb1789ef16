//! Binary STL output

use std::io::{BufReader, BufWriter};
use std::path::Path;

use pk_cad::{CadKernel, Solid};

use super::{ExportError, ExportResult};

/// Tessellate a solid and write it as a binary STL file
pub fn save_stl(kernel: &dyn CadKernel, solid: &Solid, path: impl AsRef<Path>) -> ExportResult<()> {
    let path = path.as_ref();
    let mesh = kernel.tessellate(solid)?;
    if mesh.is_empty() {
        return Err(ExportError::MeshExport(format!(
            "{}: tessellation produced no triangles",
            path.display()
        )));
    }

    let triangles: Vec<stl_io::Triangle> = mesh
        .indices
        .chunks_exact(3)
        .map(|t| {
            let [v0, v1, v2] = [t[0], t[1], t[2]].map(|i| mesh.vertices[i as usize]);
            stl_io::Triangle {
                normal: stl_io::Normal::new(mesh.normals[t[0] as usize]),
                vertices: [
                    stl_io::Vertex::new(v0),
                    stl_io::Vertex::new(v1),
                    stl_io::Vertex::new(v2),
                ],
            }
        })
        .collect();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::Io(e.to_string()))?;
    }
    let file = std::fs::File::create(path).map_err(|e| ExportError::Io(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter())
        .map_err(|e| ExportError::MeshExport(e.to_string()))?;
    Ok(())
}

/// Read an STL file back and count its faces
pub fn load_stl_triangle_count(path: impl AsRef<Path>) -> ExportResult<usize> {
    let file = std::fs::File::open(path.as_ref()).map_err(|e| ExportError::Io(e.to_string()))?;
    let mut reader = BufReader::new(file);
    let mesh =
        stl_io::read_stl(&mut reader).map_err(|e| ExportError::MeshExport(e.to_string()))?;
    Ok(mesh.faces.len())
}

/// Replace characters that are awkward in filenames
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
