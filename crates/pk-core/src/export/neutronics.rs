//! Neutronics description: which material fills which exported file

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ExportError, ExportResult};

/// One material volume in the neutronics description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutronicsEntry {
    pub material: String,
    pub stp_filename: Option<String>,
    pub stl_filename: String,
}

/// Write the entries as a pretty-printed JSON array
pub fn write_neutronics_description(
    entries: &[NeutronicsEntry],
    path: impl AsRef<Path>,
) -> ExportResult<()> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    std::fs::write(path.as_ref(), json).map_err(|e| ExportError::Io(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_description() {
        let entries = vec![NeutronicsEntry {
            material: "blanket_mat".to_string(),
            stp_filename: Some("blanket.stp".to_string()),
            stl_filename: "blanket.stl".to_string(),
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        write_neutronics_description(&entries, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<NeutronicsEntry> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, entries);
        assert!(content.contains("\"material\": \"blanket_mat\""));
    }
}
