// conflux-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Replaces `path` with `content` in one step: readers see the old file or the new
/// one, never a half-written record store.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Same directory, so the final rename never crosses filesystems
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file.flush()?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Reads and deserializes a YAML file.
pub fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces_store_file() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("records.yaml");

        atomic_write(&file_path, "next_id: 1\nrecords: []\n")?;
        atomic_write(&file_path, "next_id: 2\nrecords: []\n")?;

        assert_eq!(fs::read_to_string(&file_path)?, "next_id: 2\nrecords: []\n");
        // No temp files left behind
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_read_yaml_reports_parse_errors() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("broken.yaml");
        fs::write(&file_path, "a: [1, 2")?;

        let err = read_yaml::<BTreeMap<String, Vec<i64>>>(&file_path).unwrap_err();
        assert!(matches!(err, InfrastructureError::YamlError(_)));
        Ok(())
    }
}
