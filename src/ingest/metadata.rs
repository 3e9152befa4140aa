use sha2::{Sha256, Digest};
use std::path::Path;
use crate::error::Result;

/// Compute SHA256 hash of file contents
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Stable dump id: SHA256 of the dump's relative path.
pub fn dump_id(relative_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(relative_path.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use std::fs;

    #[test]
    fn test_compute_file_hash() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.nt");
        fs::write(&file_path, "test content").unwrap();

        let hash = compute_file_hash(&file_path).unwrap();
        assert_eq!(hash.len(), 64); // SHA256 produces 64 hex chars

        fs::write(&file_path, "other content").unwrap();
        assert_ne!(compute_file_hash(&file_path).unwrap(), hash);
    }

    #[test]
    fn test_dump_id_depends_on_path_only() {
        assert_eq!(dump_id("film/films.nt"), dump_id("film/films.nt"));
        assert_ne!(dump_id("film/films.nt"), dump_id("people.nt"));
        assert_eq!(dump_id("people.nt").len(), 64);
    }
}
