use walkdir::WalkDir;
use std::path::{Path, PathBuf};
use crate::error::{QaError, Result};

/// Extensions recognised as triple dumps; `gz` dumps are read through a decoder.
pub const DUMP_EXTENSIONS: &[&str] = &["nt", "ttl", "tsv", "txt", "triples", "gz"];

/// Metadata for a discovered dump file
#[derive(Debug, Clone)]
pub struct DumpFile {
    /// Path relative to the discovery root; the dump's identity in the index.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub file_size: u64,
}

/// Discover dump files under `root`.
///
/// `root` may be a single dump file or a directory that is walked
/// recursively. Extensions are matched case-insensitively.
pub fn discover_dumps(root: &Path) -> Result<Vec<DumpFile>> {
    if !root.exists() {
        return Err(QaError::Config(format!("Dump path does not exist: {}", root.display())));
    }

    let base = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };

    let mut dumps = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_dump(path) {
            continue;
        }

        let metadata = std::fs::metadata(path)?;
        let relative_path = path
            .strip_prefix(base)
            .map_err(|_| QaError::Config(format!("Failed to compute relative path for: {}", path.display())))?
            .to_string_lossy()
            .replace('\\', "/");

        dumps.push(DumpFile {
            relative_path,
            absolute_path: path.to_path_buf(),
            file_size: metadata.len(),
        });
    }

    log::info!("Discovered {} dump file(s) in {}", dumps.len(), root.display());
    Ok(dumps)
}

fn is_dump(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    DUMP_EXTENSIONS.contains(&extension.as_str())
}
