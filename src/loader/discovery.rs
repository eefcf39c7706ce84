//! Input discovery for log files.
//!
//! Command-line inputs may be individual files or directories. Directories
//! are walked recursively and filtered by extension and exclude names.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Configuration for input discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// File extensions to include (e.g., ["csv"])
    pub extensions: Vec<String>,
    /// Directory or file names to skip (e.g., ["archive"])
    pub excludes: Vec<String>,
    /// Maximum number of files to return
    pub max_files: Option<usize>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["csv".to_string()],
            excludes: Vec::new(),
            max_files: None,
        }
    }
}

impl From<&crate::config::LoaderConfig> for DiscoveryConfig {
    fn from(config: &crate::config::LoaderConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            excludes: config.excludes.clone(),
            max_files: Some(config.max_files),
        }
    }
}

/// Resolves command-line inputs to a list of log files.
pub struct FileDiscovery {
    config: DiscoveryConfig,
}

impl FileDiscovery {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Expand inputs into files.
    ///
    /// Explicit file paths are kept even if they do not exist, so the loader
    /// can report them as missing. Directory contents are sorted by path.
    pub fn discover(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                let mut found = self.walk(input);
                found.sort();
                debug!("Found {} log files under {}", found.len(), input.display());
                files.extend(found);
            } else {
                files.push(input.clone());
            }
        }

        if let Some(max) = self.config.max_files {
            if files.len() > max {
                debug!("Limiting {} discovered files to {}", files.len(), max);
                files.truncate(max);
            }
        }

        files
    }

    /// Check if a file has one of the configured extensions.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    fn walk(&self, root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Cannot read directory entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.matches(entry.path()))
            .map(DirEntry::into_path)
            .collect()
    }

    /// Hidden entries and explicit excludes are skipped.
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.') || self.config.excludes.iter().any(|pattern| name == pattern.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::write(path, "agent_id\n").unwrap();
    }

    #[test]
    fn test_directory_walk_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir(root.join("nested")).unwrap();
        std::fs::create_dir(root.join(".hidden")).unwrap();
        std::fs::create_dir(root.join("archive")).unwrap();
        touch(&root.join("b.csv"));
        touch(&root.join("a.CSV"));
        touch(&root.join("notes.txt"));
        touch(&root.join("nested/c.csv"));
        touch(&root.join(".hidden/d.csv"));
        touch(&root.join("archive/e.csv"));

        let discovery = FileDiscovery::new(DiscoveryConfig {
            excludes: vec!["archive".to_string()],
            ..DiscoveryConfig::default()
        });
        let files = discovery.discover(&[root.to_path_buf()]);

        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv", "nested/c.csv"]);
    }

    #[test]
    fn test_explicit_files_kept_in_order() {
        let discovery = FileDiscovery::new(DiscoveryConfig::default());
        let inputs = vec![PathBuf::from("missing_2.csv"), PathBuf::from("missing_1.txt")];
        assert_eq!(discovery.discover(&inputs), inputs);
    }

    #[test]
    fn test_max_files_limit() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["1.csv", "2.csv", "3.csv"] {
            touch(&temp_dir.path().join(name));
        }
        let discovery = FileDiscovery::new(DiscoveryConfig {
            max_files: Some(2),
            ..DiscoveryConfig::default()
        });
        assert_eq!(discovery.discover(&[temp_dir.path().to_path_buf()]).len(), 2);
    }

    #[test]
    fn test_matches_extension() {
        let discovery = FileDiscovery::new(DiscoveryConfig::default());
        assert!(discovery.matches(Path::new("log.csv")));
        assert!(!discovery.matches(Path::new("log.json")));
        assert!(!discovery.matches(Path::new("csv")));
    }
}
