// Artifact storage for pipeline outputs
//
// Charts, reports and infographics are written to a flat outputs
// directory with timestamp-suffixed filenames so concurrent stages never
// collide. There is no manifest and no retention policy; filename order
// is the only index.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

pub type ArtifactResult<T> = Result<T, String>;

/// Flat on-disk store for generated artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> ArtifactResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| format!("Failed to create outputs dir '{}': {}", root.display(), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filename for a chart artifact, e.g. `chart_142530.svg`
    pub fn chart_name() -> String {
        format!("chart_{}.svg", Local::now().format("%H%M%S"))
    }

    /// Filename for a report artifact, e.g. `report_20260115_142530.html`
    pub fn report_name() -> String {
        format!("report_{}.html", Local::now().format("%Y%m%d_%H%M%S"))
    }

    /// Filename for an infographic artifact, e.g. `infographic_142530.png`
    pub fn infographic_name() -> String {
        format!("infographic_{}.png", Local::now().format("%H%M%S"))
    }

    /// Write a text artifact, returning its full path
    pub fn save_text(&self, name: &str, content: &str) -> ArtifactResult<PathBuf> {
        self.save_bytes(name, content.as_bytes())
    }

    /// Write a binary artifact, returning its full path
    pub fn save_bytes(&self, name: &str, bytes: &[u8]) -> ArtifactResult<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, bytes)
            .map_err(|e| format!("Failed to write artifact '{}': {}", path.display(), e))?;
        log::info!("Saved artifact: {}", path.display());
        Ok(path)
    }

    /// List artifact filenames, newest first by name
    pub fn list(&self) -> ArtifactResult<Vec<String>> {
        let mut names = Vec::new();

        let entries = fs::read_dir(&self.root)
            .map_err(|e| format!("Failed to read outputs dir '{}': {}", self.root.display(), e))?;

        for entry in entries.flatten() {
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        names.sort();
        names.reverse();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("outputs");
        assert!(!root.exists());

        let store = ArtifactStore::open(&root).unwrap();
        assert!(store.root().exists());
    }

    #[test]
    fn test_save_and_list() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();

        store.save_text("report_a.html", "<html></html>").unwrap();
        store.save_bytes("chart_b.svg", b"<svg/>").unwrap();

        let names = store.list().unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"report_a.html".to_string()));
        assert!(names.contains(&"chart_b.svg".to_string()));
    }

    #[test]
    fn test_artifact_names_carry_extensions() {
        assert!(ArtifactStore::chart_name().starts_with("chart_"));
        assert!(ArtifactStore::chart_name().ends_with(".svg"));
        assert!(ArtifactStore::report_name().starts_with("report_"));
        assert!(ArtifactStore::report_name().ends_with(".html"));
        assert!(ArtifactStore::infographic_name().ends_with(".png"));
    }
}
