//! Storage backed by one JSON file per key in a data directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::Storage;
use crate::error::AgendaResult;

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> AgendaResult<Option<String>> {
        let path = self.path_for(key);

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        debug!(path = %path.display(), bytes = content.len(), "read document");
        Ok(Some(content))
    }

    fn write(&self, key: &str, value: &str) -> AgendaResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let temp = self.dir.join(format!("{}.json.tmp", key));

        // Write-then-rename so a document is never left half-written
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;

        debug!(path = %path.display(), bytes = value.len(), "wrote document");
        Ok(())
    }

    fn remove(&self, key: &str) -> AgendaResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!(path = %path.display(), "removed document");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));

        assert_eq!(storage.read("agendaPro_citas").unwrap(), None);

        storage.write("agendaPro_citas", "[]").unwrap();
        assert_eq!(
            storage.read("agendaPro_citas").unwrap().as_deref(),
            Some("[]")
        );
        assert!(dir.path().join("data/agendaPro_citas.json").exists());
        assert!(!dir.path().join("data/agendaPro_citas.json.tmp").exists());

        storage.write("agendaPro_citas", "[1]").unwrap();
        assert_eq!(
            storage.read("agendaPro_citas").unwrap().as_deref(),
            Some("[1]")
        );

        storage.remove("agendaPro_citas").unwrap();
        assert_eq!(storage.read("agendaPro_citas").unwrap(), None);
        storage.remove("agendaPro_citas").unwrap();
    }
}
