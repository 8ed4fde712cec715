use crate::{error::AppResult, types::CertificateRecord};
use std::{
    fmt::Debug,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::{Arc, Mutex},
};

/// Durable slot holding the whole shelf.
pub trait RecordRepository: Debug + Send {
    /// Raw persisted bytes, `None` if nothing was ever saved. The bytes are
    /// not checked here, not even for UTF-8.
    fn read(&self) -> AppResult<Option<Vec<u8>>>;

    /// Overwrites the slot.
    fn write(&mut self, contents: &str) -> AppResult<()>;

    /// Moves an unreadable slot out of the way. Returns where it went, if
    /// anywhere.
    fn quarantine(&mut self) -> AppResult<Option<String>>;

    fn save(&mut self, records: &[CertificateRecord]) -> AppResult<()> {
        let contents = serde_json::to_string(records)?;
        self.write(&contents)
    }
}

#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

impl RecordRepository for JsonFileRepository {
    fn read(&self) -> AppResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, contents: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Write next to the target and rename, so readers never see half a shelf.
        let staging = self.sibling(".tmp");
        fs::write(&staging, contents)?;
        fs::rename(&staging, &self.path)?;
        trace!("Wrote {} bytes to {}", contents.len(), self.path.display());
        Ok(())
    }

    fn quarantine(&mut self) -> AppResult<Option<String>> {
        let target = self.sibling(".corrupt");
        match fs::rename(&self.path, &target) {
            Ok(()) => Ok(Some(target.display().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory slot. Clones share the same slot, which lets tests simulate a
/// restart by opening a second store on a clone.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryRepository {
    #[cfg(test)]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds the last complete write.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecordRepository for MemoryRepository {
    fn read(&self) -> AppResult<Option<Vec<u8>>> {
        Ok(self.contents().map(String::into_bytes))
    }

    fn write(&mut self, contents: &str) -> AppResult<()> {
        *self.lock() = Some(contents.to_owned());
        Ok(())
    }

    fn quarantine(&mut self) -> AppResult<Option<String>> {
        Ok(self.lock().take().map(|_| "memory".to_owned()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn file_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = JsonFileRepository::new(dir.path().join("nested/shelf.json"));
        assert_eq!(repo.read().unwrap(), None);

        repo.write("[]").unwrap();
        assert_eq!(repo.read().unwrap().as_deref(), Some(&b"[]"[..]));
        assert!(!dir.path().join("nested/shelf.json.tmp").exists());
    }

    #[test]
    fn file_repository_quarantine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.json");
        let mut repo = JsonFileRepository::new(&path);
        assert_eq!(repo.quarantine().unwrap(), None);

        fs::write(&path, "{not json").unwrap();
        let moved = repo.quarantine().unwrap().unwrap();
        assert!(moved.ends_with("shelf.json.corrupt"));
        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("shelf.json.corrupt")).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn memory_repository_clones_share_slot() {
        let repo = MemoryRepository::default();
        let mut writer = repo.clone();
        writer.write("[]").unwrap();
        assert_eq!(repo.contents().as_deref(), Some("[]"));
    }
}
