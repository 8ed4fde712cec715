use crate::{error::AppResult, types::CertificateRecord};
use std::collections::HashSet;

mod repository;

pub use repository::{JsonFileRepository, MemoryRepository, RecordRepository};

/// Ordered shelf of certificate summaries, unique by `name`, mirrored to a
/// [`RecordRepository`] on every mutation.
#[derive(Debug)]
pub struct Store {
    records: Vec<CertificateRecord>,
    repository: Box<dyn RecordRepository>,
}

impl Store {
    pub fn open(repository: impl RecordRepository + 'static) -> AppResult<Self> {
        let mut repository: Box<dyn RecordRepository> = Box::new(repository);
        let records = Self::load(repository.as_mut())?;
        Ok(Self {
            records,
            repository,
        })
    }

    /// Reads the persisted shelf. A shelf that does not match the record
    /// schema is moved aside and treated as empty.
    pub fn load(repository: &mut dyn RecordRepository) -> AppResult<Vec<CertificateRecord>> {
        let Some(contents) = repository.read()? else {
            debug!("No persisted shelf, starting empty");
            return Ok(Vec::new());
        };

        let records = match serde_json::from_slice::<Option<Vec<CertificateRecord>>>(&contents) {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                warn!("Persisted shelf is malformed, starting empty: {}", e);
                return Self::discard(repository);
            }
        };

        if records.iter().any(|record| record.name.is_empty()) {
            warn!("Persisted shelf has a record without a name, starting empty");
            return Self::discard(repository);
        }

        let mut seen = HashSet::new();
        let total = records.len();
        let records: Vec<CertificateRecord> = records
            .into_iter()
            .filter(|record| seen.insert(record.name.clone()))
            .collect();
        if records.len() != total {
            warn!(
                "Dropped {} duplicate record(s) from the persisted shelf",
                total - records.len()
            );
        }

        debug!("Loaded {} record(s) from the persisted shelf", records.len());
        Ok(records)
    }

    fn discard(repository: &mut dyn RecordRepository) -> AppResult<Vec<CertificateRecord>> {
        if let Some(moved) = repository.quarantine()? {
            warn!("The unreadable shelf was moved to {}", moved);
        }
        Ok(Vec::new())
    }

    /// Appends `record` unless one with the same name is already shelved.
    /// Returns whether it was inserted.
    pub fn add(&mut self, record: CertificateRecord) -> AppResult<bool> {
        if self.contains(&record.name) {
            debug!("Certificate {:?} is already shelved", record.name);
            return Ok(false);
        }

        self.records.push(record);
        if let Err(e) = self.repository.save(&self.records) {
            self.records.pop();
            return Err(e);
        }
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<&CertificateRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CertificateRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[CertificateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{AppError, ErrorReason};

    fn record(name: &str, cn: &str) -> CertificateRecord {
        CertificateRecord {
            name: name.into(),
            cn: cn.into(),
            from: "240101000000Z".into(),
            to: "250101000000Z".into(),
        }
    }

    #[test]
    fn starts_empty_without_persisted_state() {
        let store = Store::open(MemoryRepository::default()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn first_occurrence_wins() {
        let repo = MemoryRepository::default();
        let mut store = Store::open(repo.clone()).unwrap();
        assert!(store.add(record("ACME Corp", "first")).unwrap());
        assert!(!store.add(record("ACME Corp", "second")).unwrap());
        assert!(store.add(record("Globex", "third")).unwrap());

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("ACME Corp").unwrap().cn, "first");
        let names: Vec<_> = store.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["ACME Corp", "Globex"]);
    }

    #[test]
    fn every_insert_is_persisted_and_survives_restart() {
        let repo = MemoryRepository::default();
        let mut store = Store::open(repo.clone()).unwrap();
        store.add(record("ACME Corp", "ACME Root CA")).unwrap();
        store.add(record("Globex", "Globex Issuing CA")).unwrap();

        let reopened = Store::open(repo.clone()).unwrap();
        assert_eq!(reopened.records(), store.records());
    }

    #[test]
    fn reads_plain_record_arrays() {
        let repo = MemoryRepository::with_contents(
            r#"[{"name":"ACME Corp","cn":"ACME Root CA","from":"240101000000Z","to":"250101000000Z"}]"#,
        );
        let store = Store::open(repo).unwrap();
        assert_eq!(store.records(), [record("ACME Corp", "ACME Root CA")]);

        let store = Store::open(MemoryRepository::with_contents("null")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_shelf_is_quarantined() {
        for contents in [
            "{not json",
            r#"{"name":"ACME Corp"}"#,
            r#"[{"name":"ACME Corp","cn":"x"}]"#,
            r#"[{"name":"","cn":"x","from":"a","to":"b"}]"#,
        ] {
            let repo = MemoryRepository::with_contents(contents);
            let store = Store::open(repo.clone()).unwrap();
            assert!(store.is_empty(), "{contents}");
            assert_eq!(repo.contents(), None, "{contents}");
        }
    }

    #[test]
    fn malformed_shelf_file_is_moved_aside_and_replaced() {
        for contents in [&[0xff, 0xfe, b'[', b']'][..], &b"{not json"[..]] {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("shelf.json");
            let corrupt = dir.path().join("shelf.json.corrupt");
            std::fs::write(&path, contents).unwrap();

            let mut store = Store::open(JsonFileRepository::new(&path)).unwrap();
            assert!(store.is_empty());
            assert!(!path.exists());
            assert_eq!(std::fs::read(&corrupt).unwrap(), contents);

            store.add(record("ACME Corp", "ACME Root CA")).unwrap();
            let reopened = Store::open(JsonFileRepository::new(&path)).unwrap();
            assert_eq!(reopened.records(), [record("ACME Corp", "ACME Root CA")]);
            assert_eq!(std::fs::read(&corrupt).unwrap(), contents);
        }
    }

    #[test]
    fn duplicate_names_are_dropped_on_load() {
        let first = record("ACME Corp", "first");
        let second = record("ACME Corp", "second");
        let contents = serde_json::to_string(&[first.clone(), second]).unwrap();
        let store = Store::open(MemoryRepository::with_contents(contents)).unwrap();
        assert_eq!(store.records(), [first]);
    }

    #[derive(Debug)]
    struct ReadOnlyRepository;

    impl RecordRepository for ReadOnlyRepository {
        fn read(&self) -> AppResult<Option<Vec<u8>>> {
            Ok(None)
        }

        fn write(&mut self, _contents: &str) -> AppResult<()> {
            Err(AppError::from(std::io::Error::from(
                std::io::ErrorKind::PermissionDenied,
            )))
        }

        fn quarantine(&mut self) -> AppResult<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn failed_persist_rolls_back() {
        let mut store = Store::open(ReadOnlyRepository).unwrap();
        let err = store.add(record("ACME Corp", "ACME Root CA")).unwrap_err();
        assert!(matches!(err.reason(), ErrorReason::Io(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.json");
        let mut store = Store::open(JsonFileRepository::new(&path)).unwrap();
        store.add(record("ACME Corp", "ACME Root CA")).unwrap();

        let reopened = Store::open(JsonFileRepository::new(&path)).unwrap();
        assert_eq!(reopened.records(), store.records());
    }
}
