use crate::{
    configs::{ExtractionMode, FileContent, GlobalConfig},
    error::{AppResult, ErrorReason},
    store::{JsonFileRepository, MemoryRepository, Store},
    types::{certificate_hex, CertificateRecord, ParsedCertificate},
    view::Alert,
};

/// The shelf plus whatever is currently on screen.
#[derive(Debug)]
pub struct Session {
    store: Store,
    selection: Option<CertificateRecord>,
    mode: ExtractionMode,
}

impl Session {
    pub fn new(store: Store, mode: ExtractionMode) -> Self {
        Self {
            store,
            selection: None,
            mode,
        }
    }

    pub fn load_from_config(config: &GlobalConfig) -> AppResult<Self> {
        let store = if config.store.ephemeral {
            debug!("Using an in-memory shelf");
            Store::open(MemoryRepository::default())?
        } else {
            debug!("Using shelf at {}", config.store.path.display());
            Store::open(JsonFileRepository::new(&config.store.path))?
        };
        Ok(Self::new(store, config.extraction.mode))
    }

    /// Decodes certificate bytes, shelves the summary and selects it.
    ///
    /// Nothing is changed unless every step succeeds. The selection moves to
    /// the new summary even if an entry with the same name was already
    /// shelved.
    pub fn parse(&mut self, bytes: &[u8]) -> AppResult<&CertificateRecord> {
        let hex_text = certificate_hex(bytes)?;
        let certificate = ParsedCertificate::from_hex(&hex_text)?;
        let record = certificate.to_record(self.mode)?;

        match certificate.certificate_identifier() {
            Ok(ident) => debug!("Parsed certificate {} as {:?}", ident, record.name),
            Err(e) => trace!("No identifier for {:?}: {}", record.name, e),
        }

        if self.store.add(record.clone())? {
            info!("Shelved certificate {:?}", record.name);
        }
        Ok(&*self.selection.insert(record))
    }

    pub async fn open(&mut self, source: FileContent) -> AppResult<&CertificateRecord> {
        debug!("Reading certificate from {}", source);
        let bytes = source.load_file().await?;
        self.parse(&bytes)
    }

    /// [`open`](Self::open), with failures logged and turned into the alert
    /// shown to the user.
    pub async fn upload(&mut self, source: FileContent) -> Result<&CertificateRecord, Alert> {
        let label = source.to_string();
        self.open(source).await.map_err(|e| {
            error!("Failed to process certificate {}: {}: {:?}", label, e, e.reason());
            if e.is_input_error() {
                Alert::InvalidCertificate
            } else {
                Alert::Failure(format!("{}: {}", label, e))
            }
        })
    }

    /// Selects a shelved summary without re-reading the certificate.
    pub fn select(&mut self, name: &str) -> AppResult<&CertificateRecord> {
        let record = self
            .store
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorReason::UnknownCertificate(name.to_owned()))?;
        Ok(&*self.selection.insert(record))
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&CertificateRecord> {
        self.selection.as_ref()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }
}
