use crate::{configs::ExtractionMode, session::Session, store::Store, types::CertificateRecord};
use std::fmt::{Display, Formatter};

pub const EMPTY_SHELF: &str = "No certificates yet";
pub const UPLOAD_PROMPT: &str = "Drop a certificate here: open <FILE>";
pub const INVALID_CERTIFICATE: &str = "Invalid format or corrupted file!";

/// What the user is told when an upload fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Alert {
    InvalidCertificate,
    Failure(String),
}

impl Display for Alert {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::InvalidCertificate => f.write_str(INVALID_CERTIFICATE),
            Alert::Failure(reason) => write!(f, "Could not load the certificate: {}", reason),
        }
    }
}

/// Left pane: shelved names in insertion order, the selected one marked.
pub struct ListPane<'a> {
    store: &'a Store,
    selected: Option<&'a str>,
}

impl<'a> ListPane<'a> {
    pub fn new(store: &'a Store, selected: Option<&'a str>) -> Self {
        Self { store, selected }
    }
}

impl Display for ListPane<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.store.is_empty() {
            return f.write_str(EMPTY_SHELF);
        }
        for (i, record) in self.store.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let marker = if Some(record.name.as_str()) == self.selected {
                '>'
            } else {
                ' '
            };
            write!(f, "{} {}", marker, record.name)?;
        }
        Ok(())
    }
}

/// Right pane: the selection's fields, or the upload prompt.
pub struct DetailPane<'a> {
    record: Option<&'a CertificateRecord>,
    mode: ExtractionMode,
}

impl<'a> DetailPane<'a> {
    pub fn new(record: Option<&'a CertificateRecord>, mode: ExtractionMode) -> Self {
        Self { record, mode }
    }

    /// Positional summaries keep the label the field has always had there.
    fn name_label(&self) -> &'static str {
        match self.mode {
            ExtractionMode::Attributes => "Name:",
            ExtractionMode::Positional => "Common Name:",
        }
    }
}

impl Display for DetailPane<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Some(record) = self.record else {
            return f.write_str(UPLOAD_PROMPT);
        };
        writeln!(f, "{:<12} {}", self.name_label(), record.name)?;
        writeln!(f, "{:<12} {}", "Issuer CN:", record.cn)?;
        writeln!(f, "{:<12} {}", "Valid From:", record.valid_from())?;
        write!(f, "{:<12} {}", "Valid To:", record.valid_to())
    }
}

/// Both panes, stacked.
pub struct SessionView<'a>(pub &'a Session);

impl Display for SessionView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let selection = self.0.selection();
        writeln!(
            f,
            "{}",
            ListPane::new(self.0.store(), selection.map(|r| r.name.as_str()))
        )?;
        writeln!(f, "----")?;
        write!(f, "{}", DetailPane::new(selection, self.0.mode()))
    }
}
