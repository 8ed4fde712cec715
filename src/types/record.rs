use serde::{Deserialize, Serialize};

/// Display summary of a parsed certificate, as kept on the shelf.
///
/// `from` and `to` stay in the certificate's compact timestamp encoding; use
/// [`format_compact_time`](super::format_compact_time) to render them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateRecord {
    pub name: String,
    pub cn: String,
    pub from: String,
    pub to: String,
}

impl CertificateRecord {
    pub fn valid_from(&self) -> String {
        super::format_compact_time(&self.from)
    }

    pub fn valid_to(&self) -> String {
        super::format_compact_time(&self.to)
    }
}
