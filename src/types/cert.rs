use crate::{
    configs::ExtractionMode,
    error::{AppResult, ErrorReason},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use std::{
    fmt::{Display, Formatter},
    ops::Deref,
};
use x509_certificate::{asn1time::Time, rfc3280::AttributeTypeAndValue, X509Certificate};

use super::CertificateRecord;

const UTC_TIME_FORMAT: &str = "%y%m%d%H%M%SZ";
const GENERALIZED_TIME_FORMAT: &str = "%Y%m%d%H%M%SZ";
const PEM_ARMOR: &[u8] = b"-----BEGIN";

/// Renders certificate bytes the way the decoder consumes them: lowercase
/// hexadecimal, two characters per byte, no separators.
pub fn certificate_hex(bytes: &[u8]) -> AppResult<String> {
    if bytes.is_empty() {
        return Err(ErrorReason::EmptyInput.into());
    }
    Ok(hex::encode(bytes))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCertificate(pub X509Certificate);

impl ParsedCertificate {
    pub fn from_hex(hex_text: &str) -> AppResult<Self> {
        let data = hex::decode(hex_text)?;
        Self::from_bytes(&data)
    }

    /// Accepts either DER or a PEM document whose first block is a certificate.
    pub fn from_bytes(data: &[u8]) -> AppResult<Self> {
        let trimmed = data
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .map(|start| &data[start..])
            .unwrap_or_default();
        if trimmed.is_empty() {
            return Err(ErrorReason::EmptyInput.into());
        }

        if trimmed.starts_with(PEM_ARMOR) {
            let block = pem::parse(trimmed)?;
            match block.tag() {
                "CERTIFICATE" => Ok(Self(X509Certificate::from_der(block.contents())?)),
                tag => Err(ErrorReason::InvalidPemTag(tag.to_owned()).into()),
            }
        } else {
            Ok(Self(X509Certificate::from_der(data)?))
        }
    }

    pub fn serial_number(&self) -> BigUint {
        let number = &self.0.as_ref().tbs_certificate.serial_number;
        BigUint::from_bytes_be(number.as_slice())
    }

    /// Raw notBefore in its compact ASN.1 form.
    pub fn not_before_raw(&self) -> String {
        compact_time(&self.0.as_ref().tbs_certificate.validity.not_before)
    }

    /// Raw notAfter in its compact ASN.1 form.
    pub fn not_after_raw(&self) -> String {
        compact_time(&self.0.as_ref().tbs_certificate.validity.not_after)
    }

    pub fn subject_organization(&self) -> AppResult<Option<String>> {
        first_string(
            self.0.subject_name().iter_organization(),
            "subject organizationName",
        )
    }

    pub fn issuer_organization(&self) -> AppResult<Option<String>> {
        first_string(
            self.0.issuer_name().iter_organization(),
            "issuer organizationName",
        )
    }

    /// First attribute of the subject RDN at `index`, in encoding order.
    /// Further values of a multi-valued RDN are ignored.
    pub fn subject_attribute(&self, index: usize) -> AppResult<Option<String>> {
        first_string(
            self.0
                .subject_name()
                .iter_rdn()
                .filter_map(|rdn| rdn.iter().next())
                .skip(index),
            "positional subject",
        )
    }

    pub fn to_record(&self, mode: ExtractionMode) -> AppResult<CertificateRecord> {
        let (name, cn) = match mode {
            ExtractionMode::Attributes => {
                let name = match self.subject_organization()? {
                    Some(organization) => organization,
                    None => self
                        .subject_common_name()
                        .ok_or(ErrorReason::MissingAttribute("subject organizationName"))?,
                };
                let cn = match self.issuer_common_name() {
                    Some(cn) => cn,
                    None => self
                        .issuer_organization()?
                        .ok_or(ErrorReason::MissingAttribute("issuer commonName"))?,
                };
                (name, cn)
            }
            ExtractionMode::Positional => (
                self.subject_attribute(1)?
                    .ok_or(ErrorReason::MissingAttribute("second subject"))?,
                self.subject_attribute(2)?
                    .ok_or(ErrorReason::MissingAttribute("third subject"))?,
            ),
        };

        Ok(CertificateRecord {
            name,
            cn,
            from: self.not_before_raw(),
            to: self.not_after_raw(),
        })
    }

    pub fn certificate_identifier(&self) -> AppResult<CertificateIdentifier> {
        Ok(CertificateIdentifier {
            serial_number: self.serial_number(),
            fingerprint: self.0.sha256_fingerprint()?.as_ref().to_owned(),
        })
    }
}

impl Deref for ParsedCertificate {
    type Target = X509Certificate;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn first_string<'a>(
    mut attributes: impl Iterator<Item = &'a AttributeTypeAndValue>,
    label: &'static str,
) -> AppResult<Option<String>> {
    attributes
        .next()
        .map(|atv| {
            atv.to_string()
                .map_err(|_| ErrorReason::UnreadableAttribute(label).into())
        })
        .transpose()
}

fn compact_time(time: &Time) -> String {
    match time {
        Time::UtcTime(t) => DateTime::<Utc>::from_timestamp(t.timestamp(), 0)
            .unwrap_or_default()
            .format(UTC_TIME_FORMAT)
            .to_string(),
        Time::GeneralTime(t) => DateTime::<Utc>::from(t.clone())
            .format(GENERALIZED_TIME_FORMAT)
            .to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CertificateIdentifier {
    serial_number: BigUint,
    fingerprint: Vec<u8>,
}

impl Display for CertificateIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}#{}",
            STANDARD.encode(&self.fingerprint),
            &self.serial_number
        )
    }
}
