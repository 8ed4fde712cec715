#[cfg(feature = "backtrace")]
use backtrace::Backtrace;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    reason: ErrorReason,
    #[cfg(feature = "backtrace")]
    bt: Backtrace,
}

impl AppError {
    pub(crate) fn new(reason: ErrorReason) -> Self {
        Self {
            reason,
            #[cfg(feature = "backtrace")]
            bt: Backtrace::new(),
        }
    }

    pub fn reason(&self) -> &ErrorReason {
        &self.reason
    }

    /// Whether the error came from the bytes the user handed in, as opposed to
    /// the environment (IO, persistence, configuration).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.reason,
            ErrorReason::EmptyInput
                | ErrorReason::Hex(_)
                | ErrorReason::Pem(_)
                | ErrorReason::InvalidPemTag(_)
                | ErrorReason::X509(_)
                | ErrorReason::MissingAttribute(_)
                | ErrorReason::UnreadableAttribute(_)
        )
    }
}

impl<E> From<E> for AppError
where
    E: Into<ErrorReason>,
{
    fn from(reason: E) -> Self {
        Self::new(reason.into())
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", &self.reason)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.reason.source()
    }
}

#[derive(Debug, Error)]
pub enum ErrorReason {
    #[error("failed to load the configuration")]
    Config(#[from] config::ConfigError),
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("the certificate file is empty")]
    EmptyInput,
    #[error("malformed hexadecimal certificate data")]
    Hex(#[from] hex::FromHexError),
    #[error("PEM decoding error")]
    Pem(#[from] pem::PemError),
    #[error("unexpected PEM block `{0}`, expected `CERTIFICATE`")]
    InvalidPemTag(String),
    #[error("X509 certificate parsing error")]
    X509(#[from] x509_certificate::X509CertificateError),
    #[error("the certificate has no {0} attribute")]
    MissingAttribute(&'static str),
    #[error("the {0} attribute is not a readable string")]
    UnreadableAttribute(&'static str),
    #[error("failed to serialize the certificate shelf")]
    Serialize(#[from] serde_json::Error),
    #[error("no certificate named `{0}` on the shelf")]
    UnknownCertificate(String),
}
