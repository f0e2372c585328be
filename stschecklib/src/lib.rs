#![doc = include_str!("../README.md")]

pub mod endpoints;
pub mod health_check;
pub mod network;
pub mod settings;
pub mod setup_mode;
pub mod trust_store;

use std::fmt;

/// Result type for stschecklib
pub type Result<T> = core::result::Result<T, Error>;

/// Error values for stschecklib
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    BadInput,
    NotFound,
    Io,
    Network,
    /// The named trust store collection could not be used to build a trust context
    TrustStore,
    UnsupportedStoreType,
    SerdeJson,
    /// Asn1 is used to propagate error information from the x509 and related crates
    Asn1(der::Error),
    /// An endpoint was still answering 404 when the deadline elapsed
    NotDeployed(String),
    /// An endpoint could not be reached when the deadline elapsed
    Unreachable { url: String, reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadInput => write!(f, "bad input"),
            Error::NotFound => write!(f, "not found"),
            Error::Io => write!(f, "I/O error"),
            Error::Network => write!(f, "network error"),
            Error::TrustStore => write!(f, "trust store contains no usable certificates"),
            Error::UnsupportedStoreType => write!(f, "unsupported trust store instance type"),
            Error::SerdeJson => write!(f, "failed to parse JSON"),
            Error::Asn1(e) => write!(f, "ASN.1 error: {e}"),
            Error::NotDeployed(url) => write!(
                f,
                "the webapp at '{url}' is either not deployed or still being deployed"
            ),
            Error::Unreachable { url, reason } => write!(f, "failed to reach '{url}': {reason}"),
        }
    }
}

impl std::error::Error for Error {}

use std::io;
impl From<io::Error> for Error {
    fn from(_: io::Error) -> Error {
        Error::Io
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        use log::error;
        error!("reqwest::Error: {err}");
        Error::Network
    }
}
impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1(err)
    }
}
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        use log::error;
        error!("serde_json::Error: {err}");
        Error::SerdeJson
    }
}

pub use endpoints::StsEndpoint;
pub use health_check::{check_health, HealthEvent, StsHealthChecker};
pub use settings::HealthCheckSettings;
pub use setup_mode::DirectorySetupMode;
pub use trust_store::{DirectoryTrustStore, TrustStore, TrustedRoots};
