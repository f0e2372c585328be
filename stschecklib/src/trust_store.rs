//! Read trusted root certificates from a local certificate store
//!
//! The store is addressed by an instance type (only `VKS` is supported) and a collection name
//! (`TRUSTED_ROOTS` for the health check). [DirectoryTrustStore] maps each collection to a folder
//! beneath a root folder, with each file in the folder holding one or more certificates.

use std::{
    fs,
    path::{Path, PathBuf},
};

use der::{Decode, Encode};
use log::{debug, error};
use x509_cert::Certificate;

use crate::{Error, Result};

/// Instance type of the key store holding trusted roots
pub static VKS_KEYSTORE_INSTANCE: &str = "VKS";

/// Name of the collection holding the roots used to verify STS endpoints
pub static VKS_KEYSTORE_NAME: &str = "TRUSTED_ROOTS";

/// File extensions recognized as certificate files
static CERT_EXTENSIONS: [&str; 4] = ["der", "cer", "pem", "crt"];

/// Set of trusted root certificates read from a store collection
#[derive(Clone, Debug, Default)]
pub struct TrustedRoots {
    encoded: Vec<Vec<u8>>,
    subjects: Vec<String>,
}

impl TrustedRoots {
    /// Adds a parsed certificate to the set
    pub fn push(&mut self, cert: &Certificate) -> Result<()> {
        self.encoded.push(cert.to_der()?);
        self.subjects.push(cert.tbs_certificate.subject.to_string());
        Ok(())
    }

    /// DER encodings of the roots, in load order
    pub fn encoded(&self) -> &[Vec<u8>] {
        &self.encoded
    }

    /// Subject names of the roots, in load order
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }
}

/// Source of trusted root certificates
pub trait TrustStore {
    /// Reads the collection named `store_name` from the store instance of type `instance`
    fn load_trusted_roots(&self, instance: &str, store_name: &str) -> Result<TrustedRoots>;
}

/// Certificate store backed by a folder per collection
#[derive(Clone, Debug)]
pub struct DirectoryTrustStore {
    root: PathBuf,
}

impl DirectoryTrustStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectoryTrustStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Folder containing the collection named `store_name`
    pub fn collection_path(&self, store_name: &str) -> PathBuf {
        self.root.join(store_name)
    }
}

/// Returns true if the file name carries a recognized certificate extension
fn is_cert_file(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => CERT_EXTENSIONS
            .iter()
            .any(|c| c.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Parses one or more certificates from a buffer that contains either PEM or a single DER
/// encoded certificate
pub(crate) fn parse_certs(bytes: &[u8]) -> Result<Vec<Certificate>> {
    if bytes.windows(10).any(|w| w == b"-----BEGIN") {
        let certs = Certificate::load_pem_chain(bytes)?;
        if certs.is_empty() {
            return Err(Error::TrustStore);
        }
        Ok(certs)
    } else {
        Ok(vec![Certificate::from_der(bytes)?])
    }
}

impl TrustStore for DirectoryTrustStore {
    fn load_trusted_roots(&self, instance: &str, store_name: &str) -> Result<TrustedRoots> {
        if instance != VKS_KEYSTORE_INSTANCE {
            error!("Unsupported key store instance type: {instance}");
            return Err(Error::UnsupportedStoreType);
        }

        let folder = self.collection_path(store_name);
        if !folder.is_dir() {
            error!(
                "Certificate store collection {store_name} not found at {}",
                folder.display()
            );
            return Err(Error::NotFound);
        }

        let mut files = vec![];
        for entry in fs::read_dir(&folder)? {
            let path = entry?.path();
            if path.is_file() && is_cert_file(&path) {
                files.push(path);
            } else {
                debug!("Ignoring {} in {store_name}", path.display());
            }
        }
        files.sort();

        let mut roots = TrustedRoots::default();
        for file in files {
            let bytes = fs::read(&file)?;
            let certs = match parse_certs(&bytes) {
                Ok(certs) => certs,
                Err(e) => {
                    error!("Failed to parse certificate(s) from {}: {e}", file.display());
                    return Err(e);
                }
            };
            for cert in certs {
                debug!(
                    "Read trusted root {} from {}",
                    cert.tbs_certificate.subject,
                    file.display()
                );
                roots.push(&cert)?;
            }
        }

        if roots.is_empty() {
            error!(
                "Certificate store collection {store_name} at {} contains no certificates",
                folder.display()
            );
            return Err(Error::TrustStore);
        }
        Ok(roots)
    }
}
