//! Networking-related utility functions

use std::time::Duration;

use log::error;
use reqwest::{Client, StatusCode};

use crate::{trust_store::TrustedRoots, Error, Result};

/// Default value in seconds to use as timeout for each request made to an endpoint
pub static TIMEOUT: u64 = 10;

/// Result of a single request made to an endpoint
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProbeOutcome {
    /// The endpoint answered with something other than 404. Error statuses other than 404 are
    /// also treated as deployed.
    Ready(u16),
    /// The endpoint answered 404, i.e., the web application is not deployed yet
    NotDeployed,
    /// The request failed before a status was received (connect, TLS or timeout failure)
    Transport(String),
}

impl ProbeOutcome {
    /// Maps a response status to an outcome
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::NOT_FOUND {
            ProbeOutcome::NotDeployed
        } else {
            ProbeOutcome::Ready(status.as_u16())
        }
    }
}

/// Performs a single availability request against an endpoint URL
#[allow(async_fn_in_trait)]
pub trait EndpointProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

impl<P: EndpointProbe> EndpointProbe for &P {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        (**self).probe(url).await
    }
}

/// Creates a Reqwest Client that trusts only the given roots, using indicated timeout value
pub(crate) fn get_client(timeout_secs: u64, roots: &TrustedRoots) -> Result<Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .use_rustls_tls()
        .tls_built_in_root_certs(false);

    for (i, der) in roots.encoded().iter().enumerate() {
        let ta_cert = match reqwest::Certificate::from_der(der) {
            Ok(c) => c,
            Err(e) => {
                error!(
                    "Failed to prepare trusted root {} for use: {e:?}",
                    roots.subjects().get(i).map(String::as_str).unwrap_or("")
                );
                return Err(Error::TrustStore);
            }
        };
        builder = builder.add_root_certificate(ta_cert);
    }

    match builder.build() {
        Ok(client) => Ok(client),
        Err(e) => {
            error!("Failed to create HTTP Client: {e:?}");
            Err(Error::Network)
        }
    }
}

/// Probe that issues a GET over TLS, verifying the server using the roots it was created with
pub struct HttpsProbe {
    client: Client,
}

impl HttpsProbe {
    /// Creates a probe that trusts exactly `roots` and abandons each request after `timeout_secs`
    pub fn new(roots: &TrustedRoots, timeout_secs: u64) -> Result<Self> {
        Ok(HttpsProbe {
            client: get_client(timeout_secs, roots)?,
        })
    }
}

impl EndpointProbe for HttpsProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.client.get(url).send().await {
            Ok(response) => ProbeOutcome::from_status(response.status()),
            Err(e) => ProbeOutcome::Transport(format!("{e:?}")),
        }
    }
}
