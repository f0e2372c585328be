//! Fixed set of STS endpoints whose availability indicates a completed deployment

use std::net::Ipv6Addr;

use log::error;

use crate::{Error, Result};

/// Port on which the STS web applications are served over TLS
pub static STS_HTTPS_PORT: u16 = 2443;

/// Endpoints checked after installation, in the order they must come up
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StsEndpoint {
    /// REST AFD interface exposing the VECS SSL store
    Afd,
    /// REST identity management interface
    Idm,
    /// OpenID Connect JSON web key set
    OpenIdConnect,
    /// WS-Trust security token service
    Sts,
}

impl StsEndpoint {
    /// All endpoints in check order
    pub const ALL: [StsEndpoint; 4] = [
        StsEndpoint::Afd,
        StsEndpoint::Idm,
        StsEndpoint::OpenIdConnect,
        StsEndpoint::Sts,
    ];

    /// Context path of the endpoint
    pub fn path(self) -> &'static str {
        match self {
            StsEndpoint::Afd => "/afd/vecs/ssl",
            StsEndpoint::Idm => "/idm/",
            StsEndpoint::OpenIdConnect => "/openidconnect/jwks",
            StsEndpoint::Sts => "/sts/STSService",
        }
    }

    /// Short display name of the endpoint
    pub fn name(self) -> &'static str {
        match self {
            StsEndpoint::Afd => "AFD",
            StsEndpoint::Idm => "IDM",
            StsEndpoint::OpenIdConnect => "OpenID Connect",
            StsEndpoint::Sts => "STS",
        }
    }
}

/// Rejects values that cannot be used as the host portion of an https URL. Returns the value to
/// use in the URL (IPv6 literals are bracketed).
fn host_for_url(hostname: &str) -> Result<String> {
    let host = hostname.trim();
    if host.is_empty()
        || host.contains("://")
        || host.contains('/')
        || host.chars().any(char::is_whitespace)
    {
        error!("Invalid hostname provided for health check: '{hostname}'");
        return Err(Error::BadInput);
    }

    // a colon or bracket is only acceptable as part of an IPv6 literal; ports are not accepted
    if host.contains(':') || host.contains('[') || host.contains(']') {
        let literal = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        return match literal.parse::<Ipv6Addr>() {
            Ok(addr) => Ok(format!("[{addr}]")),
            Err(_) => {
                error!("Invalid hostname provided for health check: '{hostname}'");
                Err(Error::BadInput)
            }
        };
    }

    Ok(host.to_string())
}

/// Returns the URL of `endpoint` on `hostname`, i.e., `https://<hostname>:<port><path>`
pub fn endpoint_url(hostname: &str, port: u16, endpoint: StsEndpoint) -> Result<String> {
    let host = host_for_url(hostname)?;
    Ok(format!("https://{host}:{port}{}", endpoint.path()))
}

/// Returns the URLs of all endpoints on `hostname`, in check order
pub fn endpoint_urls(hostname: &str, port: u16) -> Result<Vec<(StsEndpoint, String)>> {
    StsEndpoint::ALL
        .into_iter()
        .map(|ep| endpoint_url(hostname, port, ep).map(|url| (ep, url)))
        .collect()
}
