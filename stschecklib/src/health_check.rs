//! Confirm the STS web applications on a freshly installed node are deployed and serving.
//!
//! Each endpoint returned by [endpoint_urls] is checked in order. An endpoint that answers 404 or
//! that cannot be reached is retried every [retry_interval](HealthCheckSettings::retry_interval)
//! until it answers with any other status. If the time elapsed since the start of the check
//! exceeds the [deadline](HealthCheckSettings::deadline) after a failed attempt, the check is
//! abandoned and the most recent error is returned. Endpoints after the one that timed out are
//! not checked.

use log::{debug, error, info};
use tokio::time::{sleep, Instant};

use crate::{
    endpoints::{endpoint_urls, StsEndpoint},
    network::{EndpointProbe, HttpsProbe, ProbeOutcome},
    settings::HealthCheckSettings,
    trust_store::TrustStore,
    Error, Result,
};

/// Progress notifications emitted while a check runs
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HealthEvent {
    /// Checking of the endpoint has started
    Checking { endpoint: StsEndpoint, url: String },
    /// An attempt failed and will be retried if time remains
    NotReady {
        endpoint: StsEndpoint,
        url: String,
        reason: String,
    },
    /// The endpoint answered with a status other than 404
    Deployed {
        endpoint: StsEndpoint,
        url: String,
        status: u16,
    },
}

type Reporter = Box<dyn Fn(&HealthEvent) + Send + Sync>;

/// Checks the STS endpoints of a host using the provided probe
pub struct StsHealthChecker<P: EndpointProbe> {
    probe: P,
    settings: HealthCheckSettings,
    reporter: Option<Reporter>,
}

impl StsHealthChecker<HttpsProbe> {
    /// Reads trusted roots from `trust_store` per `settings` and prepares a checker whose probe
    /// trusts only those roots. Failure to read the store is returned without retry.
    pub fn from_trust_store<T: TrustStore + ?Sized>(
        trust_store: &T,
        settings: &HealthCheckSettings,
    ) -> Result<Self> {
        let roots =
            trust_store.load_trusted_roots(&settings.store_instance, &settings.store_name)?;
        info!(
            "Read {} trusted root(s) from {} store {}",
            roots.len(),
            settings.store_instance,
            settings.store_name
        );
        let probe = HttpsProbe::new(&roots, settings.request_timeout_secs)?;
        Ok(StsHealthChecker::new(probe, settings.clone()))
    }
}

impl<P: EndpointProbe> StsHealthChecker<P> {
    pub fn new(probe: P, settings: HealthCheckSettings) -> Self {
        StsHealthChecker {
            probe,
            settings,
            reporter: None,
        }
    }

    /// Registers a callback that receives each [HealthEvent]
    pub fn with_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&HealthEvent) + Send + Sync + 'static,
    {
        self.reporter = Some(Box::new(reporter));
        self
    }

    pub fn settings(&self) -> &HealthCheckSettings {
        &self.settings
    }

    fn report(&self, event: HealthEvent) {
        if let Some(reporter) = &self.reporter {
            reporter(&event);
        }
    }

    /// Checks each endpoint on `hostname` in order, returning once all have been found to be
    /// deployed or returning the most recent error once the deadline has passed.
    pub async fn check(&self, hostname: &str) -> Result<()> {
        let urls = endpoint_urls(hostname, self.settings.port)?;
        let deadline = self.settings.deadline();
        let retry_interval = self.settings.retry_interval();

        let start = Instant::now();
        for (endpoint, url) in urls {
            debug!("Checking health of endpoint: '{url}'");
            self.report(HealthEvent::Checking {
                endpoint,
                url: url.clone(),
            });

            loop {
                let last_error = match self.probe.probe(&url).await {
                    ProbeOutcome::Ready(status) => {
                        debug!("The endpoint '{url}' is deployed successfully ({status})");
                        self.report(HealthEvent::Deployed {
                            endpoint,
                            url: url.clone(),
                            status,
                        });
                        break;
                    }
                    ProbeOutcome::NotDeployed => Error::NotDeployed(url.clone()),
                    ProbeOutcome::Transport(reason) => Error::Unreachable {
                        url: url.clone(),
                        reason,
                    },
                };

                error!("{last_error}");
                self.report(HealthEvent::NotReady {
                    endpoint,
                    url: url.clone(),
                    reason: last_error.to_string(),
                });

                let elapsed = start.elapsed();
                if elapsed > deadline {
                    error!(
                        "Gave up waiting for {} endpoint after {}s",
                        endpoint.name(),
                        elapsed.as_secs()
                    );
                    return Err(last_error);
                }
                sleep(retry_interval).await;
            }
        }
        Ok(())
    }
}

/// Confirms that the AFD, IDM, OpenID Connect and STS endpoints on `hostname` are deployed,
/// verifying each server using only the roots read from `trust_store`.
pub async fn check_health<T: TrustStore + ?Sized>(
    hostname: &str,
    trust_store: &T,
    settings: &HealthCheckSettings,
) -> Result<()> {
    StsHealthChecker::from_trust_store(trust_store, settings)?
        .check(hostname)
        .await
}
