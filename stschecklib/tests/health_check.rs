use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::time::Instant;

use stschecklib::{
    network::{EndpointProbe, ProbeOutcome},
    trust_store::TrustedRoots,
    Error, HealthCheckSettings, HealthEvent, StsEndpoint, StsHealthChecker, TrustStore,
};

const AFD: &str = "https://sso.example.com:2443/afd/vecs/ssl";
const IDM: &str = "https://sso.example.com:2443/idm/";
const OIDC: &str = "https://sso.example.com:2443/openidconnect/jwks";
const STS: &str = "https://sso.example.com:2443/sts/STSService";

/// Returns scripted outcomes per URL, repeating the last one once the script is exhausted, and
/// records when each request was made relative to creation.
struct ScriptedProbe {
    script: HashMap<String, Vec<ProbeOutcome>>,
    calls: Mutex<Vec<(String, Duration)>>,
    start: Instant,
}

impl ScriptedProbe {
    fn new() -> Self {
        ScriptedProbe {
            script: HashMap::new(),
            calls: Mutex::new(vec![]),
            start: Instant::now(),
        }
    }

    fn script(mut self, url: &str, outcomes: Vec<ProbeOutcome>) -> Self {
        self.script.insert(url.to_string(), outcomes);
        self
    }

    fn calls(&self) -> Vec<(String, Duration)> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_to(&self, url: &str) -> Vec<Duration> {
        self.calls()
            .into_iter()
            .filter(|(u, _)| u == url)
            .map(|(_, t)| t)
            .collect()
    }
}

impl EndpointProbe for ScriptedProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let mut calls = self.calls.lock().unwrap();
        let attempt = calls.iter().filter(|(u, _)| u == url).count();
        calls.push((url.to_string(), self.start.elapsed()));
        match self.script.get(url) {
            Some(outcomes) => outcomes
                .get(attempt)
                .or(outcomes.last())
                .cloned()
                .unwrap_or(ProbeOutcome::Ready(200)),
            None => ProbeOutcome::Ready(200),
        }
    }
}

fn not_deployed(n: usize) -> Vec<ProbeOutcome> {
    vec![ProbeOutcome::NotDeployed; n]
}

fn checker(probe: &ScriptedProbe) -> StsHealthChecker<&ScriptedProbe> {
    StsHealthChecker::new(probe, HealthCheckSettings::default())
}

#[tokio::test(start_paused = true)]
async fn all_ready_one_attempt_each_in_order() {
    let probe = ScriptedProbe::new();
    assert!(checker(&probe).check("sso.example.com").await.is_ok());

    let calls = probe.calls();
    let urls: Vec<&str> = calls.iter().map(|(u, _)| u.as_str()).collect();
    assert_eq!(vec![AFD, IDM, OIDC, STS], urls);
    assert!(calls.iter().all(|(_, t)| *t == Duration::ZERO));
}

#[tokio::test(start_paused = true)]
async fn retries_until_deployed() {
    let mut outcomes = not_deployed(3);
    outcomes.push(ProbeOutcome::Ready(200));
    let probe = ScriptedProbe::new().script(IDM, outcomes);

    assert!(checker(&probe).check("sso.example.com").await.is_ok());

    assert_eq!(vec![Duration::ZERO], probe.calls_to(AFD));
    assert_eq!(
        vec![
            Duration::from_secs(0),
            Duration::from_secs(5),
            Duration::from_secs(10),
            Duration::from_secs(15)
        ],
        probe.calls_to(IDM)
    );
    assert_eq!(vec![Duration::from_secs(15)], probe.calls_to(OIDC));
    assert_eq!(vec![Duration::from_secs(15)], probe.calls_to(STS));
}

#[tokio::test(start_paused = true)]
async fn times_out_when_never_deployed() {
    let probe = ScriptedProbe::new().script(AFD, not_deployed(1));
    let start = Instant::now();

    let result = checker(&probe).check("sso.example.com").await;

    assert_eq!(Err(Error::NotDeployed(AFD.to_string())), result);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(120));
    assert!(elapsed <= Duration::from_secs(125));
    // attempts at 0, 5, ..., 125
    assert_eq!(26, probe.calls_to(AFD).len());
    assert!(probe.calls_to(IDM).is_empty());
}

#[tokio::test(start_paused = true)]
async fn deadline_is_shared_by_all_endpoints() {
    let mut afd = not_deployed(20);
    afd.push(ProbeOutcome::Ready(200));
    let probe = ScriptedProbe::new()
        .script(AFD, afd)
        .script(IDM, not_deployed(1));

    let result = checker(&probe).check("sso.example.com").await;

    assert_eq!(Err(Error::NotDeployed(IDM.to_string())), result);
    let idm = probe.calls_to(IDM);
    assert_eq!(Some(&Duration::from_secs(100)), idm.first());
    assert_eq!(Some(&Duration::from_secs(125)), idm.last());
    assert_eq!(6, idm.len());
    assert!(probe.calls_to(OIDC).is_empty());
    assert!(probe.calls_to(STS).is_empty());
}

#[tokio::test(start_paused = true)]
async fn transport_errors_are_retried() {
    let probe = ScriptedProbe::new().script(
        OIDC,
        vec![
            ProbeOutcome::Transport("connection refused".to_string()),
            ProbeOutcome::NotDeployed,
            ProbeOutcome::Ready(200),
        ],
    );

    assert!(checker(&probe).check("sso.example.com").await.is_ok());
    assert_eq!(
        vec![
            Duration::from_secs(0),
            Duration::from_secs(5),
            Duration::from_secs(10)
        ],
        probe.calls_to(OIDC)
    );
}

#[tokio::test(start_paused = true)]
async fn most_recent_error_is_returned() {
    let mut outcomes = not_deployed(10);
    outcomes.push(ProbeOutcome::Transport("certificate not trusted".to_string()));
    let probe = ScriptedProbe::new().script(STS, outcomes);

    let result = checker(&probe).check("sso.example.com").await;

    assert_eq!(
        Err(Error::Unreachable {
            url: STS.to_string(),
            reason: "certificate not trusted".to_string()
        }),
        result
    );
}

// Any status other than 404 counts as deployed, including server errors. This is the current
// behavior and may under-detect failed deployments.
#[tokio::test(start_paused = true)]
async fn server_errors_count_as_deployed() {
    let probe = ScriptedProbe::new()
        .script(AFD, vec![ProbeOutcome::Ready(500)])
        .script(IDM, vec![ProbeOutcome::Ready(503)])
        .script(OIDC, vec![ProbeOutcome::Ready(401)]);

    assert!(checker(&probe).check("sso.example.com").await.is_ok());
    assert_eq!(4, probe.calls().len());
}

#[tokio::test(start_paused = true)]
async fn custom_timing() {
    let settings = HealthCheckSettings {
        deadline_secs: 10,
        retry_interval_secs: 2,
        ..Default::default()
    };
    let probe = ScriptedProbe::new().script(AFD, not_deployed(1));
    let result = StsHealthChecker::new(&probe, settings)
        .check("sso.example.com")
        .await;

    assert!(result.is_err());
    // attempts at 0, 2, ..., 12
    assert_eq!(7, probe.calls_to(AFD).len());
}

#[tokio::test(start_paused = true)]
async fn zero_retry_interval_still_waits() {
    let settings = HealthCheckSettings {
        deadline_secs: 3,
        retry_interval_secs: 0,
        ..Default::default()
    };
    let sts = ScriptedProbe::new().script(AFD, not_deployed(1));
    let result = StsHealthChecker::new(&sts, settings)
        .check("sso.example.com")
        .await;

    assert!(result.is_err());
    assert_eq!(
        vec![
            Duration::from_secs(0),
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(3),
            Duration::from_secs(4)
        ],
        sts.calls_to(AFD)
    );
}

#[tokio::test(start_paused = true)]
async fn reports_progress() {
    let probe = ScriptedProbe::new().script(
        AFD,
        vec![ProbeOutcome::NotDeployed, ProbeOutcome::Ready(200)],
    );
    let events = Arc::new(Mutex::new(vec![]));
    let sink = events.clone();

    let result = checker(&probe)
        .with_reporter(move |e| sink.lock().unwrap().push(e.clone()))
        .check("sso.example.com")
        .await;
    assert!(result.is_ok());

    let events = events.lock().unwrap();
    assert_eq!(9, events.len());
    assert_eq!(
        HealthEvent::Checking {
            endpoint: StsEndpoint::Afd,
            url: AFD.to_string()
        },
        events[0]
    );
    assert!(matches!(
        &events[1],
        HealthEvent::NotReady { endpoint: StsEndpoint::Afd, .. }
    ));
    assert_eq!(
        HealthEvent::Deployed {
            endpoint: StsEndpoint::Afd,
            url: AFD.to_string(),
            status: 200
        },
        events[2]
    );
    assert_eq!(
        HealthEvent::Deployed {
            endpoint: StsEndpoint::Sts,
            url: STS.to_string(),
            status: 200
        },
        events[8]
    );
}

#[tokio::test(start_paused = true)]
async fn bad_hostname_makes_no_requests() {
    let probe = ScriptedProbe::new();
    assert_eq!(Err(Error::BadInput), checker(&probe).check("").await);
    assert!(probe.calls().is_empty());
}

/// Trust store that fails every read and counts how many times it was asked
struct FailingStore {
    reads: Mutex<usize>,
}

impl TrustStore for FailingStore {
    fn load_trusted_roots(&self, _instance: &str, _store_name: &str) -> stschecklib::Result<TrustedRoots> {
        *self.reads.lock().unwrap() += 1;
        Err(Error::NotFound)
    }
}

#[tokio::test(start_paused = true)]
async fn trust_store_failure_is_immediate() {
    let store = FailingStore {
        reads: Mutex::new(0),
    };
    let start = Instant::now();

    let result =
        stschecklib::check_health("sso.example.com", &store, &HealthCheckSettings::default())
            .await;

    assert_eq!(Err(Error::NotFound), result);
    assert_eq!(1, *store.reads.lock().unwrap());
    assert_eq!(Duration::ZERO, start.elapsed());
}

// Call this from unit tests when actively debugging (hence allow(dead_code)).
#[allow(dead_code)]
fn init_console_logging() {
    use log::LevelFilter;
    use log4rs::{
        append::console::ConsoleAppender,
        config::{Appender, Config, Root},
        encode::pattern::PatternEncoder,
    };
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .build();
    match Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
    {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                println!("ERROR: failed to configure logging for stdout with {e:?}. Continuing without logging.");
            }
        }
        Err(e) => {
            println!("ERROR: failed to prepare default logging configuration with {e:?}. Continuing without logging");
        }
    }
}
