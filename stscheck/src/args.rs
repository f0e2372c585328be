//! Command line arguments for the stscheck utility

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use stschecklib::DirectorySetupMode;

/// Confirm that the STS web applications on a freshly installed identity node are deployed.
///
/// The AFD, IDM, OpenID Connect and STS endpoints are checked in order. Each is retried until it
/// answers with a status other than 404 or until the deadline elapses. Servers are verified using
/// only the roots in the TRUSTED_ROOTS collection of the local certificate store.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("logging")
        .args(["logging_config", "log_to_console"]),
))]
pub struct StsCheckArgs {
    /// Host name or address of the node to check
    #[arg(value_name = "HOST", required_unless_present = "list_setup_modes")]
    pub hostname: Option<String>,

    /// Folder containing one sub-folder per certificate store collection (default: ~/.stscheck/vecs)
    #[arg(long, short = 'r', value_name = "DIR", help_heading = "Trust")]
    pub store_root: Option<PathBuf>,

    /// JSON file containing health check settings. Options below override values read from it.
    #[arg(long, short = 's', value_name = "FILE", help_heading = "Settings")]
    pub settings: Option<PathBuf>,

    /// Port on which the STS endpoints are served
    #[arg(long, short = 'p', help_heading = "Settings")]
    pub port: Option<u16>,

    /// Seconds to wait for all endpoints to come up
    #[arg(long, short = 't', help_heading = "Settings")]
    pub timeout_secs: Option<u64>,

    /// Seconds to wait between attempts against an endpoint that is not yet available
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), help_heading = "Settings")]
    pub retry_secs: Option<u64>,

    /// Setup topology of the node being checked
    #[arg(long, short = 'm', value_parser = parse_setup_mode, help_heading = "Settings")]
    pub setup_mode: Option<DirectorySetupMode>,

    /// Lists the directory setup modes and their codes
    #[arg(long, help_heading = "Utilities")]
    pub list_setup_modes: bool,

    /// Full path and filename of YAML-formatted configuration file for log4rs logging mechanism.
    /// See https://docs.rs/log4rs/latest/log4rs/ for details.
    #[arg(short = 'c', long, help_heading = "Logging")]
    pub logging_config: Option<String>,

    /// Log output to the console
    #[arg(short = 'l', long, action, help_heading = "Logging")]
    pub log_to_console: bool,
}

fn parse_setup_mode(s: &str) -> Result<DirectorySetupMode, String> {
    s.parse::<DirectorySetupMode>().map_err(|_| {
        format!("unrecognized setup mode '{s}'; expected one of UNKNOWN, STANDALONE, PARTNER or CLIENT")
    })
}
