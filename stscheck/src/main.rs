#![doc = include_str!("../README.md")]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use clap::Parser;
use colored::Colorize;
use log::{debug, error, info};

use stschecklib::{
    DirectorySetupMode, DirectoryTrustStore, HealthCheckSettings, HealthEvent, StsHealthChecker,
};

mod args;
mod utils;

use args::StsCheckArgs;
use utils::{apply_overrides, configure_logging, store_root};

/// Point of entry for `stscheck` application.
///
/// See [StsCheckArgs] for usage details.
#[tokio::main]
async fn main() {
    if !interactive_main().await {
        std::process::exit(1);
    }
}

/// Prints one line per progress event
fn print_event(event: &HealthEvent) {
    match event {
        HealthEvent::Checking { url, .. } => {
            println!("Checking health of endpoint: '{url}'");
        }
        HealthEvent::Deployed { url, .. } => {
            println!("The endpoint: '{url}' is deployed successfully");
        }
        HealthEvent::NotReady { reason, .. } => {
            debug!("Not ready: {reason}");
        }
    }
}

/// `interactive_main` provides the command line interface for the application. Returns true upon
/// success and false otherwise.
///
/// See [StsCheckArgs] for usage details.
async fn interactive_main() -> bool {
    let args = StsCheckArgs::parse();
    configure_logging(&args);

    // ----------------------------------------------------------------------------------
    // operations that require no host (utilities)
    //  - list_setup_modes
    // ----------------------------------------------------------------------------------
    if args.list_setup_modes {
        for mode in DirectorySetupMode::ALL {
            println!("{}: {}; {}: {}", "Mode".bold(), mode, "Code".bold(), mode.code());
        }
        return true;
    }

    let hostname = match &args.hostname {
        Some(hostname) => hostname.clone(),
        None => {
            println!("{}: no host was provided", "ERROR".bold());
            return false;
        }
    };

    let settings = match &args.settings {
        Some(file) => match HealthCheckSettings::from_file(file) {
            Ok(settings) => settings,
            Err(e) => {
                println!(
                    "{}: failed to read settings from {}: {e}",
                    "ERROR".bold(),
                    file.display()
                );
                return false;
            }
        },
        None => HealthCheckSettings::default(),
    };
    let settings = apply_overrides(&args, settings);

    let root = match store_root(&args) {
        Some(root) => root,
        None => {
            println!(
                "{}: no --store-root was provided and the home directory could not be determined",
                "ERROR".bold()
            );
            return false;
        }
    };
    info!("Using certificate store at {}", root.display());
    if let Some(mode) = settings.setup_mode {
        info!("Checking {hostname} deployed in {mode} mode ({})", mode.code());
    }

    let trust_store = DirectoryTrustStore::new(&root);
    let checker = match StsHealthChecker::from_trust_store(&trust_store, &settings) {
        Ok(checker) => checker.with_reporter(print_event),
        Err(e) => {
            error!("Failed to prepare trust context: {e:?}");
            println!(
                "{}: failed to read {} from certificate store at {}: {e}",
                "ERROR".bold(),
                settings.store_name,
                root.display()
            );
            return false;
        }
    };

    match checker.check(&hostname).await {
        Ok(()) => {
            match settings.setup_mode {
                Some(mode) => println!("{} ({mode})", "SUCCESS".bold()),
                None => println!("{}", "SUCCESS".bold()),
            }
            true
        }
        Err(e) => {
            println!(
                "{}: health check failed for {hostname} with: {e}",
                "ERROR".bold()
            );
            false
        }
    }
}
