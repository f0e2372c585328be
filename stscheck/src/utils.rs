//! Utility functions used by the stscheck utility

use std::path::PathBuf;

use colored::Colorize;
use home::home_dir;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

use stschecklib::HealthCheckSettings;

use crate::args::StsCheckArgs;

/// Configures logging per logging-related elements of the provided [StsCheckArgs] instance.
///
/// There are two logging-related options: [logging_config](StsCheckArgs::logging_config) and
/// [log_to_console](StsCheckArgs::log_to_console). Though these options are mutually exclusive, the
/// `logging_config` option can be used to define a logging configuration that both logs to the
/// console and logs to a file. The `log_to_console` option only emits logs from the Info level.
pub(crate) fn configure_logging(args: &StsCheckArgs) {
    let mut logging_configured = false;

    if let Some(logging_config) = &args.logging_config {
        if let Err(e) = log4rs::init_file(logging_config, Default::default()) {
            println!(
                "{}: failed to configure logging using {} with {:?}. Continuing without logging.",
                "ERROR".bold(),
                logging_config,
                e
            );
        } else {
            logging_configured = true;
        }
    }

    if !logging_configured && args.log_to_console {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{m}{n}")))
            .build();
        match Config::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        {
            Ok(config) => {
                let handle = log4rs::init_config(config);
                if let Err(e) = handle {
                    println!(
                        "{}: failed to configure logging for stdout with {:?}. Continuing without logging.",
                        "ERROR".bold(), e
                    );
                }
            }
            Err(e) => {
                println!("{}: failed to prepare default logging configuration with {:?}. Continuing without logging", "ERROR".bold(), e);
            }
        }
    }
}

/// Returns the certificate store folder to use, i.e., the `--store-root` value or
/// `.stscheck/vecs` in the user's home directory.
pub(crate) fn store_root(args: &StsCheckArgs) -> Option<PathBuf> {
    match &args.store_root {
        Some(root) => Some(root.clone()),
        None => home_dir().map(|hd| hd.join(".stscheck").join("vecs")),
    }
}

/// Applies settings-related command line options on top of `settings`
pub(crate) fn apply_overrides(args: &StsCheckArgs, mut settings: HealthCheckSettings) -> HealthCheckSettings {
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(timeout) = args.timeout_secs {
        settings.deadline_secs = timeout;
    }
    if let Some(retry) = args.retry_secs {
        settings.retry_interval_secs = retry;
    }
    if args.setup_mode.is_some() {
        settings.setup_mode = args.setup_mode;
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use stschecklib::DirectorySetupMode;

    #[test]
    fn overrides_replace_file_values() {
        let args =
            StsCheckArgs::try_parse_from(["stscheck", "host", "--retry-secs", "1", "-m", "client"])
                .unwrap();
        let file = HealthCheckSettings {
            deadline_secs: 60,
            retry_interval_secs: 10,
            ..Default::default()
        };
        let settings = apply_overrides(&args, file);
        assert_eq!(60, settings.deadline_secs);
        assert_eq!(1, settings.retry_interval_secs);
        assert_eq!(2443, settings.port);
        assert_eq!(Some(DirectorySetupMode::Client), settings.setup_mode);
    }

    #[test]
    fn explicit_store_root() {
        let args = StsCheckArgs::try_parse_from(["stscheck", "host", "-r", "/tmp/vecs"]).unwrap();
        assert_eq!(Some(PathBuf::from("/tmp/vecs")), store_root(&args));
    }
}
