//! Command line configuration
//!
//! Maps the `-h` and `-t` flags onto a [`MeasurementRequest`] and carries the
//! probe, indicator and logging options for a run.

use crate::coordinator::error::{Result, SpeednetError};
use crate::coordinator::indicator::IndicatorSettings;
use crate::coordinator::measurement::MeasurementRequest;
use crate::probe::http::{
    DEFAULT_DOWNLOAD_BYTES, DEFAULT_SERVER, DEFAULT_UPLOAD_BYTES, MAX_PAYLOAD_BYTES,
};
use crate::probe::ProbeSettings;
use clap::parser::ValueSource;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use tracing::debug;

/// Values of `-t` selecting a download-only test
pub const DOWNLOAD_OPTIONS: [&str; 3] = ["d", "down", "download"];

/// Values of `-t` selecting an upload-only test
pub const UPLOAD_OPTIONS: [&str; 3] = ["u", "up", "upload"];

const LOG_FORMATS: [&str; 2] = ["text", "json"];

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "speednet")]
#[command(about = "Check your connection's download and upload speed")]
#[command(disable_help_flag = true)]
#[command(after_help = "EXAMPLE (full testing):\n    speednet\n\nEXAMPLE (download only):\n    speednet -t down")]
pub struct Config {
    /// Print this help message
    #[arg(short = 'h', action = ArgAction::SetTrue)]
    pub help: bool,

    /// Download only: 'd', 'down', 'download'. Upload only: 'u', 'up', 'upload' (ignore case). Omit for full testing
    #[arg(short = 't', value_name = "OPTION")]
    pub test: Option<String>,

    /// Base URL of the speed test server
    #[arg(long, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Bytes to fetch for the download test
    #[arg(long, default_value_t = DEFAULT_DOWNLOAD_BYTES)]
    pub download_bytes: u64,

    /// Bytes to send for the upload test
    #[arg(long, default_value_t = DEFAULT_UPLOAD_BYTES)]
    pub upload_bytes: u64,

    /// Hide the loading indicator
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, default_value = "text")]
    pub log_format: String,
}

/// What the command line asks the program to do
#[derive(Debug)]
pub enum CliOutcome {
    /// Run the measurement. `config.help` may still be set when `-h` came with other options.
    Run(Config),
    /// Only `-h` was given
    Help,
    /// Unrecognized flags or an invalid `-t` value
    Invalid(SpeednetError),
}

impl Config {
    /// Parse and classify a full argument list (program name first)
    pub fn resolve<I, T>(args: I) -> CliOutcome
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match Self::command().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(e) => {
                debug!(error = %e, "Command line parsing failed");
                return CliOutcome::Invalid(SpeednetError::Option(e.kind().to_string()));
            }
        };
        let config = match Self::from_arg_matches(&matches) {
            Ok(config) => config,
            Err(e) => return CliOutcome::Invalid(SpeednetError::Option(e.kind().to_string())),
        };

        if config.help {
            let other_options = matches
                .ids()
                .filter(|id| id.as_str() != "help")
                .filter(|id| matches.value_source(id.as_str()) == Some(ValueSource::CommandLine))
                .count();
            if other_options == 0 {
                return CliOutcome::Help;
            }
        }

        match config.request() {
            Ok(_) => CliOutcome::Run(config),
            Err(e) => CliOutcome::Invalid(e),
        }
    }

    /// Rendered help text
    pub fn help_text() -> String {
        Self::command().render_help().to_string()
    }

    /// Directions selected by `-t`
    pub fn request(&self) -> Result<MeasurementRequest> {
        parse_test_option(self.test.as_deref())
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            server: self.server.clone(),
            download_bytes: self.download_bytes,
            upload_bytes: self.upload_bytes,
        }
    }

    pub fn indicator_settings(&self) -> IndicatorSettings {
        if self.quiet {
            IndicatorSettings::hidden()
        } else {
            IndicatorSettings::default()
        }
    }

    pub fn is_json_format(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// Validates the configuration values
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");
        for (name, bytes) in [
            ("download-bytes", self.download_bytes),
            ("upload-bytes", self.upload_bytes),
        ] {
            if bytes == 0 || bytes > MAX_PAYLOAD_BYTES {
                return Err(SpeednetError::Config(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_PAYLOAD_BYTES, bytes
                )));
            }
        }
        if !(self.server.starts_with("http://") || self.server.starts_with("https://")) {
            return Err(SpeednetError::Config(format!(
                "server must be an http(s) URL, got '{}'",
                self.server
            )));
        }
        let format = self.log_format.to_ascii_lowercase();
        if !LOG_FORMATS.contains(&format.as_str()) {
            return Err(SpeednetError::Config(format!(
                "log-format must be one of {:?}, got '{}'",
                LOG_FORMATS, self.log_format
            )));
        }
        debug!("Configuration validated successfully");
        Ok(())
    }
}

/// Map a `-t` value to a request; missing or empty means both directions
pub fn parse_test_option(value: Option<&str>) -> Result<MeasurementRequest> {
    let value = match value {
        None => return Ok(MeasurementRequest::both()),
        Some(v) if v.is_empty() => return Ok(MeasurementRequest::both()),
        Some(v) => v.to_lowercase(),
    };

    if DOWNLOAD_OPTIONS.contains(&value.as_str()) {
        Ok(MeasurementRequest::download_only())
    } else if UPLOAD_OPTIONS.contains(&value.as_str()) {
        Ok(MeasurementRequest::upload_only())
    } else {
        Err(SpeednetError::Option(format!(
            "unknown test option '{}'",
            value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Direction;

    fn run_config(args: &[&str]) -> Config {
        match Config::resolve(args) {
            CliOutcome::Run(config) => config,
            other => panic!("expected Run, got {:?}", other),
        }
    }

    #[test]
    fn test_no_flags_selects_full_test() -> Result<()> {
        let config = run_config(&["speednet"]);
        assert_eq!(config.request()?, MeasurementRequest::both());
        assert!(!config.help);
        Ok(())
    }

    #[test]
    fn test_download_aliases_ignore_case() -> Result<()> {
        for value in ["d", "DOWN", "Download"] {
            let config = run_config(&["speednet", "-t", value]);
            assert_eq!(config.request()?, MeasurementRequest::download_only());
        }
        Ok(())
    }

    #[test]
    fn test_upload_aliases_ignore_case() -> Result<()> {
        for value in ["U", "up", "UPLOAD"] {
            let config = run_config(&["speednet", "-t", value]);
            let request = config.request()?;
            assert!(request.contains(Direction::Upload));
            assert!(!request.contains(Direction::Download));
        }
        Ok(())
    }

    #[test]
    fn test_empty_test_option_selects_both() -> Result<()> {
        assert_eq!(parse_test_option(Some(""))?, MeasurementRequest::both());
        Ok(())
    }

    #[test]
    fn test_unknown_test_option_is_invalid() {
        assert!(matches!(
            Config::resolve(["speednet", "-t", "xyz"]),
            CliOutcome::Invalid(SpeednetError::Option(_))
        ));
    }

    #[test]
    fn test_unknown_flag_is_invalid() {
        assert!(matches!(
            Config::resolve(["speednet", "-x"]),
            CliOutcome::Invalid(SpeednetError::Option(_))
        ));
    }

    #[test]
    fn test_help_alone_exits() {
        assert!(matches!(Config::resolve(["speednet", "-h"]), CliOutcome::Help));
    }

    #[test]
    fn test_help_with_test_option_still_runs() -> Result<()> {
        let config = run_config(&["speednet", "-h", "-t", "u"]);
        assert!(config.help);
        assert_eq!(config.request()?, MeasurementRequest::upload_only());
        Ok(())
    }

    #[test]
    fn test_help_text_mentions_test_option() {
        let help = Config::help_text();
        assert!(help.contains("-t"));
        assert!(help.contains("-h"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = run_config(&["speednet"]);
        assert!(config.validate().is_ok());

        config.download_bytes = 0;
        assert!(matches!(config.validate(), Err(SpeednetError::Config(_))));
        config.download_bytes = 1;

        config.server = "speed.example.com".into();
        assert!(config.validate().is_err());
        config.server = "http://127.0.0.1:8080".into();

        config.log_format = "yaml".into();
        assert!(config.validate().is_err());
        config.log_format = "JSON".into();
        assert!(config.validate().is_ok());
        assert!(config.is_json_format());
    }

    #[test]
    fn test_settings_from_flags() {
        let config = run_config(&[
            "speednet",
            "--server",
            "http://localhost:9000",
            "--download-bytes",
            "1000",
            "--upload-bytes",
            "500",
            "--quiet",
        ]);
        let settings = config.probe_settings();
        assert_eq!(settings.server, "http://localhost:9000");
        assert_eq!(settings.download_bytes, 1000);
        assert_eq!(settings.upload_bytes, 500);
        assert!(!config.indicator_settings().is_visible());
    }

    #[test]
    fn test_payload_sizes_bounded() {
        let mut config = run_config(&["speednet", "--upload-bytes", "18446744073709551615"]);
        assert!(matches!(config.validate(), Err(SpeednetError::Config(_))));

        config.upload_bytes = MAX_PAYLOAD_BYTES;
        assert!(config.validate().is_ok());

        config.download_bytes = MAX_PAYLOAD_BYTES + 1;
        assert!(matches!(config.validate(), Err(SpeednetError::Config(_))));
    }
}
