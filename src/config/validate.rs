// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile, RunSection, RunTarget};
use crate::errors::{HarnessError, Result};
use crate::exec::SupervisorOptions;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = HarnessError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let options = validate_run_section(&raw.run)?;
        let target = validate_target(raw)?;
        Ok(ConfigFile::new_unchecked(options, target))
    }
}

fn validate_run_section(run: &RunSection) -> Result<SupervisorOptions> {
    Ok(SupervisorOptions {
        timeout: field_duration("timeout", &run.timeout)?,
        kill_grace: field_duration("kill_grace", &run.kill_grace)?,
        drain_grace: field_duration("drain_grace", &run.drain_grace)?,
    })
}

/// Every `[run]` duration must parse and be greater than zero.
fn field_duration(field: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value)
        .map_err(|e| HarnessError::ConfigError(format!("[run].{}: {}", field, e)))?;
    if duration.is_zero() {
        return Err(HarnessError::ConfigError(format!(
            "[run].{} must be greater than zero",
            field
        )));
    }
    Ok(duration)
}

fn validate_target(raw: RawConfigFile) -> Result<Option<RunTarget>> {
    match (raw.command, raw.appclient) {
        (Some(_), Some(_)) => Err(HarnessError::ConfigError(
            "config may contain [command] or [appclient], not both".to_string(),
        )),
        (Some(cmd), None) => {
            if cmd.program.trim().is_empty() {
                return Err(HarnessError::ConfigError(
                    "[command].program must not be empty".to_string(),
                ));
            }
            Ok(Some(RunTarget::Command(cmd)))
        }
        (None, Some(app)) => {
            if app.server_home.as_os_str().is_empty() {
                return Err(HarnessError::ConfigError(
                    "[appclient].server_home must not be empty".to_string(),
                ));
            }
            if app.client_jar.as_os_str().is_empty() {
                return Err(HarnessError::ConfigError(
                    "[appclient].client_jar must not be empty".to_string(),
                ));
            }
            Ok(Some(RunTarget::AppClient(app)))
        }
        (None, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.options, SupervisorOptions::default());
        assert!(cfg.target.is_none());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = parse("[run]\ntimeout = \"0s\"\n").unwrap_err();
        assert!(matches!(err, HarnessError::ConfigError(msg) if msg.contains("timeout")));
    }

    #[test]
    fn zero_grace_periods_are_rejected() {
        for field in ["kill_grace", "drain_grace"] {
            let err = parse(&format!("[run]\n{} = \"0ms\"\n", field)).unwrap_err();
            match err {
                HarnessError::ConfigError(msg) => {
                    assert!(msg.contains(field), "{msg}");
                    assert!(msg.contains("greater than zero"), "{msg}");
                }
                other => panic!("expected ConfigError, got {:?}", other),
            }
        }
    }

    #[test]
    fn bad_duration_names_the_field() {
        let err = parse("[run]\nkill_grace = \"soon\"\n").unwrap_err();
        match err {
            HarnessError::ConfigError(msg) => assert!(msg.contains("kill_grace")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn empty_program_is_rejected() {
        let err = parse("[command]\nprogram = \"  \"\n").unwrap_err();
        assert!(matches!(err, HarnessError::ConfigError(_)));
    }
}
