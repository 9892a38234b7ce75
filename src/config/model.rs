// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::appclient::AppClient;
use crate::exec::{CommandSpec, SupervisorOptions};

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [run]
/// timeout = "1000s"
/// kill_grace = "5s"
/// drain_grace = "2s"
///
/// [command]
/// program = "/bin/echo"
/// args = ["hello"]
///
/// # or, instead of [command]:
/// [appclient]
/// server_home = "/opt/glassfish7"
/// client_jar = "target/app-client.ear/client-main.jar"
/// deployment_dir = "target/app-client.ear"
/// ```
///
/// All sections are optional; `[command]` and `[appclient]` are mutually
/// exclusive.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub command: Option<CommandSection>,

    #[serde(default)]
    pub appclient: Option<AppClientSection>,
}

/// `[run]` section: timing knobs, as duration strings (`"250ms"`, `"3s"`, `"1m"`).
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    #[serde(default = "default_timeout")]
    pub timeout: String,

    #[serde(default = "default_kill_grace")]
    pub kill_grace: String,

    #[serde(default = "default_drain_grace")]
    pub drain_grace: String,
}

fn default_timeout() -> String {
    "1000s".to_string()
}

fn default_kill_grace() -> String {
    "5s".to_string()
}

fn default_drain_grace() -> String {
    "2s".to_string()
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            kill_grace: default_kill_grace(),
            drain_grace: default_drain_grace(),
        }
    }
}

/// `[command]` section: an arbitrary command line.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Replaces the inherited environment when present.
    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,
}

impl CommandSection {
    pub fn to_spec(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program, &self.args);
        if let Some(dir) = &self.working_dir {
            spec = spec.with_working_dir(dir);
        }
        if let Some(env) = &self.env {
            spec = spec.with_env(env.clone());
        }
        spec
    }
}

/// `[appclient]` section: the application server's client runner.
#[derive(Debug, Clone, Deserialize)]
pub struct AppClientSection {
    pub server_home: PathBuf,

    pub client_jar: PathBuf,

    /// Unpacked deployment directory to list before running, if any.
    #[serde(default)]
    pub deployment_dir: Option<PathBuf>,

    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,
}

impl AppClientSection {
    pub fn to_app_client(&self) -> AppClient {
        AppClient {
            server_home: self.server_home.clone(),
            client_jar: self.client_jar.clone(),
            working_dir: self.working_dir.clone(),
            env: self.env.clone(),
        }
    }
}

/// What the config says to run.
#[derive(Debug, Clone)]
pub enum RunTarget {
    Command(CommandSection),
    AppClient(AppClientSection),
}

impl RunTarget {
    pub fn to_spec(&self) -> CommandSpec {
        match self {
            RunTarget::Command(cmd) => cmd.to_spec(),
            RunTarget::AppClient(app) => app.to_app_client().command_spec(),
        }
    }
}

/// Validated configuration.
///
/// Only built through `TryFrom<RawConfigFile>` (or [`ConfigFile::default`]),
/// so the durations in `options` are known to be well-formed.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub options: SupervisorOptions,
    pub target: Option<RunTarget>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(options: SupervisorOptions, target: Option<RunTarget>) -> Self {
        Self { options, target }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(SupervisorOptions::default(), None)
    }
}
