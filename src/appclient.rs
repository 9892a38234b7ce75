// src/appclient.rs

//! Command line for the application server's client runner.
//!
//! The deployment itself (archive, manifest, unpacking) is produced
//! elsewhere; this module only knows where the runner lives inside a server
//! installation and how to point it at the unpacked client jar.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::exec::CommandSpec;

/// Runner location relative to the server home.
const RUNNER_RELATIVE_PATH: &[&str] = &["glassfish", "bin", "appclient"];

/// An app-client invocation: `<server_home>/glassfish/bin/appclient -jar <client_jar>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppClient {
    pub server_home: PathBuf,
    pub client_jar: PathBuf,
    pub working_dir: Option<PathBuf>,
    pub env: Option<BTreeMap<String, String>>,
}

impl AppClient {
    pub fn new(server_home: impl Into<PathBuf>, client_jar: impl Into<PathBuf>) -> Self {
        Self {
            server_home: server_home.into(),
            client_jar: client_jar.into(),
            working_dir: None,
            env: None,
        }
    }

    /// Absolute (or home-relative) path to the runner executable.
    pub fn runner_path(&self) -> PathBuf {
        RUNNER_RELATIVE_PATH
            .iter()
            .fold(self.server_home.clone(), |path, part| path.join(part))
    }

    pub fn command_spec(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(
            self.runner_path(),
            [PathBuf::from("-jar"), self.client_jar.clone()],
        );
        if let Some(dir) = &self.working_dir {
            spec = spec.with_working_dir(dir);
        }
        if let Some(env) = &self.env {
            spec = spec.with_env(env.clone());
        }
        spec
    }
}

/// Log every entry of the unpacked deployment directory and return them sorted.
pub fn log_deployment_contents(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();

    for path in &entries {
        info!(path = %path.display(), "unpacked file");
    }

    Ok(entries)
}
