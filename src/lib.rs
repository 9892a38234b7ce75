// src/lib.rs

pub mod appclient;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{
    ConfigFile, RunTarget, default_config_path, load_and_validate, parse_duration,
};
use crate::exec::{
    CommandSpec, LineSink, PrefixedPrinter, RunResult, Supervisor, SupervisorOptions, TracingSink,
};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - command resolution (trailing CLI command, `[command]` or `[appclient]`)
/// - the supervised run
///
/// Returns `None` for `--dry-run`, otherwise the run's terminal state.
pub async fn run(args: CliArgs) -> Result<Option<RunResult>> {
    let cfg = load_config(&args)?;
    let options = resolve_options(&args, &cfg)?;
    let spec = resolve_command(&args, &cfg)?;

    if args.dry_run {
        print_dry_run(&spec, &options);
        return Ok(None);
    }

    // The deployment listing only makes sense when the runner comes from config.
    if args.command.is_empty() {
        if let Some(RunTarget::AppClient(app)) = &cfg.target {
            if let Some(dir) = &app.deployment_dir {
                appclient::log_deployment_contents(dir).with_context(|| {
                    format!("listing deployment directory {}", dir.display())
                })?;
            }
        }
    }

    let sink: Arc<dyn LineSink> = if args.quiet {
        Arc::new(TracingSink)
    } else {
        Arc::new(PrefixedPrinter)
    };

    let report = Supervisor::new(options).with_sink(sink).run(&spec).await;

    info!(
        elapsed_ms = report.elapsed.as_millis() as u64,
        result = ?report.result,
        "run complete"
    );

    Ok(Some(report.result))
}

/// Explicit `--config` must exist; the default path is optional.
fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let explicit = args.config.as_ref().map(PathBuf::from);
    let path = match explicit {
        Some(path) => path,
        None => {
            let default = default_config_path();
            if !default.is_file() {
                debug!(path = %default.display(), "no config file; using defaults");
                return Ok(ConfigFile::default());
            }
            default
        }
    };

    let cfg = load_and_validate(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

fn resolve_options(args: &CliArgs, cfg: &ConfigFile) -> Result<SupervisorOptions> {
    let mut options = cfg.options;

    if let Some(raw) = &args.timeout {
        let timeout = parse_duration(raw).map_err(|e| anyhow!("--timeout: {e}"))?;
        if timeout.is_zero() {
            bail!("--timeout must be greater than zero");
        }
        options.timeout = timeout;
    }

    Ok(options)
}

fn resolve_command(args: &CliArgs, cfg: &ConfigFile) -> Result<CommandSpec> {
    if let Some(spec) = CommandSpec::from_argv(args.command.iter().cloned()) {
        return Ok(spec);
    }

    match &cfg.target {
        Some(target) => Ok(target.to_spec()),
        None => bail!(
            "nothing to run: pass a command after `--` or add a [command] or [appclient] section to the config"
        ),
    }
}

fn print_dry_run(spec: &CommandSpec, options: &SupervisorOptions) {
    println!("clientrun dry-run");
    println!("  command: {spec}");
    if let Some(dir) = spec.working_dir() {
        println!("  working_dir: {}", dir.display());
    }
    match spec.env() {
        Some(env) => {
            println!("  env (replaces inherited):");
            for (key, value) in env {
                println!("      {key}={value}");
            }
        }
        None => println!("  env: inherited"),
    }
    println!("  timeout: {:?}", options.timeout);
    println!("  kill_grace: {:?}", options.kill_grace);
    println!("  drain_grace: {:?}", options.drain_grace);

    debug!("dry-run complete (no execution)");
}
