// src/main.rs

use std::process::ExitCode;

use clientrun::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    match run_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("clientrun error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run_main() -> anyhow::Result<ExitCode> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;

    let Some(result) = run(args).await? else {
        // dry run
        return Ok(ExitCode::SUCCESS);
    };

    match result.verdict() {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(failure) => {
            eprintln!("clientrun: {failure}");
            Ok(ExitCode::FAILURE)
        }
    }
}
