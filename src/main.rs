use std::io;
use std::process::ExitCode;

use anyhow::Result;

use git_credential_github_apps::cli::{parse_helper_args, HelperCli};
use git_credential_github_apps::config::Config;
use git_credential_github_apps::credential::{serve_get, Served};
use git_credential_github_apps::{logging, Auther};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match parse_helper_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let message = e.render().to_string();
            let message = message.trim_start_matches("error: ").trim_end();
            println!("[ERROR] {}", message);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&cli.app.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("[ERROR] {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: HelperCli) -> Result<()> {
    let config = Config::from_args(&cli.app)?;

    // git also calls helpers with `store` and `erase`; there is nothing to do for those
    if !cli.is_get() {
        tracing::debug!(operation = ?cli.operation, "Ignoring credential operation");
        return Ok(());
    }

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    let served = serve_get(stdin, &mut stdout, &config.hostname, || {
        Auther::from_config(&config)
    })
    .await?;

    if served == Served::Credential {
        tracing::debug!(hostname = %config.hostname, "Answered credential request");
    }

    Ok(())
}
