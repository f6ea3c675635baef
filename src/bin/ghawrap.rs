use std::convert::Infallible;
use std::process::ExitCode;

use anyhow::Result;

use git_credential_github_apps::cli::{parse_wrap_args, WrapCli};
use git_credential_github_apps::config::Config;
use git_credential_github_apps::wrap::WrapCommand;
use git_credential_github_apps::{logging, Auther};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match parse_wrap_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
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
        Ok(never) => match never {},
        Err(e) => {
            println!("[ERROR] {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// On success the process image is replaced, so this only returns errors.
async fn run(cli: WrapCli) -> Result<Infallible> {
    let config = Config::from_args(&cli.app)?;
    let command = WrapCommand::from_args(cli.command)?;

    let mut auther = Auther::from_config(&config)?;
    let token = auther.fetch_token().await?;

    Err(command.exec(&token).into())
}
