//! Running a command with an installation token in its environment.

use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// The command ghawrap hands control to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapCommand {
    program: String,
    args: Vec<String>,
}

impl WrapCommand {
    /// Build from the trailing arguments; a leading `--` is dropped.
    pub fn from_args(mut args: Vec<String>) -> Result<Self> {
        if args.first().map(String::as_str) == Some("--") {
            args.remove(0);
        }
        if args.is_empty() {
            return Err(Error::config(
                "not provides command from args. eg. ghawrap -- yourcli options...",
            ));
        }

        let program = args.remove(0);
        Ok(Self { program, args })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The process to launch: inherits the environment plus `GITHUB_TOKEN`.
    pub fn command(&self, token: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).env(TOKEN_ENV, token);
        command
    }

    /// Replace the current process with the command. Only returns on failure.
    #[cfg(unix)]
    pub fn exec(&self, token: &str) -> Error {
        use std::os::unix::process::CommandExt;

        debug!(program = %self.program, "Executing wrapped command");
        let err = self.command(token).exec();
        Error::io("exec", &self.program, err)
    }

    /// Platforms without exec run the command as a child and exit with its
    /// status, which is the closest equivalent.
    #[cfg(not(unix))]
    pub fn exec(&self, token: &str) -> Error {
        debug!(program = %self.program, "Running wrapped command");
        match self.command(token).status() {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(err) => Error::io("run", &self.program, err),
        }
    }
}
