//! Command-line surface shared by `git-credential-github-apps` and `ghawrap`.
//!
//! Parsing is pure: `parse_helper_args` and `parse_wrap_args` take an argv and
//! return the parsed structure or a `clap::Error`, with no process-wide state.
//! Existing git configurations pass Go-style flags (`-appid 123`), which are
//! rewritten to clap's `--appid 123` form before parsing.

use std::ffi::OsString;

use clap::{Args, Parser};

use crate::store::CorruptCachePolicy;

/// Options shared by both binaries.
#[derive(Args, Debug, Clone)]
pub struct AppArgs {
    /// Private key of the GitHub App (PEM file)
    #[arg(
        long = "privatekey",
        env = "GITHUB_APPS_PRIVATE_KEY",
        default_value = "private_key.pem"
    )]
    pub private_key: String,

    /// App ID of the GitHub App
    #[arg(long = "appid", env = "GITHUB_APPS_APP_ID", default_value_t = 0)]
    pub app_id: u64,

    /// Installation ID of the organization or user on the GitHub App
    #[arg(long = "installationid", default_value_t = 0)]
    pub installation_id: u64,

    /// Login name of the organization or user; used to look up the installation
    /// ID when --installationid is not set
    #[arg(long)]
    pub login: Option<String>,

    /// Hostname git uses to reach the repository
    #[arg(long, default_value = "github.com")]
    pub hostname: String,

    /// API hostname or base URL used for GitHub API calls (GitHub Enterprise)
    #[arg(long = "apibase", default_value = "api.github.com")]
    pub api_base: String,

    /// File the token is cached in; an empty value disables caching
    /// [default: <user cache dir>/git-credential-github-apps-token-cache]
    #[arg(long = "cachefile")]
    pub cache_file: Option<String>,

    /// What to do when the cache file cannot be decoded
    #[arg(long = "on-corrupt-cache", value_enum, default_value_t = CorruptCachePolicy::Fail)]
    pub on_corrupt_cache: CorruptCachePolicy,

    /// Log filter for diagnostics on stderr (RUST_LOG takes precedence)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

/// git credential helper: answers `get` requests with an installation token.
#[derive(Parser, Debug)]
#[command(name = "git-credential-github-apps")]
#[command(version, about = "git credential helper for GitHub Apps", long_about = None)]
pub struct HelperCli {
    #[command(flatten)]
    pub app: AppArgs,

    /// Credential operation passed by git; only `get` is answered
    pub operation: Vec<String>,
}

impl HelperCli {
    pub fn is_get(&self) -> bool {
        self.operation.len() == 1 && self.operation[0] == "get"
    }
}

/// Runs a command with GITHUB_TOKEN set to an installation token.
#[derive(Parser, Debug)]
#[command(name = "ghawrap")]
#[command(version, about = "Run a command with a GitHub App installation token", long_about = None)]
#[command(
    after_help = "Example: ghawrap -appid 1234 -login my-org -- gh api /installation/repositories"
)]
pub struct WrapCli {
    #[command(flatten)]
    pub app: AppArgs,

    /// Command to run, followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

pub fn parse_helper_args<I, T>(argv: I) -> Result<HelperCli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    HelperCli::try_parse_from(normalize_go_flags(argv))
}

pub fn parse_wrap_args<I, T>(argv: I) -> Result<WrapCli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    WrapCli::try_parse_from(normalize_go_flags(argv))
}

// (name, takes a value)
const LONG_FLAGS: &[(&str, bool)] = &[
    ("privatekey", true),
    ("appid", true),
    ("installationid", true),
    ("login", true),
    ("hostname", true),
    ("apibase", true),
    ("cachefile", true),
    ("on-corrupt-cache", true),
    ("log-level", true),
    ("help", false),
    ("version", false),
];

fn long_flag(name: &str) -> Option<bool> {
    LONG_FLAGS
        .iter()
        .find(|(flag, _)| *flag == name)
        .map(|(_, takes_value)| *takes_value)
}

/// Rewrite `-name` / `-name=value` into `--name` / `--name=value` for known
/// long options. Rewriting stops at `--` or at the first positional argument,
/// so a wrapped command's own flags are left alone.
pub fn normalize_go_flags<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = argv.into_iter().map(Into::into);
    let mut out: Vec<OsString> = args.next().into_iter().collect();
    let mut expect_value = false;

    while let Some(arg) = args.next() {
        if expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }

        let Some(text) = arg.to_str().map(str::to_owned) else {
            out.push(arg);
            continue;
        };

        if text == "--" || !text.starts_with('-') || text == "-" {
            out.push(arg);
            out.extend(args);
            break;
        }

        let (dashes, rest) = match text.strip_prefix("--") {
            Some(rest) => ("--", rest),
            None => ("-", &text[1..]),
        };
        let (name, has_inline_value) = match rest.split_once('=') {
            Some((name, _)) => (name, true),
            None => (rest, false),
        };

        match long_flag(name) {
            Some(takes_value) => {
                expect_value = takes_value && !has_inline_value;
                if dashes == "-" {
                    out.push(format!("--{}", rest).into());
                } else {
                    out.push(arg);
                }
            }
            None => out.push(arg),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_normalize_go_style_flags() {
        let args = normalize_go_flags([
            "git-credential-github-apps",
            "-privatekey",
            "/etc/key.pem",
            "-appid=42",
            "--login",
            "octo-org",
            "get",
        ]);
        assert_eq!(
            strings(args),
            vec![
                "git-credential-github-apps",
                "--privatekey",
                "/etc/key.pem",
                "--appid=42",
                "--login",
                "octo-org",
                "get",
            ]
        );
    }

    #[test]
    fn test_normalize_leaves_short_and_unknown_flags() {
        let args = normalize_go_flags(["prog", "-h", "-x"]);
        assert_eq!(strings(args), vec!["prog", "-h", "-x"]);
    }

    #[test]
    fn test_normalize_value_that_looks_like_flag() {
        let args = normalize_go_flags(["prog", "-login", "-appid"]);
        assert_eq!(strings(args), vec!["prog", "--login", "-appid"]);
    }

    #[test]
    fn test_normalize_stops_at_command() {
        let args = normalize_go_flags(["ghawrap", "-appid", "1", "gh", "-hostname", "x"]);
        assert_eq!(
            strings(args),
            vec!["ghawrap", "--appid", "1", "gh", "-hostname", "x"]
        );

        let args = normalize_go_flags(["ghawrap", "--", "tool", "-login"]);
        assert_eq!(strings(args), vec!["ghawrap", "--", "tool", "-login"]);
    }

    #[test]
    fn test_parse_helper_args_defaults() {
        let cli = parse_helper_args(["git-credential-github-apps", "-appid", "7", "get"]).unwrap();

        assert_eq!(cli.app.app_id, 7);
        assert_eq!(cli.app.private_key, "private_key.pem");
        assert_eq!(cli.app.installation_id, 0);
        assert_eq!(cli.app.login, None);
        assert_eq!(cli.app.hostname, "github.com");
        assert_eq!(cli.app.api_base, "api.github.com");
        assert_eq!(cli.app.cache_file, None);
        assert_eq!(cli.app.on_corrupt_cache, CorruptCachePolicy::Fail);
        assert!(cli.is_get());
    }

    #[test]
    fn test_parse_helper_args_operation() {
        let cli = parse_helper_args(["helper", "--appid", "7", "store"]).unwrap();
        assert!(!cli.is_get());

        let cli = parse_helper_args(["helper", "--appid", "7"]).unwrap();
        assert!(!cli.is_get());

        let cli = parse_helper_args(["helper", "--appid", "7", "get", "extra"]).unwrap();
        assert!(!cli.is_get());
    }

    #[test]
    fn test_parse_helper_args_all_options() {
        let cli = parse_helper_args([
            "helper",
            "-privatekey",
            "app.pem",
            "-appid",
            "9",
            "-installationid",
            "123",
            "-hostname",
            "ghe.example.com",
            "-apibase",
            "ghe.example.com/api/v3",
            "-cachefile",
            "",
            "--on-corrupt-cache",
            "refresh",
            "get",
        ])
        .unwrap();

        assert_eq!(cli.app.private_key, "app.pem");
        assert_eq!(cli.app.installation_id, 123);
        assert_eq!(cli.app.hostname, "ghe.example.com");
        assert_eq!(cli.app.api_base, "ghe.example.com/api/v3");
        assert_eq!(cli.app.cache_file.as_deref(), Some(""));
        assert_eq!(cli.app.on_corrupt_cache, CorruptCachePolicy::Refresh);
    }

    #[test]
    fn test_parse_help_is_display_help() {
        let err = parse_helper_args(["helper", "-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = parse_wrap_args(["ghawrap", "-help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_parse_rejects_non_numeric_app_id() {
        let err = parse_helper_args(["helper", "-appid", "abc"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_parse_wrap_args_command() {
        let cli = parse_wrap_args([
            "ghawrap", "-appid", "1", "-login", "octo", "--", "gh", "api", "--paginate",
        ])
        .unwrap();
        assert_eq!(cli.app.login.as_deref(), Some("octo"));
        assert_eq!(cli.command, vec!["gh", "api", "--paginate"]);

        let cli = parse_wrap_args(["ghawrap", "--appid", "1", "env", "-i"]).unwrap();
        assert_eq!(cli.command, vec!["env", "-i"]);
    }

    #[test]
    fn test_parse_wrap_args_without_command() {
        let cli = parse_wrap_args(["ghawrap", "--appid", "1"]).unwrap();
        assert!(cli.command.is_empty());
    }

    #[test]
    fn test_clap_definition_is_consistent() {
        use clap::CommandFactory;
        HelperCli::command().debug_assert();
        WrapCli::command().debug_assert();
    }
}
