use std::path::PathBuf;

use crate::auth::InstallationIdentity;
use crate::cli::AppArgs;
use crate::error::{Error, Result};
use crate::store::CorruptCachePolicy;

pub const DEFAULT_CACHE_FILENAME: &str = "git-credential-github-apps-token-cache";

/// Validated, immutable settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub private_key: PathBuf,
    pub app_id: u64,
    pub identity: InstallationIdentity,
    /// Host git must ask about for this helper to answer
    pub hostname: String,
    pub api_base: String,
    /// `None` disables the token cache
    pub cache_file: Option<PathBuf>,
    pub corrupt_cache: CorruptCachePolicy,
}

impl Config {
    /// Validate parsed arguments. Fails before any file or network access.
    pub fn from_args(args: &AppArgs) -> Result<Self> {
        Self::from_args_with_cache_dir(args, dirs::cache_dir)
    }

    fn from_args_with_cache_dir(
        args: &AppArgs,
        cache_dir: impl FnOnce() -> Option<PathBuf>,
    ) -> Result<Self> {
        if args.private_key.is_empty() || args.app_id == 0 {
            return Err(Error::config("must be set -privatekey and -appid"));
        }

        let identity =
            InstallationIdentity::from_parts(Some(args.installation_id), args.login.as_deref())?;

        let cache_file = match args.cache_file.as_deref() {
            Some("") => None,
            Some(path) => Some(PathBuf::from(path)),
            None => {
                let dir = cache_dir().ok_or_else(|| Error::config("fail to detect cache dir"))?;
                Some(dir.join(DEFAULT_CACHE_FILENAME))
            }
        };

        Ok(Self {
            private_key: PathBuf::from(&args.private_key),
            app_id: args.app_id,
            identity,
            hostname: args.hostname.clone(),
            api_base: args.api_base.clone(),
            cache_file,
            corrupt_cache: args.on_corrupt_cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_helper_args;

    fn args(extra: &[&str]) -> AppArgs {
        let mut argv = vec!["helper"];
        argv.extend_from_slice(extra);
        parse_helper_args(argv).unwrap().app
    }

    fn cache_dir() -> Option<PathBuf> {
        Some(PathBuf::from("/home/dev/.cache"))
    }

    #[test]
    fn test_config_with_installation_id() {
        let config = Config::from_args_with_cache_dir(
            &args(&["-appid", "12", "-installationid", "34"]),
            cache_dir,
        )
        .unwrap();

        assert_eq!(config.app_id, 12);
        assert_eq!(config.identity, InstallationIdentity::Id(34));
        assert_eq!(config.hostname, "github.com");
        assert_eq!(
            config.cache_file,
            Some(PathBuf::from("/home/dev/.cache").join(DEFAULT_CACHE_FILENAME))
        );
    }

    #[test]
    fn test_config_with_login() {
        let config =
            Config::from_args_with_cache_dir(&args(&["-appid", "12", "-login", "octo"]), cache_dir)
                .unwrap();
        assert_eq!(config.identity, InstallationIdentity::Login("octo".to_string()));
    }

    #[test]
    fn test_config_requires_app_id() {
        let result =
            Config::from_args_with_cache_dir(&args(&["-installationid", "34"]), cache_dir);
        assert!(
            matches!(result, Err(Error::Config(ref m)) if m == "must be set -privatekey and -appid")
        );
    }

    #[test]
    fn test_config_requires_private_key() {
        let result = Config::from_args_with_cache_dir(
            &args(&["-privatekey", "", "-appid", "1", "-installationid", "2"]),
            cache_dir,
        );
        assert!(
            matches!(result, Err(Error::Config(ref m)) if m == "must be set -privatekey and -appid")
        );
    }

    #[test]
    fn test_config_requires_installation_or_login() {
        let result = Config::from_args_with_cache_dir(&args(&["-appid", "12"]), cache_dir);
        assert!(
            matches!(result, Err(Error::Config(ref m)) if m == "must be set -installationid or -login")
        );
    }

    #[test]
    fn test_empty_cache_file_disables_cache() {
        let config = Config::from_args_with_cache_dir(
            &args(&["-appid", "1", "-installationid", "2", "-cachefile", ""]),
            || None,
        )
        .unwrap();
        assert_eq!(config.cache_file, None);
    }

    #[test]
    fn test_explicit_cache_file_skips_cache_dir_detection() {
        let config = Config::from_args_with_cache_dir(
            &args(&["-appid", "1", "-installationid", "2", "-cachefile", "/tmp/tok"]),
            || None,
        )
        .unwrap();
        assert_eq!(config.cache_file, Some(PathBuf::from("/tmp/tok")));
    }

    #[test]
    fn test_missing_cache_dir_is_config_error() {
        let result = Config::from_args_with_cache_dir(
            &args(&["-appid", "1", "-installationid", "2"]),
            || None,
        );
        assert!(matches!(result, Err(Error::Config(ref m)) if m == "fail to detect cache dir"));
    }
}
