//! Installation token acquisition.
//!
//! `Auther` is the single entry point: it answers from the token cache while
//! the cached token is valid and otherwise mints a new installation token,
//! resolving the installation from a login name first when needed.

mod auther;
mod resolver;

pub use auther::Auther;
pub use resolver::{resolve_installation_id, INSTALLATIONS_PER_PAGE};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Which installation to mint tokens for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationIdentity {
    Id(u64),
    /// Resolved by scanning the App's installations for this account login.
    Login(String),
}

impl InstallationIdentity {
    /// Pick the identity from the two optional sources. An explicit non-zero ID
    /// wins over a login.
    pub fn from_parts(installation_id: Option<u64>, login: Option<&str>) -> Result<Self> {
        match (installation_id.filter(|id| *id != 0), login.filter(|l| !l.is_empty())) {
            (Some(id), _) => Ok(InstallationIdentity::Id(id)),
            (None, Some(login)) => Ok(InstallationIdentity::Login(login.to_string())),
            (None, None) => Err(Error::config("must be set -installationid or -login")),
        }
    }
}

/// Anything that can hand out an installation token.
#[async_trait]
pub trait TokenSource: Send {
    async fn fetch_token(&mut self) -> Result<String>;
}
