use async_trait::async_trait;
use tracing::{debug, info};

use super::{resolve_installation_id, InstallationIdentity, TokenSource};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::github::{AppClient, AppKey, AppsApi};
use crate::store::{FileStore, TokenStore};

/// Provides installation access tokens for one GitHub App installation.
pub struct Auther<A = AppClient> {
    api: A,
    identity: InstallationIdentity,
    installation_id: Option<u64>,
    store: Option<Box<dyn TokenStore>>,
}

impl Auther<AppClient> {
    /// Build an authenticator from validated configuration.
    ///
    /// Loads the private key and the token cache. Nothing touches the network
    /// until `fetch_token` needs a new token.
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = AppKey::from_file(config.app_id, &config.private_key).map_err(|source| {
            Error::Auth {
                context: "cannot create apps transport",
                source,
            }
        })?;
        let api = AppClient::new(key, &config.api_base).map_err(|source| Error::Auth {
            context: "cannot create apps transport",
            source,
        })?;

        let store = match &config.cache_file {
            Some(path) => {
                Some(Box::new(FileStore::open(path, config.corrupt_cache)?) as Box<dyn TokenStore>)
            }
            None => None,
        };

        Ok(Self::new(api, config.identity.clone(), store))
    }
}

impl<A: AppsApi> Auther<A> {
    pub fn new(
        api: A,
        identity: InstallationIdentity,
        store: Option<Box<dyn TokenStore>>,
    ) -> Self {
        let installation_id = match identity {
            InstallationIdentity::Id(id) => Some(id),
            InstallationIdentity::Login(_) => None,
        };
        Self {
            api,
            identity,
            installation_id,
            store,
        }
    }

    /// Return a valid installation token.
    ///
    /// A cached token is returned as long as it has not expired. Otherwise a
    /// new one is minted and, when a cache is configured, persisted before it
    /// is returned. A failed write fails the whole call.
    pub async fn fetch_token(&mut self) -> Result<String> {
        if let Some(store) = &self.store {
            if !store.expired() {
                debug!("Using cached installation token");
                return Ok(store.token().to_string());
            }
        }

        let installation_id = self.installation_id().await?;
        let minted = self
            .api
            .create_installation_token(installation_id)
            .await
            .map_err(|source| Error::Auth {
                context: "fail to create installation token",
                source,
            })?;

        info!(
            installation_id,
            expires_at = %minted.expires_at,
            "Minted installation token"
        );

        if let Some(store) = self.store.as_mut() {
            store.save(&minted.token, minted.expires_at)?;
        }

        Ok(minted.token)
    }

    // Login lookups happen at most once per process.
    async fn installation_id(&mut self) -> Result<u64> {
        if let Some(id) = self.installation_id {
            return Ok(id);
        }

        let id = match &self.identity {
            InstallationIdentity::Id(id) => *id,
            InstallationIdentity::Login(login) => resolve_installation_id(&self.api, login).await?,
        };
        self.installation_id = Some(id);
        Ok(id)
    }
}

#[async_trait]
impl<A: AppsApi> TokenSource for Auther<A> {
    async fn fetch_token(&mut self) -> Result<String> {
        Auther::fetch_token(self).await
    }
}
