//! App JWT signing.
//!
//! GitHub Apps use two types of authentication:
//! 1. App JWT - Short-lived JWT signed with the app's private key (for app-level operations)
//! 2. Installation Access Token - Token for a specific installation (for repo operations)
//!
//! Only the first is produced here. The second is minted through `AppClient`
//! using a JWT from this module.

use std::path::Path;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// JWT claims for GitHub App authentication.
/// GitHub requires: iat (issued at), exp (expiration), iss (issuer = app_id)
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GitHubAppClaims {
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp) - max 10 minutes
    pub exp: i64,
    /// Issuer - the GitHub App ID
    pub iss: String,
}

/// The App identity: its numeric ID and parsed RSA signing key.
pub struct AppKey {
    app_id: u64,
    key: EncodingKey,
}

impl std::fmt::Debug for AppKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppKey")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

impl AppKey {
    pub fn from_pem(app_id: u64, private_key_pem: &[u8]) -> Result<Self, ApiError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem)?;
        Ok(Self { app_id, key })
    }

    pub fn from_file(app_id: u64, path: &Path) -> Result<Self, ApiError> {
        let pem = std::fs::read(path).map_err(|source| ApiError::ReadKey {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_pem(app_id, &pem)
    }

    /// Generate a JWT for GitHub App authentication.
    ///
    /// The JWT is signed with RS256 and is valid for 10 minutes (GitHub's maximum).
    /// A fresh one is signed for every request, so it never needs caching.
    pub fn generate_jwt(&self) -> Result<String, ApiError> {
        let now = Utc::now();
        // Issue time: 60 seconds in the past to account for clock drift
        let iat = now - Duration::seconds(60);
        let exp = now + Duration::minutes(10);

        let claims = GitHubAppClaims {
            iat: iat.timestamp(),
            exp: exp.timestamp(),
            iss: self.app_id.to_string(),
        };

        Ok(encode(&Header::new(Algorithm::RS256), &claims, &self.key)?)
    }
}
