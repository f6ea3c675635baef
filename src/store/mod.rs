//! Local persistence of the last minted installation token.
//!
//! The cache holds exactly one record. Every refresh overwrites it wholesale,
//! so helpers pointed at different installations must use different cache files.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// What to do when the cache file exists but cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CorruptCachePolicy {
    /// Propagate the decode error and stop.
    #[default]
    Fail,
    /// Log a warning and treat the cache as empty, forcing a refresh.
    Refresh,
}

/// The persisted record. A missing expiry means "never valid".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCredential {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedCredential {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// A record is expired once `now` reaches its expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => true,
        }
    }
}

pub trait TokenStore: Send {
    fn token(&self) -> &str;
    fn expired(&self) -> bool;
    fn save(&mut self, token: &str, expires_at: DateTime<Utc>) -> Result<()>;
}

/// Token cache backed by a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    credential: CachedCredential,
}

impl FileStore {
    /// Load the cache at `path`. A missing file yields an empty, expired record.
    pub fn open(path: impl Into<PathBuf>, policy: CorruptCachePolicy) -> Result<Self> {
        let path = path.into();
        let credential = load(&path, policy)?;
        Ok(Self { path, credential })
    }

    pub fn credential(&self) -> &CachedCredential {
        &self.credential
    }
}

impl TokenStore for FileStore {
    fn token(&self) -> &str {
        &self.credential.token
    }

    fn expired(&self) -> bool {
        self.credential.is_expired_at(Utc::now())
    }

    fn save(&mut self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let credential = CachedCredential::new(token, expires_at);
        write_atomic(&self.path, &credential)?;
        debug!(path = %self.path.display(), %expires_at, "Saved token to cache");
        self.credential = credential;
        Ok(())
    }
}

fn load(path: &Path, policy: CorruptCachePolicy) -> Result<CachedCredential> {
    let contents = match std::fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No cached token");
            return Ok(CachedCredential::default());
        }
        Err(e) => return Err(Error::io("open credential store", path, e)),
    };

    match serde_json::from_slice(&contents) {
        Ok(credential) => Ok(credential),
        Err(e) => match policy {
            CorruptCachePolicy::Fail => Err(Error::Decode {
                path: path.to_path_buf(),
                source: e,
            }),
            CorruptCachePolicy::Refresh => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable token cache");
                Ok(CachedCredential::default())
            }
        },
    }
}

// Readers see either the old record or the new one, never a partial write.
fn write_atomic(path: &Path, credential: &CachedCredential) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| Error::io("create cache directory", dir, e))?;

    let contents = serde_json::to_vec(credential).map_err(Error::Encode)?;

    let mut file =
        NamedTempFile::new_in(dir).map_err(|e| Error::io("create credential file", dir, e))?;
    file.write_all(&contents)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| Error::io("write credential file", file.path(), e))?;
    file.persist(path)
        .map_err(|e| Error::io("replace credential file", path, e.error))?;

    Ok(())
}
