//! The git credential helper protocol.
//!
//! git writes `key=value` lines to the helper's stdin, terminated by a blank
//! line or EOF, and reads the answer from stdout in the same format.
//! See `gitcredentials(7)`.

use std::fmt;
use std::io::{BufRead, Write};

use tracing::debug;

use crate::auth::TokenSource;
use crate::error::{Error, Result};

pub const TOKEN_USERNAME: &str = "x-access-token";
/// The `host` line of every answer, whatever host the request matched.
pub const RESPONSE_HOST: &str = "github.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    Protocol,
    Host,
    Username,
    Password,
}

impl CredentialKey {
    fn parse(key: &str) -> Option<Self> {
        match key {
            "protocol" => Some(CredentialKey::Protocol),
            "host" => Some(CredentialKey::Host),
            "username" => Some(CredentialKey::Username),
            "password" => Some(CredentialKey::Password),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::Protocol => "protocol",
            CredentialKey::Host => "host",
            CredentialKey::Username => "username",
            CredentialKey::Password => "password",
        }
    }
}

/// A request from git, kept in the order it was received so it can be echoed back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialRequest {
    fields: Vec<(CredentialKey, String)>,
}

impl CredentialRequest {
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut fields = Vec::new();

        for line in reader.lines() {
            let line = line.map_err(|e| Error::io("scan credential request from", "<stdin>", e))?;
            if line.is_empty() {
                break;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| Error::InvalidInput(line.clone()))?;
            let key = CredentialKey::parse(key).ok_or_else(|| Error::InvalidInput(line.clone()))?;
            fields.push((key, value.to_string()));
        }

        Ok(Self { fields })
    }

    /// The last value given for `key`.
    pub fn get(&self, key: CredentialKey) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn host(&self) -> &str {
        self.get(CredentialKey::Host).unwrap_or_default()
    }

    pub fn protocol(&self) -> &str {
        self.get(CredentialKey::Protocol).unwrap_or_default()
    }

    /// Whether this helper is authoritative for the request.
    pub fn is_for(&self, hostname: &str) -> bool {
        self.host() == hostname && self.protocol().starts_with("http")
    }
}

impl fmt::Display for CredentialRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.fields {
            writeln!(f, "{}={}", key.as_str(), value)?;
        }
        Ok(())
    }
}

/// The answer to a `get` request this helper is authoritative for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialResponse {
    pub password: String,
}

impl fmt::Display for CredentialResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "protocol=https")?;
        writeln!(f, "host={}", RESPONSE_HOST)?;
        writeln!(f, "username={}", TOKEN_USERNAME)?;
        writeln!(f, "password={}", self.password)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    /// The request was for another host and was echoed unchanged.
    Passthrough,
    /// A token was written.
    Credential,
}

/// Answer one `get` request.
///
/// `connect` builds the token source and is only called once the request is
/// known to be for `hostname`, so unrelated hosts never load keys or caches.
pub async fn serve_get<R, W, S, F>(
    input: R,
    output: &mut W,
    hostname: &str,
    connect: F,
) -> Result<Served>
where
    R: BufRead,
    W: Write,
    S: TokenSource,
    F: FnOnce() -> Result<S>,
{
    let request = CredentialRequest::read_from(input)?;

    if !request.is_for(hostname) {
        debug!(
            host = request.host(),
            protocol = request.protocol(),
            "Request is not for this helper, passing through"
        );
        write!(output, "{}", request)
            .map_err(|e| Error::io("write credential response to", "<stdout>", e))?;
        return Ok(Served::Passthrough);
    }

    let mut source = connect()?;
    let password = source.fetch_token().await?;
    let response = CredentialResponse { password };
    write!(output, "{}", response)
        .map_err(|e| Error::io("write credential response to", "<stdout>", e))?;

    Ok(Served::Credential)
}
