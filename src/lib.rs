pub mod auth;
pub mod cli;
pub mod config;
pub mod credential;
pub mod error;
pub mod github;
pub mod logging;
pub mod store;
pub mod wrap;

pub use auth::{Auther, InstallationIdentity, TokenSource};
pub use config::Config;
pub use error::{ApiError, Error, Result};
