//! GitHub integration module for GitHub App support.
//!
//! This module provides:
//! - JWT token generation for GitHub App authentication
//! - The `AppsApi` capability and its HTTP implementation

pub mod api_client;
pub mod token_manager;

pub use api_client::{
    AppClient, AppsApi, Installation, InstallationAccount, InstallationPage, InstallationToken,
    DEFAULT_API_BASE,
};
pub use token_manager::AppKey;
