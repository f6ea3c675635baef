use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::github::AppsApi;

pub const INSTALLATIONS_PER_PAGE: u32 = 100;

/// Find the installation whose account login equals `login`.
///
/// Pages are walked in order, one request at a time, so the first match by
/// page order and then by position within the page wins. The comparison is
/// case-sensitive.
pub async fn resolve_installation_id(api: &dyn AppsApi, login: &str) -> Result<u64> {
    let mut page = 1;

    loop {
        let listing = api
            .list_installations(page, INSTALLATIONS_PER_PAGE)
            .await
            .map_err(|source| Error::Api {
                context: "fail to fetch installations",
                source,
            })?;

        debug!(page, count = listing.installations.len(), "Scanning installations");

        if let Some(installation) = listing
            .installations
            .iter()
            .find(|installation| installation.account_login() == Some(login))
        {
            info!(login, installation_id = installation.id, "Resolved installation");
            return Ok(installation.id);
        }

        if listing.last_page == 0 || page >= listing.last_page {
            return Err(Error::NotFound {
                login: login.to_string(),
            });
        }
        page += 1;
    }
}
