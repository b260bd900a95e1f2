//! Shared User-Agent string for index and archive requests.
//!
//! Identifies the tool and its version so the archive operators can tell our
//! traffic apart.

/// Product token used in the User-Agent.
const PRODUCT: &str = "ensdf-sync";

/// Default User-Agent for all requests to the archive server.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{PRODUCT}/{version} (nuclear-data-sync)")
}
