// src/fetch/page.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (outbreak timeline chart)"
);

/// Blocking client with the crate's user agent and default timeouts.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .build()
        .context("building HTTP client")
}

/// GET `url` and return the body text; non-2xx statuses are errors.
pub fn fetch_page(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    let body = client
        .get(url.clone())
        .send()
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .with_context(|| format!("Reading text from {}", url))?;
    info!(%url, bytes = body.len(), "fetched page");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_the_crate() {
        assert!(USER_AGENT.starts_with("outbreak-timeline/"));
        assert!(build_client().is_ok());
    }
}
