use std::time::Duration;

use tracing::info;

use crate::error::FetchError;

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/SimplifyJobs/Summer2025-Internships/dev/README.md";

const USER_AGENT: &str = concat!("internship_sync/", env!("CARGO_PKG_VERSION"));

/// GET the listings document as text. Any transport failure or non-2xx
/// status is an error; nothing is retried.
pub async fn fetch_document(url: &str, timeout: Duration) -> Result<String, FetchError> {
    let request_err = |source: reqwest::Error| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(request_err)?;

    info!("Fetching listings: {}", url);
    let response = client.get(url).send().await.map_err(request_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(request_err)?;
    info!(bytes = body.len(), "Fetched listings");
    Ok(body)
}
