//! Profile API requests
//!
//! Maps API responses onto the fetch error taxonomy:
//!
//! | Condition | Result |
//! |-----------|--------|
//! | 2xx | Normalized `ProfileRecord` |
//! | 403 | `RateLimited` |
//! | Other non-2xx | `Api` with the status code |
//! | Connection, timeout or body decode failure | `Transport` |

use crate::fetch::profile::{ApiUser, ProfileRecord};
use crate::{HarvestError, UrlError};
use reqwest::{Client, StatusCode};
use url::Url;

/// Builds `{api_base}/users/{login}`
///
/// The login is pushed as a single path segment, so characters that are not
/// valid in a path are percent-encoded.
pub fn profile_url(api_base: &Url, login: &str) -> Result<Url, UrlError> {
    let mut url = api_base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| UrlError::Malformed(format!("{} cannot be a base URL", api_base)))?
        .pop_if_empty()
        .push("users")
        .push(login);
    Ok(url)
}

/// Fetches and normalizes one public profile
pub async fn fetch_profile(
    client: &Client,
    api_base: &Url,
    login: &str,
) -> Result<ProfileRecord, HarvestError> {
    let url = profile_url(api_base, login)?;
    tracing::debug!("Fetching profile {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| HarvestError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();

    if status == StatusCode::FORBIDDEN {
        return Err(HarvestError::RateLimited {
            login: login.to_string(),
        });
    }

    if !status.is_success() {
        return Err(HarvestError::Api {
            login: login.to_string(),
            status: status.as_u16(),
        });
    }

    let user: ApiUser = response
        .json()
        .await
        .map_err(|source| HarvestError::Transport {
            url: url.to_string(),
            source,
        })?;

    Ok(ProfileRecord::from_api(user, login))
}
