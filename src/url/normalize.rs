use crate::UrlError;
use url::Url;

/// Parses a search URL supplied by the user
///
/// # Normalization Steps
///
/// 1. Trim whitespace and parse; reject if malformed
/// 2. Accept only HTTP and HTTPS
/// 3. Require a host
/// 4. Remove fragment (everything after #)
///
/// # Examples
///
/// ```
/// use profile_harvest::url::normalize_search_url;
///
/// let url = normalize_search_url(" https://github.com/search?q=rust&type=users#top ").unwrap();
/// assert_eq!(url.as_str(), "https://github.com/search?q=rust&type=users");
/// ```
pub fn normalize_search_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    // Plain HTTP is accepted so mock servers can stand in for the site
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}
