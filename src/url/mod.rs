//! URL handling module for Profile-Harvest
//!
//! This module derives the resumption key of a search (its base URL), builds
//! the URL of any result page, and recognizes profile links.

mod matcher;
mod normalize;

use url::Url;

// Re-export main functions
pub use matcher::{identifier_from_href, is_reserved_segment, RESERVED_SEGMENTS};
pub use normalize::normalize_search_url;

/// Query parameter carrying the result page number
pub const PAGE_PARAM: &str = "p";

/// Returns the search URL with the page-number parameter removed
///
/// The base URL identifies a search independently of the page being viewed,
/// which makes it the key under which crawl progress is resumed. All other
/// query parameters keep their order.
///
/// # Examples
///
/// ```
/// use profile_harvest::url::base_url;
/// use url::Url;
///
/// let url = Url::parse("https://github.com/search?q=rust&type=users&p=3").unwrap();
/// assert_eq!(base_url(&url).as_str(), "https://github.com/search?q=rust&type=users");
/// ```
pub fn base_url(url: &Url) -> Url {
    let mut base = url.clone();
    base.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        base.set_query(None);
    } else {
        base.query_pairs_mut().clear().extend_pairs(kept);
    }

    base
}

/// Builds the URL of result page `page` for a base URL
///
/// Page 1 is the base URL itself; later pages append the page parameter.
pub fn page_url(base: &Url, page: u32) -> Url {
    let mut url = base_url(base);
    if page > 1 {
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}

/// Reads the page number of a result page URL, defaulting to 1
pub fn page_number(url: &Url) -> u32 {
    url.query_pairs()
        .find(|(key, _)| key == PAGE_PARAM)
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}
