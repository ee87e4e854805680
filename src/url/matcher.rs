/// Top-level site routes that look like profile links but are not users
pub const RESERVED_SEGMENTS: &[&str] = &[
    "search",
    "explore",
    "orgs",
    "settings",
    "notifications",
    "marketplace",
    "login",
    "logout",
    "signup",
    "join",
    "features",
    "pricing",
    "topics",
    "trending",
    "collections",
    "sponsors",
    "about",
    "contact",
    "site",
    "security",
    "enterprise",
    "team",
    "customer-stories",
    "readme",
    "pulls",
    "issues",
    "codespaces",
    "new",
    "organizations",
    "dashboard",
    "copilot",
    "resources",
    "solutions",
    "partners",
    "customers",
    "education",
    "mobile",
    "apps",
    "models",
    "advisories",
    "discussions",
    "stars",
    "watching",
    "account",
    "sessions",
    "password_reset",
    "premium-support",
    "open-source",
    "why-github",
    "events",
    "home",
    "users",
];

/// Checks whether a path segment is a reserved site route
///
/// Comparison is case-insensitive, matching how the site routes paths.
pub fn is_reserved_segment(segment: &str) -> bool {
    RESERVED_SEGMENTS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(segment))
}

/// Extracts a user identifier from a link target
///
/// Only root-relative links made of exactly one path segment, with no query
/// string or fragment, are profile links. Reserved routes are rejected.
///
/// # Examples
///
/// ```
/// use profile_harvest::url::identifier_from_href;
///
/// assert_eq!(identifier_from_href("/octocat"), Some("octocat".to_string()));
/// assert_eq!(identifier_from_href("/octocat/repo"), None);
/// assert_eq!(identifier_from_href("/search"), None);
/// assert_eq!(identifier_from_href("/octocat?tab=repositories"), None);
/// ```
pub fn identifier_from_href(href: &str) -> Option<String> {
    let segment = href.trim().strip_prefix('/')?;

    if segment.is_empty()
        || segment.contains('/')
        || segment.contains('?')
        || segment.contains('#')
        || segment.chars().any(char::is_whitespace)
    {
        return None;
    }

    if is_reserved_segment(segment) {
        return None;
    }

    Some(segment.to_string())
}
