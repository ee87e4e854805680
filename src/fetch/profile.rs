use serde::{Deserialize, Serialize};

/// Payload of `GET /users/{login}`
///
/// Every field is optional; the API returns `null` for unset profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiUser {
    pub login: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub blog: Option<String>,
    pub bio: Option<String>,
    pub public_repos: Option<u64>,
    pub followers: Option<u64>,
}

/// A fetched public profile
///
/// `login` is the unique key. Text fields default to the empty string and
/// counters to 0 when the API leaves them out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub login: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub blog: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
}

impl ProfileRecord {
    /// Creates a record with only the login set
    pub fn with_login(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            ..Self::default()
        }
    }

    /// Normalizes an API payload
    ///
    /// `requested` is the username the profile was requested for; it fills in
    /// the login when the payload omits it.
    pub fn from_api(user: ApiUser, requested: &str) -> Self {
        Self {
            login: user
                .login
                .filter(|login| !login.is_empty())
                .unwrap_or_else(|| requested.to_string()),
            name: user.name.unwrap_or_default(),
            location: user.location.unwrap_or_default(),
            company: user.company.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
            blog: user.blog.unwrap_or_default(),
            bio: user.bio.unwrap_or_default(),
            public_repos: user.public_repos.unwrap_or(0),
            followers: user.followers.unwrap_or(0),
        }
    }
}
