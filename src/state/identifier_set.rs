use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An insertion-ordered set of usernames
///
/// Usernames keep the order in which the search ranked them; a username seen
/// again on a later page is ignored. Serialized as a plain JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IdentifierSet {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a username, returning false if it was already present
    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        let identifier = identifier.into();
        if self.seen.contains(&identifier) {
            return false;
        }
        self.seen.insert(identifier.clone());
        self.ordered.push(identifier);
        true
    }

    /// Merges another set into this one, returning how many usernames were new
    pub fn merge(&mut self, other: &IdentifierSet) -> usize {
        other
            .iter()
            .filter(|identifier| self.insert(identifier.as_str()))
            .count()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.seen.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.ordered.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ordered.clone()
    }
}

impl From<Vec<String>> for IdentifierSet {
    fn from(identifiers: Vec<String>) -> Self {
        identifiers.into_iter().collect()
    }
}

impl From<IdentifierSet> for Vec<String> {
    fn from(set: IdentifierSet) -> Self {
        set.ordered
    }
}

impl<S: Into<String>> FromIterator<S> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = IdentifierSet::new();
        for identifier in iter {
            set.insert(identifier);
        }
        set
    }
}

impl PartialEq for IdentifierSet {
    fn eq(&self, other: &Self) -> bool {
        self.ordered == other.ordered
    }
}

impl Eq for IdentifierSet {}
