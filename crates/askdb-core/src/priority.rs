//! Advisory priority set of databases.
//!
//! Priority never filters anything: it only decides which databases are
//! trained first and which are searched first when routing a question.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Database names the caller has flagged as higher interest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrioritySet(BTreeSet<String>);

impl PrioritySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the database was newly added.
    pub fn insert(&mut self, database: impl Into<String>) -> bool {
        self.0.insert(database.into())
    }

    /// Returns `true` if the database was present.
    pub fn remove(&mut self, database: &str) -> bool {
        self.0.remove(database)
    }

    /// Replace the whole set.
    pub fn replace<I, S>(&mut self, databases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0 = databases.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn contains(&self, database: &str) -> bool {
        self.0.contains(database)
    }

    /// Returns `true` if any of `databases` is a priority database.
    pub fn any_of<'a, I>(&self, databases: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        databases.into_iter().any(|db| self.contains(db))
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PrioritySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for PrioritySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove() {
        let mut set = PrioritySet::new();
        assert!(set.insert("shop"));
        assert!(!set.insert("shop"));
        assert!(set.contains("shop"));
        assert!(set.remove("shop"));
        assert!(set.is_empty());
    }

    #[test]
    fn replace_swaps_contents() {
        let mut set = PrioritySet::from_iter(["a", "b"]);
        set.replace(["c"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn any_of_checks_membership() {
        let set = PrioritySet::from_iter(["shop"]);
        let used = vec!["crm".to_string(), "shop".to_string()];
        assert!(set.any_of(&used));
        assert!(!set.any_of(&used[..1]));
    }

    #[test]
    fn serializes_as_plain_list() {
        let set = PrioritySet::from_iter(["b", "a"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b"]"#);
    }
}
