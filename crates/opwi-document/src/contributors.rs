use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free set of authors (first appearance wins).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contributors(Vec<String>);

impl Contributors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an author. Returns `true` if it was not already present.
    pub fn insert(&mut self, author: &str) -> bool {
        if self.contains(author) {
            return false;
        }
        self.0.push(author.to_string());
        true
    }

    pub fn contains(&self, author: &str) -> bool {
        self.0.iter().any(|a| a == author)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl<'a> FromIterator<&'a str> for Contributors {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for author in iter {
            set.insert(author);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_kept() {
        let set: Contributors = ["bob", "alice", "bob", "carol", "alice"].into_iter().collect();
        assert_eq!(set.as_slice(), ["bob", "alice", "carol"]);
    }

    #[test]
    fn insert_reports_novelty() {
        let mut set = Contributors::new();
        assert!(set.insert("alice"));
        assert!(!set.insert("alice"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serializes_as_array() {
        let set: Contributors = ["alice", "bob"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["alice","bob"]"#);
    }
}
