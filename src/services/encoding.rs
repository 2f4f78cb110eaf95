use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::inference::{ArticleIndex, UserIndex};
use crate::models::{ArticleId, Rating};

/// Bijection between identifiers and dense indices, in first-seen order
#[derive(Debug, Clone)]
pub struct Encoder<K> {
    forward: HashMap<K, usize>,
    backward: Vec<K>,
}

impl<K> Default for Encoder<K> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            backward: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Encoder<K> {
    /// Returns the index of `key`, assigning the next one if unseen
    pub fn insert(&mut self, key: K) -> usize {
        if let Some(&index) = self.forward.get(&key) {
            return index;
        }
        let index = self.backward.len();
        self.forward.insert(key.clone(), index);
        self.backward.push(key);
        index
    }

    pub fn encode(&self, key: &K) -> Option<usize> {
        self.forward.get(key).copied()
    }

    pub fn decode(&self, index: usize) -> Option<&K> {
        self.backward.get(index)
    }

    pub fn len(&self) -> usize {
        self.backward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backward.is_empty()
    }

    /// Keys in index order
    pub fn keys(&self) -> &[K] {
        &self.backward
    }
}

/// Per-call user and article encodings for the collaborative model
///
/// Built from ratings whose user and article both currently exist. Nothing
/// is persisted, so indices only match training time when the set of
/// observed identities is unchanged.
#[derive(Debug, Clone, Default)]
pub struct EncodingTable {
    pub users: Encoder<String>,
    pub articles: Encoder<ArticleId>,
}

impl EncodingTable {
    pub fn build(
        ratings: &[Rating],
        known_users: &HashSet<String>,
        known_articles: &HashSet<ArticleId>,
    ) -> Self {
        let mut table = Self::default();
        for rating in ratings {
            if !known_users.contains(&rating.user_id) || !known_articles.contains(&rating.article_id)
            {
                continue;
            }
            table.users.insert(rating.user_id.clone());
            table.articles.insert(rating.article_id);
        }
        table
    }

    pub fn user(&self, user_id: &str) -> Option<UserIndex> {
        self.users.encode(&user_id.to_string()).map(UserIndex)
    }

    pub fn article(&self, article_id: ArticleId) -> Option<ArticleIndex> {
        self.articles.encode(&article_id).map(ArticleIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_is_bijective() {
        let mut encoder = Encoder::default();
        assert_eq!(encoder.insert("b"), 0);
        assert_eq!(encoder.insert("a"), 1);
        assert_eq!(encoder.insert("b"), 0);

        assert_eq!(encoder.len(), 2);
        assert_eq!(encoder.encode(&"a"), Some(1));
        assert_eq!(encoder.decode(0), Some(&"b"));
        assert_eq!(encoder.decode(2), None);
    }

    #[test]
    fn test_table_only_encodes_existing_identities() {
        let ratings = vec![
            Rating::new("u-2", 30, 4),
            Rating::new("u-1", 10, 5),
            Rating::new("ghost", 10, 1),
            Rating::new("u-1", 999, 3),
        ];
        let users: HashSet<String> = ["u-1", "u-2"].iter().map(|s| s.to_string()).collect();
        let articles: HashSet<ArticleId> = [ArticleId(10), ArticleId(30)].into_iter().collect();

        let table = EncodingTable::build(&ratings, &users, &articles);

        assert_eq!(table.user("u-2"), Some(UserIndex(0)));
        assert_eq!(table.user("u-1"), Some(UserIndex(1)));
        assert_eq!(table.user("ghost"), None);
        assert_eq!(table.article(ArticleId(30)), Some(ArticleIndex(0)));
        assert_eq!(table.article(ArticleId(10)), Some(ArticleIndex(1)));
        assert_eq!(table.article(ArticleId(999)), None);
    }
}
