// src/models/frequency.rs

//! Subreddit frequency table.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

/// Subreddit name to number of distinct participants seen using it.
///
/// Iteration follows first discovery. Counts are never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one participant's subreddits.
    ///
    /// Duplicates inside `subreddits` collapse to a single contribution.
    pub fn add_contribution<I, S>(&mut self, subreddits: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        for name in subreddits {
            let name = name.as_ref();
            if seen.insert(name.to_string()) {
                self.increment(name);
            }
        }
    }

    fn increment(&mut self, name: &str) {
        match self.index.get(name) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), 1));
            }
        }
    }

    /// Count for a subreddit, 0 when never seen.
    pub fn get(&self, name: &str) -> usize {
        self.index
            .get(name)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Entries in first-discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Number of distinct subreddits.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl<S: AsRef<str>> FromIterator<Vec<S>> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = Vec<S>>>(contributions: T) -> Self {
        let mut table = Self::new();
        for subreddits in contributions {
            table.add_contribution(subreddits);
        }
        table
    }
}
