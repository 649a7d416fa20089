//! Reversed-label trie of public suffixes.
//!
//! A rule such as `co.uk` is stored top-down from its rightmost label:
//! root -> `uk` -> `co`. Rules sharing a top-level label share a path, so a
//! lookup walks a domain name from its TLD inward and stops at the first
//! label the trie does not know.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Most labels a rule may have. A DNS name is at most 253 characters,
/// which leaves room for 127 one-character labels.
pub const MAX_LABELS: usize = 127;

/// A trie node: label -> child node. A node without children is a leaf.
///
/// The root node stands for the empty suffix and never matches by itself.
/// Serializes as a nested JSON object (`{"uk":{"co":{}}}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuffixTrie {
    children: BTreeMap<String, SuffixTrie>,
}

/// Result of walking a name against the trie, as byte offsets into the name.
struct Walk {
    /// Start of the deepest matched suffix (`name.len()` if nothing matched)
    matched: usize,
    /// Start of the first label that had no child, if the walk stopped early
    unmatched: Option<usize>,
}

impl SuffixTrie {
    /// Create an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dot-separated suffix rule.
    ///
    /// Re-adding a known rule is a pure walk. Rules with an empty label
    /// (`""`, `a..b`, `.com`, `com.`) or with more than [`MAX_LABELS`]
    /// labels are ignored.
    pub fn add(&mut self, suffix: &str) {
        if suffix.split('.').any(str::is_empty) {
            debug!(suffix, "skipping suffix with an empty label");
            return;
        }
        if suffix.split('.').count() > MAX_LABELS {
            debug!(suffix, "skipping suffix with too many labels");
            return;
        }

        let mut node = self;
        for label in suffix.rsplit('.') {
            node = node.children.entry(label.to_owned()).or_default();
        }
    }

    /// Longest known suffix of `name` plus one more label.
    ///
    /// If the walk stops on a label the trie does not know, the result is that
    /// label followed by everything matched so far. If every label of `name`
    /// matches, `name` is returned as is, without an extra label.
    ///
    /// A single trailing root dot (`example.com.`) is ignored. The result is
    /// always a suffix of `name` with that dot removed:
    ///
    /// ```
    /// use tld_trie::SuffixTrie;
    ///
    /// let trie: SuffixTrie = ["uk", "co.uk"].into_iter().collect();
    /// assert_eq!(trie.lookup("foo.bar.co.uk"), "bar.co.uk");
    /// assert_eq!(trie.lookup("co.uk"), "co.uk");
    /// assert_eq!(trie.lookup("example.xyz"), "xyz");
    /// assert_eq!(trie.lookup("www.example.co.uk."), "example.co.uk");
    /// ```
    pub fn lookup<'a>(&self, name: &'a str) -> &'a str {
        let name = strip_root(name);
        let walk = self.walk(name);
        match walk.unmatched {
            Some(start) => &name[start..],
            None => &name[walk.matched..],
        }
    }

    /// Longest known suffix of `name`, without the extra label.
    ///
    /// Returns `None` if not even the last label of `name` is known. A
    /// trailing root dot is ignored, as in [`SuffixTrie::lookup`].
    pub fn public_suffix<'a>(&self, name: &'a str) -> Option<&'a str> {
        let name = strip_root(name);
        let walk = self.walk(name);
        if walk.matched == name.len() {
            None
        } else {
            Some(&name[walk.matched..])
        }
    }

    fn walk(&self, name: &str) -> Walk {
        let mut node = self;
        let mut end = name.len();
        let mut matched = name.len();

        for label in name.rsplit('.') {
            let start = end - label.len();
            match node.children.get(label) {
                Some(child) => {
                    node = child;
                    matched = start;
                    // Skip the separator in front of this label
                    end = start.saturating_sub(1);
                }
                None => {
                    return Walk {
                        matched,
                        unmatched: Some(start),
                    }
                }
            }
        }

        Walk {
            matched,
            unmatched: None,
        }
    }

    /// Check whether the reversed path of `suffix` exists in the trie.
    ///
    /// True for inserted rules and for their ancestors (`uk` once `co.uk`
    /// has been added).
    pub fn contains(&self, suffix: &str) -> bool {
        if suffix.is_empty() {
            return false;
        }
        let mut node = self;
        for label in suffix.rsplit('.') {
            match node.children.get(label) {
                Some(child) => node = child,
                None => return false,
            }
        }
        true
    }

    /// Child node for a single label
    pub fn get(&self, label: &str) -> Option<&SuffixTrie> {
        self.children.get(label)
    }

    /// Labels of the direct children, in sorted order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Check if this node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if the trie holds no rules
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below this one
    pub fn node_count(&self) -> usize {
        self.children
            .values()
            .map(|child| 1 + child.node_count())
            .sum()
    }

    /// Number of leaves below this one (0 for an empty trie)
    pub fn leaf_count(&self) -> usize {
        self.children
            .values()
            .map(|child| {
                if child.is_leaf() {
                    1
                } else {
                    child.leaf_count()
                }
            })
            .sum()
    }

    pub(crate) fn children(&self) -> &BTreeMap<String, SuffixTrie> {
        &self.children
    }
}

/// Drop one trailing root dot of a fully qualified name
fn strip_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

impl<S: AsRef<str>> Extend<S> for SuffixTrie {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for suffix in iter {
            self.add(suffix.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for SuffixTrie {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut trie = SuffixTrie::new();
        trie.extend(iter);
        trie
    }
}
