//! Public suffix list text -> plain suffix rules.
//!
//! Only plain rules are kept. Comments, wildcard (`*.`) and exception (`!`)
//! rules, blank lines and lines with non-ASCII characters are skipped.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::trie::SuffixTrie;

/// Classification of a single list line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A plain suffix rule, e.g. `co.uk`
    Rule(&'a str),
    /// Empty or whitespace only
    Blank,
    /// Starts with `/` (normally `//`)
    Comment,
    /// Starts with `*`
    Wildcard,
    /// Starts with `!`
    Exception,
    /// Contains a character outside 0x00..0x7F (DEL included)
    NonAscii,
}

/// Classify one line of a public suffix list.
///
/// The line is trimmed first. A rule ends at the first whitespace, so
/// anything after it on the same line is ignored.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();

    match line.as_bytes().first() {
        None => LineKind::Blank,
        Some(b'/') => LineKind::Comment,
        Some(b'*') => LineKind::Wildcard,
        Some(b'!') => LineKind::Exception,
        Some(_) if line.chars().any(|c| c as u32 >= 127) => LineKind::NonAscii,
        Some(_) => LineKind::Rule(line.split_whitespace().next().unwrap_or(line)),
    }
}

/// Per-kind counters for a filtering pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub rules: usize,
    pub blank: usize,
    pub comments: usize,
    pub wildcards: usize,
    pub exceptions: usize,
    pub non_ascii: usize,
}

impl FilterStats {
    fn record(&mut self, kind: &LineKind<'_>) {
        match kind {
            LineKind::Rule(_) => self.rules += 1,
            LineKind::Blank => self.blank += 1,
            LineKind::Comment => self.comments += 1,
            LineKind::Wildcard => self.wildcards += 1,
            LineKind::Exception => self.exceptions += 1,
            LineKind::NonAscii => self.non_ascii += 1,
        }
    }

    /// Number of lines that were not rules
    pub fn skipped(&self) -> usize {
        self.blank + self.comments + self.wildcards + self.exceptions + self.non_ascii
    }

    fn log(&self) {
        debug!(
            rules = self.rules,
            blank = self.blank,
            comments = self.comments,
            wildcards = self.wildcards,
            exceptions = self.exceptions,
            non_ascii = self.non_ascii,
            "filtered suffix list"
        );
    }
}

/// Plain suffix rules of `text`, in order
pub fn suffix_rules(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter_map(|line| match classify_line(line) {
        LineKind::Rule(rule) => Some(rule),
        _ => None,
    })
}

/// Read plain suffix rules from a buffered reader
pub fn read_rules<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let (rules, _) = read_rules_with_stats(reader)?;
    Ok(rules)
}

/// Read plain suffix rules from a buffered reader, counting skipped lines
pub fn read_rules_with_stats<R: BufRead>(reader: R) -> Result<(Vec<String>, FilterStats)> {
    let mut rules = Vec::new();
    let mut stats = FilterStats::default();

    for line in reader.lines() {
        let line = line?;
        let kind = classify_line(&line);
        stats.record(&kind);
        if let LineKind::Rule(rule) = kind {
            rules.push(rule.to_string());
        }
    }

    stats.log();
    Ok((rules, stats))
}

/// Read plain suffix rules from a list file
pub fn read_rules_from_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let file = fs::File::open(path.as_ref())?;
    read_rules(std::io::BufReader::new(file))
}

/// Build a trie from list text
pub fn build_trie(text: &str) -> SuffixTrie {
    suffix_rules(text).collect()
}
