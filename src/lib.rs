//! TLD Trie - public suffix trie for registrable-domain lookup
//!
//! This library provides:
//! - A reversed-label trie of public suffix rules
//! - Longest-suffix lookup (registrable domain = known suffix + one label)
//! - A nested JSON form for persisting the trie
//! - Filtering of public suffix list text into plain rules
//! - A frozen, cached index for concurrent lookups
//!
//! # Example
//!
//! ```rust
//! use tld_trie::{build_trie, codec, SuffixIndex, DEFAULT_CACHE_SIZE};
//!
//! let list = "
//! // ===BEGIN ICANN DOMAINS===
//! com
//! uk
//! co.uk
//! *.ck
//! !www.ck
//! ";
//!
//! // Build from list text
//! let trie = build_trie(list);
//! assert_eq!(trie.lookup("www.example.co.uk"), "example.co.uk");
//!
//! // Persist and reload
//! let json = codec::encode(&trie).unwrap();
//! assert_eq!(json, br#"{"com":{},"uk":{"co":{}}}"#);
//!
//! // Serve cached lookups
//! let index = SuffixIndex::from_json(&json, DEFAULT_CACHE_SIZE).unwrap();
//! assert_eq!(index.lookup("mail.example.com"), "example.com");
//! ```
//!
//! # Lookup Rules
//!
//! | Rules | Name | Result |
//! |-------|------|--------|
//! | `uk`, `co.uk` | `foo.bar.co.uk` | `bar.co.uk` |
//! | `uk`, `co.uk` | `example.uk` | `example.uk` |
//! | `uk`, `co.uk` | `co.uk` | `co.uk` |
//! | `com` | `example.xyz` | `xyz` |
//! | `com` | `localhost` | `localhost` |

pub mod codec;
pub mod error;
pub mod index;
pub mod source;
pub mod trie;

// Re-export commonly used items
pub use codec::{decode, encode, load_file, save_file};
pub use error::{MalformedKind, Result, TrieError};
pub use index::{SuffixIndex, DEFAULT_CACHE_SIZE};
pub use source::{build_trie, classify_line, read_rules, suffix_rules, FilterStats, LineKind};
pub use trie::{SuffixTrie, MAX_LABELS};

/// Default output file of the generator
pub const DEFAULT_OUTPUT: &str = "tldTrie.json";
