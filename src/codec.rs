//! JSON form of a [`SuffixTrie`].
//!
//! Each node is an object mapping a label to its child object; a leaf is
//! `{}`. The rule set `{uk, co.uk, com}` encodes as
//! `{"com":{},"uk":{"co":{}}}`.

use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, TrieError};
use crate::trie::{SuffixTrie, MAX_LABELS};

/// Deepest object nesting `decode` accepts: the root plus one per label.
const MAX_DEPTH: usize = MAX_LABELS + 1;

/// Encode a trie as compact JSON bytes
pub fn encode(trie: &SuffixTrie) -> Result<Vec<u8>> {
    serde_json::to_vec(trie).map_err(encode_error)
}

/// Encode a trie as indented JSON bytes
pub fn encode_pretty(trie: &SuffixTrie) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(trie).map_err(encode_error)
}

/// Stream a trie as JSON into `writer`
pub fn encode_to_writer<W: Write>(writer: W, trie: &SuffixTrie, pretty: bool) -> Result<()> {
    let result = if pretty {
        serde_json::to_writer_pretty(writer, trie)
    } else {
        serde_json::to_writer(writer, trie)
    };
    result.map_err(encode_error)
}

/// Decode a trie from JSON bytes.
///
/// Fails with [`TrieError::MalformedInput`] unless the input is a nested
/// object of objects whose keys are non-empty and dot-free. Nesting may go
/// as deep as any trie built by [`SuffixTrie::add`], i.e. [`MAX_LABELS`]
/// levels below the root.
pub fn decode(bytes: &[u8]) -> Result<SuffixTrie> {
    check_depth(bytes)?;

    // serde_json's own limit stops short of MAX_DEPTH; check_depth bounds it
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let trie = SuffixTrie::deserialize(&mut de).map_err(decode_error)?;
    de.end().map_err(decode_error)?;

    validate_labels(&trie)?;
    Ok(trie)
}

/// Decode a trie from JSON read from `reader`
pub fn decode_from_reader<R: Read>(mut reader: R) -> Result<SuffixTrie> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes)
}

/// Load a trie from a JSON file
pub fn load_file(path: impl AsRef<Path>) -> Result<SuffixTrie> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    let trie = decode_from_reader(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        nodes = trie.node_count(),
        "loaded suffix trie"
    );
    Ok(trie)
}

/// Write a trie to a JSON file.
///
/// Writes to a temporary sibling first and renames it into place, so a
/// failed write never leaves a truncated file at `path`.
pub fn save_file(path: impl AsRef<Path>, trie: &SuffixTrie, pretty: bool) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = tmp_path_for(path);
    let file = fs::File::create(&tmp_path)?;
    let mut writer = BufWriter::new(file);

    let written = encode_to_writer(&mut writer, trie, pretty).and_then(|_| {
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    });
    drop(writer);

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path)?;
    debug!(path = %path.display(), "saved suffix trie");
    Ok(())
}

/// `<file name>.tmp` next to `path`, never `path` itself
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reject input nested deeper than `MAX_DEPTH` before parsing it
fn check_depth(bytes: &[u8]) -> Result<()> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &b in bytes {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(TrieError::syntax(format!(
                        "nesting deeper than {} labels",
                        MAX_LABELS
                    )));
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn decode_error(e: serde_json::Error) -> TrieError {
    if e.is_io() {
        TrieError::Io(e.into())
    } else {
        TrieError::syntax(e.to_string())
    }
}

fn encode_error(e: serde_json::Error) -> TrieError {
    if e.is_io() {
        TrieError::Io(e.into())
    } else {
        TrieError::Encode(e.to_string())
    }
}

fn validate_labels(node: &SuffixTrie) -> Result<()> {
    for (label, child) in node.children() {
        if label.is_empty() {
            return Err(TrieError::invalid_label("empty label"));
        }
        if label.contains('.') {
            return Err(TrieError::invalid_label(format!(
                "label {:?} contains a dot",
                label
            )));
        }
        validate_labels(child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedKind;

    fn sample_trie() -> SuffixTrie {
        ["com", "uk", "co.uk", "org.uk", "s3.amazonaws.com"]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_encode_shape() {
        let trie: SuffixTrie = ["com", "co.uk"].into_iter().collect();
        let bytes = encode(&trie).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"com":{},"uk":{"co":{}}}"#
        );
    }

    #[test]
    fn test_encode_empty() {
        let bytes = encode(&SuffixTrie::new()).unwrap();
        assert_eq!(bytes, b"{}");
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let trie = sample_trie();
        assert_eq!(decode(&encode(&trie).unwrap()).unwrap(), trie);
        assert_eq!(decode(&encode_pretty(&trie).unwrap()).unwrap(), trie);
    }

    #[test]
    fn test_encode_is_reproducible() {
        let a: SuffixTrie = ["uk", "com", "co.uk"].into_iter().collect();
        let b: SuffixTrie = ["co.uk", "uk", "com"].into_iter().collect();
        assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
    }

    #[test]
    fn test_decode_line_split_reference_output() {
        // Reference generator splits its compact output after commas
        let text = "{\"com\":{},\"jp\":{\"ac\":{},\n\"co\":{}},\"uk\":{\"co\":{}}}\n";
        let trie = decode(text.as_bytes()).unwrap();
        assert!(trie.contains("ac.jp"));
        assert!(trie.contains("co.jp"));
        assert!(trie.contains("co.uk"));
        assert_eq!(trie.lookup("www.example.co.jp"), "example.co.jp");
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let inputs: [&[u8]; 7] = [
            b"[]",
            b"\"com\"",
            b"42",
            b"null",
            b"{\"com\":[]}",
            b"{\"com\":{\"x\":1}}",
            b"{\"com\":null}",
        ];
        for input in inputs {
            let err = decode(input).unwrap_err();
            assert_eq!(
                err.malformed_kind(),
                Some(MalformedKind::Syntax),
                "input: {}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let err = decode(b"{\"com\":{}").unwrap_err();
        assert_eq!(err.malformed_kind(), Some(MalformedKind::Syntax));

        let err = decode(b"{} trailing").unwrap_err();
        assert_eq!(err.malformed_kind(), Some(MalformedKind::Syntax));

        let err = decode(b"").unwrap_err();
        assert_eq!(err.malformed_kind(), Some(MalformedKind::Syntax));
    }

    #[test]
    fn test_decode_rejects_dotted_label() {
        let err = decode(br#"{"uk":{"co.uk":{}}}"#).unwrap_err();
        assert_eq!(err.malformed_kind(), Some(MalformedKind::InvalidLabel));
        assert!(format!("{}", err).contains("co.uk"));
    }

    #[test]
    fn test_decode_rejects_empty_label() {
        let err = decode(br#"{"":{}}"#).unwrap_err();
        assert_eq!(err.malformed_kind(), Some(MalformedKind::InvalidLabel));
    }

    #[test]
    fn test_decode_from_reader() {
        let trie = sample_trie();
        let bytes = encode(&trie).unwrap();
        let decoded = decode_from_reader(&bytes[..]).unwrap();
        assert_eq!(decoded, trie);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join("tld_trie_test_codec");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("tldTrie.json");

        let trie = sample_trie();
        save_file(&path, &trie, false).unwrap();
        assert!(!tmp_path_for(&path).exists());
        assert_eq!(load_file(&path).unwrap(), trie);

        save_file(&path, &trie, true).unwrap();
        assert_eq!(load_file(&path).unwrap(), trie);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_round_trip_deepest_rule() {
        let deepest = vec!["a"; MAX_LABELS].join(".");
        let trie: SuffixTrie = [deepest.as_str(), "com"].into_iter().collect();

        let decoded = decode(&encode(&trie).unwrap()).unwrap();
        assert_eq!(decoded, trie);
        assert!(decoded.contains(&deepest));

        let decoded = decode(&encode_pretty(&trie).unwrap()).unwrap();
        assert_eq!(decoded, trie);
    }

    /// `depth` objects nested along a single `"a"` key
    fn nested(depth: usize) -> String {
        format!("{}{{}}{}", "{\"a\":".repeat(depth - 1), "}".repeat(depth - 1))
    }

    #[test]
    fn test_decode_rejects_too_deep() {
        let trie = decode(nested(MAX_DEPTH).as_bytes()).unwrap();
        assert_eq!(trie.node_count(), MAX_LABELS);

        let err = decode(nested(MAX_DEPTH + 1).as_bytes()).unwrap_err();
        assert_eq!(err.malformed_kind(), Some(MalformedKind::Syntax));

        let err = decode(nested(10_000).as_bytes()).unwrap_err();
        assert_eq!(err.malformed_kind(), Some(MalformedKind::Syntax));
    }

    #[test]
    fn test_depth_check_ignores_braces_in_labels() {
        let label = format!("{}\\\"[", "{".repeat(MAX_DEPTH * 2));
        let text = format!("{{\"{}\":{{}}}}", label);
        let trie = decode(text.as_bytes()).unwrap();
        assert_eq!(trie.node_count(), 1);
        assert!(trie.get(&format!("{}\"[", "{".repeat(MAX_DEPTH * 2))).is_some());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_encode_writer_error_is_io() {
        let trie = sample_trie();
        let err = encode_to_writer(FailingWriter, &trie, false).unwrap_err();
        assert!(matches!(err, TrieError::Io(_)), "got: {}", err);
        let err = encode_to_writer(FailingWriter, &trie, true).unwrap_err();
        assert!(matches!(err, TrieError::Io(_)), "got: {}", err);
    }

    #[test]
    fn test_tmp_path_never_equals_target() {
        let path = Path::new("/data/trie.tmp");
        assert_eq!(tmp_path_for(path), PathBuf::from("/data/trie.tmp.tmp"));
        assert_eq!(
            tmp_path_for(Path::new("tldTrie.json")),
            PathBuf::from("tldTrie.json.tmp")
        );
    }

    #[test]
    fn test_save_file_with_tmp_extension() {
        let dir = std::env::temp_dir().join("tld_trie_test_codec_tmp_ext");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("trie.tmp");

        let trie = sample_trie();
        save_file(&path, &trie, false).unwrap();
        assert!(!dir.join("trie.tmp.tmp").exists());
        assert_eq!(load_file(&path).unwrap(), trie);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("tld_trie_test_missing/none.json");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, TrieError::Io(_)));
    }
}
