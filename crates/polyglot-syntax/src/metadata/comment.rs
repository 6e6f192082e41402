//! Inline comment codec for metadata records.
//!
//! A record travels as a line-terminal comment:
//!
//! ```text
//! def greet(name): # __META__: {"paramTypes":{"name":"string"},"returnType":"void"}
//! ```
//!
//! [`scan`] strips these comments before the text reaches a grammar and
//! returns the decoded records keyed by line.

use super::LanguageMetadata;

/// Fixed marker that follows the comment prefix.
pub const MARKER: &str = "__META__:";

/// Render a record as a comment body, e.g. `# __META__: {...}`.
pub fn encode(comment_prefix: &str, record: &LanguageMetadata) -> String {
    format!("{comment_prefix} {MARKER} {}", record.to_json())
}

/// Split a line into its code and metadata comment.
///
/// Returns `None` when the line carries no metadata comment. A comment
/// whose payload is not a valid record yields `Some((code, None))`.
pub fn decode_line<'a>(
    line: &'a str,
    comment_prefix: &str,
) -> Option<(&'a str, Option<LanguageMetadata>)> {
    let needle = format!("{comment_prefix} {MARKER}");
    let start = line.rfind(&needle)?;
    let payload = line[start + needle.len()..].trim();
    // Anything not shaped like an object is code that merely contains the
    // marker, e.g. inside a string literal.
    if !(payload.starts_with('{') && payload.ends_with('}')) {
        return None;
    }

    let record = match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(value) => LanguageMetadata::from_value(&value),
        Err(err) => {
            tracing::debug!(%err, payload, "malformed metadata comment");
            None
        }
    };
    Some((line[..start].trim_end(), record))
}

/// Source with metadata comments removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scanned {
    /// Cleaned text; line count and order are unchanged.
    pub code: String,
    /// Decoded records with their zero-based line numbers.
    pub records: Vec<(usize, LanguageMetadata)>,
}

/// Strip every metadata comment from `source`.
pub fn scan(source: &str, comment_prefix: &str) -> Scanned {
    let mut code = String::with_capacity(source.len());
    let mut records = Vec::new();

    for (row, line) in source.split('\n').enumerate() {
        if row > 0 {
            code.push('\n');
        }
        match decode_line(line, comment_prefix) {
            Some((kept, record)) => {
                code.push_str(kept);
                if let Some(record) = record {
                    records.push((row, record));
                }
            }
            None => code.push_str(line),
        }
    }

    Scanned { code, records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CanonicalType;
    use indoc::indoc;

    fn void_record() -> LanguageMetadata {
        LanguageMetadata {
            return_type: Some(CanonicalType::Void),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode() {
        assert_eq!(
            encode("//", &void_record()),
            r#"// __META__: {"returnType":"void"}"#
        );
    }

    #[test]
    fn test_decode_line() {
        let (code, record) =
            decode_line(r#"function f() { // __META__: {"returnType":"void"}"#, "//").unwrap();
        assert_eq!(code, "function f() {");
        assert_eq!(record, Some(void_record()));
        assert!(decode_line("let x = 1;", "//").is_none());
    }

    #[test]
    fn test_malformed_payload_is_absent() {
        let (code, record) = decode_line("x = 1  # __META__: {not json}", "#").unwrap();
        assert_eq!(code, "x = 1");
        assert!(record.is_none());
    }

    #[test]
    fn test_marker_inside_string_is_code() {
        let line = "print('# __META__: {}x')";
        assert!(decode_line(line, "#").is_none());
    }

    #[test]
    fn test_scan_keeps_line_numbers() {
        let source = indoc! {r#"
            def greet(name):  # __META__: {"paramTypes":{"name":"string"}}
                print(name)
            x = 42  # __META__: {"variableType":"number"}
        "#};
        let scanned = scan(source, "#");
        assert_eq!(
            scanned.code,
            "def greet(name):\n    print(name)\nx = 42\n"
        );
        let rows: Vec<usize> = scanned.records.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![0, 2]);
        assert_eq!(
            scanned.records[0].1.param_types["name"],
            CanonicalType::String
        );
    }
}
