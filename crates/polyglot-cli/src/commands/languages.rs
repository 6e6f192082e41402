//! Languages command - list registered readers and writers.

use polyglot_syntax::{readers, writers};
use std::collections::BTreeMap;

#[derive(Default)]
struct Support {
    read: bool,
    write: bool,
    extensions: Vec<&'static str>,
}

/// One row per language, sorted by name.
fn table() -> String {
    let mut languages: BTreeMap<&'static str, Support> = BTreeMap::new();
    for reader in readers() {
        let entry = languages.entry(reader.language()).or_default();
        entry.read = true;
        entry.extensions.extend(reader.extensions());
    }
    for writer in writers() {
        let entry = languages.entry(writer.language()).or_default();
        entry.write = true;
        if !entry.extensions.contains(&writer.extension()) {
            entry.extensions.push(writer.extension());
        }
    }

    let mark = |yes: bool| if yes { "yes" } else { "-" };
    let mut out = format!("{:<12} {:<6} {:<6} extensions\n", "language", "read", "write");
    for (name, support) in &languages {
        out.push_str(&format!(
            "{:<12} {:<6} {:<6} {}\n",
            name,
            mark(support.read),
            mark(support.write),
            support.extensions.join(", ")
        ));
    }
    out
}

/// Run the languages command
pub fn run() -> i32 {
    print!("{}", table());
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_language() {
        let table = table();
        assert!(table.starts_with("language"));
        assert!(table.contains("haskell      -      yes    hs"));
        assert!(table.contains("javascript   yes    yes    js, mjs"));
        assert_eq!(table.lines().count(), 6);
    }
}
