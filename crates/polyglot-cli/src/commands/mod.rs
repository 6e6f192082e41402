//! CLI command implementations - one module per command.

pub mod languages;
pub mod transpile;

/// Comma-separated language names, for diagnostics.
pub fn supported<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(", ")
}
