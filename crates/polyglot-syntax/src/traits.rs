//! Traits for language readers and writers.

use crate::ir::Module;
use crate::metadata::{CodeWithMetadata, LanguageMetadata};

/// Error that can occur when reading source code into the AST.
///
/// Unsupported constructs and malformed metadata are not errors: they
/// degrade to `Unknown` nodes and absent records respectively.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("parse error: {0}")]
    Parse(String),

    #[cfg(feature = "tree-sitter")]
    #[error("failed to load {language} grammar")]
    Grammar {
        language: &'static str,
        #[source]
        source: tree_sitter::LanguageError,
    },

    #[error("parse error: sentinel input for {language}")]
    Sentinel { language: &'static str },
}

/// Text that makes every reader fail, for exercising error paths.
pub fn sentinel(language: &str) -> String {
    format!("trigger_error_{}", language.to_ascii_lowercase())
}

/// A reader parses source code into the canonical AST.
pub trait Reader: Send + Sync {
    /// Language identifier (e.g., "python", "typescript").
    fn language(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["js", "mjs"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Parse source, recovering types from inline metadata comments.
    fn read(&self, source: &str) -> Result<Module, ReadError>;

    /// Parse source, recovering types from a sidecar record list.
    ///
    /// Metadata comments in `source` are left to the grammar.
    fn read_with_metadata(
        &self,
        source: &str,
        metadata: Vec<LanguageMetadata>,
    ) -> Result<Module, ReadError>;
}

/// A writer emits the AST as source code in a target language.
pub trait Writer: Send + Sync {
    /// Language identifier (e.g., "javascript", "haskell").
    fn language(&self) -> &'static str;

    /// File extension for output (e.g., "js").
    fn extension(&self) -> &'static str;

    /// Emit source, embedding metadata comments where types cannot be
    /// spelled.
    fn write(&self, module: &Module) -> String;

    /// Emit comment-free source plus the ordered metadata records.
    fn write_with_metadata(&self, module: &Module) -> CodeWithMetadata;
}
