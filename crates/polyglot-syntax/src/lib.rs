//! Source-to-source translation between programming languages.
//!
//! `polyglot-syntax` parses source into one canonical AST and emits it in
//! another language. Declared types survive hops through languages that
//! cannot spell them, either as `__META__` comments or as a sidecar list
//! of records.
//!
//! # Architecture
//!
//! ```text
//! Source Languages         AST               Target Languages
//! ────────────────    ─────────────    ────────────────────
//! Python          ─┐                ┌─> Python
//! JavaScript      ─┤                ├─> JavaScript
//! TypeScript      ─┼─> Module ──────┼─> TypeScript
//! Java            ─┘   (ir.rs)      ├─> Java
//!                                   └─> Haskell
//! ```
//!
//! # Example
//!
//! ```ignore
//! use polyglot_syntax::{input, output};
//!
//! let ast = input::read_typescript("let x: number = 42;")?;
//! let py = output::PythonWriter::emit(&ast);
//! // => "x = 42 # __META__: {\"variableType\":\"number\"}"
//! ```
//!
//! # Metadata
//!
//! Functions and assignments are metadata consumers. Writers for untyped
//! languages attach a record to each consumer's first line; readers strip
//! those comments before parsing and re-attach the records in walk order.
//! See [`metadata`].

pub mod indent;
#[cfg(feature = "tree-sitter")]
pub mod input;
pub mod ir;
pub mod metadata;
pub mod output;
pub mod registry;
pub mod traits;
pub mod types;

// Re-exports: AST
pub use ir::{
    Assign, AstNode, BinaryOp, Call, ClassDef, CompareOp, Constant, Expr, FunctionDef, Literal,
    Module, Name, NameContext, Stmt, StructureEq,
};

// Re-exports: types and metadata
pub use metadata::{CodeWithMetadata, LanguageMetadata, MetadataQueue};
pub use types::{CanonicalType, TypeDefinition};

// Re-exports: Traits
pub use traits::{ReadError, Reader, Writer, sentinel};

// Re-exports: Registry
pub use registry::{
    reader_for_extension, reader_for_language, readers, register_reader, register_writer,
    writer_for_extension, writer_for_language, writers,
};

// Re-exports: Generator framework
pub use output::{Dialect, MetadataMode, generate, generate_with_metadata};

// Re-exports: Built-in readers
#[cfg(feature = "read-java")]
pub use input::{JavaReader, read_java};
#[cfg(feature = "read-javascript")]
pub use input::{JavaScriptReader, read_javascript};
#[cfg(feature = "read-python")]
pub use input::{PythonReader, read_python};
#[cfg(feature = "read-typescript")]
pub use input::{TypeScriptReader, read_typescript};

// Re-exports: Built-in writers
#[cfg(feature = "write-haskell")]
pub use output::HaskellWriter;
#[cfg(feature = "write-java")]
pub use output::JavaWriter;
#[cfg(feature = "write-javascript")]
pub use output::JavaScriptWriter;
#[cfg(feature = "write-python")]
pub use output::PythonWriter;
#[cfg(feature = "write-typescript")]
pub use output::TypeScriptWriter;
