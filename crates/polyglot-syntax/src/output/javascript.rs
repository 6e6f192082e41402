//! JavaScript writer.
//!
//! Uses the brace defaults from [`Dialect`]; declared types ride along as
//! `// __META__:` comments.

use super::{Dialect, Emitter, MetadataMode, generate_with_metadata, strict_equality};
use crate::ir::*;
use crate::metadata::CodeWithMetadata;
use crate::traits::Writer;

/// Static instance of the JavaScript writer for registry.
pub static JAVASCRIPT_WRITER: JavaScriptWriter = JavaScriptWriter;

/// Emits the AST as JavaScript source code.
pub struct JavaScriptWriter;

impl JavaScriptWriter {
    /// Emit a module to JavaScript source.
    pub fn emit(module: &Module) -> String {
        Emitter::emit_module(&JavaScriptWriter, module, MetadataMode::Inline)
    }
}

impl Writer for JavaScriptWriter {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn extension(&self) -> &'static str {
        "js"
    }

    fn write(&self, module: &Module) -> String {
        Self::emit(module)
    }

    fn write_with_metadata(&self, module: &Module) -> CodeWithMetadata {
        generate_with_metadata(self, module)
    }
}

impl Dialect for JavaScriptWriter {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn embeds_metadata(&self) -> bool {
        true
    }

    fn function_name<'n>(&self, name: &'n str) -> &'n str {
        match name {
            "print" => "console.log",
            other => other,
        }
    }

    fn compare_op(&self, op: CompareOp) -> &'static str {
        strict_equality(op)
    }
}
