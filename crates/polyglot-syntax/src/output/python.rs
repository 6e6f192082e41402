//! Python writer.
//!
//! Indentation-delimited blocks, no terminators. Python has annotation
//! syntax, but declared types travel as `# __META__:` comments so the
//! emitted code stays plain.

use super::{BlockStyle, Dialect, Emitter, MetadataMode, generate_with_metadata, param_names};
use crate::ir::*;
use crate::metadata::CodeWithMetadata;
use crate::traits::Writer;

/// Static instance of the Python writer for registry.
pub static PYTHON_WRITER: PythonWriter = PythonWriter;

/// Emits the AST as Python source code.
pub struct PythonWriter;

impl PythonWriter {
    /// Emit a module to Python source.
    pub fn emit(module: &Module) -> String {
        Emitter::emit_module(&PythonWriter, module, MetadataMode::Inline)
    }
}

impl Writer for PythonWriter {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extension(&self) -> &'static str {
        "py"
    }

    fn write(&self, module: &Module) -> String {
        Self::emit(module)
    }

    fn write_with_metadata(&self, module: &Module) -> CodeWithMetadata {
        generate_with_metadata(self, module)
    }
}

impl Dialect for PythonWriter {
    fn language(&self) -> &'static str {
        "python"
    }

    fn block_style(&self) -> BlockStyle {
        BlockStyle::Indent
    }

    fn statement_terminator(&self) -> &'static str {
        ""
    }

    fn comment_prefix(&self) -> &'static str {
        "#"
    }

    fn embeds_metadata(&self) -> bool {
        true
    }

    fn empty_block(&self) -> Option<&'static str> {
        Some("pass")
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "True" } else { "False" }
    }

    fn none_literal(&self) -> &'static str {
        "None"
    }

    fn binary_op(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            other => other.symbol(),
        }
    }

    fn unknown_expr(&self, _description: &str) -> String {
        "None".to_string()
    }

    /// No inline comments in Python: the description ends the line.
    fn write_unknown_expr(&self, e: &mut Emitter<'_>, description: &str) {
        e.push(&self.unknown_expr(description));
        e.note(format!("# unknown: {}", super::sanitize(description)));
    }

    fn unknown_stmt(&self, description: &str) -> String {
        // `pass` keeps an otherwise empty block valid.
        format!("pass  # unknown: {}", super::sanitize(description))
    }

    fn declaration_keyword(&self, _assign: &Assign, _in_class: bool) -> Option<String> {
        None
    }

    fn function_header(&self, func: &FunctionDef, in_class: bool) -> String {
        let mut params = param_names(func);
        if in_class {
            params.insert(0, "self".to_string());
        }
        format!("def {}({})", func.name, params.join(", "))
    }

    fn class_header(&self, class: &ClassDef, bases: &[String]) -> String {
        if bases.is_empty() {
            format!("class {}", class.name)
        } else {
            format!("class {}({})", class.name, bases.join(", "))
        }
    }

    fn write_if(&self, e: &mut Emitter<'_>, test: &Expr, body: &[Stmt], orelse: &[Stmt]) {
        e.push("if ");
        e.write_expr(test);
        e.write_block(body, None);
        match orelse {
            [] => {}
            [
                Stmt::If {
                    test,
                    body,
                    orelse,
                },
            ] => {
                e.newline();
                e.push("el");
                self.write_if(e, test, body, orelse);
            }
            _ => {
                e.newline();
                e.push("else");
                e.write_block(orelse, None);
            }
        }
    }

    fn write_tuple(&self, e: &mut Emitter<'_>, elements: &[Expr]) {
        e.push("(");
        e.write_args(elements);
        if elements.len() == 1 {
            e.push(",");
        }
        e.push(")");
    }
}
