//! Haskell writer (output only).
//!
//! Haskell has no statements, so each function body collapses into one
//! expression: the first statement decides the shape, assignments become
//! `let ... in` around the rest.

use super::{Dialect, Emitter, MetadataMode, generate_with_metadata, quote};
use crate::ir::*;
use crate::metadata::{CodeWithMetadata, LanguageMetadata};
use crate::traits::Writer;

/// Static instance of the Haskell writer for registry.
pub static HASKELL_WRITER: HaskellWriter = HaskellWriter;

/// Emits the AST as Haskell source code.
pub struct HaskellWriter;

impl HaskellWriter {
    /// Emit a module to Haskell source.
    pub fn emit(module: &Module) -> String {
        Emitter::emit_module(&HaskellWriter, module, MetadataMode::Inline)
    }

    /// Whether an argument needs parentheses under juxtaposition.
    fn needs_parens(expr: &Expr) -> bool {
        match expr {
            Expr::Call(call) => !call.args.is_empty(),
            other => other.precedence() < super::ATOM,
        }
    }

    fn write_arg(&self, e: &mut Emitter<'_>, arg: &Expr) {
        if Self::needs_parens(arg) {
            e.push("(");
            e.write_expr(arg);
            e.push(")");
        } else {
            e.write_expr(arg);
        }
    }

    /// Render a statement list as a single expression.
    fn write_body(&self, e: &mut Emitter<'_>, body: &[Stmt]) {
        let Some((first, rest)) = body.split_first() else {
            e.push("undefined");
            return;
        };
        match first {
            Stmt::Return(Some(value)) | Stmt::ExprStatement(value) => e.write_expr(value),
            Stmt::Return(None) => e.push("return ()"),
            Stmt::Print(value) => self.write_print(e, value),
            Stmt::CallStatement(call) => self.write_call(e, call),
            Stmt::If { test, body, orelse } => self.write_if(e, test, body, orelse),
            Stmt::Assign(assign) => {
                e.push("let ");
                e.push(&assign.target.id);
                e.push(" = ");
                e.write_expr(&assign.value);
                e.push(" in ");
                if rest.is_empty() {
                    e.push(&assign.target.id);
                } else {
                    self.write_body(e, rest);
                }
            }
            Stmt::FunctionDef(_) | Stmt::ClassDef(_) | Stmt::Unknown { .. } => {
                e.push("undefined");
            }
        }
    }
}

impl Writer for HaskellWriter {
    fn language(&self) -> &'static str {
        "haskell"
    }

    fn extension(&self) -> &'static str {
        "hs"
    }

    fn write(&self, module: &Module) -> String {
        Self::emit(module)
    }

    fn write_with_metadata(&self, module: &Module) -> CodeWithMetadata {
        generate_with_metadata(self, module)
    }
}

impl Dialect for HaskellWriter {
    fn language(&self) -> &'static str {
        "haskell"
    }

    fn statement_terminator(&self) -> &'static str {
        ""
    }

    fn comment_prefix(&self) -> &'static str {
        "--"
    }

    fn embeds_metadata(&self) -> bool {
        true
    }

    fn quote_string(&self, value: &str) -> String {
        quote(value, '"')
    }

    fn function_name<'n>(&self, name: &'n str) -> &'n str {
        match name {
            "print" => "putStrLn",
            other => other,
        }
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "True" } else { "False" }
    }

    fn none_literal(&self) -> &'static str {
        "()"
    }

    fn binary_op(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::Mod => "`mod`",
            other => other.symbol(),
        }
    }

    fn compare_op(&self, op: CompareOp) -> &'static str {
        match op {
            CompareOp::NotEq => "/=",
            other => other.symbol(),
        }
    }

    fn hoisted_declaration(&self, _assign: &Assign) -> Option<String> {
        None
    }

    fn unknown_expr(&self, description: &str) -> String {
        format!(
            "undefined {{- unknown: {} -}}",
            super::sanitize(description).replace("-}", "- }")
        )
    }

    fn write_print(&self, e: &mut Emitter<'_>, value: &Expr) {
        e.push(self.function_name("print"));
        e.push(" ");
        self.write_arg(e, value);
    }

    fn write_assign(&self, e: &mut Emitter<'_>, assign: &Assign) {
        if !e.in_class() {
            e.push("let ");
        }
        e.push(&assign.target.id);
        e.push(" = ");
        e.write_expr(&assign.value);
        e.metadata_comment(&LanguageMetadata::for_assign(assign));
    }

    fn write_function(&self, e: &mut Emitter<'_>, func: &FunctionDef) {
        e.push(&func.name);
        for arg in &func.args {
            e.push(" ");
            e.push(&arg.id);
        }
        e.push(" = ");
        self.write_body(e, &func.body);
        e.metadata_comment(&LanguageMetadata::for_function(func));
    }

    fn write_class(&self, e: &mut Emitter<'_>, class: &ClassDef) {
        e.push(&format!("data {} = {}", class.name, class.name));
        e.with_scope(true, Vec::new(), |e| {
            for stmt in &class.body {
                e.newline();
                e.write_stmt(stmt);
            }
        });
    }

    fn write_if(&self, e: &mut Emitter<'_>, test: &Expr, body: &[Stmt], orelse: &[Stmt]) {
        e.push("if ");
        e.write_expr(test);
        e.push(" then ");
        self.write_body(e, body);
        e.push(" else ");
        if orelse.is_empty() {
            e.push("return ()");
        } else {
            self.write_body(e, orelse);
        }
    }

    fn write_call(&self, e: &mut Emitter<'_>, call: &Call) {
        match call.func.as_ref() {
            Expr::Name(name) => e.push(self.function_name(&name.id)),
            func => self.write_arg(e, func),
        }
        for arg in &call.args {
            e.push(" ");
            self.write_arg(e, arg);
        }
    }

    fn write_member(&self, e: &mut Emitter<'_>, object: &Expr, property: &str) {
        e.write_expr_prec(object, super::ATOM);
        e.push("_");
        e.push(property);
    }

    fn write_tuple(&self, e: &mut Emitter<'_>, elements: &[Expr]) {
        e.push("(");
        e.write_args(elements);
        e.push(")");
    }
}
