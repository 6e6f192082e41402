//! Output writers - emit the AST as source code.
//!
//! Every writer is a [`Dialect`]: a set of lexical hooks (quoting,
//! terminators, built-in name and operator remapping) plus optional
//! statement overrides. The shared [`Emitter`] owns the dispatch
//! (module, statement, expression) and calls back into the dialect.
//! Defaults follow the brace family (`{ }` blocks, `;` terminators).

#[cfg(feature = "write-haskell")]
pub mod haskell;
mod hoist;
#[cfg(feature = "write-java")]
pub mod java;
#[cfg(feature = "write-javascript")]
pub mod javascript;
#[cfg(feature = "write-python")]
pub mod python;
#[cfg(feature = "write-typescript")]
pub mod typescript;

#[cfg(feature = "write-haskell")]
pub use haskell::{HASKELL_WRITER, HaskellWriter};
#[cfg(feature = "write-java")]
pub use java::{JAVA_WRITER, JavaWriter};
#[cfg(feature = "write-javascript")]
pub use javascript::{JAVASCRIPT_WRITER, JavaScriptWriter};
#[cfg(feature = "write-python")]
pub use python::{PYTHON_WRITER, PythonWriter};
#[cfg(feature = "write-typescript")]
pub use typescript::{TYPESCRIPT_WRITER, TypeScriptWriter};

use crate::ir::*;
use crate::metadata::{self, CodeWithMetadata, LanguageMetadata, comment};
use crate::types::CanonicalType;
use std::collections::HashSet;

/// How block bodies are delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    /// `{` ... `}` around the body.
    Braces,
    /// `:` then one indent unit per level.
    Indent,
}

/// Where metadata records go during emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataMode {
    /// Comments in the text, for dialects that embed metadata.
    Inline,
    /// No comments; records are returned separately.
    Sidecar,
}

/// Per-language rendering hooks.
pub trait Dialect: Sync {
    fn language(&self) -> &'static str;

    fn block_style(&self) -> BlockStyle {
        BlockStyle::Braces
    }

    fn indent_unit(&self) -> &'static str {
        "    "
    }

    fn statement_separator(&self) -> &'static str {
        "\n"
    }

    fn statement_terminator(&self) -> &'static str {
        ";"
    }

    fn comment_prefix(&self) -> &'static str {
        "//"
    }

    /// Whether inline mode writes metadata comments. Dialects that spell
    /// types natively return false.
    fn embeds_metadata(&self) -> bool {
        false
    }

    /// Filler for an empty indented block.
    fn empty_block(&self) -> Option<&'static str> {
        None
    }

    fn quote_string(&self, value: &str) -> String {
        quote(value, '\'')
    }

    /// Built-in name aliasing, e.g. canonical `print`.
    fn function_name<'n>(&self, name: &'n str) -> &'n str {
        name
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }

    fn none_literal(&self) -> &'static str {
        "null"
    }

    fn binary_op(&self, op: BinaryOp) -> &'static str {
        op.symbol()
    }

    fn compare_op(&self, op: CompareOp) -> &'static str {
        op.symbol()
    }

    fn format_number(&self, literal: &Literal) -> String {
        format_number(literal)
    }

    fn unknown_expr(&self, description: &str) -> String {
        format!(
            "/* unknown: {} */ {}",
            sanitize(description).replace("*/", "* /"),
            self.none_literal()
        )
    }

    fn unknown_stmt(&self, description: &str) -> String {
        format!("{} unknown: {}", self.comment_prefix(), sanitize(description))
    }

    /// Write an unsupported expression in place.
    fn write_unknown_expr(&self, e: &mut Emitter<'_>, description: &str) {
        e.push(&self.unknown_expr(description));
    }

    /// Keyword or type that introduces a new variable (`let`, `int`).
    fn declaration_keyword(&self, _assign: &Assign, in_class: bool) -> Option<String> {
        (!in_class).then(|| "let".to_string())
    }

    /// Type annotation written after a declared name.
    fn variable_annotation(&self, _assign: &Assign) -> Option<String> {
        None
    }

    /// Declaration without a value, written ahead of a statement whose
    /// branch first assigns the variable. `None` when the dialect needs no
    /// forward declaration.
    fn hoisted_declaration(&self, assign: &Assign) -> Option<String> {
        let keyword = self.declaration_keyword(assign, false)?;
        let mut out = format!("{keyword} {}", assign.target.id);
        if let Some(annotation) = self.variable_annotation(assign) {
            out.push_str(": ");
            out.push_str(&annotation);
        }
        out.push_str(self.statement_terminator());
        Some(out)
    }

    /// Text before a function body (`function f(a, b)`).
    fn function_header(&self, func: &FunctionDef, in_class: bool) -> String {
        let params = param_names(func).join(", ");
        if in_class {
            format!("{}({})", func.name, params)
        } else {
            format!("function {}({})", func.name, params)
        }
    }

    /// Text before a class body; `bases` are already rendered.
    fn class_header(&self, class: &ClassDef, bases: &[String]) -> String {
        match bases.first() {
            Some(base) => format!("class {} extends {}", class.name, base),
            None => format!("class {}", class.name),
        }
    }

    fn write_print(&self, e: &mut Emitter<'_>, value: &Expr) {
        e.push(self.function_name("print"));
        e.push("(");
        e.write_expr(value);
        e.push(")");
        e.push(self.statement_terminator());
    }

    fn write_assign(&self, e: &mut Emitter<'_>, assign: &Assign) {
        let name = &assign.target.id;
        let in_class = e.in_class();
        let declaring = in_class || e.declare(name);
        if declaring {
            if let Some(keyword) = self.declaration_keyword(assign, in_class) {
                e.push(&keyword);
                e.push(" ");
            }
        }
        e.push(name);
        if declaring {
            if let Some(annotation) = self.variable_annotation(assign) {
                e.push(": ");
                e.push(&annotation);
            }
        }
        e.push(" = ");
        e.write_expr(&assign.value);
        e.push(self.statement_terminator());
        e.metadata_comment(&LanguageMetadata::for_assign(assign));
    }

    fn write_function(&self, e: &mut Emitter<'_>, func: &FunctionDef) {
        let header = self.function_header(func, e.in_class());
        e.push(&header);
        let record = LanguageMetadata::for_function(func);
        e.with_scope(false, param_names(func), |e| {
            e.hoist(&func.body);
            e.write_block(&func.body, Some(&record));
        });
    }

    fn write_class(&self, e: &mut Emitter<'_>, class: &ClassDef) {
        let bases: Vec<String> = class.bases.iter().map(|b| e.render_expr(b)).collect();
        e.push(&self.class_header(class, &bases));
        e.with_scope(true, Vec::new(), |e| e.write_block(&class.body, None));
    }

    fn write_if(&self, e: &mut Emitter<'_>, test: &Expr, body: &[Stmt], orelse: &[Stmt]) {
        e.push("if (");
        e.write_expr(test);
        e.push(")");
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
                e.push(" else ");
                self.write_if(e, test, body, orelse);
            }
            _ => {
                e.push(" else");
                e.write_block(orelse, None);
            }
        }
    }

    fn write_return(&self, e: &mut Emitter<'_>, value: Option<&Expr>) {
        e.push("return");
        if let Some(value) = value {
            e.push(" ");
            e.write_expr(value);
        }
        e.push(self.statement_terminator());
    }

    fn write_call(&self, e: &mut Emitter<'_>, call: &Call) {
        match call.func.as_ref() {
            Expr::Name(name) => e.push(self.function_name(&name.id)),
            func => e.write_expr_prec(func, ATOM),
        }
        e.push("(");
        e.write_args(&call.args);
        e.push(")");
    }

    fn write_member(&self, e: &mut Emitter<'_>, object: &Expr, property: &str) {
        e.write_expr_prec(object, ATOM);
        e.push(".");
        e.push(property);
    }

    fn write_list(&self, e: &mut Emitter<'_>, elements: &[Expr], _element_type: CanonicalType) {
        e.push("[");
        e.write_args(elements);
        e.push("]");
    }

    fn write_tuple(&self, e: &mut Emitter<'_>, elements: &[Expr]) {
        e.push("[");
        e.write_args(elements);
        e.push("]");
    }
}

/// Precedence of atoms (names, calls, literals).
pub const ATOM: u8 = 10;

/// Shared dispatch over a [`Dialect`].
pub struct Emitter<'a> {
    dialect: &'a dyn Dialect,
    mode: MetadataMode,
    output: String,
    indent: usize,
    scopes: Vec<HashSet<String>>,
    in_class: bool,
    /// Forward declarations for the next body written.
    hoisted: Vec<String>,
    /// Comments owed to the end of the current line.
    notes: Vec<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(dialect: &'a dyn Dialect, mode: MetadataMode) -> Self {
        Self {
            dialect,
            mode,
            output: String::new(),
            indent: 0,
            scopes: vec![HashSet::new()],
            in_class: false,
            hoisted: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Render any node to text.
    pub fn emit(dialect: &'a dyn Dialect, node: &AstNode, mode: MetadataMode) -> String {
        let mut emitter = Self::new(dialect, mode);
        match node {
            AstNode::Module(module) => emitter.write_module(module),
            AstNode::Stmt(stmt) => emitter.write_stmt(stmt),
            AstNode::Expr(expr) => {
                emitter.write_expr(expr);
                emitter.flush_notes();
            }
        }
        emitter.output
    }

    pub fn emit_module(dialect: &'a dyn Dialect, module: &Module, mode: MetadataMode) -> String {
        let mut emitter = Self::new(dialect, mode);
        emitter.write_module(module);
        emitter.output
    }

    pub fn push(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn in_class(&self) -> bool {
        self.in_class
    }

    /// Record a variable in the current scope; true if it is new.
    pub fn declare(&mut self, name: &str) -> bool {
        match self.scopes.last_mut() {
            Some(scope) => scope.insert(name.to_string()),
            None => true,
        }
    }

    /// Declare the variables `body` first assigns inside a branch but
    /// mentions elsewhere. The declarations open the next body written.
    pub fn hoist(&mut self, body: &[Stmt]) {
        let dialect = self.dialect;
        for assign in hoist::hoisted(body) {
            let Some(line) = dialect.hoisted_declaration(assign) else {
                continue;
            };
            if self.declare(&assign.target.id) {
                self.hoisted.push(line);
            }
        }
    }

    /// Queue a comment for the end of the current line.
    pub fn note(&mut self, text: String) {
        self.notes.push(text);
    }

    fn flush_notes(&mut self) {
        for text in std::mem::take(&mut self.notes) {
            self.output.push_str("  ");
            self.output.push_str(&text);
        }
    }

    /// Run `f` inside a fresh variable scope.
    pub fn with_scope(&mut self, in_class: bool, names: Vec<String>, f: impl FnOnce(&mut Self)) {
        let outer_class = std::mem::replace(&mut self.in_class, in_class);
        self.scopes.push(names.into_iter().collect());
        f(self);
        self.scopes.pop();
        self.in_class = outer_class;
    }

    pub fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str(self.dialect.indent_unit());
        }
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
        self.write_indent();
    }

    /// Append a metadata comment when this emission embeds them.
    ///
    /// Pending line notes are written first; the metadata comment always
    /// ends the line.
    pub fn metadata_comment(&mut self, record: &LanguageMetadata) {
        self.flush_notes();
        if self.mode == MetadataMode::Inline && self.dialect.embeds_metadata() && !record.is_empty()
        {
            self.output.push(' ');
            let text = comment::encode(self.dialect.comment_prefix(), record);
            self.output.push_str(&text);
        }
    }

    pub fn write_module(&mut self, module: &Module) {
        self.hoist(&module.body);
        self.write_statements(&module.body, "");
    }

    /// Hoisted declarations then `body`, each on its own line.
    ///
    /// `lead` goes before the first line.
    fn write_statements(&mut self, body: &[Stmt], lead: &str) {
        let separator = self.dialect.statement_separator();
        let hoisted = std::mem::take(&mut self.hoisted);
        let mut first = true;
        for line in &hoisted {
            self.push(if first { lead } else { separator });
            first = false;
            self.write_indent();
            self.push(line);
        }
        for stmt in body {
            self.push(if first { lead } else { separator });
            first = false;
            self.write_indent();
            self.write_stmt(stmt);
        }
    }

    /// Write a block body after its header, one level deeper.
    ///
    /// `note` is a metadata record for the header line.
    pub fn write_block(&mut self, body: &[Stmt], note: Option<&LanguageMetadata>) {
        let style = self.dialect.block_style();
        match style {
            BlockStyle::Braces => self.push(" {"),
            BlockStyle::Indent => self.push(":"),
        }
        match note {
            Some(record) => self.metadata_comment(record),
            None => self.flush_notes(),
        }

        self.indent += 1;
        if body.is_empty() && self.hoisted.is_empty() {
            if let Some(filler) = self.dialect.empty_block() {
                self.newline();
                self.push(filler);
            }
        }
        self.write_statements(body, "\n");
        self.indent -= 1;

        if style == BlockStyle::Braces {
            self.newline();
            self.push("}");
        }
    }

    pub fn write_stmt(&mut self, stmt: &Stmt) {
        let dialect = self.dialect;
        match stmt {
            Stmt::ExprStatement(expr) => {
                self.write_expr(expr);
                self.push(dialect.statement_terminator());
            }
            Stmt::Print(value) => dialect.write_print(self, value),
            Stmt::FunctionDef(func) => dialect.write_function(self, func),
            Stmt::ClassDef(class) => dialect.write_class(self, class),
            Stmt::Assign(assign) => dialect.write_assign(self, assign),
            Stmt::CallStatement(call) => {
                dialect.write_call(self, call);
                self.push(dialect.statement_terminator());
            }
            Stmt::Return(value) => dialect.write_return(self, value.as_ref()),
            Stmt::If { test, body, orelse } => dialect.write_if(self, test, body, orelse),
            Stmt::Unknown { description } => {
                tracing::debug!(language = dialect.language(), %description, "emitting unknown statement");
                self.push(&dialect.unknown_stmt(description));
            }
        }
        self.flush_notes();
    }

    pub fn write_expr(&mut self, expr: &Expr) {
        self.write_expr_prec(expr, 0);
    }

    /// Write `expr`, parenthesized if it binds looser than `min`.
    pub fn write_expr_prec(&mut self, expr: &Expr, min: u8) {
        let dialect = self.dialect;
        let parens = expr.precedence() < min;
        if parens {
            self.push("(");
        }
        match expr {
            Expr::Call(call) => dialect.write_call(self, call),
            Expr::Name(name) => self.push(&name.id),
            Expr::Constant(constant) => {
                let text = self.literal(&constant.value);
                self.push(&text);
            }
            Expr::Member { object, property } => dialect.write_member(self, object, property),
            Expr::Binary { left, op, right } => {
                let prec = op.precedence();
                self.write_expr_prec(left, prec);
                self.push(" ");
                self.push(dialect.binary_op(*op));
                self.push(" ");
                self.write_expr_prec(right, prec + 1);
            }
            Expr::Compare { left, op, right } => {
                // Comparisons do not chain the same way everywhere.
                let prec = CompareOp::PRECEDENCE + 1;
                self.write_expr_prec(left, prec);
                self.push(" ");
                self.push(dialect.compare_op(*op));
                self.push(" ");
                self.write_expr_prec(right, prec);
            }
            Expr::List {
                elements,
                element_type,
                ..
            } => dialect.write_list(self, elements, *element_type),
            Expr::Tuple { elements, .. } => dialect.write_tuple(self, elements),
            Expr::Unknown { description } => {
                tracing::debug!(language = dialect.language(), %description, "emitting unknown expression");
                dialect.write_unknown_expr(self, description);
            }
        }
        if parens {
            self.push(")");
        }
    }

    /// Comma-separated expressions.
    pub fn write_args(&mut self, args: &[Expr]) {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.write_expr(arg);
        }
    }

    /// Render an expression into a standalone string.
    pub fn render_expr(&self, expr: &Expr) -> String {
        let mut sub = Emitter::new(self.dialect, self.mode);
        sub.write_expr(expr);
        sub.output
    }

    pub fn literal(&self, value: &Literal) -> String {
        match value {
            Literal::Str(s) => self.dialect.quote_string(s),
            Literal::Int(_) | Literal::Float(_) => self.dialect.format_number(value),
            Literal::Bool(b) => self.dialect.bool_literal(*b).to_string(),
            Literal::None => self.dialect.none_literal().to_string(),
        }
    }
}

/// Render a node for a dialect with inline metadata comments.
pub fn generate(dialect: &dyn Dialect, node: &AstNode) -> String {
    Emitter::emit(dialect, node, MetadataMode::Inline)
}

/// Render a module without comments, returning its records alongside.
pub fn generate_with_metadata(dialect: &dyn Dialect, module: &Module) -> CodeWithMetadata {
    CodeWithMetadata {
        code: Emitter::emit_module(dialect, module, MetadataMode::Sidecar),
        metadata: metadata::collect(module),
    }
}

/// Parameter names of a function, in order.
pub fn param_names(func: &FunctionDef) -> Vec<String> {
    func.args.iter().map(|arg| arg.id.clone()).collect()
}

/// Quote and escape a string literal.
pub fn quote(value: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(delimiter);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Integral floats render without a decimal point.
pub fn format_number(literal: &Literal) -> String {
    match literal {
        Literal::Int(n) => n.to_string(),
        Literal::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Literal::Float(f) => f.to_string(),
        _ => String::new(),
    }
}

/// `==`/`!=` become their strict forms.
pub fn strict_equality(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "===",
        CompareOp::NotEq => "!==",
        other => other.symbol(),
    }
}

/// Collapse a description onto one line.
pub fn sanitize(description: &str) -> String {
    description.split_whitespace().collect::<Vec<_>>().join(" ")
}
