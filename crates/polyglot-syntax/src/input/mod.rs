//! Input readers - parse source code into the AST.
//!
//! Every reader runs the same pipeline: reject the sentinel text, strip
//! metadata comments (or take a sidecar), parse with tree-sitter, walk the
//! tree, then inject the recovered metadata.

#[cfg(any(feature = "read-javascript", feature = "read-typescript"))]
mod ecma;
#[cfg(feature = "read-java")]
pub mod java;
#[cfg(feature = "read-javascript")]
pub mod javascript;
#[cfg(feature = "read-python")]
pub mod python;
#[cfg(feature = "read-typescript")]
pub mod typescript;

#[cfg(feature = "read-java")]
pub use java::{JAVA_READER, JavaReader, read_java};
#[cfg(feature = "read-javascript")]
pub use javascript::{JAVASCRIPT_READER, JavaScriptReader, read_javascript};
#[cfg(feature = "read-python")]
pub use python::{PYTHON_READER, PythonReader, read_python};
#[cfg(feature = "read-typescript")]
pub use typescript::{TYPESCRIPT_READER, TypeScriptReader, read_typescript};

use crate::ir::*;
use crate::metadata::{self, LanguageMetadata, MetadataQueue, comment};
use crate::traits::{ReadError, sentinel};
use std::cell::RefCell;
use tree_sitter::{Node, Parser};

/// Longest source excerpt kept in an `Unknown` description.
const EXCERPT_LEN: usize = 60;

/// Static description of one tree-sitter front end.
pub(crate) struct Grammar {
    pub language: &'static str,
    pub comment_prefix: &'static str,
    pub load: fn() -> tree_sitter::Language,
    /// Rewrites the text before parsing; must keep line numbers.
    pub prepare: Option<fn(&str) -> String>,
}

/// Where metadata records come from for one read.
pub(crate) enum MetadataSource {
    Comments,
    Sidecar(Vec<LanguageMetadata>),
}

/// Run the full read pipeline for `grammar`.
pub(crate) fn read_source<F>(
    grammar: &Grammar,
    source: &str,
    metadata_source: MetadataSource,
    build: F,
) -> Result<Module, ReadError>
where
    F: FnOnce(&ReadContext<'_>, Node<'_>) -> Result<Vec<Stmt>, ReadError>,
{
    if source.trim() == sentinel(grammar.language) {
        return Err(ReadError::Sentinel {
            language: grammar.language,
        });
    }

    let (code, records) = match &metadata_source {
        MetadataSource::Comments => {
            let scanned = comment::scan(source, grammar.comment_prefix);
            (scanned.code, scanned.records)
        }
        MetadataSource::Sidecar(_) => (source.to_string(), Vec::new()),
    };
    let code = match grammar.prepare {
        Some(prepare) => prepare(&code),
        None => code,
    };

    let mut parser = Parser::new();
    parser
        .set_language(&(grammar.load)())
        .map_err(|source| ReadError::Grammar {
            language: grammar.language,
            source,
        })?;
    let tree = parser
        .parse(&code, None)
        .ok_or_else(|| ReadError::Parse(format!("{} parser returned no tree", grammar.language)))?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(ReadError::Parse(format!(
            "syntax error in {} source",
            grammar.language
        )));
    }

    let ctx = ReadContext::new(&code, grammar.language);
    let body = build(&ctx, root)?;
    let rows = ctx.consumer_rows.into_inner();
    tracing::debug!(
        language = grammar.language,
        statements = body.len(),
        consumers = rows.len(),
        "read source"
    );

    let mut queue = match metadata_source {
        MetadataSource::Comments => MetadataQueue::aligned(records, &rows),
        MetadataSource::Sidecar(records) => MetadataQueue::from(records),
    };
    Ok(metadata::inject(Module::new(body), &mut queue))
}

/// Per-read state shared by the tree walkers.
pub(crate) struct ReadContext<'a> {
    source: &'a str,
    language: &'static str,
    /// First row of each metadata consumer, in walk order.
    consumer_rows: RefCell<Vec<usize>>,
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str, language: &'static str) -> Self {
        Self {
            source,
            language,
            consumer_rows: RefCell::new(Vec::new()),
        }
    }

    pub fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Note that `node` becomes a function or assignment in the AST.
    ///
    /// Must be called in the order the injection walk visits consumers:
    /// a function before anything in its body.
    pub fn consumer(&self, node: Node) {
        self.consumer_rows
            .borrow_mut()
            .push(node.start_position().row);
    }

    pub fn field<'t>(&self, node: Node<'t>, name: &str) -> Result<Node<'t>, ReadError> {
        node.child_by_field_name(name).ok_or_else(|| {
            ReadError::Parse(format!("{} missing {}", node.kind(), name))
        })
    }

    pub fn named_children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| !child.kind().ends_with("comment"))
            .collect()
    }

    fn describe(&self, node: Node) -> String {
        let text = self.node_text(node).split_whitespace().collect::<Vec<_>>().join(" ");
        let excerpt: String = text.chars().take(EXCERPT_LEN).collect();
        if excerpt.len() < text.len() {
            format!("{}: {}...", node.kind(), excerpt)
        } else {
            format!("{}: {}", node.kind(), excerpt)
        }
    }

    pub fn unknown_stmt(&self, node: Node) -> Stmt {
        let description = self.describe(node);
        tracing::debug!(language = self.language, %description, "unsupported statement");
        Stmt::unknown(description)
    }

    pub fn unknown_expr(&self, node: Node) -> Expr {
        let description = self.describe(node);
        tracing::debug!(language = self.language, %description, "unsupported expression");
        Expr::unknown(description)
    }
}

/// Statement for a call at statement level; one-argument `print` is a
/// [`Stmt::Print`].
pub(crate) fn call_statement(call: Call) -> Stmt {
    if call.func_name() != Some("print") {
        return Stmt::CallStatement(call);
    }
    let Call { func, args } = call;
    match <[Expr; 1]>::try_from(args) {
        Ok([arg]) => Stmt::print(arg),
        Err(args) => Stmt::CallStatement(Call { func, args }),
    }
}

/// Statement for any expression at statement level.
pub(crate) fn expr_statement(expr: Expr) -> Stmt {
    match expr {
        Expr::Call(call) => call_statement(call),
        other => Stmt::expr(other),
    }
}

/// Numeric literal from source text, or `None` if it cannot be read.
///
/// Integral text without a fraction or exponent is an `Int`.
pub(crate) fn parse_number(text: &str) -> Option<Literal> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            let digits = digits.trim_end_matches('l');
            return i64::from_str_radix(digits, radix).ok().map(Literal::Int);
        }
    }

    let is_float = lower.contains('.') || lower.contains('e') || lower.ends_with(['f', 'd']);
    let trimmed = lower.trim_end_matches(['l', 'f', 'd']);
    if is_float {
        trimmed.parse::<f64>().ok().map(Literal::Float)
    } else {
        match trimmed.parse::<i64>() {
            Ok(n) => Some(Literal::Int(n)),
            Err(_) => trimmed.parse::<f64>().ok().map(Literal::Float),
        }
    }
}

/// Negate a numeric constant; other operands are left alone.
pub(crate) fn negate(expr: Expr) -> Option<Expr> {
    match expr {
        Expr::Constant(Constant {
            value: Literal::Int(n),
            ..
        }) => Some(Expr::int(-n)),
        Expr::Constant(Constant {
            value: Literal::Float(f),
            ..
        }) => Some(Expr::float(-f)),
        _ => None,
    }
}

/// Strip quotes from a string literal and resolve escapes.
///
/// Handles single, double, triple and backtick quotes. Leading prefix
/// letters are skipped; an `r` prefix disables escape processing.
pub(crate) fn unquote(text: &str) -> String {
    let prefix_len = text.find(['\'', '"', '`']).unwrap_or(0);
    let (prefix, quoted) = text.split_at(prefix_len);
    let raw = prefix.contains(['r', 'R']);

    let inner = ["\"\"\"", "'''", "\"", "'", "`"]
        .iter()
        .find_map(|q| {
            quoted
                .strip_prefix(q)
                .and_then(|rest| rest.strip_suffix(q))
        })
        .unwrap_or(quoted);

    if raw { inner.to_string() } else { unescape(inner) }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(c @ ('\\' | '\'' | '"' | '`')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
