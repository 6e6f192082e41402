//! Tree-sitter based Java reader.
//!
//! Accepts the flat script shape the Java writer produces (top-level
//! statements and `public static` methods) as well as ordinary classes.

use super::{
    Grammar, MetadataSource, ReadContext, expr_statement, negate, parse_number, read_source,
    unquote,
};
use crate::ir::*;
use crate::metadata::{LanguageMetadata, apply_variable_type};
use crate::traits::{ReadError, Reader};
use crate::types::{CanonicalType, TypeDefinition};
use std::cell::RefCell;
use std::collections::HashMap;
use tree_sitter::Node;

/// Static instance of the Java reader for registry.
pub static JAVA_READER: JavaReader = JavaReader;

/// Java reader using tree-sitter.
pub struct JavaReader;

const GRAMMAR: Grammar = Grammar {
    language: "java",
    comment_prefix: "//",
    load: language,
    prepare: None,
};

fn language() -> tree_sitter::Language {
    arborium_java::language().into()
}

impl Reader for JavaReader {
    fn language(&self) -> &'static str {
        "java"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn read(&self, source: &str) -> Result<Module, ReadError> {
        read_java(source)
    }

    fn read_with_metadata(
        &self,
        source: &str,
        metadata: Vec<LanguageMetadata>,
    ) -> Result<Module, ReadError> {
        read_source(&GRAMMAR, source, MetadataSource::Sidecar(metadata), build)
    }
}

/// Parse Java source into the AST.
pub fn read_java(source: &str) -> Result<Module, ReadError> {
    read_source(&GRAMMAR, source, MetadataSource::Comments, build)
}

fn build(ctx: &ReadContext<'_>, root: Node<'_>) -> Result<Vec<Stmt>, ReadError> {
    Walker {
        ctx,
        pending: RefCell::default(),
    }
    .read_block(root)
}

/// Map a Java type spelling onto a type definition.
///
/// `Object` and `var` say nothing about the value and map to `Unknown`.
fn java_type(text: &str) -> TypeDefinition {
    let text = text.trim();
    if let Some(element) = text.strip_suffix("[]") {
        return TypeDefinition::array(java_type(element).canonical());
    }
    let ty = match text {
        "String" | "char" | "Character" => CanonicalType::String,
        "int" | "long" | "short" | "byte" | "double" | "float" | "Integer" | "Long"
        | "Double" | "Float" => CanonicalType::Number,
        "boolean" | "Boolean" => CanonicalType::Boolean,
        "void" => CanonicalType::Void,
        "Object" | "var" => return TypeDefinition::Unknown,
        other => return TypeDefinition::Custom(other.to_string()),
    };
    TypeDefinition::Simple(ty)
}

struct Walker<'c, 'a> {
    ctx: &'c ReadContext<'a>,
    /// Declared types of locals declared without a value.
    pending: RefCell<HashMap<String, TypeDefinition>>,
}

impl Walker<'_, '_> {
    fn type_of(&self, node: Node) -> TypeDefinition {
        node.child_by_field_name("type")
            .map(|ty| java_type(self.ctx.node_text(ty)))
            .unwrap_or_default()
    }

    fn read_block(&self, node: Node) -> Result<Vec<Stmt>, ReadError> {
        let mut stmts = Vec::new();
        for child in self.ctx.named_children(node) {
            self.read_stmt(child, &mut stmts)?;
        }
        Ok(stmts)
    }

    fn read_body(&self, node: Node) -> Result<Vec<Stmt>, ReadError> {
        if node.kind() == "block" {
            return self.read_block(node);
        }
        let mut stmts = Vec::new();
        self.read_stmt(node, &mut stmts)?;
        Ok(stmts)
    }

    fn read_stmt(&self, node: Node, out: &mut Vec<Stmt>) -> Result<(), ReadError> {
        match node.kind() {
            "local_variable_declaration" | "field_declaration" => self.read_declaration(node, out)?,
            "method_declaration" => out.push(self.read_method(node)?),
            "class_declaration" => out.push(self.read_class(node)?),
            "expression_statement" => out.push(self.read_expression_statement(node)?),
            "if_statement" => out.push(self.read_if(node)?),
            "return_statement" => {
                let value = self
                    .ctx
                    .named_children(node)
                    .first()
                    .map(|child| self.read_expr(*child))
                    .transpose()?;
                out.push(Stmt::return_stmt(value));
            }
            _ => out.push(self.ctx.unknown_stmt(node)),
        }
        Ok(())
    }

    fn read_declaration(&self, node: Node, out: &mut Vec<Stmt>) -> Result<(), ReadError> {
        let declared = self.type_of(node);
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let name = self.ctx.field(declarator, "name")?;
            let Some(value) = declarator.child_by_field_name("value") else {
                // A local assigned later picks its type up at that point.
                if node.kind() == "local_variable_declaration" {
                    if declared != TypeDefinition::Unknown {
                        self.pending
                            .borrow_mut()
                            .insert(self.ctx.node_text(name).to_string(), declared.clone());
                    }
                } else {
                    out.push(self.ctx.unknown_stmt(declarator));
                }
                continue;
            };
            self.ctx.consumer(declarator);
            let assign = Assign::new(self.ctx.node_text(name), self.read_expr(value)?);
            out.push(Stmt::Assign(apply_variable_type(assign, &declared)));
        }
        Ok(())
    }

    fn read_method(&self, node: Node) -> Result<Stmt, ReadError> {
        let name = self.ctx.node_text(self.ctx.field(node, "name")?);
        self.ctx.consumer(node);

        let mut args = Vec::new();
        let mut param_types = std::collections::BTreeMap::new();
        for param in self.ctx.named_children(self.ctx.field(node, "parameters")?) {
            if param.kind() != "formal_parameter" {
                tracing::debug!(kind = param.kind(), "skipping unsupported parameter");
                continue;
            }
            let id = self.ctx.node_text(self.ctx.field(param, "name")?);
            let ty = self.type_of(param).canonical();
            if ty.is_known() {
                param_types.insert(id.to_string(), ty);
            }
            args.push(Name::param(id));
        }

        let body = match node.child_by_field_name("body") {
            Some(body) => self.read_block(body)?,
            None => Vec::new(),
        };
        let mut func = FunctionDef::new(name, args, body);
        func.return_type = self.type_of(node).canonical();
        func.param_types = param_types;
        Ok(Stmt::FunctionDef(func))
    }

    fn read_class(&self, node: Node) -> Result<Stmt, ReadError> {
        let name = self.ctx.node_text(self.ctx.field(node, "name")?).to_string();
        let bases = match node.child_by_field_name("superclass") {
            Some(superclass) => self
                .ctx
                .named_children(superclass)
                .into_iter()
                .map(|ty| Expr::name(self.ctx.node_text(ty)))
                .collect(),
            None => Vec::new(),
        };
        let body = self.read_block(self.ctx.field(node, "body")?)?;
        Ok(Stmt::ClassDef(ClassDef { name, bases, body }))
    }

    fn read_expression_statement(&self, node: Node) -> Result<Stmt, ReadError> {
        let children = self.ctx.named_children(node);
        let [inner] = children.as_slice() else {
            return Ok(self.ctx.unknown_stmt(node));
        };
        if inner.kind() != "assignment_expression" {
            return Ok(expr_statement(self.read_expr(*inner)?));
        }

        let left = self.ctx.field(*inner, "left")?;
        let operator = self.ctx.node_text(self.ctx.field(*inner, "operator")?);
        if left.kind() != "identifier" || operator != "=" {
            return Ok(self.ctx.unknown_stmt(node));
        }
        self.ctx.consumer(node);
        let name = self.ctx.node_text(left);
        let value = self.read_expr(self.ctx.field(*inner, "right")?)?;
        let assign = Assign::new(name, value);
        Ok(Stmt::Assign(match self.pending.borrow_mut().remove(name) {
            Some(def) => apply_variable_type(assign, &def),
            None => assign,
        }))
    }

    fn read_if(&self, node: Node) -> Result<Stmt, ReadError> {
        let test = self.read_expr(self.ctx.field(node, "condition")?)?;
        let body = self.read_body(self.ctx.field(node, "consequence")?)?;
        let orelse = match node.child_by_field_name("alternative") {
            Some(alt) if alt.kind() == "if_statement" => vec![self.read_if(alt)?],
            Some(alt) => self.read_body(alt)?,
            None => Vec::new(),
        };
        Ok(Stmt::if_stmt(test, body, orelse))
    }

    fn read_expr(&self, node: Node) -> Result<Expr, ReadError> {
        let expr = match node.kind() {
            "identifier" => Expr::name(self.ctx.node_text(node)),
            "true" => Expr::bool(true),
            "false" => Expr::bool(false),
            "null_literal" => Expr::none(),
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal" => match parse_number(self.ctx.node_text(node)) {
                Some(literal) => Expr::Constant(Constant::new(literal)),
                None => self.ctx.unknown_expr(node),
            },
            "string_literal" | "character_literal" => Expr::str(unquote(self.ctx.node_text(node))),
            "binary_expression" => self.read_binary(node)?,
            "unary_expression" => {
                let operand = self.read_expr(self.ctx.field(node, "operand")?)?;
                match self.ctx.node_text(self.ctx.field(node, "operator")?) {
                    "+" => operand,
                    "-" => negate(operand).unwrap_or_else(|| self.ctx.unknown_expr(node)),
                    _ => self.ctx.unknown_expr(node),
                }
            }
            "parenthesized_expression" => match self.ctx.named_children(node).first() {
                Some(inner) => self.read_expr(*inner)?,
                None => self.ctx.unknown_expr(node),
            },
            "method_invocation" => self.read_invocation(node)?,
            "field_access" => Expr::member(
                self.read_expr(self.ctx.field(node, "object")?)?,
                self.ctx.node_text(self.ctx.field(node, "field")?),
            ),
            "array_creation_expression" => match node.child_by_field_name("value") {
                Some(init) => {
                    let element = self.type_of(node).canonical();
                    match self.read_expr(init)? {
                        Expr::List { elements, .. } if element.is_known() => Expr::List {
                            elements,
                            element_type: element,
                            homogeneous: true,
                        },
                        other => other,
                    }
                }
                None => self.ctx.unknown_expr(node),
            },
            "array_initializer" => Expr::list(
                self.ctx
                    .named_children(node)
                    .into_iter()
                    .map(|child| self.read_expr(child))
                    .collect::<Result<_, _>>()?,
            ),
            _ => self.ctx.unknown_expr(node),
        };
        Ok(expr)
    }

    fn read_binary(&self, node: Node) -> Result<Expr, ReadError> {
        let symbol = self.ctx.node_text(self.ctx.field(node, "operator")?);
        let left = self.read_expr(self.ctx.field(node, "left")?)?;
        let right = self.read_expr(self.ctx.field(node, "right")?)?;
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => {
                return Ok(match CompareOp::from_symbol(symbol) {
                    Some(op) => Expr::compare(left, op, right),
                    None => self.ctx.unknown_expr(node),
                });
            }
        };
        Ok(Expr::binary(left, op, right))
    }

    /// Method calls, with `System.out.println` folded into `print`.
    fn read_invocation(&self, node: Node) -> Result<Expr, ReadError> {
        let name = self.ctx.node_text(self.ctx.field(node, "name")?);
        let callee = match node.child_by_field_name("object") {
            Some(object) if name == "println" && self.ctx.node_text(object) == "System.out" => {
                Expr::name("print")
            }
            Some(object) => Expr::member(self.read_expr(object)?, name),
            None => Expr::name(name),
        };
        let args = self
            .ctx
            .named_children(self.ctx.field(node, "arguments")?)
            .into_iter()
            .map(|arg| self.read_expr(arg))
            .collect::<Result<_, _>>()?;
        Ok(Expr::call(callee, args))
    }
}
