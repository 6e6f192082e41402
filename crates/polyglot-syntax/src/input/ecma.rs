//! Tree walker shared by the JavaScript and TypeScript readers.
//!
//! The TypeScript grammar is a superset of the JavaScript one; the only
//! differences handled here are type annotations and the shape of class
//! heritage and field nodes.

use super::{ReadContext, expr_statement, negate, parse_number, unquote};
use crate::ir::*;
use crate::metadata::apply_variable_type;
use crate::traits::ReadError;
use crate::types::{CanonicalType, TypeDefinition, canonicalize};
use std::cell::RefCell;
use std::collections::HashMap;
use tree_sitter::Node;

/// Build a module body from a JavaScript tree.
#[cfg(feature = "read-javascript")]
pub(crate) fn build_javascript(
    ctx: &ReadContext<'_>,
    root: Node<'_>,
) -> Result<Vec<Stmt>, ReadError> {
    Walker::new(ctx, false).read_block(root)
}

/// Build a module body from a TypeScript tree, honouring annotations.
#[cfg(feature = "read-typescript")]
pub(crate) fn build_typescript(
    ctx: &ReadContext<'_>,
    root: Node<'_>,
) -> Result<Vec<Stmt>, ReadError> {
    Walker::new(ctx, true).read_block(root)
}

/// Parse the text of a `type_annotation` node (`: T`).
fn annotation_type(text: &str) -> TypeDefinition {
    let text = text.trim_start().trim_start_matches(':').trim();
    if let Some(element) = text
        .strip_prefix("Array<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return TypeDefinition::array(canonicalize(element));
    }
    TypeDefinition::parse(text)
}

struct Walker<'c, 'a> {
    ctx: &'c ReadContext<'a>,
    typed: bool,
    /// Types from `let x: T;` waiting for the first assignment to `x`.
    pending: RefCell<HashMap<String, TypeDefinition>>,
}

impl<'c, 'a> Walker<'c, 'a> {
    fn new(ctx: &'c ReadContext<'a>, typed: bool) -> Self {
        Self {
            ctx,
            typed,
            pending: RefCell::default(),
        }
    }

    fn annotation(&self, node: Node, field: &str) -> Option<TypeDefinition> {
        if !self.typed {
            return None;
        }
        node.child_by_field_name(field)
            .map(|ty| annotation_type(self.ctx.node_text(ty)))
    }

    fn read_block(&self, node: Node) -> Result<Vec<Stmt>, ReadError> {
        let mut stmts = Vec::new();
        for child in self.ctx.named_children(node) {
            self.read_stmt(child, &mut stmts)?;
        }
        Ok(stmts)
    }

    /// Body of an `if` branch: a block or a single statement.
    fn read_body(&self, node: Node) -> Result<Vec<Stmt>, ReadError> {
        if node.kind() == "statement_block" {
            return self.read_block(node);
        }
        let mut stmts = Vec::new();
        self.read_stmt(node, &mut stmts)?;
        Ok(stmts)
    }

    fn read_stmt(&self, node: Node, out: &mut Vec<Stmt>) -> Result<(), ReadError> {
        match node.kind() {
            "expression_statement" => out.push(self.read_expression_statement(node)?),
            "lexical_declaration" | "variable_declaration" => {
                for declarator in self.ctx.named_children(node) {
                    if declarator.kind() == "variable_declarator" {
                        out.extend(self.read_declarator(declarator)?);
                    }
                }
            }
            "function_declaration" => out.push(self.read_function(node)?),
            "class_declaration" => out.push(self.read_class(node)?),
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
            "empty_statement" => {}
            _ => out.push(self.ctx.unknown_stmt(node)),
        }
        Ok(())
    }

    fn read_expression_statement(&self, node: Node) -> Result<Stmt, ReadError> {
        let children = self.ctx.named_children(node);
        let [inner] = children.as_slice() else {
            return Ok(self.ctx.unknown_stmt(node));
        };
        match inner.kind() {
            "assignment_expression" => {
                let left = self.ctx.field(*inner, "left")?;
                if left.kind() != "identifier" {
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
            "augmented_assignment_expression" => self.read_augmented(node, *inner),
            _ => Ok(expr_statement(self.read_expr(*inner)?)),
        }
    }

    /// `x += v` becomes `x = x + v`.
    fn read_augmented(&self, stmt: Node, node: Node) -> Result<Stmt, ReadError> {
        let left = self.ctx.field(node, "left")?;
        let op = match self.ctx.node_text(self.ctx.field(node, "operator")?) {
            "+=" => BinaryOp::Add,
            "-=" => BinaryOp::Sub,
            "*=" => BinaryOp::Mul,
            "/=" => BinaryOp::Div,
            "%=" => BinaryOp::Mod,
            _ => return Ok(self.ctx.unknown_stmt(stmt)),
        };
        if left.kind() != "identifier" {
            return Ok(self.ctx.unknown_stmt(stmt));
        }
        self.ctx.consumer(stmt);
        let name = self.ctx.node_text(left);
        let right = self.read_expr(self.ctx.field(node, "right")?)?;
        Ok(Stmt::Assign(Assign::new(
            name,
            Expr::binary(Expr::name(name), op, right),
        )))
    }

    /// A declarator with a value is an assignment. One without declares a
    /// variable assigned later and yields no statement; its annotation, if
    /// any, is kept for that assignment.
    fn read_declarator(&self, node: Node) -> Result<Option<Stmt>, ReadError> {
        let name = self.ctx.field(node, "name")?;
        if name.kind() != "identifier" {
            return Ok(Some(self.ctx.unknown_stmt(node)));
        }
        let Some(value) = node.child_by_field_name("value") else {
            if let Some(def) = self.annotation(node, "type") {
                self.pending
                    .borrow_mut()
                    .insert(self.ctx.node_text(name).to_string(), def);
            }
            return Ok(None);
        };

        self.ctx.consumer(node);
        let mut assign = Assign::new(self.ctx.node_text(name), self.read_expr(value)?);
        if let Some(def) = self.annotation(node, "type") {
            assign = apply_variable_type(assign, &def);
        }
        Ok(Some(Stmt::Assign(assign)))
    }

    /// Function declarations and class methods.
    fn read_function(&self, node: Node) -> Result<Stmt, ReadError> {
        let name = self.ctx.node_text(self.ctx.field(node, "name")?);
        self.ctx.consumer(node);

        let params = self.read_parameters(self.ctx.field(node, "parameters")?);
        let return_type = self
            .annotation(node, "return_type")
            .map(|def| def.canonical())
            .unwrap_or_default();
        let body = self.read_block(self.ctx.field(node, "body")?)?;

        let mut func = FunctionDef::new(
            name,
            params.iter().map(|(name, _)| Name::param(name.as_str())).collect(),
            body,
        );
        func.return_type = return_type;
        func.param_types = params
            .into_iter()
            .filter(|(_, ty)| ty.is_known())
            .collect();
        Ok(Stmt::FunctionDef(func))
    }

    fn read_parameters(&self, node: Node) -> Vec<(String, CanonicalType)> {
        let mut params = Vec::new();
        for child in self.ctx.named_children(node) {
            let (name, ty) = match child.kind() {
                "identifier" => (Some(child), CanonicalType::Unknown),
                "required_parameter" | "optional_parameter" => (
                    child.child_by_field_name("pattern"),
                    self.annotation(child, "type")
                        .map(|def| def.canonical())
                        .unwrap_or_default(),
                ),
                "assignment_pattern" => (child.child_by_field_name("left"), CanonicalType::Unknown),
                _ => (None, CanonicalType::Unknown),
            };
            match name.filter(|n| n.kind() == "identifier") {
                Some(name) => params.push((self.ctx.node_text(name).to_string(), ty)),
                None => {
                    tracing::debug!(kind = child.kind(), "skipping unsupported parameter");
                }
            }
        }
        params
    }

    fn read_class(&self, node: Node) -> Result<Stmt, ReadError> {
        let name = self.ctx.node_text(self.ctx.field(node, "name")?).to_string();

        let mut bases = Vec::new();
        for child in self.ctx.named_children(node) {
            if child.kind() != "class_heritage" {
                continue;
            }
            for clause in self.ctx.named_children(child) {
                match clause.kind() {
                    "extends_clause" => {
                        let mut cursor = clause.walk();
                        for value in clause.children_by_field_name("value", &mut cursor) {
                            bases.push(self.read_expr(value)?);
                        }
                    }
                    "implements_clause" => {}
                    _ => bases.push(self.read_expr(clause)?),
                }
            }
        }

        let mut body = Vec::new();
        for member in self.ctx.named_children(self.ctx.field(node, "body")?) {
            let stmt = match member.kind() {
                "method_definition" => self.read_function(member)?,
                "field_definition" | "public_field_definition" => self.read_field(member)?,
                _ => self.ctx.unknown_stmt(member),
            };
            body.push(stmt);
        }
        Ok(Stmt::ClassDef(ClassDef { name, bases, body }))
    }

    fn read_field(&self, node: Node) -> Result<Stmt, ReadError> {
        // JavaScript names the key `property`, TypeScript `name`.
        let name = node
            .child_by_field_name("property")
            .or_else(|| node.child_by_field_name("name"));
        let (Some(name), Some(value)) = (name, node.child_by_field_name("value")) else {
            return Ok(self.ctx.unknown_stmt(node));
        };

        self.ctx.consumer(node);
        let mut assign = Assign::new(self.ctx.node_text(name), self.read_expr(value)?);
        if let Some(def) = self.annotation(node, "type") {
            assign = apply_variable_type(assign, &def);
        }
        Ok(Stmt::Assign(assign))
    }

    fn read_if(&self, node: Node) -> Result<Stmt, ReadError> {
        let test = self.read_expr(self.ctx.field(node, "condition")?)?;
        let body = self.read_body(self.ctx.field(node, "consequence")?)?;
        let orelse = match node.child_by_field_name("alternative") {
            Some(clause) => match self.ctx.named_children(clause).first() {
                Some(inner) if inner.kind() == "if_statement" => vec![self.read_if(*inner)?],
                Some(inner) => self.read_body(*inner)?,
                None => Vec::new(),
            },
            None => Vec::new(),
        };
        Ok(Stmt::if_stmt(test, body, orelse))
    }

    fn read_expr(&self, node: Node) -> Result<Expr, ReadError> {
        let expr = match node.kind() {
            "identifier" | "property_identifier" | "this" | "undefined" => {
                Expr::name(self.ctx.node_text(node))
            }
            "true" => Expr::bool(true),
            "false" => Expr::bool(false),
            "null" => Expr::none(),
            "number" => match parse_number(self.ctx.node_text(node)) {
                Some(literal) => Expr::Constant(Constant::new(literal)),
                None => self.ctx.unknown_expr(node),
            },
            "string" => Expr::str(unquote(self.ctx.node_text(node))),
            "template_string" => {
                if self.ctx.named_children(node).iter().any(|c| c.kind() == "template_substitution") {
                    self.ctx.unknown_expr(node)
                } else {
                    Expr::str(unquote(self.ctx.node_text(node)))
                }
            }
            "binary_expression" => self.read_binary(node)?,
            "unary_expression" => {
                let argument = self.read_expr(self.ctx.field(node, "argument")?)?;
                match self.ctx.node_text(self.ctx.field(node, "operator")?) {
                    "+" => argument,
                    "-" => negate(argument).unwrap_or_else(|| self.ctx.unknown_expr(node)),
                    _ => self.ctx.unknown_expr(node),
                }
            }
            "parenthesized_expression" => match self.ctx.named_children(node).first() {
                Some(inner) => self.read_expr(*inner)?,
                None => self.ctx.unknown_expr(node),
            },
            "call_expression" => self.read_call(node)?,
            "member_expression" => Expr::member(
                self.read_expr(self.ctx.field(node, "object")?)?,
                self.ctx.node_text(self.ctx.field(node, "property")?),
            ),
            "array" => Expr::list(self.read_exprs(node)?),
            _ => self.ctx.unknown_expr(node),
        };
        Ok(expr)
    }

    fn read_exprs(&self, node: Node) -> Result<Vec<Expr>, ReadError> {
        self.ctx
            .named_children(node)
            .into_iter()
            .map(|child| self.read_expr(child))
            .collect()
    }

    fn read_binary(&self, node: Node) -> Result<Expr, ReadError> {
        let symbol = self.ctx.node_text(self.ctx.field(node, "operator")?);
        let left = || self.read_expr(self.ctx.field(node, "left")?);
        let right = || self.read_expr(self.ctx.field(node, "right")?);

        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => {
                return match CompareOp::from_symbol(symbol) {
                    Some(op) => Ok(Expr::compare(left()?, op, right()?)),
                    None => Ok(self.ctx.unknown_expr(node)),
                };
            }
        };
        Ok(Expr::binary(left()?, op, right()?))
    }

    /// Calls, with `console.log` folded into the canonical `print`.
    fn read_call(&self, node: Node) -> Result<Expr, ReadError> {
        let function = self.read_expr(self.ctx.field(node, "function")?)?;
        let console_log = matches!(
            &function,
            Expr::Member { object, property }
                if property == "log"
                    && matches!(object.as_ref(), Expr::Name(name) if name.id == "console")
        );
        let function = if console_log {
            Expr::name("print")
        } else {
            function
        };
        let arguments = self.ctx.field(node, "arguments")?;
        if arguments.kind() != "arguments" {
            return Ok(self.ctx.unknown_expr(node));
        }
        Ok(Expr::call(function, self.read_exprs(arguments)?))
    }
}
