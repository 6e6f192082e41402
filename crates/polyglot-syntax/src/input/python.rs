//! Tree-sitter based Python reader.

use super::{
    Grammar, MetadataSource, ReadContext, expr_statement, negate, parse_number, read_source,
    unquote,
};
use crate::indent::Preprocessor;
use crate::ir::*;
use crate::metadata::{LanguageMetadata, apply_variable_type};
use crate::traits::{ReadError, Reader};
use crate::types::{CanonicalType, TypeDefinition, canonicalize};
use tree_sitter::Node;

/// Static instance of the Python reader for registry.
pub static PYTHON_READER: PythonReader = PythonReader;

/// Python reader using tree-sitter.
pub struct PythonReader;

const GRAMMAR: Grammar = Grammar {
    language: "python",
    comment_prefix: "#",
    load: language,
    prepare: Some(reindent),
};

fn language() -> tree_sitter::Language {
    arborium_python::language().into()
}

/// Normalize indentation to four spaces per level before parsing.
fn reindent(source: &str) -> String {
    Preprocessor::new().skip_comments("#").reindent(source, "    ")
}

impl Reader for PythonReader {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn read(&self, source: &str) -> Result<Module, ReadError> {
        read_python(source)
    }

    fn read_with_metadata(
        &self,
        source: &str,
        metadata: Vec<LanguageMetadata>,
    ) -> Result<Module, ReadError> {
        read_source(&GRAMMAR, source, MetadataSource::Sidecar(metadata), build)
    }
}

/// Parse Python source, recovering types from `# __META__:` comments.
pub fn read_python(source: &str) -> Result<Module, ReadError> {
    read_source(&GRAMMAR, source, MetadataSource::Comments, build)
}

fn build(ctx: &ReadContext<'_>, root: Node<'_>) -> Result<Vec<Stmt>, ReadError> {
    Walker { ctx }.read_block(root, false)
}

/// Map a Python annotation onto a type definition.
///
/// `list[T]` and `tuple[A, B]` (and their `typing` spellings) become
/// arrays and tuples; other names go through the canonical mapping.
fn python_type(text: &str) -> TypeDefinition {
    let text = text.trim();
    if let Some((head, rest)) = text.split_once('[') {
        let inner = rest.strip_suffix(']').unwrap_or(rest);
        return match head.trim() {
            "list" | "List" | "Sequence" => TypeDefinition::array(python_type(inner).canonical()),
            "tuple" | "Tuple" => TypeDefinition::Tuple(
                inner
                    .split(',')
                    .map(|part| python_type(part).canonical())
                    .collect(),
            ),
            _ => TypeDefinition::Custom(text.to_string()),
        };
    }
    let ty = match text {
        "str" => CanonicalType::String,
        "int" | "float" | "complex" => CanonicalType::Number,
        "None" => CanonicalType::Void,
        "Any" | "object" => CanonicalType::Any,
        other => canonicalize(other),
    };
    match ty {
        CanonicalType::Unknown => TypeDefinition::Custom(text.to_string()),
        ty => TypeDefinition::Simple(ty),
    }
}

/// Statement and definition kinds the walker has no mapping for.
fn is_statement_kind(kind: &str) -> bool {
    kind.ends_with("_statement") || kind.ends_with("_definition")
}

struct Walker<'c, 'a> {
    ctx: &'c ReadContext<'a>,
}

impl Walker<'_, '_> {
    fn read_block(&self, node: Node, in_class: bool) -> Result<Vec<Stmt>, ReadError> {
        let mut stmts = Vec::new();
        for child in self.ctx.named_children(node) {
            if let Some(stmt) = self.read_stmt(child, in_class)? {
                stmts.push(stmt);
            }
        }
        Ok(stmts)
    }

    fn read_stmt(&self, node: Node, in_class: bool) -> Result<Option<Stmt>, ReadError> {
        let stmt = match node.kind() {
            "expression_statement" => self.read_expression_statement(node)?,
            "function_definition" => self.read_function(node, in_class)?,
            "class_definition" => self.read_class(node)?,
            "if_statement" => self.read_if(node, in_class)?,
            "return_statement" => {
                let value = self
                    .ctx
                    .named_children(node)
                    .first()
                    .map(|child| self.read_expr(*child))
                    .transpose()?;
                Stmt::return_stmt(value)
            }
            "assignment" => self.read_assignment(node)?,
            "augmented_assignment" => self.read_augmented_assignment(node)?,
            "pass_statement" => return Ok(None),
            kind if is_statement_kind(kind) => self.ctx.unknown_stmt(node),
            // Expressions sit directly under `module` and `block`.
            _ => expr_statement(self.read_expr(node)?),
        };
        Ok(Some(stmt))
    }

    fn read_expression_statement(&self, node: Node) -> Result<Stmt, ReadError> {
        let children = self.ctx.named_children(node);
        let [inner] = children.as_slice() else {
            return Ok(self.ctx.unknown_stmt(node));
        };
        match inner.kind() {
            "assignment" => self.read_assignment(*inner),
            "augmented_assignment" => self.read_augmented_assignment(*inner),
            _ => Ok(expr_statement(self.read_expr(*inner)?)),
        }
    }

    fn read_assignment(&self, node: Node) -> Result<Stmt, ReadError> {
        let left = self.ctx.field(node, "left")?;
        let Some(right) = node.child_by_field_name("right") else {
            // Bare annotation (`x: int`) declares nothing to assign.
            return Ok(self.ctx.unknown_stmt(node));
        };
        if left.kind() != "identifier" || right.kind() == "assignment" {
            return Ok(self.ctx.unknown_stmt(node));
        }

        self.ctx.consumer(node);
        let mut assign = Assign::new(self.ctx.node_text(left), self.read_expr(right)?);
        if let Some(annotation) = node.child_by_field_name("type") {
            assign = apply_variable_type(assign, &python_type(self.ctx.node_text(annotation)));
        }
        Ok(Stmt::Assign(assign))
    }

    /// `x += v` becomes `x = x + v`.
    fn read_augmented_assignment(&self, node: Node) -> Result<Stmt, ReadError> {
        let left = self.ctx.field(node, "left")?;
        let right = self.ctx.field(node, "right")?;
        let operator = self.ctx.field(node, "operator")?;

        let op = match self.ctx.node_text(operator) {
            "+=" => BinaryOp::Add,
            "-=" => BinaryOp::Sub,
            "*=" => BinaryOp::Mul,
            "/=" => BinaryOp::Div,
            "%=" => BinaryOp::Mod,
            _ => return Ok(self.ctx.unknown_stmt(node)),
        };
        if left.kind() != "identifier" {
            return Ok(self.ctx.unknown_stmt(node));
        }

        self.ctx.consumer(node);
        let name = self.ctx.node_text(left);
        let value = Expr::binary(Expr::name(name), op, self.read_expr(right)?);
        Ok(Stmt::Assign(Assign::new(name, value)))
    }

    fn read_function(&self, node: Node, in_class: bool) -> Result<Stmt, ReadError> {
        let name = self.ctx.node_text(self.ctx.field(node, "name")?);
        self.ctx.consumer(node);

        let mut params = match node.child_by_field_name("parameters") {
            Some(params) => self.read_parameters(params),
            None => Vec::new(),
        };
        if in_class && params.first().is_some_and(|(name, _)| name == "self") {
            params.remove(0);
        }

        let return_type = node
            .child_by_field_name("return_type")
            .map(|ty| python_type(self.ctx.node_text(ty)).canonical())
            .unwrap_or_default();
        let body = self.read_block(self.ctx.field(node, "body")?, false)?;

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
                "identifier" => (Some(child), None),
                "typed_parameter" => (child.named_child(0), child.child_by_field_name("type")),
                "default_parameter" | "typed_default_parameter" => (
                    child.child_by_field_name("name"),
                    child.child_by_field_name("type"),
                ),
                _ => (None, None),
            };
            match name.filter(|n| n.kind() == "identifier") {
                Some(name) => {
                    let ty = ty
                        .map(|ty| python_type(self.ctx.node_text(ty)).canonical())
                        .unwrap_or_default();
                    params.push((self.ctx.node_text(name).to_string(), ty));
                }
                None => {
                    tracing::debug!(kind = child.kind(), "skipping unsupported parameter");
                }
            }
        }
        params
    }

    fn read_class(&self, node: Node) -> Result<Stmt, ReadError> {
        let name = self.ctx.node_text(self.ctx.field(node, "name")?).to_string();
        let bases = match node.child_by_field_name("superclasses") {
            Some(list) => self
                .ctx
                .named_children(list)
                .into_iter()
                .map(|base| self.read_expr(base))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let body = self.read_block(self.ctx.field(node, "body")?, true)?;
        Ok(Stmt::ClassDef(ClassDef { name, bases, body }))
    }

    fn read_if(&self, node: Node, in_class: bool) -> Result<Stmt, ReadError> {
        let test = self.read_expr(self.ctx.field(node, "condition")?)?;
        let body = self.read_block(self.ctx.field(node, "consequence")?, in_class)?;

        // Read clauses in source order, then nest them from the back.
        let mut cursor = node.walk();
        let mut clauses = Vec::new();
        for alt in node.children_by_field_name("alternative", &mut cursor) {
            match alt.kind() {
                "elif_clause" => {
                    let test = self.read_expr(self.ctx.field(alt, "condition")?)?;
                    let body = self.read_block(self.ctx.field(alt, "consequence")?, in_class)?;
                    clauses.push((Some(test), body));
                }
                _ => {
                    let body = self.read_block(self.ctx.field(alt, "body")?, in_class)?;
                    clauses.push((None, body));
                }
            }
        }

        let mut orelse = Vec::new();
        for (test, body) in clauses.into_iter().rev() {
            orelse = match test {
                Some(test) => vec![Stmt::if_stmt(test, body, orelse)],
                None => body,
            };
        }
        Ok(Stmt::if_stmt(test, body, orelse))
    }

    fn read_expr(&self, node: Node) -> Result<Expr, ReadError> {
        let expr = match node.kind() {
            "identifier" => Expr::name(self.ctx.node_text(node)),
            "true" => Expr::bool(true),
            "false" => Expr::bool(false),
            "none" => Expr::none(),
            "integer" | "float" => match parse_number(self.ctx.node_text(node)) {
                Some(literal) => Expr::Constant(Constant::new(literal)),
                None => self.ctx.unknown_expr(node),
            },
            "string" => {
                let mut cursor = node.walk();
                let interpolated = node
                    .named_children(&mut cursor)
                    .any(|child| child.kind() == "interpolation");
                if interpolated {
                    self.ctx.unknown_expr(node)
                } else {
                    Expr::str(unquote(self.ctx.node_text(node)))
                }
            }
            "binary_operator" => self.read_binary(node)?,
            "boolean_operator" => {
                let op = match self.ctx.node_text(self.ctx.field(node, "operator")?) {
                    "and" => BinaryOp::And,
                    _ => BinaryOp::Or,
                };
                Expr::binary(
                    self.read_expr(self.ctx.field(node, "left")?)?,
                    op,
                    self.read_expr(self.ctx.field(node, "right")?)?,
                )
            }
            "comparison_operator" => self.read_comparison(node)?,
            "unary_operator" => {
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
            "call" => self.read_call(node)?,
            "attribute" => Expr::member(
                self.read_expr(self.ctx.field(node, "object")?)?,
                self.ctx.node_text(self.ctx.field(node, "attribute")?),
            ),
            "list" => Expr::list(self.read_exprs(node)?),
            "tuple" => Expr::tuple(self.read_exprs(node)?),
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
        let op = match self.ctx.node_text(self.ctx.field(node, "operator")?) {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            _ => return Ok(self.ctx.unknown_expr(node)),
        };
        Ok(Expr::binary(
            self.read_expr(self.ctx.field(node, "left")?)?,
            op,
            self.read_expr(self.ctx.field(node, "right")?)?,
        ))
    }

    /// Only single comparisons map; chains and `in`/`is` tests do not.
    fn read_comparison(&self, node: Node) -> Result<Expr, ReadError> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let [left, op, right] = children.as_slice() else {
            return Ok(self.ctx.unknown_expr(node));
        };
        match CompareOp::from_symbol(self.ctx.node_text(*op)) {
            Some(op) => Ok(Expr::compare(
                self.read_expr(*left)?,
                op,
                self.read_expr(*right)?,
            )),
            None => Ok(self.ctx.unknown_expr(node)),
        }
    }

    fn read_call(&self, node: Node) -> Result<Expr, ReadError> {
        let function = self.read_expr(self.ctx.field(node, "function")?)?;
        let arguments = self.ctx.field(node, "arguments")?;
        if arguments.kind() != "argument_list" {
            return Ok(self.ctx.unknown_expr(node));
        }
        Ok(Expr::call(function, self.read_exprs(arguments)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::sentinel;
    use indoc::indoc;

    /// Fail if any statement, at any depth, was not mapped.
    fn assert_supported(stmts: &[Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Unknown { description } => panic!("unmapped statement: {description}"),
                Stmt::FunctionDef(func) => assert_supported(&func.body),
                Stmt::ClassDef(class) => assert_supported(&class.body),
                Stmt::If { body, orelse, .. } => {
                    assert_supported(body);
                    assert_supported(orelse);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_print_becomes_print_node() {
        let module = read_python("print('cookies')").unwrap();
        assert_eq!(module, Module::new(vec![Stmt::print(Expr::str("cookies"))]));
    }

    #[test]
    fn test_annotated_function() {
        let module = read_python(indoc! {"
            def greet(name: str, times) -> None:
                print(name)
        "})
        .unwrap();
        assert_supported(&module.body);
        let Stmt::FunctionDef(func) = &module.body[0] else {
            panic!("expected function, got {:?}", module.body[0]);
        };
        assert_eq!(func.name, "greet");
        assert_eq!(func.args, vec![Name::param("name"), Name::param("times")]);
        assert_eq!(func.return_type, CanonicalType::Void);
        assert_eq!(func.param_type("name"), CanonicalType::String);
        assert!(!func.param_types.contains_key("times"));
        assert_eq!(func.body, vec![Stmt::print(Expr::name("name"))]);
    }

    #[test]
    fn test_metadata_comments_are_injected() {
        let module = read_python(indoc! {r#"
            def greet(name): # __META__: {"returnType":"void","paramTypes":{"name":"string"}}
                x = 5 # __META__: {"variableType":"number"}
                print(name)
        "#})
        .unwrap();
        assert_supported(&module.body);
        let Stmt::FunctionDef(func) = &module.body[0] else {
            panic!("expected function");
        };
        assert_eq!(func.return_type, CanonicalType::Void);
        assert_eq!(func.param_type("name"), CanonicalType::String);
        let Stmt::Assign(assign) = &func.body[0] else {
            panic!("expected assignment");
        };
        assert_eq!(assign.variable_type, CanonicalType::Number);
    }

    #[test]
    fn test_sidecar_records() {
        let records = vec![LanguageMetadata {
            return_type: Some(CanonicalType::Number),
            ..Default::default()
        }];
        let module = PYTHON_READER
            .read_with_metadata("def f():\n    return 1\n", records)
            .unwrap();
        let Stmt::FunctionDef(func) = &module.body[0] else {
            panic!("expected function");
        };
        assert_eq!(func.return_type, CanonicalType::Number);
    }

    #[test]
    fn test_class_methods_drop_self() {
        let module = read_python(indoc! {"
            class Dog(Animal):
                legs = 4
                def bark(self, times):
                    pass
        "})
        .unwrap();
        assert_supported(&module.body);
        let Stmt::ClassDef(class) = &module.body[0] else {
            panic!("expected class");
        };
        assert_eq!(class.bases, vec![Expr::name("Animal")]);
        assert_eq!(class.body[0], Stmt::assign("legs", Expr::int(4)));
        let Stmt::FunctionDef(method) = &class.body[1] else {
            panic!("expected method");
        };
        assert_eq!(method.args, vec![Name::param("times")]);
        assert!(method.body.is_empty());
    }

    #[test]
    fn test_elif_chain_nests() {
        let module = read_python(indoc! {"
            if a:
                print(1)
            elif b:
                print(2)
            else:
                print(3)
        "})
        .unwrap();
        let expected = Stmt::if_stmt(
            Expr::name("a"),
            vec![Stmt::print(Expr::int(1))],
            vec![Stmt::if_stmt(
                Expr::name("b"),
                vec![Stmt::print(Expr::int(2))],
                vec![Stmt::print(Expr::int(3))],
            )],
        );
        assert_eq!(module.body, vec![expected]);
    }

    #[test]
    fn test_annotated_containers() {
        let module = read_python("p: tuple[str, int] = ('a', 1)\nxs: list[float] = []\n").unwrap();
        assert!(matches!(
            &module.body[0],
            Stmt::Assign(Assign { value: Expr::Tuple { element_types, .. }, .. })
                if element_types == &[CanonicalType::String, CanonicalType::Number]
        ));
        assert!(matches!(
            &module.body[1],
            Stmt::Assign(Assign {
                value: Expr::List { element_type: CanonicalType::Number, homogeneous: true, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_augmented_assignment() {
        let module = read_python("n += 1").unwrap();
        assert_eq!(
            module.body,
            vec![Stmt::assign(
                "n",
                Expr::binary(Expr::name("n"), BinaryOp::Add, Expr::int(1))
            )]
        );
    }

    #[test]
    fn test_unsupported_constructs_degrade() {
        let module = read_python("while x:\n    pass\ny = lambda: 1\n").unwrap();
        assert!(matches!(&module.body[0], Stmt::Unknown { description } if description.starts_with("while_statement")));
        assert!(matches!(
            &module.body[1],
            Stmt::Assign(Assign { value: Expr::Unknown { .. }, .. })
        ));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            read_python(&sentinel("python")),
            Err(ReadError::Sentinel { language: "python" })
        ));
        assert!(matches!(read_python("def (:"), Err(ReadError::Parse(_))));
    }

    #[test]
    fn test_mixed_indentation_is_normalized() {
        let module = read_python("if x:\n\ty = 1\n\tprint(y)\n").unwrap();
        let Stmt::If { body, .. } = &module.body[0] else {
            panic!("expected if");
        };
        assert_eq!(
            body,
            &vec![
                Stmt::assign("y", Expr::int(1)),
                Stmt::print(Expr::name("y")),
            ]
        );
    }

    #[test]
    fn test_bare_statements_in_module_and_blocks() {
        let module = read_python(indoc! {"
            total = 0
            total += 2
            def bump(n):
                n = n + 1
                log(n, total)
                return n
            bump
        "})
        .unwrap();
        assert_supported(&module.body);
        assert_eq!(module.body[0], Stmt::assign("total", Expr::int(0)));
        assert!(matches!(module.body[1], Stmt::Assign(_)));
        let Stmt::FunctionDef(func) = &module.body[2] else {
            panic!("expected function");
        };
        assert_eq!(
            func.body[1],
            Stmt::call(Expr::name("log"), vec![Expr::name("n"), Expr::name("total")])
        );
        assert_eq!(module.body[3], Stmt::expr(Expr::name("bump")));
    }
}
