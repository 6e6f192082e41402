//! Canonical AST shared by every reader and writer.
//!
//! The node set is closed: readers map whatever they cannot model onto
//! `Stmt::Unknown` / `Expr::Unknown`, and writers match exhaustively.
//! Nodes are plain values. Metadata injection rebuilds them rather than
//! mutating a shared tree.

mod structure_eq;

pub use structure_eq::StructureEq;

use crate::types::CanonicalType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of a parsed program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub body: Vec<Stmt>,
}

impl Module {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }
}

/// Any node category, for APIs that render fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    Module(Module),
    Stmt(Stmt),
    Expr(Expr),
}

impl From<Module> for AstNode {
    fn from(module: Module) -> Self {
        AstNode::Module(module)
    }
}

impl From<Stmt> for AstNode {
    fn from(stmt: Stmt) -> Self {
        AstNode::Stmt(stmt)
    }
}

impl From<Expr> for AstNode {
    fn from(expr: Expr) -> Self {
        AstNode::Expr(expr)
    }
}

/// Statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression evaluated for effect.
    ExprStatement(Expr),
    /// The canonical `print` built-in with a single argument.
    Print(Expr),
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    Assign(Assign),
    CallStatement(Call),
    Return(Option<Expr>),
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    Unknown {
        description: String,
    },
}

/// Expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Call(Call),
    Name(Name),
    Constant(Constant),
    Member {
        object: Box<Expr>,
        property: String,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    List {
        elements: Vec<Expr>,
        element_type: CanonicalType,
        homogeneous: bool,
    },
    Tuple {
        elements: Vec<Expr>,
        element_types: Vec<CanonicalType>,
    },
    Unknown {
        description: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
}

impl CompareOp {
    pub const PRECEDENCE: u8 = 3;

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtE => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtE => ">=",
        }
    }

    /// Parse a comparison operator, folding strict equality onto `==`/`!=`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "==" | "===" => CompareOp::Eq,
            "!=" | "!==" => CompareOp::NotEq,
            "<" => CompareOp::Lt,
            "<=" => CompareOp::LtE,
            ">" => CompareOp::Gt,
            ">=" => CompareOp::GtE,
            _ => return None,
        })
    }
}

/// Whether an identifier occurrence reads, writes, or declares a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameContext {
    Load,
    Store,
    Param,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub id: String,
    pub ctx: NameContext,
}

impl Name {
    pub fn load(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ctx: NameContext::Load,
        }
    }

    pub fn store(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ctx: NameContext::Store,
        }
    }

    pub fn param(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ctx: NameContext::Param,
        }
    }
}

/// Literal payload of a constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl Literal {
    pub fn canonical_type(&self) -> CanonicalType {
        match self {
            Literal::Str(_) => CanonicalType::String,
            Literal::Int(_) | Literal::Float(_) => CanonicalType::Number,
            Literal::Bool(_) => CanonicalType::Boolean,
            Literal::None => CanonicalType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub value: Literal,
    pub type_info: CanonicalType,
}

impl Constant {
    pub fn new(value: Literal) -> Self {
        let type_info = value.canonical_type();
        Self { value, type_info }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub func: Box<Expr>,
    pub args: Vec<Expr>,
}

impl Call {
    pub fn new(func: Expr, args: Vec<Expr>) -> Self {
        Self {
            func: Box::new(func),
            args,
        }
    }

    /// Name of the callee when it is a plain identifier.
    pub fn func_name(&self) -> Option<&str> {
        match self.func.as_ref() {
            Expr::Name(name) => Some(&name.id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub args: Vec<Name>,
    pub body: Vec<Stmt>,
    /// Declared return type; `Unknown` when not annotated.
    pub return_type: CanonicalType,
    /// Declared parameter types, only for parameters whose type is known.
    pub param_types: BTreeMap<String, CanonicalType>,
    /// Free-form per-parameter facts carried through the metadata channel.
    pub param_metadata: BTreeMap<String, BTreeMap<String, String>>,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, args: Vec<Name>, body: Vec<Stmt>) -> Self {
        Self {
            name: name.into(),
            args,
            body,
            ..Default::default()
        }
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.args.iter().any(|arg| arg.id == name)
    }

    /// Declared type of a parameter, `Unknown` when absent.
    pub fn param_type(&self, name: &str) -> CanonicalType {
        self.param_types.get(name).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    pub target: Name,
    pub value: Expr,
    /// Declared variable type; `Unknown` when not annotated.
    pub variable_type: CanonicalType,
}

impl Assign {
    pub fn new(target: impl Into<String>, value: Expr) -> Self {
        Self {
            target: Name::store(target),
            value,
            variable_type: CanonicalType::Unknown,
        }
    }

    pub fn typed(mut self, variable_type: CanonicalType) -> Self {
        self.variable_type = variable_type;
        self
    }
}

// Builders

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::ExprStatement(expr)
    }

    pub fn print(expr: Expr) -> Self {
        Stmt::Print(expr)
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Stmt::CallStatement(Call::new(func, args))
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Stmt::Assign(Assign::new(target, value))
    }

    pub fn return_stmt(value: Option<Expr>) -> Self {
        Stmt::Return(value)
    }

    pub fn if_stmt(test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>) -> Self {
        Stmt::If { test, body, orelse }
    }

    pub fn unknown(description: impl Into<String>) -> Self {
        Stmt::Unknown {
            description: description.into(),
        }
    }
}

impl Expr {
    pub fn name(id: impl Into<String>) -> Self {
        Expr::Name(Name::load(id))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Constant(Constant::new(Literal::Str(value.into())))
    }

    pub fn int(value: i64) -> Self {
        Expr::Constant(Constant::new(Literal::Int(value)))
    }

    pub fn float(value: f64) -> Self {
        Expr::Constant(Constant::new(Literal::Float(value)))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Constant(Constant::new(Literal::Bool(value)))
    }

    pub fn none() -> Self {
        Expr::Constant(Constant::new(Literal::None))
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Call(Call::new(func, args))
    }

    pub fn member(object: Expr, property: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            property: property.into(),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn compare(left: Expr, op: CompareOp, right: Expr) -> Self {
        Expr::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// List literal whose element type is taken from its constants when
    /// they all share one known type.
    pub fn list(elements: Vec<Expr>) -> Self {
        let element_type = shared_constant_type(&elements);
        Expr::List {
            homogeneous: element_type.is_known(),
            element_type,
            elements,
        }
    }

    /// Tuple literal with per-position types taken from constants.
    pub fn tuple(elements: Vec<Expr>) -> Self {
        let element_types = elements.iter().map(Expr::constant_type).collect();
        Expr::Tuple {
            elements,
            element_types,
        }
    }

    pub fn unknown(description: impl Into<String>) -> Self {
        Expr::Unknown {
            description: description.into(),
        }
    }

    /// Type of a constant expression, `Unknown` for anything else.
    pub fn constant_type(&self) -> CanonicalType {
        match self {
            Expr::Constant(c) => c.type_info,
            _ => CanonicalType::Unknown,
        }
    }

    /// Binding strength used by writers to place parentheses.
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Compare { .. } => CompareOp::PRECEDENCE,
            Expr::Constant(Constant {
                value: Literal::Int(n),
                ..
            }) if *n < 0 => 6,
            Expr::Constant(Constant {
                value: Literal::Float(n),
                ..
            }) if *n < 0.0 => 6,
            _ => 10,
        }
    }
}

/// Type shared by every element when all are constants of one known type.
pub(crate) fn shared_constant_type(elements: &[Expr]) -> CanonicalType {
    let mut types = elements.iter().map(Expr::constant_type);
    match types.next() {
        Some(first) if first.is_known() && types.all(|t| t == first) => first,
        _ => CanonicalType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Stmt::assign("x", Expr::int(42));
        let b = Stmt::assign("x", Expr::int(42));
        assert_eq!(a, b);
        assert_ne!(a, Stmt::assign("x", Expr::int(43)));
    }

    #[test]
    fn test_constant_type_info() {
        let Expr::Constant(c) = Expr::str("cookies") else {
            unreachable!()
        };
        assert_eq!(c.type_info, CanonicalType::String);
        let Expr::Constant(c) = Expr::float(1.5) else {
            unreachable!()
        };
        assert_eq!(c.type_info, CanonicalType::Number);
    }

    #[test]
    fn test_list_infers_shared_type() {
        let list = Expr::list(vec![Expr::int(1), Expr::float(2.5)]);
        assert!(matches!(
            list,
            Expr::List {
                element_type: CanonicalType::Number,
                homogeneous: true,
                ..
            }
        ));

        let mixed = Expr::list(vec![Expr::int(1), Expr::str("a")]);
        assert!(matches!(
            mixed,
            Expr::List {
                element_type: CanonicalType::Unknown,
                homogeneous: false,
                ..
            }
        ));
    }

    #[test]
    fn test_compare_op_folds_strict_equality() {
        assert_eq!(CompareOp::from_symbol("==="), Some(CompareOp::Eq));
        assert_eq!(CompareOp::from_symbol("!=="), Some(CompareOp::NotEq));
        assert_eq!(CompareOp::from_symbol("<>"), None);
    }
}
