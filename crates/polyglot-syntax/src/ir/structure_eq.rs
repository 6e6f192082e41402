//! Structural equality for AST types.
//!
//! `structure_eq` compares trees ignoring "surface hints" - differences
//! that come from how a language spells a value rather than what it means.
//!
//! # Hint Fields (normalized during comparison)
//!
//! - `Literal::Int(n)` vs `Literal::Float(n.0)` - integral floats render
//!   without a decimal point, so they come back as integers
//!
//! # Core Fields (must match exactly)
//!
//! - All names, contexts, operators and literal values
//! - Declared types on functions, assignments, lists and tuples
//! - Statement order and nesting

use super::{Assign, Call, ClassDef, Constant, Expr, FunctionDef, Literal, Module, Name, Stmt};

/// Trait for structural equality comparison.
///
/// Unlike `PartialEq`, this ignores surface hints that may differ between
/// languages without changing the program.
pub trait StructureEq {
    /// Compare two values for structural equality.
    fn structure_eq(&self, other: &Self) -> bool;
}

impl StructureEq for Module {
    fn structure_eq(&self, other: &Self) -> bool {
        vec_structure_eq(&self.body, &other.body)
    }
}

impl StructureEq for Stmt {
    fn structure_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Stmt::ExprStatement(a), Stmt::ExprStatement(b)) => a.structure_eq(b),
            (Stmt::Print(a), Stmt::Print(b)) => a.structure_eq(b),
            (Stmt::FunctionDef(a), Stmt::FunctionDef(b)) => a.structure_eq(b),
            (Stmt::ClassDef(a), Stmt::ClassDef(b)) => a.structure_eq(b),
            (Stmt::Assign(a), Stmt::Assign(b)) => a.structure_eq(b),
            (Stmt::CallStatement(a), Stmt::CallStatement(b)) => a.structure_eq(b),
            (Stmt::Return(a), Stmt::Return(b)) => option_structure_eq(a.as_ref(), b.as_ref()),
            (
                Stmt::If {
                    test: t1,
                    body: b1,
                    orelse: o1,
                },
                Stmt::If {
                    test: t2,
                    body: b2,
                    orelse: o2,
                },
            ) => t1.structure_eq(t2) && vec_structure_eq(b1, b2) && vec_structure_eq(o1, o2),
            (Stmt::Unknown { description: d1 }, Stmt::Unknown { description: d2 }) => d1 == d2,
            _ => false,
        }
    }
}

impl StructureEq for FunctionDef {
    fn structure_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.args == other.args
            && self.return_type == other.return_type
            && self.param_types == other.param_types
            && self.param_metadata == other.param_metadata
            && vec_structure_eq(&self.body, &other.body)
    }
}

impl StructureEq for ClassDef {
    fn structure_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && vec_structure_eq(&self.bases, &other.bases)
            && vec_structure_eq(&self.body, &other.body)
    }
}

impl StructureEq for Assign {
    fn structure_eq(&self, other: &Self) -> bool {
        self.target.structure_eq(&other.target)
            && self.variable_type == other.variable_type
            && self.value.structure_eq(&other.value)
    }
}

impl StructureEq for Call {
    fn structure_eq(&self, other: &Self) -> bool {
        self.func.structure_eq(&other.func) && vec_structure_eq(&self.args, &other.args)
    }
}

impl StructureEq for Name {
    fn structure_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl StructureEq for Expr {
    fn structure_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Call(a), Expr::Call(b)) => a.structure_eq(b),
            (Expr::Name(a), Expr::Name(b)) => a.structure_eq(b),
            (Expr::Constant(a), Expr::Constant(b)) => a.structure_eq(b),
            (
                Expr::Member {
                    object: o1,
                    property: p1,
                },
                Expr::Member {
                    object: o2,
                    property: p2,
                },
            ) => p1 == p2 && o1.structure_eq(o2),
            (
                Expr::Binary {
                    left: l1,
                    op: op1,
                    right: r1,
                },
                Expr::Binary {
                    left: l2,
                    op: op2,
                    right: r2,
                },
            ) => op1 == op2 && l1.structure_eq(l2) && r1.structure_eq(r2),
            (
                Expr::Compare {
                    left: l1,
                    op: op1,
                    right: r1,
                },
                Expr::Compare {
                    left: l2,
                    op: op2,
                    right: r2,
                },
            ) => op1 == op2 && l1.structure_eq(l2) && r1.structure_eq(r2),
            (
                Expr::List {
                    elements: e1,
                    element_type: t1,
                    homogeneous: h1,
                },
                Expr::List {
                    elements: e2,
                    element_type: t2,
                    homogeneous: h2,
                },
            ) => t1 == t2 && h1 == h2 && vec_structure_eq(e1, e2),
            (
                Expr::Tuple {
                    elements: e1,
                    element_types: t1,
                },
                Expr::Tuple {
                    elements: e2,
                    element_types: t2,
                },
            ) => t1 == t2 && vec_structure_eq(e1, e2),
            (Expr::Unknown { description: d1 }, Expr::Unknown { description: d2 }) => d1 == d2,
            _ => false,
        }
    }
}

impl StructureEq for Constant {
    fn structure_eq(&self, other: &Self) -> bool {
        self.type_info == other.type_info && self.value.structure_eq(&other.value)
    }
}

impl StructureEq for Literal {
    fn structure_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Int(i), Literal::Float(f)) | (Literal::Float(f), Literal::Int(i)) => {
                f.fract() == 0.0 && *f == *i as f64
            }
            _ => self == other,
        }
    }
}

fn vec_structure_eq<T: StructureEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structure_eq(y))
}

fn option_structure_eq<T: StructureEq>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x.structure_eq(y),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::BinaryOp;

    #[test]
    fn test_integral_float_matches_int() {
        assert!(Expr::float(0.0).structure_eq(&Expr::int(0)));
        assert!(Expr::int(1).structure_eq(&Expr::float(1.0)));
        assert!(!Expr::float(1.5).structure_eq(&Expr::int(1)));
    }

    #[test]
    fn test_nested_normalization() {
        let a = Module::new(vec![Stmt::call(
            Expr::name("fib"),
            vec![Expr::float(0.0), Expr::float(1.0)],
        )]);
        let b = Module::new(vec![Stmt::call(
            Expr::name("fib"),
            vec![Expr::int(0), Expr::int(1)],
        )]);
        assert!(a.structure_eq(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_operator_mismatch() {
        let a = Expr::binary(Expr::int(1), BinaryOp::Add, Expr::int(2));
        let b = Expr::binary(Expr::int(1), BinaryOp::Sub, Expr::int(2));
        assert!(!a.structure_eq(&b));
    }

    #[test]
    fn test_variable_type_is_core() {
        let a = Stmt::assign("x", Expr::int(1));
        let Stmt::Assign(typed) = a.clone() else {
            unreachable!()
        };
        let b = Stmt::Assign(typed.typed(crate::types::CanonicalType::Number));
        assert!(!a.structure_eq(&b));
    }
}
