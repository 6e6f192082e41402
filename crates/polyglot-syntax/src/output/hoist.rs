//! Declarations lifted out of conditional branches.
//!
//! Brace dialects scope a `let` or typed local to the block it appears in.
//! A name first assigned inside an `if` branch and mentioned anywhere else
//! in the enclosing body has to be declared ahead of the whole statement.

use crate::ir::*;

/// First assignments in `body` whose names escape the branch they sit in.
///
/// Only the statements of `body` and its `if` branches are searched;
/// nested functions and classes hoist their own bodies.
pub(crate) fn hoisted(body: &[Stmt]) -> Vec<&Assign> {
    let mut seen = Vec::new();
    let mut firsts = Vec::new();
    first_assignments(body, false, &mut seen, &mut firsts);

    firsts
        .into_iter()
        .filter(|(assign, block)| {
            let name = assign.target.id.as_str();
            mentions(body, name) > mentions(block, name)
        })
        .map(|(assign, _)| assign)
        .collect()
}

/// Record each name's first assignment together with its containing block,
/// keeping only those found inside a branch.
fn first_assignments<'s>(
    block: &'s [Stmt],
    nested: bool,
    seen: &mut Vec<&'s str>,
    out: &mut Vec<(&'s Assign, &'s [Stmt])>,
) {
    for stmt in block {
        match stmt {
            Stmt::Assign(assign) => {
                let name = assign.target.id.as_str();
                if seen.contains(&name) {
                    continue;
                }
                seen.push(name);
                if nested {
                    out.push((assign, block));
                }
            }
            Stmt::If { body, orelse, .. } => {
                first_assignments(body, true, seen, out);
                first_assignments(orelse, true, seen, out);
            }
            _ => {}
        }
    }
}

/// Reads and writes of `name` anywhere under `stmts`.
fn mentions(stmts: &[Stmt], name: &str) -> usize {
    stmts.iter().map(|stmt| stmt_mentions(stmt, name)).sum()
}

fn stmt_mentions(stmt: &Stmt, name: &str) -> usize {
    match stmt {
        Stmt::ExprStatement(expr) | Stmt::Print(expr) => expr_mentions(expr, name),
        Stmt::Return(value) => value.as_ref().map_or(0, |expr| expr_mentions(expr, name)),
        Stmt::Assign(assign) => {
            usize::from(assign.target.id == name) + expr_mentions(&assign.value, name)
        }
        Stmt::CallStatement(call) => call_mentions(call, name),
        Stmt::If { test, body, orelse } => {
            expr_mentions(test, name) + mentions(body, name) + mentions(orelse, name)
        }
        Stmt::FunctionDef(func) => mentions(&func.body, name),
        Stmt::ClassDef(class) => {
            exprs_mentions(&class.bases, name) + mentions(&class.body, name)
        }
        Stmt::Unknown { .. } => 0,
    }
}

fn expr_mentions(expr: &Expr, name: &str) -> usize {
    match expr {
        Expr::Name(id) => usize::from(id.id == name),
        Expr::Call(call) => call_mentions(call, name),
        Expr::Member { object, .. } => expr_mentions(object, name),
        Expr::Binary { left, right, .. } | Expr::Compare { left, right, .. } => {
            expr_mentions(left, name) + expr_mentions(right, name)
        }
        Expr::List { elements, .. } | Expr::Tuple { elements, .. } => {
            exprs_mentions(elements, name)
        }
        Expr::Constant(_) | Expr::Unknown { .. } => 0,
    }
}

fn call_mentions(call: &Call, name: &str) -> usize {
    expr_mentions(&call.func, name) + exprs_mentions(&call.args, name)
}

fn exprs_mentions(exprs: &[Expr], name: &str) -> usize {
    exprs.iter().map(|expr| expr_mentions(expr, name)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(body: &[Stmt]) -> Vec<&str> {
        hoisted(body).iter().map(|a| a.target.id.as_str()).collect()
    }

    #[test]
    fn test_branch_assignment_read_afterwards() {
        let body = vec![
            Stmt::if_stmt(
                Expr::name("c"),
                vec![Stmt::assign("x", Expr::int(1))],
                vec![Stmt::assign("x", Expr::int(2))],
            ),
            Stmt::print(Expr::name("x")),
        ];
        assert_eq!(names(&body), ["x"]);
    }

    #[test]
    fn test_assignments_in_sibling_branches() {
        let body = vec![Stmt::if_stmt(
            Expr::name("c"),
            vec![Stmt::assign("x", Expr::int(1))],
            vec![Stmt::assign("x", Expr::int(2))],
        )];
        assert_eq!(names(&body), ["x"]);
    }

    #[test]
    fn test_branch_local_names_stay_put() {
        let body = vec![
            Stmt::assign("y", Expr::int(0)),
            Stmt::if_stmt(
                Expr::name("c"),
                vec![
                    Stmt::assign("t", Expr::int(1)),
                    Stmt::print(Expr::name("t")),
                    Stmt::assign("y", Expr::name("t")),
                ],
                vec![],
            ),
            Stmt::print(Expr::name("y")),
        ];
        assert!(names(&body).is_empty());
    }

    #[test]
    fn test_nested_function_bodies_are_not_searched() {
        let inner = FunctionDef::new(
            "f",
            vec![],
            vec![Stmt::if_stmt(
                Expr::name("c"),
                vec![Stmt::assign("x", Expr::int(1))],
                vec![],
            )],
        );
        let body = vec![Stmt::FunctionDef(inner), Stmt::print(Expr::name("x"))];
        assert!(names(&body).is_empty());
    }
}
