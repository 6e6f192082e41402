//! Snapshot tests for readers and writers.
//!
//! Reader output is checked as JSON, writer output as text.
//! Run `cargo insta review` to update snapshots after intentional changes.

use polyglot_syntax::{Expr, Module, Stmt};

// ============================================================================
// Reader Snapshots - verify the parsed AST is correct
// ============================================================================

mod python_reader {
    use super::*;
    use polyglot_syntax::input::read_python;

    fn parse(code: &str) -> Module {
        read_python(code).expect("parse failed")
    }

    #[test]
    fn print_call() {
        insta::assert_json_snapshot!(parse("print('cookies')"), @r#"
        {
          "body": [
            {
              "Print": {
                "Constant": {
                  "value": {
                    "Str": "cookies"
                  },
                  "type_info": "string"
                }
              }
            }
          ]
        }
        "#);
    }

    #[test]
    fn comparison() {
        insta::assert_json_snapshot!(parse("x >= 1"), @r#"
        {
          "body": [
            {
              "ExprStatement": {
                "Compare": {
                  "left": {
                    "Name": {
                      "id": "x",
                      "ctx": "Load"
                    }
                  },
                  "op": "GtE",
                  "right": {
                    "Constant": {
                      "value": {
                        "Int": 1
                      },
                      "type_info": "number"
                    }
                  }
                }
              }
            }
          ]
        }
        "#);
    }
}

mod typescript_reader {
    use super::*;
    use polyglot_syntax::input::read_typescript;

    fn parse(code: &str) -> Module {
        read_typescript(code).expect("parse failed")
    }

    #[test]
    fn typed_declaration() {
        insta::assert_json_snapshot!(parse("let x: number = 42;"), @r#"
        {
          "body": [
            {
              "Assign": {
                "target": {
                  "id": "x",
                  "ctx": "Store"
                },
                "value": {
                  "Constant": {
                    "value": {
                      "Int": 42
                    },
                    "type_info": "number"
                  }
                },
                "variable_type": "number"
              }
            }
          ]
        }
        "#);
    }

    #[test]
    fn method_call_chain() {
        let module = parse("Math.max(a, 0);");
        assert_eq!(
            module.body,
            vec![Stmt::call(
                Expr::member(Expr::name("Math"), "max"),
                vec![Expr::name("a"), Expr::int(0)]
            )]
        );
    }
}

mod javascript_reader {
    use super::*;
    use polyglot_syntax::input::read_javascript;

    #[test]
    fn console_log() {
        let module = read_javascript("console.log('cookies');").expect("parse failed");
        assert_eq!(module, Module::new(vec![Stmt::print(Expr::str("cookies"))]));
    }
}

// ============================================================================
// Writer Snapshots - verify emitted source is correct
// ============================================================================

mod writers {
    use super::*;
    use polyglot_syntax::{
        Assign, BinaryOp, CanonicalType, CompareOp, FunctionDef, Name, writer_for_language,
    };

    fn cookies() -> Module {
        Module::new(vec![Stmt::print(Expr::str("cookies"))])
    }

    fn emit(lang: &str, module: &Module) -> String {
        writer_for_language(lang)
            .expect("writer registered")
            .write(module)
    }

    #[test]
    fn print_per_language() {
        assert_eq!(emit("javascript", &cookies()), "console.log('cookies');");
        assert_eq!(emit("typescript", &cookies()), "console.log('cookies');");
        assert_eq!(emit("python", &cookies()), "print('cookies')");
        assert_eq!(emit("java", &cookies()), "System.out.println(\"cookies\");");
        assert_eq!(emit("haskell", &cookies()), "putStrLn \"cookies\"");
    }

    #[test]
    fn typed_function_per_language() {
        let mut func = FunctionDef::new(
            "check",
            vec![Name::param("n")],
            vec![Stmt::if_stmt(
                Expr::compare(Expr::name("n"), CompareOp::NotEq, Expr::float(0.0)),
                vec![Stmt::return_stmt(Some(Expr::bool(true)))],
                vec![Stmt::return_stmt(Some(Expr::bool(false)))],
            )],
        );
        func.return_type = CanonicalType::Boolean;
        func.param_types.insert("n".into(), CanonicalType::Number);
        let module = Module::new(vec![Stmt::FunctionDef(func)]);

        insta::assert_snapshot!(emit("typescript", &module), @r"
        function check(n: number): boolean {
            if (n !== 0) {
                return true;
            } else {
                return false;
            }
        }
        ");
        insta::assert_snapshot!(emit("python", &module), @r#"
        def check(n): # __META__: {"returnType":"boolean","paramTypes":{"n":"number"}}
            if n != 0:
                return True
            else:
                return False
        "#);
        insta::assert_snapshot!(
            emit("haskell", &module),
            @r#"check n = if n /= 0 then True else False -- __META__: {"returnType":"boolean","paramTypes":{"n":"number"}}"#
        );
    }

    #[test]
    fn mixed_expressions() {
        let module = Module::new(vec![Stmt::Assign(
            Assign::new(
                "total",
                Expr::binary(
                    Expr::binary(Expr::name("a"), BinaryOp::Add, Expr::int(-1)),
                    BinaryOp::Mul,
                    Expr::name("b"),
                ),
            )
            .typed(CanonicalType::Number),
        )]);
        assert_eq!(emit("java", &module), "double total = (a + -1) * b;");
        assert_eq!(
            emit("javascript", &module),
            "let total = (a + -1) * b; // __META__: {\"variableType\":\"number\"}"
        );
    }
}
