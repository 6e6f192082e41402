//! Tree-sitter based JavaScript reader.

use super::ecma::build_javascript;
use super::{Grammar, MetadataSource, read_source};
use crate::ir::Module;
use crate::metadata::LanguageMetadata;
use crate::traits::{ReadError, Reader};

/// Static instance of the JavaScript reader for registry.
pub static JAVASCRIPT_READER: JavaScriptReader = JavaScriptReader;

/// JavaScript reader using tree-sitter.
pub struct JavaScriptReader;

const GRAMMAR: Grammar = Grammar {
    language: "javascript",
    comment_prefix: "//",
    load: language,
    prepare: None,
};

fn language() -> tree_sitter::Language {
    arborium_javascript::language().into()
}

impl Reader for JavaScriptReader {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "mjs"]
    }

    fn read(&self, source: &str) -> Result<Module, ReadError> {
        read_javascript(source)
    }

    fn read_with_metadata(
        &self,
        source: &str,
        metadata: Vec<LanguageMetadata>,
    ) -> Result<Module, ReadError> {
        read_source(
            &GRAMMAR,
            source,
            MetadataSource::Sidecar(metadata),
            build_javascript,
        )
    }
}

/// Parse JavaScript source, recovering types from `// __META__:` comments.
pub fn read_javascript(source: &str) -> Result<Module, ReadError> {
    read_source(&GRAMMAR, source, MetadataSource::Comments, build_javascript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;
    use crate::traits::sentinel;
    use crate::types::CanonicalType;
    use indoc::indoc;

    #[test]
    fn test_console_log_becomes_print() {
        let module = read_javascript("console.log('cookies');").unwrap();
        assert_eq!(module, Module::new(vec![Stmt::print(Expr::str("cookies"))]));
    }

    #[test]
    fn test_multi_argument_log_is_a_call() {
        let module = read_javascript("console.log('a', 1);").unwrap();
        assert_eq!(
            module.body,
            vec![Stmt::call(Expr::name("print"), vec![Expr::str("a"), Expr::int(1)])]
        );
    }

    #[test]
    fn test_function_with_metadata_comment() {
        let module = read_javascript(indoc! {r#"
            function greet(name) { // __META__: {"returnType":"void","paramTypes":{"name":"string"}}
                console.log(name);
            }
        "#})
        .unwrap();
        let Stmt::FunctionDef(func) = &module.body[0] else {
            panic!("expected function");
        };
        assert_eq!(func.return_type, CanonicalType::Void);
        assert_eq!(func.param_type("name"), CanonicalType::String);
        assert_eq!(func.body, vec![Stmt::print(Expr::name("name"))]);
    }

    #[test]
    fn test_declarations_and_strict_equality() {
        let module = read_javascript(indoc! {"
            let x = 1, y = 2;
            if (x === y) {
                x = 3;
            } else if (x !== 0) {
                return;
            }
        "})
        .unwrap();
        assert_eq!(module.body[0], Stmt::assign("x", Expr::int(1)));
        assert_eq!(module.body[1], Stmt::assign("y", Expr::int(2)));
        let expected = Stmt::if_stmt(
            Expr::compare(Expr::name("x"), CompareOp::Eq, Expr::name("y")),
            vec![Stmt::assign("x", Expr::int(3))],
            vec![Stmt::if_stmt(
                Expr::compare(Expr::name("x"), CompareOp::NotEq, Expr::int(0)),
                vec![Stmt::return_stmt(None)],
                vec![],
            )],
        );
        assert_eq!(module.body[2], expected);
    }

    #[test]
    fn test_forward_declaration_yields_no_statement() {
        let module = read_javascript(indoc! {"
            let x;
            if (c) {
                x = 1;
            } else {
                x = 2;
            }
            console.log(x);
        "})
        .unwrap();
        assert_eq!(
            module.body,
            vec![
                Stmt::if_stmt(
                    Expr::name("c"),
                    vec![Stmt::assign("x", Expr::int(1))],
                    vec![Stmt::assign("x", Expr::int(2))],
                ),
                Stmt::print(Expr::name("x")),
            ]
        );
    }

    #[test]
    fn test_class_with_field_and_method() {
        let module = read_javascript(indoc! {"
            class Dog extends Animal {
                legs = 4;
                bark(times) {
                    console.log('woof');
                }
            }
        "})
        .unwrap();
        let Stmt::ClassDef(class) = &module.body[0] else {
            panic!("expected class");
        };
        assert_eq!(class.name, "Dog");
        assert_eq!(class.bases, vec![Expr::name("Animal")]);
        assert_eq!(class.body[0], Stmt::assign("legs", Expr::int(4)));
        assert!(matches!(&class.body[1], Stmt::FunctionDef(f) if f.name == "bark"));
    }

    #[test]
    fn test_unsupported_constructs_degrade() {
        let module = read_javascript("for (;;) {}\nlet f = () => 1;").unwrap();
        assert!(matches!(&module.body[0], Stmt::Unknown { .. }));
        assert!(matches!(
            &module.body[1],
            Stmt::Assign(Assign { value: Expr::Unknown { .. }, .. })
        ));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            read_javascript(&sentinel("javascript")),
            Err(ReadError::Sentinel { .. })
        ));
        assert!(matches!(
            read_javascript("function ("),
            Err(ReadError::Parse(_))
        ));
    }
}
