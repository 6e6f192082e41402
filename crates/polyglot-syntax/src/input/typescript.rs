//! Tree-sitter based TypeScript reader.
//!
//! Shares the JavaScript walker; annotations on variables, parameters and
//! return types are folded into the canonical types.

use super::ecma::build_typescript;
use super::{Grammar, MetadataSource, read_source};
use crate::ir::Module;
use crate::metadata::LanguageMetadata;
use crate::traits::{ReadError, Reader};

/// Static instance of the TypeScript reader for registry.
pub static TYPESCRIPT_READER: TypeScriptReader = TypeScriptReader;

/// TypeScript reader using tree-sitter.
pub struct TypeScriptReader;

const GRAMMAR: Grammar = Grammar {
    language: "typescript",
    comment_prefix: "//",
    load: language,
    prepare: None,
};

fn language() -> tree_sitter::Language {
    arborium_typescript::language().into()
}

impl Reader for TypeScriptReader {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ts"]
    }

    fn read(&self, source: &str) -> Result<Module, ReadError> {
        read_typescript(source)
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
            build_typescript,
        )
    }
}

/// Parse TypeScript source into the AST.
pub fn read_typescript(source: &str) -> Result<Module, ReadError> {
    read_source(&GRAMMAR, source, MetadataSource::Comments, build_typescript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;
    use crate::types::CanonicalType;

    #[test]
    fn test_typed_declaration() {
        let module = read_typescript("let x: number = 42;").unwrap();
        assert_eq!(
            module.body,
            vec![Stmt::Assign(
                Assign::new("x", Expr::int(42)).typed(CanonicalType::Number)
            )]
        );
    }

    #[test]
    fn test_typed_function() {
        let module =
            read_typescript("function greet(name: string, times): void {\n    console.log(name);\n}")
                .unwrap();
        let Stmt::FunctionDef(func) = &module.body[0] else {
            panic!("expected function");
        };
        assert_eq!(func.return_type, CanonicalType::Void);
        assert_eq!(func.param_type("name"), CanonicalType::String);
        assert_eq!(func.param_type("times"), CanonicalType::Unknown);
    }

    #[test]
    fn test_container_annotations() {
        let module =
            read_typescript("let xs: number[] = [];\nlet p: [string, number] = ['a', 1];").unwrap();
        assert!(matches!(
            &module.body[0],
            Stmt::Assign(Assign {
                value: Expr::List { element_type: CanonicalType::Number, homogeneous: true, .. },
                ..
            })
        ));
        assert!(matches!(
            &module.body[1],
            Stmt::Assign(Assign { value: Expr::Tuple { elements, .. }, .. }) if elements.len() == 2
        ));
    }

    #[test]
    fn test_forward_declaration_types_first_assignment() {
        let module = read_typescript(
            "let x: number;\nif (c) {\n    x = 1;\n} else {\n    x = 2;\n}\nlet p: [string] = ['a'];",
        )
        .unwrap();
        assert_eq!(
            module.body[0],
            Stmt::if_stmt(
                Expr::name("c"),
                vec![Stmt::Assign(Assign::new("x", Expr::int(1)).typed(CanonicalType::Number))],
                vec![Stmt::assign("x", Expr::int(2))],
            )
        );
        assert!(matches!(
            &module.body[1],
            Stmt::Assign(Assign { value: Expr::Tuple { element_types, .. }, .. })
                if element_types == &[CanonicalType::String]
        ));
    }

    #[test]
    fn test_class_extends_clause() {
        let module = read_typescript(
            "class Dog extends Animal {\n    legs: number = 4;\n    bark(): void {\n    }\n}",
        )
        .unwrap();
        let Stmt::ClassDef(class) = &module.body[0] else {
            panic!("expected class");
        };
        assert_eq!(class.bases, vec![Expr::name("Animal")]);
        assert_eq!(
            class.body[0],
            Stmt::Assign(Assign::new("legs", Expr::int(4)).typed(CanonicalType::Number))
        );
        assert!(matches!(
            &class.body[1],
            Stmt::FunctionDef(f) if f.return_type == CanonicalType::Void
        ));
    }
}
