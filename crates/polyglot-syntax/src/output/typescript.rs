//! TypeScript writer.
//!
//! JavaScript surface plus inline annotations, so no metadata comments.

use super::{Dialect, Emitter, MetadataMode, generate_with_metadata, strict_equality};
use crate::ir::*;
use crate::metadata::CodeWithMetadata;
use crate::traits::Writer;
use crate::types::{CanonicalType, TypeDefinition};

/// Static instance of the TypeScript writer for registry.
pub static TYPESCRIPT_WRITER: TypeScriptWriter = TypeScriptWriter;

/// Emits the AST as TypeScript source code.
pub struct TypeScriptWriter;

impl TypeScriptWriter {
    /// Emit a module to TypeScript source.
    pub fn emit(module: &Module) -> String {
        Emitter::emit_module(&TypeScriptWriter, module, MetadataMode::Inline)
    }
}

impl Writer for TypeScriptWriter {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn extension(&self) -> &'static str {
        "ts"
    }

    fn write(&self, module: &Module) -> String {
        Self::emit(module)
    }

    fn write_with_metadata(&self, module: &Module) -> CodeWithMetadata {
        generate_with_metadata(self, module)
    }
}

/// Annotation text for a simple type, if it is known.
fn annotation(ty: CanonicalType) -> Option<&'static str> {
    ty.is_known().then(|| ty.as_str())
}

/// Annotation for the value side of an untyped assignment.
fn value_annotation(value: &Expr) -> Option<String> {
    match value {
        Expr::List { element_type, .. } if element_type.is_known() => {
            Some(TypeDefinition::array(*element_type).spelling())
        }
        Expr::Tuple { element_types, .. } if !element_types.is_empty() => {
            Some(TypeDefinition::Tuple(element_types.clone()).spelling())
        }
        _ => None,
    }
}

impl Dialect for TypeScriptWriter {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn function_name<'n>(&self, name: &'n str) -> &'n str {
        match name {
            "print" => "console.log",
            other => other,
        }
    }

    fn compare_op(&self, op: CompareOp) -> &'static str {
        strict_equality(op)
    }

    fn variable_annotation(&self, assign: &Assign) -> Option<String> {
        annotation(assign.variable_type)
            .map(str::to_string)
            .or_else(|| value_annotation(&assign.value))
    }

    fn function_header(&self, func: &FunctionDef, in_class: bool) -> String {
        let params: Vec<String> = func
            .args
            .iter()
            .map(|arg| match annotation(func.param_type(&arg.id)) {
                Some(ty) => format!("{}: {}", arg.id, ty),
                None => arg.id.clone(),
            })
            .collect();

        let mut header = if in_class {
            format!("{}({})", func.name, params.join(", "))
        } else {
            format!("function {}({})", func.name, params.join(", "))
        };
        if let Some(ty) = annotation(func.return_type) {
            header.push_str(": ");
            header.push_str(ty);
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_declaration() {
        let module = Module::new(vec![Stmt::Assign(
            Assign::new("x", Expr::int(42)).typed(CanonicalType::Number),
        )]);
        assert_eq!(TypeScriptWriter::emit(&module), "let x: number = 42;");
    }

    #[test]
    fn test_typed_function() {
        let mut func = FunctionDef::new(
            "greet",
            vec![Name::param("name"), Name::param("times")],
            vec![Stmt::print(Expr::name("name"))],
        );
        func.return_type = CanonicalType::Void;
        func.param_types.insert("name".into(), CanonicalType::String);
        assert_eq!(
            TypeScriptWriter::emit(&Module::new(vec![Stmt::FunctionDef(func)])),
            "function greet(name: string, times): void {\n    console.log(name);\n}"
        );
    }

    #[test]
    fn test_container_annotations() {
        let module = Module::new(vec![
            Stmt::assign("xs", Expr::list(vec![Expr::int(1), Expr::int(2)])),
            Stmt::assign("p", Expr::tuple(vec![Expr::str("a"), Expr::int(1)])),
            Stmt::assign("mixed", Expr::list(vec![Expr::int(1), Expr::str("a")])),
        ]);
        assert_eq!(
            TypeScriptWriter::emit(&module),
            "let xs: number[] = [1, 2];\nlet p: [string, number] = ['a', 1];\nlet mixed = [1, 'a'];"
        );
    }

    #[test]
    fn test_no_metadata_comments() {
        let mut func = FunctionDef::new("f", vec![], vec![]);
        func.return_type = CanonicalType::Number;
        let out = TypeScriptWriter::emit(&Module::new(vec![Stmt::FunctionDef(func)]));
        assert!(!out.contains("__META__"));
    }

    #[test]
    fn test_hoisted_declaration_keeps_annotation() {
        let module = Module::new(vec![
            Stmt::if_stmt(
                Expr::name("c"),
                vec![Stmt::Assign(Assign::new("x", Expr::int(1)).typed(CanonicalType::Number))],
                vec![Stmt::assign("x", Expr::int(2))],
            ),
            Stmt::print(Expr::name("x")),
        ]);
        assert_eq!(
            TypeScriptWriter::emit(&module),
            "let x: number;\nif (c) {\n    x = 1;\n} else {\n    x = 2;\n}\nconsole.log(x);"
        );
    }

    #[test]
    fn test_single_element_tuple_annotation() {
        let module = Module::new(vec![Stmt::assign("p", Expr::tuple(vec![Expr::str("a")]))]);
        assert_eq!(TypeScriptWriter::emit(&module), "let p: [string] = ['a'];");
    }
}
