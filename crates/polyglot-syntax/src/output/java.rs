//! Java writer.
//!
//! Top-level functions become `public static` methods and declarations
//! carry Java types, so no metadata comments are needed.

use super::{Dialect, Emitter, MetadataMode, generate_with_metadata, quote};
use crate::ir::*;
use crate::metadata::CodeWithMetadata;
use crate::traits::Writer;
use crate::types::CanonicalType;

/// Static instance of the Java writer for registry.
pub static JAVA_WRITER: JavaWriter = JavaWriter;

/// Emits the AST as Java source code.
pub struct JavaWriter;

impl JavaWriter {
    /// Emit a module to Java source.
    pub fn emit(module: &Module) -> String {
        Emitter::emit_module(&JavaWriter, module, MetadataMode::Inline)
    }
}

impl Writer for JavaWriter {
    fn language(&self) -> &'static str {
        "java"
    }

    fn extension(&self) -> &'static str {
        "java"
    }

    fn write(&self, module: &Module) -> String {
        Self::emit(module)
    }

    fn write_with_metadata(&self, module: &Module) -> CodeWithMetadata {
        generate_with_metadata(self, module)
    }
}

/// Java spelling of a canonical type; `Object` when nothing is known.
fn java_type(ty: CanonicalType) -> &'static str {
    match ty {
        CanonicalType::String => "String",
        CanonicalType::Number => "double",
        CanonicalType::Boolean => "boolean",
        CanonicalType::Void => "void",
        CanonicalType::Any | CanonicalType::Unknown => "Object",
    }
}

/// Declared type for a variable or field.
fn declared_type(assign: &Assign, in_class: bool) -> String {
    match (&assign.value, assign.variable_type) {
        (
            Expr::Constant(Constant {
                value: Literal::Int(_),
                ..
            }),
            CanonicalType::Number,
        ) => "int".to_string(),
        (Expr::List { element_type, .. }, CanonicalType::Unknown) => {
            format!("{}[]", java_type(*element_type))
        }
        (Expr::Tuple { .. }, CanonicalType::Unknown) => "Object[]".to_string(),
        (_, CanonicalType::Unknown) if !in_class => "var".to_string(),
        (_, ty) => java_type(ty).to_string(),
    }
}

impl Dialect for JavaWriter {
    fn language(&self) -> &'static str {
        "java"
    }

    fn quote_string(&self, value: &str) -> String {
        quote(value, '"')
    }

    fn function_name<'n>(&self, name: &'n str) -> &'n str {
        match name {
            "print" => "System.out.println",
            other => other,
        }
    }

    fn declaration_keyword(&self, assign: &Assign, in_class: bool) -> Option<String> {
        Some(declared_type(assign, in_class))
    }

    /// `var` needs an initializer, so a forward declaration spells its type.
    fn hoisted_declaration(&self, assign: &Assign) -> Option<String> {
        Some(format!("{} {};", declared_type(assign, true), assign.target.id))
    }

    fn function_header(&self, func: &FunctionDef, in_class: bool) -> String {
        let params: Vec<String> = func
            .args
            .iter()
            .map(|arg| format!("{} {}", java_type(func.param_type(&arg.id)), arg.id))
            .collect();
        let modifiers = if in_class { "public" } else { "public static" };
        format!(
            "{} {} {}({})",
            modifiers,
            java_type(func.return_type),
            func.name,
            params.join(", ")
        )
    }

    fn write_list(&self, e: &mut Emitter<'_>, elements: &[Expr], element_type: CanonicalType) {
        e.push("new ");
        e.push(java_type(element_type));
        e.push("[]{");
        e.write_args(elements);
        e.push("}");
    }

    fn write_tuple(&self, e: &mut Emitter<'_>, elements: &[Expr]) {
        e.push("new Object[]{");
        e.write_args(elements);
        e.push("}");
    }
}
