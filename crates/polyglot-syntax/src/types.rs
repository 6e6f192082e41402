//! Canonical type vocabulary shared by every surface language.
//!
//! Surface annotations are folded into [`CanonicalType`] (simple types) or
//! [`TypeDefinition`] (tuples, arrays, nominal names). Both conversions are
//! total: unrecognized spellings become `Unknown` or `Custom`, never errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of semantic types a declared annotation can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CanonicalType {
    String,
    Number,
    Boolean,
    Void,
    Any,
    #[default]
    Unknown,
}

impl CanonicalType {
    /// Canonical lowercase spelling, as used in metadata records.
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalType::String => "string",
            CanonicalType::Number => "number",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Void => "void",
            CanonicalType::Any => "any",
            CanonicalType::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != CanonicalType::Unknown
    }
}

/// Map a type spelling onto the canonical vocabulary (case-insensitive).
pub fn canonicalize(spelling: &str) -> CanonicalType {
    match spelling.trim().to_ascii_lowercase().as_str() {
        "string" => CanonicalType::String,
        "number" | "int" | "integer" | "float" | "double" => CanonicalType::Number,
        "boolean" | "bool" => CanonicalType::Boolean,
        "void" => CanonicalType::Void,
        "any" => CanonicalType::Any,
        _ => CanonicalType::Unknown,
    }
}

impl From<&str> for CanonicalType {
    fn from(spelling: &str) -> Self {
        canonicalize(spelling)
    }
}

impl From<String> for CanonicalType {
    fn from(spelling: String) -> Self {
        canonicalize(&spelling)
    }
}

impl From<CanonicalType> for String {
    fn from(ty: CanonicalType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite type layer over [`CanonicalType`].
///
/// Serialized as its textual spelling (`number`, `string[]`,
/// `[string, number]`, `Point`) so it can travel in metadata records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeDefinition {
    Simple(CanonicalType),
    /// Positional element types.
    Tuple(Vec<CanonicalType>),
    Array {
        element: CanonicalType,
        homogeneous: bool,
    },
    /// Nominal (class) type name.
    Custom(String),
    #[default]
    Unknown,
}

impl TypeDefinition {
    /// Parse a type spelling.
    ///
    /// `[T1, T2]` is a tuple, as is `[T]` for a canonical `T`. `T[]` is an
    /// array, a canonical spelling a simple type, and anything else
    /// non-empty a custom name.
    pub fn parse(spelling: &str) -> Self {
        let s = spelling.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("unknown") {
            return TypeDefinition::Unknown;
        }

        if let Some(inner) = s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            if inner.contains(',') {
                return TypeDefinition::Tuple(inner.split(',').map(canonicalize).collect());
            }
            let single = canonicalize(inner);
            if single != CanonicalType::Unknown {
                return TypeDefinition::Tuple(vec![single]);
            }
        }

        if let Some(element) = s.strip_suffix("[]") {
            return TypeDefinition::array(canonicalize(element));
        }

        match canonicalize(s) {
            CanonicalType::Unknown => TypeDefinition::Custom(s.to_string()),
            ty => TypeDefinition::Simple(ty),
        }
    }

    /// Array of `element`; homogeneous unless the element type is open.
    pub fn array(element: CanonicalType) -> Self {
        TypeDefinition::Array {
            element,
            homogeneous: !matches!(element, CanonicalType::Any | CanonicalType::Unknown),
        }
    }

    /// The simple type this definition denotes, or `Unknown` for composites.
    pub fn canonical(&self) -> CanonicalType {
        match self {
            TypeDefinition::Simple(ty) => *ty,
            _ => CanonicalType::Unknown,
        }
    }

    pub fn spelling(&self) -> String {
        match self {
            TypeDefinition::Simple(ty) => ty.as_str().to_string(),
            TypeDefinition::Tuple(items) => {
                let parts: Vec<&str> = items.iter().map(|t| t.as_str()).collect();
                format!("[{}]", parts.join(", "))
            }
            TypeDefinition::Array { element, .. } => format!("{}[]", element.as_str()),
            TypeDefinition::Custom(name) => name.clone(),
            TypeDefinition::Unknown => "unknown".to_string(),
        }
    }
}

impl From<String> for TypeDefinition {
    fn from(spelling: String) -> Self {
        TypeDefinition::parse(&spelling)
    }
}

impl From<TypeDefinition> for String {
    fn from(def: TypeDefinition) -> Self {
        def.spelling()
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_aliases() {
        assert_eq!(canonicalize("int"), CanonicalType::Number);
        assert_eq!(canonicalize("Integer"), CanonicalType::Number);
        assert_eq!(canonicalize("DOUBLE"), CanonicalType::Number);
        assert_eq!(canonicalize("float"), CanonicalType::Number);
        assert_eq!(canonicalize("bool"), CanonicalType::Boolean);
        assert_eq!(canonicalize("String"), CanonicalType::String);
        assert_eq!(canonicalize(" void "), CanonicalType::Void);
        assert_eq!(canonicalize("any"), CanonicalType::Any);
    }

    #[test]
    fn test_canonicalize_unknown_never_fails() {
        assert_eq!(canonicalize(""), CanonicalType::Unknown);
        assert_eq!(canonicalize("Map<string, int>"), CanonicalType::Unknown);
        assert_eq!(canonicalize("str"), CanonicalType::Unknown);
    }

    #[test]
    fn test_parse_tuple() {
        assert_eq!(
            TypeDefinition::parse("[string, number]"),
            TypeDefinition::Tuple(vec![CanonicalType::String, CanonicalType::Number])
        );
    }

    #[test]
    fn test_parse_single_element_tuple() {
        assert_eq!(
            TypeDefinition::parse("[string]"),
            TypeDefinition::Tuple(vec![CanonicalType::String])
        );
        assert_eq!(TypeDefinition::Tuple(vec![CanonicalType::Number]).spelling(), "[number]");
        // Not a canonical element: stays a custom name.
        assert_eq!(
            TypeDefinition::parse("[Point]"),
            TypeDefinition::Custom("[Point]".into())
        );
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(
            TypeDefinition::parse("number[]"),
            TypeDefinition::Array {
                element: CanonicalType::Number,
                homogeneous: true
            }
        );
        assert_eq!(
            TypeDefinition::parse("any[]"),
            TypeDefinition::Array {
                element: CanonicalType::Any,
                homogeneous: false
            }
        );
    }

    #[test]
    fn test_tuple_shape_wins_over_array_suffix() {
        // Bracketed and comma-bearing: tuple, even though it ends in `]`.
        assert!(matches!(
            TypeDefinition::parse("[number, string]"),
            TypeDefinition::Tuple(_)
        ));
        // No comma: the tuple pattern fails, array suffix is tried.
        assert!(matches!(
            TypeDefinition::parse("string[]"),
            TypeDefinition::Array { .. }
        ));
    }

    #[test]
    fn test_parse_simple_custom_unknown() {
        assert_eq!(
            TypeDefinition::parse("bool"),
            TypeDefinition::Simple(CanonicalType::Boolean)
        );
        assert_eq!(
            TypeDefinition::parse("Point"),
            TypeDefinition::Custom("Point".into())
        );
        assert_eq!(TypeDefinition::parse("  "), TypeDefinition::Unknown);
    }

    #[test]
    fn test_spelling_reparses() {
        for spelling in ["number", "[string, boolean]", "[string]", "string[]", "Point"] {
            let def = TypeDefinition::parse(spelling);
            assert_eq!(TypeDefinition::parse(&def.spelling()), def);
        }
    }

    #[test]
    fn test_serde_uses_spelling() {
        let json = serde_json::to_string(&CanonicalType::Number).unwrap();
        assert_eq!(json, "\"number\"");
        let ty: CanonicalType = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(ty, CanonicalType::Unknown);
    }
}
