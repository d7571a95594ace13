//! Fact structures extracted from a TypeScript source unit.

use std::fmt;

/// A single parameter of a function-like declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// The binding name, or the verbatim pattern for destructured parameters.
    pub name: String,
    /// The type annotation text without the leading colon, as written.
    pub type_text: Option<String>,
    /// Verbatim source text of the whole parameter.
    pub text: String,
}

impl Parameter {
    /// Whether the annotation text contains `marker`.
    pub fn type_contains(&self, marker: &str) -> bool {
        self.type_text
            .as_deref()
            .map(|t| t.contains(marker))
            .unwrap_or(false)
    }
}

/// Signature of a function-like default export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Declared name, or the identifier the default export resolved through.
    pub name: Option<String>,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Return type annotation text without the leading colon.
    pub return_type: Option<String>,
}

impl FunctionSignature {
    pub fn parameter(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index)
    }
}

/// Classification of a default export that is not a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonFunctionKind {
    ObjectLiteral,
    Class,
    Literal,
    /// An identifier that does not resolve to a local function.
    Identifier(String),
    /// Any other expression (calls, arrays, member access, ...).
    Other,
}

impl NonFunctionKind {
    /// Human readable classification used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            NonFunctionKind::ObjectLiteral => "an object literal".to_string(),
            NonFunctionKind::Class => "a class".to_string(),
            NonFunctionKind::Literal => "a literal value".to_string(),
            NonFunctionKind::Identifier(name) => {
                format!("identifier `{}` that does not resolve to a function", name)
            }
            NonFunctionKind::Other => "an expression that is not a function".to_string(),
        }
    }
}

impl fmt::Display for NonFunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Facts about a file's default export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultExport {
    FunctionLike(FunctionSignature),
    NonFunction {
        kind: NonFunctionKind,
        /// Verbatim text of the export statement.
        text: String,
    },
    /// The file has no `export default`.
    Missing,
}

impl DefaultExport {
    pub fn as_function(&self) -> Option<&FunctionSignature> {
        match self {
            DefaultExport::FunctionLike(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        self.as_function().is_some()
    }
}

/// One property of a type alias object body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasProperty {
    pub name: String,
    /// Annotation text exactly as written, trimmed.
    pub type_text: String,
    pub optional: bool,
}

/// Property shape of a `type Name = { ... }` alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAliasShape {
    pub name: String,
    pub properties: Vec<AliasProperty>,
}

impl TypeAliasShape {
    pub fn property(&self, name: &str) -> Option<&AliasProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }
}

/// An `import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Module specifier without quotes.
    pub source: String,
    /// Imported binding names (the exported side of `a as b`), default and
    /// namespace bindings included.
    pub names: Vec<String>,
}

impl ImportDecl {
    pub fn imports(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_type_contains() {
        let param = Parameter {
            name: "portal".to_string(),
            type_text: Some("TPortal".to_string()),
            text: "portal: TPortal".to_string(),
        };
        assert!(param.type_contains("Portal"));
        assert!(!param.type_contains("TArgs"));

        let untyped = Parameter {
            name: "x".to_string(),
            type_text: None,
            text: "x".to_string(),
        };
        assert!(!untyped.type_contains(""));
    }

    #[test]
    fn test_non_function_descriptions() {
        assert_eq!(NonFunctionKind::ObjectLiteral.describe(), "an object literal");
        assert!(NonFunctionKind::Identifier("config".to_string())
            .describe()
            .contains("`config`"));
    }
}
