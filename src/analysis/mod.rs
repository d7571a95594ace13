//! Syntactic extraction layer.
//!
//! Parses a single TypeScript file with tree-sitter and answers the
//! questions the convention rules ask about it:
//! - the shape of the default export (function-like or not, parameters,
//!   return type text)
//! - named function exports besides the default one
//! - the property shape of a type alias (brace-depth scan over raw text)
//! - exported variables and imports
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌───────────────┐
//! │ file text   │────▶│ SourceUnit │────▶│ facts         │────▶ rules
//! └─────────────┘     │ (tree)     │     │ (DefaultExport│
//!                     └────────────┘     │  TypeAlias...)│
//!                                        └───────────────┘
//! ```

mod alias;
pub mod balanced;
mod facts;
mod source;
mod typescript;

pub use alias::{get_type_alias_shape, type_alias_shape};
pub use facts::{
    AliasProperty, DefaultExport, FunctionSignature, ImportDecl, NonFunctionKind, Parameter,
    TypeAliasShape,
};
pub use source::{Dialect, ParseFailure, SourceUnit};
pub use typescript::{
    get_default_export, list_exported_variables, list_imports, list_named_function_exports,
};
