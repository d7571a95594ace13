//! shapecheck - structural convention checks for TypeScript projects.
//!
//! shapecheck inspects each file's syntax, without type-checking, and flags
//! violations of a fixed set of conventions: file naming, export shape,
//! parameter and return type annotations, and cross-file consistency between
//! a function, the database its portal depends on, and its test.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter extraction of syntactic facts
//! - `resolve`: read-only cross-file resolvers (database catalog, siblings)
//! - `rules`: independent rule functions, their registry and dispatcher
//! - `suppress`: inline `shapecheck:ignore-file` directives
//! - `config`: YAML convention configuration
//! - `report`: Output formatting (pretty, JSON)
//!
//! # Checking one file
//!
//! ```no_run
//! use std::path::Path;
//! use shapecheck::{Conventions, ResolverCache, RuleContext, check_file_naming};
//!
//! let conventions = Conventions::default();
//! let cache = ResolverCache::new();
//! let ctx = RuleContext::new(
//!     Path::new("/project"),
//!     Path::new("/project/src/functions/getUsers.ts"),
//!     "export default () => [];",
//!     &conventions,
//!     &cache,
//! );
//! if let Some(diagnostic) = check_file_naming(&ctx).unwrap().into_diagnostic() {
//!     eprintln!("{}", diagnostic.error);
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod report;
pub mod resolve;
pub mod rules;
pub mod suppress;

pub use analysis::{DefaultExport, FunctionSignature, ParseFailure, SourceUnit, TypeAliasShape};
pub use config::Conventions;
pub use resolve::{find_database_variables, DatabaseCatalog};
pub use rules::{
    check_args_parameter, check_default_export_function, check_file_naming,
    check_portal_database, check_portal_parameter, check_return_type,
    check_single_function_export, check_test_imports_testing_db, Diagnostic, DispatchResult,
    FileDiagnostic, ResolverCache, RuleContext, RuleName, RuleOutcome, Runner,
};
