//! Convention rules and their dispatcher.
//!
//! Each rule is an independent function of a [`RuleContext`]:
//!
//! ```text
//! RuleContext {directory, file_path, content}
//!        |
//!        v
//!   SourceUnit (parsed per invocation)  +  ResolverCache (per run)
//!        |
//!        v
//!   RuleOutcome: Pass | Fail(Diagnostic) | NotApplicable
//! ```
//!
//! Rules never depend on each other and may run in any order. The
//! [`Runner`] decides which rules apply to which files.

mod context;
mod dispatch;
mod exports;
mod naming;
mod params;
mod portal;
pub mod registry;
mod returns;
mod test_imports;
mod types;

pub use context::{excerpt, ResolverCache, RuleContext};
pub use dispatch::Runner;
pub use exports::{check_default_export_function, check_single_function_export};
pub use naming::check_file_naming;
pub use params::{check_args_parameter, check_portal_parameter};
pub use portal::check_portal_database;
pub use registry::{RuleEntry, RuleFn};
pub use returns::check_return_type;
pub use test_imports::check_test_imports_testing_db;
pub use types::{
    Diagnostic, DispatchResult, FileDiagnostic, FileRole, RuleError, RuleName, RuleOutcome,
};
