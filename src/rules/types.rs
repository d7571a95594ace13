//! Core types for rule results.

use std::path::{Component, Path, PathBuf};

use phf::phf_map;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Conventions;
use crate::resolve::ResolveError;
use crate::suppress::SuppressedDiagnostic;

/// Rule names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleName {
    #[serde(rename = "file_naming")]
    FileNaming,
    #[serde(rename = "default_export_function")]
    DefaultExportFunction,
    #[serde(rename = "single_function_export")]
    SingleFunctionExport,
    #[serde(rename = "portal_parameter")]
    PortalParameter,
    #[serde(rename = "args_parameter")]
    ArgsParameter,
    #[serde(rename = "return_type")]
    ReturnType,
    #[serde(rename = "portal_database")]
    PortalDatabase,
    #[serde(rename = "test_imports_testing_db")]
    TestImportsTestingDb,
}

static RULE_NAMES: phf::Map<&'static str, RuleName> = phf_map! {
    "file_naming" => RuleName::FileNaming,
    "default_export_function" => RuleName::DefaultExportFunction,
    "single_function_export" => RuleName::SingleFunctionExport,
    "portal_parameter" => RuleName::PortalParameter,
    "args_parameter" => RuleName::ArgsParameter,
    "return_type" => RuleName::ReturnType,
    "portal_database" => RuleName::PortalDatabase,
    "test_imports_testing_db" => RuleName::TestImportsTestingDb,
};

impl RuleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::FileNaming => "file_naming",
            RuleName::DefaultExportFunction => "default_export_function",
            RuleName::SingleFunctionExport => "single_function_export",
            RuleName::PortalParameter => "portal_parameter",
            RuleName::ArgsParameter => "args_parameter",
            RuleName::ReturnType => "return_type",
            RuleName::PortalDatabase => "portal_database",
            RuleName::TestImportsTestingDb => "test_imports_testing_db",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        RULE_NAMES.get(s).copied()
    }
}

impl std::fmt::Display for RuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single human-readable violation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub error: String,
}

/// Result of one rule on one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Pass,
    Fail(Diagnostic),
    /// A precondition for the rule did not hold (wrong file class, missing
    /// sibling, unparsable file, ...).
    NotApplicable,
}

impl RuleOutcome {
    /// Collapse to the two-valued interface: a diagnostic or nothing.
    pub fn into_diagnostic(self) -> Option<Diagnostic> {
        match self {
            RuleOutcome::Fail(d) => Some(d),
            RuleOutcome::Pass | RuleOutcome::NotApplicable => None,
        }
    }
}

/// Exceptional failures while evaluating a rule. Callers log and skip.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("invalid tree-sitter query: {0}")]
    Query(#[from] tree_sitter::QueryError),
    #[error("database catalog unavailable: {0}")]
    Catalog(String),
    #[error(
        "resolver cache holds the catalog of {}, not {}",
        .cached.display(),
        .requested.display()
    )]
    CacheRoot { cached: PathBuf, requested: PathBuf },
}

/// Role of a file within the project layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// Implementation file under the function area.
    Function,
    /// Test file under the function area.
    Test,
    Other,
}

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

impl FileRole {
    /// Classify `path` relative to the project `directory`.
    pub fn classify(directory: &Path, path: &Path, conventions: &Conventions) -> Self {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !SOURCE_EXTENSIONS.contains(&ext) || file_name.ends_with(".d.ts") {
            return FileRole::Other;
        }

        let relative = path.strip_prefix(directory).unwrap_or(path);
        let in_function_area = relative.parent().map_or(false, |dir| {
            let wanted: Vec<&str> = conventions
                .function_dir
                .split('/')
                .filter(|s| !s.is_empty())
                .collect();
            let segments: Vec<&str> = dir
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => s.to_str(),
                    _ => None,
                })
                .collect();
            !wanted.is_empty() && segments.windows(wanted.len()).any(|w| w == wanted.as_slice())
        });

        if !in_function_area {
            return FileRole::Other;
        }

        let stem = file_name.rsplit_once('.').map(|(s, _)| s).unwrap_or(file_name);
        if stem.ends_with(conventions.test_suffix.as_str()) {
            FileRole::Test
        } else {
            FileRole::Function
        }
    }
}

/// A diagnostic attributed to a rule and file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiagnostic {
    pub rule: RuleName,
    pub file: String,
    pub error: String,
}

/// Results of dispatching rules over a set of files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchResult {
    pub diagnostics: Vec<FileDiagnostic>,
    /// Diagnostics silenced by inline directives
    #[serde(default)]
    pub suppressed: Vec<SuppressedDiagnostic>,
    /// Number of files scanned
    pub scanned: usize,
    /// Rule evaluations abandoned because of an exceptional error
    #[serde(default)]
    pub skipped: usize,
}

impl DispatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: DispatchResult) {
        self.diagnostics.extend(other.diagnostics);
        self.suppressed.extend(other.suppressed);
        self.scanned += other.scanned;
        self.skipped += other.skipped;
    }

    pub fn has_violations(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Sort diagnostics by file then rule so output is independent of
    /// evaluation order.
    pub fn sort(&mut self) {
        self.diagnostics
            .sort_by(|a, b| (&a.file, a.rule, &a.error).cmp(&(&b.file, b.rule, &b.error)));
        self.suppressed.sort_by(|a, b| {
            (&a.diagnostic.file, a.diagnostic.rule).cmp(&(&b.diagnostic.file, b.diagnostic.rule))
        });
    }
}
