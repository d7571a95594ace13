//! Convention configuration for shapecheck.
//!
//! Every marker and naming vocabulary the rules rely on lives here rather than
//! in rule code, so projects with different names can reuse the engine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::rules::RuleName;

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["shapecheck.yaml", ".shapecheck.yaml"];

/// Starter configuration written by `shapecheck init`.
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/shapecheck.yaml");

/// Errors loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result shape a naming class must return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// Pure function; no result wrapper required.
    Plain,
    /// Effectful, returns a success-or-error pair.
    Tuple,
    /// Effectful, returns success-or-error plus a list of rollback functions.
    TupleWithRollback,
}

impl ResultShape {
    pub fn is_effectful(&self) -> bool {
        !matches!(self, ResultShape::Plain)
    }

    /// Position of the arguments object in the parameter list.
    pub fn args_position(&self) -> usize {
        if self.is_effectful() {
            1
        } else {
            0
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ResultShape::Plain => "pure",
            ResultShape::Tuple => "effectful",
            ResultShape::TupleWithRollback => "effectful with rollback",
        }
    }
}

impl std::fmt::Display for ResultShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultShape::Plain => write!(f, "plain"),
            ResultShape::Tuple => write!(f, "tuple"),
            ResultShape::TupleWithRollback => write!(f, "tuple_with_rollback"),
        }
    }
}

/// A file name prefix and the naming class it selects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrefixConvention {
    pub prefix: String,
    pub result_shape: ResultShape,
}

/// Return type markers per result shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResultMarkers {
    pub tuple: String,
    pub tuple_with_rollback: String,
}

impl Default for ResultMarkers {
    fn default() -> Self {
        Self {
            tuple: "TErrTuple".to_string(),
            tuple_with_rollback: "TErrTriple".to_string(),
        }
    }
}

/// Top-level convention configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Conventions {
    /// Path segment marking the function area (e.g. `src/functions/...`).
    pub function_dir: String,
    /// Literal separator after a naming prefix (`effect.getUsers.ts`).
    pub separator: String,
    pub prefixes: Vec<PrefixConvention>,
    /// Substring the first parameter of an effectful function must carry.
    /// Also the name of the portal type alias.
    pub portal_marker: String,
    /// Substring the arguments parameter must carry.
    pub args_marker: String,
    pub result_markers: ResultMarkers,
    /// Property of the portal alias holding the database handle.
    pub portal_db_property: String,
    /// Directory holding `<name>/conn.<name>.ts` modules.
    pub database_dir: String,
    /// Marker that starts a connection module file name and must appear in
    /// the import path of testing factories.
    pub connection_path_marker: String,
    pub db_suffix: String,
    pub testing_factory_prefix: String,
    /// Suffix before the extension that marks a test file.
    pub test_suffix: String,
    /// Base URL of the rule documentation.
    pub docs_url: String,
    /// Glob patterns for paths to exclude from analysis.
    pub excluded_paths: Vec<String>,
    pub disabled_rules: Vec<String>,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            function_dir: "functions".to_string(),
            separator: ".".to_string(),
            prefixes: vec![
                PrefixConvention {
                    prefix: "pure".to_string(),
                    result_shape: ResultShape::Plain,
                },
                PrefixConvention {
                    prefix: "effect".to_string(),
                    result_shape: ResultShape::Tuple,
                },
                PrefixConvention {
                    prefix: "effectRollback".to_string(),
                    result_shape: ResultShape::TupleWithRollback,
                },
            ],
            portal_marker: "TPortal".to_string(),
            args_marker: "TArgs".to_string(),
            result_markers: ResultMarkers::default(),
            portal_db_property: "db".to_string(),
            database_dir: "database".to_string(),
            connection_path_marker: "conn.".to_string(),
            db_suffix: "Db".to_string(),
            testing_factory_prefix: "createTesting".to_string(),
            test_suffix: ".test".to_string(),
            docs_url: "https://shapecheck.dev/rules".to_string(),
            excluded_paths: Vec::new(),
            disabled_rules: Vec::new(),
        }
    }
}

impl Conventions {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Naming class selected by a file's base name.
    pub fn naming_class(&self, file_name: &str) -> Option<&PrefixConvention> {
        self.prefixes
            .iter()
            .find(|p| file_name.starts_with(&format!("{}{}", p.prefix, self.separator)))
    }

    /// Prefixes with the separator appended, as a file name must start.
    pub fn expected_prefixes(&self) -> Vec<String> {
        self.prefixes
            .iter()
            .map(|p| format!("{}{}", p.prefix, self.separator))
            .collect()
    }

    /// Return type marker for a result shape, `None` for pure functions.
    pub fn result_marker(&self, shape: ResultShape) -> Option<&str> {
        match shape {
            ResultShape::Plain => None,
            ResultShape::Tuple => Some(&self.result_markers.tuple),
            ResultShape::TupleWithRollback => Some(&self.result_markers.tuple_with_rollback),
        }
    }

    /// Testing factory name for a database variable under these conventions.
    pub fn testing_factory_name(&self, variable: &str) -> String {
        crate::resolve::derive_factory_name(variable, &self.testing_factory_prefix, &self.db_suffix)
    }

    /// Link to a rule's documentation.
    pub fn doc_link(&self, rule: RuleName) -> String {
        format!("{}#{}", self.docs_url.trim_end_matches('/'), rule.as_str())
    }

    pub fn is_rule_enabled(&self, rule: RuleName) -> bool {
        !self.disabled_rules.iter().any(|r| r == rule.as_str())
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// Validate a configuration for correctness.
pub fn validate(conventions: &Conventions) -> Result<(), ConfigError> {
    let required = [
        ("function_dir", &conventions.function_dir),
        ("portal_marker", &conventions.portal_marker),
        ("args_marker", &conventions.args_marker),
        ("result_markers.tuple", &conventions.result_markers.tuple),
        (
            "result_markers.tuple_with_rollback",
            &conventions.result_markers.tuple_with_rollback,
        ),
        ("portal_db_property", &conventions.portal_db_property),
        ("database_dir", &conventions.database_dir),
        ("connection_path_marker", &conventions.connection_path_marker),
        ("test_suffix", &conventions.test_suffix),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
        }
    }

    if conventions.prefixes.is_empty() {
        return Err(ConfigError::Invalid(
            "at least one file name prefix is required".to_string(),
        ));
    }

    let expected = conventions.expected_prefixes();
    for (i, prefix) in conventions.prefixes.iter().enumerate() {
        if prefix.prefix.is_empty() {
            return Err(ConfigError::Invalid("prefix must not be empty".to_string()));
        }
        for (j, other) in expected.iter().enumerate() {
            if i != j && other.starts_with(&expected[i]) {
                return Err(ConfigError::Invalid(format!(
                    "prefix {:?} shadows prefix {:?}",
                    expected[i], other
                )));
            }
        }
    }

    for rule in &conventions.disabled_rules {
        if RuleName::parse(rule).is_none() {
            return Err(ConfigError::Invalid(format!("unknown rule {:?} in disabled_rules", rule)));
        }
    }

    for pattern in &conventions.excluded_paths {
        globset::Glob::new(pattern).map_err(|e| {
            ConfigError::Invalid(format!("invalid excluded_paths pattern {:?}: {}", pattern, e))
        })?;
    }

    Ok(())
}
