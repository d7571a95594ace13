//! Rule invocation context.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::debug;

use super::{Diagnostic, FileRole, RuleError, RuleName};
use crate::analysis::SourceUnit;
use crate::config::{Conventions, PrefixConvention};
use crate::resolve::{find_database_variables, DatabaseCatalog, ResolveError};

/// Longest verbatim excerpt quoted in a diagnostic.
const MAX_EXCERPT: usize = 160;

/// Per-run cache for project-wide resolver results.
///
/// The catalog is built at most once per cache and is read-only afterwards.
/// A cache belongs to the first project root it is asked about. Create a new
/// cache for each analysis run so changed files are picked up.
#[derive(Debug, Default)]
pub struct ResolverCache {
    catalog: OnceCell<(PathBuf, Result<DatabaseCatalog, ResolveError>)>,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Database catalog for `directory`, built on first use.
    pub fn catalog(
        &self,
        directory: &Path,
        conventions: &Conventions,
    ) -> Result<&DatabaseCatalog, RuleError> {
        let (root, built) = self.catalog.get_or_init(|| {
            (
                directory.to_path_buf(),
                find_database_variables(directory, conventions),
            )
        });
        if root != directory {
            return Err(RuleError::CacheRoot {
                cached: root.clone(),
                requested: directory.to_path_buf(),
            });
        }
        match built {
            Ok(catalog) => Ok(catalog),
            Err(e) => Err(RuleError::Catalog(e.to_string())),
        }
    }
}

/// Inputs of one rule invocation: `{directory, file_path, content}` plus the
/// conventions and the run's resolver cache.
pub struct RuleContext<'a> {
    pub directory: &'a Path,
    pub file_path: &'a Path,
    pub content: &'a str,
    pub conventions: &'a Conventions,
    cache: &'a ResolverCache,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        directory: &'a Path,
        file_path: &'a Path,
        content: &'a str,
        conventions: &'a Conventions,
        cache: &'a ResolverCache,
    ) -> Self {
        Self {
            directory,
            file_path,
            content,
            conventions,
            cache,
        }
    }

    pub fn role(&self) -> FileRole {
        FileRole::classify(self.directory, self.file_path, self.conventions)
    }

    pub fn base_name(&self) -> &str {
        self.file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// Naming class selected by the file name, if any.
    pub fn naming_class(&self) -> Option<&'a PrefixConvention> {
        let name = self.file_path.file_name().and_then(|n| n.to_str())?;
        self.conventions.naming_class(name)
    }

    /// Parse the file. A parse failure makes the calling rule inapplicable.
    pub fn parse(&self) -> Option<SourceUnit> {
        match SourceUnit::parse(self.file_path, self.content) {
            Ok(unit) => Some(unit),
            Err(e) => {
                debug!(file = %self.file_path.display(), error = %e, "rule inapplicable: parse failure");
                None
            }
        }
    }

    pub fn catalog(&self) -> Result<&'a DatabaseCatalog, RuleError> {
        self.cache.catalog(self.directory, self.conventions)
    }

    /// Build a one-line diagnostic ending in the rule's documentation link.
    pub fn diagnostic(&self, rule: RuleName, message: impl AsRef<str>) -> Diagnostic {
        Diagnostic {
            error: format!(
                "{}: {}. See {}",
                self.base_name(),
                message.as_ref().trim_end_matches('.'),
                self.conventions.doc_link(rule)
            ),
        }
    }
}

/// Source text squeezed onto one line and shortened for a message.
pub fn excerpt(text: &str) -> String {
    let squeezed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if squeezed.chars().count() <= MAX_EXCERPT {
        squeezed
    } else {
        let cut: String = squeezed.chars().take(MAX_EXCERPT).collect();
        format!("{}...", cut)
    }
}
