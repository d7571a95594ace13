//! Dispatcher that runs the applicable rules over a set of files.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::registry::{self, RuleEntry};
use super::{DispatchResult, FileDiagnostic, FileRole, ResolverCache, RuleContext, RuleName};
use crate::config::Conventions;
use crate::suppress::{filter_suppressed, parse_suppressions};

/// Executes the registered rules against files of one project.
pub struct Runner {
    directory: PathBuf,
    conventions: Conventions,
    rules: Vec<&'static RuleEntry>,
}

impl Runner {
    /// Create a runner for the project rooted at `directory`. Rules listed in
    /// `disabled_rules` are left out.
    pub fn new<P: AsRef<Path>>(directory: P, conventions: Conventions) -> Self {
        let rules = registry::all()
            .iter()
            .filter(|r| conventions.is_rule_enabled(r.name))
            .collect();
        Self {
            directory: directory.as_ref().to_path_buf(),
            conventions,
            rules,
        }
    }

    /// Restrict the run to `names`. An empty list keeps the current set.
    pub fn with_rules(mut self, names: &[RuleName]) -> Self {
        if !names.is_empty() {
            self.rules.retain(|r| names.contains(&r.name));
        }
        self
    }

    /// Names of the rules this runner evaluates.
    pub fn rule_names(&self) -> Vec<RuleName> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Run every selected rule over `files`.
    ///
    /// Files are processed in parallel. The database catalog is built at most
    /// once for the whole run. Diagnostics are sorted by file then rule.
    pub fn run(&self, files: &[PathBuf]) -> DispatchResult {
        let cache = ResolverCache::new();

        let mut result = files
            .par_iter()
            .map(|path| match fs::read_to_string(path) {
                Ok(content) => self.evaluate(path, &content, &cache),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable file");
                    DispatchResult {
                        skipped: 1,
                        ..DispatchResult::default()
                    }
                }
            })
            .reduce(DispatchResult::new, |mut acc, r| {
                acc.merge(r);
                acc
            });

        result.sort();
        result
    }

    /// Check a single file whose content is already in memory, as an editor
    /// or pre-commit hook would.
    pub fn check_file(&self, path: &Path, content: &str) -> DispatchResult {
        let cache = ResolverCache::new();
        let mut result = self.evaluate(path, content, &cache);
        result.sort();
        result
    }

    fn evaluate(&self, path: &Path, content: &str, cache: &ResolverCache) -> DispatchResult {
        let mut result = DispatchResult {
            scanned: 1,
            ..DispatchResult::default()
        };

        let role = FileRole::classify(&self.directory, path, &self.conventions);
        if role == FileRole::Other {
            return result;
        }

        let shown = self.display_path(path);
        let ctx = RuleContext::new(&self.directory, path, content, &self.conventions, cache);

        let mut diagnostics = Vec::new();
        for rule in self.rules.iter().filter(|r| r.roles.contains(&role)) {
            match (rule.check)(&ctx) {
                Ok(outcome) => {
                    if let Some(diagnostic) = outcome.into_diagnostic() {
                        diagnostics.push(FileDiagnostic {
                            rule: rule.name,
                            file: shown.clone(),
                            error: diagnostic.error,
                        });
                    }
                }
                Err(e) => {
                    warn!(file = %shown, rule = %rule.name, error = %e, "rule skipped");
                    result.skipped += 1;
                }
            }
        }
        debug!(file = %shown, ?role, count = diagnostics.len(), "checked file");

        let suppressions = parse_suppressions(&shown, content);
        if suppressions.is_empty() {
            result.diagnostics = diagnostics;
        } else {
            let (active, suppressed) = filter_suppressed(diagnostics, &suppressions);
            result.diagnostics = active;
            result.suppressed = suppressed;
        }
        result
    }

    /// Path relative to the project root with forward slashes.
    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.directory)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}
