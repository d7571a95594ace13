//! Discovery of database handle variables.
//!
//! A project declares each database in `database/<name>/conn.<name>.ts`,
//! exporting a handle such as `magicCardsDb`. Tests of functions using that
//! handle import a conventionally named testing factory
//! (`createTestingMagicCardsDb`) from the same module.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::ResolveError;
use crate::analysis::{list_exported_variables, SourceUnit};
use crate::config::Conventions;

/// Source file extensions a connection module may have.
const MODULE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "mjs"];

/// Derive the testing factory name with explicit vocabulary.
///
/// Strips a trailing `suffix`, upper-cases the first letter, then wraps the
/// result in `prefix` and `suffix`. Total: names without the suffix keep
/// their whole body.
pub fn derive_factory_name(variable: &str, prefix: &str, suffix: &str) -> String {
    let body = if suffix.is_empty() {
        variable
    } else {
        variable.strip_suffix(suffix).unwrap_or(variable)
    };
    let mut chars = body.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{}{}{}", prefix, capitalized, suffix)
}

/// `magicCardsDb` -> `createTestingMagicCardsDb`.
pub fn derive_testing_factory_name(variable: &str) -> String {
    derive_factory_name(variable, "createTesting", "Db")
}

/// A discovered database variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub variable: String,
    pub factory: String,
    /// Connection module declaring the variable.
    pub module: PathBuf,
}

/// Known database variables of a project, keyed by variable name.
///
/// Built from scratch for each analysis run and never patched afterwards.
#[derive(Debug, Clone, Default)]
pub struct DatabaseCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl DatabaseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Distinct variables deriving the same factory name are
    /// rejected; re-declaring a known variable keeps the first module.
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<(), ResolveError> {
        if let Some(existing) = self.entries.get(&entry.variable) {
            warn!(
                variable = %entry.variable,
                first = %existing.module.display(),
                second = %entry.module.display(),
                "database variable declared twice, keeping the first module"
            );
            return Ok(());
        }

        if let Some(clash) = self.entries.values().find(|e| e.factory == entry.factory) {
            return Err(ResolveError::FactoryCollision {
                factory: entry.factory,
                first: clash.variable.clone(),
                second: entry.variable,
            });
        }

        self.entries.insert(entry.variable.clone(), entry);
        Ok(())
    }

    pub fn get(&self, variable: &str) -> Option<&CatalogEntry> {
        self.entries.get(variable)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.entries.contains_key(variable)
    }

    /// Variable names in sorted order.
    pub fn variables(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "node_modules"
}

/// Whether `path` is `<database_dir>/<name>/<marker><name>.<ext>`.
fn is_connection_module(path: &Path, conventions: &Conventions) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !MODULE_EXTENSIONS.contains(&ext) {
        return false;
    }

    let file_name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    let parent = match path.parent() {
        Some(p) => p,
        None => return false,
    };
    let name = match parent.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    let grandparent = parent
        .parent()
        .and_then(|g| g.file_name())
        .and_then(|n| n.to_str());

    grandparent == Some(conventions.database_dir.as_str())
        && file_name.starts_with(&format!("{}{}.", conventions.connection_path_marker, name))
}

/// Scan `project_root` for connection modules and catalog the database
/// variables they export.
///
/// A missing root yields an empty catalog. Modules that fail to parse are
/// skipped.
pub fn find_database_variables(
    project_root: &Path,
    conventions: &Conventions,
) -> Result<DatabaseCatalog, ResolveError> {
    let mut catalog = DatabaseCatalog::new();
    if !project_root.is_dir() {
        debug!(root = %project_root.display(), "project root missing, empty database catalog");
        return Ok(catalog);
    }

    let mut modules = Vec::new();
    for entry in WalkDir::new(project_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_connection_module(entry.path(), conventions) {
            modules.push(entry.into_path());
        }
    }

    for module in modules {
        let content = match fs::read_to_string(&module) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(source) => return Err(ResolveError::Io { path: module, source }),
        };

        let unit = match SourceUnit::parse(&module, &content) {
            Ok(u) => u,
            Err(e) => {
                debug!(module = %module.display(), error = %e, "skipping unparsable connection module");
                continue;
            }
        };

        for variable in list_exported_variables(&unit) {
            // Testing factories live next to the handle and share its suffix.
            if !variable.ends_with(&conventions.db_suffix)
                || (!conventions.testing_factory_prefix.is_empty()
                    && variable.starts_with(&conventions.testing_factory_prefix))
            {
                continue;
            }
            let factory = conventions.testing_factory_name(&variable);
            catalog.insert(CatalogEntry {
                variable,
                factory,
                module: module.clone(),
            })?;
        }
    }

    debug!(root = %project_root.display(), count = catalog.len(), "built database catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_derivation_law() {
        assert_eq!(derive_testing_factory_name("magicCardsDb"), "createTestingMagicCardsDb");
        assert_eq!(derive_testing_factory_name("booksDb"), "createTestingBooksDb");
        assert_eq!(
            derive_testing_factory_name("userProfilesDb"),
            "createTestingUserProfilesDb"
        );
    }

    #[test]
    fn test_derivation_is_total() {
        assert_eq!(derive_testing_factory_name("pool"), "createTestingPoolDb");
        assert_eq!(derive_testing_factory_name("Db"), "createTestingDb");
        assert_eq!(derive_testing_factory_name(""), "createTestingDb");
    }

    #[test]
    fn test_derivation_matches_conventions() {
        let conventions = Conventions::default();
        for name in ["magicCardsDb", "booksDb", "x"] {
            assert_eq!(
                conventions.testing_factory_name(name),
                derive_testing_factory_name(name)
            );
        }
    }

    #[test]
    fn test_catalog_rejects_factory_collision() {
        let mut catalog = DatabaseCatalog::new();
        let entry = |variable: &str| CatalogEntry {
            variable: variable.to_string(),
            factory: derive_testing_factory_name(variable),
            module: PathBuf::from("conn.ts"),
        };
        catalog.insert(entry("usersDb")).unwrap();
        catalog.insert(entry("usersDb")).unwrap();
        assert_eq!(catalog.len(), 1);

        match catalog.insert(entry("UsersDb")) {
            Err(ResolveError::FactoryCollision { factory, first, second }) => {
                assert_eq!(factory, "createTestingUsersDb");
                assert_eq!(first, "usersDb");
                assert_eq!(second, "UsersDb");
            }
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn test_find_database_variables() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "src/database/magicCards/conn.magicCards.ts",
            "export const magicCardsDb = connect(\"cards\");\nexport const createTestingMagicCardsDb = () => magicCardsDb;\n",
        );
        write(
            root,
            "src/database/books/conn.books.ts",
            "export const booksDb = connect(\"books\");\nexport const poolSize = 4;\n",
        );
        // Wrong file name for its directory, ignored.
        write(root, "src/database/books/conn.other.ts", "export const otherDb = 1;\n");
        // Not under the database directory, ignored.
        write(root, "src/lib/users/conn.users.ts", "export const usersDb = 1;\n");
        write(
            root,
            "node_modules/pkg/database/x/conn.x.ts",
            "export const xDb = 1;\n",
        );

        let catalog = find_database_variables(root, &Conventions::default()).unwrap();
        assert_eq!(catalog.variables(), vec!["booksDb", "magicCardsDb"]);

        let entry = catalog.get("magicCardsDb").unwrap();
        assert_eq!(entry.factory, "createTestingMagicCardsDb");
        assert!(entry.module.ends_with("database/magicCards/conn.magicCards.ts"));
    }

    #[test]
    fn test_find_database_variables_missing_root() {
        let temp = TempDir::new().unwrap();
        let catalog =
            find_database_variables(&temp.path().join("nope"), &Conventions::default()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_find_database_variables_reports_collision() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "database/cards/conn.cards.ts",
            "export const cardsDb = 1;\nexport const CardsDb = 2;\n",
        );
        let result = find_database_variables(temp.path(), &Conventions::default());
        assert!(matches!(result, Err(ResolveError::FactoryCollision { .. })));
    }
}
