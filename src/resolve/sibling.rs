//! Structurally related files: a test file's implementation, and the
//! database variable an implementation's portal depends on.

use std::fs;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use super::ResolveError;
use crate::analysis::type_alias_shape;
use crate::config::Conventions;

static TYPEOF_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^typeof\s+([A-Za-z_$][\w$]*)$").expect("typeof pattern is valid")
});

/// Implementation file paired with a test file.
///
/// `effect.getUsers.test.ts` -> `effect.getUsers.ts`. Returns `None` when the
/// path does not carry the test suffix.
pub fn corresponding_implementation_file(
    test_path: &Path,
    conventions: &Conventions,
) -> Option<PathBuf> {
    let file_name = test_path.file_name()?.to_str()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    let base = stem.strip_suffix(conventions.test_suffix.as_str())?;
    if base.is_empty() {
        return None;
    }
    Some(test_path.with_file_name(format!("{}.{}", base, ext)))
}

/// Whether a regular file exists at `path`.
pub fn exists(path: &Path) -> Result<bool, ResolveError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ResolveError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Read a file, treating absence as `None`.
pub fn read_if_exists(path: &Path) -> Result<Option<String>, ResolveError> {
    if !exists(path)? {
        return Ok(None);
    }
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ResolveError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// `typeof magicCardsDb` -> `magicCardsDb`.
pub fn typeof_target(type_text: &str) -> Option<String> {
    TYPEOF_TARGET
        .captures(type_text.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Database variable referenced by the portal alias of an implementation.
///
/// Looks for the portal alias, then its database property typed
/// `typeof <identifier>`. The alias body may nest object types.
pub fn extract_portal_database_variable(
    implementation_text: &str,
    conventions: &Conventions,
) -> Option<String> {
    let shape = type_alias_shape(implementation_text, &conventions.portal_marker)?;
    let property = shape.property(&conventions.portal_db_property)?;
    typeof_target(&property.type_text)
}

/// Module specifier importing `target` from a file in `from_dir`, without
/// extension (`../../database/books/conn.books`).
pub fn relative_import_path(from_dir: &Path, target: &Path) -> String {
    let from: Vec<Component> = from_dir.components().collect();
    let stripped = target.with_extension("");
    let to: Vec<Component> = stripped.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().to_string());
    }

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_corresponding_implementation_file() {
        let conventions = Conventions::default();
        assert_eq!(
            corresponding_implementation_file(
                Path::new("/p/functions/effect.getUsers.test.ts"),
                &conventions
            ),
            Some(PathBuf::from("/p/functions/effect.getUsers.ts"))
        );
        assert_eq!(
            corresponding_implementation_file(Path::new("/p/functions/effect.getUsers.ts"), &conventions),
            None
        );
        assert_eq!(
            corresponding_implementation_file(Path::new("/p/.test.ts"), &conventions),
            None
        );
    }

    #[test]
    fn test_exists_and_read() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.ts");
        assert!(!exists(&file).unwrap());
        assert_eq!(read_if_exists(&file).unwrap(), None);

        fs::write(&file, "export {};\n").unwrap();
        assert!(exists(&file).unwrap());
        assert_eq!(read_if_exists(&file).unwrap().as_deref(), Some("export {};\n"));

        // Directories are not files.
        assert!(!exists(temp.path()).unwrap());
    }

    #[test]
    fn test_extract_portal_database_variable() {
        let conventions = Conventions::default();
        let text = r#"
export type TPortal = {
  cache: { get: (key: string) => { hit: boolean } };
  db: typeof magicCardsDb;
};
"#;
        assert_eq!(
            extract_portal_database_variable(text, &conventions).as_deref(),
            Some("magicCardsDb")
        );
        assert_eq!(
            extract_portal_database_variable("type TPortal = { db: Database };", &conventions),
            None
        );
        assert_eq!(
            extract_portal_database_variable("type TPortal = { logger: Logger };", &conventions),
            None
        );
        assert_eq!(extract_portal_database_variable("const a = 1;", &conventions), None);
    }

    #[test]
    fn test_typeof_target() {
        assert_eq!(typeof_target(" typeof booksDb ").as_deref(), Some("booksDb"));
        assert_eq!(typeof_target("typeof a.b"), None);
        assert_eq!(typeof_target("Db"), None);
    }

    #[test]
    fn test_relative_import_path() {
        assert_eq!(
            relative_import_path(
                Path::new("/p/src/functions/cards"),
                Path::new("/p/src/database/magicCards/conn.magicCards.ts")
            ),
            "../../database/magicCards/conn.magicCards"
        );
        assert_eq!(
            relative_import_path(Path::new("/p/src"), Path::new("/p/src/db/conn.db.ts")),
            "./db/conn.db"
        );
    }
}
