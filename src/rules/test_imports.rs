//! Test files of database-backed functions import the testing factory.

use std::path::Path;

use tracing::debug;

use super::{FileRole, RuleContext, RuleError, RuleName, RuleOutcome};
use crate::analysis::list_imports;
use crate::resolve::{
    corresponding_implementation_file, extract_portal_database_variable, read_if_exists,
    relative_import_path,
};

pub fn check_test_imports_testing_db(ctx: &RuleContext<'_>) -> Result<RuleOutcome, RuleError> {
    if ctx.role() != FileRole::Test {
        return Ok(RuleOutcome::NotApplicable);
    }
    let conventions = ctx.conventions;

    let implementation = match corresponding_implementation_file(ctx.file_path, conventions) {
        Some(p) => p,
        None => return Ok(RuleOutcome::NotApplicable),
    };
    let implementation_text = match read_if_exists(&implementation)? {
        Some(text) => text,
        None => return Ok(RuleOutcome::NotApplicable),
    };
    let variable = match extract_portal_database_variable(&implementation_text, conventions) {
        Some(v) => v,
        None => return Ok(RuleOutcome::NotApplicable),
    };

    let unit = match ctx.parse() {
        Some(u) => u,
        None => return Ok(RuleOutcome::NotApplicable),
    };
    let factory = conventions.testing_factory_name(&variable);

    let imported = list_imports(&unit)?.iter().any(|import| {
        import.source.contains(&conventions.connection_path_marker) && import.imports(&factory)
    });
    if imported {
        return Ok(RuleOutcome::Pass);
    }

    let module = expected_module(ctx, &variable);
    Ok(RuleOutcome::Fail(ctx.diagnostic(
        RuleName::TestImportsTestingDb,
        format!(
            "expected `import {{ {} }} from \"{}\";` for database variable `{}` used by {}, found no such import",
            factory,
            module,
            variable,
            implementation
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
        ),
    )))
}

/// Import specifier of the connection module declaring `variable`.
///
/// Relative to the test file when the catalog knows the module, otherwise the
/// conventional `database/<name>/conn.<name>` layout.
fn expected_module(ctx: &RuleContext<'_>, variable: &str) -> String {
    let from_dir = ctx.file_path.parent().unwrap_or_else(|| Path::new(""));
    match ctx.catalog() {
        Ok(catalog) => {
            if let Some(entry) = catalog.get(variable) {
                return relative_import_path(from_dir, &entry.module);
            }
        }
        Err(e) => debug!(error = %e, "falling back to conventional connection path"),
    }

    let conventions = ctx.conventions;
    let name = variable
        .strip_suffix(conventions.db_suffix.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(variable);
    format!(
        "{}/{}/{}{}",
        conventions.database_dir, name, conventions.connection_path_marker, name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Conventions;
    use crate::rules::ResolverCache;
    use std::fs;
    use tempfile::TempDir;

    const IMPLEMENTATION: &str = "import { magicCardsDb } from \"../database/magicCards/conn.magicCards\";\n\
type TPortal = {\n  db: typeof magicCardsDb;\n  clock: { now: () => Date };\n};\n\
export default async (portal: TPortal, args: TArgs): Promise<TErrTuple<number>> => [1, null];\n";

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn run(root: &Path, test_content: &str) -> RuleOutcome {
        let conventions = Conventions::default();
        let cache = ResolverCache::new();
        let file = root.join("functions/effect.countCards.test.ts");
        let ctx = RuleContext::new(root, &file, test_content, &conventions, &cache);
        check_test_imports_testing_db(&ctx).unwrap()
    }

    #[test]
    fn test_import_from_connection_module_passes() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "functions/effect.countCards.ts", IMPLEMENTATION);
        let test = "import { createTestingMagicCardsDb } from \"../database/magicCards/conn.magicCards\";\nimport fn from \"./effect.countCards\";\n";
        assert_eq!(run(temp.path(), test), RuleOutcome::Pass);
    }

    #[test]
    fn test_missing_import_names_factory_and_relative_path() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "functions/effect.countCards.ts", IMPLEMENTATION);
        write(
            temp.path(),
            "database/magicCards/conn.magicCards.ts",
            "export const magicCardsDb = {};\n",
        );
        let error = run(temp.path(), "import fn from \"./effect.countCards\";\n")
            .into_diagnostic()
            .unwrap()
            .error;
        assert!(error.contains(
            "`import { createTestingMagicCardsDb } from \"../database/magicCards/conn.magicCards\";`"
        ));
        assert!(error.contains("`magicCardsDb`"));
    }

    #[test]
    fn test_import_from_wrong_module_fails_with_generic_path() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "functions/effect.countCards.ts", IMPLEMENTATION);
        let test = "import { createTestingMagicCardsDb } from \"../testing/fakes\";\n";
        let error = run(temp.path(), test).into_diagnostic().unwrap().error;
        assert!(error.contains("database/magicCards/conn.magicCards"));
    }

    #[test]
    fn test_inapplicable_without_db_dependency_or_sibling() {
        let temp = TempDir::new().unwrap();
        assert_eq!(run(temp.path(), "const x = 1;\n"), RuleOutcome::NotApplicable);

        write(
            temp.path(),
            "functions/effect.countCards.ts",
            "type TPortal = { clock: { now: () => Date } };\nexport default (portal: TPortal) => [1, null];\n",
        );
        assert_eq!(run(temp.path(), "const x = 1;\n"), RuleOutcome::NotApplicable);
    }
}
