//! Return type rule.
//!
//! The check is substring containment: `Promise<TErrTuple<User>>` passes for
//! a tuple-shaped class, and so would any other wrapper around the marker.

use super::{FileRole, RuleContext, RuleError, RuleName, RuleOutcome};
use crate::analysis::get_default_export;

pub fn check_return_type(ctx: &RuleContext<'_>) -> Result<RuleOutcome, RuleError> {
    if ctx.role() != FileRole::Function {
        return Ok(RuleOutcome::NotApplicable);
    }
    let class = match ctx.naming_class() {
        Some(c) => c,
        None => return Ok(RuleOutcome::NotApplicable),
    };
    let marker = match ctx.conventions.result_marker(class.result_shape) {
        Some(m) => m,
        None => return Ok(RuleOutcome::NotApplicable),
    };
    let unit = match ctx.parse() {
        Some(u) => u,
        None => return Ok(RuleOutcome::NotApplicable),
    };
    let default_export = get_default_export(&unit);
    let signature = match default_export.as_function() {
        Some(s) => s,
        None => return Ok(RuleOutcome::NotApplicable),
    };

    let found = match signature.return_type.as_deref() {
        Some(text) if text.contains(marker) => return Ok(RuleOutcome::Pass),
        Some(text) => format!("`{}`", text),
        None => "no return type annotation".to_string(),
    };

    Ok(RuleOutcome::Fail(ctx.diagnostic(
        RuleName::ReturnType,
        format!(
            "expected the return type of {} functions to contain {}, found {}",
            class.result_shape.describe(),
            marker,
            found
        ),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Conventions;
    use crate::rules::ResolverCache;
    use std::path::Path;

    fn run(path: &str, content: &str) -> RuleOutcome {
        let conventions = Conventions::default();
        let cache = ResolverCache::new();
        let ctx = RuleContext::new(Path::new("/p"), Path::new(path), content, &conventions, &cache);
        check_return_type(&ctx).unwrap()
    }

    #[test]
    fn test_tuple_marker() {
        let path = "/p/functions/effect.getUsers.ts";
        assert_eq!(
            run(path, "export default (portal: TPortal): TErrTuple<User[]> => [[], null];\n"),
            RuleOutcome::Pass
        );
        // Wrapped markers are accepted.
        assert_eq!(
            run(
                path,
                "export default async (portal: TPortal): Promise<TErrTuple<User[]>> => [[], null];\n"
            ),
            RuleOutcome::Pass
        );

        let error = run(path, "export default async (portal: TPortal): Promise<User[]> => [];\n")
            .into_diagnostic()
            .unwrap()
            .error;
        assert!(error.contains("TErrTuple"));
        assert!(error.contains("`Promise<User[]>`"));
        assert!(error.contains("return type of effectful functions"), "{}", error);
        assert!(!error.contains("a effectful"));
    }

    #[test]
    fn test_rollback_marker_and_missing_annotation() {
        let path = "/p/functions/effectRollback.charge.ts";
        assert_eq!(
            run(path, "export default (portal: TPortal): TErrTriple<Receipt> => [null, null, []];\n"),
            RuleOutcome::Pass
        );

        let error = run(path, "export default (portal: TPortal): TErrTuple<Receipt> => [null, null];\n")
            .into_diagnostic()
            .unwrap()
            .error;
        assert!(error.contains("TErrTriple"));
        assert!(error.contains("of effectful with rollback functions"));

        let error = run(path, "export default (portal: TPortal) => [null, null, []];\n")
            .into_diagnostic()
            .unwrap()
            .error;
        assert!(error.contains("no return type annotation"));
    }

    #[test]
    fn test_pure_functions_unconstrained() {
        assert_eq!(
            run("/p/functions/pure.sum.ts", "export default (args: TArgs): number => 1;\n"),
            RuleOutcome::NotApplicable
        );
    }
}
