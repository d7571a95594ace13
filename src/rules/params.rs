//! Parameter shape rules for the default export.

use super::{FileRole, RuleContext, RuleError, RuleName, RuleOutcome};
use crate::analysis::{get_default_export, FunctionSignature};

/// Function signature of a function-area file's default export, or `None`
/// when the rule cannot apply.
fn default_signature(ctx: &RuleContext<'_>) -> Option<FunctionSignature> {
    if ctx.role() != FileRole::Function {
        return None;
    }
    let unit = ctx.parse()?;
    get_default_export(&unit).as_function().cloned()
}

/// Effectful functions take the portal as their first parameter.
pub fn check_portal_parameter(ctx: &RuleContext<'_>) -> Result<RuleOutcome, RuleError> {
    let class = match ctx.naming_class() {
        Some(c) if c.result_shape.is_effectful() => c,
        _ => return Ok(RuleOutcome::NotApplicable),
    };
    let signature = match default_signature(ctx) {
        Some(s) => s,
        None => return Ok(RuleOutcome::NotApplicable),
    };

    let marker = &ctx.conventions.portal_marker;
    let found = match signature.parameter(0) {
        Some(p) if p.type_contains(marker) => return Ok(RuleOutcome::Pass),
        Some(p) => format!("`{}`", p.text),
        None => "no parameters".to_string(),
    };

    Ok(RuleOutcome::Fail(ctx.diagnostic(
        RuleName::PortalParameter,
        format!(
            "expected the first parameter of {} functions to be typed with {}, found {}",
            class.result_shape.describe(),
            marker,
            found
        ),
    )))
}

/// The arguments parameter (first for pure functions, second for effectful
/// ones) must be typed with the args marker. Absent parameters are left to
/// other rules.
pub fn check_args_parameter(ctx: &RuleContext<'_>) -> Result<RuleOutcome, RuleError> {
    let class = match ctx.naming_class() {
        Some(c) => c,
        None => return Ok(RuleOutcome::NotApplicable),
    };
    let signature = match default_signature(ctx) {
        Some(s) => s,
        None => return Ok(RuleOutcome::NotApplicable),
    };

    let position = class.result_shape.args_position();
    let param = match signature.parameter(position) {
        Some(p) => p,
        None => return Ok(RuleOutcome::NotApplicable),
    };

    let marker = &ctx.conventions.args_marker;
    if param.type_contains(marker) {
        return Ok(RuleOutcome::Pass);
    }

    Ok(RuleOutcome::Fail(ctx.diagnostic(
        RuleName::ArgsParameter,
        format!(
            "expected parameter {} of {} functions to be typed with {}, found `{}`",
            position + 1,
            class.result_shape.describe(),
            marker,
            param.text
        ),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Conventions;
    use crate::rules::ResolverCache;
    use std::path::Path;

    fn run(
        check: fn(&RuleContext<'_>) -> Result<RuleOutcome, RuleError>,
        path: &str,
        content: &str,
    ) -> RuleOutcome {
        let conventions = Conventions::default();
        let cache = ResolverCache::new();
        let ctx = RuleContext::new(Path::new("/p"), Path::new(path), content, &conventions, &cache);
        check(&ctx).unwrap()
    }

    #[test]
    fn test_portal_parameter() {
        let path = "/p/functions/effect.getUsers.ts";
        assert_eq!(
            run(
                check_portal_parameter,
                path,
                "export default async (portal: TPortal, args: TArgs) => [null, null];\n"
            ),
            RuleOutcome::Pass
        );

        let error = run(
            check_portal_parameter,
            path,
            "export default async (args: TArgs) => [null, null];\n",
        )
        .into_diagnostic()
        .unwrap()
        .error;
        assert!(error.contains("TPortal"));
        assert!(error.contains("`args: TArgs`"));

        let error = run(check_portal_parameter, path, "export default () => [null, null];\n")
            .into_diagnostic()
            .unwrap()
            .error;
        assert!(error.contains("no parameters"));
    }

    #[test]
    fn test_portal_parameter_skips_pure_functions() {
        assert_eq!(
            run(
                check_portal_parameter,
                "/p/functions/pure.sum.ts",
                "export default (args: TArgs) => 1;\n"
            ),
            RuleOutcome::NotApplicable
        );
    }

    #[test]
    fn test_args_parameter_positions() {
        assert_eq!(
            run(
                check_args_parameter,
                "/p/functions/pure.sum.ts",
                "export default (args: TArgs) => 1;\n"
            ),
            RuleOutcome::Pass
        );
        assert_eq!(
            run(
                check_args_parameter,
                "/p/functions/effect.save.ts",
                "export default (portal: TPortal, args: Readonly<TArgs>) => [null, null];\n"
            ),
            RuleOutcome::Pass
        );

        let error = run(
            check_args_parameter,
            "/p/functions/effect.save.ts",
            "export default (portal: TPortal, id: string) => [null, null];\n",
        )
        .into_diagnostic()
        .unwrap()
        .error;
        assert!(error.contains("parameter 2 of effectful functions"), "{}", error);
        assert!(error.contains("`id: string`"));
    }

    #[test]
    fn test_args_parameter_absent_is_inapplicable() {
        assert_eq!(
            run(
                check_args_parameter,
                "/p/functions/effect.ping.ts",
                "export default (portal: TPortal) => [null, null];\n"
            ),
            RuleOutcome::NotApplicable
        );
    }
}
