//! File naming rule.

use super::{FileRole, RuleContext, RuleError, RuleName, RuleOutcome};

/// Files in the function area must start with a naming-class prefix followed
/// by the separator.
pub fn check_file_naming(ctx: &RuleContext<'_>) -> Result<RuleOutcome, RuleError> {
    if !matches!(ctx.role(), FileRole::Function | FileRole::Test) {
        return Ok(RuleOutcome::NotApplicable);
    }
    if ctx.parse().is_none() {
        return Ok(RuleOutcome::NotApplicable);
    }
    if ctx.naming_class().is_some() {
        return Ok(RuleOutcome::Pass);
    }

    let expected = ctx
        .conventions
        .expected_prefixes()
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(RuleOutcome::Fail(ctx.diagnostic(
        RuleName::FileNaming,
        format!(
            "expected the file name to start with one of {} (pure, effectful, effectful with rollback), found \"{}\"",
            expected,
            ctx.base_name()
        ),
    )))
}
