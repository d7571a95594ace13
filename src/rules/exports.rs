//! Export shape rules: the default export is a function, and it is the only
//! exported function.

use super::context::excerpt;
use super::{FileRole, RuleContext, RuleError, RuleName, RuleOutcome};
use crate::analysis::{get_default_export, list_named_function_exports, DefaultExport};

pub fn check_default_export_function(ctx: &RuleContext<'_>) -> Result<RuleOutcome, RuleError> {
    if ctx.role() != FileRole::Function {
        return Ok(RuleOutcome::NotApplicable);
    }
    let unit = match ctx.parse() {
        Some(u) => u,
        None => return Ok(RuleOutcome::NotApplicable),
    };

    let message = match get_default_export(&unit) {
        DefaultExport::FunctionLike(_) => return Ok(RuleOutcome::Pass),
        DefaultExport::NonFunction { kind, text } => format!(
            "expected the default export to be a function, found {}: `{}`",
            kind.describe(),
            excerpt(&text)
        ),
        DefaultExport::Missing => {
            "expected a default export that is a function, found no default export".to_string()
        }
    };

    Ok(RuleOutcome::Fail(
        ctx.diagnostic(RuleName::DefaultExportFunction, message),
    ))
}

pub fn check_single_function_export(ctx: &RuleContext<'_>) -> Result<RuleOutcome, RuleError> {
    if ctx.role() != FileRole::Function {
        return Ok(RuleOutcome::NotApplicable);
    }
    let unit = match ctx.parse() {
        Some(u) => u,
        None => return Ok(RuleOutcome::NotApplicable),
    };

    let names = list_named_function_exports(&unit);
    if names.is_empty() {
        return Ok(RuleOutcome::Pass);
    }

    Ok(RuleOutcome::Fail(ctx.diagnostic(
        RuleName::SingleFunctionExport,
        format!(
            "expected the default export to be the only exported function, found named function exports: {}. Inline them into the default export or move each to its own file",
            names.join(", ")
        ),
    )))
}
