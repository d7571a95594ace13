//! Portal/database consistency rule.

use super::context::excerpt;
use super::{FileRole, RuleContext, RuleError, RuleName, RuleOutcome};
use crate::analysis::get_type_alias_shape;
use crate::resolve::typeof_target;

/// The portal alias's database property must be `typeof <db variable>`.
///
/// A `typeof` target missing from the catalog is not reported: without
/// semantic resolution it may be misnamed or simply not declared yet.
pub fn check_portal_database(ctx: &RuleContext<'_>) -> Result<RuleOutcome, RuleError> {
    if ctx.role() != FileRole::Function {
        return Ok(RuleOutcome::NotApplicable);
    }
    let unit = match ctx.parse() {
        Some(u) => u,
        None => return Ok(RuleOutcome::NotApplicable),
    };

    let conventions = ctx.conventions;
    let shape = match get_type_alias_shape(&unit, &conventions.portal_marker) {
        Some(s) => s,
        None => return Ok(RuleOutcome::NotApplicable),
    };
    let property = match shape.property(&conventions.portal_db_property) {
        Some(p) => p,
        None => return Ok(RuleOutcome::NotApplicable),
    };

    let catalog = ctx.catalog()?;
    match typeof_target(&property.type_text) {
        Some(target) if catalog.contains(&target) => Ok(RuleOutcome::Pass),
        Some(_) => Ok(RuleOutcome::NotApplicable),
        None => {
            let known = if catalog.is_empty() {
                "none found".to_string()
            } else {
                catalog.variables().join(", ")
            };
            Ok(RuleOutcome::Fail(ctx.diagnostic(
                RuleName::PortalDatabase,
                format!(
                    "expected {}.{} to be `typeof <database variable>` (known: {}), found `{}`",
                    conventions.portal_marker,
                    conventions.portal_db_property,
                    known,
                    excerpt(&property.type_text)
                ),
            )))
        }
    }
}
