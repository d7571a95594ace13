//! Type alias property extraction.
//!
//! Works on raw text so it can be applied to sibling files without building a
//! syntax tree for them.

use once_cell::sync::Lazy;
use regex::Regex;

use super::balanced::{mask_comments, matching_close, split_top_level};
use super::{AliasProperty, SourceUnit, TypeAliasShape};

/// Start of a property: optional `readonly`, a name, optional `?`, then `:`.
static PROPERTY_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:readonly\s+)?([A-Za-z_$][\w$]*|"[^"]*"|'[^']*')\s*(\?)?\s*:\s*"#)
        .expect("property pattern is valid")
});

/// Extract the shape of `type <alias_name> = { ... }` from a parsed unit.
pub fn get_type_alias_shape(unit: &SourceUnit, alias_name: &str) -> Option<TypeAliasShape> {
    type_alias_shape(unit.text(), alias_name)
}

/// Extract the shape of `type <alias_name> = { ... }` from raw text.
///
/// The alias may be exported and may carry type parameters. Returns `None`
/// when the alias is absent, is not an object type, or its braces never
/// balance.
pub fn type_alias_shape(text: &str, alias_name: &str) -> Option<TypeAliasShape> {
    let masked = mask_comments(text);
    let header = Regex::new(&format!(
        r"(?m)(?:^|[;\s])(?:export\s+)?type\s+{}\b\s*(?:<[^=]*>)?\s*=\s*\{{",
        regex::escape(alias_name)
    ))
    .ok()?;

    let m = header.find(&masked)?;
    let open = m.end() - 1;
    let close = matching_close(&masked, open)?;
    let body = &masked[open + 1..close];

    Some(TypeAliasShape {
        name: alias_name.to_string(),
        properties: parse_properties(body),
    })
}

/// Split an object type body into properties.
///
/// Pieces are cut at depth-zero `;`, `,` and newlines. A piece that does not
/// start a new property continues the previous one, so multi-line unions stay
/// attached to their property.
fn parse_properties(body: &str) -> Vec<AliasProperty> {
    let mut properties: Vec<AliasProperty> = Vec::new();
    let mut current: Option<(String, bool, usize, usize)> = None;

    for range in split_top_level(body, b";,\n") {
        let piece = &body[range.clone()];
        if piece.trim().is_empty() {
            continue;
        }

        if let Some(caps) = PROPERTY_START.captures(piece) {
            if let Some(done) = current.take() {
                properties.push(finish(body, done));
            }
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let name = caps
                .get(1)
                .map(|m| m.as_str().trim_matches(|c| c == '"' || c == '\''))
                .unwrap_or("")
                .to_string();
            let optional = caps.get(2).is_some();
            current = Some((name, optional, range.start + whole, range.end));
        } else if let Some((_, _, _, end)) = current.as_mut() {
            *end = range.end;
        }
    }

    if let Some(done) = current.take() {
        properties.push(finish(body, done));
    }

    properties
}

fn finish(body: &str, (name, optional, start, end): (String, bool, usize, usize)) -> AliasProperty {
    AliasProperty {
        name,
        type_text: body[start..end].trim().to_string(),
        optional,
    }
}
