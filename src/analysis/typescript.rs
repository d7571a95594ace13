//! Syntax queries over a TypeScript source unit.

use std::collections::BTreeMap;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, QueryError};

use super::{
    DefaultExport, FunctionSignature, ImportDecl, NonFunctionKind, Parameter, SourceUnit,
};

/// Tree-sitter query for extracting imported names.
const IMPORT_QUERY: &str = r#"
; import { a, b as c } from 'module'
(import_statement
  (import_clause
    (named_imports
      (import_specifier name: (identifier) @named)))
  source: (string) @source
) @import

; import a from 'module'
(import_statement
  (import_clause (identifier) @default_name)
  source: (string) @source
) @import

; import * as a from 'module'
(import_statement
  (import_clause (namespace_import (identifier) @namespace))
  source: (string) @source
) @import

; import 'module'
(import_statement
  source: (string) @source
) @import
"#;

/// Top-level binding a default-exported identifier can resolve to.
enum Binding<'a> {
    Function(Node<'a>),
    Class,
    Value(Node<'a>),
    Uninitialized,
}

fn is_function_kind(kind: &str) -> bool {
    matches!(
        kind,
        "arrow_function" | "function_expression" | "function" | "generator_function"
    )
}

fn is_function_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration" | "generator_function_declaration"
    )
}

fn has_default_keyword(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "default");
    found
}

/// Strip parentheses, `as` and `satisfies` wrappers.
fn unwrap_expression(mut node: Node) -> Node {
    while matches!(
        node.kind(),
        "parenthesized_expression" | "as_expression" | "satisfies_expression" | "non_null_expression"
    ) {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

fn annotation_text(unit: &SourceUnit, node: Node) -> String {
    unit.node_text(node).trim_start_matches(':').trim().to_string()
}

fn parameter(unit: &SourceUnit, node: Node) -> Parameter {
    let name = node
        .child_by_field_name("pattern")
        .map(|p| unit.node_text(p).to_string())
        .unwrap_or_default();
    Parameter {
        name,
        type_text: node
            .child_by_field_name("type")
            .map(|t| annotation_text(unit, t)),
        text: unit.node_text(node).to_string(),
    }
}

fn function_signature(unit: &SourceUnit, node: Node, alias: Option<&str>) -> FunctionSignature {
    let name = node
        .child_by_field_name("name")
        .map(|n| unit.node_text(n).to_string())
        .or_else(|| alias.map(str::to_string));

    let parameters = if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        let collected: Vec<Parameter> = params
            .named_children(&mut cursor)
            .filter(|p| matches!(p.kind(), "required_parameter" | "optional_parameter"))
            .map(|p| parameter(unit, p))
            .collect();
        collected
    } else if let Some(single) = node.child_by_field_name("parameter") {
        // `x => ...` has a bare identifier instead of a parameter list.
        let text = unit.node_text(single).to_string();
        vec![Parameter {
            name: text.clone(),
            type_text: None,
            text,
        }]
    } else {
        Vec::new()
    };

    FunctionSignature {
        name,
        parameters,
        return_type: node
            .child_by_field_name("return_type")
            .map(|r| annotation_text(unit, r)),
    }
}

/// Top-level statements, looking through non-default `export` wrappers.
fn top_level_declarations<'a>(unit: &'a SourceUnit) -> Vec<Node<'a>> {
    let root = unit.root();
    let mut cursor = root.walk();
    let mut out = Vec::new();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "export_statement" {
            if has_default_keyword(child) {
                continue;
            }
            if let Some(decl) = child.child_by_field_name("declaration") {
                out.push(decl);
            }
        } else {
            out.push(child);
        }
    }
    out
}

/// `(name, value)` pairs of a `const`/`let`/`var` declaration.
fn declarators<'a>(unit: &SourceUnit, decl: Node<'a>) -> Vec<(String, Option<Node<'a>>)> {
    let mut cursor = decl.walk();
    let pairs: Vec<_> = decl
        .named_children(&mut cursor)
        .filter(|d| d.kind() == "variable_declarator")
        .filter_map(|d| {
            let name = d.child_by_field_name("name")?;
            if name.kind() != "identifier" {
                return None;
            }
            Some((
                unit.node_text(name).to_string(),
                d.child_by_field_name("value"),
            ))
        })
        .collect();
    pairs
}

fn find_binding<'a>(unit: &'a SourceUnit, name: &str) -> Option<Binding<'a>> {
    for decl in top_level_declarations(unit) {
        let kind = decl.kind();
        let declared = decl
            .child_by_field_name("name")
            .map(|n| unit.node_text(n) == name)
            .unwrap_or(false);

        if is_function_declaration(kind) && declared {
            return Some(Binding::Function(decl));
        }
        if matches!(kind, "class_declaration" | "abstract_class_declaration") && declared {
            return Some(Binding::Class);
        }
        if matches!(kind, "lexical_declaration" | "variable_declaration") {
            for (binding, value) in declarators(unit, decl) {
                if binding == name {
                    return Some(match value {
                        Some(v) => Binding::Value(v),
                        None => Binding::Uninitialized,
                    });
                }
            }
        }
    }
    None
}

fn classify_value(unit: &SourceUnit, value: Node, alias: Option<&str>) -> Result<FunctionSignature, NonFunctionKind> {
    let value = unwrap_expression(value);
    match value.kind() {
        k if is_function_kind(k) => Ok(function_signature(unit, value, alias)),
        "object" => Err(NonFunctionKind::ObjectLiteral),
        "class" => Err(NonFunctionKind::Class),
        "string" | "template_string" | "number" | "true" | "false" | "null" | "undefined"
        | "regex" => Err(NonFunctionKind::Literal),
        "identifier" => Err(NonFunctionKind::Identifier(unit.node_text(value).to_string())),
        _ => Err(NonFunctionKind::Other),
    }
}

/// Describe the file's default export.
///
/// `export default <identifier>` is resolved against top-level function,
/// class and variable declarations of the same file.
pub fn get_default_export(unit: &SourceUnit) -> DefaultExport {
    let root = unit.root();
    let mut cursor = root.walk();
    let export = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "export_statement" && has_default_keyword(*n));

    let export = match export {
        Some(e) => e,
        None => return DefaultExport::Missing,
    };
    let text = unit.node_text(export).trim().to_string();

    if let Some(decl) = export.child_by_field_name("declaration") {
        let kind = match decl.kind() {
            k if is_function_declaration(k) => {
                return DefaultExport::FunctionLike(function_signature(unit, decl, None))
            }
            "class_declaration" | "abstract_class_declaration" => NonFunctionKind::Class,
            _ => NonFunctionKind::Other,
        };
        return DefaultExport::NonFunction { kind, text };
    }

    let value = match export.child_by_field_name("value") {
        Some(v) => unwrap_expression(v),
        None => {
            return DefaultExport::NonFunction {
                kind: NonFunctionKind::Other,
                text,
            }
        }
    };

    if value.kind() != "identifier" {
        return match classify_value(unit, value, None) {
            Ok(sig) => DefaultExport::FunctionLike(sig),
            Err(kind) => DefaultExport::NonFunction { kind, text },
        };
    }

    let name = unit.node_text(value);
    let kind = match find_binding(unit, name) {
        Some(Binding::Function(node)) => {
            return DefaultExport::FunctionLike(function_signature(unit, node, Some(name)))
        }
        Some(Binding::Value(v)) => match classify_value(unit, v, Some(name)) {
            Ok(sig) => return DefaultExport::FunctionLike(sig),
            Err(NonFunctionKind::Identifier(_)) | Err(NonFunctionKind::Other) => {
                NonFunctionKind::Identifier(name.to_string())
            }
            Err(kind) => kind,
        },
        Some(Binding::Class) => NonFunctionKind::Class,
        Some(Binding::Uninitialized) | None => NonFunctionKind::Identifier(name.to_string()),
    };

    DefaultExport::NonFunction { kind, text }
}

/// Identifier named by `export default <identifier>`, if any.
fn default_export_identifier(unit: &SourceUnit) -> Option<String> {
    let root = unit.root();
    let mut cursor = root.walk();
    let export = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "export_statement" && has_default_keyword(*n))?;
    let value = unwrap_expression(export.child_by_field_name("value")?);
    (value.kind() == "identifier").then(|| unit.node_text(value).to_string())
}

/// Names of exported functions other than the default export.
///
/// Covers `export function f` (overload signatures included, deduplicated)
/// and `export const f = <function|arrow>`. Source order.
pub fn list_named_function_exports(unit: &SourceUnit) -> Vec<String> {
    let default_name = default_export_identifier(unit);
    let root = unit.root();
    let mut cursor = root.walk();
    let mut names: Vec<String> = Vec::new();

    for child in root.named_children(&mut cursor) {
        if child.kind() != "export_statement" || has_default_keyword(child) {
            continue;
        }
        let decl = match child.child_by_field_name("declaration") {
            Some(d) => d,
            None => continue,
        };

        let mut found = Vec::new();
        match decl.kind() {
            k if is_function_declaration(k) || k == "function_signature" => {
                if let Some(n) = decl.child_by_field_name("name") {
                    found.push(unit.node_text(n).to_string());
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                for (name, value) in declarators(unit, decl) {
                    let is_fn = value
                        .map(|v| is_function_kind(unwrap_expression(v).kind()))
                        .unwrap_or(false);
                    if is_fn {
                        found.push(name);
                    }
                }
            }
            _ => {}
        }

        for name in found {
            if default_name.as_deref() != Some(name.as_str()) && !names.contains(&name) {
                names.push(name);
            }
        }
    }

    names
}

/// Names bound by `export const|let|var` declarations.
pub fn list_exported_variables(unit: &SourceUnit) -> Vec<String> {
    let root = unit.root();
    let mut cursor = root.walk();
    let mut names = Vec::new();

    for child in root.named_children(&mut cursor) {
        if child.kind() != "export_statement" {
            continue;
        }
        if let Some(decl) = child.child_by_field_name("declaration") {
            if matches!(decl.kind(), "lexical_declaration" | "variable_declaration") {
                names.extend(declarators(unit, decl).into_iter().map(|(name, _)| name));
            }
        }
    }

    names
}

/// All `import` statements with the names they bring in.
pub fn list_imports(unit: &SourceUnit) -> Result<Vec<ImportDecl>, QueryError> {
    let language = unit.dialect().language();
    let query = Query::new(&language, IMPORT_QUERY)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, unit.root(), unit.text().as_bytes());

    // Several patterns match the same statement; merge them by position.
    let mut by_statement: BTreeMap<usize, ImportDecl> = BTreeMap::new();

    while let Some(m) = matches.next() {
        let mut statement = None;
        let mut source = String::new();
        let mut name = None;

        for capture in m.captures {
            match query.capture_names()[capture.index as usize] {
                "import" => statement = Some(capture.node.start_byte()),
                "source" => {
                    source = unit
                        .node_text(capture.node)
                        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
                        .to_string();
                }
                "named" | "default_name" | "namespace" => {
                    name = Some(unit.node_text(capture.node).to_string());
                }
                _ => {}
            }
        }

        if let Some(start) = statement {
            let entry = by_statement.entry(start).or_insert_with(|| ImportDecl {
                source: source.clone(),
                names: Vec::new(),
            });
            if let Some(name) = name {
                if !entry.names.contains(&name) {
                    entry.names.push(name);
                }
            }
        }
    }

    Ok(by_statement.into_values().collect())
}
