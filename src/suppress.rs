//! Inline suppression of diagnostics via comments.
//!
//! Diagnostics are per file, so the only directive is file-level:
//! - `// shapecheck:ignore-file <rule> - <reason>`
//! - `/* shapecheck:ignore-file <rule> - <reason> */`
//!
//! `*` suppresses every rule. The directive must sit in the leading comment
//! block of the file, or within its first ten lines.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::rules::{FileDiagnostic, RuleName};

/// Lines after which a directive outside the leading comment block is ignored.
const HEADER_LINES: usize = 10;

/// An inline suppression directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    /// Rule to suppress (e.g., "file_naming") or "*" for all
    pub rule: String,
    /// Human-readable reason
    pub reason: String,
    /// File containing the suppression
    pub file: String,
    /// Line of the directive
    pub line: usize,
}

/// A diagnostic that was suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedDiagnostic {
    pub diagnostic: FileDiagnostic,
    pub suppression: Suppression,
}

lazy_static::lazy_static! {
    static ref SUPPRESSION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"//\s*shapecheck:ignore-file\s+(\S+)\s*(?:-\s*(.*))?").unwrap(),
        Regex::new(r"/\*\s*shapecheck:ignore-file\s+(\S+?)\s*(?:-\s*(.*?))?\s*\*/").unwrap(),
    ];
}

/// Parse suppression directives from file content.
pub fn parse_suppressions(file: &str, content: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    let mut in_header = true;
    let mut in_block_comment = false;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        if in_header && !in_block_comment && !is_comment_or_empty(trimmed) {
            in_header = false;
        }
        if trimmed.starts_with("/*") && !trimmed.contains("*/") {
            in_block_comment = true;
        } else if in_block_comment && trimmed.contains("*/") {
            in_block_comment = false;
        }

        if !in_header && line_number > HEADER_LINES {
            continue;
        }

        for pattern in SUPPRESSION_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(line) {
                let rule = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let reason = caps
                    .get(2)
                    .map(|m| m.as_str().trim().trim_end_matches("*/").trim().to_string())
                    .unwrap_or_default();

                suppressions.push(Suppression {
                    rule: rule.to_string(),
                    reason,
                    file: file.to_string(),
                    line: line_number,
                });
                break; // Only one suppression per line
            }
        }
    }

    suppressions
}

fn is_comment_or_empty(line: &str) -> bool {
    line.is_empty() || line.starts_with("//") || line.starts_with("/*") || line.starts_with('*')
}

/// Check if a diagnostic matches a suppression.
pub fn matches_suppression(diagnostic: &FileDiagnostic, suppression: &Suppression) -> bool {
    if diagnostic.file != suppression.file {
        return false;
    }
    if suppression.rule == "*" {
        return true;
    }
    RuleName::parse(&suppression.rule) == Some(diagnostic.rule)
}

/// Separate diagnostics into active and suppressed.
pub fn filter_suppressed(
    diagnostics: Vec<FileDiagnostic>,
    suppressions: &[Suppression],
) -> (Vec<FileDiagnostic>, Vec<SuppressedDiagnostic>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for diagnostic in diagnostics {
        match suppressions
            .iter()
            .find(|s| matches_suppression(&diagnostic, s))
        {
            Some(suppression) => suppressed.push(SuppressedDiagnostic {
                diagnostic,
                suppression: suppression.clone(),
            }),
            None => active.push(diagnostic),
        }
    }

    (active, suppressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(rule: RuleName) -> FileDiagnostic {
        FileDiagnostic {
            rule,
            file: "functions/legacy.ts".to_string(),
            error: "legacy.ts: expected ...".to_string(),
        }
    }

    #[test]
    fn test_parse_line_comment() {
        let content = "// shapecheck:ignore-file file_naming - Legacy module\nexport default () => 1;\n";
        let suppressions = parse_suppressions("functions/legacy.ts", content);
        assert_eq!(suppressions.len(), 1);
        assert_eq!(suppressions[0].rule, "file_naming");
        assert_eq!(suppressions[0].reason, "Legacy module");
        assert_eq!(suppressions[0].line, 1);
    }

    #[test]
    fn test_parse_block_comment() {
        let content = "/**\n * Generated.\n */\n/* shapecheck:ignore-file * - Generated code */\nexport default {};\n";
        let suppressions = parse_suppressions("a.ts", content);
        assert_eq!(suppressions.len(), 1);
        assert_eq!(suppressions[0].rule, "*");
        assert_eq!(suppressions[0].reason, "Generated code");
    }

    #[test]
    fn test_directive_after_header_ignored() {
        let mut content = String::from("export const a = 1;\n");
        for _ in 0..12 {
            content.push_str("const b = 2;\n");
        }
        content.push_str("// shapecheck:ignore-file file_naming - too late\n");
        assert!(parse_suppressions("a.ts", &content).is_empty());

        let early = "import x from \"y\";\n// shapecheck:ignore-file file_naming - early enough\n";
        assert_eq!(parse_suppressions("a.ts", early).len(), 1);
    }

    #[test]
    fn test_filter_suppressed() {
        let suppression = Suppression {
            rule: "file_naming".to_string(),
            reason: "Legacy".to_string(),
            file: "functions/legacy.ts".to_string(),
            line: 1,
        };
        let (active, suppressed) = filter_suppressed(
            vec![
                diagnostic(RuleName::FileNaming),
                diagnostic(RuleName::DefaultExportFunction),
            ],
            &[suppression],
        );
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].rule, RuleName::DefaultExportFunction);
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].suppression.reason, "Legacy");
    }

    #[test]
    fn test_wildcard_and_other_file() {
        let wildcard = Suppression {
            rule: "*".to_string(),
            reason: String::new(),
            file: "functions/legacy.ts".to_string(),
            line: 1,
        };
        assert!(matches_suppression(&diagnostic(RuleName::ReturnType), &wildcard));

        let other = Suppression {
            file: "functions/other.ts".to_string(),
            ..wildcard
        };
        assert!(!matches_suppression(&diagnostic(RuleName::ReturnType), &other));
    }
}
