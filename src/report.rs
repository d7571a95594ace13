//! Output formatting for lint results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output, one line per diagnostic
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::rules::{DispatchResult, FileDiagnostic};
use crate::suppress::SuppressedDiagnostic;

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    /// Configuration file used, or `"<defaults>"`.
    pub config: String,
    pub passed: bool,
    pub files_scanned: usize,
    /// Rule evaluations abandoned because of an exceptional error.
    pub skipped: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressedDiagnostic>,
    pub suppressed_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub rule: String,
    pub file: String,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuppressedDiagnostic {
    pub diagnostic: JsonDiagnostic,
    pub suppression: JsonSuppression,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuppression {
    pub rule: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    pub line: usize,
}

/// Build the JSON report for a dispatch result.
pub fn json_report(path: &str, config_path: &str, result: &DispatchResult) -> JsonReport {
    let suppressed = result
        .suppressed
        .iter()
        .map(|sd: &SuppressedDiagnostic| JsonSuppressedDiagnostic {
            diagnostic: diagnostic_to_json(&sd.diagnostic),
            suppression: JsonSuppression {
                rule: sd.suppression.rule.clone(),
                reason: sd.suppression.reason.clone(),
                line: sd.suppression.line,
            },
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.to_string(),
        passed: !result.has_violations(),
        files_scanned: result.scanned,
        skipped: result.skipped,
        diagnostics: result.diagnostics.iter().map(diagnostic_to_json).collect(),
        suppressed,
        suppressed_count: result.suppressed.len(),
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, config_path: &str, result: &DispatchResult) -> anyhow::Result<()> {
    let report = json_report(path, config_path, result);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn diagnostic_to_json(d: &FileDiagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        rule: d.rule.as_str().to_string(),
        file: d.file.clone(),
        error: d.error.clone(),
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// One terminal line for a diagnostic, without color.
pub fn pretty_line(d: &FileDiagnostic) -> String {
    format!("{} [{}] {}", d.file, d.rule, d.error)
}

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, config_path: &str, result: &DispatchResult, show_suppressed: bool) {
    println!();
    println!("  {} v{}", "shapecheck".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!();
    println!("  {}{}", "Scanning: ".dimmed(), path);
    println!("  {}{}", "Config:   ".dimmed(), config_path);
    println!();

    for d in &result.diagnostics {
        println!("  {} {}", "✗".red(), pretty_line(d));
    }
    if !result.diagnostics.is_empty() {
        println!();
    }

    if !result.suppressed.is_empty() {
        write_suppressed_summary(&result.suppressed, show_suppressed);
        println!();
    }

    write_final_status(result);
    println!();
}

fn write_suppressed_summary(suppressed: &[SuppressedDiagnostic], show_details: bool) {
    println!("  {} ({}):", "Suppressed".dimmed(), suppressed.len());

    if !show_details {
        println!("    {}", "(use --show-suppressed to see details)".dimmed());
        return;
    }

    for sd in suppressed {
        print!("    {:<26}", sd.diagnostic.rule.as_str().dimmed());
        print!("{}", sd.diagnostic.file.blue());
        if !sd.suppression.reason.is_empty() {
            print!("  {}", format!("reason: {:?}", sd.suppression.reason).dimmed());
        }
        println!();
    }
}

fn write_final_status(result: &DispatchResult) {
    let summary = format!(
        "{} files, {} violations",
        result.scanned,
        result.diagnostics.len()
    );
    if result.has_violations() {
        print!("  {}  {}", "✗ FAIL".red(), summary);
    } else {
        print!("  {}  {}", "✓ PASS".green(), summary);
    }
    if result.skipped > 0 {
        print!("  {}", format!("({} skipped, see log)", result.skipped).yellow());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleName;
    use crate::suppress::Suppression;

    fn result() -> DispatchResult {
        DispatchResult {
            diagnostics: vec![FileDiagnostic {
                rule: RuleName::FileNaming,
                file: "functions/sum.ts".to_string(),
                error: "sum.ts: expected ... See https://shapecheck.dev/rules#file_naming"
                    .to_string(),
            }],
            suppressed: vec![SuppressedDiagnostic {
                diagnostic: FileDiagnostic {
                    rule: RuleName::ReturnType,
                    file: "functions/effect.legacy.ts".to_string(),
                    error: "effect.legacy.ts: expected ...".to_string(),
                },
                suppression: Suppression {
                    rule: "return_type".to_string(),
                    reason: "Legacy".to_string(),
                    file: "functions/effect.legacy.ts".to_string(),
                    line: 1,
                },
            }],
            scanned: 2,
            skipped: 0,
        }
    }

    #[test]
    fn test_json_report() {
        let report = json_report(".", "<defaults>", &result());
        assert!(!report.passed);
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.diagnostics[0].rule, "file_naming");
        assert_eq!(report.suppressed_count, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["diagnostics"][0]["file"], "functions/sum.ts");
        assert_eq!(json["suppressed"][0]["suppression"]["reason"], "Legacy");
    }

    #[test]
    fn test_empty_suppressed_omitted() {
        let clean = DispatchResult {
            scanned: 1,
            ..DispatchResult::default()
        };
        let json = serde_json::to_value(json_report(".", "<defaults>", &clean)).unwrap();
        assert_eq!(json["passed"], true);
        assert!(json.get("suppressed").is_none());
    }

    #[test]
    fn test_pretty_line_single_line() {
        let line = pretty_line(&result().diagnostics[0]);
        assert!(line.starts_with("functions/sum.ts [file_naming] sum.ts: expected"));
        assert!(!line.contains('\n'));
    }
}
