//! Command-line interface for shapecheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::config::{self, Conventions, DEFAULT_CONFIG_NAMES, DEFAULT_TEMPLATE};
use crate::report;
use crate::rules::{registry, RuleName, Runner};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Shown in reports when no configuration file is found.
const DEFAULTS_LABEL: &str = "<defaults>";

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

/// Entries marking the root of a TypeScript project.
const PROJECT_MARKERS: &[&str] = &["package.json", "tsconfig.json", ".git"];

/// Enforce structural conventions over a TypeScript source tree.
///
/// Checks file naming, export shape, parameter and return type annotations,
/// and cross-file consistency between functions, their portals, and their
/// tests.
#[derive(Parser)]
#[command(name = "shapecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a project against its conventions
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// Write the default configuration file
    Init(InitArgs),
    /// List available rules
    Rules,
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Path to check (file or directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Only run these rules (repeatable)
    #[arg(short, long = "rule")]
    pub rules: Vec<String>,

    /// Show suppressed diagnostics in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "shapecheck.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Find a configuration file in `start` or one of its ancestors.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    })
}

/// Nearest ancestor of `start` (itself included) holding a project marker or
/// a configuration file.
pub fn discover_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            PROJECT_MARKERS
                .iter()
                .chain(DEFAULT_CONFIG_NAMES)
                .any(|name| dir.join(name).exists())
        })
        .map(Path::to_path_buf)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "node_modules"
}

/// Collect TypeScript sources under `root`, sorted by path.
///
/// Hidden directories, `node_modules`, and paths matching `excluded_paths`
/// (relative to `root`) are skipped.
pub fn collect_files(root: &Path, conventions: &Conventions) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !SOURCE_EXTENSIONS.contains(&ext) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if conventions.is_path_excluded(relative) {
            debug!(file = %relative.display(), "excluded by configuration");
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let mut selected = Vec::new();
    for name in &args.rules {
        match RuleName::parse(name) {
            Some(rule) => selected.push(rule),
            None => {
                eprintln!("Error: unknown rule {:?}", name);
                eprintln!("Run 'shapecheck rules' to see available rules");
                return Ok(EXIT_ERROR);
            }
        }
    }

    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };
    let is_dir = abs_path.is_dir();
    let search_start = if is_dir {
        abs_path.as_path()
    } else {
        abs_path.parent().unwrap_or(abs_path.as_path())
    };

    let config_path = match &args.config {
        Some(p) => Some(p.clone()),
        None => discover_config(search_start),
    };

    let conventions = match &config_path {
        Some(path) => match Conventions::parse_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error parsing config: {}", e);
                return Ok(EXIT_ERROR);
            }
        },
        None => Conventions::default(),
    };

    if let Err(e) = config::validate(&conventions) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    // Roles and the database catalog are resolved against the project root,
    // which may sit above the scanned path.
    let directory =
        discover_project_root(search_start).unwrap_or_else(|| search_start.to_path_buf());

    let files = if is_dir {
        collect_files(&abs_path, &conventions)?
    } else {
        vec![abs_path.clone()]
    };

    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }
    info!(root = %directory.display(), files = files.len(), "linting");

    let runner = Runner::new(&directory, conventions).with_rules(&selected);
    let result = runner.run(&files);

    let config_label = config_path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| DEFAULTS_LABEL.to_string());
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => report::write_json(&path_str, &config_label, &result)?,
        _ => report::write_pretty(&path_str, &config_label, &result, args.show_suppressed),
    }

    if result.has_violations() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it, pass --force, or use --output to choose another path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to match your project's conventions", args.output.display());
    println!("  2. Run: shapecheck lint . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// Run the rules command.
pub fn run_rules() -> anyhow::Result<i32> {
    println!("Available rules:");
    println!();
    for rule in registry::all() {
        println!("  {:<26} {}", rule.name.as_str(), rule.description);
    }
    println!();
    println!("Disable rules with `disabled_rules` in the configuration, or select");
    println!("a subset with `shapecheck lint --rule <name>`.");
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export default () => 1;\n").unwrap();
    }

    #[test]
    fn test_collect_files_skips_hidden_and_vendor() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/functions/pure.a.ts");
        touch(temp.path(), "src/functions/pure.b.tsx");
        touch(temp.path(), "src/functions/readme.md");
        touch(temp.path(), "node_modules/pkg/index.ts");
        touch(temp.path(), ".cache/functions/pure.c.ts");
        touch(temp.path(), "generated/functions/pure.d.ts");

        let conventions = Conventions {
            excluded_paths: vec!["generated/**".to_string()],
            ..Conventions::default()
        };
        let files = collect_files(temp.path(), &conventions).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/functions/pure.a.ts", "src/functions/pure.b.tsx"]);
    }

    #[test]
    fn test_discover_config_walks_up() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".shapecheck.yaml"), "function_dir: fns\n").unwrap();
        let nested = temp.path().join("src/fns");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(
            discover_config(&nested),
            Some(temp.path().join(".shapecheck.yaml"))
        );
    }

    #[test]
    fn test_discover_project_root() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("app");
        let functions = project.join("src/functions");
        fs::create_dir_all(&functions).unwrap();
        fs::write(project.join("package.json"), "{}\n").unwrap();

        assert_eq!(discover_project_root(&functions), Some(project.clone()));
        assert_eq!(discover_project_root(&project), Some(project.clone()));

        fs::write(functions.join("shapecheck.yaml"), "docs_url: x\n").unwrap();
        assert_eq!(discover_project_root(&functions), Some(functions));
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("shapecheck.yaml");
        let args = InitArgs {
            output: output.clone(),
            force: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
        assert!(Conventions::parse_file(&output).is_ok());

        let forced = InitArgs { output, force: true };
        assert_eq!(run_init(&forced).unwrap(), EXIT_SUCCESS);
    }
}
