//! Parsed source units.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree};

/// A file whose text could not be turned into a usable syntax tree.
///
/// Rules treat this as "inapplicable", never as a crash.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("failed to load TypeScript grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
    #[error("tree-sitter produced no tree for {0}")]
    NoTree(String),
    #[error("syntax error in {path} at line {line}")]
    Syntax { path: String, line: usize },
}

/// Grammar flavour picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") | Some("jsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }

    pub fn language(self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// An immutable parsed representation of one file.
///
/// Built once per rule invocation and dropped with it.
pub struct SourceUnit {
    path: PathBuf,
    text: String,
    tree: Tree,
    dialect: Dialect,
}

impl SourceUnit {
    /// Parse `content` as the file at `path`.
    pub fn parse<P: AsRef<Path>>(path: P, content: &str) -> Result<Self, ParseFailure> {
        let path = path.as_ref();
        let dialect = Dialect::for_path(path);

        let mut parser = Parser::new();
        parser.set_language(&dialect.language())?;
        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ParseFailure::NoTree(path.display().to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseFailure::Syntax {
                path: path.display().to_string(),
                line: first_error_line(root),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            text: content.to_string(),
            tree,
            dialect,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.text.as_bytes()).unwrap_or("")
    }
}

fn first_error_line(node: Node) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row + 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() || child.is_missing() || child.has_error() {
            return first_error_line(child);
        }
    }
    node.start_position().row + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_source() {
        let unit = SourceUnit::parse("a.ts", "export const x: number = 1;\n").unwrap();
        assert_eq!(unit.root().kind(), "program");
        assert_eq!(unit.dialect(), Dialect::TypeScript);
        assert_eq!(unit.path(), Path::new("a.ts"));
    }

    #[test]
    fn test_parse_failure_reports_line() {
        let source = "const a = 1;\nexport default function (\n";
        match SourceUnit::parse("broken.ts", source) {
            Err(ParseFailure::Syntax { line, .. }) => assert!(line >= 1),
            Err(other) => panic!("unexpected failure: {}", other),
            Ok(_) => panic!("expected a parse failure"),
        }
    }

    #[test]
    fn test_tsx_dialect() {
        assert_eq!(Dialect::for_path(Path::new("view.tsx")), Dialect::Tsx);
        let unit =
            SourceUnit::parse("view.tsx", "export default () => <div>hi</div>;\n").unwrap();
        assert_eq!(unit.dialect(), Dialect::Tsx);
    }
}
