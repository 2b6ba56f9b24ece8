//! Import extraction for Go sources.
//!
//! Only the file header is inspected: the package clause and the import
//! declarations that follow it. Scanning stops at the first other top-level
//! declaration, so syntax errors in function bodies never reach the caller.

use crate::error::{ParseError, Result};
use tree_sitter::{Node, Parser, Query, QueryCursor};
use tracing::trace;

/// Characters the Go toolchain rejects in import paths.
const ILLEGAL_IMPORT_CHARS: &str = "!\"#$%&'()*,:;<=>?[\\]^{|}`\u{FFFD}";

/// Top-level nodes that end the file header.
const DECLARATION_KINDS: &[&str] = &[
    "function_declaration",
    "method_declaration",
    "type_declaration",
    "var_declaration",
    "const_declaration",
];

const DECLARATION_KEYWORDS: &[&str] = &["func", "type", "var", "const"];

/// A single import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Import path as written, without delimiters.
    pub path: String,
    /// Local name, `.` or `_` when given.
    pub alias: Option<String>,
    /// 1-based line of the import spec.
    pub line: u32,
}

/// The header of a Go file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Name from the package clause.
    pub package: String,
    /// Imports in declaration order, duplicates included.
    pub imports: Vec<ImportSpec>,
}

/// Extracts import paths from Go source using Tree-sitter.
///
/// The import query is compiled once and reused for every file.
pub struct ImportExtractor {
    parser: Parser,
    imports: Query,
    path_capture: u32,
}

impl ImportExtractor {
    /// Creates an extractor with a compiled import query.
    pub fn new() -> Result<Self> {
        let language = tree_sitter_go::language();

        let imports_query = r#"
            (import_spec path: (_) @path)
        "#;

        let imports = Query::new(&language, imports_query)
            .map_err(|e| ParseError::QueryError(e.to_string()))?;
        let path_capture = imports
            .capture_index_for_name("path")
            .ok_or_else(|| ParseError::QueryError("missing @path capture".into()))?;

        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::ParserError(format!("Failed to set language: {}", e)))?;

        Ok(Self {
            parser,
            imports,
            path_capture,
        })
    }

    /// Returns the import paths declared by `source`.
    ///
    /// Paths come back in declaration order with `"` or `` ` `` stripped.
    pub fn extract(&mut self, source: &str, file_path: &str) -> Result<Vec<String>> {
        let header = self.parse_header(source, file_path)?;
        Ok(header.imports.into_iter().map(|spec| spec.path).collect())
    }

    /// Parses the package clause and import section of `source`.
    pub fn parse_header(&mut self, source: &str, file_path: &str) -> Result<FileHeader> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseError::ParserError("Tree-sitter returned no tree".into()))?;
        let root = tree.root_node();

        let mut package: Option<String> = None;
        let mut imports = Vec::new();

        for i in 0..root.child_count() {
            let Some(child) = root.child(i) else {
                continue;
            };

            if child.is_missing() {
                return Err(ParseError::syntax(
                    file_path,
                    line_of(&child),
                    describe_error(&child, source),
                ));
            }

            // statement terminators
            if !child.is_named() {
                continue;
            }

            match child.kind() {
                "comment" => {}
                "package_clause" => {
                    if package.is_some() {
                        return Err(ParseError::syntax(
                            file_path,
                            line_of(&child),
                            "expected declaration, found 'package'",
                        ));
                    }
                    check_clean(&child, source, file_path)?;
                    package = Some(package_name(&child, source, file_path)?);
                }
                "import_declaration" => {
                    if package.is_none() {
                        return Err(ParseError::syntax(
                            file_path,
                            line_of(&child),
                            "expected 'package', found 'import'",
                        ));
                    }
                    check_clean(&child, source, file_path)?;
                    self.collect_imports(&child, source, file_path, &mut imports)?;
                }
                kind if DECLARATION_KINDS.contains(&kind) => {
                    if package.is_none() {
                        return Err(ParseError::syntax(
                            file_path,
                            line_of(&child),
                            format!("expected 'package', found {}", kind),
                        ));
                    }
                    break;
                }
                "ERROR" => {
                    // A broken declaration after the header ends it; anything
                    // else is a broken header.
                    let text = get_text(&child, source);
                    let starts_declaration = leading_keyword(&text)
                        .is_some_and(|word| DECLARATION_KEYWORDS.contains(&word));
                    if package.is_none() || !starts_declaration {
                        return Err(ParseError::syntax(
                            file_path,
                            line_of(&child),
                            describe_error(&child, source),
                        ));
                    }
                    break;
                }
                other => {
                    let expected = if package.is_none() {
                        "'package'"
                    } else {
                        "declaration"
                    };
                    return Err(ParseError::syntax(
                        file_path,
                        line_of(&child),
                        format!("expected {}, found {}", expected, other),
                    ));
                }
            }
        }

        let package = package.ok_or_else(|| {
            ParseError::syntax(file_path, 1, "expected 'package', found 'EOF'")
        })?;

        trace!(file = file_path, package = %package, imports = imports.len(), "parsed header");

        Ok(FileHeader { package, imports })
    }

    fn collect_imports(
        &self,
        declaration: &Node,
        source: &str,
        file_path: &str,
        out: &mut Vec<ImportSpec>,
    ) -> Result<()> {
        let mut cursor = QueryCursor::new();
        let matches = cursor.matches(&self.imports, *declaration, source.as_bytes());

        for match_ in matches {
            for capture in match_.captures {
                if capture.index != self.path_capture {
                    continue;
                }
                let literal = get_text(&capture.node, source);
                let line = line_of(&capture.node);
                let path = unquote_import(&literal).ok_or_else(|| {
                    ParseError::syntax(file_path, line, format!("invalid import path: {}", literal))
                })?;

                let alias = capture
                    .node
                    .parent()
                    .and_then(|spec| spec.child_by_field_name("name"))
                    .map(|name| get_text(&name, source));

                out.push(ImportSpec { path, alias, line });
            }
        }

        Ok(())
    }
}

/// Fails if `node` contains an error or missing token.
fn check_clean(node: &Node, source: &str, file_path: &str) -> Result<()> {
    if !node.has_error() {
        return Ok(());
    }
    let culprit = first_error(node).unwrap_or(*node);
    Err(ParseError::syntax(
        file_path,
        line_of(&culprit),
        describe_error(&culprit, source),
    ))
}

fn first_error<'tree>(node: &Node<'tree>) -> Option<Node<'tree>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.has_error() || child.is_missing() {
                if let Some(found) = first_error(&child) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn describe_error(node: &Node, source: &str) -> String {
    if node.is_missing() {
        return format!("missing {}", node.kind());
    }
    let text = get_text(node, source);
    let snippet: String = text.trim().chars().take(32).collect();
    if snippet.is_empty() {
        "syntax error".to_string()
    } else {
        format!("syntax error near {:?}", snippet)
    }
}

/// First word of `text`, skipping whitespace and comments.
fn leading_keyword(text: &str) -> Option<&str> {
    let mut rest = text.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail).trim_start();
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/")?.1.trim_start();
        } else {
            break;
        }
    }
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

fn package_name(clause: &Node, source: &str, file_path: &str) -> Result<String> {
    for i in 0..clause.named_child_count() {
        if let Some(child) = clause.named_child(i) {
            if child.kind() == "package_identifier" {
                return Ok(get_text(&child, source));
            }
        }
    }
    Err(ParseError::syntax(
        file_path,
        line_of(clause),
        "expected package name",
    ))
}

/// Strips the delimiters from an import path literal and validates it.
fn unquote_import(literal: &str) -> Option<String> {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')))?;

    if is_valid_import_path(inner) {
        Some(inner.to_string())
    } else {
        None
    }
}

fn is_valid_import_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| !c.is_control() && !c.is_whitespace() && !ILLEGAL_IMPORT_CHARS.contains(c))
}

// ============================================================================
// Helper functions
// ============================================================================

/// Gets text content of a node.
fn get_text(node: &Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}

fn line_of(node: &Node) -> u32 {
    node.start_position().row as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Result<Vec<String>> {
        let mut extractor = ImportExtractor::new().unwrap();
        extractor.extract(source, "test.go")
    }

    #[test]
    fn test_single_and_grouped_imports() {
        let source = r#"
package main

import "fmt"

import (
    "os"
    str "strings"
    . "math"
    _ "embed"
    "github.com/acme/app/internal/store"
)

func main() {
    fmt.Println(os.Args)
}
"#;
        let imports = extract(source).unwrap();
        assert_eq!(
            imports,
            vec![
                "fmt",
                "os",
                "strings",
                "math",
                "embed",
                "github.com/acme/app/internal/store"
            ]
        );
    }

    #[test]
    fn test_aliases_and_lines() {
        let source = "package main\n\nimport (\n\tstr \"strings\"\n\t_ \"embed\"\n\t\"fmt\"\n)\n";
        let mut extractor = ImportExtractor::new().unwrap();
        let header = extractor.parse_header(source, "test.go").unwrap();

        assert_eq!(header.package, "main");
        assert_eq!(header.imports.len(), 3);
        assert_eq!(header.imports[0].alias.as_deref(), Some("str"));
        assert_eq!(header.imports[0].line, 4);
        assert_eq!(header.imports[1].alias.as_deref(), Some("_"));
        assert_eq!(header.imports[2].alias, None);
        assert_eq!(header.imports[2].path, "fmt");
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let source = "package p\n\nimport \"a\"\nimport \"a\"\nimport \"b\"\n";
        assert_eq!(extract(source).unwrap(), vec!["a", "a", "b"]);
    }

    #[test]
    fn test_raw_string_import() {
        let source = "package p\n\nimport `fmt`\n";
        assert_eq!(extract(source).unwrap(), vec!["fmt"]);
    }

    #[test]
    fn test_no_imports() {
        let source = "// Package p does nothing.\npackage p\n\nfunc F() {}\n";
        assert!(extract(source).unwrap().is_empty());
    }

    #[test]
    fn test_body_errors_are_ignored() {
        let source = "package p\n\nimport \"fmt\"\n\nfunc F() {\n\tfmt.Println(\n}\n";
        assert_eq!(extract(source).unwrap(), vec!["fmt"]);
    }

    #[test]
    fn test_missing_package_clause() {
        let err = extract("import \"fmt\"\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");

        let err = extract("").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 1, .. }), "got {err:?}");
    }

    #[test]
    fn test_malformed_import_section() {
        let err = extract("package p\n\nimport (\n\t\"fmt\"\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn test_package_without_name() {
        let err = extract("package\nimport \"fmt\"\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn test_two_paths_in_one_import() {
        let err = extract("package p\nimport \"fmt\" \"os\"\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 2, .. }), "got {err:?}");
    }

    #[test]
    fn test_stray_tokens_in_header() {
        let err = extract("package p\n\nimport \"fmt\"\n\nbogus\n\nfunc F() {}\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");

        let err = extract("package p\n\n// tools\nimport (\n\t\"fmt\"\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn test_header_ends_at_first_declaration() {
        let source = "package p\n\nimport \"fmt\"\n\nvar x = 1\n\nimport \"os\"\n";
        assert_eq!(extract(source).unwrap(), vec!["fmt"]);
    }

    #[test]
    fn test_leading_keyword_skips_comments() {
        assert_eq!(leading_keyword("  // doc\nfunc F("), Some("func"));
        assert_eq!(leading_keyword("/* a */ type T"), Some("type"));
        assert_eq!(leading_keyword("\"fmt\""), None);
        assert_eq!(leading_keyword("// only a comment"), None);
    }

    #[test]
    fn test_invalid_import_path() {
        let err = extract("package p\n\nimport \"\"\n").unwrap_err();
        match err {
            ParseError::Syntax { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("invalid import path"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(extract("package p\n\nimport \"a b\"\n").is_err());
    }

    #[test]
    fn test_extractor_is_reusable() {
        let mut extractor = ImportExtractor::new().unwrap();
        let first = extractor
            .extract("package a\nimport \"x\"\n", "a.go")
            .unwrap();
        let second = extractor
            .extract("package b\nimport \"y\"\n", "b.go")
            .unwrap();
        assert_eq!(first, vec!["x"]);
        assert_eq!(second, vec!["y"]);
    }
}
