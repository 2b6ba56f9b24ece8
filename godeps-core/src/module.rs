//! `go.mod` reading.
//!
//! Only the directives godeps cares about are interpreted (`module` and `go`).
//! Every other known directive is accepted and skipped, including its block
//! form, so that real-world module files parse cleanly.

use crate::error::ModuleError;
use std::path::{Path, PathBuf};

/// File name of a Go module declaration.
pub const MODULE_FILE_NAME: &str = "go.mod";

/// Directives accepted by the Go toolchain.
const KNOWN_VERBS: &[&str] = &[
    "module",
    "go",
    "toolchain",
    "godebug",
    "require",
    "exclude",
    "replace",
    "retract",
    "tool",
    "ignore",
];

/// The parts of a `go.mod` file godeps uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    /// The module path, used as the module root for package names.
    pub module_path: String,

    /// Language version from the `go` directive, if any.
    pub go_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    LParen,
    RParen,
}

impl Token {
    fn text(&self) -> Option<&str> {
        match self {
            Token::Word(s) | Token::Quoted(s) => Some(s),
            _ => None,
        }
    }
}

impl ModuleFile {
    /// Parses the contents of a `go.mod` file.
    ///
    /// `path` is only used in error messages.
    pub fn parse(path: &str, contents: &str) -> Result<Self, ModuleError> {
        let mut module_path: Option<String> = None;
        let mut go_version: Option<String> = None;
        // Verb of the block we are inside, with the line it opened on.
        let mut block: Option<(String, u32)> = None;

        for (idx, raw) in contents.lines().enumerate() {
            let line = idx as u32 + 1;
            let tokens =
                tokenize(raw).map_err(|msg| ModuleError::malformed(path, line, msg))?;
            if tokens.is_empty() {
                continue;
            }

            if let Some((verb, _)) = &block {
                if tokens == [Token::RParen] {
                    block = None;
                    continue;
                }
                let verb = verb.clone();
                apply_directive(
                    path,
                    line,
                    &verb,
                    &tokens,
                    &mut module_path,
                    &mut go_version,
                )?;
                continue;
            }

            let verb = match &tokens[0] {
                Token::Word(w) => w.clone(),
                _ => return Err(ModuleError::malformed(path, line, "syntax error")),
            };
            if !KNOWN_VERBS.contains(&verb.as_str()) {
                return Err(ModuleError::malformed(
                    path,
                    line,
                    format!("unknown directive: {}", verb),
                ));
            }

            let args = &tokens[1..];
            match args {
                [Token::LParen] => {
                    block = Some((verb, line));
                }
                [Token::LParen, Token::RParen] => {}
                _ => apply_directive(
                    path,
                    line,
                    &verb,
                    args,
                    &mut module_path,
                    &mut go_version,
                )?,
            }
        }

        if let Some((verb, opened)) = block {
            return Err(ModuleError::malformed(
                path,
                opened,
                format!("unterminated {} block", verb),
            ));
        }

        let module_path = module_path.ok_or_else(|| ModuleError::MissingDirective {
            path: PathBuf::from(path),
        })?;

        Ok(Self {
            module_path,
            go_version,
        })
    }
}

fn apply_directive(
    path: &str,
    line: u32,
    verb: &str,
    args: &[Token],
    module_path: &mut Option<String>,
    go_version: &mut Option<String>,
) -> Result<(), ModuleError> {
    if args.iter().any(|t| matches!(t, Token::LParen | Token::RParen)) {
        return Err(ModuleError::malformed(path, line, "unexpected parenthesis"));
    }

    match verb {
        "module" => {
            if module_path.is_some() {
                return Err(ModuleError::malformed(path, line, "repeated module statement"));
            }
            let [arg] = args else {
                return Err(ModuleError::malformed(
                    path,
                    line,
                    "usage: module module/path",
                ));
            };
            let value = arg.text().unwrap_or_default().trim();
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(ModuleError::malformed(
                    path,
                    line,
                    format!("invalid module path {:?}", value),
                ));
            }
            *module_path = Some(value.to_string());
        }
        "go" => {
            let [arg] = args else {
                return Err(ModuleError::malformed(path, line, "usage: go 1.23"));
            };
            *go_version = arg.text().map(str::to_string);
        }
        _ => {}
    }
    Ok(())
}

/// Splits one line into tokens, dropping `//` comments.
fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' if line[start..].starts_with("//") => break,
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        },
                        _ => value.push(c),
                    }
                }
                if !closed {
                    return Err("unterminated quoted string".to_string());
                }
                tokens.push(Token::Quoted(value));
            }
            '`' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '`' {
                        closed = true;
                        break;
                    }
                    value.push(c);
                }
                if !closed {
                    return Err("unterminated raw string".to_string());
                }
                tokens.push(Token::Quoted(value));
            }
            _ => {
                let mut end = line.len();
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '`')
                        || line[idx..].starts_with("//")
                    {
                        end = idx;
                        break;
                    }
                    chars.next();
                }
                tokens.push(Token::Word(line[start..end].to_string()));
            }
        }
    }

    Ok(tokens)
}

/// Returns true if the path names a `go.mod` file.
pub fn is_module_file(path: &Path) -> bool {
    path.file_name().map_or(false, |name| name == MODULE_FILE_NAME)
}

/// Picks the module file closest to the tree root.
///
/// Ties at the same depth go to the lexically smallest path.
pub fn select_module_file(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates
        .iter()
        .filter(|p| is_module_file(p))
        .min_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        })
}
