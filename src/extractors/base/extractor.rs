// Extractor interface and per-call extraction context
//
// `LanguageExtractor` is the capability set every backend implements.
// `ExtractionContext` carries everything one extraction call needs (source
// bytes, path, limits) so backends stay stateless and reentrant.

use std::path::Path;
use tracing::trace;
use tree_sitter::{Node, Tree};

use super::tree_methods::{first_line_signature, node_text};
use super::types::{Reference, ReferenceKind, Symbol, SymbolKind, SymbolOptions};
use crate::config::ExtractorConfig;

/// Capability set shared by every language backend
///
/// Both extraction calls are pure over `(tree, source, file_path)`. `tree` is
/// `None` for regex/binary backends that never parse.
pub trait LanguageExtractor: Send + Sync {
    /// Canonical language name (`"python"`, `"c_sharp"`, `"foxpro"`)
    fn language_name(&self) -> &str;

    /// File extensions this backend claims, with leading dot
    fn file_extensions(&self) -> &[&'static str];

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str)
        -> Vec<Symbol>;

    fn extract_references(
        &self,
        tree: Option<&Tree>,
        source: &[u8],
        file_path: &str,
    ) -> Vec<Reference>;

    /// First source line of a node with a trailing `{` or `:` stripped
    fn get_signature(&self, node: &Node, source: &[u8]) -> Option<String> {
        first_line_signature(node, source)
    }

    fn get_docstring(&self, _node: &Node, _source: &[u8]) -> Option<String> {
        None
    }
}

/// Per-call state threaded through recursive walkers
#[derive(Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub language: &'a str,
    pub file_path: &'a str,
    pub source: &'a [u8],
    pub config: &'a ExtractorConfig,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(
        language: &'a str,
        file_path: &'a str,
        source: &'a [u8],
        config: &'a ExtractorConfig,
    ) -> Self {
        Self {
            language,
            file_path,
            source,
            config,
        }
    }

    /// Get text from a tree-sitter node
    pub fn get_node_text(&self, node: &Node) -> String {
        node_text(node, self.source)
    }

    /// Text of a node with one pair of surrounding parentheses removed
    pub fn params_text(&self, node: Option<Node>) -> String {
        let Some(node) = node else {
            return String::new();
        };
        let text = self.get_node_text(&node);
        let trimmed = text.trim();
        trimmed
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .unwrap_or(trimmed)
            .to_string()
    }

    pub fn get_signature(&self, node: &Node) -> Option<String> {
        first_line_signature(node, self.source)
    }

    pub fn start_line(&self, node: &Node) -> u32 {
        node.start_position().row as u32 + 1
    }

    pub fn end_line(&self, node: &Node) -> u32 {
        node.end_position().row as u32 + 1
    }

    /// File name without directories
    pub fn file_name(&self) -> &'a str {
        self.file_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file_path)
    }

    /// File name without directories or its last extension
    /// (`my.util.prg` -> `my.util`)
    pub fn file_stem(&self) -> &'a str {
        let base = self.file_name();
        Path::new(base)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(base)
    }

    /// True once a walker has descended past `limit`; logs the truncation
    pub fn depth_exceeded(&self, depth: usize, limit: usize) -> bool {
        if depth > limit {
            trace!(
                "Depth cap {} reached while walking {} ({})",
                limit,
                self.file_path,
                self.language
            );
            return true;
        }
        false
    }

    /// Create a symbol spanning `node`
    pub fn symbol(
        &self,
        node: &Node,
        name: impl Into<String>,
        kind: SymbolKind,
        options: SymbolOptions,
    ) -> Symbol {
        Symbol::new(name, kind, self.start_line(node), self.end_line(node), options)
    }

    /// Create a reference at the start line of `node`
    pub fn reference(
        &self,
        kind: ReferenceKind,
        target: impl Into<String>,
        node: &Node,
        scope: Option<&str>,
    ) -> Reference {
        Reference::new(kind, target, self.start_line(node), scope)
    }
}

/// Build `parent + separator + name`, or just `name` at the root
pub fn qualify(parent: Option<&str>, name: &str, separator: &str) -> String {
    match parent {
        Some(p) if !p.is_empty() => format!("{}{}{}", p, separator, name),
        _ => name.to_string(),
    }
}

/// Last segment of a scoped name (`a.b.C` -> `C`, `App\Models\User` -> `User`)
pub fn last_segment<'s>(name: &'s str, separators: &[&str]) -> &'s str {
    let mut tail = name;
    for sep in separators {
        if let Some(idx) = tail.rfind(sep) {
            tail = &tail[idx + sep.len()..];
        }
    }
    tail
}

/// Strip one pair of matching quotes
pub fn unquote(text: &str) -> &str {
    let t = text.trim();
    for q in ['"', '\'', '`'] {
        if t.len() >= 2 && t.starts_with(q) && t.ends_with(q) {
            return &t[1..t.len() - 1];
        }
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_and_segments() {
        assert_eq!(qualify(None, "run", "."), "run");
        assert_eq!(qualify(Some("Outer"), "run", "::"), "Outer::run");
        assert_eq!(last_segment("a.b.C", &["."]), "C");
        assert_eq!(last_segment("App\\Models\\User", &["\\"]), "User");
        assert_eq!(last_segment("std::io::Read", &["::", "."]), "Read");
        assert_eq!(last_segment("plain", &["."]), "plain");
    }

    #[test]
    fn test_file_stem() {
        let config = ExtractorConfig::default();
        let ctx = ExtractionContext::new("foxpro", "forms/Main.Form.scx", b"", &config);
        assert_eq!(ctx.file_stem(), "Main.Form");
        let ctx = ExtractionContext::new("foxpro", "C:\\src\\util.prg", b"", &config);
        assert_eq!(ctx.file_stem(), "util");
        let ctx = ExtractionContext::new("foxpro", "lib/my.util.prg", b"", &config);
        assert_eq!(ctx.file_stem(), "my.util");
        let ctx = ExtractionContext::new("foxpro", ".startup", b"", &config);
        assert_eq!(ctx.file_stem(), ".startup");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"hello\""), "hello");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("bare"), "bare");
    }
}
