/// Rust language extractor with support for:
/// - Structs, enums, unions, traits
/// - Functions, methods, impl blocks (`Type` or `Type::Trait` owners)
/// - Modules, macros, type aliases
/// - Constants, statics
/// - `use` trees, trait impls, supertraits and derives as references
use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use tree_sitter::{Node, Tree};

mod helpers;
mod references;
mod symbols;

/// Rust extractor that handles Rust-specific constructs
#[derive(Debug, Default, Clone)]
pub struct RustExtractor {
    config: ExtractorConfig,
}

impl RustExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl LanguageExtractor for RustExtractor {
    fn language_name(&self) -> &str {
        "rust"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".rs"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = ExtractionContext::new("rust", file_path, source, &self.config);
        symbols::extract_symbols(&ctx, tree.root_node())
    }

    fn extract_references(
        &self,
        tree: Option<&Tree>,
        source: &[u8],
        file_path: &str,
    ) -> Vec<Reference> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = ExtractionContext::new("rust", file_path, source, &self.config);
        references::extract_references(&ctx, tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = ExtractionContext::new("rust", "", source, &self.config);
        helpers::doc_comment(&ctx, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{ReferenceKind, SymbolKind, Visibility};
    use tree_sitter::Parser;

    fn extract_with(config: ExtractorConfig, code: &str) -> (Vec<Symbol>, Vec<Reference>) {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(code, None).unwrap();
        let extractor = RustExtractor::new(config);
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), "src/lib.rs"),
            extractor.extract_references(Some(&tree), code.as_bytes(), "src/lib.rs"),
        )
    }

    fn extract(code: &str) -> (Vec<Symbol>, Vec<Reference>) {
        extract_with(ExtractorConfig::default(), code)
    }

    fn find<'s>(symbols: &'s [Symbol], qualified: &str) -> &'s Symbol {
        symbols
            .iter()
            .find(|s| s.qualified_name == qualified)
            .unwrap_or_else(|| panic!("missing symbol {}", qualified))
    }

    #[test]
    fn test_functions_and_visibility() {
        let code = r#"
/// Runs the thing.
#[inline]
pub async fn run<T>(input: T) -> Result<()> {
    Ok(())
}

pub(crate) fn crate_visible() {}
pub(super) fn parent_visible() {}
fn private() {}
"#;
        let (symbols, _) = extract(code);
        let run = find(&symbols, "run");
        assert_eq!(run.kind, SymbolKind::Function);
        assert_eq!(
            run.signature.as_deref(),
            Some("pub async fn run<T>(input: T) -> Result<()>")
        );
        assert_eq!(run.docstring.as_deref(), Some("Runs the thing."));
        assert!(run.is_exported);

        assert_eq!(find(&symbols, "crate_visible").visibility, Visibility::Public);
        assert_eq!(find(&symbols, "parent_visible").visibility, Visibility::Private);
        assert!(!find(&symbols, "private").is_exported);
    }

    #[test]
    fn test_structs_enums_and_impls() {
        let code = r#"
#[derive(Debug, Clone)]
pub struct Point {
    pub x: f64,
    y: f64,
}

pub enum Shape { Circle, Square }

impl Point {
    pub fn new() -> Self { Point { x: 0.0, y: 0.0 } }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result { Ok(()) }
}
"#;
        let (symbols, refs) = extract(code);
        assert_eq!(find(&symbols, "Point").signature.as_deref(), Some("pub struct Point"));
        let x = find(&symbols, "Point::x");
        assert_eq!(x.kind, SymbolKind::Field);
        assert_eq!(x.signature.as_deref(), Some("x: f64"));
        assert!(!find(&symbols, "Point::y").is_exported);
        assert_eq!(find(&symbols, "Shape::Circle").kind, SymbolKind::Field);

        let new = find(&symbols, "Point::new");
        assert_eq!(new.kind, SymbolKind::Method);
        assert_eq!(new.parent_name.as_deref(), Some("Point"));
        assert!(symbols
            .iter()
            .any(|s| s.qualified_name == "Point::std::fmt::Display::fmt"));

        let implements: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Implements)
            .map(|r| (r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert_eq!(
            implements,
            vec![
                ("Debug", Some("Point")),
                ("Clone", Some("Point")),
                ("Display", Some("Point")),
            ]
        );
    }

    #[test]
    fn test_traits_modules_and_items() {
        let code = r#"
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn len(&self) -> usize { 0 }
}

pub mod cache {
    pub const LIMIT: usize = 10;
    static mut HITS: u64 = 0;
    pub type Key = String;
}

macro_rules! square { ($x:expr) => { $x * $x }; }
"#;
        let (symbols, refs) = extract(code);
        let store = find(&symbols, "Store");
        assert_eq!(store.kind, SymbolKind::Trait);
        assert_eq!(store.signature.as_deref(), Some("pub trait Store: Send + Sync"));
        assert_eq!(
            find(&symbols, "Store::get").signature.as_deref(),
            Some("fn get(&self, key: &str) -> Option<String>")
        );
        assert_eq!(find(&symbols, "Store::len").kind, SymbolKind::Method);

        assert_eq!(find(&symbols, "cache").kind, SymbolKind::Module);
        assert_eq!(
            find(&symbols, "cache::LIMIT").signature.as_deref(),
            Some("pub const LIMIT: usize")
        );
        assert_eq!(find(&symbols, "cache::HITS").kind, SymbolKind::Variable);
        assert_eq!(
            find(&symbols, "cache::Key").signature.as_deref(),
            Some("pub type Key = String")
        );
        assert_eq!(
            find(&symbols, "square").signature.as_deref(),
            Some("macro_rules! square")
        );

        let supertraits: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Inherits)
            .map(|r| r.target_name.as_str())
            .collect();
        assert_eq!(supertraits, vec!["Send", "Sync"]);
    }

    #[test]
    fn test_use_trees_calls_and_macros() {
        let code = r#"
use std::collections::HashMap;
use std::io::{self, Read as R, prelude::*};
use serde::{de::{Deserialize}, Serialize};

impl Server {
    fn start(&self) {
        self.socket.bind(addr());
        println!("up");
    }
}
"#;
        let (_, refs) = extract(code);
        let imports: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Import)
            .map(|r| (r.target_name.as_str(), r.import_path.as_deref().unwrap()))
            .collect();
        assert_eq!(
            imports,
            vec![
                ("HashMap", "std::collections::HashMap"),
                ("self", "std::io::self"),
                ("Read", "std::io::Read"),
                ("*", "std::io::prelude::*"),
                ("Deserialize", "serde::de::Deserialize"),
                ("Serialize", "serde::Serialize"),
            ]
        );

        let calls: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Call)
            .map(|r| (r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert_eq!(
            calls,
            vec![
                ("bind", Some("Server::start")),
                ("addr", Some("Server::start")),
                ("println!", Some("Server::start")),
            ]
        );
    }

    #[test]
    fn test_deep_nesting_stops_at_depth_cap() {
        let depth = 400;
        let mut code = String::new();
        for i in 0..depth {
            code.push_str(&format!("mod m{} {{\n", i));
        }
        code.push_str("fn leaf() {}\n");
        for _ in 0..depth {
            code.push_str("}\n");
        }
        let config = ExtractorConfig {
            max_walk_depth: 64,
            ..Default::default()
        };
        let (symbols, _) = extract_with(config, &code);
        assert!(!symbols.is_empty());
        assert!(symbols.len() <= 66);
        assert!(symbols.iter().all(|s| s.name != "leaf"));
        assert!(symbols.iter().all(|s| s.line_start <= s.line_end));
    }
}
