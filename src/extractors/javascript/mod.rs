//! JavaScript extractor
//!
//! Shared ECMAScript walking lives here and is reused by the TypeScript
//! extractor through a `Dialect` value:
//! - symbols: functions, classes, members, variable bindings, CommonJS exports
//! - references: imports, `require()`, calls, `new`, heritage clauses

pub(crate) mod references;
pub(crate) mod symbols;

use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use symbols::SymbolWalker;
use tree_sitter::{Node, Tree};

/// Extra declaration handler a dialect plugs into the shared walker.
/// Returns true when it consumed the node.
pub(crate) type DeclarationHook =
    fn(&mut SymbolWalker<'_, '_>, Node<'_>, Option<&str>, bool) -> bool;

/// Per-language configuration of the shared ECMAScript walker
pub(crate) struct Dialect {
    pub declarations: Option<DeclarationHook>,
}

const JAVASCRIPT: Dialect = Dialect { declarations: None };

#[derive(Debug, Default, Clone)]
pub struct JavaScriptExtractor {
    config: ExtractorConfig,
}

impl JavaScriptExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl LanguageExtractor for JavaScriptExtractor {
    fn language_name(&self) -> &str {
        "javascript"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".js", ".jsx", ".mjs", ".cjs"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = ExtractionContext::new("javascript", file_path, source, &self.config);
        symbols::extract_symbols(&ctx, &JAVASCRIPT, tree.root_node())
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
        let ctx = ExtractionContext::new("javascript", file_path, source, &self.config);
        references::extract_references(&ctx, tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = ExtractionContext::new("javascript", "", source, &self.config);
        symbols::jsdoc(&ctx, node)
    }
}
