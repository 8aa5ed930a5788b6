/// Python extractor
///
/// This module is organized into focused sub-modules:
/// - symbols: classes, functions, methods, module and class assignments
/// - references: imports, calls, decorators, inheritance and type hints
pub(crate) mod references;
pub(crate) mod symbols;

use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use tree_sitter::{Node, Tree};

/// Python extractor for extracting symbols and references from Python source code
#[derive(Debug, Default, Clone)]
pub struct PythonExtractor {
    config: ExtractorConfig,
}

impl PythonExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    fn context<'a>(&'a self, source: &'a [u8], file_path: &'a str) -> ExtractionContext<'a> {
        ExtractionContext::new("python", file_path, source, &self.config)
    }
}

impl LanguageExtractor for PythonExtractor {
    fn language_name(&self) -> &str {
        "python"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".py", ".pyi"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = self.context(source, file_path);
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
        let ctx = self.context(source, file_path);
        references::extract_references(&ctx, tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        symbols::body_docstring(node, source)
    }
}
