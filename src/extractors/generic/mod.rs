//! Generic config-driven extractor
//!
//! One walker serves every grammar that speaks the common tree-sitter
//! vocabulary (`class_declaration`, `function_item`, `field_declaration`...).
//! Per-language differences live in two places:
//! - `tables`: node-type sets plus extends/trait/property rules keyed by
//!   language name
//! - `Profile`: optional hooks for classification, naming, visibility,
//!   properties and inheritance, used by the Kotlin and Swift backends
//!
//! The shared walkers never branch on the language name themselves.

pub(crate) mod kotlin;
pub(crate) mod references;
pub(crate) mod swift;
pub(crate) mod symbols;
pub(crate) mod tables;

use crate::config::ExtractorConfig;
use crate::extractors::base::{
    children, strip_comment_markers, ExtractionContext, LanguageExtractor, Reference, Symbol,
    SymbolKind, Visibility,
};
use references::RefWalker;
use symbols::SymbolWalker;
use tree_sitter::{Node, Tree};

/// Overrides the shared classification; `None` falls through to the tables
pub(crate) type ClassifyHook = fn(&Node) -> Option<SymbolKind>;
/// Overrides the shared name lookup; `None` falls through
pub(crate) type NameHook = fn(&ExtractionContext, &Node) -> Option<String>;
pub(crate) type VisibilityHook = fn(&ExtractionContext, &Node) -> Visibility;
/// Extracts properties of `class` whose members live in `body`
pub(crate) type PropertyHook = fn(&mut SymbolWalker<'_, '_>, Node<'_>, Node<'_>, &str);
/// Emits inheritance edges for a class-like node; false defers to the tables
pub(crate) type InheritanceHook =
    fn(&mut RefWalker<'_, '_>, Node<'_>, &SymbolKind, &str) -> bool;

/// Language-specific overrides plugged into the shared walkers
pub(crate) struct Profile {
    pub extensions: &'static [&'static str],
    pub classify: Option<ClassifyHook>,
    pub name: Option<NameHook>,
    pub visibility: Option<VisibilityHook>,
    pub properties: Option<PropertyHook>,
    pub inheritance: Option<InheritanceHook>,
}

/// Table-only profile used for any language without hooks
pub(crate) static PLAIN: Profile = Profile {
    extensions: &[],
    classify: None,
    name: None,
    visibility: None,
    properties: None,
    inheritance: None,
};

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl Profile {
    pub(crate) fn for_language(language: &str) -> &'static Profile {
        match language {
            "kotlin" => &kotlin::KOTLIN,
            "swift" => &swift::SWIFT,
            _ => &PLAIN,
        }
    }

    pub(crate) fn classify(&self, node: &Node) -> Option<SymbolKind> {
        self.classify
            .and_then(|hook| hook(node))
            .or_else(|| tables::classify(node.kind()))
    }

    /// `name` field, else the first identifier-like child
    pub(crate) fn name(&self, ctx: &ExtractionContext, node: &Node) -> Option<String> {
        if let Some(name) = self.name.and_then(|hook| hook(ctx, node)) {
            return Some(name);
        }
        if let Some(name) = ctx.get_field_text(node, "name") {
            return Some(name);
        }
        children(node)
            .into_iter()
            .find(|c| tables::NAME_CHILD_TYPES.contains(&c.kind()))
            .map(|c| ctx.get_node_text(&c).trim().to_string())
            .filter(|n| !n.is_empty())
    }
}

/// Comment immediately before `node`, markers stripped
pub(crate) fn doc_comment(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let prev = node.prev_sibling()?;
    if !tables::COMMENT_TYPES.contains(&prev.kind()) {
        return None;
    }
    let text = strip_comment_markers(&ctx.get_node_text(&prev));
    (!text.is_empty()).then_some(text)
}

/// Visibility keyword inside a `modifiers` child (`private(set)` -> private)
pub(crate) fn modifier_visibility(ctx: &ExtractionContext, node: &Node) -> Option<Visibility> {
    let modifiers = ctx.find_child_by_type(node, "modifiers")?;
    ctx.descendants(&modifiers, 2)
        .into_iter()
        .filter(|n| n.kind() == "visibility_modifier")
        .find_map(|n| {
            let text = ctx.get_node_text(&n);
            let keyword = text.split('(').next().unwrap_or_default().trim().to_string();
            Visibility::from_keyword(&keyword)
        })
}

/// Config-driven extractor for tier-2 and unknown languages
#[derive(Debug, Clone)]
pub struct GenericExtractor {
    config: ExtractorConfig,
    language: String,
    profile: &'static Profile,
}

impl GenericExtractor {
    pub fn new(language: impl Into<String>, config: ExtractorConfig) -> Self {
        let language = language.into();
        let profile = Profile::for_language(&language);
        Self {
            config,
            language,
            profile,
        }
    }

    fn context<'a>(&'a self, source: &'a [u8], file_path: &'a str) -> ExtractionContext<'a> {
        ExtractionContext::new(&self.language, file_path, source, &self.config)
    }
}

impl LanguageExtractor for GenericExtractor {
    fn language_name(&self) -> &str {
        &self.language
    }

    fn file_extensions(&self) -> &[&'static str] {
        self.profile.extensions
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = self.context(source, file_path);
        symbols::extract_symbols(&ctx, self.profile, tree.root_node())
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
        references::extract_references(&ctx, self.profile, tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = self.context(source, "");
        doc_comment(&ctx, node)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tree_sitter::Parser;

    pub(crate) fn extract(
        language: &str,
        grammar: tree_sitter::Language,
        code: &str,
    ) -> (Vec<Symbol>, Vec<Reference>) {
        let mut parser = Parser::new();
        parser.set_language(&grammar).unwrap();
        let tree = parser.parse(code, None).unwrap();
        let extractor = GenericExtractor::new(language, ExtractorConfig::default());
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), "src/file"),
            extractor.extract_references(Some(&tree), code.as_bytes(), "src/file"),
        )
    }

    pub(crate) fn find<'s>(symbols: &'s [Symbol], qualified: &str) -> &'s Symbol {
        symbols
            .iter()
            .find(|s| s.qualified_name == qualified)
            .unwrap_or_else(|| panic!("missing symbol {}", qualified))
    }
}
