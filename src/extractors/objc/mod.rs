//! Objective-C extractor
//!
//! Runs the C walkers with an Objective-C dialect; the hooks in `symbols`
//! and `references` handle `@interface`, `@implementation`, `@protocol`,
//! message sends and `@import`. Everything else is plain C.

mod references;
mod symbols;

use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use crate::extractors::c::{self, helpers, Dialect};
use tree_sitter::{Node, Tree};

const OBJC: Dialect = Dialect {
    cpp: false,
    symbols: Some(symbols::extract_declaration),
    references: Some(references::extract_reference),
};

#[derive(Debug, Default, Clone)]
pub struct ObjCExtractor {
    config: ExtractorConfig,
}

impl ObjCExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl LanguageExtractor for ObjCExtractor {
    fn language_name(&self) -> &str {
        "objc"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".m", ".mm"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = ExtractionContext::new("objc", file_path, source, &self.config);
        c::symbols::extract_symbols(&ctx, &OBJC, helpers::is_header(file_path), tree.root_node())
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
        let ctx = ExtractionContext::new("objc", file_path, source, &self.config);
        c::references::extract_references(&ctx, &OBJC, tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = ExtractionContext::new("objc", "", source, &self.config);
        helpers::doc_comment(&ctx, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{ReferenceKind, SymbolKind};
    use tree_sitter::Parser;

    fn extract(code: &str) -> (Vec<Symbol>, Vec<Reference>) {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_objc::LANGUAGE.into()).unwrap();
        let tree = parser.parse(code, None).unwrap();
        let extractor = ObjCExtractor::default();
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), "Sources/Widget.m"),
            extractor.extract_references(Some(&tree), code.as_bytes(), "Sources/Widget.m"),
        )
    }

    #[test]
    fn test_interface_and_implementation() {
        let code = r#"
@interface Widget : NSObject
- (void)draw;
+ (instancetype)widgetWithName:(NSString *)name size:(int)size;
@end

@implementation Widget
- (void)draw {
    [self render];
}
@end
"#;
        let (symbols, refs) = extract(code);
        let classes: Vec<_> = symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Class)
            .map(|s| (s.name.as_str(), s.is_exported))
            .collect();
        assert_eq!(classes, vec![("Widget", true), ("Widget", false)]);

        let interface = &symbols[0];
        assert_eq!(interface.signature.as_deref(), Some("@interface Widget : NSObject"));

        let methods: Vec<_> = symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Method)
            .map(|s| s.qualified_name.as_str())
            .collect();
        assert!(methods.contains(&"Widget.draw"));
        assert!(methods.contains(&"Widget.widgetWithName:size:"));

        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Inherits
            && r.target_name == "NSObject"
            && r.source_name.as_deref() == Some("Widget")));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Call
            && r.target_name == "render"
            && r.source_name.as_deref() == Some("Widget.draw")));
    }

    #[test]
    fn test_category_and_protocol() {
        let code = r#"
@protocol Drawable
- (void)draw;
@end

@interface Widget (Layout)
- (void)layout;
@end
"#;
        let (symbols, _) = extract(code);
        let protocol = symbols.iter().find(|s| s.name == "Drawable").unwrap();
        assert_eq!(protocol.kind, SymbolKind::Interface);
        assert_eq!(protocol.signature.as_deref(), Some("@protocol Drawable"));
        assert!(symbols.iter().any(|s| s.name == "Widget(Layout)"));
        assert!(symbols
            .iter()
            .any(|s| s.qualified_name == "Widget(Layout).layout"));
    }

    #[test]
    fn test_imports() {
        let code = "#import <Foundation/Foundation.h>\n#include \"util.h\"\n";
        let (_, refs) = extract(code);
        let paths: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Import)
            .filter_map(|r| r.import_path.as_deref())
            .collect();
        assert!(paths.contains(&"util.h"));
    }

    #[test]
    fn test_plain_c_still_extracted() {
        let code = "static int counter = 0;\nint add(int a, int b) { return a + b; }\n";
        let (symbols, _) = extract(code);
        assert!(symbols
            .iter()
            .any(|s| s.name == "add" && s.kind == SymbolKind::Function));
    }
}
