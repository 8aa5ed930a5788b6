//! C and C++ extractor
//!
//! This module is organized into focused submodules:
//!
//! - `helpers` - declarator navigation, linkage and comment utilities
//! - `symbols` - functions, prototypes, variables, records, enums, typedefs, namespaces
//! - `references` - includes, calls, `new`, base classes
//!
//! Objective-C drives the same walkers with its own `Dialect` hooks.

pub(crate) mod helpers;
pub(crate) mod references;
pub(crate) mod symbols;

use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use tree_sitter::{Node, Tree};

/// Extra symbol handler; returns true when it consumed the node
pub(crate) type SymbolHook =
    fn(&mut symbols::SymbolWalker<'_, '_>, Node<'_>, Option<&str>, usize) -> bool;

/// Extra reference handler; returns true when it consumed the node
pub(crate) type ReferenceHook =
    fn(&mut references::RefWalker<'_, '_>, Node<'_>, Option<&str>, usize) -> bool;

/// Per-language configuration of the C-family walkers
pub(crate) struct Dialect {
    /// Member functions, access specifiers and out-of-line `Type::method`
    pub cpp: bool,
    pub symbols: Option<SymbolHook>,
    pub references: Option<ReferenceHook>,
}

const C: Dialect = Dialect {
    cpp: false,
    symbols: None,
    references: None,
};

const CPP: Dialect = Dialect {
    cpp: true,
    symbols: None,
    references: None,
};

/// C or C++ extractor; the grammar differs but the walk is shared
#[derive(Debug, Default, Clone)]
pub struct CExtractor {
    config: ExtractorConfig,
    cpp: bool,
}

impl CExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config, cpp: false }
    }

    pub fn cpp(config: ExtractorConfig) -> Self {
        Self { config, cpp: true }
    }

    fn dialect(&self) -> &'static Dialect {
        if self.cpp {
            &CPP
        } else {
            &C
        }
    }
}

impl LanguageExtractor for CExtractor {
    fn language_name(&self) -> &str {
        if self.cpp {
            "cpp"
        } else {
            "c"
        }
    }

    fn file_extensions(&self) -> &[&'static str] {
        if self.cpp {
            &[".cpp", ".cc", ".cxx", ".hpp", ".hxx", ".hh"]
        } else {
            &[".c", ".h"]
        }
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = ExtractionContext::new(self.language_name(), file_path, source, &self.config);
        symbols::extract_symbols(&ctx, self.dialect(), helpers::is_header(file_path), tree.root_node())
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
        let ctx = ExtractionContext::new(self.language_name(), file_path, source, &self.config);
        references::extract_references(&ctx, self.dialect(), tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = ExtractionContext::new(self.language_name(), "", source, &self.config);
        helpers::doc_comment(&ctx, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{ReferenceKind, SymbolKind, Visibility};
    use tree_sitter::Parser;

    fn extract_c(code: &str, path: &str) -> (Vec<Symbol>, Vec<Reference>) {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_c::LANGUAGE.into()).unwrap();
        let tree = parser.parse(code, None).unwrap();
        let extractor = CExtractor::default();
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), path),
            extractor.extract_references(Some(&tree), code.as_bytes(), path),
        )
    }

    fn extract_cpp(code: &str) -> (Vec<Symbol>, Vec<Reference>) {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_cpp::LANGUAGE.into()).unwrap();
        let tree = parser.parse(code, None).unwrap();
        let extractor = CExtractor::cpp(ExtractorConfig::default());
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), "src/widget.cpp"),
            extractor.extract_references(Some(&tree), code.as_bytes(), "src/widget.cpp"),
        )
    }

    fn find<'s>(symbols: &'s [Symbol], qualified: &str) -> &'s Symbol {
        symbols
            .iter()
            .find(|s| s.qualified_name == qualified)
            .unwrap_or_else(|| panic!("missing symbol {}", qualified))
    }

    #[test]
    fn test_functions_prototypes_and_variables() {
        let code = r#"
#include <stdio.h>
#include "util.h"

/* Adds two numbers. */
int add(int a, int b) { return a + b; }
static void helper(void) { printf("%d", add(1, 2)); }
char *name_of(int id);
const int LIMIT = 8;
int counter;
"#;
        let (symbols, refs) = extract_c(code, "src/math.c");
        let add = find(&symbols, "add");
        assert_eq!(add.kind, SymbolKind::Function);
        assert_eq!(add.signature.as_deref(), Some("int add(int a, int b)"));
        assert_eq!(add.docstring.as_deref(), Some("Adds two numbers."));
        assert!(!add.is_exported, "source files do not export");

        let helper = find(&symbols, "helper");
        assert_eq!(helper.visibility, Visibility::Private);

        let proto = find(&symbols, "name_of");
        assert_eq!(proto.kind, SymbolKind::Function);
        assert_eq!(proto.signature.as_deref(), Some("char name_of(int id)"));

        let limit = find(&symbols, "LIMIT");
        assert_eq!(limit.kind, SymbolKind::Constant);
        assert_eq!(limit.default_value.as_deref(), Some("8"));
        assert_eq!(find(&symbols, "counter").kind, SymbolKind::Variable);

        let imports: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Import)
            .map(|r| r.target_name.as_str())
            .collect();
        assert_eq!(imports, vec!["stdio.h", "util.h"]);
        let calls: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Call)
            .map(|r| (r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert_eq!(calls, vec![("printf", Some("helper")), ("add", Some("helper"))]);
    }

    #[test]
    fn test_header_records_enums_and_typedefs() {
        let code = r#"
#ifndef SHAPES_H
#define SHAPES_H
struct point { int x, y; char *label; };
enum color { RED, GREEN = 2 };
typedef struct { double w; double h; } size_t2;
typedef unsigned long ulong;
int area(struct point *p);
#endif
"#;
        let (symbols, _) = extract_c(code, "include/shapes.h");
        let point = find(&symbols, "point");
        assert_eq!(point.kind, SymbolKind::Struct);
        assert!(point.is_exported);
        for field in ["point::x", "point::y", "point::label"] {
            assert_eq!(find(&symbols, field).kind, SymbolKind::Field);
        }

        assert_eq!(find(&symbols, "color").kind, SymbolKind::Enum);
        let green = find(&symbols, "color::GREEN");
        assert_eq!(green.kind, SymbolKind::Constant);
        assert_eq!(green.default_value.as_deref(), Some("2"));

        let size = find(&symbols, "size_t2");
        assert_eq!(size.kind, SymbolKind::TypeAlias);
        assert_eq!(size.signature.as_deref(), Some("typedef struct size_t2"));
        assert_eq!(find(&symbols, "size_t2::w").kind, SymbolKind::Field);
        assert_eq!(
            find(&symbols, "ulong").signature.as_deref(),
            Some("typedef unsigned long ulong")
        );
        assert!(find(&symbols, "area").is_exported);
    }

    #[test]
    fn test_cpp_namespaces_classes_and_bases() {
        let code = r#"
namespace gfx {
class Widget : public Base, private Tracked<Widget> {
public:
    Widget();
    void draw() const { render(); }
private:
    int width;
};
}
void gfx::Widget::resize(int w) { auto *p = new Layout(w); }
"#;
        let (symbols, refs) = extract_cpp(code);
        assert_eq!(find(&symbols, "gfx").kind, SymbolKind::Module);
        let widget = find(&symbols, "gfx::Widget");
        assert_eq!(widget.kind, SymbolKind::Class);
        assert_eq!(widget.parent_name.as_deref(), Some("gfx"));

        let draw = find(&symbols, "gfx::Widget::draw");
        assert_eq!(draw.kind, SymbolKind::Method);
        assert_eq!(draw.visibility, Visibility::Public);
        assert_eq!(find(&symbols, "gfx::Widget::Widget").kind, SymbolKind::Method);
        let width = find(&symbols, "gfx::Widget::width");
        assert_eq!(width.kind, SymbolKind::Field);
        assert_eq!(width.visibility, Visibility::Private);

        let resize = find(&symbols, "gfx::Widget::resize");
        assert_eq!(resize.kind, SymbolKind::Method);
        assert_eq!(resize.parent_name.as_deref(), Some("gfx::Widget"));

        let bases: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Inherits)
            .map(|r| (r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert_eq!(
            bases,
            vec![("Base", Some("gfx::Widget")), ("Tracked", Some("gfx::Widget"))]
        );
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Call
            && r.target_name == "render"
            && r.source_name.as_deref() == Some("gfx::Widget::draw")));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Call
            && r.target_name == "Layout"
            && r.source_name.as_deref() == Some("gfx::Widget::resize")));
    }
}
