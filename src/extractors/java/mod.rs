/// Java extractor
///
/// This module is organized into focused sub-modules:
/// - helpers: modifiers, annotations, heritage clauses, Javadoc
/// - symbols: packages, types, enum constants, methods, constructors, fields
/// - references: imports, invocations, object creation, inheritance
///
/// Apex reuses both walkers through a `Dialect` carrying its own visibility
/// rule and a class post-processing hook.
pub(crate) mod helpers;
pub(crate) mod references;
pub(crate) mod symbols;

use crate::config::ExtractorConfig;
use crate::extractors::base::{
    ExtractionContext, LanguageExtractor, Reference, Symbol, Visibility,
};
use helpers::{has_modifier, javadoc};
use tree_sitter::{Node, Tree};

/// Adjusts a freshly built type symbol before it is recorded
pub(crate) type ClassHook = fn(&ExtractionContext<'_>, &Node<'_>, &mut Symbol);

/// Per-language rules layered on the shared Java walkers
pub(crate) struct Dialect {
    /// Visibility from modifier keywords
    pub visibility: fn(&[String]) -> Visibility,
    pub class_hook: Option<ClassHook>,
}

const JAVA: Dialect = Dialect {
    visibility: java_visibility,
    class_hook: None,
};

/// No access modifier means package-private
fn java_visibility(modifiers: &[String]) -> Visibility {
    if has_modifier(modifiers, "private") {
        Visibility::Private
    } else if has_modifier(modifiers, "protected") {
        Visibility::Protected
    } else if has_modifier(modifiers, "public") {
        Visibility::Public
    } else {
        Visibility::Package
    }
}

#[derive(Debug, Default, Clone)]
pub struct JavaExtractor {
    config: ExtractorConfig,
}

impl JavaExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl LanguageExtractor for JavaExtractor {
    fn language_name(&self) -> &str {
        "java"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".java"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = ExtractionContext::new("java", file_path, source, &self.config);
        symbols::extract_symbols(&ctx, &JAVA, tree.root_node())
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
        let ctx = ExtractionContext::new("java", file_path, source, &self.config);
        references::extract_references(&ctx, tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = ExtractionContext::new("java", "", source, &self.config);
        javadoc(&ctx, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{ReferenceKind, SymbolKind};
    use tree_sitter::Parser;

    fn extract(code: &str) -> (Vec<Symbol>, Vec<Reference>) {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_java::LANGUAGE.into()).unwrap();
        let tree = parser.parse(code, None).unwrap();
        let extractor = JavaExtractor::default();
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), "src/Main.java"),
            extractor.extract_references(Some(&tree), code.as_bytes(), "src/Main.java"),
        )
    }

    fn find<'s>(symbols: &'s [Symbol], qualified: &str) -> &'s Symbol {
        symbols
            .iter()
            .find(|s| s.qualified_name == qualified)
            .unwrap_or_else(|| panic!("missing symbol {}", qualified))
    }

    #[test]
    fn test_package_and_class_heritage() {
        let code = r#"
package com.acme.store;

/** Keeps orders. */
@Service
public class OrderRepo extends BaseRepo<Order> implements Repo, java.io.Closeable {
}
"#;
        let (symbols, refs) = extract(code);
        let package = find(&symbols, "com.acme.store");
        assert_eq!(package.kind, SymbolKind::Module);
        assert_eq!(package.signature.as_deref(), Some("package com.acme.store"));

        let repo = find(&symbols, "OrderRepo");
        assert_eq!(repo.kind, SymbolKind::Class);
        assert_eq!(repo.visibility, Visibility::Public);
        assert!(repo.is_exported);
        assert_eq!(repo.docstring.as_deref(), Some("Keeps orders."));
        assert_eq!(
            repo.signature.as_deref(),
            Some("@Service\nclass OrderRepo extends BaseRepo<Order> implements Repo, java.io.Closeable")
        );

        let heritage: Vec<_> = refs
            .iter()
            .filter(|r| matches!(r.kind, ReferenceKind::Inherits | ReferenceKind::Implements))
            .map(|r| (r.kind.as_str(), r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert_eq!(
            heritage,
            vec![
                ("inherits", "BaseRepo", Some("OrderRepo")),
                ("implements", "Repo", Some("OrderRepo")),
                ("implements", "Closeable", Some("OrderRepo")),
            ]
        );
    }

    #[test]
    fn test_members_and_modifiers() {
        let code = r#"
class Counter {
    public static final int MAX = 10;
    private int count;
    Counter(int start) { count = start; }
    @Override
    public static <T> List<T> wrap(T item) throws IOException { return null; }
    protected void reset() {}
}
"#;
        let (symbols, _) = extract(code);
        let counter = find(&symbols, "Counter");
        assert_eq!(counter.visibility, Visibility::Package);
        assert!(!counter.is_exported);

        let max = find(&symbols, "Counter.MAX");
        assert_eq!(max.kind, SymbolKind::Constant);
        assert_eq!(max.signature.as_deref(), Some("static final int MAX"));
        assert_eq!(max.default_value.as_deref(), Some("10"));

        let count = find(&symbols, "Counter.count");
        assert_eq!(count.kind, SymbolKind::Field);
        assert_eq!(count.visibility, Visibility::Private);

        let ctor = find(&symbols, "Counter.Counter");
        assert_eq!(ctor.kind, SymbolKind::Constructor);
        assert_eq!(ctor.signature.as_deref(), Some("Counter(int start)"));

        let wrap = find(&symbols, "Counter.wrap");
        assert_eq!(
            wrap.signature.as_deref(),
            Some("@Override\nstatic <T> List<T> wrap(T item) throws IOException")
        );
        assert_eq!(find(&symbols, "Counter.reset").visibility, Visibility::Protected);
    }

    #[test]
    fn test_enums_interfaces_and_records() {
        let code = r#"
public enum Color { RED, GREEN; int code() { return 1; } }
interface Shape extends Drawable, Sizable { double PI = 3.14; double area(); }
record Point(int x, int y) {}
"#;
        let (symbols, refs) = extract(code);
        assert_eq!(find(&symbols, "Color").kind, SymbolKind::Enum);
        let red = find(&symbols, "Color.RED");
        assert_eq!(red.kind, SymbolKind::Constant);
        assert!(red.is_exported);
        assert_eq!(find(&symbols, "Color.code").kind, SymbolKind::Method);

        assert_eq!(find(&symbols, "Shape").kind, SymbolKind::Interface);
        assert_eq!(find(&symbols, "Shape.PI").kind, SymbolKind::Constant);
        assert_eq!(find(&symbols, "Shape.area").kind, SymbolKind::Method);
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Inherits
            && r.target_name == "Sizable"
            && r.source_name.as_deref() == Some("Shape")));

        assert_eq!(
            find(&symbols, "Point").signature.as_deref(),
            Some("record Point(int x, int y)")
        );
    }

    #[test]
    fn test_imports_calls_and_creation() {
        let code = r#"
import java.util.List;
import java.util.concurrent.*;

class App {
    void run() {
        List<String> items = new ArrayList<String>();
        logger.info(format(items));
    }
}
"#;
        let (_, refs) = extract(code);
        let imports: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Import)
            .map(|r| (r.target_name.as_str(), r.import_path.as_deref()))
            .collect();
        assert_eq!(
            imports,
            vec![
                ("List", Some("java.util.List")),
                ("*", Some("java.util.concurrent.*")),
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
                ("ArrayList", Some("App.run")),
                ("logger.info", Some("App.run")),
                ("format", Some("App.run")),
            ]
        );
    }
}
