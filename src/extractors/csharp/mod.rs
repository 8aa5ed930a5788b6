// C# Language Extractor
//
// Handles C#-specific constructs including:
// - Block and file-scoped namespaces, using directives (static, aliased)
// - Classes, interfaces, structs, records and enums
// - Methods, constructors (including primary constructors), destructors
// - Fields, properties, indexers, events, delegates and operators
// - Local functions nested in member bodies
// - Base lists, attributes and nullable type references

mod helpers;
mod references;
mod symbols;

use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use tree_sitter::{Node, Tree};

/// C# extractor using tree-sitter-c-sharp parser
#[derive(Debug, Default, Clone)]
pub struct CSharpExtractor {
    config: ExtractorConfig,
}

impl CSharpExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl LanguageExtractor for CSharpExtractor {
    fn language_name(&self) -> &str {
        "c_sharp"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".cs"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = ExtractionContext::new("c_sharp", file_path, source, &self.config);
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
        let ctx = ExtractionContext::new("c_sharp", file_path, source, &self.config);
        references::extract_references(&ctx, tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = ExtractionContext::new("c_sharp", "", source, &self.config);
        helpers::xml_doc(&ctx, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{ReferenceKind, SymbolKind, Visibility};
    use tree_sitter::Parser;

    fn extract(code: &str) -> (Vec<Symbol>, Vec<Reference>) {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(code, None).unwrap();
        let extractor = CSharpExtractor::default();
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), "Services/OrderService.cs"),
            extractor.extract_references(Some(&tree), code.as_bytes(), "Services/OrderService.cs"),
        )
    }

    fn find<'s>(symbols: &'s [Symbol], qualified: &str) -> &'s Symbol {
        symbols
            .iter()
            .find(|s| s.qualified_name == qualified)
            .unwrap_or_else(|| panic!("missing symbol {}", qualified))
    }

    #[test]
    fn test_namespace_class_and_base_list() {
        let code = r#"
using System.Text;
using Json = Newtonsoft.Json;

namespace Shop.Orders
{
    /// <summary>Handles orders.</summary>
    public sealed class OrderService : ServiceBase, IDisposable
    {
        public void Dispose() { }
    }
}
"#;
        let (symbols, refs) = extract(code);
        assert_eq!(find(&symbols, "Shop.Orders").kind, SymbolKind::Module);
        let service = find(&symbols, "Shop.Orders.OrderService");
        assert_eq!(service.kind, SymbolKind::Class);
        assert_eq!(
            service.signature.as_deref(),
            Some("sealed class OrderService : ServiceBase, IDisposable")
        );
        assert_eq!(service.docstring.as_deref(), Some("<summary>Handles orders.</summary>"));
        assert!(service.is_exported);

        let heritage: Vec<_> = refs
            .iter()
            .filter(|r| matches!(r.kind, ReferenceKind::Inherits | ReferenceKind::Implements))
            .map(|r| (r.kind.clone(), r.target_name.as_str()))
            .collect();
        assert_eq!(
            heritage,
            vec![
                (ReferenceKind::Inherits, "ServiceBase"),
                (ReferenceKind::Implements, "IDisposable"),
            ]
        );

        let imports: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Import)
            .map(|r| (r.target_name.as_str(), r.import_path.as_deref()))
            .collect();
        assert_eq!(
            imports,
            vec![("Text", Some("System.Text")), ("Json", Some("Newtonsoft.Json"))]
        );
    }

    #[test]
    fn test_interface_first_base_implements() {
        let code = "class Repo : IRepository { }\n";
        let (symbols, refs) = extract(code);
        // Top-level types without modifiers are internal
        assert_eq!(find(&symbols, "Repo").visibility, Visibility::Internal);
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Implements
            && r.target_name == "IRepository"
            && r.source_name.as_deref() == Some("Repo")));
    }

    #[test]
    fn test_members_and_default_visibility() {
        let code = r#"
public class Cart
{
    private const int MaxItems = 50;
    static readonly string Prefix = "c";
    int count;
    public decimal Total { get; private set; }
    public Item this[int index] => items[index];
    public event EventHandler Changed;
    public Cart(int size) { }
    ~Cart() { }
    public static Cart operator +(Cart a, Cart b) => a;
    public async Task<int> SaveAsync<T>(T item) where T : class
    {
        int Helper() => 1;
        return Helper();
    }
}
"#;
        let (symbols, _) = extract(code);
        let max = find(&symbols, "Cart.MaxItems");
        assert_eq!(max.kind, SymbolKind::Constant);
        assert_eq!(max.signature.as_deref(), Some("const int MaxItems"));
        assert_eq!(max.default_value.as_deref(), Some("50"));
        assert_eq!(find(&symbols, "Cart.Prefix").kind, SymbolKind::Constant);

        let count = find(&symbols, "Cart.count");
        assert_eq!(count.kind, SymbolKind::Field);
        assert_eq!(count.visibility, Visibility::Private);

        let total = find(&symbols, "Cart.Total");
        assert_eq!(total.kind, SymbolKind::Property);
        assert_eq!(
            total.signature.as_deref(),
            Some("decimal Total { get; private set; }")
        );
        assert_eq!(find(&symbols, "Cart.this").kind, SymbolKind::Property);
        assert_eq!(find(&symbols, "Cart.Changed").kind, SymbolKind::Event);
        assert_eq!(find(&symbols, "Cart.Cart").kind, SymbolKind::Constructor);
        assert_eq!(find(&symbols, "Cart.~Cart").visibility, Visibility::Private);
        assert_eq!(find(&symbols, "Cart.operator+").kind, SymbolKind::Method);

        let save = find(&symbols, "Cart.SaveAsync");
        assert_eq!(
            save.signature.as_deref(),
            Some("async Task<int> SaveAsync<T>(T item) where T : class")
        );
        let helper = find(&symbols, "Cart.SaveAsync.Helper");
        assert_eq!(helper.kind, SymbolKind::Method);
        assert!(!helper.is_exported);
    }

    #[test]
    fn test_interface_members_default_public() {
        let code = "public interface IStore\n{\n    void Put(string key);\n}\n";
        let (symbols, _) = extract(code);
        let put = find(&symbols, "IStore.Put");
        assert_eq!(put.visibility, Visibility::Public);
        assert!(put.is_exported);
    }

    #[test]
    fn test_enums_records_and_delegates() {
        let code = r#"
namespace App;

public enum Status : byte { Active = 1, Closed }
public record Point(int X, int Y);
public delegate void Notify(string message);
"#;
        let (symbols, _) = extract(code);
        let status = find(&symbols, "App.Status");
        assert_eq!(status.signature.as_deref(), Some("enum Status : byte"));
        assert_eq!(find(&symbols, "App.Status.Active").kind, SymbolKind::Constant);
        assert_eq!(find(&symbols, "App.Status.Closed").kind, SymbolKind::Constant);

        let point = find(&symbols, "App.Point");
        assert_eq!(point.kind, SymbolKind::Class);
        assert_eq!(
            find(&symbols, "App.Point.Point").signature.as_deref(),
            Some("Point(int X, int Y)")
        );
        assert_eq!(find(&symbols, "App.Notify").kind, SymbolKind::Delegate);
    }

    #[test]
    fn test_calls_attributes_and_nullable_types() {
        let code = r#"
class Handler
{
    [HttpGet]
    public Customer? Find(int id)
    {
        var repo = new Repository<Customer>(id);
        return repo.Load(Parse(id));
    }
}
"#;
        let (_, refs) = extract(code);
        let calls: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Call)
            .map(|r| (r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert!(calls.contains(&("HttpGet", Some("Handler.Find"))));
        assert!(calls.contains(&("Repository", Some("Handler.Find"))));
        assert!(calls.contains(&("Load", Some("Handler.Find"))));
        assert!(calls.contains(&("Parse", Some("Handler.Find"))));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::TypeRef && r.target_name == "Customer"));
    }
}
