// PHP Extractor
//
// - symbols: namespaces, classes/interfaces/traits/enums, functions, methods,
//   properties (including constructor promotion) and constants
// - references: `use` imports, trait use, calls, `new`, heritage clauses

mod helpers;
mod references;
mod symbols;

use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use tree_sitter::{Node, Tree};

#[derive(Debug, Default, Clone)]
pub struct PhpExtractor {
    config: ExtractorConfig,
}

impl PhpExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl LanguageExtractor for PhpExtractor {
    fn language_name(&self) -> &str {
        "php"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".php"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = ExtractionContext::new("php", file_path, source, &self.config);
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
        let ctx = ExtractionContext::new("php", file_path, source, &self.config);
        references::extract_references(&ctx, tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = ExtractionContext::new("php", "", source, &self.config);
        helpers::phpdoc(&ctx, node)
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
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .unwrap();
        let tree = parser.parse(code, None).unwrap();
        let extractor = PhpExtractor::default();
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), "app/Models/User.php"),
            extractor.extract_references(Some(&tree), code.as_bytes(), "app/Models/User.php"),
        )
    }

    fn find<'s>(symbols: &'s [Symbol], qualified: &str) -> &'s Symbol {
        symbols
            .iter()
            .find(|s| s.qualified_name == qualified)
            .unwrap_or_else(|| panic!("missing symbol {}", qualified))
    }

    #[test]
    fn test_unbraced_namespace_class_and_members() {
        let code = r#"<?php
namespace App\Models;

use Illuminate\Database\Eloquent\Model;
use App\Contracts\{Auditable, Sluggable as Slug};

/** A registered user. */
final class User extends Model implements Auditable
{
    use HasFactory;

    public const ROLE = 'member';
    protected static $table = 'users';
    private ?string $token = null;

    public function __construct(private string $name) {}

    public static function find(int $id): ?User
    {
        return static::query()->where('id', $id)->first();
    }
}
"#;
        let (symbols, refs) = extract(code);
        assert_eq!(find(&symbols, "App\\Models").kind, SymbolKind::Module);

        let user = find(&symbols, "App\\Models\\User");
        assert_eq!(user.kind, SymbolKind::Class);
        assert_eq!(
            user.signature.as_deref(),
            Some("final class User extends Model implements Auditable")
        );
        assert_eq!(user.docstring.as_deref(), Some("A registered user."));

        let role = find(&symbols, "App\\Models\\User\\ROLE");
        assert_eq!(role.kind, SymbolKind::Constant);
        assert_eq!(role.default_value.as_deref(), Some("'member'"));

        let table = find(&symbols, "App\\Models\\User\\table");
        assert_eq!(table.visibility, Visibility::Protected);
        assert_eq!(table.signature.as_deref(), Some("static protected $table"));
        assert!(!find(&symbols, "App\\Models\\User\\token").is_exported);

        let promoted = find(&symbols, "App\\Models\\User\\name");
        assert_eq!(promoted.signature.as_deref(), Some("promoted $name"));
        assert_eq!(promoted.visibility, Visibility::Private);

        let find_method = find(&symbols, "App\\Models\\User\\find");
        assert_eq!(
            find_method.signature.as_deref(),
            Some("public static function find(int $id): ?User")
        );

        let imports: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Import)
            .map(|r| (r.target_name.as_str(), r.import_path.as_deref()))
            .collect();
        assert_eq!(
            imports,
            vec![
                ("Model", Some("Illuminate\\Database\\Eloquent\\Model")),
                ("Auditable", Some("App\\Contracts\\Auditable")),
                ("Slug", Some("App\\Contracts\\Sluggable")),
            ]
        );
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Inherits && r.target_name == "Model"));
        assert!(refs
            .iter()
            .any(|r| r.kind == ReferenceKind::Implements && r.target_name == "Auditable"));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::UsesTrait
            && r.target_name == "HasFactory"
            && r.source_name.as_deref() == Some("App\\Models\\User")));

        let calls: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Call)
            .map(|r| r.target_name.as_str())
            .collect();
        assert!(calls.contains(&"query"));
        assert!(calls.contains(&"where"));
        assert!(calls.contains(&"first"));
    }

    #[test]
    fn test_braced_namespace_functions_and_enums() {
        let code = r#"<?php
namespace Billing {
    enum Status: string {
        case Paid = 'paid';
        case Open = 'open';
    }

    trait Loggable {}

    function total(array $items): int {
        $invoice = new \Billing\Invoice($items);
        Logger::info(count($items));
        return $invoice->sum();
    }
}
"#;
        let (symbols, refs) = extract(code);
        let status = find(&symbols, "Billing\\Status");
        assert_eq!(status.kind, SymbolKind::Enum);
        assert_eq!(status.signature.as_deref(), Some("enum Status: string"));
        assert_eq!(find(&symbols, "Billing\\Status\\Paid").kind, SymbolKind::Constant);
        assert_eq!(find(&symbols, "Billing\\Loggable").kind, SymbolKind::Trait);
        assert_eq!(
            find(&symbols, "Billing\\total").signature.as_deref(),
            Some("function total(array $items): int")
        );

        let calls: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Call)
            .map(|r| (r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert!(calls.contains(&("Invoice", Some("Billing\\total"))));
        assert!(calls.contains(&("Logger.info", Some("Billing\\total"))));
        assert!(calls.contains(&("count", Some("Billing\\total"))));
        assert!(calls.contains(&("sum", Some("Billing\\total"))));
    }
}
