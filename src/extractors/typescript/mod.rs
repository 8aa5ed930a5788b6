//! TypeScript and TSX extractor
//!
//! Reuses the JavaScript walkers and adds interfaces, type aliases, enums
//! and namespaces through the dialect hook in `declarations`.

mod declarations;

use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use crate::extractors::javascript::{references, symbols, Dialect};
use tree_sitter::{Node, Tree};

const TYPESCRIPT: Dialect = Dialect {
    declarations: Some(declarations::extract_declaration),
};

#[derive(Debug, Default, Clone)]
pub struct TypeScriptExtractor {
    config: ExtractorConfig,
    tsx: bool,
}

impl TypeScriptExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config, tsx: false }
    }

    /// Extractor for `.tsx` files
    pub fn tsx(config: ExtractorConfig) -> Self {
        Self { config, tsx: true }
    }

    fn context<'a>(&'a self, source: &'a [u8], file_path: &'a str) -> ExtractionContext<'a> {
        ExtractionContext::new(self.language_name(), file_path, source, &self.config)
    }
}

impl LanguageExtractor for TypeScriptExtractor {
    fn language_name(&self) -> &str {
        if self.tsx {
            "tsx"
        } else {
            "typescript"
        }
    }

    fn file_extensions(&self) -> &[&'static str] {
        if self.tsx {
            &[".tsx"]
        } else {
            &[".ts", ".mts", ".cts"]
        }
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = self.context(source, file_path);
        symbols::extract_symbols(&ctx, &TYPESCRIPT, tree.root_node())
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
        let ctx = self.context(source, "");
        symbols::jsdoc(&ctx, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{ReferenceKind, SymbolKind, Visibility};
    use tree_sitter::Parser;

    fn extract_with(
        extractor: &TypeScriptExtractor,
        code: &str,
    ) -> (Vec<Symbol>, Vec<Reference>) {
        let mut parser = Parser::new();
        let language = if extractor.tsx {
            tree_sitter_typescript::LANGUAGE_TSX
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT
        };
        parser.set_language(&language.into()).unwrap();
        let tree = parser.parse(code, None).unwrap();
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), "src/app.ts"),
            extractor.extract_references(Some(&tree), code.as_bytes(), "src/app.ts"),
        )
    }

    fn extract(code: &str) -> (Vec<Symbol>, Vec<Reference>) {
        extract_with(&TypeScriptExtractor::default(), code)
    }

    fn find<'s>(symbols: &'s [Symbol], qualified: &str) -> &'s Symbol {
        symbols
            .iter()
            .find(|s| s.qualified_name == qualified)
            .unwrap_or_else(|| panic!("missing symbol {}", qualified))
    }

    #[test]
    fn test_interfaces_and_members() {
        let code = r#"
/** Something with an id. */
export interface Entity<T> extends Base, Named {
  id: T;
  describe(verbose: boolean): string;
}
"#;
        let (symbols, refs) = extract(code);
        let entity = find(&symbols, "Entity");
        assert_eq!(entity.kind, SymbolKind::Interface);
        assert_eq!(
            entity.signature.as_deref(),
            Some("interface Entity<T> extends Base, Named")
        );
        assert_eq!(entity.docstring.as_deref(), Some("Something with an id."));
        assert!(entity.is_exported);

        let id = find(&symbols, "Entity.id");
        assert_eq!(id.kind, SymbolKind::Property);
        assert_eq!(id.signature.as_deref(), Some("id: T"));
        let describe = find(&symbols, "Entity.describe");
        assert_eq!(describe.kind, SymbolKind::Method);
        assert_eq!(
            describe.signature.as_deref(),
            Some("describe(verbose: boolean): string")
        );

        let parents: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Inherits)
            .map(|r| (r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert_eq!(parents, vec![("Base", Some("Entity")), ("Named", Some("Entity"))]);
    }

    #[test]
    fn test_type_aliases_and_enums() {
        let code = r#"
type Id = string | number;
type Handler<E> = (event: E, context: { requestId: string; retries: number; deadline: Date }) => Promise<void>;
const enum Color { Red, Green = 2 }
enum Mode { On = "on" }
"#;
        let (symbols, _) = extract(code);
        assert_eq!(
            find(&symbols, "Id").signature.as_deref(),
            Some("type Id = string | number")
        );
        let handler = find(&symbols, "Handler");
        assert_eq!(handler.kind, SymbolKind::TypeAlias);
        assert_eq!(handler.signature.as_deref(), Some("type Handler<E>"));

        let color = find(&symbols, "Color");
        assert_eq!(color.kind, SymbolKind::Enum);
        assert_eq!(color.signature.as_deref(), Some("const enum Color"));
        assert_eq!(find(&symbols, "Color.Red").kind, SymbolKind::Field);
        assert_eq!(find(&symbols, "Color.Green").default_value.as_deref(), Some("2"));
        assert_eq!(find(&symbols, "Mode").signature.as_deref(), Some("enum Mode"));
    }

    #[test]
    fn test_class_members_with_modifiers() {
        let code = r#"
@Injectable()
export class UserService extends BaseService implements OnInit {
  private readonly cache: Map<string, User> = new Map();
  protected retries = 3;
  constructor(private http: HttpClient) { super(); }
  async load(id: string): Promise<User> { return this.http.get(id); }
}
"#;
        let (symbols, refs) = extract(code);
        let service = find(&symbols, "UserService");
        assert!(service.is_exported);
        assert!(service
            .signature
            .as_deref()
            .unwrap()
            .starts_with("@Injectable()\nclass UserService"));

        let cache = find(&symbols, "UserService.cache");
        assert_eq!(cache.visibility, Visibility::Private);
        assert_eq!(cache.signature.as_deref(), Some("cache: Map<string, User>"));
        let retries = find(&symbols, "UserService.retries");
        assert_eq!(retries.visibility, Visibility::Protected);
        assert_eq!(retries.default_value.as_deref(), Some("3"));
        assert_eq!(
            find(&symbols, "UserService.load").signature.as_deref(),
            Some("async load(id: string): Promise<User>")
        );

        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Inherits
            && r.target_name == "BaseService"));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Implements
            && r.target_name == "OnInit"
            && r.source_name.as_deref() == Some("UserService")));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Call
            && r.target_name == "get"
            && r.source_name.as_deref() == Some("UserService.load")));
    }

    #[test]
    fn test_namespaces_scope_members() {
        let code = "namespace Geometry {\n  export function area(r: number): number { return r * r; }\n}\n";
        let (symbols, _) = extract(code);
        assert_eq!(find(&symbols, "Geometry").kind, SymbolKind::Module);
        let area = find(&symbols, "Geometry.area");
        assert_eq!(area.signature.as_deref(), Some("function area(r: number): number"));
        assert!(area.is_exported);
    }

    #[test]
    fn test_tsx_components() {
        let extractor = TypeScriptExtractor::tsx(ExtractorConfig::default());
        assert_eq!(extractor.language_name(), "tsx");
        let code = "import { Button } from './Button';\nexport const App = (props: Props) => <Button label={props.name} />;\n";
        let (symbols, refs) = extract_with(&extractor, code);
        let app = find(&symbols, "App");
        assert_eq!(app.kind, SymbolKind::Function);
        assert_eq!(app.signature.as_deref(), Some("const App = (props: Props) =>"));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Import
            && r.target_name == "Button"
            && r.import_path.as_deref() == Some("./Button")));
    }
}
