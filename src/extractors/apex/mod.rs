/// Apex (Salesforce) extractor
///
/// Apex is parsed with the Java grammar. The Java walkers run with an Apex
/// dialect (`global` is public, sharing keywords are kept in class
/// signatures) and a text pass adds what the grammar cannot see:
/// - `trigger X on Obj` declarations, only for `.trigger` files
/// - SOQL `FROM Object` clauses (`soql`)
/// - `System.Label.X` lookups (`label`)
/// - element types of generic collections (`type_ref`)
use crate::config::ExtractorConfig;
use crate::extractors::base::{
    ExtractionContext, LanguageExtractor, LineIndex, Reference, ReferenceKind, Symbol, SymbolKind,
    SymbolOptions, Visibility,
};
use crate::extractors::java::helpers::javadoc;
use crate::extractors::java::{references, symbols, Dialect};
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::{Node, Parser, Tree};

const APEX: Dialect = Dialect {
    visibility: apex_visibility,
    class_hook: Some(fix_class_declaration),
};

static SHARING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(with\s+sharing|without\s+sharing|inherited\s+sharing)\b").unwrap());
static SOQL_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bFROM\s+([A-Z]\w+(?:__c|__r|__mdt|__e)?)").unwrap());
static LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"System\.Label\.(\w+)").unwrap());
static GENERIC_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:List|Set|Map|Iterable)\s*<\s*([A-Z]\w+(?:__c|__r)?)").unwrap()
});
static MAP_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Map\s*<\s*[A-Z]\w*\s*,\s*([A-Z]\w+(?:__c|__r)?)").unwrap());
static TRIGGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)trigger\s+(\w+)\s+on\s+(\w+)").unwrap());
/// `global` is not a Java keyword; `public` has the same length
static GLOBAL_KEYWORD: Lazy<regex::bytes::Regex> =
    Lazy::new(|| regex::bytes::Regex::new(r"(?i)\bglobal\b").unwrap());
static TRIGGER_HEADER: Lazy<regex::bytes::Regex> = Lazy::new(|| {
    regex::bytes::Regex::new(r"(?i)\btrigger\s+\w+\s+on\s+\w+\s*\([^)]*\)").unwrap()
});

/// Platform types never worth a `type_ref`
const APEX_BUILTINS: &[&str] = &[
    "String", "Integer", "Long", "Double", "Decimal", "Boolean", "Date", "DateTime", "Time",
    "Id", "Blob", "Object", "SObject", "Type",
];

/// Java rules plus `global`, which reads as public
fn apex_visibility(modifiers: &[String]) -> Visibility {
    let has = |kw: &str| modifiers.iter().any(|m| m.eq_ignore_ascii_case(kw));
    if has("global") {
        Visibility::Public
    } else if has("private") {
        Visibility::Private
    } else if has("protected") {
        Visibility::Protected
    } else if has("public") {
        Visibility::Public
    } else {
        Visibility::Package
    }
}

/// The Java grammar splits `public with sharing class Foo` so the class loses
/// its modifiers; recover visibility and sharing from the text around it
fn fix_class_declaration(ctx: &ExtractionContext<'_>, node: &Node<'_>, symbol: &mut Symbol) {
    if !matches!(symbol.kind, SymbolKind::Class | SymbolKind::Interface) {
        return;
    }
    let start = node.start_byte();
    let lookback = start.saturating_sub(80);
    let end = (start + 50).min(ctx.source.len());
    let Some(window) = ctx.source.get(lookback..end) else {
        return;
    };
    let window = String::from_utf8_lossy(window);

    if symbol.visibility == Visibility::Package {
        let lower = window.to_lowercase();
        if lower.contains("global ") || lower.contains("public ") {
            symbol.visibility = Visibility::Public;
            symbol.is_exported = true;
        }
    }
    if let Some(m) = SHARING.captures(&window).and_then(|c| c.get(1)) {
        let sharing = m.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        if let Some(signature) = symbol.signature.as_mut() {
            if !signature.contains(&sharing) {
                *signature = format!("{} {}", sharing, signature);
            }
        }
    }
}

/// Source rewritten so the Java grammar accepts it, or `None` when nothing
/// needs rewriting. Every replacement keeps byte offsets and newlines, so
/// the rewritten tree still slices the original source.
fn java_compatible(source: &[u8], is_trigger: bool) -> Option<Vec<u8>> {
    let header = if is_trigger {
        TRIGGER_HEADER.find(source).map(|m| m.range())
    } else {
        None
    };
    if header.is_none() && !GLOBAL_KEYWORD.is_match(source) {
        return None;
    }
    let mut masked = source.to_vec();
    for m in GLOBAL_KEYWORD.find_iter(source) {
        masked[m.range()].copy_from_slice(b"public");
    }
    if let Some(range) = header {
        for byte in &mut masked[range] {
            if *byte != b'\n' {
                *byte = b' ';
            }
        }
    }
    Some(masked)
}

fn is_trigger_file(file_path: &str) -> bool {
    file_path.to_lowercase().ends_with(".trigger")
}

#[derive(Debug, Default, Clone)]
pub struct ApexExtractor {
    config: ExtractorConfig,
}

impl ApexExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    fn trigger_symbol(text: &str) -> Option<Symbol> {
        let caps = TRIGGER.captures(text)?;
        let whole = caps.get(0)?;
        let name = caps.get(1)?.as_str();
        let object = caps.get(2)?.as_str();
        let line = LineIndex::new(text).line_of(whole.start());
        Some(Symbol::new(
            name,
            SymbolKind::Trigger,
            line,
            line,
            SymbolOptions {
                signature: Some(format!("trigger {} on {}", name, object)),
                ..Default::default()
            },
        ))
    }

    /// Tree to walk: the caller's, unless the source needs rewriting first
    fn apex_tree(tree: Option<&Tree>, source: &[u8], file_path: &str) -> Option<Tree> {
        let tree = tree?;
        let Some(masked) = java_compatible(source, is_trigger_file(file_path)) else {
            return Some(tree.clone());
        };
        let mut parser = Parser::new();
        if parser.set_language(&tree_sitter_java::LANGUAGE.into()).is_err() {
            return Some(tree.clone());
        }
        parser.parse(&masked, None).or_else(|| Some(tree.clone()))
    }

    /// SOQL, label and collection element references found in raw text
    fn text_references(text: &str) -> Vec<Reference> {
        let lines = LineIndex::new(text);
        let mut refs = Vec::new();
        for caps in SOQL_FROM.captures_iter(text) {
            if let (Some(whole), Some(object)) = (caps.get(0), caps.get(1)) {
                refs.push(Reference::new(
                    ReferenceKind::Soql,
                    object.as_str(),
                    lines.line_of(whole.start()),
                    None,
                ));
            }
        }
        for caps in LABEL.captures_iter(text) {
            if let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) {
                refs.push(Reference::new(
                    ReferenceKind::Label,
                    format!("Label.{}", label.as_str()),
                    lines.line_of(whole.start()),
                    None,
                ));
            }
        }
        for pattern in [&*GENERIC_ELEMENT, &*MAP_VALUE] {
            for caps in pattern.captures_iter(text) {
                if let (Some(whole), Some(ty)) = (caps.get(0), caps.get(1)) {
                    if !APEX_BUILTINS.contains(&ty.as_str()) {
                        refs.push(Reference::new(
                            ReferenceKind::TypeRef,
                            ty.as_str(),
                            lines.line_of(whole.start()),
                            None,
                        ));
                    }
                }
            }
        }
        refs
    }
}

impl LanguageExtractor for ApexExtractor {
    fn language_name(&self) -> &str {
        "apex"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".cls", ".trigger"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let mut result = Vec::new();
        if is_trigger_file(file_path) {
            let text = String::from_utf8_lossy(source);
            result.extend(Self::trigger_symbol(&text));
        }
        if let Some(tree) = Self::apex_tree(tree, source, file_path) {
            let ctx = ExtractionContext::new("apex", file_path, source, &self.config);
            result.extend(symbols::extract_symbols(&ctx, &APEX, tree.root_node()));
        }
        result
    }

    fn extract_references(
        &self,
        tree: Option<&Tree>,
        source: &[u8],
        file_path: &str,
    ) -> Vec<Reference> {
        let mut result = Vec::new();
        if let Some(tree) = Self::apex_tree(tree, source, file_path) {
            let ctx = ExtractionContext::new("apex", file_path, source, &self.config);
            result = references::extract_references(&ctx, tree.root_node());
        }
        let text = String::from_utf8_lossy(source);
        result.extend(Self::text_references(&text));
        result
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = ExtractionContext::new("apex", "", source, &self.config);
        javadoc(&ctx, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(code: &str) -> Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_java::LANGUAGE.into()).unwrap();
        parser.parse(code, None).unwrap()
    }

    #[test]
    fn test_trigger_only_for_trigger_files() {
        let code = "trigger AccountTrigger on Account (before insert) {\n}\n";
        let tree = parse(code);
        let extractor = ApexExtractor::default();

        let symbols = extractor.extract_symbols(Some(&tree), code.as_bytes(), "triggers/AccountTrigger.trigger");
        let trigger = symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Trigger)
            .expect("trigger symbol");
        assert_eq!(trigger.name, "AccountTrigger");
        assert_eq!(trigger.signature.as_deref(), Some("trigger AccountTrigger on Account"));
        assert_eq!(trigger.line_start, 1);

        let symbols = extractor.extract_symbols(Some(&tree), code.as_bytes(), "classes/AccountTrigger.cls");
        assert!(symbols.iter().all(|s| s.kind != SymbolKind::Trigger));
    }

    #[test]
    fn test_global_class_and_methods() {
        let code = r#"
global class Api {
    @AuraEnabled
    public static String ping() { return 'pong'; }
    Integer hidden;
}
"#;
        let tree = parse(code);
        let symbols = ApexExtractor::default().extract_symbols(Some(&tree), code.as_bytes(), "classes/Api.cls");
        let api = symbols.iter().find(|s| s.name == "Api").expect("class");
        assert_eq!(api.visibility, Visibility::Public);
        assert!(api.is_exported);

        let ping = symbols.iter().find(|s| s.qualified_name == "Api.ping").expect("method");
        assert_eq!(ping.visibility, Visibility::Public);
        assert!(ping.signature.as_deref().unwrap().starts_with("@AuraEnabled\nstatic String ping()"));

        let hidden = symbols.iter().find(|s| s.qualified_name == "Api.hidden").expect("field");
        assert_eq!(hidden.visibility, Visibility::Package);
    }

    #[test]
    fn test_global_methods_and_base_types() {
        let code = "global with sharing class Api extends Base {\n    global static String ping() { return ''; }\n}\n";
        let tree = parse(code);
        let extractor = ApexExtractor::default();
        let symbols = extractor.extract_symbols(Some(&tree), code.as_bytes(), "classes/Api.cls");
        let api = symbols.iter().find(|s| s.name == "Api").expect("class");
        assert_eq!(api.visibility, Visibility::Public);
        assert!(api.signature.as_deref().unwrap().starts_with("with sharing class Api"));
        let ping = symbols.iter().find(|s| s.qualified_name == "Api.ping").expect("method");
        assert_eq!(ping.visibility, Visibility::Public);
        assert_eq!(ping.line_start, 2);

        let refs = extractor.extract_references(Some(&tree), code.as_bytes(), "classes/Api.cls");
        assert!(refs
            .iter()
            .any(|r| r.kind == ReferenceKind::Inherits && r.target_name == "Base"));
    }

    #[test]
    fn test_trigger_header_is_not_a_method() {
        let code = "trigger AccountTrigger on Account (before insert,\n        after update) {\n    for (Account a : Trigger.new) {\n        a.Name = 'x';\n    }\n}\n";
        let tree = parse(code);
        let symbols = ApexExtractor::default().extract_symbols(
            Some(&tree),
            code.as_bytes(),
            "triggers/AccountTrigger.trigger",
        );
        assert_eq!(symbols[0].kind, SymbolKind::Trigger);
        assert!(symbols.iter().all(|s| s.kind != SymbolKind::Method));
    }

    #[test]
    fn test_rewrite_keeps_offsets() {
        let source = b"Global class A {}\ntrigger T on Account (before\ninsert) {}";
        let masked = java_compatible(source, true).unwrap();
        assert_eq!(masked.len(), source.len());
        assert!(masked.starts_with(b"public class A {}"));
        assert_eq!(
            masked.iter().filter(|b| **b == b'\n').count(),
            source.iter().filter(|b| **b == b'\n').count()
        );
        assert!(java_compatible(b"public class B {}", false).is_none());
    }

    #[test]
    fn test_global_reads_as_public() {
        let words = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        assert_eq!(apex_visibility(&words(&["global", "static"])), Visibility::Public);
        assert_eq!(apex_visibility(&words(&["static"])), Visibility::Package);
        assert_eq!(apex_visibility(&words(&["private"])), Visibility::Private);
    }

    #[test]
    fn test_text_references() {
        let code = r#"
public class Finder {
    public List<Account> find() {
        Map<Id, Contact> byId = new Map<Id, Contact>();
        String title = System.Label.Finder_Title;
        return [SELECT Id FROM Account WHERE Name = :title];
    }
}
"#;
        let tree = parse(code);
        let refs = ApexExtractor::default().extract_references(Some(&tree), code.as_bytes(), "classes/Finder.cls");
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Soql && r.target_name == "Account" && r.line == 6));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Label && r.target_name == "Label.Finder_Title"));
        let type_refs: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::TypeRef)
            .map(|r| r.target_name.as_str())
            .collect();
        assert!(type_refs.contains(&"Account"));
        assert!(type_refs.contains(&"Contact"));
        assert!(!type_refs.contains(&"Id"));
    }

    #[test]
    fn test_sharing_recovered_in_signature() {
        let mut symbol = Symbol::new(
            "Svc",
            SymbolKind::Class,
            1,
            1,
            SymbolOptions {
                signature: Some("class Svc".to_string()),
                visibility: Some(Visibility::Package),
                is_exported: Some(false),
                ..Default::default()
            },
        );
        let code = "public with sharing class Svc {}";
        let tree = parse(code);
        let config = ExtractorConfig::default();
        let ctx = ExtractionContext::new("apex", "Svc.cls", code.as_bytes(), &config);
        let node = tree.root_node();
        fix_class_declaration(&ctx, &node, &mut symbol);
        assert_eq!(symbol.visibility, Visibility::Public);
        assert_eq!(symbol.signature.as_deref(), Some("with sharing class Svc"));
    }
}
