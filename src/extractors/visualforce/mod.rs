/// Visualforce page/component extractor
///
/// `.page` and `.component` files yield one symbol for the file. References
/// come from the markup text: `controller` and comma-separated `extensions`
/// (`controller`), `<apex:include pageName>` / `<apex:component pageName>`
/// (`include`) and capitalized identifiers inside `{!...}` merge fields
/// (`merge_field`, first occurrence only, string literals ignored).
use crate::config::ExtractorConfig;
use crate::extractors::base::{
    decode_lossy, ExtractionContext, LanguageExtractor, LineIndex, Reference, ReferenceKind,
    Symbol, SymbolKind, SymbolOptions,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tree_sitter::Tree;

static CONTROLLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)controller\s*=\s*"([^"]+)""#).unwrap());
static EXTENSIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)extensions\s*=\s*"([^"]+)""#).unwrap());
static INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<apex:(include|component)\s[^>]*pageName\s*=\s*"([^"]+)""#).unwrap()
});
static MERGE_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{!([^}]+)\}").unwrap());
static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"'[^']*'|"[^"]*""#).unwrap());
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]\w+(?:__c|__r)?)\b").unwrap());

/// Formula functions and literals that look like identifiers
const FORMULA_BUILTINS: &[&str] = &[
    "IF", "AND", "OR", "NOT", "NULL", "TRUE", "FALSE", "ISBLANK", "ISNULL", "TEXT", "VALUE",
    "LEN", "TRIM", "CONTAINS", "SUBSTITUTE", "CASE", "BLANKVALUE", "NULLVALUE", "BEGINS",
    "INCLUDES",
];

#[derive(Debug, Default, Clone)]
pub struct VisualforceExtractor {
    config: ExtractorConfig,
}

impl VisualforceExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl LanguageExtractor for VisualforceExtractor {
    fn language_name(&self) -> &str {
        "visualforce"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".page", ".component"]
    }

    fn extract_symbols(&self, _tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let ctx = ExtractionContext::new("visualforce", file_path, source, &self.config);
        let file_name = ctx.file_name();
        let (name, extension) = file_name.rsplit_once('.').unwrap_or((file_name, ""));
        let kind = if extension == "page" {
            SymbolKind::Page
        } else {
            SymbolKind::Component
        };
        let lines = LineIndex::new(&decode_lossy(source));
        vec![Symbol::new(
            name,
            kind.clone(),
            1,
            lines.line_count(),
            SymbolOptions {
                signature: Some(format!("apex:{} {}", kind, name)),
                ..Default::default()
            },
        )]
    }

    fn extract_references(
        &self,
        _tree: Option<&Tree>,
        source: &[u8],
        _file_path: &str,
    ) -> Vec<Reference> {
        let text = decode_lossy(source);
        let lines = LineIndex::new(&text);
        let mut refs = Vec::new();

        for caps in CONTROLLER.captures_iter(&text) {
            if let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) {
                refs.push(Reference::new(
                    ReferenceKind::Controller,
                    target.as_str(),
                    lines.line_of(whole.start()),
                    None,
                ));
            }
        }

        for caps in EXTENSIONS.captures_iter(&text) {
            if let (Some(whole), Some(list)) = (caps.get(0), caps.get(1)) {
                let line = lines.line_of(whole.start());
                for ext in list.as_str().split(',').map(str::trim).filter(|e| !e.is_empty()) {
                    refs.push(Reference::new(ReferenceKind::Controller, ext, line, None));
                }
            }
        }

        for caps in INCLUDE.captures_iter(&text) {
            if let (Some(whole), Some(page)) = (caps.get(0), caps.get(2)) {
                refs.push(Reference::new(
                    ReferenceKind::Include,
                    page.as_str(),
                    lines.line_of(whole.start()),
                    None,
                ));
            }
        }

        let mut seen = HashSet::new();
        for caps in MERGE_FIELD.captures_iter(&text) {
            let (Some(whole), Some(expr)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let line = lines.line_of(whole.start());
            let expr = STRING_LITERAL.replace_all(expr.as_str(), " ");
            for ident in IDENTIFIER.captures_iter(&expr).filter_map(|c| c.get(1)) {
                let name = ident.as_str();
                if FORMULA_BUILTINS.contains(&name) || !seen.insert(name.to_string()) {
                    continue;
                }
                refs.push(Reference::new(ReferenceKind::MergeField, name, line, None));
            }
        }
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<apex:page controller="InvoiceController" extensions="PdfExt, AuditExt">
    <apex:include pageName="Header"/>
    <apex:outputText value="{!IF(Invoice__c.Paid__c, 'Paid', 'Due')}"/>
    <apex:outputText value="{!Invoice__c.Total__c}"/>
</apex:page>
"#;

    #[test]
    fn test_page_symbol() {
        let symbols = VisualforceExtractor::default().extract_symbols(None, PAGE.as_bytes(), "pages/Invoice.page");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].kind, SymbolKind::Page);
        assert_eq!(symbols[0].signature.as_deref(), Some("apex:page Invoice"));
        assert_eq!(symbols[0].line_end, 6);

        let component = VisualforceExtractor::default().extract_symbols(None, b"", "components/Row.component");
        assert_eq!(component[0].kind, SymbolKind::Component);
    }

    #[test]
    fn test_references() {
        let refs = VisualforceExtractor::default().extract_references(None, PAGE.as_bytes(), "pages/Invoice.page");
        let pairs: Vec<_> = refs
            .iter()
            .map(|r| (r.kind.clone(), r.target_name.as_str(), r.line))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (ReferenceKind::Controller, "InvoiceController", 1),
                (ReferenceKind::Controller, "PdfExt", 1),
                (ReferenceKind::Controller, "AuditExt", 1),
                (ReferenceKind::Include, "Header", 2),
                (ReferenceKind::MergeField, "Invoice__c", 3),
                (ReferenceKind::MergeField, "Paid__c", 3),
                (ReferenceKind::MergeField, "Total__c", 4),
            ]
        );
    }
}
