/// Ruby language extractor with support for:
/// - Modules and classes (with `<` superclass)
/// - Methods (`Owner#name`), singleton methods (`Owner.name`), `initialize`
/// - Constants and `attr_*` properties
/// - `private`/`protected` sections
/// - References: require, include/extend, calls, `X.new`, constants
mod helpers;
mod references;
mod symbols;

use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use tree_sitter::{Node, Tree};

/// Ruby extractor that handles Ruby-specific constructs
#[derive(Debug, Default, Clone)]
pub struct RubyExtractor {
    config: ExtractorConfig,
}

impl RubyExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl LanguageExtractor for RubyExtractor {
    fn language_name(&self) -> &str {
        "ruby"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".rb", ".rake", ".gemspec"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let Some(tree) = tree else {
            return Vec::new();
        };
        let ctx = ExtractionContext::new("ruby", file_path, source, &self.config);
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
        let ctx = ExtractionContext::new("ruby", file_path, source, &self.config);
        references::extract_references(&ctx, tree.root_node())
    }

    fn get_docstring(&self, node: &Node, source: &[u8]) -> Option<String> {
        let ctx = ExtractionContext::new("ruby", "", source, &self.config);
        helpers::doc_comment(&ctx, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{ReferenceKind, SymbolKind, Visibility};
    use tree_sitter::Parser;

    fn extract(code: &str) -> (Vec<Symbol>, Vec<Reference>) {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_ruby::LANGUAGE.into()).unwrap();
        let tree = parser.parse(code, None).unwrap();
        let extractor = RubyExtractor::default();
        (
            extractor.extract_symbols(Some(&tree), code.as_bytes(), "lib/billing/invoice.rb"),
            extractor.extract_references(Some(&tree), code.as_bytes(), "lib/billing/invoice.rb"),
        )
    }

    fn find<'s>(symbols: &'s [Symbol], qualified: &str) -> &'s Symbol {
        symbols
            .iter()
            .find(|s| s.qualified_name == qualified)
            .unwrap_or_else(|| panic!("missing symbol {}", qualified))
    }

    #[test]
    fn test_comment_opening_a_body_documents_first_definition() {
        let code = "module Store\n  # Holds stock.\n  class Shelf\n    # Counts items.\n    def count\n    end\n\n    def empty?\n    end\n  end\nend\n";
        let (symbols, _) = extract(code);
        assert_eq!(find(&symbols, "Store::Shelf").docstring.as_deref(), Some("Holds stock."));
        assert_eq!(find(&symbols, "Store::Shelf#count").docstring.as_deref(), Some("Counts items."));
        assert_eq!(find(&symbols, "Store::Shelf#empty?").docstring, None);
        assert_eq!(find(&symbols, "Store").docstring, None);
    }

    #[test]
    fn test_modules_classes_and_methods() {
        let code = r#"
module Billing
  # An invoice document.
  class Invoice < Base::Document
    TAX_RATE = 0.2
    attr_accessor :total, :due

    def initialize(total)
      @total = total
    end

    def self.build(attrs = {})
      new(attrs)
    end

    def paid?
      true
    end

    private

    def recalc
    end
  end
end
"#;
        let (symbols, refs) = extract(code);
        assert_eq!(find(&symbols, "Billing").kind, SymbolKind::Module);

        let invoice = find(&symbols, "Billing::Invoice");
        assert_eq!(invoice.signature.as_deref(), Some("class Invoice < Base::Document"));
        assert_eq!(invoice.docstring.as_deref(), Some("An invoice document."));
        assert_eq!(invoice.parent_name.as_deref(), Some("Billing"));

        let rate = find(&symbols, "Billing::Invoice::TAX_RATE");
        assert_eq!(rate.kind, SymbolKind::Constant);
        assert_eq!(rate.signature.as_deref(), Some("TAX_RATE = 0.2"));

        assert_eq!(find(&symbols, "Billing::Invoice#total").kind, SymbolKind::Property);
        assert_eq!(find(&symbols, "Billing::Invoice#due").kind, SymbolKind::Property);
        assert_eq!(
            find(&symbols, "Billing::Invoice#initialize").kind,
            SymbolKind::Constructor
        );
        let build = find(&symbols, "Billing::Invoice.build");
        assert_eq!(build.signature.as_deref(), Some("def self.build(attrs = {})"));
        assert_eq!(
            find(&symbols, "Billing::Invoice#paid?").visibility,
            Visibility::Public
        );
        let recalc = find(&symbols, "Billing::Invoice#recalc");
        assert_eq!(recalc.visibility, Visibility::Private);
        assert!(!recalc.is_exported);

        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Inherits
            && r.target_name == "Document"
            && r.source_name.as_deref() == Some("Billing::Invoice")));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Call
            && r.target_name == "new"
            && r.source_name.as_deref() == Some("Billing::Invoice.build")));
    }

    #[test]
    fn test_requires_mixins_and_calls() {
        let code = r#"
require 'json'
require_relative '../support/formatter'

class Report
  include Comparable
  extend ActiveSupport::Concern

  def render
    data = Formatter.new(rows)
    JSON.generate(data.to_h)
  end
end
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
                ("json", Some("json")),
                ("formatter", Some("../support/formatter")),
                ("Comparable", None),
                ("Concern", None),
            ]
        );

        let calls: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == ReferenceKind::Call)
            .map(|r| (r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert!(calls.contains(&("Formatter", Some("Report#render"))));
        assert!(calls.contains(&("generate", Some("Report#render"))));
        assert!(calls.contains(&("to_h", Some("Report#render"))));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Reference
            && r.target_name == "JSON"
            && r.source_name.as_deref() == Some("Report#render")));
    }
}
