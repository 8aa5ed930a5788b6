/// Aura (Lightning) component extractor
///
/// Bundle files (`.cmp`, `.app`, `.evt`, `.intf`, `.design`) are parsed with
/// the HTML grammar. The file itself becomes one symbol; `aura:attribute`,
/// `aura:method` and `aura:registerEvent` tags become its members. References
/// come from a text pass over the markup:
/// - `controller="..."` (`controller`), `extends` (`inherits`),
///   `implements` (`implements`)
/// - custom component tags `<ns:Name>` outside the platform namespaces
/// - `$Label.ns.Name` lookups (`label`)
use crate::config::ExtractorConfig;
use crate::extractors::base::{
    children, decode_lossy, ExtractionContext, LanguageExtractor, LineIndex, Reference,
    ReferenceKind, Symbol, SymbolKind, SymbolOptions,
};
use crate::extractors::html::{attribute, tag_name, tag_of};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tree_sitter::{Node, Tree};

static CONTROLLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)controller\s*=\s*"([^"]+)""#).unwrap());
static EXTENDS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)extends\s*=\s*"([^"]+)""#).unwrap());
static IMPLEMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)implements\s*=\s*"([^"]+)""#).unwrap());
static CUSTOM_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(\w+):(\w+)").unwrap());
static LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$Label\.(\w+\.)?(\w+)").unwrap());

/// Namespaces that ship with the platform, never project components
const PLATFORM_NAMESPACES: &[&str] = &["aura", "lightning", "ltng", "ui", "force"];

/// Bundle file kind from its extension
fn bundle_kind(extension: &str) -> SymbolKind {
    match extension {
        "app" => SymbolKind::Application,
        "evt" => SymbolKind::Event,
        "intf" => SymbolKind::Interface,
        "design" => SymbolKind::Design,
        _ => SymbolKind::Component,
    }
}

#[derive(Debug, Default, Clone)]
pub struct AuraExtractor {
    config: ExtractorConfig,
}

impl AuraExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

struct MemberWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    parent: String,
    seen: HashSet<String>,
    symbols: Vec<Symbol>,
}

impl MemberWalker<'_, '_> {
    fn walk(&mut self, node: Node, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.markup_max_depth) {
            return;
        }
        for child in children(&node) {
            // A self-closing tag inside an element was seen with the element
            let standalone = child.kind() == "element"
                || (child.kind() == "self_closing_tag" && node.kind() != "element");
            if standalone {
                if let Some(tag) = tag_of(&child) {
                    self.extract_member(&tag);
                }
            }
            self.walk(child, depth + 1);
        }
    }

    fn extract_member(&mut self, tag: &Node) {
        let Some(tag_text) = tag_name(self.ctx, tag) else {
            return;
        };
        let kind = match tag_text.to_lowercase().as_str() {
            "aura:attribute" => SymbolKind::Property,
            "aura:method" => SymbolKind::Method,
            "aura:registerevent" => SymbolKind::Event,
            _ => return,
        };
        let Some(name) = attribute(self.ctx, tag, "name") else {
            return;
        };
        // Later redeclarations of the same name are ignored
        if !self.seen.insert(name.clone()) {
            return;
        }
        let mut signature = format!("{} {}", kind, name);
        if let Some(ty) = attribute(self.ctx, tag, "type") {
            signature.push_str(&format!(": {}", ty));
        }
        self.symbols.push(self.ctx.symbol(
            tag,
            name.clone(),
            kind,
            SymbolOptions {
                qualified_name: Some(format!("{}.{}", self.parent, name)),
                signature: Some(signature),
                parent_name: Some(self.parent.clone()),
                ..Default::default()
            },
        ));
    }
}

impl LanguageExtractor for AuraExtractor {
    fn language_name(&self) -> &str {
        "aura"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".cmp", ".app", ".evt", ".intf", ".design"]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let ctx = ExtractionContext::new("aura", file_path, source, &self.config);
        let file_name = ctx.file_name();
        let (name, extension) = file_name.rsplit_once('.').unwrap_or((file_name, ""));
        let kind = bundle_kind(extension);
        let lines = LineIndex::new(&decode_lossy(source));

        let bundle = Symbol::new(
            name,
            kind.clone(),
            1,
            lines.line_count(),
            SymbolOptions {
                signature: Some(format!("aura:{} {}", kind, name)),
                ..Default::default()
            },
        );
        let Some(tree) = tree else {
            return vec![bundle];
        };

        let mut walker = MemberWalker {
            ctx: &ctx,
            parent: name.to_string(),
            seen: HashSet::new(),
            symbols: vec![bundle],
        };
        walker.walk(tree.root_node(), 0);
        walker.symbols
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

        for (pattern, kind) in [
            (&*CONTROLLER, ReferenceKind::Controller),
            (&*EXTENDS, ReferenceKind::Inherits),
        ] {
            for caps in pattern.captures_iter(&text) {
                if let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) {
                    refs.push(Reference::new(
                        kind.clone(),
                        target.as_str(),
                        lines.line_of(whole.start()),
                        None,
                    ));
                }
            }
        }

        for caps in IMPLEMENTS.captures_iter(&text) {
            if let (Some(whole), Some(list)) = (caps.get(0), caps.get(1)) {
                let line = lines.line_of(whole.start());
                for iface in list.as_str().split(',').map(str::trim).filter(|i| !i.is_empty()) {
                    refs.push(Reference::new(ReferenceKind::Implements, iface, line, None));
                }
            }
        }

        for caps in CUSTOM_TAG.captures_iter(&text) {
            if let (Some(whole), Some(ns), Some(component)) = (caps.get(0), caps.get(1), caps.get(2))
            {
                if PLATFORM_NAMESPACES.contains(&ns.as_str().to_lowercase().as_str()) {
                    continue;
                }
                refs.push(Reference::new(
                    ReferenceKind::ComponentRef,
                    component.as_str(),
                    lines.line_of(whole.start()),
                    None,
                ));
            }
        }

        for caps in LABEL.captures_iter(&text) {
            if let (Some(whole), Some(label)) = (caps.get(0), caps.get(2)) {
                refs.push(Reference::new(
                    ReferenceKind::Label,
                    format!("Label.{}", label.as_str()),
                    lines.line_of(whole.start()),
                    None,
                ));
            }
        }
        refs
    }
}
