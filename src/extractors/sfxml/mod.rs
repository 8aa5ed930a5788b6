/// Salesforce metadata XML extractor (`*-meta.xml`)
///
/// Metadata files are parsed with the HTML grammar. The file becomes one
/// symbol named after the file (`Account.object-meta.xml` -> `Account`),
/// typed by its root element and falling back to the file suffix.
/// Sidecars of files with their own backend (`.cls`, `.trigger`, `.page`,
/// `.component`) yield nothing. Nested `fields`, `validationRules` and
/// friends become child symbols by their `fullName`.
///
/// References:
/// - text of reference-bearing elements (`metadata_ref`)
/// - capitalized identifiers inside `<formula>` (`formula_ref`)
/// - Apex `actionCalls` in flows (`call`)
use crate::config::ExtractorConfig;
use crate::extractors::base::{
    children, decode_lossy, ExtractionContext, LanguageExtractor, LineIndex, Reference,
    ReferenceKind, Symbol, SymbolKind, SymbolOptions,
};
use crate::extractors::html::{child_element_text, element_text, tag_name};
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::{Node, Tree};

static FORMULA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<formula>(.*?)</formula>").unwrap());
static FORMULA_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]\w+(?:__c|__r)?)\b").unwrap());
static ACTION_CALLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<actionCalls>(.*?)</actionCalls>").unwrap());
static APEX_ACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<actionType>\s*apex\s*</actionType>").unwrap());
static ACTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<actionName>\s*(\w+)\s*</actionName>").unwrap());

pub const META_SUFFIX: &str = "-meta.xml";

/// Suffixes whose primary file is indexed by another backend
const SIDECAR_TYPES: &[&str] = &["cls", "trigger", "page", "component"];

/// Elements whose `fullName` child names a nested symbol
const MEMBER_TAGS: &[&str] = &[
    "fields",
    "validationrules",
    "fieldsets",
    "listviews",
    "weblinks",
    "recordtypes",
];

/// Elements whose text names another metadata component
const REFERENCE_TAGS: &[&str] = &[
    "apexclass",
    "controller",
    "extensions",
    "template",
    "field",
    "referenceto",
    "lookupfilter",
    "customobject",
    "targetobject",
    "relatedlist",
    "sobjecttype",
];

const FORMULA_BUILTINS: &[&str] = &[
    "IF", "AND", "OR", "NOT", "TRUE", "FALSE", "NULL", "ISBLANK", "TEXT", "VALUE", "TODAY", "NOW",
    "YEAR", "MONTH", "DAY",
];

/// Symbol kind for a root element or file suffix (lowercase)
fn metadata_kind(key: &str) -> Option<SymbolKind> {
    let kind = match key {
        "apexclass" => SymbolKind::Class,
        "apextrigger" => SymbolKind::Trigger,
        "apexpage" | "flexipage" => SymbolKind::Page,
        "apexcomponent" | "lightningcomponentbundle" => SymbolKind::Component,
        "customfield" => SymbolKind::Field,
        "customapplication" => SymbolKind::Application,
        "assignmentrule" | "autoresponserule" | "escalationrule" | "sharingrule"
        | "validationrule" | "workflowrule" => SymbolKind::Rule,
        "customobject" | "object" => SymbolKind::Other("object".into()),
        "custommetadata" => SymbolKind::Other("metadata".into()),
        "customlabel" => SymbolKind::Other("label".into()),
        "customtab" => SymbolKind::Other("tab".into()),
        "layout" => SymbolKind::Other("layout".into()),
        "profile" => SymbolKind::Other("profile".into()),
        "permissionset" => SymbolKind::Other("permission_set".into()),
        "flow" => SymbolKind::Other("flow".into()),
        "staticresource" => SymbolKind::Other("resource".into()),
        "remotesitesetting" | "connectedapp" => SymbolKind::Other("config".into()),
        "emailtemplate" => SymbolKind::Other("template".into()),
        "report" => SymbolKind::Other("report".into()),
        "dashboard" => SymbolKind::Other("dashboard".into()),
        _ => return None,
    };
    Some(kind)
}

/// `Account.object-meta.xml` -> (`Account`, `object`)
fn split_meta_name(file_name: &str) -> (&str, &str) {
    let base = file_name.strip_suffix(META_SUFFIX).unwrap_or(file_name);
    base.rsplit_once('.').unwrap_or((base, "unknown"))
}

/// First element of the document, skipping the XML prolog
fn root_element<'t>(root: &Node<'t>) -> Option<Node<'t>> {
    children(root).into_iter().find(|c| c.kind() == "element")
}

#[derive(Debug, Default, Clone)]
pub struct SfxmlExtractor {
    config: ExtractorConfig,
}

impl SfxmlExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

struct XmlWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    parent: String,
    parent_qualified: String,
    symbols: Vec<Symbol>,
    refs: Vec<Reference>,
}

impl XmlWalker<'_, '_> {
    fn walk_members(&mut self, node: Node, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.markup_max_depth) {
            return;
        }
        for child in children(&node) {
            if child.kind() == "element" {
                if let Some(tag) = tag_name(self.ctx, &child).map(|t| t.to_lowercase()) {
                    if MEMBER_TAGS.contains(&tag.as_str()) {
                        self.extract_member(&child, &tag);
                    }
                }
            }
            self.walk_members(child, depth + 1);
        }
    }

    fn extract_member(&mut self, element: &Node, tag: &str) {
        let Some(full_name) = child_element_text(self.ctx, element, "fullName") else {
            return;
        };
        let kind = if tag == "fields" {
            SymbolKind::Field
        } else {
            SymbolKind::Rule
        };
        self.symbols.push(self.ctx.symbol(
            element,
            full_name.clone(),
            kind,
            SymbolOptions {
                qualified_name: Some(format!("{}.{}", self.parent, full_name)),
                parent_name: Some(self.parent_qualified.clone()),
                ..Default::default()
            },
        ));
    }

    fn walk_references(&mut self, node: Node, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.markup_max_depth) {
            return;
        }
        for child in children(&node) {
            if child.kind() == "element" {
                let is_reference = tag_name(self.ctx, &child)
                    .is_some_and(|t| REFERENCE_TAGS.contains(&t.to_lowercase().as_str()));
                if is_reference {
                    let target = element_text(self.ctx, &child).filter(|t| {
                        t.chars().count() < self.ctx.config.literal_max_len && !t.starts_with('<')
                    });
                    if let Some(target) = target {
                        self.refs.push(self.ctx.reference(
                            ReferenceKind::MetadataRef,
                            target,
                            &child,
                            None,
                        ));
                    }
                }
            }
            self.walk_references(child, depth + 1);
        }
    }
}

impl LanguageExtractor for SfxmlExtractor {
    fn language_name(&self) -> &str {
        "sfxml"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[]
    }

    fn extract_symbols(&self, tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let ctx = ExtractionContext::new("sfxml", file_path, source, &self.config);
        let (meta_name, meta_type) = split_meta_name(ctx.file_name());
        if SIDECAR_TYPES.contains(&meta_type.to_lowercase().as_str()) {
            return Vec::new();
        }

        let root_tag = tree
            .and_then(|t| root_element(&t.root_node()))
            .and_then(|root| tag_name(&ctx, &root))
            .map(|t| t.to_lowercase());
        let kind = root_tag
            .as_deref()
            .and_then(metadata_kind)
            .or_else(|| metadata_kind(&meta_type.to_lowercase()))
            .unwrap_or_else(|| SymbolKind::Other("metadata".into()));

        let qualified = format!("{}.{}", meta_type, meta_name);
        let lines = LineIndex::new(&decode_lossy(source));
        let file_symbol = Symbol::new(
            meta_name,
            kind,
            1,
            lines.line_count(),
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(format!("{} {}", meta_type, meta_name)),
                ..Default::default()
            },
        );
        let Some(tree) = tree else {
            return vec![file_symbol];
        };

        let mut walker = XmlWalker {
            ctx: &ctx,
            parent: meta_name.to_string(),
            parent_qualified: qualified,
            symbols: vec![file_symbol],
            refs: Vec::new(),
        };
        walker.walk_members(tree.root_node(), 0);
        walker.symbols
    }

    fn extract_references(
        &self,
        tree: Option<&Tree>,
        source: &[u8],
        file_path: &str,
    ) -> Vec<Reference> {
        let ctx = ExtractionContext::new("sfxml", file_path, source, &self.config);
        let mut refs = match tree {
            Some(tree) => {
                let mut walker = XmlWalker {
                    ctx: &ctx,
                    parent: String::new(),
                    parent_qualified: String::new(),
                    symbols: Vec::new(),
                    refs: Vec::new(),
                };
                walker.walk_references(tree.root_node(), 0);
                walker.refs
            }
            None => Vec::new(),
        };

        let text = decode_lossy(source);
        let lines = LineIndex::new(&text);
        for caps in FORMULA.captures_iter(&text) {
            let (Some(whole), Some(formula)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let line = lines.line_of(whole.start());
            for ident in FORMULA_IDENTIFIER
                .captures_iter(formula.as_str())
                .filter_map(|c| c.get(1))
            {
                if !FORMULA_BUILTINS.contains(&ident.as_str()) {
                    refs.push(Reference::new(
                        ReferenceKind::FormulaRef,
                        ident.as_str(),
                        line,
                        None,
                    ));
                }
            }
        }

        // Each actionCalls block is matched on its own so names never leak
        // across blocks
        for caps in ACTION_CALLS.captures_iter(&text) {
            let (Some(whole), Some(block)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !APEX_ACTION.is_match(block.as_str()) {
                continue;
            }
            if let Some(name) = ACTION_NAME.captures(block.as_str()).and_then(|c| c.get(1)) {
                refs.push(Reference::new(
                    ReferenceKind::Call,
                    name.as_str(),
                    lines.line_of(whole.start()),
                    None,
                ));
            }
        }
        refs
    }
}
