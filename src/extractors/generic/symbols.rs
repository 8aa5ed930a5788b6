// Symbol walk for the generic engine
//
// Declarations are classified through the profile, container bodies are
// scanned for properties and then walked with the container as parent.
// Function bodies are not descended into.

use super::tables::{self, PropertyName, PropertyRule, PropertyVisibility};
use super::{doc_comment, Profile};
use crate::extractors::base::{
    children, qualify, ExtractionContext, Symbol, SymbolKind, SymbolOptions, Visibility,
};
use tree_sitter::Node;

pub(crate) fn extract_symbols(
    ctx: &ExtractionContext,
    profile: &'static Profile,
    root: Node,
) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        profile,
        symbols: Vec::new(),
    };
    walker.walk(root, None, 0);
    walker.symbols
}

pub(crate) struct SymbolWalker<'c, 'a> {
    pub ctx: &'c ExtractionContext<'a>,
    pub profile: &'static Profile,
    pub symbols: Vec<Symbol>,
}

impl SymbolWalker<'_, '_> {
    fn walk(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.generic_max_depth) {
            return;
        }
        for child in children(&node) {
            let declared = self.profile.classify(&child).and_then(|kind| {
                self.profile
                    .name(self.ctx, &child)
                    .map(|name| (kind, name))
            });
            let Some((kind, name)) = declared else {
                self.walk(child, parent, depth + 1);
                continue;
            };

            let qualified = qualify(parent, &name, ".");
            let (visibility, is_exported) = match self.profile.visibility {
                Some(hook) => {
                    let visibility = hook(self.ctx, &child);
                    (visibility, visibility == Visibility::Public)
                }
                None => (Visibility::Public, true),
            };
            let is_container = kind.is_container();
            self.symbols.push(self.ctx.symbol(
                &child,
                name,
                kind,
                SymbolOptions {
                    qualified_name: Some(qualified.clone()),
                    signature: self.ctx.get_signature(&child),
                    docstring: doc_comment(self.ctx, &child),
                    visibility: Some(visibility),
                    is_exported: Some(is_exported),
                    parent_name: parent.map(str::to_string),
                    ..Default::default()
                },
            ));

            if is_container {
                let body = class_body(&child);
                match self.profile.properties {
                    Some(hook) => hook(self, child, body, &qualified),
                    None => self.table_properties(body, &qualified),
                }
                self.walk(body, Some(&qualified), depth + 1);
            }
        }
    }

    /// Properties declared directly in `body`, per the language's property rule
    pub(crate) fn table_properties(&mut self, body: Node, class_name: &str) {
        let Some(rule) = tables::property_rule(self.ctx.language) else {
            return;
        };
        for child in children(&body) {
            let Some(child) = unwrap_statement(child, rule.node_type) else {
                continue;
            };
            let Some(name) = self.property_name(&child, &rule) else {
                continue;
            };
            let default_value = match rule.name {
                PropertyName::AssignmentTarget => child
                    .child_by_field_name("right")
                    .and_then(|right| literal(self.ctx, &right)),
                _ => find_literal(self.ctx, &child, 4),
            };
            let visibility = match rule.visibility {
                PropertyVisibility::Underscore => underscore_visibility(&name),
                PropertyVisibility::Modifiers => keyword_visibility(self.ctx, &child),
            };
            self.push_property(&child, name, class_name, None, visibility, default_value);
        }
    }

    pub(crate) fn push_property(
        &mut self,
        node: &Node,
        name: String,
        class_name: &str,
        signature: Option<String>,
        visibility: Visibility,
        default_value: Option<String>,
    ) {
        let qualified = qualify(Some(class_name), &name, ".");
        self.symbols.push(self.ctx.symbol(
            node,
            name,
            SymbolKind::Property,
            SymbolOptions {
                qualified_name: Some(qualified),
                signature,
                docstring: doc_comment(self.ctx, node),
                visibility: Some(visibility),
                is_exported: Some(visibility == Visibility::Public),
                parent_name: Some(class_name.to_string()),
                default_value,
            },
        ));
    }

    fn property_name(&self, node: &Node, rule: &PropertyRule) -> Option<String> {
        let ctx = self.ctx;
        let text = match rule.name {
            PropertyName::Field(field) => {
                let name_node = node
                    .child_by_field_name(field)
                    .or_else(|| ctx.find_child_by_type(node, field))
                    .or_else(|| {
                        children(node)
                            .iter()
                            .find_map(|c| ctx.find_child_by_type(c, field))
                    })?;
                let inner = ctx.find_child_by_types(&name_node, tables::NAME_CHILD_TYPES);
                ctx.get_node_text(&inner.unwrap_or(name_node))
            }
            PropertyName::Child(child_type) => {
                let declarator = ctx.find_child_by_type(node, child_type)?;
                if let Some(name) = ctx.get_field_text(&declarator, "name") {
                    name
                } else {
                    let inner = ctx.find_child_by_types(
                        &declarator,
                        &[
                            "identifier",
                            "field_identifier",
                            "property_identifier",
                            "variable_name",
                        ],
                    );
                    ctx.get_node_text(&inner.unwrap_or(declarator))
                }
            }
            PropertyName::AssignmentTarget => match node.child_by_field_name("left") {
                Some(left) if left.kind() == "identifier" => ctx.get_node_text(&left),
                // `self.x = ...` and tuple targets are not class properties
                Some(_) => return None,
                None => ctx.find_child_text(node, "identifier")?,
            },
        };
        let text = text.trim().trim_start_matches('$');
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Body node of a container: `body` field, a known body child, or the node
fn class_body<'t>(node: &Node<'t>) -> Node<'t> {
    node.child_by_field_name("body")
        .or_else(|| {
            children(node)
                .into_iter()
                .find(|c| tables::CLASS_BODY_TYPES.contains(&c.kind()))
        })
        .unwrap_or(*node)
}

/// Text of `node` if it is a literal short enough to keep
/// `node` itself, or its single wrapped statement, when it has kind `node_type`
fn unwrap_statement<'t>(node: Node<'t>, node_type: &str) -> Option<Node<'t>> {
    if node.kind() == node_type {
        return Some(node);
    }
    if !tables::STATEMENT_WRAPPER_TYPES.contains(&node.kind()) {
        return None;
    }
    children(&node)
        .into_iter()
        .find(|inner| inner.kind() == node_type)
}

pub(crate) fn literal(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let max = ctx.config.literal_max_len;
    if tables::LITERAL_TYPES.contains(&node.kind()) {
        let text = ctx.get_node_text(node).trim().to_string();
        if text.chars().count() <= max {
            return Some(text);
        }
    }
    if tables::STRING_TYPES.contains(&node.kind()) {
        let content = ctx
            .find_child_by_type(node, "string_content")
            .map(|c| ctx.get_node_text(&c).trim().to_string());
        if let Some(text) = content.filter(|t| t.chars().count() <= max) {
            return Some(text);
        }
    }
    None
}

/// First literal in a depth-first search from `node` (inclusive)
pub(crate) fn find_literal(ctx: &ExtractionContext, node: &Node, max_depth: usize) -> Option<String> {
    if max_depth == 0 {
        return None;
    }
    if let Some(value) = literal(ctx, node) {
        return Some(value);
    }
    children(node)
        .iter()
        .find_map(|child| find_literal(ctx, child, max_depth - 1))
}

fn underscore_visibility(name: &str) -> Visibility {
    let dunder = name.starts_with("__") && name.ends_with("__");
    if name.starts_with("__") && !dunder {
        Visibility::Private
    } else if name.starts_with('_') && !dunder {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

/// Visibility from modifier children, public when none is present
fn keyword_visibility(ctx: &ExtractionContext, node: &Node) -> Visibility {
    for child in children(node) {
        match child.kind() {
            "visibility_modifier" | "accessibility_modifier" | "modifiers" => {
                let text = ctx.get_node_text(&child).to_lowercase();
                for keyword in ["private", "protected", "internal", "public"] {
                    if text.split_whitespace().any(|w| w.starts_with(keyword)) {
                        return Visibility::from_keyword(keyword).unwrap_or(Visibility::Public);
                    }
                }
            }
            "private" | "protected" | "public" => {
                return Visibility::from_keyword(child.kind()).unwrap_or(Visibility::Public)
            }
            _ => {}
        }
    }
    Visibility::Public
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore_visibility() {
        assert_eq!(underscore_visibility("__secret"), Visibility::Private);
        assert_eq!(underscore_visibility("_guarded"), Visibility::Protected);
        assert_eq!(underscore_visibility("__slots__"), Visibility::Public);
        assert_eq!(underscore_visibility("plain"), Visibility::Public);
    }
}
