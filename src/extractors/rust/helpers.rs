/// Helper utilities for the Rust extractor
/// - Visibility modifiers
/// - Doc comments and preceding attributes
/// - Derive lists
use crate::extractors::base::{children, ExtractionContext, Visibility};
use tree_sitter::Node;

/// `pub(crate)` counts as public, `pub(super)`/`pub(self)` as private
pub(super) fn visibility(ctx: &ExtractionContext, node: &Node) -> Visibility {
    match ctx.find_child_by_type(node, "visibility_modifier") {
        Some(modifier) => {
            let text = ctx.get_node_text(&modifier);
            if text.contains("super") || text.contains("self") {
                Visibility::Private
            } else {
                Visibility::Public
            }
        }
        None => Visibility::Private,
    }
}

/// `"pub "` for public items, empty otherwise
pub(super) fn pub_prefix(vis: Visibility) -> &'static str {
    if vis == Visibility::Public {
        "pub "
    } else {
        ""
    }
}

/// `async `/`unsafe `/`const `/`extern "C" ` qualifiers of a function item
pub(super) fn function_qualifiers(ctx: &ExtractionContext, node: &Node) -> String {
    let Some(modifiers) = ctx.find_child_by_type(node, "function_modifiers") else {
        return String::new();
    };
    let mut out = String::new();
    for modifier in children(&modifiers) {
        out.push_str(&ctx.get_node_text(&modifier));
        out.push(' ');
    }
    out
}

/// Attribute items (`#[...]`) directly above a node, in source order
pub(super) fn preceding_attributes<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut attributes = Vec::new();
    let mut prev = node.prev_sibling();
    while let Some(sibling) = prev {
        match sibling.kind() {
            "attribute_item" => attributes.push(sibling),
            // Doc comments may sit between attributes
            "line_comment" | "block_comment" => {}
            _ => break,
        }
        prev = sibling.prev_sibling();
    }
    attributes.reverse();
    attributes
}

/// Trait names listed in `#[derive(...)]` attributes
pub(super) fn derived_traits(ctx: &ExtractionContext, attributes: &[Node]) -> Vec<String> {
    let mut traits = Vec::new();
    for attr in attributes {
        let Some(attribute) = ctx.find_child_by_type(attr, "attribute") else {
            continue;
        };
        let is_derive = ctx
            .find_child_by_types(&attribute, &["identifier", "scoped_identifier"])
            .is_some_and(|ident| ctx.get_node_text(&ident) == "derive");
        if !is_derive {
            continue;
        }
        let Some(token_tree) = ctx.find_child_by_type(&attribute, "token_tree") else {
            continue;
        };
        for child in children(&token_tree) {
            if child.kind() == "identifier" {
                traits.push(ctx.get_node_text(&child));
            }
        }
    }
    traits
}

/// `///`, `//!` and `/** */` comments above an item, skipping attributes
pub(super) fn doc_comment(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let mut lines = Vec::new();
    let mut prev = node.prev_sibling();
    while let Some(sibling) = prev {
        match sibling.kind() {
            "attribute_item" => {}
            "line_comment" | "block_comment" => {
                let text = ctx.get_node_text(&sibling);
                let text = text.trim();
                if let Some(rest) = text.strip_prefix("///").or_else(|| text.strip_prefix("//!")) {
                    lines.push(rest.trim().to_string());
                } else if let Some(rest) = text.strip_prefix("/**") {
                    lines.push(rest.strip_suffix("*/").unwrap_or(rest).trim().to_string());
                } else {
                    break;
                }
            }
            _ => break,
        }
        prev = sibling.prev_sibling();
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n"))
}
