//! Markup helpers over the HTML grammar
//!
//! Aura, Visualforce and Salesforce metadata XML are parsed with
//! tree-sitter-html. Plain `.html` files go through the generic engine; this
//! module only holds the element/attribute navigation the markup dialects
//! share.

use crate::extractors::base::{children, unquote, ExtractionContext};
use tree_sitter::Node;

/// Opening tag of an element (`start_tag` or `self_closing_tag`); a bare
/// `self_closing_tag` is its own tag
pub(crate) fn tag_of<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    match node.kind() {
        "self_closing_tag" | "start_tag" => Some(*node),
        "element" => children(node)
            .into_iter()
            .find(|c| matches!(c.kind(), "start_tag" | "self_closing_tag")),
        _ => None,
    }
}

/// Tag name of an element or tag node, as written
pub(crate) fn tag_name(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let tag = tag_of(node)?;
    ctx.find_child_by_type(&tag, "tag_name")
        .map(|n| ctx.get_node_text(&n))
}

/// Value of attribute `name` (case-insensitive) on a tag, quotes stripped
pub(crate) fn attribute(ctx: &ExtractionContext, tag: &Node, name: &str) -> Option<String> {
    for attr in ctx.find_children_by_type(tag, "attribute") {
        let mut attr_name = None;
        let mut value = None;
        for part in children(&attr) {
            match part.kind() {
                "attribute_name" => attr_name = Some(ctx.get_node_text(&part)),
                "attribute_value" | "quoted_attribute_value" => {
                    value = Some(unquote(&ctx.get_node_text(&part)).to_string())
                }
                _ => {}
            }
        }
        if let (Some(attr_name), Some(value)) = (attr_name, value) {
            if attr_name.eq_ignore_ascii_case(name) {
                return Some(value);
            }
        }
    }
    None
}

/// First non-empty text child of an element, trimmed
pub(crate) fn element_text(ctx: &ExtractionContext, element: &Node) -> Option<String> {
    ctx.find_child_by_type(element, "text")
        .map(|t| ctx.get_node_text(&t).trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Text of the first child element named `tag`, searching one level deeper
/// when no direct child matches
pub(crate) fn child_element_text(
    ctx: &ExtractionContext,
    element: &Node,
    tag: &str,
) -> Option<String> {
    let is_tag = |node: &Node| {
        node.kind() == "element"
            && tag_name(ctx, node).is_some_and(|name| name.eq_ignore_ascii_case(tag))
    };
    for child in children(element) {
        if is_tag(&child) {
            return element_text(ctx, &child);
        }
        for sub in children(&child) {
            if is_tag(&sub) {
                return element_text(ctx, &sub);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use tree_sitter::Parser;

    #[test]
    fn test_tags_attributes_and_text() {
        let code = r#"<fields><fullName>Industry__c</fullName><input Type="text" name='q'/></fields>"#;
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_html::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(code, None).unwrap();
        let config = ExtractorConfig::default();
        let ctx = ExtractionContext::new("sfxml", "a-meta.xml", code.as_bytes(), &config);

        let fields = ctx
            .find_child_by_type(&tree.root_node(), "element")
            .unwrap();
        assert_eq!(tag_name(&ctx, &fields).as_deref(), Some("fields"));
        assert_eq!(
            child_element_text(&ctx, &fields, "FULLNAME").as_deref(),
            Some("Industry__c")
        );

        let input = ctx
            .descendants(&fields, 4)
            .into_iter()
            .find(|n| n.kind() == "self_closing_tag")
            .unwrap();
        assert_eq!(attribute(&ctx, &input, "type").as_deref(), Some("text"));
        assert_eq!(attribute(&ctx, &input, "name").as_deref(), Some("q"));
        assert!(attribute(&ctx, &input, "id").is_none());
    }
}
