/// Helper functions for Java extraction
/// Handles modifiers, annotations, heritage clauses and Javadoc
use crate::extractors::base::{children, strip_comment_markers, ExtractionContext};
use tree_sitter::Node;

/// Modifier keywords of a declaration (`public`, `static`, `final`, ...)
///
/// Annotations inside the `modifiers` node are skipped; see `annotations`.
pub(crate) fn extract_modifiers(ctx: &ExtractionContext, node: &Node) -> Vec<String> {
    ctx.find_child_by_type(node, "modifiers")
        .map(|modifiers| {
            children(&modifiers)
                .iter()
                .filter(|c| !matches!(c.kind(), "annotation" | "marker_annotation"))
                .flat_map(|c| {
                    ctx.get_node_text(c)
                        .split_whitespace()
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Annotation texts in source order (`@Override`, `@Table(name = "x")`)
pub(crate) fn annotations(ctx: &ExtractionContext, node: &Node) -> Vec<String> {
    ctx.find_child_by_type(node, "modifiers")
        .map(|modifiers| {
            children(&modifiers)
                .iter()
                .filter(|c| matches!(c.kind(), "annotation" | "marker_annotation"))
                .map(|c| ctx.get_node_text(c))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn has_modifier(modifiers: &[String], keyword: &str) -> bool {
    modifiers.iter().any(|m| m == keyword)
}

/// Prepend annotation lines to a signature
pub(crate) fn with_annotations(annotations: &[String], signature: String) -> String {
    if annotations.is_empty() {
        signature
    } else {
        format!("{}\n{}", annotations.join("\n"), signature)
    }
}

/// Type nodes listed in a heritage clause (`extends A`, `implements B, C<T>`)
pub(crate) fn heritage_types<'t>(clause: &Node<'t>) -> Vec<Node<'t>> {
    let mut types = Vec::new();
    for child in children(clause) {
        match child.kind() {
            "type_list" => types.extend(heritage_types(&child)),
            "type_identifier" | "generic_type" | "scoped_type_identifier" => types.push(child),
            _ => {}
        }
    }
    types
}

/// Bare type name: `java.util.List<String>` -> `List`
pub(crate) fn base_type_name(ctx: &ExtractionContext, node: &Node) -> String {
    let text = ctx.get_node_text(node);
    let head = text.split('<').next().unwrap_or(&text).trim();
    head.rsplit('.').next().unwrap_or(head).to_string()
}

/// Javadoc block (`/** ... */`) immediately before a declaration
pub(crate) fn javadoc(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let prev = node.prev_sibling()?;
    if !matches!(prev.kind(), "block_comment" | "comment") {
        return None;
    }
    let text = ctx.get_node_text(&prev);
    if !text.trim_start().starts_with("/**") {
        return None;
    }
    Some(strip_comment_markers(&text)).filter(|doc| !doc.is_empty())
}
