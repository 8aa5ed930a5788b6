//! Declarator navigation and comment helpers shared by the C, C++ and
//! Objective-C walkers

use crate::extractors::base::{children, strip_comment_markers, ExtractionContext};
use tree_sitter::Node;

/// Name and parameter text of a function declarator, looking through
/// pointer and reference declarators (`int *make(void)`)
pub(crate) fn function_parts(ctx: &ExtractionContext, declarator: &Node) -> Option<(String, String)> {
    match declarator.kind() {
        "function_declarator" => {
            let name = ctx.get_field_text(declarator, "declarator")?;
            let params = ctx.params_text(declarator.child_by_field_name("parameters"));
            Some((name, params))
        }
        "pointer_declarator" | "reference_declarator" => children(declarator)
            .iter()
            .find(|c| matches!(c.kind(), "function_declarator" | "pointer_declarator" | "reference_declarator"))
            .and_then(|inner| function_parts(ctx, inner)),
        _ => None,
    }
}

/// Function declarator anywhere in a declarator chain
pub(crate) fn contains_function_declarator(node: &Node) -> bool {
    match node.kind() {
        "function_declarator" => true,
        "pointer_declarator" | "reference_declarator" => {
            children(node).iter().any(contains_function_declarator)
        }
        _ => false,
    }
}

/// Innermost identifier of a declarator (`*items[4]` -> `items`,
/// `(*callback)(int)` -> `callback`)
pub(crate) fn declarator_name(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    match node.kind() {
        "identifier" | "field_identifier" | "type_identifier" => Some(ctx.get_node_text(node)),
        "init_declarator"
        | "pointer_declarator"
        | "array_declarator"
        | "reference_declarator"
        | "parenthesized_declarator"
        | "function_declarator"
        | "attributed_declarator" => {
            if let Some(inner) = node.child_by_field_name("declarator") {
                return declarator_name(ctx, &inner);
            }
            children(node)
                .iter()
                .filter(|c| c.is_named())
                .find_map(|c| declarator_name(ctx, c))
        }
        _ => None,
    }
}

/// `storage_class_specifier` of a declaration is `static`
pub(crate) fn is_static(ctx: &ExtractionContext, node: &Node) -> bool {
    ctx.find_children_by_type(node, "storage_class_specifier")
        .iter()
        .any(|s| ctx.get_node_text(s) == "static")
}

pub(crate) fn is_const(ctx: &ExtractionContext, node: &Node) -> bool {
    ctx.find_children_by_type(node, "type_qualifier")
        .iter()
        .any(|q| ctx.get_node_text(q) == "const")
}

/// Contiguous `//` or `/* */` comments right above a declaration
pub(crate) fn doc_comment(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let comments = ctx.preceding_comments(node, &["comment"]);
    if comments.is_empty() {
        return None;
    }
    let doc = comments
        .iter()
        .map(|c| strip_comment_markers(c))
        .collect::<Vec<_>>()
        .join("\n");
    (!doc.is_empty()).then_some(doc)
}

/// Header files export their declarations
pub(crate) fn is_header(file_path: &str) -> bool {
    [".h", ".hpp", ".hh", ".hxx"]
        .iter()
        .any(|ext| file_path.ends_with(ext))
}

pub(crate) fn is_literal(kind: &str) -> bool {
    matches!(
        kind,
        "number_literal" | "string_literal" | "char_literal" | "true" | "false" | "null" | "nullptr"
    )
}
