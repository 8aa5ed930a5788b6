// PHP Extractor - Helper utilities
// Modifier lookup, PHPDoc and name normalization shared by both walks

use crate::extractors::base::{children, last_segment, ExtractionContext, Visibility};
use tree_sitter::Node;

const MODIFIER_KINDS: &[&str] = &[
    "visibility_modifier",
    "static_modifier",
    "readonly_modifier",
    "abstract_modifier",
    "final_modifier",
];

/// Declared visibility; PHP members without one are public
pub(super) fn visibility(ctx: &ExtractionContext, node: &Node) -> Visibility {
    ctx.find_child_by_type(node, "visibility_modifier")
        .and_then(|m| Visibility::from_keyword(ctx.get_node_text(&m).trim()))
        .unwrap_or(Visibility::Public)
}

pub(super) fn has_modifier(ctx: &ExtractionContext, node: &Node, modifier: &str) -> bool {
    children(node)
        .iter()
        .filter(|c| MODIFIER_KINDS.contains(&c.kind()))
        .any(|c| ctx.get_node_text(c).contains(modifier))
}

/// `/** ... */` directly above a declaration
pub(super) fn phpdoc(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let prev = node.prev_sibling().filter(|p| p.kind() == "comment")?;
    let text = ctx.get_node_text(&prev);
    let body = text.trim().strip_prefix("/**")?;
    let body = body.strip_suffix("*/").unwrap_or(body);
    Some(body.trim().to_string())
}

/// `App\Models\User` -> `User`
pub(super) fn short_name(name: &str) -> &str {
    last_segment(name.trim_start_matches('\\'), &["\\"])
}

/// Every `name`/`qualified_name` under a heritage clause
pub(super) fn clause_names(ctx: &ExtractionContext, node: &Node) -> Vec<String> {
    let mut out = Vec::new();
    for child in children(node) {
        if matches!(child.kind(), "name" | "qualified_name") {
            out.push(ctx.get_node_text(&child));
        } else {
            out.extend(clause_names(ctx, &child));
        }
    }
    out
}

/// `$name` without the sigil
pub(super) fn variable_name(raw: &str) -> &str {
    raw.trim_start_matches('$')
}

/// Base and interface names declared by a type, for heritage references
/// `true` marks `extends`, `false` marks `implements`
pub(super) fn heritage(ctx: &ExtractionContext, node: &Node) -> Vec<(bool, String)> {
    let mut out = Vec::new();
    for child in children(node) {
        let inherits = match child.kind() {
            "base_clause" => true,
            "class_interface_clause" => false,
            _ => continue,
        };
        out.extend(clause_names(ctx, &child).into_iter().map(|n| (inherits, n)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_strips_namespace() {
        assert_eq!(short_name("\\App\\Models\\User"), "User");
        assert_eq!(short_name("Countable"), "Countable");
        assert_eq!(variable_name("$id"), "id");
    }
}
