/// Helper utilities for Ruby extraction: doc comments, string and
/// constant-path handling
use crate::extractors::base::{last_segment, ExtractionContext};
use tree_sitter::Node;

/// Consecutive `#` comment lines directly above a definition
///
/// The grammar hangs a comment that opens a `module`/`class` body on the
/// container, ahead of its `body_statement`, so the first definition in a
/// body also looks there.
pub(super) fn doc_comment(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let mut comments = ctx.preceding_comments(node, &["comment"]);
    if comments.is_empty() && node.prev_sibling().is_none() {
        if let Some(body) = node.parent().filter(|p| p.kind() == "body_statement") {
            comments = ctx.preceding_comments(&body, &["comment"]);
        }
    }
    let lines: Vec<String> = comments
        .iter()
        .map(|c| c.trim_start_matches('#').trim().to_string())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// `Admin::User` -> `User`
pub(super) fn short_constant(name: &str) -> &str {
    last_segment(name, &["::"])
}

/// Content of a plain string literal without interpolation
pub(super) fn string_content(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    ctx.find_child_by_type(node, "string_content")
        .map(|c| ctx.get_node_text(&c))
}

/// Bare `private` / `protected` / `public` keyword calls switch the default
/// visibility of the methods that follow
pub(super) fn visibility_keyword(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    if node.kind() != "identifier" {
        return None;
    }
    let text = ctx.get_node_text(node);
    matches!(text.as_str(), "private" | "protected" | "public").then_some(text)
}
