// Go reference extraction: imports, calls, embedding

use super::symbols::{embedding_refs, receiver_type};
use crate::extractors::base::{children, last_segment, ExtractionContext, Reference, ReferenceKind};
use tree_sitter::Node;

pub fn extract_references(ctx: &ExtractionContext, root: Node) -> Vec<Reference> {
    let mut refs = Vec::new();
    walk(ctx, root, None, 0, &mut refs);
    refs.extend(embedding_refs(ctx, root));
    refs
}

fn walk(
    ctx: &ExtractionContext,
    node: Node,
    scope: Option<&str>,
    depth: usize,
    refs: &mut Vec<Reference>,
) {
    if ctx.depth_exceeded(depth, ctx.config.max_walk_depth) {
        return;
    }
    for child in children(&node) {
        match child.kind() {
            "import_declaration" => extract_imports(ctx, &child, scope, refs),
            "call_expression" => extract_call(ctx, &child, scope, depth, refs),
            "function_declaration" => {
                let name = ctx.get_field_text(&child, "name");
                walk(ctx, child, name.as_deref().or(scope), depth + 1, refs);
            }
            "method_declaration" => {
                let name = ctx.get_field_text(&child, "name").map(|name| {
                    match receiver_type(ctx, child.child_by_field_name("receiver")) {
                        Some(recv) => format!("{}.{}", recv, name),
                        None => name,
                    }
                });
                walk(ctx, child, name.as_deref().or(scope), depth + 1, refs);
            }
            _ => walk(ctx, child, scope, depth + 1, refs),
        }
    }
}

fn extract_imports(
    ctx: &ExtractionContext,
    node: &Node,
    scope: Option<&str>,
    refs: &mut Vec<Reference>,
) {
    for child in children(node) {
        match child.kind() {
            "import_spec" => {
                let Some(path_node) = child.child_by_field_name("path") else {
                    continue;
                };
                let path = ctx.get_node_text(&path_node).trim_matches('"').to_string();
                let target = ctx
                    .get_field_text(&child, "name")
                    .unwrap_or_else(|| last_segment(&path, &["/"]).to_string());
                refs.push(
                    ctx.reference(ReferenceKind::Import, target, &child, scope)
                        .with_import_path(path),
                );
            }
            "import_spec_list" => extract_imports(ctx, &child, scope, refs),
            "interpreted_string_literal" => {
                let path = ctx.get_node_text(&child).trim_matches('"').to_string();
                let target = last_segment(&path, &["/"]).to_string();
                refs.push(
                    ctx.reference(ReferenceKind::Import, target, &child, scope)
                        .with_import_path(path),
                );
            }
            _ => {}
        }
    }
}

fn extract_call(
    ctx: &ExtractionContext,
    node: &Node,
    scope: Option<&str>,
    depth: usize,
    refs: &mut Vec<Reference>,
) {
    let Some(function) = node.child_by_field_name("function") else {
        return;
    };
    // obj.Method() -> "Method"
    let name = if function.kind() == "selector_expression" {
        ctx.get_field_text(&function, "field")
            .unwrap_or_else(|| ctx.get_node_text(&function))
    } else {
        ctx.get_node_text(&function)
    };
    refs.push(ctx.reference(ReferenceKind::Call, name, &function, scope));

    if let Some(args) = node.child_by_field_name("arguments") {
        walk(ctx, args, scope, depth + 1, refs);
    }
}
