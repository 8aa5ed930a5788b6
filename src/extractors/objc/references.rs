//! Objective-C references layered on the C reference walker:
//! message sends, `@import`, `#import` and class heritage

use super::symbols::{class_name, protocol_names, selector, superclass_name};
use crate::extractors::base::{children, qualify, ReferenceKind};
use crate::extractors::c::references::RefWalker;
use tree_sitter::Node;

/// Reference hook for the C walker; returns true when it consumed the node
pub(super) fn extract_reference(
    walker: &mut RefWalker<'_, '_>,
    node: Node<'_>,
    scope: Option<&str>,
    depth: usize,
) -> bool {
    match node.kind() {
        "message_expression" => extract_message(walker, node, scope, depth),
        "module_import" => extract_module_import(walker, &node, scope),
        "preproc_import" => walker.extract_include(&node, scope),
        "class_interface" => {
            let Some(owner) = class_name(walker.ctx, &node) else {
                return true;
            };
            extract_heritage(walker, &node, &owner);
            walker.walk(node, Some(&owner), depth + 1);
        }
        "class_implementation" => {
            let owner = class_name(walker.ctx, &node);
            walker.walk(node, owner.as_deref().or(scope), depth + 1);
        }
        "method_definition" => {
            let inner = selector(walker.ctx, &node).map(|s| qualify(scope, &s, "."));
            walker.walk(node, inner.as_deref().or(scope), depth + 1);
        }
        _ => return false,
    }
    true
}

/// `[receiver doThing:x]`: the call target is the first selector keyword
fn extract_message(walker: &mut RefWalker, node: Node, scope: Option<&str>, depth: usize) {
    let ctx = walker.ctx;
    let receiver = node
        .child_by_field_name("receiver")
        .or_else(|| node.named_child(0));
    let method = node.child_by_field_name("method").or_else(|| {
        children(&node)
            .into_iter()
            .filter(|c| Some(c.id()) != receiver.map(|r| r.id()))
            .find(|c| c.kind() == "identifier")
    });
    if let Some(method) = method {
        walker.refs.push(ctx.reference(
            ReferenceKind::Call,
            ctx.get_node_text(&method),
            &method,
            scope,
        ));
    }
    walker.walk(node, scope, depth + 1);
}

/// `@import Foundation.NSString;` -> target `Foundation`, path `Foundation.NSString`
fn extract_module_import(walker: &mut RefWalker, node: &Node, scope: Option<&str>) {
    let ctx = walker.ctx;
    let parts: Vec<String> = children(node)
        .iter()
        .filter(|c| c.kind() == "identifier")
        .map(|c| ctx.get_node_text(c))
        .collect();
    let Some(first) = parts.first() else {
        return;
    };
    walker.refs.push(
        ctx.reference(ReferenceKind::Import, first.clone(), node, scope)
            .with_import_path(parts.join(".")),
    );
}

/// Superclass inherits; adopted protocols implement
fn extract_heritage(walker: &mut RefWalker, node: &Node, owner: &str) {
    let ctx = walker.ctx;
    if let Some(superclass) = superclass_name(ctx, node) {
        walker
            .refs
            .push(ctx.reference(ReferenceKind::Inherits, superclass, node, Some(owner)));
    }
    for protocol in protocol_names(ctx, node) {
        walker
            .refs
            .push(ctx.reference(ReferenceKind::Implements, protocol, node, Some(owner)));
    }
}
