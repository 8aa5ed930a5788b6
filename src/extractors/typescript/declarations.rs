//! TypeScript-only declarations: interfaces, type aliases, enums, namespaces
//!
//! Plugged into the shared ECMAScript walker as its declaration hook.

use crate::extractors::base::{children, SymbolKind, SymbolOptions};
use crate::extractors::javascript::symbols::{has_token, jsdoc, type_annotation, SymbolWalker};
use tree_sitter::Node;

/// Returns true when `node` was a TypeScript-only declaration
pub(crate) fn extract_declaration(
    walker: &mut SymbolWalker<'_, '_>,
    node: Node<'_>,
    parent: Option<&str>,
    exported: bool,
) -> bool {
    match node.kind() {
        "interface_declaration" => extract_interface(walker, node, parent, exported),
        "type_alias_declaration" => extract_type_alias(walker, node, parent, exported),
        "enum_declaration" => extract_enum(walker, node, parent, exported),
        "internal_module" | "module" => extract_namespace(walker, node, parent, exported),
        // `namespace X {}` may parse as an expression statement
        "expression_statement" => match walker.ctx.find_child_by_type(&node, "internal_module") {
            Some(module) => extract_namespace(walker, module, parent, exported),
            None => return false,
        },
        _ => return false,
    }
    true
}

fn extract_interface(walker: &mut SymbolWalker, node: Node, parent: Option<&str>, exported: bool) {
    let ctx = walker.ctx;
    let Some(name) = ctx.get_field_text(&node, "name") else {
        return;
    };
    let mut signature = format!(
        "interface {}{}",
        name,
        ctx.get_field_text(&node, "type_parameters").unwrap_or_default()
    );
    if let Some(extends) = ctx.find_child_by_type(&node, "extends_type_clause") {
        signature.push(' ');
        signature.push_str(&ctx.get_node_text(&extends));
    }
    let qualified = walker.push(
        &node,
        &name,
        SymbolKind::Interface,
        parent,
        SymbolOptions {
            signature: Some(signature),
            docstring: jsdoc(ctx, &node),
            is_exported: Some(exported),
            ..Default::default()
        },
    );

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    for member in children(&body) {
        let Some(member_name) = ctx.get_field_text(&member, "name") else {
            continue;
        };
        match member.kind() {
            "method_signature" => {
                let mut signature = format!(
                    "{}({})",
                    member_name,
                    ctx.params_text(member.child_by_field_name("parameters"))
                );
                if let Some(ret) = ctx.get_field_text(&member, "return_type") {
                    signature.push_str(&type_annotation(&ret));
                }
                walker.push(
                    &member,
                    &member_name,
                    SymbolKind::Method,
                    Some(&qualified),
                    SymbolOptions {
                        signature: Some(signature),
                        ..Default::default()
                    },
                );
            }
            "property_signature" => {
                let mut signature = member_name.clone();
                if let Some(ty) = ctx.get_field_text(&member, "type") {
                    signature.push_str(&type_annotation(&ty));
                }
                walker.push(
                    &member,
                    &member_name,
                    SymbolKind::Property,
                    Some(&qualified),
                    SymbolOptions {
                        signature: Some(signature),
                        ..Default::default()
                    },
                );
            }
            _ => {}
        }
    }
}

fn extract_type_alias(walker: &mut SymbolWalker, node: Node, parent: Option<&str>, exported: bool) {
    let ctx = walker.ctx;
    let Some(name) = ctx.get_field_text(&node, "name") else {
        return;
    };
    let mut signature = format!(
        "type {}{}",
        name,
        ctx.get_field_text(&node, "type_parameters").unwrap_or_default()
    );
    if let Some(value) = ctx.get_field_text(&node, "value") {
        if value.len() <= 80 {
            signature.push_str(" = ");
            signature.push_str(&value);
        }
    }
    walker.push(
        &node,
        &name,
        SymbolKind::TypeAlias,
        parent,
        SymbolOptions {
            signature: Some(signature),
            docstring: jsdoc(ctx, &node),
            is_exported: Some(exported),
            ..Default::default()
        },
    );
}

fn extract_enum(walker: &mut SymbolWalker, node: Node, parent: Option<&str>, exported: bool) {
    let ctx = walker.ctx;
    let Some(name) = ctx.get_field_text(&node, "name") else {
        return;
    };
    let const_prefix = if has_token(&node, "const") { "const " } else { "" };
    let qualified = walker.push(
        &node,
        &name,
        SymbolKind::Enum,
        parent,
        SymbolOptions {
            signature: Some(format!("{}enum {}", const_prefix, name)),
            docstring: jsdoc(ctx, &node),
            is_exported: Some(exported),
            ..Default::default()
        },
    );

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    for member in children(&body) {
        let (member_name, default_value) = match member.kind() {
            "property_identifier" => (ctx.get_node_text(&member), None),
            "enum_assignment" => match member.named_child(0) {
                Some(n) => (ctx.get_node_text(&n), ctx.get_field_text(&member, "value")),
                None => continue,
            },
            _ => continue,
        };
        walker.push(
            &member,
            &member_name,
            SymbolKind::Field,
            Some(&qualified),
            SymbolOptions {
                default_value,
                ..Default::default()
            },
        );
    }
}

/// `namespace X { ... }` / `module X { ... }`
fn extract_namespace(walker: &mut SymbolWalker, node: Node, parent: Option<&str>, exported: bool) {
    let ctx = walker.ctx;
    let Some(name) = ctx.get_field_text(&node, "name") else {
        return;
    };
    let keyword = if node.kind() == "module" { "module" } else { "namespace" };
    let qualified = walker.push(
        &node,
        &name,
        SymbolKind::Module,
        parent,
        SymbolOptions {
            signature: Some(format!("{} {}", keyword, name)),
            docstring: jsdoc(ctx, &node),
            is_exported: Some(exported),
            ..Default::default()
        },
    );
    if let Some(body) = node.child_by_field_name("body") {
        walker.walk(body, Some(&qualified), false, 1);
    }
}
