//! Objective-C declarations layered on the C symbol walker:
//! `@interface` (with categories), `@implementation`, `@protocol`,
//! method selectors, `@property` and instance variables

use crate::extractors::base::{children, ExtractionContext, SymbolKind, SymbolOptions, Visibility};
use crate::extractors::c::helpers::{declarator_name, doc_comment};
use crate::extractors::c::symbols::SymbolWalker;
use tree_sitter::Node;

/// Symbol hook for the C walker; returns true for Objective-C containers
pub(super) fn extract_declaration(
    walker: &mut SymbolWalker<'_, '_>,
    node: Node<'_>,
    _parent: Option<&str>,
    _depth: usize,
) -> bool {
    match node.kind() {
        "class_interface" => extract_interface(walker, node),
        "class_implementation" => extract_implementation(walker, node),
        "protocol_declaration" => extract_protocol(walker, node),
        _ => return false,
    }
    true
}

/// `Foo` or `Foo(Category)` for an interface/implementation node
pub(super) fn class_name(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let name = ctx.find_child_text(node, "identifier")?;
    match category_name(ctx, node) {
        Some(category) => Some(format!("{}({})", name, category)),
        None => Some(name),
    }
}

/// Identifier between `(` and `)`
fn category_name(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let mut in_parens = false;
    for child in children(node) {
        match child.kind() {
            "(" => in_parens = true,
            ")" => break,
            "identifier" if in_parens => return Some(ctx.get_node_text(&child)),
            _ => {}
        }
    }
    None
}

pub(super) fn is_category(node: &Node) -> bool {
    children(node).iter().any(|c| c.kind() == "(")
}

/// Identifier after `:` in `@interface Foo : Bar`
pub(super) fn superclass_name(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    if is_category(node) {
        return None;
    }
    if let Some(superclass) = ctx.get_field_text(node, "superclass") {
        return Some(superclass);
    }
    let mut after_colon = false;
    for child in children(node) {
        match child.kind() {
            ":" => after_colon = true,
            "identifier" | "type_identifier" if after_colon => {
                return Some(ctx.get_node_text(&child))
            }
            _ => {}
        }
    }
    None
}

/// Protocols adopted in `<P1, P2>`
pub(super) fn protocol_names(ctx: &ExtractionContext, node: &Node) -> Vec<String> {
    let Some(list) = ctx.find_child_by_types(node, &["parameterized_arguments", "protocol_qualifiers"]) else {
        return Vec::new();
    };
    children(&list)
        .iter()
        .filter(|c| matches!(c.kind(), "type_name" | "type_identifier" | "identifier"))
        .map(|c| ctx.get_node_text(c))
        .collect()
}

/// Selector of a method node: `doThing` or keyword form `foo:bar:`
pub(super) fn selector(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let kids = children(node);
    let mut parts: Vec<String> = Vec::new();
    let mut i = 0;
    while i < kids.len() {
        let child = kids[i];
        match child.kind() {
            "identifier" if parts.is_empty() => {
                let next_is_param = kids.get(i + 1).is_some_and(|n| n.kind() == "method_parameter");
                if !next_is_param {
                    return Some(ctx.get_node_text(&child));
                }
                parts.push(ctx.get_node_text(&child));
            }
            "method_parameter" => {
                match parts.last_mut() {
                    Some(last) if !last.ends_with(':') => last.push(':'),
                    _ => parts.push(":".to_string()),
                }
                if let Some(next) = kids.get(i + 1).filter(|n| n.kind() == "identifier") {
                    parts.push(ctx.get_node_text(next));
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    let selector = parts.concat();
    (!selector.is_empty()).then_some(selector)
}

fn return_type(ctx: &ExtractionContext, node: &Node) -> String {
    ctx.find_child_by_type(node, "method_type")
        .and_then(|t| ctx.find_child_by_type(&t, "type_name"))
        .map(|t| ctx.get_node_text(&t))
        .unwrap_or_else(|| "void".to_string())
}

fn is_class_method(ctx: &ExtractionContext, node: &Node) -> bool {
    children(node).iter().any(|c| ctx.get_node_text(c) == "+")
}

fn extract_interface(walker: &mut SymbolWalker, node: Node) {
    let ctx = walker.ctx;
    let Some(qualified) = class_name(ctx, &node) else {
        return;
    };
    let mut signature = format!("@interface {}", qualified);
    if let Some(superclass) = superclass_name(ctx, &node) {
        signature.push_str(&format!(" : {}", superclass));
    }
    let protocols = protocol_names(ctx, &node);
    if !protocols.is_empty() {
        signature.push_str(&format!(" <{}>", protocols.join(", ")));
    }
    walker.symbols.push(ctx.symbol(
        &node,
        &qualified,
        SymbolKind::Class,
        SymbolOptions {
            signature: Some(signature),
            docstring: doc_comment(ctx, &node),
            ..Default::default()
        },
    ));

    for child in children(&node) {
        match child.kind() {
            "method_declaration" => push_method(walker, &child, &qualified, true),
            "property_declaration" => extract_property(walker, &child, &qualified),
            "instance_variables" => extract_ivars(walker, &child, &qualified),
            _ => {}
        }
    }
}

fn extract_implementation(walker: &mut SymbolWalker, node: Node) {
    let ctx = walker.ctx;
    let Some(qualified) = class_name(ctx, &node) else {
        return;
    };
    walker.symbols.push(ctx.symbol(
        &node,
        &qualified,
        SymbolKind::Class,
        SymbolOptions {
            signature: Some(format!("@implementation {}", qualified)),
            is_exported: Some(false),
            ..Default::default()
        },
    ));
    for child in children(&node) {
        match child.kind() {
            "implementation_definition" => {
                for inner in ctx.find_children_by_type(&child, "method_definition") {
                    push_method(walker, &inner, &qualified, false);
                }
            }
            "method_definition" => push_method(walker, &child, &qualified, false),
            "instance_variables" => extract_ivars(walker, &child, &qualified),
            _ => {}
        }
    }
}

fn extract_protocol(walker: &mut SymbolWalker, node: Node) {
    let ctx = walker.ctx;
    let Some(name) = ctx.find_child_by_type(&node, "identifier").map(|n| ctx.get_node_text(&n)) else {
        return;
    };
    walker.symbols.push(ctx.symbol(
        &node,
        &name,
        SymbolKind::Interface,
        SymbolOptions {
            signature: Some(format!("@protocol {}", name)),
            docstring: doc_comment(ctx, &node),
            ..Default::default()
        },
    ));
    for method in ctx.find_children_by_type(&node, "method_declaration") {
        push_method(walker, &method, &name, true);
    }
}

/// Declared methods are public API; definitions are implementation detail
fn push_method(walker: &mut SymbolWalker, node: &Node, owner: &str, declared: bool) {
    let ctx = walker.ctx;
    let Some(selector) = selector(ctx, node) else {
        return;
    };
    let prefix = if is_class_method(ctx, node) { "+" } else { "-" };
    walker.symbols.push(ctx.symbol(
        node,
        &selector,
        SymbolKind::Method,
        SymbolOptions {
            qualified_name: Some(format!("{}.{}", owner, selector)),
            signature: Some(format!("{} ({}){}", prefix, return_type(ctx, node), selector)),
            is_exported: Some(declared),
            parent_name: Some(owner.to_string()),
            ..Default::default()
        },
    ));
}

/// `@property (nonatomic) NSString *title;`
fn extract_property(walker: &mut SymbolWalker, node: &Node, owner: &str) {
    let ctx = walker.ctx;
    let text = ctx.get_node_text(node);
    let declared = text.split(';').next().unwrap_or(&text).trim();
    let declared = declared.strip_prefix("@property").unwrap_or(declared).trim();
    for declaration in ctx.find_children_by_type(node, "struct_declaration") {
        for declarator in ctx.find_children_by_type(&declaration, "struct_declarator") {
            let Some(name) = first_identifier(ctx, &declarator) else {
                continue;
            };
            walker.symbols.push(ctx.symbol(
                node,
                &name,
                SymbolKind::Property,
                SymbolOptions {
                    qualified_name: Some(format!("{}.{}", owner, name)),
                    signature: Some(format!("@property {}", declared)),
                    parent_name: Some(owner.to_string()),
                    ..Default::default()
                },
            ));
        }
    }
}

/// Instance variables in the `{ ... }` block
fn extract_ivars(walker: &mut SymbolWalker, node: &Node, owner: &str) {
    let ctx = walker.ctx;
    for ivar in ctx.find_children_by_type(node, "instance_variable") {
        for declaration in ctx.find_children_by_type(&ivar, "struct_declaration") {
            for declarator in ctx.find_children_by_type(&declaration, "struct_declarator") {
                let Some(name) = first_identifier(ctx, &declarator) else {
                    continue;
                };
                walker.symbols.push(ctx.symbol(
                    &declaration,
                    &name,
                    SymbolKind::Field,
                    SymbolOptions {
                        qualified_name: Some(format!("{}.{}", owner, name)),
                        visibility: Some(Visibility::Protected),
                        is_exported: Some(false),
                        parent_name: Some(owner.to_string()),
                        ..Default::default()
                    },
                ));
            }
        }
    }
}

fn first_identifier(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    declarator_name(ctx, node).or_else(|| {
        ctx.find_descendant_by_types(node, &["field_identifier", "identifier"], 8)
            .map(|n| ctx.get_node_text(&n))
    })
}
