// Swift profile for the generic engine
//
// `class_declaration` covers class, struct, enum and extension, told apart by
// the keyword token. Declarations default to internal visibility.

use super::references::{clause_target, RefWalker};
use super::symbols::{find_literal, SymbolWalker};
use super::{modifier_visibility, Profile};
use crate::extractors::base::{
    children, unquote, ExtractionContext, ReferenceKind, SymbolKind, Visibility,
};
use tree_sitter::Node;

pub(crate) static SWIFT: Profile = Profile {
    extensions: &[".swift"],
    classify: Some(classify),
    name: Some(name),
    visibility: Some(visibility),
    properties: Some(properties),
    inheritance: Some(inheritance),
};

fn classify(node: &Node) -> Option<SymbolKind> {
    match node.kind() {
        "protocol_declaration" => Some(SymbolKind::Interface),
        "class_declaration" => {
            let parts = children(node);
            let has_token = |token: &str| parts.iter().any(|c| !c.is_named() && c.kind() == token);
            if has_token("struct") {
                Some(SymbolKind::Struct)
            } else if has_token("enum") || parts.iter().any(|c| c.kind() == "enum_class_body") {
                Some(SymbolKind::Enum)
            } else {
                Some(SymbolKind::Class)
            }
        }
        "init_declaration" => Some(SymbolKind::Constructor),
        "function_declaration" | "protocol_function_declaration" => {
            if in_type_body(node) {
                Some(SymbolKind::Method)
            } else {
                Some(SymbolKind::Function)
            }
        }
        _ => None,
    }
}

fn in_type_body(node: &Node) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if matches!(parent.kind(), "class_body" | "protocol_body" | "enum_class_body") {
            return true;
        }
        current = parent.parent();
    }
    false
}

fn name(_ctx: &ExtractionContext, node: &Node) -> Option<String> {
    (node.kind() == "init_declaration").then(|| "init".to_string())
}

fn visibility(ctx: &ExtractionContext, node: &Node) -> Visibility {
    modifier_visibility(ctx, node).unwrap_or(Visibility::Internal)
}

/// Stored and computed properties declared directly in the body
fn properties(walker: &mut SymbolWalker<'_, '_>, _class: Node, body: Node, class_name: &str) {
    let ctx = walker.ctx;
    for child in children(&body) {
        if child.kind() != "property_declaration" {
            continue;
        }
        let Some(name) = property_name(ctx, &child) else {
            continue;
        };
        let signature = match ctx.find_child_text(&child, "value_binding_pattern") {
            Some(binding) if !binding.trim().is_empty() => format!("{} {}", binding.trim(), name),
            _ => name.clone(),
        };
        let default_value = default_value(ctx, &child);
        let visibility = visibility(ctx, &child);
        walker.push_property(
            &child,
            name,
            class_name,
            Some(signature),
            visibility,
            default_value,
        );
    }
}

fn property_name(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    if let Some(pattern) = ctx.find_child_text(node, "pattern") {
        return Some(pattern.trim().to_string());
    }
    ctx.descendants(node, ctx.config.generic_max_depth)
        .into_iter()
        .filter(|n| matches!(n.kind(), "simple_identifier" | "identifier"))
        .map(|n| ctx.get_node_text(&n).trim().to_string())
        .find(|t| !t.is_empty())
}

/// Literal initializer with string quotes removed
fn default_value(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    if let Some(value) = find_literal(ctx, node, 3) {
        return Some(unquote(&value).to_string());
    }
    for sub in ctx.descendants(node, ctx.config.generic_max_depth) {
        match sub.kind() {
            "line_str_text" => {
                let text = ctx.get_node_text(&sub).trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
            "line_string_literal" | "multiline_string_literal" => {
                let text = ctx.get_node_text(&sub);
                let text = unquote(&text);
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Classes inherit from their first specifier and adopt the rest; structs
/// only adopt; protocols only refine
fn inheritance(
    walker: &mut RefWalker<'_, '_>,
    class: Node,
    kind: &SymbolKind,
    class_name: &str,
) -> bool {
    let ctx = walker.ctx;
    let specifiers = ctx.find_children_by_type(&class, "inheritance_specifier");
    for (index, spec) in specifiers.iter().enumerate() {
        let target = clause_target(ctx, spec).or_else(|| {
            let text = ctx.get_node_text(spec);
            let text = text.split('<').next().unwrap_or_default().trim().to_string();
            (!text.is_empty()).then_some(text)
        });
        let Some(target) = target else {
            continue;
        };
        let edge = match kind {
            SymbolKind::Class if index == 0 => ReferenceKind::Inherits,
            SymbolKind::Interface => ReferenceKind::Inherits,
            _ => ReferenceKind::Implements,
        };
        walker.push_edge(edge, target, &class, class_name);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{extract, find};
    use super::*;

    #[test]
    fn test_types_members_and_properties() {
        let code = r#"
// Base shape.
class Shape: NSObject, Drawable {
    public var name: String = "shape"
    private let sides = 4
    init(name: String) {
        self.name = name
    }
    func area() -> Double {
        return compute()
    }
}

struct Point: Equatable {
    var x = 0
}

protocol Drawable: Renderable {
    func draw()
}

public func helper() {}
"#;
        let (symbols, refs) = extract("swift", tree_sitter_swift::LANGUAGE.into(), code);
        let shape = find(&symbols, "Shape");
        assert_eq!(shape.kind, SymbolKind::Class);
        assert_eq!(shape.docstring.as_deref(), Some("Base shape."));
        assert_eq!(shape.visibility, Visibility::Internal);
        assert!(!shape.is_exported);

        let name = find(&symbols, "Shape.name");
        assert_eq!(name.kind, SymbolKind::Property);
        assert_eq!(name.signature.as_deref(), Some("var name"));
        assert_eq!(name.default_value.as_deref(), Some("shape"));
        assert!(name.is_exported);
        let sides = find(&symbols, "Shape.sides");
        assert_eq!(sides.visibility, Visibility::Private);
        assert_eq!(sides.default_value.as_deref(), Some("4"));
        assert_eq!(sides.signature.as_deref(), Some("let sides"));

        assert_eq!(find(&symbols, "Shape.init").kind, SymbolKind::Constructor);
        assert_eq!(find(&symbols, "Shape.area").kind, SymbolKind::Method);
        assert_eq!(find(&symbols, "Point").kind, SymbolKind::Struct);
        assert_eq!(find(&symbols, "Point.x").visibility, Visibility::Internal);
        assert_eq!(find(&symbols, "Drawable").kind, SymbolKind::Interface);
        assert_eq!(find(&symbols, "Drawable.draw").kind, SymbolKind::Method);
        let helper = find(&symbols, "helper");
        assert_eq!(helper.kind, SymbolKind::Function);
        assert!(helper.is_exported);

        let edges: Vec<_> = refs
            .iter()
            .filter(|r| matches!(r.kind, ReferenceKind::Inherits | ReferenceKind::Implements))
            .map(|r| (r.kind.clone(), r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert_eq!(
            edges,
            vec![
                (ReferenceKind::Inherits, "NSObject", Some("Shape")),
                (ReferenceKind::Implements, "Drawable", Some("Shape")),
                (ReferenceKind::Implements, "Equatable", Some("Point")),
                (ReferenceKind::Inherits, "Renderable", Some("Drawable")),
            ]
        );
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Call
            && r.target_name == "compute"
            && r.source_name.as_deref() == Some("Shape.area")));
    }
}
