// Kotlin profile for the generic engine
//
// Adds keyword classification (`interface`, `enum`, `object`), methods
// inside class bodies, `val`/`var` constructor parameters as properties and
// delegation specifiers as inherits/implements edges.

use super::references::{clause_target, RefWalker};
use super::symbols::SymbolWalker;
use super::{modifier_visibility, Profile};
use crate::extractors::base::{
    children, ExtractionContext, ReferenceKind, SymbolKind, Visibility,
};
use tree_sitter::Node;

pub(crate) static KOTLIN: Profile = Profile {
    extensions: &[".kt", ".kts"],
    classify: Some(classify),
    name: None,
    visibility: Some(visibility),
    properties: Some(properties),
    inheritance: Some(inheritance),
};

fn classify(node: &Node) -> Option<SymbolKind> {
    match node.kind() {
        "object_declaration" => Some(SymbolKind::Class),
        "class_declaration" => {
            let parts = children(node);
            if parts.iter().any(|c| !c.is_named() && c.kind() == "interface") {
                Some(SymbolKind::Interface)
            } else if parts
                .iter()
                .any(|c| c.kind() == "enum_class_body" || (!c.is_named() && c.kind() == "enum"))
            {
                Some(SymbolKind::Enum)
            } else {
                Some(SymbolKind::Class)
            }
        }
        "function_declaration" => {
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
        if matches!(parent.kind(), "class_body" | "enum_class_body") {
            return true;
        }
        current = parent.parent();
    }
    false
}

fn visibility(ctx: &ExtractionContext, node: &Node) -> Visibility {
    modifier_visibility(ctx, node).unwrap_or(Visibility::Public)
}

/// Body properties from the table, then `val`/`var` primary-constructor
/// parameters
fn properties(walker: &mut SymbolWalker<'_, '_>, class: Node, body: Node, class_name: &str) {
    if body.id() != class.id() {
        walker.table_properties(body, class_name);
    }
    if class.kind() != "class_declaration" {
        return;
    }
    let ctx = walker.ctx;
    let Some(constructor) = ctx.find_child_by_type(&class, "primary_constructor") else {
        return;
    };
    for param in ctx.descendants(&constructor, 2) {
        if param.kind() != "class_parameter" {
            continue;
        }
        let mut binding = None;
        let mut name = None;
        for part in children(&param) {
            match part.kind() {
                "binding_pattern_kind" | "val" | "var" => {
                    binding = Some(ctx.get_node_text(&part).trim().to_string())
                }
                "simple_identifier" | "identifier" if name.is_none() => {
                    name = Some(ctx.get_node_text(&part).trim().to_string())
                }
                _ => {}
            }
        }
        let (Some(binding), Some(name)) = (binding, name) else {
            continue;
        };
        if !matches!(binding.as_str(), "val" | "var") || name.is_empty() {
            continue;
        }
        let visibility = modifier_visibility(ctx, &param).unwrap_or(Visibility::Public);
        let signature = format!("{} {}", binding, name);
        walker.push_property(&param, name, class_name, Some(signature), visibility, None);
    }
}

/// A specifier with a constructor call is the superclass, the rest are
/// interfaces; interfaces only extend
fn inheritance(
    walker: &mut RefWalker<'_, '_>,
    class: Node,
    kind: &SymbolKind,
    class_name: &str,
) -> bool {
    if !matches!(class.kind(), "class_declaration" | "object_declaration") {
        return false;
    }
    let ctx = walker.ctx;
    let specifiers = ctx
        .descendants(&class, 2)
        .into_iter()
        .filter(|n| n.kind() == "delegation_specifier");
    for spec in specifiers {
        let Some(target) = delegation_target(ctx, &spec) else {
            continue;
        };
        let edge = match kind {
            SymbolKind::Class => {
                let has_constructor = ctx
                    .find_descendant_by_types(&spec, &["constructor_invocation"], 3)
                    .is_some();
                if has_constructor {
                    ReferenceKind::Inherits
                } else {
                    ReferenceKind::Implements
                }
            }
            _ => ReferenceKind::Inherits,
        };
        walker.push_edge(edge, target, &class, class_name);
    }
    true
}

/// `Base()`, `Iface`, `Iface by impl` -> the type name
fn delegation_target(ctx: &ExtractionContext, spec: &Node) -> Option<String> {
    if let Some(target) = clause_target(ctx, spec) {
        return Some(target);
    }
    let text = ctx.get_node_text(spec);
    let text = text.split(" by ").next().unwrap_or_default();
    let text = text.split('(').next().unwrap_or_default().trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{extract, find};
    use super::*;
    use crate::extractors::base::Reference;

    fn kotlin(code: &str) -> (Vec<crate::extractors::base::Symbol>, Vec<Reference>) {
        extract("kotlin", tree_sitter_kotlin_ng::LANGUAGE.into(), code)
    }

    #[test]
    fn test_classes_objects_and_constructor_properties() {
        let code = r#"
data class User(val id: Int, private var name: String, plain: Long) : Entity(), Serializable {
    val limit = 10
    fun greet(): String = "hi"
}

interface Repo : Base {
    fun find(id: Int): User?
}

object Registry {
    fun register() { helper() }
}

internal fun main() { println("x") }
"#;
        let (symbols, refs) = kotlin(code);
        assert_eq!(find(&symbols, "User").kind, SymbolKind::Class);
        let id = find(&symbols, "User.id");
        assert_eq!(id.kind, SymbolKind::Property);
        assert_eq!(id.signature.as_deref(), Some("val id"));
        assert!(id.is_exported);
        let name = find(&symbols, "User.name");
        assert_eq!(name.signature.as_deref(), Some("var name"));
        assert_eq!(name.visibility, Visibility::Private);
        assert!(!name.is_exported);
        assert!(symbols.iter().all(|s| s.qualified_name != "User.plain"));

        assert_eq!(find(&symbols, "User.limit").default_value.as_deref(), Some("10"));
        assert_eq!(find(&symbols, "User.greet").kind, SymbolKind::Method);
        assert_eq!(find(&symbols, "Repo").kind, SymbolKind::Interface);
        assert_eq!(find(&symbols, "Repo.find").kind, SymbolKind::Method);
        assert_eq!(find(&symbols, "Registry").kind, SymbolKind::Class);
        assert_eq!(find(&symbols, "Registry.register").kind, SymbolKind::Method);

        let main = find(&symbols, "main");
        assert_eq!(main.kind, SymbolKind::Function);
        assert_eq!(main.visibility, Visibility::Internal);
        assert!(!main.is_exported);

        let edges: Vec<_> = refs
            .iter()
            .filter(|r| matches!(r.kind, ReferenceKind::Inherits | ReferenceKind::Implements))
            .map(|r| (r.kind.clone(), r.target_name.as_str(), r.source_name.as_deref()))
            .collect();
        assert!(edges.contains(&(ReferenceKind::Inherits, "Entity", Some("User"))));
        assert!(edges.contains(&(ReferenceKind::Implements, "Serializable", Some("User"))));
        assert!(edges.contains(&(ReferenceKind::Inherits, "Base", Some("Repo"))));

        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Call
            && r.target_name == "helper"
            && r.source_name.as_deref() == Some("Registry.register")));
        assert!(refs.iter().any(|r| r.kind == ReferenceKind::Call
            && r.target_name == "println"
            && r.source_name.as_deref() == Some("main")));
    }

    #[test]
    fn test_enum_class_and_bodiless_data_class() {
        let code = "enum class Color { RED, GREEN }\ndata class Point(val x: Int, val y: Int)\n";
        let (symbols, _) = kotlin(code);
        assert_eq!(find(&symbols, "Color").kind, SymbolKind::Enum);
        assert_eq!(find(&symbols, "Point.x").signature.as_deref(), Some("val x"));
        assert_eq!(find(&symbols, "Point.y").parent_name.as_deref(), Some("Point"));
    }
}
