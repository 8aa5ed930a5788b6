// C# helper functions
//
// Modifier lookup, context-dependent visibility defaults, generic clauses,
// accessor summaries and base-list parsing shared by the symbol and
// reference walks.

use crate::extractors::base::{children, ExtractionContext, Visibility};
use tree_sitter::Node;

/// Kind of declaration a member sits in; drives default visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Namespace,
    Type,
    Interface,
}

const ACCESSOR_KEYWORDS: &[&str] = &["get", "set", "init", "add", "remove"];
const CLASS_MODIFIERS: &[&str] = &["static", "sealed", "abstract", "partial", "readonly", "unsafe", "file"];

pub(crate) fn modifiers(ctx: &ExtractionContext, node: &Node) -> Vec<String> {
    ctx.find_children_by_type(node, "modifier")
        .iter()
        .map(|m| ctx.get_node_text(m))
        .collect()
}

pub(crate) fn has_modifier(ctx: &ExtractionContext, node: &Node, modifier: &str) -> bool {
    modifiers(ctx, node).iter().any(|m| m == modifier)
}

/// Explicit modifiers win; otherwise interface and enum members are public,
/// type members private and top-level types internal.
/// `private protected` reads as private, `protected internal` as protected.
pub(crate) fn visibility(ctx: &ExtractionContext, node: &Node, container: Container) -> Visibility {
    let mods = modifiers(ctx, node);
    let has = |m: &str| mods.iter().any(|x| x == m);
    if has("private") {
        Visibility::Private
    } else if has("protected") {
        Visibility::Protected
    } else if has("internal") {
        Visibility::Internal
    } else if has("public") {
        Visibility::Public
    } else {
        match container {
            Container::Interface => Visibility::Public,
            Container::Type => Visibility::Private,
            Container::Namespace => Visibility::Internal,
        }
    }
}

/// `static sealed partial` prefix for type signatures
pub(crate) fn class_modifiers(ctx: &ExtractionContext, node: &Node) -> Vec<String> {
    modifiers(ctx, node)
        .into_iter()
        .filter(|m| CLASS_MODIFIERS.contains(&m.as_str()))
        .collect()
}

pub(crate) fn type_params(ctx: &ExtractionContext, node: &Node) -> String {
    ctx.find_child_by_type(node, "type_parameter_list")
        .map(|list| ctx.get_node_text(&list))
        .unwrap_or_default()
}

/// ` where T : class` clauses, truncated at 200 chars
pub(crate) fn constraints(ctx: &ExtractionContext, node: &Node) -> String {
    let clauses: Vec<String> = ctx
        .find_children_by_type(node, "type_parameter_constraints_clause")
        .iter()
        .map(|c| ctx.get_node_text(c))
        .collect();
    if clauses.is_empty() {
        return String::new();
    }
    let mut text = clauses.join(" ");
    if text.len() > 200 {
        let mut cut = 200;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    format!(" {}", text)
}

/// `get; private set;` summary; expression-bodied members read as `get;`
pub(crate) fn accessors(ctx: &ExtractionContext, node: &Node) -> String {
    let mut parts = Vec::new();
    let declarations = match ctx.find_child_by_type(node, "accessor_list") {
        Some(list) => ctx.find_children_by_type(&list, "accessor_declaration"),
        None => ctx.find_children_by_type(node, "accessor_declaration"),
    };
    for accessor in declarations {
        let mut modifier = String::new();
        let mut keyword = None;
        for part in children(&accessor) {
            if part.kind() == "modifier" {
                modifier = format!("{} ", ctx.get_node_text(&part));
            } else if ACCESSOR_KEYWORDS.contains(&part.kind()) {
                keyword = Some(part.kind());
            }
        }
        if let Some(keyword) = keyword {
            parts.push(format!("{}{}", modifier, keyword));
        }
    }
    if parts.is_empty() && ctx.find_child_by_type(node, "arrow_expression_clause").is_some() {
        parts.push("get".to_string());
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{};", parts.join("; "))
    }
}

/// `/// <summary>` chains directly above a declaration
pub(crate) fn xml_doc(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let comments = ctx.preceding_comments(node, &["comment"]);
    let start = comments
        .iter()
        .rposition(|c| !c.starts_with("///"))
        .map_or(0, |i| i + 1);
    let lines: Vec<String> = comments[start..]
        .iter()
        .map(|c| c.trim_start_matches("///").trim().to_string())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Identifier of a `generic_name` (`List<T>` -> `List`), else the whole text
pub(crate) fn type_name(ctx: &ExtractionContext, node: &Node) -> String {
    match node.kind() {
        "generic_name" => ctx
            .find_child_by_type(node, "identifier")
            .map(|id| ctx.get_node_text(&id))
            .unwrap_or_else(|| ctx.get_node_text(node)),
        _ => ctx.get_node_text(node),
    }
}

/// Names listed in a `base_list`, in order
pub(crate) fn base_types(ctx: &ExtractionContext, base_list: &Node) -> Vec<String> {
    children(base_list)
        .iter()
        .filter(|c| matches!(c.kind(), "identifier" | "generic_name" | "qualified_name"))
        .map(|c| type_name(ctx, c))
        .collect()
}

/// `IDisposable` style names
pub(crate) fn looks_like_interface(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('I') && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}

pub(crate) fn namespace_name(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    ctx.get_field_text(node, "name").or_else(|| {
        ctx.find_child_by_types(node, &["qualified_name", "identifier"])
            .map(|n| ctx.get_node_text(&n))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_name_heuristic() {
        assert!(looks_like_interface("IDisposable"));
        assert!(!looks_like_interface("Item"));
        assert!(!looks_like_interface("I"));
        assert!(!looks_like_interface("Base"));
    }
}
