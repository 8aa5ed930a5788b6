/// Rust reference extraction: `use` trees, calls, macros, trait impls,
/// supertraits and derives
use super::helpers::{derived_traits, preceding_attributes};
use crate::extractors::base::{
    children, last_segment, qualify, ExtractionContext, Reference, ReferenceKind,
};
use tree_sitter::Node;

pub(super) fn extract_references(ctx: &ExtractionContext, root: Node) -> Vec<Reference> {
    let mut walker = RefWalker {
        ctx,
        refs: Vec::new(),
    };
    walker.walk(root, None, 0);
    walker.refs
}

struct RefWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    refs: Vec<Reference>,
}

impl RefWalker<'_, '_> {
    fn walk(&mut self, node: Node, scope: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for child in children(&node) {
            match child.kind() {
                "use_declaration" => self.extract_use(&child, scope),
                "call_expression" => self.extract_call(&child, scope, depth),
                "macro_invocation" => self.extract_macro_call(&child, scope),
                "function_item" => {
                    let new_scope = self
                        .ctx
                        .get_field_text(&child, "name")
                        .map(|name| qualify(scope, &name, "::"));
                    self.walk(child, new_scope.as_deref().or(scope), depth + 1);
                }
                "impl_item" => {
                    let type_name = self.ctx.get_field_text(&child, "type");
                    if let (Some(ty), Some(trait_node)) =
                        (type_name.as_deref(), child.child_by_field_name("trait"))
                    {
                        let target = type_base_name(self.ctx, &trait_node);
                        self.refs.push(self.ctx.reference(
                            ReferenceKind::Implements,
                            target,
                            &child,
                            Some(ty),
                        ));
                    }
                    self.walk(child, type_name.as_deref().or(scope), depth + 1);
                }
                "trait_item" => {
                    self.extract_supertraits(&child);
                    self.walk(child, scope, depth + 1);
                }
                "struct_item" | "enum_item" | "union_item" => {
                    self.extract_derives(&child);
                    self.walk(child, scope, depth + 1);
                }
                _ => self.walk(child, scope, depth + 1),
            }
        }
    }

    fn extract_use(&mut self, node: &Node, scope: Option<&str>) {
        let mut imports = Vec::new();
        for child in children(node) {
            flatten_use_tree(self.ctx, &child, "", &mut imports, 0);
        }
        for (path, target) in imports {
            self.refs.push(
                self.ctx
                    .reference(ReferenceKind::Import, target, node, scope)
                    .with_import_path(path),
            );
        }
    }

    fn extract_call(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        // obj.method() -> "method"
        let name = if function.kind() == "field_expression" {
            self.ctx
                .get_field_text(&function, "field")
                .unwrap_or_else(|| self.ctx.get_node_text(&function))
        } else {
            self.ctx.get_node_text(&function)
        };
        self.refs
            .push(self.ctx.reference(ReferenceKind::Call, name, &function, scope));

        // Receivers can hold calls too: `build().run()`
        if function.kind() == "field_expression" {
            if let Some(value) = function.child_by_field_name("value") {
                if value.kind() == "call_expression" {
                    self.extract_call(&value, scope, depth + 1);
                } else {
                    self.walk(value, scope, depth + 1);
                }
            }
        }
        if let Some(args) = node.child_by_field_name("arguments") {
            self.walk(args, scope, depth + 1);
        }
    }

    fn extract_macro_call(&mut self, node: &Node, scope: Option<&str>) {
        let macro_node = node
            .child_by_field_name("macro")
            .or_else(|| self.ctx.find_child_by_types(node, &["identifier", "scoped_identifier"]));
        if let Some(macro_node) = macro_node {
            let name = format!("{}!", self.ctx.get_node_text(&macro_node));
            self.refs
                .push(self.ctx.reference(ReferenceKind::Call, name, node, scope));
        }
    }

    /// `trait A: B + C` inherits from each bound
    fn extract_supertraits(&mut self, node: &Node) {
        let (Some(name), Some(bounds)) = (
            self.ctx.get_field_text(node, "name"),
            node.child_by_field_name("bounds"),
        ) else {
            return;
        };
        for bound in children(&bounds) {
            if matches!(
                bound.kind(),
                "type_identifier" | "scoped_type_identifier" | "generic_type"
            ) {
                let target = type_base_name(self.ctx, &bound);
                self.refs
                    .push(self.ctx.reference(ReferenceKind::Inherits, target, &bound, Some(&name)));
            }
        }
    }

    /// `#[derive(Debug, Clone)]` implements each derived trait
    fn extract_derives(&mut self, node: &Node) {
        let Some(name) = self.ctx.get_field_text(node, "name") else {
            return;
        };
        let attributes = preceding_attributes(node);
        for derived in derived_traits(self.ctx, &attributes) {
            self.refs
                .push(self.ctx.reference(ReferenceKind::Implements, derived, node, Some(&name)));
        }
    }
}

/// Last path segment of a type without generic arguments
/// (`std::fmt::Display` -> `Display`, `From<T>` -> `From`)
fn type_base_name(ctx: &ExtractionContext, node: &Node) -> String {
    let base = if node.kind() == "generic_type" {
        node.child_by_field_name("type").unwrap_or(*node)
    } else {
        *node
    };
    let text = ctx.get_node_text(&base);
    last_segment(&text, &["::"]).to_string()
}

/// Expand a use tree into `(full path, imported name)` pairs
fn flatten_use_tree(
    ctx: &ExtractionContext,
    node: &Node,
    prefix: &str,
    out: &mut Vec<(String, String)>,
    depth: usize,
) {
    if ctx.depth_exceeded(depth, ctx.config.max_walk_depth) {
        return;
    }
    let join = |path: &str| {
        if prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}::{}", prefix, path)
        }
    };
    match node.kind() {
        "identifier" | "scoped_identifier" | "crate" | "self" | "super" => {
            let path = join(&ctx.get_node_text(node));
            let target = last_segment(&path, &["::"]).to_string();
            out.push((path, target));
        }
        "use_as_clause" => {
            if let Some(path) = ctx.get_field_text(node, "path") {
                let path = join(&path);
                let target = last_segment(&path, &["::"]).to_string();
                out.push((path, target));
            }
        }
        "use_wildcard" => {
            out.push((join(&ctx.get_node_text(node)), "*".to_string()));
        }
        "use_list" => {
            for child in children(node) {
                flatten_use_tree(ctx, &child, prefix, out, depth + 1);
            }
        }
        "scoped_use_list" => {
            let inner = match ctx.get_field_text(node, "path") {
                Some(path) => join(&path),
                None => prefix.to_string(),
            };
            if let Some(list) = node.child_by_field_name("list") {
                flatten_use_tree(ctx, &list, &inner, out, depth + 1);
            }
        }
        _ => {}
    }
}
