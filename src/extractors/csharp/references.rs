// C# reference extraction
//
// usings, invocations, object creation, attributes, nullable type uses and
// base lists. Scope follows namespaces, types and callable members.

use super::helpers::{base_types, looks_like_interface, namespace_name, type_name};
use crate::extractors::base::{
    children, last_segment, qualify, ExtractionContext, Reference, ReferenceKind,
};
use tree_sitter::Node;

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "struct_declaration",
    "enum_declaration",
    "record_declaration",
];

const CALLABLE_DECLARATIONS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "local_function_statement",
    "destructor_declaration",
];

pub(crate) fn extract_references(ctx: &ExtractionContext, root: Node) -> Vec<Reference> {
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
        let mut file_scope: Option<String> = None;
        for child in children(&node) {
            let scope = file_scope.as_deref().or(scope);
            let kind = child.kind();
            match kind {
                "file_scoped_namespace_declaration" => {
                    let name = namespace_name(self.ctx, &child).map(|n| qualify(scope, &n, "."));
                    self.walk(child, name.as_deref().or(scope), depth + 1);
                    file_scope = name;
                }
                "namespace_declaration" => {
                    let name = namespace_name(self.ctx, &child).map(|n| qualify(scope, &n, "."));
                    self.walk(child, name.as_deref().or(scope), depth + 1);
                }
                "using_directive" => self.extract_using(&child, scope),
                "invocation_expression" => self.extract_call(&child, scope, depth),
                "object_creation_expression" => self.extract_new(&child, scope, depth),
                "attribute_list" => self.extract_attributes(&child, scope),
                "nullable_type" => self.extract_nullable(&child, scope),
                _ if TYPE_DECLARATIONS.contains(&kind) => {
                    let name = self
                        .ctx
                        .get_field_text(&child, "name")
                        .map(|n| qualify(scope, &n, "."));
                    if let Some(owner) = name.as_deref() {
                        self.extract_bases(&child, owner);
                    }
                    self.walk(child, name.as_deref().or(scope), depth + 1);
                }
                _ if CALLABLE_DECLARATIONS.contains(&kind) => {
                    let name = self
                        .ctx
                        .get_field_text(&child, "name")
                        .map(|n| qualify(scope, &n, "."));
                    self.walk(child, name.as_deref().or(scope), depth + 1);
                }
                _ => self.walk(child, scope, depth + 1),
            }
        }
    }

    /// First base of a class-like type inherits unless it reads as an
    /// interface name; every later base implements
    fn extract_bases(&mut self, node: &Node, owner: &str) {
        if node.kind() == "enum_declaration" {
            return;
        }
        let Some(base_list) = self.ctx.find_child_by_type(node, "base_list") else {
            return;
        };
        for (position, target) in base_types(self.ctx, &base_list).into_iter().enumerate() {
            let kind = if position == 0 && !looks_like_interface(&target) {
                ReferenceKind::Inherits
            } else {
                ReferenceKind::Implements
            };
            self.refs
                .push(self.ctx.reference(kind, target, node, Some(owner)));
        }
    }

    /// `using System.Text;`, `using static System.Math;`, `using Json = Newtonsoft.Json;`
    fn extract_using(&mut self, node: &Node, scope: Option<&str>) {
        let ctx = self.ctx;
        let has_equals = children(node).iter().any(|c| c.kind() == "=");
        let mut alias = None;
        let mut path = None;
        for child in children(node) {
            match child.kind() {
                "name_equals" => {
                    alias = ctx
                        .find_child_by_type(&child, "identifier")
                        .map(|id| ctx.get_node_text(&id));
                }
                "identifier" if has_equals && path.is_none() && alias.is_none() => {
                    alias = Some(ctx.get_node_text(&child));
                }
                "identifier" | "qualified_name" | "generic_name" => {
                    path = Some(ctx.get_node_text(&child));
                }
                _ => {}
            }
        }
        let Some(path) = path else {
            return;
        };
        let target = alias.unwrap_or_else(|| last_segment(&path, &["."]).to_string());
        self.refs.push(
            ctx.reference(ReferenceKind::Import, target, node, scope)
                .with_import_path(path),
        );
    }

    /// `a.b.Run<T>(x)` -> `Run`; arguments and receivers are walked for nested calls
    fn extract_call(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let function = node
            .child_by_field_name("function")
            .or_else(|| children(node).into_iter().find(|c| c.is_named() && c.kind() != "argument_list"));
        let target = function.and_then(|f| match f.kind() {
            "member_access_expression" => Some(
                f.child_by_field_name("name")
                    .map(|n| type_name(ctx, &n))
                    .unwrap_or_else(|| ctx.get_node_text(&f)),
            ),
            "identifier" | "generic_name" => Some(type_name(ctx, &f)),
            _ => None,
        });
        if let Some(target) = target {
            self.refs
                .push(ctx.reference(ReferenceKind::Call, target, node, scope));
        }
        self.walk(*node, scope, depth + 1);
    }

    fn extract_new(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let target = node
            .child_by_field_name("type")
            .or_else(|| ctx.find_child_by_types(node, &["identifier", "generic_name", "qualified_name"]))
            .filter(|t| matches!(t.kind(), "identifier" | "generic_name" | "qualified_name"))
            .map(|t| type_name(ctx, &t));
        if let Some(target) = target {
            self.refs
                .push(ctx.reference(ReferenceKind::Call, target, node, scope));
        }
        if let Some(args) = ctx.find_child_by_type(node, "argument_list") {
            self.walk(args, scope, depth + 1);
        }
        if let Some(init) = ctx.find_child_by_type(node, "initializer_expression") {
            self.walk(init, scope, depth + 1);
        }
    }

    /// `[Serializable]`, `[Route("x")]` are calls to the attribute type
    fn extract_attributes(&mut self, node: &Node, scope: Option<&str>) {
        let ctx = self.ctx;
        for attribute in ctx.find_children_by_type(node, "attribute") {
            let name = ctx
                .get_field_text(&attribute, "name")
                .or_else(|| {
                    ctx.find_child_by_types(&attribute, &["identifier", "qualified_name"])
                        .map(|n| ctx.get_node_text(&n))
                });
            if let Some(name) = name {
                self.refs
                    .push(ctx.reference(ReferenceKind::Call, name, &attribute, scope));
            }
        }
    }

    /// `Customer?` -> type_ref `Customer`; predefined types are skipped
    fn extract_nullable(&mut self, node: &Node, scope: Option<&str>) {
        let ctx = self.ctx;
        for child in children(node) {
            match child.kind() {
                "predefined_type" => return,
                "identifier" | "generic_name" | "qualified_name" => {
                    self.refs.push(ctx.reference(
                        ReferenceKind::TypeRef,
                        type_name(ctx, &child),
                        node,
                        scope,
                    ));
                    return;
                }
                _ => {}
            }
        }
    }
}
