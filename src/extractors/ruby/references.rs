/// Reference extraction for Ruby: `require`, `include`/`extend`, calls,
/// `X.new`, superclasses and constant uses
use super::helpers::{short_constant, string_content};
use super::symbols::superclass;
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
            self.visit(child, scope, depth);
        }
    }

    fn visit(&mut self, node: Node, scope: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        match node.kind() {
            "call" => self.extract_call(&node, scope, depth),
            "constant" => {
                self.refs.push(ctx.reference(
                    ReferenceKind::Reference,
                    ctx.get_node_text(&node),
                    &node,
                    scope,
                ));
            }
            // `Billing::Invoice` names `Invoice`
            "scope_resolution" => {
                if let Some(name) = ctx.get_field_text(&node, "name") {
                    self.refs
                        .push(ctx.reference(ReferenceKind::Reference, name, &node, scope));
                }
            }
            "module" | "class" => {
                let name = ctx
                    .get_field_text(&node, "name")
                    .map(|n| qualify(scope, &n, "::"));
                if let (Some(owner), Some(base)) = (name.as_deref(), superclass(ctx, &node)) {
                    self.refs.push(ctx.reference(
                        ReferenceKind::Inherits,
                        short_constant(&base),
                        &node,
                        Some(owner),
                    ));
                }
                self.walk_body(node, name.as_deref().or(scope), depth);
            }
            "method" => self.walk_named(node, scope, "#", depth),
            "singleton_method" => self.walk_named(node, scope, ".", depth),
            _ => self.walk(node, scope, depth + 1),
        }
    }

    /// Walk a definition, skipping its name and superclass nodes
    fn walk_body(&mut self, node: Node, scope: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        let skip = [
            node.child_by_field_name("name").map(|n| n.id()),
            node.child_by_field_name("superclass").map(|n| n.id()),
        ];
        for child in children(&node) {
            if !skip.contains(&Some(child.id())) {
                self.visit(child, scope, depth + 1);
            }
        }
    }

    fn walk_named(&mut self, node: Node, scope: Option<&str>, separator: &str, depth: usize) {
        let name = self
            .ctx
            .get_field_text(&node, "name")
            .map(|n| qualify(scope, &n, separator));
        self.walk_body(node, name.as_deref().or(scope), depth);
    }

    fn extract_call(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let Some(method) = ctx.get_field_text(node, "method") else {
            return;
        };
        let receiver = node.child_by_field_name("receiver");
        let args = node.child_by_field_name("arguments");

        if receiver.is_none() {
            match method.as_str() {
                "require" | "require_relative" => {
                    if let Some(args) = args {
                        self.extract_require(node, &args, scope);
                    }
                    return;
                }
                "include" | "extend" | "prepend" => {
                    if let Some(args) = args {
                        self.extract_mixins(node, &args, scope);
                    }
                    return;
                }
                _ => {}
            }
        }

        // `Widget.new` is a call to `Widget`
        let target = match receiver {
            Some(r) if method == "new" && matches!(r.kind(), "constant" | "scope_resolution") => {
                short_constant(&ctx.get_node_text(&r)).to_string()
            }
            _ => method,
        };
        self.refs
            .push(ctx.reference(ReferenceKind::Call, target, node, scope));

        if let Some(receiver) = receiver {
            self.visit(receiver, scope, depth + 1);
        }
        if let Some(args) = args {
            self.walk(args, scope, depth + 1);
        }
        if let Some(block) = node.child_by_field_name("block") {
            self.walk(block, scope, depth + 1);
        }
    }

    /// `require 'json'`, `require_relative '../lib/parser'`
    fn extract_require(&mut self, node: &Node, args: &Node, scope: Option<&str>) {
        let ctx = self.ctx;
        let Some(path) = ctx
            .find_children_by_type(args, "string")
            .first()
            .and_then(|s| string_content(ctx, s))
        else {
            return;
        };
        let target = last_segment(&path, &["/"]).to_string();
        self.refs.push(
            ctx.reference(ReferenceKind::Import, target, node, scope)
                .with_import_path(path),
        );
    }

    /// `include Comparable`, `extend ActiveSupport::Concern`
    fn extract_mixins(&mut self, node: &Node, args: &Node, scope: Option<&str>) {
        let ctx = self.ctx;
        for arg in children(args) {
            let name = match arg.kind() {
                "constant" => ctx.get_node_text(&arg),
                "scope_resolution" => match ctx.get_field_text(&arg, "name") {
                    Some(name) => name,
                    None => continue,
                },
                _ => continue,
            };
            self.refs
                .push(ctx.reference(ReferenceKind::Import, name, node, scope));
        }
    }
}
