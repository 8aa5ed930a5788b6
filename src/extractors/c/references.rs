//! Reference extraction for C and C++: `#include`, calls, `new`, base classes
//!
//! Objective-C plugs message sends, `@import` and class heritage in through
//! the dialect's reference hook.

use super::helpers::function_parts;
use super::Dialect;
use crate::extractors::base::{
    children, last_segment, qualify, ExtractionContext, Reference, ReferenceKind,
};
use tree_sitter::Node;

pub(crate) fn extract_references(ctx: &ExtractionContext, dialect: &Dialect, root: Node) -> Vec<Reference> {
    let mut walker = RefWalker {
        ctx,
        dialect,
        refs: Vec::new(),
    };
    walker.walk(root, None, 0);
    walker.refs
}

pub(crate) struct RefWalker<'c, 'a> {
    pub ctx: &'c ExtractionContext<'a>,
    dialect: &'c Dialect,
    pub refs: Vec<Reference>,
}

impl RefWalker<'_, '_> {
    pub fn walk(&mut self, node: Node, scope: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for child in children(&node) {
            if let Some(hook) = self.dialect.references {
                if hook(self, child, scope, depth) {
                    continue;
                }
            }
            match child.kind() {
                "preproc_include" => self.extract_include(&child, scope),
                "call_expression" => self.extract_call(&child, scope, depth),
                "new_expression" => self.extract_new(&child, scope, depth),
                "function_definition" => {
                    let name = child
                        .child_by_field_name("declarator")
                        .and_then(|d| function_parts(self.ctx, &d))
                        .map(|(name, _)| qualify(scope, &name, "::"));
                    self.walk(child, name.as_deref().or(scope), depth + 1);
                }
                "namespace_definition" => {
                    let name = self
                        .ctx
                        .get_field_text(&child, "name")
                        .map(|n| qualify(scope, &n, "::"));
                    self.walk(child, name.as_deref().or(scope), depth + 1);
                }
                "class_specifier" | "struct_specifier" => {
                    let name = self
                        .ctx
                        .get_field_text(&child, "name")
                        .map(|n| qualify(scope, &n, "::"));
                    if let Some(owner) = name.as_deref() {
                        self.extract_bases(&child, owner);
                    }
                    self.walk(child, name.as_deref().or(scope), depth + 1);
                }
                _ => self.walk(child, scope, depth + 1),
            }
        }
    }

    /// `#include <stdio.h>` / `#include "util.h"`: target and path are the header
    pub fn extract_include(&mut self, node: &Node, scope: Option<&str>) {
        let path_node = node.child_by_field_name("path").or_else(|| {
            self.ctx
                .find_child_by_types(node, &["string_literal", "system_lib_string"])
        });
        let Some(path_node) = path_node else {
            return;
        };
        let path = self
            .ctx
            .get_node_text(&path_node)
            .trim_matches(|c| matches!(c, '<' | '>' | '"'))
            .to_string();
        self.refs.push(
            self.ctx
                .reference(ReferenceKind::Import, path.clone(), node, scope)
                .with_import_path(path),
        );
    }

    /// Callee text as written (`printf`, `obj->run`, `std::sort`)
    fn extract_call(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let name = self.ctx.get_node_text(&function);
        self.refs
            .push(self.ctx.reference(ReferenceKind::Call, name, &function, scope));
        if let Some(args) = node.child_by_field_name("arguments") {
            self.walk(args, scope, depth + 1);
        }
    }

    fn extract_new(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        if let Some(ty) = self.ctx.get_field_text(node, "type") {
            let base = ty.split('<').next().unwrap_or(&ty).trim();
            let target = last_segment(base, &["::"]).to_string();
            self.refs
                .push(self.ctx.reference(ReferenceKind::Call, target, node, scope));
        }
        if let Some(args) = node.child_by_field_name("arguments") {
            self.walk(args, scope, depth + 1);
        }
    }

    /// `class D : public B, private M` -> inherits B and M
    fn extract_bases(&mut self, node: &Node, owner: &str) {
        let Some(clause) = self.ctx.find_child_by_type(node, "base_class_clause") else {
            return;
        };
        for base in children(&clause) {
            if !matches!(
                base.kind(),
                "type_identifier" | "qualified_identifier" | "template_type"
            ) {
                continue;
            }
            let text = self.ctx.get_node_text(&base);
            let head = text.split('<').next().unwrap_or(&text).trim();
            let target = last_segment(head, &["::"]).to_string();
            self.refs
                .push(self.ctx.reference(ReferenceKind::Inherits, target, node, Some(owner)));
        }
    }
}
