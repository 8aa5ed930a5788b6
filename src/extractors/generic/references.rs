// Reference walk for the generic engine: calls plus inheritance edges
// driven by the extends/trait tables

use super::tables::{self, ExtendsRule, TraitRule};
use super::Profile;
use crate::extractors::base::{
    children, last_segment, qualify, ExtractionContext, Reference, ReferenceKind, SymbolKind,
};
use tree_sitter::Node;

pub(crate) fn extract_references(
    ctx: &ExtractionContext,
    profile: &'static Profile,
    root: Node,
) -> Vec<Reference> {
    let mut walker = RefWalker {
        ctx,
        profile,
        impl_rule: tables::trait_rule(ctx.language)
            .filter(|rule| matches!(rule, TraitRule::ImplBlock { .. })),
        refs: Vec::new(),
    };
    walker.walk(root, None, 0);
    walker.refs
}

pub(crate) struct RefWalker<'c, 'a> {
    pub ctx: &'c ExtractionContext<'a>,
    pub profile: &'static Profile,
    impl_rule: Option<TraitRule>,
    pub refs: Vec<Reference>,
}

impl RefWalker<'_, '_> {
    fn walk(&mut self, node: Node, scope: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.generic_max_depth) {
            return;
        }
        for child in children(&node) {
            if tables::CALL_TYPES.contains(&child.kind()) {
                self.extract_call(&child, scope);
                self.walk(child, scope, depth + 1);
                continue;
            }
            if let Some(TraitRule::ImplBlock {
                node_type,
                trait_field,
                type_field,
            }) = self.impl_rule
            {
                if child.kind() == node_type {
                    self.extract_impl(&child, trait_field, type_field);
                }
            }

            let mut inner = scope.map(str::to_string);
            if let Some(kind) = self.profile.classify(&child) {
                if let Some(name) = self.profile.name(self.ctx, &child) {
                    let qualified = qualify(scope, &name, ".");
                    if matches!(
                        kind,
                        SymbolKind::Class | SymbolKind::Interface | SymbolKind::Struct
                    ) {
                        self.extract_inheritance(child, &kind, &qualified);
                    }
                    inner = Some(qualified);
                }
            }
            self.walk(child, inner.as_deref(), depth + 1);
        }
    }

    fn extract_call(&mut self, node: &Node, scope: Option<&str>) {
        let callee = node
            .child_by_field_name("function")
            .or_else(|| node.child_by_field_name("method"))
            .or_else(|| node.child_by_field_name("name"))
            .or_else(|| self.ctx.find_child_by_types(node, tables::CALLEE_TYPES));
        let Some(callee) = callee else {
            return;
        };
        let text = self.ctx.get_node_text(&callee);
        // `build(x).run` names the call by its last member
        let name = if text.contains(['(', '\n']) {
            last_segment(&text, &["."]).trim().to_string()
        } else {
            text
        };
        if !name.is_empty() {
            self.refs
                .push(self.ctx.reference(ReferenceKind::Call, name, node, scope));
        }
    }

    fn extract_inheritance(&mut self, class: Node, kind: &SymbolKind, class_name: &str) {
        if let Some(hook) = self.profile.inheritance {
            if hook(self, class, kind, class_name) {
                return;
            }
        }
        if let Some(rule) = tables::extends_rule(self.ctx.language) {
            self.extract_extends(&class, rule, class_name);
        }
        match tables::trait_rule(self.ctx.language) {
            Some(TraitRule::BodyDeclaration {
                node_type,
                name_child,
            }) => self.extract_body_traits(&class, node_type, name_child, class_name),
            Some(TraitRule::Clause {
                parent_type,
                name_children,
            }) => self.extract_trait_clause(&class, parent_type, name_children, class_name),
            _ => {}
        }
    }

    fn extract_extends(&mut self, class: &Node, rule: ExtendsRule, class_name: &str) {
        let ctx = self.ctx;
        match rule {
            ExtendsRule::Single {
                parent_type,
                name_child,
            } => {
                for clause in ctx.find_children_by_type(class, parent_type) {
                    if let Some(target) = ctx.find_child_text(&clause, name_child) {
                        self.push_edge(ReferenceKind::Inherits, target, class, class_name);
                    }
                }
            }
            ExtendsRule::Multiple {
                parent_type,
                name_children,
            } => {
                for clause in ctx.find_children_by_type(class, parent_type) {
                    for sub in children(&clause) {
                        if name_children.contains(&sub.kind()) {
                            let target = ctx.get_node_text(&sub);
                            self.push_edge(ReferenceKind::Inherits, target, class, class_name);
                        }
                    }
                }
            }
        }
    }

    fn extract_body_traits(
        &mut self,
        class: &Node,
        node_type: &str,
        name_child: &str,
        class_name: &str,
    ) {
        let ctx = self.ctx;
        let bodies: Vec<Node> = match class.child_by_field_name("body") {
            Some(body) => vec![body],
            None => children(class)
                .into_iter()
                .filter(|c| tables::CLASS_BODY_TYPES.contains(&c.kind()))
                .collect(),
        };
        for body in bodies {
            for decl in ctx.find_children_by_type(&body, node_type) {
                if let Some(target) = ctx.find_child_text(&decl, name_child) {
                    self.push_edge(ReferenceKind::UsesTrait, target, &decl, class_name);
                }
            }
        }
    }

    fn extract_trait_clause(
        &mut self,
        class: &Node,
        parent_type: &str,
        name_children: &[&str],
        class_name: &str,
    ) {
        let ctx = self.ctx;
        for clause in ctx.find_children_by_type(class, parent_type) {
            for sub in ctx.descendants(&clause, ctx.config.generic_max_depth) {
                if name_children.contains(&sub.kind()) {
                    let target = ctx.get_node_text(&sub);
                    self.push_edge(ReferenceKind::Implements, target, class, class_name);
                }
            }
        }
    }

    /// `impl Trait for Type` -> `Type` implements `Trait`
    fn extract_impl(&mut self, node: &Node, trait_field: &str, type_field: &str) {
        let (Some(trait_name), Some(type_name)) = (
            self.ctx.get_field_text(node, trait_field),
            self.ctx.get_field_text(node, type_field),
        ) else {
            return;
        };
        self.push_edge(ReferenceKind::Implements, trait_name, node, &type_name);
    }

    /// Inheritance-style edge anchored at `node`'s line, skipped when empty
    pub(crate) fn push_edge(
        &mut self,
        kind: ReferenceKind,
        target: String,
        node: &Node,
        source: &str,
    ) {
        let target = target.trim();
        if !target.is_empty() {
            self.refs
                .push(self.ctx.reference(kind, target, node, Some(source)));
        }
    }
}

/// First type-name descendant of an inheritance clause
pub(crate) fn clause_target(ctx: &ExtractionContext, clause: &Node) -> Option<String> {
    ctx.descendants(clause, ctx.config.generic_max_depth)
        .into_iter()
        .filter(|n| matches!(n.kind(), "type_identifier" | "simple_identifier" | "identifier"))
        .map(|n| ctx.get_node_text(&n).trim().to_string())
        .find(|t| !t.is_empty())
}
