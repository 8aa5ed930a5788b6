// PHP Extractor - reference walk
//
// `use` imports (plain, aliased, grouped), trait use, member/nullsafe/static
// calls, `new`, free function calls and class heritage. Scopes mirror the
// qualified names produced by the symbol walk.

use super::helpers::{heritage, short_name};
use crate::extractors::base::{children, qualify, ExtractionContext, Reference, ReferenceKind};
use tree_sitter::Node;

const SEP: &str = "\\";

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "trait_declaration",
    "enum_declaration",
];

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
        // Unbraced `namespace X;` scopes the siblings after it
        let mut namespace: Option<String> = None;
        for child in children(&node) {
            let scope = namespace.as_deref().or(scope);
            let kind = child.kind();
            match kind {
                "namespace_use_declaration" => self.extract_use_import(&child, scope),
                "use_declaration" => self.extract_trait_use(&child, scope),
                "member_call_expression"
                | "nullsafe_member_call_expression"
                | "nullsafe_member_access_expression" => self.extract_member_call(&child, scope, depth),
                "scoped_call_expression" => self.extract_scoped_call(&child, scope, depth),
                "object_creation_expression" => self.extract_new(&child, scope, depth),
                "function_call_expression" => self.extract_function_call(&child, scope, depth),
                "namespace_definition" => {
                    let name = self.ctx.get_field_text(&child, "name");
                    match child.child_by_field_name("body") {
                        Some(body) => self.walk(body, name.as_deref().or(scope), depth + 1),
                        None => namespace = name,
                    }
                }
                _ if TYPE_DECLARATIONS.contains(&kind) => {
                    let name = self
                        .ctx
                        .get_field_text(&child, "name")
                        .map(|n| qualify(scope, &n, SEP));
                    if let Some(owner) = name.as_deref() {
                        self.extract_heritage(&child, owner);
                    }
                    self.walk(child, name.as_deref().or(scope), depth + 1);
                }
                "method_declaration" | "function_definition" => {
                    let name = self
                        .ctx
                        .get_field_text(&child, "name")
                        .map(|n| qualify(scope, &n, SEP));
                    self.walk(child, name.as_deref().or(scope), depth + 1);
                }
                _ => self.walk(child, scope, depth + 1),
            }
        }
    }

    fn extract_heritage(&mut self, node: &Node, owner: &str) {
        for (inherits, name) in heritage(self.ctx, node) {
            let kind = if inherits {
                ReferenceKind::Inherits
            } else {
                ReferenceKind::Implements
            };
            self.refs
                .push(self.ctx.reference(kind, short_name(&name), node, Some(owner)));
        }
    }

    /// `(target, path)` of one use clause; an alias replaces the target
    fn use_clause(&self, clause: &Node) -> Option<(String, String)> {
        let ctx = self.ctx;
        let path_node = ctx.find_child_by_types(clause, &["qualified_name", "namespace_name", "name"])?;
        let path = ctx.get_node_text(&path_node);
        let mut target = short_name(&path).to_string();
        if let Some(aliasing) = ctx.find_child_by_type(clause, "namespace_aliasing_clause") {
            if let Some(alias) = ctx.find_child_by_type(&aliasing, "name") {
                target = ctx.get_node_text(&alias);
            }
        } else if let Some(alias) = clause.child_by_field_name("alias") {
            target = ctx.get_node_text(&alias);
        }
        Some((target, path.trim_start_matches('\\').to_string()))
    }

    /// `use App\Models\User;`, `use App\Models\{User, Post as P};`
    fn extract_use_import(&mut self, node: &Node, scope: Option<&str>) {
        let ctx = self.ctx;
        let mut imports = Vec::new();
        for child in children(node) {
            match child.kind() {
                "namespace_use_clause" => imports.extend(self.use_clause(&child)),
                "namespace_use_group" => {
                    let prefix = ctx
                        .find_child_by_types(node, &["namespace_name", "qualified_name", "name"])
                        .map(|p| ctx.get_node_text(&p))
                        .unwrap_or_default();
                    let prefix = prefix.trim_start_matches('\\');
                    for clause in children(&child) {
                        if !matches!(clause.kind(), "namespace_use_clause" | "namespace_use_group_clause") {
                            continue;
                        }
                        if let Some((target, path)) = self.use_clause(&clause) {
                            let full = if prefix.is_empty() {
                                path
                            } else {
                                format!("{}\\{}", prefix, path)
                            };
                            imports.push((target, full));
                        }
                    }
                }
                _ => {}
            }
        }
        for (target, path) in imports {
            self.refs.push(
                ctx.reference(ReferenceKind::Import, target, node, scope)
                    .with_import_path(path),
            );
        }
    }

    /// `use HasFactory, SoftDeletes;` inside a class body
    fn extract_trait_use(&mut self, node: &Node, scope: Option<&str>) {
        let ctx = self.ctx;
        for child in children(node) {
            if matches!(child.kind(), "name" | "qualified_name") {
                let target = ctx.get_node_text(&child);
                self.refs.push(ctx.reference(
                    ReferenceKind::UsesTrait,
                    short_name(&target),
                    node,
                    scope,
                ));
            }
        }
    }

    fn walk_arguments(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        if let Some(args) = node.child_by_field_name("arguments") {
            self.walk(args, scope, depth + 1);
        }
    }

    /// `$repo->find($id)`, `$user?->profile()`
    fn extract_member_call(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let Some(name) = self.ctx.get_field_text(node, "name") else {
            return;
        };
        self.refs
            .push(self.ctx.reference(ReferenceKind::Call, name, node, scope));
        // Chained receivers: `$q->where()->first()`
        if let Some(object) = node.child_by_field_name("object") {
            match object.kind() {
                "member_call_expression" | "nullsafe_member_call_expression" => {
                    self.extract_member_call(&object, scope, depth + 1)
                }
                "scoped_call_expression" => self.extract_scoped_call(&object, scope, depth + 1),
                "function_call_expression" => self.extract_function_call(&object, scope, depth + 1),
                _ => self.walk(object, scope, depth + 1),
            }
        }
        self.walk_arguments(node, scope, depth);
    }

    /// `User::find()` -> `User.find`; `self::`/`static::`/`parent::` keep the bare name
    fn extract_scoped_call(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(node, "name") else {
            return;
        };
        let target = match ctx.get_field_text(node, "scope") {
            Some(owner) if !matches!(owner.as_str(), "self" | "static" | "parent") => {
                format!("{}.{}", owner, name)
            }
            _ => name,
        };
        self.refs
            .push(ctx.reference(ReferenceKind::Call, target, node, scope));
        self.walk_arguments(node, scope, depth);
    }

    fn extract_new(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        if let Some(class) = ctx.find_child_by_types(node, &["name", "qualified_name"]) {
            let target = ctx.get_node_text(&class);
            self.refs.push(ctx.reference(
                ReferenceKind::Call,
                short_name(&target),
                node,
                scope,
            ));
        }
        self.walk_arguments(node, scope, depth);
    }

    /// `helper()`, `\App\render()`; `$callback()` is skipped
    fn extract_function_call(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let Some(function) = ctx.get_field_text(node, "function") else {
            return;
        };
        if !function.starts_with('$') {
            self.refs.push(ctx.reference(
                ReferenceKind::Call,
                short_name(&function),
                node,
                scope,
            ));
        }
        self.walk_arguments(node, scope, depth);
    }
}
