//! Reference extraction shared by JavaScript and TypeScript:
//! ES imports, `require()`, calls, `new`, `extends`/`implements`

use crate::extractors::base::{
    children, last_segment, qualify, unquote, ExtractionContext, Reference, ReferenceKind,
};
use tree_sitter::Node;

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
        for child in children(&node) {
            match child.kind() {
                "import_statement" => self.extract_import(&child, scope),
                "call_expression" => self.extract_call(&child, scope, depth),
                "new_expression" => self.extract_new(&child, scope, depth),
                "function_declaration" | "generator_function_declaration" => {
                    self.walk_named_scope(child, scope, depth)
                }
                "class_declaration" | "abstract_class_declaration" | "class" => {
                    let name = self.ctx.get_field_text(&child, "name");
                    let class_scope = name.map(|n| qualify(scope, &n, "."));
                    if let Some(class_name) = class_scope.as_deref() {
                        self.extract_heritage(&child, class_name);
                    }
                    self.walk(child, class_scope.as_deref().or(scope), depth + 1);
                }
                "interface_declaration" => {
                    let name = self.ctx.get_field_text(&child, "name");
                    let iface_scope = name.map(|n| qualify(scope, &n, "."));
                    if let Some(iface) = iface_scope.as_deref() {
                        self.extract_interface_extends(&child, iface);
                    }
                    self.walk(child, iface_scope.as_deref().or(scope), depth + 1);
                }
                "method_definition" => self.walk_named_scope(child, scope, depth),
                "variable_declarator" => {
                    let is_callable = child.child_by_field_name("value").is_some_and(|v| {
                        matches!(
                            v.kind(),
                            "arrow_function" | "function_expression" | "function"
                        )
                    });
                    if is_callable {
                        self.walk_named_scope(child, scope, depth);
                    } else {
                        self.walk(child, scope, depth + 1);
                    }
                }
                _ => self.walk(child, scope, depth + 1),
            }
        }
    }

    fn walk_named_scope(&mut self, node: Node, scope: Option<&str>, depth: usize) {
        let inner = self
            .ctx
            .get_field_text(&node, "name")
            .map(|n| qualify(scope, &n, "."));
        self.walk(node, inner.as_deref().or(scope), depth + 1);
    }

    fn extract_import(&mut self, node: &Node, scope: Option<&str>) {
        let Some(source_node) = node.child_by_field_name("source") else {
            return;
        };
        let path = unquote(&self.ctx.get_node_text(&source_node)).to_string();
        let mut imported = Vec::new();

        if let Some(clause) = self.ctx.find_child_by_type(node, "import_clause") {
            for part in children(&clause) {
                match part.kind() {
                    // Default import
                    "identifier" => imported.push((self.ctx.get_node_text(&part), part)),
                    "namespace_import" => imported.push(("*".to_string(), part)),
                    "named_imports" => {
                        for spec in self.ctx.find_children_by_type(&part, "import_specifier") {
                            if let Some(name) = self.ctx.get_field_text(&spec, "name") {
                                imported.push((name, spec));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        if imported.is_empty() {
            // Side-effect import: `import './polyfill'`
            let target = module_basename(&path);
            self.refs.push(
                self.ctx
                    .reference(ReferenceKind::Import, target, node, scope)
                    .with_import_path(path),
            );
            return;
        }
        for (target, at) in imported {
            self.refs.push(
                self.ctx
                    .reference(ReferenceKind::Import, target, &at, scope)
                    .with_import_path(path.clone()),
            );
        }
    }

    fn extract_call(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let args = node.child_by_field_name("arguments");

        if function.kind() == "identifier" && self.ctx.get_node_text(&function) == "require" {
            if let Some(path) = args.and_then(|a| first_string_argument(self.ctx, &a)) {
                let target = module_basename(&path);
                self.refs.push(
                    self.ctx
                        .reference(ReferenceKind::Import, target, node, scope)
                        .with_import_path(path),
                );
                return;
            }
        }

        // obj.method() -> "method"
        let name = if function.kind() == "member_expression" {
            self.ctx
                .get_field_text(&function, "property")
                .unwrap_or_else(|| self.ctx.get_node_text(&function))
        } else {
            self.ctx.get_node_text(&function)
        };
        self.refs
            .push(self.ctx.reference(ReferenceKind::Call, name, &function, scope));

        if function.kind() == "member_expression" {
            if let Some(object) = function.child_by_field_name("object") {
                if object.kind() == "call_expression" {
                    self.extract_call(&object, scope, depth + 1);
                } else {
                    self.walk(object, scope, depth + 1);
                }
            }
        } else if !matches!(function.kind(), "identifier") {
            self.walk(function, scope, depth + 1);
        }
        if let Some(args) = args {
            self.walk(args, scope, depth + 1);
        }
    }

    fn extract_new(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        if let Some(constructor) = node.child_by_field_name("constructor") {
            let text = self.ctx.get_node_text(&constructor);
            let target = last_segment(&text, &["."]).to_string();
            self.refs
                .push(self.ctx.reference(ReferenceKind::Call, target, &constructor, scope));
        }
        if let Some(args) = node.child_by_field_name("arguments") {
            self.walk(args, scope, depth + 1);
        }
    }

    /// `extends Base` -> inherits, `implements A, B` -> implements
    fn extract_heritage(&mut self, class: &Node, class_name: &str) {
        let Some(heritage) = self.ctx.find_child_by_type(class, "class_heritage") else {
            return;
        };
        let ctx = self.ctx;
        let mut found_clause = false;
        for clause in children(&heritage) {
            match clause.kind() {
                "extends_clause" => {
                    found_clause = true;
                    for value in self.clause_types(&clause) {
                        self.refs.push(ctx.reference(
                            ReferenceKind::Inherits,
                            type_name(ctx, &value),
                            &value,
                            Some(class_name),
                        ));
                    }
                }
                "implements_clause" => {
                    found_clause = true;
                    for value in self.clause_types(&clause) {
                        self.refs.push(ctx.reference(
                            ReferenceKind::Implements,
                            type_name(ctx, &value),
                            &value,
                            Some(class_name),
                        ));
                    }
                }
                _ => {}
            }
        }
        // JavaScript: `class_heritage` holds `extends <expression>` directly
        if !found_clause {
            if let Some(value) = heritage.named_child(0) {
                self.refs.push(ctx.reference(
                    ReferenceKind::Inherits,
                    type_name(ctx, &value),
                    &value,
                    Some(class_name),
                ));
            }
        }
    }

    fn extract_interface_extends(&mut self, iface: &Node, iface_name: &str) {
        let Some(clause) = self.ctx.find_child_by_type(iface, "extends_type_clause") else {
            return;
        };
        let ctx = self.ctx;
        for value in self.clause_types(&clause) {
            self.refs.push(ctx.reference(
                ReferenceKind::Inherits,
                type_name(ctx, &value),
                &value,
                Some(iface_name),
            ));
        }
    }

    /// Named children of a heritage clause that denote types
    fn clause_types<'t>(&self, clause: &Node<'t>) -> Vec<Node<'t>> {
        children(clause)
            .into_iter()
            .filter(|c| c.is_named() && !matches!(c.kind(), "type_arguments" | "comment"))
            .collect()
    }
}

/// Base name of a heritage type (`ns.Base<T>` -> `Base`)
fn type_name(ctx: &ExtractionContext, node: &Node) -> String {
    let base = match node.kind() {
        "generic_type" => node.child_by_field_name("name").unwrap_or(*node),
        _ => *node,
    };
    let text = ctx.get_node_text(&base);
    let text = text.split('<').next().unwrap_or(&text).trim();
    last_segment(text, &["."]).to_string()
}

/// Last path segment of a module specifier without extension
fn module_basename(path: &str) -> String {
    let last = last_segment(path, &["/"]);
    match last.rfind('.') {
        Some(idx) if idx > 0 => last[..idx].to_string(),
        _ => last.to_string(),
    }
}

fn first_string_argument(ctx: &ExtractionContext, args: &Node) -> Option<String> {
    let first = args.named_child(0)?;
    matches!(first.kind(), "string" | "template_string")
        .then(|| unquote(&ctx.get_node_text(&first)).to_string())
}
