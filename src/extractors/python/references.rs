/// Reference extraction for Python: imports, calls, decorators, inheritance
/// and type annotations
use super::symbols::string_content;
use crate::extractors::base::{
    children, last_segment, qualify, ExtractionContext, Reference, ReferenceKind,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

/// Builtin annotation names that never resolve to project symbols
const BUILTIN_TYPES: &[&str] = &[
    "int", "str", "float", "bool", "bytes", "None", "list", "dict", "set", "tuple", "type",
    "object",
];

static FORWARD_REF_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*").unwrap());

pub fn extract_references(ctx: &ExtractionContext, root: Node) -> Vec<Reference> {
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
                "import_from_statement" => self.extract_from_import(&child, scope),
                "call" => self.extract_call(&child, scope, depth),
                "decorated_definition" => {
                    self.extract_decorator_refs(&child, scope, depth);
                    if let Some(def) = child.child_by_field_name("definition") {
                        self.walk_definition(def, scope, depth);
                    }
                }
                "function_definition" | "class_definition" => {
                    self.walk_definition(child, scope, depth)
                }
                "raise_statement" => self.extract_raise(&child, scope, depth),
                "except_clause" => self.extract_except(&child, scope, depth),
                "assignment" => {
                    if let Some(annotation) = child.child_by_field_name("type") {
                        self.walk_type_node(&annotation, scope, depth);
                    }
                    self.walk(child, scope, depth + 1);
                }
                _ => self.walk(child, scope, depth + 1),
            }
        }
    }

    /// Recurse into a def/class with its qualified name as the new scope
    fn walk_definition(&mut self, node: Node, scope: Option<&str>, depth: usize) {
        let new_scope = match self.ctx.get_field_text(&node, "name") {
            Some(name) => qualify(scope, &name, "."),
            None => scope.unwrap_or_default().to_string(),
        };
        let new_scope = (!new_scope.is_empty()).then_some(new_scope);
        let inner = new_scope.as_deref();

        if node.kind() == "function_definition" {
            self.extract_signature_types(&node, inner, depth);
        } else {
            self.extract_bases(&node, inner);
        }
        self.walk(node, inner, depth + 1);
    }

    fn extract_bases(&mut self, class: &Node, class_name: Option<&str>) {
        let Some(bases) = class.child_by_field_name("superclasses") else {
            return;
        };
        for child in children(&bases) {
            let target = match child.kind() {
                "identifier" => self.ctx.get_node_text(&child),
                "attribute" => {
                    let text = self.ctx.get_node_text(&child);
                    last_segment(&text, &["."]).to_string()
                }
                _ => continue,
            };
            if !target.is_empty() {
                self.refs
                    .push(self.ctx.reference(ReferenceKind::Inherits, target, class, class_name));
            }
        }
    }

    fn extract_import(&mut self, node: &Node, scope: Option<&str>) {
        for child in children(node) {
            let module = match child.kind() {
                "dotted_name" => self.ctx.get_node_text(&child),
                "aliased_import" => match self.ctx.get_field_text(&child, "name") {
                    Some(name) => name,
                    None => continue,
                },
                _ => continue,
            };
            self.refs.push(
                self.ctx
                    .reference(ReferenceKind::Import, module.clone(), &child, scope)
                    .with_import_path(module),
            );
        }
    }

    fn extract_from_import(&mut self, node: &Node, scope: Option<&str>) {
        let module_node = node.child_by_field_name("module_name");
        let module = module_node
            .map(|m| self.ctx.get_node_text(&m))
            .unwrap_or_default();
        let joined = |name: &str| {
            if module.is_empty() {
                name.to_string()
            } else {
                format!("{}.{}", module, name)
            }
        };

        for child in children(node) {
            if Some(child.id()) == module_node.map(|m| m.id()) {
                continue;
            }
            let name = match child.kind() {
                "dotted_name" => self.ctx.get_node_text(&child),
                "aliased_import" => match self.ctx.get_field_text(&child, "name") {
                    Some(name) => name,
                    None => continue,
                },
                "wildcard_import" => "*".to_string(),
                _ => continue,
            };
            let path = joined(&name);
            self.refs.push(
                self.ctx
                    .reference(ReferenceKind::Import, name, &child, scope)
                    .with_import_path(path),
            );
        }
    }

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

    fn extract_decorator_refs(&mut self, decorated: &Node, scope: Option<&str>, depth: usize) {
        for decorator in children(decorated) {
            if decorator.kind() != "decorator" {
                continue;
            }
            for sub in children(&decorator) {
                match sub.kind() {
                    "identifier" | "attribute" => {
                        let name = self.ctx.get_node_text(&sub);
                        self.refs
                            .push(self.ctx.reference(ReferenceKind::Call, name, &sub, scope));
                    }
                    "call" => self.extract_call(&sub, scope, depth),
                    _ => {}
                }
            }
        }
    }

    /// `raise X` names the exception class directly; `raise X(...)` is a call
    fn extract_raise(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let mut named = node.named_children(&mut node.walk()).collect::<Vec<_>>().into_iter();
        if let Some(first) = named.next() {
            match first.kind() {
                "identifier" | "attribute" => {
                    let name = self.ctx.get_node_text(&first);
                    self.refs
                        .push(self.ctx.reference(ReferenceKind::Call, name, &first, scope));
                }
                "call" => self.extract_call(&first, scope, depth),
                _ => self.walk(first, scope, depth + 1),
            }
        }
        for rest in named {
            if rest.kind() == "call" {
                self.extract_call(&rest, scope, depth);
            } else {
                self.walk(rest, scope, depth + 1);
            }
        }
    }

    fn extract_except(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let alias = node.child_by_field_name("alias").map(|a| a.id());
        for child in node.named_children(&mut node.walk()).collect::<Vec<_>>() {
            if Some(child.id()) == alias {
                continue;
            }
            if child.kind() == "block" {
                self.walk(child, scope, depth + 1);
            } else {
                self.exception_types(&child, scope, depth + 1);
            }
        }
    }

    fn exception_types(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        match node.kind() {
            "identifier" | "attribute" => {
                let name = self.ctx.get_node_text(node);
                self.refs
                    .push(self.ctx.reference(ReferenceKind::TypeRef, name, node, scope));
            }
            // `except E as e`: only the left side names a type
            "as_pattern" => {
                if let Some(first) = node.named_child(0) {
                    self.exception_types(&first, scope, depth + 1);
                }
            }
            "tuple" | "parenthesized_expression" | "expression_list" => {
                for child in node.named_children(&mut node.walk()).collect::<Vec<_>>() {
                    self.exception_types(&child, scope, depth + 1);
                }
            }
            _ => {}
        }
    }

    fn extract_signature_types(&mut self, func: &Node, scope: Option<&str>, depth: usize) {
        if let Some(params) = func.child_by_field_name("parameters") {
            for param in children(&params) {
                if let Some(annotation) = param.child_by_field_name("type") {
                    self.walk_type_node(&annotation, scope, depth);
                }
            }
        }
        if let Some(ret) = func.child_by_field_name("return_type") {
            self.walk_type_node(&ret, scope, depth);
        }
    }

    fn walk_type_node(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        match node.kind() {
            "identifier" => {
                let name = self.ctx.get_node_text(node);
                if !BUILTIN_TYPES.contains(&name.as_str()) {
                    self.refs
                        .push(self.ctx.reference(ReferenceKind::TypeRef, name, node, scope));
                }
            }
            "attribute" => {
                let name = self.ctx.get_node_text(node);
                self.refs
                    .push(self.ctx.reference(ReferenceKind::TypeRef, name, node, scope));
            }
            // Forward reference: `"Document"` or `"list[Node]"`
            "string" => {
                let content = string_content(node, self.ctx.source);
                for m in FORWARD_REF_NAME.find_iter(&content) {
                    if !BUILTIN_TYPES.contains(&m.as_str()) {
                        self.refs.push(self.ctx.reference(
                            ReferenceKind::TypeRef,
                            m.as_str(),
                            node,
                            scope,
                        ));
                    }
                }
            }
            _ => {
                for child in children(node) {
                    self.walk_type_node(&child, scope, depth + 1);
                }
            }
        }
    }
}
