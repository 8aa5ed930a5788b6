/// Reference extraction for Java-grammar languages: imports, method
/// invocations, object creation and type heritage
use super::helpers::{base_type_name, heritage_types};
use crate::extractors::base::{
    children, qualify, ExtractionContext, Reference, ReferenceKind,
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
                "import_declaration" => self.extract_import(&child, scope),
                "method_invocation" => self.extract_invocation(&child, scope, depth),
                "object_creation_expression" => self.extract_creation(&child, scope, depth),
                "class_declaration"
                | "interface_declaration"
                | "enum_declaration"
                | "record_declaration"
                | "annotation_type_declaration" => {
                    let inner = self.named_scope(&child, scope);
                    if let Some(type_name) = inner.as_deref() {
                        self.extract_heritage(&child, type_name);
                    }
                    self.walk(child, inner.as_deref().or(scope), depth + 1);
                }
                "method_declaration" | "constructor_declaration" => {
                    let inner = self.named_scope(&child, scope);
                    self.walk(child, inner.as_deref().or(scope), depth + 1);
                }
                _ => self.walk(child, scope, depth + 1),
            }
        }
    }

    fn named_scope(&self, node: &Node, scope: Option<&str>) -> Option<String> {
        self.ctx
            .get_field_text(node, "name")
            .map(|name| qualify(scope, &name, "."))
    }

    /// `import a.b.C;` -> `C`, `import a.b.*;` -> `*`
    fn extract_import(&mut self, node: &Node, scope: Option<&str>) {
        let Some(path_node) = self
            .ctx
            .find_child_by_types(node, &["scoped_identifier", "identifier"])
        else {
            return;
        };
        let mut path = self.ctx.get_node_text(&path_node);
        let target = if self.ctx.find_child_by_type(node, "asterisk").is_some() {
            path.push_str(".*");
            "*".to_string()
        } else {
            path.rsplit('.').next().unwrap_or(&path).to_string()
        };
        self.refs.push(
            self.ctx
                .reference(ReferenceKind::Import, target, node, scope)
                .with_import_path(path),
        );
    }

    /// `obj.name(...)` -> `obj.name`; a chained receiver is walked for its own calls
    fn extract_invocation(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        let Some(name) = self.ctx.get_field_text(node, "name") else {
            return;
        };
        let object = node.child_by_field_name("object");
        let target = match object {
            Some(obj) => format!("{}.{}", self.ctx.get_node_text(&obj), name),
            None => name,
        };
        self.refs
            .push(self.ctx.reference(ReferenceKind::Call, target, node, scope));

        if let Some(obj) = object {
            if obj.kind() == "method_invocation" {
                self.extract_invocation(&obj, scope, depth + 1);
            } else {
                self.walk(obj, scope, depth + 1);
            }
        }
        if let Some(args) = node.child_by_field_name("arguments") {
            self.walk(args, scope, depth + 1);
        }
    }

    /// `new Foo<T>(...)` -> call to `Foo`; anonymous class bodies are walked
    fn extract_creation(&mut self, node: &Node, scope: Option<&str>, depth: usize) {
        if let Some(type_node) = node.child_by_field_name("type") {
            let target = base_type_name(self.ctx, &type_node);
            self.refs
                .push(self.ctx.reference(ReferenceKind::Call, target, node, scope));
        }
        if let Some(args) = node.child_by_field_name("arguments") {
            self.walk(args, scope, depth + 1);
        }
        if let Some(body) = self.ctx.find_child_by_type(node, "class_body") {
            self.walk(body, scope, depth + 1);
        }
    }

    /// Superclass -> inherits, implemented interfaces -> implements,
    /// interface `extends` lists -> inherits
    fn extract_heritage(&mut self, decl: &Node, type_name: &str) {
        let ctx = self.ctx;
        let emit = |refs: &mut Vec<Reference>, clause: Node, kind: ReferenceKind| {
            for ty in heritage_types(&clause) {
                refs.push(ctx.reference(
                    kind.clone(),
                    base_type_name(ctx, &ty),
                    decl,
                    Some(type_name),
                ));
            }
        };
        if let Some(superclass) = decl.child_by_field_name("superclass") {
            // Only the first type counts as the superclass
            if let Some(first) = heritage_types(&superclass).into_iter().next() {
                self.refs.push(ctx.reference(
                    ReferenceKind::Inherits,
                    base_type_name(ctx, &first),
                    decl,
                    Some(type_name),
                ));
            }
        }
        if let Some(interfaces) = decl.child_by_field_name("interfaces") {
            emit(&mut self.refs, interfaces, ReferenceKind::Implements);
        }
        if let Some(extends) = ctx.find_child_by_type(decl, "extends_interfaces") {
            emit(&mut self.refs, extends, ReferenceKind::Inherits);
        }
    }
}
