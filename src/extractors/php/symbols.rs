// PHP Extractor - symbol walk
//
// Namespaces qualify everything declared after them: braced namespaces wrap
// their body, unbraced ones apply to the following siblings. Members are
// qualified under their type with `\`.

use super::helpers::{has_modifier, phpdoc, variable_name, visibility};
use crate::extractors::base::{
    children, qualify, ExtractionContext, Symbol, SymbolKind, SymbolOptions, Visibility,
};
use tree_sitter::Node;

const SEP: &str = "\\";

pub(super) fn extract_symbols(ctx: &ExtractionContext, root: Node) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        symbols: Vec::new(),
    };
    walker.walk(root, None, None, 0);
    walker.symbols
}

struct SymbolWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    symbols: Vec<Symbol>,
}

impl SymbolWalker<'_, '_> {
    fn walk(&mut self, node: Node, parent: Option<&str>, namespace: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        let mut current_ns = namespace.map(str::to_string);
        for child in children(&node) {
            let ns = current_ns.as_deref();
            match child.kind() {
                "namespace_definition" => {
                    if let Some(name) = self.extract_namespace(child, depth) {
                        current_ns = Some(name);
                    }
                }
                "class_declaration" => self.extract_type(child, parent, ns, SymbolKind::Class, "class", depth),
                "interface_declaration" => {
                    self.extract_type(child, parent, ns, SymbolKind::Interface, "interface", depth)
                }
                "trait_declaration" => self.extract_type(child, parent, ns, SymbolKind::Trait, "trait", depth),
                "enum_declaration" => self.extract_enum(child, parent, ns, depth),
                "function_definition" => self.extract_function(child, parent, ns),
                "method_declaration" => self.extract_method(child, parent, ns),
                "property_declaration" => self.extract_property(child, parent),
                "const_declaration" => self.extract_const(child, parent, ns),
                "declaration_list" | "compound_statement" => self.walk(child, parent, ns, depth + 1),
                _ => {}
            }
        }
    }

    /// Qualified name: under the parent type, else under the namespace
    fn qualified(&self, parent: Option<&str>, namespace: Option<&str>, name: &str) -> String {
        match parent {
            Some(p) => qualify(Some(p), name, SEP),
            None => qualify(namespace, name, SEP),
        }
    }

    /// Returns the namespace name when it applies to following siblings
    fn extract_namespace(&mut self, node: Node, depth: usize) -> Option<String> {
        let ctx = self.ctx;
        let name = ctx.get_field_text(&node, "name")?;
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Module,
            SymbolOptions {
                signature: Some(format!("namespace {}", name)),
                ..Default::default()
            },
        ));
        match node.child_by_field_name("body") {
            Some(body) => {
                self.walk(body, None, Some(&name), depth + 1);
                None
            }
            None => Some(name),
        }
    }

    fn extract_type(
        &mut self,
        node: Node,
        parent: Option<&str>,
        namespace: Option<&str>,
        kind: SymbolKind,
        keyword: &str,
        depth: usize,
    ) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let qualified = self.qualified(parent, namespace, &name);
        let mut signature = format!("{} {}", keyword, name);
        for clause in ["base_clause", "class_interface_clause"] {
            if let Some(c) = ctx.find_child_by_type(&node, clause) {
                signature.push(' ');
                signature.push_str(&ctx.get_node_text(&c));
            }
        }
        if has_modifier(ctx, &node, "abstract") {
            signature.insert_str(0, "abstract ");
        }
        if has_modifier(ctx, &node, "final") {
            signature.insert_str(0, "final ");
        }
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            kind,
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(signature),
                docstring: phpdoc(ctx, &node),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, Some(&qualified), namespace, depth + 1);
            self.extract_promoted_properties(body, &qualified);
        }
    }

    fn extract_enum(&mut self, node: Node, parent: Option<&str>, namespace: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let qualified = self.qualified(parent, namespace, &name);
        let mut signature = format!("enum {}", name);
        // Backed enum: `enum Status: string`
        let kids = children(&node);
        if let Some(idx) = kids.iter().position(|c| c.kind() == ":") {
            if let Some(backing) = kids.get(idx + 1) {
                signature.push_str(&format!(": {}", ctx.get_node_text(backing)));
            }
        }
        if let Some(clause) = ctx.find_child_by_type(&node, "class_interface_clause") {
            signature.push(' ');
            signature.push_str(&ctx.get_node_text(&clause));
        }
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Enum,
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(signature),
                docstring: phpdoc(ctx, &node),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for case in ctx.find_children_by_type(&body, "enum_case") {
            let case_name = ctx
                .get_field_text(&case, "name")
                .or_else(|| ctx.find_child_by_type(&case, "name").map(|n| ctx.get_node_text(&n)));
            let Some(case_name) = case_name else {
                continue;
            };
            self.symbols.push(ctx.symbol(
                &case,
                &case_name,
                SymbolKind::Constant,
                SymbolOptions {
                    qualified_name: Some(qualify(Some(&qualified), &case_name, SEP)),
                    default_value: ctx.get_field_text(&case, "value"),
                    parent_name: Some(qualified.clone()),
                    ..Default::default()
                },
            ));
        }
        self.walk(body, Some(&qualified), namespace, depth + 1);
    }

    fn function_signature(&self, node: &Node, name: &str) -> String {
        let ctx = self.ctx;
        let mut signature = format!(
            "function {}({})",
            name,
            ctx.params_text(node.child_by_field_name("parameters"))
        );
        if let Some(ret) = ctx.get_field_text(node, "return_type") {
            signature.push_str(&format!(": {}", ret));
        }
        signature
    }

    fn extract_function(&mut self, node: Node, parent: Option<&str>, namespace: Option<&str>) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Function,
            SymbolOptions {
                qualified_name: Some(self.qualified(parent, namespace, &name)),
                signature: Some(self.function_signature(&node, &name)),
                docstring: phpdoc(ctx, &node),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
    }

    /// `public static function find(int $id): ?User`
    fn extract_method(&mut self, node: Node, parent: Option<&str>, namespace: Option<&str>) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let visibility = visibility(ctx, &node);
        let mut signature = self.function_signature(&node, &name);
        if has_modifier(ctx, &node, "static") {
            signature.insert_str(0, "static ");
        }
        if has_modifier(ctx, &node, "abstract") {
            signature.insert_str(0, "abstract ");
        }
        signature.insert_str(0, &format!("{} ", visibility));
        let kind = if name == "__construct" {
            SymbolKind::Constructor
        } else {
            SymbolKind::Method
        };
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            kind,
            SymbolOptions {
                qualified_name: Some(self.qualified(parent, namespace, &name)),
                signature: Some(signature),
                docstring: phpdoc(ctx, &node),
                visibility: Some(visibility),
                is_exported: Some(visibility == Visibility::Public),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
    }

    fn extract_property(&mut self, node: Node, parent: Option<&str>) {
        let ctx = self.ctx;
        let visibility = visibility(ctx, &node);
        let mut prefix = String::new();
        if has_modifier(ctx, &node, "readonly") {
            prefix.push_str("readonly ");
        }
        if has_modifier(ctx, &node, "static") {
            prefix.push_str("static ");
        }
        for element in ctx.find_children_by_type(&node, "property_element") {
            let raw = ctx.get_field_text(&element, "name").or_else(|| {
                ctx.find_child_by_type(&element, "variable_name")
                    .map(|v| ctx.get_node_text(&v))
            });
            let Some(raw) = raw else {
                continue;
            };
            let name = variable_name(&raw);
            let default_value = ctx.get_field_text(&element, "default_value").or_else(|| {
                ctx.find_child_by_type(&element, "property_initializer")
                    .and_then(|init| init.named_child(0))
                    .map(|v| ctx.get_node_text(&v))
            });
            self.symbols.push(ctx.symbol(
                &node,
                name,
                SymbolKind::Property,
                SymbolOptions {
                    qualified_name: Some(qualify(parent, name, SEP)),
                    signature: Some(format!("{}{} {}", prefix, visibility, raw)),
                    docstring: phpdoc(ctx, &node),
                    visibility: Some(visibility),
                    is_exported: Some(visibility == Visibility::Public),
                    parent_name: parent.map(str::to_string),
                    default_value,
                    ..Default::default()
                },
            ));
        }
    }

    fn extract_const(&mut self, node: Node, parent: Option<&str>, namespace: Option<&str>) {
        let ctx = self.ctx;
        let visibility = visibility(ctx, &node);
        for element in ctx.find_children_by_type(&node, "const_element") {
            let Some(name_node) = ctx.find_child_by_type(&element, "name") else {
                continue;
            };
            let name = ctx.get_node_text(&name_node);
            let value = children(&element)
                .into_iter()
                .filter(|c| c.is_named() && c.id() != name_node.id())
                .last()
                .map(|v| ctx.get_node_text(&v));
            self.symbols.push(ctx.symbol(
                &node,
                &name,
                SymbolKind::Constant,
                SymbolOptions {
                    qualified_name: Some(self.qualified(parent, namespace, &name)),
                    signature: Some(format!("const {}", name)),
                    visibility: Some(visibility),
                    is_exported: Some(visibility == Visibility::Public),
                    parent_name: parent.map(str::to_string),
                    default_value: value,
                    ..Default::default()
                },
            ));
        }
    }

    /// `__construct(private string $name)` also declares property `name`
    fn extract_promoted_properties(&mut self, body: Node, owner: &str) {
        let ctx = self.ctx;
        for method in ctx.find_children_by_type(&body, "method_declaration") {
            if ctx.get_field_text(&method, "name").as_deref() != Some("__construct") {
                continue;
            }
            let Some(params) = method.child_by_field_name("parameters") else {
                continue;
            };
            for param in children(&params) {
                if !matches!(param.kind(), "simple_parameter" | "property_promotion_parameter") {
                    continue;
                }
                let Some(modifier) = ctx.find_child_by_type(&param, "visibility_modifier") else {
                    continue;
                };
                let Some(var) = ctx.find_child_by_type(&param, "variable_name") else {
                    continue;
                };
                let visibility = Visibility::from_keyword(ctx.get_node_text(&modifier).trim())
                    .unwrap_or(Visibility::Public);
                let raw = ctx.get_node_text(&var);
                let name = variable_name(&raw);
                self.symbols.push(ctx.symbol(
                    &param,
                    name,
                    SymbolKind::Property,
                    SymbolOptions {
                        qualified_name: Some(qualify(Some(owner), name, SEP)),
                        signature: Some(format!("promoted {}", raw)),
                        visibility: Some(visibility),
                        is_exported: Some(visibility == Visibility::Public),
                        parent_name: Some(owner.to_string()),
                        ..Default::default()
                    },
                ));
            }
        }
    }
}
