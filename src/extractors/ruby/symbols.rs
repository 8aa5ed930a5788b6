/// Symbol extraction for Ruby: modules, classes, methods, singleton methods,
/// constants and `attr_*` properties.
///
/// Namespaces nest with `::`, instance methods use `Owner#name` and
/// singleton methods `Owner.name`.
use super::helpers::{doc_comment, visibility_keyword};
use crate::extractors::base::{
    children, qualify, ExtractionContext, Symbol, SymbolKind, SymbolOptions, Visibility,
};
use tree_sitter::Node;

const ATTR_METHODS: &[&str] = &["attr_reader", "attr_writer", "attr_accessor"];

/// Constant values longer than this are cut in signatures
const VALUE_PREVIEW: usize = 60;

pub(super) fn extract_symbols(ctx: &ExtractionContext, root: Node) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        symbols: Vec::new(),
        current_visibility: Visibility::Public,
    };
    walker.walk(root, None, 0);
    walker.symbols
}

struct SymbolWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    symbols: Vec<Symbol>,
    current_visibility: Visibility,
}

impl SymbolWalker<'_, '_> {
    fn walk(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for child in children(&node) {
            match child.kind() {
                "module" => self.extract_namespace(child, parent, SymbolKind::Module, depth),
                "class" => self.extract_namespace(child, parent, SymbolKind::Class, depth),
                "method" => self.extract_method(child, parent),
                "singleton_method" => self.extract_singleton_method(child, parent),
                "assignment" => self.extract_constant(child, parent),
                "call" => self.extract_attributes(child, parent),
                "identifier" => {
                    if let Some(keyword) = visibility_keyword(self.ctx, &child) {
                        self.current_visibility =
                            Visibility::from_keyword(&keyword).unwrap_or(Visibility::Public);
                    }
                }
                "body_statement" | "then" | "else" | "begin" => self.walk(child, parent, depth + 1),
                _ => {}
            }
        }
    }

    /// `module` and `class` share the walk; classes may carry `< Base`
    fn extract_namespace(&mut self, node: Node, parent: Option<&str>, kind: SymbolKind, depth: usize) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let qualified = qualify(parent, &name, "::");
        let signature = match kind {
            SymbolKind::Module => format!("module {}", name),
            _ => match superclass(ctx, &node) {
                Some(base) => format!("class {} < {}", name, base),
                None => format!("class {}", name),
            },
        };
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            kind,
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(signature),
                docstring: doc_comment(ctx, &node),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));

        // Each class/module body starts public
        let saved = std::mem::replace(&mut self.current_visibility, Visibility::Public);
        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, Some(&qualified), depth + 1);
        } else {
            // Older grammars put the body statements directly under the node
            self.walk(node, Some(&qualified), depth + 1);
        }
        self.current_visibility = saved;
    }

    fn extract_method(&mut self, node: Node, parent: Option<&str>) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let params = ctx.params_text(node.child_by_field_name("parameters"));
        let (kind, visibility) = match parent {
            Some(_) if name == "initialize" => (SymbolKind::Constructor, Visibility::Public),
            Some(_) => (SymbolKind::Method, self.current_visibility),
            None => (SymbolKind::Function, Visibility::Public),
        };
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            kind,
            SymbolOptions {
                qualified_name: Some(qualify(parent, &name, "#")),
                signature: Some(format!("def {}({})", name, params)),
                docstring: doc_comment(ctx, &node),
                visibility: Some(visibility),
                is_exported: Some(visibility == Visibility::Public),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
    }

    /// `def self.build(...)`
    fn extract_singleton_method(&mut self, node: Node, parent: Option<&str>) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let receiver = ctx
            .get_field_text(&node, "object")
            .unwrap_or_else(|| "self".to_string());
        let params = ctx.params_text(node.child_by_field_name("parameters"));
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Method,
            SymbolOptions {
                qualified_name: Some(qualify(parent, &name, ".")),
                signature: Some(format!("def {}.{}({})", receiver, name, params)),
                docstring: doc_comment(ctx, &node),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
    }

    /// `MAX_RETRIES = 3`
    fn extract_constant(&mut self, node: Node, parent: Option<&str>) {
        let ctx = self.ctx;
        let Some(left) = node.child_by_field_name("left").filter(|l| l.kind() == "constant") else {
            return;
        };
        let name = ctx.get_node_text(&left);
        let value = node.child_by_field_name("right").map(|right| {
            let text = ctx.get_node_text(&right);
            text.chars().take(VALUE_PREVIEW).collect::<String>()
        });
        let signature = match &value {
            Some(v) => format!("{} = {}", name, v),
            None => name.clone(),
        };
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Constant,
            SymbolOptions {
                qualified_name: Some(qualify(parent, &name, "::")),
                signature: Some(signature),
                parent_name: parent.map(str::to_string),
                default_value: value,
                ..Default::default()
            },
        ));
    }

    /// `attr_accessor :name, :email` declares one property per symbol
    fn extract_attributes(&mut self, node: Node, parent: Option<&str>) {
        let ctx = self.ctx;
        let Some(method) = ctx.get_field_text(&node, "method") else {
            return;
        };
        if !ATTR_METHODS.contains(&method.as_str()) || node.child_by_field_name("receiver").is_some() {
            return;
        }
        let Some(args) = node.child_by_field_name("arguments") else {
            return;
        };
        for arg in ctx.find_children_by_type(&args, "simple_symbol") {
            let text = ctx.get_node_text(&arg);
            let name = text.trim_start_matches(':');
            self.symbols.push(ctx.symbol(
                &node,
                name,
                SymbolKind::Property,
                SymbolOptions {
                    qualified_name: Some(qualify(parent, name, "#")),
                    signature: Some(format!("{} :{}", method, name)),
                    parent_name: parent.map(str::to_string),
                    ..Default::default()
                },
            ));
        }
    }
}

/// Superclass text of a class node without the `<`
pub(super) fn superclass(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let superclass = node.child_by_field_name("superclass")?;
    ctx.find_child_by_types(&superclass, &["constant", "scope_resolution"])
        .map(|c| ctx.get_node_text(&c))
}
