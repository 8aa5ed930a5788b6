/// Symbol extraction for Java-grammar languages (Java, Apex)
///
/// Declarations are found by walking the compilation unit and then each
/// type body; statements inside method bodies are never visited.
use super::helpers::{
    annotations, extract_modifiers, has_modifier, javadoc, with_annotations,
};
use super::Dialect;
use crate::extractors::base::{
    children, qualify, ExtractionContext, Symbol, SymbolKind, SymbolOptions, Visibility,
};
use tree_sitter::Node;

pub(crate) fn extract_symbols(ctx: &ExtractionContext, dialect: &Dialect, root: Node) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        dialect,
        symbols: Vec::new(),
    };
    walker.walk(root, None, 0);
    walker.symbols
}

struct SymbolWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    dialect: &'c Dialect,
    symbols: Vec<Symbol>,
}

impl SymbolWalker<'_, '_> {
    fn walk(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for child in children(&node) {
            match child.kind() {
                "class_declaration" => self.extract_type(child, parent, SymbolKind::Class, depth),
                "interface_declaration" | "annotation_type_declaration" => {
                    self.extract_type(child, parent, SymbolKind::Interface, depth)
                }
                "record_declaration" => self.extract_type(child, parent, SymbolKind::Class, depth),
                "enum_declaration" => self.extract_enum(child, parent, depth),
                "method_declaration" => self.extract_method(child, parent),
                "constructor_declaration" => self.extract_constructor(child, parent),
                "field_declaration" | "constant_declaration" => self.extract_field(child, parent),
                "package_declaration" => self.extract_package(child),
                _ => {}
            }
        }
    }

    fn visibility(&self, modifiers: &[String]) -> Visibility {
        (self.dialect.visibility)(modifiers)
    }

    fn extract_type(&mut self, node: Node, parent: Option<&str>, kind: SymbolKind, depth: usize) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let modifiers = extract_modifiers(ctx, &node);
        let visibility = self.visibility(&modifiers);
        let qualified = qualify(parent, &name, ".");

        let keyword = match node.kind() {
            "record_declaration" => "record",
            "annotation_type_declaration" => "@interface",
            "interface_declaration" => "interface",
            _ => "class",
        };
        let mut signature = format!(
            "{} {}{}",
            keyword,
            name,
            ctx.get_field_text(&node, "type_parameters").unwrap_or_default()
        );
        if node.kind() == "record_declaration" {
            if let Some(params) = ctx.get_field_text(&node, "parameters") {
                signature.push_str(&params);
            }
        }
        for clause in ["superclass", "interfaces"] {
            if let Some(text) = ctx.get_field_text(&node, clause) {
                signature.push(' ');
                signature.push_str(&text);
            }
        }
        if let Some(extends) = ctx.find_child_by_type(&node, "extends_interfaces") {
            signature.push(' ');
            signature.push_str(&ctx.get_node_text(&extends));
        }

        let mut symbol = ctx.symbol(
            &node,
            &name,
            kind,
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(with_annotations(&annotations(ctx, &node), signature)),
                docstring: javadoc(ctx, &node),
                visibility: Some(visibility),
                is_exported: Some(visibility == Visibility::Public),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        );
        if let Some(hook) = self.dialect.class_hook {
            hook(ctx, &node, &mut symbol);
        }
        self.symbols.push(symbol);

        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, Some(&qualified), depth + 1);
        }
    }

    fn extract_enum(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let modifiers = extract_modifiers(ctx, &node);
        let visibility = self.visibility(&modifiers);
        let qualified = qualify(parent, &name, ".");
        let mut signature = format!("enum {}", name);
        if let Some(interfaces) = ctx.get_field_text(&node, "interfaces") {
            signature.push(' ');
            signature.push_str(&interfaces);
        }
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Enum,
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(with_annotations(&annotations(ctx, &node), signature)),
                docstring: javadoc(ctx, &node),
                visibility: Some(visibility),
                is_exported: Some(visibility == Visibility::Public),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for child in children(&body) {
            match child.kind() {
                "enum_constant" => {
                    let Some(constant) = ctx.get_field_text(&child, "name") else {
                        continue;
                    };
                    self.symbols.push(ctx.symbol(
                        &child,
                        &constant,
                        SymbolKind::Constant,
                        SymbolOptions {
                            qualified_name: Some(qualify(Some(&qualified), &constant, ".")),
                            visibility: Some(visibility),
                            is_exported: Some(visibility == Visibility::Public),
                            parent_name: Some(qualified.clone()),
                            ..Default::default()
                        },
                    ));
                }
                "enum_body_declarations" => self.walk(child, Some(&qualified), depth + 1),
                _ => {}
            }
        }
    }

    fn extract_method(&mut self, node: Node, parent: Option<&str>) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let modifiers = extract_modifiers(ctx, &node);
        let visibility = self.visibility(&modifiers);

        let mut signature = String::new();
        if has_modifier(&modifiers, "static") {
            signature.push_str("static ");
        }
        if let Some(type_params) = ctx.get_field_text(&node, "type_parameters") {
            signature.push_str(&type_params);
            signature.push(' ');
        }
        if let Some(ret) = ctx.get_field_text(&node, "type") {
            signature.push_str(&ret);
            signature.push(' ');
        }
        signature.push_str(&format!(
            "{}({})",
            name,
            ctx.params_text(node.child_by_field_name("parameters"))
        ));
        if let Some(throws) = ctx.find_child_by_type(&node, "throws") {
            signature.push(' ');
            signature.push_str(&ctx.get_node_text(&throws));
        }

        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Method,
            SymbolOptions {
                qualified_name: Some(qualify(parent, &name, ".")),
                signature: Some(with_annotations(&annotations(ctx, &node), signature)),
                docstring: javadoc(ctx, &node),
                visibility: Some(visibility),
                is_exported: Some(visibility == Visibility::Public),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
    }

    fn extract_constructor(&mut self, node: Node, parent: Option<&str>) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let visibility = self.visibility(&extract_modifiers(ctx, &node));
        let signature = format!(
            "{}({})",
            name,
            ctx.params_text(node.child_by_field_name("parameters"))
        );
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Constructor,
            SymbolOptions {
                qualified_name: Some(qualify(parent, &name, ".")),
                signature: Some(with_annotations(&annotations(ctx, &node), signature)),
                docstring: javadoc(ctx, &node),
                visibility: Some(visibility),
                is_exported: Some(visibility == Visibility::Public),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
    }

    /// One symbol per declarator: `int a = 1, b;` yields `a` and `b`
    fn extract_field(&mut self, node: Node, parent: Option<&str>) {
        let ctx = self.ctx;
        let modifiers = extract_modifiers(ctx, &node);
        let visibility = self.visibility(&modifiers);
        let is_static = has_modifier(&modifiers, "static");
        let is_final = has_modifier(&modifiers, "final");
        // Interface constants are implicitly static final
        let kind = if (is_static && is_final) || node.kind() == "constant_declaration" {
            SymbolKind::Constant
        } else {
            SymbolKind::Field
        };
        let type_text = ctx.get_field_text(&node, "type").unwrap_or_default();

        for declarator in ctx.find_children_by_type(&node, "variable_declarator") {
            let Some(name) = ctx.get_field_text(&declarator, "name") else {
                continue;
            };
            let mut signature = String::new();
            if is_static {
                signature.push_str("static ");
            }
            if is_final {
                signature.push_str("final ");
            }
            signature.push_str(&format!("{} {}", type_text, name));
            let default_value = declarator
                .child_by_field_name("value")
                .filter(|v| is_literal(v.kind()))
                .map(|v| ctx.get_node_text(&v))
                .filter(|v| v.len() <= ctx.config.literal_max_len);

            self.symbols.push(ctx.symbol(
                &node,
                &name,
                kind.clone(),
                SymbolOptions {
                    qualified_name: Some(qualify(parent, &name, ".")),
                    signature: Some(signature),
                    docstring: javadoc(ctx, &node),
                    visibility: Some(visibility),
                    is_exported: Some(visibility == Visibility::Public),
                    parent_name: parent.map(str::to_string),
                    default_value,
                },
            ));
        }
    }

    fn extract_package(&mut self, node: Node) {
        let ctx = self.ctx;
        let Some(path) = ctx.find_child_by_types(&node, &["scoped_identifier", "identifier"]) else {
            return;
        };
        let name = ctx.get_node_text(&path);
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Module,
            SymbolOptions {
                signature: Some(format!("package {}", name)),
                ..Default::default()
            },
        ));
    }
}

fn is_literal(kind: &str) -> bool {
    matches!(
        kind,
        "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "string_literal"
            | "character_literal"
            | "true"
            | "false"
            | "null_literal"
    )
}
