/// Rust symbol extraction: items, fields, variants, trait and impl members
use super::helpers::{doc_comment, function_qualifiers, pub_prefix, visibility};
use crate::extractors::base::{
    children, qualify, ExtractionContext, Symbol, SymbolKind, SymbolOptions, Visibility,
};
use tree_sitter::Node;

pub(super) fn extract_symbols(ctx: &ExtractionContext, root: Node) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        symbols: Vec::new(),
    };
    walker.walk(root, None, 0);
    walker.symbols
}

struct SymbolWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    symbols: Vec<Symbol>,
}

impl SymbolWalker<'_, '_> {
    fn walk(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for child in children(&node) {
            match child.kind() {
                "function_item" => self.extract_function(child, parent, SymbolKind::Function),
                "struct_item" | "union_item" => self.extract_struct(child, parent),
                "enum_item" => self.extract_enum(child, parent),
                "trait_item" => self.extract_trait(child, parent),
                "impl_item" => self.extract_impl(child),
                "mod_item" => self.extract_mod(child, parent, depth),
                "type_item" => self.extract_type_alias(child, parent),
                "const_item" => self.extract_value(child, parent, "const", SymbolKind::Constant),
                "static_item" => self.extract_value(child, parent, "static", SymbolKind::Variable),
                "macro_definition" => self.extract_macro(child, parent),
                _ => {}
            }
        }
    }

    /// Push a symbol whose exportedness follows its visibility
    fn push(
        &mut self,
        node: &Node,
        name: &str,
        kind: SymbolKind,
        parent: Option<&str>,
        vis: Visibility,
        signature: Option<String>,
        docstring: Option<String>,
    ) -> String {
        let qualified = qualify(parent, name, "::");
        self.symbols.push(self.ctx.symbol(
            node,
            name,
            kind,
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature,
                docstring,
                visibility: Some(vis),
                is_exported: Some(vis == Visibility::Public),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
        qualified
    }

    fn extract_function(&mut self, node: Node, parent: Option<&str>, kind: SymbolKind) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let vis = visibility(self.ctx, &node);
        let mut signature = format!(
            "{}{}fn {}{}({})",
            pub_prefix(vis),
            function_qualifiers(self.ctx, &node),
            name,
            self.ctx.get_field_text(&node, "type_parameters").unwrap_or_default(),
            self.ctx.params_text(node.child_by_field_name("parameters"))
        );
        if let Some(ret) = self.ctx.get_field_text(&node, "return_type") {
            signature.push_str(" -> ");
            signature.push_str(&ret);
        }
        let doc = doc_comment(self.ctx, &node);
        self.push(&node, &name, kind, parent, vis, Some(signature), doc);
    }

    /// Trait method declaration without a body
    fn extract_fn_signature(&mut self, node: Node, parent: &str) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let mut signature = format!(
            "fn {}{}({})",
            name,
            self.ctx.get_field_text(&node, "type_parameters").unwrap_or_default(),
            self.ctx.params_text(node.child_by_field_name("parameters"))
        );
        if let Some(ret) = self.ctx.get_field_text(&node, "return_type") {
            signature.push_str(" -> ");
            signature.push_str(&ret);
        }
        let doc = doc_comment(self.ctx, &node);
        // Trait members share the trait's reach
        self.push(
            &node,
            &name,
            SymbolKind::Method,
            Some(parent),
            Visibility::Public,
            Some(signature),
            doc,
        );
    }

    fn type_signature(&self, node: &Node, keyword: &str, name: &str, vis: Visibility) -> String {
        format!(
            "{}{} {}{}",
            pub_prefix(vis),
            keyword,
            name,
            self.ctx.get_field_text(node, "type_parameters").unwrap_or_default()
        )
    }

    fn extract_struct(&mut self, node: Node, parent: Option<&str>) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let vis = visibility(self.ctx, &node);
        let keyword = if node.kind() == "union_item" { "union" } else { "struct" };
        let signature = self.type_signature(&node, keyword, &name, vis);
        let doc = doc_comment(self.ctx, &node);
        let qualified = self.push(&node, &name, SymbolKind::Struct, parent, vis, Some(signature), doc);

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for field in children(&body) {
            if field.kind() != "field_declaration" {
                continue;
            }
            let Some(field_name) = self.ctx.get_field_text(&field, "name") else {
                continue;
            };
            let signature = match self.ctx.get_field_text(&field, "type") {
                Some(ty) => format!("{}: {}", field_name, ty),
                None => field_name.clone(),
            };
            let field_vis = visibility(self.ctx, &field);
            let doc = doc_comment(self.ctx, &field);
            self.push(
                &field,
                &field_name,
                SymbolKind::Field,
                Some(&qualified),
                field_vis,
                Some(signature),
                doc,
            );
        }
    }

    fn extract_enum(&mut self, node: Node, parent: Option<&str>) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let vis = visibility(self.ctx, &node);
        let signature = self.type_signature(&node, "enum", &name, vis);
        let doc = doc_comment(self.ctx, &node);
        let qualified = self.push(&node, &name, SymbolKind::Enum, parent, vis, Some(signature), doc);

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for variant in children(&body) {
            if variant.kind() != "enum_variant" {
                continue;
            }
            if let Some(variant_name) = self.ctx.get_field_text(&variant, "name") {
                self.push(
                    &variant,
                    &variant_name,
                    SymbolKind::Field,
                    Some(&qualified),
                    vis,
                    None,
                    None,
                );
            }
        }
    }

    fn extract_trait(&mut self, node: Node, parent: Option<&str>) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let vis = visibility(self.ctx, &node);
        let mut signature = self.type_signature(&node, "trait", &name, vis);
        if let Some(bounds) = self.ctx.get_field_text(&node, "bounds") {
            signature.push_str(&bounds);
        }
        let doc = doc_comment(self.ctx, &node);
        let qualified = self.push(&node, &name, SymbolKind::Trait, parent, vis, Some(signature), doc);

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for member in children(&body) {
            match member.kind() {
                "function_item" => {
                    self.extract_function(member, Some(&qualified), SymbolKind::Method)
                }
                "function_signature_item" => self.extract_fn_signature(member, &qualified),
                _ => {}
            }
        }
    }

    /// Methods land under `Type`, or `Type::Trait` for trait impls
    fn extract_impl(&mut self, node: Node) {
        let Some(type_name) = self.ctx.get_field_text(&node, "type") else {
            return;
        };
        let impl_name = match self.ctx.get_field_text(&node, "trait") {
            Some(trait_name) => format!("{}::{}", type_name, trait_name),
            None => type_name,
        };
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for member in children(&body) {
            match member.kind() {
                "function_item" => self.extract_function(member, Some(&impl_name), SymbolKind::Method),
                "type_item" => self.extract_type_alias(member, Some(&impl_name)),
                "const_item" => {
                    self.extract_value(member, Some(&impl_name), "const", SymbolKind::Constant)
                }
                _ => {}
            }
        }
    }

    fn extract_mod(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let vis = visibility(self.ctx, &node);
        let signature = format!("{}mod {}", pub_prefix(vis), name);
        let doc = doc_comment(self.ctx, &node);
        let qualified = self.push(&node, &name, SymbolKind::Module, parent, vis, Some(signature), doc);
        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, Some(&qualified), depth + 1);
        }
    }

    fn extract_type_alias(&mut self, node: Node, parent: Option<&str>) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let vis = visibility(self.ctx, &node);
        let mut signature = self.type_signature(&node, "type", &name, vis);
        if let Some(value) = self.ctx.get_field_text(&node, "type") {
            if value.len() <= 60 {
                signature.push_str(" = ");
                signature.push_str(&value);
            }
        }
        let doc = doc_comment(self.ctx, &node);
        self.push(&node, &name, SymbolKind::TypeAlias, parent, vis, Some(signature), doc);
    }

    /// `const` and `static` items
    fn extract_value(&mut self, node: Node, parent: Option<&str>, keyword: &str, kind: SymbolKind) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let vis = visibility(self.ctx, &node);
        let mut signature = format!("{}{} {}", pub_prefix(vis), keyword, name);
        if let Some(ty) = self.ctx.get_field_text(&node, "type") {
            signature.push_str(": ");
            signature.push_str(&ty);
        }
        let doc = doc_comment(self.ctx, &node);
        self.push(&node, &name, kind, parent, vis, Some(signature), doc);
    }

    fn extract_macro(&mut self, node: Node, parent: Option<&str>) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let doc = doc_comment(self.ctx, &node);
        self.symbols.push(self.ctx.symbol(
            &node,
            name.clone(),
            SymbolKind::Function,
            SymbolOptions {
                qualified_name: Some(qualify(parent, &name, "::")),
                signature: Some(format!("macro_rules! {}", name)),
                docstring: doc,
                is_exported: Some(true),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));
    }
}
