// Go symbol extraction
//
// Top-level declarations are routed through `DECLARATION_HANDLERS`, a node-kind
// keyed table standing in for a typed AST enum.

use super::is_exported;
use crate::extractors::base::{
    children, qualify, ExtractionContext, Reference, ReferenceKind, Symbol, SymbolKind,
    SymbolOptions, Visibility,
};
use tree_sitter::Node;

type DeclarationHandler = fn(&mut SymbolWalker<'_, '_>, Node<'_>);

const DECLARATION_HANDLERS: &[(&str, DeclarationHandler)] = &[
    ("function_declaration", |w, n| w.extract_function(n)),
    ("method_declaration", |w, n| w.extract_method(n)),
    ("type_declaration", |w, n| w.extract_type_declaration(n)),
    ("package_clause", |w, n| w.extract_package(n)),
    ("var_declaration", |w, n| w.extract_specs(n, "var_spec", "var", SymbolKind::Variable)),
    ("const_declaration", |w, n| w.extract_specs(n, "const_spec", "const", SymbolKind::Constant)),
];

pub fn extract_symbols(ctx: &ExtractionContext, root: Node) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        symbols: Vec::new(),
    };
    for child in children(&root) {
        if let Some((_, handler)) = DECLARATION_HANDLERS
            .iter()
            .find(|(kind, _)| *kind == child.kind())
        {
            handler(&mut walker, child);
        }
    }
    walker.symbols
}

/// Embedded struct fields and embedded interfaces, in source order
pub fn embedding_refs(ctx: &ExtractionContext, root: Node) -> Vec<Reference> {
    let mut refs = Vec::new();
    for decl in children(&root) {
        if decl.kind() != "type_declaration" {
            continue;
        }
        for spec in children(&decl) {
            let (Some(name), Some(ty)) = (
                ctx.get_field_text(&spec, "name"),
                spec.child_by_field_name("type"),
            ) else {
                continue;
            };
            match ty.kind() {
                "struct_type" => {
                    for field in struct_fields(ctx, &ty) {
                        if field.child_by_field_name("name").is_some() {
                            continue;
                        }
                        if let Some(embedded) = ctx.get_field_text(&field, "type") {
                            let target = embedded.trim_start_matches('*').to_string();
                            refs.push(ctx.reference(
                                ReferenceKind::Inherits,
                                target,
                                &field,
                                Some(&name),
                            ));
                        }
                    }
                }
                "interface_type" => {
                    for elem in children(&ty) {
                        if elem.kind() == "type_elem" {
                            let target = ctx.get_node_text(&elem);
                            refs.push(ctx.reference(
                                ReferenceKind::Inherits,
                                target,
                                &elem,
                                Some(&name),
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
    }
    refs
}

/// Consecutive `//` comment lines directly above a declaration
pub fn doc_comment(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let comments: Vec<String> = ctx
        .preceding_comments(node, &["comment"])
        .into_iter()
        .map(|c| c.strip_prefix("//").map(|t| t.trim().to_string()).unwrap_or(c))
        .collect();
    (!comments.is_empty()).then(|| comments.join("\n"))
}

/// Receiver type name from `(s *Server)`
pub fn receiver_type(ctx: &ExtractionContext, receiver: Option<Node>) -> Option<String> {
    let receiver = receiver?;
    children(&receiver)
        .into_iter()
        .filter(|c| c.kind() == "parameter_declaration")
        .find_map(|param| ctx.get_field_text(&param, "type"))
        .map(|t| t.trim_start_matches('*').to_string())
}

fn struct_fields<'t>(ctx: &ExtractionContext, struct_type: &Node<'t>) -> Vec<Node<'t>> {
    ctx.find_child_by_type(struct_type, "field_declaration_list")
        .map(|list| ctx.find_children_by_type(&list, "field_declaration"))
        .unwrap_or_default()
}

fn visibility(name: &str) -> Visibility {
    if is_exported(name) {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

struct SymbolWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    symbols: Vec<Symbol>,
}

impl SymbolWalker<'_, '_> {
    fn push(&mut self, node: &Node, name: String, kind: SymbolKind, options: SymbolOptions) {
        let options = SymbolOptions {
            visibility: Some(visibility(&name)),
            is_exported: Some(is_exported(&name)),
            ..options
        };
        self.symbols.push(self.ctx.symbol(node, name, kind, options));
    }

    fn extract_function(&mut self, node: Node) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let type_params = self.ctx.get_field_text(&node, "type_parameters").unwrap_or_default();
        let mut signature = format!(
            "func {}{}({})",
            name,
            type_params,
            self.ctx.params_text(node.child_by_field_name("parameters"))
        );
        if let Some(result) = self.ctx.get_field_text(&node, "result") {
            signature.push(' ');
            signature.push_str(&result);
        }
        let docstring = doc_comment(self.ctx, &node);
        self.push(
            &node,
            name,
            SymbolKind::Function,
            SymbolOptions {
                signature: Some(signature),
                docstring,
                ..Default::default()
            },
        );
    }

    fn extract_method(&mut self, node: Node) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let receiver = node.child_by_field_name("receiver");
        let receiver_text = receiver
            .map(|r| self.ctx.get_node_text(&r))
            .unwrap_or_default();
        let recv_type = receiver_type(self.ctx, receiver);

        let mut signature = format!(
            "func {} {}({})",
            receiver_text,
            name,
            self.ctx.params_text(node.child_by_field_name("parameters"))
        );
        if let Some(result) = self.ctx.get_field_text(&node, "result") {
            signature.push(' ');
            signature.push_str(&result);
        }
        let docstring = doc_comment(self.ctx, &node);
        self.push(
            &node,
            name.clone(),
            SymbolKind::Method,
            SymbolOptions {
                qualified_name: Some(qualify(recv_type.as_deref(), &name, ".")),
                signature: Some(signature),
                docstring,
                parent_name: recv_type,
                ..Default::default()
            },
        );
    }

    fn extract_type_declaration(&mut self, node: Node) {
        for spec in children(&node) {
            if matches!(spec.kind(), "type_spec" | "type_alias") {
                self.extract_type_spec(spec, node);
            }
        }
    }

    fn extract_type_spec(&mut self, spec: Node, declaration: Node) {
        let Some(name) = self.ctx.get_field_text(&spec, "name") else {
            return;
        };
        let Some(ty) = spec.child_by_field_name("type") else {
            return;
        };

        let (kind, signature) = match ty.kind() {
            "struct_type" => {
                self.extract_struct_fields(&ty, &name);
                (SymbolKind::Struct, format!("type {} struct", name))
            }
            "interface_type" => {
                self.extract_interface_methods(&ty, &name);
                (SymbolKind::Interface, format!("type {} interface", name))
            }
            _ => {
                let text: String = self.ctx.get_node_text(&ty).chars().take(60).collect();
                let eq = if spec.kind() == "type_alias" { "= " } else { "" };
                (SymbolKind::TypeAlias, format!("type {} {}{}", name, eq, text))
            }
        };

        // Grouped `type ( ... )` blocks get one span per spec
        let span = if children(&declaration)
            .iter()
            .filter(|c| matches!(c.kind(), "type_spec" | "type_alias"))
            .count()
            > 1
        {
            spec
        } else {
            declaration
        };
        let docstring = doc_comment(self.ctx, &declaration);
        self.push(
            &span,
            name,
            kind,
            SymbolOptions {
                signature: Some(signature),
                docstring,
                ..Default::default()
            },
        );
    }

    fn extract_struct_fields(&mut self, struct_type: &Node, struct_name: &str) {
        for field in struct_fields(self.ctx, struct_type) {
            let type_text = self.ctx.get_field_text(&field, "type");
            let mut cursor = field.walk();
            let names: Vec<String> = field
                .children_by_field_name("name", &mut cursor)
                .map(|n| self.ctx.get_node_text(&n))
                .collect();
            for field_name in names {
                let signature = match &type_text {
                    Some(t) => format!("{} {}", field_name, t),
                    None => field_name.clone(),
                };
                self.push(
                    &field,
                    field_name.clone(),
                    SymbolKind::Field,
                    SymbolOptions {
                        qualified_name: Some(qualify(Some(struct_name), &field_name, ".")),
                        signature: Some(signature),
                        parent_name: Some(struct_name.to_string()),
                        ..Default::default()
                    },
                );
            }
        }
    }

    fn extract_interface_methods(&mut self, iface: &Node, iface_name: &str) {
        for elem in children(iface) {
            if !matches!(elem.kind(), "method_spec" | "method_elem") {
                continue;
            }
            let Some(method_name) = self.ctx.get_field_text(&elem, "name") else {
                continue;
            };
            let mut signature = format!(
                "{}({})",
                method_name,
                self.ctx.params_text(elem.child_by_field_name("parameters"))
            );
            if let Some(result) = self.ctx.get_field_text(&elem, "result") {
                signature.push(' ');
                signature.push_str(&result);
            }
            self.push(
                &elem,
                method_name.clone(),
                SymbolKind::Method,
                SymbolOptions {
                    qualified_name: Some(qualify(Some(iface_name), &method_name, ".")),
                    signature: Some(signature),
                    parent_name: Some(iface_name.to_string()),
                    ..Default::default()
                },
            );
        }
    }

    fn extract_package(&mut self, node: Node) {
        if let Some(ident) = self.ctx.find_child_by_type(&node, "package_identifier") {
            let name = self.ctx.get_node_text(&ident);
            self.symbols.push(self.ctx.symbol(
                &node,
                name.clone(),
                SymbolKind::Module,
                SymbolOptions {
                    signature: Some(format!("package {}", name)),
                    is_exported: Some(true),
                    ..Default::default()
                },
            ));
        }
    }

    /// `var`/`const` specs, directly or inside a parenthesized spec list
    fn extract_specs(&mut self, node: Node, spec_kind: &str, keyword: &str, kind: SymbolKind) {
        let mut specs = Vec::new();
        for child in children(&node) {
            if child.kind() == spec_kind {
                specs.push(child);
            } else if child.kind().ends_with("_spec_list") {
                specs.extend(self.ctx.find_children_by_type(&child, spec_kind));
            }
        }

        for spec in specs {
            let type_text = self.ctx.get_field_text(&spec, "type");
            let mut cursor = spec.walk();
            let names: Vec<String> = spec
                .children_by_field_name("name", &mut cursor)
                .map(|n| self.ctx.get_node_text(&n))
                .collect();
            for name in names {
                let signature = match &type_text {
                    Some(t) => format!("{} {} {}", keyword, name, t),
                    None => format!("{} {}", keyword, name),
                };
                self.push(
                    &spec,
                    name,
                    kind.clone(),
                    SymbolOptions {
                        signature: Some(signature),
                        ..Default::default()
                    },
                );
            }
        }
    }
}
