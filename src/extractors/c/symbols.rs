//! Symbol extraction for C and C++
//!
//! `SymbolWalker` is also driven by the Objective-C extractor, which claims
//! its own node kinds through the dialect's symbol hook first.

use super::helpers::{
    contains_function_declarator, declarator_name, doc_comment, function_parts, is_const,
    is_literal, is_static,
};
use super::Dialect;
use crate::extractors::base::{
    children, qualify, ExtractionContext, Symbol, SymbolKind, SymbolOptions, Visibility,
};
use tree_sitter::Node;

pub(crate) fn extract_symbols(
    ctx: &ExtractionContext,
    dialect: &Dialect,
    is_header: bool,
    root: Node,
) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        dialect,
        is_header,
        symbols: Vec::new(),
    };
    walker.walk(root, None, 0);
    walker.symbols
}

pub(crate) struct SymbolWalker<'c, 'a> {
    pub ctx: &'c ExtractionContext<'a>,
    dialect: &'c Dialect,
    pub is_header: bool,
    pub symbols: Vec<Symbol>,
}

impl SymbolWalker<'_, '_> {
    pub fn walk(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for child in children(&node) {
            if let Some(hook) = self.dialect.symbols {
                if hook(self, child, parent, depth) {
                    continue;
                }
            }
            match child.kind() {
                "function_definition" => self.extract_function(child, parent, None),
                "declaration" => self.extract_declaration(child, parent, None),
                "struct_specifier" | "union_specifier" => {
                    self.extract_record(child, parent, SymbolKind::Struct, depth)
                }
                "class_specifier" => self.extract_record(child, parent, SymbolKind::Class, depth),
                "enum_specifier" => self.extract_enum(child, parent, None),
                "type_definition" => self.extract_typedef(child, parent, depth),
                "namespace_definition" => self.extract_namespace(child, parent, depth),
                // Pass-through containers
                "template_declaration"
                | "linkage_specification"
                | "declaration_list"
                | "preproc_if"
                | "preproc_ifdef"
                | "preproc_else"
                | "preproc_elif" => self.walk(child, parent, depth + 1),
                _ => {}
            }
        }
    }

    fn push(&mut self, node: &Node, name: &str, kind: SymbolKind, parent: Option<&str>, options: SymbolOptions) -> String {
        let qualified = qualify(parent, name, "::");
        self.symbols.push(self.ctx.symbol(
            node,
            name,
            kind,
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                parent_name: parent.map(str::to_string),
                ..options
            },
        ));
        qualified
    }

    /// File-level visibility: `static` hides, headers export
    fn linkage(&self, node: &Node) -> (Visibility, bool) {
        if is_static(self.ctx, node) {
            (Visibility::Private, false)
        } else {
            (Visibility::Public, self.is_header)
        }
    }

    /// Function definition; `member` carries the access level inside a class body
    pub fn extract_function(&mut self, node: Node, parent: Option<&str>, member: Option<Visibility>) {
        let ctx = self.ctx;
        let Some(declarator) = node.child_by_field_name("declarator") else {
            return;
        };
        let Some((name, params)) = function_parts(ctx, &declarator) else {
            return;
        };
        let ret = ctx.get_field_text(&node, "type").unwrap_or_default();
        let signature = format!("{} {}({})", ret, name, params).trim().to_string();
        self.push_function(&node, &name, parent, member, signature);
    }

    fn push_function(
        &mut self,
        node: &Node,
        name: &str,
        parent: Option<&str>,
        member: Option<Visibility>,
        signature: String,
    ) {
        // `void Widget::draw()` defined out of line belongs to `Widget`
        let (owner, short) = match name.rsplit_once("::") {
            Some((owner, short)) if self.dialect.cpp && !owner.is_empty() => {
                (Some(qualify(parent, owner, "::")), short.to_string())
            }
            _ => (parent.map(str::to_string), name.to_string()),
        };
        let is_method = member.is_some() || (owner.is_some() && owner.as_deref() != parent);
        let (visibility, exported) = match member {
            Some(vis) => (vis, self.is_header && vis == Visibility::Public),
            None => self.linkage(node),
        };
        self.push(
            node,
            &short,
            if is_method { SymbolKind::Method } else { SymbolKind::Function },
            owner.as_deref(),
            SymbolOptions {
                signature: Some(signature),
                docstring: doc_comment(self.ctx, node),
                visibility: Some(visibility),
                is_exported: Some(exported),
                ..Default::default()
            },
        );
    }

    /// Prototypes become functions, everything else variables
    pub fn extract_declaration(&mut self, node: Node, parent: Option<&str>, member: Option<Visibility>) {
        let ctx = self.ctx;
        // Constructor declarations carry no type
        let type_text = ctx.get_field_text(&node, "type").unwrap_or_default();
        let (visibility, exported) = match member {
            Some(vis) => (vis, self.is_header && vis == Visibility::Public),
            None => self.linkage(&node),
        };
        let constant = is_const(ctx, &node);

        for child in children(&node) {
            if contains_function_declarator(&child) {
                if let Some((name, params)) = function_parts(ctx, &child) {
                    let signature = format!("{} {}({})", type_text, name, params).trim().to_string();
                    self.push_function(&node, &name, parent, member, signature);
                }
                continue;
            }
            if !matches!(
                child.kind(),
                "init_declarator" | "identifier" | "pointer_declarator" | "array_declarator"
            ) {
                continue;
            }
            let Some(name) = declarator_name(ctx, &child).filter(|_| !type_text.is_empty()) else {
                continue;
            };
            let default_value = child
                .child_by_field_name("value")
                .filter(|v| is_literal(v.kind()))
                .map(|v| ctx.get_node_text(&v))
                .filter(|v| v.len() <= ctx.config.literal_max_len);
            self.push(
                &node,
                &name,
                if constant { SymbolKind::Constant } else { SymbolKind::Variable },
                parent,
                SymbolOptions {
                    signature: Some(format!("{} {}", type_text, name)),
                    visibility: Some(visibility),
                    is_exported: Some(exported),
                    default_value,
                    ..Default::default()
                },
            );
        }
    }

    /// struct / union / class, with fields and (C++) member functions
    pub fn extract_record(&mut self, node: Node, parent: Option<&str>, kind: SymbolKind, depth: usize) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let keyword = match node.kind() {
            "class_specifier" => "class",
            "union_specifier" => "union",
            _ => "struct",
        };
        let mut signature = format!("{} {}", keyword, name);
        if let Some(bases) = ctx.find_child_by_type(&node, "base_class_clause") {
            signature.push(' ');
            signature.push_str(&ctx.get_node_text(&bases));
        }
        let qualified = self.push(
            &node,
            &name,
            kind,
            parent,
            SymbolOptions {
                signature: Some(signature),
                docstring: doc_comment(ctx, &node),
                is_exported: Some(self.is_header),
                ..Default::default()
            },
        );
        if let Some(body) = node.child_by_field_name("body") {
            let default_access = if keyword == "class" {
                Visibility::Private
            } else {
                Visibility::Public
            };
            self.extract_members(&body, &qualified, default_access, depth + 1);
        }
    }

    fn extract_members(&mut self, body: &Node, owner: &str, default_access: Visibility, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        let ctx = self.ctx;
        let mut access = default_access;
        for member in children(body) {
            match member.kind() {
                "access_specifier" => {
                    let text = ctx.get_node_text(&member);
                    if let Some(vis) = Visibility::from_keyword(text.trim_end_matches(':').trim()) {
                        access = vis;
                    }
                }
                "field_declaration" => self.extract_field(member, owner, access),
                "function_definition" if self.dialect.cpp => {
                    self.extract_function(member, Some(owner), Some(access))
                }
                "declaration" if self.dialect.cpp => {
                    self.extract_declaration(member, Some(owner), Some(access))
                }
                "template_declaration" => {
                    self.extract_members(&member, owner, access, depth + 1)
                }
                "struct_specifier" | "union_specifier" => {
                    self.extract_record(member, Some(owner), SymbolKind::Struct, depth + 1)
                }
                "class_specifier" => {
                    self.extract_record(member, Some(owner), SymbolKind::Class, depth + 1)
                }
                "enum_specifier" => self.extract_enum(member, Some(owner), None),
                _ => {}
            }
        }
    }

    fn extract_field(&mut self, node: Node, owner: &str, access: Visibility) {
        let ctx = self.ctx;
        let type_text = ctx.get_field_text(&node, "type").unwrap_or_default();
        for child in children(&node) {
            if contains_function_declarator(&child) {
                if let Some((name, params)) = function_parts(ctx, &child) {
                    let signature = format!("{} {}({})", type_text, name, params).trim().to_string();
                    self.push_function(&node, &name, Some(owner), Some(access), signature);
                }
                continue;
            }
            if !matches!(
                child.kind(),
                "field_identifier" | "pointer_declarator" | "array_declarator"
            ) {
                continue;
            }
            let Some(name) = declarator_name(ctx, &child) else {
                continue;
            };
            self.push(
                &node,
                &name,
                SymbolKind::Field,
                Some(owner),
                SymbolOptions {
                    signature: Some(format!("{} {}", type_text, name)),
                    visibility: Some(access),
                    is_exported: Some(self.is_header && access == Visibility::Public),
                    ..Default::default()
                },
            );
        }
    }

    /// `alias` names an anonymous enum declared through a typedef
    fn extract_enum(&mut self, node: Node, parent: Option<&str>, alias: Option<&str>) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name").or_else(|| alias.map(str::to_string)) else {
            return;
        };
        let qualified = self.push(
            &node,
            &name,
            SymbolKind::Enum,
            parent,
            SymbolOptions {
                signature: Some(format!("enum {}", name)),
                docstring: doc_comment(ctx, &node),
                is_exported: Some(self.is_header),
                ..Default::default()
            },
        );
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for enumerator in ctx.find_children_by_type(&body, "enumerator") {
            let Some(member) = ctx.get_field_text(&enumerator, "name") else {
                continue;
            };
            self.push(
                &enumerator,
                &member,
                SymbolKind::Constant,
                Some(&qualified),
                SymbolOptions {
                    is_exported: Some(self.is_header),
                    default_value: ctx.get_field_text(&enumerator, "value"),
                    ..Default::default()
                },
            );
        }
    }

    fn extract_typedef(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let Some(name) = node
            .child_by_field_name("declarator")
            .and_then(|d| declarator_name(ctx, &d))
            .or_else(|| ctx.find_children_by_type(&node, "type_identifier").last().map(|t| ctx.get_node_text(t)))
        else {
            return;
        };
        let type_node = node.child_by_field_name("type");
        let has_body = type_node.is_some_and(|t| t.child_by_field_name("body").is_some());

        // Summarize inline bodies: `typedef struct {...} point_t` -> `typedef struct point_t`
        let type_text = match type_node {
            Some(t) if has_body => {
                let keyword = t.kind().trim_end_matches("_specifier");
                match ctx.get_field_text(&t, "name") {
                    Some(tag) => format!("{} {}", keyword, tag),
                    None => keyword.to_string(),
                }
            }
            Some(t) => ctx.get_node_text(&t),
            None => String::new(),
        };
        self.push(
            &node,
            &name,
            SymbolKind::TypeAlias,
            parent,
            SymbolOptions {
                signature: Some(format!("typedef {} {}", type_text, name).replace("  ", " ")),
                docstring: doc_comment(ctx, &node),
                is_exported: Some(self.is_header),
                ..Default::default()
            },
        );

        let Some(type_node) = type_node.filter(|_| has_body) else {
            return;
        };
        let tagged = type_node.child_by_field_name("name").is_some();
        match type_node.kind() {
            "struct_specifier" | "union_specifier" if tagged => {
                self.extract_record(type_node, parent, SymbolKind::Struct, depth + 1)
            }
            // Anonymous struct: fields hang off the typedef name
            "struct_specifier" | "union_specifier" => {
                if let Some(body) = type_node.child_by_field_name("body") {
                    let owner = qualify(parent, &name, "::");
                    self.extract_members(&body, &owner, Visibility::Public, depth + 1);
                }
            }
            "enum_specifier" if tagged => self.extract_enum(type_node, parent, None),
            "enum_specifier" => {
                // The typedef symbol already names it; only emit the enumerators
                let before = self.symbols.len();
                self.extract_enum(type_node, parent, Some(&name));
                if self.symbols.len() > before {
                    self.symbols.remove(before);
                }
            }
            _ => {}
        }
    }

    fn extract_namespace(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let qualified = match ctx.get_field_text(&node, "name") {
            Some(name) => Some(self.push(
                &node,
                &name,
                SymbolKind::Module,
                parent,
                SymbolOptions {
                    signature: Some(format!("namespace {}", name)),
                    ..Default::default()
                },
            )),
            // Anonymous namespace: members stay in the enclosing scope
            None => None,
        };
        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, qualified.as_deref().or(parent), depth + 1);
        }
    }
}
