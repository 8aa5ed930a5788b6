// C# symbol extraction
//
// Walks namespaces and type bodies. Member visibility defaults depend on the
// enclosing declaration, so the walk carries a `Container` alongside the
// parent's qualified name. Method bodies are only searched for local functions.

use super::helpers::{
    accessors, class_modifiers, constraints, has_modifier, namespace_name, type_params,
    visibility, xml_doc, Container,
};
use crate::extractors::base::{
    children, qualify, ExtractionContext, Symbol, SymbolKind, SymbolOptions, Visibility,
};
use tree_sitter::Node;

pub(crate) fn extract_symbols(ctx: &ExtractionContext, root: Node) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        symbols: Vec::new(),
    };
    walker.walk(root, None, Container::Namespace, 0);
    walker.symbols
}

struct SymbolWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    symbols: Vec<Symbol>,
}

/// Fields of a member symbol that vary per declaration kind
struct Member<'p> {
    parent: Option<&'p str>,
    container: Container,
    signature: String,
    visibility: Option<Visibility>,
}

impl SymbolWalker<'_, '_> {
    fn walk(&mut self, node: Node, parent: Option<&str>, container: Container, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        // A file-scoped namespace scopes the declarations after it
        let mut file_scope: Option<String> = None;
        for child in children(&node) {
            let parent = file_scope.as_deref().or(parent);
            let member = |sig: String| Member {
                parent,
                container,
                signature: sig,
                visibility: None,
            };
            match child.kind() {
                "namespace_declaration" => {
                    self.extract_namespace(child, parent, depth);
                }
                "file_scoped_namespace_declaration" => {
                    let qualified = self.extract_namespace(child, parent, depth);
                    file_scope = qualified;
                }
                "class_declaration" => self.extract_type(child, parent, container, SymbolKind::Class, "class", depth),
                "interface_declaration" => {
                    self.extract_type(child, parent, container, SymbolKind::Interface, "interface", depth)
                }
                "struct_declaration" => self.extract_type(child, parent, container, SymbolKind::Struct, "struct", depth),
                "record_declaration" => {
                    let is_struct = children(&child).iter().any(|c| c.kind() == "struct");
                    let (kind, keyword) = if is_struct {
                        (SymbolKind::Struct, "record struct")
                    } else {
                        (SymbolKind::Class, "record")
                    };
                    self.extract_type(child, parent, container, kind, keyword, depth)
                }
                "enum_declaration" => self.extract_enum(child, parent, container),
                "method_declaration" => self.extract_method(child, parent, container, depth),
                "local_function_statement" => self.extract_local_function(child, parent, depth),
                "constructor_declaration" => {
                    let Some(name) = self.ctx.get_field_text(&child, "name") else {
                        continue;
                    };
                    let params = self.ctx.params_text(child.child_by_field_name("parameters"));
                    let qualified =
                        self.push(&child, &name, SymbolKind::Constructor, member(format!("{}({})", name, params)));
                    self.find_local_functions(child, &qualified, depth);
                }
                "destructor_declaration" => {
                    let Some(name) = self.ctx.get_field_text(&child, "name") else {
                        continue;
                    };
                    let name = format!("~{}", name);
                    let signature = format!("{}()", name);
                    self.push(&child, &name, SymbolKind::Method, Member {
                        visibility: Some(Visibility::Private),
                        ..member(signature)
                    });
                }
                "field_declaration" => self.extract_field(child, parent, container),
                "event_field_declaration" => self.extract_event_field(child, parent, container),
                "property_declaration" => self.extract_property(child, parent, container),
                "indexer_declaration" => {
                    let ty = self.ctx.get_field_text(&child, "type").unwrap_or_default();
                    let params = self
                        .ctx
                        .get_field_text(&child, "parameters")
                        .unwrap_or_else(|| "[]".to_string());
                    let mut signature = format!("{} this{}", ty, params);
                    let accessors = accessors(self.ctx, &child);
                    if !accessors.is_empty() {
                        signature.push_str(&format!(" {{ {} }}", accessors));
                    }
                    self.push(&child, "this", SymbolKind::Property, member(signature));
                }
                "event_declaration" => {
                    let Some(name) = self.ctx.get_field_text(&child, "name") else {
                        continue;
                    };
                    let ty = self.ctx.get_field_text(&child, "type").unwrap_or_default();
                    let signature = format!("{}event {} {}", self.static_prefix(&child), ty, name);
                    self.push(&child, &name, SymbolKind::Event, member(signature));
                }
                "delegate_declaration" => {
                    let Some(name) = self.ctx.get_field_text(&child, "name") else {
                        continue;
                    };
                    let mut signature = String::from("delegate ");
                    if let Some(ret) = self.ctx.get_field_text(&child, "type") {
                        signature.push_str(&ret);
                        signature.push(' ');
                    }
                    signature.push_str(&self.callable_tail(&child, &name));
                    self.push(&child, &name, SymbolKind::Delegate, member(signature));
                }
                "operator_declaration" => {
                    let Some(op) = self.ctx.get_field_text(&child, "operator") else {
                        continue;
                    };
                    let ty = self.ctx.get_field_text(&child, "type").unwrap_or_default();
                    let params = self.ctx.params_text(child.child_by_field_name("parameters"));
                    let signature = format!("static {} operator {}({})", ty, op, params);
                    self.push(&child, &format!("operator{}", op), SymbolKind::Method, member(signature));
                }
                "conversion_operator_declaration" => {
                    let Some(ty) = self.ctx.get_field_text(&child, "type") else {
                        continue;
                    };
                    let conversion = if children(&child).iter().any(|c| c.kind() == "implicit") {
                        "implicit"
                    } else {
                        "explicit"
                    };
                    let params = self.ctx.params_text(child.child_by_field_name("parameters"));
                    let signature = format!("static {} operator {}({})", conversion, ty, params);
                    self.push(&child, &format!("operator {}", ty), SymbolKind::Method, member(signature));
                }
                _ => {}
            }
        }
    }

    /// Push a member symbol and return its qualified name
    fn push(&mut self, node: &Node, name: &str, kind: SymbolKind, member: Member) -> String {
        let visibility = member
            .visibility
            .unwrap_or_else(|| visibility(self.ctx, node, member.container));
        let qualified = qualify(member.parent, name, ".");
        self.symbols.push(self.ctx.symbol(
            node,
            name,
            kind,
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(member.signature),
                docstring: xml_doc(self.ctx, node),
                visibility: Some(visibility),
                is_exported: Some(visibility == Visibility::Public),
                parent_name: member.parent.map(str::to_string),
                ..Default::default()
            },
        ));
        qualified
    }

    fn static_prefix(&self, node: &Node) -> &'static str {
        if has_modifier(self.ctx, node, "static") {
            "static "
        } else {
            ""
        }
    }

    /// `name<T>(params) where T : ...`
    fn callable_tail(&self, node: &Node, name: &str) -> String {
        format!(
            "{}{}({}){}",
            name,
            type_params(self.ctx, node),
            self.ctx.params_text(node.child_by_field_name("parameters")),
            constraints(self.ctx, node)
        )
    }

    fn extract_namespace(&mut self, node: Node, parent: Option<&str>, depth: usize) -> Option<String> {
        let ctx = self.ctx;
        let name = namespace_name(ctx, &node)?;
        let qualified = qualify(parent, &name, ".");
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            SymbolKind::Module,
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(format!("namespace {}", name)),
                ..Default::default()
            },
        ));
        let body = node.child_by_field_name("body").unwrap_or(node);
        self.walk(body, Some(&qualified), Container::Namespace, depth + 1);
        Some(qualified)
    }

    fn extract_type(
        &mut self,
        node: Node,
        parent: Option<&str>,
        container: Container,
        kind: SymbolKind,
        keyword: &str,
        depth: usize,
    ) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let visibility = visibility(ctx, &node, container);
        let modifiers = class_modifiers(ctx, &node);
        let qualified = qualify(parent, &name, ".");

        let mut signature = if modifiers.is_empty() {
            format!("{} {}", keyword, name)
        } else {
            format!("{} {} {}", modifiers.join(" "), keyword, name)
        };
        signature.push_str(&type_params(ctx, &node));
        if let Some(bases) = ctx.find_child_by_type(&node, "base_list") {
            signature.push(' ');
            signature.push_str(&ctx.get_node_text(&bases));
        }
        signature.push_str(&constraints(ctx, &node));

        let file_local = modifiers.iter().any(|m| m == "file");
        self.symbols.push(ctx.symbol(
            &node,
            &name,
            kind.clone(),
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(signature),
                docstring: xml_doc(ctx, &node),
                visibility: Some(visibility),
                is_exported: Some(!file_local && visibility == Visibility::Public),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));

        // Primary constructor: `class Point(int x, int y)`
        if let Some(params) = ctx.find_child_by_type(&node, "parameter_list") {
            let line = ctx.start_line(&node);
            self.symbols.push(Symbol::new(
                &name,
                SymbolKind::Constructor,
                line,
                line,
                SymbolOptions {
                    qualified_name: Some(format!("{}.{}", qualified, name)),
                    signature: Some(format!("{}({})", name, ctx.params_text(Some(params)))),
                    visibility: Some(visibility),
                    is_exported: Some(visibility == Visibility::Public),
                    parent_name: Some(qualified.clone()),
                    ..Default::default()
                },
            ));
        }

        let inner = if kind == SymbolKind::Interface {
            Container::Interface
        } else {
            Container::Type
        };
        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, Some(&qualified), inner, depth + 1);
        }
    }

    fn extract_enum(&mut self, node: Node, parent: Option<&str>, container: Container) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let mut signature = format!("enum {}", name);
        if let Some(bases) = ctx.find_child_by_type(&node, "base_list") {
            signature.push(' ');
            signature.push_str(&ctx.get_node_text(&bases));
        }
        let visibility = visibility(ctx, &node, container);
        let qualified = self.push(&node, &name, SymbolKind::Enum, Member {
            parent,
            container,
            signature,
            visibility: Some(visibility),
        });

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for member in ctx.find_children_by_type(&body, "enum_member_declaration") {
            let member_name = ctx.get_field_text(&member, "name").or_else(|| ctx.find_child_text(&member, "identifier"));
            let Some(member_name) = member_name else {
                continue;
            };
            self.symbols.push(ctx.symbol(
                &member,
                &member_name,
                SymbolKind::Constant,
                SymbolOptions {
                    qualified_name: Some(format!("{}.{}", qualified, member_name)),
                    default_value: ctx.get_field_text(&member, "value"),
                    is_exported: Some(visibility == Visibility::Public),
                    parent_name: Some(qualified.clone()),
                    ..Default::default()
                },
            ));
        }
    }

    fn extract_method(&mut self, node: Node, parent: Option<&str>, container: Container, depth: usize) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let mut signature = String::from(self.static_prefix(&node));
        if has_modifier(ctx, &node, "async") {
            signature.push_str("async ");
        }
        if let Some(ret) = ctx
            .get_field_text(&node, "returns")
            .or_else(|| ctx.get_field_text(&node, "type"))
        {
            signature.push_str(&ret);
            signature.push(' ');
        }
        signature.push_str(&self.callable_tail(&node, &name));
        let qualified = self.push(&node, &name, SymbolKind::Method, Member {
            parent,
            container,
            signature,
            visibility: None,
        });
        self.find_local_functions(node, &qualified, depth);
    }

    /// Local functions are private methods of the enclosing member
    fn extract_local_function(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let mut signature = String::from(self.static_prefix(&node));
        if has_modifier(ctx, &node, "async") {
            signature.push_str("async ");
        }
        if let Some(ret) = ctx.get_field_text(&node, "type") {
            signature.push_str(&ret);
            signature.push(' ');
        }
        signature.push_str(&self.callable_tail(&node, &name));
        let qualified = self.push(&node, &name, SymbolKind::Method, Member {
            parent,
            container: Container::Type,
            signature,
            visibility: Some(Visibility::Private),
        });
        self.find_local_functions(node, &qualified, depth);
    }

    fn find_local_functions(&mut self, node: Node, owner: &str, depth: usize) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        self.search_local_functions(body, owner, depth + 1);
    }

    fn search_local_functions(&mut self, node: Node, owner: &str, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for child in children(&node) {
            if child.kind() == "local_function_statement" {
                self.extract_local_function(child, Some(owner), depth);
            } else if child.is_named() {
                self.search_local_functions(child, owner, depth + 1);
            }
        }
    }

    /// `field_declaration -> variable_declaration -> variable_declarator`
    fn extract_field(&mut self, node: Node, parent: Option<&str>, container: Container) {
        let ctx = self.ctx;
        let is_static = has_modifier(ctx, &node, "static");
        let is_readonly = has_modifier(ctx, &node, "readonly");
        let is_const = has_modifier(ctx, &node, "const");
        let kind = if is_const || (is_static && is_readonly) {
            SymbolKind::Constant
        } else {
            SymbolKind::Field
        };
        let mut prefix = String::new();
        for (flag, word) in [(is_static, "static "), (is_readonly, "readonly "), (is_const, "const ")] {
            if flag {
                prefix.push_str(word);
            }
        }
        for (name, ty, declarator) in variables(ctx, &node) {
            self.push(&node, &name, kind.clone(), Member {
                parent,
                container,
                signature: format!("{}{} {}", prefix, ty, name),
                visibility: None,
            });
            let literal = declarator.and_then(|d| {
                ctx.descendants(&d, 2)
                    .into_iter()
                    .find(|v| v.kind().ends_with("_literal"))
            });
            if let Some(value) = literal {
                if let Some(symbol) = self.symbols.last_mut() {
                    symbol.default_value = Some(ctx.get_node_text(&value));
                }
            }
        }
    }

    fn extract_event_field(&mut self, node: Node, parent: Option<&str>, container: Container) {
        let prefix = self.static_prefix(&node);
        for (name, ty, _) in variables(self.ctx, &node) {
            self.push(&node, &name, SymbolKind::Event, Member {
                parent,
                container,
                signature: format!("{}event {} {}", prefix, ty, name),
                visibility: None,
            });
        }
    }

    fn extract_property(&mut self, node: Node, parent: Option<&str>, container: Container) {
        let ctx = self.ctx;
        let Some(name) = ctx.get_field_text(&node, "name") else {
            return;
        };
        let mut signature = String::from(self.static_prefix(&node));
        if has_modifier(ctx, &node, "required") {
            signature.push_str("required ");
        }
        let ty = ctx.get_field_text(&node, "type").unwrap_or_default();
        signature.push_str(&format!("{} {}", ty, name));
        let accessors = accessors(ctx, &node);
        if !accessors.is_empty() {
            signature.push_str(&format!(" {{ {} }}", accessors));
        }
        self.push(&node, &name, SymbolKind::Property, Member {
            parent,
            container,
            signature,
            visibility: None,
        });
    }
}

/// `(name, type, declarator)` for each variable in a field-like declaration
fn variables<'t>(ctx: &ExtractionContext, node: &Node<'t>) -> Vec<(String, String, Option<Node<'t>>)> {
    let mut out = Vec::new();
    for declaration in ctx.find_children_by_type(node, "variable_declaration") {
        let ty = ctx.get_field_text(&declaration, "type").unwrap_or_default();
        for declarator in ctx.find_children_by_type(&declaration, "variable_declarator") {
            let name = ctx
                .get_field_text(&declarator, "name")
                .or_else(|| {
                    ctx.find_child_by_type(&declarator, "identifier")
                        .map(|id| ctx.get_node_text(&id))
                });
            if let Some(name) = name {
                out.push((name, ty.clone(), Some(declarator)));
            }
        }
    }
    out
}
