//! Symbol extraction shared by JavaScript and TypeScript
//!
//! The walker covers the ECMAScript declaration forms. TypeScript-only
//! declarations (interfaces, type aliases, enums) arrive through the
//! dialect's declaration hook so this walker carries no per-language branches.

use super::Dialect;
use crate::extractors::base::{
    children, qualify, strip_comment_markers, ExtractionContext, Symbol, SymbolKind,
    SymbolOptions, Visibility,
};
use tree_sitter::Node;

pub(crate) fn extract_symbols(ctx: &ExtractionContext, dialect: &Dialect, root: Node) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        dialect,
        symbols: Vec::new(),
    };
    walker.walk(root, None, false, 0);
    walker.symbols
}

pub(crate) struct SymbolWalker<'c, 'a> {
    pub ctx: &'c ExtractionContext<'a>,
    dialect: &'c Dialect,
    pub symbols: Vec<Symbol>,
}

impl SymbolWalker<'_, '_> {
    pub fn walk(&mut self, node: Node, parent: Option<&str>, exported: bool, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for child in children(&node) {
            if let Some(hook) = self.dialect.declarations {
                if hook(self, child, parent, exported) {
                    continue;
                }
            }
            match child.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    self.extract_function(child, parent, exported)
                }
                "class_declaration" | "abstract_class_declaration" | "class" => {
                    self.extract_class(child, parent, exported, depth)
                }
                "lexical_declaration" | "variable_declaration" => {
                    self.extract_variable_declaration(child, parent, exported)
                }
                "export_statement" => self.walk(child, parent, true, depth + 1),
                "expression_statement" => self.extract_module_exports(child, parent),
                _ => self.walk(child, parent, exported, depth + 1),
            }
        }
    }

    /// Build and push a symbol, returning its qualified name
    pub fn push(
        &mut self,
        node: &Node,
        name: &str,
        kind: SymbolKind,
        parent: Option<&str>,
        options: SymbolOptions,
    ) -> String {
        let qualified = qualify(parent, name, ".");
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

    fn extract_function(&mut self, node: Node, parent: Option<&str>, exported: bool) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let keyword = if node.kind() == "generator_function_declaration" {
            "function*"
        } else {
            "function"
        };
        let async_prefix = if has_token(&node, "async") { "async " } else { "" };
        let mut signature = format!(
            "{}{} {}{}({})",
            async_prefix,
            keyword,
            name,
            self.ctx.get_field_text(&node, "type_parameters").unwrap_or_default(),
            self.ctx.params_text(node.child_by_field_name("parameters"))
        );
        if let Some(ret) = self.return_type(&node) {
            signature.push_str(&ret);
        }
        let signature = with_decorators(self.ctx, &node, signature);
        self.push(
            &node,
            &name,
            SymbolKind::Function,
            parent,
            SymbolOptions {
                signature: Some(signature),
                docstring: jsdoc(self.ctx, &node),
                is_exported: Some(exported),
                ..Default::default()
            },
        );
    }

    fn extract_class(&mut self, node: Node, parent: Option<&str>, exported: bool, depth: usize) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let abstract_prefix = if node.kind() == "abstract_class_declaration" {
            "abstract "
        } else {
            ""
        };
        let mut signature = format!(
            "{}class {}{}",
            abstract_prefix,
            name,
            self.ctx.get_field_text(&node, "type_parameters").unwrap_or_default()
        );
        if let Some(heritage) = self.ctx.find_child_by_type(&node, "class_heritage") {
            let text = self.ctx.get_node_text(&heritage);
            signature.push(' ');
            signature.push_str(&text.split_whitespace().collect::<Vec<_>>().join(" "));
        }
        let signature = with_decorators(self.ctx, &node, signature);
        let qualified = self.push(
            &node,
            &name,
            SymbolKind::Class,
            parent,
            SymbolOptions {
                signature: Some(signature),
                docstring: jsdoc(self.ctx, &node),
                is_exported: Some(exported),
                ..Default::default()
            },
        );

        if let Some(body) = node.child_by_field_name("body") {
            self.extract_class_members(&body, &qualified, depth + 1);
        }
    }

    fn extract_class_members(&mut self, body: &Node, class_name: &str, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for member in children(body) {
            match member.kind() {
                "method_definition" | "method_signature" | "abstract_method_signature" => {
                    self.extract_method(member, class_name)
                }
                "public_field_definition" | "field_definition" | "property_signature" => {
                    self.extract_field(member, class_name)
                }
                _ => {}
            }
        }
    }

    fn extract_method(&mut self, node: Node, class_name: &str) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let mut prefix = String::new();
        for token in ["static", "async", "get", "set"] {
            if has_token(&node, token) {
                prefix.push_str(token);
                prefix.push(' ');
            }
        }
        let mut signature = format!(
            "{}{}{}({})",
            prefix,
            name,
            self.ctx.get_field_text(&node, "type_parameters").unwrap_or_default(),
            self.ctx.params_text(node.child_by_field_name("parameters"))
        );
        if let Some(ret) = self.return_type(&node) {
            signature.push_str(&ret);
        }
        let signature = with_decorators(self.ctx, &node, signature);
        let kind = if name == "constructor" {
            SymbolKind::Constructor
        } else {
            SymbolKind::Method
        };
        self.push(
            &node,
            &name,
            kind,
            Some(class_name),
            SymbolOptions {
                signature: Some(signature),
                docstring: jsdoc(self.ctx, &node),
                visibility: Some(member_visibility(self.ctx, &node, &name)),
                ..Default::default()
            },
        );
    }

    fn extract_field(&mut self, node: Node, class_name: &str) {
        let Some(name) = self
            .ctx
            .get_field_text(&node, "name")
            .or_else(|| self.ctx.get_field_text(&node, "property"))
        else {
            return;
        };
        let mut signature = name.clone();
        if let Some(ty) = self.ctx.get_field_text(&node, "type") {
            signature.push_str(&type_annotation(&ty));
        }
        let default_value = node
            .child_by_field_name("value")
            .and_then(|v| literal_value(self.ctx, &v));
        self.push(
            &node,
            &name,
            SymbolKind::Property,
            Some(class_name),
            SymbolOptions {
                signature: Some(signature),
                docstring: jsdoc(self.ctx, &node),
                visibility: Some(member_visibility(self.ctx, &node, &name)),
                default_value,
                ..Default::default()
            },
        );
    }

    /// `const a = ...`, `let b`, `var c = function () {}`
    fn extract_variable_declaration(&mut self, node: Node, parent: Option<&str>, exported: bool) {
        let keyword = children(&node)
            .first()
            .map(|k| self.ctx.get_node_text(k))
            .unwrap_or_else(|| "var".to_string());
        for declarator in self.ctx.find_children_by_type(&node, "variable_declarator") {
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            // Destructuring patterns declare no single name
            if name_node.kind() != "identifier" {
                continue;
            }
            let name = self.ctx.get_node_text(&name_node);
            let value = declarator.child_by_field_name("value");
            let docstring = jsdoc(self.ctx, &node);

            match value.map(|v| (v, v.kind())) {
                Some((v, "arrow_function")) => {
                    let params = v
                        .child_by_field_name("parameters")
                        .or_else(|| v.child_by_field_name("parameter"));
                    let async_prefix = if has_token(&v, "async") { "async " } else { "" };
                    let mut signature = format!(
                        "{} {} = {}({})",
                        keyword,
                        name,
                        async_prefix,
                        self.ctx.params_text(params)
                    );
                    if let Some(ret) = self.return_type(&v) {
                        signature.push_str(&ret);
                    }
                    signature.push_str(" =>");
                    self.push_callable(&declarator, &name, parent, exported, signature, docstring);
                }
                Some((v, "function_expression" | "function" | "generator_function")) => {
                    let signature = format!(
                        "{} {} = function({})",
                        keyword,
                        name,
                        self.ctx.params_text(v.child_by_field_name("parameters"))
                    );
                    self.push_callable(&declarator, &name, parent, exported, signature, docstring);
                }
                Some((v, "class")) => {
                    let qualified = self.push(
                        &declarator,
                        &name,
                        SymbolKind::Class,
                        parent,
                        SymbolOptions {
                            signature: Some(format!("{} {} = class", keyword, name)),
                            docstring,
                            is_exported: Some(exported),
                            ..Default::default()
                        },
                    );
                    if let Some(body) = v.child_by_field_name("body") {
                        self.extract_class_members(&body, &qualified, 1);
                    }
                }
                _ => {
                    let mut signature = format!("{} {}", keyword, name);
                    if let Some(ty) = self.ctx.get_field_text(&declarator, "type") {
                        signature.push_str(&type_annotation(&ty));
                    }
                    let kind = if keyword == "const" {
                        SymbolKind::Constant
                    } else {
                        SymbolKind::Variable
                    };
                    let default_value = value.and_then(|v| literal_value(self.ctx, &v));
                    self.push(
                        &declarator,
                        &name,
                        kind,
                        parent,
                        SymbolOptions {
                            signature: Some(signature),
                            docstring,
                            is_exported: Some(exported),
                            default_value,
                            ..Default::default()
                        },
                    );
                }
            }
        }
    }

    fn push_callable(
        &mut self,
        node: &Node,
        name: &str,
        parent: Option<&str>,
        exported: bool,
        signature: String,
        docstring: Option<String>,
    ) {
        self.push(
            node,
            name,
            SymbolKind::Function,
            parent,
            SymbolOptions {
                signature: Some(signature),
                docstring,
                is_exported: Some(exported),
                ..Default::default()
            },
        );
    }

    /// CommonJS exports: `module.exports.name = ...` and `exports.name = ...`
    fn extract_module_exports(&mut self, node: Node, parent: Option<&str>) {
        let Some(assignment) = self.ctx.find_child_by_type(&node, "assignment_expression") else {
            return;
        };
        let (Some(left), Some(right)) = (
            assignment.child_by_field_name("left"),
            assignment.child_by_field_name("right"),
        ) else {
            return;
        };
        if left.kind() != "member_expression" {
            return;
        }
        let target = self.ctx.get_node_text(&left);
        let Some(name) = target
            .strip_prefix("module.exports.")
            .or_else(|| target.strip_prefix("exports."))
        else {
            return;
        };
        if name.is_empty() || name.contains('.') {
            return;
        }
        let kind = match right.kind() {
            "arrow_function" | "function_expression" | "function" => SymbolKind::Function,
            "class" => SymbolKind::Class,
            _ => SymbolKind::Variable,
        };
        let name = name.to_string();
        self.push(
            &assignment,
            &name,
            kind,
            parent,
            SymbolOptions {
                signature: Some(self.ctx.get_signature(&assignment).unwrap_or_else(|| target.clone())),
                docstring: jsdoc(self.ctx, &node),
                is_exported: Some(true),
                ..Default::default()
            },
        );
    }

    /// `: Type` return annotation (TypeScript only; JavaScript has none)
    fn return_type(&self, node: &Node) -> Option<String> {
        self.ctx
            .get_field_text(node, "return_type")
            .map(|ret| type_annotation(&ret))
    }
}

/// Normalize a type annotation to `: Type`
pub(crate) fn type_annotation(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.strip_prefix(':') {
        Some(rest) => format!(": {}", rest.trim()),
        None => format!(": {}", trimmed),
    }
}

/// True if `node` has a direct anonymous child token `token`
pub(crate) fn has_token(node: &Node, token: &str) -> bool {
    children(node).iter().any(|c| !c.is_named() && c.kind() == token)
}

/// Decorators attached to a node, as children or as preceding class-body siblings
fn with_decorators(ctx: &ExtractionContext, node: &Node, signature: String) -> String {
    let mut decorators: Vec<String> = Vec::new();
    let mut prev = node.prev_named_sibling();
    while let Some(sibling) = prev {
        if sibling.kind() != "decorator" {
            break;
        }
        decorators.push(ctx.get_node_text(&sibling));
        prev = sibling.prev_named_sibling();
    }
    decorators.reverse();
    decorators.extend(
        children(node)
            .iter()
            .filter(|c| c.kind() == "decorator")
            .map(|c| ctx.get_node_text(c)),
    );
    if decorators.is_empty() {
        signature
    } else {
        format!("{}\n{}", decorators.join("\n"), signature)
    }
}

/// Access modifier if present, else naming convention (`#x` private, `_x` protected)
fn member_visibility(ctx: &ExtractionContext, node: &Node, name: &str) -> Visibility {
    if let Some(modifier) = ctx.find_child_by_type(node, "accessibility_modifier") {
        if let Some(vis) = Visibility::from_keyword(ctx.get_node_text(&modifier).trim()) {
            return vis;
        }
    }
    if name.starts_with('#') {
        Visibility::Private
    } else if name.starts_with('_') {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

/// Nearest `/** ... */` block above a declaration (or above its `export`)
pub(crate) fn jsdoc(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let anchor = match node.parent() {
        Some(p) if p.kind() == "export_statement" => p,
        _ => *node,
    };
    let mut prev = anchor.prev_sibling();
    while let Some(sibling) = prev {
        match sibling.kind() {
            "decorator" => prev = sibling.prev_sibling(),
            "comment" => {
                let text = ctx.get_node_text(&sibling);
                return text
                    .trim_start()
                    .starts_with("/**")
                    .then(|| strip_comment_markers(&text))
                    .filter(|doc| !doc.is_empty());
            }
            _ => return None,
        }
    }
    None
}

/// Literal text for simple initializers
fn literal_value(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    match node.kind() {
        "string" | "number" | "true" | "false" | "null" | "undefined" | "template_string" => {
            let text = ctx.get_node_text(node);
            (text.len() <= ctx.config.literal_max_len).then_some(text)
        }
        "unary_expression" => {
            let text = ctx.get_node_text(node);
            let digits = text.trim_start_matches('-').trim();
            (!digits.is_empty() && digits.parse::<f64>().is_ok()).then_some(text)
        }
        _ => None,
    }
}
