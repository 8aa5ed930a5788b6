/// Symbol extraction for Python: classes, functions, methods, assignments
use crate::extractors::base::{
    children, node_text, qualify, ExtractionContext, Symbol, SymbolKind, SymbolOptions,
    Visibility,
};
use std::collections::HashSet;
use tree_sitter::Node;

/// Walk a module and collect every declaration site
pub fn extract_symbols(ctx: &ExtractionContext, root: Node) -> Vec<Symbol> {
    let mut walker = SymbolWalker {
        ctx,
        dunder_all: find_dunder_all(ctx, &root),
        symbols: Vec::new(),
    };
    walker.walk(root, None, 0);
    walker.symbols
}

struct SymbolWalker<'c, 'a> {
    ctx: &'c ExtractionContext<'a>,
    /// Names listed in a module-level `__all__`, when one exists
    dunder_all: Option<HashSet<String>>,
    symbols: Vec<Symbol>,
}

impl SymbolWalker<'_, '_> {
    fn walk(&mut self, node: Node, parent: Option<&str>, depth: usize) {
        if self.ctx.depth_exceeded(depth, self.ctx.config.max_walk_depth) {
            return;
        }
        for child in children(&node) {
            match child.kind() {
                "function_definition" => self.extract_function(child, None, parent),
                "class_definition" => self.extract_class(child, None, parent, depth),
                "decorated_definition" => {
                    if let Some(def) = child.child_by_field_name("definition") {
                        match def.kind() {
                            "function_definition" => self.extract_function(def, Some(child), parent),
                            "class_definition" => {
                                self.extract_class(def, Some(child), parent, depth)
                            }
                            _ => {}
                        }
                    }
                }
                "assignment" => self.extract_assignment(child, parent),
                "expression_statement" => {
                    for sub in children(&child) {
                        if sub.kind() == "assignment" {
                            self.extract_assignment(sub, parent);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn extract_function(&mut self, node: Node, decorated: Option<Node>, parent: Option<&str>) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let mut signature = format!(
            "def {}({})",
            name,
            self.ctx.params_text(node.child_by_field_name("parameters"))
        );
        if let Some(ret) = self.ctx.get_field_text(&node, "return_type") {
            signature.push_str(" -> ");
            signature.push_str(&ret);
        }
        let signature = self.with_decorators(decorated.unwrap_or(node), signature);

        let kind = if parent.is_some() {
            SymbolKind::Method
        } else {
            SymbolKind::Function
        };
        let qualified = qualify(parent, &name, ".");
        let outer = decorated.unwrap_or(node);
        let symbol = Symbol::new(
            name.clone(),
            kind,
            self.ctx.start_line(&outer),
            self.ctx.end_line(&node),
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(signature),
                docstring: body_docstring(&node, self.ctx.source),
                visibility: Some(visibility(&name)),
                is_exported: Some(self.is_exported(&name)),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        );
        self.symbols.push(symbol);

        if name == "__init__" {
            if let Some(class_name) = parent {
                self.extract_init_attributes(&node, class_name);
            }
        }
    }

    fn extract_class(
        &mut self,
        node: Node,
        decorated: Option<Node>,
        parent: Option<&str>,
        depth: usize,
    ) {
        let Some(name) = self.ctx.get_field_text(&node, "name") else {
            return;
        };
        let mut signature = format!("class {}", name);
        if let Some(bases) = self.ctx.get_field_text(&node, "superclasses") {
            if bases.starts_with('(') {
                signature.push_str(&bases);
            } else {
                signature.push_str(&format!("({})", bases));
            }
        }
        let signature = self.with_decorators(decorated.unwrap_or(node), signature);

        let qualified = qualify(parent, &name, ".");
        let outer = decorated.unwrap_or(node);
        self.symbols.push(Symbol::new(
            name.clone(),
            SymbolKind::Class,
            self.ctx.start_line(&outer),
            self.ctx.end_line(&node),
            SymbolOptions {
                qualified_name: Some(qualified.clone()),
                signature: Some(signature),
                docstring: body_docstring(&node, self.ctx.source),
                visibility: Some(visibility(&name)),
                is_exported: Some(self.is_exported(&name)),
                parent_name: parent.map(str::to_string),
                ..Default::default()
            },
        ));

        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body, Some(&qualified), depth + 1);
        }
    }

    fn extract_assignment(&mut self, node: Node, parent: Option<&str>) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        let name = self.ctx.get_node_text(&left);
        // Complex targets (self.x, a.b, a[0]) are not declarations
        if name.contains('.') || name.contains('[') || name == "__all__" {
            return;
        }
        let right = node.child_by_field_name("right");

        match parent {
            None => {
                let signature = match right {
                    Some(r) => {
                        let value: String = self.ctx.get_node_text(&r).chars().take(80).collect();
                        format!("{} = {}", name, value)
                    }
                    None => name.clone(),
                };
                let kind = if is_upper_name(&name) {
                    SymbolKind::Constant
                } else {
                    SymbolKind::Variable
                };
                self.symbols.push(self.ctx.symbol(
                    &node,
                    name.clone(),
                    kind,
                    SymbolOptions {
                        signature: Some(signature),
                        visibility: Some(visibility(&name)),
                        is_exported: Some(self.is_exported(&name)),
                        ..Default::default()
                    },
                ));
            }
            Some(class_name) => {
                let default_value = right.and_then(|r| literal_value(self.ctx, &r));
                self.symbols.push(self.ctx.symbol(
                    &node,
                    name.clone(),
                    SymbolKind::Property,
                    SymbolOptions {
                        qualified_name: Some(qualify(Some(class_name), &name, ".")),
                        visibility: Some(visibility(&name)),
                        parent_name: Some(class_name.to_string()),
                        default_value,
                        ..Default::default()
                    },
                ));
            }
        }
    }

    /// `self.attr = value` inside `__init__`, first assignment per attribute wins
    fn extract_init_attributes(&mut self, init: &Node, class_name: &str) {
        let Some(body) = init.child_by_field_name("body") else {
            return;
        };
        let mut seen: HashSet<String> = self
            .symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Property && s.parent_name.as_deref() == Some(class_name))
            .map(|s| s.name.clone())
            .collect();

        for node in self.ctx.descendants(&body, self.ctx.config.max_walk_depth) {
            if node.kind() != "assignment" {
                continue;
            }
            // Nested defs own their own `self`
            if self.has_def_between(&node, init) {
                continue;
            }
            let Some(left) = node.child_by_field_name("left") else {
                continue;
            };
            if left.kind() != "attribute" {
                continue;
            }
            let object = left.child_by_field_name("object").map(|o| self.ctx.get_node_text(&o));
            if object.as_deref() != Some("self") {
                continue;
            }
            let Some(attr) = self.ctx.get_field_text(&left, "attribute") else {
                continue;
            };
            if !seen.insert(attr.clone()) {
                continue;
            }
            let default_value = node
                .child_by_field_name("right")
                .and_then(|r| literal_value(self.ctx, &r));
            self.symbols.push(self.ctx.symbol(
                &node,
                attr.clone(),
                SymbolKind::Property,
                SymbolOptions {
                    qualified_name: Some(qualify(Some(class_name), &attr, ".")),
                    visibility: Some(visibility(&attr)),
                    parent_name: Some(class_name.to_string()),
                    default_value,
                    ..Default::default()
                },
            ));
        }
    }

    fn has_def_between(&self, node: &Node, init: &Node) -> bool {
        let mut current = node.parent();
        while let Some(p) = current {
            if p.id() == init.id() {
                return false;
            }
            if matches!(p.kind(), "function_definition" | "class_definition" | "lambda") {
                return true;
            }
            current = p.parent();
        }
        false
    }

    fn with_decorators(&self, outer: Node, signature: String) -> String {
        let decorators: Vec<String> = children(&outer)
            .iter()
            .filter(|c| c.kind() == "decorator")
            .map(|c| self.ctx.get_node_text(c))
            .collect();
        if decorators.is_empty() {
            signature
        } else {
            format!("{}\n{}", decorators.join("\n"), signature)
        }
    }

    fn is_exported(&self, name: &str) -> bool {
        match &self.dunder_all {
            Some(all) => all.contains(name),
            None => !name.starts_with('_'),
        }
    }
}

fn visibility(name: &str) -> Visibility {
    if name.starts_with('_') {
        Visibility::Private
    } else {
        Visibility::Public
    }
}

/// At least one cased character and no lowercase ones
fn is_upper_name(name: &str) -> bool {
    name.chars().any(|c| c.is_alphabetic()) && !name.chars().any(|c| c.is_lowercase())
}

/// First string statement of a definition body
pub fn body_docstring(node: &Node, source: &[u8]) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    for child in children(&body) {
        match child.kind() {
            "expression_statement" => {
                return children(&child)
                    .into_iter()
                    .find(|sub| sub.kind() == "string")
                    .map(|s| string_content(&s, source));
            }
            "string" => return Some(string_content(&child, source)),
            "comment" => continue,
            _ => return None,
        }
    }
    None
}

/// Contents of a string node without quotes
pub fn string_content(node: &Node, source: &[u8]) -> String {
    if let Some(content) = children(node)
        .into_iter()
        .find(|c| c.kind() == "string_content")
    {
        return node_text(&content, source).trim().to_string();
    }
    let text = node_text(node, source);
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if text.len() >= 2 * quote.len() && text.starts_with(quote) && text.ends_with(quote) {
            return text[quote.len()..text.len() - quote.len()].trim().to_string();
        }
    }
    text
}

fn find_dunder_all(ctx: &ExtractionContext, root: &Node) -> Option<HashSet<String>> {
    for child in children(root) {
        let assignments = match child.kind() {
            "assignment" => vec![child],
            "expression_statement" => children(&child)
                .into_iter()
                .filter(|s| s.kind() == "assignment")
                .collect(),
            _ => continue,
        };
        for assignment in assignments {
            let left = assignment.child_by_field_name("left");
            let right = assignment.child_by_field_name("right");
            if let (Some(left), Some(right)) = (left, right) {
                if ctx.get_node_text(&left) == "__all__" {
                    return Some(parse_all_list(ctx, &right));
                }
            }
        }
    }
    None
}

fn parse_all_list(ctx: &ExtractionContext, node: &Node) -> HashSet<String> {
    let mut names = HashSet::new();
    if node.kind() == "list" {
        for child in children(node) {
            if child.kind() == "string" {
                let content = string_content(&child, ctx.source);
                if !content.is_empty() {
                    names.insert(content);
                }
            }
        }
    }
    names
}

/// Literal text for simple right-hand sides, `None` for anything computed
fn literal_value(ctx: &ExtractionContext, node: &Node) -> Option<String> {
    let max = ctx.config.literal_max_len;
    match node.kind() {
        "string" | "integer" | "float" | "true" | "false" | "none" | "concatenated_string" => {
            let text = ctx.get_node_text(node);
            (text.len() <= max).then_some(text)
        }
        "unary_operator" => {
            let text = ctx.get_node_text(node);
            let digits = text.trim_start_matches('-').trim().replace('.', "");
            (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())).then_some(text)
        }
        "list" | "tuple" | "dictionary" => {
            let text = ctx.get_node_text(node);
            (text.len() <= 80).then_some(text)
        }
        _ => None,
    }
}
