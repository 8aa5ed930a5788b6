// Tree navigation methods for ExtractionContext
//
// Thin wrappers over tree-sitter's child iteration. Every recursive helper
// takes an explicit depth budget.

use super::extractor::ExtractionContext;
use tree_sitter::Node;

/// Byte-range slice of the source, lossily decoded
pub fn node_text(node: &Node, source: &[u8]) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    if start <= end && end <= source.len() {
        String::from_utf8_lossy(&source[start..end]).into_owned()
    } else {
        String::new()
    }
}

/// First line of the node text, trailing `{` / `:` stripped
pub fn first_line_signature(node: &Node, source: &[u8]) -> Option<String> {
    let text = node_text(node, source);
    let line = text.lines().next()?.trim();
    let line = line
        .strip_suffix('{')
        .or_else(|| line.strip_suffix(':'))
        .unwrap_or(line)
        .trim_end();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Direct children of a node, named and anonymous
pub fn children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

impl<'a> ExtractionContext<'a> {
    /// Get field text safely
    pub fn get_field_text(&self, node: &Node, field_name: &str) -> Option<String> {
        node.child_by_field_name(field_name)
            .map(|field_node| self.get_node_text(&field_node))
    }

    /// Find first child by type
    pub fn find_child_by_type<'t>(&self, node: &Node<'t>, child_type: &str) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find(|c| c.kind() == child_type);
        found
    }

    /// Find first child whose type is in `types`
    pub fn find_child_by_types<'t>(&self, node: &Node<'t>, types: &[&str]) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find(|c| types.contains(&c.kind()));
        found
    }

    /// Find children by type
    pub fn find_children_by_type<'t>(&self, node: &Node<'t>, child_type: &str) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|c| c.kind() == child_type)
            .collect()
    }

    /// Find parent of type
    pub fn find_parent_of_type<'t>(&self, node: &Node<'t>, parent_type: &str) -> Option<Node<'t>> {
        let mut current = node.parent();
        while let Some(parent) = current {
            if parent.kind() == parent_type {
                return Some(parent);
            }
            current = parent.parent();
        }
        None
    }

    /// True if any ancestor has a type in `types`
    pub fn has_ancestor_of_types(&self, node: &Node, types: &[&str]) -> bool {
        let mut current = node.parent();
        while let Some(parent) = current {
            if types.contains(&parent.kind()) {
                return true;
            }
            current = parent.parent();
        }
        false
    }

    /// Depth-first descendants (excluding `node`), bounded by `max_depth`
    pub fn descendants<'t>(&self, node: &Node<'t>, max_depth: usize) -> Vec<Node<'t>> {
        let mut out = Vec::new();
        collect_descendants(node, max_depth, 0, &mut out);
        out
    }

    /// First descendant whose type is in `types`
    pub fn find_descendant_by_types<'t>(
        &self,
        node: &Node<'t>,
        types: &[&str],
        max_depth: usize,
    ) -> Option<Node<'t>> {
        self.descendants(node, max_depth)
            .into_iter()
            .find(|n| types.contains(&n.kind()))
    }

    /// Text of the first child of `child_type`, searching one level deeper
    /// when no direct child matches
    pub fn find_child_text(&self, node: &Node, child_type: &str) -> Option<String> {
        if let Some(child) = self.find_child_by_type(node, child_type) {
            return Some(self.get_node_text(&child));
        }
        for child in children(node) {
            if let Some(sub) = self.find_child_by_type(&child, child_type) {
                return Some(self.get_node_text(&sub));
            }
        }
        None
    }

    /// Contiguous comment siblings immediately preceding `node`, in source order
    pub fn preceding_comments(&self, node: &Node, comment_types: &[&str]) -> Vec<String> {
        let mut comments = Vec::new();
        let mut prev = node.prev_sibling();
        while let Some(sibling) = prev {
            if !comment_types.contains(&sibling.kind()) {
                break;
            }
            comments.push(self.get_node_text(&sibling).trim().to_string());
            prev = sibling.prev_sibling();
        }
        comments.reverse();
        comments
    }
}

fn collect_descendants<'t>(node: &Node<'t>, max_depth: usize, depth: usize, out: &mut Vec<Node<'t>>) {
    if depth >= max_depth {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        out.push(child);
        collect_descendants(&child, max_depth, depth + 1, out);
    }
}

/// Remove `//`, `///`, `/* */`, `/** */`, `#` markers from a comment block
pub fn strip_comment_markers(text: &str) -> String {
    let mut t = text.trim();
    for prefix in ["/**", "/*", "///", "//!", "//", "#"] {
        if let Some(rest) = t.strip_prefix(prefix) {
            t = rest;
            break;
        }
    }
    let t = t.strip_suffix("*/").unwrap_or(t);
    t.lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use tree_sitter::Parser;

    fn parse_rust(code: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .unwrap();
        parser.parse(code, None).unwrap()
    }

    #[test]
    fn test_first_line_signature_strips_brace() {
        let code = "fn main() {\n    run();\n}\n";
        let tree = parse_rust(code);
        let func = tree.root_node().child(0).unwrap();
        assert_eq!(
            first_line_signature(&func, code.as_bytes()).as_deref(),
            Some("fn main()")
        );
    }

    #[test]
    fn test_preceding_comments_in_order() {
        let code = "// one\n// two\nfn f() {}\n";
        let tree = parse_rust(code);
        let config = ExtractorConfig::default();
        let ctx = ExtractionContext::new("rust", "a.rs", code.as_bytes(), &config);
        let func = ctx
            .find_child_by_type(&tree.root_node(), "function_item")
            .unwrap();
        assert_eq!(ctx.preceding_comments(&func, &["line_comment"]), vec!["// one", "// two"]);
    }

    #[test]
    fn test_descendants_respects_depth() {
        let code = "fn f() { g(h(i(1))); }";
        let tree = parse_rust(code);
        let config = ExtractorConfig::default();
        let ctx = ExtractionContext::new("rust", "a.rs", code.as_bytes(), &config);
        let shallow = ctx.descendants(&tree.root_node(), 2);
        let deep = ctx.descendants(&tree.root_node(), 64);
        assert!(shallow.len() < deep.len());
        assert!(deep.iter().any(|n| n.kind() == "integer_literal"));
    }

    #[test]
    fn test_strip_comment_markers() {
        assert_eq!(strip_comment_markers("/** Adds two numbers. */"), "Adds two numbers.");
        assert_eq!(strip_comment_markers("# note"), "note");
        assert_eq!(strip_comment_markers("/*\n * a\n * b\n */"), "a\nb");
    }
}
