// Lookup tables driving the generic engine
//
// Node-type vocabularies are shared across grammars. Inheritance, trait and
// property rules are keyed by language name; a missing entry disables that
// pass for the language.

use crate::extractors::base::SymbolKind;

pub(crate) const FUNCTION_TYPES: &[&str] = &[
    "function_definition",
    "function_declaration",
    "method_definition",
    "method_declaration",
    "function_item",
    "fn_item",
    "function",
    "singleton_method",
    "method",
];

pub(crate) const CLASS_TYPES: &[&str] = &[
    "class_definition",
    "class_declaration",
    "class_specifier",
    "class",
    "module",
    "struct_item",
    "struct_specifier",
];

pub(crate) const INTERFACE_TYPES: &[&str] = &[
    "interface_declaration",
    "trait_item",
    "protocol_declaration",
    "trait_declaration",
];

pub(crate) const ENUM_TYPES: &[&str] = &["enum_declaration", "enum_specifier", "enum_item"];

pub(crate) const MODULE_TYPES: &[&str] = &[
    "module_definition",
    "module_declaration",
    "mod_item",
    "namespace_definition",
    "package_declaration",
];

/// Containers whose children form a declaration body
pub(crate) const CLASS_BODY_TYPES: &[&str] = &[
    "declaration_list",
    "class_body",
    "block",
    "body",
    "field_declaration_list",
    "enum_body",
    "enum_class_body",
    "protocol_body",
];

/// Child kinds accepted as a declaration name when there is no `name` field
pub(crate) const NAME_CHILD_TYPES: &[&str] = &[
    "identifier",
    "type_identifier",
    "simple_identifier",
    "constant",
    "property_identifier",
    "field_identifier",
];

pub(crate) const CALL_TYPES: &[&str] = &["call_expression", "call", "method_invocation"];

/// Callee node kinds when a call has no `function`/`method` field
pub(crate) const CALLEE_TYPES: &[&str] = &[
    "identifier",
    "simple_identifier",
    "member_expression",
    "navigation_expression",
    "attribute",
    "scoped_identifier",
    "field_expression",
];

/// Statement wrappers looked through when matching property declarations
/// (`expression_statement > assignment` in Python)
pub(crate) const STATEMENT_WRAPPER_TYPES: &[&str] = &["expression_statement"];

pub(crate) const COMMENT_TYPES: &[&str] =
    &["comment", "block_comment", "line_comment", "multiline_comment"];

/// Node kinds whose text is kept verbatim as a `default_value`
pub(crate) const LITERAL_TYPES: &[&str] = &[
    "string",
    "encapsed_string",
    "string_content",
    "string_literal",
    "interpreted_string_literal",
    "raw_string_literal",
    "number",
    "integer",
    "float",
    "integer_literal",
    "float_literal",
    "decimal_integer_literal",
    "decimal_floating_point_literal",
    "true",
    "false",
    "boolean",
    "null",
    "nil",
    "none",
    "None",
    "number_literal",
];

/// String kinds that may wrap a `string_content` child
pub(crate) const STRING_TYPES: &[&str] = &[
    "string",
    "encapsed_string",
    "string_literal",
    "interpreted_string_literal",
    "raw_string_literal",
];

/// Map a node type onto the shared declaration vocabulary
pub(crate) fn classify(kind: &str) -> Option<SymbolKind> {
    if FUNCTION_TYPES.contains(&kind) {
        Some(SymbolKind::Function)
    } else if CLASS_TYPES.contains(&kind) {
        Some(SymbolKind::Class)
    } else if INTERFACE_TYPES.contains(&kind) {
        Some(SymbolKind::Interface)
    } else if ENUM_TYPES.contains(&kind) {
        Some(SymbolKind::Enum)
    } else if MODULE_TYPES.contains(&kind) {
        Some(SymbolKind::Module)
    } else {
        None
    }
}

/// Where a class declaration names its superclass(es)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExtendsRule {
    /// One superclass: first `name_child` inside the `parent_type` child
    Single {
        parent_type: &'static str,
        name_child: &'static str,
    },
    /// Several bases: every direct child of `parent_type` in `name_children`
    Multiple {
        parent_type: &'static str,
        name_children: &'static [&'static str],
    },
}

pub(crate) fn extends_rule(language: &str) -> Option<ExtendsRule> {
    use ExtendsRule::*;
    let rule = match language {
        "php" => Single {
            parent_type: "base_clause",
            name_child: "name",
        },
        "python" => Multiple {
            parent_type: "argument_list",
            name_children: &["identifier"],
        },
        "java" => Single {
            parent_type: "superclass",
            name_child: "type_identifier",
        },
        "typescript" | "tsx" => Single {
            parent_type: "extends_clause",
            name_child: "identifier",
        },
        "javascript" => Single {
            parent_type: "class_heritage",
            name_child: "identifier",
        },
        "kotlin" => Single {
            parent_type: "delegation_specifier",
            name_child: "user_type",
        },
        "ruby" => Single {
            parent_type: "superclass",
            name_child: "constant",
        },
        _ => return None,
    };
    Some(rule)
}

/// Where trait/interface implementations are declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TraitRule {
    /// Statement inside the class body (`use SomeTrait;`), emits `uses_trait`
    BodyDeclaration {
        node_type: &'static str,
        name_child: &'static str,
    },
    /// Clause on the declaration (`implements A, B`), emits `implements`
    Clause {
        parent_type: &'static str,
        name_children: &'static [&'static str],
    },
    /// Standalone block (`impl Trait for Type`), emits `implements` from the
    /// implementing type
    ImplBlock {
        node_type: &'static str,
        trait_field: &'static str,
        type_field: &'static str,
    },
}

pub(crate) fn trait_rule(language: &str) -> Option<TraitRule> {
    use TraitRule::*;
    let rule = match language {
        "php" => BodyDeclaration {
            node_type: "use_declaration",
            name_child: "name",
        },
        "java" => Clause {
            parent_type: "super_interfaces",
            name_children: &["type_identifier"],
        },
        "typescript" | "tsx" => Clause {
            parent_type: "implements_clause",
            name_children: &["type_identifier"],
        },
        "rust" => ImplBlock {
            node_type: "impl_item",
            trait_field: "trait",
            type_field: "type",
        },
        _ => return None,
    };
    Some(rule)
}

/// How a property declaration names itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropertyName {
    /// Field name, or a child/grandchild of that type
    Field(&'static str),
    /// First child of this type (its `name` field or first identifier)
    Child(&'static str),
    /// Plain identifier on the left of an assignment
    AssignmentTarget,
}

/// How a property's visibility is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropertyVisibility {
    /// Modifier keywords on the declaration
    Modifiers,
    /// `__x` private, `_x` protected, dunders public
    Underscore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PropertyRule {
    pub node_type: &'static str,
    pub name: PropertyName,
    pub visibility: PropertyVisibility,
}

pub(crate) fn property_rule(language: &str) -> Option<PropertyRule> {
    use PropertyName::*;
    let (node_type, name) = match language {
        "php" => ("property_declaration", Field("variable_name")),
        "python" => ("assignment", AssignmentTarget),
        "java" => ("field_declaration", Child("variable_declarator")),
        "typescript" | "tsx" => ("public_field_definition", Child("property_identifier")),
        "javascript" => ("field_definition", Child("property_identifier")),
        "go" => ("field_declaration", Child("field_identifier")),
        "kotlin" => ("property_declaration", Field("variable_declaration")),
        _ => return None,
    };
    let visibility = if name == AssignmentTarget {
        PropertyVisibility::Underscore
    } else {
        PropertyVisibility::Modifiers
    };
    Some(PropertyRule {
        node_type,
        name,
        visibility,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_vocabulary() {
        assert_eq!(classify("function_item"), Some(SymbolKind::Function));
        assert_eq!(classify("struct_specifier"), Some(SymbolKind::Class));
        assert_eq!(classify("trait_item"), Some(SymbolKind::Interface));
        assert_eq!(classify("enum_item"), Some(SymbolKind::Enum));
        assert_eq!(classify("mod_item"), Some(SymbolKind::Module));
        assert_eq!(classify("element"), None);
    }

    #[test]
    fn test_rules_are_keyed_by_language() {
        assert!(matches!(
            extends_rule("python"),
            Some(ExtendsRule::Multiple { parent_type: "argument_list", .. })
        ));
        assert!(extends_rule("go").is_none());
        assert!(matches!(trait_rule("rust"), Some(TraitRule::ImplBlock { .. })));
        assert_eq!(
            property_rule("python").map(|r| r.visibility),
            Some(PropertyVisibility::Underscore)
        );
        assert!(property_rule("html").is_none());
    }
}
