// Base Extractor Types
//
// The two records every backend produces (Symbol, Reference) plus their kind
// enums. Both records are plain values: built fresh per extraction call and
// never mutated after they are handed back.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A declaration site extracted from source code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Symbol {
    /// Symbol name as it appears in code
    pub name: String,
    /// Full scoped path (`Outer.Inner.method`, `ns::Type`, `App\Models\User`)
    pub qualified_name: String,
    /// Kind of symbol (function, class, ...)
    pub kind: SymbolKind,
    /// Display signature, not executable
    pub signature: Option<String>,
    /// Start line (1-based, inclusive)
    pub line_start: u32,
    /// End line (1-based, inclusive)
    pub line_end: u32,
    /// Documentation comment or docstring
    pub docstring: Option<String>,
    pub visibility: Visibility,
    /// Language-specific exportedness
    pub is_exported: bool,
    /// `qualified_name` of the enclosing symbol
    pub parent_name: Option<String>,
    /// Literal default value for fields/properties/constants
    pub default_value: Option<String>,
}

impl Symbol {
    /// Build a symbol from its required fields plus options.
    ///
    /// `qualified_name` falls back to `name`, visibility to public and
    /// `is_exported` to true. `line_end` is clamped so `line_start <= line_end`.
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        line_start: u32,
        line_end: u32,
        options: SymbolOptions,
    ) -> Self {
        let name = name.into();
        let line_start = line_start.max(1);
        Self {
            qualified_name: options.qualified_name.unwrap_or_else(|| name.clone()),
            name,
            kind,
            signature: options.signature,
            line_start,
            line_end: line_end.max(line_start),
            docstring: options.docstring,
            visibility: options.visibility.unwrap_or(Visibility::Public),
            is_exported: options.is_exported.unwrap_or(true),
            parent_name: options.parent_name,
            default_value: options.default_value,
        }
    }
}

/// Options for creating symbols
#[derive(Debug, Clone, Default)]
pub struct SymbolOptions {
    pub qualified_name: Option<String>,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub visibility: Option<Visibility>,
    pub is_exported: Option<bool>,
    pub parent_name: Option<String>,
    pub default_value: Option<String>,
}

/// A use site, unresolved at this layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Qualified name of the enclosing scope, `None` at file level
    pub source_name: Option<String>,
    /// Free-text name being referenced
    pub target_name: String,
    pub kind: ReferenceKind,
    /// 1-based line of the use site
    pub line: u32,
    /// Module path for import/require-style references
    pub import_path: Option<String>,
}

impl Reference {
    pub fn new(
        kind: ReferenceKind,
        target_name: impl Into<String>,
        line: u32,
        source_name: Option<&str>,
    ) -> Self {
        Self {
            source_name: source_name.map(str::to_string),
            target_name: target_name.into(),
            kind,
            line,
            import_path: None,
        }
    }

    pub fn with_import_path(mut self, path: impl Into<String>) -> Self {
        self.import_path = Some(path.into());
        self
    }
}

/// Symbol kinds
///
/// Open enum: domain-specific kinds that have no dedicated variant travel as
/// `Other` and serialize as their raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Method,
    Constructor,
    Class,
    Interface,
    Struct,
    Enum,
    Trait,
    Module,
    Variable,
    Constant,
    Field,
    Property,
    TypeAlias,
    Event,
    Delegate,
    Trigger,
    Page,
    Component,
    Application,
    Design,
    Rule,
    Other(String),
}

impl SymbolKind {
    pub fn as_str(&self) -> &str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::Trait => "trait",
            SymbolKind::Module => "module",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Field => "field",
            SymbolKind::Property => "property",
            SymbolKind::TypeAlias => "type_alias",
            SymbolKind::Event => "event",
            SymbolKind::Delegate => "delegate",
            SymbolKind::Trigger => "trigger",
            SymbolKind::Page => "page",
            SymbolKind::Component => "component",
            SymbolKind::Application => "application",
            SymbolKind::Design => "design",
            SymbolKind::Rule => "rule",
            SymbolKind::Other(s) => s.as_str(),
        }
    }

    /// Convert from string representation (for database deserialization)
    pub fn from_string(s: &str) -> Self {
        match s {
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "constructor" => SymbolKind::Constructor,
            "class" => SymbolKind::Class,
            "interface" => SymbolKind::Interface,
            "struct" => SymbolKind::Struct,
            "enum" => SymbolKind::Enum,
            "trait" => SymbolKind::Trait,
            "module" => SymbolKind::Module,
            "variable" => SymbolKind::Variable,
            "constant" => SymbolKind::Constant,
            "field" => SymbolKind::Field,
            "property" => SymbolKind::Property,
            "type_alias" => SymbolKind::TypeAlias,
            "event" => SymbolKind::Event,
            "delegate" => SymbolKind::Delegate,
            "trigger" => SymbolKind::Trigger,
            "page" => SymbolKind::Page,
            "component" => SymbolKind::Component,
            "application" => SymbolKind::Application,
            "design" => SymbolKind::Design,
            "rule" => SymbolKind::Rule,
            other => SymbolKind::Other(other.to_string()),
        }
    }

    /// Kinds that own a body of nested declarations
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Interface
                | SymbolKind::Struct
                | SymbolKind::Enum
                | SymbolKind::Trait
                | SymbolKind::Module
        )
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SymbolKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SymbolKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SymbolKind::from_string(&s))
    }
}

/// Reference kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Call,
    Import,
    Inherits,
    Implements,
    UsesTrait,
    TypeRef,
    Reference,
    Soql,
    Label,
    Controller,
    MergeField,
    Include,
    ComponentRef,
    MetadataRef,
    FormulaRef,
    Other(String),
}

impl ReferenceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ReferenceKind::Call => "call",
            ReferenceKind::Import => "import",
            ReferenceKind::Inherits => "inherits",
            ReferenceKind::Implements => "implements",
            ReferenceKind::UsesTrait => "uses_trait",
            ReferenceKind::TypeRef => "type_ref",
            ReferenceKind::Reference => "reference",
            ReferenceKind::Soql => "soql",
            ReferenceKind::Label => "label",
            ReferenceKind::Controller => "controller",
            ReferenceKind::MergeField => "merge_field",
            ReferenceKind::Include => "include",
            ReferenceKind::ComponentRef => "component_ref",
            ReferenceKind::MetadataRef => "metadata_ref",
            ReferenceKind::FormulaRef => "formula_ref",
            ReferenceKind::Other(s) => s.as_str(),
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "call" => ReferenceKind::Call,
            "import" => ReferenceKind::Import,
            "inherits" => ReferenceKind::Inherits,
            "implements" => ReferenceKind::Implements,
            "uses_trait" => ReferenceKind::UsesTrait,
            "type_ref" => ReferenceKind::TypeRef,
            "reference" => ReferenceKind::Reference,
            "soql" => ReferenceKind::Soql,
            "label" => ReferenceKind::Label,
            "controller" => ReferenceKind::Controller,
            "merge_field" => ReferenceKind::MergeField,
            "include" => ReferenceKind::Include,
            "component_ref" => ReferenceKind::ComponentRef,
            "metadata_ref" => ReferenceKind::MetadataRef,
            "formula_ref" => ReferenceKind::FormulaRef,
            other => ReferenceKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReferenceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReferenceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ReferenceKind::from_string(&s))
    }
}

/// Visibility levels for symbols
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
    Package,
}

impl Visibility {
    /// Parse a modifier keyword; `global`/`open` count as public.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "public" | "global" | "open" => Some(Visibility::Public),
            "private" | "fileprivate" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            "internal" => Some(Visibility::Internal),
            "package" => Some(Visibility::Package),
            _ => None,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Package => write!(f, "package"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_defaults() {
        let sym = Symbol::new("run", SymbolKind::Function, 4, 2, SymbolOptions::default());
        assert_eq!(sym.qualified_name, "run");
        assert_eq!(sym.visibility, Visibility::Public);
        assert!(sym.is_exported);
        assert_eq!(sym.line_start, 4);
        assert_eq!(sym.line_end, 4, "line_end is clamped to line_start");
    }

    #[test]
    fn test_open_kinds_serialize_as_strings() {
        let sym = Symbol::new(
            "Account.Name",
            SymbolKind::Other("custom_field".to_string()),
            1,
            1,
            SymbolOptions::default(),
        );
        let json = serde_json::to_value(&sym).unwrap();
        assert_eq!(json["kind"], "custom_field");
        assert_eq!(json["visibility"], "public");

        let back: Symbol = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, SymbolKind::Other("custom_field".to_string()));

        let reference = Reference::new(ReferenceKind::TypeRef, "Widget", 3, Some("make"));
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["kind"], "type_ref");
        assert_eq!(json["source_name"], "make");
    }

    #[test]
    fn test_kind_string_round_trip_for_known_kinds() {
        for kind in ["type_alias", "uses_trait", "merge_field"] {
            let sym_kind = SymbolKind::from_string(kind);
            let ref_kind = ReferenceKind::from_string(kind);
            assert_eq!(sym_kind.to_string(), kind);
            assert_eq!(ref_kind.to_string(), kind);
        }
        assert_eq!(SymbolKind::from_string("type_alias"), SymbolKind::TypeAlias);
        assert_eq!(ReferenceKind::from_string("uses_trait"), ReferenceKind::UsesTrait);
    }

    #[test]
    fn test_visibility_keywords() {
        assert_eq!(Visibility::from_keyword("global"), Some(Visibility::Public));
        assert_eq!(Visibility::from_keyword("fileprivate"), Some(Visibility::Private));
        assert_eq!(Visibility::from_keyword("static"), None);
    }
}
