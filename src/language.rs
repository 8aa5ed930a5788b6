//! Language Support - shared tree-sitter language configuration
//!
//! Single source of truth for file extension → language resolution, grammar
//! aliases (one language parsed with another's grammar) and the set of
//! regex-only languages that never get a tree-sitter grammar.

use crate::error::ExtractError;
use anyhow::Result;

/// Extension (lowercase, with dot) → language name
pub const EXTENSION_MAP: &[(&str, &str)] = &[
    // Python
    (".py", "python"),
    (".pyi", "python"),
    // JavaScript / TypeScript
    (".js", "javascript"),
    (".jsx", "javascript"),
    (".mjs", "javascript"),
    (".cjs", "javascript"),
    (".ts", "typescript"),
    (".mts", "typescript"),
    (".cts", "typescript"),
    (".tsx", "tsx"),
    // Systems
    (".go", "go"),
    (".rs", "rust"),
    (".c", "c"),
    (".h", "c"),
    (".cpp", "cpp"),
    (".cc", "cpp"),
    (".cxx", "cpp"),
    (".hpp", "cpp"),
    (".hxx", "cpp"),
    (".hh", "cpp"),
    (".m", "objc"),
    (".mm", "objc"),
    // JVM / .NET / scripting
    (".java", "java"),
    (".cs", "c_sharp"),
    (".php", "php"),
    (".rb", "ruby"),
    (".rake", "ruby"),
    (".gemspec", "ruby"),
    (".kt", "kotlin"),
    (".kts", "kotlin"),
    (".swift", "swift"),
    // Salesforce
    (".cls", "apex"),
    (".trigger", "apex"),
    (".cmp", "aura"),
    (".app", "aura"),
    (".evt", "aura"),
    (".intf", "aura"),
    (".design", "aura"),
    (".page", "visualforce"),
    (".component", "visualforce"),
    // Markup (generic engine)
    (".html", "html"),
    (".htm", "html"),
    // Regex-only
    (".prg", "foxpro"),
    (".scx", "foxpro"),
    (".tf", "hcl"),
    (".tfvars", "hcl"),
    (".hcl", "hcl"),
    (".yml", "yaml"),
    (".yaml", "yaml"),
];

/// Languages parsed with another language's grammar
pub const GRAMMAR_ALIASES: &[(&str, &str)] = &[
    ("apex", "java"),
    ("aura", "html"),
    ("visualforce", "html"),
    ("sfxml", "html"),
];

/// Languages with no tree-sitter grammar at all
pub const REGEX_ONLY_LANGUAGES: &[&str] = &["foxpro", "yaml", "hcl"];

/// Suffix that routes Salesforce metadata files regardless of extension
pub const SFXML_SUFFIX: &str = "-meta.xml";

/// Get tree-sitter language parser for a given language name
///
/// Only real grammars are resolved here; callers apply `grammar_for` first
/// to follow aliases.
pub fn get_tree_sitter_language(language: &str) -> Result<tree_sitter::Language> {
    match language {
        // Systems languages
        "rust" => Ok(tree_sitter_rust::LANGUAGE.into()),
        "c" => Ok(tree_sitter_c::LANGUAGE.into()),
        "cpp" => Ok(tree_sitter_cpp::LANGUAGE.into()),
        "go" => Ok(tree_sitter_go::LANGUAGE.into()),
        "objc" => Ok(tree_sitter_objc::LANGUAGE.into()),

        // Web languages
        "typescript" => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "tsx" => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
        "javascript" => Ok(tree_sitter_javascript::LANGUAGE.into()),
        "html" => Ok(tree_sitter_html::LANGUAGE.into()),

        // Backend languages
        "python" => Ok(tree_sitter_python::LANGUAGE.into()),
        "java" => Ok(tree_sitter_java::LANGUAGE.into()),
        "c_sharp" => Ok(tree_sitter_c_sharp::LANGUAGE.into()),
        "php" => Ok(tree_sitter_php::LANGUAGE_PHP.into()),
        "ruby" => Ok(tree_sitter_ruby::LANGUAGE.into()),
        "swift" => Ok(tree_sitter_swift::LANGUAGE.into()),
        "kotlin" => Ok(tree_sitter_kotlin_ng::LANGUAGE.into()),

        _ => Err(anyhow::anyhow!(
            "Unsupported grammar: '{}'. Supported grammars: rust, c, cpp, go, objc, typescript, tsx, javascript, html, python, java, c_sharp, php, ruby, swift, kotlin",
            language
        )),
    }
}

/// Grammar that parses `language` (itself unless aliased)
pub fn grammar_for(language: &str) -> &str {
    GRAMMAR_ALIASES
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, grammar)| *grammar)
        .unwrap_or(language)
}

/// Alias target for a language, if it has one
pub fn alias_target(language: &str) -> Option<&'static str> {
    GRAMMAR_ALIASES
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, grammar)| *grammar)
}

pub fn is_regex_only(language: &str) -> bool {
    REGEX_ONLY_LANGUAGES.contains(&language)
}

/// Grammar that parses `language`, following aliases
///
/// Regex-only languages have none and yield `NoGrammar`.
pub fn grammar_language(language: &str) -> std::result::Result<tree_sitter::Language, ExtractError> {
    if is_regex_only(language) {
        return Err(ExtractError::NoGrammar(language.to_string()));
    }
    Ok(get_tree_sitter_language(grammar_for(language))?)
}

/// Detect language from a file path
///
/// The `-meta.xml` suffix wins over the `.xml` extension.
pub fn detect_language_from_path(path: &str) -> Option<&'static str> {
    if path.ends_with(SFXML_SUFFIX) {
        return Some("sfxml");
    }
    let ext = extension_of(path)?;
    EXTENSION_MAP
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

/// Lowercased extension with leading dot (`"src/App.TSX"` → `".tsx"`)
pub fn extension_of(path: &str) -> Option<String> {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let idx = file_name.rfind('.')?;
    if idx == 0 {
        return None;
    }
    Some(file_name[idx..].to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_grammar_backed_language_loads() {
        for (_, language) in EXTENSION_MAP {
            if is_regex_only(language) {
                continue;
            }
            let grammar = grammar_for(language);
            assert!(
                get_tree_sitter_language(grammar).is_ok(),
                "grammar {} for {} should load",
                grammar,
                language
            );
        }
    }

    #[test]
    fn test_regex_only_languages_have_no_grammar() {
        for language in REGEX_ONLY_LANGUAGES {
            assert!(matches!(
                grammar_language(language),
                Err(ExtractError::NoGrammar(ref name)) if name == language
            ));
        }
        assert!(grammar_language("visualforce").is_ok());
        assert!(matches!(grammar_language("cobol"), Err(ExtractError::Grammar(_))));
    }

    #[test]
    fn test_meta_xml_suffix_beats_extension() {
        assert_eq!(
            detect_language_from_path("force-app/objects/Account.object-meta.xml"),
            Some("sfxml")
        );
        assert_eq!(detect_language_from_path("pom.xml"), None);
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(detect_language_from_path("LEGACY/MAIN.PRG"), Some("foxpro"));
        assert_eq!(detect_language_from_path("src/App.TSX"), Some("tsx"));
        assert_eq!(detect_language_from_path(".bashrc"), None);
        assert_eq!(detect_language_from_path("Makefile"), None);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(grammar_for("apex"), "java");
        assert_eq!(grammar_for("visualforce"), "html");
        assert_eq!(grammar_for("python"), "python");
        assert_eq!(alias_target("sfxml"), Some("html"));
        assert!(is_regex_only("yaml"));
        assert!(!is_regex_only("python"));
    }
}
