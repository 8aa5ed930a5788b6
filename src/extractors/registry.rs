//! Extractor registry - single source of truth for language dispatch
//!
//! Resolves a file path to a language and a language to a memoized extractor.
//! Construction precedence for a language:
//! 1. its dedicated backend
//! 2. if it is a grammar alias, the alias target's dedicated backend
//! 3. the generic config-driven engine keyed by the language name
//!
//! Extractors carry no per-call state, so one `Arc` per language is shared
//! across threads.

use crate::config::ExtractorConfig;
use crate::extractors::apex::ApexExtractor;
use crate::extractors::aura::AuraExtractor;
use crate::extractors::base::LanguageExtractor;
use crate::extractors::c::CExtractor;
use crate::extractors::csharp::CSharpExtractor;
use crate::extractors::foxpro::FoxProExtractor;
use crate::extractors::generic::GenericExtractor;
use crate::extractors::go::GoExtractor;
use crate::extractors::hcl::HclExtractor;
use crate::extractors::java::JavaExtractor;
use crate::extractors::javascript::JavaScriptExtractor;
use crate::extractors::objc::ObjCExtractor;
use crate::extractors::php::PhpExtractor;
use crate::extractors::python::PythonExtractor;
use crate::extractors::ruby::RubyExtractor;
use crate::extractors::rust::RustExtractor;
use crate::extractors::sfxml::SfxmlExtractor;
use crate::extractors::typescript::TypeScriptExtractor;
use crate::extractors::visualforce::VisualforceExtractor;
use crate::extractors::yaml::YamlExtractor;
use crate::language::{alias_target, detect_language_from_path, EXTENSION_MAP, SFXML_SUFFIX};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Process-wide registry behind the free functions
static DEFAULT_REGISTRY: Lazy<Registry> = Lazy::new(Registry::default);

/// Dedicated backend for a language, if one exists
fn dedicated(language: &str, config: ExtractorConfig) -> Option<Arc<dyn LanguageExtractor>> {
    let extractor: Arc<dyn LanguageExtractor> = match language {
        "python" => Arc::new(PythonExtractor::new(config)),
        "javascript" => Arc::new(JavaScriptExtractor::new(config)),
        "typescript" => Arc::new(TypeScriptExtractor::new(config)),
        "tsx" => Arc::new(TypeScriptExtractor::tsx(config)),
        "go" => Arc::new(GoExtractor::new(config)),
        "rust" => Arc::new(RustExtractor::new(config)),
        "java" => Arc::new(JavaExtractor::new(config)),
        "c" => Arc::new(CExtractor::new(config)),
        "cpp" => Arc::new(CExtractor::cpp(config)),
        "c_sharp" => Arc::new(CSharpExtractor::new(config)),
        "php" => Arc::new(PhpExtractor::new(config)),
        "ruby" => Arc::new(RubyExtractor::new(config)),
        // Tier-2 backends are generic-engine profiles
        "kotlin" | "swift" => Arc::new(GenericExtractor::new(language, config)),
        "objc" => Arc::new(ObjCExtractor::new(config)),
        "apex" => Arc::new(ApexExtractor::new(config)),
        "aura" => Arc::new(AuraExtractor::new(config)),
        "visualforce" => Arc::new(VisualforceExtractor::new(config)),
        "sfxml" => Arc::new(SfxmlExtractor::new(config)),
        "foxpro" => Arc::new(FoxProExtractor::new(config)),
        "yaml" => Arc::new(YamlExtractor::new(config)),
        "hcl" => Arc::new(HclExtractor::new(config)),
        _ => return None,
    };
    Some(extractor)
}

/// Language → extractor map with lazy, memoized construction
pub struct Registry {
    config: ExtractorConfig,
    cache: Mutex<HashMap<String, Arc<dyn LanguageExtractor>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_config(ExtractorConfig::default())
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose extractors all share `config`
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extractor for a language name; never fails, unknown names get the
    /// generic engine
    pub fn extractor_for_language(&self, language: &str) -> Arc<dyn LanguageExtractor> {
        // A poisoned lock only means another thread panicked mid-insert; the
        // map itself is still usable
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(extractor) = cache.get(language) {
            return Arc::clone(extractor);
        }
        let extractor = self.build(language);
        cache.insert(language.to_string(), Arc::clone(&extractor));
        extractor
    }

    fn build(&self, language: &str) -> Arc<dyn LanguageExtractor> {
        if let Some(extractor) = dedicated(language, self.config) {
            return extractor;
        }
        if let Some(extractor) = alias_target(language).and_then(|t| dedicated(t, self.config)) {
            return extractor;
        }
        trace!("No dedicated extractor for '{}', using generic engine", language);
        Arc::new(GenericExtractor::new(language, self.config))
    }

    pub fn language_for_file(&self, path: &str) -> Option<&'static str> {
        let language = detect_language_from_path(path);
        if language.is_none() {
            trace!("No language registered for {}", path);
        }
        language
    }

    pub fn extractor_for_file(&self, path: &str) -> Option<Arc<dyn LanguageExtractor>> {
        self.language_for_file(path)
            .map(|language| self.extractor_for_language(language))
    }
}

/// Language for a path, using the `-meta.xml` suffix rule then the extension
pub fn language_for_file(path: &str) -> Option<&'static str> {
    DEFAULT_REGISTRY.language_for_file(path)
}

/// Memoized extractor for a path from the default registry
pub fn extractor_for_file(path: &str) -> Option<Arc<dyn LanguageExtractor>> {
    DEFAULT_REGISTRY.extractor_for_file(path)
}

/// Every registered extension plus the `-meta.xml` suffix
pub fn supported_extensions() -> Vec<&'static str> {
    let mut extensions: Vec<&'static str> = EXTENSION_MAP.iter().map(|(ext, _)| *ext).collect();
    extensions.push(SFXML_SUFFIX);
    extensions
}

/// Sorted, de-duplicated language names reachable from a file path
pub fn supported_languages() -> Vec<&'static str> {
    let mut languages: Vec<&'static str> = EXTENSION_MAP.iter().map(|(_, lang)| *lang).collect();
    languages.push("sfxml");
    languages.sort_unstable();
    languages.dedup();
    languages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path(extension: &str) -> String {
        if extension.starts_with('-') {
            format!("force-app/main/Account.object{}", extension)
        } else {
            format!("src/sample{}", extension)
        }
    }

    #[test]
    fn test_every_registered_extension_resolves() {
        for extension in supported_extensions() {
            let path = sample_path(extension);
            let language = language_for_file(&path)
                .unwrap_or_else(|| panic!("{} should resolve to a language", path));
            let extractor = extractor_for_file(&path)
                .unwrap_or_else(|| panic!("{} should have an extractor", path));
            assert_eq!(extractor.language_name(), language);
        }
    }

    #[test]
    fn test_extensions_are_claimed_by_their_extractor() {
        for (extension, language) in EXTENSION_MAP {
            if *language == "html" {
                continue;
            }
            let extractor = DEFAULT_REGISTRY.extractor_for_language(language);
            assert!(
                extractor.file_extensions().contains(extension),
                "{} should claim {}",
                language,
                extension
            );
        }
    }

    #[test]
    fn test_memoized_per_language() {
        let registry = Registry::new();
        let first = registry.extractor_for_language("python");
        let second = registry.extractor_for_language("python");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unknown_language_falls_back_to_generic() {
        let registry = Registry::new();
        let extractor = registry.extractor_for_language("elixir");
        assert_eq!(extractor.language_name(), "elixir");
        assert!(extractor.extract_symbols(None, b"defmodule X do end", "x.ex").is_empty());
        assert_eq!(registry.extractor_for_language("html").language_name(), "html");
    }

    #[test]
    fn test_apex_routing() {
        assert_eq!(language_for_file("classes/AccountService.cls"), Some("apex"));
        assert_eq!(language_for_file("triggers/AccountTrigger.trigger"), Some("apex"));
        let extractor = extractor_for_file("classes/AccountService.cls").unwrap();
        assert_eq!(extractor.language_name(), "apex");
    }

    #[test]
    fn test_unregistered_paths() {
        assert_eq!(language_for_file("README"), None);
        assert_eq!(language_for_file("pom.xml"), None);
        assert!(extractor_for_file("notes.txt").is_none());
    }

    #[test]
    fn test_supported_languages_sorted() {
        let languages = supported_languages();
        assert!(languages.windows(2).all(|w| w[0] < w[1]));
        assert!(languages.contains(&"sfxml"));
        assert!(languages.contains(&"foxpro"));
        assert!(languages.contains(&"c_sharp"));
    }

    #[test]
    fn test_config_reaches_extractors() {
        let config = ExtractorConfig {
            max_scx_records: 3,
            ..Default::default()
        };
        let registry = Registry::with_config(config);
        assert_eq!(registry.config().max_scx_records, 3);
        assert_eq!(registry.extractor_for_language("foxpro").language_name(), "foxpro");
    }
}
