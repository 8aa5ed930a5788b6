//! ExtractorManager - Public API for symbol/reference extraction
//!
//! Handles language detection and parsing, then delegates to the registry's
//! memoized extractors. Regex-only languages skip tree-sitter entirely.

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::extractors::base::{Reference, Symbol};
use crate::extractors::registry::Registry;
use crate::language::{grammar_language, is_regex_only};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::{Parser, Tree};

/// Everything extracted from one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileExtraction {
    pub path: String,
    pub language: String,
    pub symbols: Vec<Symbol>,
    pub references: Vec<Reference>,
    /// blake3 hex digest of the raw bytes
    pub content_hash: String,
}

/// Manager for all language extractors
pub struct ExtractorManager {
    registry: Registry,
}

impl Default for ExtractorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorManager {
    pub fn new() -> Self {
        Self {
            registry: Registry::default(),
        }
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            registry: Registry::with_config(config),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Extract symbols and references from in-memory file content
    pub fn extract_bytes(&self, path: &str, bytes: &[u8]) -> Result<FileExtraction, ExtractError> {
        let language = self
            .registry
            .language_for_file(path)
            .ok_or_else(|| ExtractError::UnsupportedLanguage(path.to_string()))?;
        let extractor = self.registry.extractor_for_language(language);

        let tree = if is_regex_only(language) {
            None
        } else {
            Some(parse(language, path, bytes)?)
        };

        let symbols = extractor.extract_symbols(tree.as_ref(), bytes, path);
        let references = extractor.extract_references(tree.as_ref(), bytes, path);

        tracing::debug!(
            "Extracted {} symbols from {} file: {}",
            symbols.len(),
            language,
            path
        );

        Ok(FileExtraction {
            path: path.to_string(),
            language: language.to_string(),
            symbols,
            references,
            content_hash: hash_content(bytes),
        })
    }

    /// Read a file from disk and extract it
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<FileExtraction, ExtractError> {
        let path = path.as_ref();
        let display = path.to_string_lossy().to_string();
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: display.clone(),
            source,
        })?;
        self.extract_bytes(&display, &bytes)
    }

    /// Extract many files in parallel; results come back in input order
    ///
    /// A failing file yields its own `Err` and never aborts the batch.
    pub fn extract_batch(
        &self,
        files: &[(String, Vec<u8>)],
    ) -> Vec<Result<FileExtraction, ExtractError>> {
        files
            .par_iter()
            .map(|(path, bytes)| self.extract_bytes(path, bytes))
            .collect()
    }
}

/// Parse with the language's (possibly aliased) grammar; one parser per call
fn parse(language: &str, path: &str, bytes: &[u8]) -> Result<Tree, ExtractError> {
    let grammar = grammar_language(language)?;
    let mut parser = Parser::new();
    parser.set_language(&grammar)?;
    parser
        .parse(bytes, None)
        .ok_or_else(|| ExtractError::ParseFailed(path.to_string()))
}

/// Content hash used by downstream storage to skip unchanged files
pub fn hash_content(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{ReferenceKind, SymbolKind};
    use std::io::Write;

    #[test]
    fn test_python_class_with_base() {
        let manager = ExtractorManager::new();
        let result = manager
            .extract_bytes("pkg/models.py", b"class Foo(Bar):\n    pass\n")
            .unwrap();
        assert_eq!(result.language, "python");

        let foo = result.symbols.iter().find(|s| s.name == "Foo").unwrap();
        assert_eq!(foo.kind, SymbolKind::Class);
        assert_eq!(foo.qualified_name, "Foo");

        let inherits = result
            .references
            .iter()
            .find(|r| r.kind == ReferenceKind::Inherits)
            .unwrap();
        assert_eq!(inherits.target_name, "Bar");
        assert_eq!(inherits.source_name.as_deref(), Some("Foo"));
    }

    #[test]
    fn test_regex_only_language_skips_parsing() {
        let manager = ExtractorManager::new();
        let result = manager
            .extract_bytes("legacy/math.prg", b"FUNCTION Add\n  RETURN 1\nENDFUNC\n")
            .unwrap();
        assert_eq!(result.language, "foxpro");
        assert_eq!(result.symbols.len(), 1);
        assert_eq!(result.symbols[0].name, "Add");
        assert_eq!(result.symbols[0].line_start, 1);
        assert_eq!(result.symbols[0].line_end, 3);
    }

    #[test]
    fn test_regex_only_language_has_no_parse_path() {
        let err = parse("yaml", "ci.yml", b"a: 1\n").unwrap_err();
        assert!(matches!(err, ExtractError::NoGrammar(ref lang) if lang == "yaml"));
        assert!(parse("apex", "A.cls", b"class A {}\n").is_ok());
    }

    #[test]
    fn test_unsupported_file() {
        let manager = ExtractorManager::new();
        let err = manager.extract_bytes("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_content_hash_tracks_bytes() {
        let manager = ExtractorManager::new();
        let a = manager.extract_bytes("a.go", b"package a\n").unwrap();
        let b = manager.extract_bytes("b.go", b"package a\n").unwrap();
        let c = manager.extract_bytes("c.go", b"package c\n").unwrap();
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
        assert_eq!(a.content_hash.len(), 64);
    }

    #[test]
    fn test_extract_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.rs");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "pub fn greet() {{}}").unwrap();

        let manager = ExtractorManager::new();
        let result = manager.extract_file(&path).unwrap();
        assert_eq!(result.language, "rust");
        assert!(result.symbols.iter().any(|s| s.name == "greet"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ExtractorManager::new();
        let err = manager.extract_file(dir.path().join("gone.py")).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[test]
    fn test_batch_preserves_order_and_isolates_failures() {
        let files = vec![
            ("one.py".to_string(), b"def one():\n    pass\n".to_vec()),
            ("two.txt".to_string(), b"plain".to_vec()),
            (
                ".gitlab-ci.yml".to_string(),
                b"stages:\n  - build\n  - test\njob1:\n  script: x\n".to_vec(),
            ),
        ];
        let results = ExtractorManager::new().extract_batch(&files);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().path, "one.py");
        assert!(results[1].is_err());

        let yaml = results[2].as_ref().unwrap();
        let kinds: Vec<_> = yaml
            .symbols
            .iter()
            .map(|s| (s.name.as_str(), s.kind.clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("build", SymbolKind::Constant),
                ("test", SymbolKind::Constant),
                ("job1", SymbolKind::Function),
            ]
        );
    }

    /// Runs `extract_bytes` on a thread with a small stack so unbounded
    /// recursion would overflow instead of passing
    fn extract_on_small_stack(path: &'static str, source: String) -> FileExtraction {
        std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(move || ExtractorManager::new().extract_bytes(path, source.as_bytes()))
            .unwrap()
            .join()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_deeply_nested_calls_stop_at_cap() {
        let depth = 3000;
        let source = format!("x = {}1{}\n", "f(".repeat(depth), ")".repeat(depth));
        let result = extract_on_small_stack("deep.py", source);
        let calls = result
            .references
            .iter()
            .filter(|r| r.kind == ReferenceKind::Call)
            .count();
        assert!(calls > 0);
        assert!(calls <= ExtractorConfig::default().max_walk_depth);
    }

    #[test]
    fn test_deeply_nested_markup_stops_at_cap() {
        let depth = 3000;
        let source = format!(
            "<aura:component>\n<aura:attribute name=\"top\" type=\"String\"/>\n{}<aura:attribute name=\"buried\"/>{}\n</aura:component>\n",
            "<div>".repeat(depth),
            "</div>".repeat(depth)
        );
        let result = extract_on_small_stack("aura/Deep/Deep.cmp", source);
        assert_eq!(result.language, "aura");
        assert_eq!(result.symbols[0].name, "Deep");
        assert!(result.symbols.iter().any(|s| s.name == "top"));
        // members below the markup depth cap are not visited
        assert!(result.symbols.iter().all(|s| s.name != "buried"));
    }

    #[test]
    fn test_line_ranges_are_ordered() {
        let files = vec![
            ("a.py".to_string(), b"@dec\nclass A:\n    def m(self):\n        pass\n".to_vec()),
            ("b.ts".to_string(), b"export interface I { x: number }\nenum E { A, B }\n".to_vec()),
            ("c.java".to_string(), b"class C {\n  @Override\n  void run() {}\n}\n".to_vec()),
            ("d.tf".to_string(), b"resource \"aws_s3_bucket\" \"b\" {\n  acl = \"private\"\n}\n".to_vec()),
            ("e.kt".to_string(), b"class K(val x: Int) {\n  fun f() = x\n}\n".to_vec()),
        ];
        for result in ExtractorManager::new().extract_batch(&files) {
            let result = result.unwrap();
            assert!(!result.symbols.is_empty(), "{} should yield symbols", result.path);
            assert!(result.symbols.iter().all(|s| s.line_start <= s.line_end));
        }
    }

    #[test]
    fn test_alias_parses_with_target_grammar() {
        let manager = ExtractorManager::new();
        let result = manager
            .extract_bytes(
                "classes/AccountService.cls",
                b"public with sharing class AccountService {\n    public void run() {}\n}\n",
            )
            .unwrap();
        assert_eq!(result.language, "apex");
        assert!(result.symbols.iter().all(|s| s.kind != SymbolKind::Trigger));
        assert!(result.symbols.iter().any(|s| s.name == "AccountService"));
    }
}
