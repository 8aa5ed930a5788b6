//! Error type for the fallible surfaces (grammar lookup, parsing, config).
//!
//! Extraction itself never fails; see `LanguageExtractor`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported language or file type: {0}")]
    UnsupportedLanguage(String),

    #[error("language '{0}' is regex-only and has no tree-sitter grammar")]
    NoGrammar(String),

    #[error("failed to load grammar: {0}")]
    Grammar(#[from] anyhow::Error),

    #[error("failed to set parser language: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("tree-sitter could not parse {0}")]
    ParseFailed(String),

    #[error("invalid extractor config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
