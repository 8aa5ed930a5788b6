// Polyglot Extract - multi-language symbol and reference extraction
//
// Tree-sitter backends for grammar-backed languages, a config-driven generic
// engine for the long tail, and regex/binary backends for files no grammar
// covers. Everything funnels into one Symbol/Reference contract.

pub mod config;
pub mod error;
pub mod extractors;
pub mod language;

pub use config::ExtractorConfig;
pub use error::ExtractError;
pub use extractors::{
    extractor_for_file, language_for_file, supported_extensions, supported_languages,
    ExtractorManager, FileExtraction, LanguageExtractor, Reference, ReferenceKind, Registry,
    Symbol, SymbolKind, Visibility,
};
