//! Language extractors
//!
//! Every backend implements `LanguageExtractor` and turns one file into
//! Symbols and References. The module is organized into:
//! - `base` - data contracts, the extractor trait and shared helpers
//! - `registry` - extension → language → memoized extractor
//! - `manager` - parsing and batch extraction on top of the registry
//! - tier-1 tree walkers (python, javascript, typescript, go, rust, java, c, csharp, php, ruby)
//! - `generic` - config-driven engine, also serving Kotlin and Swift
//! - grammar-alias backends (apex, objc, aura, visualforce, sfxml) and the
//!   shared `html` markup helpers
//! - regex/binary backends with no grammar (foxpro, hcl, yaml)

pub mod base;
pub mod manager;
pub mod registry;

// Tree-walking backends
pub mod c;
pub mod csharp;
pub mod generic;
pub mod go;
pub mod java;
pub mod javascript;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;
pub mod typescript;

// Grammar-alias backends
pub mod apex;
pub mod aura;
pub(crate) mod html;
pub mod objc;
pub mod sfxml;
pub mod visualforce;

// Regex/binary backends
pub mod foxpro;
pub mod hcl;
pub mod yaml;

// Re-export the public API
pub use base::{
    LanguageExtractor, Reference, ReferenceKind, Symbol, SymbolKind, SymbolOptions, Visibility,
};
pub use manager::{ExtractorManager, FileExtraction};
pub use registry::{
    extractor_for_file, language_for_file, supported_extensions, supported_languages, Registry,
};
