// Base extractor types and traits
//
// - types.rs: Symbol, Reference and their kind enums
// - extractor.rs: LanguageExtractor trait and the per-call ExtractionContext
// - tree_methods.rs: tree navigation helpers
// - lines.rs: offset-to-line lookup for regex backends

pub mod extractor;
pub mod lines;
pub mod tree_methods;
pub mod types;

// Re-export key types for external use
pub use extractor::{last_segment, qualify, unquote, ExtractionContext, LanguageExtractor};
pub use lines::{decode_lossy, LineIndex};
pub use tree_methods::{children, first_line_signature, node_text, strip_comment_markers};
pub use types::{Reference, ReferenceKind, Symbol, SymbolKind, SymbolOptions, Visibility};
