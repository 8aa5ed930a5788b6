/// Visual FoxPro extractor (regex and binary, no grammar)
///
/// - `.prg` program files: decoded through a codepage cascade, preprocessed
///   into logical lines and walked by a line state machine
/// - `.scx` forms: a packed DBF + FPT blob whose control methods become
///   method symbols
mod decode;
mod preprocess;
mod prg;
mod scx;

use crate::config::ExtractorConfig;
use crate::extractors::base::{ExtractionContext, LanguageExtractor, Reference, Symbol};
use tracing::debug;
use tree_sitter::Tree;

#[derive(Debug, Default, Clone)]
pub struct FoxProExtractor {
    config: ExtractorConfig,
}

impl FoxProExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

fn is_form(file_path: &str) -> bool {
    file_path.to_lowercase().ends_with(".scx")
}

impl LanguageExtractor for FoxProExtractor {
    fn language_name(&self) -> &str {
        "foxpro"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".prg", ".scx"]
    }

    fn extract_symbols(&self, _tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let ctx = ExtractionContext::new("foxpro", file_path, source, &self.config);
        let symbols = if is_form(file_path) {
            scx::extract_symbols(source, file_path, ctx.file_stem(), &self.config)
        } else {
            prg::extract_symbols(source, ctx.file_stem())
        };
        debug!("FoxPro pass found {} symbols in {}", symbols.len(), file_path);
        symbols
    }

    fn extract_references(
        &self,
        _tree: Option<&Tree>,
        source: &[u8],
        file_path: &str,
    ) -> Vec<Reference> {
        if is_form(file_path) {
            let ctx = ExtractionContext::new("foxpro", file_path, source, &self.config);
            scx::extract_references(source, file_path, ctx.file_stem(), &self.config)
        } else {
            prg::extract_references(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::SymbolKind;

    #[test]
    fn test_dispatch_by_extension() {
        let extractor = FoxProExtractor::default();
        let prg = extractor.extract_symbols(None, b"FUNCTION Add\n  RETURN 1\nENDFUNC", "lib/Math.PRG");
        assert_eq!(prg.len(), 1);
        assert_eq!(prg[0].kind, SymbolKind::Function);

        let form = scx::fixtures::FormBuilder::new()
            .control("frmMain", "", "", "PROCEDURE Load\nENDPROC\n")
            .build();
        let symbols = extractor.extract_symbols(None, &form, "forms/Main.SCX");
        assert_eq!(symbols[0].name, "Main");
        assert_eq!(symbols[1].qualified_name, "Main.frmMain.Load");
    }

    #[test]
    fn test_dotted_file_names_keep_inner_dots() {
        let extractor = FoxProExtractor::default();
        let script = extractor.extract_symbols(None, b"SET TALK OFF\n", "lib/my.util.prg");
        assert_eq!(script[0].name, "my.util");
        assert_eq!(script[0].signature.as_deref(), Some("DO my.util"));

        let form = scx::fixtures::FormBuilder::new()
            .control("frmMain", "", "", "PROCEDURE Load\nENDPROC\n")
            .build();
        let symbols = extractor.extract_symbols(None, &form, "forms/order.entry.scx");
        assert_eq!(symbols[0].name, "order.entry");
    }

    #[test]
    fn test_garbage_form_is_empty() {
        let extractor = FoxProExtractor::default();
        let blob = [0u8, 0, 0, 40, 0x99, 1, 2, 3];
        assert!(extractor.extract_symbols(None, &blob, "x.scx").is_empty());
        assert!(extractor.extract_references(None, &blob, "x.scx").is_empty());
    }
}
