// Line lookup for regex-driven extractors
//
// Regex matches report byte offsets; symbols and references need 1-based
// lines. The index is built once per call.

/// Byte offset -> 1-based line number over a decoded source
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { starts }
    }

    /// Line containing `offset`
    pub fn line_of(&self, offset: usize) -> u32 {
        let line = match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        };
        line as u32
    }

    /// Newline count plus one, so an empty text still has line 1
    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }
}

/// Source bytes as text, invalid UTF-8 replaced
pub fn decode_lossy(source: &[u8]) -> String {
    String::from_utf8_lossy(source).into_owned()
}
