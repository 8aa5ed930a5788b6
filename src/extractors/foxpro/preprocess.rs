// Logical-line preprocessing for FoxPro sources
//
// Continuation lines (trailing `;`) are joined, comments blanked, and every
// processed line remembers the 1-based original line it started on.

use super::decode::decode_source;

#[derive(Debug, Clone, Default)]
pub struct Preprocessed {
    /// Cleaned logical lines; comment lines are kept as empty strings
    pub lines: Vec<String>,
    /// `line_map[i]` is the original line of `lines[i]`
    pub line_map: Vec<u32>,
}

impl Preprocessed {
    pub fn new(source: &[u8]) -> Self {
        let text = decode_source(source);
        let raw: Vec<&str> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();

        let mut out = Self::default();
        let mut in_block_comment = false;
        let mut i = 0;
        while i < raw.len() {
            let original = i as u32 + 1;
            let mut line = raw[i].to_string();
            while line.trim_end().ends_with(';') && i + 1 < raw.len() {
                let head = line.trim_end();
                let head = head[..head.len() - 1].trim_end();
                line = format!("{} {}", head, raw[i + 1].trim_start());
                i += 1;
            }
            i += 1;

            let stripped = line.trim_start();
            let cleaned = if stripped.starts_with("*!*") {
                // `*!*` toggles a disabled block
                in_block_comment = !in_block_comment;
                String::new()
            } else if in_block_comment || is_comment_line(stripped) {
                String::new()
            } else {
                strip_inline_comment(&line).to_string()
            };
            out.lines.push(cleaned);
            out.line_map.push(original);
        }
        out
    }

    /// Original line of processed line `index`
    pub fn original_line(&self, index: usize) -> u32 {
        self.line_map.get(index).copied().unwrap_or(index as u32 + 1)
    }

    /// Original line of the last processed line
    pub fn last_line(&self) -> u32 {
        self.line_map.last().copied().unwrap_or(1)
    }

    /// `(original line, trimmed text)` for every non-blank line
    pub fn statements(&self) -> impl Iterator<Item = (u32, &str)> {
        self.lines
            .iter()
            .zip(&self.line_map)
            .map(|(line, &orig)| (orig, line.trim()))
            .filter(|(_, line)| !line.is_empty())
    }
}

fn is_comment_line(stripped: &str) -> bool {
    stripped.starts_with('*')
        || stripped
            .get(..5)
            .is_some_and(|head| head.eq_ignore_ascii_case("NOTE "))
}

/// Cut an `&&` comment that is not inside a string literal
pub fn strip_inline_comment(line: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' if !in_double => in_single = !in_single,
            b'"' if !in_single => in_double = !in_double,
            b'&' if !in_single && !in_double && bytes.get(i + 1) == Some(&b'&') => {
                return line[..i].trim_end();
            }
            _ => {}
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_map_survives_continuations() {
        let source = b"x = 1 + ;\n    2 + ;\n    3\n* comment\ny = 4 && trailing\nNOTE old\nz = 'a && b'";
        let pre = Preprocessed::new(source);
        assert_eq!(pre.lines.len(), pre.line_map.len());
        assert_eq!(pre.line_map, vec![1, 4, 5, 6, 7]);
        assert_eq!(pre.lines[0], "x = 1 + 2 + 3");
        assert_eq!(pre.lines[1], "");
        assert_eq!(pre.lines[2], "y = 4");
        assert_eq!(pre.lines[3], "");
        assert_eq!(pre.lines[4], "z = 'a && b'");

        let statements: Vec<_> = pre.statements().map(|(line, _)| line).collect();
        assert_eq!(statements, vec![1, 5, 7]);
    }

    #[test]
    fn test_disabled_blocks() {
        let pre = Preprocessed::new(b"a = 1\n*!*\nFUNCTION Hidden\n*!*\nb = 2\r\n");
        assert_eq!(pre.lines, vec!["a = 1", "", "", "", "b = 2", ""]);
        assert_eq!(pre.original_line(4), 5);
        assert_eq!(pre.last_line(), 6);
    }
}
