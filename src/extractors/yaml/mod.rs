/// YAML extractor for CI/infrastructure files (regex only)
///
/// The dialect is sniffed from the first lines of the file:
/// - GitHub Actions: top-level `on:` and `jobs:` keys
/// - GitLab CI: a `stages:` key
/// - anything else is generic YAML, where each top-level key is a variable
///
/// GitLab yields stages (constant), templates (`.hidden` keys, class) and
/// jobs (function), with `extends`, `needs` and `!reference` edges. GitHub
/// yields the workflow name (module), jobs (function) and reusable workflow
/// calls (class), with `uses` and `needs` edges.
mod github;
mod gitlab;

use crate::config::ExtractorConfig;
use crate::extractors::base::{
    decode_lossy, LanguageExtractor, Reference, Symbol, SymbolKind, SymbolOptions,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Tree;

static ON_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^on\s*:").unwrap());
static JOBS_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^jobs\s*:\s*$").unwrap());
static NEEDS_SCALAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+needs\s*:\s*([A-Za-z0-9_/:-]+)\s*$").unwrap());
static NEEDS_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+needs\s*:\s*\[([^\]]+)\]").unwrap());
static NEEDS_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+needs\s*:\s*$").unwrap());
static NEEDS_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+-\s+(?:job\s*:\s*)?([A-Za-z0-9_/:-]+)\s*$").unwrap());
static EXTENDS_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+extends\s*:\s*$").unwrap());
static EXTENDS_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+-\s+([.\w-]+)\s*$").unwrap());

/// Lines scanned when sniffing the dialect
const SNIFF_LINES: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    GitLab,
    GitHub,
    Generic,
}

impl Dialect {
    pub fn detect(lines: &[&str]) -> Self {
        let (mut stages, mut on, mut jobs) = (false, false, false);
        for line in lines.iter().take(SNIFF_LINES) {
            stages |= line.trim().starts_with("stages:");
            on |= ON_KEY.is_match(line);
            jobs |= JOBS_KEY.is_match(line);
        }
        if on && jobs {
            Dialect::GitHub
        } else if stages {
            Dialect::GitLab
        } else {
            Dialect::Generic
        }
    }
}

/// A key starting in column 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopKey<'l> {
    pub name: &'l str,
    /// True when the value is a nested block (nothing after the colon but an
    /// anchor or a comment)
    pub is_block: bool,
}

/// Parse a top-level key. The key ends at the first colon followed by
/// whitespace or end of line, so `test:unit:` is one key and
/// `url: http://host:8080` is the key `url` with a scalar value.
pub fn top_level_key(line: &str) -> Option<TopKey<'_>> {
    let first = line.chars().next()?;
    if !(first.is_ascii_alphanumeric() || matches!(first, '_' | '.' | '/' | '-'))
        || line.starts_with("- ")
    {
        return None;
    }
    let bytes = line.as_bytes();
    let colon = (0..bytes.len()).find(|&i| {
        bytes[i] == b':' && bytes.get(i + 1).map_or(true, |b| b.is_ascii_whitespace())
    })?;
    let name = line[..colon].trim_end();
    if name.is_empty() || name.contains('#') {
        return None;
    }
    let rest = line[colon + 1..].trim();
    let anchor_only = rest.starts_with('&')
        && rest
            .split_whitespace()
            .nth(1)
            .map_or(true, |next| next.starts_with('#'));
    Some(TopKey {
        name,
        is_block: rest.is_empty() || rest.starts_with('#') || anchor_only,
    })
}

/// Items of an inline `[a, 'b', "c"]` list
pub fn inline_items(list: &str) -> impl Iterator<Item = &str> {
    list.split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"'))
        .filter(|item| !item.is_empty())
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_content(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Last content line of the block opened at `start`, i.e. before the next
/// content line indented at or left of `indent`
pub fn block_end(lines: &[&str], start: usize, indent: usize) -> u32 {
    let mut end = start;
    for (idx, line) in lines.iter().enumerate().skip(start + 1) {
        if !is_content(line) {
            continue;
        }
        if indent_of(line) <= indent {
            break;
        }
        end = idx;
    }
    end as u32 + 1
}

/// Top-level region a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Top,
    /// Items of a GitLab `stages:` list
    Stages,
    /// Body of a GitHub `jobs:` map
    Jobs,
}

impl Section {
    /// Section after reading `line`; any other column-0 content returns to `Top`
    pub fn next(self, line: &str) -> Self {
        if line.trim_end() == "stages:" {
            return Section::Stages;
        }
        if JOBS_KEY.is_match(line) {
            return Section::Jobs;
        }
        let column_zero = line.starts_with(|c: char| !c.is_whitespace());
        if column_zero && !line.starts_with("- ") && is_content(line) {
            Section::Top
        } else {
            self
        }
    }
}

/// Block list a job body is currently reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListField {
    #[default]
    Closed,
    /// `extends:` followed by `- parent` items
    Extends,
    /// `needs:` followed by `- job` items
    Needs,
}

impl ListField {
    /// State after reading `line`, plus the list item it carries
    pub fn next(self, line: &str) -> (Self, Option<&str>) {
        if NEEDS_BLOCK.is_match(line) {
            return (ListField::Needs, None);
        }
        if EXTENDS_BLOCK.is_match(line) {
            return (ListField::Extends, None);
        }
        if !is_content(line) {
            return (self, None);
        }
        let item = match self {
            ListField::Closed => None,
            ListField::Extends => EXTENDS_ITEM.captures(line).and_then(|c| c.get(1)),
            ListField::Needs => NEEDS_ITEM.captures(line).and_then(|c| c.get(1)),
        };
        match item {
            Some(item) => (self, Some(item.as_str())),
            None => (ListField::Closed, None),
        }
    }
}

/// Job names from a one-line `needs: job` or `needs: [a, b]`
pub fn inline_needs(line: &str) -> Vec<&str> {
    if let Some(job) = NEEDS_SCALAR.captures(line).and_then(|c| c.get(1)) {
        return vec![job.as_str()];
    }
    NEEDS_LIST
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|list| inline_items(list.as_str()).collect())
        .unwrap_or_default()
}

fn extract_generic_symbols(lines: &[&str]) -> Vec<Symbol> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let key = top_level_key(line)?;
            let line_no = idx as u32 + 1;
            let end = if key.is_block {
                block_end(lines, idx, 0)
            } else {
                line_no
            };
            Some(Symbol::new(
                key.name,
                SymbolKind::Variable,
                line_no,
                end,
                SymbolOptions {
                    signature: Some(format!("{}:", key.name)),
                    ..Default::default()
                },
            ))
        })
        .collect()
}

#[derive(Debug, Default, Clone)]
pub struct YamlExtractor {
    config: ExtractorConfig,
}

impl YamlExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl LanguageExtractor for YamlExtractor {
    fn language_name(&self) -> &str {
        "yaml"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".yml", ".yaml"]
    }

    fn extract_symbols(&self, _tree: Option<&Tree>, source: &[u8], _file_path: &str) -> Vec<Symbol> {
        let text = decode_lossy(source);
        let lines: Vec<&str> = text.lines().collect();
        match Dialect::detect(&lines) {
            Dialect::GitLab => gitlab::extract_symbols(&lines),
            Dialect::GitHub => github::extract_symbols(&lines),
            Dialect::Generic => extract_generic_symbols(&lines),
        }
    }

    fn extract_references(
        &self,
        _tree: Option<&Tree>,
        source: &[u8],
        _file_path: &str,
    ) -> Vec<Reference> {
        let text = decode_lossy(source);
        let lines: Vec<&str> = text.lines().collect();
        match Dialect::detect(&lines) {
            Dialect::GitLab => gitlab::extract_references(&lines),
            Dialect::GitHub => github::extract_references(&lines),
            Dialect::Generic => Vec::new(),
        }
    }
}
