// GitHub Actions dialect

use super::{block_end, inline_needs, ListField, Section};
use crate::extractors::base::{Reference, ReferenceKind, Symbol, SymbolKind, SymbolOptions};
use once_cell::sync::Lazy;
use regex::Regex;

static WORKFLOW_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^name\s*:\s*(.+?)\s*$").unwrap());
/// Jobs sit exactly two spaces under `jobs:`
static JOB_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^  ([A-Za-z0-9_-]+)\s*:").unwrap());
/// Job-level `uses:` (a reusable workflow), not a step's `- uses:`
static USES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+uses\s*:\s*(.+?)\s*$").unwrap());

fn unquote(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '\'' || c == '"')
}

/// `org/repo/.github/workflows/deploy.yml@v1` -> `deploy`
fn workflow_name(target: &str) -> &str {
    let path = target.split('@').next().unwrap_or(target);
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}

pub fn extract_symbols(lines: &[&str]) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    let mut section = Section::Top;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        section = section.next(line);
        if let Some(name) = WORKFLOW_NAME.captures(line).and_then(|c| c.get(1)) {
            let name = unquote(name.as_str());
            if !name.is_empty() {
                symbols.push(Symbol::new(
                    name,
                    SymbolKind::Module,
                    line_no,
                    line_no,
                    SymbolOptions {
                        signature: Some(format!("workflow: {}", name)),
                        ..Default::default()
                    },
                ));
            }
        }

        if section != Section::Jobs {
            continue;
        }
        if let Some(job) = JOB_NAME.captures(line).and_then(|c| c.get(1)) {
            symbols.push(Symbol::new(
                job.as_str(),
                SymbolKind::Function,
                line_no,
                block_end(lines, idx, 2),
                SymbolOptions {
                    signature: Some(format!("job: {}", job.as_str())),
                    ..Default::default()
                },
            ));
            continue;
        }
        if let Some(target) = USES.captures(line).and_then(|c| c.get(1)) {
            let target = unquote(target.as_str());
            let name = workflow_name(target);
            if !name.is_empty() {
                symbols.push(Symbol::new(
                    name,
                    SymbolKind::Class,
                    line_no,
                    line_no,
                    SymbolOptions {
                        signature: Some(format!("uses: {}", target)),
                        is_exported: Some(false),
                        ..Default::default()
                    },
                ));
            }
        }
    }
    symbols
}

pub fn extract_references(lines: &[&str]) -> Vec<Reference> {
    let mut refs = Vec::new();
    let mut section = Section::Top;
    let mut job: Option<&str> = None;
    let mut list = ListField::Closed;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        section = section.next(line);
        if section != Section::Jobs {
            continue;
        }
        if let Some(name) = JOB_NAME.captures(line).and_then(|c| c.get(1)) {
            job = Some(name.as_str());
            list = ListField::Closed;
            continue;
        }
        let (next, item) = list.next(line);
        list = next;
        if let Some(target) = USES.captures(line).and_then(|c| c.get(1)) {
            refs.push(Reference::new(
                ReferenceKind::Call,
                unquote(target.as_str()),
                line_no,
                job,
            ));
            continue;
        }
        if let (ListField::Needs, Some(target)) = (list, item) {
            refs.push(Reference::new(ReferenceKind::Call, target, line_no, job));
        }
        for target in inline_needs(line) {
            refs.push(Reference::new(ReferenceKind::Call, target, line_no, job));
        }
    }
    refs
}
