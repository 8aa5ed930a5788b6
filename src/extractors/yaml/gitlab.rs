// GitLab CI dialect

use super::{block_end, inline_items, inline_needs, top_level_key, ListField, Section};
use crate::extractors::base::{Reference, ReferenceKind, Symbol, SymbolKind, SymbolOptions};
use once_cell::sync::Lazy;
use regex::Regex;

static STAGE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*-\s+["']?([A-Za-z0-9_-]+)["']?\s*$"#).unwrap());
static EXTENDS_SCALAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"extends\s*:\s*([.\w-]+)").unwrap());
static EXTENDS_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"extends\s*:\s*\[([^\]]+)\]").unwrap());
static REFERENCE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"!reference\s+\[([^\]]+)\]").unwrap());

/// Top-level keys with pipeline meaning; every other block key is a job
const RESERVED_KEYS: &[&str] = &[
    "stages", "variables", "default", "workflow", "include", "image", "services",
    "before_script", "after_script", "cache", "artifacts", "retry", "timeout", "interruptible",
    "rules", "only", "except", "when", "needs", "allow_failure", "coverage", "pages", "release",
    "environment", "resource_group", "parallel", "trigger", "extends", "inherit", "tags",
    "script", "hooks", "secrets", "dast_configuration", "pages:deploy",
];

fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key.to_lowercase().as_str())
}

pub fn extract_symbols(lines: &[&str]) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    let mut section = Section::Top;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        section = section.next(line);
        if section == Section::Stages {
            if let Some(stage) = STAGE_ENTRY.captures(line).and_then(|c| c.get(1)) {
                symbols.push(Symbol::new(
                    stage.as_str(),
                    SymbolKind::Constant,
                    line_no,
                    line_no,
                    SymbolOptions {
                        signature: Some(format!("stage: {}", stage.as_str())),
                        ..Default::default()
                    },
                ));
            }
            continue;
        }

        let Some(key) = top_level_key(line).filter(|k| k.is_block) else {
            continue;
        };
        if is_reserved(key.name) {
            continue;
        }
        let (kind, label) = if key.name.starts_with('.') {
            (SymbolKind::Class, "template")
        } else {
            (SymbolKind::Function, "job")
        };
        symbols.push(Symbol::new(
            key.name,
            kind,
            line_no,
            block_end(lines, idx, 0),
            SymbolOptions {
                signature: Some(format!("{}: {}", label, key.name)),
                ..Default::default()
            },
        ));
    }
    symbols
}

pub fn extract_references(lines: &[&str]) -> Vec<Reference> {
    let mut refs = Vec::new();
    let mut job: Option<&str> = None;
    let mut list = ListField::Closed;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        let mut push = |kind: ReferenceKind, target: &str, job: Option<&str>| {
            refs.push(Reference::new(kind, target, line_no, job));
        };

        if let Some(key) = top_level_key(line) {
            if !is_reserved(key.name) && !key.name.starts_with('.') {
                job = Some(key.name);
            }
        }

        if let Some(parents) = EXTENDS_LIST.captures(line).and_then(|c| c.get(1)) {
            for parent in inline_items(parents.as_str()) {
                push(ReferenceKind::Inherits, parent, job);
            }
        } else if let Some(parent) = EXTENDS_SCALAR.captures(line).and_then(|c| c.get(1)) {
            push(ReferenceKind::Inherits, parent.as_str(), job);
        }

        let (next, item) = list.next(line);
        list = next;
        if let Some(item) = item {
            let kind = match list {
                ListField::Extends => ReferenceKind::Inherits,
                _ => ReferenceKind::Call,
            };
            push(kind, item, job);
        }

        for caps in REFERENCE_TAG.captures_iter(line) {
            if let Some(target) = caps.get(1).and_then(|items| inline_items(items.as_str()).next()) {
                push(ReferenceKind::Call, target, job);
            }
        }

        for target in inline_needs(line) {
            push(ReferenceKind::Call, target, job);
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_and_job() {
        let lines: Vec<&str> = "stages:\n  - build\n  - test\njob1:\n  script: x\n".lines().collect();
        let symbols = extract_symbols(&lines);
        let found: Vec<_> = symbols
            .iter()
            .map(|s| (s.name.as_str(), s.kind.clone(), s.line_start))
            .collect();
        assert_eq!(
            found,
            vec![
                ("build", SymbolKind::Constant, 2),
                ("test", SymbolKind::Constant, 3),
                ("job1", SymbolKind::Function, 4),
            ]
        );
        assert_eq!(symbols[2].line_end, 5);
        assert_eq!(symbols[0].signature.as_deref(), Some("stage: build"));
    }

    const PIPELINE: &str = r#"stages:
  - build
  - deploy

variables:
  DEPLOY_URL: https://deploy.example.com:8443/hook

.defaults: &defaults
  image: ruby:3.2
  retry: 2

test:unit:
  extends: .defaults
  script:
    - !reference [.setup, script]
    - rake test

deploy:
  extends:
    - .defaults
    - .deploy_rules
  needs: [test:unit, "lint"]
  script: ./deploy.sh
"#;

    #[test]
    fn test_templates_and_jobs() {
        let lines: Vec<&str> = PIPELINE.lines().collect();
        let symbols = extract_symbols(&lines);
        let found: Vec<_> = symbols
            .iter()
            .map(|s| (s.name.as_str(), s.kind.clone(), s.line_start, s.line_end))
            .collect();
        assert_eq!(
            found,
            vec![
                ("build", SymbolKind::Constant, 2, 2),
                ("deploy", SymbolKind::Constant, 3, 3),
                (".defaults", SymbolKind::Class, 8, 10),
                ("test:unit", SymbolKind::Function, 12, 16),
                ("deploy", SymbolKind::Function, 18, 23),
            ]
        );
        assert_eq!(symbols[2].signature.as_deref(), Some("template: .defaults"));
    }

    #[test]
    fn test_job_edges() {
        let lines: Vec<&str> = PIPELINE.lines().collect();
        let refs = extract_references(&lines);
        let found: Vec<_> = refs
            .iter()
            .map(|r| (r.kind.clone(), r.target_name.as_str(), r.line, r.source_name.as_deref()))
            .collect();
        assert_eq!(
            found,
            vec![
                (ReferenceKind::Inherits, ".defaults", 13, Some("test:unit")),
                (ReferenceKind::Call, ".setup", 15, Some("test:unit")),
                (ReferenceKind::Inherits, ".defaults", 20, Some("deploy")),
                (ReferenceKind::Inherits, ".deploy_rules", 21, Some("deploy")),
                (ReferenceKind::Call, "test:unit", 22, Some("deploy")),
                (ReferenceKind::Call, "lint", 22, Some("deploy")),
            ]
        );
    }
}
