/// HCL / Terraform extractor (regex only)
///
/// Top-level blocks are classified by keyword and label count:
/// - `resource "t" "n"`, `source "t" "n"` -> class `t.n`
/// - `data "t" "n"` -> class `data.t.n`
/// - `variable "n"` -> variable `var.n`; `output "n"` -> function
/// - `module "n"`, `provider "n"`, `terraform {}` -> module
/// - `job`, `task`, `group`, `build` -> function
/// - keys inside `locals {}` -> private variable `local.k`
///
/// `.tfvars` files only hold assignments, each one a variable. References are
/// `var.*`, `local.*`, `module.*`, `data.*.*` and `<type>.<name>` resource
/// lookups, deduplicated per line.
use crate::config::ExtractorConfig;
use crate::extractors::base::{
    decode_lossy, LanguageExtractor, Reference, ReferenceKind, Symbol, SymbolKind, SymbolOptions,
    Visibility,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tree_sitter::Tree;

static BLOCK2: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^([a-z_]+)\s+"([^"]+)"\s+"([^"]+)"\s*\{"#).unwrap());
static BLOCK1: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^([a-z_]+)\s+"([^"]+)"\s*\{"#).unwrap());
static BLOCK0: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z_]+)\s*\{").unwrap());
static LOCAL_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+([a-z_][a-zA-Z0-9_]*)\s*=").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:#|//)").unwrap());
static TFVARS_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*=").unwrap());

static VAR_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bvar\.([a-z_][a-zA-Z0-9_-]*)\b").unwrap());
static MODULE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bmodule\.([a-z_][a-zA-Z0-9_-]*)(?:\.([a-z_][a-zA-Z0-9_-]*))?\b").unwrap()
});
static DATA_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bdata\.([a-z_][a-zA-Z0-9_-]*)\.([a-z_][a-zA-Z0-9_-]*)\b").unwrap()
});
static LOCAL_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\blocal\.([a-z_][a-zA-Z0-9_-]*)\b").unwrap());
static RESOURCE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([a-z][a-z0-9]*_[a-z][a-zA-Z0-9_]*)\.([a-z_][a-zA-Z0-9_-]*)\b").unwrap()
});

/// Prefixes that are never resource types
const BUILTIN_NAMESPACES: &[&str] = &[
    "var", "module", "data", "local", "each", "count", "path", "terraform", "self", "null",
];

#[derive(Debug, Default, Clone)]
pub struct HclExtractor {
    config: ExtractorConfig,
}

impl HclExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

fn is_tfvars(file_path: &str) -> bool {
    file_path.ends_with(".tfvars")
}

/// Symbol for a block opener, before its end line is known
fn block_symbol(line: &str, line_no: u32) -> Option<Symbol> {
    let public = |name: &str, kind: SymbolKind, qualified: Option<String>, signature: String| {
        Symbol::new(
            name,
            kind,
            line_no,
            line_no,
            SymbolOptions {
                qualified_name: qualified,
                signature: Some(signature),
                ..Default::default()
            },
        )
    };

    if let Some(caps) = BLOCK2.captures(line) {
        let (keyword, kind_label, name) = (&caps[1], &caps[2], &caps[3]);
        let qualified = match keyword {
            "resource" | "source" => format!("{}.{}", kind_label, name),
            "data" => format!("data.{}.{}", kind_label, name),
            _ => return None,
        };
        return Some(public(
            name,
            SymbolKind::Class,
            Some(qualified),
            format!(r#"{} "{}" "{}""#, keyword, kind_label, name),
        ));
    }

    if let Some(caps) = BLOCK1.captures(line) {
        let (keyword, label) = (&caps[1], &caps[2]);
        let signature = format!(r#"{} "{}""#, keyword, label);
        let symbol = match keyword {
            "variable" => public(
                label,
                SymbolKind::Variable,
                Some(format!("var.{}", label)),
                signature,
            ),
            "output" | "job" | "task" | "group" | "build" => {
                public(label, SymbolKind::Function, None, signature)
            }
            "module" => public(label, SymbolKind::Module, None, signature),
            "provider" => Symbol {
                is_exported: false,
                ..public(label, SymbolKind::Module, None, signature)
            },
            _ => return None,
        };
        return Some(symbol);
    }

    let caps = BLOCK0.captures(line)?;
    match &caps[1] {
        "terraform" => Some(Symbol {
            is_exported: false,
            ..public("terraform", SymbolKind::Module, None, "terraform {}".into())
        }),
        "build" => Some(public("build", SymbolKind::Function, None, "build {}".into())),
        _ => None,
    }
}

fn extract_block_symbols(text: &str) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    // (depth the block opened at, index of its symbol)
    let mut open: Vec<(i32, usize)> = Vec::new();
    let mut depth = 0i32;
    let mut locals_depth: Option<i32> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx as u32 + 1;
        if COMMENT.is_match(line) {
            continue;
        }
        let stripped = line.trim();
        let before = depth;
        depth += stripped.matches('{').count() as i32 - stripped.matches('}').count() as i32;

        if let Some(opened_at) = locals_depth {
            if depth <= opened_at {
                locals_depth = None;
            } else if let Some(caps) = LOCAL_KEY.captures(line) {
                let key = &caps[1];
                symbols.push(Symbol::new(
                    key,
                    SymbolKind::Variable,
                    line_no,
                    line_no,
                    SymbolOptions {
                        qualified_name: Some(format!("local.{}", key)),
                        signature: Some(format!("local.{}", key)),
                        visibility: Some(Visibility::Private),
                        is_exported: Some(false),
                        ..Default::default()
                    },
                ));
            }
        } else if BLOCK0.captures(stripped).is_some_and(|c| &c[1] == "locals") {
            if depth > before {
                locals_depth = Some(before);
            }
        } else if let Some(symbol) = block_symbol(stripped, line_no) {
            symbols.push(symbol);
            if depth > before {
                open.push((before, symbols.len() - 1));
            }
        }

        // Close blocks whose braces balanced on this line
        while let Some(&(opened_at, index)) = open.last() {
            if depth > opened_at {
                break;
            }
            symbols[index].line_end = line_no;
            open.pop();
        }
    }
    symbols
}

fn extract_tfvars_symbols(text: &str) -> Vec<Symbol> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !COMMENT.is_match(line))
        .filter_map(|(idx, line)| {
            let caps = TFVARS_ASSIGNMENT.captures(line)?;
            let line_no = idx as u32 + 1;
            Some(Symbol::new(
                &caps[1],
                SymbolKind::Variable,
                line_no,
                line_no,
                SymbolOptions {
                    signature: Some(format!("{} = ...", &caps[1])),
                    ..Default::default()
                },
            ))
        })
        .collect()
}

fn extract_block_references(text: &str) -> Vec<Reference> {
    let mut refs = Vec::new();
    let mut seen: HashSet<(String, u32)> = HashSet::new();
    let mut current_block: Option<String> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx as u32 + 1;
        if COMMENT.is_match(line) {
            continue;
        }
        let stripped = line.trim();
        if let Some(caps) = BLOCK2.captures(stripped) {
            current_block = Some(if &caps[1] == "data" {
                format!("data.{}.{}", &caps[2], &caps[3])
            } else {
                format!("{}.{}", &caps[2], &caps[3])
            });
        } else if let Some(caps) = BLOCK1.captures(stripped) {
            current_block = Some(caps[2].to_string());
        }

        let mut targets: Vec<String> = Vec::new();
        targets.extend(VAR_REF.captures_iter(line).map(|c| c[1].to_string()));
        targets.extend(MODULE_REF.captures_iter(line).map(|c| c[1].to_string()));
        targets.extend(
            DATA_REF
                .captures_iter(line)
                .map(|c| format!("data.{}.{}", &c[1], &c[2])),
        );
        targets.extend(LOCAL_REF.captures_iter(line).map(|c| c[1].to_string()));
        targets.extend(RESOURCE_REF.captures_iter(line).filter_map(|c| {
            let namespace = c[1].split('_').next().unwrap_or_default();
            (!BUILTIN_NAMESPACES.contains(&namespace)).then(|| c[2].to_string())
        }));

        for target in targets {
            if seen.insert((target.clone(), line_no)) {
                refs.push(Reference::new(
                    ReferenceKind::Call,
                    target,
                    line_no,
                    current_block.as_deref(),
                ));
            }
        }
    }
    refs
}

impl LanguageExtractor for HclExtractor {
    fn language_name(&self) -> &str {
        "hcl"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &[".tf", ".hcl", ".tfvars"]
    }

    fn extract_symbols(&self, _tree: Option<&Tree>, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let text = decode_lossy(source);
        if is_tfvars(file_path) {
            extract_tfvars_symbols(&text)
        } else {
            extract_block_symbols(&text)
        }
    }

    fn extract_references(
        &self,
        _tree: Option<&Tree>,
        source: &[u8],
        file_path: &str,
    ) -> Vec<Reference> {
        if is_tfvars(file_path) {
            return Vec::new();
        }
        extract_block_references(&decode_lossy(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN_TF: &str = r#"terraform {
  required_version = ">= 1.5"
}

# network
variable "region" {
  default = "eu-west-1"
}

locals {
  name_prefix = "app-${var.region}"
  tags        = { team = "core" }
}

resource "aws_vpc" "main" {
  cidr_block = var.cidr
  tags       = local.tags
}

data "aws_ami" "ubuntu" {
  owners = ["099720109477"]
}

module "db" {
  source = "./modules/db"
  vpc_id = aws_vpc.main.id
  ami    = data.aws_ami.ubuntu.id
}

output "db_url" { value = module.db.url }

provider "aws" {
  region = var.region
}
"#;

    #[test]
    fn test_block_symbols() {
        let symbols = HclExtractor::default().extract_symbols(None, MAIN_TF.as_bytes(), "infra/main.tf");
        let found: Vec<_> = symbols
            .iter()
            .map(|s| (s.qualified_name.as_str(), s.kind.clone(), s.line_start, s.line_end))
            .collect();
        assert_eq!(
            found,
            vec![
                ("terraform", SymbolKind::Module, 1, 3),
                ("var.region", SymbolKind::Variable, 6, 8),
                ("local.name_prefix", SymbolKind::Variable, 11, 11),
                ("local.tags", SymbolKind::Variable, 12, 12),
                ("aws_vpc.main", SymbolKind::Class, 15, 18),
                ("data.aws_ami.ubuntu", SymbolKind::Class, 20, 22),
                ("db", SymbolKind::Module, 24, 28),
                ("db_url", SymbolKind::Function, 30, 30),
                ("aws", SymbolKind::Module, 32, 34),
            ]
        );
        let local = &symbols[2];
        assert_eq!(local.visibility, Visibility::Private);
        assert!(!local.is_exported);
        assert!(!symbols[8].is_exported);
        assert_eq!(symbols[4].signature.as_deref(), Some(r#"resource "aws_vpc" "main""#));
    }

    #[test]
    fn test_block_references() {
        let refs = HclExtractor::default().extract_references(None, MAIN_TF.as_bytes(), "infra/main.tf");
        let found: Vec<_> = refs
            .iter()
            .map(|r| (r.target_name.as_str(), r.line, r.source_name.as_deref()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("region", 11, Some("region")),
                ("cidr", 16, Some("aws_vpc.main")),
                ("tags", 17, Some("aws_vpc.main")),
                ("main", 26, Some("db")),
                ("data.aws_ami.ubuntu", 27, Some("db")),
                ("ubuntu", 27, Some("db")),
                ("db", 30, Some("db_url")),
                ("region", 33, Some("aws")),
            ]
        );
        assert!(refs.iter().all(|r| r.kind == ReferenceKind::Call));
    }

    #[test]
    fn test_tfvars_assignments() {
        let source = b"# prod\nregion = \"eu-west-1\"\ninstance_count = 3\n";
        let extractor = HclExtractor::default();
        let symbols = extractor.extract_symbols(None, source, "prod.tfvars");
        let names: Vec<_> = symbols.iter().map(|s| (s.name.as_str(), s.line_start)).collect();
        assert_eq!(names, vec![("region", 2), ("instance_count", 3)]);
        assert_eq!(symbols[0].signature.as_deref(), Some("region = ..."));
        assert!(extractor.extract_references(None, source, "prod.tfvars").is_empty());
    }
}
