// `.scx` form parsing
//
// A form is a DBF table (.scx) whose memo columns live in an FPT heap (.sct).
// Callers pass both as one blob: a 4-byte big-endian SCX length, the SCX
// bytes, then the SCT bytes. Each record is one control; its METHODS memo
// holds the PROCEDURE blocks that become method symbols.
//
// Symbols and references get synthetic lines, `record * 1000 + offset`, so
// ordering is stable without a text layout.

use super::decode::decode_source;
use super::prg::statement_references;
use crate::config::ExtractorConfig;
use crate::extractors::base::{Reference, ReferenceKind, Symbol, SymbolKind, SymbolOptions};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{trace, warn};

const VALID_VERSIONS: &[u8] = &[
    0x02, 0x03, 0x04, 0x05, 0x30, 0x31, 0x32, 0x43, 0x63, 0x83, 0x8B, 0xCB, 0xF5, 0xFB,
];
const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
const DESCRIPTOR_END: u8 = 0x0D;
const DEFAULT_BLOCK_SIZE: usize = 64;
const MEMO_HEADER_LEN: usize = 8;
/// Smallest heap that can hold a memo past the FPT header
const MIN_MEMO_HEAP: usize = 512;
const LINES_PER_RECORD: u32 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScxError {
    #[error("table header is truncated")]
    Truncated,
    #[error("unknown table version byte {0:#04x}")]
    BadVersion(u8),
    #[error("table header declares record size 0 or header size {0}")]
    BadLayout(usize),
}

#[derive(Debug, Clone, Copy)]
struct FieldDescriptor {
    kind: u8,
    offset: usize,
    size: usize,
}

/// One control row of a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScxRecord {
    pub index: u32,
    pub deleted: bool,
    pub platform: String,
    pub object_name: String,
    pub parent: String,
    pub class_location: String,
    pub methods: String,
}

impl ScxRecord {
    /// `Parent.Object`, or just the object at the form root
    fn control_path(&self) -> String {
        if self.parent.is_empty() {
            self.object_name.clone()
        } else {
            format!("{}.{}", self.parent, self.object_name)
        }
    }

    fn is_live(&self) -> bool {
        !self.deleted && self.platform.trim() != "COMMENT"
    }
}

/// Split the packed blob into (scx, sct)
pub fn unpack(source: &[u8]) -> (&[u8], &[u8]) {
    let Some(len_bytes) = source.get(..4) else {
        return (source, &[]);
    };
    let scx_len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
    let body = &source[4..];
    let split = (scx_len as usize).min(body.len());
    body.split_at(split)
}

fn u16_le(bytes: &[u8], at: usize) -> Option<usize> {
    let b = bytes.get(at..at + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]) as usize)
}

fn u32_le(bytes: &[u8], at: usize) -> Option<usize> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
}

fn u32_be(bytes: &[u8], at: usize) -> Option<usize> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize)
}

/// Memo heap (.sct) reader
struct MemoHeap<'a> {
    bytes: &'a [u8],
    block_size: usize,
    max_bytes: usize,
}

impl<'a> MemoHeap<'a> {
    fn new(bytes: &'a [u8], max_bytes: usize) -> Self {
        let block_size = bytes
            .get(6..8)
            .map(|b| u16::from_be_bytes([b[0], b[1]]) as usize)
            .filter(|&size| size > 0)
            .unwrap_or(DEFAULT_BLOCK_SIZE);
        Self {
            bytes,
            block_size,
            max_bytes,
        }
    }

    fn is_usable(&self) -> bool {
        self.bytes.len() >= MIN_MEMO_HEAP
    }

    fn read(&self, block: usize) -> Option<&'a [u8]> {
        if block == 0 {
            return None;
        }
        let offset = block.checked_mul(self.block_size)?;
        let len = u32_be(self.bytes, offset.checked_add(4)?)?;
        if len == 0 || len > self.max_bytes {
            trace!("Skipping memo block {} with length {}", block, len);
            return None;
        }
        let start = offset + MEMO_HEADER_LEN;
        self.bytes.get(start..start.checked_add(len)?)
    }

    fn text(&self, block: usize) -> String {
        self.read(block).map(decode_source).unwrap_or_default()
    }
}

/// Parse the control table. Format violations reject the whole blob; a
/// record that runs past the end stops the scan.
pub fn parse_records(
    scx: &[u8],
    sct: &[u8],
    config: &ExtractorConfig,
) -> Result<Vec<ScxRecord>, ScxError> {
    if scx.len() < HEADER_LEN {
        return Err(ScxError::Truncated);
    }
    let version = scx[0];
    if !VALID_VERSIONS.contains(&version) {
        return Err(ScxError::BadVersion(version));
    }
    let record_count = u32_le(scx, 4).ok_or(ScxError::Truncated)?;
    let header_size = u16_le(scx, 8).ok_or(ScxError::Truncated)?;
    let record_size = u16_le(scx, 10).ok_or(ScxError::Truncated)?;
    if record_size == 0 || header_size < HEADER_LEN {
        return Err(ScxError::BadLayout(header_size));
    }
    let record_count = if record_count > config.max_scx_records {
        warn!(
            "SCX claims {} records, clamped to {}",
            record_count, config.max_scx_records
        );
        config.max_scx_records
    } else {
        record_count
    };

    let fields = parse_descriptors(scx, header_size, record_size);
    let heap = MemoHeap::new(sct, config.max_memo_bytes);

    let mut records = Vec::new();
    for index in 0..record_count {
        let start = header_size + index * record_size;
        let Some(row) = scx.get(start..start + record_size) else {
            break;
        };
        let char_field = |name: &str| -> String {
            fields
                .get(name)
                .and_then(|f| row.get(f.offset..f.offset + f.size))
                .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
                .unwrap_or_default()
        };
        let memo_field = |name: &str| -> String {
            if !heap.is_usable() {
                return String::new();
            }
            fields
                .get(name)
                .filter(|f| f.kind == b'M')
                .and_then(|f| u32_le(row, f.offset))
                .map(|block| heap.text(block))
                .unwrap_or_default()
        };
        records.push(ScxRecord {
            index: index as u32,
            deleted: row[0] == b'*',
            platform: char_field("PLATFORM"),
            object_name: memo_field("OBJNAME"),
            parent: memo_field("PARENT"),
            class_location: memo_field("CLASSLOC"),
            methods: memo_field("METHODS"),
        });
    }
    Ok(records)
}

fn parse_descriptors(
    scx: &[u8],
    header_size: usize,
    record_size: usize,
) -> HashMap<String, FieldDescriptor> {
    let mut fields = HashMap::new();
    let end = scx.len().min(header_size);
    let mut pos = HEADER_LEN;
    while pos + DESCRIPTOR_LEN <= end {
        let descriptor = &scx[pos..pos + DESCRIPTOR_LEN];
        if descriptor[0] == DESCRIPTOR_END {
            break;
        }
        let name_len = descriptor[..11].iter().position(|&b| b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&descriptor[..name_len]).to_string();
        let offset = u32_le(descriptor, 12).unwrap_or(usize::MAX);
        if offset < record_size {
            fields.insert(
                name,
                FieldDescriptor {
                    kind: descriptor[11],
                    offset,
                    size: descriptor[16] as usize,
                },
            );
        }
        pos += DESCRIPTOR_LEN;
    }
    fields
}

/// A PROCEDURE/FUNCTION block from a METHODS memo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub keyword: String,
    pub name: String,
    pub code: Vec<String>,
}

pub fn split_procedures(methods: &str) -> Vec<Procedure> {
    let mut procedures = Vec::new();
    let mut current: Option<Procedure> = None;
    for line in methods.split('\n') {
        let stripped = line.trim();
        let upper = stripped.to_uppercase();
        if upper.starts_with("PROCEDURE ") || upper.starts_with("FUNCTION ") {
            procedures.extend(current.take());
            let (keyword, name) = stripped.split_once(char::is_whitespace).unwrap_or((stripped, ""));
            current = Some(Procedure {
                keyword: keyword.to_uppercase(),
                name: name.trim().to_string(),
                code: vec![line.to_string()],
            });
        } else if upper.starts_with("ENDPROC") || upper.starts_with("ENDFUNC") {
            if let Some(mut procedure) = current.take() {
                procedure.code.push(line.to_string());
                procedures.push(procedure);
            }
        } else if let Some(procedure) = current.as_mut() {
            procedure.code.push(line.to_string());
        }
    }
    // The last block may lack ENDPROC
    procedures.extend(current);
    procedures
}

fn load(source: &[u8], file_path: &str, config: &ExtractorConfig) -> Option<Vec<ScxRecord>> {
    let (scx, sct) = unpack(source);
    match parse_records(scx, sct, config) {
        Ok(records) => Some(records),
        Err(err) => {
            warn!("Rejected form file {}: {}", file_path, err);
            None
        }
    }
}

pub fn extract_symbols(
    source: &[u8],
    file_path: &str,
    form_name: &str,
    config: &ExtractorConfig,
) -> Vec<Symbol> {
    let Some(records) = load(source, file_path, config) else {
        return Vec::new();
    };
    let mut symbols = vec![Symbol::new(
        form_name,
        SymbolKind::Class,
        1,
        (records.len() as u32).saturating_mul(LINES_PER_RECORD),
        SymbolOptions {
            signature: Some(format!("FORM {}", form_name)),
            ..Default::default()
        },
    )];

    for record in records.iter().filter(|r| r.is_live() && !r.methods.is_empty()) {
        let control = record.control_path();
        let parent = if control.is_empty() {
            form_name.to_string()
        } else {
            format!("{}.{}", form_name, control)
        };
        let procedures = split_procedures(&record.methods);
        for (offset, procedure) in procedures.iter().enumerate() {
            if procedure.name.is_empty() {
                continue;
            }
            let line = record_line(record.index, offset);
            symbols.push(Symbol::new(
                procedure.name.clone(),
                SymbolKind::Method,
                line,
                line + procedure.code.len() as u32,
                SymbolOptions {
                    qualified_name: Some(format!("{}.{}", parent, procedure.name)),
                    signature: Some(format!("{} {}", procedure.keyword, procedure.name)),
                    parent_name: Some(parent.clone()),
                    ..Default::default()
                },
            ));
        }
    }
    symbols
}

/// Synthetic 1-based line for a record-relative offset
fn record_line(index: u32, offset: usize) -> u32 {
    index
        .saturating_mul(LINES_PER_RECORD)
        .saturating_add(offset as u32)
        .max(1)
}

pub fn extract_references(
    source: &[u8],
    file_path: &str,
    form_name: &str,
    config: &ExtractorConfig,
) -> Vec<Reference> {
    let Some(records) = load(source, file_path, config) else {
        return Vec::new();
    };
    let mut refs = Vec::new();
    for record in records.iter().filter(|r| r.is_live()) {
        if !record.class_location.is_empty() {
            let location = record.class_location.as_str();
            let library = location.rsplit(['/', '\\']).next().unwrap_or(location);
            let library = library.rsplit_once('.').map_or(library, |(stem, _)| stem);
            refs.push(
                Reference::new(ReferenceKind::Import, library, record_line(record.index, 0), Some(form_name))
                    .with_import_path(location),
            );
        }

        let control = record.control_path();
        for (offset, procedure) in split_procedures(&record.methods).iter().enumerate() {
            if procedure.name.is_empty() {
                continue;
            }
            let scope = if control.is_empty() {
                format!("{}.{}", form_name, procedure.name)
            } else {
                format!("{}.{}.{}", form_name, control, procedure.name)
            };
            for (line_offset, code) in procedure.code.iter().enumerate() {
                let code = code.trim();
                if code.is_empty() {
                    continue;
                }
                statement_references(code, record_line(record.index, offset + line_offset), Some(&scope), &mut refs);
            }
        }
    }
    refs
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Builds a packed form blob with PLATFORM (C), OBJNAME, PARENT,
    /// CLASSLOC and METHODS (M) columns
    pub struct FormBuilder {
        records: Vec<(bool, [String; 4])>,
    }

    const FIELDS: &[(&str, u8, u8)] = &[
        ("PLATFORM", b'C', 8),
        ("OBJNAME", b'M', 4),
        ("PARENT", b'M', 4),
        ("CLASSLOC", b'M', 4),
        ("METHODS", b'M', 4),
    ];
    const BLOCK: usize = 64;

    impl FormBuilder {
        pub fn new() -> Self {
            Self { records: Vec::new() }
        }

        pub fn control(mut self, name: &str, parent: &str, classloc: &str, methods: &str) -> Self {
            let memos = [name, parent, classloc, methods].map(str::to_string);
            self.records.push((false, memos));
            self
        }

        pub fn deleted(mut self, name: &str, methods: &str) -> Self {
            let memos = [name, "", "", methods].map(str::to_string);
            self.records.push((true, memos));
            self
        }

        pub fn build(&self) -> Vec<u8> {
            let record_size = 1 + FIELDS.iter().map(|f| f.2 as usize).sum::<usize>();
            let header_size = 32 + FIELDS.len() * 32 + 1;

            // Memo heap: 512-byte header, then one block-aligned memo per value
            let mut sct = vec![0u8; 512];
            sct[6..8].copy_from_slice(&(BLOCK as u16).to_be_bytes());
            let mut memo = |text: &str| -> u32 {
                if text.is_empty() {
                    return 0;
                }
                let block = sct.len() / BLOCK;
                sct.extend_from_slice(&1u32.to_be_bytes());
                sct.extend_from_slice(&(text.len() as u32).to_be_bytes());
                sct.extend_from_slice(text.as_bytes());
                while sct.len() % BLOCK != 0 {
                    sct.push(0);
                }
                block as u32
            };

            let mut scx = vec![0u8; 32];
            scx[0] = 0x30;
            scx[4..8].copy_from_slice(&(self.records.len() as u32).to_le_bytes());
            scx[8..10].copy_from_slice(&(header_size as u16).to_le_bytes());
            scx[10..12].copy_from_slice(&(record_size as u16).to_le_bytes());
            let mut offset = 1u32;
            for (name, kind, size) in FIELDS {
                let mut descriptor = [0u8; 32];
                descriptor[..name.len()].copy_from_slice(name.as_bytes());
                descriptor[11] = *kind;
                descriptor[12..16].copy_from_slice(&offset.to_le_bytes());
                descriptor[16] = *size;
                scx.extend_from_slice(&descriptor);
                offset += *size as u32;
            }
            scx.push(0x0D);

            for (deleted, memos) in &self.records {
                scx.push(if *deleted { b'*' } else { b' ' });
                scx.extend_from_slice(b"WINDOWS ");
                for text in memos {
                    scx.extend_from_slice(&memo(text).to_le_bytes());
                }
            }

            let mut packed = (scx.len() as u32).to_be_bytes().to_vec();
            packed.extend_from_slice(&scx);
            packed.extend_from_slice(&sct);
            packed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::FormBuilder;
    use super::*;

    fn form() -> Vec<u8> {
        FormBuilder::new()
            .control("frmOrders", "", "", "PROCEDURE Init\r\n  DO FORM lookup\r\nENDPROC\r\n")
            .control(
                "cmdSave",
                "frmOrders",
                "libs\\buttons.vcx",
                "PROCEDURE Click\r\n  THISFORM.SaveAll()\r\n  =AuditLog()\r\nENDPROC\r\nPROCEDURE Valid\r\n  RETURN .T.\r\n",
            )
            .deleted("cmdOld", "PROCEDURE Click\r\nENDPROC\r\n")
            .build()
    }

    #[test]
    fn test_records_resolve_memos() {
        let blob = form();
        let (scx, sct) = unpack(&blob);
        let records = parse_records(scx, sct, &ExtractorConfig::default()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].object_name, "frmOrders");
        assert_eq!(records[0].platform, "WINDOWS");
        assert_eq!(records[1].control_path(), "frmOrders.cmdSave");
        assert_eq!(records[1].class_location, "libs\\buttons.vcx");
        assert!(records[2].deleted);
    }

    #[test]
    fn test_form_symbols() {
        let symbols = extract_symbols(&form(), "forms/orders.scx", "orders", &ExtractorConfig::default());
        let found: Vec<_> = symbols
            .iter()
            .map(|s| (s.qualified_name.as_str(), s.kind.clone(), s.line_start))
            .collect();
        assert_eq!(
            found,
            vec![
                ("orders", SymbolKind::Class, 1),
                ("orders.frmOrders.Init", SymbolKind::Method, 1),
                ("orders.frmOrders.cmdSave.Click", SymbolKind::Method, 1000),
                ("orders.frmOrders.cmdSave.Valid", SymbolKind::Method, 1001),
            ]
        );
        assert_eq!(symbols[0].line_end, 3000);
        assert_eq!(symbols[2].signature.as_deref(), Some("PROCEDURE Click"));
        assert_eq!(symbols[2].parent_name.as_deref(), Some("orders.frmOrders.cmdSave"));
    }

    #[test]
    fn test_form_references() {
        let refs = extract_references(&form(), "forms/orders.scx", "orders", &ExtractorConfig::default());
        let found: Vec<_> = refs
            .iter()
            .map(|r| (r.kind.clone(), r.target_name.as_str(), r.line, r.source_name.as_deref()))
            .collect();
        assert_eq!(
            found,
            vec![
                (ReferenceKind::Call, "lookup", 1, Some("orders.frmOrders.Init")),
                (ReferenceKind::Import, "buttons", 1000, Some("orders")),
                (ReferenceKind::Call, "SaveAll", 1001, Some("orders.frmOrders.cmdSave.Click")),
                (ReferenceKind::Call, "AuditLog", 1002, Some("orders.frmOrders.cmdSave.Click")),
            ]
        );
    }

    #[test]
    fn test_first_record_lines_start_at_one() {
        let blob = FormBuilder::new()
            .control("frmMain", "", "libs\\base.vcx", "PROCEDURE Load\r\nENDPROC\r\n")
            .build();
        let config = ExtractorConfig::default();
        let refs = extract_references(&blob, "forms/main.scx", "main", &config);
        assert_eq!(refs[0].kind, ReferenceKind::Import);
        assert_eq!(refs[0].target_name, "base");
        assert_eq!(refs[0].line, 1);
        let symbols = extract_symbols(&blob, "forms/main.scx", "main", &config);
        assert!(symbols.iter().all(|s| s.line_start >= 1));
    }

    #[test]
    fn test_bad_version_yields_nothing() {
        let mut blob = form();
        blob[4] = 0x99;
        let config = ExtractorConfig::default();
        assert!(extract_symbols(&blob, "bad.scx", "bad", &config).is_empty());
        assert!(extract_references(&blob, "bad.scx", "bad", &config).is_empty());
        let (scx, sct) = unpack(&blob);
        assert_eq!(parse_records(scx, sct, &config), Err(ScxError::BadVersion(0x99)));
    }

    #[test]
    fn test_truncated_and_clamped_tables() {
        let config = ExtractorConfig::default();
        assert_eq!(parse_records(&[0x30; 10], &[], &config), Err(ScxError::Truncated));
        assert!(extract_symbols(&[1, 2], "tiny.scx", "tiny", &config).is_empty());

        let mut blob = form();
        // Claim a million records; only the three present are read
        blob[4 + 4..4 + 8].copy_from_slice(&1_000_000u32.to_le_bytes());
        let clamped = ExtractorConfig {
            max_scx_records: 2,
            ..ExtractorConfig::default()
        };
        let (scx, sct) = unpack(&blob);
        assert_eq!(parse_records(scx, sct, &clamped).unwrap().len(), 2);
        assert_eq!(parse_records(scx, sct, &config).unwrap().len(), 3);
    }

    #[test]
    fn test_split_procedures() {
        let procedures = split_procedures("PROCEDURE Init\n  x = 1\nENDPROC\nFUNCTION Calc\n  RETURN 2");
        assert_eq!(procedures.len(), 2);
        assert_eq!(procedures[0].keyword, "PROCEDURE");
        assert_eq!(procedures[0].code.len(), 3);
        assert_eq!(procedures[1].name, "Calc");
        assert_eq!(procedures[1].code.len(), 2);
    }
}
