// `.prg` extraction
//
// Statements are classified once (`Statement::parse`), then a small state
// machine turns open/close pairs into symbols. References come from a second
// pass over the same preprocessed lines.

use super::preprocess::Preprocessed;
use crate::extractors::base::{Reference, ReferenceKind, Symbol, SymbolKind, SymbolOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static ROUTINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(FUNCTION|PROCEDURE)\s+(\w+)").unwrap());
static END_ROUTINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*(ENDFUNC|ENDPROC)\b").unwrap());
static CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*DEFINE\s+CLASS\s+(\w+)\s+AS\s+(\w+)(?:\s+OF\s+(\S+))?").unwrap()
});
static END_DEFINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*ENDDEFINE\b").unwrap());
static CONSTANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*#DEFINE\s+(\w+)\s+(.*)").unwrap());
static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\w+)\s*=\s*(.+)").unwrap());

static DO_IN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*DO\s+(\w+)\s+IN\s+(\S+)").unwrap());
static DO_FORM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*DO\s+FORM\s+(\S+)").unwrap());
static DO_PROGRAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*DO\s+(\w+)(?:\s+WITH\b)?").unwrap());
static SET_PROCEDURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*SET\s+PROCEDURE\s+TO\s+(\S+)").unwrap());
static SET_CLASSLIB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*SET\s+CLASSLIB\s+TO\s+(\S+)").unwrap());
static INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^\s*#INCLUDE\s+["']?([^"']+)"#).unwrap());
static CREATE_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bCREATEOBJECT\s*\(\s*["'](\w+)["']"#).unwrap());
static NEW_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bNEWOBJECT\s*\(\s*["'](\w+)["']\s*,\s*["']([^"']+)["']"#).unwrap()
});
static DECLARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*DECLARE\s+\w+\s+(\w+)\s+IN\s+(\S+)").unwrap());
static EXPRESSION_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*=(\w+)\s*\(").unwrap());
static METHOD_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\w+)\.(\w+)\s*\(").unwrap());

/// Statements that look like `name = value` but are not property defaults
const ASSIGNMENT_KEYWORDS: &[&str] = &[
    "IF", "DO", "FOR", "SET", "LOCAL", "PRIVATE", "PUBLIC", "STORE", "RETURN", "ENDFOR", "ENDIF",
    "ENDDO", "ELSE", "OTHERWISE", "CASE",
];

/// `DO CASE` / `DO WHILE` are control flow, not program calls
const DO_KEYWORDS: &[&str] = &["CASE", "WHILE"];

/// Base classes shipped with the runtime; inheriting them is not an edge
const BASE_CLASSES: &[&str] = &[
    "CUSTOM", "SESSION", "FORM", "COMMANDBUTTON", "TEXTBOX", "LABEL", "CONTAINER", "PAGE",
    "PAGEFRAME", "GRID", "COLUMN", "HEADER", "COMBOBOX", "LISTBOX", "EDITBOX", "SPINNER", "TIMER",
    "IMAGE", "SHAPE", "LINE", "COMMANDGROUP", "OPTIONGROUP", "CHECKBOX", "OPTIONBUTTON",
];

/// Built-in functions, excluded from call references
static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // math
        "ABS", "ACOS", "ASIN", "ATN2", "CEILING", "COS", "EXP", "FLOOR", "FV", "INT", "LOG",
        "LOG10", "MAX", "MIN", "MOD", "PI", "PV", "RAND", "ROUND", "SIGN", "SIN", "SQRT", "TAN",
        "VAL",
        // strings
        "ALLTRIM", "ASC", "AT", "ATC", "ATCC", "ATCLINE", "ATLINE", "AT_C", "CHR", "CHRTRAN",
        "CHRTRANC", "DIFFERENCE", "GETWORDCOUNT", "GETWORDNUM", "LEFT", "LEFTC", "LEN", "LENC",
        "LIKE", "LIKEC", "LOWER", "LTRIM", "MLINE", "MEMLINES", "OCCURS", "PADL", "PADC", "PADR",
        "PROPER", "RAT", "RATC", "RATLINE", "REPLICATE", "RIGHT", "RIGHTC", "RTRIM", "SOUNDEX",
        "SPACE", "STR", "STRCONV", "STREXTRACT", "STRTRAN", "STUFF", "STUFFC", "SUBSTR",
        "SUBSTRC", "TEXTMERGE", "TRANSFORM", "TRIM", "UPPER",
        // dates
        "CDOW", "CMONTH", "CTOD", "CTOT", "DATE", "DATETIME", "DAY", "DMY", "DOW", "DTOC", "DTOR",
        "DTOS", "DTOT", "GOMONTH", "HOUR", "MDY", "MINUTE", "MONTH", "QUARTER", "SEC", "SECONDS",
        "TIME", "TTOC", "TTOD", "WEEK", "YEAR",
        // types
        "BINTOC", "CAST", "CTOBIN", "CPCONVERT", "CPCURRENT", "EMPTY", "EVALUATE", "EVL", "IIF",
        "ICASE", "ISALPHA", "ISBLANK", "ISDIGIT", "ISLEADBYTE", "ISLOWER", "ISNULL", "ISUPPER",
        "NVL", "TYPE", "VARTYPE",
        // files
        "ADDBS", "CURDIR", "DEFAULTEXT", "DIRECTORY", "DRIVETYPE", "FCHSIZE", "FCLOSE", "FCOUNT",
        "FCREATE", "FDATE", "FEOF", "FERROR", "FFLUSH", "FGETS", "FILE", "FILETOSTR", "FLDCOUNT",
        "FLOCK", "FOPEN", "FORCEEXT", "FORCEPATH", "FPUTS", "FREAD", "FSEEK", "FSIZE", "FTIME",
        "FULLPATH", "FWRITE", "GETDIR", "GETFILE", "HOME", "JUSTDRIVE", "JUSTEXT", "JUSTFNAME",
        "JUSTPATH", "JUSTSTEM", "LOCFILE", "PUTFILE", "STRTOFILE",
        // cursors and tables
        "ALIAS", "BOF", "CANDIDATE", "CDX", "CPDBF", "CURSORGETPROP", "CURSORSETPROP",
        "CURSORTOXML", "CURVAL", "DBF", "DBGETPROP", "DBSETPROP", "DBUSED", "DBC", "EOF", "FIELD",
        "FILTER", "FOUND", "GETFLDSTATE", "GETNEXTMODIFIED", "HEADER", "IDXCOLLATE", "INDBC",
        "INDEXSEEK", "ISEXCLUSIVE", "ISFLOCKED", "ISMARKED", "ISREADONLY", "ISRLOCKED", "KEY",
        "KEYMATCH", "LOCK", "LOOKUP", "LUPDATE", "MTON", "NTOM", "OLDVAL", "ORDER", "RECCOUNT",
        "RECNO", "RECSIZE", "RELATION", "REQUERY", "RLOCK", "SEEK", "SELECT", "SETFLDSTATE",
        "TABLEUPDATE", "TABLEREVERT", "TAG", "TAGCOUNT", "TAGNO", "TARGET", "TXNLEVEL", "USED",
        "XMLTOCURSOR", "XMLUPDATEGRAM",
        // arrays
        "ACOPY", "ADATABASES", "ADBOBJECTS", "ADEL", "ADIR", "AELEMENT", "AERROR", "AFIELDS",
        "AFONT", "AGETCLASS", "AGETFILEVERSION", "AINS", "AINSTANCE", "ALANGUAGE", "ALEN",
        "ALINES", "AMEMBERS", "ANETRESOURCES", "APRINTERS", "APROCINFO", "ASCAN", "ASELOBJ",
        "ASESSIONS", "ASORT", "ASTACKINFO", "ASUBSCRIPT", "AUSED", "AVCXCLASSES",
        // objects
        "ACLASS", "COMPOBJ", "COMPROP", "CREATEOBJECT", "DODEFAULT", "GETINTERFACE", "GETOBJECT",
        "GETPEM", "NEWOBJECT", "PEMSTATUS",
        // user interface
        "BAR", "BARCOUNT", "BARPROMPT", "CAPSLOCK", "CNTBAR", "CNTPAD", "FONTMETRIC", "GETCOLOR",
        "GETCP", "GETEXPR", "GETFONT", "GETPICT", "GETPRINTER", "INKEY", "INPUTBOX", "INSMODE",
        "LASTKEY", "MCOL", "MDOWN", "MESSAGEBOX", "MROW", "MWINDOW", "NUMLOCK", "OBJNUM",
        "OBJTOCLIENT", "OBJVAR", "PAD", "PRMBAR", "PRMPAD", "PROMPT", "PRTINFO", "RGB",
        "RGBSCHEME", "ROW", "SCHEME", "SCOLS", "SKPBAR", "SKPPAD", "SROWS", "SYSMETRIC",
        "TXTWIDTH", "WBORDER", "WCHILD", "WCOLS", "WDOCKABLE", "WEXIST", "WFONT", "WLAST",
        "WLCOL", "WLROW", "WMAXIMUM", "WMINIMUM", "WONTOP", "WOUTPUT", "WPARENT", "WREAD",
        "WROWS", "WTITLE", "WVISIBLE",
        // environment
        "DISKSPACE", "EXECSCRIPT", "GETENV", "GETHOST", "LINENO", "MEMORY", "MESSAGE", "ON", "OS",
        "PARAMETERS", "PCOUNT", "PRINTSTATUS", "PROGRAM", "RDLEVEL", "SET", "SYS", "VERSION",
        // bits
        "BITAND", "BITCLEAR", "BITLSHIFT", "BITNOT", "BITOR", "BITRSHIFT", "BITSET", "BITTEST",
        "BITXOR",
        // events
        "BINDEVENT", "RAISEEVENT", "UNBINDEVENTS",
        // misc
        "ANSITOOEM", "BETWEEN", "CHRSAW", "INLIST", "OEMTOANSI", "TEXTWIDTH", "VARREAD",
    ]
    .into_iter()
    .collect()
});

fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(name.to_uppercase().as_str())
}

/// One preprocessed statement, as far as the symbol pass cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'s> {
    ClassOpen { name: &'s str, base: &'s str },
    ClassClose,
    RoutineOpen { keyword: String, name: &'s str },
    RoutineClose,
    Constant { name: &'s str, value: &'s str },
    Assignment { name: &'s str, value: &'s str },
    Other,
}

impl<'s> Statement<'s> {
    pub fn parse(line: &'s str) -> Self {
        if END_DEFINE.is_match(line) {
            return Self::ClassClose;
        }
        if END_ROUTINE.is_match(line) {
            return Self::RoutineClose;
        }
        if let Some(caps) = CLASS.captures(line) {
            if let (Some(name), Some(base)) = (caps.get(1), caps.get(2)) {
                return Self::ClassOpen {
                    name: name.as_str(),
                    base: base.as_str(),
                };
            }
        }
        if let Some(caps) = ROUTINE.captures(line) {
            if let (Some(keyword), Some(name)) = (caps.get(1), caps.get(2)) {
                return Self::RoutineOpen {
                    keyword: keyword.as_str().to_uppercase(),
                    name: name.as_str(),
                };
            }
        }
        if let Some(caps) = CONSTANT.captures(line) {
            if let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) {
                return Self::Constant {
                    name: name.as_str(),
                    value: value.as_str().trim(),
                };
            }
        }
        if let Some(caps) = ASSIGNMENT.captures(line) {
            if let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) {
                if !ASSIGNMENT_KEYWORDS.contains(&name.as_str().to_uppercase().as_str()) {
                    return Self::Assignment {
                        name: name.as_str(),
                        value: value.as_str().trim(),
                    };
                }
            }
        }
        Self::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    TopLevel,
    InClass,
    InMethod,
}

impl State {
    pub fn next(self, statement: &Statement) -> Self {
        match (self, statement) {
            (_, Statement::ClassOpen { .. }) => State::InClass,
            (_, Statement::ClassClose) => State::TopLevel,
            (State::InClass | State::InMethod, Statement::RoutineOpen { .. }) => State::InMethod,
            (State::InMethod, Statement::RoutineClose) => State::InClass,
            (state, _) => state,
        }
    }
}

struct OpenClass {
    name: String,
    base: String,
    start: u32,
}

struct OpenRoutine {
    name: String,
    keyword: String,
    start: u32,
}

/// Symbol pass over one preprocessed file
#[derive(Default)]
struct SymbolMachine {
    state: Option<State>,
    class: Option<OpenClass>,
    routine: Option<OpenRoutine>,
    has_routine: bool,
    symbols: Vec<Symbol>,
}

impl SymbolMachine {
    fn state(&self) -> State {
        self.state.unwrap_or(State::TopLevel)
    }

    fn step(&mut self, statement: Statement, line: u32) {
        match &statement {
            Statement::ClassClose => {
                self.close_routine(line);
                self.close_class(line);
            }
            Statement::RoutineClose => self.close_routine(line),
            Statement::ClassOpen { name, base } => {
                self.close_routine(line.saturating_sub(1));
                self.close_class(line.saturating_sub(1));
                self.class = Some(OpenClass {
                    name: name.to_string(),
                    base: base.to_string(),
                    start: line,
                });
                self.has_routine = true;
            }
            Statement::RoutineOpen { keyword, name } => {
                // Routines may omit ENDFUNC; the next one closes them
                self.close_routine(line.saturating_sub(1));
                self.routine = Some(OpenRoutine {
                    name: name.to_string(),
                    keyword: keyword.clone(),
                    start: line,
                });
                self.has_routine = true;
            }
            Statement::Constant { name, value } => {
                let value: String = value.chars().take(60).collect();
                self.symbols.push(Symbol::new(
                    *name,
                    SymbolKind::Constant,
                    line,
                    line,
                    SymbolOptions {
                        signature: Some(format!("#DEFINE {} {}", name, value)),
                        ..Default::default()
                    },
                ));
            }
            Statement::Assignment { name, value } => {
                if self.state() == State::InClass && self.routine.is_none() {
                    if let Some(class) = &self.class {
                        let shown: String = value.chars().take(40).collect();
                        self.symbols.push(Symbol::new(
                            *name,
                            SymbolKind::Property,
                            line,
                            line,
                            SymbolOptions {
                                qualified_name: Some(format!("{}.{}", class.name, name)),
                                signature: Some(format!("{} = {}", name, shown)),
                                parent_name: Some(class.name.clone()),
                                ..Default::default()
                            },
                        ));
                    }
                }
            }
            Statement::Other => {}
        }
        self.state = Some(self.state().next(&statement));
    }

    fn close_routine(&mut self, end: u32) {
        let Some(routine) = self.routine.take() else {
            return;
        };
        let (kind, qualified_name, parent_name) = match &self.class {
            Some(class) => (
                SymbolKind::Method,
                format!("{}.{}", class.name, routine.name),
                Some(class.name.clone()),
            ),
            None => (SymbolKind::Function, routine.name.clone(), None),
        };
        self.symbols.push(Symbol::new(
            routine.name.clone(),
            kind,
            routine.start,
            end,
            SymbolOptions {
                qualified_name: Some(qualified_name),
                signature: Some(format!("{} {}", routine.keyword, routine.name)),
                parent_name,
                ..Default::default()
            },
        ));
    }

    fn close_class(&mut self, end: u32) {
        let Some(class) = self.class.take() else {
            return;
        };
        self.symbols.push(Symbol::new(
            class.name.clone(),
            SymbolKind::Class,
            class.start,
            end,
            SymbolOptions {
                signature: Some(format!("DEFINE CLASS {} AS {}", class.name, class.base)),
                ..Default::default()
            },
        ));
    }
}

pub fn extract_symbols(source: &[u8], file_stem: &str) -> Vec<Symbol> {
    let pre = Preprocessed::new(source);
    let mut machine = SymbolMachine::default();
    let mut has_code = false;
    for (line, text) in pre.statements() {
        has_code = true;
        machine.step(Statement::parse(text), line);
    }

    let last = pre.last_line();
    machine.close_routine(last);
    machine.close_class(last);

    // A script with no routines runs as one program named after the file
    if !machine.has_routine && has_code {
        machine.symbols.push(Symbol::new(
            file_stem,
            SymbolKind::Function,
            1,
            last,
            SymbolOptions {
                signature: Some(format!("DO {}", file_stem)),
                ..Default::default()
            },
        ));
    }
    machine.symbols
}

pub fn extract_references(source: &[u8]) -> Vec<Reference> {
    let pre = Preprocessed::new(source);
    let mut refs = Vec::new();
    let mut class: Option<String> = None;
    let mut routine: Option<String> = None;

    for (line, text) in pre.statements() {
        match Statement::parse(text) {
            Statement::ClassOpen { name, base } => {
                class = Some(name.to_string());
                if !BASE_CLASSES.contains(&base.to_uppercase().as_str()) {
                    refs.push(Reference::new(ReferenceKind::Inherits, base, line, Some(name)));
                }
                continue;
            }
            Statement::RoutineOpen { name, .. } => {
                routine = Some(name.to_string());
                continue;
            }
            Statement::RoutineClose => {
                routine = None;
                continue;
            }
            Statement::ClassClose => {
                class = None;
                routine = None;
                continue;
            }
            _ => {}
        }

        let scope = match (&class, &routine) {
            (Some(class), Some(routine)) => Some(format!("{}.{}", class, routine)),
            (Some(class), None) => Some(class.clone()),
            (None, routine) => routine.clone(),
        };
        statement_references(text, line, scope.as_deref(), &mut refs);
    }
    refs
}

/// References on one statement line; shared with form method code
pub fn statement_references(text: &str, line: u32, scope: Option<&str>, refs: &mut Vec<Reference>) {
    let call = |target: &str| Reference::new(ReferenceKind::Call, target, line, scope);
    let import = |path: &str| {
        Reference::new(ReferenceKind::Import, module_name(path), line, scope).with_import_path(path)
    };

    if let Some(caps) = DO_IN.captures(text) {
        if let (Some(proc), Some(lib)) = (caps.get(1), caps.get(2)) {
            refs.push(call(proc.as_str()).with_import_path(unquote(lib.as_str())));
            return;
        }
    }
    if let Some(form) = DO_FORM.captures(text).and_then(|c| c.get(1)) {
        refs.push(call(strip_extension(unquote(form.as_str()))));
        return;
    }
    if let Some(program) = DO_PROGRAM.captures(text).and_then(|c| c.get(1)) {
        if !DO_KEYWORDS.contains(&program.as_str().to_uppercase().as_str()) {
            refs.push(call(program.as_str()));
            return;
        }
    }
    for pattern in [&*SET_PROCEDURE, &*SET_CLASSLIB, &*INCLUDE] {
        if let Some(path) = pattern.captures(text).and_then(|c| c.get(1)) {
            refs.push(import(unquote(path.as_str().trim())));
            return;
        }
    }

    for caps in CREATE_OBJECT.captures_iter(text) {
        if let Some(class) = caps.get(1) {
            refs.push(call(class.as_str()));
        }
    }
    for caps in NEW_OBJECT.captures_iter(text) {
        if let (Some(class), Some(lib)) = (caps.get(1), caps.get(2)) {
            refs.push(call(class.as_str()).with_import_path(lib.as_str()));
        }
    }
    if let Some(caps) = DECLARE.captures(text) {
        if let (Some(function), Some(dll)) = (caps.get(1), caps.get(2)) {
            refs.push(call(function.as_str()).with_import_path(unquote(dll.as_str())));
            return;
        }
    }
    if let Some(function) = EXPRESSION_CALL.captures(text).and_then(|c| c.get(1)) {
        if !is_builtin(function.as_str()) {
            refs.push(call(function.as_str()));
        }
    }
    for caps in METHOD_CALL.captures_iter(text) {
        if let Some(method) = caps.get(2) {
            if !is_builtin(method.as_str()) {
                refs.push(call(method.as_str()));
            }
        }
    }
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'')
}

/// `lib\utils.prg` -> `utils`
fn module_name(path: &str) -> &str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    strip_extension(base)
}

fn strip_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains(['/', '\\']) => stem,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_function() {
        let symbols = extract_symbols(b"FUNCTION Add\n  RETURN 1\nENDFUNC", "math");
        assert_eq!(symbols.len(), 1);
        let add = &symbols[0];
        assert_eq!(add.name, "Add");
        assert_eq!(add.kind, SymbolKind::Function);
        assert_eq!((add.line_start, add.line_end), (1, 3));
        assert_eq!(add.signature.as_deref(), Some("FUNCTION Add"));
    }

    #[test]
    fn test_state_transitions() {
        let open_class = Statement::parse("DEFINE CLASS Invoice AS Custom");
        let open_method = Statement::parse("PROCEDURE Init");
        let close_method = Statement::parse("ENDPROC");
        let close_class = Statement::parse("ENDDEFINE");

        let state = State::TopLevel.next(&open_class);
        assert_eq!(state, State::InClass);
        let state = state.next(&open_method);
        assert_eq!(state, State::InMethod);
        assert_eq!(state.next(&close_method), State::InClass);
        assert_eq!(state.next(&close_class), State::TopLevel);
        assert_eq!(State::TopLevel.next(&open_method), State::TopLevel);
        assert_eq!(
            Statement::parse("#DEFINE MAX_ROWS 100"),
            Statement::Constant {
                name: "MAX_ROWS",
                value: "100"
            }
        );
        assert_eq!(Statement::parse("IF x = 1"), Statement::Other);
    }

    #[test]
    fn test_classes_methods_and_properties() {
        let source = b"#DEFINE TAX_RATE 0.2
DEFINE CLASS Invoice AS BaseDoc OF lib\\docs.vcx
  Total = 0
  PROCEDURE Init
    THIS.Reset()
  ENDPROC
  FUNCTION Compute
    RETURN THIS.Total * TAX_RATE
ENDDEFINE

PROCEDURE Main
  loInv = CREATEOBJECT(\"Invoice\")
";
        let symbols = extract_symbols(source, "billing");
        let found: Vec<_> = symbols
            .iter()
            .map(|s| (s.qualified_name.as_str(), s.kind.clone(), s.line_start, s.line_end))
            .collect();
        assert_eq!(
            found,
            vec![
                ("TAX_RATE", SymbolKind::Constant, 1, 1),
                ("Invoice.Total", SymbolKind::Property, 3, 3),
                ("Invoice.Init", SymbolKind::Method, 4, 6),
                ("Invoice.Compute", SymbolKind::Method, 7, 9),
                ("Invoice", SymbolKind::Class, 2, 9),
                ("Main", SymbolKind::Function, 11, 13),
            ]
        );
        assert_eq!(symbols[4].signature.as_deref(), Some("DEFINE CLASS Invoice AS BaseDoc"));
        assert_eq!(symbols[2].parent_name.as_deref(), Some("Invoice"));
    }

    #[test]
    fn test_script_without_routines() {
        let symbols = extract_symbols(b"SET TALK OFF\nDO setup\n", "startup");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "startup");
        assert_eq!(symbols[0].signature.as_deref(), Some("DO startup"));
        assert_eq!((symbols[0].line_start, symbols[0].line_end), (1, 3));

        assert!(extract_symbols(b"* only a comment\n", "empty").is_empty());
    }

    #[test]
    fn test_references() {
        let source = b"SET PROCEDURE TO lib\\utils.prg
DEFINE CLASS Invoice AS BaseDoc
  PROCEDURE Print
    DO FORM forms\\preview.scx
    DO report IN reports.prg
    =Notify(THIS)
    lcName = ALLTRIM(THIS.Format())
    DECLARE INTEGER GetTickCount IN kernel32
  ENDPROC
ENDDEFINE
DO CASE
ENDCASE
";
        let refs = extract_references(source);
        let found: Vec<_> = refs
            .iter()
            .map(|r| {
                (
                    r.kind.clone(),
                    r.target_name.as_str(),
                    r.line,
                    r.source_name.as_deref(),
                    r.import_path.as_deref(),
                )
            })
            .collect();
        assert_eq!(
            found,
            vec![
                (ReferenceKind::Import, "utils", 1, None, Some("lib\\utils.prg")),
                (ReferenceKind::Inherits, "BaseDoc", 2, Some("Invoice"), None),
                (ReferenceKind::Call, "forms\\preview", 4, Some("Invoice.Print"), None),
                (ReferenceKind::Call, "report", 5, Some("Invoice.Print"), Some("reports.prg")),
                (ReferenceKind::Call, "Notify", 6, Some("Invoice.Print"), None),
                (ReferenceKind::Call, "Format", 7, Some("Invoice.Print"), None),
                (ReferenceKind::Call, "GetTickCount", 8, Some("Invoice.Print"), Some("kernel32")),
            ]
        );
    }
}
