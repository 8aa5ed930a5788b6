// Source decoding for FoxPro files
//
// Legacy sources carry no encoding marker. The cascade is: byte-order mark,
// strict UTF-8, the Windows codepage that decodes a sample with the most
// printable characters, then Latin-1 which accepts every byte.

use encoding_rs::{
    Encoding, BIG5, EUC_KR, GBK, SHIFT_JIS, WINDOWS_1250, WINDOWS_1251, WINDOWS_1252,
    WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256,
};

/// Candidate codepages, most common first; ties keep the earlier one
const CODEPAGES: &[&Encoding] = &[
    WINDOWS_1252,
    WINDOWS_1251,
    WINDOWS_1250,
    WINDOWS_1253,
    WINDOWS_1254,
    WINDOWS_1255,
    WINDOWS_1256,
    SHIFT_JIS,
    GBK,
    EUC_KR,
    BIG5,
];

const SAMPLE_BYTES: usize = 8192;

pub fn decode_source(source: &[u8]) -> String {
    if source.is_empty() {
        return String::new();
    }
    if let Some((encoding, bom_len)) = Encoding::for_bom(source) {
        let (text, _) = encoding.decode_without_bom_handling(&source[bom_len..]);
        return text.into_owned();
    }
    if let Ok(text) = std::str::from_utf8(source) {
        return text.to_string();
    }

    let sample = &source[..source.len().min(SAMPLE_BYTES)];
    let mut best: Option<(&Encoding, usize)> = None;
    for &encoding in CODEPAGES {
        let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(sample)
        else {
            continue;
        };
        let score = printable_count(&text);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((encoding, score));
        }
    }

    if let Some((encoding, _)) = best {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(source) {
            return text.into_owned();
        }
    }
    latin1(source)
}

fn printable_count(text: &str) -> usize {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .count()
}

/// ISO-8859-1: every byte is its own code point
fn latin1(source: &[u8]) -> String {
    source.iter().map(|&b| b as char).collect()
}
