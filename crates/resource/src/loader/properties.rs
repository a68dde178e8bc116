//! Line-oriented `key = value` property streams.
//!
//! - blank lines and lines starting with `#` or `!` are skipped
//! - the key ends at the first unescaped `=`, `:` or whitespace
//! - a line ending in an odd number of backslashes continues on the next
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes are decoded; any other
//!   escaped character stands for itself
//! - lines that are not valid UTF-8 are decoded as Latin-1

use std::io::{BufRead, BufReader, Read};

use crate::error::{ResourceError, Result};
use crate::search::ResourceStore;
use crate::types::LoadReport;

/// Parses a property stream into `(key, value)` pairs in file order.
///
/// Lines that are not UTF-8 are read as Latin-1. A line whose escapes
/// cannot be decoded is skipped with a warning; only read errors fail.
pub fn parse_properties<R: Read>(reader: R) -> Result<Vec<(String, String)>> {
    let mut reader = BufReader::new(reader);
    let mut line_number = 0;
    let mut pairs = Vec::new();

    while let Some(line) = read_line(&mut reader, &mut line_number)? {
        let mut logical = line.trim_start().to_string();
        if logical.is_empty() || logical.starts_with('#') || logical.starts_with('!') {
            continue;
        }

        let start = line_number;
        while continues(&logical) {
            logical.pop();
            match read_line(&mut reader, &mut line_number)? {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        match split_pair(&logical, start) {
            Ok(pair) => pairs.push(pair),
            Err(err) => log::warn!("skipping property: {err}"),
        }
    }

    Ok(pairs)
}

/// Reads one physical line without its terminator.
fn read_line<R: BufRead>(reader: &mut R, line_number: &mut usize) -> Result<Option<String>> {
    let mut bytes = Vec::new();
    if reader.read_until(b'\n', &mut bytes)? == 0 {
        return Ok(None);
    }
    *line_number += 1;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
    }
    Ok(Some(decode_line(bytes, *line_number)))
}

fn decode_line(bytes: Vec<u8>, line_number: usize) -> String {
    match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(err) => {
            log::debug!("line {line_number} is not UTF-8, reading it as Latin-1");
            err.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&ch| ch == '\\').count() % 2 == 1
}

fn split_pair(line: &str, line_number: usize) -> Result<(String, String)> {
    let mut key_end = line.len();
    let mut escaped = false;
    for (pos, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = pos;
                break;
            }
            ch if ch.is_whitespace() => {
                key_end = pos;
                break;
            }
            _ => {}
        }
    }

    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(|ch: char| ch == '=' || ch == ':') {
        rest = stripped.trim_start();
    }

    let key = unescape(&line[..key_end], line_number)?;
    let value = unescape(rest.trim_end(), line_number)?;
    Ok((key, value))
}

fn unescape(raw: &str, line_number: usize) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4 && hex.chars().all(|ch| ch.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| ResourceError::Properties {
                        line: line_number,
                        message: format!("malformed \\u escape '\\u{hex}'"),
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

impl ResourceStore {
    /// Loads every pair of a property stream into the store.
    ///
    /// Keys that fail the key grammar are skipped and reported. A read
    /// error aborts the load before anything is inserted.
    pub fn read_resources<R: Read>(&self, reader: R) -> Result<LoadReport> {
        let pairs = parse_properties(reader)?;
        let report = self.insert_pairs(pairs);
        log::debug!(
            "loaded {} resources ({} skipped)",
            report.inserted,
            report.skipped.len()
        );
        Ok(report)
    }
}
