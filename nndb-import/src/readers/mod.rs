//! SR27 ASCII file readers
//!
//! The distribution files are caret-delimited, one record per line, with
//! text fields wrapped in tildes:
//!
//! ```text
//! ~01001~^~0100~^~Butter, salted~^~BUTTER,WITH SALT~^~~^~~^~Y~^~~^0^~~^6.38^4.27^8.79^3.87
//! ```
//!
//! Although documented as ASCII, the files carry ISO-8859-1 bytes (the
//! micro sign in NUTR_DEF, accented names in DATA_SRC), so every byte is
//! decoded as latin-1 rather than UTF-8.

pub mod tables;

use crate::error::{ImportError, ImportResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub use tables::*;

/// Source file names as shipped in the SR27 ASCII distribution
pub mod files {
    pub const FOOD_DES: &str = "FOOD_DES.txt";
    pub const NUT_DATA: &str = "NUT_DATA.txt";
    pub const WEIGHT: &str = "WEIGHT.txt";
    pub const FOOTNOTE: &str = "FOOTNOTE.txt";
    pub const FD_GROUP: &str = "FD_GROUP.txt";
    pub const LANGUAL: &str = "LANGUAL.txt";
    pub const LANGDESC: &str = "LANGDESC.txt";
    pub const NUTR_DEF: &str = "NUTR_DEF.txt";
    pub const SRC_CD: &str = "SRC_CD.txt";
    pub const DERIV_CD: &str = "DERIV_CD.txt";
    pub const DATA_SRC: &str = "DATA_SRC.txt";
    pub const DATSRCLN: &str = "DATSRCLN.txt";

    /// Every file the importer reads
    pub const ALL: [&str; 12] = [
        FOOD_DES, NUT_DATA, WEIGHT, FOOTNOTE, FD_GROUP, LANGUAL, LANGDESC, NUTR_DEF, SRC_CD,
        DERIV_CD, DATA_SRC, DATSRCLN,
    ];
}

/// One parsed line: positional fields plus its 1-based line number
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: usize,
    fields: Vec<String>,
}

impl RawRecord {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    /// Field at `idx`; missing trailing fields read as empty
    pub fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }

    pub fn text(&self, idx: usize) -> String {
        self.field(idx).to_string()
    }

    /// Numeric field; empty or unparseable values are absent
    pub fn number(&self, idx: usize) -> Option<f64> {
        parse_number(self.field(idx))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A record type read from one SR27 file
pub trait NndbRecord: Sized {
    /// File name within the distribution directory
    const FILE: &'static str;

    fn from_raw(raw: &RawRecord) -> Self;
}

/// Decode a latin-1 line into trimmed, tilde-stripped fields
///
/// Returns `None` for blank lines.
pub fn parse_line(bytes: &[u8]) -> Option<Vec<String>> {
    let decoded: String = bytes.iter().map(|&b| b as char).collect();
    let line = decoded.trim();
    if line.is_empty() {
        return None;
    }

    Some(line.split('^').map(strip_tildes).collect())
}

fn strip_tildes(field: &str) -> String {
    if field.len() > 1 && field.starts_with('~') && field.ends_with('~') {
        field[1..field.len() - 1].to_string()
    } else {
        field.to_string()
    }
}

/// Parse a numeric field, treating empty or malformed input as absent
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Streaming reader over the raw records of one file
pub struct RecordReader<R> {
    reader: R,
    path: PathBuf,
    line: usize,
    buf: Vec<u8>,
}

impl RecordReader<BufReader<File>> {
    /// Open a distribution file for reading
    pub fn open(path: &Path) -> ImportResult<Self> {
        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Adapt into an iterator of typed records
    pub fn typed<T: NndbRecord>(self) -> TypedRecords<T, R> {
        TypedRecords {
            inner: self,
            _marker: PhantomData,
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = ImportResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    if let Some(fields) = parse_line(&self.buf) {
                        return Some(Ok(RawRecord::new(self.line, fields)));
                    }
                }
                Err(source) => {
                    return Some(Err(ImportError::Io {
                        path: self.path.clone(),
                        source,
                    }))
                }
            }
        }
    }
}

/// Iterator of `(line, record)` pairs for one record type
pub struct TypedRecords<T, R> {
    inner: RecordReader<R>,
    _marker: PhantomData<T>,
}

impl<T: NndbRecord, R: BufRead> Iterator for TypedRecords<T, R> {
    type Item = ImportResult<(usize, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|raw| raw.map(|raw| (raw.line, T::from_raw(&raw))))
    }
}

/// Open the typed record stream for `T` inside `dir`
pub fn records<T: NndbRecord>(dir: &Path) -> ImportResult<TypedRecords<T, BufReader<File>>> {
    Ok(RecordReader::open(&dir.join(T::FILE))?.typed())
}

/// Read a two-column code file into a code → description map
///
/// The empty code always maps to the empty description, so records with a
/// blank code resolve without special casing.
pub fn read_lookup(path: &Path) -> ImportResult<HashMap<String, String>> {
    let mut lookup = HashMap::new();
    lookup.insert(String::new(), String::new());

    for raw in RecordReader::open(path)? {
        let raw = raw?;
        lookup.insert(raw.text(0), raw.text(1));
    }

    Ok(lookup)
}

/// Read a whole file into a map keyed by `key`; later duplicates win
pub fn read_keyed<T, F>(dir: &Path, key: F) -> ImportResult<HashMap<String, T>>
where
    T: NndbRecord,
    F: Fn(&T) -> String,
{
    let mut map = HashMap::new();
    for item in records::<T>(dir)? {
        let (_, record) = item?;
        map.insert(key(&record), record);
    }
    Ok(map)
}
