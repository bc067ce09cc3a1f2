//! Loading of uploaded tables: encoding detection followed by delimited parsing, falling back from
//! commas to tabs.

use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use std::path::Path;

use encoding_rs::Encoding;
use strum_macros::Display;
use thiserror::Error;
use tracing::debug;

pub mod detect;

#[cfg(test)]
mod tests;

/// The minimum number of columns in a usable table: a name and at least one value.
pub const MIN_COLUMNS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Delimiter {
    #[strum(to_string = "comma")]
    Comma,
    #[strum(to_string = "tab")]
    Tab,
}
impl Delimiter {
    pub fn byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("input is not valid {0}")]
    Undecodable(&'static str),

    #[error("no header row")]
    Empty,

    #[error("header has {0} column(s), at least {} required", MIN_COLUMNS)]
    TooFewColumns(usize),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unable to parse {encoding} table with either delimiter: {cause}")]
    Unparseable {
        encoding: &'static str,
        cause: ParseError,
    },
}

/// A header row and zero or more data rows of equal width. Cells are trimmed of surrounding
/// whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    encoding: &'static Encoding,
    delimiter: Delimiter,
}
impl Table {
    /// Loads a table from a seekable `stream`, detecting its encoding first. A comma-delimited parse
    /// is attempted before a tab-delimited one; if both fail, the cause of the latter is reported.
    pub fn load<R: BufRead + Seek>(stream: &mut R) -> Result<Self, LoadError> {
        let encoding = detect::detect_encoding(stream)?;
        debug!("detected encoding {}", encoding.name());

        let comma_err = match parse(stream, encoding, Delimiter::Comma)? {
            Ok(table) => return Ok(table),
            Err(err) => err,
        };
        debug!("comma-delimited parse failed ({comma_err}), retrying with tabs");
        match parse(stream, encoding, Delimiter::Tab)? {
            Ok(table) => Ok(table),
            Err(cause) => Err(LoadError::Unparseable {
                encoding: encoding.name(),
                cause,
            }),
        }
    }

    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, LoadError> {
        Self::load(&mut Cursor::new(bytes.as_ref()))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::load(&mut BufReader::new(file))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Iterates over the cells of the column at `index`, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[index].as_str())
    }
}

/// A single parse attempt. The outer result carries I/O failures, which abort loading outright; the
/// inner result carries parse failures, which permit a retry with another delimiter.
fn parse<R: Read + Seek>(
    stream: &mut R,
    encoding: &'static Encoding,
    delimiter: Delimiter,
) -> Result<Result<Table, ParseError>, io::Error> {
    stream.rewind()?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    stream.rewind()?;

    let bom_len = Encoding::for_bom(&bytes).map_or(0, |(_, len)| len);
    let text = match encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..]) {
        Some(text) => text,
        None => return Ok(Err(ParseError::Undecodable(encoding.name()))),
    };
    Ok(parse_text(&text, encoding, delimiter))
}

fn parse_text(
    text: &str,
    encoding: &'static Encoding,
    delimiter: Delimiter,
) -> Result<Table, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(ToString::to_string).collect();
    match headers.len() {
        0 => return Err(ParseError::Empty),
        len if len < MIN_COLUMNS => return Err(ParseError::TooFewColumns(len)),
        _ => {}
    }

    let mut rows = vec![];
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(ToString::to_string).collect());
    }
    debug!(
        "parsed {} row(s) of {} column(s) using {delimiter} delimiter",
        rows.len(),
        headers.len()
    );
    Ok(Table {
        headers,
        rows,
        encoding,
        delimiter,
    })
}
