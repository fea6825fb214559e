//! Delimited text loader with encoding and delimiter detection.
//!
//! Reads a file into a [`Table`] of text cells. Cells are kept exactly as
//! read (no trimming) since later stages rely on the raw annotations.

use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::logs::{log_info, log_success};
use crate::table::{Cell, Table};

/// Delimiter of the Eurostat source file.
pub const SOURCE_DELIMITER: char = '\t';

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        // encoding_rs follows WHATWG, where latin-1 is decoded as windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text into a table, first line being the header.
///
/// # Example
/// ```
/// use life_expectancy::parser::parse_table;
///
/// let table = parse_table("geo\t2019\nPT\t81.0 b\n", '\t').unwrap();
/// assert_eq!(table.headers(), vec!["geo", "2019"]);
/// assert_eq!(table.height(), 1);
/// ```
pub fn parse_table(content: &str, delimiter: char) -> LoadResult<Table> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let delimiter = u8::try_from(delimiter).map_err(|_| LoadError::MalformedInput {
        line: 0,
        message: format!("delimiter '{}' is not a single byte", delimiter.escape_default()),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(&e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(&e))?;
        rows.push(record.iter().map(Cell::text).collect());
    }

    Table::from_rows(headers, rows).map_err(|e| LoadError::MalformedInput {
        line: 0,
        message: e.to_string(),
    })
}

fn malformed(err: &csv::Error) -> LoadError {
    let line = err.position().map(csv::Position::line).unwrap_or(0);
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("found {} fields, expected {}", len, expected_len),
        _ => err.to_string(),
    };
    LoadError::MalformedInput { line, message }
}

/// Read a file's bytes and decode them with the detected encoding.
pub fn read_text<P: AsRef<Path>>(path: P) -> LoadResult<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let encoding = detect_encoding(&bytes);
    log_info(format!("Detected encoding: {}", encoding));
    Ok(decode_content(&bytes, &encoding))
}

/// Load a delimited file with an explicit delimiter.
pub fn load_table<P: AsRef<Path>>(path: P, delimiter: char) -> LoadResult<Table> {
    let content = read_text(path)?;
    parse_table(&content, delimiter)
}

/// Load a delimited file, detecting the delimiter from its header line.
pub fn load_table_auto<P: AsRef<Path>>(path: P) -> LoadResult<Table> {
    let content = read_text(path)?;
    let delimiter = detect_delimiter(&content);
    log_info(format!("Detected separator: '{}'", delimiter.escape_default()));
    parse_table(&content, delimiter)
}

/// Load the wide, tab-separated source file.
///
/// The first column holds the composite key, the rest are year columns, so
/// fewer than 2 columns is rejected.
pub fn load_raw_table<P: AsRef<Path>>(path: P) -> LoadResult<Table> {
    let path = path.as_ref();
    log_info(format!("Reading {}", path.display()));

    let table = load_table(path, SOURCE_DELIMITER)?;
    if table.width() < 2 {
        return Err(LoadError::TooFewColumns {
            found: table.width(),
        });
    }

    log_success(format!(
        "Read {} rows x {} columns",
        table.height(),
        table.width()
    ));
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    const SAMPLE: &str = "unit,sex,age,geo\\time\t2021 \t2020 \n\
                          YR,F,Y1,PT\t82.3 b\t: \n\
                          YR,M,Y1,DE\t78.9 \t79.0 e\n";

    #[test]
    fn test_parse_keeps_raw_cells() {
        let table = parse_table(SAMPLE, '\t').unwrap();

        assert_eq!(table.headers(), vec!["unit,sex,age,geo\\time", "2021 ", "2020 "]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.column("2021 ").unwrap().cells()[0], Cell::text("82.3 b"));
        assert_eq!(table.column("2020 ").unwrap().cells()[0], Cell::text(": "));
    }

    #[test]
    fn test_header_only() {
        let table = parse_table("a\tb\n", '\t').unwrap();
        assert_eq!(table.height(), 0);
        assert_eq!(table.headers(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_table("a\tb\n1\t2\n\n3\t4\n\n", '\t').unwrap();
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn test_empty_input_error() {
        let result = parse_table("", '\t');
        assert!(matches!(result, Err(LoadError::EmptyFile)));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let err = parse_table("a\tb\n1\t2\t3\n", '\t').unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("found 3 fields, expected 2"));
    }

    #[test]
    fn test_quoted_values() {
        let table = parse_table("unit,region\n\"YR\",\"P,T\"\n", ',').unwrap();
        assert_eq!(table.column("region").unwrap().cells()[0], Cell::text("P,T"));
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("geo\t2019\t2020\nPT\t1\t2"), '\t');
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_default() {
        assert_eq!(detect_delimiter("single"), ';');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_bom_stripped() {
        let decoded = decode_content("\u{feff}a\tb".as_bytes(), "utf-8");
        assert_eq!(decoded, "a\tb");
    }

    #[test]
    fn test_load_raw_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_raw_table(dir.path().join("missing.tsv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    }

    #[test]
    fn test_load_raw_table_single_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "unit,geo\\time\nYR,PT\n").unwrap();

        let err = load_raw_table(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::TooFewColumns { found: 1 }));
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_load_table_auto_comma() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "unit,region,value\nYR,PT,82.3\n").unwrap();

        let table = load_table_auto(file.path()).unwrap();
        assert_eq!(table.headers(), vec!["unit", "region", "value"]);
        assert_eq!(table.height(), 1);
    }
}
