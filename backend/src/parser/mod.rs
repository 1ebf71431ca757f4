//! CSV loader with encoding and delimiter auto-detection.
//!
//! Decodes raw bytes, sniffs the delimiter from the header row, checks the
//! header against the table's required columns and deserializes every row
//! into its typed model. No join or aggregation logic here.

pub mod fields;

use csv::{ReaderBuilder, Trim};
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::InputTable;
use crate::validation::validate_table_headers;

/// Result of loading one table, with metadata
#[derive(Debug, Clone)]
pub struct ParseResult<T> {
    /// Decoded records
    pub records: Vec<T>,
    /// Detected encoding
    pub encoding: String,
    /// Detected or configured delimiter
    pub delimiter: char,
    /// Column headers as found in the file
    pub headers: Vec<String>,
}

impl<T> ParseResult<T> {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

/// Header-level summary of a file, for the `inspect` command
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Bytes handed to chardet when the input is not valid UTF-8
const DETECTION_SAMPLE: usize = 64 * 1024;

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is taken as is; chardet only looks at a prefix of
/// anything else.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let sample = &bytes[..bytes.len().min(DETECTION_SAMPLE)];
    let result = chardet::detect(sample);
    let charset = result.0;

    // Normalize charset names; the bytes are known not to be UTF-8
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "windows-1252".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        // UTF-8 and unknown charsets: lossy UTF-8
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

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
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

fn delimiter_byte(table: &str, delimiter: char) -> CsvResult<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(CsvError::Parse {
            table: table.to_string(),
            line: 1,
            message: format!("delimiter '{}' is not a single-byte character", delimiter),
        })
    }
}

/// Decode bytes and build a csv reader over them.
fn open_reader(
    table: &str,
    bytes: &[u8],
    delimiter: Option<char>,
) -> CsvResult<(csv::Reader<std::io::Cursor<Vec<u8>>>, String, char)> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);

    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile(table.to_string()));
    }

    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let reader = ReaderBuilder::new()
        .delimiter(delimiter_byte(table, delimiter)?)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(std::io::Cursor::new(content.into_bytes()));

    Ok((reader, encoding, delimiter))
}

fn read_headers<R: std::io::Read>(table: &str, reader: &mut csv::Reader<R>) -> CsvResult<Vec<String>> {
    let headers = reader.headers().map_err(|e| CsvError::Parse {
        table: table.to_string(),
        line: 1,
        message: format!("Cannot read header: {}", e),
    })?;
    Ok(headers.iter().map(|h| h.trim().to_string()).collect())
}

/// Parse table bytes into typed records.
///
/// # Example
/// ```ignore
/// use tpp::models::Game;
/// use tpp::parser::parse_table_bytes;
///
/// let csv = "game_id,date\n1,2020-01-01\n2,2020-01-08";
/// let games = parse_table_bytes::<Game>(csv.as_bytes(), None).unwrap();
///
/// assert_eq!(games.records.len(), 2);
/// assert_eq!(games.delimiter, ',');
/// ```
pub fn parse_table_bytes<T: InputTable>(
    bytes: &[u8],
    delimiter: Option<char>,
) -> CsvResult<ParseResult<T>> {
    let (mut reader, encoding, delimiter) = open_reader(T::NAME, bytes, delimiter)?;
    let headers = read_headers(T::NAME, &mut reader)?;

    validate_table_headers::<T>(&headers).map_err(|columns| CsvError::MissingColumns {
        table: T::NAME.to_string(),
        columns,
    })?;

    let mut records = Vec::new();
    for result in reader.deserialize::<T>() {
        let record = result.map_err(|e| CsvError::Parse {
            table: T::NAME.to_string(),
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Load a table from `dir/T::FILE_NAME`.
pub fn read_table<T: InputTable>(dir: &Path, delimiter: Option<char>) -> CsvResult<ParseResult<T>> {
    read_table_file::<T>(&dir.join(T::FILE_NAME), delimiter)
}

/// Load a table from an explicit path.
pub fn read_table_file<T: InputTable>(path: &Path, delimiter: Option<char>) -> CsvResult<ParseResult<T>> {
    if !path.is_file() {
        return Err(CsvError::MissingFile(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    parse_table_bytes::<T>(&bytes, delimiter)
}

/// Read only the shape of a file: encoding, delimiter, headers, row count.
pub fn inspect_file(path: &Path, delimiter: Option<char>) -> CsvResult<TableInfo> {
    if !path.is_file() {
        return Err(CsvError::MissingFile(path.to_path_buf()));
    }
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input")
        .to_string();
    let bytes = std::fs::read(path)?;
    let (mut reader, encoding, delimiter) = open_reader(&name, &bytes, delimiter)?;
    let headers = read_headers(&name, &mut reader)?;

    let mut row_count = 0;
    for record in reader.records() {
        record.map_err(|e| CsvError::Parse {
            table: name.clone(),
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        row_count += 1;
    }

    Ok(TableInfo {
        encoding,
        delimiter,
        headers,
        row_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appearance, Club, Game, Transfer};

    #[test]
    fn test_simple_table() {
        let csv = "game_id,date\n1,2020-01-01\n2,2020-01-08";
        let result = parse_table_bytes::<Game>(csv.as_bytes(), None).unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].game_id, 1);
        assert_eq!(result.records[1].date.as_deref(), Some("2020-01-08"));
        assert_eq!(result.headers, vec!["game_id", "date"]);
    }

    #[test]
    fn test_semicolon_and_quotes() {
        let csv = "game_id;date\n\"7\";\"2021-03-01\"";
        let result = parse_table_bytes::<Game>(csv.as_bytes(), None).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.records[0].game_id, 7);
        assert_eq!(result.records[0].date.as_deref(), Some("2021-03-01"));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "game_id,player_id\n1,2";
        let err = parse_table_bytes::<Appearance>(csv.as_bytes(), None).unwrap_err();
        match err {
            CsvError::MissingColumns { table, columns } => {
                assert_eq!(table, "appearances");
                assert!(columns.contains(&"goals".to_string()));
                assert!(!columns.contains(&"player_id".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lenient_stat_cells() {
        let csv = "game_id,player_id,player_club_id,player_name,goals,assists,minutes_played,yellow_cards,red_cards\n\
                   1,10.0,5,Ann,,NaN,90,1.0,x";
        let result = parse_table_bytes::<Appearance>(csv.as_bytes(), None).unwrap();
        let app = &result.records[0];

        assert_eq!(app.player_id, 10);
        assert_eq!(app.goals, 0);
        assert_eq!(app.assists, 0);
        assert_eq!(app.minutes_played, 90);
        assert_eq!(app.yellow_cards, 1);
        assert_eq!(app.red_cards, 0);
    }

    #[test]
    fn test_bad_identifier_reports_line() {
        let csv = "game_id,date\n1,2020-01-01\noops,2020-01-02";
        let err = parse_table_bytes::<Game>(csv.as_bytes(), None).unwrap_err();
        match err {
            CsvError::Parse { table, line, .. } => {
                assert_eq!(table, "games");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_transfer_season_alias_and_optionals() {
        let csv = "player_id,transfer_date,transfer_season,from_club_id,to_club_id,transfer_fee,market_value_in_eur\n\
                   3,,19/20,1,,End of loan,";
        let result = parse_table_bytes::<Transfer>(csv.as_bytes(), None).unwrap();
        let t = &result.records[0];

        assert_eq!(t.season.as_deref(), Some("19/20"));
        assert_eq!(t.transfer_date, None);
        assert_eq!(t.to_club_id, None);
        assert_eq!(t.transfer_fee.as_deref(), Some("End of loan"));
        assert_eq!(t.age, None);
        assert!(!result.has_column("age"));
    }

    #[test]
    fn test_empty_file_error() {
        let err = parse_table_bytes::<Game>(b"", None).unwrap_err();
        assert!(matches!(err, CsvError::EmptyFile(ref t) if t == "games"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let csv = "\u{feff}game_id,date\n1,2020-01-01";
        let result = parse_table_bytes::<Game>(csv.as_bytes(), None).unwrap();
        assert_eq!(result.headers[0], "game_id");
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_pipe() {
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_utf8_names_survive() {
        let csv = "club_id,domestic_competition_id,name\n1,GB1,Arsenal\n2,ES1,Atlético de Madrid\n3,DK1,FC København\n";
        let result = parse_table_bytes::<Club>(csv.as_bytes(), None).unwrap();

        assert_eq!(result.encoding, "utf-8");
        let names: Vec<_> = result.records.iter().map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec![Some("Arsenal"), Some("Atlético de Madrid"), Some("FC København")]);
    }

    #[test]
    fn test_detect_encoding_utf8_and_latin1() {
        assert_eq!(detect_encoding("Málaga,Sevilla".as_bytes()), "utf-8");
        assert_eq!(detect_encoding(b"plain ascii"), "utf-8");

        // "Málaga" in ISO-8859-1 is not valid UTF-8
        let latin1: &[u8] = &[0x4D, 0xE1, 0x6C, 0x61, 0x67, 0x61];
        assert_ne!(detect_encoding(latin1), "utf-8");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Málaga" in ISO-8859-1
        let bytes: &[u8] = &[0x4D, 0xE1, 0x6C, 0x61, 0x67, 0x61];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Málaga");
    }
}
