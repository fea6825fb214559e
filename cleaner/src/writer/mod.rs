//! CSV writer for the cleaned table.
//!
//! Output is comma-separated with a header row and no index column. Numbers
//! are written with one fractional digit, the precision of the source
//! observations.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{WriteError, WriteResult};
use crate::logs::log_success;
use crate::table::{Cell, Table};

/// Delimiter of the output file.
pub const OUTPUT_DELIMITER: u8 = b',';

/// Render one cell as CSV field text.
pub fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => format!("{:.1}", n),
        Cell::Null => String::new(),
    }
}

/// Serialize `table` as CSV into any writer.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> WriteResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(OUTPUT_DELIMITER)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(table.headers())?;
    for row in table.rows() {
        wtr.write_record(row.into_iter().map(format_cell))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Serialize `table` as a CSV string.
pub fn to_csv_string(table: &Table) -> WriteResult<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write `table` to `path`, replacing any existing file.
///
/// The CSV is written to a hidden sibling file and renamed over `path`, so
/// a failed write leaves any previous file untouched. Parent directories are
/// not created.
pub fn write_table<P: AsRef<Path>>(table: &Table, path: P) -> WriteResult<()> {
    let path = path.as_ref();
    let tmp_path = temp_path(path);
    let file = File::create(&tmp_path).map_err(|source| WriteError::DestinationUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let written = write_csv(table, file).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(|source| WriteError::DestinationUnavailable {
            path: path.to_path_buf(),
            source,
        })
    });
    if let Err(e) = written {
        fs::remove_file(&tmp_path).ok();
        return Err(e);
    }

    log_success(format!("Wrote {} rows to {}", table.height(), path.display()));
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => path.with_file_name(format!(".{}.tmp", name.to_string_lossy())),
        None => path.with_extension("tmp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::load_table_auto;
    use crate::table::Column;

    fn clean() -> Table {
        Table::new(vec![
            Column::from_strings("unit", ["YR", "YR"]),
            Column::from_strings("region", ["PT", "PT"]),
            Column::from_strings("year", ["2010", "2011"]),
            Column::new("value", vec![Cell::Number(82.3), Cell::Number(80.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&Cell::Number(82.3)), "82.3");
        assert_eq!(format_cell(&Cell::Number(80.0)), "80.0");
        assert_eq!(format_cell(&Cell::text("Y_LT1")), "Y_LT1");
        assert_eq!(format_cell(&Cell::Null), "");
    }

    #[test]
    fn test_to_csv_string() {
        let csv = to_csv_string(&clean()).unwrap();
        assert_eq!(csv, "unit,region,year,value\nYR,PT,2010,82.3\nYR,PT,2011,80.0\n");
    }

    #[test]
    fn test_header_only_output() {
        let empty = Table::empty(&["unit", "sex", "age", "region", "year", "value"]);
        let csv = to_csv_string(&empty).unwrap();
        assert_eq!(csv, "unit,sex,age,region,year,value\n");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let table = Table::new(vec![Column::from_strings("note", ["a,b"])]).unwrap();
        assert_eq!(to_csv_string(&table).unwrap(), "note\n\"a,b\"\n");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is longer than the new file\n".repeat(10)).unwrap();

        write_table(&clean(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, to_csv_string(&clean()).unwrap());
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_no_temp_file_left_after_write() {
        let dir = tempfile::tempdir().unwrap();
        write_table(&clean(), dir.path().join("out.csv")).unwrap();
        assert_eq!(entries(dir.path()), vec!["out.csv"]);
    }

    #[test]
    fn test_failed_rename_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "x").unwrap();

        let err = write_table(&clean(), &target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DestinationUnavailable);
        assert_eq!(entries(dir.path()), vec!["out.csv"]);
        assert_eq!(entries(&target), vec!["keep.txt"]);
    }

    #[test]
    fn test_missing_directory_is_destination_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_table(&clean(), dir.path().join("no/such/dir/out.csv")).unwrap_err();
        assert!(matches!(err, WriteError::DestinationUnavailable { .. }));
        assert_eq!(err.kind(), ErrorKind::DestinationUnavailable);
    }

    #[test]
    fn test_round_trip_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = clean();
        write_table(&table, &path).unwrap();

        let loaded = load_table_auto(&path).unwrap();
        assert_eq!(loaded.headers(), table.headers());
        assert_eq!(loaded.height(), table.height());
        for (read, original) in loaded.rows().zip(table.rows()) {
            let read: Vec<String> = read.into_iter().map(format_cell).collect();
            let original: Vec<String> = original.into_iter().map(format_cell).collect();
            assert_eq!(read, original);
        }
        // numbers come back as text but parse to the same values
        let values: Vec<f64> = loaded
            .column("value")
            .unwrap()
            .cells()
            .iter()
            .filter_map(|c| c.as_str()?.parse().ok())
            .collect();
        assert_eq!(values, vec![82.3, 80.0]);
    }
}
