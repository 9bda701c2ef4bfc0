use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;

use super::error::{RawFileError, SelectError};

/// Acquisition timestamp pattern embedded in raw sonar file names.
const NAME_TIMESTAMP_PATTERN: &str = "D[0-9]{8}-T[0-9]{6}";
const NAME_TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("D[year][month][day]-T[hour][minute][second]");

fn name_timestamp_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(NAME_TIMESTAMP_PATTERN).unwrap())
}

/// A candidate raw data file and the acquisition start parsed from its name.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFileRecord {
    pub path: PathBuf,
    pub start: PrimitiveDateTime,
}

impl RawFileRecord {
    /// Extract the acquisition start out of a raw file name.
    ///
    /// The name must carry a DyyyyMMdd-Thhmmss timestamp somewhere; the
    /// selector has no time value to work with otherwise, so a name without
    /// one rejects the whole candidate set.
    pub fn from_path(path: PathBuf) -> Result<Self, SelectError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stamp = name_timestamp_regex()
            .find(&name)
            .ok_or_else(|| SelectError::UnparsableFileName(name.clone()))?;
        let start = PrimitiveDateTime::parse(stamp.as_str(), NAME_TIMESTAMP_FORMAT)
            .map_err(|_| SelectError::UnparsableFileName(name.clone()))?;
        Ok(Self { path, start })
    }
}

/// List the .raw files in a directory, ordered by acquisition start.
///
/// The listing is the candidate snapshot handed to the selector; callers
/// must not re-scan the directory mid-selection.
pub fn scan_raw_directory(dir: &Path) -> Result<Vec<RawFileRecord>, RawFileError> {
    let mut records: Vec<RawFileRecord> = Vec::new();
    for item in dir.read_dir()? {
        let item_path = item?.path();
        let is_raw = item_path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("raw"))
            .unwrap_or(false);
        if is_raw {
            records.push(RawFileRecord::from_path(item_path)?);
        }
    }

    if records.is_empty() {
        return Err(RawFileError::NoMatchingFiles(dir.to_path_buf()));
    }

    records.sort_by_key(|record| record.start);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_parse_record_from_name() {
        let record =
            RawFileRecord::from_path(PathBuf::from("DY2104-D20210219-T140322.raw")).unwrap();
        assert_eq!(record.start, datetime!(2021-02-19 14:03:22));
    }

    #[test]
    fn test_misnamed_file_rejected() {
        let err = RawFileRecord::from_path(PathBuf::from("DY2104-pass3.raw")).unwrap_err();
        assert_eq!(
            err,
            SelectError::UnparsableFileName(String::from("DY2104-pass3.raw"))
        );
    }

    #[test]
    fn test_scan_orders_by_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        // Lexical order differs from chronological order here
        for name in [
            "b-D20240101-T120000.raw",
            "a-D20240102-T120000.raw",
            "c-D20240101-T060000.raw",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let records = scan_raw_directory(dir.path()).unwrap();
        let names: Vec<String> = records
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "c-D20240101-T060000.raw",
                "b-D20240101-T120000.raw",
                "a-D20240102-T120000.raw",
            ]
        );
    }

    #[test]
    fn test_scan_empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            scan_raw_directory(dir.path()),
            Err(RawFileError::NoMatchingFiles(_))
        ));
    }

    #[test]
    fn test_scan_misnamed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("D20240101-T120000.raw"), b"").unwrap();
        std::fs::write(dir.path().join("orphan.raw"), b"").unwrap();
        let err = scan_raw_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            RawFileError::BadFileName(SelectError::UnparsableFileName(name)) if name == "orphan.raw"
        ));
    }
}
