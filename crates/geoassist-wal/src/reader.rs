// WAL reader module - decodes records from one log file, in file order
//
// Blank lines are skipped. Every other line must hold exactly one record.
// Errors about a line's content carry the file and line number it came from.

use crate::record::TransactionRecord;
use geoassist_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Sequential reader over the records of a single log file
pub struct LogReader<T, O> {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    _marker: PhantomData<fn() -> (T, O)>,
}

impl<T, O> LogReader<T, O>
where
    T: DeserializeOwned,
    O: DeserializeOwned,
{
    /// Open a log file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_number: 0,
            _marker: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Line number of the most recently read line (1-based, 0 before the first read)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next record
    ///
    /// Returns `Ok(None)` at end of file.
    pub fn next_record(&mut self) -> Result<Option<TransactionRecord<T, O>>> {
        loop {
            let line = match self.lines.next() {
                Some(line) => line.map_err(|e| Error::io(&self.path, e))?,
                None => return Ok(None),
            };
            self.line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            return TransactionRecord::decode(line)
                .map(Some)
                .map_err(|e| self.locate(e));
        }
    }

    // Attach `path:line` to errors that describe the content of a line
    fn locate(&self, err: Error) -> Error {
        let at = format!("{}:{}", self.path.display(), self.line_number);
        match err {
            Error::Serialization(msg) => Error::Serialization(format!("{}: {}", at, msg)),
            Error::IncompleteRecord { operation, record } => Error::IncompleteRecord {
                operation,
                record: format!("{} ({})", record, at),
            },
            Error::UnknownOperation(name) => Error::UnknownOperation(format!("{} ({})", name, at)),
            other => other,
        }
    }
}

impl<T, O> Iterator for LogReader<T, O>
where
    T: DeserializeOwned,
    O: DeserializeOwned,
{
    type Item = Result<TransactionRecord<T, O>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGenerator;
    use crate::writer::LogWriter;
    use geoassist_core::{IndexObject, Operation, Point};
    use tempfile::TempDir;

    type Reader = LogReader<u32, String>;
    type Record = TransactionRecord<u32, String>;

    fn setup_test_wal() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let wal_path = temp_dir.path().join("00000001.wal");
        (temp_dir, wal_path)
    }

    fn write_records(path: &Path, records: &[Record]) {
        let writer = LogWriter::new(path);
        for record in records {
            writer
                .append_line(&record.encode().unwrap())
                .expect("Failed to append");
        }
    }

    #[test]
    fn test_read_in_file_order() {
        let (_temp_dir, wal_path) = setup_test_wal();
        let ids = SequentialIdGenerator::new();
        let records = vec![
            Record::for_insert(&ids, IndexObject::new(1, "a".to_string(), Point::default()))
                .unwrap(),
            Record::for_update(&ids, 1, "b".to_string()).unwrap(),
            Record::for_delete(&ids, 1).unwrap(),
        ];
        write_records(&wal_path, &records);

        let read: Vec<Record> = Reader::open(&wal_path)
            .expect("Failed to open reader")
            .collect::<Result<_>>()
            .expect("Failed to read records");

        assert_eq!(read, records);
    }

    #[test]
    fn test_empty_file() {
        let (_temp_dir, wal_path) = setup_test_wal();
        std::fs::write(&wal_path, "").unwrap();

        let mut reader = Reader::open(&wal_path).unwrap();
        assert!(reader.next_record().unwrap().is_none());
        assert_eq!(reader.line_number(), 0);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let (_temp_dir, wal_path) = setup_test_wal();
        std::fs::write(
            &wal_path,
            "\n{\"transactionId\":\"1\",\"operation\":\"DELETE\",\"id\":4}\n\n   \n",
        )
        .unwrap();

        let mut reader = Reader::open(&wal_path).unwrap();
        let record = reader.next_record().unwrap().expect("Should have a record");
        assert_eq!(record.operation(), Operation::Delete);
        assert_eq!(reader.line_number(), 2);
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_line_reports_position() {
        let (_temp_dir, wal_path) = setup_test_wal();
        std::fs::write(
            &wal_path,
            concat!(
                "{\"transactionId\":\"1\",\"operation\":\"DELETE\",\"id\":4}\n",
                "{\"transactionId\":\"2\",\"opera",
            ),
        )
        .unwrap();

        let mut reader = Reader::open(&wal_path).unwrap();
        assert!(reader.next_record().unwrap().is_some());

        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().contains(":2:"), "got {}", err);
    }

    #[test]
    fn test_incomplete_and_unknown_records_report_position() {
        let (_temp_dir, wal_path) = setup_test_wal();
        std::fs::write(
            &wal_path,
            concat!(
                "{\"transactionId\":\"1\",\"operation\":\"DELETE\",\"id\":4}\n",
                "\n",
                "{\"transactionId\":\"7\",\"operation\":\"UPDATE\",\"id\":4}\n",
                "{\"transactionId\":\"8\",\"operation\":\"MERGE\",\"id\":4}\n",
            ),
        )
        .unwrap();

        let mut reader = Reader::open(&wal_path).unwrap();
        assert!(reader.next_record().unwrap().is_some());

        match reader.next_record().unwrap_err() {
            Error::IncompleteRecord { operation, record } => {
                assert_eq!(operation, Operation::Update);
                assert!(record.starts_with("7 ("), "got {}", record);
                assert!(record.ends_with("00000001.wal:3)"), "got {}", record);
            }
            other => panic!("unexpected error: {}", other),
        }

        match reader.next_record().unwrap_err() {
            Error::UnknownOperation(name) => {
                assert!(name.starts_with("MERGE ("), "got {}", name);
                assert!(name.ends_with("00000001.wal:4)"), "got {}", name);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Reader::open(&temp_dir.path().join("missing.wal"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
