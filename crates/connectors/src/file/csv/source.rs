use crate::file::csv::error::FileError;
use csv::{ReaderBuilder, StringRecord};
use model::records::record::{COLUMNS, Record};
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            has_header: false,
        }
    }
}

/// Single-pass reader over a delimited file with the fixed layout
/// `id,firstName,lastName,email,phone`.
///
/// Fields are split on the delimiter only; quotes carry no meaning.
pub struct CsvRecordReader<R: Read = File> {
    reader: csv::Reader<R>,
    buf: StringRecord,
    delimiter: char,
    rows_read: u64,
}

impl CsvRecordReader<File> {
    pub fn open(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Self, FileError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound(path.display().to_string()),
            _ => FileError::IoError(e),
        })?;
        debug!(path = %path.display(), "Opened CSV source");
        Ok(Self::from_reader(file, options))
    }
}

impl<R: Read> CsvRecordReader<R> {
    pub fn from_reader(rdr: R, options: &CsvOptions) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(options.has_header)
            .quoting(false)
            .flexible(true)
            .from_reader(rdr);

        CsvRecordReader {
            reader,
            buf: StringRecord::new(),
            delimiter: options.delimiter as char,
            rows_read: 0,
        }
    }

    /// Reads and parses the next line. `Ok(None)` marks the end of the file.
    pub fn read_next(&mut self) -> Result<Option<Record>, FileError> {
        match self.reader.read_record(&mut self.buf) {
            Ok(true) => {}
            Ok(false) => return Ok(None),
            Err(err) => return Err(self.classify(err)),
        }
        self.rows_read += 1;

        let line = self
            .buf
            .position()
            .map(|pos| pos.line())
            .unwrap_or(self.rows_read);

        self.parse(line).map(Some)
    }

    /// Number of data lines consumed so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    fn parse(&self, line: u64) -> Result<Record, FileError> {
        if self.buf.len() != COLUMNS.len() {
            return Err(self.malformed(
                line,
                format!(
                    "expected {} fields, found {}",
                    COLUMNS.len(),
                    self.buf.len()
                ),
            ));
        }

        let raw_id = self.buf.get(0).unwrap_or("").trim();
        let id = raw_id.parse::<i64>().map_err(|e| {
            self.malformed(line, format!("field 'id' is not a 64-bit integer ('{raw_id}'): {e}"))
        })?;

        let text = |idx: usize| self.buf.get(idx).map(str::to_string);
        Ok(Record {
            id: Some(id),
            first_name: text(1),
            last_name: text(2),
            email: text(3),
            phone: text(4),
        })
    }

    /// Bad bytes on a line are a data problem, not a reader failure, so they
    /// surface as a malformed record carrying the line number.
    fn classify(&self, err: csv::Error) -> FileError {
        let fallback_line = self.rows_read + 1;
        let malformed = match err.kind() {
            csv::ErrorKind::Utf8 { pos, err: utf8 } => Some((
                pos.as_ref().map_or(fallback_line, |p| p.line()),
                format!("field {} is not valid UTF-8: {utf8}", utf8.field() + 1),
            )),
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => Some((
                pos.as_ref().map_or(fallback_line, |p| p.line()),
                format!("expected {expected_len} fields, found {len}"),
            )),
            _ => None,
        };

        match malformed {
            Some((line, reason)) => FileError::MalformedRecord {
                line,
                content: String::new(),
                reason,
            },
            None => FileError::CsvError(err),
        }
    }

    fn malformed(&self, line: u64, reason: String) -> FileError {
        let content = self
            .buf
            .iter()
            .collect::<Vec<_>>()
            .join(self.delimiter.to_string().as_str());
        FileError::MalformedRecord {
            line,
            content,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn reader(content: &str) -> CsvRecordReader<&[u8]> {
        CsvRecordReader::from_reader(content.as_bytes(), &CsvOptions::default())
    }

    #[test]
    fn reads_records_in_order() {
        let mut rdr = reader("1,ann,lee,a@x,555\n2,bo,kim,b@x,556\n");

        let first = rdr.read_next().unwrap().unwrap();
        assert_eq!(first, Record::new(1, "ann", "lee", "a@x", "555"));
        let second = rdr.read_next().unwrap().unwrap();
        assert_eq!(second.id, Some(2));
        assert!(rdr.read_next().unwrap().is_none());
        assert_eq!(rdr.rows_read(), 2);
    }

    #[test]
    fn empty_cells_are_empty_strings() {
        let mut rdr = reader("3,,doe,,557\n");
        let record = rdr.read_next().unwrap().unwrap();
        assert_eq!(record.first_name.as_deref(), Some(""));
        assert_eq!(record.email.as_deref(), Some(""));
    }

    #[test]
    fn quotes_are_kept_verbatim() {
        let mut rdr = reader("4,\"cy\",doe,c@x,557\n");
        let record = rdr.read_next().unwrap().unwrap();
        assert_eq!(record.first_name.as_deref(), Some("\"cy\""));
    }

    #[test]
    fn non_numeric_id_reports_line_and_content() {
        let mut rdr = reader("1,ann,lee,a@x,555\nabc,bo,kim,b@x,556\n");
        rdr.read_next().unwrap();

        match rdr.read_next() {
            Err(FileError::MalformedRecord { line, content, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "abc,bo,kim,b@x,556");
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let mut rdr = reader("1,ann,lee\n");
        assert!(matches!(
            rdr.read_next(),
            Err(FileError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_malformed_with_line() {
        let bytes: &[u8] = b"1,ann,lee,a@x,555\n2,b\xff\xfe,kim,b@x,556\n";
        let mut rdr = CsvRecordReader::from_reader(bytes, &CsvOptions::default());
        assert_eq!(rdr.read_next().unwrap().unwrap().id, Some(1));

        match rdr.read_next() {
            Err(FileError::MalformedRecord { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("UTF-8"), "{reason}");
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn header_line_is_skipped_but_counted_in_line_numbers() {
        let options = CsvOptions {
            delimiter: b';',
            has_header: true,
        };
        let mut rdr = CsvRecordReader::from_reader(
            "id;firstName;lastName;email;phone\n1;ann;lee;a@x;555\nx;bo;kim;b@x;556\n".as_bytes(),
            &options,
        );

        assert_eq!(rdr.read_next().unwrap().unwrap().id, Some(1));
        assert!(matches!(
            rdr.read_next(),
            Err(FileError::MalformedRecord { line: 3, .. })
        ));
    }

    #[test]
    fn open_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10,dee,ray,d@x,558").unwrap();

        let mut rdr = CsvRecordReader::open(file.path(), &CsvOptions::default()).unwrap();
        assert_eq!(rdr.read_next().unwrap().unwrap().id, Some(10));
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let result = CsvRecordReader::open("/definitely/not/here.csv", &CsvOptions::default());
        assert!(matches!(result, Err(FileError::NotFound(_))));
    }
}
