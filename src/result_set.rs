//! Forward-only result set over an `ODBCDriver2` response stream.
//!
//! Stream layout, all integers little-endian `i32`:
//!
//! ```text
//! header_rows
//! header_rows x { cells, cells x { len, bytes } }   first cell is the row label
//! rows until end of stream: columns x { len, bytes } len -1 is NULL
//! ```
//!
//! The first header row carries the column names, the second their type names.

use crate::error::{Error, Result};
use crate::types::{Column, ColumnInfo, Row, Value};
use std::io::{self, BufReader, Read};
use std::sync::Arc;
use tracing::trace;

/// Hook applied to column metadata and to every row as it is read.
///
/// A mutator outlives a single result set: the statement carries it over to
/// the result sets of the following parameter sets.
pub trait ResultMutator {
    /// Adjust column metadata once, before the first row is read.
    fn update_columns(&mut self, _columns: &mut Vec<Column>) {}

    /// Adjust a row after it has been decoded.
    fn update_row(&mut self, _columns: &ColumnInfo, _row: &mut Row) {}
}

/// Forward-only result set.
pub struct ResultSet {
    reader: BufReader<Box<dyn Read>>,
    column_info: Arc<ColumnInfo>,
    mutator: Option<Box<dyn ResultMutator>>,
    current_row: Option<Row>,
    row_count: usize,
    drained: bool,
}

impl ResultSet {
    /// Read the stream header and prepare for row iteration.
    pub fn new(body: Box<dyn Read>, mutator: Option<Box<dyn ResultMutator>>) -> Result<Self> {
        let mut rs = Self {
            reader: BufReader::new(body),
            column_info: Arc::new(ColumnInfo::default()),
            mutator,
            current_row: None,
            row_count: 0,
            drained: false,
        };
        rs.read_header()?;
        Ok(rs)
    }

    fn read_header(&mut self) -> Result<()> {
        let header_rows = match read_i32(&mut self.reader)? {
            Some(n) => n,
            None => {
                self.drained = true;
                return Ok(());
            }
        };

        let mut names = Vec::new();
        let mut types = Vec::new();
        for _ in 0..header_rows {
            let cells = require(read_i32(&mut self.reader)?)?;
            if cells < 1 {
                return Err(Error::protocol(format!("invalid header cell count {}", cells)));
            }
            let label = require(read_cell(&mut self.reader)?)?.unwrap_or_default();
            let mut values = Vec::with_capacity(cells as usize - 1);
            for _ in 1..cells {
                values.push(require(read_cell(&mut self.reader)?)?.unwrap_or_default());
            }
            match label.as_str() {
                "name" => names = values,
                "type" => types = values,
                other => trace!(label = other, "Skipping header row"),
            }
        }

        if names.len() != types.len() {
            return Err(Error::protocol(format!(
                "{} column names but {} column types",
                names.len(),
                types.len()
            )));
        }

        let mut columns = names
            .into_iter()
            .zip(types)
            .map(|(name, type_name)| Column::new(name, type_name))
            .collect::<Result<Vec<_>>>()?;

        if let Some(mutator) = self.mutator.as_mut() {
            mutator.update_columns(&mut columns);
        }

        if columns.is_empty() {
            io::copy(&mut self.reader, &mut io::sink())?;
            self.drained = true;
        }

        self.column_info = Arc::new(ColumnInfo::new(columns));
        Ok(())
    }

    /// Column metadata.
    pub fn column_info(&self) -> &Arc<ColumnInfo> {
        &self.column_info
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.column_info.len()
    }

    /// Check if a row is positioned.
    pub fn has_current_row(&self) -> bool {
        self.current_row.is_some()
    }

    /// Get the positioned row.
    pub fn current_row(&self) -> Option<&Row> {
        self.current_row.as_ref()
    }

    /// 1-based number of the positioned row, 0 before the first row and
    /// after the last one.
    pub fn current_row_num(&self) -> usize {
        if self.current_row.is_some() {
            self.row_count
        } else {
            0
        }
    }

    /// Number of rows read so far.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Check whether the response stream has been read to its end.
    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /// Take the mutator so it can be handed to the next result set.
    pub fn release_mutator(&mut self) -> Option<Box<dyn ResultMutator>> {
        self.mutator.take()
    }

    /// Move to the next row.
    ///
    /// Returns `Ok(false)` once the stream is exhausted.
    pub fn advance_to_next_row(&mut self) -> Result<bool> {
        self.current_row = None;
        if self.drained {
            return Ok(false);
        }

        let mut values = Vec::with_capacity(self.column_info.len());
        for (i, column) in self.column_info.columns.iter().enumerate() {
            let cell = match read_cell(&mut self.reader)? {
                Some(cell) => cell,
                None if i == 0 => {
                    self.drained = true;
                    return Ok(false);
                }
                None => return Err(Error::protocol("stream ended inside a row")),
            };
            let value = match cell {
                None => Value::Null,
                Some(text) => Value::from_text(&text, &column.type_info)?,
            };
            values.push(value);
        }

        let mut row = Row::new(values, Arc::clone(&self.column_info));
        if let Some(mutator) = self.mutator.as_mut() {
            mutator.update_row(&self.column_info, &mut row);
        }
        self.current_row = Some(row);
        self.row_count += 1;
        Ok(true)
    }
}

fn require<T>(value: Option<T>) -> Result<T> {
    value.ok_or_else(|| Error::protocol("unexpected end of stream"))
}

/// Read an `i32`; `None` on a clean end of stream.
fn read_i32(reader: &mut impl Read) -> Result<Option<i32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(Error::protocol("truncated length prefix")),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(Some(i32::from_le_bytes(buf)))
}

/// Read a length-prefixed cell.
///
/// Outer `None` is a clean end of stream, inner `None` a NULL cell.
fn read_cell(reader: &mut impl Read) -> Result<Option<Option<String>>> {
    let len = match read_i32(reader)? {
        Some(len) => len,
        None => return Ok(None),
    };
    if len < 0 {
        return Ok(Some(None));
    }
    // The buffer grows with the bytes actually received, not the announced length.
    let mut buf = Vec::new();
    reader.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() < len as usize {
        return Err(Error::protocol("truncated cell"));
    }
    Ok(Some(Some(String::from_utf8_lossy(&buf).into_owned())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(out: &mut Vec<u8>, value: Option<&str>) {
        match value {
            Some(v) => {
                out.extend_from_slice(&(v.len() as i32).to_le_bytes());
                out.extend_from_slice(v.as_bytes());
            }
            None => out.extend_from_slice(&(-1i32).to_le_bytes()),
        }
    }

    fn stream(columns: &[(&str, &str)], rows: &[Vec<Option<&str>>]) -> Box<dyn Read> {
        let mut out = Vec::new();
        out.extend_from_slice(&2i32.to_le_bytes());
        for (label, pick) in [("name", 0), ("type", 1)] {
            out.extend_from_slice(&(columns.len() as i32 + 1).to_le_bytes());
            cell(&mut out, Some(label));
            for c in columns {
                cell(&mut out, Some(if pick == 0 { c.0 } else { c.1 }));
            }
        }
        for row in rows {
            for v in row {
                cell(&mut out, *v);
            }
        }
        Box::new(io::Cursor::new(out))
    }

    #[test]
    fn test_read_rows() {
        let body = stream(
            &[("id", "UInt32"), ("name", "Nullable(String)"), ("day", "Date")],
            &[
                vec![Some("1"), Some("alpha"), Some("2024-01-31")],
                vec![Some("2"), None, Some("1970-01-01")],
            ],
        );
        let mut rs = ResultSet::new(body, None).unwrap();
        assert_eq!(rs.num_columns(), 3);
        assert!(rs.column_info().get(1).unwrap().nullable);
        assert!(!rs.has_current_row());

        assert!(rs.advance_to_next_row().unwrap());
        assert_eq!(rs.current_row_num(), 1);
        let row = rs.current_row().unwrap();
        assert_eq!(row.get(0), Some(&Value::UInt(1)));
        assert_eq!(row.get_by_name("name").and_then(Value::as_str), Some("alpha"));

        assert!(rs.advance_to_next_row().unwrap());
        assert!(rs.current_row().unwrap().get(1).unwrap().is_null());

        assert!(!rs.is_drained());
        assert!(!rs.advance_to_next_row().unwrap());
        assert!(rs.is_drained());
        assert_eq!(rs.row_count(), 2);
        assert_eq!(rs.current_row_num(), 0);
    }

    #[test]
    fn test_empty_body() {
        let rs = ResultSet::new(Box::new(io::empty()), None).unwrap();
        assert_eq!(rs.num_columns(), 0);
        assert!(rs.is_drained());
    }

    #[test]
    fn test_truncated_row() {
        let mut body = Vec::new();
        stream(&[("a", "Int8"), ("b", "Int8")], &[vec![Some("1")]])
            .read_to_end(&mut body)
            .unwrap();
        let mut rs = ResultSet::new(Box::new(io::Cursor::new(body)), None).unwrap();
        assert!(rs.advance_to_next_row().is_err());
    }

    #[test]
    fn test_oversized_cell_length_is_truncation() {
        let mut body = Vec::new();
        stream(&[("s", "String")], &[]).read_to_end(&mut body).unwrap();
        body.extend_from_slice(&i32::MAX.to_le_bytes());
        body.extend_from_slice(b"abc");

        let mut rs = ResultSet::new(Box::new(io::Cursor::new(body)), None).unwrap();
        let err = rs.advance_to_next_row().unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }), "{:?}", err);
    }

    #[test]
    fn test_unknown_column_type() {
        let err = ResultSet::new(stream(&[("m", "Map(String, UInt8)")], &[]), None)
            .err()
            .unwrap();
        assert_eq!(err.sql_state(), "HY004");
    }

    struct Upper;

    impl ResultMutator for Upper {
        fn update_columns(&mut self, columns: &mut Vec<Column>) {
            for c in columns.iter_mut() {
                c.name = c.name.to_uppercase();
            }
        }

        fn update_row(&mut self, _columns: &ColumnInfo, row: &mut Row) {
            if let Some(Value::String(s)) = row.get_mut(0) {
                *s = s.to_uppercase();
            }
        }
    }

    #[test]
    fn test_mutator_applied_and_released() {
        let body = stream(&[("s", "String")], &[vec![Some("abc")]]);
        let mut rs = ResultSet::new(body, Some(Box::new(Upper))).unwrap();
        assert_eq!(rs.column_info().get(0).unwrap().name, "S");
        rs.advance_to_next_row().unwrap();
        assert_eq!(rs.current_row().unwrap().get(0).unwrap().as_str(), Some("ABC"));
        assert!(rs.release_mutator().is_some());
        assert!(rs.release_mutator().is_none());
    }
}
