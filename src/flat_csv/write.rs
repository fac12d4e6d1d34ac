use {
    crate::{
        flatten_value::{self, FlatMap, Flattener},
        value::{Value, ser},
    },
    itertools::Itertools,
    serde::Serialize,
    std::io::{self, Write},
    tap::Pipe,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("row {row}: converting to a value")]
    ToValue {
        row: usize,
        #[source]
        source: ser::Error,
    },
    #[error("row {row}: paths missing from the header line: {}", .extra.keys().join(", "))]
    UnknownPaths { row: usize, extra: FlatMap },
    #[error("row {row}: writing csv")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("flushing the underlying writer")]
    Flush(#[source] io::Error),
}

type Result<T> = std::result::Result<T, self::Error>;

/// Rows written so far and the leaves that had to be left as empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Written {
    pub rows: usize,
    pub empty_cells: Vec<flatten_value::Error>,
}

/// Writes one flattened value per CSV row.
///
/// The first row fixes the header line, including the paths of leaves that failed to render
/// in it. Later rows leave unknown cells empty and are rejected if they introduce new paths.
pub struct FlatCsvWriter<W: Write> {
    writer: csv::Writer<W>,
    flattener: Flattener,
    headers: Option<Vec<String>>,
    written: Written,
}

#[extension_traits::extension(pub trait CsvWriterFlatExt)]
impl<W: Write> csv::Writer<W> {
    fn flat_rows(self) -> FlatCsvWriter<W> {
        FlatCsvWriter {
            writer: self,
            flattener: Flattener::default(),
            headers: None,
            written: Written::default(),
        }
    }
}

impl<W: Write> FlatCsvWriter<W> {
    pub fn with_flattener(self, flattener: Flattener) -> Self {
        Self { flattener, ..self }
    }

    pub fn written(&self) -> &Written {
        &self.written
    }

    /// Flushes and hands back the inner writer along with the write summary.
    pub fn finish(self) -> Result<(W, Written)> {
        self.writer
            .into_inner()
            .map_err(|e| io::Error::new(e.error().kind(), e.error().to_string()).pipe(self::Error::Flush))
            .map(|inner| (inner, self.written))
    }

    pub fn serialize<T: Serialize + ?Sized>(&mut self, item: &T) -> Result<()> {
        Value::from_serialize(item)
            .map_err(|source| self::Error::ToValue {
                row: self.written.rows + 1,
                source,
            })
            .and_then(|value| self.write_value(&value))
    }

    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        let row = self.written.rows + 1;
        let flatten_value::Flattened { mut entries, errors } = self.flattener.flatten(value, "");
        let headers = match self.headers.take() {
            Some(headers) => headers,
            None => entries
                .keys()
                .map(String::as_str)
                .chain(errors.iter().map(flatten_value::Error::path))
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>()
                .pipe(|headers| {
                    self.writer
                        .write_record(&headers)
                        .map_err(|source| self::Error::Csv { row, source })
                        .map(|()| headers)
                })?,
        };
        let cells = headers
            .iter()
            .map(|path| entries.shift_remove(path.as_str()).unwrap_or_default())
            .collect::<Vec<_>>();
        self.headers = Some(headers);
        if !entries.is_empty() {
            tracing::debug!(row, extra = entries.len(), "row introduces paths not in the header line");
            return Err(self::Error::UnknownPaths { row, extra: entries });
        }
        self.writer
            .write_record(&cells)
            .map_err(|source| self::Error::Csv { row, source })?;
        errors
            .iter()
            .for_each(|error| tracing::warn!(row, %error, "writing empty cell"));
        self.written.rows = row;
        self.written.empty_cells.extend(errors);
        Ok(())
    }
}

/// Writes every item as a flattened CSV row.
pub fn write_flat_csv<'a, W, T>(writer: W, items: impl IntoIterator<Item = &'a T>) -> Result<Written>
where
    W: Write,
    T: Serialize + 'a,
{
    csv::WriterBuilder::new()
        .from_writer(writer)
        .flat_rows()
        .pipe(|mut w| {
            items
                .into_iter()
                .try_for_each(|item| w.serialize(item))
                .and_then(|()| w.finish())
        })
        .map(|(_, written)| written)
}
