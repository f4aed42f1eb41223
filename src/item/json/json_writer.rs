use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{core::item::ItemWriter, BatchError};

/// How records are separated inside the array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorStyle {
    /// `[a,b]`: always valid JSON.
    #[default]
    Strict,
    /// `[a,b,]`: every record is followed by a comma, as older exports did.
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    NotStarted,
    Started,
    Finished,
}

/// Writes items as one JSON array, record by record.
///
/// The lifecycle is `start` → any number of `append` → `finish`. Any other
/// order is refused with `BatchError::IllegalState`. `finish` writes the
/// closing bracket and releases the destination; a writer dropped without
/// `finish` flushes what it has but leaves the array open.
pub struct JsonRecordWriter<W: Write> {
    stream: RefCell<Option<BufWriter<W>>>,
    state: Cell<WriterState>,
    written: Cell<usize>,
    separator: SeparatorStyle,
    use_pretty_formatter: bool,
}

impl<W: Write> JsonRecordWriter<W> {
    fn new(wtr: W, separator: SeparatorStyle, use_pretty_formatter: bool) -> Self {
        Self {
            stream: RefCell::new(Some(BufWriter::new(wtr))),
            state: Cell::new(WriterState::NotStarted),
            written: Cell::new(0),
            separator,
            use_pretty_formatter,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state.get()
    }

    /// Number of records appended so far.
    pub fn written(&self) -> usize {
        self.written.get()
    }

    /// Writes the opening bracket.
    pub fn start(&self) -> Result<(), BatchError> {
        self.expect_state(WriterState::NotStarted, "start")?;
        self.write_bytes(b"[")?;
        self.state.set(WriterState::Started);
        Ok(())
    }

    /// Serializes `item` and writes it with its separator.
    pub fn append<T: Serialize>(&self, item: &T) -> Result<(), BatchError> {
        self.expect_state(WriterState::Started, "append")?;

        let json = if self.use_pretty_formatter {
            serde_json::to_string_pretty(item)
        } else {
            serde_json::to_string(item)
        }
        .map_err(|error| BatchError::ItemWriter(error.to_string()))?;

        let mut chunk = String::with_capacity(json.len() + 2);
        if self.separator == SeparatorStyle::Strict && self.written.get() > 0 {
            chunk.push(',');
        }
        if self.use_pretty_formatter {
            chunk.push('\n');
        }
        chunk.push_str(&json);
        if self.separator == SeparatorStyle::Trailing {
            chunk.push(',');
        }

        self.write_bytes(chunk.as_bytes())?;
        self.written.set(self.written.get() + 1);
        Ok(())
    }

    /// Writes the closing bracket, flushes and releases the destination.
    pub fn finish(&self) -> Result<(), BatchError> {
        self.expect_state(WriterState::Started, "finish")?;

        if self.use_pretty_formatter && self.written.get() > 0 {
            self.write_bytes(b"\n]")?;
        } else {
            self.write_bytes(b"]")?;
        }
        self.state.set(WriterState::Finished);

        let stream = self.stream.borrow_mut().take();
        if let Some(mut stream) = stream {
            stream
                .flush()
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }
        debug!("JSON array closed after {} records", self.written.get());
        Ok(())
    }

    fn expect_state(&self, expected: WriterState, operation: &str) -> Result<(), BatchError> {
        let current = self.state.get();
        if current == expected {
            Ok(())
        } else {
            Err(BatchError::IllegalState(format!(
                "cannot {} a JSON writer in state {:?}",
                operation, current
            )))
        }
    }

    fn write_bytes(&self, bytes: &[u8]) -> Result<(), BatchError> {
        match self.stream.borrow_mut().as_mut() {
            Some(stream) => stream
                .write_all(bytes)
                .map_err(|error| BatchError::ItemWriter(error.to_string())),
            None => Err(BatchError::IllegalState(
                "JSON writer destination already released".to_string(),
            )),
        }
    }
}

impl<W: Write, O: Serialize> ItemWriter<O> for JsonRecordWriter<W> {
    fn write(&self, items: &[O]) -> Result<(), BatchError> {
        items.iter().try_for_each(|item| self.append(item))
    }

    fn flush(&self) -> Result<(), BatchError> {
        match self.stream.borrow_mut().as_mut() {
            Some(stream) => stream
                .flush()
                .map_err(|error| BatchError::ItemWriter(error.to_string())),
            None => Ok(()),
        }
    }

    fn open(&self) -> Result<(), BatchError> {
        self.start()
    }

    fn close(&self) -> Result<(), BatchError> {
        self.finish()
    }
}

#[derive(Default)]
pub struct JsonRecordWriterBuilder {
    separator: SeparatorStyle,
    pretty_formatter: bool,
}

impl JsonRecordWriterBuilder {
    pub fn new() -> JsonRecordWriterBuilder {
        Self::default()
    }

    pub fn separator(mut self, separator: SeparatorStyle) -> JsonRecordWriterBuilder {
        self.separator = separator;
        self
    }

    pub fn pretty_formatter(mut self, yes: bool) -> JsonRecordWriterBuilder {
        self.pretty_formatter = yes;
        self
    }

    /// Creates (or truncates) the file at `path` and writes into it.
    ///
    /// # Errors
    /// `BatchError::ItemWriter` when the file cannot be created.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<JsonRecordWriter<File>, BatchError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|error| {
            BatchError::ItemWriter(format!(
                "Unable to create JSON file {}: {}",
                path.display(),
                error
            ))
        })?;

        debug!("Writing records to {}", path.display());
        Ok(self.from_writer(file))
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> JsonRecordWriter<W> {
        JsonRecordWriter::new(wtr, self.separator, self.pretty_formatter)
    }
}
