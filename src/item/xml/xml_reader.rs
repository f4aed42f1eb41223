use crate::core::item::{ItemReader, ItemReaderResult};
use crate::error::BatchError;
use crate::item::record::Record;
use indexmap::IndexMap;
use log::{debug, error};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader as XmlReader;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str;

/// Key holding the attributes of an element.
pub const ATTRIBUTES_KEY: &str = "$";
/// Key holding the text of an element that also has attributes or children.
pub const TEXT_KEY: &str = "$text";

/// A builder for [`XmlRecordReader`].
///
/// # Examples
///
/// ```
/// use xml2json_batch::core::item::ItemReader;
/// use xml2json_batch::item::record::Record;
/// use xml2json_batch::item::xml::XmlRecordReaderBuilder;
///
/// let xml_data = r#"
/// <inbox>
///   <Message><From>alice</From><Message>hello</Message></Message>
/// </inbox>
/// "#;
///
/// let reader = XmlRecordReaderBuilder::new()
///     .tag("Message")
///     .from_reader(xml_data.as_bytes());
///
/// // the inner <Message> closes first
/// assert_eq!(reader.read().unwrap(), Some(Record::from("hello")));
///
/// let outer = reader.read().unwrap().unwrap();
/// assert_eq!(outer.get("From"), Some(&Record::from("alice")));
/// assert_eq!(outer.get("Message"), Some(&Record::from("hello")));
///
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct XmlRecordReaderBuilder {
    tag_name: Option<String>,
    capacity: usize,
    collect: HashSet<String>,
}

impl Default for XmlRecordReaderBuilder {
    fn default() -> Self {
        Self {
            tag_name: None,
            capacity: 1024,
            collect: HashSet::new(),
        }
    }
}

impl XmlRecordReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the buffer capacity of the underlying reader.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the name of the element whose closing tag completes a record.
    ///
    /// Defaults to `Message`.
    pub fn tag<S: AsRef<str>>(mut self, tag_name: S) -> Self {
        self.tag_name = Some(tag_name.as_ref().to_string());
        self
    }

    /// Child elements with one of these names are gathered into a list
    /// instead of overwriting each other.
    pub fn collect<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collect = names.into_iter().map(Into::into).collect();
        self
    }

    /// Creates a reader over any `Read` source.
    pub fn from_reader<R: Read>(self, reader: R) -> XmlRecordReader<R> {
        let tag = self.tag_name.unwrap_or_else(|| "Message".to_string());
        XmlRecordReader::new(reader, self.capacity, tag, self.collect)
    }

    /// Creates a reader over a file.
    ///
    /// # Errors
    /// `BatchError::ItemReader` when the file cannot be opened.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<XmlRecordReader<File>, BatchError> {
        let file_path = path.as_ref();
        let file = File::open(file_path).map_err(|e| {
            error!("Failed to open XML file {}: {}", file_path.display(), e);
            BatchError::ItemReader(format!(
                "Failed to open XML file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        debug!("Reading records from {}", file_path.display());
        Ok(self.from_reader(file))
    }
}

/// An element being assembled while its content streams in.
struct Frame {
    name: String,
    attributes: IndexMap<String, Record>,
    children: IndexMap<String, Record>,
    text: String,
}

impl Frame {
    fn new(start: &BytesStart) -> Result<Self, BatchError> {
        let mut attributes = IndexMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error("Invalid attribute", e))?;
            let key = decode_utf8(attr.key.as_ref(), "attribute name")?.to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| xml_error("Invalid attribute value", e))?;
            attributes.insert(key, Record::Scalar(value.into_owned()));
        }

        Ok(Self {
            name: element_name(start)?,
            attributes,
            children: IndexMap::new(),
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, value: Record, collect: bool) {
        if !collect {
            self.children.insert(name, value);
            return;
        }

        match self.children.get_mut(&name) {
            Some(Record::List(values)) => values.push(value),
            _ => {
                self.children.insert(name, Record::List(vec![value]));
            }
        }
    }

    fn into_record(self) -> Record {
        let text = self.text.trim();

        if self.attributes.is_empty() && self.children.is_empty() {
            return Record::Scalar(text.to_string());
        }

        let mut fields = IndexMap::with_capacity(self.children.len() + 2);
        if !self.attributes.is_empty() {
            fields.insert(
                ATTRIBUTES_KEY.to_string(),
                Record::Mapping(self.attributes),
            );
        }
        fields.extend(self.children);
        if !text.is_empty() {
            fields.insert(TEXT_KEY.to_string(), Record::Scalar(text.to_string()));
        }

        Record::Mapping(fields)
    }
}

/// Streams one [`Record`] per closing tag of the target element.
///
/// Only the elements inside an open target element are kept in memory. A
/// target element nested in another target element is emitted on its own and
/// also kept as a child of the enclosing record.
pub struct XmlRecordReader<R> {
    reader: RefCell<XmlReader<BufReader<R>>>,
    buffer: RefCell<Vec<u8>>,
    item_tag_name: String,
    collect: HashSet<String>,
    stack: RefCell<Vec<Frame>>,
    /// Elements opened and not yet closed, records or not
    depth: Cell<usize>,
    exhausted: Cell<bool>,
}

impl<R: Read> XmlRecordReader<R> {
    fn new(rdr: R, capacity: usize, tag: String, collect: HashSet<String>) -> Self {
        let buf_reader = BufReader::with_capacity(capacity, rdr);
        let xml_reader = XmlReader::from_reader(buf_reader);

        Self {
            reader: RefCell::new(xml_reader),
            buffer: RefCell::new(Vec::with_capacity(1024)),
            item_tag_name: tag,
            collect,
            stack: RefCell::new(Vec::new()),
            depth: Cell::new(0),
            exhausted: Cell::new(false),
        }
    }

    /// Closes the innermost open element, returning it when it is a record.
    fn close_element(&self, stack: &mut Vec<Frame>) -> Option<Record> {
        let frame = stack.pop()?;
        let name = frame.name.clone();
        let record = frame.into_record();
        let is_item = name == self.item_tag_name;

        match stack.last_mut() {
            Some(parent) => {
                let collect = self.collect.contains(&name);
                if is_item {
                    parent.add_child(name, record.clone(), collect);
                    Some(record)
                } else {
                    parent.add_child(name, record, collect);
                    None
                }
            }
            None => Some(record),
        }
    }

    fn push_text(stack: &mut [Frame], text: &str) {
        if let Some(frame) = stack.last_mut() {
            frame.text.push_str(text);
        }
    }
}

impl<R: Read> ItemReader<Record> for XmlRecordReader<R> {
    fn read(&self) -> ItemReaderResult<Record> {
        if self.exhausted.get() {
            return Ok(None);
        }

        let mut reader = self.reader.borrow_mut();
        let mut buffer = self.buffer.borrow_mut();
        let mut stack = self.stack.borrow_mut();

        loop {
            buffer.clear();
            let event = reader
                .read_event_into(&mut buffer)
                .map_err(|e| xml_error("XML parsing error", e))?;

            match event {
                Event::Start(ref start) => {
                    self.depth.set(self.depth.get() + 1);
                    if !stack.is_empty() || element_name(start)? == self.item_tag_name {
                        stack.push(Frame::new(start)?);
                    }
                }
                Event::Empty(ref start) => {
                    if !stack.is_empty() || element_name(start)? == self.item_tag_name {
                        stack.push(Frame::new(start)?);
                        if let Some(record) = self.close_element(&mut stack) {
                            return Ok(Some(record));
                        }
                    }
                }
                Event::End(_) => {
                    self.depth.set(self.depth.get().saturating_sub(1));
                    if let Some(record) = self.close_element(&mut stack) {
                        debug!("Read record from <{}>", self.item_tag_name);
                        return Ok(Some(record));
                    }
                }
                Event::Text(ref text) => {
                    let text = decode_utf8(text.as_ref(), "text")?;
                    Self::push_text(&mut stack, text);
                }
                Event::CData(ref cdata) => {
                    let text = decode_utf8(cdata.as_ref(), "CDATA section")?;
                    Self::push_text(&mut stack, text);
                }
                Event::GeneralRef(ref reference) => {
                    let name = decode_utf8(reference.as_ref(), "entity reference")?;
                    let text = resolve_reference(name)?;
                    Self::push_text(&mut stack, &text);
                }
                Event::Eof => {
                    if let Some(frame) = stack.last() {
                        return Err(BatchError::ItemReader(format!(
                            "Unexpected end of file inside <{}>",
                            frame.name
                        )));
                    }
                    if self.depth.get() > 0 {
                        return Err(BatchError::ItemReader(format!(
                            "Unexpected end of file with {} unclosed element(s)",
                            self.depth.get()
                        )));
                    }
                    debug!("Reached end of file");
                    self.exhausted.set(true);
                    return Ok(None);
                }
                _ => continue,
            }
        }
    }
}

fn element_name(start: &BytesStart) -> Result<String, BatchError> {
    decode_utf8(start.name().as_ref(), "element name").map(str::to_string)
}

fn decode_utf8<'b>(bytes: &'b [u8], what: &str) -> Result<&'b str, BatchError> {
    str::from_utf8(bytes).map_err(|e| xml_error(&format!("Invalid UTF-8 in {}", what), e))
}

fn xml_error(context: &str, err: impl std::fmt::Display) -> BatchError {
    BatchError::ItemReader(format!("{}: {}", context, err))
}

/// Resolves the name of an `&name;` reference to its text.
fn resolve_reference(name: &str) -> Result<String, BatchError> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return parsed
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| {
                BatchError::ItemReader(format!("Invalid character reference: &{};", name))
            });
    }

    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| BatchError::ItemReader(format!("Unknown entity: &{};", name)))
}
