/// XML support for streaming records out of a document.
///
/// The reader walks the document with `quick-xml` and materialises only the
/// elements found inside an open record element, so memory stays bounded by
/// the size of one record whatever the size of the document.
///
/// # Extraction rules
///
/// - An element without attributes or child elements becomes a
///   [`Record::Scalar`](crate::item::record::Record::Scalar) with its trimmed text.
/// - Any other element becomes a mapping: attributes under `$`, children under
///   their tag name in document order, remaining text under `$text`.
/// - A repeated child overwrites the previous one unless its name was passed
///   to [`XmlRecordReaderBuilder::collect`], in which case all occurrences are
///   gathered into a list.
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
///   <Message priority="high">
///     <From>alice</From>
///     <To>bob</To>
///     <To>carol</To>
///   </Message>
/// </inbox>
/// "#;
///
/// let reader = XmlRecordReaderBuilder::new()
///     .tag("Message")
///     .collect(["To"])
///     .from_reader(xml_data.as_bytes());
///
/// let record = reader.read().unwrap().unwrap();
/// assert_eq!(
///     serde_json::to_string(&record).unwrap(),
///     r#"{"$":{"priority":"high"},"From":"alice","To":["bob","carol"]}"#
/// );
/// assert!(reader.read().unwrap().is_none());
/// ```
pub mod xml_reader;

pub use xml_reader::{XmlRecordReader, XmlRecordReaderBuilder};
