/// JSON output for streamed records.
///
/// [`JsonRecordWriter`] serializes items with `serde_json` and writes them as
/// one JSON array, opening the array on `start`, appending one item at a time
/// and closing it on `finish`. Nothing but the current item is held in memory.
///
/// # Separator styles
///
/// - [`SeparatorStyle::Strict`] (default) puts commas between items only and
///   always yields a valid JSON array.
/// - [`SeparatorStyle::Trailing`] follows every item with a comma, so a
///   non-empty array ends with `,]`. Most JSON parsers reject that; it exists
///   for consumers that expect the exact bytes of older exports.
///
/// # Examples
///
/// ```
/// use xml2json_batch::item::json::{JsonRecordWriterBuilder, SeparatorStyle};
/// use xml2json_batch::item::record::Record;
///
/// let message: Record = [("From", Record::from("alice")), ("Message", Record::from("hi"))]
///     .into_iter()
///     .collect();
///
/// let mut output = Vec::new();
/// {
///     let writer = JsonRecordWriterBuilder::new()
///         .separator(SeparatorStyle::Trailing)
///         .from_writer(&mut output);
///     writer.start().unwrap();
///     writer.append(&message).unwrap();
///     writer.finish().unwrap();
/// }
///
/// assert_eq!(
///     String::from_utf8(output).unwrap(),
///     r#"[{"From":"alice","Message":"hi"},]"#
/// );
/// ```
pub mod json_writer;

pub use json_writer::{JsonRecordWriter, JsonRecordWriterBuilder, SeparatorStyle, WriterState};
