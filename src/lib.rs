#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # xml2json-batch

 Streams the repeated record elements of an XML document into a JSON array,
 keeping only the records whose fields match a fixed schema.

 The document is never loaded in full: each record is extracted when its
 closing tag is read, validated, written, and dropped before the next one is
 read.

 ## Core Concepts

- **ItemReader:** the element source. [`XmlRecordReader`](item::xml::XmlRecordReader)
  emits one [`Record`](item::record::Record) per closing tag of the target element.
- **ItemProcessor:** the schema validator. [`SchemaValidator`](item::schema::SchemaValidator)
  keeps a record only when its field names are exactly the schema and none of its
  keys is blacklisted.
- **ItemWriter:** the output sink. [`JsonRecordWriter`](item::json::JsonRecordWriter)
  opens the array, appends each accepted record and closes the array.
- **Step:** [`ChunkOrientedStep`](core::step::ChunkOrientedStep) drives the three
  and records what happened in a [`StepExecution`](core::step::StepExecution).

 ## Getting Started

```rust
use xml2json_batch::{
    core::step::{Step, StepBuilder, StepExecution},
    error::BatchError,
    item::{
        json::JsonRecordWriterBuilder, record::Record, schema::SchemaValidatorBuilder,
        xml::XmlRecordReaderBuilder,
    },
};

fn main() -> Result<(), BatchError> {
    let xml = r#"
    <inbox>
      <Message><From>alice</From><Message>hello</Message></Message>
      <Message><From>mallory</From><Message>hi</Message><script>alert(1)</script></Message>
      <Message><From>bob</From></Message>
    </inbox>"#;

    let reader = XmlRecordReaderBuilder::new()
        .tag("Message")
        .from_reader(xml.as_bytes());

    let validator = SchemaValidatorBuilder::new()
        .schema(["From", "Message"])
        .invalid_value_keys(["script", "$text"])
        .build();

    let mut output = Vec::new();
    {
        let writer = JsonRecordWriterBuilder::new().from_writer(&mut output);

        let step = StepBuilder::new("inbox")
            .chunk::<Record, Record>(1)
            .reader(&reader)
            .processor(&validator)
            .writer(&writer)
            .build()?;

        let mut step_execution = StepExecution::new(step.name());
        step.execute(&mut step_execution)?;

        assert_eq!(step_execution.read_count, 5);
        assert_eq!(step_execution.write_count, 1);
    }

    assert_eq!(
        String::from_utf8(output).unwrap(),
        r#"[{"From":"alice","Message":"hello"}]"#
    );

    Ok(())
}
```

 The `xml2json` binary wraps the same pipeline behind a command line and an
 optional TOML configuration file, see [`config::PipelineConfig`].

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Record reader, validator and writer
pub mod item;

/// Run configuration
pub mod config;

/// End-to-end conversion of one file
pub mod pipeline;
