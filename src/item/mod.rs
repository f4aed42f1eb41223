/// The value type flowing through the pipeline.
pub mod record;

/// Streams records out of an XML document.
pub mod xml;

/// Filters records against a fixed field-name schema.
pub mod schema;

/// Writes records as a JSON array.
pub mod json;
