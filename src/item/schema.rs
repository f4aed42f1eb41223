use std::collections::BTreeSet;

use log::debug;

use crate::core::item::{ItemProcessor, ItemProcessorResult};

use super::record::Record;

/// Accepts a record only when its field names are exactly the schema and none
/// of its keys is a blacklisted parser artifact.
///
/// As an [`ItemProcessor`] it filters rejected records out of the step.
///
/// # Examples
///
/// ```
/// use xml2json_batch::item::record::Record;
/// use xml2json_batch::item::schema::SchemaValidatorBuilder;
///
/// let validator = SchemaValidatorBuilder::new()
///     .schema(["From", "Message"])
///     .invalid_value_keys(["script", "$text"])
///     .build();
///
/// let message: Record = [("From", Record::from("x")), ("Message", Record::from("hi"))]
///     .into_iter()
///     .collect();
/// assert!(validator.validate(&message));
///
/// let sender_only: Record = [("From", Record::from("x"))].into_iter().collect();
/// assert!(!validator.validate(&sender_only));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: BTreeSet<String>,
    invalid_value_keys: Vec<String>,
}

impl SchemaValidator {
    pub fn validate(&self, record: &Record) -> bool {
        let has_valid_keys = self.has_schema_keys(record);
        let has_valid_values = self.has_no_invalid_keys(record);

        // both checks always run
        has_valid_keys & has_valid_values
    }

    fn has_schema_keys(&self, record: &Record) -> bool {
        let field_names = record.field_names();
        field_names.len() == self.schema.len()
            && self
                .schema
                .iter()
                .all(|name| field_names.contains(name.as_str()))
    }

    fn has_no_invalid_keys(&self, record: &Record) -> bool {
        match record {
            Record::Mapping(fields) => !fields
                .keys()
                .any(|key| self.invalid_value_keys.contains(key)),
            Record::List(_) | Record::Scalar(_) => true,
        }
    }
}

impl ItemProcessor<Record, Record> for SchemaValidator {
    fn process(&self, item: &Record) -> ItemProcessorResult<Record> {
        if self.validate(item) {
            Ok(Some(item.clone()))
        } else {
            debug!("Rejected record with fields {:?}", item.field_names());
            Ok(None)
        }
    }
}

#[derive(Default)]
pub struct SchemaValidatorBuilder {
    schema: BTreeSet<String>,
    invalid_value_keys: Vec<String>,
}

impl SchemaValidatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the exact set of field names a record must have.
    pub fn schema<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the keys whose mere presence disqualifies a record.
    pub fn invalid_value_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invalid_value_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> SchemaValidator {
        SchemaValidator {
            schema: self.schema,
            invalid_value_keys: self.invalid_value_keys,
        }
    }
}
