use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

/// A value extracted from an XML element.
///
/// Serializes to plain JSON: a `Mapping` becomes an object with its keys in
/// document order, a `List` an array and a `Scalar` a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Mapping(IndexMap<String, Record>),
    List(Vec<Record>),
    Scalar(String),
}

impl Record {
    /// Field names of the record. Only a `Mapping` has any.
    pub fn field_names(&self) -> BTreeSet<&str> {
        match self {
            Record::Mapping(fields) => fields.keys().map(String::as_str).collect(),
            Record::List(_) | Record::Scalar(_) => BTreeSet::new(),
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Record>> {
        match self {
            Record::Mapping(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.as_mapping().and_then(|fields| fields.get(key))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Record::Scalar(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Record {
    fn from(text: &str) -> Self {
        Record::Scalar(text.to_string())
    }
}

impl<K: Into<String>> FromIterator<(K, Record)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, Record)>>(iter: T) -> Self {
        Record::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_keeps_document_order_in_json() {
        let record: Record = [
            ("From", Record::from("x")),
            ("Message", Record::from("hi")),
            (
                "tags",
                Record::List(vec![Record::from("a"), Record::from("b")]),
            ),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"From":"x","Message":"hi","tags":["a","b"]}"#);
    }

    #[test]
    fn only_mappings_have_field_names() {
        let record: Record = [("b", Record::from("1")), ("a", Record::from("2"))]
            .into_iter()
            .collect();

        assert_eq!(record.field_names(), BTreeSet::from(["a", "b"]));
        assert!(Record::from("text").field_names().is_empty());
        assert!(Record::List(vec![Record::from("x")]).field_names().is_empty());
    }

    #[test]
    fn accessors() {
        let record: Record = [("From", Record::from("x"))].into_iter().collect();

        assert_eq!(record.get("From").and_then(Record::as_str), Some("x"));
        assert!(record.get("Missing").is_none());
        assert!(Record::from("x").get("From").is_none());
        assert!(Record::from("x").as_mapping().is_none());
    }
}
