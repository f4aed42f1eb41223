use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{item::json::SeparatorStyle, BatchError};

/// Everything a conversion run needs, fixed before the pipeline starts.
///
/// Every field has a default, so a TOML file only needs the values it changes:
///
/// ```
/// use xml2json_batch::config::PipelineConfig;
///
/// let config = PipelineConfig::from_toml_str(r#"
///     end_element = "Note"
///     schema = ["To", "Body"]
/// "#).unwrap();
///
/// assert_eq!(config.end_element, "Note");
/// assert_eq!(config.invalid_value_keys, vec!["script", "$text"]);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Element whose closing tag completes a record
    pub end_element: String,
    /// Exact set of field names an accepted record has
    pub schema: Vec<String>,
    /// Keys whose presence rejects a record
    pub invalid_value_keys: Vec<String>,
    /// Child element names gathered into lists
    pub collect: Vec<String>,
    pub separator: SeparatorStyle,
    pub pretty: bool,
    pub chunk_size: u16,
    /// Read buffer size in bytes
    pub capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("CodeTest-XML.xml"),
            output_path: PathBuf::from("CodeTest-XML.json"),
            end_element: "Message".to_string(),
            schema: vec!["From".to_string(), "Message".to_string()],
            invalid_value_keys: vec!["script".to_string(), "$text".to_string()],
            collect: Vec::new(),
            separator: SeparatorStyle::Strict,
            pretty: false,
            chunk_size: 1,
            capacity: 1024,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, BatchError> {
        toml::from_str(content).map_err(|e| BatchError::Configuration(e.to_string()))
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BatchError::Configuration(format!("Unable to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if self.end_element.trim().is_empty() {
            return Err(BatchError::Configuration(
                "end_element must not be empty".to_string(),
            ));
        }
        if self.schema.is_empty() {
            return Err(BatchError::Configuration(
                "schema must name at least one field".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(BatchError::Configuration(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.capacity == 0 {
            return Err(BatchError::Configuration(
                "capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.end_element, "Message");
        assert_eq!(config.schema, vec!["From", "Message"]);
        assert_eq!(config.separator, SeparatorStyle::Strict);
    }

    #[test]
    fn load_toml_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
input_path = "in.xml"
output_path = "out.json"
end_element = "Note"
schema = ["To", "Body"]
invalid_value_keys = ["script"]
collect = ["To"]
separator = "trailing"
pretty = true
chunk_size = 50
capacity = 8192
"#,
            )
            .unwrap();

        let config = PipelineConfig::from_toml_file(temp_file.path()).unwrap();

        assert_eq!(config.input_path, PathBuf::from("in.xml"));
        assert_eq!(config.output_path, PathBuf::from("out.json"));
        assert_eq!(config.schema, vec!["To", "Body"]);
        assert_eq!(config.invalid_value_keys, vec!["script"]);
        assert_eq!(config.collect, vec!["To"]);
        assert_eq!(config.separator, SeparatorStyle::Trailing);
        assert!(config.pretty);
        assert_eq!(config.chunk_size, 50);
        assert_eq!(config.capacity, 8192);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = PipelineConfig::from_toml_str("end_elment = \"Note\"");
        assert!(matches!(result, Err(BatchError::Configuration(_))));
    }

    #[test]
    fn missing_file_is_rejected() {
        let result = PipelineConfig::from_toml_file("/does/not/exist.toml");
        assert!(matches!(result, Err(BatchError::Configuration(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let empty_element = PipelineConfig {
            end_element: " ".to_string(),
            ..Default::default()
        };
        assert!(empty_element.validate().is_err());

        let empty_schema = PipelineConfig {
            schema: Vec::new(),
            ..Default::default()
        };
        assert!(empty_schema.validate().is_err());

        let zero_chunk = PipelineConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(zero_chunk.validate().is_err());

        let zero_capacity = PipelineConfig {
            capacity: 0,
            ..Default::default()
        };
        assert!(zero_capacity.validate().is_err());
    }
}
