use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("Step {name} failed")]
    Step {
        name: String,
        #[source]
        source: Box<BatchError>,
    },

    #[error("Configuration: {0}")]
    Configuration(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),
}
