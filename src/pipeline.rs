use log::info;

use crate::{
    config::PipelineConfig,
    core::step::{Step, StepBuilder, StepExecution},
    item::{
        json::JsonRecordWriterBuilder, record::Record, schema::SchemaValidatorBuilder,
        xml::XmlRecordReaderBuilder,
    },
    BatchError,
};

/// Converts `config.input_path` into a JSON array at `config.output_path`.
///
/// The input is opened before the output is created, so a missing input
/// leaves no output file behind. On failure the output is left as far as it
/// got, without a closing bracket.
///
/// # Errors
/// - `BatchError::Configuration` when the configuration is invalid
/// - `BatchError::ItemReader` / `BatchError::ItemWriter` when a file cannot be opened
/// - `BatchError::Step` when reading, validating or writing fails mid-stream
pub fn run(config: &PipelineConfig) -> Result<StepExecution, BatchError> {
    config.validate()?;

    info!(
        "Converting <{}> records from {} to {}",
        config.end_element,
        config.input_path.display(),
        config.output_path.display()
    );

    let reader = XmlRecordReaderBuilder::new()
        .tag(&config.end_element)
        .capacity(config.capacity)
        .collect(config.collect.iter().cloned())
        .from_path(&config.input_path)?;

    let validator = SchemaValidatorBuilder::new()
        .schema(config.schema.iter().cloned())
        .invalid_value_keys(config.invalid_value_keys.iter().cloned())
        .build();

    let writer = JsonRecordWriterBuilder::new()
        .separator(config.separator)
        .pretty_formatter(config.pretty)
        .from_path(&config.output_path)?;

    let step = StepBuilder::new("xml_to_json")
        .chunk::<Record, Record>(config.chunk_size)
        .reader(&reader)
        .processor(&validator)
        .writer(&writer)
        .build()?;

    let mut step_execution = StepExecution::new(step.name());
    step.execute(&mut step_execution)?;

    Ok(step_execution)
}
