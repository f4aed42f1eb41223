use std::time::{Duration, Instant};

use log::{debug, error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    item::{ItemProcessor, ItemReader, ItemWriter},
};

#[derive(Debug, PartialEq)]
pub enum ChunkStatus {
    /// The reader is exhausted
    Finished,
    /// The chunk holds `chunk_size` items and the reader may have more
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepStatus {
    Starting,
    Started,
    Success,
    ReadError,
    ProcessorError,
    WriteError,
}

/// Bookkeeping for one run of a step.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this step execution
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items dropped by the processor
    pub filter_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::default(),
            read_count: 0,
            filter_count: 0,
            write_count: 0,
        }
    }
}

pub trait Step {
    /// Executes the step.
    ///
    /// This method represents the main operation of the step. It coordinates
    /// reading items, processing them, and writing them out.
    ///
    /// # Returns
    /// - `Ok(())`: The step completed successfully
    /// - `Err(BatchError::Step)`: The step failed, the cause is its `source`
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;

    fn name(&self) -> &str;
}

pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    /// Component responsible for reading items from the source
    reader: &'a dyn ItemReader<I>,
    /// Component responsible for processing items
    processor: &'a dyn ItemProcessor<I, O>,
    /// Component responsible for writing items to the destination
    writer: &'a dyn ItemWriter<O>,
    /// Number of items to process in each chunk
    chunk_size: u16,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.start_time = start_time;
        step_execution.status = StepStatus::Starting;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        let result = self.run_chunks(step_execution);

        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        match result {
            Ok(()) => {
                step_execution.status = StepStatus::Success;
                info!(
                    "End of step: {}, id: {}, read: {}, filtered: {}, written: {}, duration: {:?}",
                    step_execution.name,
                    step_execution.id,
                    step_execution.read_count,
                    step_execution.filter_count,
                    step_execution.write_count,
                    step_execution.duration
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "Step {} failed with status {:?}: {}",
                    step_execution.name, step_execution.status, err
                );
                Err(BatchError::Step {
                    name: step_execution.name.clone(),
                    source: Box::new(err),
                })
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    fn run_chunks(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        if let Err(err) = self.writer.open() {
            step_execution.status = StepStatus::WriteError;
            return Err(err);
        }
        step_execution.status = StepStatus::Started;

        loop {
            let (read_items, chunk_status) = self.read_chunk(step_execution)?;
            let processed_items = self.process_chunk(step_execution, &read_items)?;
            self.write_chunk(step_execution, &processed_items)?;

            if chunk_status == ChunkStatus::Finished {
                break;
            }
        }

        if let Err(err) = self.writer.close() {
            step_execution.status = StepStatus::WriteError;
            return Err(err);
        }

        Ok(())
    }

    /// Reads a chunk of items from the reader.
    ///
    /// # Returns
    /// - `Ok((items, ChunkStatus::Full))`: `chunk_size` items were read
    /// - `Ok((items, ChunkStatus::Finished))`: the reader is exhausted, `items` may be empty
    /// - `Err(BatchError)`: the reader failed
    fn read_chunk(
        &self,
        step_execution: &mut StepExecution,
    ) -> Result<(Vec<I>, ChunkStatus), BatchError> {
        debug!("Start reading chunk");

        let mut read_items = Vec::with_capacity(self.chunk_size as usize);

        loop {
            match self.reader.read() {
                Ok(Some(item)) => {
                    read_items.push(item);
                    step_execution.read_count += 1;

                    if read_items.len() >= self.chunk_size as usize {
                        return Ok((read_items, ChunkStatus::Full));
                    }
                }
                Ok(None) => {
                    debug!("End reading chunk: FINISHED");
                    return Ok((read_items, ChunkStatus::Finished));
                }
                Err(err) => {
                    step_execution.status = StepStatus::ReadError;
                    return Err(err);
                }
            }
        }
    }

    /// Applies the processor to each item, dropping the filtered ones.
    fn process_chunk(
        &self,
        step_execution: &mut StepExecution,
        read_items: &[I],
    ) -> Result<Vec<O>, BatchError> {
        debug!("Processing chunk of {} items", read_items.len());
        let mut result = Vec::with_capacity(read_items.len());

        for item in read_items {
            match self.processor.process(item) {
                Ok(Some(processed_item)) => result.push(processed_item),
                Ok(None) => step_execution.filter_count += 1,
                Err(err) => {
                    step_execution.status = StepStatus::ProcessorError;
                    return Err(err);
                }
            }
        }

        Ok(result)
    }

    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        processed_items: &[O],
    ) -> Result<(), BatchError> {
        if processed_items.is_empty() {
            debug!("No items to write, skipping write call");
            return Ok(());
        }

        debug!("Writing chunk of {} items", processed_items.len());

        let result = self
            .writer
            .write(processed_items)
            .and_then(|()| self.writer.flush());

        match result {
            Ok(()) => {
                step_execution.write_count += processed_items.len();
                Ok(())
            }
            Err(err) => {
                step_execution.status = StepStatus::WriteError;
                Err(err)
            }
        }
    }
}

pub struct ChunkOrientedStepBuilder<'a, I, O> {
    name: String,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    chunk_size: u16,
}

impl<'a, I, O> ChunkOrientedStepBuilder<'a, I, O> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reader: None,
            processor: None,
            writer: None,
            chunk_size: 1,
        }
    }

    pub fn reader(mut self, reader: &'a dyn ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a dyn ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a dyn ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn chunk_size(mut self, chunk_size: u16) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Builds the step.
    ///
    /// # Errors
    /// `BatchError::Configuration` when the reader, processor or writer is missing.
    pub fn build(self) -> Result<ChunkOrientedStep<'a, I, O>, BatchError> {
        let missing = |part: &str| {
            BatchError::Configuration(format!("{} is required for building step {}", part, self.name))
        };

        Ok(ChunkOrientedStep {
            reader: self.reader.ok_or_else(|| missing("Reader"))?,
            processor: self.processor.ok_or_else(|| missing("Processor"))?,
            writer: self.writer.ok_or_else(|| missing("Writer"))?,
            chunk_size: self.chunk_size,
            name: self.name,
        })
    }
}

pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    /// Starts a step definition; an empty name is replaced by a random one.
    pub fn new(name: &str) -> Self {
        let name = if name.is_empty() {
            build_name()
        } else {
            name.to_string()
        };
        Self { name }
    }

    pub fn chunk<'a, I, O>(self, chunk_size: u16) -> ChunkOrientedStepBuilder<'a, I, O> {
        ChunkOrientedStepBuilder::new(&self.name).chunk_size(chunk_size)
    }
}
