use crate::error::BatchError;

/// Result of a single read: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<I> = Result<Option<I>, BatchError>;

/// Result of processing a single item: `Ok(None)` when the item is filtered out.
pub type ItemProcessorResult<O> = Result<Option<O>, BatchError>;

/// A source of items, pulled one at a time.
pub trait ItemReader<I> {
    /// Reads the next item.
    ///
    /// Returns `Ok(None)` when there is nothing left to read. A reader is not
    /// restartable: once exhausted, every further call returns `Ok(None)`.
    fn read(&self) -> ItemReaderResult<I>;
}

/// Business logic applied to every item between the reader and the writer.
pub trait ItemProcessor<I, O> {
    fn process(&self, item: &I) -> ItemProcessorResult<O>;
}

/// A destination for items.
///
/// `open` is called once before the first write and `close` once after the
/// reader is exhausted. `close` is not called when the step fails.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> Result<(), BatchError>;

    fn flush(&self) -> Result<(), BatchError> {
        Ok(())
    }

    fn open(&self) -> Result<(), BatchError> {
        Ok(())
    }

    fn close(&self) -> Result<(), BatchError> {
        Ok(())
    }
}
