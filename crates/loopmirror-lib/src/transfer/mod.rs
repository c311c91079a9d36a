mod engine;
mod progress;

pub use engine::{CHUNK_SIZE, TransferOptions, TransferResult, transfer};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, TracingReporter, percent};
