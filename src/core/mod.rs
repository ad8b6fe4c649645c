pub mod etl;
pub mod loader;
pub mod pacing;
pub mod pipeline;
pub mod recorder;
pub mod retry;
pub mod splitter;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{InputEntry, Record, SplitFile, UploadBatch};
pub use crate::domain::ports::{Pipeline, Storage, Uploader};
pub use crate::utils::error::Result;
