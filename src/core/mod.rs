pub mod assembler;
pub mod dates;
pub mod etl;
pub mod goals;
pub mod grid;
pub mod pipeline;
pub mod reconcile;
pub mod reshape;

pub use crate::domain::model::{GoalRecord, MovementRecord, UploadBatch};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RemoteTable};
pub use crate::utils::error::Result;
