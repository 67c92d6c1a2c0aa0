pub mod etl;
pub mod export;
pub mod pipeline;
pub mod plan;
pub mod reduce;

pub use crate::domain::model::{ExtractResult, MonthlyRecord, TransformResult};
pub use crate::domain::ports::{CatalogSource, Pipeline, Storage};
pub use crate::utils::error::Result;
