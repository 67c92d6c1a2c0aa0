pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::LocalStorage;
pub use config::JobConfig;
pub use crate::core::{etl::EtlEngine, pipeline::SstPipeline, plan::QueryPlan};
pub use domain::model::MonthlyRecord;
pub use utils::error::{Result, SstError};
