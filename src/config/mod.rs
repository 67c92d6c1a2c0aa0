pub mod job_config;

pub use job_config::JobConfig;
