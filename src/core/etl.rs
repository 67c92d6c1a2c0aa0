use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting monthly SST job...");

        tracing::info!("Extracting region and scenes...");
        let extracted = self.pipeline.extract().await?;

        tracing::info!("Reducing monthly windows...");
        let transformed = self.pipeline.transform(extracted).await?;
        tracing::debug!(
            "{} record(s), {} with data, scale {}",
            transformed.records.len(),
            transformed.windows_with_data,
            transformed.effective_scale
        );

        tracing::info!("Exporting table...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {} ({:?})", output_path, started.elapsed());

        Ok(output_path)
    }
}
