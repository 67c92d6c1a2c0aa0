use crate::adapters::catalog::catalog_from_config;
use crate::adapters::region::load_region;
use crate::config::job_config::JobConfig;
use crate::core::export::{bundle_zip, render_exports};
use crate::core::plan::QueryPlan;
use crate::core::reduce::{effective_scale, flatten, prepare_collection, reduce_window, YearSeries};
use crate::core::{CatalogSource, ExtractResult, Pipeline, Storage, TransformResult};
use crate::domain::calendar::CalendarWindow;
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Monthly-mean SST job: region + catalog in, `date,mean_sst` table out.
pub struct SstPipeline<S: Storage> {
    storage: S,
    config: JobConfig,
    catalog: Arc<dyn CatalogSource>,
    plan: QueryPlan,
}

impl<S: Storage> SstPipeline<S> {
    pub fn new(storage: S, config: JobConfig) -> Result<Self> {
        let catalog = catalog_from_config(&config.catalog)?;
        Self::with_catalog(storage, config, catalog)
    }

    pub fn with_catalog(
        storage: S,
        config: JobConfig,
        catalog: Arc<dyn CatalogSource>,
    ) -> Result<Self> {
        let plan = QueryPlan::from_config(&config)?;
        Ok(Self {
            storage,
            config,
            catalog,
            plan,
        })
    }

    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for SstPipeline<S> {
    async fn extract(&self) -> Result<ExtractResult> {
        tracing::info!("🚀 Loading region and scene catalog ({})", self.catalog.describe());

        let (region, scenes) = tokio::try_join!(
            load_region(self.config.region_name(), &self.config.region.path),
            self.catalog.load_scenes()
        )?;

        tracing::info!("📦 Catalog returned {} scene(s)", scenes.len());
        Ok(ExtractResult { region, scenes })
    }

    async fn transform(&self, data: ExtractResult) -> Result<TransformResult> {
        let plan = &self.plan;
        let collection = prepare_collection(&data.scenes, &plan.band, &data.region);
        tracing::debug!(
            "{} of {} scene(s) remain after band selection and bounds filter",
            collection.len(),
            data.scenes.len()
        );

        let scale = effective_scale(data.region.bbox(), &plan.reduction)?;
        if scale != plan.reduction.scale {
            tracing::warn!(
                "Requested scale {} exceeds max_pixels {}; reducing at scale {}",
                plan.reduction.scale,
                plan.reduction.max_pixels,
                scale
            );
        }

        let series: Vec<YearSeries> = plan
            .years()
            .map(|year| {
                let mut months = [None; 12];
                for (i, slot) in months.iter_mut().enumerate() {
                    let window = CalendarWindow {
                        year,
                        month: i as u32 + 1,
                    };
                    *slot = reduce_window(&collection, &window, &plan.band, &data.region, scale);
                }
                YearSeries { year, months }
            })
            .collect();

        let records = flatten(&series);
        let windows_with_data = records.iter().filter(|r| r.mean_sst.is_some()).count();
        tracing::info!(
            "📊 Reduced {} monthly windows, {} with data",
            records.len(),
            windows_with_data
        );

        Ok(TransformResult {
            records,
            windows_with_data,
            effective_scale: scale,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let description = self.config.description();
        let files = render_exports(&result.records, description, &self.config.export.output_formats)?;

        let written = if self.config.compression_enabled() {
            let archive_name = self
                .config
                .export
                .compression
                .as_ref()
                .and_then(|c| c.filename.clone())
                .unwrap_or_else(|| format!("{}.zip", description));
            let zip_data = bundle_zip(&files)?;
            tracing::debug!("Writing ZIP archive ({} bytes) with {} file(s)", zip_data.len(), files.len());
            self.storage.write_file(&archive_name, &zip_data).await?;
            archive_name
        } else {
            for file in &files {
                self.storage.write_file(&file.name, &file.contents).await?;
            }
            // formats are validated non-empty
            files.first().map(|f| f.name.clone()).unwrap_or_default()
        };

        let output_path = Path::new(self.config.output_path()).join(written);
        Ok(output_path.display().to_string())
    }
}
