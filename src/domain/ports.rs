use crate::domain::model::{ExtractResult, Scene, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Where scenes come from. Implementations fail fast; there are no retries.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn describe(&self) -> String;
    async fn load_scenes(&self) -> Result<Vec<Scene>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractResult>;
    async fn transform(&self, data: ExtractResult) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
