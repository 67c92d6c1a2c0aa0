use crate::config::job_config::CatalogConfig;
use crate::domain::model::{Scene, SceneManifest};
use crate::domain::ports::CatalogSource;
use crate::utils::error::{Result, SstError};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn catalog_error(message: impl Into<String>) -> SstError {
    SstError::CatalogError {
        message: message.into(),
    }
}

fn parse_manifest(bytes: &[u8], origin: &str) -> Result<Vec<Scene>> {
    let manifest: SceneManifest = serde_json::from_slice(bytes)
        .map_err(|e| catalog_error(format!("invalid scene manifest from {}: {}", origin, e)))?;
    let scenes = manifest.into_scenes();

    for scene in &scenes {
        if let Some((name, _)) = scene.bands.iter().find(|(_, grid)| !grid.is_consistent()) {
            return Err(catalog_error(format!(
                "scene '{}' band '{}' has a non-positive pixel size or a value count that does not match width x height",
                scene.id, name
            )));
        }
    }
    Ok(scenes)
}

/// Scene manifest on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn load_scenes(&self) -> Result<Vec<Scene>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| catalog_error(format!("cannot read {}: {}", self.path.display(), e)))?;
        parse_manifest(&bytes, &self.describe())
    }
}

/// Scene manifest served over HTTP.
pub struct ApiCatalog {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
    parameters: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl ApiCatalog {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            headers: HashMap::new(),
            parameters: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_parameters(mut self, parameters: HashMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl CatalogSource for ApiCatalog {
    fn describe(&self) -> String {
        format!("api {}", self.endpoint)
    }

    async fn load_scenes(&self) -> Result<Vec<Scene>> {
        let mut request = self.client.get(&self.endpoint);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if !self.parameters.is_empty() {
            request = request.query(&self.parameters);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Requesting scene manifest from: {}", self.endpoint);
        let response = request.send().await?;
        tracing::debug!("Catalog response status: {}", response.status());

        if !response.status().is_success() {
            return Err(catalog_error(format!(
                "{} answered {}",
                self.endpoint,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        parse_manifest(&bytes, &self.describe())
    }
}

/// Builds the catalog named by `[catalog]`. Expects a validated config.
pub fn catalog_from_config(config: &CatalogConfig) -> Result<Arc<dyn CatalogSource>> {
    match config.r#type.as_str() {
        "file" => {
            let path = config
                .path
                .as_ref()
                .ok_or_else(|| SstError::MissingConfigError {
                    field: "catalog.path".to_string(),
                })?;
            Ok(Arc::new(FileCatalog::new(path)))
        }
        "api" => {
            let endpoint = config
                .endpoint
                .as_ref()
                .ok_or_else(|| SstError::MissingConfigError {
                    field: "catalog.endpoint".to_string(),
                })?;
            let mut catalog = ApiCatalog::new(endpoint)
                .with_headers(config.headers.clone().unwrap_or_default())
                .with_parameters(config.parameters.clone().unwrap_or_default());
            if let Some(seconds) = config.timeout_seconds {
                catalog = catalog.with_timeout(Duration::from_secs(seconds));
            }
            Ok(Arc::new(catalog))
        }
        other => Err(SstError::InvalidConfigValueError {
            field: "catalog.type".to_string(),
            value: other.to_string(),
            reason: "Catalog type must be 'file' or 'api'".to_string(),
        }),
    }
}
