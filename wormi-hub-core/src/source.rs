use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{Batch, Error, EventRecord, Location, Metric, Person, Resource, Result};

pub const EVENTS: &str = "events.json";
pub const LOCATIONS: &str = "locations.json";
pub const RESOURCES: &str = "resources.json";
pub const METRICS: &str = "metrics.json";
pub const BATCHES: &str = "batches.json";
pub const PEOPLE: &str = "people.json";

/// Where the static datasets live
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human readable origin, for logs
    fn describe(&self) -> String;

    async fn fetch_raw(&self, dataset: &str) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait DataSourceExt: DataSource {
    async fn fetch<T>(&self, dataset: &str) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let raw = self.fetch_raw(dataset).await?;
        serde_json::from_slice::<T>(&raw).map_err(|e| Error::DataSource {
            dataset: dataset.to_string(),
            message: format!("invalid JSON: {}", e),
        })
    }
}

impl<T: DataSource> DataSourceExt for T {}

#[async_trait]
impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn fetch_raw(&self, dataset: &str) -> Result<Vec<u8>> {
        (**self).fetch_raw(dataset).await
    }
}

/// Datasets stored as files in a local directory
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSource for DirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn fetch_raw(&self, dataset: &str) -> Result<Vec<u8>> {
        let path = self.root.join(dataset);
        tracing::debug!("reading dataset {}", path.display());

        tokio::fs::read(&path).await.map_err(|e| Error::DataSource {
            dataset: dataset.to_string(),
            message: format!("failed to read {}: {}", path.display(), e),
        })
    }
}

/// Datasets served over HTTP below a base URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("wormi-hub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn dataset_url(&self, dataset: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), dataset)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch_raw(&self, dataset: &str) -> Result<Vec<u8>> {
        let url = self.dataset_url(dataset);
        tracing::debug!("fetching dataset {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::DataSource {
                dataset: dataset.to_string(),
                message: format!("HTTP {} from {}", response.status(), url),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Typed access to every dataset of the site
pub struct Catalog<S: DataSource> {
    source: S,
}

impl<S: DataSource> Catalog<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// All events, earliest start first
    pub async fn events(&self) -> Result<Vec<EventRecord>> {
        let mut events: Vec<EventRecord> = self.source.fetch(EVENTS).await?;
        events.sort_by_key(|event| event.start);
        tracing::debug!("loaded {} events from {}", events.len(), self.source.describe());
        Ok(events)
    }

    pub async fn find_event(&self, id: &str) -> Result<EventRecord> {
        self.events()
            .await?
            .into_iter()
            .find(|event| event.id == id)
            .ok_or_else(|| Error::NotFound(format!("event '{}'", id)))
    }

    pub async fn locations(&self) -> Result<Vec<Location>> {
        self.source.fetch(LOCATIONS).await
    }

    pub async fn resources(&self) -> Result<Vec<Resource>> {
        self.source.fetch(RESOURCES).await
    }

    pub async fn metrics(&self) -> Result<Vec<Metric>> {
        self.source.fetch(METRICS).await
    }

    pub async fn batches(&self) -> Result<Vec<Batch>> {
        self.source.fetch(BATCHES).await
    }

    pub async fn people(&self) -> Result<Vec<Person>> {
        self.source.fetch(PEOPLE).await
    }
}
