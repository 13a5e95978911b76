//! The provider capability contract and the name-to-constructor registry.
//!
//! Concrete providers (imagery catalogs, reanalysis stores, terrain
//! models) live outside this crate. They implement [`Provider`] and are
//! registered under a name that specifications refer to.

use async_trait::async_trait;
use cube_common::{BoundingBox, ProductCube, ProviderKind, TimeChunk, TimeInterval};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{MinicuberError, ProviderError, Result};

/// Arguments of one provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    /// Padded query box.
    pub bbox: BoundingBox,
    /// Chunk being assembled; `None` for static providers.
    pub window: Option<TimeChunk>,
    /// Whole requested interval, unpadded.
    pub full_interval: TimeInterval,
}

impl LoadRequest {
    pub fn temporal(bbox: BoundingBox, window: TimeChunk, full_interval: TimeInterval) -> Self {
        Self {
            bbox,
            window: Some(window),
            full_interval,
        }
    }

    pub fn static_layer(bbox: BoundingBox, full_interval: TimeInterval) -> Self {
        Self {
            bbox,
            window: None,
            full_interval,
        }
    }
}

/// A pluggable data source.
///
/// `load_data` returns `Ok(None)` when the source has nothing for the
/// requested box and window. Temporal providers are called once per time
/// chunk and must tolerate repeated calls; static providers are called
/// once per build.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Registered name, e.g. `"s2"`.
    fn name(&self) -> &str;

    /// Prefix used to namespace this provider's variables.
    fn prefix(&self) -> &str {
        self.name()
    }

    fn kind(&self) -> ProviderKind;

    async fn load_data(
        &self,
        request: &LoadRequest,
    ) -> std::result::Result<Option<ProductCube>, ProviderError>;
}

impl fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name())
            .field("prefix", &self.prefix())
            .field("kind", &self.kind())
            .finish()
    }
}

/// One provider declaration in a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub name: String,
    /// Passed through to the provider's constructor.
    #[serde(default)]
    pub kwargs: serde_json::Value,
}

impl ProviderSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kwargs: serde_json::Value::Null,
        }
    }

    pub fn with_kwargs(mut self, kwargs: serde_json::Value) -> Self {
        self.kwargs = kwargs;
        self
    }
}

/// Builds a provider from its kwargs.
pub type ProviderConstructor = Arc<
    dyn Fn(&serde_json::Value) -> std::result::Result<Box<dyn Provider>, ProviderError>
        + Send
        + Sync,
>;

/// Maps provider names to constructors.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    constructors: BTreeMap<String, ProviderConstructor>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor, replacing any previous one under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&serde_json::Value) -> std::result::Result<Box<dyn Provider>, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Instantiate the provider declared by `spec`.
    pub fn create(&self, spec: &ProviderSpec) -> Result<Box<dyn Provider>> {
        let constructor = self.constructors.get(&spec.name).ok_or_else(|| {
            MinicuberError::Config(format!(
                "unknown provider '{}' (registered: {})",
                spec.name,
                self.names().join(", ")
            ))
        })?;
        constructor(&spec.kwargs).map_err(|e| {
            MinicuberError::Config(format!("provider '{}': {}", spec.name, e))
        })
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("names", &self.names())
            .finish()
    }
}
