//! Typed CRUD operations on the entity sets of one OData service.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::envelope::{self, EntityPage};
use crate::error::InvalidInputError;
use crate::executor::RequestExecutor;
use crate::query::QueryOptions;
use crate::traits::{Transport, TransportResponse};
use crate::types::Method;
use crate::Result;

/// An OData service endpoint, e.g. `/sap/opu/odata/IWBEP/GWSAMPLE_BASIC/`.
///
/// Cheap to clone; clones share the executor and therefore the cached token.
#[derive(Debug)]
pub struct ODataService<T> {
    executor: Arc<RequestExecutor<T>>,
    service_path: String,
    default_query: BTreeMap<String, String>,
}

impl<T> Clone for ODataService<T> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            service_path: self.service_path.clone(),
            default_query: self.default_query.clone(),
        }
    }
}

impl<T: Transport> ODataService<T> {
    /// Create a service handle. The path gets a leading and trailing `/`.
    pub fn new(executor: RequestExecutor<T>, service_path: &str) -> Self {
        Self::from_shared(Arc::new(executor), service_path)
    }

    /// Create a service handle sharing an executor with other services.
    pub fn from_shared(executor: Arc<RequestExecutor<T>>, service_path: &str) -> Self {
        Self {
            executor,
            service_path: normalize_service_path(service_path),
            default_query: BTreeMap::new(),
        }
    }

    /// Send a query parameter with every request, e.g. `sap-client`.
    ///
    /// Per-call query options take precedence.
    pub fn with_default_param(mut self, key: &str, value: &str) -> Self {
        self.default_query.insert(key.to_string(), value.to_string());
        self
    }

    /// Returns the normalized service path.
    pub fn service_path(&self) -> &str {
        &self.service_path
    }

    /// Returns the shared executor.
    pub fn executor(&self) -> &Arc<RequestExecutor<T>> {
        &self.executor
    }

    /// Returns the path of an entity set.
    pub fn entity_set_url(&self, entity_set: &str) -> String {
        format!("{}{}", self.service_path, entity_set)
    }

    /// Returns the path of one entity.
    ///
    /// The key predicate is used as given (`'HT-1000'`, `Id='1',Type='A'`),
    /// wrapped in parentheses if it isn't already.
    pub fn entity_url(&self, entity_set: &str, key: &str) -> String {
        if key.starts_with('(') {
            format!("{}{}{}", self.service_path, entity_set, key)
        } else {
            format!("{}{}({})", self.service_path, entity_set, key)
        }
    }

    /// Fetch the entities of an entity set.
    #[instrument(skip(self, options))]
    pub async fn get_entity_set<E: DeserializeOwned>(
        &self,
        entity_set: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Vec<E>> {
        debug!("Fetching entity set");
        let body = self.read(&self.entity_set_url(entity_set), options).await?;
        Ok(envelope::decode_collection(&body)?)
    }

    /// Fetch one page of an entity set with its `__count` and `__next` metadata.
    #[instrument(skip(self, options))]
    pub async fn get_entity_set_page<E: DeserializeOwned>(
        &self,
        entity_set: &str,
        options: Option<&QueryOptions>,
    ) -> Result<EntityPage<E>> {
        debug!("Fetching entity set page");
        let body = self.read(&self.entity_set_url(entity_set), options).await?;
        Ok(envelope::decode_page(&body)?)
    }

    /// Fetch a single entity by key.
    #[instrument(skip(self, options))]
    pub async fn get_entity<E: DeserializeOwned>(
        &self,
        entity_set: &str,
        key: &str,
        options: Option<&QueryOptions>,
    ) -> Result<E> {
        debug!("Fetching entity");
        let body = self.read(&self.entity_url(entity_set, key), options).await?;
        Ok(envelope::decode_entity(&body)?)
    }

    /// Create an entity and return the one the service stored.
    #[instrument(skip(self, payload))]
    pub async fn create_entity<E, P>(&self, entity_set: &str, payload: &P) -> Result<E>
    where
        E: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        debug!("Creating entity");
        let body = self
            .write(Method::Post, &self.entity_set_url(entity_set), Some(payload))
            .await?;
        Ok(envelope::decode_entity(&body)?)
    }

    /// Replace an entity (PUT).
    #[instrument(skip(self, payload))]
    pub async fn update_entity<P>(&self, entity_set: &str, key: &str, payload: &P) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        debug!("Updating entity");
        self.write(Method::Put, &self.entity_url(entity_set, key), Some(payload))
            .await?;
        Ok(())
    }

    /// Update some properties of an entity (PATCH).
    #[instrument(skip(self, payload))]
    pub async fn patch_entity<P>(&self, entity_set: &str, key: &str, payload: &P) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        debug!("Patching entity");
        self.write(Method::Patch, &self.entity_url(entity_set, key), Some(payload))
            .await?;
        Ok(())
    }

    /// Delete an entity.
    #[instrument(skip(self))]
    pub async fn delete_entity(&self, entity_set: &str, key: &str) -> Result<()> {
        debug!("Deleting entity");
        self.write::<()>(Method::Delete, &self.entity_url(entity_set, key), None)
            .await?;
        Ok(())
    }

    /// Send a raw request to a path below the service root, e.g. a function
    /// import, and return the 2xx response undecoded.
    #[instrument(skip(self, body, options))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        options: Option<&QueryOptions>,
    ) -> Result<TransportResponse> {
        debug!("Sending raw request");
        let url = format!("{}{}", self.service_path, path.trim_start_matches('/'));
        self.executor
            .execute(method, &url, body, self.query(options))
            .await
    }

    async fn read(&self, url: &str, options: Option<&QueryOptions>) -> Result<Vec<u8>> {
        let response = self
            .executor
            .execute(Method::Get, url, None, self.query(options))
            .await?;
        Ok(response.body)
    }

    async fn write<P>(&self, method: Method, url: &str, payload: Option<&P>) -> Result<Vec<u8>>
    where
        P: Serialize + ?Sized,
    {
        let body = payload
            .map(|payload| {
                serde_json::to_vec(payload).map_err(|e| InvalidInputError::Payload {
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let response = self
            .executor
            .execute(method, url, body, self.query(None))
            .await?;
        Ok(response.body)
    }

    fn query(&self, options: Option<&QueryOptions>) -> BTreeMap<String, String> {
        let mut query = self.default_query.clone();
        if let Some(options) = options {
            query.extend(options.build());
        }
        query
    }
}

fn normalize_service_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
