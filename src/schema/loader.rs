//! Schema loading with two cache tiers.
//!
//! The loader answers every "what is the schema of class X" question. A hit
//! in the per-loader map costs one read lock; a miss falls through to the
//! shared [`SchemaCache`] and finally to directive resolution. Resolution of
//! a hierarchy marks classes as in progress so circular references terminate.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use log::{debug, info};

use crate::error::SchemaError;
use crate::record::ClassId;
use crate::registry::ClassRegistry;
use crate::rules::RuleCatalog;
use crate::schema::cache::{MemorySchemaCache, SchemaCache};
use crate::schema::directives::SchemaSource;
use crate::schema::resolver::SchemaResolver;
use crate::schema::runtime::RuntimeSchema;

pub struct SchemaLoader {
    registry: Arc<ClassRegistry>,
    catalog: Arc<RuleCatalog>,
    sources: Vec<Arc<dyn SchemaSource>>,
    cache: Box<dyn SchemaCache>,
    local: RwLock<HashMap<ClassId, Arc<RuntimeSchema>>>,
    resolving: RwLock<HashSet<ClassId>>,
}

impl SchemaLoader {
    pub fn new(registry: Arc<ClassRegistry>, catalog: Arc<RuleCatalog>) -> Self {
        Self::with_cache(registry, catalog, Box::new(MemorySchemaCache::new()))
    }

    pub fn with_cache(
        registry: Arc<ClassRegistry>,
        catalog: Arc<RuleCatalog>,
        cache: Box<dyn SchemaCache>,
    ) -> Self {
        Self {
            registry,
            catalog,
            sources: Vec::new(),
            cache,
            local: RwLock::new(HashMap::new()),
            resolving: RwLock::new(HashSet::new()),
        }
    }

    pub fn add_source(&mut self, source: Arc<dyn SchemaSource>) {
        self.sources.push(source);
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Returns the resolved schema of `class`, resolving it on first use.
    ///
    /// Repeated calls return the same shared instance.
    pub fn load(&self, class: &ClassId) -> Result<Arc<RuntimeSchema>, SchemaError> {
        if let Some(schema) = self.local_get(class)? {
            debug!("schema for class '{class}' served from loader map");
            return Ok(schema);
        }

        if let Some(schema) = self.cache.load(class) {
            debug!("schema for class '{class}' served from shared cache");
            self.local_put(class, schema.clone())?;
            return Ok(schema);
        }

        let entry = self
            .registry
            .get(class)?
            .ok_or_else(|| SchemaError::ClassNotFound(class.clone()))?;
        if entry.is_abstract() {
            return Err(SchemaError::NotInstantiable(class.clone()));
        }

        if self.sources.len() > 1 {
            return Err(SchemaError::NotImplemented(
                "only one schema source is supported".to_string(),
            ));
        }
        let raw = self
            .sources
            .first()
            .and_then(|source| source.load(class))
            .ok_or_else(|| {
                SchemaError::InvalidArgument(format!(
                    "no schema directives for class '{class}'",
                ))
            })?;

        self.mark_resolving(class)?;
        let resolved = SchemaResolver::new(self, &self.catalog).resolve(class, &raw);
        self.unmark_resolving(class)?;

        let schema = Arc::new(resolved?);
        self.cache.save(class, schema.clone());
        self.local_put(class, schema.clone())?;
        info!("resolved schema for class '{class}'");
        Ok(schema)
    }

    /// Checks that `class` has a loadable schema without re-entering a
    /// resolution already in progress higher up the call stack.
    pub(crate) fn ensure(&self, class: &ClassId) -> Result<(), SchemaError> {
        if self.local_get(class)?.is_some() || self.is_resolving(class)? {
            return Ok(());
        }
        self.load(class).map(drop)
    }

    fn local_get(&self, class: &ClassId) -> Result<Option<Arc<RuntimeSchema>>, SchemaError> {
        let local = self
            .local
            .read()
            .map_err(|_| SchemaError::InvalidState("schema loader lock poisoned".to_string()))?;
        Ok(local.get(class).cloned())
    }

    fn local_put(&self, class: &ClassId, schema: Arc<RuntimeSchema>) -> Result<(), SchemaError> {
        let mut local = self
            .local
            .write()
            .map_err(|_| SchemaError::InvalidState("schema loader lock poisoned".to_string()))?;
        local.insert(class.clone(), schema);
        Ok(())
    }

    fn is_resolving(&self, class: &ClassId) -> Result<bool, SchemaError> {
        let resolving = self
            .resolving
            .read()
            .map_err(|_| SchemaError::InvalidState("schema loader lock poisoned".to_string()))?;
        Ok(resolving.contains(class))
    }

    fn mark_resolving(&self, class: &ClassId) -> Result<(), SchemaError> {
        let mut resolving = self
            .resolving
            .write()
            .map_err(|_| SchemaError::InvalidState("schema loader lock poisoned".to_string()))?;
        resolving.insert(class.clone());
        Ok(())
    }

    fn unmark_resolving(&self, class: &ClassId) -> Result<(), SchemaError> {
        let mut resolving = self
            .resolving
            .write()
            .map_err(|_| SchemaError::InvalidState("schema loader lock poisoned".to_string()))?;
        resolving.remove(class);
        Ok(())
    }
}

impl std::fmt::Debug for SchemaLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaLoader").field("sources", &self.sources.len()).finish()
    }
}
