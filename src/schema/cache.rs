//! Pluggable cache of resolved runtime schemas.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::record::ClassId;
use crate::schema::runtime::RuntimeSchema;

/// Stores resolved schemas between loader instances.
///
/// The loader also keeps a per-instance map in front of this cache, so an
/// implementation only has to be cheaper than re-resolving directives.
pub trait SchemaCache: Send + Sync {
    fn load(&self, class: &ClassId) -> Option<Arc<RuntimeSchema>>;

    fn save(&self, class: &ClassId, schema: Arc<RuntimeSchema>);
}

/// Process-wide in-memory cache.
#[derive(Debug, Default)]
pub struct MemorySchemaCache {
    schemas: RwLock<HashMap<ClassId, Arc<RuntimeSchema>>>,
}

impl MemorySchemaCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaCache for MemorySchemaCache {
    fn load(&self, class: &ClassId) -> Option<Arc<RuntimeSchema>> {
        let schemas = match self.schemas.read() {
            Ok(schemas) => schemas,
            Err(poisoned) => poisoned.into_inner(),
        };
        schemas.get(class).cloned()
    }

    fn save(&self, class: &ClassId, schema: Arc<RuntimeSchema>) {
        let mut schemas = match self.schemas.write() {
            Ok(schemas) => schemas,
            Err(poisoned) => poisoned.into_inner(),
        };
        schemas.insert(class.clone(), schema);
    }
}

/// Cache that stores nothing; every loader resolves from scratch.
#[derive(Debug, Default)]
pub struct NullSchemaCache;

impl SchemaCache for NullSchemaCache {
    fn load(&self, _class: &ClassId) -> Option<Arc<RuntimeSchema>> {
        None
    }

    fn save(&self, _class: &ClassId, _schema: Arc<RuntimeSchema>) {}
}
