//! Schema declaration, resolution, loading and caching.

mod cache;
mod directives;
mod loader;
mod resolver;
mod runtime;

pub use cache::{MemorySchemaCache, NullSchemaCache, SchemaCache};
pub use directives::{
    modifier, ModifierDirective, PropertyDirectives, RawSchema, RawSchemaBuilder, SchemaSource,
    StaticSchemaSource,
};
pub use loader::SchemaLoader;
pub use runtime::{
    ClassModifiers, Docs, PropertyDefault, PropertyModifiers, PropertySchema, RuntimeSchema,
};
