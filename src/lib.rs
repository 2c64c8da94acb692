//! Schema-driven mapping of untyped data onto strongly-typed records.
//!
//! Applications declare a schema per record class (a rule per property,
//! plus modifiers, callbacks and defaults), register the class in a
//! [`ClassRegistry`] and hand raw data to a [`Processor`]. Processing either
//! materializes a fully validated record or returns an [`InvalidData`]
//! failure whose type descriptor mirrors the schema, annotated at every
//! point the data went wrong.
//!
//! ```
//! use std::any::Any;
//! use std::sync::Arc;
//!
//! use datamold::{
//!     ClassEntry, ClassId, ClassRegistry, DefaultRecordCreator, MappedRecord, MappedValue,
//!     Options, Processor, PropertyDirectives, RawSchema, RecordExtras, RuleCatalog,
//!     RuleDirective, SchemaError, SchemaLoader, StaticSchemaSource,
//! };
//! use serde_json::json;
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     name: String,
//!     extras: RecordExtras,
//! }
//!
//! impl MappedRecord for User {
//!     fn class_id(&self) -> ClassId {
//!         ClassId::from_static("User")
//!     }
//!
//!     fn set(&mut self, property: &str, value: MappedValue) -> Result<(), SchemaError> {
//!         match property {
//!             "name" => {
//!                 self.name = value.into_string()?;
//!                 Ok(())
//!             }
//!             other => Err(datamold::unknown_property(&self.class_id(), other)),
//!         }
//!     }
//!
//!     fn extras(&self) -> &RecordExtras {
//!         &self.extras
//!     }
//!
//!     fn extras_mut(&mut self) -> &mut RecordExtras {
//!         &mut self.extras
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//!
//!     fn into_any(self: Box<Self>) -> Box<dyn Any> {
//!         self
//!     }
//! }
//!
//! let registry = Arc::new(ClassRegistry::new());
//! registry
//!     .register(
//!         ClassId::from_static("User"),
//!         ClassEntry::concrete(|| Box::new(User::default())),
//!     )
//!     .unwrap();
//!
//! let source = Arc::new(StaticSchemaSource::new());
//! source.register(
//!     ClassId::from_static("User"),
//!     RawSchema::builder()
//!         .property(PropertyDirectives::new("name", RuleDirective::string()))
//!         .build(),
//! );
//!
//! let catalog = Arc::new(RuleCatalog::new());
//! let mut loader = SchemaLoader::new(registry.clone(), catalog.clone());
//! loader.add_source(source);
//!
//! let processor = Processor::new(
//!     Arc::new(loader),
//!     catalog,
//!     Arc::new(DefaultRecordCreator::new(registry)),
//! );
//!
//! let user: User = processor
//!     .process_as(json!({"name": "ada"}), &ClassId::from_static("User"), Options::new())
//!     .unwrap();
//! assert_eq!(user.name, "ada");
//! ```

mod error;
pub mod printers;
pub mod processing;
mod record;
mod registry;
pub mod rules;
pub mod schema;
pub mod types;
mod utils;

pub use error::{ProcessingError, SchemaError, SchemaResult};
pub use printers::{ErrorJsonPrinter, ErrorPrinter, ErrorVisualPrinter, TypeToStringConverter};
pub use processing::{
    Callback, CallbackContext, CallbackStage, Options, Processor, RequiredFields,
    SkippedPropertiesContext,
};
pub use record::{unknown_property, ClassId, MappedRecord, MappedValue, RecordExtras};
pub use registry::{
    ClassEntry, ClassRegistry, Constructor, DefaultRecordCreator, RecordCreator,
};
pub use rules::{Rule, RuleCatalog, RuleDirective, RuleId};
pub use schema::{
    ModifierDirective, PropertyDirectives, RawSchema, RawSchemaBuilder, SchemaLoader,
    SchemaSource, StaticSchemaSource,
};
pub use types::{InvalidData, MappingFailure, TypeDescriptor, ValueMismatch};
