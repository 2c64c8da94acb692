//! Class registry and instance creation.
//!
//! The registry stands in for language reflection: a class "exists" when it
//! is registered, is "concrete" when it carries a constructor, and is a
//! mapped record by construction since entries can only be built from
//! [`MappedRecord`] constructors.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{SchemaError, SchemaResult};
use crate::record::{ClassId, MappedRecord};

/// A no-argument constructor for one record class.
pub type Constructor = fn() -> Box<dyn MappedRecord>;

/// Registration entry for one class.
#[derive(Debug, Clone, Copy)]
pub struct ClassEntry {
    constructor: Option<Constructor>,
    bare_constructor: Option<Constructor>,
    abstract_class: bool,
}

impl ClassEntry {
    /// A concrete class creatable through its regular constructor.
    pub fn concrete(constructor: Constructor) -> Self {
        Self { constructor: Some(constructor), bare_constructor: None, abstract_class: false }
    }

    /// A concrete class whose regular constructor needs external arguments;
    /// only creatable when the schema opts into bypassing the constructor.
    pub fn requiring_arguments() -> Self {
        Self { constructor: None, bare_constructor: None, abstract_class: false }
    }

    /// A base class registered for completeness; never instantiable.
    pub fn abstract_class() -> Self {
        Self { constructor: None, bare_constructor: None, abstract_class: true }
    }

    /// Adds an allocation path that bypasses the regular constructor.
    pub fn with_bare_constructor(mut self, constructor: Constructor) -> Self {
        self.bare_constructor = Some(constructor);
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.abstract_class
    }

    pub fn is_instantiable(&self) -> bool {
        !self.abstract_class && (self.constructor.is_some() || self.bare_constructor.is_some())
    }
}

/// Thread-safe map of every known mapped-record class.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    entries: RwLock<HashMap<ClassId, ClassEntry>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, class: ClassId, entry: ClassEntry) -> SchemaResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SchemaError::InvalidState("class registry lock poisoned".to_string()))?;
        entries.insert(class, entry);
        Ok(())
    }

    pub fn get(&self, class: &ClassId) -> SchemaResult<Option<ClassEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SchemaError::InvalidState("class registry lock poisoned".to_string()))?;
        Ok(entries.get(class).copied())
    }

    pub fn contains(&self, class: &ClassId) -> SchemaResult<bool> {
        Ok(self.get(class)?.is_some())
    }
}

/// Allocates record instances for the processing engine.
pub trait RecordCreator: Send + Sync {
    /// Creates an empty instance of `class`.
    ///
    /// With `without_constructor` set, allocation must bypass the regular
    /// constructor (the `create_without_constructor` class modifier). Fails
    /// with an invalid-state error when the class cannot be instantiated the
    /// requested way.
    fn create(
        &self,
        class: &ClassId,
        without_constructor: bool,
    ) -> Result<Box<dyn MappedRecord>, SchemaError>;
}

/// Registry-backed creator used by default.
#[derive(Debug)]
pub struct DefaultRecordCreator {
    registry: std::sync::Arc<ClassRegistry>,
}

impl DefaultRecordCreator {
    pub fn new(registry: std::sync::Arc<ClassRegistry>) -> Self {
        Self { registry }
    }
}

impl RecordCreator for DefaultRecordCreator {
    fn create(
        &self,
        class: &ClassId,
        without_constructor: bool,
    ) -> Result<Box<dyn MappedRecord>, SchemaError> {
        let entry = self
            .registry
            .get(class)?
            .ok_or_else(|| SchemaError::ClassNotFound(class.clone()))?;

        if entry.is_abstract() {
            return Err(SchemaError::NotInstantiable(class.clone()));
        }

        if without_constructor {
            let constructor = entry.bare_constructor.or(entry.constructor).ok_or_else(|| {
                SchemaError::InvalidState(format!(
                    "class '{class}' cannot be created without its constructor",
                ))
            })?;
            return Ok(constructor());
        }

        let constructor = entry.constructor.ok_or_else(|| {
            SchemaError::InvalidState(format!(
                "class '{class}' requires externally supplied constructor arguments",
            ))
        })?;
        Ok(constructor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{MappedValue, RecordExtras};
    use std::any::Any;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Sample {
        extras: RecordExtras,
    }

    impl MappedRecord for Sample {
        fn class_id(&self) -> ClassId {
            ClassId::from_static("Sample")
        }

        fn set(&mut self, property: &str, _value: MappedValue) -> Result<(), SchemaError> {
            Err(crate::record::unknown_property(&self.class_id(), property))
        }

        fn extras(&self) -> &RecordExtras {
            &self.extras
        }

        fn extras_mut(&mut self) -> &mut RecordExtras {
            &mut self.extras
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    }

    fn make_sample() -> Box<dyn MappedRecord> {
        Box::new(Sample::default())
    }

    #[test]
    fn creates_registered_class() {
        let registry = Arc::new(ClassRegistry::new());
        registry
            .register(ClassId::from_static("Sample"), ClassEntry::concrete(make_sample))
            .expect("register");

        let creator = DefaultRecordCreator::new(registry);
        let record = creator.create(&ClassId::from_static("Sample"), false).expect("create");
        assert_eq!(record.class_id().as_str(), "Sample");
    }

    #[test]
    fn unknown_class_is_reported() {
        let creator = DefaultRecordCreator::new(Arc::new(ClassRegistry::new()));
        let err = creator.create(&ClassId::from_static("Missing"), false).unwrap_err();
        assert!(matches!(err, SchemaError::ClassNotFound(_)));
    }

    #[test]
    fn abstract_class_is_not_instantiable() {
        let registry = Arc::new(ClassRegistry::new());
        registry
            .register(ClassId::from_static("Base"), ClassEntry::abstract_class())
            .expect("register");

        let creator = DefaultRecordCreator::new(registry);
        let err = creator.create(&ClassId::from_static("Base"), false).unwrap_err();
        assert!(matches!(err, SchemaError::NotInstantiable(_)));
    }

    #[test]
    fn constructor_arguments_require_bypass() {
        let registry = Arc::new(ClassRegistry::new());
        registry
            .register(
                ClassId::from_static("Sample"),
                ClassEntry::requiring_arguments().with_bare_constructor(make_sample),
            )
            .expect("register");

        let creator = DefaultRecordCreator::new(registry);
        let class = ClassId::from_static("Sample");

        let err = creator.create(&class, false).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidState(_)));

        assert!(creator.create(&class, true).is_ok());
    }
}
